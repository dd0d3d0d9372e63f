//! # NIST P-384 Key Material
//!
//! The second key pair carried by V1 identities. P-384 is here for one
//! reason: it is the curve compliance regimes accept, and V1 was designed
//! so that neither curve family has to be trusted alone. Signatures from a
//! V1 identity are P-384 ECDSA; agreement between two V1 identities mixes
//! a P-384 ECDH secret with the X25519 one, so breaking either curve still
//! leaves the other protecting traffic.
//!
//! Public keys travel as 49-byte SEC1 compressed points and private keys
//! as raw 48-byte scalars, both packed directly into the compound identity
//! blocks. ECDSA runs over a caller-supplied 48-byte prehash (the identity
//! layer hashes the message together with the compound public key first)
//! and signatures use the fixed-width 96-byte `r ‖ s` encoding — never DER.

use p384::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::elliptic_curve::sec1::ToEncodedPoint;
use p384::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use crate::config::{
    P384_PRIVATE_KEY_SIZE, P384_PUBLIC_KEY_SIZE, P384_SHARED_SECRET_SIZE, P384_SIGNATURE_SIZE,
};

/// Generate a fresh P-384 key pair from the OS RNG.
///
/// Returns `(public, private)` — the compressed point and the raw scalar.
pub fn generate() -> ([u8; P384_PUBLIC_KEY_SIZE], [u8; P384_PRIVATE_KEY_SIZE]) {
    let secret = SecretKey::random(&mut OsRng);

    let mut public = [0u8; P384_PUBLIC_KEY_SIZE];
    public.copy_from_slice(secret.public_key().to_encoded_point(true).as_bytes());

    let mut private = [0u8; P384_PRIVATE_KEY_SIZE];
    private.copy_from_slice(&secret.to_bytes());

    (public, private)
}

/// ECDSA-sign a 48-byte prehash. Returns `None` if the scalar bytes do not
/// form a valid key, which only happens with corrupted private material.
pub fn sign(
    private: &[u8; P384_PRIVATE_KEY_SIZE],
    prehash: &[u8; 48],
) -> Option<[u8; P384_SIGNATURE_SIZE]> {
    let signing = SigningKey::from_slice(private).ok()?;
    let signature: Signature = signing.sign_prehash(prehash).ok()?;

    let mut out = [0u8; P384_SIGNATURE_SIZE];
    out.copy_from_slice(&signature.to_bytes());
    Some(out)
}

/// Verify a fixed-width ECDSA signature over a 48-byte prehash.
pub fn verify(public: &[u8; P384_PUBLIC_KEY_SIZE], prehash: &[u8; 48], signature: &[u8]) -> bool {
    if signature.len() != P384_SIGNATURE_SIZE {
        return false;
    }
    let Ok(verifying) = VerifyingKey::from_sec1_bytes(public) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying.verify_prehash(prehash, &signature).is_ok()
}

/// P-384 ECDH between our scalar and a peer's compressed point.
///
/// Returns the raw 48-byte shared x coordinate, or `None` when either side's
/// material does not decode to a valid key/point.
pub fn agree(
    private: &[u8; P384_PRIVATE_KEY_SIZE],
    peer_public: &[u8; P384_PUBLIC_KEY_SIZE],
) -> Option<[u8; P384_SHARED_SECRET_SIZE]> {
    let secret = SecretKey::from_slice(private).ok()?;
    let peer = PublicKey::from_sec1_bytes(peer_public).ok()?;

    let shared = p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut out = [0u8; P384_SHARED_SECRET_SIZE];
    out.copy_from_slice(shared.raw_secret_bytes());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_keys_are_compressed_points() {
        let (public, _) = generate();
        // SEC1 compressed points start with the parity tag 0x02 or 0x03.
        assert!(public[0] == 0x02 || public[0] == 0x03);
    }

    #[test]
    fn sign_verify_roundtrip() {
        let (public, private) = generate();
        let prehash = [0x5au8; 48];
        let sig = sign(&private, &prehash).unwrap();
        assert!(verify(&public, &prehash, &sig));
    }

    #[test]
    fn wrong_prehash_fails() {
        let (public, private) = generate();
        let sig = sign(&private, &[0x11u8; 48]).unwrap();
        assert!(!verify(&public, &[0x22u8; 48], &sig));
    }

    #[test]
    fn truncated_signature_fails() {
        let (public, private) = generate();
        let prehash = [0x33u8; 48];
        let sig = sign(&private, &prehash).unwrap();
        assert!(!verify(&public, &prehash, &sig[..95]));
    }

    #[test]
    fn garbage_public_key_fails_closed() {
        let (_, private) = generate();
        let prehash = [0x44u8; 48];
        let sig = sign(&private, &prehash).unwrap();
        let bogus = [0xeeu8; P384_PUBLIC_KEY_SIZE];
        assert!(!verify(&bogus, &prehash, &sig));
        assert!(agree(&private, &bogus).is_none());
    }

    #[test]
    fn agreement_is_symmetric() {
        let (pub_a, priv_a) = generate();
        let (pub_b, priv_b) = generate();
        assert_eq!(agree(&priv_a, &pub_b), agree(&priv_b, &pub_a));
        assert!(agree(&priv_a, &pub_b).is_some());
    }
}
