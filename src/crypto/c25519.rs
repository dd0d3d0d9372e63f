//! # Combined Curve25519 Key Material
//!
//! Every identity carries one "combined" Curve25519 key pair: an Ed25519
//! signing key and an X25519 agreement key, generated together and always
//! serialized together. The public block is 64 bytes — the Ed25519 verify
//! key followed by the X25519 Montgomery point — and the private block
//! mirrors it with the Ed25519 seed followed by the X25519 secret scalar.
//!
//! Bundling the two keys means an identity can both sign and do
//! Diffie-Hellman without two separate enrollment steps, and it means the
//! proof-of-work (which hashes the whole 64-byte public block) prices both
//! capabilities at once.
//!
//! ## The 96-byte signature scheme
//!
//! Signatures here are 96 bytes, not Ed25519's usual 64: the Ed25519
//! signature is computed over the first 32 bytes of the SHA-512 of the
//! message, and those 32 digest bytes are appended to the signature.
//! Verifiers recompute the digest, compare the appended bytes first (a
//! cheap early reject for corrupted messages), then run the real Ed25519
//! verification. Wire compatibility pins this layout; do not "fix" it to
//! plain Ed25519.

use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::config::{
    C25519_PRIVATE_KEY_SIZE, C25519_PUBLIC_KEY_SIZE, C25519_SHARED_SECRET_SIZE,
    C25519_SIGNATURE_SIZE,
};

/// Generate a fresh combined key pair from the OS RNG.
///
/// Returns `(public, private)` as packed 64-byte blocks.
pub fn generate() -> (
    [u8; C25519_PUBLIC_KEY_SIZE],
    [u8; C25519_PRIVATE_KEY_SIZE],
) {
    let signing = SigningKey::generate(&mut OsRng);
    let exchange = StaticSecret::random_from_rng(OsRng);

    let mut public = [0u8; C25519_PUBLIC_KEY_SIZE];
    public[..32].copy_from_slice(signing.verifying_key().as_bytes());
    public[32..].copy_from_slice(X25519PublicKey::from(&exchange).as_bytes());

    let mut private = [0u8; C25519_PRIVATE_KEY_SIZE];
    private[..32].copy_from_slice(&signing.to_bytes());
    private[32..].copy_from_slice(&exchange.to_bytes());

    (public, private)
}

/// Sign a message with the combined scheme described in the module docs.
pub fn sign(private: &[u8; C25519_PRIVATE_KEY_SIZE], message: &[u8]) -> [u8; C25519_SIGNATURE_SIZE] {
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&private[..32]);
    let signing = SigningKey::from_bytes(&seed);

    let digest = Sha512::digest(message);
    let signature = signing.sign(&digest[..32]);

    let mut out = [0u8; C25519_SIGNATURE_SIZE];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64..].copy_from_slice(&digest[..32]);
    out
}

/// Verify a 96-byte combined signature. Anything else — wrong length, a
/// mismatched embedded digest, an invalid verify key, a bad signature —
/// is simply `false`.
pub fn verify(public: &[u8; C25519_PUBLIC_KEY_SIZE], message: &[u8], signature: &[u8]) -> bool {
    if signature.len() != C25519_SIGNATURE_SIZE {
        return false;
    }

    let digest = Sha512::digest(message);
    if signature[64..] != digest[..32] {
        return false;
    }

    let mut verify_key = [0u8; 32];
    verify_key.copy_from_slice(&public[..32]);
    let Ok(verifying) = VerifyingKey::from_bytes(&verify_key) else {
        return false;
    };

    let mut sig = [0u8; 64];
    sig.copy_from_slice(&signature[..64]);
    verifying
        .verify(&digest[..32], &Ed25519Signature::from_bytes(&sig))
        .is_ok()
}

/// X25519 agreement between our private block and a peer's public block.
///
/// Returns the raw 32-byte shared secret. Callers hash it before use; raw
/// Diffie-Hellman output has curve structure and is not a uniform key.
pub fn agree(
    private: &[u8; C25519_PRIVATE_KEY_SIZE],
    peer_public: &[u8; C25519_PUBLIC_KEY_SIZE],
) -> [u8; C25519_SHARED_SECRET_SIZE] {
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&private[32..]);
    let mut peer = [0u8; 32];
    peer.copy_from_slice(&peer_public[32..]);

    StaticSecret::from(secret)
        .diffie_hellman(&X25519PublicKey::from(peer))
        .to_bytes()
}
