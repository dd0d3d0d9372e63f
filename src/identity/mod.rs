//! # Identity
//!
//! An identity binds a 40-bit network address to key material, with a
//! memory-hard proof-of-work standing between "generated a key pair" and
//! "owns an address". The work is the whole point: addresses are short
//! enough to be readable, so they must be expensive enough to be
//! unforgeable in bulk, and the PoW digest pins each address to one
//! specific key set.
//!
//! Two identity types exist on the wire:
//!
//! - **V0** — a combined C25519 key pair (Ed25519 + X25519). The address
//!   is carved out of the V0 proof-of-work digest itself.
//! - **V1** — the C25519 pair plus a NIST P-384 pair, packed with a
//!   one-byte nonce into a compound public block. The address is the first
//!   five bytes of the block's SHA-384 fingerprint, and the nonce is the
//!   PoW search variable.
//!
//! Identities are immutable values: generate or parse one, then share it
//! freely across threads. Generation deliberately takes seconds — run it
//! on a worker you can abandon if you need cancellation, because there is
//! no cooperative cancel point inside the proof-of-work.
//!
//! ```no_run
//! use plexus_identity::{Identity, IdentityType};
//!
//! let id = Identity::generate(IdentityType::V1);
//! assert!(id.locally_validate());
//!
//! let sig = id.sign(b"hello").unwrap();
//! assert!(id.verify(b"hello", &sig));
//! ```

mod codec;
mod material;
mod pow;

pub use material::CompoundPublic;
pub(crate) use material::CompoundPrivate;

use sha2::{Digest, Sha384, Sha512};
use thiserror::Error;
use tracing::debug;

use crate::address::{Address, AddressError};
use crate::config::{
    AGREED_SECRET_SIZE, C25519_PRIVATE_KEY_SIZE, C25519_PUBLIC_KEY_SIZE, FINGERPRINT_HASH_SIZE,
    P384_SIGNATURE_SIZE, SIGNATURE_SIZE, V0_POW_MEMORY, V0_POW_THRESHOLD, V1_POW_MEMORY_WORDS,
};
use crate::crypto::{c25519, p384};
use crate::fingerprint::Fingerprint;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by identity parsing and by operations that need
/// something the identity does not hold.
///
/// Parsers never leave a half-built identity behind: every constructor
/// returns by value on success only.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The binary blob ended before the declared material did.
    #[error("identity blob truncated")]
    Truncated,

    /// The wire type byte is not one of the defined identity types.
    #[error("unknown identity type 0x{0:02x}")]
    UnknownType(u8),

    /// The text form's type field is not one of the defined type tokens.
    #[error("unrecognized identity type token `{0}`")]
    UnknownTypeToken(String),

    /// The private-length byte is not one of the legal values for the type.
    #[error("illegal private key length {got} for {kind} identity")]
    IllegalPrivateLength {
        /// The identity type being parsed.
        kind: IdentityType,
        /// The offending length byte.
        got: u8,
    },

    /// A V1 identity's claimed address does not match the first five bytes
    /// of its public key fingerprint.
    #[error("address does not match the public key fingerprint")]
    AddressMismatch,

    /// The address is in the reserved set and can never be valid.
    #[error("address is reserved")]
    ReservedAddress,

    /// The address field itself would not parse.
    #[error("invalid address field: {0}")]
    Address(#[from] AddressError),

    /// Catch-all for a text form that does not follow
    /// `address:type:public[:private]`.
    #[error("malformed identity string: {0}")]
    MalformedText(&'static str),

    /// The operation needs a private key half this identity does not hold.
    #[error("identity holds no private key")]
    MissingPrivateKey,

    /// Key material failed to decode as a point/scalar on its curve.
    #[error("invalid key material")]
    InvalidKey,
}

// ---------------------------------------------------------------------------
// Identity type tag
// ---------------------------------------------------------------------------

/// The two identity types defined on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityType {
    /// Combined C25519 material only; address from the PoW digest.
    V0 = 0,
    /// C25519 + P-384 compound material; address from the fingerprint.
    V1 = 1,
}

impl IdentityType {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::V0),
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// The wire encoding of this type.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Signature length for this type. Both types currently emit 96 bytes,
    /// but callers should not bake that coincidence in.
    pub fn signature_size(self) -> usize {
        match self {
            Self::V0 => crate::config::C25519_SIGNATURE_SIZE,
            Self::V1 => P384_SIGNATURE_SIZE,
        }
    }
}

impl std::fmt::Display for IdentityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::V0 => "v0",
            Self::V1 => "v1",
        })
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Key material for each identity type, private halves optional.
///
/// The shape of the private block is statically tied to its public partner
/// so a V1 public can never end up paired with a V0 private.
#[derive(Clone, PartialEq, Eq)]
enum Material {
    V0 {
        public: [u8; C25519_PUBLIC_KEY_SIZE],
        private: Option<[u8; C25519_PRIVATE_KEY_SIZE]>,
    },
    V1 {
        public: CompoundPublic,
        private: Option<CompoundPrivate>,
    },
}

/// A proof-of-work-backed network identity.
///
/// Immutable once constructed. Obtain one via [`Identity::generate`],
/// [`Identity::unmarshal`], or parsing the text form with [`str::parse`].
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    material: Material,
    address: Address,
    fingerprint: Fingerprint,
}

impl Identity {
    /// Generate a new identity of the given type.
    ///
    /// This runs the proof-of-work search and takes from around a second
    /// (V0) to several seconds (V1) of one saturated core. The scratch
    /// buffer is allocated once and reused across attempts.
    pub fn generate(kind: IdentityType) -> Identity {
        match kind {
            IdentityType::V0 => Self::generate_v0(),
            IdentityType::V1 => Self::generate_v1(),
        }
    }

    fn generate_v0() -> Identity {
        let mut genmem = vec![0u8; V0_POW_MEMORY];
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            let (public, private) = c25519::generate();
            let digest = pow::pow_v0(&public, &mut genmem);
            if digest[0] >= V0_POW_THRESHOLD {
                continue;
            }
            let mut raw = [0u8; 5];
            raw.copy_from_slice(&digest[59..64]);
            let address = Address::from_bytes(&raw);
            if address.is_reserved() {
                continue;
            }

            debug!(address = %address, attempts, "generated v0 identity");
            return Identity {
                material: Material::V0 {
                    public,
                    private: Some(private),
                },
                address,
                fingerprint: Fingerprint {
                    address,
                    hash: sha384_one(&public),
                },
            };
        }
    }

    fn generate_v1() -> Identity {
        let mut scratch = vec![0u64; V1_POW_MEMORY_WORDS];
        loop {
            // The nonce is only eight bits, so when it wraps we swap in
            // fresh P-384 material (the faster of the two generators) and
            // keep searching; the C25519 pair stays for the whole round.
            let (c25519_public, c25519_private) = c25519::generate();
            let (mut p384_public, mut p384_private) = p384::generate();
            let mut public = CompoundPublic::assemble(0, &c25519_public, &p384_public);

            loop {
                if pow::pow_v1(public.as_bytes(), &mut scratch) {
                    break;
                }
                let next = public.nonce().wrapping_add(1);
                public.set_nonce(next);
                if next == 0 {
                    let fresh = p384::generate();
                    p384_public = fresh.0;
                    p384_private = fresh.1;
                    public.set_p384(&p384_public);
                }
            }

            // PoW passed; the address falls out of the fingerprint. A
            // reserved address sends the whole round back to square one.
            let hash = sha384_one(public.as_bytes());
            let mut raw = [0u8; 5];
            raw.copy_from_slice(&hash[..5]);
            let address = Address::from_bytes(&raw);
            if address.is_reserved() {
                continue;
            }

            debug!(address = %address, nonce = public.nonce(), "generated v1 identity");
            return Identity {
                material: Material::V1 {
                    public,
                    private: Some(CompoundPrivate::assemble(&c25519_private, &p384_private)),
                },
                address,
                fingerprint: Fingerprint { address, hash },
            };
        }
    }

    /// Re-run the proof-of-work and the address derivation from scratch and
    /// check they still bind this identity's address to its public keys.
    ///
    /// This is the expensive check a node runs once when it first meets an
    /// identity; parsing alone does only the cheap structural checks.
    pub fn locally_validate(&self) -> bool {
        if self.address.is_reserved() {
            return false;
        }
        match &self.material {
            Material::V0 { public, .. } => {
                let mut genmem = vec![0u8; V0_POW_MEMORY];
                let digest = pow::pow_v0(public, &mut genmem);
                digest[0] < V0_POW_THRESHOLD && digest[59..64] == self.address.to_bytes()
            }
            Material::V1 { public, .. } => {
                let hash = sha384_one(public.as_bytes());
                if hash[..5] != self.address.to_bytes() {
                    return false;
                }
                let mut scratch = vec![0u64; V1_POW_MEMORY_WORDS];
                pow::pow_v1(public.as_bytes(), &mut scratch)
            }
        }
    }

    /// Sign a message. V0 signs with the combined C25519 scheme; V1 signs
    /// SHA-384(message ‖ compound public) with P-384 ECDSA, so a V1
    /// signature commits to both sub-keys and the nonce.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], IdentityError> {
        match &self.material {
            Material::V0 {
                private: Some(private),
                ..
            } => Ok(c25519::sign(private, message)),
            Material::V1 {
                public,
                private: Some(private),
            } => {
                let prehash = v1_signing_digest(message, public);
                p384::sign(&private.p384(), &prehash).ok_or(IdentityError::InvalidKey)
            }
            _ => Err(IdentityError::MissingPrivateKey),
        }
    }

    /// Buffer-oriented variant of [`sign`](Self::sign) for callers that
    /// manage their own wire buffers: writes the signature into `out` and
    /// returns its length, or returns 0 if `out` is too small or no private
    /// key is held. Type dispatch is strict — a V0 identity never spills
    /// into the V1 signature path.
    pub fn sign_into(&self, message: &[u8], out: &mut [u8]) -> usize {
        let size = self.identity_type().signature_size();
        if out.len() < size {
            return 0;
        }
        match self.sign(message) {
            Ok(signature) => {
                out[..size].copy_from_slice(&signature);
                size
            }
            Err(_) => 0,
        }
    }

    /// Verify a signature over `message`. Wrong lengths, malformed keys,
    /// and bad signatures are all just `false`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match &self.material {
            Material::V0 { public, .. } => c25519::verify(public, message, signature),
            Material::V1 { public, .. } => {
                if signature.len() != P384_SIGNATURE_SIZE {
                    return false;
                }
                let prehash = v1_signing_digest(message, public);
                p384::verify(&public.p384(), &prehash, signature)
            }
        }
    }

    /// Derive the 48-byte shared secret between this identity (which must
    /// hold its private half) and a peer's public identity.
    ///
    /// Between two V1 identities both curves contribute: the X25519 and
    /// P-384 ECDH secrets are hashed together, so a break of either curve
    /// alone does not expose traffic. Every pairing involving a V0 side
    /// uses the X25519 path only.
    pub fn agree(&self, other: &Identity) -> Result<[u8; AGREED_SECRET_SIZE], IdentityError> {
        match &self.material {
            Material::V0 {
                private: Some(private),
                ..
            } => Ok(x25519_secret(private, &other.c25519_public())),
            Material::V1 {
                private: Some(private),
                ..
            } => match &other.material {
                Material::V1 {
                    public: other_public,
                    ..
                } => {
                    let r1 = c25519::agree(&private.c25519(), &other_public.c25519());
                    let r2 = p384::agree(&private.p384(), &other_public.p384())
                        .ok_or(IdentityError::InvalidKey)?;
                    let mut hasher = Sha384::new();
                    hasher.update(r1);
                    hasher.update(r2);
                    let mut key = [0u8; AGREED_SECRET_SIZE];
                    key.copy_from_slice(&hasher.finalize());
                    Ok(key)
                }
                Material::V0 { .. } => {
                    Ok(x25519_secret(&private.c25519(), &other.c25519_public()))
                }
            },
            _ => Err(IdentityError::MissingPrivateKey),
        }
    }

    /// SHA-384 over the identity's public and private material together,
    /// or all zeros when no private half is held. Useful as a stable local
    /// secret derived from the identity itself.
    pub fn hash_with_private(&self) -> [u8; FINGERPRINT_HASH_SIZE] {
        match &self.material {
            Material::V0 {
                public,
                private: Some(private),
            } => sha384_two(public, private),
            Material::V1 {
                public,
                private: Some(private),
            } => sha384_two(public.as_bytes(), private.as_bytes()),
            _ => [0u8; FINGERPRINT_HASH_SIZE],
        }
    }

    // -- accessors ----------------------------------------------------------

    /// The identity's 40-bit network address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Which of the two wire types this identity is.
    pub fn identity_type(&self) -> IdentityType {
        match self.material {
            Material::V0 { .. } => IdentityType::V0,
            Material::V1 { .. } => IdentityType::V1,
        }
    }

    /// The identity's fingerprint (address + SHA-384 of public material).
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Whether this identity holds its private half.
    pub fn has_private(&self) -> bool {
        match &self.material {
            Material::V0 { private, .. } => private.is_some(),
            Material::V1 { private, .. } => private.is_some(),
        }
    }

    /// The canonical public byte image for this identity's type — the
    /// exact bytes the fingerprint (and, for V1, the proof-of-work) hash.
    pub fn public_key_bytes(&self) -> &[u8] {
        match &self.material {
            Material::V0 { public, .. } => public,
            Material::V1 { public, .. } => public.as_bytes(),
        }
    }

    /// The packed compound public block, when this is a V1 identity.
    pub fn compound_public(&self) -> Option<&CompoundPublic> {
        match &self.material {
            Material::V1 { public, .. } => Some(public),
            Material::V0 { .. } => None,
        }
    }

    /// The all-zero placeholder identity.
    ///
    /// Used where "no identity" needs a value: an unset peer slot, a
    /// sentinel in tables. It never validates and cannot sign.
    pub fn nil() -> Identity {
        Identity {
            material: Material::V0 {
                public: [0u8; C25519_PUBLIC_KEY_SIZE],
                private: None,
            },
            address: Address::default(),
            fingerprint: Fingerprint::zero(),
        }
    }

    /// True for the [`nil`](Self::nil) placeholder.
    pub fn is_nil(&self) -> bool {
        self.address.is_zero()
    }

    fn c25519_public(&self) -> [u8; C25519_PUBLIC_KEY_SIZE] {
        match &self.material {
            Material::V0 { public, .. } => *public,
            Material::V1 { public, .. } => public.c25519(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::nil()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Deliberately address-only: never print key material, and the
        // private half least of all.
        write!(
            f,
            "Identity({}, {}, private={})",
            self.address,
            self.identity_type(),
            self.has_private()
        )
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn sha384_one(data: &[u8]) -> [u8; FINGERPRINT_HASH_SIZE] {
    let mut out = [0u8; FINGERPRINT_HASH_SIZE];
    out.copy_from_slice(&Sha384::digest(data));
    out
}

fn sha384_two(a: &[u8], b: &[u8]) -> [u8; FINGERPRINT_HASH_SIZE] {
    let mut hasher = Sha384::new();
    hasher.update(a);
    hasher.update(b);
    let mut out = [0u8; FINGERPRINT_HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// The X25519 agreement path shared by every pairing that involves a V0
/// side: raw X25519, then SHA-512 truncated to the standard secret size.
fn x25519_secret(
    private: &[u8; C25519_PRIVATE_KEY_SIZE],
    peer_public: &[u8; C25519_PUBLIC_KEY_SIZE],
) -> [u8; AGREED_SECRET_SIZE] {
    let raw = c25519::agree(private, peer_public);
    let digest = Sha512::digest(raw);
    let mut key = [0u8; AGREED_SECRET_SIZE];
    key.copy_from_slice(&digest[..AGREED_SECRET_SIZE]);
    key
}

fn v1_signing_digest(message: &[u8], public: &CompoundPublic) -> [u8; 48] {
    sha384_two(message, public.as_bytes())
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
