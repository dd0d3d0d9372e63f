//! Packed V1 key blocks.
//!
//! The V1 proof-of-work and fingerprint both hash the compound public key
//! as one contiguous byte image: `nonce(1) ‖ c25519_pub(64) ‖ p384_pub(49)`.
//! That image is consensus-critical, so it is stored exactly as it is
//! hashed — a packed byte array with typed accessors — rather than as a
//! struct whose layout the compiler would be free to rearrange.

use std::fmt;

use crate::config::{
    C25519_PRIVATE_KEY_SIZE, C25519_PUBLIC_KEY_SIZE, COMPOUND_PRIVATE_KEY_SIZE,
    COMPOUND_PUBLIC_KEY_SIZE, P384_PRIVATE_KEY_SIZE, P384_PUBLIC_KEY_SIZE,
};

/// The packed V1 public block: `nonce ‖ c25519_pub ‖ p384_pub`.
///
/// The nonce is the proof-of-work search variable; it is part of the
/// hashed image, so changing it after generation invalidates the identity.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CompoundPublic([u8; COMPOUND_PUBLIC_KEY_SIZE]);

impl CompoundPublic {
    pub(crate) fn assemble(
        nonce: u8,
        c25519: &[u8; C25519_PUBLIC_KEY_SIZE],
        p384: &[u8; P384_PUBLIC_KEY_SIZE],
    ) -> Self {
        let mut bytes = [0u8; COMPOUND_PUBLIC_KEY_SIZE];
        bytes[0] = nonce;
        bytes[1..1 + C25519_PUBLIC_KEY_SIZE].copy_from_slice(c25519);
        bytes[1 + C25519_PUBLIC_KEY_SIZE..].copy_from_slice(p384);
        Self(bytes)
    }

    pub(crate) fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; COMPOUND_PUBLIC_KEY_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// The exact byte image that the proof-of-work and fingerprint hash.
    pub fn as_bytes(&self) -> &[u8; COMPOUND_PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// The one-byte proof-of-work nonce.
    pub fn nonce(&self) -> u8 {
        self.0[0]
    }

    pub(crate) fn set_nonce(&mut self, nonce: u8) {
        self.0[0] = nonce;
    }

    /// The combined C25519 public block.
    pub fn c25519(&self) -> [u8; C25519_PUBLIC_KEY_SIZE] {
        let mut out = [0u8; C25519_PUBLIC_KEY_SIZE];
        out.copy_from_slice(&self.0[1..1 + C25519_PUBLIC_KEY_SIZE]);
        out
    }

    /// The P-384 compressed public point.
    pub fn p384(&self) -> [u8; P384_PUBLIC_KEY_SIZE] {
        let mut out = [0u8; P384_PUBLIC_KEY_SIZE];
        out.copy_from_slice(&self.0[1 + C25519_PUBLIC_KEY_SIZE..]);
        out
    }

    pub(crate) fn set_p384(&mut self, p384: &[u8; P384_PUBLIC_KEY_SIZE]) {
        self.0[1 + C25519_PUBLIC_KEY_SIZE..].copy_from_slice(p384);
    }
}

impl fmt::Debug for CompoundPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompoundPublic(nonce={}, {}..)",
            self.0[0],
            hex::encode(&self.0[1..9])
        )
    }
}

/// The packed V1 private block: `c25519_priv ‖ p384_priv`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CompoundPrivate([u8; COMPOUND_PRIVATE_KEY_SIZE]);

impl CompoundPrivate {
    pub(crate) fn assemble(
        c25519: &[u8; C25519_PRIVATE_KEY_SIZE],
        p384: &[u8; P384_PRIVATE_KEY_SIZE],
    ) -> Self {
        let mut bytes = [0u8; COMPOUND_PRIVATE_KEY_SIZE];
        bytes[..C25519_PRIVATE_KEY_SIZE].copy_from_slice(c25519);
        bytes[C25519_PRIVATE_KEY_SIZE..].copy_from_slice(p384);
        Self(bytes)
    }

    pub(crate) fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; COMPOUND_PRIVATE_KEY_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; COMPOUND_PRIVATE_KEY_SIZE] {
        &self.0
    }

    pub(crate) fn c25519(&self) -> [u8; C25519_PRIVATE_KEY_SIZE] {
        let mut out = [0u8; C25519_PRIVATE_KEY_SIZE];
        out.copy_from_slice(&self.0[..C25519_PRIVATE_KEY_SIZE]);
        out
    }

    pub(crate) fn p384(&self) -> [u8; P384_PRIVATE_KEY_SIZE] {
        let mut out = [0u8; P384_PRIVATE_KEY_SIZE];
        out.copy_from_slice(&self.0[C25519_PRIVATE_KEY_SIZE..]);
        out
    }
}

impl fmt::Debug for CompoundPrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Private key material never appears in debug output, not even a prefix.
        f.write_str("CompoundPrivate(..)")
    }
}
