//! # Identity Fingerprints
//!
//! A fingerprint is the pair of an identity's 40-bit address and the
//! SHA-384 of its canonical public material. The address alone is short
//! enough to collide by brute force (it is only proof-of-work-expensive,
//! not impossible); the fingerprint pins it to one specific key set, so a
//! peer can be identified without hauling the full public material around.
//!
//! The hashed image differs by identity type: V0 hashes the 64-byte
//! combined C25519 public key, V1 hashes the whole compound public block
//! (nonce included). Either way the hash is a pure function of public
//! material — two identities with the same keys have the same fingerprint,
//! and flipping any public byte changes it.

use std::fmt;

use crate::address::Address;
use crate::config::FINGERPRINT_HASH_SIZE;

/// An identity's address plus the SHA-384 of its public material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// The identity's 40-bit network address.
    pub address: Address,
    /// SHA-384 over the canonical public byte image for the identity type.
    pub hash: [u8; FINGERPRINT_HASH_SIZE],
}

impl Fingerprint {
    /// The all-zero fingerprint, used by the NIL identity.
    pub fn zero() -> Self {
        Self {
            address: Address::default(),
            hash: [0u8; FINGERPRINT_HASH_SIZE],
        }
    }

    /// True for the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.address.is_zero() && self.hash.iter().all(|&b| b == 0)
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Fingerprint {
    /// `address-hash`, both lowercase hex. Meant for logs and diagnostics,
    /// not a wire format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.address, hex::encode(self.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel() {
        let fp = Fingerprint::zero();
        assert!(fp.is_zero());
        assert_eq!(fp, Fingerprint::default());
    }

    #[test]
    fn nonzero_hash_is_not_sentinel() {
        let mut fp = Fingerprint::zero();
        fp.hash[47] = 1;
        assert!(!fp.is_zero());
    }

    #[test]
    fn display_is_address_dash_hash() {
        let mut fp = Fingerprint::zero();
        fp.address = Address::from_u64(0xab_cdef_0123);
        fp.hash[0] = 0x5a;
        let text = fp.to_string();
        assert!(text.starts_with("abcdef0123-5a"));
        // 10 address chars, one dash, 96 hash chars.
        assert_eq!(text.len(), 10 + 1 + 96);
    }
}
