//! # Network Addresses
//!
//! A Plexus address is a 40-bit unsigned integer — ten hex characters, five
//! bytes on the wire, short enough to read aloud over the phone. It is not
//! chosen; it is *earned*, derived from a public key through the identity
//! layer's proof-of-work, which is what makes address squatting expensive
//! and address-to-key substitution infeasible.
//!
//! Two corners of the space are reserved and never assigned: the all-zero
//! address (used as the "no address" sentinel throughout the stack) and
//! every address whose leading byte is `0xff` (kept for future signaling).

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_RESERVED_PREFIX, ADDRESS_SIZE};

/// Errors raised when parsing an address from its text form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The text form is exactly ten hex characters. Anything else is not
    /// an address, it's a typo.
    #[error("address must be exactly 10 hex characters, got {0}")]
    BadLength(usize),

    /// A character outside `[0-9a-fA-F]` appeared in the field.
    #[error("address contains a non-hex character")]
    BadDigit,
}

/// A 40-bit network address.
///
/// Stored internally as the low 40 bits of a `u64`. The upper 24 bits are
/// always zero — every constructor masks them off.
///
/// # Examples
///
/// ```
/// use plexus_identity::Address;
///
/// let addr: Address = "7f3a90c2d4".parse().unwrap();
/// assert_eq!(addr.to_string(), "7f3a90c2d4");
/// assert!(!addr.is_reserved());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    /// The number of bits that actually carry information.
    pub const BITS: u32 = 40;

    /// Construct from the five-byte wire form (MSB first).
    pub fn from_bytes(bytes: &[u8; ADDRESS_SIZE]) -> Self {
        Self(
            (u64::from(bytes[0]) << 32)
                | (u64::from(bytes[1]) << 24)
                | (u64::from(bytes[2]) << 16)
                | (u64::from(bytes[3]) << 8)
                | u64::from(bytes[4]),
        )
    }

    /// Construct from an integer, keeping only the low 40 bits.
    pub fn from_u64(value: u64) -> Self {
        Self(value & 0xff_ffff_ffff)
    }

    /// The address as an integer in the low 40 bits.
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// The five-byte wire form (MSB first).
    pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
        [
            (self.0 >> 32) as u8,
            (self.0 >> 24) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        ]
    }

    /// True for the all-zero "no address" sentinel.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// True if this address can never belong to a valid identity: zero, or
    /// a leading byte of `0xff`.
    pub fn is_reserved(self) -> bool {
        self.0 == 0 || (self.0 >> 32) as u8 == ADDRESS_RESERVED_PREFIX
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_SIZE * 2 {
            return Err(AddressError::BadLength(s.len()));
        }
        // from_str_radix would accept a leading sign, which is not hex.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::BadDigit);
        }
        let value = u64::from_str_radix(s, 16).map_err(|_| AddressError::BadDigit)?;
        Ok(Self(value))
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> u64 {
        addr.to_u64()
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let arr: [u8; ADDRESS_SIZE] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| D::Error::custom("expected a 5-byte address"))?;
            Ok(Address::from_bytes(&arr))
        }
    }
}
