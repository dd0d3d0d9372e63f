//! Identity wire and text codecs.
//!
//! The binary form is the consensus format every peer speaks:
//!
//! ```text
//! address[5] | type[1] | public_block | priv_len[1] | [private_block]
//! ```
//!
//! Big-endian, no padding, no outer length prefix; `priv_len` is 0 or the
//! exact private block size for the type. The text form is what lands in
//! config files and CLI output: `address:type:public[:private]`, hex for
//! V0 fields and unpadded lowercase base32 for the larger V1 blocks.
//!
//! Parsing is *structural* — lengths, encodings, and the V1
//! address-vs-fingerprint binding (the one integrity check that costs a
//! hash instead of a proof-of-work). Callers that need the full guarantee
//! run [`Identity::locally_validate`] afterwards.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::config::{
    ADDRESS_SIZE, C25519_PRIVATE_KEY_SIZE, C25519_PUBLIC_KEY_SIZE, COMPOUND_PRIVATE_KEY_SIZE,
    COMPOUND_PUBLIC_KEY_SIZE, MARSHAL_SIZE_MAX, TEXT_LENGTH_MAX,
};
use crate::fingerprint::Fingerprint;
use crate::identity::material::{CompoundPrivate, CompoundPublic};
use crate::identity::{sha384_one, Identity, IdentityError, IdentityType, Material};

/// The base32 dialect of the text form: RFC 4648 alphabet, lowercase, no
/// padding. Changing this breaks every V1 identity string in the wild.
const TEXT_BASE32: Alphabet = Alphabet::Rfc4648Lower { padding: false };

impl Identity {
    /// Serialize to the binary wire form.
    ///
    /// The private block is included only when `include_private` is set
    /// *and* this identity holds one; otherwise the trailing length byte
    /// is 0. Exporting a private key is a deliberate act — nothing in the
    /// serde path or `Display` will ever do it for you.
    pub fn marshal(&self, include_private: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(MARSHAL_SIZE_MAX);
        out.extend_from_slice(&self.address.to_bytes());
        match &self.material {
            Material::V0 { public, private } => {
                out.push(IdentityType::V0.as_byte());
                out.extend_from_slice(public);
                match private {
                    Some(private) if include_private => {
                        out.push(C25519_PRIVATE_KEY_SIZE as u8);
                        out.extend_from_slice(private);
                    }
                    _ => out.push(0),
                }
            }
            Material::V1 { public, private } => {
                out.push(IdentityType::V1.as_byte());
                out.extend_from_slice(public.as_bytes());
                match private {
                    Some(private) if include_private => {
                        out.push(COMPOUND_PRIVATE_KEY_SIZE as u8);
                        out.extend_from_slice(private.as_bytes());
                    }
                    _ => out.push(0),
                }
            }
        }
        out
    }

    /// Parse an identity from the front of `data`, returning it together
    /// with the number of bytes consumed. Trailing bytes are left for the
    /// caller — identities are routinely embedded in larger messages.
    pub fn unmarshal(data: &[u8]) -> Result<(Identity, usize), IdentityError> {
        if data.len() < ADDRESS_SIZE + 1 {
            return Err(IdentityError::Truncated);
        }
        let mut raw = [0u8; ADDRESS_SIZE];
        raw.copy_from_slice(&data[..ADDRESS_SIZE]);
        let address = Address::from_bytes(&raw);

        let type_byte = data[ADDRESS_SIZE];
        match IdentityType::from_byte(type_byte) {
            Some(IdentityType::V0) => Self::unmarshal_v0(address, data),
            Some(IdentityType::V1) => Self::unmarshal_v1(address, data),
            None => Err(IdentityError::UnknownType(type_byte)),
        }
    }

    fn unmarshal_v0(address: Address, data: &[u8]) -> Result<(Identity, usize), IdentityError> {
        let public_end = ADDRESS_SIZE + 1 + C25519_PUBLIC_KEY_SIZE;
        if data.len() < public_end + 1 {
            return Err(IdentityError::Truncated);
        }
        let mut public = [0u8; C25519_PUBLIC_KEY_SIZE];
        public.copy_from_slice(&data[ADDRESS_SIZE + 1..public_end]);

        let priv_len = data[public_end];
        let (private, consumed) = match priv_len as usize {
            0 => (None, public_end + 1),
            C25519_PRIVATE_KEY_SIZE => {
                let end = public_end + 1 + C25519_PRIVATE_KEY_SIZE;
                if data.len() < end {
                    return Err(IdentityError::Truncated);
                }
                let mut private = [0u8; C25519_PRIVATE_KEY_SIZE];
                private.copy_from_slice(&data[public_end + 1..end]);
                (Some(private), end)
            }
            _ => {
                return Err(IdentityError::IllegalPrivateLength {
                    kind: IdentityType::V0,
                    got: priv_len,
                })
            }
        };

        let fingerprint = Fingerprint {
            address,
            hash: sha384_one(&public),
        };
        Ok((
            Identity {
                material: Material::V0 { public, private },
                address,
                fingerprint,
            },
            consumed,
        ))
    }

    fn unmarshal_v1(address: Address, data: &[u8]) -> Result<(Identity, usize), IdentityError> {
        let public_end = ADDRESS_SIZE + 1 + COMPOUND_PUBLIC_KEY_SIZE;
        if data.len() < public_end + 1 {
            return Err(IdentityError::Truncated);
        }
        let public = CompoundPublic::from_slice(&data[ADDRESS_SIZE + 1..public_end])
            .ok_or(IdentityError::Truncated)?;

        // V1 is the self-checking type: the address must be the leading
        // bytes of the public block's hash, so a transposed or spoofed
        // address dies here without any proof-of-work.
        let hash = sha384_one(public.as_bytes());
        if hash[..ADDRESS_SIZE] != address.to_bytes() {
            return Err(IdentityError::AddressMismatch);
        }

        let priv_len = data[public_end];
        let (private, consumed) = match priv_len as usize {
            0 => (None, public_end + 1),
            COMPOUND_PRIVATE_KEY_SIZE => {
                let end = public_end + 1 + COMPOUND_PRIVATE_KEY_SIZE;
                if data.len() < end {
                    return Err(IdentityError::Truncated);
                }
                let private = CompoundPrivate::from_slice(&data[public_end + 1..end])
                    .ok_or(IdentityError::Truncated)?;
                (Some(private), end)
            }
            _ => {
                return Err(IdentityError::IllegalPrivateLength {
                    kind: IdentityType::V1,
                    got: priv_len,
                })
            }
        };

        let fingerprint = Fingerprint { address, hash };
        Ok((
            Identity {
                material: Material::V1 { public, private },
                address,
                fingerprint,
            },
            consumed,
        ))
    }

    /// Render the text form, `address:type:public[:private]`.
    ///
    /// As with [`marshal`](Self::marshal), the private field appears only
    /// on request and only when held.
    pub fn to_text(&self, include_private: bool) -> String {
        let mut out = String::with_capacity(TEXT_LENGTH_MAX);
        out.push_str(&self.address.to_string());
        match &self.material {
            Material::V0 { public, private } => {
                out.push_str(":0:");
                out.push_str(&hex::encode(public));
                if let (true, Some(private)) = (include_private, private) {
                    out.push(':');
                    out.push_str(&hex::encode(private));
                }
            }
            Material::V1 { public, private } => {
                out.push_str(":1:");
                out.push_str(&base32::encode(TEXT_BASE32, public.as_bytes()));
                if let (true, Some(private)) = (include_private, private) {
                    out.push(':');
                    out.push_str(&base32::encode(TEXT_BASE32, private.as_bytes()));
                }
            }
        }
        out
    }
}

impl fmt::Display for Identity {
    /// The public text form. Private material requires an explicit
    /// [`to_text(true)`](Identity::to_text).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(false))
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 3 {
            return Err(IdentityError::MalformedText(
                "expected address:type:public[:private]",
            ));
        }
        if fields.len() > 4 {
            return Err(IdentityError::MalformedText("too many fields"));
        }

        let address: Address = fields[0].parse()?;
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress);
        }

        let kind = match fields[1] {
            "0" => IdentityType::V0,
            "1" => IdentityType::V1,
            other => return Err(IdentityError::UnknownTypeToken(other.to_string())),
        };

        // A trailing empty field ("addr:0:pub:") means "no private half";
        // a non-empty one must decode to exactly the right length.
        let private_field = match fields.get(3) {
            Some(f) if !f.is_empty() => Some(*f),
            _ => None,
        };

        match kind {
            IdentityType::V0 => {
                let public_bytes = hex::decode(fields[2])
                    .map_err(|_| IdentityError::MalformedText("public field is not valid hex"))?;
                let public: [u8; C25519_PUBLIC_KEY_SIZE] = public_bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| IdentityError::MalformedText("wrong public key length"))?;

                let private = match private_field {
                    None => None,
                    Some(field) => {
                        let bytes = hex::decode(field).map_err(|_| {
                            IdentityError::MalformedText("private field is not valid hex")
                        })?;
                        let private: [u8; C25519_PRIVATE_KEY_SIZE] =
                            bytes.as_slice().try_into().map_err(|_| {
                                IdentityError::MalformedText("wrong private key length")
                            })?;
                        Some(private)
                    }
                };

                let fingerprint = Fingerprint {
                    address,
                    hash: sha384_one(&public),
                };
                Ok(Identity {
                    material: Material::V0 { public, private },
                    address,
                    fingerprint,
                })
            }
            IdentityType::V1 => {
                let public_bytes = base32::decode(TEXT_BASE32, fields[2]).ok_or(
                    IdentityError::MalformedText("public field is not valid base32"),
                )?;
                let public = CompoundPublic::from_slice(&public_bytes)
                    .ok_or(IdentityError::MalformedText("wrong public key length"))?;

                let hash = sha384_one(public.as_bytes());
                if hash[..ADDRESS_SIZE] != address.to_bytes() {
                    return Err(IdentityError::AddressMismatch);
                }

                let private = match private_field {
                    None => None,
                    Some(field) => {
                        let bytes = base32::decode(TEXT_BASE32, field).ok_or(
                            IdentityError::MalformedText("private field is not valid base32"),
                        )?;
                        Some(CompoundPrivate::from_slice(&bytes).ok_or(
                            IdentityError::MalformedText("wrong private key length"),
                        )?)
                    }
                };

                let fingerprint = Fingerprint { address, hash };
                Ok(Identity {
                    material: Material::V1 { public, private },
                    address,
                    fingerprint,
                })
            }
        }
    }
}

impl Serialize for Identity {
    /// Public material only: the text form for human-readable formats, the
    /// wire form for binary ones. Private halves never ride along.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_text(false))
        } else {
            serializer.serialize_bytes(&self.marshal(false))
        }
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let (identity, consumed) = Identity::unmarshal(&bytes).map_err(D::Error::custom)?;
            if consumed != bytes.len() {
                return Err(D::Error::custom("trailing bytes after identity"));
            }
            Ok(identity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::test_support::{public_only, v0_without_pow, v1_without_pow};

    #[test]
    fn marshal_sizes_per_type_and_privacy() {
        let v0 = v0_without_pow();
        let v1 = v1_without_pow();
        assert_eq!(v0.marshal(false).len(), 71);
        assert_eq!(v0.marshal(true).len(), 135);
        assert_eq!(v1.marshal(false).len(), 121);
        assert_eq!(v1.marshal(true).len(), 233);
    }

    #[test]
    fn v1_public_only_marshal_ends_with_zero_length_byte() {
        let v1 = v1_without_pow();
        let blob = v1.marshal(false);
        assert_eq!(blob.len(), 121);
        assert_eq!(blob[120], 0);
    }

    #[test]
    fn binary_roundtrip_with_and_without_private() {
        for id in [v0_without_pow(), v1_without_pow()] {
            let (with, consumed) = Identity::unmarshal(&id.marshal(true)).unwrap();
            assert_eq!(consumed, id.marshal(true).len());
            assert_eq!(with, id);

            let (without, _) = Identity::unmarshal(&id.marshal(false)).unwrap();
            assert_eq!(without, public_only(&id));
            assert_eq!(without.address(), id.address());
            assert_eq!(without.fingerprint(), id.fingerprint());
            assert!(!without.has_private());
        }
    }

    #[test]
    fn unmarshal_reports_consumed_and_ignores_trailing_bytes() {
        let id = v1_without_pow();
        let mut blob = id.marshal(true);
        let len = blob.len();
        blob.extend_from_slice(b"next message");
        let (parsed, consumed) = Identity::unmarshal(&blob).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(parsed, id);
    }

    #[test]
    fn unmarshal_rejects_unknown_type() {
        let mut blob = v0_without_pow().marshal(false);
        blob[5] = 2;
        assert!(matches!(
            Identity::unmarshal(&blob),
            Err(IdentityError::UnknownType(2))
        ));
    }

    #[test]
    fn unmarshal_rejects_every_truncation() {
        for id in [v0_without_pow(), v1_without_pow()] {
            let blob = id.marshal(true);
            for cut in 0..blob.len() {
                assert!(
                    Identity::unmarshal(&blob[..cut]).is_err(),
                    "truncation at {cut} parsed"
                );
            }
        }
    }

    #[test]
    fn unmarshal_rejects_illegal_private_length() {
        let mut blob = v0_without_pow().marshal(false);
        blob[70] = 63;
        assert!(matches!(
            Identity::unmarshal(&blob),
            Err(IdentityError::IllegalPrivateLength { got: 63, .. })
        ));
    }

    #[test]
    fn unmarshal_rejects_v1_address_spoofing() {
        let mut blob = v1_without_pow().marshal(false);
        blob[0] ^= 0x01;
        assert!(matches!(
            Identity::unmarshal(&blob),
            Err(IdentityError::AddressMismatch)
        ));
    }

    #[test]
    fn v0_text_form_has_four_hex_fields_with_private() {
        let id = v0_without_pow();
        let text = id.to_text(true);
        let fields: Vec<&str> = text.split(':').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].len(), 10);
        assert_eq!(fields[1], "0");
        assert_eq!(fields[2].len(), 128);
        assert_eq!(fields[3].len(), 128);
    }

    #[test]
    fn text_roundtrip_with_and_without_private() {
        for id in [v0_without_pow(), v1_without_pow()] {
            let with: Identity = id.to_text(true).parse().unwrap();
            assert_eq!(with, id);
            let without: Identity = id.to_text(false).parse().unwrap();
            assert_eq!(without, public_only(&id));
        }
    }

    #[test]
    fn display_is_the_public_text_form() {
        let id = v0_without_pow();
        assert_eq!(id.to_string(), id.to_text(false));
        // Display must never include the private field, even though the
        // identity holds one.
        assert_eq!(id.to_string().split(':').count(), 3);
    }

    #[test]
    fn empty_private_field_parses_as_public_only() {
        let id = v0_without_pow();
        let text = format!("{}:", id.to_text(false));
        let parsed: Identity = text.parse().unwrap();
        assert!(!parsed.has_private());
        assert_eq!(parsed, public_only(&id));
    }

    #[test]
    fn text_rejects_field_count_errors() {
        let id = v0_without_pow();
        assert!(matches!(
            "abcdef0123:0".parse::<Identity>(),
            Err(IdentityError::MalformedText(_))
        ));
        let five = format!("{}:extra", id.to_text(true));
        assert!(matches!(
            five.parse::<Identity>(),
            Err(IdentityError::MalformedText(_))
        ));
    }

    #[test]
    fn text_rejects_bad_address_and_reserved_address() {
        let id = v0_without_pow();
        let tail = id.to_text(false);
        let tail = tail.split_once(':').map(|(_, rest)| rest.to_string()).unwrap();
        assert!(matches!(
            format!("xyz:{tail}").parse::<Identity>(),
            Err(IdentityError::Address(_))
        ));
        assert!(matches!(
            format!("0000000000:{tail}").parse::<Identity>(),
            Err(IdentityError::ReservedAddress)
        ));
        assert!(matches!(
            format!("ff00000001:{tail}").parse::<Identity>(),
            Err(IdentityError::ReservedAddress)
        ));
    }

    #[test]
    fn text_rejects_unknown_type_token() {
        let err = "abcdef0123:2:deadbeef".parse::<Identity>().unwrap_err();
        assert!(matches!(err, IdentityError::UnknownTypeToken(t) if t == "2"));
    }

    #[test]
    fn text_rejects_wrong_lengths_and_bad_encodings() {
        // 63-byte public key in hex.
        let short_pub = format!("abcdef0123:0:{}", "ab".repeat(63));
        assert!(short_pub.parse::<Identity>().is_err());
        // Non-hex public key.
        let bad_hex = format!("abcdef0123:0:{}", "zz".repeat(64));
        assert!(bad_hex.parse::<Identity>().is_err());
        // Valid V0 public but short private.
        let id = v0_without_pow();
        let short_priv = format!("{}:{}", id.to_text(false), "ab".repeat(63));
        assert!(short_priv.parse::<Identity>().is_err());
        // '1' and '8' are outside the base32 alphabet.
        let bad_b32 = format!("abcdef0123:1:{}", "18".repeat(91));
        assert!(bad_b32.parse::<Identity>().is_err());
    }

    #[test]
    fn text_rejects_v1_address_spoofing() {
        let id = v1_without_pow();
        let text = id.to_text(false);
        let (addr, rest) = text.split_once(':').unwrap();
        let mut spoofed: Vec<char> = addr.chars().collect();
        spoofed[9] = if spoofed[9] == '0' { '1' } else { '0' };
        let spoofed: String = spoofed.into_iter().collect();
        assert!(matches!(
            format!("{spoofed}:{rest}").parse::<Identity>(),
            Err(IdentityError::AddressMismatch)
        ));
    }

    #[test]
    fn serde_json_is_the_public_text_form() {
        let id = v1_without_pow();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_text(false)));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, public_only(&id));
        assert!(!back.has_private());
    }

    #[test]
    fn random_blobs_do_not_parse_as_v1() {
        // A V1 blob needs its address to match the public hash; random
        // bytes hit that with probability 2^-40.
        let mut blob = v1_without_pow().marshal(false);
        for byte in blob.iter_mut().skip(6).take(114) {
            *byte = byte.wrapping_mul(31).wrapping_add(7);
        }
        assert!(Identity::unmarshal(&blob).is_err());
    }
}
