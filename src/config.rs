//! # Identity Layer Constants
//!
//! Every size, threshold, and modulus of the identity layer lives here.
//! Most of these are wire-format facts: changing any of them produces
//! identities that the rest of the network will refuse to parse, so treat
//! this file as consensus-critical.

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Network addresses are 40 bits, stored MSB-first on the wire.
pub const ADDRESS_SIZE: usize = 5;

/// Addresses whose leading byte is this value are reserved and never
/// assigned to a real identity. The all-zero address is reserved too.
pub const ADDRESS_RESERVED_PREFIX: u8 = 0xff;

// ---------------------------------------------------------------------------
// C25519 combined key material (Ed25519 + X25519)
// ---------------------------------------------------------------------------

/// Combined public key: Ed25519 verify key (32) followed by the X25519
/// Montgomery point (32).
pub const C25519_PUBLIC_KEY_SIZE: usize = 64;

/// Combined private key: Ed25519 secret seed (32) followed by the X25519
/// secret scalar (32).
pub const C25519_PRIVATE_KEY_SIZE: usize = 64;

/// The combined signature scheme emits the 64-byte Ed25519 signature
/// followed by the first 32 bytes of the SHA-512 message digest.
pub const C25519_SIGNATURE_SIZE: usize = 96;

/// Raw X25519 shared secret length.
pub const C25519_SHARED_SECRET_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// NIST P-384 key material
// ---------------------------------------------------------------------------

/// SEC1 compressed point: one parity byte plus the 48-byte x coordinate.
pub const P384_PUBLIC_KEY_SIZE: usize = 49;

/// P-384 secret scalar.
pub const P384_PRIVATE_KEY_SIZE: usize = 48;

/// Fixed-width ECDSA signature, `r` followed by `s`.
pub const P384_SIGNATURE_SIZE: usize = 96;

/// Raw P-384 ECDH shared secret length (the x coordinate).
pub const P384_SHARED_SECRET_SIZE: usize = 48;

// ---------------------------------------------------------------------------
// V1 compound key material
// ---------------------------------------------------------------------------

/// The V1 compound public block: `nonce(1) ‖ c25519_pub(64) ‖ p384_pub(49)`.
/// This exact byte image is what the V1 proof-of-work and the fingerprint
/// hash consume, so it is kept as a packed array and never rebuilt from
/// parts at hashing time.
pub const COMPOUND_PUBLIC_KEY_SIZE: usize = 1 + C25519_PUBLIC_KEY_SIZE + P384_PUBLIC_KEY_SIZE;

/// The V1 compound private block: `c25519_priv(64) ‖ p384_priv(48)`.
pub const COMPOUND_PRIVATE_KEY_SIZE: usize = C25519_PRIVATE_KEY_SIZE + P384_PRIVATE_KEY_SIZE;

// ---------------------------------------------------------------------------
// Fingerprints, signatures, agreement
// ---------------------------------------------------------------------------

/// Fingerprint hashes are SHA-384 over the canonical public byte image.
pub const FINGERPRINT_HASH_SIZE: usize = 48;

/// Both identity types produce 96-byte signatures. A happy accident, but
/// one the wire format and `sign_into` rely on.
pub const SIGNATURE_SIZE: usize = 96;

/// Key agreement always yields a 48-byte shared secret, whichever curve
/// combination produced it.
pub const AGREED_SECRET_SIZE: usize = 48;

// ---------------------------------------------------------------------------
// Proof-of-work parameters
// ---------------------------------------------------------------------------

/// Scratch size for the V0 memory-hard hash: 2 MiB, filled sequentially in
/// 64-byte blocks. The sequential chain is the point — computing any block
/// requires the one before it.
pub const V0_POW_MEMORY: usize = 2_097_152;

/// A V0 digest is accepted when its first byte is below this threshold,
/// i.e. roughly one attempt in fifteen succeeds.
pub const V0_POW_THRESHOLD: u8 = 17;

/// Scratch size for the V1 proof-of-work, in 64-bit words (768 KiB). The
/// whole array must exist in memory to be sorted, which is the barrier.
pub const V1_POW_MEMORY_WORDS: usize = 98_304;

/// A V1 candidate passes when the wrapping sum of the first two words of
/// the final hash is divisible by this. Sized for one to two seconds of
/// work per identity on 2020-era desktop and server cores.
pub const V1_POW_MODULUS: u64 = 180;

/// Speck128 rounds used by the V1 fill. Reduced from the standard 32; the
/// cipher is a work function here, not a confidentiality boundary.
pub const V1_SPECK_ROUNDS: usize = 24;

// ---------------------------------------------------------------------------
// Serialized sizes
// ---------------------------------------------------------------------------

/// Largest possible binary identity: a V1 with its private block attached.
pub const MARSHAL_SIZE_MAX: usize =
    ADDRESS_SIZE + 1 + COMPOUND_PUBLIC_KEY_SIZE + 1 + COMPOUND_PRIVATE_KEY_SIZE;

/// Longest possible text identity: a V1 with its private block attached
/// (10 hex chars, two separators and a type char, 183 + 180 base32 chars).
pub const TEXT_LENGTH_MAX: usize = 377;
