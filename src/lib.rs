// Copyright (c) 2026 Plexus Contributors. MIT License.
// See LICENSE for details.

//! # Plexus Identity
//!
//! Identity, address, and proof-of-work primitives for the Plexus
//! peer-to-peer overlay network.
//!
//! A Plexus identity is a 40-bit address bound to one or two public key
//! pairs by a memory-hard proof-of-work. The work makes addresses costly
//! to mint — so flooding the network with identities is expensive — and
//! binds each address to one specific key set, so nobody can substitute
//! their key under your address. Verification, by contrast, is one hash
//! pass: expensive to forge, cheap to check.
//!
//! ## The pieces
//!
//! - **address** — The 40-bit network address: wire form, text form,
//!   reserved ranges.
//! - **fingerprint** — Address plus SHA-384 of public material; identifies
//!   a peer without the full key blocks.
//! - **crypto** — Byte-oriented wrappers around the underlying curves:
//!   combined Ed25519+X25519 material and NIST P-384.
//! - **identity** — The [`Identity`] type itself: generation, validation,
//!   signing, key agreement, and the wire/text codecs.
//! - **config** — Every consensus-critical size and threshold, in one file.
//!
//! ## Quick start
//!
//! ```no_run
//! use plexus_identity::{Identity, IdentityType};
//!
//! // Takes a few seconds: this is a proof-of-work, not a key generation.
//! let me = Identity::generate(IdentityType::V1);
//! println!("my address: {}", me.address());
//!
//! // The text form round-trips through configs and CLIs. Private material
//! // is only included when explicitly asked for.
//! let public_text = me.to_string();
//! let parsed: Identity = public_text.parse().unwrap();
//! assert_eq!(parsed.address(), me.address());
//! ```
//!
//! ## Design stance
//!
//! 1. Identities are immutable values — generate or parse, then share.
//! 2. Parsing is structural; the expensive proof-of-work recheck is a
//!    separate, explicit [`Identity::locally_validate`] call.
//! 3. Nothing serializes a private key unless the caller says so twice
//!    (holds one *and* passes `include_private = true`).

pub mod address;
pub mod config;
pub mod crypto;
pub mod fingerprint;
pub mod identity;

pub use address::{Address, AddressError};
pub use fingerprint::Fingerprint;
pub use identity::{CompoundPublic, Identity, IdentityError, IdentityType};

/// Crate version, straight from the manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
