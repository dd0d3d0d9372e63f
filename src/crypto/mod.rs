//! # Cryptographic Primitives for the Identity Layer
//!
//! Thin, byte-oriented wrappers over audited implementations — nothing in
//! here invents cryptography. The wrappers exist so the identity layer can
//! deal exclusively in the packed byte blocks that get hashed, marshalled,
//! and proof-of-work'd, instead of threading library key types through
//! every code path.
//!
//! - [`c25519`] — the combined Ed25519 + X25519 material every identity
//!   carries (`ed25519-dalek`, `x25519-dalek`).
//! - [`p384`] — the NIST curve pair V1 identities add on top (`p384`).
//! - `speck` — a reduced-round Speck128 used only as the V1 proof-of-work
//!   work function; crate-private on purpose.

pub mod c25519;
pub mod p384;
pub(crate) mod speck;
