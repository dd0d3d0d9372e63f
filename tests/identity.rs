//! End-to-end tests for the identity layer.
//!
//! Everything here works against honestly generated identities — real
//! proof-of-work, real curves — and exercises the full lifecycle: generate,
//! validate, serialize both ways, sign, verify, and agree.
//!
//! Generation deliberately costs seconds per identity, so each type is
//! generated once per test process and shared. The tests only ever read
//! from the shared identities (they are immutable values), so sharing is
//! safe and ordering-independent.

use std::sync::OnceLock;

use plexus_identity::{Identity, IdentityError, IdentityType};

// ---------------------------------------------------------------------------
// Shared fixtures
// ---------------------------------------------------------------------------

/// A generated V0 identity, minted once per process.
fn v0() -> &'static Identity {
    static ID: OnceLock<Identity> = OnceLock::new();
    ID.get_or_init(|| Identity::generate(IdentityType::V0))
}

/// A generated V1 identity, minted once per process.
fn v1() -> &'static Identity {
    static ID: OnceLock<Identity> = OnceLock::new();
    ID.get_or_init(|| Identity::generate(IdentityType::V1))
}

/// A second V1 identity, for pairwise agreement tests.
fn v1_peer() -> &'static Identity {
    static ID: OnceLock<Identity> = OnceLock::new();
    ID.get_or_init(|| Identity::generate(IdentityType::V1))
}

/// The public-only rendition of an identity, via the wire form.
fn public_half(id: &Identity) -> Identity {
    let (parsed, _) = Identity::unmarshal(&id.marshal(false)).expect("own marshal must parse");
    parsed
}

// ---------------------------------------------------------------------------
// 1. Generation and local validation
// ---------------------------------------------------------------------------

#[test]
fn generated_v0_validates() {
    let id = v0();
    assert_eq!(id.identity_type(), IdentityType::V0);
    assert!(id.has_private());
    assert!(id.locally_validate());
}

#[test]
fn generated_v1_validates() {
    let id = v1();
    assert_eq!(id.identity_type(), IdentityType::V1);
    assert!(id.has_private());
    assert!(id.locally_validate());
}

#[test]
fn generated_addresses_are_usable() {
    for id in [v0(), v1()] {
        assert!(!id.address().is_reserved());
        assert!(!id.address().is_zero());
        assert!(!id.is_nil());
        assert_eq!(id.fingerprint().address, id.address());
    }
}

#[test]
fn v0_validation_tracks_the_public_key() {
    // Flip one public key byte on the wire and re-parse. V0 has no
    // structural address check, so the blob still parses — but the
    // proof-of-work recheck must refuse it.
    let mut blob = v0().marshal(false);
    blob[6] ^= 0x01;
    let (mutated, _) = Identity::unmarshal(&blob).expect("v0 blob parses structurally");
    assert!(!mutated.locally_validate());
}

#[test]
fn v1_nonce_mutation_is_rejected_at_parse() {
    // The nonce is inside the hashed image, so flipping it breaks the
    // address-to-fingerprint binding before validation even starts.
    let mut blob = v1().marshal(false);
    blob[6] = blob[6].wrapping_add(1); // first public byte = the nonce
    assert!(matches!(
        Identity::unmarshal(&blob),
        Err(IdentityError::AddressMismatch)
    ));
}

// ---------------------------------------------------------------------------
// 2. Serialization round-trips
// ---------------------------------------------------------------------------

#[test]
fn binary_roundtrip_preserves_everything() {
    for id in [v0(), v1()] {
        let blob = id.marshal(true);
        let (back, consumed) = Identity::unmarshal(&blob).unwrap();
        assert_eq!(consumed, blob.len());
        assert_eq!(&back, id);
        assert_eq!(back.hash_with_private(), id.hash_with_private());
    }
}

#[test]
fn text_roundtrip_preserves_everything() {
    for id in [v0(), v1()] {
        let back: Identity = id.to_text(true).parse().unwrap();
        assert_eq!(&back, id);
        let public: Identity = id.to_string().parse().unwrap();
        assert_eq!(public.address(), id.address());
        assert_eq!(public.fingerprint(), id.fingerprint());
        assert!(!public.has_private());
    }
}

#[test]
fn stripping_private_keeps_the_public_identity_intact() {
    for id in [v0(), v1()] {
        let public = public_half(id);
        assert!(!public.has_private());
        assert_eq!(public.address(), id.address());
        assert_eq!(public.fingerprint(), id.fingerprint());
        assert_eq!(public.public_key_bytes(), id.public_key_bytes());
        // The stripped identity still validates: validation needs only
        // public material.
        assert!(public.locally_validate());
        // And its zero private hash marks the missing half.
        assert_eq!(public.hash_with_private(), [0u8; 48]);
    }
}

#[test]
fn serde_json_carries_the_public_identity() {
    let id = v1();
    let json = serde_json::to_string(id).unwrap();
    let back: Identity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, public_half(id));
}

// ---------------------------------------------------------------------------
// 3. Signatures
// ---------------------------------------------------------------------------

#[test]
fn signatures_verify_and_tampering_fails() {
    let message = b"route announcement: 7 hops";
    for id in [v0(), v1()] {
        let signature = id.sign(message).unwrap();
        assert!(id.verify(message, &signature));
        assert!(!id.verify(b"route announcement: 8 hops", &signature));

        let mut bad = signature;
        bad[40] ^= 0x01;
        assert!(!id.verify(message, &bad));
    }
}

#[test]
fn a_parsed_public_identity_verifies_signatures() {
    let message = b"signed before shipping";
    for id in [v0(), v1()] {
        let signature = id.sign(message).unwrap();
        let public = public_half(id);
        assert!(public.verify(message, &signature));
        assert!(matches!(
            public.sign(message),
            Err(IdentityError::MissingPrivateKey)
        ));
    }
}

// ---------------------------------------------------------------------------
// 4. Key agreement
// ---------------------------------------------------------------------------

#[test]
fn v0_v1_agreement_is_symmetric() {
    // Each side only sees the peer's public half, as on a real wire.
    let ours = v0().agree(&public_half(v1())).unwrap();
    let theirs = v1().agree(&public_half(v0())).unwrap();
    assert_eq!(ours, theirs);
    assert_eq!(ours.len(), 48);
}

#[test]
fn v1_v1_agreement_is_symmetric() {
    let ours = v1().agree(&public_half(v1_peer())).unwrap();
    let theirs = v1_peer().agree(&public_half(v1())).unwrap();
    assert_eq!(ours, theirs);
}

#[test]
fn distinct_peers_produce_distinct_secrets() {
    let with_v0 = v1().agree(v0()).unwrap();
    let with_peer = v1().agree(v1_peer()).unwrap();
    assert_ne!(with_v0, with_peer);
}

// ---------------------------------------------------------------------------
// 5. Parser robustness
// ---------------------------------------------------------------------------

#[test]
fn arbitrary_blobs_never_yield_a_valid_identity() {
    // Deterministic xorshift noise; no RNG dependency needed for chaff.
    let mut state = 0x9e3779b97f4a7c15u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for round in 0..100 {
        let len = (next() % 256) as usize;
        let blob: Vec<u8> = (0..len).map(|_| next() as u8).collect();
        match Identity::unmarshal(&blob) {
            Err(_) => {}
            Ok((parsed, _)) => {
                // Structurally parseable noise (a lucky V0-shaped blob)
                // must still fail the proof-of-work recheck.
                assert!(
                    !parsed.locally_validate(),
                    "random blob validated in round {round}"
                );
            }
        }
    }
}

#[test]
fn garbage_text_never_parses() {
    for text in [
        "",
        ":::",
        "not an identity",
        "abcdef0123",
        "abcdef0123:0:",
        "abcdef0123:1:tooshort",
        "ffffffffff:0:00",
    ] {
        assert!(text.parse::<Identity>().is_err(), "{text:?} parsed");
    }
}
