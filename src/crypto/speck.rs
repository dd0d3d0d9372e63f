//! # Speck128 Block Cipher
//!
//! A minimal Speck128/128 implementation used exclusively as the work
//! function inside the V1 proof-of-work. Speck was picked for that job
//! because its cost per block is nearly uniform across CPU architectures —
//! AES would hand machines with AES-NI an unfair minting advantage.
//!
//! This is *not* a general-purpose cipher for this codebase and is
//! deliberately not exported: the round count is a tunable (the PoW runs a
//! reduced 24 rounds), there is no decryption path because nothing ever
//! decrypts, and the key schedule is seeded from two raw 64-bit words
//! rather than a byte string. No registry crate offers that combination,
//! which is the one reason this file exists instead of a dependency line.

/// Speck128 with a compile-time round count.
///
/// `R` defaults to the standard 32 rounds, which is what the known-answer
/// test exercises; the proof-of-work instantiates `Speck128<24>`.
pub(crate) struct Speck128<const R: usize = 32> {
    round_keys: [u64; R],
}

impl<const R: usize> Speck128<R> {
    /// Build the key schedule from the two 64-bit halves of the key.
    ///
    /// `x` is the high word, `y` the low word, matching a big-endian
    /// reading of the 128-bit key. The schedule is the Speck round
    /// function applied to the key words with the round index as the
    /// round key.
    pub fn from_key_words(mut x: u64, mut y: u64) -> Self {
        let mut round_keys = [0u64; R];
        round_keys[0] = y;
        for (i, slot) in round_keys.iter_mut().enumerate().skip(1) {
            x = x.rotate_right(8).wrapping_add(y) ^ (i as u64 - 1);
            y = y.rotate_left(3) ^ x;
            *slot = y;
        }
        Self { round_keys }
    }

    /// Encrypt one 128-bit block held as two 64-bit words.
    pub fn encrypt_block(&self, x: &mut u64, y: &mut u64) {
        for &k in &self.round_keys {
            *x = x.rotate_right(8).wrapping_add(*y) ^ k;
            *y = y.rotate_left(3) ^ *x;
        }
    }

    /// Encrypt four independent blocks, laid out `[x0, y0, x1, y1, ...]`.
    ///
    /// Interleaving the four block computations keeps all of them in
    /// registers and lets the CPU overlap the dependency chains; the V1
    /// fill loop encrypts in groups of four for exactly this reason.
    pub fn encrypt_four(&self, b: &mut [u64; 8]) {
        for &k in &self.round_keys {
            b[0] = b[0].rotate_right(8).wrapping_add(b[1]) ^ k;
            b[2] = b[2].rotate_right(8).wrapping_add(b[3]) ^ k;
            b[4] = b[4].rotate_right(8).wrapping_add(b[5]) ^ k;
            b[6] = b[6].rotate_right(8).wrapping_add(b[7]) ^ k;
            b[1] = b[1].rotate_left(3) ^ b[0];
            b[3] = b[3].rotate_left(3) ^ b[2];
            b[5] = b[5].rotate_left(3) ^ b[4];
            b[7] = b[7].rotate_left(3) ^ b[6];
        }
    }
}
