//! # The Two Proof-of-Work Functions
//!
//! These are the reason an identity is expensive to mint and cheap to
//! check. Both are *memory-hard*: the working set is the defense, not the
//! operation count, because memory bandwidth is the one resource GPUs and
//! ASICs cannot cheaply multiply.
//!
//! **V0** builds a 2 MiB scratch with Salsa20 in a CBC-like chain — block
//! *i* starts as a copy of block *i−1* and is encrypted in place, so the
//! fill cannot be parallelized or seeked into — then folds the whole
//! scratch back into the digest through data-dependent swaps. Acceptance
//! reads the digest's first byte; the candidate address falls out of bytes
//! 59..64.
//!
//! **V1** fills a 768 KiB word array from reduced-round Speck128 with
//! cross-block mixing, then *sorts* it. Sorting is the barrier: there is
//! no way to know where a word lands without materializing the entire
//! array, and the branchy comparisons run poorly on GPUs. A SHA-384 over
//! the sorted array decides acceptance.
//!
//! Scratch buffers are caller-provided so a generation loop can allocate
//! once and hammer thousands of attempts; the V0 scratch is re-zeroed here
//! every call because its encryption chain starts from zero plaintext.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;
use sha2::{Digest, Sha384, Sha512};

use crate::config::{V0_POW_MEMORY, V1_POW_MEMORY_WORDS, V1_POW_MODULUS, V1_SPECK_ROUNDS};
use crate::crypto::speck::Speck128;

/// The V0 memory-hard digest over a public key block.
///
/// The caller decides acceptance (`digest[0] < V0_POW_THRESHOLD`) and
/// address extraction (`digest[59..64]`); this function only computes.
/// `genmem` must be exactly [`V0_POW_MEMORY`] bytes and is clobbered.
pub(crate) fn pow_v0(public_key: &[u8], genmem: &mut [u8]) -> [u8; 64] {
    debug_assert_eq!(genmem.len(), V0_POW_MEMORY);

    let mut digest = [0u8; 64];
    digest.copy_from_slice(&Sha512::digest(public_key));

    // Fill phase. One Salsa20 keystream runs through the whole function;
    // the chain starts from zero plaintext, and every block seeds the next,
    // so byte k cannot be computed without the 64 bytes before it.
    genmem.fill(0);
    let mut cipher = Salsa20::new(
        salsa20::Key::from_slice(&digest[..32]),
        salsa20::Nonce::from_slice(&digest[32..40]),
    );
    cipher.apply_keystream(&mut genmem[..64]);
    for i in (64..V0_POW_MEMORY).step_by(64) {
        genmem.copy_within(i - 64..i, i);
        cipher.apply_keystream(&mut genmem[i..i + 64]);
    }

    // Mix phase. Walk the scratch as 64-bit words, two per step: the first
    // (read in network byte order) picks a digest word, the second picks a
    // scratch word, the two swap raw bytes, and the digest is re-encrypted
    // with the continuing keystream. The index widths — mod 8 and mod the
    // scratch word count — are part of the wire-compatible definition.
    let word_count = V0_POW_MEMORY / 8;
    let mut i = 0;
    while i < word_count {
        let idx1 = (read_word_be(genmem, i) % 8) as usize;
        i += 1;
        let idx2 = (read_word_be(genmem, i) % word_count as u64) as usize;
        i += 1;
        genmem[idx2 * 8..idx2 * 8 + 8].swap_with_slice(&mut digest[idx1 * 8..idx1 * 8 + 8]);
        cipher.apply_keystream(&mut digest);
    }

    digest
}

fn read_word_be(buf: &[u8], word_index: usize) -> u64 {
    let at = word_index * 8;
    let mut word = [0u8; 8];
    word.copy_from_slice(&buf[at..at + 8]);
    u64::from_be_bytes(word)
}

/// The V1 proof-of-work criterion over a compound public block.
///
/// Returns whether the candidate passes. `scratch` must be exactly
/// [`V1_POW_MEMORY_WORDS`] words; its previous contents are irrelevant
/// because every word is written before it is read.
pub(crate) fn pow_v1(input: &[u8], scratch: &mut [u64]) -> bool {
    debug_assert_eq!(scratch.len(), V1_POW_MEMORY_WORDS);

    // Seed the first 64 bytes with SHA-512 of the input, read little-endian.
    // Everything downstream works on u64 words in that orientation, which
    // keeps results identical across host byte orders.
    let seed = Sha512::digest(input);
    for (word, bytes) in scratch[..8].iter_mut().zip(seed.chunks_exact(8)) {
        let mut le = [0u8; 8];
        le.copy_from_slice(bytes);
        *word = u64::from_le_bytes(le);
    }

    // Fill-and-mix: four 128-bit blocks per step, summed into each other so
    // no block can be computed in isolation, encrypted 4-wide, and stored
    // eight words further along.
    let cipher = Speck128::<V1_SPECK_ROUNDS>::from_key_words(scratch[4], scratch[5]);
    let mut i = 0;
    while i < V1_POW_MEMORY_WORDS - 8 {
        let mut blocks = [0u64; 8];
        blocks.copy_from_slice(&scratch[i..i + 8]);
        i += 8;

        blocks[0] = blocks[0].wrapping_add(blocks[2]);
        blocks[2] = blocks[2].wrapping_add(blocks[4]);
        blocks[4] = blocks[4].wrapping_add(blocks[6]);
        blocks[6] = blocks[6].wrapping_add(blocks[1]);

        cipher.encrypt_four(&mut blocks);
        scratch[i..i + 8].copy_from_slice(&blocks);
    }

    // The barrier: ascending sort of the whole array as unsigned words.
    scratch.sort_unstable();

    // Fold the sorted array and the input into a final SHA-384 and take the
    // acceptance decision from its first two words.
    let mut hasher = Sha384::new();
    let mut block = [0u8; 8192];
    for words in scratch.chunks(block.len() / 8) {
        for (slot, word) in block.chunks_exact_mut(8).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }
        hasher.update(&block[..words.len() * 8]);
    }
    hasher.update(input);
    let final_hash = hasher.finalize();

    let mut lo = [0u8; 8];
    lo.copy_from_slice(&final_hash[..8]);
    let mut hi = [0u8; 8];
    hi.copy_from_slice(&final_hash[8..16]);
    u64::from_le_bytes(lo).wrapping_add(u64::from_le_bytes(hi)) % V1_POW_MODULUS == 0
}
