//! Module implement 32-bit Murmur3, the store's only hash.
//!
//! The index layout is a function of the hash values, so the exact variant
//! is pinned: x86 32-bit, little-endian block reads, the canonical
//! finalization mix. Outputs are stable across runs, platforms and
//! implementations.

/// Seed used when probing and building the slot indexes.
pub const KEY_SEED: u32 = 42;

/// Base seed for the bloom filter's hash functions; function `i` hashes
/// with seed `BLOOM_SEED + i`.
pub const BLOOM_SEED: u32 = 104_729;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const R1: u32 = 15;
const R2: u32 = 13;
const M: u32 = 5;
const N: u32 = 0xe654_6b64;

/// Hash `bytes` with `seed`, returning the raw 32-bit digest.
pub fn murmur3(bytes: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= scramble(k);
        h = h.rotate_left(R2);
        h = h.wrapping_mul(M).wrapping_add(N);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0_u32;
        for (i, byte) in tail.iter().enumerate() {
            k |= (*byte as u32) << (8 * i);
        }
        h ^= scramble(k);
    }

    h ^= bytes.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

#[inline]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(R1);
    k.wrapping_mul(C2)
}

/// Digest folded to a non-negative slot index base, treating the raw
/// digest as signed and taking its magnitude.
#[inline]
pub fn murmur3_positive(bytes: &[u8], seed: u32) -> u64 {
    (murmur3(bytes, seed) as i32).unsigned_abs() as u64
}

#[cfg(test)]
#[path = "hash_test.rs"]
mod hash_test;
