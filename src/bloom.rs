//! Module implement the optional bloom filter embedded in store metadata.
//!
//! Sized from the expected element count and a target false-positive rate;
//! bits live in 64-bit words so the filter serializes straight into the
//! metadata header. Readers consult the filter before probing slots.

use std::convert::TryFrom;

use crate::{
    hash::{murmur3, BLOOM_SEED},
    Error, Result,
};

/// Approximate membership filter over serialized keys.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    bit_size: u64,
    hashes: u32,
    words: Vec<u64>,
}

impl BloomFilter {
    /// Size a fresh filter for `expected` elements at false-positive rate
    /// `error_factor`.
    pub fn new(expected: u64, error_factor: f64) -> Result<BloomFilter> {
        if !(error_factor > 0.0 && error_factor < 1.0) {
            return err_at!(InvalidInput, msg: "error factor {}", error_factor);
        }
        let n = expected.max(1) as f64;

        let m = (-(n * error_factor.ln()) / (2.0_f64.ln().powi(2))).ceil();
        let bit_size = (m as u64).max(64);
        let hashes = (((bit_size as f64) / n) * 2.0_f64.ln()).round().max(1.0);

        Ok(BloomFilter {
            bit_size,
            hashes: hashes as u32,
            words: vec![0_u64; Self::words_for(bit_size)],
        })
    }

    /// Rebuild a filter from its persisted parts.
    pub fn from_parts(bit_size: u64, hashes: u32, words: Vec<u64>) -> Result<BloomFilter> {
        if words.len() != Self::words_for(bit_size) || hashes == 0 {
            return err_at!(
                Corruption, msg: "bloom {} bits {} words {} hashes",
                bit_size, words.len(), hashes
            );
        }
        Ok(BloomFilter { bit_size, hashes, words })
    }

    fn words_for(bit_size: u64) -> usize {
        usize::try_from((bit_size + 63) / 64).unwrap()
    }

    pub fn add(&mut self, bytes: &[u8]) {
        for i in 0..self.hashes {
            let bit = self.bit_for(bytes, i);
            self.words[(bit / 64) as usize] |= 1 << (bit % 64);
        }
    }

    pub fn might_contain(&self, bytes: &[u8]) -> bool {
        for i in 0..self.hashes {
            let bit = self.bit_for(bytes, i);
            if self.words[(bit / 64) as usize] & (1 << (bit % 64)) == 0 {
                return false;
            }
        }
        true
    }

    fn bit_for(&self, bytes: &[u8], i: u32) -> u64 {
        let h = murmur3(bytes, BLOOM_SEED.wrapping_add(i));
        ((h as i32).unsigned_abs() as u64) % self.bit_size
    }

    pub fn bit_size(&self) -> u64 {
        self.bit_size
    }

    pub fn hashes(&self) -> u32 {
        self.hashes
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }
}

#[cfg(test)]
#[path = "bloom_test.rs"]
mod bloom_test;
