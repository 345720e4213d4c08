//! Packed bit array over 64-bit words.
//!
//! Backing store for [`MembershipFilter`](crate::filter::MembershipFilter).
//! Bit `i` lives in word `i / 64` at position `i % 64`. Bits past `len` in the
//! last word are always zero, so `count_ones` and word-wise OR/AND stay exact.

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    words: Vec<u64>,
    len: usize,
}

impl BitArray {
    /// Creates `len` cleared bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Rebuilds an array from raw words, rejecting a word count that does not
    /// match `len` or stray bits beyond `len`.
    pub fn from_words(words: Vec<u64>, len: usize) -> Result<Self, ConfigError> {
        if words.len() != len.div_ceil(64) {
            return Err(ConfigError::new(format!(
                "bit array of {len} bits needs {} words, got {}",
                len.div_ceil(64),
                words.len()
            )));
        }
        let tail_bits = len % 64;
        if tail_bits != 0 {
            let last = words[words.len() - 1];
            if last >> tail_bits != 0 {
                return Err(ConfigError::new("bit array has bits set beyond its length"));
            }
        }
        Ok(Self { words, len })
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Sets bit `idx`; returns `true` if it was previously clear.
    #[inline]
    pub fn set(&mut self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        let mask = 1u64 << (idx % 64);
        let word = &mut self.words[idx / 64];
        let was_clear = *word & mask == 0;
        *word |= mask;
        was_clear
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Word-wise OR. Both arrays must have the same length.
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len, other.len);
        Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a | b)
                .collect(),
            len: self.len,
        }
    }

    /// Word-wise AND. Both arrays must have the same length.
    pub fn intersection(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len, other.len);
        Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
            len: self.len,
        }
    }

    /// Heap bytes held by the word vector.
    pub fn approx_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
    }
}
