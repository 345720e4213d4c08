//! Seeded double hashing for [`MembershipFilter`](super::MembershipFilter).
//!
//! Two base hashes are taken from seeded `FxHasher` passes and finalised with
//! a 64-bit mixer (FxHash alone has weak low bits). Bit positions follow
//! `pos_i = (h1 + i·h2) mod m`, so `k` positions cost two hash passes.
//!
//! Everything here is a pure function of the seed: filters built with the
//! same configuration set the same bits in every process.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Seed base shared by every filter unless one is supplied explicitly.
pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

const SECOND_SEED_SALT: u64 = 0xC2B2_AE3D_27D4_EB4F;

/// SplitMix64 finaliser.
#[inline]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[inline]
fn seeded_hash<T: Hash + ?Sized>(item: &T, seed: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    item.hash(&mut hasher);
    mix64(hasher.finish())
}

/// Returns `(h1, h2)` for `item`. `h2` is always odd, so successive
/// positions never collapse onto `h1` when `m` is a power of two.
#[inline]
pub fn hash_pair<T: Hash + ?Sized>(item: &T, seed: u64) -> (u64, u64) {
    let h1 = seeded_hash(item, seed);
    let h2 = seeded_hash(item, mix64(seed ^ SECOND_SEED_SALT)) | 1;
    (h1, h2)
}

/// `i`-th bit position in a filter of `bit_count` bits.
#[inline]
pub fn bit_index(h1: u64, h2: u64, i: u32, bit_count: usize) -> usize {
    let combined = h1.wrapping_add(u64::from(i).wrapping_mul(h2));
    (combined % bit_count as u64) as usize
}
