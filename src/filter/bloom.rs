//! # Bloom Membership Filter
//!
//! Probabilistic set membership with no false negatives and a tunable
//! false-positive rate.
//!
//! ## Sizing
//!
//! For `n` expected elements at target false-positive rate `p`:
//!
//! ```text
//!   m = ceil(-n · ln(p) / (ln 2)²)      bits
//!   k = ceil((m / n) · ln 2)            hash functions (unless overridden)
//!
//!   estimated FPR after n' insertions = (1 − e^(−k·n'/m))^k
//! ```
//!
//! ## Layout
//!
//! ```text
//!   item ──► hash_pair(item, seed) ──► (h1, h2)
//!                                        │
//!            pos_i = (h1 + i·h2) mod m ◄──┘   for i in 0..k
//!
//!   BitArray: [u64][u64][u64] ... [u64]   (m bits, tail bits always zero)
//! ```
//!
//! ## Operations
//!
//! | Operation        | Time   | Notes                                   |
//! |------------------|--------|-----------------------------------------|
//! | `add`            | O(k)   | sets k bits                             |
//! | `contains`       | O(k)   | stops at the first clear bit            |
//! | `union`          | O(m)   | word-wise OR, new filter                |
//! | `intersection`   | O(m)   | word-wise AND, new filter               |
//! | `fill_ratio`     | O(m)   | popcount over words                     |
//! | `resize`         | O(m')  | lossy: bits are cleared                 |
//!
//! ## Resizing
//!
//! Added elements are not retained, so [`resize`](MembershipFilter::resize)
//! re-derives `m`/`k` for the scaled capacity and starts empty. Callers that
//! need the old contents must re-add them from their own source of truth.
//! [`should_resize`](MembershipFilter::should_resize) reports when that is
//! worth doing.

use std::hash::Hash;

use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::ds::BitArray;
use crate::error::{ConfigError, InvariantError};
use crate::filter::hash::{bit_index, hash_pair, DEFAULT_SEED};
use crate::filter::snapshot::FilterSnapshot;
use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::FilterMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};

/// Fill ratio above which [`MembershipFilter::should_resize`] advises growth.
pub const RESIZE_FILL_THRESHOLD: f64 = 0.7;

/// Largest bit count a filter may be sized to. The backing words then stay
/// within `isize::MAX / 8` bytes.
pub const MAX_BIT_COUNT: usize = isize::MAX as usize;

/// Optimal bit count for `n` elements at false-positive rate `p`.
///
/// Fails when the result exceeds [`MAX_BIT_COUNT`].
pub fn optimal_bit_count(
    expected_elements: usize,
    false_positive_rate: f64,
) -> Result<usize, ConfigError> {
    let n = expected_elements as f64;
    let ln2_sq = std::f64::consts::LN_2 * std::f64::consts::LN_2;
    let m = (-n * false_positive_rate.ln() / ln2_sq).ceil();
    if !(m < MAX_BIT_COUNT as f64) {
        return Err(ConfigError::new(format!(
            "filter bit_count for {expected_elements} elements at p = {false_positive_rate} \
             exceeds {MAX_BIT_COUNT} bits"
        )));
    }
    Ok((m as usize).max(1))
}

/// Optimal hash count for `m` bits holding `n` elements.
pub fn optimal_hash_count(bit_count: usize, expected_elements: usize) -> u32 {
    let ratio = bit_count as f64 / expected_elements.max(1) as f64;
    let k = (ratio * std::f64::consts::LN_2).ceil();
    (k as u32).max(1)
}

/// Bloom filter over any `Hash` item.
///
/// # Example
///
/// ```
/// use hotpath::filter::MembershipFilter;
///
/// let mut seen = MembershipFilter::new(100, 0.01).unwrap();
/// seen.add("x");
///
/// assert!(seen.contains("x"));
/// assert_eq!(seen.hash_count(), 7);
/// assert_eq!(seen.bit_count(), 959);
/// ```
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    config: FilterConfig,
    bits: BitArray,
    hash_count: u32,
    seed: u64,
    elements_added: u64,
    lookups: MetricsCell,
    positive_lookups: MetricsCell,
}

impl MembershipFilter {
    /// Sizes a filter for `expected_elements` at `false_positive_rate`.
    pub fn new(expected_elements: usize, false_positive_rate: f64) -> Result<Self, ConfigError> {
        Self::with_config(FilterConfig {
            expected_elements,
            false_positive_rate,
            hash_functions: None,
        })
    }

    pub fn with_config(config: FilterConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Builds a filter whose positions derive from `seed`. Filters only
    /// combine with filters built from the same seed.
    pub fn with_seed(config: FilterConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let bit_count = optimal_bit_count(config.expected_elements, config.false_positive_rate)?;
        let hash_count = config
            .hash_functions
            .unwrap_or_else(|| optimal_hash_count(bit_count, config.expected_elements));
        Ok(Self {
            config,
            bits: BitArray::new(bit_count),
            hash_count,
            seed,
            elements_added: 0,
            lookups: MetricsCell::default(),
            positive_lookups: MetricsCell::default(),
        })
    }

    // -------------------------------------------------------------------
    // Core operations
    // -------------------------------------------------------------------

    /// Sets the `k` bits for `item`.
    pub fn add<T: Hash + ?Sized>(&mut self, item: &T) {
        let (h1, h2) = hash_pair(item, self.seed);
        let m = self.bits.len();
        for i in 0..self.hash_count {
            self.bits.set(bit_index(h1, h2, i, m));
        }
        self.elements_added = self.elements_added.saturating_add(1);
    }

    /// `false` means `item` was never added; `true` means it probably was.
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.lookups.incr();
        let (h1, h2) = hash_pair(item, self.seed);
        let m = self.bits.len();
        let present = (0..self.hash_count).all(|i| self.bits.get(bit_index(h1, h2, i, m)));
        if present {
            self.positive_lookups.incr();
        }
        present
    }

    /// Adds every item; returns how many were added.
    pub fn add_batch<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let mut added = 0;
        for item in items {
            self.add(&item);
            added += 1;
        }
        added
    }

    /// Membership answer for each item, in order.
    pub fn contains_batch<I>(&self, items: I) -> Vec<bool>
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        items.into_iter().map(|item| self.contains(&item)).collect()
    }

    // -------------------------------------------------------------------
    // Set algebra
    // -------------------------------------------------------------------

    /// Filter matching anything either operand matches.
    ///
    /// The element count of the result is the sum of both operands, an upper
    /// bound that keeps the FPR estimate conservative.
    pub fn union(&self, other: &Self) -> Result<Self, ConfigError> {
        self.check_compatible(other, "union")?;
        Ok(self.combined(
            self.bits.union(&other.bits),
            self.elements_added.saturating_add(other.elements_added),
        ))
    }

    /// Filter matching what both operands match (plus false positives).
    ///
    /// The element count of the result is the smaller operand's.
    pub fn intersection(&self, other: &Self) -> Result<Self, ConfigError> {
        self.check_compatible(other, "intersection")?;
        Ok(self.combined(
            self.bits.intersection(&other.bits),
            self.elements_added.min(other.elements_added),
        ))
    }

    fn check_compatible(&self, other: &Self, op: &str) -> Result<(), ConfigError> {
        if self.bits.len() == other.bits.len()
            && self.hash_count == other.hash_count
            && self.seed == other.seed
        {
            return Ok(());
        }
        warn!(
            op,
            left_bits = self.bits.len(),
            right_bits = other.bits.len(),
            left_hashes = self.hash_count,
            right_hashes = other.hash_count,
            "incompatible filters"
        );
        Err(ConfigError::new(format!(
            "cannot {op} filters: bit_count {} vs {}, hash_count {} vs {}, seeds {}",
            self.bits.len(),
            other.bits.len(),
            self.hash_count,
            other.hash_count,
            if self.seed == other.seed { "match" } else { "differ" },
        )))
    }

    fn combined(&self, bits: BitArray, elements_added: u64) -> Self {
        Self {
            config: self.config.clone(),
            bits,
            hash_count: self.hash_count,
            seed: self.seed,
            elements_added,
            lookups: MetricsCell::default(),
            positive_lookups: MetricsCell::default(),
        }
    }

    // -------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------

    /// `true` once the fill ratio passes 0.7 or the estimated false-positive
    /// rate exceeds twice the target.
    pub fn should_resize(&self) -> bool {
        let fill = self.fill_ratio();
        let estimated = self.estimated_false_positive_rate();
        let advise = fill > RESIZE_FILL_THRESHOLD
            || estimated > 2.0 * self.config.false_positive_rate;
        if advise {
            debug!(fill, estimated, target = self.config.false_positive_rate, "filter resize advised");
        }
        advise
    }

    /// Re-derives the filter for `expected_elements × scale_factor` and
    /// clears every bit and counter. Previously added items are forgotten.
    ///
    /// A scale that is not positive, or one whose bit count would exceed
    /// [`MAX_BIT_COUNT`], is rejected and leaves the filter untouched.
    pub fn resize(&mut self, scale_factor: f64) -> Result<(), ConfigError> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(ConfigError::new(format!(
                "filter resize scale_factor must be finite and > 0, got {scale_factor}"
            )));
        }
        let scaled = (self.config.expected_elements as f64 * scale_factor).ceil();
        if !(scaled < usize::MAX as f64) {
            return Err(ConfigError::new(format!(
                "filter resize to {scaled} expected_elements overflows usize"
            )));
        }
        let config = FilterConfig {
            expected_elements: (scaled as usize).max(1),
            ..self.config.clone()
        };
        let resized = Self::with_seed(config, self.seed)?;
        debug!(
            old_bits = self.bits.len(),
            new_bits = resized.bits.len(),
            expected_elements = resized.config.expected_elements,
            "filter resized; contents cleared"
        );
        *self = resized;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    /// Clears every bit and the element counter.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.elements_added = 0;
    }

    /// Fraction of bits set.
    pub fn fill_ratio(&self) -> f64 {
        self.bits.count_ones() as f64 / self.bits.len() as f64
    }

    /// `(1 − e^(−k·n/m))^k` for the number of `add` calls so far.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = f64::from(self.hash_count);
        let n = self.elements_added as f64;
        let m = self.bits.len() as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// `m`.
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    /// `k`.
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of `add` calls since construction or the last `clear`.
    pub fn len(&self) -> u64 {
        self.elements_added
    }

    pub fn is_empty(&self) -> bool {
        self.elements_added == 0
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Bytes held by the bit array plus the struct itself.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.bits.approx_bytes()
    }

    pub fn metrics(&self) -> FilterMetricsSnapshot {
        self.snapshot()
    }

    /// Checks that the derived parameters still agree with the bit array.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.bits.is_empty() {
            return Err(InvariantError::new("filter has no bits"));
        }
        if self.hash_count == 0 {
            return Err(InvariantError::new("filter has no hash functions"));
        }
        if self.positive_lookups.get() > self.lookups.get() {
            return Err(InvariantError::new("more positive lookups than lookups"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Export / import
    // -------------------------------------------------------------------

    pub fn export(&self) -> FilterSnapshot {
        FilterSnapshot {
            config: self.config.clone(),
            bit_count: self.bits.len(),
            hash_count: self.hash_count,
            seed: self.seed,
            words: self.bits.words().to_vec(),
            elements_added: self.elements_added,
            lookups: self.lookups.get(),
            positive_lookups: self.positive_lookups.get(),
        }
    }

    /// Rebuilds a filter from an exported snapshot, validating its shape.
    pub fn import(snapshot: FilterSnapshot) -> Result<Self, ConfigError> {
        snapshot.config.validate()?;
        if snapshot.bit_count == 0 || snapshot.hash_count == 0 {
            return Err(ConfigError::new("filter snapshot needs bit_count > 0 and hash_count > 0"));
        }
        if snapshot.positive_lookups > snapshot.lookups {
            return Err(ConfigError::new("filter snapshot has more positive lookups than lookups"));
        }
        let bits = BitArray::from_words(snapshot.words, snapshot.bit_count)?;
        debug!(bit_count = bits.len(), elements = snapshot.elements_added, "filter imported");
        Ok(Self {
            config: snapshot.config,
            bits,
            hash_count: snapshot.hash_count,
            seed: snapshot.seed,
            elements_added: snapshot.elements_added,
            lookups: MetricsCell::new(snapshot.lookups),
            positive_lookups: MetricsCell::new(snapshot.positive_lookups),
        })
    }
}

impl MetricsSnapshotProvider<FilterMetricsSnapshot> for MembershipFilter {
    fn snapshot(&self) -> FilterMetricsSnapshot {
        FilterMetricsSnapshot {
            elements_added: self.elements_added,
            lookups: self.lookups.get(),
            positive_lookups: self.positive_lookups.get(),
            bits_set: self.bits.count_ones(),
            bit_count: self.bits.len(),
            hash_count: self.hash_count,
            fill_ratio: self.fill_ratio(),
            estimated_false_positive_rate: self.estimated_false_positive_rate(),
        }
    }
}

impl MetricsReset for MembershipFilter {
    fn reset_metrics(&mut self) {
        self.lookups.reset();
        self.positive_lookups.reset();
    }
}
