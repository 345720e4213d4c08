//! Point-in-time metric snapshots.
//!
//! Snapshots are `Copy` and `serde` (de)serializable; they also travel inside
//! exported component state so an imported instance reports the same numbers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub expirations: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
    pub memory_used: usize,
}

impl CacheMetricsSnapshot {
    /// `hits / (hits + misses)`, or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterMetricsSnapshot {
    pub elements_added: u64,
    pub lookups: u64,
    pub positive_lookups: u64,

    pub bits_set: usize,
    pub bit_count: usize,
    pub hash_count: u32,
    pub fill_ratio: f64,
    pub estimated_false_positive_rate: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferMetricsSnapshot {
    pub writes: u64,
    pub reads: u64,
    pub overflows: u64,
    pub rejected: u64,

    pub len: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_no_lookups() {
        assert_eq!(CacheMetricsSnapshot::default().hit_rate(), 0.0);
        let snap = CacheMetricsSnapshot {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((snap.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
