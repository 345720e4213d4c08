//! Configuration types shared by the three primitives.
//!
//! Config structs have public fields and a `Default`; each exposes
//! `validate()`, which constructors call before building anything. All of
//! them are `serde` (de)serializable and travel inside exported snapshots.
//!
//! | Config          | Component                                         |
//! |-----------------|---------------------------------------------------|
//! | `CacheConfig`   | [`BoundedCache`](crate::cache::BoundedCache)      |
//! | `FilterConfig`  | [`MembershipFilter`](crate::filter::MembershipFilter) |
//! | `BufferConfig`  | [`CircularBuffer`](crate::buffer::CircularBuffer) |
//!
//! ```
//! use std::time::Duration;
//! use hotpath::config::CacheConfig;
//!
//! let config = CacheConfig {
//!     capacity: 10_000,
//!     max_memory: Some(64 * 1024 * 1024),
//!     ttl: Some(Duration::from_secs(30)),
//!     ..CacheConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default interval between periodic TTL sweeps driven by `tick()`.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for [`BoundedCache`](crate::cache::BoundedCache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub capacity: usize,
    /// Optional byte budget across all entries.
    pub max_memory: Option<usize>,
    /// Optional time-to-live measured from the last `set` of each key.
    /// Deadlines are tracked in whole milliseconds, rounded up.
    pub ttl: Option<Duration>,
    /// Minimum spacing between sweeps performed by `tick()`.
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            max_memory: None,
            ttl: None,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        if self.max_memory == Some(0) {
            return Err(ConfigError::new("cache max_memory must be > 0 when set"));
        }
        if self.ttl == Some(Duration::ZERO) {
            return Err(ConfigError::new("cache ttl must be > 0 when set"));
        }
        Ok(())
    }
}

/// Configuration for [`MembershipFilter`](crate::filter::MembershipFilter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of elements the filter is sized for (`n`).
    pub expected_elements: usize,
    /// Target false-positive rate (`p`), in `(0, 1)`.
    pub false_positive_rate: f64,
    /// Overrides the derived hash-function count (`k`) when set.
    pub hash_functions: Option<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_elements: 10_000,
            false_positive_rate: 0.01,
            hash_functions: None,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_elements == 0 {
            return Err(ConfigError::new("filter expected_elements must be > 0"));
        }
        let p = self.false_positive_rate;
        if !(p > 0.0 && p < 1.0) {
            return Err(ConfigError::new(format!(
                "filter false_positive_rate must be in (0, 1), got {p}"
            )));
        }
        if self.hash_functions == Some(0) {
            return Err(ConfigError::new("filter hash_functions must be > 0 when set"));
        }
        Ok(())
    }
}

/// Policy applied when pushing into a full [`CircularBuffer`](crate::buffer::CircularBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowMode {
    /// Drop the oldest item and keep the newest `capacity` items.
    #[default]
    Overwrite,
    /// Refuse the write and report failure.
    Reject,
}

/// Configuration for [`CircularBuffer`](crate::buffer::CircularBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Number of slots.
    pub capacity: usize,
    /// Full-buffer policy.
    pub mode: OverflowMode,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            mode: OverflowMode::Overwrite,
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("buffer capacity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(FilterConfig::default().validate().is_ok());
        assert!(BufferConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacities_rejected() {
        let cache = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(cache.validate().unwrap_err().message().contains("capacity"));

        let buffer = BufferConfig {
            capacity: 0,
            ..BufferConfig::default()
        };
        assert!(buffer.validate().is_err());
    }

    #[test]
    fn zero_budget_and_ttl_rejected() {
        let budget = CacheConfig {
            max_memory: Some(0),
            ..CacheConfig::default()
        };
        assert!(budget.validate().is_err());

        let ttl = CacheConfig {
            ttl: Some(Duration::ZERO),
            ..CacheConfig::default()
        };
        assert!(ttl.validate().is_err());
    }

    #[test]
    fn false_positive_rate_bounds() {
        for p in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            let config = FilterConfig {
                false_positive_rate: p,
                ..FilterConfig::default()
            };
            assert!(config.validate().is_err(), "p = {p} accepted");
        }
    }

    #[test]
    fn overflow_mode_serializes_snake_case() {
        let json = serde_json::to_string(&OverflowMode::Reject).unwrap();
        assert_eq!(json, "\"reject\"");
        let mode: OverflowMode = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(mode, OverflowMode::Overwrite);
    }
}
