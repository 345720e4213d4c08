//! Ready-made configurations for the common financial-data workloads.
//!
//! These only fix parameters; every preset returns the ordinary component
//! type, so callers can resize or reconfigure it afterwards.
//!
//! | Preset                       | Component          | Shape                                   |
//! |------------------------------|--------------------|-----------------------------------------|
//! | [`price_buffer`]             | `CircularBuffer`   | 1 000 ticks, overwrite                  |
//! | [`transaction_dedup_filter`] | `MembershipFilter` | 100 000 hashes at 0.1 % FPR             |
//! | [`token_cache`]              | `BoundedCache`     | 500 tokens, 30 s TTL, 16 MiB, JSON size |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::{CircularBuffer, Timestamped};
use crate::builder::CacheBuilder;
use crate::cache::BoundedCache;
use crate::config::{BufferConfig, FilterConfig, OverflowMode};
use crate::error::ConfigError;
use crate::filter::MembershipFilter;

pub const PRICE_BUFFER_CAPACITY: usize = 1_000;
pub const TRANSACTION_FILTER_ELEMENTS: usize = 100_000;
pub const TRANSACTION_FILTER_FPR: f64 = 0.001;
pub const TOKEN_CACHE_CAPACITY: usize = 500;
pub const TOKEN_CACHE_TTL: Duration = Duration::from_secs(30);
pub const TOKEN_CACHE_MAX_MEMORY: usize = 16 * 1024 * 1024;

/// One observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub price: f64,
    pub volume: f64,
}

impl Timestamped for PricePoint {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Rolling window of the latest [`PRICE_BUFFER_CAPACITY`] price points.
///
/// ```
/// use hotpath::presets::{price_buffer, PricePoint};
///
/// let mut prices = price_buffer().unwrap();
/// for (i, price) in [100.0, 101.0, 102.0].into_iter().enumerate() {
///     prices.push(PricePoint { timestamp: i as u64 * 1_000, price, volume: 1.0 });
/// }
/// assert_eq!(prices.moving_average(3, |p| p.price), vec![101.0]);
/// ```
pub fn price_buffer() -> Result<CircularBuffer<PricePoint>, ConfigError> {
    CircularBuffer::with_config(BufferConfig {
        capacity: PRICE_BUFFER_CAPACITY,
        mode: OverflowMode::Overwrite,
    })
}

/// Filter for skipping transaction hashes that were already processed.
pub fn transaction_dedup_filter() -> Result<MembershipFilter, ConfigError> {
    MembershipFilter::with_config(FilterConfig {
        expected_elements: TRANSACTION_FILTER_ELEMENTS,
        false_positive_rate: TRANSACTION_FILTER_FPR,
        hash_functions: None,
    })
}

/// Token metadata cache keyed by symbol or contract address, charging each
/// entry its JSON-encoded size.
pub fn token_cache<V>() -> Result<BoundedCache<String, V>, ConfigError>
where
    V: Serialize + 'static,
{
    CacheBuilder::new(TOKEN_CACHE_CAPACITY)
        .ttl(TOKEN_CACHE_TTL)
        .max_memory(TOKEN_CACHE_MAX_MEMORY)
        .serialized_size()
        .build()
}
