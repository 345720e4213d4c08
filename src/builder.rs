//! Builder for [`BoundedCache`] instances that need more than a capacity.
//!
//! Collects the [`CacheConfig`] fields plus the pieces a config cannot carry:
//! a clock, an entry size calculator and an eviction callback.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use hotpath::builder::CacheBuilder;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .ttl(Duration::from_secs(30))
//!     .max_memory(4096)
//!     .serialized_size()
//!     .build()
//!     .unwrap();
//!
//! cache.set("ETH".to_string(), 3_200.25_f64);
//! assert_eq!(cache.get("ETH"), Some(&3_200.25));
//! assert!(cache.memory_usage() > 0);
//! ```

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::bounded::{BoundedCache, EvictionCallback, EvictionReason};
use crate::cache::size::{serialized_size, SizeFn};
use crate::cache::snapshot::CacheSnapshot;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::ConfigError;

/// Step-by-step construction of a [`BoundedCache`].
pub struct CacheBuilder<K, V> {
    config: CacheConfig,
    clock: Arc<dyn Clock + Send + Sync>,
    size_fn: Option<SizeFn<K, V>>,
    on_evict: Option<EvictionCallback<K, V>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Starts from the default config with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self::from_config(CacheConfig {
            capacity,
            ..CacheConfig::default()
        })
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            size_fn: None,
            on_evict: None,
        }
    }

    pub fn max_memory(mut self, bytes: usize) -> Self {
        self.config.max_memory = Some(bytes);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Replaces the system clock, typically with a
    /// [`ManualClock`](crate::clock::ManualClock) in tests.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Charges each entry `f(key, value)` bytes against the memory budget.
    pub fn size_calculator<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) -> usize + Send + 'static,
    {
        self.size_fn = Some(Box::new(f));
        self
    }

    /// Charges each entry the length of its JSON encoding.
    pub fn serialized_size(self) -> Self
    where
        K: Serialize + 'static,
        V: Serialize + 'static,
    {
        self.size_calculator(|key: &K, value: &V| serialized_size(key, value))
    }

    /// Called with each entry removed by eviction, expiry or `delete`.
    pub fn on_evict<F>(mut self, f: F) -> Self
    where
        F: FnMut(K, V, EvictionReason) + Send + 'static,
    {
        self.on_evict = Some(Box::new(f));
        self
    }

    /// Validates the config and builds an empty cache.
    pub fn build(self) -> Result<BoundedCache<K, V>, ConfigError> {
        BoundedCache::from_parts(self.config, self.size_fn, self.on_evict, self.clock)
    }

    /// Rebuilds a cache from `snapshot`, keeping this builder's clock, size
    /// calculator and callback. The snapshot's own config replaces the
    /// builder's.
    pub fn restore(self, snapshot: CacheSnapshot<K, V>) -> Result<BoundedCache<K, V>, ConfigError> {
        let mut cache = BoundedCache::from_parts(
            snapshot.config.clone(),
            self.size_fn,
            self.on_evict,
            self.clock,
        )?;
        cache.load(snapshot)?;
        Ok(cache)
    }
}

impl<K, V> std::fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("has_size_fn", &self.size_fn.is_some())
            .field("has_on_evict", &self.on_evict.is_some())
            .finish()
    }
}
