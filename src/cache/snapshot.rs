//! Serializable point-in-time copies of a [`BoundedCache`](crate::cache::BoundedCache).

use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::metrics::snapshot::CacheMetricsSnapshot;

/// One resident entry with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot<K, V> {
    pub key: K,
    pub value: V,
    /// Millisecond timestamp of the last `set`; the TTL runs from here.
    pub written_at: u64,
    pub last_access: u64,
    pub access_count: u64,
    /// Bytes charged against the memory budget.
    pub size: usize,
}

/// Full cache state. Entries are ordered least recently used first, so
/// replaying them front-to-back restores recency order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot<K, V> {
    pub config: CacheConfig,
    pub entries: Vec<EntrySnapshot<K, V>>,
    pub metrics: CacheMetricsSnapshot,
    pub last_sweep: u64,
}

impl<K, V> CacheSnapshot<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
