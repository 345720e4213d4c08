//! # Bounded LRU Cache with TTL and Memory Budget
//!
//! O(1) least-recently-used cache that evicts on entry count, on an optional
//! byte budget, and on an optional time-to-live.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        BoundedCache<K, V>                            │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId>   (key -> handle into the list arena)  │   │
//!   │   └───────────────────────────────┬──────────────────────────────┘   │
//!   │                                   ▼                                  │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList<Entry<K, V>>                                    │   │
//!   │   │                                                              │   │
//!   │   │  head ──► [Entry] ◄──► [Entry] ◄──► [Entry] ◄── tail         │   │
//!   │   │   (MRU)                                      (LRU, evicted)  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                                                      │
//!   │   total_size ≤ max_memory        len ≤ capacity                      │
//!   │   clock ──► written_at + ttl ≤ now  ⇒  expired                        │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Lifecycle
//!
//! ```text
//!   set(new key) ──► evict tail while len ≥ capacity or budget overflows
//!                ──► push at head
//!   set(old key) ──► replace value/size in place, move to head
//!   get(hit)     ──► access_count += 1, last_access = now, move to head
//!   get(expired) ──► purge (callback: Expired), count a miss
//!   prune()/tick ──► purge every expired entry
//!   delete(key)  ──► unlink (callback: Deleted)
//! ```
//!
//! ## Expiry
//!
//! An entry written at `t` with TTL `d` is live for every read at `t' < t + d`
//! and expired for `t' ≥ t + d`. Reads refresh `last_access` (which drives
//! recency and [`cold_keys`](BoundedCache::cold_keys)) but not the expiry
//! deadline; only `set` restarts it. Expired entries are removed lazily by
//! reads and eagerly by [`prune`](BoundedCache::prune), which the host
//! scheduler can drive through [`tick`](BoundedCache::tick).
//!
//! ## Callbacks
//!
//! The eviction callback runs after the entry has been fully unlinked, so a
//! panicking callback leaves the cache consistent. Panics are not caught.
//!
//! ## Thread Safety
//!
//! Not thread-safe. Wrap in a lock (see `concurrent::SharedCache` behind the
//! `concurrency` feature) to share across threads.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::cache::size::{shallow_size, SizeFn};
use crate::cache::snapshot::{CacheSnapshot, EntrySnapshot};
use crate::clock::{duration_millis, duration_millis_ceil, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::ds::{RecencyList, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// Entry count reached capacity (including `resize`).
    Capacity,
    /// Byte budget would have been exceeded.
    Memory,
    /// TTL elapsed.
    Expired,
    /// Explicit `delete`.
    Deleted,
}

/// Invoked with the removed key and value.
pub type EvictionCallback<K, V> = Box<dyn FnMut(K, V, EvictionReason) + Send>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    written_at: u64,
    last_access: u64,
    access_count: u64,
    size: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct CacheCounters {
    hits: u64,
    misses: u64,
    inserts: u64,
    updates: u64,
    deletes: u64,
    evictions: u64,
    expirations: u64,
}

/// LRU cache bounded by entry count, optional byte budget and optional TTL.
///
/// # Example
///
/// ```
/// use hotpath::cache::BoundedCache;
///
/// let mut cache = BoundedCache::new(2).unwrap();
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.set("c", 3);
///
/// assert_eq!(cache.get(&"a"), None); // least recently used, evicted
/// assert_eq!(cache.get(&"b"), Some(&2));
/// assert_eq!(cache.get(&"c"), Some(&3));
/// ```
pub struct BoundedCache<K, V> {
    index: FxHashMap<K, SlotId>,
    list: RecencyList<Entry<K, V>>,
    config: CacheConfig,
    total_size: usize,
    size_fn: Option<SizeFn<K, V>>,
    on_evict: Option<EvictionCallback<K, V>>,
    clock: Arc<dyn Clock + Send + Sync>,
    last_sweep: u64,
    destroyed: bool,
    counters: CacheCounters,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries, no TTL, no budget.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(CacheConfig {
            capacity,
            ..CacheConfig::default()
        })
    }

    /// Creates a cache from a validated config using the system clock.
    pub fn with_config(config: CacheConfig) -> Result<Self, ConfigError> {
        Self::from_parts(config, None, None, Arc::new(SystemClock))
    }

    pub(crate) fn from_parts(
        config: CacheConfig,
        size_fn: Option<SizeFn<K, V>>,
        on_evict: Option<EvictionCallback<K, V>>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let last_sweep = clock.now_millis();
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(config.capacity, Default::default()),
            list: RecencyList::with_capacity(config.capacity),
            config,
            total_size: 0,
            size_fn,
            on_evict,
            clock,
            last_sweep,
            destroyed: false,
            counters: CacheCounters::default(),
        })
    }

    // -------------------------------------------------------------------
    // Core operations
    // -------------------------------------------------------------------

    /// Looks up `key`, marking it most recently used on a hit.
    ///
    /// An expired entry is purged and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        match self.touch(key, now) {
            Some(id) => self.list.get(id).map(|entry| &entry.value),
            None => {
                self.counters.misses += 1;
                None
            },
        }
    }

    /// Inserts or updates `key`.
    ///
    /// New keys evict from the LRU end until both the entry count and the
    /// byte budget admit the new entry. Returns `false` only when the entry
    /// alone is larger than the whole budget; nothing is changed in that case.
    pub fn set(&mut self, key: K, value: V) -> bool {
        let now = self.clock.now_millis();
        let size = self.entry_size(&key, &value);
        if let Some(budget) = self.config.max_memory {
            if size > budget {
                trace!(size, budget, "entry larger than memory budget rejected");
                return false;
            }
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                self.total_size = self.total_size - entry.size + size;
                entry.value = value;
                entry.size = size;
                entry.written_at = now;
                entry.last_access = now;
            }
            self.list.move_to_front(id);
            self.counters.updates += 1;
            // A grown value may push the total over budget; shed other entries.
            while self.over_budget(0) && self.list.back_id() != Some(id) {
                self.evict_tail(EvictionReason::Memory);
            }
            return true;
        }

        while !self.list.is_empty() {
            let reason = if self.list.len() >= self.config.capacity {
                EvictionReason::Capacity
            } else if self.over_budget(size) {
                EvictionReason::Memory
            } else {
                break;
            };
            self.evict_tail(reason);
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
            written_at: now,
            last_access: now,
            access_count: 0,
            size,
        });
        self.index.insert(key, id);
        self.total_size += size;
        self.counters.inserts += 1;
        true
    }

    /// Removes `key`, firing the eviction callback. Returns whether an entry
    /// was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.get(key).copied() else {
            return false;
        };
        match self.unlink(id) {
            Some(entry) => {
                self.counters.deletes += 1;
                self.notify(entry, EvictionReason::Deleted);
                true
            },
            None => false,
        }
    }

    /// Returns `true` if `key` is present and live, without touching recency.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        self.live_id(key, now).is_some()
    }

    /// Reads `key` without touching recency, access count or hit metrics.
    pub fn peek<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_millis();
        let id = self.live_id(key, now)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    // -------------------------------------------------------------------
    // Batch variants
    // -------------------------------------------------------------------

    /// Sets every pair in order; returns how many were stored.
    pub fn set_batch<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        items
            .into_iter()
            .map(|(key, value)| self.set(key, value))
            .filter(|stored| *stored)
            .count()
    }

    /// Looks up every key in order with `get` semantics.
    pub fn get_batch<'k, Q, I>(&mut self, keys: I) -> Vec<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'k,
        I: IntoIterator<Item = &'k Q>,
    {
        let now = self.clock.now_millis();
        let ids: Vec<Option<SlotId>> = keys
            .into_iter()
            .map(|key| {
                let id = self.touch(key, now);
                if id.is_none() {
                    self.counters.misses += 1;
                }
                id
            })
            .collect();
        ids.into_iter()
            .map(|id| id.and_then(|id| self.list.get(id)).map(|entry| &entry.value))
            .collect()
    }

    /// Deletes every key; returns how many were removed.
    pub fn delete_batch<'k, Q, I>(&mut self, keys: I) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'k,
        I: IntoIterator<Item = &'k Q>,
    {
        keys.into_iter().filter(|key| self.delete(*key)).count()
    }

    // -------------------------------------------------------------------
    // Analytical reads (no mutation; expired entries are skipped)
    // -------------------------------------------------------------------

    /// Up to `n` keys with the highest access counts. Ties keep MRU order.
    pub fn hot_keys(&self, n: usize) -> Vec<K> {
        let now = self.clock.now_millis();
        let mut live: Vec<&Entry<K, V>> = self
            .list
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| !self.is_expired(entry, now))
            .collect();
        live.sort_by(|a, b| b.access_count.cmp(&a.access_count));
        live.into_iter().take(n).map(|e| e.key.clone()).collect()
    }

    /// Up to `n` keys that have gone longest without access, coldest first.
    pub fn cold_keys(&self, n: usize) -> Vec<K> {
        let now = self.clock.now_millis();
        self.list
            .iter_rev()
            .map(|(_, entry)| entry)
            .filter(|entry| !self.is_expired(entry, now))
            .take(n)
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Keys read at least `min_access` times, in MRU order.
    pub fn keys_by_access_pattern(&self, min_access: u64) -> Vec<K> {
        let now = self.clock.now_millis();
        self.list
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.access_count >= min_access && !self.is_expired(entry, now))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Number of `get` hits recorded for `key` since it was inserted.
    pub fn access_count<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| entry.access_count)
    }

    // -------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------

    /// Removes every expired entry; returns how many were removed.
    pub fn prune(&mut self) -> usize {
        if self.config.ttl.is_none() || self.list.is_empty() {
            return 0;
        }
        let now = self.clock.now_millis();
        let expired: Vec<SlotId> = self
            .list
            .iter_rev()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(id, _)| id)
            .collect();
        for &id in &expired {
            self.expire(id);
        }
        if !expired.is_empty() {
            debug!(removed = expired.len(), remaining = self.list.len(), "pruned expired entries");
        }
        expired.len()
    }

    /// Periodic hook for the host scheduler: prunes when at least
    /// `cleanup_interval` has passed since the previous sweep.
    ///
    /// Returns the number of entries removed (zero when the sweep was not due,
    /// no TTL is configured, or the cache was destroyed).
    pub fn tick(&mut self) -> usize {
        if self.destroyed || self.config.ttl.is_none() {
            return 0;
        }
        let now = self.clock.now_millis();
        let interval = duration_millis(self.config.cleanup_interval);
        if now.saturating_sub(self.last_sweep) < interval {
            return 0;
        }
        self.last_sweep = now;
        let removed = self.prune();
        trace!(removed, "ttl sweep");
        removed
    }

    /// Changes the entry capacity, evicting from the LRU end as needed.
    /// Returns the number of entries evicted.
    pub fn resize(&mut self, new_capacity: usize) -> Result<usize, ConfigError> {
        if new_capacity == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        let mut evicted = 0;
        while self.list.len() > new_capacity && self.evict_tail(EvictionReason::Capacity) {
            evicted += 1;
        }
        self.config.capacity = new_capacity;
        debug!(new_capacity, evicted, "cache resized");
        Ok(evicted)
    }

    /// Rebuilds index and list storage from the live entries, releasing
    /// slots freed by earlier removals. Recency order is preserved.
    pub fn compact(&mut self) {
        let before = self.approx_bytes();
        let mut entries = Vec::with_capacity(self.list.len());
        while let Some(entry) = self.list.pop_back() {
            entries.push(entry);
        }
        self.list.clear_shrink();
        self.index = FxHashMap::with_capacity_and_hasher(entries.len(), Default::default());
        // entries are LRU first; pushing each to the front restores MRU at head
        for entry in entries {
            let key = entry.key.clone();
            let id = self.list.push_front(entry);
            self.index.insert(key, id);
        }
        debug!(before, after = self.approx_bytes(), "cache compacted");
    }

    /// Drops every entry without firing callbacks. Metrics are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.total_size = 0;
    }

    /// Ends the cache lifecycle: drops entries, releases backing storage and
    /// disables `tick`.
    pub fn destroy(&mut self) {
        self.clear();
        self.list.clear_shrink();
        self.index.shrink_to_fit();
        self.destroyed = true;
        debug!("cache destroyed");
    }

    /// Removes and returns the least recently used entry. No callback fires.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let id = self.list.back_id()?;
        self.unlink(id).map(|entry| (entry.key, entry.value))
    }

    /// Least recently used entry, if any.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Bytes charged against the budget by resident entries.
    pub fn memory_usage(&self) -> usize {
        self.total_size
    }

    pub fn max_memory(&self) -> Option<usize> {
        self.config.max_memory
    }

    pub fn ttl(&self) -> Option<std::time::Duration> {
        self.config.ttl
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Resident entries from most to least recently used, including expired
    /// entries not yet purged.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Resident keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.list.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Counter and gauge snapshot; same as [`MetricsSnapshotProvider::snapshot`].
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.snapshot()
    }

    /// Approximate heap footprint of the index and list structures.
    pub fn approx_bytes(&self) -> usize {
        self.list.approx_bytes()
            + self.index.capacity() * std::mem::size_of::<(K, SlotId)>()
    }

    /// Checks that index, list, size accounting and bounds agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {}",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.config.capacity {
            return Err(InvariantError::new("entry count exceeds capacity"));
        }
        let mut size_sum = 0usize;
        for (id, entry) in self.list.iter() {
            if self.index.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new("list entry not indexed under its key"));
            }
            size_sum += entry.size;
        }
        if size_sum != self.total_size {
            return Err(InvariantError::new(format!(
                "tracked size {} differs from entry sum {}",
                self.total_size, size_sum
            )));
        }
        if let Some(budget) = self.config.max_memory {
            if self.total_size > budget {
                return Err(InvariantError::new("memory usage exceeds budget"));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Export / import
    // -------------------------------------------------------------------

    /// Captures configuration, entries (LRU first) and metrics.
    pub fn export(&self) -> CacheSnapshot<K, V>
    where
        V: Clone,
    {
        CacheSnapshot {
            config: self.config.clone(),
            entries: self
                .list
                .iter_rev()
                .map(|(_, entry)| EntrySnapshot {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    written_at: entry.written_at,
                    last_access: entry.last_access,
                    access_count: entry.access_count,
                    size: entry.size,
                })
                .collect(),
            metrics: self.snapshot(),
            last_sweep: self.last_sweep,
        }
    }

    /// Rebuilds a cache from an exported snapshot using the system clock.
    ///
    /// Use [`CacheBuilder::restore`](crate::builder::CacheBuilder::restore)
    /// to attach a clock, size calculator or eviction callback.
    pub fn import(snapshot: CacheSnapshot<K, V>) -> Result<Self, ConfigError> {
        let mut cache = Self::with_config(snapshot.config.clone())?;
        cache.load(snapshot)?;
        Ok(cache)
    }

    pub(crate) fn load(&mut self, snapshot: CacheSnapshot<K, V>) -> Result<(), ConfigError> {
        if snapshot.entries.len() > self.config.capacity {
            return Err(ConfigError::new(format!(
                "snapshot holds {} entries but capacity is {}",
                snapshot.entries.len(),
                self.config.capacity
            )));
        }
        self.clear();
        for entry in snapshot.entries {
            if self.index.contains_key(&entry.key) {
                return Err(ConfigError::new("snapshot contains a duplicate key"));
            }
            let key = entry.key.clone();
            self.total_size += entry.size;
            let id = self.list.push_front(Entry {
                key: entry.key,
                value: entry.value,
                written_at: entry.written_at,
                last_access: entry.last_access,
                access_count: entry.access_count,
                size: entry.size,
            });
            self.index.insert(key, id);
        }
        if self.over_budget(0) {
            return Err(ConfigError::new("snapshot entries exceed the memory budget"));
        }
        let m = snapshot.metrics;
        self.counters = CacheCounters {
            hits: m.hits,
            misses: m.misses,
            inserts: m.inserts,
            updates: m.updates,
            deletes: m.deletes,
            evictions: m.evictions,
            expirations: m.expirations,
        };
        self.last_sweep = snapshot.last_sweep;
        debug!(entries = self.list.len(), "cache imported");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn entry_size(&self, key: &K, value: &V) -> usize {
        match &self.size_fn {
            Some(size_fn) => size_fn(key, value),
            None => shallow_size(key, value),
        }
    }

    #[inline]
    fn over_budget(&self, extra: usize) -> bool {
        self.config
            .max_memory
            .is_some_and(|budget| self.total_size.saturating_add(extra) > budget)
    }

    #[inline]
    fn is_expired(&self, entry: &Entry<K, V>, now: u64) -> bool {
        self.config.ttl.is_some_and(|ttl| {
            now >= entry.written_at.saturating_add(duration_millis_ceil(ttl))
        })
    }

    /// Resolves `key` to a live handle, purging it if expired.
    fn live_id<Q>(&mut self, key: &Q, now: u64) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        let expired = self
            .list
            .get(id)
            .is_some_and(|entry| self.is_expired(entry, now));
        if expired {
            self.expire(id);
            return None;
        }
        Some(id)
    }

    /// Records a hit on a live key and moves it to the head.
    fn touch<Q>(&mut self, key: &Q, now: u64) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.live_id(key, now)?;
        if let Some(entry) = self.list.get_mut(id) {
            entry.access_count += 1;
            entry.last_access = now;
        }
        self.list.move_to_front(id);
        self.counters.hits += 1;
        Some(id)
    }

    fn unlink(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        let entry = self.list.remove(id)?;
        self.index.remove(&entry.key);
        self.total_size -= entry.size;
        Some(entry)
    }

    fn expire(&mut self, id: SlotId) {
        if let Some(entry) = self.unlink(id) {
            self.counters.expirations += 1;
            self.notify(entry, EvictionReason::Expired);
        }
    }

    fn evict_tail(&mut self, reason: EvictionReason) -> bool {
        let Some(id) = self.list.back_id() else {
            return false;
        };
        match self.unlink(id) {
            Some(entry) => {
                self.counters.evictions += 1;
                trace!(?reason, size = entry.size, "evicted lru entry");
                self.notify(entry, reason);
                true
            },
            None => false,
        }
    }

    fn notify(&mut self, entry: Entry<K, V>, reason: EvictionReason) {
        if let Some(callback) = self.on_evict.as_mut() {
            callback(entry.key, entry.value, reason);
        }
    }
}

impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        let c = self.counters;
        CacheMetricsSnapshot {
            hits: c.hits,
            misses: c.misses,
            inserts: c.inserts,
            updates: c.updates,
            deletes: c.deletes,
            evictions: c.evictions,
            expirations: c.expirations,
            len: self.list.len(),
            capacity: self.config.capacity,
            memory_used: self.total_size,
        }
    }
}

impl<K, V> MetricsReset for BoundedCache<K, V> {
    fn reset_metrics(&mut self) {
        self.counters = CacheCounters::default();
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("len", &self.list.len())
            .field("config", &self.config)
            .field("total_size", &self.total_size)
            .field("has_size_fn", &self.size_fn.is_some())
            .field("has_on_evict", &self.on_evict.is_some())
            .field("clock", &self.clock)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::builder::CacheBuilder;
    use crate::clock::ManualClock;

    fn ttl_cache(capacity: usize, ttl_ms: u64) -> (BoundedCache<&'static str, i32>, ManualClock) {
        let clock = ManualClock::new(1_000);
        let cache = CacheBuilder::new(capacity)
            .ttl(Duration::from_millis(ttl_ms))
            .cleanup_interval(Duration::from_millis(ttl_ms))
            .clock(clock.clone())
            .build()
            .unwrap();
        (cache, clock)
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn zero_capacity_rejected() {
            assert!(BoundedCache::<u32, u32>::new(0).is_err());
        }

        #[test]
        fn capacity_two_evicts_first_key() {
            let mut cache = BoundedCache::new(2).unwrap();
            cache.set("a", 1);
            cache.set("b", 2);
            cache.set("c", 3);

            assert_eq!(cache.get("a"), None);
            assert_eq!(cache.get("b"), Some(&2));
            assert_eq!(cache.get("c"), Some(&3));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn get_refreshes_recency() {
            let mut cache = BoundedCache::new(2).unwrap();
            cache.set(1, "one");
            cache.set(2, "two");
            assert_eq!(cache.get(&1), Some(&"one"));
            cache.set(3, "three");

            assert!(cache.has(&1));
            assert!(!cache.has(&2));
            assert_eq!(cache.keys(), vec![3, 1]);
        }

        #[test]
        fn update_in_place_moves_to_head() {
            let mut cache = BoundedCache::new(3).unwrap();
            cache.set(1, 10);
            cache.set(2, 20);
            cache.set(1, 11);

            assert_eq!(cache.len(), 2);
            assert_eq!(cache.keys(), vec![1, 2]);
            assert_eq!(cache.peek(&1), Some(&11));

            let snap = cache.snapshot();
            assert_eq!(snap.inserts, 2);
            assert_eq!(snap.updates, 1);
        }

        #[test]
        fn peek_and_has_do_not_touch_recency() {
            let mut cache = BoundedCache::new(2).unwrap();
            cache.set("x", 1);
            cache.set("y", 2);
            assert_eq!(cache.peek("x"), Some(&1));
            assert!(cache.has("x"));
            cache.set("z", 3);

            assert!(!cache.has("x"));
            assert_eq!(cache.access_count("y"), Some(0));
            assert_eq!(cache.snapshot().hits, 0);
        }

        #[test]
        fn delete_reports_removal() {
            let mut cache = BoundedCache::new(4).unwrap();
            cache.set(String::from("k"), 1);
            assert!(cache.delete("k"));
            assert!(!cache.delete("k"));
            assert!(cache.is_empty());
            assert_eq!(cache.snapshot().deletes, 1);
        }

        #[test]
        fn hit_and_miss_counters() {
            let mut cache = BoundedCache::new(4).unwrap();
            cache.set(1, 1);
            cache.get(&1);
            cache.get(&1);
            cache.get(&2);
            let snap = cache.snapshot();
            assert_eq!((snap.hits, snap.misses), (2, 1));
            assert!((cache.hit_rate() - 2.0 / 3.0).abs() < 1e-9);

            cache.reset_metrics();
            assert_eq!(cache.snapshot().hits, 0);
        }

        #[test]
        fn pop_and_peek_lru() {
            let mut cache = BoundedCache::new(3).unwrap();
            cache.set(1, 'a');
            cache.set(2, 'b');
            assert_eq!(cache.peek_lru(), Some((&1, &'a')));
            assert_eq!(cache.pop_lru(), Some((1, 'a')));
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }
    }

    mod batch {
        use super::*;

        #[test]
        fn batch_variants_follow_single_item_contract() {
            let mut cache = BoundedCache::new(3).unwrap();
            let stored = cache.set_batch([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
            assert_eq!(stored, 4);
            assert_eq!(cache.len(), 3);

            let got = cache.get_batch([&1, &2, &4]);
            assert_eq!(got, vec![None, Some(&"b"), Some(&"d")]);
            assert_eq!(cache.snapshot().misses, 1);

            assert_eq!(cache.delete_batch([&2, &9, &3]), 2);
            assert_eq!(cache.keys(), vec![4]);
        }
    }

    mod ttl {
        use super::*;

        #[test]
        fn entry_expires_exactly_at_deadline() {
            let (mut cache, clock) = ttl_cache(4, 100);
            cache.set("a", 1);

            clock.advance(Duration::from_millis(99));
            assert_eq!(cache.get("a"), Some(&1));
            assert!(cache.has("a"));

            clock.advance(Duration::from_millis(1));
            assert!(!cache.has("a"));
            assert_eq!(cache.get("a"), None);
            assert_eq!(cache.snapshot().expirations, 1);
            assert!(cache.is_empty());
        }

        #[test]
        fn sub_millisecond_ttl_keeps_entry_until_next_tick() {
            let clock = ManualClock::new(1_000);
            let mut cache = CacheBuilder::new(4)
                .ttl(Duration::from_micros(500))
                .clock(clock.clone())
                .build()
                .unwrap();
            cache.set("a", 1);
            assert!(cache.has("a"));
            assert_eq!(cache.get("a"), Some(&1));

            clock.advance(Duration::from_millis(1));
            assert!(!cache.has("a"));
        }

        #[test]
        fn fractional_ttl_rounds_deadline_up() {
            let clock = ManualClock::new(1_000);
            let mut cache = CacheBuilder::new(4)
                .ttl(Duration::from_micros(1_500))
                .clock(clock.clone())
                .build()
                .unwrap();
            cache.set("a", 1);

            clock.advance(Duration::from_millis(1));
            assert_eq!(cache.get("a"), Some(&1));

            clock.advance(Duration::from_millis(1));
            assert_eq!(cache.get("a"), None);
        }

        #[test]
        fn reads_do_not_extend_ttl_but_set_does() {
            let (mut cache, clock) = ttl_cache(4, 100);
            cache.set("a", 1);
            clock.advance(Duration::from_millis(60));
            cache.get("a");
            clock.advance(Duration::from_millis(40));
            assert_eq!(cache.peek("a"), None);

            cache.set("b", 2);
            clock.advance(Duration::from_millis(60));
            cache.set("b", 3);
            clock.advance(Duration::from_millis(60));
            assert_eq!(cache.get("b"), Some(&3));
        }

        #[test]
        fn prune_removes_only_expired() {
            let (mut cache, clock) = ttl_cache(8, 100);
            cache.set("old1", 1);
            cache.set("old2", 2);
            clock.advance(Duration::from_millis(50));
            cache.set("new", 3);
            clock.advance(Duration::from_millis(50));

            assert_eq!(cache.prune(), 2);
            assert_eq!(cache.keys(), vec!["new"]);
            assert_eq!(cache.prune(), 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn tick_respects_cleanup_interval() {
            let (mut cache, clock) = ttl_cache(8, 100);
            cache.set("a", 1);
            clock.advance(Duration::from_millis(99));
            assert_eq!(cache.tick(), 0);

            clock.advance(Duration::from_millis(1));
            assert_eq!(cache.tick(), 1);

            cache.set("b", 2);
            clock.advance(Duration::from_millis(150));
            cache.destroy();
            assert_eq!(cache.tick(), 0);
            assert!(cache.is_destroyed());
        }

        #[test]
        fn analytical_reads_skip_expired_entries() {
            let (mut cache, clock) = ttl_cache(8, 100);
            cache.set("stale", 1);
            clock.advance(Duration::from_millis(50));
            cache.set("fresh", 2);
            clock.advance(Duration::from_millis(50));

            assert_eq!(cache.cold_keys(5), vec!["fresh"]);
            assert_eq!(cache.hot_keys(5), vec!["fresh"]);
            // not purged by the analytical reads
            assert_eq!(cache.len(), 2);
        }
    }

    mod memory_budget {
        use super::*;

        fn byte_cache(capacity: usize, budget: usize) -> BoundedCache<u32, Vec<u8>> {
            CacheBuilder::new(capacity)
                .max_memory(budget)
                .size_calculator(|_, v: &Vec<u8>| v.len())
                .build()
                .unwrap()
        }

        #[test]
        fn evicts_until_budget_admits_entry() {
            let mut cache = byte_cache(10, 100);
            cache.set(1, vec![0; 40]);
            cache.set(2, vec![0; 40]);
            cache.set(3, vec![0; 40]);

            assert!(!cache.has(&1));
            assert_eq!(cache.memory_usage(), 80);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn oversized_entry_rejected_without_side_effects() {
            let mut cache = byte_cache(10, 100);
            cache.set(1, vec![0; 10]);
            assert!(!cache.set(2, vec![0; 101]));
            assert!(cache.has(&1));
            assert_eq!(cache.memory_usage(), 10);
        }

        #[test]
        fn growing_update_sheds_other_entries() {
            let mut cache = byte_cache(10, 100);
            cache.set(1, vec![0; 30]);
            cache.set(2, vec![0; 30]);
            cache.set(3, vec![0; 30]);
            assert!(cache.set(2, vec![0; 60]));

            assert_eq!(cache.keys(), vec![2, 3]);
            assert_eq!(cache.memory_usage(), 90);
            cache.check_invariants().unwrap();
        }
    }

    mod callbacks {
        use super::*;

        #[test]
        fn callback_sees_every_removal_reason() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&log);
            let clock = ManualClock::new(0);
            let mut cache = CacheBuilder::new(2)
                .ttl(Duration::from_millis(10))
                .clock(clock.clone())
                .on_evict(move |k: u32, _v: u32, reason| sink.lock().unwrap().push((k, reason)))
                .build()
                .unwrap();

            cache.set(1, 1);
            cache.set(2, 2);
            cache.set(3, 3);
            cache.delete(&2);
            clock.advance(Duration::from_millis(10));
            cache.get(&3);

            let log = log.lock().unwrap();
            assert_eq!(
                *log,
                vec![
                    (1, EvictionReason::Capacity),
                    (2, EvictionReason::Deleted),
                    (3, EvictionReason::Expired),
                ]
            );
        }

        #[test]
        fn panicking_callback_propagates_and_leaves_cache_consistent() {
            let mut cache = CacheBuilder::new(1)
                .on_evict(|_: u8, _: u8, _| panic!("callback failure"))
                .build()
                .unwrap();
            cache.set(1, 1);

            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                cache.set(2, 2);
            }));
            assert!(result.is_err());
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }
    }

    mod analytics {
        use super::*;

        #[test]
        fn hot_cold_and_access_pattern() {
            let mut cache = BoundedCache::new(8).unwrap();
            for k in ["a", "b", "c", "d"] {
                cache.set(k, 0);
            }
            for _ in 0..3 {
                cache.get("b");
            }
            cache.get("c");

            assert_eq!(cache.hot_keys(2), vec!["b", "c"]);
            assert_eq!(cache.cold_keys(2), vec!["a", "d"]);
            assert_eq!(cache.keys_by_access_pattern(1), vec!["c", "b"]);
            assert_eq!(cache.keys_by_access_pattern(3), vec!["b"]);
            // reads above did not reorder anything
            assert_eq!(cache.keys(), vec!["c", "b", "d", "a"]);
        }
    }

    mod maintenance {
        use super::*;

        #[test]
        fn resize_evicts_lru_entries() {
            let mut cache = BoundedCache::new(5).unwrap();
            for i in 0..5 {
                cache.set(i, i);
            }
            assert_eq!(cache.resize(2).unwrap(), 3);
            assert_eq!(cache.keys(), vec![4, 3]);
            assert_eq!(cache.capacity(), 2);
            assert!(cache.resize(0).is_err());
            assert_eq!(cache.capacity(), 2);
        }

        #[test]
        fn compact_preserves_order_and_contents() {
            let mut cache = BoundedCache::new(64).unwrap();
            for i in 0..64 {
                cache.set(i, i * 2);
            }
            for i in 0..60 {
                cache.delete(&i);
            }
            cache.get(&61);
            let before = cache.keys();
            cache.compact();

            assert_eq!(cache.keys(), before);
            assert_eq!(cache.peek(&63), Some(&126));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn clear_keeps_metrics() {
            let mut cache = BoundedCache::new(4).unwrap();
            cache.set(1, 1);
            cache.get(&1);
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.memory_usage(), 0);
            assert_eq!(cache.snapshot().hits, 1);
        }
    }

    mod snapshots {
        use super::*;

        #[test]
        fn export_import_preserves_state() {
            let (mut cache, _clock) = ttl_cache(4, 10_000);
            cache.set("a", 1);
            cache.set("b", 2);
            cache.get("a");
            cache.get("missing");

            let snapshot = cache.export();
            assert_eq!(snapshot.entries.len(), 2);
            assert_eq!(snapshot.entries[1].key, "a");

            let restored: BoundedCache<&str, i32> = CacheBuilder::new(1)
                .clock(ManualClock::new(1_000))
                .restore(snapshot.clone())
                .unwrap();
            assert_eq!(restored.keys(), cache.keys());
            assert_eq!(restored.snapshot(), cache.snapshot());
            assert_eq!(restored.export(), snapshot);
        }

        #[test]
        fn import_rejects_malformed_snapshots() {
            let mut cache = BoundedCache::new(2).unwrap();
            cache.set(1, 1);
            cache.set(2, 2);

            let mut dup = cache.export();
            dup.entries[1].key = 1;
            assert!(BoundedCache::import(dup).is_err());

            let mut small = cache.export();
            small.config.capacity = 1;
            assert!(BoundedCache::import(small).is_err());
        }
    }

    mod property_tests {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Set(u8, u16),
            Get(u8),
            Delete(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..24, any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
                (0u8..24).prop_map(Op::Get),
                (0u8..24).prop_map(Op::Delete),
            ]
        }

        proptest! {
            /// Mirrors the cache with a Vec kept in recency order and checks
            /// that evictions always take the least recently touched key.
            #[test]
            fn matches_reference_lru(capacity in 1usize..8, ops in prop::collection::vec(op(), 1..200)) {
                let mut cache = BoundedCache::new(capacity).unwrap();
                let mut model: Vec<(u8, u16)> = Vec::new(); // MRU first

                for op in ops {
                    match op {
                        Op::Set(k, v) => {
                            cache.set(k, v);
                            model.retain(|(mk, _)| *mk != k);
                            model.insert(0, (k, v));
                            model.truncate(capacity);
                        },
                        Op::Get(k) => {
                            let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                                let item = model.remove(pos);
                                model.insert(0, item);
                                item.1
                            });
                            prop_assert_eq!(cache.get(&k).copied(), expected);
                        },
                        Op::Delete(k) => {
                            let existed = model.iter().any(|(mk, _)| *mk == k);
                            model.retain(|(mk, _)| *mk != k);
                            prop_assert_eq!(cache.delete(&k), existed);
                        },
                    }
                    prop_assert!(cache.check_invariants().is_ok());
                }
                let keys: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(cache.keys(), keys);
            }

            #[test]
            fn budget_never_exceeded(sizes in prop::collection::vec(1usize..60, 1..100)) {
                let mut cache: BoundedCache<usize, usize> = CacheBuilder::new(16)
                    .max_memory(100)
                    .size_calculator(|_, v: &usize| *v)
                    .build()
                    .unwrap();
                for (i, size) in sizes.into_iter().enumerate() {
                    cache.set(i % 20, size);
                    prop_assert!(cache.memory_usage() <= 100);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }
        }
    }
}
