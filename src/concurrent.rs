//! Thread-shareable handles (feature `concurrency`).
//!
//! The core components hold no locks. These wrappers put one
//! `parking_lot::Mutex` around an instance and hand out cheap `Clone`
//! handles. Reads need the lock as well: cache lookups reorder the recency
//! list and every component bumps read counters.
//!
//! Methods that would hand out a reference into the protected value return
//! owned clones instead; use [`SharedCache::with`] (and friends) to run a
//! closure against the locked instance when that is too costly.
//!
//! ```
//! use std::thread;
//! use hotpath::concurrent::SharedFilter;
//! use hotpath::filter::MembershipFilter;
//!
//! let seen = SharedFilter::new(MembershipFilter::new(1_000, 0.01).unwrap());
//! let writer = seen.clone();
//! thread::spawn(move || writer.add_transaction("0xfeed")).join().unwrap();
//! assert!(seen.has_transaction("0xfeed"));
//! ```

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::CircularBuffer;
use crate::cache::BoundedCache;
use crate::filter::MembershipFilter;
use crate::metrics::snapshot::{BufferMetricsSnapshot, CacheMetricsSnapshot, FilterMetricsSnapshot};

// ---------------------------------------------------------------------------
// SharedCache
// ---------------------------------------------------------------------------

/// `Arc<Mutex<BoundedCache>>` with value-returning accessors.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<BoundedCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(cache: BoundedCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// `get` returning a clone of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V) -> bool {
        self.inner.lock().set(key, value)
    }

    pub fn delete(&self, key: &K) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.inner.lock().has(key)
    }

    /// Periodic sweep hook; see [`BoundedCache::tick`].
    pub fn tick(&self) -> usize {
        self.inner.lock().tick()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.inner.lock().metrics()
    }

    /// Runs `f` with the cache locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut BoundedCache<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn lock(&self) -> MutexGuard<'_, BoundedCache<K, V>> {
        self.inner.lock()
    }
}

// ---------------------------------------------------------------------------
// SharedFilter
// ---------------------------------------------------------------------------

/// `Arc<Mutex<MembershipFilter>>`.
#[derive(Debug, Clone)]
pub struct SharedFilter {
    inner: Arc<Mutex<MembershipFilter>>,
}

impl SharedFilter {
    pub fn new(filter: MembershipFilter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(filter)),
        }
    }

    pub fn add<T: Hash + ?Sized>(&self, item: &T) {
        self.inner.lock().add(item);
    }

    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.inner.lock().contains(item)
    }

    pub fn add_transaction(&self, hash: &str) {
        self.inner.lock().add_transaction(hash);
    }

    pub fn has_transaction(&self, hash: &str) -> bool {
        self.inner.lock().has_transaction(hash)
    }

    pub fn add_address(&self, address: &str) {
        self.inner.lock().add_address(address);
    }

    pub fn has_address(&self, address: &str) -> bool {
        self.inner.lock().has_address(address)
    }

    pub fn add_token_pair(&self, token_a: &str, token_b: &str) {
        self.inner.lock().add_token_pair(token_a, token_b);
    }

    pub fn has_token_pair(&self, token_a: &str, token_b: &str) -> bool {
        self.inner.lock().has_token_pair(token_a, token_b)
    }

    pub fn should_resize(&self) -> bool {
        self.inner.lock().should_resize()
    }

    pub fn metrics(&self) -> FilterMetricsSnapshot {
        self.inner.lock().metrics()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MembershipFilter) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

// ---------------------------------------------------------------------------
// SharedBuffer
// ---------------------------------------------------------------------------

/// `Arc<Mutex<CircularBuffer>>` with owned reads.
#[derive(Debug)]
pub struct SharedBuffer<T> {
    inner: Arc<Mutex<CircularBuffer<T>>>,
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedBuffer<T> {
    pub fn new(buffer: CircularBuffer<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    pub fn push(&self, item: T) -> bool {
        self.inner.lock().push(item)
    }

    pub fn pop(&self) -> Option<T> {
        self.inner.lock().pop()
    }

    /// Clones of up to `n` newest items, newest first.
    pub fn get_latest(&self, n: usize) -> Vec<T>
    where
        T: Clone,
    {
        self.inner
            .lock()
            .get_latest(n)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn metrics(&self) -> BufferMetricsSnapshot {
        self.inner.lock().metrics()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut CircularBuffer<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
