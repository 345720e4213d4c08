//! Fixed-capacity ring buffer for streaming time series.
//!
//! Keeps the most recent `C` items (overwrite mode) or refuses writes once
//! full (reject mode). Slots are reused in place; no operation other than
//! [`resize`](CircularBuffer::resize) allocates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                    CircularBuffer<T> (capacity = 4)                          │
//! │                                                                             │
//! │   After push: 10, 20, 30, 40, 50   (overwrite mode)                         │
//! │                                                                             │
//! │   Index:     0        1        2        3                                   │
//! │            ┌────────┬────────┬────────┬────────┐                          │
//! │   slots:   │Some(50)│Some(20)│Some(30)│Some(40)│                          │
//! │            └────────┴────────┴────────┴────────┘                          │
//! │                         ▲                                                   │
//! │                         │                                                   │
//! │                  head = tail = 1      len = 4 (full)                        │
//! │          (oldest item, next write)                                          │
//! │                                                                             │
//! │   peek(offset)   = slots[(head + offset) % C]                               │
//! │   get_latest(n)  = slots[(tail + C - 1 - i) % C]  for i in 0..n             │
//! │                                                                             │
//! │   push when full:                                                           │
//! │     Overwrite: slots[tail] = new, head += 1, tail += 1, overflows += 1      │
//! │     Reject:    nothing written, rejected += 1, returns false                │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation            | Description                               | Complexity |
//! |----------------------|-------------------------------------------|------------|
//! | [`push`]             | Append newest item                        | O(1)       |
//! | [`pop`]              | Remove oldest item                        | O(1)       |
//! | [`peek`]             | Item `offset` positions after the oldest  | O(1)       |
//! | [`get_latest`]       | Up to `n` newest items, newest first      | O(n)       |
//! | [`push_batch`]       | Sequential pushes                         | O(n)       |
//! | [`pop_batch`]        | Sequential pops                           | O(n)       |
//! | [`resize`]           | Rebuild, keeping the newest items         | O(C')      |
//! | [`compact`]          | Rotate so the oldest item sits in slot 0  | O(C)       |
//!
//! Windowed analytics live in [`analytics`](super::analytics).
//!
//! [`push`]: CircularBuffer::push
//! [`pop`]: CircularBuffer::pop
//! [`peek`]: CircularBuffer::peek
//! [`get_latest`]: CircularBuffer::get_latest
//! [`push_batch`]: CircularBuffer::push_batch
//! [`pop_batch`]: CircularBuffer::pop_batch
//! [`resize`]: CircularBuffer::resize
//! [`compact`]: CircularBuffer::compact
//!
//! ## Example Usage
//!
//! ```
//! use hotpath::buffer::CircularBuffer;
//!
//! let mut ticks = CircularBuffer::new(3).unwrap();
//! for price in [1, 2, 3, 4] {
//!     ticks.push(price);
//! }
//!
//! let latest: Vec<i32> = ticks.get_latest(3).into_iter().copied().collect();
//! assert_eq!(latest, vec![4, 3, 2]);
//! assert_eq!(ticks.peek(0), Some(&2));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe; read counters use [`MetricsCell`].

use tracing::debug;

use crate::buffer::snapshot::BufferSnapshot;
use crate::config::{BufferConfig, OverflowMode};
use crate::error::{ConfigError, InvariantError};
use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::BufferMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};

/// Ring buffer of `T` with a fixed number of slots.
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
    mode: OverflowMode,
    writes: u64,
    overflows: u64,
    rejected: u64,
    reads: MetricsCell,
}

impl<T> CircularBuffer<T> {
    /// Creates an overwrite-mode buffer with `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(BufferConfig {
            capacity,
            mode: OverflowMode::Overwrite,
        })
    }

    pub fn with_config(config: BufferConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            slots: Self::empty_slots(config.capacity),
            head: 0,
            tail: 0,
            len: 0,
            mode: config.mode,
            writes: 0,
            overflows: 0,
            rejected: 0,
            reads: MetricsCell::default(),
        })
    }

    fn empty_slots(capacity: usize) -> Vec<Option<T>> {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        slots
    }

    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.slots.len()
    }

    // -------------------------------------------------------------------
    // Core operations
    // -------------------------------------------------------------------

    /// Appends `item` as the newest element.
    ///
    /// On a full buffer, overwrite mode drops the oldest item and returns
    /// `true`; reject mode leaves the contents untouched and returns `false`.
    pub fn push(&mut self, item: T) -> bool {
        let capacity = self.slots.len();
        if self.len == capacity {
            match self.mode {
                OverflowMode::Reject => {
                    self.rejected += 1;
                    return false;
                },
                OverflowMode::Overwrite => {
                    self.head = (self.head + 1) % capacity;
                    self.overflows += 1;
                },
            }
        } else {
            self.len += 1;
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % capacity;
        self.writes += 1;
        true
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        self.reads.incr();
        item
    }

    /// Item `offset` positions after the oldest; `peek(0)` is the oldest.
    pub fn peek(&self, offset: usize) -> Option<&T> {
        if offset >= self.len {
            return None;
        }
        self.reads.incr();
        self.slots[self.slot(offset)].as_ref()
    }

    /// Up to `n` most recently pushed items, newest first.
    pub fn get_latest(&self, n: usize) -> Vec<&T> {
        let take = n.min(self.len);
        if take > 0 {
            self.reads.incr();
        }
        (0..take)
            .filter_map(|i| self.slots[self.slot(self.len - 1 - i)].as_ref())
            .collect()
    }

    /// Pushes items in order. Reject mode stops at the first refused item;
    /// returns the number written.
    pub fn push_batch<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut written = 0;
        for item in items {
            if !self.push(item) {
                break;
            }
            written += 1;
        }
        written
    }

    /// Pops up to `n` items, oldest first.
    pub fn pop_batch(&mut self, n: usize) -> Vec<T> {
        let take = n.min(self.len);
        let mut out = Vec::with_capacity(take);
        for _ in 0..take {
            match self.pop() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        out
    }

    // -------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------

    /// Rebuilds storage with `new_capacity` slots, keeping the newest items
    /// that fit. Returns the number of items dropped.
    pub fn resize(&mut self, new_capacity: usize) -> Result<usize, ConfigError> {
        BufferConfig {
            capacity: new_capacity,
            mode: self.mode,
        }
        .validate()?;
        let dropped = self.len.saturating_sub(new_capacity);
        for _ in 0..dropped {
            self.slots[self.head] = None;
            self.head = (self.head + 1) % self.slots.len();
        }
        let keep = self.len - dropped;
        let mut slots = Self::empty_slots(new_capacity);
        for (i, slot) in slots.iter_mut().enumerate().take(keep) {
            let from = (self.head + i) % self.slots.len();
            *slot = self.slots[from].take();
        }
        self.slots = slots;
        self.head = 0;
        self.len = keep;
        self.tail = keep % new_capacity;
        debug!(new_capacity, dropped, "buffer resized");
        Ok(dropped)
    }

    /// Rotates storage so the oldest item sits in slot 0. Observable
    /// behaviour is unchanged.
    pub fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        self.slots.rotate_left(self.head);
        self.head = 0;
        self.tail = self.len % self.slots.len();
    }

    /// Drops every item; the slot allocation is kept. Metrics are kept.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn mode(&self) -> OverflowMode {
        self.mode
    }

    pub fn config(&self) -> BufferConfig {
        BufferConfig {
            capacity: self.slots.len(),
            mode: self.mode,
        }
    }

    /// Items from oldest to newest. Does not count as a read.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            front: 0,
            back: self.len,
        }
    }

    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    pub fn newest(&self) -> Option<&T> {
        self.iter().next_back()
    }

    pub fn metrics(&self) -> BufferMetricsSnapshot {
        self.snapshot()
    }

    /// Checks index arithmetic and that exactly `len` slots are occupied,
    /// all of them contiguous from `head`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let capacity = self.slots.len();
        if capacity == 0 {
            return Err(InvariantError::new("buffer has no slots"));
        }
        if self.len > capacity || self.head >= capacity || self.tail >= capacity {
            return Err(InvariantError::new("buffer indices out of range"));
        }
        if (self.head + self.len) % capacity != self.tail {
            return Err(InvariantError::new("tail is not head + len"));
        }
        for offset in 0..capacity {
            let occupied = self.slots[self.slot(offset)].is_some();
            if occupied != (offset < self.len) {
                return Err(InvariantError::new(format!(
                    "slot at offset {offset} occupancy disagrees with len {}",
                    self.len
                )));
            }
        }
        Ok(())
    }
}

impl<T: Clone> CircularBuffer<T> {
    /// Clones the contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn export(&self) -> BufferSnapshot<T> {
        BufferSnapshot {
            config: self.config(),
            items: self.to_vec(),
            metrics: self.snapshot(),
        }
    }
}

impl<T> CircularBuffer<T> {
    /// Rebuilds a buffer from an exported snapshot.
    pub fn import(snapshot: BufferSnapshot<T>) -> Result<Self, ConfigError> {
        let mut buffer = Self::with_config(snapshot.config)?;
        if snapshot.items.len() > buffer.capacity() {
            return Err(ConfigError::new(format!(
                "buffer snapshot holds {} items but capacity is {}",
                snapshot.items.len(),
                buffer.capacity()
            )));
        }
        for item in snapshot.items {
            buffer.push(item);
        }
        let m = snapshot.metrics;
        buffer.writes = m.writes;
        buffer.overflows = m.overflows;
        buffer.rejected = m.rejected;
        buffer.reads = MetricsCell::new(m.reads);
        debug!(items = buffer.len, "buffer imported");
        Ok(buffer)
    }
}

impl<T> MetricsSnapshotProvider<BufferMetricsSnapshot> for CircularBuffer<T> {
    fn snapshot(&self) -> BufferMetricsSnapshot {
        BufferMetricsSnapshot {
            writes: self.writes,
            reads: self.reads.get(),
            overflows: self.overflows,
            rejected: self.rejected,
            len: self.len,
            capacity: self.slots.len(),
        }
    }
}

impl<T> MetricsReset for CircularBuffer<T> {
    fn reset_metrics(&mut self) {
        self.writes = 0;
        self.overflows = 0;
        self.rejected = 0;
        self.reads.reset();
    }
}

/// Borrowed iterator, oldest to newest.
#[derive(Debug)]
pub struct Iter<'a, T> {
    buffer: &'a CircularBuffer<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let idx = self.buffer.slot(self.front);
        self.front += 1;
        self.buffer.slots[idx].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let idx = self.buffer.slot(self.back);
        self.buffer.slots[idx].as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a CircularBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
