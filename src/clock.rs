//! Millisecond time sources.
//!
//! TTL bookkeeping in [`BoundedCache`](crate::cache::BoundedCache) reads time
//! through the [`Clock`] trait so tests can advance time by hand.
//!
//! - [`SystemClock`]: wall-clock milliseconds since the Unix epoch. Wall time
//!   is used (rather than a process-local monotonic origin) so that exported
//!   timestamps stay meaningful after an import into another instance.
//! - [`ManualClock`]: a shared counter advanced explicitly.
//!
//! ```
//! use std::time::Duration;
//! use hotpath::clock::{Clock, ManualClock};
//!
//! let clock = ManualClock::new(1_000);
//! let handle = clock.clone();
//! handle.advance(Duration::from_millis(250));
//! assert_eq!(clock.now_millis(), 1_250);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of millisecond timestamps.
pub trait Clock: fmt::Debug {
    /// Current time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        // Pre-epoch system time clamps to zero.
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same underlying counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start_millis`.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_millis)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_millis(by), Ordering::SeqCst);
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Converts a `Duration` to whole milliseconds, saturating at `u64::MAX`.
#[inline]
pub(crate) fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Converts a `Duration` to milliseconds, rounding any fraction up so a
/// deadline derived from it is never earlier than `d`.
#[inline]
pub(crate) fn duration_millis_ceil(d: Duration) -> u64 {
    u64::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}
