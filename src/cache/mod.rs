//! Recency-ordered key/value cache bounded by count, bytes and time.
//!
//! - [`BoundedCache`]: the cache itself.
//! - [`size`]: entry size estimators for the memory budget.
//! - [`CacheSnapshot`]: export/import format.

pub mod bounded;
pub mod size;
pub mod snapshot;

pub use bounded::{BoundedCache, EvictionCallback, EvictionReason};
pub use snapshot::{CacheSnapshot, EntrySnapshot};
