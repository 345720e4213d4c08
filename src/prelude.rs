pub use crate::buffer::{BufferSnapshot, CircularBuffer, Timestamped};
pub use crate::builder::CacheBuilder;
pub use crate::cache::{BoundedCache, CacheSnapshot, EvictionReason};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{BufferConfig, CacheConfig, FilterConfig, OverflowMode};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::filter::{FilterSnapshot, MembershipFilter};
pub use crate::metrics::{
    BufferMetricsSnapshot, CacheMetricsSnapshot, FilterMetricsSnapshot, MetricsExporter,
    MetricsReset, MetricsSnapshotProvider,
};

#[cfg(feature = "concurrency")]
pub use crate::concurrent::{SharedBuffer, SharedCache, SharedFilter};
