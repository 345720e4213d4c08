//! Ring buffer for streaming time series.
//!
//! - [`CircularBuffer`]: the buffer, in overwrite or reject mode.
//! - [`analytics`]: time-range filtering, moving averages and aggregation.
//! - [`BufferSnapshot`]: export/import format.

pub mod analytics;
pub mod circular;
pub mod snapshot;

pub use analytics::Timestamped;
pub use circular::{CircularBuffer, Iter};
pub use snapshot::BufferSnapshot;
