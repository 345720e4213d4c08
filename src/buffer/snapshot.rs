//! Serializable copy of a [`CircularBuffer`](super::CircularBuffer).

use serde::{Deserialize, Serialize};

use crate::config::BufferConfig;
use crate::metrics::snapshot::BufferMetricsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot<T> {
    pub config: BufferConfig,
    /// Contents, oldest first.
    pub items: Vec<T>,
    pub metrics: BufferMetricsSnapshot,
}
