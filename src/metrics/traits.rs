//! # Metrics Traits
//!
//! Recording lives inside each component; consumption is split into small
//! traits so monitoring code does not depend on component internals.
//!
//! ```text
//!   BoundedCache ──┐
//!   MembershipFilter ──┼──► MetricsSnapshotProvider<S> ──► MetricsExporter<S>
//!   CircularBuffer ──┘             (read)                     (publish)
//! ```

/// Produces a point-in-time copy of a component's counters and gauges.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Zeroes counters between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Publishes a snapshot to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
