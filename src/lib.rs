//! hotpath: in-memory primitives for the hot path of market-data services.
//!
//! - [`cache::BoundedCache`]: O(1) LRU cache with TTL expiry and a byte budget.
//! - [`filter::MembershipFilter`]: Bloom filter with domain-keyed wrappers.
//! - [`buffer::CircularBuffer`]: ring buffer with windowed analytics.
//!
//! Shared pieces: [`config`] for validated settings, [`metrics`] for counter
//! snapshots and Prometheus text export, [`clock`] for injectable time.
//! [`presets`] fixes configurations for common workloads. With the
//! `concurrency` feature, [`concurrent`] adds mutex-guarded shared handles.
//!
//! Library code logs through `tracing` and never installs a subscriber.

pub mod buffer;
pub mod builder;
pub mod cache;
pub mod clock;
pub mod config;
pub mod ds;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod prelude;
pub mod presets;

#[cfg(feature = "concurrency")]
pub mod concurrent;

pub use crate::buffer::CircularBuffer;
pub use crate::cache::BoundedCache;
pub use crate::error::{ConfigError, InvariantError};
pub use crate::filter::MembershipFilter;
