//! Probabilistic set membership.
//!
//! - [`MembershipFilter`]: Bloom filter with seeded double hashing.
//! - [`hash`]: the hashing scheme behind it.
//! - [`namespaces`]: prefixed wrappers for transactions, addresses and token pairs.
//! - [`FilterSnapshot`]: export/import format.

pub mod bloom;
pub mod hash;
pub mod namespaces;
pub mod snapshot;

pub use bloom::{optimal_bit_count, optimal_hash_count, MembershipFilter};
pub use snapshot::FilterSnapshot;
