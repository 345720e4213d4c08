//! Serializable copy of a [`MembershipFilter`](super::MembershipFilter).

use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;

/// Bit words plus everything needed to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub config: FilterConfig,
    pub bit_count: usize,
    pub hash_count: u32,
    pub seed: u64,
    /// Packed bits, 64 per word, bit `i` at word `i / 64`.
    pub words: Vec<u64>,
    pub elements_added: u64,
    pub lookups: u64,
    pub positive_lookups: u64,
}
