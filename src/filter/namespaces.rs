//! Domain-keyed wrappers over [`MembershipFilter`].
//!
//! Each kind of identifier gets its own prefix so that, for example, a
//! transaction hash and an address with the same text never alias.
//!
//! | Kind        | Stored as           | Normalisation                 |
//! |-------------|---------------------|-------------------------------|
//! | transaction | `tx:<hash>`         | none                          |
//! | address     | `addr:<address>`    | lower-cased                   |
//! | token pair  | `pair:<A>/<B>`      | `A ≤ B` lexicographically     |
//!
//! ```
//! use hotpath::filter::MembershipFilter;
//!
//! let mut seen = MembershipFilter::new(1_000, 0.001).unwrap();
//! seen.add_address("0xAbC123");
//! seen.add_token_pair("WETH", "USDC");
//!
//! assert!(seen.has_address("0xabc123"));
//! assert!(seen.has_token_pair("USDC", "WETH"));
//! assert!(!seen.has_transaction("0xabc123"));
//! ```

use crate::filter::bloom::MembershipFilter;

pub const TRANSACTION_PREFIX: &str = "tx:";
pub const ADDRESS_PREFIX: &str = "addr:";
pub const TOKEN_PAIR_PREFIX: &str = "pair:";

pub fn transaction_key(hash: &str) -> String {
    format!("{TRANSACTION_PREFIX}{hash}")
}

pub fn address_key(address: &str) -> String {
    format!("{ADDRESS_PREFIX}{}", address.to_lowercase())
}

/// Same key for `(a, b)` and `(b, a)`.
pub fn token_pair_key(token_a: &str, token_b: &str) -> String {
    let (first, second) = if token_a <= token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    format!("{TOKEN_PAIR_PREFIX}{first}/{second}")
}

impl MembershipFilter {
    pub fn add_transaction(&mut self, hash: &str) {
        self.add(transaction_key(hash).as_str());
    }

    pub fn has_transaction(&self, hash: &str) -> bool {
        self.contains(transaction_key(hash).as_str())
    }

    /// Addresses compare case-insensitively.
    pub fn add_address(&mut self, address: &str) {
        self.add(address_key(address).as_str());
    }

    pub fn has_address(&self, address: &str) -> bool {
        self.contains(address_key(address).as_str())
    }

    /// Pairs are unordered: `(A, B)` and `(B, A)` are the same pair.
    pub fn add_token_pair(&mut self, token_a: &str, token_b: &str) {
        self.add(token_pair_key(token_a, token_b).as_str());
    }

    pub fn has_token_pair(&self, token_a: &str, token_b: &str) -> bool {
        self.contains(token_pair_key(token_a, token_b).as_str())
    }
}
