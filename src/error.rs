//! Error types for the hotpath library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when configuration parameters are invalid
//!   (zero capacity, out-of-range false-positive rate, incompatible filter
//!   operands, malformed snapshots).
//! - [`InvariantError`]: Returned by `check_invariants` methods when an
//!   internal data-structure invariant does not hold.
//!
//! Everything else in the crate is a total function: full buffers, missing
//! keys and similar outcomes are reported through `bool`/`Option` results.
//!
//! ## Example Usage
//!
//! ```
//! use hotpath::error::ConfigError;
//! use hotpath::filter::MembershipFilter;
//!
//! let bad: Result<MembershipFilter, ConfigError> = MembershipFilter::new(100, 1.5);
//! assert!(bad.unwrap_err().to_string().contains("false_positive_rate"));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal invariants are violated.
///
/// Produced by `check_invariants` on
/// [`BoundedCache`](crate::cache::BoundedCache),
/// [`MembershipFilter`](crate::filter::MembershipFilter) and
/// [`CircularBuffer`](crate::buffer::CircularBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Raised synchronously by the call that violates the precondition. The
/// instance the call was made on is left untouched.
///
/// # Example
///
/// ```
/// use hotpath::buffer::CircularBuffer;
///
/// let mut buffer: CircularBuffer<u32> = CircularBuffer::new(4).unwrap();
/// let err = buffer.resize(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("recency list length mismatch");
        assert_eq!(err.to_string(), "recency list length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("count exceeds capacity");
        assert_eq!(err.message(), "count exceeds capacity");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("filter size mismatch");
        assert!(format!("{:?}", err).contains("filter size mismatch"));
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ConfigError>();
    }
}
