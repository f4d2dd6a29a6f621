//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity passed to a validating builder, `k == 0` for LRU-K).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods on every engine core).
//!
//! Cache operations themselves never fail: a miss is reported as `None` and a
//! zero-capacity engine turns every call into a no-op.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//! use evictkit::error::ConfigError;
//!
//! let ok = CacheBuilder::new(100).try_build::<u64, String>(CachePolicy::Lru);
//! assert!(ok.is_ok());
//!
//! let bad: Result<_, ConfigError> =
//!     CacheBuilder::new(0).try_build::<u64, String>(CachePolicy::Lfu);
//! assert!(bad.unwrap_err().to_string().contains("capacity"));
//! ```

use thiserror::Error;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`AgingLfuCore::try_new`](crate::policy::aging_lfu::AgingLfuCore::try_new)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
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

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed, e.g. an
/// index entry pointing at a node that is not linked into any list.
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
