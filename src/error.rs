//! Error types for the ordkit library.
//!
//! ## Key Components
//!
//! - [`MapError`]: Returned by map and view operations (null-policy
//!   violations, out-of-range view access, comparator failures, fail-fast
//!   cursor fences, mutation through read-only projections).
//! - [`ConfigError`]: Returned when builder parameters are invalid
//!   (e.g. a non-positive load factor).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use ordkit::error::{ConfigError, MapError};
//! use ordkit::map::navigable::NavigableMap;
//! use ordkit::map::ordered_hash_map::OrderedHashMap;
//!
//! // Fallible builder for user-configurable parameters
//! let bad: Result<OrderedHashMap<u32, u32>, ConfigError> =
//!     OrderedHashMap::builder().load_factor(0.0).try_build();
//! assert!(bad.is_err());
//!
//! // Views reject keys outside their bounds
//! let mut map = NavigableMap::new();
//! map.insert(5, "five").unwrap();
//! let mut head = map.head_map(10, false).unwrap();
//! assert_eq!(head.insert(12, "twelve"), Err(MapError::OutOfRange));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// MapError
// ---------------------------------------------------------------------------

/// Error returned by map, view and cursor operations.
///
/// Every mutating operation either completes fully or fails with one of these
/// before any structure has been modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapError {
    /// A key or value flagged as "null" by the configured
    /// [`NullPolicy`](crate::builder::NullPolicy), or inverted sub-map bounds.
    InvalidArgument,
    /// The requested key is absent (throwing accessors such as `first_key`),
    /// or a cursor was asked to remove without a current element.
    NotFound,
    /// Insertion or sub-view construction outside a view's bounds.
    OutOfRange,
    /// The active comparator could not order two keys.
    Incomparable,
    /// A detached cursor observed a structural change it did not make.
    ConcurrentModification,
    /// Structural mutation through a read-only view or projection.
    UnsupportedMutation,
}

impl MapError {
    /// Returns a short, stable description of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapError::InvalidArgument => "invalid argument",
            MapError::NotFound => "key not found",
            MapError::OutOfRange => "key out of range",
            MapError::Incomparable => "keys are not comparable",
            MapError::ConcurrentModification => "map modified during iteration",
            MapError::UnsupportedMutation => "mutation not supported by this view",
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for MapError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal map invariants are violated.
///
/// Produced by `check_invariants` on
/// [`OrderedHashMap`](crate::map::ordered_hash_map::OrderedHashMap) and
/// [`NavigableMap`](crate::map::navigable::NavigableMap).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when map configuration parameters are invalid.
///
/// Produced by builder `try_build()` methods. Carries a human-readable
/// description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use ordkit::map::ordered_hash_map::OrderedHashMap;
///
/// let err = OrderedHashMap::<u64, u64>::builder()
///     .load_factor(f32::NAN)
///     .try_build()
///     .unwrap_err();
/// assert!(err.to_string().contains("load factor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- MapError ---------------------------------------------------------

    #[test]
    fn map_error_display_matches_kind() {
        assert_eq!(MapError::OutOfRange.to_string(), "key out of range");
        assert_eq!(
            MapError::ConcurrentModification.to_string(),
            "map modified during iteration"
        );
        assert_eq!(MapError::Incomparable.to_string(), "keys are not comparable");
    }

    #[test]
    fn map_error_kinds_are_distinct() {
        let kinds = [
            MapError::InvalidArgument,
            MapError::NotFound,
            MapError::OutOfRange,
            MapError::Incomparable,
            MapError::ConcurrentModification,
            MapError::UnsupportedMutation,
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().map(|k| k.as_str()).collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn map_error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<MapError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("order list length mismatch");
        assert_eq!(err.to_string(), "order list length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("load factor must be positive");
        assert_eq!(err.to_string(), "load factor must be positive");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("bad load factor");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad load factor"));
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
