//! ordkit: ordered hash maps with eviction hooks and comparator-ordered
//! navigable maps with live range views.
//!
//! - [`OrderedHashMap`]: hash map that remembers insertion order, or access
//!   order when configured, and asks an [`EvictionPolicy`] whether to drop
//!   its eldest entry after each new key.
//! - [`NavigableMap`]: sorted map over a pluggable [`KeyOrder`] with
//!   nearest-match queries and bounded or descending [`NavigableView`]s.
//! - Detached cursors on both maps fail fast with
//!   [`MapError::ConcurrentModification`] once the map changes under them.

pub mod builder;
pub mod ds;
pub mod error;
pub mod map;
pub mod ordering;
pub mod policy;
pub mod prelude;
pub mod store;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use crate::builder::{NavigableMapBuilder, NullPolicy, OrderedHashMapBuilder};
pub use crate::error::{ConfigError, InvariantError, MapError};
pub use crate::map::{NavigableMap, NavigableView, OrderedHashMap};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{NavigableMapMetricsSnapshot, OrderedMapMetricsSnapshot};
pub use crate::traits::{EvictionPolicy, KeyOrder};
