//! Builders for both map families.
//!
//! Construction-time knobs live here so the maps themselves only expose
//! operations. Every builder has an infallible `build()` that panics on
//! invalid input and a `try_build()` that reports it as a [`ConfigError`].
//!
//! ## Example
//!
//! ```rust
//! use ordkit::builder::OrderedHashMapBuilder;
//! use ordkit::error::MapError;
//! use ordkit::policy::MaxEntries;
//!
//! let mut cache = OrderedHashMapBuilder::new()
//!     .capacity(64)
//!     .access_order(true)
//!     .eviction(MaxEntries::new(2))
//!     .null_values(|v: &String| v.is_empty())
//!     .build();
//! cache.insert(1_u32, "one".to_string()).unwrap();
//! assert_eq!(cache.insert(2, String::new()), Err(MapError::InvalidArgument));
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::error::{ConfigError, MapError};
use crate::map::navigable::NavigableMap;
use crate::map::ordered_hash_map::OrderedHashMap;
use crate::ordering::Natural;
use crate::policy::eviction::NeverEvict;

/// Load factor used when none is configured.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Which keys and values a map treats as "null" and refuses to store.
///
/// The default flags nothing, so every key and value is accepted.
pub struct NullPolicy<K, V> {
    key: Option<fn(&K) -> bool>,
    value: Option<fn(&V) -> bool>,
}

impl<K, V> NullPolicy<K, V> {
    /// Accepts everything.
    pub const fn none() -> Self {
        Self {
            key: None,
            value: None,
        }
    }

    pub fn with_null_keys(mut self, is_null: fn(&K) -> bool) -> Self {
        self.key = Some(is_null);
        self
    }

    pub fn with_null_values(mut self, is_null: fn(&V) -> bool) -> Self {
        self.value = Some(is_null);
        self
    }

    #[inline]
    pub fn check_key(&self, key: &K) -> Result<(), MapError> {
        match self.key {
            Some(is_null) if is_null(key) => Err(MapError::InvalidArgument),
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn check_value(&self, value: &V) -> Result<(), MapError> {
        match self.value {
            Some(is_null) if is_null(value) => Err(MapError::InvalidArgument),
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn check(&self, key: &K, value: &V) -> Result<(), MapError> {
        self.check_key(key)?;
        self.check_value(value)
    }
}

impl<K, V> Default for NullPolicy<K, V> {
    fn default() -> Self {
        Self::none()
    }
}

impl<K, V> Clone for NullPolicy<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NullPolicy<K, V> {}

impl<K, V> fmt::Debug for NullPolicy<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullPolicy")
            .field("null_keys", &self.key.is_some())
            .field("null_values", &self.value.is_some())
            .finish()
    }
}

/// Builder for [`OrderedHashMap`].
///
/// | Knob           | Default          |
/// |----------------|------------------|
/// | `capacity`     | 0                |
/// | `load_factor`  | 0.75             |
/// | `access_order` | `false`          |
/// | `eviction`     | [`NeverEvict`]   |
/// | `hasher`       | `FxBuildHasher`  |
/// | null policy    | nothing is null  |
pub struct OrderedHashMapBuilder<K, V, P = NeverEvict, S = FxBuildHasher> {
    capacity: usize,
    load_factor: f32,
    access_order: bool,
    policy: P,
    hasher: S,
    nulls: NullPolicy<K, V>,
}

impl<K, V> OrderedHashMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            capacity: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            access_order: false,
            policy: NeverEvict,
            hasher: FxBuildHasher,
            nulls: NullPolicy::none(),
        }
    }
}

impl<K, V> Default for OrderedHashMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P, S> OrderedHashMapBuilder<K, V, P, S> {
    /// Initial capacity hint.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Fraction of `capacity` the map fills before it first grows. The table
    /// is pre-sized for `capacity * load_factor` entries, capped at
    /// `capacity`. Must be finite and positive.
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// `true` orders entries by last access instead of first insertion.
    pub fn access_order(mut self, access_order: bool) -> Self {
        self.access_order = access_order;
        self
    }

    pub fn eviction<P2>(self, policy: P2) -> OrderedHashMapBuilder<K, V, P2, S> {
        OrderedHashMapBuilder {
            capacity: self.capacity,
            load_factor: self.load_factor,
            access_order: self.access_order,
            policy,
            hasher: self.hasher,
            nulls: self.nulls,
        }
    }

    pub fn hasher<S2>(self, hasher: S2) -> OrderedHashMapBuilder<K, V, P, S2> {
        OrderedHashMapBuilder {
            capacity: self.capacity,
            load_factor: self.load_factor,
            access_order: self.access_order,
            policy: self.policy,
            hasher,
            nulls: self.nulls,
        }
    }

    /// Keys for which `is_null` holds are rejected with `InvalidArgument`.
    pub fn null_keys(mut self, is_null: fn(&K) -> bool) -> Self {
        self.nulls = self.nulls.with_null_keys(is_null);
        self
    }

    /// Values for which `is_null` holds are rejected with `InvalidArgument`.
    pub fn null_values(mut self, is_null: fn(&V) -> bool) -> Self {
        self.nulls = self.nulls.with_null_values(is_null);
        self
    }
}

impl<K, V, P, S> OrderedHashMapBuilder<K, V, P, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Builds the map, reporting an unusable load factor.
    pub fn try_build(self) -> Result<OrderedHashMap<K, V, P, S>, ConfigError> {
        let presize = presize(self.capacity, self.load_factor)?;
        Ok(OrderedHashMap::from_parts(
            presize,
            self.access_order,
            self.policy,
            self.hasher,
            self.nulls,
        ))
    }

    /// Builds the map.
    ///
    /// # Panics
    ///
    /// Panics if the load factor is not finite or not positive.
    pub fn build(self) -> OrderedHashMap<K, V, P, S> {
        match self.try_build() {
            Ok(map) => map,
            Err(err) => panic!("{}", err),
        }
    }
}

fn presize(capacity: usize, load_factor: f32) -> Result<usize, ConfigError> {
    if !load_factor.is_finite() || load_factor <= 0.0 {
        return Err(ConfigError::new(format!(
            "load factor must be finite and positive, got {}",
            load_factor
        )));
    }
    let threshold = (capacity as f64 * f64::from(load_factor)).ceil();
    Ok(if threshold >= capacity as f64 {
        capacity
    } else {
        threshold as usize
    })
}

/// Builder for [`NavigableMap`].
pub struct NavigableMapBuilder<K, V, C = Natural> {
    order: C,
    nulls: NullPolicy<K, V>,
}

impl<K, V> NavigableMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            order: Natural,
            nulls: NullPolicy::none(),
        }
    }
}

impl<K, V> Default for NavigableMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> NavigableMapBuilder<K, V, C> {
    /// Key order; see [`crate::ordering`].
    pub fn order<C2>(self, order: C2) -> NavigableMapBuilder<K, V, C2> {
        NavigableMapBuilder {
            order,
            nulls: self.nulls,
        }
    }

    pub fn null_keys(mut self, is_null: fn(&K) -> bool) -> Self {
        self.nulls = self.nulls.with_null_keys(is_null);
        self
    }

    pub fn null_values(mut self, is_null: fn(&V) -> bool) -> Self {
        self.nulls = self.nulls.with_null_values(is_null);
        self
    }

    pub fn build(self) -> NavigableMap<K, V, C> {
        NavigableMap::from_parts(self.order, self.nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Reversed;
    use crate::policy::MaxEntries;

    #[test]
    fn null_policy_defaults_to_accepting_everything() {
        let policy: NullPolicy<Option<u32>, Option<u32>> = NullPolicy::default();
        assert_eq!(policy.check(&None, &None), Ok(()));
    }

    #[test]
    fn null_policy_flags_configured_predicates() {
        let policy: NullPolicy<Option<u32>, Option<u32>> = NullPolicy::none()
            .with_null_keys(Option::is_none)
            .with_null_values(Option::is_none);
        assert_eq!(policy.check(&Some(1), &Some(2)), Ok(()));
        assert_eq!(policy.check(&None, &Some(2)), Err(MapError::InvalidArgument));
        assert_eq!(policy.check(&Some(1), &None), Err(MapError::InvalidArgument));
        assert!(format!("{:?}", policy).contains("null_keys: true"));
    }

    #[test]
    fn presize_caps_at_capacity() {
        assert_eq!(presize(100, 0.75), Ok(75));
        assert_eq!(presize(100, 4.0), Ok(100));
        assert_eq!(presize(0, 0.5), Ok(0));
    }

    #[test]
    fn try_build_rejects_bad_load_factors() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = OrderedHashMapBuilder::<u32, u32>::new()
                .load_factor(bad)
                .try_build();
            let err = result.err().unwrap();
            assert!(err.message().contains("load factor"));
        }
    }

    #[test]
    #[should_panic(expected = "load factor")]
    fn build_panics_on_bad_load_factor() {
        let _ = OrderedHashMapBuilder::<u32, u32>::new().load_factor(0.0).build();
    }

    #[test]
    fn builder_carries_every_knob() {
        let map = OrderedHashMapBuilder::<u32, u32>::new()
            .capacity(16)
            .access_order(true)
            .eviction(MaxEntries::new(4))
            .hasher(std::collections::hash_map::RandomState::new())
            .build();
        assert!(map.access_order());
        assert_eq!(map.policy().limit(), 4);
        assert!(map.capacity() >= 12);
    }

    #[test]
    fn navigable_builder_sets_order_and_nulls() {
        let mut map = NavigableMapBuilder::<i32, &str>::new()
            .order(Reversed(Natural))
            .null_values(|v| v.is_empty())
            .build();
        map.insert(1, "a").unwrap();
        map.insert(2, "b").unwrap();
        assert_eq!(map.insert(3, ""), Err(MapError::InvalidArgument));
        assert_eq!(map.first_key(), Ok(&2));
    }
}
