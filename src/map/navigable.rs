//! # Navigable Map
//!
//! A map kept sorted by a pluggable [`KeyOrder`], with nearest-match queries,
//! endpoint polls, bounded ranges and live sub-map views.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                   NavigableMap<K, V, C>                        │
//!   │                                                                │
//!   │   TreeStore<K, V>            C: KeyOrder<K>      ModCount      │
//!   │   (AVL over SlotArena)       every comparison    structural    │
//!   │                              may fail            changes only  │
//!   └───────────────┬────────────────────────────────────────────────┘
//!                   │ &  / &mut
//!                   ▼
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │  NavigableView<'a, K, V, C>                                    │
//!   │  lo: Bound<K>, hi: Bound<K>, descending, read-only or writable │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fallible keyed operations
//!
//! Every operation that compares keys returns `Result<_, MapError>`: a
//! comparator that cannot order two keys yields
//! [`MapError::Incomparable`] and the map is left untouched.
//!
//! ## Nearest matches
//!
//! ```text
//!   keys:        1     3     5     7
//!   probe 4:     lower = floor = 3,  ceiling = higher = 5
//!   probe 5:     lower = 3, floor = ceiling = 5, higher = 7
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use ordkit::map::navigable::NavigableMap;
//!
//! let mut map = NavigableMap::new();
//! for k in [1, 3, 5, 7] {
//!     map.insert(k, k * 100).unwrap();
//! }
//! assert_eq!(map.floor_key(&4).unwrap(), Some(&3));
//! assert_eq!(map.ceiling_key(&4).unwrap(), Some(&5));
//! assert_eq!(map.lower_key(&1).unwrap(), None);
//!
//! let mut head = map.head_map(5, false).unwrap();
//! assert_eq!(head.len().unwrap(), 2);
//! head.insert(2, 200).unwrap();
//! assert_eq!(map.len(), 5);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Bound;

use crate::builder::{NavigableMapBuilder, NullPolicy};
use crate::ds::fence::{ModCount, Stamp};
use crate::ds::slot_arena::SlotId;
use crate::error::{InvariantError, MapError};
use crate::map::view::{Backing, NavigableView};
use crate::ordering::Natural;
use crate::store::tree::{Relation, TreeStore, Walk};
use crate::traits::KeyOrder;

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::NavigableMapMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::NavigableMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, NavigableMetricsReadRecorder,
    NavigableMetricsRecorder,
};

#[inline]
pub(crate) fn compare<K, C: KeyOrder<K>>(order: &C, a: &K, b: &K) -> Result<Ordering, MapError> {
    order.compare(a, b).ok_or(MapError::Incomparable)
}

/// Sorted map ordered by `C`.
pub struct NavigableMap<K, V, C = Natural> {
    tree: TreeStore<K, V>,
    order: C,
    mod_count: ModCount,
    nulls: NullPolicy<K, V>,
    #[cfg(feature = "metrics")]
    metrics: NavigableMapMetrics,
}

impl<K, V> NavigableMap<K, V> {
    /// Creates an empty map in the natural order of `K`.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map = NavigableMap::new();
    /// map.insert("pear", 3).unwrap();
    /// map.insert("apple", 1).unwrap();
    /// assert_eq!(map.first_key(), Ok(&"apple"));
    /// ```
    pub fn new() -> Self {
        Self::with_order(Natural)
    }

    /// Starts a builder for the key order and null policy.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::error::MapError;
    /// use ordkit::map::navigable::NavigableMap;
    /// use ordkit::ordering::{Natural, Reversed};
    ///
    /// let mut map = NavigableMap::builder()
    ///     .order(Reversed(Natural))
    ///     .null_keys(|k: &Option<u32>| k.is_none())
    ///     .build();
    /// map.insert(Some(1), "one").unwrap();
    /// map.insert(Some(2), "two").unwrap();
    /// assert_eq!(map.insert(None, "none"), Err(MapError::InvalidArgument));
    /// assert_eq!(map.first_key(), Ok(&Some(2)));
    /// ```
    pub fn builder() -> NavigableMapBuilder<K, V> {
        NavigableMapBuilder::new()
    }
}

impl<K, V> Default for NavigableMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> NavigableMap<K, V, C> {
    /// Creates an empty map ordered by `order`.
    pub fn with_order(order: C) -> Self {
        Self::from_parts(order, NullPolicy::none())
    }

    pub(crate) fn from_parts(order: C, nulls: NullPolicy<K, V>) -> Self {
        Self {
            tree: TreeStore::new(),
            order,
            mod_count: ModCount::new(),
            nulls,
            #[cfg(feature = "metrics")]
            metrics: NavigableMapMetrics::default(),
        }
    }

    /// Returns the number of entries.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map = NavigableMap::new();
    /// map.insert(1, 'a').unwrap();
    /// map.insert(1, 'b').unwrap();
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The order keys are kept in.
    pub fn comparator(&self) -> &C {
        &self.order
    }

    /// Current structural modification count.
    pub fn mod_count(&self) -> u64 {
        self.mod_count.get()
    }

    /// Removes every entry. Counts as one structural change.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map: NavigableMap<_, _> = (0..8).map(|k| (k, k)).collect();
    /// let before = map.mod_count();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.mod_count(), before + 1);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
        self.mod_count.bump();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Entry with the least key, `None` when empty.
    pub fn first_entry(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.first())
    }

    /// Entry with the greatest key, `None` when empty.
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.last())
    }

    /// Least key.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] when the map is empty.
    pub fn first_key(&self) -> Result<&K, MapError> {
        self.first_entry().map(|(k, _)| k).ok_or(MapError::NotFound)
    }

    /// Greatest key; [`MapError::NotFound`] when empty.
    pub fn last_key(&self) -> Result<&K, MapError> {
        self.last_entry().map(|(k, _)| k).ok_or(MapError::NotFound)
    }

    /// Removes and returns the entry with the least key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();
        let popped = self.tree.pop_first()?;
        self.mod_count.bump();
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();
        Some(popped)
    }

    /// Removes and returns the entry with the greatest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();
        let popped = self.tree.pop_last()?;
        self.mod_count.bump();
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();
        Some(popped)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            range: Range::full(&self.tree),
            remaining: self.tree.len(),
        }
    }

    /// Keys in ascending order.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = [(3, ()), (1, ()), (2, ())].into_iter().collect();
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// assert_eq!(map.keys().next_back(), Some(&3));
    /// ```
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(k, _)| k)
    }

    /// Values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, v)| v)
    }

    /// Read-only view over every key in descending order.
    pub fn descending_view(&self) -> NavigableView<'_, K, V, C> {
        NavigableView::unbounded(Backing::Shared(self), true)
    }

    /// Writable view over every key in descending order. Changes made through
    /// it are changes to this map.
    pub fn descending_map(&mut self) -> NavigableView<'_, K, V, C> {
        NavigableView::unbounded(Backing::Exclusive(self), true)
    }

    /// Read-only view over the whole map.
    pub fn view(&self) -> NavigableView<'_, K, V, C> {
        NavigableView::unbounded(Backing::Shared(self), false)
    }

    /// Detached fail-fast cursor positioned before the least key.
    pub fn cursor(&self) -> NavCursor {
        NavCursor {
            stamp: self.mod_count.stamp(),
            walk: Walk::first(&self.tree),
            current: None,
        }
    }

    pub(crate) fn tree(&self) -> &TreeStore<K, V> {
        &self.tree
    }

    pub(crate) fn entry_at(&self, id: Option<SlotId>) -> Option<(&K, &V)> {
        let node = self.tree.node(id?)?;
        Some((&node.key, &node.value))
    }

    #[inline]
    pub(crate) fn note_view(&self) {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_view_call();
    }
}

impl<K, V, C: KeyOrder<K>> NavigableMap<K, V, C> {
    /// Associates `value` with `key`; returns the superseded value.
    ///
    /// # Errors
    ///
    /// - [`MapError::InvalidArgument`] if the null policy rejects the pair.
    /// - [`MapError::Incomparable`] if `key` cannot be ordered against a
    ///   stored key.
    ///
    /// Either way nothing is modified.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();
        if let Err(err) = self.nulls.check(&key, &value) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return Err(err);
        }
        // A lone key is still checked against itself so an unorderable key
        // never becomes the root.
        compare(&self.order, &key, &key).map_err(|err| self.incomparable(err))?;
        let replaced = self
            .tree
            .insert(key, value, &self.order)
            .map_err(|err| self.incomparable(err))?;
        match replaced {
            Some(old) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();
                Ok(Some(old))
            },
            None => {
                self.mod_count.bump();
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();
                Ok(None)
            },
        }
    }

    /// Returns the value stored under a key equal to `key` in the map's order.
    ///
    /// # Errors
    ///
    /// [`MapError::Incomparable`] if the comparator cannot order `key`.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map = NavigableMap::new();
    /// map.insert(2, "two").unwrap();
    /// assert_eq!(map.get(&2), Ok(Some(&"two")));
    /// assert_eq!(map.get(&3), Ok(None));
    /// ```
    pub fn get(&self, key: &K) -> Result<Option<&V>, MapError> {
        let id = self.tree.find(key, &self.order)?;
        #[cfg(feature = "metrics")]
        if id.is_some() {
            (&self.metrics).record_lookup_hit();
        } else {
            (&self.metrics).record_lookup_miss();
        }
        Ok(self.entry_at(id).map(|(_, v)| v))
    }

    /// Returns a mutable reference to the value under `key`.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map = NavigableMap::new();
    /// map.insert("hits", 0).unwrap();
    /// if let Some(hits) = map.get_mut(&"hits").unwrap() {
    ///     *hits += 1;
    /// }
    /// assert_eq!(map.get(&"hits"), Ok(Some(&1)));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, MapError> {
        let id = self.tree.find(key, &self.order)?;
        #[cfg(feature = "metrics")]
        if id.is_some() {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }
        Ok(id
            .and_then(|id| self.tree.node_mut(id))
            .map(|node| &mut node.value))
    }

    /// Returns `true` if some stored key compares equal to `key`.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    /// use ordkit::ordering::OrderWith;
    ///
    /// let mut map = NavigableMap::with_order(OrderWith(|a: &&'static str, b: &&'static str| {
    ///     Some(a.len().cmp(&b.len()))
    /// }));
    /// map.insert("abc", ()).unwrap();
    /// assert_eq!(map.contains_key(&"xyz"), Ok(true));
    /// assert_eq!(map.contains_key(&"xy"), Ok(false));
    /// ```
    pub fn contains_key(&self, key: &K) -> Result<bool, MapError> {
        Ok(self.tree.find(key, &self.order)?.is_some())
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`MapError::Incomparable`] if the comparator cannot order `key`; the map
    /// is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map: NavigableMap<_, _> = (1..=3).map(|k| (k, k * 10)).collect();
    /// assert_eq!(map.remove(&2), Ok(Some(20)));
    /// assert_eq!(map.remove(&2), Ok(None));
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, MapError> {
        Ok(self.remove_entry(key)?.map(|(_, v)| v))
    }

    /// Removes `key` and returns the stored key with its value. The stored key
    /// may differ from `key` under a custom order.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    /// use ordkit::ordering::OrderWith;
    ///
    /// let mut map = NavigableMap::with_order(OrderWith(|a: &String, b: &String| {
    ///     Some(a.to_lowercase().cmp(&b.to_lowercase()))
    /// }));
    /// map.insert("Apple".to_string(), 1).unwrap();
    /// assert_eq!(
    ///     map.remove_entry(&"APPLE".to_string()),
    ///     Ok(Some(("Apple".to_string(), 1)))
    /// );
    /// ```
    pub fn remove_entry(&mut self, key: &K) -> Result<Option<(K, V)>, MapError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let removed = self
            .tree
            .remove(key, &self.order)
            .map_err(|err| self.incomparable(err))?;
        if removed.is_some() {
            self.mod_count.bump();
            #[cfg(feature = "metrics")]
            self.metrics.record_remove_found();
        }
        Ok(removed)
    }

    /// Entry with the greatest key strictly less than `key`.
    pub fn lower_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        self.nearest(key, Relation::Lower)
    }

    /// Entry with the greatest key less than or equal to `key`.
    pub fn floor_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        self.nearest(key, Relation::Floor)
    }

    /// Entry with the least key greater than or equal to `key`.
    pub fn ceiling_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        self.nearest(key, Relation::Ceiling)
    }

    /// Entry with the least key strictly greater than `key`.
    pub fn higher_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        self.nearest(key, Relation::Higher)
    }

    /// Key of [`lower_entry`](Self::lower_entry). The `floor`, `ceiling` and
    /// `higher` variants follow the same pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = [(10, ()), (20, ()), (30, ())].into_iter().collect();
    /// assert_eq!(map.lower_key(&20), Ok(Some(&10)));
    /// assert_eq!(map.floor_key(&20), Ok(Some(&20)));
    /// assert_eq!(map.ceiling_key(&25), Ok(Some(&30)));
    /// assert_eq!(map.higher_key(&30), Ok(None));
    /// ```
    pub fn lower_key(&self, key: &K) -> Result<Option<&K>, MapError> {
        Ok(self.lower_entry(key)?.map(|(k, _)| k))
    }

    pub fn floor_key(&self, key: &K) -> Result<Option<&K>, MapError> {
        Ok(self.floor_entry(key)?.map(|(k, _)| k))
    }

    pub fn ceiling_key(&self, key: &K) -> Result<Option<&K>, MapError> {
        Ok(self.ceiling_entry(key)?.map(|(k, _)| k))
    }

    pub fn higher_key(&self, key: &K) -> Result<Option<&K>, MapError> {
        Ok(self.higher_entry(key)?.map(|(k, _)| k))
    }

    /// Entries whose keys fall between `lower` and `upper`, ascending.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidArgument`] if `lower` lies above `upper`.
    ///
    /// ```
    /// use std::ops::Bound::{Excluded, Included};
    ///
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = (1..=9).map(|k| (k, ())).collect();
    /// let keys: Vec<_> = map.range(Included(&3), Excluded(&6)).unwrap().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, vec![3, 4, 5]);
    /// ```
    pub fn range(&self, lower: Bound<&K>, upper: Bound<&K>) -> Result<Range<'_, K, V>, MapError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_range_call();
        if let (Bound::Included(lo) | Bound::Excluded(lo), Bound::Included(hi) | Bound::Excluded(hi)) =
            (lower, upper)
        {
            if compare(&self.order, lo, hi)? == Ordering::Greater {
                return Err(MapError::InvalidArgument);
            }
        }
        self.range_within(lower, upper)
    }

    /// Writable view of keys between `from` and `to`.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidArgument`] if `from` orders after `to`.
    pub fn sub_map(
        &mut self,
        from: K,
        from_inclusive: bool,
        to: K,
        to_inclusive: bool,
    ) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(
            Backing::Exclusive(self),
            bound(from, from_inclusive),
            bound(to, to_inclusive),
            false,
        )
    }

    /// Writable view of keys below (or up to) `to`.
    pub fn head_map(&mut self, to: K, inclusive: bool) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(
            Backing::Exclusive(self),
            Bound::Unbounded,
            bound(to, inclusive),
            false,
        )
    }

    /// Writable view of keys above (or from) `from`.
    pub fn tail_map(&mut self, from: K, inclusive: bool) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(
            Backing::Exclusive(self),
            bound(from, inclusive),
            Bound::Unbounded,
            false,
        )
    }

    /// Read-only counterpart of [`sub_map`](Self::sub_map).
    pub fn sub_view(
        &self,
        from: K,
        from_inclusive: bool,
        to: K,
        to_inclusive: bool,
    ) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(
            Backing::Shared(self),
            bound(from, from_inclusive),
            bound(to, to_inclusive),
            false,
        )
    }

    /// Read-only counterpart of [`head_map`](Self::head_map).
    pub fn head_view(&self, to: K, inclusive: bool) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(Backing::Shared(self), Bound::Unbounded, bound(to, inclusive), false)
    }

    /// Read-only counterpart of [`tail_map`](Self::tail_map).
    pub fn tail_view(&self, from: K, inclusive: bool) -> Result<NavigableView<'_, K, V, C>, MapError> {
        NavigableView::new(Backing::Shared(self), bound(from, inclusive), Bound::Unbounded, false)
    }

    /// Inserts every pair, stopping at the first failure. Pairs before the
    /// failure stay inserted.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), MapError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value)?;
        }
        Ok(())
    }

    /// Checks key order, heights and balance of the backing tree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.tree.validate(&self.order).map_err(InvariantError::new)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.tree.debug_validate_invariants(&self.order);
    }

    pub(crate) fn nearest(&self, key: &K, relation: Relation) -> Result<Option<(&K, &V)>, MapError> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_nearest_call();
        let id = self.tree.seek(key, relation, &self.order)?;
        #[cfg(feature = "metrics")]
        if id.is_some() {
            (&self.metrics).record_nearest_found();
        }
        Ok(self.entry_at(id))
    }

    pub(crate) fn seek(&self, key: &K, relation: Relation) -> Result<Option<SlotId>, MapError> {
        self.tree.seek(key, relation, &self.order)
    }

    /// Range without the inverted-bounds check; callers guarantee order.
    pub(crate) fn range_within(
        &self,
        lower: Bound<&K>,
        upper: Bound<&K>,
    ) -> Result<Range<'_, K, V>, MapError> {
        let front = Walk::seek_forward(&self.tree, lower, &self.order)?;
        let back = Walk::seek_backward(&self.tree, upper, &self.order)?;
        let exhausted = match (self.entry_at(front.peek()), self.entry_at(back.peek())) {
            (Some((first, _)), Some((last, _))) => {
                compare(&self.order, first, last)? == Ordering::Greater
            },
            _ => true,
        };
        Ok(Range {
            tree: &self.tree,
            front,
            back,
            exhausted,
        })
    }

    /// Removes the node behind `id`.
    pub(crate) fn remove_node(&mut self, id: SlotId) -> Result<Option<(K, V)>, MapError> {
        let removed = self.tree.remove_node(id, &self.order)?;
        if removed.is_some() {
            self.mod_count.bump();
        }
        Ok(removed)
    }

    pub(crate) fn bound_is_comparable(&self, key: &K) -> Result<(), MapError> {
        compare(&self.order, key, key).map(|_| ())
    }

    fn incomparable(&mut self, err: MapError) -> MapError {
        #[cfg(feature = "metrics")]
        self.metrics.record_incomparable();
        err
    }
}

pub(crate) fn bound<K>(key: K, inclusive: bool) -> Bound<K> {
    if inclusive {
        Bound::Included(key)
    } else {
        Bound::Excluded(key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> NavigableMap<K, V, C> {
    /// Copies the current counters.
    pub fn metrics_snapshot(&self) -> NavigableMapMetricsSnapshot {
        NavigableMapMetricsSnapshot {
            get_calls: self.metrics.get_calls.get(),
            get_hits: self.metrics.get_hits.get(),
            get_misses: self.metrics.get_misses.get(),
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            insert_rejected: self.metrics.insert_rejected,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            pop_calls: self.metrics.pop_calls,
            pop_found: self.metrics.pop_found,
            incomparable: self.metrics.incomparable,
            clear_calls: self.metrics.clear_calls,
            nearest_calls: self.metrics.nearest_calls.get(),
            nearest_found: self.metrics.nearest_found.get(),
            range_calls: self.metrics.range_calls.get(),
            view_calls: self.metrics.view_calls.get(),
            map_len: self.tree.len(),
            tree_height: self
                .tree
                .root()
                .and_then(|id| self.tree.node(id))
                .map_or(0, |node| node.height()),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> MetricsSnapshotProvider<NavigableMapMetricsSnapshot> for NavigableMap<K, V, C> {
    fn snapshot(&self) -> NavigableMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for NavigableMap<K, V, C> {
    /// The clone starts with a fresh modification count.
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            order: self.order.clone(),
            mod_count: ModCount::new(),
            nulls: self.nulls,
            #[cfg(feature = "metrics")]
            metrics: NavigableMapMetrics::default(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for NavigableMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for NavigableMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for NavigableMap<K, V, C> {}

/// # Panics
///
/// Panics on the first pair that fails to insert, either through the null
/// policy or an incomparable key. Use [`NavigableMap::try_extend`] to get the
/// error instead.
impl<K, V, C: KeyOrder<K>> Extend<(K, V)> for NavigableMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("extend rejected a pair: {}", err);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for NavigableMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, C> IntoIterator for &'a NavigableMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for NavigableMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self.tree }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Double-ended iterator over a contiguous key range.
///
/// Both ends walk the tree independently and stop once they meet.
pub struct Range<'a, K, V> {
    tree: &'a TreeStore<K, V>,
    front: Walk,
    back: Walk,
    exhausted: bool,
}

impl<'a, K, V> Range<'a, K, V> {
    fn full(tree: &'a TreeStore<K, V>) -> Self {
        Self {
            tree,
            front: Walk::first(tree),
            back: Walk::last(tree),
            exhausted: tree.is_empty(),
        }
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let id = self.front.advance(self.tree)?;
        if self.back.peek() == Some(id) {
            self.exhausted = true;
        }
        let node = self.tree.node(id)?;
        Some((&node.key, &node.value))
    }
}

impl<K, V> DoubleEndedIterator for Range<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let id = self.back.advance(self.tree)?;
        if self.front.peek() == Some(id) {
            self.exhausted = true;
        }
        let node = self.tree.node(id)?;
        Some((&node.key, &node.value))
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

/// Ascending iterator over the whole map.
pub struct Iter<'a, K, V> {
    range: Range<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.range.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self.range.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning iterator in ascending key order.
pub struct IntoIter<K, V> {
    tree: TreeStore<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree.pop_last()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

// ---------------------------------------------------------------------------
// NavCursor
// ---------------------------------------------------------------------------

/// Ascending fail-fast cursor that does not borrow the map between steps.
///
/// ```
/// use ordkit::map::navigable::NavigableMap;
///
/// let mut map: NavigableMap<_, _> = (1..=6).map(|k| (k, ())).collect();
/// let mut cursor = map.cursor();
/// while let Some((&k, _)) = cursor.next(&map).unwrap() {
///     if k % 2 == 0 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct NavCursor {
    stamp: Stamp,
    walk: Walk,
    current: Option<SlotId>,
}

impl NavCursor {
    /// Advances to the next key in ascending order.
    ///
    /// # Errors
    ///
    /// [`MapError::ConcurrentModification`] if the map changed structurally
    /// since the cursor was created or last removed through.
    pub fn next<'m, K, V, C>(
        &mut self,
        map: &'m NavigableMap<K, V, C>,
    ) -> Result<Option<(&'m K, &'m V)>, MapError> {
        self.stamp.check(&map.mod_count)?;
        let id = self.walk.advance(&map.tree);
        self.current = id;
        Ok(map.entry_at(id))
    }

    /// Removes the entry last returned by [`next`](Self::next).
    ///
    /// On error the cursor keeps its position, so a failed removal can be
    /// retried.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] without a current entry,
    /// [`MapError::ConcurrentModification`] after a foreign structural change,
    /// or [`MapError::Incomparable`] if the comparator fails while locating
    /// the entry.
    pub fn remove<K, V, C: KeyOrder<K>>(
        &mut self,
        map: &mut NavigableMap<K, V, C>,
    ) -> Result<(K, V), MapError> {
        self.stamp.check(&map.mod_count)?;
        let id = self.current.ok_or(MapError::NotFound)?;
        let pending = self.walk.peek();
        let removed = map
            .remove_node(id)?
            .ok_or(MapError::ConcurrentModification)?;
        self.current = None;
        // Rebalancing may have rotated the walk's ancestors; re-seek to the
        // entry that was due next.
        if let Some(key) = pending.and_then(|p| map.tree.node(p)).map(|node| &node.key) {
            self.walk = Walk::seek_forward(&map.tree, Bound::Included(key), &map.order)?;
        }
        self.stamp.resync(&map.mod_count);
        Ok(removed)
    }
}


#[cfg(test)]
mod property_tests {
    use std::collections::BTreeMap;
    use std::ops::Bound::{Excluded, Included};

    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// floor/ceiling return the key itself when present; lower/higher never do.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_nearest_round_trip(keys in prop::collection::btree_set(0i32..200, 1..60), probe in 0i32..200) {
            let map: NavigableMap<_, _> = keys.iter().map(|&k| (k, ())).collect();
            let model: BTreeMap<_, _> = keys.iter().map(|&k| (k, ())).collect();
            if keys.contains(&probe) {
                prop_assert_eq!(map.floor_key(&probe).unwrap(), Some(&probe));
                prop_assert_eq!(map.ceiling_key(&probe).unwrap(), Some(&probe));
            }
            prop_assert_ne!(map.lower_key(&probe).unwrap(), Some(&probe));
            prop_assert_ne!(map.higher_key(&probe).unwrap(), Some(&probe));
            prop_assert_eq!(map.lower_key(&probe).unwrap(), model.range(..probe).next_back().map(|(k, _)| k));
            prop_assert_eq!(map.higher_key(&probe).unwrap(), model.range(probe + 1..).next().map(|(k, _)| k));
        }

        /// range() agrees with BTreeMap::range for every pair of bounds.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_range_matches_btreemap(
            keys in prop::collection::btree_set(0i32..100, 0..50),
            a in 0i32..100,
            b in 0i32..100,
            lo_incl in any::<bool>(),
            hi_incl in any::<bool>(),
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assume!(!(lo == hi && !lo_incl && !hi_incl));
            let map: NavigableMap<_, _> = keys.iter().map(|&k| (k, ())).collect();
            let model: BTreeMap<_, _> = keys.iter().map(|&k| (k, ())).collect();
            let lower = if lo_incl { Included(&lo) } else { Excluded(&lo) };
            let upper = if hi_incl { Included(&hi) } else { Excluded(&hi) };
            let ours: Vec<_> = map.range(lower, upper).unwrap().map(|(k, _)| *k).collect();
            let theirs: Vec<_> = model.range((lower, upper)).map(|(k, _)| *k).collect();
            prop_assert_eq!(ours, theirs);
        }
    }
}
