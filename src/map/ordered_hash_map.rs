//! # Ordered Hash Map
//!
//! A hash map that remembers an order over its entries: either the order in
//! which keys were first inserted, or (in access-order mode) the order in
//! which entries were last used. Together with an [`EvictionPolicy`] it
//! doubles as a bounded cache.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                    OrderedHashMap<K, V, P, S>                        │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  BucketStore<K, V, S>                                        │   │
//!   │   │    HashTable<SlotId> ──► SlotArena<Entry { key, value,       │   │
//!   │   │                                      hash, before, after }>  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                          │ lifecycle hooks                           │
//!   │                          ▼                                           │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  Sequencer { OrderList, access_order }                       │   │
//!   │   │  head (eldest) ─► [A] ◄──► [B] ◄──► [C] ◄── tail (youngest)  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                                                      │
//!   │   ModCount ─── bumped on insert of a new key, removal, eviction and  │
//!   │                access-driven reorder                                 │
//!   │   P: EvictionPolicy ─── consulted once per new key                   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   insert(D), new key, policy = MaxEntries(3)
//!     1. allocate entry, link at tail      [A] [B] [C] [D]
//!     2. ModCount += 1
//!     3. policy(eldest = A, len = 4) → evict
//!     4. unlink + free A, ModCount += 1    [B] [C] [D]
//!
//!   get(B), access_order = true
//!     1. lookup                            O(1)
//!     2. move to tail, ModCount += 1       [C] [D] [B]
//!        (no bump if B already was the tail)
//! ```
//!
//! ## What counts as an access
//!
//! | Operation                        | Access in access-order mode |
//! |----------------------------------|-----------------------------|
//! | `get`, `get_mut`, `get_or`       | yes, when the key is found  |
//! | `insert` on an existing key      | yes                         |
//! | `replace` on an existing key     | yes                         |
//! | `insert_if_absent` on a present key | no                       |
//! | `peek`, `contains_key`, `contains_value`, iteration | no       |
//!
//! ## Example Usage
//!
//! ```
//! use ordkit::map::ordered_hash_map::OrderedHashMap;
//!
//! let mut map = OrderedHashMap::with_access_order(16, true);
//! map.insert(1, "one").unwrap();
//! map.insert(2, "two").unwrap();
//! map.insert(3, "three").unwrap();
//! map.get(&1);
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec![2, 3, 1]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use rustc_hash::FxBuildHasher;

use crate::builder::{NullPolicy, OrderedHashMapBuilder};
use crate::ds::fence::{ModCount, Stamp};
use crate::ds::order_list::{Linked, OrderList};
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, MapError};
use crate::policy::eviction::NeverEvict;
use crate::store::buckets::{BucketStore, Entry, Placement};
use crate::store::traits::NodeLifecycle;
use crate::traits::EvictionPolicy;

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::OrderedMapMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::OrderedMapMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, OrderedMapMetricsReadRecorder,
    OrderedMapMetricsRecorder,
};

/// Keeps the order list in step with the bucket store.
#[derive(Debug, Clone, Copy, Default)]
struct Sequencer {
    list: OrderList,
    access_order: bool,
}

impl<T: Linked> NodeLifecycle<T> for Sequencer {
    fn on_created(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        self.list.push_back(arena, id);
    }

    fn on_replaced(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        self.access_order && self.list.move_to_back(arena, id)
    }

    fn on_removed(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        self.list.unlink(arena, id);
    }

    fn on_accessed(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        self.access_order && self.list.move_to_back(arena, id)
    }
}

/// Hash map with a predictable iteration order and an eviction hook.
///
/// See the [module documentation](self) for the ordering rules.
pub struct OrderedHashMap<K, V, P = NeverEvict, S = FxBuildHasher> {
    store: BucketStore<K, V, S>,
    order: Sequencer,
    mod_count: ModCount,
    policy: P,
    nulls: NullPolicy<K, V>,
    #[cfg(feature = "metrics")]
    metrics: OrderedMapMetrics,
}

impl<K, V> OrderedHashMap<K, V> {
    /// Creates an empty insertion-ordered map that never evicts.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let map: OrderedHashMap<&str, i32> = OrderedHashMap::new();
    /// assert!(map.is_empty());
    /// assert!(!map.access_order());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty insertion-ordered map with room for at least `capacity`
    /// entries before the table grows.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let map: OrderedHashMap<u32, u32> = OrderedHashMap::with_capacity(64);
    /// assert!(map.capacity() >= 64);
    /// assert_eq!(map.len(), 0);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_access_order(capacity, false)
    }

    /// Creates an empty map; `access_order = true` orders entries from least to
    /// most recently accessed instead of by first insertion.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::with_access_order(8, true);
    /// for k in 1..=3 {
    ///     map.insert(k, ()).unwrap();
    /// }
    /// map.get(&1);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
    /// ```
    pub fn with_access_order(capacity: usize, access_order: bool) -> Self {
        Self::from_parts(
            capacity,
            access_order,
            NeverEvict,
            FxBuildHasher,
            NullPolicy::none(),
        )
    }

    /// Starts a builder for capacity, load factor, ordering mode, eviction
    /// policy, hasher and null policy.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    /// use ordkit::policy::MaxEntries;
    ///
    /// let mut lru = OrderedHashMap::builder()
    ///     .access_order(true)
    ///     .eviction(MaxEntries::new(2))
    ///     .build();
    /// lru.insert("a", 1).unwrap();
    /// lru.insert("b", 2).unwrap();
    /// lru.get(&"a");
    /// lru.insert("c", 3).unwrap();
    /// assert!(!lru.contains_key(&"b"));
    /// ```
    pub fn builder() -> OrderedHashMapBuilder<K, V> {
        OrderedHashMapBuilder::new()
    }
}

impl<K, V> Default for OrderedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P, S> OrderedHashMap<K, V, P, S> {
    pub(crate) fn from_parts(
        capacity: usize,
        access_order: bool,
        policy: P,
        hasher: S,
        nulls: NullPolicy<K, V>,
    ) -> Self {
        Self {
            store: BucketStore::with_capacity_and_hasher(capacity, hasher),
            order: Sequencer {
                list: OrderList::new(),
                access_order,
            },
            mod_count: ModCount::new(),
            policy,
            nulls,
            #[cfg(feature = "metrics")]
            metrics: OrderedMapMetrics::default(),
        }
    }

    /// Returns the number of entries.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// map.insert("a", 1).unwrap();
    /// map.insert("a", 2).unwrap();
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the map holds no entries.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// assert!(map.is_empty());
    /// map.insert(1, "one").unwrap();
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of entries the map holds without reallocating its table.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let map: OrderedHashMap<u8, u8> = OrderedHashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// `true` if the map is ordered by access rather than insertion.
    /// Fixed at construction.
    pub fn access_order(&self) -> bool {
        self.order.access_order
    }

    /// The eviction policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the eviction policy, e.g. to change a bound.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// Returns the hasher used for keys.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::hash_map::RandomState;
    ///
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let map: OrderedHashMap<u32, u32, _, RandomState> =
    ///     OrderedHashMap::builder().hasher(RandomState::new()).build();
    /// let _state: &RandomState = map.hasher();
    /// ```
    pub fn hasher(&self) -> &S {
        self.store.hasher()
    }

    /// Current structural modification count.
    pub fn mod_count(&self) -> u64 {
        self.mod_count.get()
    }

    /// Eldest entry (least recently inserted, or least recently accessed).
    pub fn first(&self) -> Option<(&K, &V)> {
        let entry = self.store.get(self.order.list.front()?)?;
        Some((&entry.key, &entry.value))
    }

    /// Youngest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        let entry = self.store.get(self.order.list.back()?)?;
        Some((&entry.key, &entry.value))
    }

    /// Removes and returns the eldest entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();
        let id = self.order.list.front()?;
        let popped = self.remove_slot(id)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();
        Some(popped)
    }

    /// Removes and returns the youngest entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();
        let id = self.order.list.back()?;
        let popped = self.remove_slot(id)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();
        Some(popped)
    }

    /// Keeps only the entries for which `keep` returns `true`, visiting them
    /// in map order. Not an access.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut next = self.order.list.front();
        while let Some(id) = next {
            let Some(entry) = self.store.get_mut(id) else {
                break;
            };
            next = entry.links.after;
            if !keep(&entry.key, &mut entry.value) {
                self.remove_slot(id);
            }
        }
    }

    /// Removes every entry. Always counts as a structural change, so detached
    /// cursors fail afterwards.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map: OrderedHashMap<_, _> = (0..4).map(|k| (k, k)).collect();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.first(), None);
    /// ```
    pub fn clear(&mut self) {
        self.store.clear();
        self.order.list.clear();
        self.mod_count.bump();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Entries in map order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: self.store.entries(),
            front: self.order.list.front(),
            back: self.order.list.back(),
            remaining: self.store.len(),
        }
    }

    /// Keys in map order, eldest first.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values in map order, eldest first.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Keys-only projection of this map.
    pub fn key_set(&mut self) -> KeySet<'_, K, V, P, S> {
        KeySet { map: self }
    }

    /// Detached fail-fast cursor positioned before the eldest entry.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            stamp: self.mod_count.stamp(),
            next: self.order.list.front(),
            current: None,
        }
    }

    fn remove_slot(&mut self, id: SlotId) -> Option<(K, V)> {
        let removed = self.store.remove_slot(id, &mut self.order)?;
        self.mod_count.bump();
        Some(removed)
    }

    fn touch(&mut self, id: SlotId) {
        if self.store.access(id, &mut self.order) {
            self.mod_count.bump();
            #[cfg(feature = "metrics")]
            self.metrics.record_reorder();
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self)
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        if let Err(err) = self.check_invariants() {
            panic!("{}", err);
        }
    }
}

impl<K, V, P, S> OrderedHashMap<K, V, P, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Replaces the value of an existing key; absent keys are left absent.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Result<Option<V>, MapError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.nulls.check_value(&value)?;
        let hash = self.store.hash(key);
        let Some(id) = self.store.find_by_hash(hash, key) else {
            return Ok(None);
        };
        let old = match self.store.get_mut(id) {
            Some(entry) => std::mem::replace(&mut entry.value, value),
            None => return Ok(None),
        };
        self.touch(id);
        Ok(Some(old))
    }

    /// Returns the value for `key`.
    ///
    /// In access-order mode a hit moves the entry to the youngest position. Use
    /// [`peek`](Self::peek) to read without reordering.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::with_access_order(0, true);
    /// map.insert("a", 1).unwrap();
    /// map.insert("b", 2).unwrap();
    ///
    /// assert_eq!(map.get(&"a"), Some(&1));
    /// assert_eq!(map.get(&"missing"), None);
    /// assert_eq!(map.last(), Some((&"a", &1)));
    /// ```
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup(key)?;
        self.touch(id);
        self.store.get(id).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value for `key`. Counts as an access
    /// in access-order mode, like [`get`](Self::get).
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// map.insert("hits", 0).unwrap();
    /// if let Some(hits) = map.get_mut(&"hits") {
    ///     *hits += 1;
    /// }
    /// assert_eq!(map.peek(&"hits"), Some(&1));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.lookup(key)?;
        self.touch(id);
        self.store.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Returns the value for `key`, or `default` when absent. A hit counts as an
    /// access.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// map.insert("a", 1).unwrap();
    /// assert_eq!(*map.get_or(&"a", &0), 1);
    /// assert_eq!(*map.get_or(&"z", &0), 0);
    /// ```
    pub fn get_or<'a, Q>(&'a mut self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the value for `key` without counting as an access.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::with_access_order(0, true);
    /// map.insert(1, "one").unwrap();
    /// map.insert(2, "two").unwrap();
    ///
    /// assert_eq!(map.peek(&1), Some(&"one"));
    /// assert_eq!(map.first(), Some((&1, &"one")));
    /// ```
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();
        let id = self.store.find_by_hash(self.store.hash(key), key)?;
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_found();
        self.store.get(id).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` is present. Never counts as an access.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::with_access_order(0, true);
    /// map.insert("a", 1).unwrap();
    /// map.insert("b", 2).unwrap();
    ///
    /// assert!(map.contains_key(&"a"));
    /// assert!(!map.contains_key(&"c"));
    /// assert_eq!(map.first(), Some((&"a", &1)));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.find_by_hash(self.store.hash(key), key).is_some()
    }

    /// Returns `true` if some entry holds `value`. Linear scan in map order.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let map: OrderedHashMap<_, _> = [("a", 1), ("b", 2)].into_iter().collect();
    /// assert!(map.contains_value(&2));
    /// assert!(!map.contains_value(&3));
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Removes `key` and returns its value.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// map.insert("a", 1).unwrap();
    /// map.insert("b", 2).unwrap();
    ///
    /// assert_eq!(map.remove(&"a"), Some(1));
    /// assert_eq!(map.remove(&"a"), None);
    /// assert_eq!(map.first(), Some((&"b", &2)));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key together with its value.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// map.insert(String::from("a"), 1).unwrap();
    /// assert_eq!(map.remove_entry("a"), Some((String::from("a"), 1)));
    /// assert!(map.is_empty());
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let hash = self.store.hash(key);
        let removed = self.store.remove_by_hash(hash, key, &mut self.order)?;
        self.mod_count.bump();
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();
        Some(removed)
    }

    /// Checks that the table, the arena and the order list agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.store.validate().map_err(InvariantError::new)?;
        self.order
            .list
            .validate(self.store.entries())
            .map_err(InvariantError::new)?;
        if self.order.list.len() != self.store.len() {
            return Err(InvariantError::new(format!(
                "order list links {} entries but the map holds {}",
                self.order.list.len(),
                self.store.len()
            )));
        }
        Ok(())
    }

    fn lookup<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.store.find_by_hash(self.store.hash(key), key);
        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }
        found
    }
}

impl<K, V, P, S> OrderedHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: EvictionPolicy<K, V>,
    S: BuildHasher,
{
    /// Associates `value` with `key`.
    ///
    /// Returns the superseded value for an existing key (an access in
    /// access-order mode). A new key is linked as youngest, after which the
    /// eviction policy is consulted once with the eldest entry.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidArgument`] if the null policy rejects `key` or
    /// `value`; the map is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::new();
    /// assert_eq!(map.insert("a", 1), Ok(None));
    /// assert_eq!(map.insert("b", 2), Ok(None));
    /// assert_eq!(map.insert("a", 10), Ok(Some(1)));
    /// // Re-inserting does not move the key in insertion order.
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();
        if let Err(err) = self.nulls.check(&key, &value) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return Err(err);
        }

        let hash = self.store.hash(&key);
        match self.store.insert(hash, key, value, &mut self.order) {
            Placement::Replaced { old, reordered, .. } => {
                if reordered {
                    self.mod_count.bump();
                    #[cfg(feature = "metrics")]
                    self.metrics.record_reorder();
                }
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();
                Ok(Some(old))
            },
            Placement::Created(_) => {
                self.mod_count.bump();
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();
                self.evict_eldest();
                Ok(None)
            },
        }
    }

    /// Inserts only if `key` is absent. A present key is left alone, returned
    /// by reference and not counted as an access.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> Result<Option<&V>, MapError> {
        self.nulls.check(&key, &value)?;
        let hash = self.store.hash(&key);
        if let Some(id) = self.store.find_by_hash(hash, &key) {
            return Ok(self.store.get(id).map(|entry| &entry.value));
        }
        self.insert(key, value)?;
        Ok(None)
    }

    /// Inserts every pair, stopping at the first rejected one. Pairs before the
    /// rejection stay inserted.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::error::MapError;
    /// use ordkit::map::ordered_hash_map::OrderedHashMap;
    ///
    /// let mut map = OrderedHashMap::builder()
    ///     .null_values(|v: &i32| *v < 0)
    ///     .build();
    /// assert_eq!(
    ///     map.try_extend([(1, 1), (2, -2), (3, 3)]),
    ///     Err(MapError::InvalidArgument)
    /// );
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), MapError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn evict_eldest(&mut self) {
        let Some(head) = self.order.list.front() else {
            return;
        };
        let Some(eldest) = self.store.get(head) else {
            return;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();
        if self
            .policy
            .should_evict(&eldest.key, &eldest.value, self.store.len())
        {
            self.remove_slot(head);
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P, S> OrderedHashMap<K, V, P, S> {
    /// Copies the current counters.
    pub fn metrics_snapshot(&self) -> OrderedMapMetricsSnapshot {
        OrderedMapMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            insert_rejected: self.metrics.insert_rejected,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            reorders: self.metrics.reorders,
            pop_calls: self.metrics.pop_calls,
            pop_found: self.metrics.pop_found,
            clear_calls: self.metrics.clear_calls,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            map_len: self.store.len(),
            order_len: self.order.list.len(),
            capacity: self.store.capacity(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P, S> MetricsSnapshotProvider<OrderedMapMetricsSnapshot> for OrderedHashMap<K, V, P, S> {
    fn snapshot(&self) -> OrderedMapMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, P, S> Clone for OrderedHashMap<K, V, P, S>
where
    K: Clone,
    V: Clone,
    P: Clone,
    S: Clone,
{
    /// Clones entries, order and policy. The clone starts with a fresh
    /// modification count and, with `metrics`, fresh counters.
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            order: self.order,
            mod_count: ModCount::new(),
            policy: self.policy.clone(),
            nulls: self.nulls,
            #[cfg(feature = "metrics")]
            metrics: OrderedMapMetrics::default(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P, S> fmt::Debug for OrderedHashMap<K, V, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Map equality: same key/value pairs, order ignored.
impl<K, V, P, S, P2, S2> PartialEq<OrderedHashMap<K, V, P2, S2>> for OrderedHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &OrderedHashMap<K, V, P2, S2>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.peek(k) == Some(v))
    }
}

impl<K, V, P, S> Eq for OrderedHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

/// # Panics
///
/// Panics on the first pair the null policy rejects; pairs before it stay
/// inserted. Use [`OrderedHashMap::try_extend`] to get the error instead.
impl<K, V, P, S> Extend<(K, V)> for OrderedHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: EvictionPolicy<K, V>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("extend rejected a pair: {}", err);
        }
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for OrderedHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, P, S> IntoIterator for &'a OrderedHashMap<K, V, P, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, P, S> IntoIterator for OrderedHashMap<K, V, P, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let front = self.order.list.front();
        let remaining = self.store.len();
        IntoIter {
            entries: self.store.into_entries(),
            front,
            remaining,
        }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Borrowing iterator in map order. Holds `&map`, so the map cannot change
/// underneath it.
pub struct Iter<'a, K, V> {
    entries: &'a SlotArena<Entry<K, V>>,
    front: Option<SlotId>,
    back: Option<SlotId>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.entries.get(self.front?)?;
        self.front = entry.links.after;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.entries.get(self.back?)?;
        self.back = entry.links.before;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Owning iterator in map order.
pub struct IntoIter<K, V> {
    entries: SlotArena<Entry<K, V>>,
    front: Option<SlotId>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.remove(self.front?)?;
        self.front = entry.links.after;
        self.remaining -= 1;
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

// ---------------------------------------------------------------------------
// KeySet
// ---------------------------------------------------------------------------

/// Keys-only projection of an [`OrderedHashMap`].
///
/// Removal goes through to the map; insertion is not supported because a
/// key alone carries no value.
pub struct KeySet<'a, K, V, P, S> {
    map: &'a mut OrderedHashMap<K, V, P, S>,
}

impl<K, V, P, S> KeySet<'_, K, V, P, S> {
    /// Number of keys, same as the map's length.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Keys in map order.
    pub fn iter(&self) -> Keys<'_, K, V> {
        self.map.keys()
    }

    /// Always fails with [`MapError::UnsupportedMutation`].
    pub fn insert(&mut self, _key: K) -> Result<bool, MapError> {
        Err(MapError::UnsupportedMutation)
    }

    /// Clears the backing map.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, V, P, S> KeySet<'_, K, V, P, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Same as [`OrderedHashMap::contains_key`].
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Removes `key` and its value from the map; `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove_entry(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Fail-fast cursor that does not borrow the map between steps.
///
/// Every call takes the map and first compares the stamp taken at creation
/// with the map's modification count; any structural change made through
/// another path fails the call with [`MapError::ConcurrentModification`].
/// Removal through the cursor itself resynchronizes the stamp.
///
/// ```
/// use ordkit::error::MapError;
/// use ordkit::map::ordered_hash_map::OrderedHashMap;
///
/// let mut map: OrderedHashMap<u32, &str> = [(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
/// let mut cursor = map.cursor();
/// while let Some((&k, _)) = cursor.next(&map).unwrap() {
///     if k % 2 == 1 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2]);
///
/// let mut stale = map.cursor();
/// map.insert(4, "d").unwrap();
/// assert_eq!(stale.next(&map), Err(MapError::ConcurrentModification));
/// ```
#[derive(Debug, Clone)]
pub struct Cursor {
    stamp: Stamp,
    next: Option<SlotId>,
    current: Option<SlotId>,
}

impl Cursor {
    /// Advances to the next entry in map order.
    pub fn next<'m, K, V, P, S>(
        &mut self,
        map: &'m OrderedHashMap<K, V, P, S>,
    ) -> Result<Option<(&'m K, &'m V)>, MapError> {
        self.stamp.check(&map.mod_count)?;
        let Some(id) = self.next else {
            self.current = None;
            return Ok(None);
        };
        let entry = map
            .store
            .get(id)
            .ok_or(MapError::ConcurrentModification)?;
        self.next = entry.links.after;
        self.current = Some(id);
        Ok(Some((&entry.key, &entry.value)))
    }

    /// Removes the entry last returned by [`next`](Self::next).
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] if there is no such entry (nothing returned
    /// yet, or it was already removed); `ConcurrentModification` if the map
    /// changed behind the cursor.
    pub fn remove<K, V, P, S>(
        &mut self,
        map: &mut OrderedHashMap<K, V, P, S>,
    ) -> Result<(K, V), MapError> {
        self.stamp.check(&map.mod_count)?;
        let id = self.current.take().ok_or(MapError::NotFound)?;
        let removed = map
            .remove_slot(id)
            .ok_or(MapError::ConcurrentModification)?;
        self.stamp.resync(&map.mod_count);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::eviction::{EvictWith, MaxEntries};

    fn keys<K: Copy, V, P, S>(map: &OrderedHashMap<K, V, P, S>) -> Vec<K> {
        map.keys().copied().collect()
    }

    #[test]
    fn insertion_order_survives_updates() {
        let mut map = OrderedHashMap::new();
        map.insert("a", 1).unwrap();
        map.insert("b", 2).unwrap();
        map.insert("c", 3).unwrap();
        assert_eq!(map.insert("a", 10).unwrap(), Some(1));
        assert_eq!(keys(&map), vec!["a", "b", "c"]);
        assert_eq!(map.get(&"a"), Some(&10));
        assert_eq!(keys(&map), vec!["a", "b", "c"]);
        map.debug_validate_invariants();
    }

    #[test]
    fn access_order_moves_touched_entries_to_tail() {
        let mut map = OrderedHashMap::with_access_order(0, true);
        for k in 1..=3 {
            map.insert(k, k * 10).unwrap();
        }
        map.get(&1);
        assert_eq!(keys(&map), vec![2, 3, 1]);
        map.insert(2, 21).unwrap();
        assert_eq!(keys(&map), vec![3, 1, 2]);
        assert_eq!(map.replace(&3, 31), Ok(Some(30)));
        assert_eq!(keys(&map), vec![1, 2, 3]);
        *map.get_mut(&1).unwrap() += 1;
        assert_eq!(keys(&map), vec![2, 3, 1]);
        assert_eq!(map.peek(&2), Some(&21));
        assert!(map.contains_key(&2));
        assert!(map.contains_value(&21));
        assert_eq!(keys(&map), vec![2, 3, 1]);
        map.debug_validate_invariants();
    }

    #[test]
    fn access_of_tail_does_not_bump_mod_count() {
        let mut map = OrderedHashMap::with_access_order(0, true);
        map.insert(1, ()).unwrap();
        map.insert(2, ()).unwrap();
        let before = map.mod_count();
        map.get(&2);
        assert_eq!(map.mod_count(), before);
        map.get(&1);
        assert_eq!(map.mod_count(), before + 1);
    }

    #[test]
    fn insert_if_absent_is_not_an_access() {
        let mut map = OrderedHashMap::with_access_order(0, true);
        map.insert(1, "one").unwrap();
        map.insert(2, "two").unwrap();
        assert_eq!(map.insert_if_absent(1, "uno"), Ok(Some(&"one")));
        assert_eq!(keys(&map), vec![1, 2]);
        assert_eq!(map.insert_if_absent(3, "three"), Ok(None));
        assert_eq!(keys(&map), vec![1, 2, 3]);
    }

    #[test]
    fn replace_leaves_absent_keys_absent() {
        let mut map: OrderedHashMap<u32, u32> = OrderedHashMap::new();
        assert_eq!(map.replace(&1, 1), Ok(None));
        assert!(map.is_empty());
    }

    #[test]
    fn get_or_falls_back_without_inserting() {
        let mut map = OrderedHashMap::new();
        map.insert(1, 100).unwrap();
        let fallback = 7;
        assert_eq!(*map.get_or(&1, &fallback), 100);
        assert_eq!(*map.get_or(&2, &fallback), 7);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn max_entries_evicts_eldest_once_per_new_key() {
        let mut map = OrderedHashMap::builder()
            .eviction(MaxEntries::new(2))
            .build();
        map.insert(1, ()).unwrap();
        map.insert(2, ()).unwrap();
        map.insert(3, ()).unwrap();
        assert_eq!(keys(&map), vec![2, 3]);
        map.insert(3, ()).unwrap();
        assert_eq!(keys(&map), vec![2, 3]);
        map.debug_validate_invariants();
    }

    #[test]
    fn eviction_policy_sees_len_after_link() {
        let mut seen = Vec::new();
        {
            let mut map = OrderedHashMap::builder()
                .eviction(EvictWith(|k: &u32, _: &u32, len: usize| {
                    seen.push((*k, len));
                    false
                }))
                .build();
            map.insert(5, 0).unwrap();
            map.insert(6, 0).unwrap();
            map.insert(5, 1).unwrap();
        }
        assert_eq!(seen, vec![(5, 1), (5, 2)]);
    }

    #[test]
    fn zero_limit_keeps_map_empty() {
        let mut map = OrderedHashMap::builder()
            .eviction(MaxEntries::new(0))
            .build();
        assert_eq!(map.insert("x", 1), Ok(None));
        assert!(map.is_empty());
        map.debug_validate_invariants();
    }

    #[test]
    fn null_policy_rejects_before_touching_the_map() {
        let mut map = OrderedHashMap::builder()
            .null_keys(|k: &Option<u8>| k.is_none())
            .build();
        map.insert(Some(1), 1).unwrap();
        let count = map.mod_count();
        assert_eq!(map.insert(None, 2), Err(MapError::InvalidArgument));
        assert_eq!(map.insert_if_absent(None, 2), Err(MapError::InvalidArgument));
        assert_eq!(map.mod_count(), count);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn endpoints_and_polls() {
        let mut map: OrderedHashMap<_, _> = (1..=4).map(|k| (k, k)).collect();
        assert_eq!(map.first(), Some((&1, &1)));
        assert_eq!(map.last(), Some((&4, &4)));
        assert_eq!(map.pop_first(), Some((1, 1)));
        assert_eq!(map.pop_last(), Some((4, 4)));
        assert_eq!(keys(&map), vec![2, 3]);
        map.clear();
        assert_eq!(map.pop_first(), None);
        assert_eq!(map.first(), None);
    }

    #[test]
    fn iteration_is_double_ended_and_exact() {
        let map: OrderedHashMap<_, _> = (0..5).map(|k| (k, k * k)).collect();
        let iter = map.iter();
        assert_eq!(iter.len(), 5);
        let back: Vec<_> = map.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(back, vec![4, 3, 2, 1, 0]);
        let mut both = map.keys();
        assert_eq!(both.next(), Some(&0));
        assert_eq!(both.next_back(), Some(&4));
        assert_eq!(both.len(), 3);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![0, 1, 4, 9, 16]);
        let owned: Vec<_> = map.into_iter().collect();
        assert_eq!(owned[4], (4, 16));
    }

    #[test]
    fn retain_keeps_order_of_survivors() {
        let mut map: OrderedHashMap<_, _> = (0..10).map(|k| (k, k)).collect();
        map.retain(|k, v| {
            *v *= 2;
            k % 3 != 0
        });
        assert_eq!(keys(&map), vec![1, 2, 4, 5, 7, 8]);
        assert_eq!(map.peek(&4), Some(&8));
        map.debug_validate_invariants();
    }

    #[test]
    fn key_set_removes_but_never_inserts() {
        let mut map: OrderedHashMap<_, _> = [("a", 1), ("b", 2)].into_iter().collect();
        let mut set = map.key_set();
        assert!(set.contains("a"));
        assert_eq!(set.insert("c"), Err(MapError::UnsupportedMutation));
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(set.len(), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn cursor_remove_without_current_is_not_found() {
        let mut map: OrderedHashMap<_, _> = [(1, 1)].into_iter().collect();
        let mut cursor = map.cursor();
        assert_eq!(cursor.remove(&mut map), Err(MapError::NotFound));
        cursor.next(&map).unwrap();
        assert_eq!(cursor.remove(&mut map), Ok((1, 1)));
        assert_eq!(cursor.remove(&mut map), Err(MapError::NotFound));
        assert_eq!(cursor.next(&map), Ok(None));
    }

    #[test]
    fn cursor_trips_on_access_reorder() {
        let mut map = OrderedHashMap::with_access_order(0, true);
        map.insert(1, ()).unwrap();
        map.insert(2, ()).unwrap();
        let mut cursor = map.cursor();
        cursor.next(&map).unwrap();
        map.get(&1);
        assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
    }

    #[test]
    fn equality_ignores_order_and_clone_is_independent() {
        let a: OrderedHashMap<_, _> = [(1, 'a'), (2, 'b')].into_iter().collect();
        let b: OrderedHashMap<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
        assert_eq!(a, b);
        let mut c = a.clone();
        c.insert(3, 'c').unwrap();
        assert_ne!(a, c);
        assert_eq!(format!("{:?}", a), "{1: 'a', 2: 'b'}");
    }

    #[test]
    fn try_extend_stops_at_first_rejection() {
        let mut map = OrderedHashMap::builder()
            .null_values(|v: &i32| *v < 0)
            .build();
        assert_eq!(
            map.try_extend([(1, 1), (2, -2), (3, 3)]),
            Err(MapError::InvalidArgument)
        );
        assert_eq!(keys(&map), vec![1]);
        map.extend([(4, 4), (5, 5)]);
        assert_eq!(keys(&map), vec![1, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "extend rejected a pair")]
    fn extend_panics_on_rejected_pair() {
        let mut map = OrderedHashMap::builder()
            .null_values(|v: &i32| *v < 0)
            .build();
        map.extend([(1, 1), (2, -2)]);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_hits_reorders_and_evictions() {
        let mut map = OrderedHashMap::builder()
            .access_order(true)
            .eviction(MaxEntries::new(2))
            .build();
        map.insert(1, ()).unwrap();
        map.insert(2, ()).unwrap();
        map.get(&1);
        map.get(&9);
        map.insert(3, ()).unwrap();
        map.peek(&3);
        let snap = map.metrics_snapshot();
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.reorders, 1);
        assert_eq!(snap.evict_calls, 3);
        assert_eq!(snap.evicted_entries, 1);
        assert_eq!(snap.peek_found, 1);
        assert_eq!(snap.map_len, 2);
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::policy::eviction::MaxEntries;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, u16),
        Get(u8),
        Remove(u8),
        PopFirst,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k % 32, v)),
            3 => any::<u8>().prop_map(|k| Op::Get(k % 32)),
            2 => any::<u8>().prop_map(|k| Op::Remove(k % 32)),
            1 => Just(Op::PopFirst),
        ]
    }

    /// Reference model: a Vec in map order.
    fn apply_model(model: &mut Vec<(u8, u16)>, op: &Op, access_order: bool, limit: usize) {
        match *op {
            Op::Insert(k, v) => {
                if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                    model[pos].1 = v;
                    if access_order {
                        let entry = model.remove(pos);
                        model.push(entry);
                    }
                } else {
                    model.push((k, v));
                    if model.len() > limit {
                        model.remove(0);
                    }
                }
            },
            Op::Get(k) => {
                if access_order {
                    if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                        let entry = model.remove(pos);
                        model.push(entry);
                    }
                }
            },
            Op::Remove(k) => model.retain(|(mk, _)| *mk != k),
            Op::PopFirst => {
                if !model.is_empty() {
                    model.remove(0);
                }
            },
        }
    }

    proptest! {
        /// Iteration order matches a simple list model in both modes.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_order_matches_model(
            access_order in any::<bool>(),
            limit in 1usize..40,
            ops in prop::collection::vec(op(), 0..200)
        ) {
            let mut map = OrderedHashMap::builder()
                .access_order(access_order)
                .eviction(MaxEntries::new(limit))
                .build();
            let mut model = Vec::new();
            for op in &ops {
                match *op {
                    Op::Insert(k, v) => { map.insert(k, v).unwrap(); },
                    Op::Get(k) => { map.get(&k); },
                    Op::Remove(k) => { map.remove(&k); },
                    Op::PopFirst => { map.pop_first(); },
                }
                apply_model(&mut model, op, access_order, limit);
            }
            let actual: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(actual, model);
            prop_assert!(map.check_invariants().is_ok());
            prop_assert!(map.len() <= limit);
        }

        /// Without eviction the map holds exactly what a HashMap holds.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_contents_match_hashmap(
            ops in prop::collection::vec((any::<bool>(), 0u16..128, any::<u32>()), 0..300)
        ) {
            let mut map = OrderedHashMap::new();
            let mut reference = HashMap::new();
            for (insert, k, v) in ops {
                if insert {
                    prop_assert_eq!(map.insert(k, v).unwrap(), reference.insert(k, v));
                } else {
                    prop_assert_eq!(map.remove(&k), reference.remove(&k));
                }
            }
            prop_assert_eq!(map.len(), reference.len());
            for (k, v) in &reference {
                prop_assert_eq!(map.peek(k), Some(v));
            }
        }
    }
}
