//! Hash bucket store: key lookup for the ordered hash map.
//!
//! ## Architecture
//!
//! ```text
//!   table: HashTable<SlotId>           entries: SlotArena<Entry<K, V>>
//!   ┌──────────────────────┐           ┌────────┬─────────────────────────────────┐
//!   │ h(A) ──► id_0        │ ────────► │ id_0   │ Entry { A, va, hash, links }    │
//!   │ h(C) ──► id_2        │ ────────► │ id_1   │ Entry { B, vb, hash, links }    │
//!   │ h(B) ──► id_1        │ ────────► │ id_2   │ Entry { C, vc, hash, links }    │
//!   └──────────────────────┘           └────────┴─────────────────────────────────┘
//! ```
//!
//! The table stores only handles; keys, values and the cached hash live in
//! the arena. Each entry also carries order [`Links`] so the map can thread
//! its [`OrderList`](crate::ds::order_list::OrderList) through the same
//! records. Rehashing reads the cached hash and never calls the hasher again.
//!
//! ## Core Operations
//! - `hash(key)`: hash with the store's `BuildHasher`
//! - `find_by_hash(hash, key)`: lookup
//! - `insert(hash, key, value, hooks)`: create, or replace the value in place
//! - `remove_by_hash(hash, key, hooks)` / `remove_slot(id, hooks)`: delete
//! - `access(id, hooks)`: forward an access to the hooks
//!
//! ## Type Constraints
//! - `K: Eq + Hash` for lookups; `Q: ?Sized` borrowed forms are accepted.
//! - `S: BuildHasher`; defaults to `rustc_hash::FxBuildHasher`.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::mem;

use hashbrown::HashTable;
use rustc_hash::FxBuildHasher;

use crate::ds::order_list::{Linked, Links};
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::store::traits::NodeLifecycle;

/// One key/value record.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    pub hash: u64,
    pub links: Links,
}

impl<K, V> Linked for Entry<K, V> {
    #[inline]
    fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// Outcome of [`BucketStore::insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum Placement<V> {
    /// A new record was allocated.
    Created(SlotId),
    /// The key existed; its value was swapped in place.
    Replaced {
        id: SlotId,
        old: V,
        reordered: bool,
    },
}

#[derive(Debug, Clone)]
pub struct BucketStore<K, V, S = FxBuildHasher> {
    entries: SlotArena<Entry<K, V>>,
    table: HashTable<SlotId>,
    hasher: S,
}

impl<K, V, S: Default> Default for BucketStore<K, V, S> {
    fn default() -> Self {
        Self::with_capacity_and_hasher(0, S::default())
    }
}

impl<K, V, S> BucketStore<K, V, S> {
    /// Creates a store pre-sized for `capacity` records.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records the table holds without reallocating.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of handles in the hash table.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn entries(&self) -> &SlotArena<Entry<K, V>> {
        &self.entries
    }

    /// Consumes the store, keeping only the arena.
    pub fn into_entries(self) -> SlotArena<Entry<K, V>> {
        self.entries
    }

    pub fn get(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(id)
    }

    /// Lets `hooks` observe an access to `id`. Returns whether the hooks
    /// reordered anything.
    pub fn access<H>(&mut self, id: SlotId, hooks: &mut H) -> bool
    where
        H: NodeLifecycle<Entry<K, V>>,
    {
        if !self.entries.contains(id) {
            return false;
        }
        hooks.on_accessed(&mut self.entries, id)
    }

    /// Removes the record behind `id`.
    pub fn remove_slot<H>(&mut self, id: SlotId, hooks: &mut H) -> Option<(K, V)>
    where
        H: NodeLifecycle<Entry<K, V>>,
    {
        let hash = self.entries.get(id)?.hash;
        if let Ok(found) = self.table.find_entry(hash, |&other| other == id) {
            found.remove();
        }
        hooks.on_removed(&mut self.entries, id);
        self.entries.remove(id).map(|entry| (entry.key, entry.value))
    }

    /// Drops every record. Hooks are not told; the caller resets its own
    /// order structures.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.table.clear();
    }
}

impl<K, V, S> BucketStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    pub fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    pub fn find_by_hash<Q>(&self, hash: u64, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let entries = &self.entries;
        self.table
            .find(hash, |&id| entries[id].key.borrow() == key)
            .copied()
    }

    /// Inserts `key`, or replaces the value of the record already holding it.
    pub fn insert<H>(&mut self, hash: u64, key: K, value: V, hooks: &mut H) -> Placement<V>
    where
        H: NodeLifecycle<Entry<K, V>>,
    {
        if let Some(id) = self.find_by_hash(hash, &key) {
            let old = mem::replace(&mut self.entries[id].value, value);
            let reordered = hooks.on_replaced(&mut self.entries, id);
            return Placement::Replaced { id, old, reordered };
        }

        let id = self.entries.insert(Entry {
            key,
            value,
            hash,
            links: Links::default(),
        });
        let entries = &self.entries;
        self.table
            .insert_unique(hash, id, |&other| entries[other].hash);
        hooks.on_created(&mut self.entries, id);
        Placement::Created(id)
    }

    pub fn remove_by_hash<Q, H>(&mut self, hash: u64, key: &Q, hooks: &mut H) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: NodeLifecycle<Entry<K, V>>,
    {
        let entries = &self.entries;
        let found = self
            .table
            .find_entry(hash, |&id| entries[id].key.borrow() == key)
            .ok()?;
        let (id, _) = found.remove();
        hooks.on_removed(&mut self.entries, id);
        self.entries.remove(id).map(|entry| (entry.key, entry.value))
    }

    /// Makes room for `additional` more records.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
        let entries = &self.entries;
        self.table
            .reserve(additional, |&other| entries[other].hash);
    }

    /// Checks that table and arena agree: every handle resolves to a record
    /// whose cached hash matches its key and every record is reachable.
    pub fn validate(&self) -> Result<(), String> {
        if self.table.len() != self.entries.len() {
            return Err(format!(
                "hash table holds {} handles but arena holds {} entries",
                self.table.len(),
                self.entries.len()
            ));
        }
        for (id, entry) in self.entries.iter() {
            if self.hasher.hash_one(&entry.key) != entry.hash {
                return Err(format!("slot {} caches a stale hash", id.index()));
            }
            if self.find_by_hash(entry.hash, &entry.key) != Some(id) {
                return Err(format!("slot {} is not reachable through the table", id.index()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::NoHooks;

    #[derive(Default)]
    struct Journal {
        events: Vec<(&'static str, usize)>,
    }

    impl<T> NodeLifecycle<T> for Journal {
        fn on_created(&mut self, _arena: &mut SlotArena<T>, id: SlotId) {
            self.events.push(("created", id.index()));
        }

        fn on_replaced(&mut self, _arena: &mut SlotArena<T>, id: SlotId) -> bool {
            self.events.push(("replaced", id.index()));
            true
        }

        fn on_removed(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
            assert!(arena.contains(id), "record must still be allocated");
            self.events.push(("removed", id.index()));
        }

        fn on_accessed(&mut self, _arena: &mut SlotArena<T>, id: SlotId) -> bool {
            self.events.push(("accessed", id.index()));
            false
        }
    }

    #[test]
    fn insert_creates_then_replaces() {
        let mut store: BucketStore<String, u32> = BucketStore::default();
        let mut journal = Journal::default();
        let hash = store.hash("a");

        let id = match store.insert(hash, "a".to_string(), 1, &mut journal) {
            Placement::Created(id) => id,
            other => panic!("expected creation, got {:?}", other),
        };
        match store.insert(hash, "a".to_string(), 2, &mut journal) {
            Placement::Replaced {
                id: replaced,
                old,
                reordered,
            } => {
                assert_eq!(replaced, id);
                assert_eq!(old, 1);
                assert!(reordered);
            },
            other => panic!("expected replacement, got {:?}", other),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).map(|e| e.value), Some(2));
        assert_eq!(
            journal.events,
            vec![("created", id.index()), ("replaced", id.index())]
        );
        store.validate().unwrap();
    }

    #[test]
    fn find_by_hash_accepts_borrowed_keys() {
        let mut store: BucketStore<String, u32> = BucketStore::default();
        let hash = store.hash("key");
        store.insert(hash, "key".to_string(), 7, &mut NoHooks);
        let id = store.find_by_hash(store.hash("key"), "key").unwrap();
        assert_eq!(store.get(id).unwrap().value, 7);
        assert_eq!(store.find_by_hash(store.hash("nope"), "nope"), None);
    }

    #[test]
    fn remove_by_hash_and_by_slot() {
        let mut store: BucketStore<u64, &str> = BucketStore::default();
        let mut journal = Journal::default();
        for (k, v) in [(1, "one"), (2, "two"), (3, "three")] {
            let hash = store.hash(&k);
            store.insert(hash, k, v, &mut journal);
        }

        let hash = store.hash(&2);
        assert_eq!(store.remove_by_hash(hash, &2, &mut journal), Some((2, "two")));
        assert_eq!(store.remove_by_hash(hash, &2, &mut journal), None);

        let id = store.find_by_hash(store.hash(&3), &3).unwrap();
        assert_eq!(store.remove_slot(id, &mut journal), Some((3, "three")));
        assert_eq!(store.remove_slot(id, &mut journal), None);

        assert_eq!(store.len(), 1);
        assert_eq!(store.table_len(), 1);
        store.validate().unwrap();
    }

    #[test]
    fn access_reaches_hooks_only_for_live_slots() {
        let mut store: BucketStore<u64, u64> = BucketStore::default();
        let mut journal = Journal::default();
        let hash = store.hash(&9);
        store.insert(hash, 9, 9, &mut journal);
        let id = store.find_by_hash(hash, &9).unwrap();
        store.access(id, &mut journal);
        store.remove_slot(id, &mut journal);
        store.access(id, &mut journal);
        assert_eq!(
            journal.events.iter().filter(|(e, _)| *e == "accessed").count(),
            1
        );
    }

    #[test]
    fn growth_keeps_every_key_reachable() {
        let mut store: BucketStore<u64, u64> = BucketStore::with_capacity_and_hasher(2, FxBuildHasher);
        for k in 0..1_000 {
            let hash = store.hash(&k);
            store.insert(hash, k, k * 2, &mut NoHooks);
        }
        store.reserve(100);
        assert!(store.capacity() >= 1_100);
        for k in 0..1_000 {
            let id = store.find_by_hash(store.hash(&k), &k).unwrap();
            assert_eq!(store.get(id).unwrap().value, k * 2);
        }
        store.validate().unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
