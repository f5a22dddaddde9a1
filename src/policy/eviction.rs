//! Eviction policies for [`OrderedHashMap`](crate::map::ordered_hash_map::OrderedHashMap).
//!
//! ## Building an LRU cache
//!
//! ```text
//!   access_order = true, policy = MaxEntries(3)
//!
//!   insert a, b, c        head ─► [a] ◄──► [b] ◄──► [c] ◄── tail
//!   get(a)                head ─► [b] ◄──► [c] ◄──► [a] ◄── tail
//!   insert d              head ─► [b] ◄──► [c] ◄──► [a] ◄──► [d]   len 4 > 3
//!                         policy(eldest = b) → true, b removed
//!                         head ─► [c] ◄──► [a] ◄──► [d] ◄── tail
//! ```
//!
//! ```
//! use ordkit::map::ordered_hash_map::OrderedHashMap;
//! use ordkit::policy::eviction::MaxEntries;
//!
//! let mut lru = OrderedHashMap::builder()
//!     .access_order(true)
//!     .eviction(MaxEntries::new(3))
//!     .build();
//! for key in ["a", "b", "c"] {
//!     lru.insert(key, key.len()).unwrap();
//! }
//! lru.get(&"a");
//! lru.insert("d", 1).unwrap();
//! let keys: Vec<_> = lru.keys().copied().collect();
//! assert_eq!(keys, vec!["c", "a", "d"]);
//! ```

use std::fmt;

use crate::traits::EvictionPolicy;

/// Never evicts. The default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverEvict;

impl<K, V> EvictionPolicy<K, V> for NeverEvict {
    #[inline]
    fn should_evict(&mut self, _eldest_key: &K, _eldest_value: &V, _len: usize) -> bool {
        false
    }
}

/// Evicts the eldest entry whenever the map holds more than `limit` entries.
///
/// A limit of 0 keeps the map empty: every new entry is evicted right after
/// it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxEntries {
    limit: usize,
}

impl MaxEntries {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }
}

impl<K, V> EvictionPolicy<K, V> for MaxEntries {
    #[inline]
    fn should_evict(&mut self, _eldest_key: &K, _eldest_value: &V, len: usize) -> bool {
        len > self.limit
    }
}

/// Policy backed by a closure `FnMut(&K, &V, len) -> bool`.
#[derive(Clone, Copy)]
pub struct EvictWith<F>(pub F);

impl<F> fmt::Debug for EvictWith<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictWith").finish_non_exhaustive()
    }
}

impl<K, V, F> EvictionPolicy<K, V> for EvictWith<F>
where
    F: FnMut(&K, &V, usize) -> bool,
{
    #[inline]
    fn should_evict(&mut self, eldest_key: &K, eldest_value: &V, len: usize) -> bool {
        (self.0)(eldest_key, eldest_value, len)
    }
}
