//! # Capability Traits
//!
//! Extension points of the two containers are passed in as values at
//! construction rather than by overriding methods.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐   ┌─────────────────────────────────────────┐
//!   │          EvictionPolicy<K, V>           │   │              KeyOrder<K>                │
//!   │                                         │   │                                         │
//!   │  should_evict(&mut, &K, &V, len) → bool │   │  compare(&, &K, &K) → Option<Ordering>  │
//!   └────────────────────┬────────────────────┘   └────────────────────┬────────────────────┘
//!                        │                                             │
//!                        ▼                                             ▼
//!   ┌─────────────────────────────────────────┐   ┌─────────────────────────────────────────┐
//!   │  OrderedHashMap<K, V, P, S>             │   │  NavigableMap<K, V, C>                  │
//!   │  consulted once per new-key insertion   │   │  every placement and lookup             │
//!   │  with the current head (eldest) entry   │   │  None ⇒ MapError::Incomparable          │
//!   └─────────────────────────────────────────┘   └─────────────────────────────────────────┘
//! ```
//!
//! | Trait            | Implementations (crate)                                        |
//! |------------------|----------------------------------------------------------------|
//! | `EvictionPolicy` | `NeverEvict`, `MaxEntries`, `EvictWith`                        |
//! | `KeyOrder`       | `Natural`, `PartialNatural`, `Reversed`, `OrderWith`, `Total`  |

use std::cmp::Ordering;

/// Decides whether the eldest entry leaves the map after an insertion.
///
/// Invoked exactly once per insertion of a *new* key, after the new entry is
/// linked and counted (so `len` already includes it). Never invoked when an
/// existing key's value is replaced. Returning `true` removes the eldest entry
/// (the head of the order list: least recently inserted, or least recently
/// accessed in access-order mode).
///
/// The map is mutably borrowed while the policy runs, so a policy cannot
/// remove entries itself; it can only answer.
///
/// # Example
///
/// ```
/// use ordkit::map::ordered_hash_map::OrderedHashMap;
/// use ordkit::traits::EvictionPolicy;
///
/// /// Evicts any entry whose value went stale, regardless of size.
/// struct DropStale;
///
/// impl EvictionPolicy<&'static str, (u32, bool)> for DropStale {
///     fn should_evict(&mut self, _key: &&'static str, value: &(u32, bool), _len: usize) -> bool {
///         value.1
///     }
/// }
///
/// let mut map = OrderedHashMap::builder().eviction(DropStale).build();
/// map.insert("old", (1, true)).unwrap();
/// map.insert("new", (2, false)).unwrap();
/// assert!(!map.contains_key(&"old"));
/// ```
pub trait EvictionPolicy<K, V> {
    fn should_evict(&mut self, eldest_key: &K, eldest_value: &V, len: usize) -> bool;
}

/// Orders keys of a navigable map.
///
/// Returning `None` means the two keys cannot be ordered; the map surfaces
/// that as [`MapError::Incomparable`](crate::error::MapError::Incomparable)
/// without modifying anything. Implementations must be consistent: a total,
/// transitive order over every key that is ever stored.
pub trait KeyOrder<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Option<Ordering>;
}
