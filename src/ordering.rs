//! Key orders for [`NavigableMap`](crate::map::navigable::NavigableMap).
//!
//! | Order             | Keys            | Behavior                                    |
//! |-------------------|-----------------|---------------------------------------------|
//! | `Natural`         | `K: Ord`        | `a.cmp(b)`                                  |
//! | `PartialNatural`  | `K: PartialOrd` | `a.partial_cmp(b)`, e.g. NaN is incomparable |
//! | `Reversed<C>`     | any `C`         | `C` with arguments swapped                  |
//! | `OrderWith<F>`    | closure         | `F(a, b) -> Option<Ordering>`               |
//! | `Total<C>`        | `compare` crate | any `compare::Compare<K>`, never fails      |

use std::cmp::Ordering;
use std::fmt;

use crate::traits::KeyOrder;

/// Natural order of `Ord` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> KeyOrder<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        Some(a.cmp(b))
    }
}

/// Natural order of `PartialOrd` keys; unordered pairs are incomparable.
///
/// ```
/// use ordkit::error::MapError;
/// use ordkit::map::navigable::NavigableMap;
/// use ordkit::ordering::PartialNatural;
///
/// let mut map = NavigableMap::with_order(PartialNatural);
/// map.insert(1.5_f64, "a").unwrap();
/// assert_eq!(map.insert(f64::NAN, "nan"), Err(MapError::Incomparable));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialNatural;

impl<K: PartialOrd + ?Sized> KeyOrder<K> for PartialNatural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        a.partial_cmp(b)
    }
}

/// Wraps an order and reverses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: KeyOrder<K>> KeyOrder<K> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        self.0.compare(b, a)
    }
}

/// Order defined by a closure.
#[derive(Clone, Copy)]
pub struct OrderWith<F>(pub F);

impl<F> fmt::Debug for OrderWith<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderWith").finish_non_exhaustive()
    }
}

impl<K: ?Sized, F> KeyOrder<K> for OrderWith<F>
where
    F: Fn(&K, &K) -> Option<Ordering>,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        (self.0)(a, b)
    }
}

/// Adapts any total comparator from the `compare` crate.
///
/// ```
/// use compare::{Compare, natural};
/// use ordkit::map::navigable::NavigableMap;
/// use ordkit::ordering::Total;
///
/// let mut map = NavigableMap::with_order(Total(natural().rev()));
/// for k in [1, 3, 2] {
///     map.insert(k, ()).unwrap();
/// }
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, vec![3, 2, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Total<C>(pub C);

impl<K, C> KeyOrder<K> for Total<C>
where
    C: compare::Compare<K>,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        Some(compare::Compare::compare(&self.0, a, b))
    }
}
