//! Bounded and descending views over a [`NavigableMap`].
//!
//! A view borrows its map, so the map cannot change behind its back; every
//! write made through a writable view lands in the map itself. Bounds are
//! stored in the map's own (absolute) order, and a descending view simply
//! answers each query with its mirrored relation:
//!
//! ```text
//!   absolute:      lo ─── 2 ─── 4 ─── 6 ─── 8 ─── hi
//!   ascending:     first = 2, ceiling(5) = 6
//!   descending:    first = 8, ceiling(5) = 4   (absolute floor)
//! ```
//!
//! Views nest: [`NavigableView::sub_map`], [`head_map`](NavigableView::head_map)
//! and [`tail_map`](NavigableView::tail_map) consume the view and narrow it
//! further; go through [`by_ref`](NavigableView::by_ref) to keep the outer
//! view. A bound outside the current view is
//! [`MapError::OutOfRange`]; bounds that cross are
//! [`MapError::InvalidArgument`].

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Bound;

use crate::ds::slot_arena::SlotId;
use crate::error::MapError;
use crate::map::navigable::{NavigableMap, Range, bound, compare};
use crate::store::tree::Relation;
use crate::traits::KeyOrder;

pub(crate) enum Backing<'a, K, V, C> {
    Shared(&'a NavigableMap<K, V, C>),
    Exclusive(&'a mut NavigableMap<K, V, C>),
}

impl<K, V, C> Backing<'_, K, V, C> {
    fn map(&self) -> &NavigableMap<K, V, C> {
        match self {
            Backing::Shared(map) => *map,
            Backing::Exclusive(map) => &**map,
        }
    }

    fn map_mut(&mut self) -> Result<&mut NavigableMap<K, V, C>, MapError> {
        match self {
            Backing::Shared(_) => Err(MapError::UnsupportedMutation),
            Backing::Exclusive(map) => Ok(&mut **map),
        }
    }

    fn reborrow(&mut self) -> Backing<'_, K, V, C> {
        match self {
            Backing::Shared(map) => Backing::Shared(*map),
            Backing::Exclusive(map) => Backing::Exclusive(&mut **map),
        }
    }
}

/// Live projection of a key range of a [`NavigableMap`], optionally reversed.
pub struct NavigableView<'a, K, V, C> {
    backing: Backing<'a, K, V, C>,
    lo: Bound<K>,
    hi: Bound<K>,
    descending: bool,
}

impl<'a, K, V, C> NavigableView<'a, K, V, C> {
    pub(crate) fn unbounded(backing: Backing<'a, K, V, C>, descending: bool) -> Self {
        backing.map().note_view();
        Self {
            backing,
            lo: Bound::Unbounded,
            hi: Bound::Unbounded,
            descending,
        }
    }

    /// `true` when iteration and navigation run from greatest to least key.
    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// `true` for views created from a shared borrow.
    pub fn is_read_only(&self) -> bool {
        matches!(self.backing, Backing::Shared(_))
    }

    /// The same range in the opposite direction.
    pub fn descending_map(mut self) -> Self {
        self.descending = !self.descending;
        self
    }

    /// Borrows this view as a new view with the same bounds and direction.
    ///
    /// The nesting methods consume their receiver; narrowing a `by_ref` view
    /// leaves this one usable whether or not the narrowing succeeds.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::error::MapError;
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map: NavigableMap<_, _> = (1..=9).map(|k| (k, k)).collect();
    /// let mut mid = map.sub_map(3, true, 7, true).unwrap();
    ///
    /// assert_eq!(mid.by_ref().head_map(8, false).err(), Some(MapError::OutOfRange));
    /// mid.by_ref().head_map(5, false).unwrap().clear().unwrap();
    /// assert_eq!(mid.keys().unwrap().copied().collect::<Vec<_>>(), vec![5, 6, 7]);
    /// ```
    pub fn by_ref(&mut self) -> NavigableView<'_, K, V, C>
    where
        K: Clone,
    {
        let backing = self.backing.reborrow();
        backing.map().note_view();
        NavigableView {
            backing,
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            descending: self.descending,
        }
    }

    fn map(&self) -> &NavigableMap<K, V, C> {
        self.backing.map()
    }

    fn ensure_writable(&self) -> Result<(), MapError> {
        if self.is_read_only() {
            Err(MapError::UnsupportedMutation)
        } else {
            Ok(())
        }
    }
}

impl<'a, K, V, C: KeyOrder<K>> NavigableView<'a, K, V, C> {
    pub(crate) fn new(
        backing: Backing<'a, K, V, C>,
        lo: Bound<K>,
        hi: Bound<K>,
        descending: bool,
    ) -> Result<Self, MapError> {
        let map = backing.map();
        for end in [&lo, &hi] {
            if let Bound::Included(key) | Bound::Excluded(key) = end {
                map.bound_is_comparable(key)?;
            }
        }
        if let (Bound::Included(l) | Bound::Excluded(l), Bound::Included(h) | Bound::Excluded(h)) =
            (&lo, &hi)
        {
            if compare(map.comparator(), l, h)? == Ordering::Greater {
                return Err(MapError::InvalidArgument);
            }
        }
        map.note_view();
        Ok(Self {
            backing,
            lo,
            hi,
            descending,
        })
    }

    /// Number of entries inside the bounds. Walks the range unless the view
    /// is unbounded.
    pub fn len(&self) -> Result<usize, MapError> {
        if let (Bound::Unbounded, Bound::Unbounded) = (&self.lo, &self.hi) {
            return Ok(self.map().len());
        }
        Ok(self.iter()?.count())
    }

    /// `true` when no key of the map falls inside the bounds.
    pub fn is_empty(&self) -> Result<bool, MapError> {
        Ok(self.first_id()?.is_none())
    }

    /// Returns `true` if `key` lies inside the bounds and is present in the map.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = (1..=5).map(|k| (k, ())).collect();
    /// let head = map.head_view(3, false).unwrap();
    /// assert_eq!(head.contains_key(&2), Ok(true));
    /// assert_eq!(head.contains_key(&4), Ok(false));
    /// ```
    pub fn contains_key(&self, key: &K) -> Result<bool, MapError> {
        Ok(self.in_range(key)? && self.map().contains_key(key)?)
    }

    /// Value for `key`; `None` for keys outside the bounds even when the map
    /// holds them.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = (1..=5).map(|k| (k, k * 10)).collect();
    /// let tail = map.tail_view(3, true).unwrap();
    /// assert_eq!(tail.get(&4), Ok(Some(&40)));
    /// assert_eq!(tail.get(&1), Ok(None));
    /// ```
    pub fn get(&self, key: &K) -> Result<Option<&V>, MapError> {
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.map().get(key)
    }

    /// Mutable value for `key` inside the bounds.
    ///
    /// # Errors
    ///
    /// [`MapError::UnsupportedMutation`] on a read-only view.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::error::MapError;
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map: NavigableMap<_, _> = (1..=5).map(|k| (k, k)).collect();
    /// {
    ///     let mut head = map.head_map(3, true).unwrap();
    ///     if let Some(v) = head.get_mut(&2).unwrap() {
    ///         *v = 200;
    ///     }
    ///     assert_eq!(head.get_mut(&4).map(|v| v.is_none()), Ok(true));
    /// }
    /// assert_eq!(map.get(&2), Ok(Some(&200)));
    /// assert_eq!(
    ///     map.view().get_mut(&2).err(),
    ///     Some(MapError::UnsupportedMutation)
    /// );
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, MapError> {
        self.ensure_writable()?;
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.backing.map_mut()?.get_mut(key)
    }

    /// Inserts into the underlying map.
    ///
    /// # Errors
    ///
    /// - [`MapError::UnsupportedMutation`] on a read-only view.
    /// - [`MapError::OutOfRange`] if `key` lies outside the bounds.
    /// - Anything [`NavigableMap::insert`] reports.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        self.ensure_writable()?;
        if !self.in_range(&key)? {
            return Err(MapError::OutOfRange);
        }
        self.backing.map_mut()?.insert(key, value)
    }

    /// Removes `key` from the underlying map if it lies inside the bounds.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, MapError> {
        self.ensure_writable()?;
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.backing.map_mut()?.remove(key)
    }

    /// Removes every entry inside the bounds.
    pub fn clear(&mut self) -> Result<(), MapError> {
        while self.pop_first()?.is_some() {}
        Ok(())
    }

    /// First entry in view order.
    pub fn first_entry(&self) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.first_id()?))
    }

    /// Last entry in view order.
    pub fn last_entry(&self) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.last_id()?))
    }

    /// First key in view order; [`MapError::NotFound`] when empty.
    pub fn first_key(&self) -> Result<&K, MapError> {
        self.first_entry()?.map(|(k, _)| k).ok_or(MapError::NotFound)
    }

    /// Last key in view order; [`MapError::NotFound`] when empty.
    pub fn last_key(&self) -> Result<&K, MapError> {
        self.last_entry()?.map(|(k, _)| k).ok_or(MapError::NotFound)
    }

    /// Removes the first entry in view order.
    pub fn pop_first(&mut self) -> Result<Option<(K, V)>, MapError> {
        self.ensure_writable()?;
        match self.first_id()? {
            Some(id) => self.backing.map_mut()?.remove_node(id),
            None => Ok(None),
        }
    }

    /// Removes the last entry in view order.
    pub fn pop_last(&mut self) -> Result<Option<(K, V)>, MapError> {
        self.ensure_writable()?;
        match self.last_id()? {
            Some(id) => self.backing.map_mut()?.remove_node(id),
            None => Ok(None),
        }
    }

    /// Entry with the greatest key strictly before `key` in view order, clamped
    /// to the bounds. On a descending view this is the next larger key.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let mut map: NavigableMap<_, _> = (1..=9).map(|k| (k, k)).collect();
    /// let sub = map.sub_view(3, true, 6, true).unwrap();
    /// assert_eq!(sub.lower_entry(&5), Ok(Some((&4, &4))));
    /// assert_eq!(sub.lower_entry(&3), Ok(None));
    /// assert_eq!(sub.lower_entry(&9), Ok(Some((&6, &6))));
    ///
    /// let desc = map.descending_map();
    /// assert_eq!(desc.lower_entry(&5), Ok(Some((&6, &6))));
    /// ```
    pub fn lower_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.nearest_id(key, Relation::Lower)?))
    }

    /// Like [`lower_entry`](Self::lower_entry), but `key` itself matches.
    pub fn floor_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.nearest_id(key, Relation::Floor)?))
    }

    /// Entry with the least key at or after `key` in view order.
    pub fn ceiling_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.nearest_id(key, Relation::Ceiling)?))
    }

    /// Entry with the least key strictly after `key` in view order.
    pub fn higher_entry(&self, key: &K) -> Result<Option<(&K, &V)>, MapError> {
        Ok(self.map().entry_at(self.nearest_id(key, Relation::Higher)?))
    }

    /// Key-only forms of the nearest-entry queries.
    ///
    /// # Example
    ///
    /// ```
    /// use ordkit::map::navigable::NavigableMap;
    ///
    /// let map: NavigableMap<_, _> = [(10, ()), (20, ()), (30, ()), (40, ())].into_iter().collect();
    /// let desc = map.sub_view(10, false, 40, false).unwrap().descending_map();
    /// assert_eq!(desc.lower_key(&25), Ok(Some(&30)));
    /// assert_eq!(desc.floor_key(&20), Ok(Some(&20)));
    /// assert_eq!(desc.ceiling_key(&25), Ok(Some(&20)));
    /// assert_eq!(desc.higher_key(&20), Ok(None));
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

    /// Entries inside the bounds, in view order.
    pub fn iter(&self) -> Result<ViewIter<'_, K, V>, MapError> {
        let range = self.map().range_within(self.lo.as_ref(), self.hi.as_ref())?;
        Ok(ViewIter {
            range,
            descending: self.descending,
        })
    }

    /// Keys inside the bounds, in view order.
    pub fn keys(&self) -> Result<impl DoubleEndedIterator<Item = &K>, MapError> {
        Ok(self.iter()?.map(|(k, _)| k))
    }

    pub fn values(&self) -> Result<impl DoubleEndedIterator<Item = &V>, MapError> {
        Ok(self.iter()?.map(|(_, v)| v))
    }

    /// Narrows the view to keys between `from` and `to`, in view order.
    ///
    /// # Errors
    ///
    /// - [`MapError::OutOfRange`] if either bound lies outside this view.
    /// - [`MapError::InvalidArgument`] if `from` comes after `to`.
    pub fn sub_map(
        self,
        from: K,
        from_inclusive: bool,
        to: K,
        to_inclusive: bool,
    ) -> Result<Self, MapError> {
        self.ensure_within(&from, from_inclusive)?;
        self.ensure_within(&to, to_inclusive)?;
        let (from, to) = (bound(from, from_inclusive), bound(to, to_inclusive));
        if self.descending {
            Self::new(self.backing, to, from, true)
        } else {
            Self::new(self.backing, from, to, false)
        }
    }

    /// Narrows the view to keys before `to`, in view order.
    pub fn head_map(self, to: K, inclusive: bool) -> Result<Self, MapError> {
        self.ensure_within(&to, inclusive)?;
        let Self {
            backing,
            lo,
            hi,
            descending,
        } = self;
        if descending {
            Self::new(backing, bound(to, inclusive), hi, true)
        } else {
            Self::new(backing, lo, bound(to, inclusive), false)
        }
    }

    /// Narrows the view to keys after `from`, in view order.
    pub fn tail_map(self, from: K, inclusive: bool) -> Result<Self, MapError> {
        self.ensure_within(&from, inclusive)?;
        let Self {
            backing,
            lo,
            hi,
            descending,
        } = self;
        if descending {
            Self::new(backing, lo, bound(from, inclusive), true)
        } else {
            Self::new(backing, bound(from, inclusive), hi, false)
        }
    }

    fn cmp(&self, a: &K, b: &K) -> Result<Ordering, MapError> {
        compare(self.map().comparator(), a, b)
    }

    fn too_low(&self, key: &K) -> Result<bool, MapError> {
        Ok(match &self.lo {
            Bound::Unbounded => false,
            Bound::Included(lo) => self.cmp(key, lo)? == Ordering::Less,
            Bound::Excluded(lo) => self.cmp(key, lo)? != Ordering::Greater,
        })
    }

    fn too_high(&self, key: &K) -> Result<bool, MapError> {
        Ok(match &self.hi {
            Bound::Unbounded => false,
            Bound::Included(hi) => self.cmp(key, hi)? == Ordering::Greater,
            Bound::Excluded(hi) => self.cmp(key, hi)? != Ordering::Less,
        })
    }

    fn in_range(&self, key: &K) -> Result<bool, MapError> {
        Ok(!self.too_low(key)? && !self.too_high(key)?)
    }

    /// A nested bound may sit on an exclusive edge of this view only if the
    /// nested bound is itself exclusive.
    fn ensure_within(&self, key: &K, inclusive: bool) -> Result<(), MapError> {
        let inside = if inclusive {
            self.in_range(key)?
        } else {
            let above_lo = match &self.lo {
                Bound::Unbounded => true,
                Bound::Included(lo) | Bound::Excluded(lo) => self.cmp(key, lo)? != Ordering::Less,
            };
            let below_hi = match &self.hi {
                Bound::Unbounded => true,
                Bound::Included(hi) | Bound::Excluded(hi) => {
                    self.cmp(key, hi)? != Ordering::Greater
                },
            };
            above_lo && below_hi
        };
        if inside {
            Ok(())
        } else {
            Err(MapError::OutOfRange)
        }
    }

    fn key_of(&self, id: SlotId) -> Option<&K> {
        self.map().entry_at(Some(id)).map(|(k, _)| k)
    }

    fn clip_high(&self, id: Option<SlotId>) -> Result<Option<SlotId>, MapError> {
        match id.and_then(|id| self.key_of(id).map(|key| (id, key))) {
            Some((id, key)) if !self.too_high(key)? => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    fn clip_low(&self, id: Option<SlotId>) -> Result<Option<SlotId>, MapError> {
        match id.and_then(|id| self.key_of(id).map(|key| (id, key))) {
            Some((id, key)) if !self.too_low(key)? => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    fn abs_lowest(&self) -> Result<Option<SlotId>, MapError> {
        let map = self.map();
        let id = match &self.lo {
            Bound::Unbounded => map.tree().first(),
            Bound::Included(lo) => map.seek(lo, Relation::Ceiling)?,
            Bound::Excluded(lo) => map.seek(lo, Relation::Higher)?,
        };
        self.clip_high(id)
    }

    fn abs_highest(&self) -> Result<Option<SlotId>, MapError> {
        let map = self.map();
        let id = match &self.hi {
            Bound::Unbounded => map.tree().last(),
            Bound::Included(hi) => map.seek(hi, Relation::Floor)?,
            Bound::Excluded(hi) => map.seek(hi, Relation::Lower)?,
        };
        self.clip_low(id)
    }

    /// Nearest match in absolute order, clamped to the bounds. A probe past
    /// one end resolves to that end's extreme entry.
    fn abs_nearest(&self, key: &K, relation: Relation) -> Result<Option<SlotId>, MapError> {
        match relation {
            Relation::Ceiling | Relation::Higher => {
                if self.too_low(key)? {
                    return self.abs_lowest();
                }
                let id = self.map().seek(key, relation)?;
                self.clip_high(id)
            },
            Relation::Floor | Relation::Lower => {
                if self.too_high(key)? {
                    return self.abs_highest();
                }
                let id = self.map().seek(key, relation)?;
                self.clip_low(id)
            },
        }
    }

    fn first_id(&self) -> Result<Option<SlotId>, MapError> {
        if self.descending {
            self.abs_highest()
        } else {
            self.abs_lowest()
        }
    }

    fn last_id(&self) -> Result<Option<SlotId>, MapError> {
        if self.descending {
            self.abs_lowest()
        } else {
            self.abs_highest()
        }
    }

    fn nearest_id(&self, key: &K, relation: Relation) -> Result<Option<SlotId>, MapError> {
        self.map().bound_is_comparable(key)?;
        let relation = if self.descending {
            relation.mirrored()
        } else {
            relation
        };
        self.abs_nearest(key, relation)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: KeyOrder<K>> fmt::Debug for NavigableView<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iter() {
            Ok(iter) => f.debug_map().entries(iter).finish(),
            Err(err) => write!(f, "NavigableView({})", err),
        }
    }
}

/// Iterator over a view in view order.
pub struct ViewIter<'a, K, V> {
    range: Range<'a, K, V>,
    descending: bool,
}

impl<'a, K, V> Iterator for ViewIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.descending {
            self.range.next_back()
        } else {
            self.range.next()
        }
    }
}

impl<K, V> DoubleEndedIterator for ViewIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.descending {
            self.range.next()
        } else {
            self.range.next_back()
        }
    }
}

impl<K, V> FusedIterator for ViewIter<'_, K, V> {}
