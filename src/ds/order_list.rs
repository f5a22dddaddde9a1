//! Intrusive doubly linked order list threaded through a `SlotArena`.
//!
//! Unlike a standalone list, the order list owns no nodes: the records live
//! in an arena owned by someone else (the hash map's bucket store) and carry
//! their own `before`/`after` links. The list only tracks `head`, `tail` and
//! the number of linked records, which lets one record sit in the hash table
//! and in the order list at the same time.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Entry<K, V>>), owned by the bucket store
//!   ┌────────┬───────────────────────────────────────────────────────┐
//!   │ SlotId │ Entry { key, value, hash, links: { before, after } }  │
//!   ├────────┼───────────────────────────────────────────────────────┤
//!   │ id_1   │ { A, .., before: None,       after: Some(id_2) }      │
//!   │ id_2   │ { B, .., before: Some(id_1), after: Some(id_3) }      │
//!   │ id_3   │ { C, .., before: Some(id_2), after: None }            │
//!   └────────┴───────────────────────────────────────────────────────┘
//!
//!   head (oldest) ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail (youngest)
//! ```
//!
//! ## Operations
//! - `push_back(id)`: link an already allocated record at the tail
//! - `move_to_back(id)`: detach + attach to tail
//! - `unlink(id)`: detach; the caller frees the slot
//!
//! ## Performance
//! - `push_back` / `unlink` / `move_to_back`: O(1)
//! - `iter_ids`: O(n) in linked records, independent of arena capacity
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Order links embedded in every record that can be put on an [`OrderList`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    pub before: Option<SlotId>,
    pub after: Option<SlotId>,
}

/// Records that carry [`Links`].
pub trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Head/tail bookkeeping for records linked through [`Links`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl OrderList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of linked records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest record.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Youngest record.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Record linked after `id`.
    pub fn next<T: Linked>(&self, arena: &SlotArena<T>, id: SlotId) -> Option<SlotId> {
        arena.get(id).and_then(|node| node.links().after)
    }

    /// Record linked before `id`.
    pub fn prev<T: Linked>(&self, arena: &SlotArena<T>, id: SlotId) -> Option<SlotId> {
        arena.get(id).and_then(|node| node.links().before)
    }

    /// Returns an iterator of SlotIds from head to tail.
    pub fn iter_ids<'a, T: Linked>(&self, arena: &'a SlotArena<T>) -> OrderIdIter<'a, T> {
        OrderIdIter {
            arena,
            current: self.head,
        }
    }

    /// Links `id` as the new tail. `id` must be allocated and unlinked.
    pub fn push_back<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        self.attach_back(arena, id);
        self.len += 1;
    }

    /// Unlinks `id`, patching its neighbours and `head`/`tail`.
    /// The slot itself stays allocated.
    pub fn unlink<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if self.detach(arena, id).is_some() {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Moves an existing record to the tail.
    ///
    /// Returns `true` only if the order actually changed; moving the current
    /// tail is a no-op.
    pub fn move_to_back<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if !arena.contains(id) || Some(id) == self.tail {
            return false;
        }
        self.detach(arena, id);
        self.attach_back(arena, id);
        true
    }

    /// Forgets every link. The caller clears the arena.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn detach<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> Option<()> {
        let Links { before, after } = *arena.get(id)?.links();

        if let Some(prev_id) = before {
            if let Some(prev_node) = arena.get_mut(prev_id) {
                prev_node.links_mut().after = after;
            }
        } else {
            self.head = after;
        }

        if let Some(next_id) = after {
            if let Some(next_node) = arena.get_mut(next_id) {
                next_node.links_mut().before = before;
            }
        } else {
            self.tail = before;
        }

        if let Some(node) = arena.get_mut(id) {
            *node.links_mut() = Links::default();
        }

        Some(())
    }

    fn attach_back<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> Option<()> {
        let old_tail = self.tail;
        let node = arena.get_mut(id)?;
        *node.links_mut() = Links {
            before: old_tail,
            after: None,
        };
        if let Some(old_tail) = old_tail {
            if let Some(tail_node) = arena.get_mut(old_tail) {
                tail_node.links_mut().after = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        Some(())
    }

    /// Walks the list both ways and returns a description of the first broken
    /// link, if any.
    pub fn validate<T: Linked>(&self, arena: &SlotArena<T>) -> Result<(), String> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || self.len != 0 {
                return Err("empty order list has a dangling endpoint".to_string());
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            let node = arena
                .get(id)
                .ok_or_else(|| format!("order list links to vacant slot {}", id.index()))?;
            if node.links().before != prev {
                return Err(format!("slot {} has a stale `before` link", id.index()));
            }
            if node.links().after.is_none() && self.tail != Some(id) {
                return Err("forward walk ended before reaching tail".to_string());
            }
            prev = Some(id);
            current = node.links().after;
            count += 1;
            if count > self.len {
                return Err("order list is longer than its recorded length".to_string());
            }
        }

        if count != self.len {
            return Err(format!(
                "order list walked {} records but records {}",
                count, self.len
            ));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<T: Linked>(&self, arena: &SlotArena<T>) {
        if let Err(msg) = self.validate(arena) {
            panic!("{}", msg);
        }
    }
}

/// Iterator over SlotIds from head to tail.
pub struct OrderIdIter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
}

impl<'a, T: Linked> Iterator for OrderIdIter<'a, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.arena.get(id)?;
        self.current = node.links().after;
        Some(id)
    }
}
