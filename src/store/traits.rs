//! Lifecycle hooks between a store and the structures layered on top of it.
//!
//! Stores own key/value records and lookup; whoever maintains an extra order
//! over those records (the order list of an ordered hash map) implements
//! [`NodeLifecycle`] and is told about every record the store creates,
//! replaces, removes or is asked to touch.
//!
//! ```text
//!   BucketStore::insert ──► new key ──────► on_created(arena, id)
//!                       └─► existing key ─► on_replaced(arena, id) → reordered?
//!   BucketStore::remove_* ────────────────► on_removed(arena, id)   (still allocated)
//!   BucketStore::access ──────────────────► on_accessed(arena, id) → reordered?
//! ```

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Callbacks a store fires while it mutates its arena.
///
/// `on_removed` runs while the record is still allocated so the hook can
/// unlink it; the store frees the slot afterwards. The `bool` results report
/// whether the hook changed the order it maintains.
pub trait NodeLifecycle<T> {
    fn on_created(&mut self, arena: &mut SlotArena<T>, id: SlotId);
    fn on_replaced(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool;
    fn on_removed(&mut self, arena: &mut SlotArena<T>, id: SlotId);
    fn on_accessed(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool;
}

/// Hooks that ignore every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<T> NodeLifecycle<T> for NoHooks {
    fn on_created(&mut self, _arena: &mut SlotArena<T>, _id: SlotId) {}

    fn on_replaced(&mut self, _arena: &mut SlotArena<T>, _id: SlotId) -> bool {
        false
    }

    fn on_removed(&mut self, _arena: &mut SlotArena<T>, _id: SlotId) {}

    fn on_accessed(&mut self, _arena: &mut SlotArena<T>, _id: SlotId) -> bool {
        false
    }
}
