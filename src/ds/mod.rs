pub mod fence;
pub mod order_list;
pub mod slot_arena;

pub use fence::{ModCount, Stamp};
pub use order_list::{Linked, Links, OrderList};
pub use slot_arena::{SlotArena, SlotId};
