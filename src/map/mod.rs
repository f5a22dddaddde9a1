//! The two map families and their projections.

pub mod navigable;
pub mod ordered_hash_map;
pub mod view;

pub use navigable::{NavCursor, NavigableMap};
pub use ordered_hash_map::{Cursor, KeySet, OrderedHashMap};
pub use view::{NavigableView, ViewIter};
