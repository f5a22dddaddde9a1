pub mod buckets;
pub mod traits;
pub mod tree;

pub use buckets::{BucketStore, Entry, Placement};
pub use traits::{NoHooks, NodeLifecycle};
pub use tree::{Relation, TreeNode, TreeStore, Walk};
