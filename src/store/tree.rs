//! Balanced search tree store: ordered storage for the navigable map.
//!
//! An AVL tree whose nodes live in a [`SlotArena`] and point at their
//! children by [`SlotId`]. Nodes never move between slots: removing a node
//! with two children relinks its in-order successor into its place instead of
//! swapping payloads, so a handle stays attached to the same key for as long
//! as that key is stored.
//!
//! ## Architecture
//!
//! ```text
//!                    root
//!                     │
//!                  ┌──▼──┐
//!                  │  4  │ h=3
//!                  └┬───┬┘
//!            ┌──────┘   └──────┐
//!         ┌──▼──┐           ┌──▼──┐
//!         │  2  │ h=2       │  6  │ h=1
//!         └┬───┬┘           └─────┘
//!       ┌──▼┐ ┌▼──┐
//!       │ 1 │ │ 3 │ h=1
//!       └───┘ └───┘
//!
//!   Walk (forward, seeked to ≥ 2): stack = [4, 2]   top = next to yield
//! ```
//!
//! ## Ordering
//!
//! The store never orders keys on its own: every operation that compares
//! takes a [`KeyOrder`]. A comparison that yields no ordering aborts the
//! operation with [`MapError::Incomparable`] before any link is touched.
//!
//! ## Performance
//! - `find` / `insert` / `remove` / `seek`: O(log n)
//! - `Walk::advance`: amortized O(1), O(log n) worst case
//! - Path buffers for rebalancing are `Vec`s of at most tree height

use std::cmp::Ordering;
use std::mem;
use std::ops::Bound;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::MapError;
use crate::traits::KeyOrder;

#[derive(Debug, Clone)]
pub struct TreeNode<K, V> {
    pub key: K,
    pub value: V,
    left: Option<SlotId>,
    right: Option<SlotId>,
    height: u32,
}

impl<K, V> TreeNode<K, V> {
    pub fn left(&self) -> Option<SlotId> {
        self.left
    }

    pub fn right(&self) -> Option<SlotId> {
        self.right
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Nearest-match relation for [`TreeStore::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Greatest key strictly less than the probe.
    Lower,
    /// Greatest key less than or equal to the probe.
    Floor,
    /// Least key greater than or equal to the probe.
    Ceiling,
    /// Least key strictly greater than the probe.
    Higher,
}

impl Relation {
    /// The relation that answers the same question with the order reversed.
    pub fn mirrored(self) -> Self {
        match self {
            Relation::Lower => Relation::Higher,
            Relation::Floor => Relation::Ceiling,
            Relation::Ceiling => Relation::Floor,
            Relation::Higher => Relation::Lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[inline]
fn compare<K, C: KeyOrder<K>>(order: &C, a: &K, b: &K) -> Result<Ordering, MapError> {
    order.compare(a, b).ok_or(MapError::Incomparable)
}

#[derive(Debug, Clone)]
pub struct TreeStore<K, V> {
    nodes: SlotArena<TreeNode<K, V>>,
    root: Option<SlotId>,
}

impl<K, V> Default for TreeStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TreeStore<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<SlotId> {
        self.root
    }

    pub fn node(&self, id: SlotId) -> Option<&TreeNode<K, V>> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: SlotId) -> Option<&mut TreeNode<K, V>> {
        self.nodes.get_mut(id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Leftmost node.
    pub fn first(&self) -> Option<SlotId> {
        let mut current = self.root?;
        while let Some(left) = self.nodes[current].left {
            current = left;
        }
        Some(current)
    }

    /// Rightmost node.
    pub fn last(&self) -> Option<SlotId> {
        let mut current = self.root?;
        while let Some(right) = self.nodes[current].right {
            current = right;
        }
        Some(current)
    }

    /// Removes the leftmost node.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let mut path = Vec::new();
        let mut current = self.root?;
        while let Some(left) = self.nodes[current].left {
            path.push((current, Side::Left));
            current = left;
        }
        self.unlink_found(path, current)
    }

    /// Removes the rightmost node.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let mut path = Vec::new();
        let mut current = self.root?;
        while let Some(right) = self.nodes[current].right {
            path.push((current, Side::Right));
            current = right;
        }
        self.unlink_found(path, current)
    }

    #[inline]
    fn height_of(&self, id: Option<SlotId>) -> u32 {
        id.map_or(0, |id| self.nodes[id].height)
    }

    fn balance_of(&self, id: SlotId) -> i64 {
        let node = &self.nodes[id];
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    fn update_height(&mut self, id: SlotId) {
        let node = &self.nodes[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = height;
    }

    fn set_child(&mut self, parent: SlotId, side: Side, child: Option<SlotId>) {
        let node = &mut self.nodes[parent];
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    fn rotate_right(&mut self, id: SlotId) -> SlotId {
        let Some(pivot) = self.nodes[id].left else {
            return id;
        };
        self.nodes[id].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, id: SlotId) -> SlotId {
        let Some(pivot) = self.nodes[id].right else {
            return id;
        };
        self.nodes[id].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Restores the AVL condition at `id`; returns the subtree's new root.
    fn rebalance(&mut self, id: SlotId) -> SlotId {
        self.update_height(id);
        let balance = self.balance_of(id);
        if balance > 1 {
            if let Some(left) = self.nodes[id].left {
                if self.balance_of(left) < 0 {
                    let new_left = self.rotate_left(left);
                    self.nodes[id].left = Some(new_left);
                }
            }
            return self.rotate_right(id);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[id].right {
                if self.balance_of(right) > 0 {
                    let new_right = self.rotate_right(right);
                    self.nodes[id].right = Some(new_right);
                }
            }
            return self.rotate_left(id);
        }
        id
    }

    /// Rebalances bottom-up along `path`, re-pointing each parent at the
    /// rebalanced subtree. The child links below the last path entry must
    /// already be final.
    fn rebalance_path(&mut self, path: &[(SlotId, Side)]) {
        for depth in (0..path.len()).rev() {
            let (id, _) = path[depth];
            let subtree = self.rebalance(id);
            if depth == 0 {
                self.root = Some(subtree);
            } else {
                let (parent, side) = path[depth - 1];
                self.set_child(parent, side, Some(subtree));
            }
        }
    }

    /// Detaches `target`, whose parent chain is `path`, and frees its slot.
    fn unlink_found(&mut self, mut path: Vec<(SlotId, Side)>, target: SlotId) -> Option<(K, V)> {
        let (left, right) = {
            let node = &self.nodes[target];
            (node.left, node.right)
        };
        let parent_link = path.last().copied();
        let attach = |store: &mut Self, child: Option<SlotId>| match parent_link {
            Some((parent, side)) => store.set_child(parent, side, child),
            None => store.root = child,
        };

        match (left, right) {
            (Some(left), Some(right)) => {
                let target_depth = path.len();
                path.push((target, Side::Right));
                let mut successor = right;
                while let Some(next) = self.nodes[successor].left {
                    path.push((successor, Side::Left));
                    successor = next;
                }
                let successor_right = self.nodes[successor].right;
                if let Some(&(parent, side)) = path.last() {
                    self.set_child(parent, side, successor_right);
                }
                let (target_right, target_height) = {
                    let node = &self.nodes[target];
                    (node.right, node.height)
                };
                let node = &mut self.nodes[successor];
                node.left = Some(left);
                node.right = target_right;
                node.height = target_height;
                path[target_depth] = (successor, Side::Right);
                attach(self, Some(successor));
            },
            (only, None) | (None, only) => attach(self, only),
        }

        self.rebalance_path(&path);
        self.nodes.remove(target).map(|node| (node.key, node.value))
    }

    /// Checks ordering, heights and balance of the whole tree.
    pub fn validate<C: KeyOrder<K>>(&self, order: &C) -> Result<(), String> {
        let mut visited = 0usize;
        self.validate_subtree(self.root, order, &mut visited)?;
        if visited != self.nodes.len() {
            return Err(format!(
                "tree reaches {} nodes but arena holds {}",
                visited,
                self.nodes.len()
            ));
        }
        let mut previous: Option<&K> = None;
        let mut walk = Walk::first(self);
        while let Some(id) = walk.advance(self) {
            let key = &self.nodes[id].key;
            if let Some(previous) = previous {
                if order.compare(previous, key) != Some(Ordering::Less) {
                    return Err(format!(
                        "in-order keys are not strictly increasing at slot {}",
                        id.index()
                    ));
                }
            }
            previous = Some(key);
        }
        Ok(())
    }

    fn validate_subtree<C: KeyOrder<K>>(
        &self,
        id: Option<SlotId>,
        order: &C,
        visited: &mut usize,
    ) -> Result<u32, String> {
        let Some(id) = id else {
            return Ok(0);
        };
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| format!("tree links to vacant slot {}", id.index()))?;
        *visited += 1;
        if *visited > self.nodes.len() {
            return Err("tree links form a cycle".to_string());
        }
        let left = self.validate_subtree(node.left, order, visited)?;
        let right = self.validate_subtree(node.right, order, visited)?;
        let height = 1 + left.max(right);
        if node.height != height {
            return Err(format!(
                "slot {} records height {} but has {}",
                id.index(),
                node.height,
                height
            ));
        }
        if left.abs_diff(right) > 1 {
            return Err(format!("slot {} is out of balance", id.index()));
        }
        Ok(height)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<C: KeyOrder<K>>(&self, order: &C) {
        if let Err(msg) = self.validate(order) {
            panic!("{}", msg);
        }
    }
}

impl<K, V> TreeStore<K, V> {
    pub fn find<C: KeyOrder<K>>(&self, key: &K, order: &C) -> Result<Option<SlotId>, MapError> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match compare(order, key, &node.key)? {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Ok(Some(id)),
            };
        }
        Ok(None)
    }

    /// Inserts `key`, or swaps the value of the node already holding an equal
    /// key (the stored key is kept). Every comparison happens before the tree
    /// is touched.
    pub fn insert<C: KeyOrder<K>>(
        &mut self,
        key: K,
        value: V,
        order: &C,
    ) -> Result<Option<V>, MapError> {
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match compare(order, &key, &node.key)? {
                Ordering::Less => {
                    path.push((id, Side::Left));
                    node.left
                },
                Ordering::Greater => {
                    path.push((id, Side::Right));
                    node.right
                },
                Ordering::Equal => {
                    return Ok(Some(mem::replace(&mut self.nodes[id].value, value)));
                },
            };
        }

        let leaf = self.nodes.insert(TreeNode {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        });
        match path.last() {
            Some(&(parent, side)) => self.set_child(parent, side, Some(leaf)),
            None => self.root = Some(leaf),
        }
        self.rebalance_path(&path);
        Ok(None)
    }

    pub fn remove<C: KeyOrder<K>>(&mut self, key: &K, order: &C) -> Result<Option<(K, V)>, MapError> {
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match compare(order, key, &node.key)? {
                Ordering::Less => {
                    path.push((id, Side::Left));
                    node.left
                },
                Ordering::Greater => {
                    path.push((id, Side::Right));
                    node.right
                },
                Ordering::Equal => return Ok(self.unlink_found(path, id)),
            };
        }
        Ok(None)
    }

    /// Removes the node behind `id`, locating it by its own key.
    pub fn remove_node<C: KeyOrder<K>>(
        &mut self,
        id: SlotId,
        order: &C,
    ) -> Result<Option<(K, V)>, MapError> {
        if !self.nodes.contains(id) {
            return Ok(None);
        }
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(at) = current {
            if at == id {
                return Ok(self.unlink_found(path, id));
            }
            let node = &self.nodes[at];
            current = match compare(order, &self.nodes[id].key, &node.key)? {
                Ordering::Less => {
                    path.push((at, Side::Left));
                    node.left
                },
                Ordering::Greater => {
                    path.push((at, Side::Right));
                    node.right
                },
                Ordering::Equal => return Ok(None),
            };
        }
        Ok(None)
    }

    /// Nearest match for `probe` under `relation`.
    pub fn seek<C: KeyOrder<K>>(
        &self,
        probe: &K,
        relation: Relation,
        order: &C,
    ) -> Result<Option<SlotId>, MapError> {
        let mut best = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            let ord = compare(order, probe, &node.key)?;
            current = match (relation, ord) {
                (Relation::Floor | Relation::Ceiling, Ordering::Equal) => return Ok(Some(id)),
                (Relation::Lower | Relation::Floor, Ordering::Greater) => {
                    best = Some(id);
                    node.right
                },
                (Relation::Lower | Relation::Floor, _) => node.left,
                (Relation::Ceiling | Relation::Higher, Ordering::Less) => {
                    best = Some(id);
                    node.left
                },
                (Relation::Ceiling | Relation::Higher, _) => node.right,
            };
        }
        Ok(best)
    }
}

/// Detached in-order cursor over a [`TreeStore`].
///
/// Holds only handles, never borrows the store. The stack stays meaningful
/// only while the tree's shape is unchanged; after a structural change the
/// owner re-seeks.
#[derive(Debug, Clone)]
pub struct Walk {
    stack: Vec<SlotId>,
    forward: bool,
}

impl Walk {
    /// Positioned before the smallest key.
    pub fn first<K, V>(tree: &TreeStore<K, V>) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            forward: true,
        };
        walk.descend(tree, tree.root);
        walk
    }

    /// Positioned before the largest key, walking backwards.
    pub fn last<K, V>(tree: &TreeStore<K, V>) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            forward: false,
        };
        walk.descend(tree, tree.root);
        walk
    }

    /// Forward walk whose next key is the least key inside `lower`.
    pub fn seek_forward<K, V, C: KeyOrder<K>>(
        tree: &TreeStore<K, V>,
        lower: Bound<&K>,
        order: &C,
    ) -> Result<Self, MapError> {
        let mut stack = Vec::new();
        let mut current = tree.root;
        while let Some(id) = current {
            let node = &tree.nodes[id];
            let inside = match lower {
                Bound::Unbounded => true,
                Bound::Included(bound) => compare(order, &node.key, bound)? != Ordering::Less,
                Bound::Excluded(bound) => compare(order, &node.key, bound)? == Ordering::Greater,
            };
            current = if inside {
                stack.push(id);
                node.left
            } else {
                node.right
            };
        }
        Ok(Self {
            stack,
            forward: true,
        })
    }

    /// Backward walk whose next key is the greatest key inside `upper`.
    pub fn seek_backward<K, V, C: KeyOrder<K>>(
        tree: &TreeStore<K, V>,
        upper: Bound<&K>,
        order: &C,
    ) -> Result<Self, MapError> {
        let mut stack = Vec::new();
        let mut current = tree.root;
        while let Some(id) = current {
            let node = &tree.nodes[id];
            let inside = match upper {
                Bound::Unbounded => true,
                Bound::Included(bound) => compare(order, &node.key, bound)? != Ordering::Greater,
                Bound::Excluded(bound) => compare(order, &node.key, bound)? == Ordering::Less,
            };
            current = if inside {
                stack.push(id);
                node.right
            } else {
                node.left
            };
        }
        Ok(Self {
            stack,
            forward: false,
        })
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Node the next `advance` yields.
    pub fn peek(&self) -> Option<SlotId> {
        self.stack.last().copied()
    }

    pub fn advance<K, V>(&mut self, tree: &TreeStore<K, V>) -> Option<SlotId> {
        let id = self.stack.pop()?;
        let node = tree.nodes.get(id)?;
        let next = if self.forward { node.right } else { node.left };
        self.descend(tree, next);
        Some(id)
    }

    fn descend<K, V>(&mut self, tree: &TreeStore<K, V>, mut current: Option<SlotId>) {
        while let Some(id) = current {
            self.stack.push(id);
            let node = &tree.nodes[id];
            current = if self.forward { node.left } else { node.right };
        }
    }
}
