use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ops::{Bound, RangeBounds};

use super::node::Node;
use crate::compare::Comparator;
use crate::error::{CapacityExceeded, InvariantViolation};
use crate::layout::{Color, ColorCompactness, NodeIndex, NodeLinks};
use crate::storage::{IndexPool, StorageStrategy};

/// The pool type backing a tree with the given layout and storage strategies.
pub(crate) type PoolOf<K, V, const N: usize, L, S> =
    <S as StorageStrategy>::Pool<Node<K, V, <L as ColorCompactness>::Links>, N>;

/// The red-black tree engine backing `FixedMap` and `FixedSet`.
///
/// Nodes live in a fixed pool and link to each other by [`NodeIndex`]. Every algorithm is a loop;
/// rebalancing loops are bounded by the maximum height a red-black tree of `N` nodes can reach.
pub(crate) struct RawFixedTree<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    /// Pool holding every live node.
    pool: PoolOf<K, V, N, L, S>,
    /// Index of the root node, `NULL` if the tree is empty.
    root: NodeIndex,
    /// Number of live nodes.
    len: usize,
    comparator: C,
}

/// The result of a combined search: where a key is, or where it would be linked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeIndexAndParentIndex {
    /// The node holding the key, `NULL` if absent.
    pub(crate) index: NodeIndex,
    /// The last node visited; the parent of `index`, or its would-be parent.
    pub(crate) parent: NodeIndex,
    /// Whether `index` is (or would become) the left child of `parent`.
    pub(crate) is_left_child: bool,
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> RawFixedTree<K, V, N, C, L, S> {
    /// Upper bound on the height of a red-black tree holding `N` nodes (2 * log2(N + 1)).
    const MAX_HEIGHT: usize = 2 * (usize::BITS - N.leading_zeros()) as usize;

    /// The cursor position after the last node.
    pub(crate) const PAST_LAST: NodeIndex = NodeIndex::from_index(N);

    /// Creates an empty tree over an empty pool.
    pub(crate) const fn from_parts(pool: PoolOf<K, V, N, L, S>, comparator: C) -> Self {
        Self {
            pool,
            root: NodeIndex::NULL,
            len: 0,
            comparator,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns the number of nodes that can still be inserted.
    #[inline]
    pub(crate) fn free_len(&self) -> usize {
        self.pool.free_len()
    }

    #[inline]
    pub(crate) fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns `true` if `index` names a live node.
    #[inline]
    pub(crate) fn contains_index(&self, index: NodeIndex) -> bool {
        self.pool.contains(index)
    }

    #[inline]
    pub(crate) fn key(&self, index: NodeIndex) -> &K {
        self.pool.get(index).key()
    }

    #[inline]
    pub(crate) fn value(&self, index: NodeIndex) -> &V {
        self.pool.get(index).value()
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: NodeIndex) -> &mut V {
        self.pool.get_mut(index).value_mut()
    }

    #[inline]
    pub(crate) fn key_value(&self, index: NodeIndex) -> (&K, &V) {
        let node = self.pool.get(index);
        (node.key(), node.value())
    }

    #[inline]
    pub(crate) fn key_value_mut(&mut self, index: NodeIndex) -> (&K, &mut V) {
        self.pool.get_mut(index).key_value_mut()
    }

    /// Removes every node.
    pub(crate) fn clear(&mut self) {
        self.pool.clear();
        self.root = NodeIndex::NULL;
        self.len = 0;
    }

    // ─── Link accessors ─────────────────────────────────────────────────────

    #[inline]
    fn links(&self, index: NodeIndex) -> &L::Links {
        self.pool.get(index).links()
    }

    #[inline]
    fn links_mut(&mut self, index: NodeIndex) -> &mut L::Links {
        self.pool.get_mut(index).links_mut()
    }

    #[inline]
    fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.links(index).parent()
    }

    #[inline]
    fn left(&self, index: NodeIndex) -> NodeIndex {
        self.links(index).left()
    }

    #[inline]
    fn right(&self, index: NodeIndex) -> NodeIndex {
        self.links(index).right()
    }

    /// `NULL` children count as black.
    #[inline]
    fn is_red(&self, index: NodeIndex) -> bool {
        !index.is_null() && self.links(index).color() == Color::Red
    }

    #[inline]
    fn color(&self, index: NodeIndex) -> Color {
        if self.is_red(index) { Color::Red } else { Color::Black }
    }

    #[inline]
    fn set_parent(&mut self, index: NodeIndex, parent: NodeIndex) {
        self.links_mut(index).set_parent(parent);
    }

    #[inline]
    fn set_left(&mut self, index: NodeIndex, left: NodeIndex) {
        self.links_mut(index).set_left(left);
    }

    #[inline]
    fn set_right(&mut self, index: NodeIndex, right: NodeIndex) {
        self.links_mut(index).set_right(right);
    }

    #[inline]
    fn set_color(&mut self, index: NodeIndex, color: Color) {
        self.links_mut(index).set_color(color);
    }

    // ─── Traversal ──────────────────────────────────────────────────────────

    /// Returns the smallest node, `NULL` if the tree is empty.
    pub(crate) fn min_index(&self) -> NodeIndex {
        if self.root.is_null() { NodeIndex::NULL } else { self.min_below(self.root) }
    }

    /// Returns the largest node, `NULL` if the tree is empty.
    pub(crate) fn max_index(&self) -> NodeIndex {
        if self.root.is_null() { NodeIndex::NULL } else { self.max_below(self.root) }
    }

    fn min_below(&self, mut index: NodeIndex) -> NodeIndex {
        loop {
            let left = self.left(index);
            if left.is_null() {
                return index;
            }
            index = left;
        }
    }

    fn max_below(&self, mut index: NodeIndex) -> NodeIndex {
        loop {
            let right = self.right(index);
            if right.is_null() {
                return index;
            }
            index = right;
        }
    }

    /// Returns the in-order successor of a live node, `NULL` if it is the largest.
    pub(crate) fn successor_of(&self, index: NodeIndex) -> NodeIndex {
        let right = self.right(index);
        if !right.is_null() {
            return self.min_below(right);
        }

        let mut child = index;
        let mut parent = self.parent(index);
        while !parent.is_null() && child == self.right(parent) {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }

    /// Returns the in-order predecessor of a live node, `NULL` if it is the smallest.
    pub(crate) fn predecessor_of(&self, index: NodeIndex) -> NodeIndex {
        let left = self.left(index);
        if !left.is_null() {
            return self.max_below(left);
        }

        let mut child = index;
        let mut parent = self.parent(index);
        while !parent.is_null() && child == self.left(parent) {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }

    // ─── Rotations ──────────────────────────────────────────────────────────

    /// Points `parent`'s link to `old_child` (or the root) at `new_child` instead.
    fn replace_child(&mut self, parent: NodeIndex, old_child: NodeIndex, new_child: NodeIndex) {
        if parent.is_null() {
            self.root = new_child;
        } else if self.left(parent) == old_child {
            self.set_left(parent, new_child);
        } else {
            self.set_right(parent, new_child);
        }
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new` (which may be `NULL`).
    fn transplant(&mut self, old: NodeIndex, new: NodeIndex) {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);
        if !new.is_null() {
            self.set_parent(new, parent);
        }
    }

    fn rotate_left(&mut self, index: NodeIndex) {
        let pivot = self.right(index);
        let inner = self.left(pivot);

        self.set_right(index, inner);
        if !inner.is_null() {
            self.set_parent(inner, index);
        }

        let parent = self.parent(index);
        self.set_parent(pivot, parent);
        self.replace_child(parent, index, pivot);

        self.set_left(pivot, index);
        self.set_parent(index, pivot);
    }

    fn rotate_right(&mut self, index: NodeIndex) {
        let pivot = self.left(index);
        let inner = self.right(pivot);

        self.set_left(index, inner);
        if !inner.is_null() {
            self.set_parent(inner, index);
        }

        let parent = self.parent(index);
        self.set_parent(pivot, parent);
        self.replace_child(parent, index, pivot);

        self.set_right(pivot, index);
        self.set_parent(index, pivot);
    }

    // ─── Insertion ──────────────────────────────────────────────────────────

    /// Links a new node where `np` says the key belongs and rebalances.
    ///
    /// `np` must come from `search_with_parent` with no mutation in between, and must report the
    /// key as absent.
    #[track_caller]
    pub(crate) fn insert_new(
        &mut self,
        np: NodeIndexAndParentIndex,
        key: K,
        value: V,
    ) -> Result<NodeIndex, CapacityExceeded> {
        debug_assert!(np.index.is_null(), "`RawFixedTree::insert_new()` - key is already present!");
        let index = self.pool.allocate(Node::new(key, value, np.parent))?;

        if np.parent.is_null() {
            debug_assert!(self.root.is_null(), "`RawFixedTree::insert_new()` - stale parent!");
            self.root = index;
        } else if np.is_left_child {
            debug_assert!(self.left(np.parent).is_null(), "`RawFixedTree::insert_new()` - stale parent!");
            self.set_left(np.parent, index);
        } else {
            debug_assert!(self.right(np.parent).is_null(), "`RawFixedTree::insert_new()` - stale parent!");
            self.set_right(np.parent, index);
        }
        self.len += 1;

        self.fix_after_insert(index);
        Ok(index)
    }

    fn fix_after_insert(&mut self, mut node: NodeIndex) {
        // Each pass either finishes or moves `node` up two levels.
        for _ in 0..=Self::MAX_HEIGHT {
            let parent = self.parent(node);
            if !self.is_red(parent) {
                break;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.parent(parent);
            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                    continue;
                }

                if node == self.right(parent) {
                    node = parent;
                    self.rotate_left(node);
                }
                let parent = self.parent(node);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_right(grandparent);
            } else {
                let uncle = self.left(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                    continue;
                }

                if node == self.left(parent) {
                    node = parent;
                    self.rotate_right(node);
                }
                let parent = self.parent(node);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate_left(grandparent);
            }
            break;
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    // ─── Deletion ───────────────────────────────────────────────────────────

    /// Unlinks a live node and rebalances. The node's slot is left for the caller to release.
    ///
    /// Nodes are relinked rather than having their payloads swapped, so no surviving node changes
    /// slot.
    fn unlink(&mut self, node: NodeIndex) {
        let left = self.left(node);
        let right = self.right(node);
        let mut removed_color = self.color(node);
        let child;
        let child_parent;

        if left.is_null() {
            child = right;
            child_parent = self.parent(node);
            self.transplant(node, right);
        } else if right.is_null() {
            child = left;
            child_parent = self.parent(node);
            self.transplant(node, left);
        } else {
            // Two children: the in-order successor takes the node's place.
            let heir = self.min_below(right);
            removed_color = self.color(heir);
            child = self.right(heir);

            if self.parent(heir) == node {
                child_parent = heir;
            } else {
                child_parent = self.parent(heir);
                self.transplant(heir, child);
                self.set_right(heir, right);
                self.set_parent(right, heir);
            }

            self.transplant(node, heir);
            self.set_left(heir, left);
            self.set_parent(left, heir);
            let color = self.color(node);
            self.set_color(heir, color);
        }

        if removed_color == Color::Black {
            self.fix_after_delete(child, child_parent);
        }
    }

    /// Restores black height after a black node was removed above `node` (possibly `NULL`).
    fn fix_after_delete(&mut self, mut node: NodeIndex, mut parent: NodeIndex) {
        // Each pass either finishes or moves `node` up one level.
        for _ in 0..=Self::MAX_HEIGHT {
            if node == self.root || self.is_red(node) {
                break;
            }

            if node == self.left(parent) {
                let mut sibling = self.right(parent);
                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(parent);
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = parent;
                    parent = self.parent(node);
                    continue;
                }

                if !self.is_red(self.right(sibling)) {
                    let near = self.left(sibling);
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_right(sibling);
                    sibling = self.right(parent);
                }

                let color = self.color(parent);
                self.set_color(sibling, color);
                self.set_color(parent, Color::Black);
                let far = self.right(sibling);
                self.set_color(far, Color::Black);
                self.rotate_left(parent);
            } else {
                let mut sibling = self.left(parent);
                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(parent);
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = parent;
                    parent = self.parent(node);
                    continue;
                }

                if !self.is_red(self.left(sibling)) {
                    let near = self.right(sibling);
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_left(sibling);
                    sibling = self.left(parent);
                }

                let color = self.color(parent);
                self.set_color(sibling, color);
                self.set_color(parent, Color::Black);
                let far = self.left(sibling);
                self.set_color(far, Color::Black);
                self.rotate_right(parent);
            }

            node = self.root;
            break;
        }

        if !node.is_null() {
            self.set_color(node, Color::Black);
        }
    }

    /// Removes a live node and returns its payload along with its in-order successor.
    pub(crate) fn take_and_return_successor(&mut self, index: NodeIndex) -> (K, V, NodeIndex) {
        assert!(
            self.contains_index(index),
            "`RawFixedTree::take_and_return_successor()` - `index` is not live!"
        );
        let successor = self.successor_of(index);
        self.unlink(index);
        self.len -= 1;
        let (key, value) = self.pool.release(index).into_key_value();
        (key, value, successor)
    }

    /// Removes a live node and returns its in-order successor (`NULL` if none).
    pub(crate) fn delete_and_return_successor(&mut self, index: NodeIndex) -> NodeIndex {
        let (_, _, successor) = self.take_and_return_successor(index);
        successor
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> RawFixedTree<K, V, N, C, L, S> {
    /// Finds the node holding `key`, `NULL` if absent.
    pub(crate) fn search<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut current = self.root;
        while !current.is_null() {
            match self.comparator.compare(key, self.key(current).borrow()) {
                Ordering::Less => current = self.left(current),
                Ordering::Greater => current = self.right(current),
                Ordering::Equal => return current,
            }
        }
        NodeIndex::NULL
    }

    /// Finds the node holding `key`, along with its parent or would-be parent.
    pub(crate) fn search_with_parent<Q>(&self, key: &Q) -> NodeIndexAndParentIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut parent = NodeIndex::NULL;
        let mut is_left_child = false;
        let mut current = self.root;
        while !current.is_null() {
            match self.comparator.compare(key, self.key(current).borrow()) {
                Ordering::Less => {
                    parent = current;
                    is_left_child = true;
                    current = self.left(current);
                }
                Ordering::Greater => {
                    parent = current;
                    is_left_child = false;
                    current = self.right(current);
                }
                Ordering::Equal => break,
            }
        }

        NodeIndexAndParentIndex {
            index: current,
            parent,
            is_left_child,
        }
    }

    /// Returns the first node whose key satisfies a range start bound.
    pub(crate) fn first_at_or_after<Q>(&self, bound: Bound<&Q>) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (key, inclusive) = match bound {
            Bound::Unbounded => return self.min_index(),
            Bound::Included(key) => (key, true),
            Bound::Excluded(key) => (key, false),
        };

        let mut best = NodeIndex::NULL;
        let mut current = self.root;
        while !current.is_null() {
            let ordering = self.comparator.compare(self.key(current).borrow(), key);
            if ordering == Ordering::Greater || (inclusive && ordering == Ordering::Equal) {
                best = current;
                current = self.left(current);
            } else {
                current = self.right(current);
            }
        }
        best
    }

    /// Returns the last node whose key satisfies a range end bound.
    pub(crate) fn last_at_or_before<Q>(&self, bound: Bound<&Q>) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (key, inclusive) = match bound {
            Bound::Unbounded => return self.max_index(),
            Bound::Included(key) => (key, true),
            Bound::Excluded(key) => (key, false),
        };

        let mut best = NodeIndex::NULL;
        let mut current = self.root;
        while !current.is_null() {
            let ordering = self.comparator.compare(self.key(current).borrow(), key);
            if ordering == Ordering::Less || (inclusive && ordering == Ordering::Equal) {
                best = current;
                current = self.right(current);
            } else {
                current = self.left(current);
            }
        }
        best
    }

    /// Returns `true` if a live node's key satisfies a range end bound.
    pub(crate) fn is_before_end<Q>(&self, index: NodeIndex, bound: Bound<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        match bound {
            Bound::Unbounded => true,
            Bound::Included(key) => self.comparator.compare(self.key(index).borrow(), key) != Ordering::Greater,
            Bound::Excluded(key) => self.comparator.compare(self.key(index).borrow(), key) == Ordering::Less,
        }
    }

    /// Removes the node holding `key`, returning the number of nodes removed (0 or 1).
    pub(crate) fn delete_key<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.search(key);
        if index.is_null() {
            return 0;
        }
        self.delete_and_return_successor(index);
        1
    }

    /// Removes every node whose key lies in `range` and returns the first node after it.
    ///
    /// Rotations triggered by one deletion can change the links and colors of the nodes that
    /// remain, so each step resolves the lower bound again by key instead of reusing a cached
    /// index.
    pub(crate) fn delete_range_and_return_successor<Q, R>(&mut self, range: &R) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        loop {
            let lower = self.first_at_or_after(range.start_bound());
            if lower.is_null() || !self.is_before_end(lower, range.end_bound()) {
                return lower;
            }
            self.delete_and_return_successor(lower);
        }
    }

    /// Finds `key`, inserting it with a default value if absent.
    #[track_caller]
    pub(crate) fn index_or_insert_default(&mut self, key: K) -> Result<NodeIndex, CapacityExceeded>
    where
        V: Default,
        C: Comparator<K>,
    {
        let np = self.search_with_parent(&key);
        if !np.index.is_null() {
            return Ok(np.index);
        }
        self.insert_new(np, key, V::default())
    }

    /// Walks the whole tree and verifies every structural invariant.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Comparator<K>,
    {
        if !self.pool.is_consistent() {
            return Err(InvariantViolation::PoolCorrupted);
        }
        if self.pool.len() != self.len {
            return Err(InvariantViolation::LengthMismatch {
                live: self.pool.len(),
                len: self.len,
            });
        }
        if self.root.is_null() {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::LengthMismatch { live: 0, len: self.len })
            };
        }
        if !self.parent(self.root).is_null() {
            return Err(InvariantViolation::BrokenLink);
        }
        if self.is_red(self.root) {
            return Err(InvariantViolation::RedRoot);
        }

        let mut black_height = None;
        let mut visited = 0;
        let mut previous = NodeIndex::NULL;
        let mut current = self.min_index();
        while !current.is_null() {
            visited += 1;
            if visited > self.len {
                return Err(InvariantViolation::BrokenLink);
            }

            let left = self.left(current);
            let right = self.right(current);
            for child in [left, right] {
                if !child.is_null() && self.parent(child) != current {
                    return Err(InvariantViolation::BrokenLink);
                }
            }

            if self.is_red(current) && (self.is_red(left) || self.is_red(right)) {
                return Err(InvariantViolation::RedChildOfRed);
            }

            if !previous.is_null() && self.comparator.compare(self.key(previous), self.key(current)) != Ordering::Less {
                return Err(InvariantViolation::OutOfOrder);
            }

            // Every path that ends in a `NULL` child ends at a node with a missing child.
            if left.is_null() || right.is_null() {
                let mut blacks = 0;
                let mut steps = 0;
                let mut up = current;
                while !up.is_null() {
                    steps += 1;
                    if steps > self.len {
                        return Err(InvariantViolation::BrokenLink);
                    }
                    if !self.is_red(up) {
                        blacks += 1;
                    }
                    up = self.parent(up);
                }

                match black_height {
                    None => black_height = Some(blacks),
                    Some(height) if height != blacks => return Err(InvariantViolation::UnequalBlackHeight),
                    Some(_) => {}
                }
            }

            previous = current;
            current = self.successor_of(current);
        }

        if visited == self.len {
            Ok(())
        } else {
            Err(InvariantViolation::LengthMismatch {
                live: visited,
                len: self.len,
            })
        }
    }
}

impl<K, V, const N: usize, C, L, S> Clone for RawFixedTree<K, V, N, C, L, S>
where
    C: Clone,
    L: ColorCompactness,
    S: StorageStrategy,
    PoolOf<K, V, N, L, S>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            root: self.root,
            len: self.len,
            comparator: self.comparator.clone(),
        }
    }
}
