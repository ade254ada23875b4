use core::fmt;
use core::ptr;

use crate::compare::Comparator;
use crate::layout::{ColorCompactness, NodeIndex};
use crate::pair_view::{PairView, PairViewMut};
use crate::raw::RawFixedTree;
use crate::storage::StorageStrategy;

/// Moves one position forward. Past-last is absorbing.
fn step_forward<K, V, const N: usize, C, L, S>(tree: &RawFixedTree<K, V, N, C, L, S>, index: NodeIndex) -> NodeIndex
where
    L: ColorCompactness,
    S: StorageStrategy,
{
    let past_last = RawFixedTree::<K, V, N, C, L, S>::PAST_LAST;
    if index == past_last {
        return past_last;
    }

    let next = if index.is_null() { tree.min_index() } else { tree.successor_of(index) };
    if next.is_null() { past_last } else { next }
}

/// Moves one position backward. Before-first is absorbing.
fn step_backward<K, V, const N: usize, C, L, S>(tree: &RawFixedTree<K, V, N, C, L, S>, index: NodeIndex) -> NodeIndex
where
    L: ColorCompactness,
    S: StorageStrategy,
{
    if index.is_null() {
        NodeIndex::NULL
    } else if index == RawFixedTree::<K, V, N, C, L, S>::PAST_LAST {
        tree.max_index()
    } else {
        tree.predecessor_of(index)
    }
}

/// Returns the live node a cursor position names, `None` at either sentinel.
fn live<K, V, const N: usize, C, L, S>(index: NodeIndex) -> Option<NodeIndex>
where
    L: ColorCompactness,
    S: StorageStrategy,
{
    if index.is_null() || index == RawFixedTree::<K, V, N, C, L, S>::PAST_LAST { None } else { Some(index) }
}

/// A bidirectional read-only position in a [`FixedMap`](crate::FixedMap).
///
/// Besides the live entries a cursor can rest at two sentinels: *before-first*, reached by
/// receding from the first entry, and *past-last*, reached by advancing from the last entry.
/// Advancing from before-first moves to the first entry and receding from past-last moves to the
/// last entry, so every position is reachable from either end.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let map: FixedMap<u32, char, 4> = FixedMap::from([(1, 'a'), (2, 'b')]);
///
/// let mut cursor = map.cursor_front();
/// assert_eq!(cursor.key(), Some(&1));
/// cursor.advance();
/// cursor.advance();
/// assert!(cursor.is_past_last());
/// cursor.recede();
/// assert_eq!(cursor.value(), Some(&'b'));
/// ```
pub struct Cursor<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    tree: &'a RawFixedTree<K, V, N, C, L, S>,
    index: NodeIndex,
}

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Cursor<'a, K, V, N, C, L, S> {
    pub(crate) fn new(tree: &'a RawFixedTree<K, V, N, C, L, S>, index: NodeIndex) -> Self {
        Self { tree, index }
    }

    /// Moves to the next entry, or to past-last after the last entry.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub fn advance(&mut self) {
        self.index = step_forward(self.tree, self.index);
    }

    /// Moves to the previous entry, or to before-first before the first entry.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub fn recede(&mut self) {
        self.index = step_backward(self.tree, self.index);
    }

    #[must_use]
    pub fn is_past_last(&self) -> bool {
        self.index == RawFixedTree::<K, V, N, C, L, S>::PAST_LAST
    }

    #[must_use]
    pub fn is_before_first(&self) -> bool {
        self.index.is_null()
    }

    /// Returns the slot index of the current entry, `None` at a sentinel.
    ///
    /// The index of an entry never changes while the entry stays in the map.
    #[must_use]
    pub fn node_index(&self) -> Option<NodeIndex> {
        live::<K, V, N, C, L, S>(self.index)
    }

    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        let tree = self.tree;
        self.node_index().map(|index| tree.key(index))
    }

    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        let tree = self.tree;
        self.node_index().map(|index| tree.value(index))
    }

    /// Returns a view of the current entry, `None` at a sentinel.
    #[must_use]
    pub fn pair(&self) -> Option<PairView<'a, K, V>> {
        let tree = self.tree;
        self.node_index().map(|index| {
            let (key, value) = tree.key_value(index);
            PairView::new(key, value)
        })
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Cursor<'_, K, V, N, C, L, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Copy for Cursor<'_, K, V, N, C, L, S> {}

/// Cursors are equal when they point into the same map at the same position.
impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> PartialEq for Cursor<'_, K, V, N, C, L, S> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Eq for Cursor<'_, K, V, N, C, L, S> {}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Cursor<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.pair().map(PairView::into_tuple)).finish()
    }
}

/// A bidirectional position in a [`FixedMap`](crate::FixedMap) that can modify values and remove
/// entries.
///
/// A `CursorMut` converts into a [`Cursor`] through [`From`] or [`as_cursor`](Self::as_cursor);
/// there is no conversion back.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let mut map: FixedMap<u32, u32, 8> = (1..=5).map(|key| (key, key * 10)).collect();
///
/// let mut cursor = map.cursor_front_mut();
/// while let Some(&key) = cursor.key() {
///     if key % 2 == 0 {
///         cursor.remove_current();
///     } else {
///         *cursor.value_mut().unwrap() += 1;
///         cursor.advance();
///     }
/// }
/// assert!(map.iter().eq([(&1, &11), (&3, &31), (&5, &51)]));
/// ```
pub struct CursorMut<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    tree: &'a mut RawFixedTree<K, V, N, C, L, S>,
    index: NodeIndex,
}

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> CursorMut<'a, K, V, N, C, L, S> {
    pub(crate) fn new(tree: &'a mut RawFixedTree<K, V, N, C, L, S>, index: NodeIndex) -> Self {
        Self { tree, index }
    }

    /// Moves to the next entry, or to past-last after the last entry.
    pub fn advance(&mut self) {
        self.index = step_forward(self.tree, self.index);
    }

    /// Moves to the previous entry, or to before-first before the first entry.
    pub fn recede(&mut self) {
        self.index = step_backward(self.tree, self.index);
    }

    #[must_use]
    pub fn is_past_last(&self) -> bool {
        self.index == RawFixedTree::<K, V, N, C, L, S>::PAST_LAST
    }

    #[must_use]
    pub fn is_before_first(&self) -> bool {
        self.index.is_null()
    }

    /// Returns the slot index of the current entry, `None` at a sentinel.
    #[must_use]
    pub fn node_index(&self) -> Option<NodeIndex> {
        live::<K, V, N, C, L, S>(self.index)
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.node_index().map(|index| self.tree.key(index))
    }

    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.node_index().map(|index| self.tree.value(index))
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.node_index().map(|index| self.tree.value_mut(index))
    }

    #[must_use]
    pub fn pair(&self) -> Option<PairView<'_, K, V>> {
        self.as_cursor().pair()
    }

    /// Returns a view of the current entry with a mutable value, `None` at a sentinel.
    pub fn pair_mut(&mut self) -> Option<PairViewMut<'_, K, V>> {
        self.node_index().map(|index| {
            let (key, value) = self.tree.key_value_mut(index);
            PairViewMut::new(key, value)
        })
    }

    /// Converts the cursor into a view of the current entry that lives as long as the original
    /// borrow of the map.
    #[must_use]
    pub fn into_pair_mut(self) -> Option<PairViewMut<'a, K, V>> {
        let index = self.node_index()?;
        let tree = self.tree;
        let (key, value) = tree.key_value_mut(index);
        Some(PairViewMut::new(key, value))
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V, N, C, L, S> {
        Cursor::new(&*self.tree, self.index)
    }

    /// Removes the current entry and moves to the entry after it.
    ///
    /// The entry is located again by key before it is removed.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at a sentinel.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_current(&mut self) -> (K, V)
    where
        C: Comparator<K>,
    {
        let current = self.node_index().expect("`CursorMut::remove_current()` - cursor is at a sentinel!");
        let index = self.tree.search(self.tree.key(current));
        debug_assert_eq!(index, current, "`CursorMut::remove_current()` - cursor index is stale!");

        let (key, value, successor) = self.tree.take_and_return_successor(index);
        self.index = if successor.is_null() { RawFixedTree::<K, V, N, C, L, S>::PAST_LAST } else { successor };
        (key, value)
    }
}

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> From<CursorMut<'a, K, V, N, C, L, S>>
    for Cursor<'a, K, V, N, C, L, S>
{
    fn from(cursor: CursorMut<'a, K, V, N, C, L, S>) -> Self {
        Cursor::new(cursor.tree, cursor.index)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for CursorMut<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.pair().map(PairView::into_tuple)).finish()
    }
}
