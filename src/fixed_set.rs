use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::RangeBounds;

use crate::compare::{Comparator, Natural};
use crate::error::InvariantViolation;
use crate::fixed_map::{Cursor, FixedMap, IntoKeys, Keys, Range as MapRange};
use crate::layout::{ColorCompactness, EmbeddedColor};
use crate::policy::{CheckingPolicy, Fatal};
use crate::storage::{FreeListStorage, StorageStrategy};

mod capacity;

/// An ordered set with a fixed capacity of `N` elements, backed by a red-black tree.
///
/// See [`FixedMap`]'s documentation for the storage model and the meaning of the type
/// parameters. A `FixedSet<T, N>` is a `FixedMap<T, (), N>` with a set-shaped API.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative
/// to any other item, as determined by the comparator, changes while it is in the set.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedSet;
///
/// let mut books: FixedSet<&str, 8> = FixedSet::new();
///
/// // Add some books.
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// // Check for a specific one.
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.",
///              books.len());
/// }
///
/// // Remove a book.
/// books.remove("The Odyssey");
///
/// // Iterate over everything.
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `FixedSet` with a known list of items can be initialized from an array:
///
/// ```
/// use fixed_rbtree::FixedSet;
///
/// let set: FixedSet<i32, 4> = FixedSet::from([1, 2, 3]);
/// assert_eq!(set.len(), 3);
/// ```
pub struct FixedSet<
    T,
    const N: usize,
    C = Natural,
    P = Fatal,
    L: ColorCompactness = EmbeddedColor,
    S: StorageStrategy = FreeListStorage,
> {
    map: FixedMap<T, (), N, C, P, L, S>,
}

/// An iterator over the items of a `FixedSet`.
///
/// This `struct` is created by the [`iter`] method on [`FixedSet`].
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedSet;
///
/// let set: FixedSet<i32, 4> = FixedSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// ```
///
/// [`iter`]: FixedSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: Keys<'a, T, (), N, C, L, S>,
}

/// An owning iterator over the items of a `FixedSet` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`FixedSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: IntoKeys<T, (), N, C, L, S>,
}

/// An iterator over a sub-range of items in a `FixedSet`.
///
/// This `struct` is created by the [`range`] method on [`FixedSet`].
///
/// [`range`]: FixedSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: MapRange<'a, T, (), N, C, L, S>,
}

impl<T, const N: usize, P, L: ColorCompactness> FixedSet<T, N, Natural, P, L, FreeListStorage> {
    /// Makes a new, empty `FixedSet`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// const EMPTY: FixedSet<u8, 8> = FixedSet::new();
    /// assert!(EMPTY.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        FixedSet { map: FixedMap::new() }
    }
}

impl<T, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> FixedSet<T, N, C, P, L, S> {
    /// Makes a new, empty `FixedSet` ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        FixedSet {
            map: FixedMap::with_comparator(comparator),
        }
    }

    /// Returns the comparator that orders the set.
    #[must_use]
    pub fn comparator(&self) -> &C {
        self.map.comparator()
    }

    /// Clears the set, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// The value may be any borrowed form of the set's element type, as long as the comparator
    /// orders the borrowed form.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let set: FixedSet<i32, 4> = FixedSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the element in the set, if any, that is equal to the value.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.get_key_value(value).map(|(k, ())| k)
    }

    /// Returns a cursor at the element equal to the value, or past-last if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let set: FixedSet<i32, 4> = FixedSet::from([1, 2, 3]);
    /// let mut cursor = set.find(&2);
    /// cursor.recede();
    /// assert_eq!(cursor.key(), Some(&1));
    /// assert!(set.find(&9).is_past_last());
    /// ```
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, (), N, C, L, S>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.find(value)
    }

    /// Returns a reference to the first element in the set, if any.
    /// This element is always the minimum of all elements in the set.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(k, ())| k)
    }

    /// Returns a reference to the last element in the set, if any.
    /// This element is always the maximum of all elements in the set.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(k, ())| k)
    }

    /// Removes the first element from the set and returns it, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let mut set: FixedSet<i32, 4> = FixedSet::new();
    ///
    /// set.insert(1);
    /// while let Some(n) = set.pop_first() {
    ///     assert_eq!(n, 1);
    /// }
    /// assert!(set.is_empty());
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(k, ())| k)
    }

    /// Removes the last element from the set and returns it, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(k, ())| k)
    }

    /// If the set contains an element equal to the value, removes it from the
    /// set and drops it. Returns whether such an element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let mut set: FixedSet<i32, 4> = FixedSet::new();
    ///
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the element in the set, if any, that is equal to the value.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.remove_entry(value).map(|(k, ())| k)
    }

    /// Removes the element equal to the value, returning the number of elements removed: 0 or 1.
    pub fn erase<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.map.erase(value)
    }

    /// Removes every element in `range` and returns the first element after it, if any.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let mut set: FixedSet<i32, 8> = (1..=6).collect();
    /// assert_eq!(set.erase_range(2..5), Some(&5));
    /// assert!(set.iter().copied().eq([1, 5, 6]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(k log n) for k removed elements.
    pub fn erase_range<Q, R>(&mut self, range: R) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        Cursor::from(self.map.erase_range(range)).key()
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(&e)` returns `false`.
    /// The elements are visited in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let mut set: FixedSet<i32, 8> = FixedSet::from([1, 2, 3, 4, 5, 6]);
    /// // Keep only the even numbers.
    /// set.retain(|&k| k % 2 == 0);
    /// assert!(set.iter().eq([2, 4, 6].iter()));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|k, ()| f(k));
    }

    /// Gets an iterator that visits the elements in the set in ascending order.
    pub fn iter(&self) -> Iter<'_, T, N, C, L, S> {
        Iter { inner: self.map.keys() }
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::Included;
    /// use fixed_rbtree::FixedSet;
    ///
    /// let set: FixedSet<i32, 4> = FixedSet::from([3, 5, 8]);
    /// for elem in set.range((Included(4), Included(8))) {
    ///     println!("{elem}");
    /// }
    /// assert_eq!(Some(&5), set.range(4..).next());
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T, N, C, L, S>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        Range {
            inner: self.map.range(range),
        }
    }

    /// Walks the whole tree and verifies the red-black and pool invariants.
    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Comparator<T>,
    {
        self.map.check_invariants()
    }
}

impl<T, const N: usize, C, P, L, S> FixedSet<T, N, C, P, L, S>
where
    C: Comparator<T>,
    P: CheckingPolicy,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// Builds a set from a list of values. Duplicates are ignored.
    ///
    /// Fails per the checking policy if the values hold more than `N` distinct elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::{Fallible, FixedSet, Natural};
    ///
    /// type Pair = FixedSet<char, 2, Natural, Fallible>;
    /// assert!(Pair::from_values("abba".chars()).is_ok());
    /// assert!(Pair::from_values("abc".chars()).is_err());
    /// ```
    #[track_caller]
    pub fn from_values<I>(values: I) -> P::Outcome<Self>
    where
        I: IntoIterator<Item = T>,
        C: Default,
    {
        let mut set = Self::with_comparator(C::default());
        for value in values {
            if let Err(error) = set.map.insert_if_absent(value, ()) {
                return P::capacity_exceeded(error);
            }
        }
        P::success(set)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equal value, `true` is returned.
    /// - If the set already contained an equal value, `false` is returned, and the entry is not
    ///   updated.
    ///
    /// Fails per the checking policy if the value is new and the set is full.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let mut set: FixedSet<i32, 4> = FixedSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[track_caller]
    pub fn insert(&mut self, value: T) -> P::Outcome<bool> {
        match self.map.insert_if_absent(value, ()) {
            Ok(inserted) => P::success(inserted),
            Err(error) => P::capacity_exceeded(error),
        }
    }
}

impl<T, const N: usize, C, P, L, S> Clone for FixedSet<T, N, C, P, L, S>
where
    L: ColorCompactness,
    S: StorageStrategy,
    FixedMap<T, (), N, C, P, L, S>: Clone,
{
    fn clone(&self) -> Self {
        FixedSet { map: self.map.clone() }
    }
}

impl<T: Hash, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Hash for FixedSet<T, N, C, P, L, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

/// Sets of any two capacities are equal when they hold equal elements.
impl<T, const N: usize, const M: usize, C, P, P2, L, L2, S, S2> PartialEq<FixedSet<T, M, C, P2, L2, S2>>
    for FixedSet<T, N, C, P, L, S>
where
    T: PartialEq,
    L: ColorCompactness,
    L2: ColorCompactness,
    S: StorageStrategy,
    S2: StorageStrategy,
{
    fn eq(&self, other: &FixedSet<T, M, C, P2, L2, S2>) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Eq for FixedSet<T, N, C, P, L, S> {}

impl<T: PartialOrd, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> PartialOrd
    for FixedSet<T, N, C, P, L, S>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Ord for FixedSet<T, N, C, P, L, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for FixedSet<T, N, C, P, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, const N: usize, C: Default, P, L: ColorCompactness, S: StorageStrategy> Default for FixedSet<T, N, C, P, L, S> {
    fn default() -> Self {
        FixedSet::with_comparator(C::default())
    }
}

impl<T, const N: usize, C, L, S> FromIterator<T> for FixedSet<T, N, C, Fatal, L, S>
where
    C: Comparator<T> + Default,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// # Panics
    ///
    /// Panics if the iterator yields more than `N` distinct elements.
    #[track_caller]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<T, const N: usize, C, L, S> Extend<T> for FixedSet<T, N, C, Fatal, L, S>
where
    C: Comparator<T>,
    L: ColorCompactness,
    S: StorageStrategy,
{
    #[track_caller]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'a, T: Copy, const N: usize, C, L, S> Extend<&'a T> for FixedSet<T, N, C, Fatal, L, S>
where
    C: Comparator<T>,
    L: ColorCompactness,
    S: StorageStrategy,
{
    #[track_caller]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &elem in iter {
            self.insert(elem);
        }
    }
}

impl<T, const N: usize, const M: usize, C, L, S> From<[T; M]> for FixedSet<T, N, C, Fatal, L, S>
where
    C: Comparator<T> + Default,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// # Panics
    ///
    /// Panics if the array holds more than `N` distinct elements.
    #[track_caller]
    fn from(arr: [T; M]) -> Self {
        Self::from_values(arr)
    }
}

impl<T, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> IntoIterator for FixedSet<T, N, C, P, L, S> {
    type Item = T;
    type IntoIter = IntoIter<T, N, C, L, S>;

    /// Gets an iterator for moving out the `FixedSet`'s contents in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let set: FixedSet<i32, 4> = FixedSet::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_keys(),
        }
    }
}

impl<'a, T, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> IntoIterator
    for &'a FixedSet<T, N, C, P, L, S>
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N, C, L, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Iter<'a, T, N, C, L, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for Iter<'_, T, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for Iter<'_, T, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Iter<'_, T, N, C, L, S> {}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Iter<'_, T, N, C, L, S> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for Iter<'_, T, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.inner.clone()).finish()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for IntoIter<T, N, C, L, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for IntoIter<T, N, C, L, S> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for IntoIter<T, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for IntoIter<T, N, C, L, S> {}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for IntoIter<T, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<'a, T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Range<'a, T, N, C, L, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(k, ())| k)
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator
    for Range<'a, T, N, C, L, S>
{
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|(k, ())| k)
    }
}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Range<'_, T, N, C, L, S> {}

impl<T, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Range<'_, T, N, C, L, S> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for Range<'_, T, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Reverse;
    use crate::error::Error;
    use crate::layout::PackedColor;
    use crate::policy::Fallible;

    #[test]
    fn fallible_insert_reports_full_set() {
        let mut set: FixedSet<u8, 2, Natural, Fallible, PackedColor> = FixedSet::default();
        assert!(set.insert(1).unwrap());
        assert!(!set.insert(1).unwrap());
        assert!(set.insert(2).unwrap());
        assert!(set.is_full());

        // A duplicate of a stored value is not a capacity failure.
        assert!(!set.insert(2).unwrap());
        assert!(matches!(set.insert(3), Err(Error::CapacityExceeded(_))));
        assert_eq!(set.len(), 2);
        set.check_invariants().unwrap();
    }

    #[test]
    fn erase_range_returns_following_element() {
        let mut set: FixedSet<i32, 16> = (0..10).collect();
        assert_eq!(set.erase_range(7..), None);
        assert_eq!(set.erase_range(..=2), Some(&3));
        assert!(set.iter().copied().eq([3, 4, 5, 6]));
        set.check_invariants().unwrap();
    }

    #[test]
    fn reverse_set_orders_descending() {
        let set: FixedSet<i32, 8, Reverse> = [4, 1, 3].into_iter().collect();
        assert_eq!(set.first(), Some(&4));
        assert_eq!(set.last(), Some(&1));
        assert!(set.range(3..=1).copied().eq([3, 1]));
    }

    #[test]
    fn take_and_get_return_stored_element() {
        let mut set: FixedSet<String, 4> = FixedSet::new();
        set.insert("kiwi".to_string());
        assert_eq!(set.get("kiwi").map(String::as_str), Some("kiwi"));
        assert_eq!(set.take("kiwi"), Some("kiwi".to_string()));
        assert_eq!(set.erase("kiwi"), 0);
        assert!(set.is_empty());
    }
}
