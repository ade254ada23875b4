use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Bound, Index, RangeBounds};
use core::panic::Location;

use crate::compare::{Comparator, Natural};
use crate::error::{CapacityExceeded, InvariantViolation, KeyNotFound};
use crate::layout::{ColorCompactness, EmbeddedColor, NodeIndex};
use crate::policy::{CheckingPolicy, Fatal};
use crate::raw::RawFixedTree;
use crate::storage::{FixedPool, FreeListStorage, StorageStrategy};

mod capacity;
mod cursor;
mod entry;

pub use cursor::{Cursor, CursorMut};
pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<Q, C, R>(comparator: &C, range: &R)
where
    Q: ?Sized,
    C: Comparator<Q>,
    R: RangeBounds<Q>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let ordering = comparator.compare(start, end);
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                ordering == Ordering::Less
            } else {
                ordering != Ordering::Greater
            };
        assert!(valid, "range start is greater than range end in FixedMap");
    }
}

/// An ordered map with a fixed capacity of `N` entries, backed by a red-black tree.
///
/// All entries live inline in a fixed array of slots, so a `FixedMap` never allocates and is a
/// plain relocatable value: moving or cloning it copies the slots, and no pointers need fixing
/// up. Tree nodes refer to each other by slot index, and the slot of an entry never changes
/// while the entry is in the map.
///
/// Entries are kept in the order defined by the comparator `C`. The remaining type parameters
/// select how failures are reported (`P`, see [`CheckingPolicy`]), where the node color is
/// stored (`L`, see [`ColorCompactness`]) and which slot pool backs the tree (`S`, see
/// [`StorageStrategy`]). With the default [`Fatal`] policy, exceeding the capacity or calling
/// [`at`](Self::at) with a missing key panics.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key changes while it is in the map.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let mut movie_reviews: FixedMap<&str, &str, 8> = FixedMap::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.", movie_reviews.len());
/// }
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// assert_eq!(movie_reviews.erase("The Blues Brothers"), 1);
///
/// // look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews.at("Office Space"));
///
/// // iterate over everything.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A `FixedMap` with a known list of items can be initialized from an array:
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let solar_distance: FixedMap<&str, f32, 4> =
///     FixedMap::from([("Mercury", 0.4), ("Venus", 0.7), ("Earth", 1.0), ("Mars", 1.5)]);
/// assert!(solar_distance.is_full());
/// ```
///
/// Empty maps can be built in constant context:
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// const EMPTY: FixedMap<u8, u8, 16> = FixedMap::new();
/// assert!(EMPTY.is_empty());
/// ```
pub struct FixedMap<
    K,
    V,
    const N: usize,
    C = Natural,
    P = Fatal,
    L: ColorCompactness = EmbeddedColor,
    S: StorageStrategy = FreeListStorage,
> {
    raw: RawFixedTree<K, V, N, C, L, S>,
    policy: PhantomData<P>,
}

/// An iterator over the entries of a `FixedMap`.
///
/// This `struct` is created by the [`iter`] method on [`FixedMap`]. See its documentation for
/// more.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let map: FixedMap<i32, &str, 4> = FixedMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: FixedMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    tree: &'a RawFixedTree<K, V, N, C, L, S>,
    front: NodeIndex,
    back: NodeIndex,
    remaining: usize,
}

/// An owning iterator over the entries of a `FixedMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`FixedMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    tree: RawFixedTree<K, V, N, C, L, S>,
}

/// An iterator over the keys of a `FixedMap`.
///
/// This `struct` is created by the [`keys`] method on [`FixedMap`].
///
/// [`keys`]: FixedMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: Iter<'a, K, V, N, C, L, S>,
}

/// An iterator over the values of a `FixedMap`.
///
/// This `struct` is created by the [`values`] method on [`FixedMap`].
///
/// [`values`]: FixedMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: Iter<'a, K, V, N, C, L, S>,
}

/// An owning iterator over the keys of a `FixedMap`.
///
/// This `struct` is created by the [`into_keys`] method on [`FixedMap`].
///
/// [`into_keys`]: FixedMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: IntoIter<K, V, N, C, L, S>,
}

/// An owning iterator over the values of a `FixedMap`.
///
/// This `struct` is created by the [`into_values`] method on [`FixedMap`].
///
/// [`into_values`]: FixedMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    inner: IntoIter<K, V, N, C, L, S>,
}

/// An iterator over a sub-range of entries in a `FixedMap`.
///
/// This `struct` is created by the [`range`] method on [`FixedMap`].
///
/// [`range`]: FixedMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    tree: &'a RawFixedTree<K, V, N, C, L, S>,
    // Both ends are `NULL` once the range is exhausted.
    front: NodeIndex,
    back: NodeIndex,
}

impl<K, V, const N: usize, P, L: ColorCompactness> FixedMap<K, V, N, Natural, P, L, FreeListStorage> {
    /// Makes a new, empty `FixedMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn new() -> Self {
        FixedMap {
            raw: RawFixedTree::from_parts(FixedPool::new(), Natural),
            policy: PhantomData,
        }
    }
}

impl<K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> FixedMap<K, V, N, C, P, L, S> {
    /// Makes a new, empty `FixedMap` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::{FixedMap, Reverse};
    ///
    /// let mut map: FixedMap<i32, char, 4, Reverse> = FixedMap::with_comparator(Reverse);
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    /// assert_eq!(map.first_key_value(), Some((&2, &'b')));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        FixedMap {
            raw: RawFixedTree::from_parts(Default::default(), comparator),
            policy: PhantomData,
        }
    }

    /// Returns the comparator that orders the map.
    #[must_use]
    pub fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut a: FixedMap<i32, &str, 4> = FixedMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut a: FixedMap<i32, &str, 4> = FixedMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let index = self.raw.min_index();
        (!index.is_null()).then(|| self.raw.key_value(index))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let index = self.raw.max_index();
        (!index.is_null()).then(|| self.raw.key_value(index))
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::from([(1, "a"), (2, "b")]);
    /// while let Some((key, _)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let index = self.raw.min_index();
        if index.is_null() {
            return None;
        }

        let (key, value, _) = self.raw.take_and_return_successor(index);
        Some((key, value))
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let index = self.raw.max_index();
        if index.is_null() {
            return None;
        }

        let (key, value, _) = self.raw.take_and_return_successor(index);
        Some((key, value))
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all pairs `(k, v)` for which `f(&k, &mut v)` returns `false`.
    /// The elements are visited in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, i32, 8> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the elements with even-numbered keys.
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq([(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) in the worst case (when many elements are removed).
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.raw.min_index();
        while !current.is_null() {
            let (key, value) = self.raw.key_value_mut(current);
            current = if f(key, value) {
                self.raw.successor_of(current)
            } else {
                self.raw.delete_and_return_successor(current)
            };
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, char, 4> = FixedMap::new();
    /// map.insert(3, 'c');
    /// map.insert(2, 'b');
    /// map.insert(1, 'a');
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, 'a'));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; a full traversal is O(n).
    pub fn iter(&self) -> Iter<'_, K, V, N, C, L, S> {
        Iter {
            tree: &self.raw,
            front: self.raw.min_index(),
            back: self.raw.max_index(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut a: FixedMap<i32, &str, 4> = FixedMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, N, C, L, S> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut a: FixedMap<i32, &str, 4> = FixedMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().cloned().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V, N, C, L, S> {
        Values { inner: self.iter() }
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    /// The map cannot be used after calling this.
    pub fn into_keys(self) -> IntoKeys<K, V, N, C, L, S> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    /// The map cannot be used after calling this.
    pub fn into_values(self) -> IntoValues<K, V, N, C, L, S> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Returns a cursor at the first entry, or past-last if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<i32, i32, 4> = FixedMap::new();
    /// assert!(map.cursor_front().is_past_last());
    /// ```
    pub fn cursor_front(&self) -> Cursor<'_, K, V, N, C, L, S> {
        let mut cursor = self.cursor_before_first();
        cursor.advance();
        cursor
    }

    /// Returns a cursor at the last entry, or before-first if the map is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V, N, C, L, S> {
        let mut cursor = self.cursor_past_last();
        cursor.recede();
        cursor
    }

    /// Returns a cursor at the past-last sentinel.
    pub fn cursor_past_last(&self) -> Cursor<'_, K, V, N, C, L, S> {
        Cursor::new(&self.raw, RawFixedTree::<K, V, N, C, L, S>::PAST_LAST)
    }

    /// Returns a cursor at the before-first sentinel.
    pub fn cursor_before_first(&self) -> Cursor<'_, K, V, N, C, L, S> {
        Cursor::new(&self.raw, NodeIndex::NULL)
    }

    /// Returns a mutable cursor at the first entry, or past-last if the map is empty.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V, N, C, L, S> {
        let mut cursor = self.cursor_before_first_mut();
        cursor.advance();
        cursor
    }

    /// Returns a mutable cursor at the last entry, or before-first if the map is empty.
    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, K, V, N, C, L, S> {
        let mut cursor = self.cursor_past_last_mut();
        cursor.recede();
        cursor
    }

    /// Returns a mutable cursor at the past-last sentinel.
    pub fn cursor_past_last_mut(&mut self) -> CursorMut<'_, K, V, N, C, L, S> {
        CursorMut::new(&mut self.raw, RawFixedTree::<K, V, N, C, L, S>::PAST_LAST)
    }

    /// Returns a mutable cursor at the before-first sentinel.
    pub fn cursor_before_first_mut(&mut self) -> CursorMut<'_, K, V, N, C, L, S> {
        CursorMut::new(&mut self.raw, NodeIndex::NULL)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, as long as the comparator orders
    /// the borrowed form.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        (!index.is_null()).then(|| self.raw.value(index))
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        (!index.is_null()).then(|| self.raw.key_value(index))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        if index.is_null() { None } else { Some(self.raw.value_mut(index)) }
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        !self.raw.search(key).is_null()
    }

    /// Returns the number of entries with the given key: 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        usize::from(self.contains_key(key))
    }

    /// Returns a cursor at the entry for `key`, or past-last if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<i32, char, 4> = FixedMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let mut cursor = map.find(&2);
    /// cursor.advance();
    /// assert_eq!(cursor.key(), Some(&3));
    /// assert_eq!(map.find(&7), map.cursor_past_last());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V, N, C, L, S>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        let index = if index.is_null() { RawFixedTree::<K, V, N, C, L, S>::PAST_LAST } else { index };
        Cursor::new(&self.raw, index)
    }

    /// Returns a mutable cursor at the entry for `key`, or past-last if the key is absent.
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, N, C, L, S>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        let index = if index.is_null() { RawFixedTree::<K, V, N, C, L, S>::PAST_LAST } else { index };
        CursorMut::new(&mut self.raw, index)
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in
    /// the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key was previously
    /// in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        if index.is_null() {
            return None;
        }

        let (key, value, _) = self.raw.take_and_return_successor(index);
        Some((key, value))
    }

    /// Removes a key from the map, returning the number of entries removed: 0 or 1.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.delete_key(key)
    }

    /// Removes every entry whose key lies in `range` and returns a cursor at the first entry
    /// after the range (past-last if there is none).
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, i32, 16> = (0..10).map(|x| (x, x)).collect();
    /// let cursor = map.erase_range(3..7);
    /// assert_eq!(cursor.key(), Some(&7));
    /// assert!(map.keys().copied().eq([0, 1, 2, 7, 8, 9]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(k log n) for k removed entries.
    pub fn erase_range<Q, R>(&mut self, range: R) -> CursorMut<'_, K, V, N, C, L, S>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        validate_range_bounds(self.raw.comparator(), &range);

        #[cfg(feature = "tracing")]
        let before = self.raw.len();
        let successor = self.raw.delete_range_and_return_successor(&range);
        #[cfg(feature = "tracing")]
        tracing::trace!(removed = before - self.raw.len(), remaining = self.raw.len(), "erased key range");

        let index = if successor.is_null() { RawFixedTree::<K, V, N, C, L, S>::PAST_LAST } else { successor };
        CursorMut::new(&mut self.raw, index)
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the map.
    /// The simplest way is to use the range syntax `min..max`, thus `range(min..max)` will
    /// yield elements from min (inclusive) to max (exclusive).
    /// The range may also be entered as `(Bound<T>, Bound<T>)`, so for example
    /// `range((Excluded(4), Included(10)))` will yield a left-exclusive, right-inclusive
    /// range from 4 to 10.
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
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// map.insert(3, "a");
    /// map.insert(5, "b");
    /// map.insert(8, "c");
    /// for (&key, &value) in map.range((Included(&4), Included(&8))) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator.
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V, N, C, L, S>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        R: RangeBounds<Q>,
    {
        validate_range_bounds(self.raw.comparator(), &range);

        let front = self.raw.first_at_or_after(range.start_bound());
        let back = self.raw.last_at_or_before(range.end_bound());
        let empty = front.is_null()
            || back.is_null()
            || self.raw.comparator().compare(self.raw.key(front).borrow(), self.raw.key(back).borrow())
                == Ordering::Greater;

        if empty {
            Range {
                tree: &self.raw,
                front: NodeIndex::NULL,
                back: NodeIndex::NULL,
            }
        } else {
            Range {
                tree: &self.raw,
                front,
                back,
            }
        }
    }

    /// Walks the whole tree and verifies the red-black and pool invariants.
    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        C: Comparator<K>,
    {
        self.raw.check_invariants()
    }
}

impl<K, V, const N: usize, C, P, L, S> FixedMap<K, V, N, C, P, L, S>
where
    C: Comparator<K>,
    P: CheckingPolicy,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// Builds a map from a list of entries. Later duplicates of a key are ignored.
    ///
    /// Fails per the checking policy if the entries hold more than `N` distinct keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::{Fallible, FixedMap, Natural};
    ///
    /// type Small = FixedMap<u8, char, 2, Natural, Fallible>;
    /// assert!(Small::from_entries([(1, 'a'), (1, 'b'), (2, 'c')]).is_ok());
    /// assert!(Small::from_entries([(1, 'a'), (2, 'b'), (3, 'c')]).is_err());
    /// ```
    #[track_caller]
    pub fn from_entries<I>(entries: I) -> P::Outcome<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        C: Default,
    {
        let mut map = Self::with_comparator(C::default());
        for (key, value) in entries {
            if let Err(error) = map.insert_if_absent(key, value) {
                return P::capacity_exceeded(error);
            }
        }
        P::success(map)
    }

    /// Inserts the pair unless the key is present and reports whether it did.
    #[track_caller]
    pub(crate) fn insert_if_absent(&mut self, key: K, value: V) -> Result<bool, CapacityExceeded> {
        let np = self.raw.search_with_parent(&key);
        if !np.index.is_null() {
            return Ok(false);
        }
        self.raw.insert_new(np, key, value).map(|_| true)
    }

    /// Returns a reference to the value for `key`, or fails per the checking policy.
    ///
    /// The policy receives the missing key along with the map's length and the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<&str, u32, 4> = FixedMap::from([("a", 1)]);
    /// assert_eq!(*map.at("a"), 1);
    /// ```
    ///
    /// ```should_panic
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<&str, u32, 4> = FixedMap::from([("a", 1)]);
    /// map.at("b"); // panics: key not found among 1 entries
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[track_caller]
    pub fn at<Q>(&self, key: &Q) -> P::Outcome<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + fmt::Debug,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        if index.is_null() {
            return P::out_of_range(key, KeyNotFound {
                size: self.len(),
                location: Location::caller(),
            });
        }
        P::success(self.raw.value(index))
    }

    /// Returns a mutable reference to the value for `key`, or fails per the checking policy.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[track_caller]
    pub fn at_mut<Q>(&mut self, key: &Q) -> P::Outcome<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + fmt::Debug,
        C: Comparator<Q>,
    {
        let index = self.raw.search(key);
        if index.is_null() {
            return P::out_of_range(key, KeyNotFound {
                size: self.len(),
                location: Location::caller(),
            });
        }
        P::success(self.raw.value_mut(index))
    }

    /// Returns a mutable reference to the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut counts: FixedMap<char, u32, 8> = FixedMap::new();
    /// for c in "abracadabra".chars() {
    ///     *counts.get_or_insert_default(c) += 1;
    /// }
    /// assert_eq!(counts[&'a'], 5);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[track_caller]
    pub fn get_or_insert_default(&mut self, key: K) -> P::Outcome<&mut V>
    where
        V: Default,
    {
        match self.raw.index_or_insert_default(key) {
            Ok(index) => P::success(self.raw.value_mut(index)),
            Err(error) => P::capacity_exceeded(error),
        }
    }

    /// Inserts a key-value pair if the key is absent.
    ///
    /// Returns a cursor at the entry for `key` and whether the pair was inserted. An existing
    /// entry keeps its value; the given value is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// assert!(map.insert(37, "a").1);
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(cursor.value(), Some(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n), with a single descent of the tree.
    #[track_caller]
    pub fn insert(&mut self, key: K, value: V) -> P::Outcome<(CursorMut<'_, K, V, N, C, L, S>, bool)> {
        self.try_emplace(key, || value)
    }

    /// Inserts a key-value pair, overwriting the value if the key is present.
    ///
    /// Returns a cursor at the entry and whether a new entry was created.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, &str, 4> = FixedMap::new();
    /// map.insert(37, "a");
    /// let (_, inserted) = map.insert_or_assign(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(map[&37], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n), with a single descent of the tree.
    #[track_caller]
    pub fn insert_or_assign(&mut self, key: K, value: V) -> P::Outcome<(CursorMut<'_, K, V, N, C, L, S>, bool)> {
        let np = self.raw.search_with_parent(&key);
        if !np.index.is_null() {
            *self.raw.value_mut(np.index) = value;
            return P::success((CursorMut::new(&mut self.raw, np.index), false));
        }

        match self.raw.insert_new(np, key, value) {
            Ok(index) => P::success((CursorMut::new(&mut self.raw, index), true)),
            Err(error) => P::capacity_exceeded(error),
        }
    }

    /// Inserts `key` with the value built by `make` if the key is absent.
    ///
    /// `make` is not called when the key is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, String, 4> = FixedMap::new();
    /// map.try_emplace(1, || "one".to_string());
    /// map.try_emplace(1, || unreachable!());
    /// assert_eq!(map[&1], "one");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n), with a single descent of the tree.
    #[track_caller]
    pub fn try_emplace<F>(&mut self, key: K, make: F) -> P::Outcome<(CursorMut<'_, K, V, N, C, L, S>, bool)>
    where
        F: FnOnce() -> V,
    {
        let np = self.raw.search_with_parent(&key);
        if !np.index.is_null() {
            return P::success((CursorMut::new(&mut self.raw, np.index), false));
        }

        match self.raw.insert_new(np, key, make()) {
            Ok(index) => P::success((CursorMut::new(&mut self.raw, index), true)),
            Err(error) => P::capacity_exceeded(error),
        }
    }

    /// Inserts a `(key, value)` pair if the key is absent. Equivalent to [`insert`](Self::insert).
    #[track_caller]
    pub fn emplace(&mut self, (key, value): (K, V)) -> P::Outcome<(CursorMut<'_, K, V, N, C, L, S>, bool)> {
        self.try_emplace(key, || value)
    }

    /// Gets the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut count: FixedMap<&str, usize, 8> = FixedMap::new();
    ///
    /// // count the number of occurrences of letters in the vec
    /// for x in ["a", "b", "a", "c", "a", "b"] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count["a"], 3);
    /// assert_eq!(count["b"], 2);
    /// assert_eq!(count["c"], 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n); inserting through a vacant entry does not search again.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, N, C, P, L, S> {
        let np = self.raw.search_with_parent(&key);
        if np.index.is_null() {
            Entry::Vacant(VacantEntry::new(key, np, &mut self.raw))
        } else {
            Entry::Occupied(OccupiedEntry::new(np.index, &mut self.raw))
        }
    }
}

#[allow(private_bounds)]
impl<K, V, const N: usize, C, P, L, S> Clone for FixedMap<K, V, N, C, P, L, S>
where
    L: ColorCompactness,
    S: StorageStrategy,
    RawFixedTree<K, V, N, C, L, S>: Clone,
{
    fn clone(&self) -> Self {
        FixedMap {
            raw: self.raw.clone(),
            policy: PhantomData,
        }
    }
}

impl<K: Hash, V: Hash, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Hash
    for FixedMap<K, V, N, C, P, L, S>
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

/// Maps of any two capacities are equal when they hold equal entries in the same order.
impl<K, V, const N: usize, const M: usize, C, P, P2, L, L2, S, S2> PartialEq<FixedMap<K, V, M, C, P2, L2, S2>>
    for FixedMap<K, V, N, C, P, L, S>
where
    K: PartialEq,
    V: PartialEq,
    L: ColorCompactness,
    L2: ColorCompactness,
    S: StorageStrategy,
    S2: StorageStrategy,
{
    fn eq(&self, other: &FixedMap<K, V, M, C, P2, L2, S2>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Eq
    for FixedMap<K, V, N, C, P, L, S>
{
}

impl<K: PartialOrd, V: PartialOrd, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> PartialOrd
    for FixedMap<K, V, N, C, P, L, S>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> Ord
    for FixedMap<K, V, N, C, P, L, S>
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for FixedMap<K, V, N, C, P, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, const N: usize, C: Default, P, L: ColorCompactness, S: StorageStrategy> Default
    for FixedMap<K, V, N, C, P, L, S>
{
    fn default() -> Self {
        FixedMap::with_comparator(C::default())
    }
}

impl<K, V, const N: usize, C, L, S> FromIterator<(K, V)> for FixedMap<K, V, N, C, Fatal, L, S>
where
    C: Comparator<K> + Default,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// # Panics
    ///
    /// Panics if the iterator yields more than `N` distinct keys.
    #[track_caller]
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

impl<K, V, const N: usize, C, L, S> Extend<(K, V)> for FixedMap<K, V, N, C, Fatal, L, S>
where
    C: Comparator<K>,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// # Panics
    ///
    /// Panics if the map runs out of capacity.
    #[track_caller]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, const N: usize, C, L, S> Extend<(&'a K, &'a V)> for FixedMap<K, V, N, C, Fatal, L, S>
where
    C: Comparator<K>,
    L: ColorCompactness,
    S: StorageStrategy,
{
    #[track_caller]
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize, const M: usize, C, L, S> From<[(K, V); M]> for FixedMap<K, V, N, C, Fatal, L, S>
where
    C: Comparator<K> + Default,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// # Panics
    ///
    /// Panics if the array holds more than `N` distinct keys.
    #[track_caller]
    fn from(arr: [(K, V); M]) -> Self {
        Self::from_entries(arr)
    }
}

impl<'a, K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> IntoIterator
    for &'a FixedMap<K, V, N, C, P, L, S>
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, N, C, L, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> IntoIterator
    for FixedMap<K, V, N, C, P, L, S>
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, N, C, L, S>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<i32, &str, 4> = FixedMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self.raw }
    }
}

impl<K, Q, V, const N: usize, C, P, L, S> Index<&Q> for FixedMap<K, V, N, C, P, L, S>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Comparator<Q>,
    L: ColorCompactness,
    S: StorageStrategy,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

// ─── Iter ───────────────────────────────────────────────────────────────────

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Iter<'a, K, V, N, C, L, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.front;
        self.remaining -= 1;
        self.front = self.tree.successor_of(index);
        Some(self.tree.key_value(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for Iter<'_, K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.back;
        self.remaining -= 1;
        self.back = self.tree.predecessor_of(index);
        Some(self.tree.key_value(index))
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for Iter<'_, K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Iter<'_, K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Iter<'_, K, V, N, C, L, S> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Iter<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

// ─── IntoIter ───────────────────────────────────────────────────────────────

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for IntoIter<K, V, N, C, L, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.tree.min_index();
        if index.is_null() {
            return None;
        }

        let (key, value, _) = self.tree.take_and_return_successor(index);
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for IntoIter<K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.tree.max_index();
        if index.is_null() {
            return None;
        }

        let (key, value, _) = self.tree.take_and_return_successor(index);
        Some((key, value))
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for IntoIter<K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for IntoIter<K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for IntoIter<K, V, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.tree.len()).finish()
    }
}

// ─── Keys / Values ──────────────────────────────────────────────────────────

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Keys<'a, K, V, N, C, L, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for Keys<'_, K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for Keys<'_, K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Keys<'_, K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Keys<'_, K, V, N, C, L, S> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Keys<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Values<'a, K, V, N, C, L, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for Values<'_, K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for Values<'_, K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Values<'_, K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Values<'_, K, V, N, C, L, S> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Values<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

// ─── IntoKeys / IntoValues ──────────────────────────────────────────────────

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for IntoKeys<K, V, N, C, L, S> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for IntoKeys<K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for IntoKeys<K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for IntoKeys<K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for IntoKeys<K, V, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoKeys").field("len", &self.inner.len()).finish()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for IntoValues<K, V, N, C, L, S> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for IntoValues<K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> ExactSizeIterator for IntoValues<K, V, N, C, L, S> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for IntoValues<K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug for IntoValues<K, V, N, C, L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoValues").field("len", &self.inner.len()).finish()
    }
}

// ─── Range ──────────────────────────────────────────────────────────────────

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Iterator for Range<'a, K, V, N, C, L, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_null() {
            return None;
        }

        let index = self.front;
        if index == self.back {
            self.front = NodeIndex::NULL;
            self.back = NodeIndex::NULL;
        } else {
            self.front = self.tree.successor_of(index);
        }
        Some(self.tree.key_value(index))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> DoubleEndedIterator for Range<'_, K, V, N, C, L, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_null() {
            return None;
        }

        let index = self.back;
        if index == self.front {
            self.front = NodeIndex::NULL;
            self.back = NodeIndex::NULL;
        } else {
            self.back = self.tree.predecessor_of(index);
        }
        Some(self.tree.key_value(index))
    }
}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> FusedIterator for Range<'_, K, V, N, C, L, S> {}

impl<K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> Clone for Range<'_, K, V, N, C, L, S> {
    fn clone(&self) -> Self {
        Range {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Range<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::{FnComparator, Reverse};
    use crate::error::Error;
    use crate::layout::PackedColor;
    use crate::policy::Fallible;

    #[test]
    fn single_descent_insert_reports_existing_entry() {
        let mut map: FixedMap<i32, i32, 8> = FixedMap::new();
        let (cursor, inserted) = map.insert(5, 50);
        let first = cursor.node_index();
        assert!(inserted);

        let (cursor, inserted) = map.insert(5, 99);
        assert!(!inserted);
        assert_eq!(cursor.node_index(), first);
        assert_eq!(cursor.value(), Some(&50));
    }

    #[test]
    fn fallible_policy_reports_location() {
        let mut map: FixedMap<i32, i32, 1, Natural, Fallible, PackedColor> = FixedMap::default();
        map.insert(1, 1).unwrap();

        let line = line!() + 1;
        let Err(Error::CapacityExceeded(error)) = map.insert(2, 2) else {
            panic!("expected a capacity error");
        };
        assert_eq!(error.capacity, 1);
        assert_eq!(error.location.line(), line);
        assert_eq!(error.location.file(), file!());

        let Err(Error::KeyNotFound(error)) = map.at(&7) else {
            panic!("expected a missing key");
        };
        assert_eq!(error.size, 1);
    }

    #[test]
    fn try_emplace_does_not_build_existing_value() {
        let mut map: FixedMap<i32, i32, 4> = FixedMap::new();
        map.try_emplace(1, || 10);
        let mut built = false;
        map.try_emplace(1, || {
            built = true;
            20
        });
        assert!(!built);
        assert_eq!(map[&1], 10);
    }

    #[test]
    fn reverse_and_closure_comparators_order_iteration() {
        let mut reversed: FixedMap<i32, (), 8, Reverse> = FixedMap::default();
        for key in [3, 1, 2] {
            reversed.insert(key, ());
        }
        assert!(reversed.keys().copied().eq([3, 2, 1]));

        let by_abs = FnComparator(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        let mut map: FixedMap<i32, char, 8, _> = FixedMap::with_comparator(by_abs);
        map.insert(-3, 'a');
        map.insert(2, 'b');
        assert!(!map.insert(3, 'c').1);
        assert!(map.keys().copied().eq([2, -3]));
        map.check_invariants().unwrap();
    }

    #[test]
    fn heterogeneous_lookup_by_str() {
        let mut map: FixedMap<String, u32, 4> = FixedMap::new();
        map.insert("alpha".to_string(), 1);
        map.insert("beta".to_string(), 2);

        assert_eq!(map.get("beta"), Some(&2));
        assert_eq!(map.count("gamma"), 0);
        assert_eq!(map.erase("alpha"), 1);
        let range = map.range::<str, _>((Bound::Included("a"), Bound::Excluded("c")));
        assert!(range.map(|(k, _)| k.as_str()).eq(["beta"]));
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end in FixedMap")]
    fn inverted_range_panics() {
        let map: FixedMap<i32, i32, 4> = FixedMap::new();
        let _ = map.range(5..1);
    }

    #[test]
    fn range_between_keys_is_empty() {
        let map: FixedMap<i32, i32, 4> = FixedMap::from([(1, 1), (5, 5)]);
        assert_eq!(map.range(2..4).next(), None);
        assert_eq!(map.range(2..=5).next_back(), Some((&5, &5)));
    }

    #[test]
    fn owning_iterators_drain_from_both_ends() {
        let map: FixedMap<i32, char, 8> = FixedMap::from([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')]);
        let mut iter = map.clone().into_iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some((1, 'a')));
        assert_eq!(iter.next_back(), Some((4, 'd')));
        assert_eq!(iter.len(), 2);

        assert!(map.clone().into_keys().eq([1, 2, 3, 4]));
        assert!(map.into_values().rev().eq(['d', 'c', 'b', 'a']));
    }
}
