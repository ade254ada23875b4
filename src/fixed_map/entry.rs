use core::fmt;
use core::marker::PhantomData;
use core::mem;

use crate::layout::{ColorCompactness, NodeIndex};
use crate::policy::CheckingPolicy;
use crate::raw::{NodeIndexAndParentIndex, RawFixedTree};
use crate::storage::StorageStrategy;

/// A view into a single entry in a map, which may either be vacant or occupied.
///
/// This `enum` is constructed from the [`entry`] method on [`crate::FixedMap`].
///
/// Inserting through an entry fails per the map's checking policy when the map is full, so the
/// inserting methods return `P::Outcome<..>`: a plain reference under the default
/// [`Fatal`](crate::Fatal) policy, a `Result` under [`Fallible`](crate::Fallible).
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
/// use fixed_rbtree::fixed_map::Entry;
///
/// let mut map: FixedMap<&str, u32, 4> = FixedMap::new();
///
/// match map.entry("oz") {
///     Entry::Vacant(v) => {
///         v.insert(1);
///     }
///     Entry::Occupied(mut o) => {
///         *o.get_mut() += 1;
///     }
/// }
/// assert_eq!(map["oz"], 1);
/// ```
///
/// [`entry`]: crate::FixedMap::entry
pub enum Entry<'a, K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, N, C, P, L, S>),

    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, N, C, L, S>),
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for Entry<'_, K, V, N, C, P, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(v) => f.debug_tuple("Entry").field(v).finish(),
            Entry::Occupied(o) => f.debug_tuple("Entry").field(o).finish(),
        }
    }
}

/// A view into a vacant entry in a `FixedMap`.
/// It is part of the [`Entry`] enum.
///
/// The entry remembers where the key belongs in the tree, so inserting through it does not
/// search again.
pub struct VacantEntry<'a, K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> {
    key: K,
    position: NodeIndexAndParentIndex,
    tree: &'a mut RawFixedTree<K, V, N, C, L, S>,
    policy: PhantomData<P>,
}

impl<K: fmt::Debug, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for VacantEntry<'_, K, V, N, C, P, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacantEntry").field("key", &self.key).finish()
    }
}

/// A view into an occupied entry in a `FixedMap`.
/// It is part of the [`Entry`] enum.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
/// use fixed_rbtree::fixed_map::Entry;
///
/// let mut map: FixedMap<&str, u32, 4> = FixedMap::new();
/// map.insert("oz", 1);
///
/// if let Entry::Occupied(mut o) = map.entry("oz") {
///     *o.get_mut() += 1;
/// }
/// assert_eq!(map["oz"], 2);
/// ```
pub struct OccupiedEntry<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> {
    index: NodeIndex,
    tree: &'a mut RawFixedTree<K, V, N, C, L, S>,
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize, C, L: ColorCompactness, S: StorageStrategy> fmt::Debug
    for OccupiedEntry<'_, K, V, N, C, L, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry").field("key", self.key()).field("value", self.get()).finish()
    }
}

impl<'a, K, V, const N: usize, C, P, L, S> Entry<'a, K, V, N, C, P, L, S>
where
    P: CheckingPolicy,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// Ensures a value is in the entry by inserting the default if empty, and returns
    /// a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// assert_eq!(map["poneyland"], 12);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) if vacant (rebalancing), O(1) if occupied.
    #[track_caller]
    pub fn or_insert(self, default: V) -> P::Outcome<&'a mut V> {
        match self {
            Entry::Occupied(o) => P::success(o.into_mut()),
            Entry::Vacant(v) => v.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default function if empty,
    /// and returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, String, 4> = FixedMap::new();
    /// let s = "hoho".to_string();
    ///
    /// map.entry("poneyland").or_insert_with(|| s);
    ///
    /// assert_eq!(map["poneyland"], "hoho".to_string());
    /// ```
    #[track_caller]
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> P::Outcome<&'a mut V> {
        match self {
            Entry::Occupied(o) => P::success(o.into_mut()),
            Entry::Vacant(v) => v.insert(default()),
        }
    }

    /// Ensures a value is in the entry by inserting, if empty, the result of the default function.
    ///
    /// The function receives a reference to the key that was moved into the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    ///
    /// map.entry("poneyland").or_insert_with_key(|key| key.chars().count());
    ///
    /// assert_eq!(map["poneyland"], 9);
    /// ```
    #[track_caller]
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> P::Outcome<&'a mut V> {
        match self {
            Entry::Occupied(o) => P::success(o.into_mut()),
            Entry::Vacant(v) => {
                let value = default(&v.key);
                v.insert(value)
            }
        }
    }

    /// Returns a reference to this entry's key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    /// assert_eq!(map.entry("poneyland").key(), &"poneyland");
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(o) => o.key(),
            Entry::Vacant(v) => v.key(),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    ///
    /// map.entry("poneyland")
    ///    .and_modify(|e| { *e += 1 })
    ///    .or_insert(42);
    /// assert_eq!(map["poneyland"], 42);
    ///
    /// map.entry("poneyland")
    ///    .and_modify(|e| { *e += 1 })
    ///    .or_insert(42);
    /// assert_eq!(map["poneyland"], 43);
    /// ```
    #[allow(clippy::return_self_not_must_use)]
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(ref mut o) = self {
            f(o.get_mut());
        }
        self
    }

    /// Sets the value of the entry, and returns an `OccupiedEntry`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, String, 4> = FixedMap::new();
    /// let entry = map.entry("poneyland").insert_entry("hoho".to_string());
    ///
    /// assert_eq!(entry.key(), &"poneyland");
    /// ```
    #[track_caller]
    pub fn insert_entry(self, value: V) -> P::Outcome<OccupiedEntry<'a, K, V, N, C, L, S>> {
        match self {
            Entry::Occupied(mut o) => {
                o.insert(value);
                P::success(o)
            }
            Entry::Vacant(v) => v.insert_entry(value),
        }
    }
}

impl<'a, K, V: Default, const N: usize, C, P, L, S> Entry<'a, K, V, N, C, P, L, S>
where
    P: CheckingPolicy,
    L: ColorCompactness,
    S: StorageStrategy,
{
    /// Ensures a value is in the entry by inserting the default value if empty,
    /// and returns a mutable reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<&str, Option<usize>, 4> = FixedMap::new();
    /// map.entry("poneyland").or_default();
    ///
    /// assert_eq!(map["poneyland"], None);
    /// ```
    #[track_caller]
    pub fn or_default(self) -> P::Outcome<&'a mut V> {
        match self {
            Entry::Occupied(o) => P::success(o.into_mut()),
            Entry::Vacant(v) => v.insert(V::default()),
        }
    }
}

impl<'a, K, V, const N: usize, C, P, L, S> VacantEntry<'a, K, V, N, C, P, L, S>
where
    P: CheckingPolicy,
    L: ColorCompactness,
    S: StorageStrategy,
{
    pub(crate) fn new(key: K, position: NodeIndexAndParentIndex, tree: &'a mut RawFixedTree<K, V, N, C, L, S>) -> Self {
        VacantEntry {
            key,
            position,
            tree,
            policy: PhantomData,
        }
    }

    /// Gets a reference to the key that would be used when inserting a value
    /// through the `VacantEntry`.
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    /// use fixed_rbtree::fixed_map::Entry;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    ///
    /// if let Entry::Vacant(v) = map.entry("poneyland") {
    ///     assert_eq!(v.into_key(), "poneyland");
    /// }
    /// assert!(map.is_empty());
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn into_key(self) -> K {
        self.key
    }

    /// Sets the value of the entry with the `VacantEntry`'s key,
    /// and returns a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    /// use fixed_rbtree::fixed_map::Entry;
    ///
    /// let mut map: FixedMap<&str, u32, 4> = FixedMap::new();
    ///
    /// if let Entry::Vacant(o) = map.entry("poneyland") {
    ///     o.insert(37);
    /// }
    /// assert_eq!(map["poneyland"], 37);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) for rebalancing; the key is not searched again.
    #[track_caller]
    pub fn insert(self, value: V) -> P::Outcome<&'a mut V> {
        let VacantEntry { key, position, tree, .. } = self;
        match tree.insert_new(position, key, value) {
            Ok(index) => P::success(tree.value_mut(index)),
            Err(error) => P::capacity_exceeded(error),
        }
    }

    /// Sets the value of the entry with the `VacantEntry`'s key,
    /// and returns an `OccupiedEntry`.
    #[track_caller]
    pub fn insert_entry(self, value: V) -> P::Outcome<OccupiedEntry<'a, K, V, N, C, L, S>> {
        let VacantEntry { key, position, tree, .. } = self;
        match tree.insert_new(position, key, value) {
            Ok(index) => P::success(OccupiedEntry::new(index, tree)),
            Err(error) => P::capacity_exceeded(error),
        }
    }
}

impl<'a, K, V, const N: usize, C, L: ColorCompactness, S: StorageStrategy> OccupiedEntry<'a, K, V, N, C, L, S> {
    pub(crate) fn new(index: NodeIndex, tree: &'a mut RawFixedTree<K, V, N, C, L, S>) -> Self {
        OccupiedEntry { index, tree }
    }

    /// Gets a reference to the key stored in the map.
    #[must_use]
    pub fn key(&self) -> &K {
        self.tree.key(self.index)
    }

    /// Take ownership of the key and value from the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    /// use fixed_rbtree::fixed_map::Entry;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(o) = map.entry("poneyland") {
    ///     assert_eq!(o.remove_entry(), ("poneyland", 12));
    /// }
    /// assert!(!map.contains_key("poneyland"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[allow(clippy::must_use_candidate)]
    pub fn remove_entry(self) -> (K, V) {
        let (key, value, _) = self.tree.take_and_return_successor(self.index);
        (key, value)
    }

    /// Gets a reference to the value in the entry.
    #[must_use]
    pub fn get(&self) -> &V {
        self.tree.value(self.index)
    }

    /// Gets a mutable reference to the value in the entry.
    ///
    /// If you need a reference to the `OccupiedEntry` that may outlive the
    /// destruction of the `Entry` value, see [`into_mut`].
    ///
    /// [`into_mut`]: OccupiedEntry::into_mut
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    /// use fixed_rbtree::fixed_map::Entry;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(mut o) = map.entry("poneyland") {
    ///     *o.get_mut() += 10;
    ///     assert_eq!(*o.get(), 22);
    ///
    ///     // We can use the same Entry multiple times.
    ///     *o.get_mut() += 2;
    /// }
    /// assert_eq!(map["poneyland"], 24);
    /// ```
    pub fn get_mut(&mut self) -> &mut V {
        self.tree.value_mut(self.index)
    }

    /// Converts the entry into a mutable reference to its value.
    ///
    /// If you need multiple references to the `OccupiedEntry`, see [`get_mut`].
    ///
    /// [`get_mut`]: OccupiedEntry::get_mut
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_mut(self) -> &'a mut V {
        self.tree.value_mut(self.index)
    }

    /// Sets the value of the entry with the `OccupiedEntry`'s key,
    /// and returns the entry's old value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    /// use fixed_rbtree::fixed_map::Entry;
    ///
    /// let mut map: FixedMap<&str, usize, 4> = FixedMap::new();
    /// map.entry("poneyland").or_insert(12);
    ///
    /// if let Entry::Occupied(mut o) = map.entry("poneyland") {
    ///     assert_eq!(o.insert(15), 12);
    /// }
    /// assert_eq!(map["poneyland"], 15);
    /// ```
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Takes the value of the entry out of the map, and returns it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[allow(clippy::must_use_candidate)]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::compare::Natural;
    use crate::error::Error;
    use crate::fixed_map::{Entry, FixedMap};
    use crate::policy::Fallible;

    #[test]
    fn vacant_insert_uses_cached_position() {
        let mut map: FixedMap<i32, i32, 16> = (0..10).map(|x| (x * 2, x)).collect();
        let Entry::Vacant(vacant) = map.entry(7) else {
            panic!("7 is absent");
        };
        *vacant.insert(70) += 1;

        assert_eq!(map[&7], 71);
        assert!(map.keys().copied().eq([0, 2, 4, 6, 7, 8, 10, 12, 14, 16, 18]));
        map.check_invariants().unwrap();
    }

    #[test]
    fn vacant_insert_into_full_map_fails() {
        let mut map: FixedMap<i32, i32, 2, Natural, Fallible> = FixedMap::default();
        map.insert(1, 1).unwrap();
        map.insert(2, 2).unwrap();

        assert!(matches!(map.entry(3).or_insert(3), Err(Error::CapacityExceeded(_))));
        assert_eq!(*map.entry(2).or_insert(0).unwrap(), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn occupied_remove_keeps_tree_valid() {
        let mut map: FixedMap<i32, i32, 32> = (0..20).map(|x| (x, x)).collect();
        for key in (0..20).step_by(3) {
            let Entry::Occupied(occupied) = map.entry(key) else {
                panic!("{key} is present");
            };
            assert_eq!(occupied.remove(), key);
            map.check_invariants().unwrap();
        }
        assert_eq!(map.len(), 13);
    }
}
