use super::FixedMap;
use crate::layout::ColorCompactness;
use crate::storage::StorageStrategy;

impl<K, V, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> FixedMap<K, V, N, C, P, L, S> {
    /// Returns the fixed capacity of the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let map: FixedMap<i32, i32, 32> = FixedMap::new();
    /// assert_eq!(map.max_size(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn max_size(&self) -> usize {
        N
    }

    /// Returns `true` if the map holds `N` entries, so that inserting a new key would fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedMap;
    ///
    /// let mut map: FixedMap<i32, i32, 1> = FixedMap::new();
    /// assert!(!map.is_full());
    /// map.insert(1, 1);
    /// assert!(map.is_full());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.raw.is_full()
    }

    /// Returns how many more entries the map can take.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.raw.free_len()
    }
}
