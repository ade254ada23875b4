use super::FixedSet;
use crate::layout::ColorCompactness;
use crate::storage::StorageStrategy;

impl<T, const N: usize, C, P, L: ColorCompactness, S: StorageStrategy> FixedSet<T, N, C, P, L, S> {
    /// Returns the fixed capacity of the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_rbtree::FixedSet;
    ///
    /// let set: FixedSet<i32, 32> = FixedSet::new();
    /// assert_eq!(set.max_size(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.map.max_size()
    }

    /// Returns `true` if the set holds `N` elements.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.map.is_full()
    }

    /// Returns how many more elements the set can take.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.map.remaining_capacity()
    }
}
