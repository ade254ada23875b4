use core::fmt;

/// A shared view of one stored key/value pair.
///
/// A pair view borrows the container, so it cannot outlive the access that produced it and no
/// mutation can happen while it exists.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let mut map: FixedMap<&str, u32, 4> = FixedMap::new();
/// map.insert("a", 1);
///
/// let pair = map.cursor_front().pair().unwrap();
/// assert_eq!((pair.key(), pair.value()), (&"a", &1));
/// ```
pub struct PairView<'a, K, V> {
    key: &'a K,
    value: &'a V,
}

impl<'a, K, V> PairView<'a, K, V> {
    #[inline]
    pub(crate) fn new(key: &'a K, value: &'a V) -> Self {
        Self { key, value }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &'a V {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn into_tuple(self) -> (&'a K, &'a V) {
        (self.key, self.value)
    }
}

impl<K, V> Clone for PairView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for PairView<'_, K, V> {}

impl<K: PartialEq, V: PartialEq> PartialEq for PairView<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: Eq, V: Eq> Eq for PairView<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PairView<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PairView").field(self.key).field(self.value).finish()
    }
}

/// A view of one stored pair with a mutable value. The key is never mutable.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let mut map: FixedMap<&str, u32, 4> = FixedMap::new();
/// map.insert("a", 1);
///
/// let mut cursor = map.cursor_front_mut();
/// if let Some(mut pair) = cursor.pair_mut() {
///     *pair.value_mut() += 10;
/// }
/// assert_eq!(map.get("a"), Some(&11));
/// ```
pub struct PairViewMut<'a, K, V> {
    key: &'a K,
    value: &'a mut V,
}

impl<'a, K, V> PairViewMut<'a, K, V> {
    #[inline]
    pub(crate) fn new(key: &'a K, value: &'a mut V) -> Self {
        Self { key, value }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &*self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut *self.value
    }

    /// Converts the view into a mutable reference bound to the original borrow.
    #[inline]
    #[must_use]
    pub fn into_value_mut(self) -> &'a mut V {
        self.value
    }

    #[inline]
    #[must_use]
    pub fn into_tuple(self) -> (&'a K, &'a mut V) {
        (self.key, self.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PairViewMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PairViewMut").field(self.key).field(&*self.value).finish()
    }
}
