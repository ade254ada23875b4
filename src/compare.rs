use core::cmp::Ordering;

/// A strict weak ordering over `Q`.
///
/// Lookups accept any borrowed form `Q` of the key type `K` (with `K: Borrow<Q>`) as long as the
/// comparator implements `Comparator<Q>`, so a comparator that covers several borrowed forms makes
/// heterogeneous lookups available. The ordering over a borrowed form *must* agree with the
/// ordering over the key type.
pub trait Comparator<Q: ?Sized> {
    fn compare(&self, lhs: &Q, rhs: &Q) -> Ordering;
}

/// Orders by [`Ord`]. This is the default comparator.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::FixedMap;
///
/// let mut map: FixedMap<String, u32, 4> = FixedMap::new();
/// map.insert(String::from("b"), 2);
/// // `Natural` compares any `Ord` type, so `&str` lookups work on `String` keys.
/// assert_eq!(map.get("b"), Some(&2));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<Q: ?Sized + Ord> Comparator<Q> for Natural {
    #[inline]
    fn compare(&self, lhs: &Q, rhs: &Q) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Orders by the reverse of [`Ord`].
///
/// # Examples
///
/// ```
/// use fixed_rbtree::{FixedSet, Reverse};
///
/// let mut set: FixedSet<i32, 4, Reverse> = FixedSet::with_comparator(Reverse);
/// set.insert(1);
/// set.insert(3);
/// set.insert(2);
/// assert!(set.iter().copied().eq([3, 2, 1]));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reverse;

impl<Q: ?Sized + Ord> Comparator<Q> for Reverse {
    #[inline]
    fn compare(&self, lhs: &Q, rhs: &Q) -> Ordering {
        rhs.cmp(lhs)
    }
}

/// Orders by a function or closure.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::{FixedMap, FnComparator};
///
/// let by_len = FnComparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// let mut map: FixedMap<&str, u32, 4, _> = FixedMap::with_comparator(by_len);
/// map.insert("ccc", 3);
/// map.insert("a", 1);
/// assert_eq!(map.first_key_value(), Some((&"a", &1)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FnComparator<F>(pub F);

impl<Q: ?Sized, F> Comparator<Q> for FnComparator<F>
where
    F: Fn(&Q, &Q) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &Q, rhs: &Q) -> Ordering {
        (self.0)(lhs, rhs)
    }
}
