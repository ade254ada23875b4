//! Checking policies decide what a failed checked operation produces.
//!
//! A policy is picked once, as a type parameter of [`FixedMap`](crate::FixedMap) or
//! [`FixedSet`](crate::FixedSet), so the fast path is monomorphized per policy and carries no
//! runtime branching on how failures are reported.

use core::fmt;

use crate::error::{CapacityExceeded, Error, KeyNotFound};

/// Maps the outcome of a checked operation to what the caller receives.
///
/// Checked operations are [`at`](crate::FixedMap::at), the insertion family, and construction
/// from a list of entries.
pub trait CheckingPolicy {
    /// What a checked operation producing `T` returns.
    type Outcome<T>;

    /// Wraps a successful result.
    fn success<T>(value: T) -> Self::Outcome<T>;

    /// Called when a checked lookup does not find `key`.
    fn out_of_range<Q: ?Sized + fmt::Debug, T>(key: &Q, error: KeyNotFound) -> Self::Outcome<T>;

    /// Called when an insertion needs a slot and none is free.
    fn capacity_exceeded<T>(error: CapacityExceeded) -> Self::Outcome<T>;
}

/// Treats every failure as a sizing or logic defect and panics. This is the default.
///
/// With the `tracing` feature enabled an `error` event carrying the diagnostic is emitted right
/// before the panic.
///
/// # Examples
///
/// ```should_panic
/// use fixed_rbtree::FixedMap;
///
/// let mut map: FixedMap<u32, u32, 1> = FixedMap::new();
/// map.insert(1, 10);
/// map.insert(2, 20); // panics: capacity of 1 exceeded
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Fatal;

impl CheckingPolicy for Fatal {
    type Outcome<T> = T;

    #[inline]
    fn success<T>(value: T) -> T {
        value
    }

    #[cold]
    fn out_of_range<Q: ?Sized + fmt::Debug, T>(key: &Q, error: KeyNotFound) -> T {
        #[cfg(feature = "tracing")]
        tracing::error!(?key, size = error.size, location = %error.location, "key not found");
        panic!("{error}: {key:?}")
    }

    #[cold]
    fn capacity_exceeded<T>(error: CapacityExceeded) -> T {
        #[cfg(feature = "tracing")]
        tracing::error!(capacity = error.capacity, location = %error.location, "capacity exceeded");
        panic!("{error}")
    }
}

/// Reports failures as [`Error`] values.
///
/// # Examples
///
/// ```
/// use fixed_rbtree::{Error, Fallible, FixedMap, Natural};
///
/// let mut map: FixedMap<u32, u32, 1, Natural, Fallible> = FixedMap::default();
/// assert!(map.insert(1, 10).is_ok());
/// assert!(matches!(map.insert(2, 20), Err(Error::CapacityExceeded(_))));
/// assert!(matches!(map.at(&3), Err(Error::KeyNotFound(_))));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Fallible;

impl CheckingPolicy for Fallible {
    type Outcome<T> = Result<T, Error>;

    #[inline]
    fn success<T>(value: T) -> Result<T, Error> {
        Ok(value)
    }

    #[inline]
    fn out_of_range<Q: ?Sized + fmt::Debug, T>(_key: &Q, error: KeyNotFound) -> Result<T, Error> {
        Err(error.into())
    }

    #[inline]
    fn capacity_exceeded<T>(error: CapacityExceeded) -> Result<T, Error> {
        Err(error.into())
    }
}
