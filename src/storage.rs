//! Fixed slot pools that hand out [`NodeIndex`] values.
//!
//! The tree engine only talks to its storage through [`IndexPool`]: allocate a slot for a value,
//! release it again, and access live slots by index. A [`StorageStrategy`] picks the pool type
//! for a given element type and capacity.

use core::fmt;
use core::panic::Location;

use crate::error::CapacityExceeded;
use crate::layout::NodeIndex;

/// The allocate/release/access contract between the tree engine and its slot storage.
///
/// Implementations must never move or renumber a live slot: an index stays valid, and keeps
/// naming the same value, until that index itself is released.
pub trait IndexPool<T>: Default {
    /// The fixed number of slots.
    const CAPACITY: usize;

    /// Returns the number of live slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slot is live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of slots that can still be allocated.
    fn free_len(&self) -> usize {
        Self::CAPACITY - self.len()
    }

    /// Moves `value` into a free slot and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] when every slot is live.
    #[track_caller]
    fn allocate(&mut self, value: T) -> Result<NodeIndex, CapacityExceeded>;

    /// Moves the value out of a live slot and makes the slot free again.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not live.
    fn release(&mut self, index: NodeIndex) -> T;

    /// Returns `true` if `index` names a live slot.
    fn contains(&self, index: NodeIndex) -> bool;

    /// # Panics
    ///
    /// Panics if `index` is not live.
    fn get(&self, index: NodeIndex) -> &T;

    /// # Panics
    ///
    /// Panics if `index` is not live.
    fn get_mut(&mut self, index: NodeIndex) -> &mut T;

    /// Drops every live value and frees all slots.
    fn clear(&mut self);

    /// Verifies that live and free slots partition the capacity.
    fn is_consistent(&self) -> bool;
}

/// Type-level choice of the pool backing a tree.
pub trait StorageStrategy {
    type Pool<T, const N: usize>: IndexPool<T>;
}

/// Selects [`FixedPool`]. This is the default.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FreeListStorage;

impl StorageStrategy for FreeListStorage {
    type Pool<T, const N: usize> = FixedPool<T, N>;
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    // The payload storage of a vacant slot carries the free-list link.
    Vacant { next_free: NodeIndex },
}

/// An array of `N` slots with an intrusive free list.
///
/// Released slots are chained through the slots themselves, so no side table is needed. Slots at
/// or above the high-water mark have never been handed out and are never read.
#[derive(Clone)]
pub struct FixedPool<T, const N: usize> {
    slots: [Slot<T>; N],
    free_head: NodeIndex,
    high_water: usize,
    len: usize,
}

impl<T, const N: usize> FixedPool<T, N> {
    /// Creates an empty pool.
    ///
    /// # Panics
    ///
    /// Fails to compile if `N` exceeds [`NodeIndex::MAX_CAPACITY`].
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(N <= NodeIndex::MAX_CAPACITY, "`FixedPool::new()` - `N` > `NodeIndex::MAX_CAPACITY`!") };
        Self {
            slots: [const { Slot::<T>::Vacant { next_free: NodeIndex::NULL } }; N],
            free_head: NodeIndex::NULL,
            high_water: 0,
            len: 0,
        }
    }
}

impl<T, const N: usize> Default for FixedPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> IndexPool<T> for FixedPool<T, N> {
    const CAPACITY: usize = N;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[track_caller]
    fn allocate(&mut self, value: T) -> Result<NodeIndex, CapacityExceeded> {
        let index = if !self.free_head.is_null() {
            // Reuse the most recently released slot.
            let index = self.free_head;
            let Slot::Vacant { next_free } = self.slots[index.to_index()] else {
                unreachable!("`FixedPool::allocate()` - free list points at a live slot!");
            };
            self.free_head = next_free;
            index
        } else if self.high_water < N {
            let index = NodeIndex::from_index(self.high_water);
            self.high_water += 1;
            index
        } else {
            return Err(CapacityExceeded {
                capacity: N,
                location: Location::caller(),
            });
        };

        self.slots[index.to_index()] = Slot::Occupied(value);
        self.len += 1;
        Ok(index)
    }

    fn release(&mut self, index: NodeIndex) -> T {
        assert!(self.contains(index), "`FixedPool::release()` - `index` is not live!");
        let slot = core::mem::replace(
            &mut self.slots[index.to_index()],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = index;
        self.len -= 1;
        match slot {
            Slot::Occupied(value) => value,
            Slot::Vacant { .. } => unreachable!("`FixedPool::release()` - `index` is not live!"),
        }
    }

    #[inline]
    fn contains(&self, index: NodeIndex) -> bool {
        matches!(self.slots.get(index.to_index()), Some(Slot::Occupied(_)))
    }

    #[inline]
    fn get(&self, index: NodeIndex) -> &T {
        match self.slots.get(index.to_index()) {
            Some(Slot::Occupied(value)) => value,
            _ => panic!("`FixedPool::get()` - `index` is not live!"),
        }
    }

    #[inline]
    fn get_mut(&mut self, index: NodeIndex) -> &mut T {
        match self.slots.get_mut(index.to_index()) {
            Some(Slot::Occupied(value)) => value,
            _ => panic!("`FixedPool::get_mut()` - `index` is not live!"),
        }
    }

    fn clear(&mut self) {
        for slot in &mut self.slots[..self.high_water] {
            *slot = Slot::Vacant {
                next_free: NodeIndex::NULL,
            };
        }
        self.free_head = NodeIndex::NULL;
        self.high_water = 0;
        self.len = 0;
    }

    fn is_consistent(&self) -> bool {
        let mut free = 0;
        let mut current = self.free_head;
        while !current.is_null() {
            if free >= self.high_water || current.to_index() >= self.high_water {
                return false;
            }
            match self.slots[current.to_index()] {
                Slot::Vacant { next_free } => current = next_free,
                Slot::Occupied(_) => return false,
            }
            free += 1;
        }

        let live = self.slots[..self.high_water].iter().filter(|slot| matches!(slot, Slot::Occupied(_))).count();
        live == self.len && live + free == self.high_water && self.high_water <= N
    }
}

impl<T, const N: usize> fmt::Debug for FixedPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedPool")
            .field("len", &self.len)
            .field("capacity", &N)
            .field("high_water", &self.high_water)
            .field("free_head", &self.free_head)
            .finish_non_exhaustive()
    }
}
