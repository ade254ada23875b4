//! Fixed-capacity, allocation-free ordered collections for Rust.
//!
//! This crate provides [`FixedMap`] and [`FixedSet`], ordered map and set types whose capacity `N`
//! is a const generic. Entries live inline in a fixed array of slots and tree nodes link to each
//! other by slot index instead of by pointer, so a collection:
//!
//! - never allocates, and works in `no_std` environments without `alloc`,
//! - is a plain value that can be moved, cloned or placed in a `static`,
//! - keeps every entry at the same slot index for as long as the entry is in the collection.
//!
//! # Example
//!
//! ```
//! use fixed_rbtree::FixedMap;
//!
//! let mut scores: FixedMap<&str, u32, 8> = FixedMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.get("Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//! assert_eq!(scores.remaining_capacity(), 5);
//!
//! // Iteration follows key order.
//! assert!(scores.keys().copied().eq(["Alice", "Bob", "Carol"]));
//! ```
//!
//! # Failure handling
//!
//! Inserting into a full collection, or calling [`FixedMap::at`] with a missing key, is handled by
//! the collection's [`CheckingPolicy`]. The default [`Fatal`] policy panics with a diagnostic that
//! names the caller's location; [`Fallible`] turns the same operations into ones that return
//! [`Result`]:
//!
//! ```
//! use fixed_rbtree::{Error, Fallible, FixedMap, Natural};
//!
//! let mut map: FixedMap<u8, u8, 1, Natural, Fallible> = FixedMap::default();
//! map.insert(1, 1)?;
//! assert!(matches!(map.insert(2, 2), Err(Error::CapacityExceeded(_))));
//! # Ok::<(), Error>(())
//! ```
//!
//! # Customization
//!
//! Besides the key order (`C`, see [`Comparator`]) and the checking policy (`P`), every collection
//! takes the node color placement (`L`, see [`ColorCompactness`]) and the slot pool (`S`, see
//! [`StorageStrategy`]) as type parameters with defaults.
//!
//! # Features
//!
//! - **`tracing`** (default) - emit a `tracing` event before a [`Fatal`] failure panics, and a
//!   trace event for every range erase.
//! - **`std`** - implement `std`-only conveniences in the error and logging dependencies.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod compare;
mod error;
mod layout;
mod pair_view;
mod policy;
mod raw;
mod storage;

pub mod fixed_map;
pub mod fixed_set;

pub use compare::{Comparator, FnComparator, Natural, Reverse};
pub use error::{CapacityExceeded, Error, InvariantViolation, KeyNotFound};
pub use fixed_map::FixedMap;
pub use fixed_set::FixedSet;
pub use layout::{Color, ColorCompactness, EmbeddedColor, EmbeddedLinks, NodeIndex, NodeLinks, PackedColor, PackedLinks};
pub use pair_view::{PairView, PairViewMut};
pub use policy::{CheckingPolicy, Fallible, Fatal};
pub use storage::{FixedPool, FreeListStorage, IndexPool, StorageStrategy};
