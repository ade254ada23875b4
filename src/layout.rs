//! Node addressing and node-color layout.
//!
//! Tree nodes refer to each other through [`NodeIndex`] values instead of pointers, which keeps a
//! whole tree a flat, relocatable value. Where a node's color bit lives is a layout choice picked
//! at the type level through [`ColorCompactness`]:
//!
//! - [`EmbeddedColor`] stores the color as its own field.
//! - [`PackedColor`] borrows the high bit of the parent index.
//!
//! Both strategies behave identically; they only differ in node size.

use core::fmt;

#[cfg(test)]
type RawIndex = u16;
#[cfg(not(test))]
type RawIndex = u32;

// The top bit is never part of an index so that `PackedColor` can borrow it.
const COLOR_BIT: RawIndex = 1 << (RawIndex::BITS - 1);

/// An integer slot identifier standing in for a pointer to a tree node.
///
/// Live nodes use indices in `[0, N)`. [`NodeIndex::NULL`] marks absence (no child, no parent,
/// key not found). Cursors additionally use the index `N` as their *past-last* position, which
/// never collides with `NULL` because `N <= NodeIndex::MAX_CAPACITY`.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeIndex(RawIndex);

impl NodeIndex {
    /// The absence sentinel.
    pub const NULL: Self = Self(!COLOR_BIT);

    /// The largest capacity a pool may be declared with.
    pub const MAX_CAPACITY: usize = (!COLOR_BIT) as usize - 1;

    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX_CAPACITY, "`NodeIndex::from_index()` - `index` > `NodeIndex::MAX_CAPACITY`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(index as RawIndex)
    }

    #[inline]
    #[must_use]
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("NodeIndex(NULL)")
        } else {
            f.debug_tuple("NodeIndex").field(&self.0).finish()
        }
    }
}

/// The color of a red-black tree node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// The parent/child links and color of a node.
///
/// Implementations decide where the color is stored. Newly linked nodes are always red with no
/// children.
pub trait NodeLinks: Copy + fmt::Debug {
    /// Links for a fresh red leaf hanging below `parent`.
    fn new_red(parent: NodeIndex) -> Self;

    fn parent(&self) -> NodeIndex;
    fn set_parent(&mut self, parent: NodeIndex);
    fn left(&self) -> NodeIndex;
    fn set_left(&mut self, left: NodeIndex);
    fn right(&self) -> NodeIndex;
    fn set_right(&mut self, right: NodeIndex);
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

/// Type-level choice of node link layout.
pub trait ColorCompactness {
    type Links: NodeLinks;
}

/// Stores the color in a dedicated field. This is the default.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EmbeddedColor;

/// Stores the color in the high bit of the parent index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PackedColor;

impl ColorCompactness for EmbeddedColor {
    type Links = EmbeddedLinks;
}

impl ColorCompactness for PackedColor {
    type Links = PackedLinks;
}

/// Links with a separate color field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmbeddedLinks {
    parent: NodeIndex,
    left: NodeIndex,
    right: NodeIndex,
    color: Color,
}

impl NodeLinks for EmbeddedLinks {
    #[inline]
    fn new_red(parent: NodeIndex) -> Self {
        Self {
            parent,
            left: NodeIndex::NULL,
            right: NodeIndex::NULL,
            color: Color::Red,
        }
    }

    #[inline]
    fn parent(&self) -> NodeIndex {
        self.parent
    }

    #[inline]
    fn set_parent(&mut self, parent: NodeIndex) {
        self.parent = parent;
    }

    #[inline]
    fn left(&self) -> NodeIndex {
        self.left
    }

    #[inline]
    fn set_left(&mut self, left: NodeIndex) {
        self.left = left;
    }

    #[inline]
    fn right(&self) -> NodeIndex {
        self.right
    }

    #[inline]
    fn set_right(&mut self, right: NodeIndex) {
        self.right = right;
    }

    #[inline]
    fn color(&self) -> Color {
        self.color
    }

    #[inline]
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Links with the color folded into the parent index. A set high bit means black.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct PackedLinks {
    parent_and_color: RawIndex,
    left: NodeIndex,
    right: NodeIndex,
}

impl fmt::Debug for PackedLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedLinks")
            .field("parent", &self.parent())
            .field("left", &self.left)
            .field("right", &self.right)
            .field("color", &self.color())
            .finish()
    }
}

impl NodeLinks for PackedLinks {
    #[inline]
    fn new_red(parent: NodeIndex) -> Self {
        Self {
            parent_and_color: parent.0,
            left: NodeIndex::NULL,
            right: NodeIndex::NULL,
        }
    }

    #[inline]
    fn parent(&self) -> NodeIndex {
        NodeIndex(self.parent_and_color & !COLOR_BIT)
    }

    #[inline]
    fn set_parent(&mut self, parent: NodeIndex) {
        self.parent_and_color = (self.parent_and_color & COLOR_BIT) | parent.0;
    }

    #[inline]
    fn left(&self) -> NodeIndex {
        self.left
    }

    #[inline]
    fn set_left(&mut self, left: NodeIndex) {
        self.left = left;
    }

    #[inline]
    fn right(&self) -> NodeIndex {
        self.right
    }

    #[inline]
    fn set_right(&mut self, right: NodeIndex) {
        self.right = right;
    }

    #[inline]
    fn color(&self) -> Color {
        if self.parent_and_color & COLOR_BIT == 0 { Color::Red } else { Color::Black }
    }

    #[inline]
    fn set_color(&mut self, color: Color) {
        match color {
            Color::Red => self.parent_and_color &= !COLOR_BIT,
            Color::Black => self.parent_and_color |= COLOR_BIT,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::{assert_eq_size, const_assert};

    assert_eq_size!(NodeIndex, RawIndex);
    assert_eq_size!(PackedLinks, [RawIndex; 3]);
    const_assert!(core::mem::size_of::<PackedLinks>() < core::mem::size_of::<EmbeddedLinks>());
    const_assert!(NodeIndex::MAX_CAPACITY < NodeIndex::NULL.to_index());

    #[test]
    #[should_panic(expected = "`NodeIndex::from_index()` - `index` > `NodeIndex::MAX_CAPACITY`!")]
    fn invalid_index() {
        let _ = NodeIndex::from_index(NodeIndex::MAX_CAPACITY + 1);
    }

    #[test]
    fn null_is_distinct_from_every_index() {
        assert!(NodeIndex::NULL.is_null());
        assert!(!NodeIndex::from_index(0).is_null());
        assert!(!NodeIndex::from_index(NodeIndex::MAX_CAPACITY).is_null());
    }

    #[test]
    fn new_links_are_red_leaves() {
        let parent = NodeIndex::from_index(3);
        let embedded = EmbeddedLinks::new_red(parent);
        let packed = PackedLinks::new_red(parent);

        assert_eq!(embedded.color(), Color::Red);
        assert_eq!(packed.color(), Color::Red);
        assert_eq!(packed.parent(), parent);
        assert!(packed.left().is_null() && packed.right().is_null());
    }

    #[test]
    fn packed_null_parent_keeps_color() {
        let mut links = PackedLinks::new_red(NodeIndex::NULL);
        links.set_color(Color::Black);
        assert_eq!(links.parent(), NodeIndex::NULL);
        assert_eq!(links.color(), Color::Black);
    }

    proptest! {
        #[test]
        fn index_round_trip(index in 0..=NodeIndex::MAX_CAPACITY) {
            prop_assert_eq!(NodeIndex::from_index(index).to_index(), index);
        }

        #[test]
        fn packed_parent_and_color_are_independent(
            first in 0..=NodeIndex::MAX_CAPACITY,
            second in 0..=NodeIndex::MAX_CAPACITY,
            black in any::<bool>(),
        ) {
            let color = if black { Color::Black } else { Color::Red };
            let mut links = PackedLinks::new_red(NodeIndex::from_index(first));
            links.set_color(color);
            prop_assert_eq!(links.parent(), NodeIndex::from_index(first));

            links.set_parent(NodeIndex::from_index(second));
            prop_assert_eq!(links.color(), color);
            prop_assert_eq!(links.parent(), NodeIndex::from_index(second));
        }
    }
}
