use crate::layout::{NodeIndex, NodeLinks};

/// A tree node as stored in a pool slot.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V, L> {
    key: K,
    value: V,
    links: L,
}

impl<K, V, L: NodeLinks> Node<K, V, L> {
    /// Creates a red leaf that will hang below `parent`.
    #[inline]
    pub(crate) fn new(key: K, value: V, parent: NodeIndex) -> Self {
        Self {
            key,
            value,
            links: L::new_red(parent),
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Splits the borrow so the key stays shared while the value is mutable.
    #[inline]
    pub(crate) fn key_value_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    pub(crate) fn links(&self) -> &L {
        &self.links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self) -> &mut L {
        &mut self.links
    }

    #[inline]
    pub(crate) fn into_key_value(self) -> (K, V) {
        (self.key, self.value)
    }
}
