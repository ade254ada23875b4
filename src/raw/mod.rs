mod node;
mod raw_fixed_tree;

pub(crate) use raw_fixed_tree::{NodeIndexAndParentIndex, RawFixedTree};
