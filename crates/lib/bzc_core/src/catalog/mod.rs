//! Catalog domain logic.

pub mod tree;

pub use tree::{FlatEntry, OrphanPolicy, TreeError, TreeNode, TreeRecord, build_tree,
    build_tree_with, flatten_tree, flatten_tree_from};
