//! Canonical decision tree representation.

/// Canonical node identifier.
///
/// Internally this is just an index into the tree's SoA arrays (0 = root).
pub type NodeId = u32;

pub mod tree;
pub mod tree_view;

pub use tree::Tree;
pub use tree_view::{TreeValidationError, TreeView, validate_tree};
