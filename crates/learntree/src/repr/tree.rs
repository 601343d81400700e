//! Immutable SoA decision tree.

use crate::NUM_CLASSES;
use crate::predicate::{PredicateId, PredicatePool};

use super::NodeId;
use super::tree_view::{TreeValidationError, TreeView, validate_tree};

/// Structure-of-Arrays tree storage.
///
/// Stores nodes in flat arrays indexed by [`NodeId`] (0 = root). For leaves,
/// the predicate and child entries are unused and kept at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    split_predicates: Box<[PredicateId]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    is_leaf: Box<[bool]>,
    labels: Box<[u8]>,
    counts: Box<[u32]>,
}

impl Tree {
    /// Create a tree from parallel arrays, validating its structure.
    ///
    /// # Errors
    ///
    /// Returns [`TreeValidationError`] if the arrays differ in length, a label
    /// is not a valid class, or the nodes do not form a binary tree rooted
    /// at node 0.
    pub fn from_parts(
        split_predicates: Vec<PredicateId>,
        left_children: Vec<NodeId>,
        right_children: Vec<NodeId>,
        is_leaf: Vec<bool>,
        labels: Vec<u8>,
        counts: Vec<u32>,
    ) -> Result<Self, TreeValidationError> {
        let n_nodes = is_leaf.len();
        for (field, len) in [
            ("split_predicates", split_predicates.len()),
            ("left_children", left_children.len()),
            ("right_children", right_children.len()),
            ("labels", labels.len()),
            ("counts", counts.len()),
        ] {
            if len != n_nodes {
                return Err(TreeValidationError::LengthMismatch {
                    field,
                    len,
                    n_nodes,
                });
            }
        }
        if let Some(node) = labels.iter().position(|&l| l as usize >= NUM_CLASSES) {
            return Err(TreeValidationError::LabelOutOfRange {
                node: node as NodeId,
                label: labels[node],
                n_classes: NUM_CLASSES,
            });
        }

        let tree = Self {
            split_predicates: split_predicates.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            labels: labels.into_boxed_slice(),
            counts: counts.into_boxed_slice(),
        };
        validate_tree(&tree)?;
        Ok(tree)
    }

    /// A single-leaf tree.
    pub fn leaf(label: u8, count: u32) -> Self {
        Self {
            split_predicates: Box::new([PredicateId(0)]),
            left_children: Box::new([0]),
            right_children: Box::new([0]),
            is_leaf: Box::new([true]),
            labels: Box::new([label]),
            counts: Box::new([count]),
        }
    }

    /// Check that every predicate the tree tests exists in a pool of
    /// `n_predicates`.
    pub fn validate_predicates(&self, n_predicates: usize) -> Result<(), TreeValidationError> {
        for node in 0..self.n_nodes() as NodeId {
            if self.is_leaf(node) {
                continue;
            }
            let predicate = self.split_predicate(node);
            if predicate.index() >= n_predicates {
                return Err(TreeValidationError::PredicateOutOfRange {
                    node,
                    predicate,
                    n_predicates,
                });
            }
        }
        Ok(())
    }

    /// Distinct predicates tested by internal nodes, in ascending id order.
    pub fn used_predicates(&self) -> Vec<PredicateId> {
        let mut used: Vec<PredicateId> = (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| self.split_predicate(n))
            .collect();
        used.sort_unstable();
        used.dedup();
        used
    }

    /// Rewrite every predicate id through `map`.
    pub fn map_predicates<F>(&self, mut map: F) -> Self
    where
        F: FnMut(PredicateId) -> PredicateId,
    {
        let split_predicates = self
            .split_predicates
            .iter()
            .zip(self.is_leaf.iter())
            .map(|(&p, &leaf)| if leaf { p } else { map(p) })
            .collect();
        Self {
            split_predicates,
            ..self.clone()
        }
    }

    /// Predict labels for every row of a feature matrix.
    pub fn predict_rows<'a, I>(&self, pool: &PredicatePool, rows: I) -> Vec<u8>
    where
        I: IntoIterator<Item = &'a [i32]>,
    {
        rows.into_iter()
            .map(|row| self.predict_label(pool, row))
            .collect()
    }

    /// Raw predicate array (leaves hold 0).
    pub fn split_predicates(&self) -> &[PredicateId] {
        &self.split_predicates
    }

    /// Raw left-child array.
    pub fn left_children(&self) -> &[NodeId] {
        &self.left_children
    }

    /// Raw right-child array.
    pub fn right_children(&self) -> &[NodeId] {
        &self.right_children
    }

    /// Raw leaf-flag array.
    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    /// Raw label array.
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Raw example-count array.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

impl TreeView for Tree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    fn split_predicate(&self, node: NodeId) -> PredicateId {
        self.split_predicates[node as usize]
    }

    #[inline]
    fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    fn node_label(&self, node: NodeId) -> u8 {
        self.labels[node as usize]
    }

    #[inline]
    fn node_count(&self, node: NodeId) -> u32 {
        self.counts[node as usize]
    }
}

// ============================================================================
// Tests
// ============================================================================
