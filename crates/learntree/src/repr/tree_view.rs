//! Read-only tree interface and structural validation.

use crate::predicate::{PredicateId, PredicatePool};

use super::NodeId;

// ============================================================================
// TreeView Trait
// ============================================================================

/// Read-only view of a decision tree.
///
/// Implemented by the frozen [`Tree`](super::Tree) and by the tree being grown
/// during training, so traversal and rendering work on both.
///
/// Internal nodes route "yes" answers to the left child and "no" answers to
/// the right child.
pub trait TreeView {
    /// Number of nodes in the tree.
    fn n_nodes(&self) -> usize;

    /// Check if a node is a leaf.
    fn is_leaf(&self, node: NodeId) -> bool;

    /// Predicate tested at an internal node.
    fn split_predicate(&self, node: NodeId) -> PredicateId;

    /// Child taken when the predicate answers yes.
    fn left_child(&self, node: NodeId) -> NodeId;

    /// Child taken when the predicate answers no.
    fn right_child(&self, node: NodeId) -> NodeId;

    /// Majority label of the training examples that reached the node.
    fn node_label(&self, node: NodeId) -> u8;

    /// Number of training examples that reached the node.
    fn node_count(&self, node: NodeId) -> u32;

    /// Number of internal (split) nodes.
    fn n_internal(&self) -> usize {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .count()
    }

    /// Number of leaves.
    fn n_leaves(&self) -> usize {
        self.n_nodes() - self.n_internal()
    }

    /// Walk from the root to a leaf, asking `answer` at every internal node.
    ///
    /// This is the one traversal primitive: live prediction answers by
    /// evaluating predicates, training answers from the cache.
    #[inline]
    fn traverse_with<F>(&self, mut answer: F) -> NodeId
    where
        F: FnMut(PredicateId) -> bool,
    {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            node = if answer(self.split_predicate(node)) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Walk to the leaf reached by one feature vector.
    ///
    /// Predicates missing from `pool` answer "no".
    #[inline]
    fn traverse_to_leaf(&self, pool: &PredicatePool, features: &[i32]) -> NodeId {
        self.traverse_with(|id| pool.get(id).is_some_and(|p| p.evaluate(features)))
    }

    /// Label predicted for one feature vector.
    #[inline]
    fn predict_label(&self, pool: &PredicatePool, features: &[i32]) -> u8 {
        self.node_label(self.traverse_to_leaf(pool, features))
    }

    /// Length of the longest root-to-leaf path, in edges.
    fn depth(&self) -> usize {
        if self.n_nodes() == 0 {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(0, 0)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("{field} has {len} entries, expected {n_nodes}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        n_nodes: usize,
    },

    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },

    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },

    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },

    #[error("node {node} has label {label}, expected < {n_classes}")]
    LabelOutOfRange {
        node: NodeId,
        label: u8,
        n_classes: usize,
    },

    #[error("node {node} tests predicate {predicate}, pool has {n_predicates}")]
    PredicateOutOfRange {
        node: NodeId,
        predicate: PredicateId,
        n_predicates: usize,
    },
}

/// Validate that a tree is a proper binary tree rooted at node 0.
///
/// Every node must be reachable from the root by exactly one path, and every
/// child pointer must be in bounds.
pub fn validate_tree<T: TreeView + ?Sized>(tree: &T) -> Result<(), TreeValidationError> {
    let n_nodes = tree.n_nodes();
    if n_nodes == 0 {
        return Err(TreeValidationError::EmptyTree);
    }

    // Iterative DFS with color marking.
    // 0 = unvisited, 1 = visiting, 2 = done
    let mut color = vec![0u8; n_nodes];
    let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

    while let Some((node, phase)) = stack.pop() {
        let node_usize = node as usize;
        if phase == 1 {
            color[node_usize] = 2;
            continue;
        }

        match color[node_usize] {
            0 => {}
            1 => return Err(TreeValidationError::CycleDetected { node }),
            _ => return Err(TreeValidationError::DuplicateVisit { node }),
        }
        color[node_usize] = 1;
        stack.push((node, 1));

        if tree.is_leaf(node) {
            continue;
        }

        let left = tree.left_child(node);
        let right = tree.right_child(node);
        if left == node || right == node {
            return Err(TreeValidationError::SelfLoop { node });
        }
        for (side, child) in [("left", left), ("right", right)] {
            if child as usize >= n_nodes {
                return Err(TreeValidationError::ChildOutOfBounds {
                    node,
                    side,
                    child,
                    n_nodes,
                });
            }
        }

        stack.push((right, 0));
        stack.push((left, 0));
    }

    if let Some(i) = color.iter().position(|&c| c == 0) {
        return Err(TreeValidationError::UnreachableNode { node: i as NodeId });
    }

    Ok(())
}
