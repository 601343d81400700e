//! Tree under construction.
//!
//! Nodes live in an arena indexed by [`NodeId`]. A leaf owns the global
//! indices of the examples it covers and remembers its best split candidate.
//! Splitting ([`BuildingTree::diverge`]) is irrevocable: the leaf hands its
//! examples to two new leaves and becomes an internal node.

use crate::predicate::PredicateId;
use crate::repr::{NodeId, Tree, TreeView};

use super::cache::AnswerCache;
use super::split::{LabelHistogram, SplitCandidate, find_best_split};

/// Committed split of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub predicate: PredicateId,
    pub left: NodeId,
    pub right: NodeId,
}

/// A node of the tree under construction.
#[derive(Debug, Clone)]
pub struct BuildingNode {
    examples: Vec<u32>,
    histogram: LabelHistogram,
    label: u8,
    entropy: f64,
    candidate: Option<SplitCandidate>,
    split: Option<Split>,
    depth: u32,
}

impl BuildingNode {
    fn new(cache: &AnswerCache, examples: Vec<u32>, depth: u32) -> Self {
        let histogram = LabelHistogram::from_examples(cache, &examples);
        let candidate = find_best_split(cache, &examples, &histogram);
        Self {
            label: histogram.majority(),
            entropy: histogram.entropy(),
            examples,
            histogram,
            candidate,
            split: None,
            depth,
        }
    }

    /// Global indices of the examples at this leaf (empty once split).
    pub fn examples(&self) -> &[u32] {
        &self.examples
    }

    /// Label counts of the examples that reached this node.
    pub fn histogram(&self) -> &LabelHistogram {
        &self.histogram
    }

    /// Majority label.
    pub fn label(&self) -> u8 {
        self.label
    }

    /// Label entropy in bits.
    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Entropy times example count.
    pub fn weighted_entropy(&self) -> f64 {
        self.entropy * self.histogram.total() as f64
    }

    /// Best uncommitted split, if any predicate can split this node.
    pub fn candidate(&self) -> Option<&SplitCandidate> {
        self.candidate.as_ref()
    }

    /// Gain of the best candidate, 0 when unsplittable.
    pub fn weighted_gain(&self) -> f64 {
        self.candidate.map_or(0.0, |c| c.weighted_gain)
    }

    /// Committed split, `None` for leaves.
    pub fn split(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    /// Distance from the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// Tree being grown by the trainer.
#[derive(Debug, Clone)]
pub struct BuildingTree {
    nodes: Vec<BuildingNode>,
}

impl BuildingTree {
    /// A single leaf covering `examples`, with its best split computed.
    pub fn new(cache: &AnswerCache, examples: Vec<u32>) -> Self {
        Self {
            nodes: vec![BuildingNode::new(cache, examples, 0)],
        }
    }

    /// Node by id.
    pub fn node(&self, node: NodeId) -> &BuildingNode {
        &self.nodes[node as usize]
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[BuildingNode] {
        &self.nodes
    }

    /// Commit the candidate split of a leaf.
    ///
    /// Returns the new `(left, right)` children, or `None` without touching
    /// the tree when the node is not a leaf or has no valid candidate.
    pub fn diverge(&mut self, cache: &AnswerCache, node: NodeId) -> Option<(NodeId, NodeId)> {
        let parent = self.nodes.get(node as usize)?;
        if !parent.is_leaf() {
            return None;
        }
        let predicate = parent.candidate?.predicate;
        let depth = parent.depth + 1;

        let (yes, no): (Vec<u32>, Vec<u32>) = parent
            .examples
            .iter()
            .partition(|&&e| cache.answer(e, predicate));
        if yes.is_empty() || no.is_empty() {
            return None;
        }

        let left = self.nodes.len() as NodeId;
        let right = left + 1;
        self.nodes.push(BuildingNode::new(cache, yes, depth));
        self.nodes.push(BuildingNode::new(cache, no, depth));

        let parent = &mut self.nodes[node as usize];
        parent.split = Some(Split {
            predicate,
            left,
            right,
        });
        parent.examples = Vec::new();

        Some((left, right))
    }

    /// Sum of weighted entropies over current leaves.
    pub fn leaf_weighted_entropy(&self) -> f64 {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(BuildingNode::weighted_entropy)
            .sum()
    }

    /// Freeze into an immutable [`Tree`].
    pub fn freeze(&self) -> Tree {
        let n = self.nodes.len();
        let mut split_predicates = Vec::with_capacity(n);
        let mut left_children = Vec::with_capacity(n);
        let mut right_children = Vec::with_capacity(n);
        let mut is_leaf = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        let mut counts = Vec::with_capacity(n);

        for node in &self.nodes {
            let split = node.split.unwrap_or(Split {
                predicate: PredicateId(0),
                left: 0,
                right: 0,
            });
            split_predicates.push(split.predicate);
            left_children.push(split.left);
            right_children.push(split.right);
            is_leaf.push(node.is_leaf());
            labels.push(node.label);
            counts.push(node.histogram.total());
        }

        Tree::from_parts(
            split_predicates,
            left_children,
            right_children,
            is_leaf,
            labels,
            counts,
        )
        .expect("building tree is a valid binary tree")
    }
}

impl TreeView for BuildingTree {
    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node as usize].is_leaf()
    }

    fn split_predicate(&self, node: NodeId) -> PredicateId {
        self.nodes[node as usize]
            .split
            .map_or(PredicateId(0), |s| s.predicate)
    }

    fn left_child(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].split.map_or(0, |s| s.left)
    }

    fn right_child(&self, node: NodeId) -> NodeId {
        self.nodes[node as usize].split.map_or(0, |s| s.right)
    }

    fn node_label(&self, node: NodeId) -> u8 {
        self.nodes[node as usize].label
    }

    fn node_count(&self, node: NodeId) -> u32 {
        self.nodes[node as usize].histogram.total()
    }
}
