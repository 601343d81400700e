//! Best-first tree growth.
//!
//! The grower keeps every splittable leaf in a max-heap keyed by the weighted
//! information gain of its best split. Each [`step`](TreeGrower::step) splits
//! the top leaf and pushes its children. A leaf's gain is fixed when the leaf
//! is created, so the heap never needs re-keying.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::predicate::PredicateId;
use crate::repr::{NodeId, Tree, TreeView};

use super::building::BuildingTree;
use super::cache::AnswerCache;

// =============================================================================
// LeafCandidate
// =============================================================================

/// A splittable leaf waiting in the heap.
#[derive(Debug, Clone, Copy)]
pub struct LeafCandidate {
    /// Node ID in the building tree.
    pub node_id: NodeId,
    /// Weighted information gain of the leaf's best split.
    pub gain: f64,
}

impl LeafCandidate {
    pub fn new(node_id: NodeId, gain: f64) -> Self {
        Self { node_id, gain }
    }
}

impl PartialEq for LeafCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LeafCandidate {}

impl PartialOrd for LeafCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LeafCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher gain first; on ties the older (lower id) leaf wins.
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

// =============================================================================
// StepOutcome
// =============================================================================

/// Result of one growth step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A leaf was split.
    Split {
        node: NodeId,
        predicate: PredicateId,
        left: NodeId,
        right: NodeId,
        gain: f64,
    },
    /// The top leaf turned out unsplittable and was dropped from the heap.
    Unsplittable { node: NodeId },
    /// No splittable leaves remain; nothing changed.
    Exhausted,
}

impl StepOutcome {
    /// Whether the tree changed.
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split { .. })
    }
}

// =============================================================================
// TreeGrower
// =============================================================================

/// Grows one tree over a fixed set of examples.
pub struct TreeGrower<'a> {
    cache: &'a AnswerCache,
    tree: BuildingTree,
    heap: BinaryHeap<LeafCandidate>,
    internal_nodes: usize,
    total_weighted_entropy: f64,
    predicate_splits: Vec<u32>,
    steps: u64,
}

impl<'a> TreeGrower<'a> {
    /// Start from a single leaf covering `examples` (global cache indices).
    pub fn new(cache: &'a AnswerCache, examples: Vec<u32>) -> Self {
        let tree = BuildingTree::new(cache, examples);
        let root = tree.node(0);
        let total_weighted_entropy = root.weighted_entropy();

        let mut heap = BinaryHeap::new();
        if let Some(candidate) = root.candidate() {
            heap.push(LeafCandidate::new(0, candidate.weighted_gain));
        }

        Self {
            cache,
            tree,
            heap,
            internal_nodes: 0,
            total_weighted_entropy,
            predicate_splits: vec![0; cache.n_predicates()],
            steps: 0,
        }
    }

    /// Split the leaf with the highest gain.
    pub fn step(&mut self) -> StepOutcome {
        self.steps += 1;
        let Some(&top) = self.heap.peek() else {
            return StepOutcome::Exhausted;
        };

        let Some((left, right)) = self.tree.diverge(self.cache, top.node_id) else {
            // Never reselect it.
            self.heap.pop();
            return StepOutcome::Unsplittable { node: top.node_id };
        };
        self.heap.pop();

        let parent = self.tree.node(top.node_id);
        let predicate = parent
            .split()
            .map(|s| s.predicate)
            .unwrap_or(PredicateId(0));
        self.total_weighted_entropy -= parent.weighted_entropy();

        for child in [left, right] {
            let node = self.tree.node(child);
            self.total_weighted_entropy += node.weighted_entropy();
            if let Some(candidate) = node.candidate() {
                self.heap
                    .push(LeafCandidate::new(child, candidate.weighted_gain));
            }
        }

        self.internal_nodes += 1;
        self.predicate_splits[predicate.index()] += 1;

        StepOutcome::Split {
            node: top.node_id,
            predicate,
            left,
            right,
            gain: top.gain,
        }
    }

    /// Run `n` steps; returns how many of them split a leaf.
    pub fn grow(&mut self, n: u64) -> u64 {
        let mut splits = 0;
        for i in 0..n {
            match self.step() {
                StepOutcome::Split { .. } => splits += 1,
                StepOutcome::Unsplittable { .. } => {}
                StepOutcome::Exhausted => {
                    // Remaining steps would be no-ops.
                    self.steps += n - i - 1;
                    break;
                }
            }
        }
        splits
    }

    /// The tree grown so far.
    pub fn tree(&self) -> &BuildingTree {
        &self.tree
    }

    /// Freeze the current tree.
    pub fn freeze(&self) -> Tree {
        self.tree.freeze()
    }

    /// Number of internal nodes.
    pub fn internal_nodes(&self) -> usize {
        self.internal_nodes
    }

    /// Running sum of leaf weighted entropies.
    pub fn total_weighted_entropy(&self) -> f64 {
        self.total_weighted_entropy
    }

    /// Number of leaves still eligible for splitting.
    pub fn n_candidates(&self) -> usize {
        self.heap.len()
    }

    /// Step calls made so far, including no-ops.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of splits per predicate id.
    pub fn predicate_splits(&self) -> &[u32] {
        &self.predicate_splits
    }

    /// Fraction of the given examples whose label the tree predicts,
    /// answering predicates from the cache.
    ///
    /// Returns 0.0 for an empty range.
    pub fn cache_accuracy(&self, examples: std::ops::Range<u32>) -> f64 {
        if examples.is_empty() {
            return 0.0;
        }
        let n = examples.len();
        let correct = examples
            .filter(|&e| {
                let leaf = self.tree.traverse_with(|p| self.cache.answer(e, p));
                self.tree.node_label(leaf) == self.cache.label(e)
            })
            .count();
        correct as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Examples;
    use crate::predicate::{Predicate, PredicatePool};
    use approx::assert_abs_diff_eq;

    fn threshold(pixel: u32) -> Predicate {
        Predicate::PixelThreshold {
            pixel,
            threshold: 5,
        }
    }

    fn cache_for(rows: &[Vec<i32>], pool: &PredicatePool) -> AnswerCache {
        let training = Examples::from_rows(rows).unwrap();
        let empty = Examples::from_rows::<Vec<i32>>(&[]).unwrap();
        AnswerCache::build(pool, &training, &empty).unwrap()
    }

    #[test]
    fn heap_orders_by_gain_then_age() {
        let mut heap = BinaryHeap::new();
        heap.push(LeafCandidate::new(3, 1.0));
        heap.push(LeafCandidate::new(1, 2.0));
        heap.push(LeafCandidate::new(2, 2.0));
        heap.push(LeafCandidate::new(4, 0.0));
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|c| c.node_id)).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn four_example_scenario() {
        let pool = PredicatePool::new(vec![threshold(0)]).unwrap();
        let cache = cache_for(&[vec![0, 0], vec![0, 0], vec![1, 9], vec![1, 9]], &pool);
        let mut grower = TreeGrower::new(&cache, cache.training_indices().collect());
        assert_abs_diff_eq!(grower.total_weighted_entropy(), 4.0, epsilon = 1e-12);

        let outcome = grower.step();
        assert!(matches!(
            outcome,
            StepOutcome::Split {
                node: 0,
                predicate: PredicateId(0),
                left: 1,
                right: 2,
                ..
            }
        ));
        assert_eq!(grower.internal_nodes(), 1);
        assert_abs_diff_eq!(grower.total_weighted_entropy(), 0.0);
        assert_eq!(grower.tree().node(1).entropy(), 0.0);
        assert_eq!(grower.tree().node(2).entropy(), 0.0);
        assert_abs_diff_eq!(grower.cache_accuracy(cache.training_indices()), 1.0);

        // Pure children cannot be split by a predicate that is constant on them.
        assert_eq!(grower.step(), StepOutcome::Exhausted);
        assert_eq!(grower.tree().n_nodes(), 3);
    }

    #[test]
    fn constant_pool_never_grows() {
        let pool = PredicatePool::new(vec![Predicate::PixelThreshold {
            pixel: 0,
            threshold: -1,
        }])
        .unwrap();
        let cache = cache_for(&[vec![0, 0], vec![1, 9]], &pool);
        let mut grower = TreeGrower::new(&cache, cache.training_indices().collect());
        assert_eq!(grower.n_candidates(), 0);
        assert_eq!(grower.grow(5), 0);
        assert_eq!(grower.tree().n_nodes(), 1);
        assert_eq!(grower.steps(), 5);
    }

    #[test]
    fn running_totals_match_tree() {
        let pool = PredicatePool::new(vec![threshold(0), threshold(1), threshold(2)]).unwrap();
        let rows = vec![
            vec![0, 0, 0, 0],
            vec![1, 9, 0, 0],
            vec![2, 9, 9, 0],
            vec![3, 9, 9, 9],
            vec![3, 0, 9, 9],
            vec![1, 0, 0, 9],
        ];
        let cache = cache_for(&rows, &pool);
        let mut grower = TreeGrower::new(&cache, cache.training_indices().collect());
        let splits = grower.grow(10);

        let tree = grower.tree();
        assert_eq!(grower.internal_nodes(), splits as usize);
        assert_eq!(tree.n_nodes(), 2 * grower.internal_nodes() + 1);
        assert_abs_diff_eq!(
            grower.total_weighted_entropy(),
            tree.leaf_weighted_entropy(),
            epsilon = 1e-9
        );
        assert_eq!(
            grower.predicate_splits().iter().sum::<u32>() as usize,
            grower.internal_nodes()
        );
    }

    #[test]
    fn cache_accuracy_of_empty_range_is_zero() {
        let pool = PredicatePool::new(vec![threshold(0)]).unwrap();
        let cache = cache_for(&[vec![0, 0]], &pool);
        let grower = TreeGrower::new(&cache, vec![0]);
        assert_eq!(grower.cache_accuracy(0..0), 0.0);
    }
}
