//! Tree inference.
//!
//! [`Predictor`] pairs a tree with the predicate pool its nodes refer to and
//! classifies live feature vectors by evaluating predicates on the way down.

use crate::data::Examples;
use crate::predicate::PredicatePool;
use crate::repr::{NodeId, Tree, TreeView};

/// Classifies feature vectors with a tree.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a, T: TreeView = Tree> {
    tree: &'a T,
    pool: &'a PredicatePool,
}

impl<'a, T: TreeView> Predictor<'a, T> {
    /// Create a predictor. Every predicate the tree tests must be in `pool`.
    pub fn new(tree: &'a T, pool: &'a PredicatePool) -> Self {
        Self { tree, pool }
    }

    /// Leaf reached by one feature vector.
    #[inline]
    pub fn leaf(&self, features: &[i32]) -> NodeId {
        self.tree.traverse_to_leaf(self.pool, features)
    }

    /// Predicted label for one feature vector.
    #[inline]
    pub fn predict_row(&self, features: &[i32]) -> u8 {
        self.tree.node_label(self.leaf(features))
    }

    /// Predicted labels for every example, in row order.
    pub fn predict(&self, examples: &Examples) -> Vec<u8> {
        examples
            .iter()
            .map(|(_, features)| self.predict_row(features))
            .collect()
    }

    /// Fraction of examples whose label is predicted correctly.
    ///
    /// Returns 0.0 for an empty set.
    pub fn accuracy(&self, examples: &Examples) -> f64 {
        if examples.is_empty() {
            return 0.0;
        }
        let correct = examples
            .iter()
            .filter(|&(label, features)| self.predict_row(features) == label)
            .count();
        correct as f64 / examples.n_examples() as f64
    }

    /// Confusion counts: `matrix[true][predicted]`.
    pub fn confusion(&self, examples: &Examples) -> [[u32; crate::NUM_CLASSES]; crate::NUM_CLASSES] {
        let mut matrix = [[0u32; crate::NUM_CLASSES]; crate::NUM_CLASSES];
        for (label, features) in examples.iter() {
            matrix[label as usize][self.predict_row(features) as usize] += 1;
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateId};
    use approx::assert_relative_eq;

    fn stump() -> (Tree, PredicatePool) {
        let tree = Tree::from_parts(
            vec![PredicateId(0); 3],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![false, true, true],
            vec![0, 7, 1],
            vec![4, 2, 2],
        )
        .unwrap();
        let pool = PredicatePool::new(vec![Predicate::PixelThreshold {
            pixel: 1,
            threshold: 100,
        }])
        .unwrap();
        (tree, pool)
    }

    #[test]
    fn predicts_and_scores() {
        let (tree, pool) = stump();
        let predictor = Predictor::new(&tree, &pool);
        let examples =
            Examples::from_rows(&[vec![7, 0, 200], vec![1, 0, 0], vec![1, 0, 255]]).unwrap();

        assert_eq!(predictor.predict(&examples), vec![7, 1, 7]);
        assert_relative_eq!(predictor.accuracy(&examples), 2.0 / 3.0);

        let confusion = predictor.confusion(&examples);
        assert_eq!(confusion[7][7], 1);
        assert_eq!(confusion[1][1], 1);
        assert_eq!(confusion[1][7], 1);
    }

    #[test]
    fn empty_set_scores_zero() {
        let (tree, pool) = stump();
        let empty = Examples::from_rows::<Vec<i32>>(&[]).unwrap();
        assert_eq!(Predictor::new(&tree, &pool).accuracy(&empty), 0.0);
    }
}
