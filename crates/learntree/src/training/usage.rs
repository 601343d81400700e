//! Predicate family usage statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::predicate::{PredicateKind, PredicatePool};
use crate::repr::{NodeId, TreeView};

/// How many internal nodes test each predicate family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateUsage {
    by_kind: BTreeMap<PredicateKind, usize>,
    internal_nodes: usize,
}

impl PredicateUsage {
    /// Count the families used by a tree's internal nodes.
    pub fn from_tree<T: TreeView + ?Sized>(tree: &T, pool: &PredicatePool) -> Self {
        let mut usage = Self::default();
        for node in 0..tree.n_nodes() as NodeId {
            if tree.is_leaf(node) {
                continue;
            }
            if let Some(predicate) = pool.get(tree.split_predicate(node)) {
                *usage.by_kind.entry(predicate.kind()).or_default() += 1;
            }
            usage.internal_nodes += 1;
        }
        usage
    }

    /// Internal nodes testing `kind`.
    pub fn count(&self, kind: PredicateKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Families in use with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (PredicateKind, usize)> + '_ {
        self.by_kind.iter().map(|(&k, &n)| (k, n))
    }

    /// Total internal nodes.
    pub fn internal_nodes(&self) -> usize {
        self.internal_nodes
    }
}

impl fmt::Display for PredicateUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, count) in self.iter() {
            writeln!(f, "{} : {} / {}", kind.name(), count, self.internal_nodes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Axis, Predicate, PredicateId};
    use crate::repr::Tree;

    #[test]
    fn counts_families_of_internal_nodes() {
        let pool = PredicatePool::new(vec![
            Predicate::PixelThreshold {
                pixel: 0,
                threshold: 25,
            },
            Predicate::LineColumn {
                axis: Axis::Row,
                line: 0,
                width: 2,
                min_dark: 1,
                threshold: 25,
            },
        ])
        .unwrap();
        let tree = Tree::from_parts(
            vec![PredicateId(1), PredicateId(0), PredicateId(0), PredicateId(0), PredicateId(0)],
            vec![1, 3, 0, 0, 0],
            vec![2, 4, 0, 0, 0],
            vec![false, false, true, true, true],
            vec![0; 5],
            vec![0; 5],
        )
        .unwrap();

        let usage = PredicateUsage::from_tree(&tree, &pool);
        assert_eq!(usage.internal_nodes(), 2);
        assert_eq!(usage.count(PredicateKind::PixelThreshold), 1);
        assert_eq!(usage.count(PredicateKind::LineColumn), 1);
        assert_eq!(usage.count(PredicateKind::DarkPixels), 0);
        assert_eq!(
            usage.to_string(),
            "PixelThreshold : 1 / 2\nLineColumn : 1 / 2\n"
        );
    }
}
