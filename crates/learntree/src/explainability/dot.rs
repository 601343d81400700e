//! Graphviz DOT export.

use std::fmt::Write;

use crate::predicate::PredicatePool;
use crate::repr::{NodeId, TreeView};

/// Render a tree as a Graphviz `digraph`.
///
/// Internal nodes are boxes showing the predicate and example count; leaves
/// are ellipses showing the label. Edges are labelled `yes` (left) and `no`
/// (right).
pub fn to_dot<T: TreeView + ?Sized>(tree: &T, pool: &PredicatePool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render(tree, pool, &mut out);
    out
}

fn render<T: TreeView + ?Sized>(
    tree: &T,
    pool: &PredicatePool,
    out: &mut String,
) -> std::fmt::Result {
    writeln!(out, "digraph tree {{")?;
    writeln!(out, "  node [fontname=\"Helvetica\"];")?;

    for node in 0..tree.n_nodes() as NodeId {
        let count = tree.node_count(node);
        if tree.is_leaf(node) {
            writeln!(
                out,
                "  n{node} [shape=ellipse, label=\"{}\\n{count} examples\"];",
                tree.node_label(node)
            )?;
            continue;
        }

        let id = tree.split_predicate(node);
        let text = pool
            .get(id)
            .map(|p| p.to_string())
            .unwrap_or_else(|| format!("predicate {id}"));
        writeln!(
            out,
            "  n{node} [shape=box, label=\"{}\\n{count} examples\"];",
            escape(&text)
        )?;
        writeln!(out, "  n{node} -> n{} [label=\"yes\"];", tree.left_child(node))?;
        writeln!(out, "  n{node} -> n{} [label=\"no\"];", tree.right_child(node))?;
    }

    writeln!(out, "}}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateId};
    use crate::repr::Tree;

    #[test]
    fn renders_nodes_and_edges() {
        let tree = Tree::from_parts(
            vec![PredicateId(0); 3],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![false, true, true],
            vec![3, 3, 8],
            vec![5, 3, 2],
        )
        .unwrap();
        let pool = PredicatePool::new(vec![Predicate::PixelThreshold {
            pixel: 12,
            threshold: 25,
        }])
        .unwrap();

        let dot = to_dot(&tree, &pool);
        assert!(dot.starts_with("digraph tree {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("n0 [shape=box, label=\"pixel[12] > 25\\n5 examples\"]"));
        assert!(dot.contains("n0 -> n1 [label=\"yes\"]"));
        assert!(dot.contains("n0 -> n2 [label=\"no\"]"));
        assert!(dot.contains("n2 [shape=ellipse, label=\"8\\n2 examples\"]"));
    }

    #[test]
    fn leaf_only_tree() {
        let tree = Tree::leaf(4, 9);
        let pool = PredicatePool::new(vec![Predicate::DarkPixels {
            min_dark: 1,
            threshold: 0,
        }])
        .unwrap();
        let dot = to_dot(&tree, &pool);
        assert!(dot.contains("n0 [shape=ellipse"));
        assert!(!dot.contains("->"));
    }
}
