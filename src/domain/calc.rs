//! Recalculation engines for allocation trees.
//!
//! Four algorithms keep a tree internally consistent:
//! - `aggregate` — bottom-up: internal values become the sum of their children
//! - `compute_variance` — per-node deviation from the immutable baseline
//! - `distribute` — top-down proportional split of a new total
//! - `resync_ancestors` — single-level lineage recompute after an edit
//!
//! All engines mutate node values through the arena; borrows are handled by
//! collecting child indices before writing.

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::AllocTree;

/// Bottom-up aggregation of a subtree.
///
/// A leaf keeps its value unchanged. An internal node gets the sum of its
/// children assigned to `value`. Walks in post-order, so every child is
/// final before its parent is summed. Returns the subtree total. Runs at
/// tree construction; edits use the cheaper `resync_ancestors` instead.
#[instrument(level = "trace", skip(tree))]
pub fn aggregate(tree: &mut AllocTree, idx: Index) -> f64 {
    let order: Vec<Index> = tree.iter_subtree_postorder(idx).map(|(i, _)| i).collect();
    aggregate_in_order(tree, &order);
    tree.get_node(idx).map_or(0.0, |node| node.data.value)
}

/// Aggregate every root of the forest, leaves first.
#[instrument(level = "debug", skip(tree))]
pub fn aggregate_all(tree: &mut AllocTree) {
    let order: Vec<Index> = tree.iter_postorder().map(|(i, _)| i).collect();
    aggregate_in_order(tree, &order);
}

fn aggregate_in_order(tree: &mut AllocTree, order: &[Index]) {
    for &i in order {
        let children = match tree.get_node(i) {
            Some(node) if !node.children.is_empty() => node.children.clone(),
            _ => continue,
        };
        let sum: f64 = children
            .iter()
            .filter_map(|&child| tree.get_node(child))
            .map(|node| node.data.value)
            .sum();
        if let Some(node) = tree.get_node_mut(i) {
            node.data.value = sum;
        }
    }
}

/// Recompute `variance` for every node in a subtree.
///
/// `variance = (value - original_value) / original_value * 100`. A zero
/// baseline yields the IEEE result (±Inf, NaN for 0/0) rather than an error;
/// consumers treat non-finite variance as undefined.
#[instrument(level = "trace", skip(tree))]
pub fn compute_variance(tree: &mut AllocTree, idx: Index) {
    let indices: Vec<Index> = tree.iter_subtree(idx).map(|(i, _)| i).collect();
    for i in indices {
        if let Some(node) = tree.get_node_mut(i) {
            node.data.variance =
                (node.data.value - node.data.original_value) / node.data.original_value * 100.0;
        }
    }
}

/// Recompute `variance` tree-wide.
///
/// Deliberately wholesale after every edit: correctness over efficiency,
/// trees are small.
#[instrument(level = "debug", skip(tree))]
pub fn compute_variance_all(tree: &mut AllocTree) {
    for root in tree.roots().to_vec() {
        compute_variance(tree, root);
    }
}

/// Top-down proportional distribution of a new total.
///
/// A leaf is assigned `new_value` directly. An internal node is assigned
/// `new_value`, and each child recurses with its share of the pre-edit child
/// total: `new_value * (child_old_value / old_total)`. This preserves each
/// child's proportional share exactly, down to leaves, in one pass.
///
/// `old_total == 0` follows IEEE division (NaN/±Inf propagate into the
/// subtree, which stays explicitly undefined until the next edit).
#[instrument(level = "trace", skip(tree))]
pub fn distribute(tree: &mut AllocTree, idx: Index, new_value: f64) {
    let children = match tree.get_node(idx) {
        Some(node) => node.children.clone(),
        None => return,
    };

    if children.is_empty() {
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.value = new_value;
        }
        return;
    }

    let old_total: f64 = children
        .iter()
        .filter_map(|&child| tree.get_node(child))
        .map(|node| node.data.value)
        .sum();

    if let Some(node) = tree.get_node_mut(idx) {
        node.data.value = new_value;
    }

    for child in children {
        let old_value = match tree.get_node(child) {
            Some(node) => node.data.value,
            None => continue,
        };
        let ratio = old_value / old_total;
        trace!(?child, old_value, ratio, "distributing share");
        distribute(tree, child, new_value * ratio);
    }
}

/// Single-level resync of an edited node's lineage.
///
/// `path` is the ancestor sequence nearest parent first. Each ancestor's
/// value becomes the sum of its immediate children's current values; no
/// recursion into grandchildren, since every child was already made
/// consistent before its parent is visited. O(depth) work.
#[instrument(level = "trace", skip(tree))]
pub fn resync_ancestors(tree: &mut AllocTree, path: &[Index]) {
    for &ancestor in path {
        let children = match tree.get_node(ancestor) {
            Some(node) => node.children.clone(),
            None => continue,
        };
        let sum: f64 = children
            .iter()
            .filter_map(|&child| tree.get_node(child))
            .map(|node| node.data.value)
            .sum();
        if let Some(node) = tree.get_node_mut(ancestor) {
            node.data.value = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::NodeData;

    fn data(id: &str, value: f64) -> NodeData {
        NodeData {
            id: id.to_string(),
            label: id.to_string(),
            value,
            original_value: value,
            variance: 0.0,
        }
    }

    /// root(0) -> [a(100), b(300)]
    fn small_tree() -> (AllocTree, Index, Index, Index) {
        let mut tree = AllocTree::new();
        let root = tree.insert_node(data("root", 0.0), None);
        let a = tree.insert_node(data("a", 100.0), Some(root));
        let b = tree.insert_node(data("b", 300.0), Some(root));
        (tree, root, a, b)
    }

    #[test]
    fn aggregate_sums_children_into_parent() {
        let (mut tree, root, _, _) = small_tree();

        let total = aggregate(&mut tree, root);

        assert_eq!(total, 400.0);
        assert_eq!(tree.get_node(root).unwrap().data.value, 400.0);
    }

    #[test]
    fn aggregate_leaves_leaf_values_untouched() {
        let mut tree = AllocTree::new();
        let leaf = tree.insert_node(data("leaf", 42.0), None);

        assert_eq!(aggregate(&mut tree, leaf), 42.0);
        assert_eq!(tree.get_node(leaf).unwrap().data.value, 42.0);
    }

    #[test]
    fn variance_reflects_deviation_from_baseline() {
        let (mut tree, root, a, _) = small_tree();
        tree.get_node_mut(a).unwrap().data.value = 110.0;

        compute_variance(&mut tree, root);

        let variance = tree.get_node(a).unwrap().data.variance;
        assert!((variance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn variance_with_zero_baseline_is_non_finite() {
        let mut tree = AllocTree::new();
        let mut d = data("zero", 5.0);
        d.original_value = 0.0;
        let idx = tree.insert_node(d, None);

        compute_variance(&mut tree, idx);

        assert!(!tree.get_node(idx).unwrap().data.variance.is_finite());
    }

    #[test]
    fn variance_is_idempotent() {
        let (mut tree, root, a, _) = small_tree();
        tree.get_node_mut(a).unwrap().data.value = 150.0;

        compute_variance(&mut tree, root);
        let first: Vec<f64> = tree.iter().map(|(_, n)| n.data.variance).collect();
        compute_variance(&mut tree, root);
        let second: Vec<f64> = tree.iter().map(|(_, n)| n.data.variance).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn distribute_preserves_child_ratios() {
        let (mut tree, root, a, b) = small_tree();
        aggregate(&mut tree, root);

        distribute(&mut tree, root, 800.0);

        assert_eq!(tree.get_node(root).unwrap().data.value, 800.0);
        assert_eq!(tree.get_node(a).unwrap().data.value, 200.0);
        assert_eq!(tree.get_node(b).unwrap().data.value, 600.0);
    }

    #[test]
    fn distribute_conserves_total_across_children() {
        let (mut tree, root, a, b) = small_tree();
        aggregate(&mut tree, root);

        distribute(&mut tree, root, 777.0);

        let sum = tree.get_node(a).unwrap().data.value + tree.get_node(b).unwrap().data.value;
        assert!((sum - 777.0).abs() < 1e-9);
    }

    #[test]
    fn distribute_into_zero_total_propagates_non_finite() {
        let mut tree = AllocTree::new();
        let root = tree.insert_node(data("root", 0.0), None);
        tree.insert_node(data("a", 0.0), Some(root));
        let b = tree.insert_node(data("b", 0.0), Some(root));

        distribute(&mut tree, root, 100.0);

        // 0/0 ratio: the subtree is explicitly undefined, never silently plausible
        assert!(!tree.get_node(b).unwrap().data.value.is_finite());
        assert_eq!(tree.get_node(root).unwrap().data.value, 100.0);
    }

    #[test]
    fn resync_recomputes_lineage_nearest_parent_first() {
        let mut tree = AllocTree::new();
        let root = tree.insert_node(data("root", 0.0), None);
        let mid = tree.insert_node(data("mid", 0.0), Some(root));
        let leaf = tree.insert_node(data("leaf", 100.0), Some(mid));
        tree.insert_node(data("sibling", 50.0), Some(root));
        aggregate_all(&mut tree);

        tree.get_node_mut(leaf).unwrap().data.value = 250.0;
        let path = tree.ancestors(leaf);
        resync_ancestors(&mut tree, &path);

        assert_eq!(tree.get_node(mid).unwrap().data.value, 250.0);
        assert_eq!(tree.get_node(root).unwrap().data.value, 300.0);
    }
}
