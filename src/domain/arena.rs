use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::entities::FlatRow;

/// Data payload for allocation tree nodes.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Unique identifier across the whole tree
    pub id: String,
    /// Display name, not semantically load-bearing
    pub label: String,
    /// Current allocation
    pub value: f64,
    /// Baseline allocation, fixed at construction
    pub original_value: f64,
    /// Percentage deviation of `value` from `original_value`, derived
    pub variance: f64,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.label)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Allocation data for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

/// Arena-based allocation tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Holds a forest: an ordered list of root nodes, matching a document of
/// top-level categories. `Clone` is the snapshot copy (structural, preserves
/// numeric payloads bit-exactly, including non-finite values).
#[derive(Debug, Clone, Default)]
pub struct AllocTree {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Indices of the root nodes, in display order
    roots: Vec<Index>,
}

impl AllocTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order iterator over the whole forest, roots left to right.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self, &self.roots)
    }

    /// Pre-order iterator over a single subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_subtree(&self, idx: Index) -> TreeIterator {
        TreeIterator::new(self, &[idx])
    }

    /// Post-order iterator: children are always yielded before their parent.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self, &self.roots)
    }

    /// Post-order iterator over a single subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_subtree_postorder(&self, idx: Index) -> PostOrderIterator {
        PostOrderIterator::new(self, &[idx])
    }

    /// Depth-first search for a node by id.
    #[instrument(level = "debug", skip(self))]
    pub fn find(&self, id: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.data.id == id)
            .map(|(idx, _)| idx)
    }

    /// Ancestor lineage of a node, nearest parent first, root last.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut path = Vec::new();
        let mut current = self.get_node(idx).and_then(|n| n.parent);
        while let Some(parent_idx) = current {
            path.push(parent_idx);
            current = self.get_node(parent_idx).and_then(|n| n.parent);
        }
        path
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    #[instrument(level = "trace", skip(self))]
    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Flattening projection: depth-annotated pre-order rows for display.
    ///
    /// Read-only, no mutation. A parent row comes immediately before its
    /// children's rows.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten(&self) -> Vec<FlatRow> {
        let mut rows = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(Index, usize)> =
            self.roots.iter().rev().map(|&idx| (idx, 0)).collect();

        while let Some((current_idx, depth)) = stack.pop() {
            if let Some(node) = self.get_node(current_idx) {
                rows.push(FlatRow {
                    id: node.data.id.clone(),
                    label: node.data.label.clone(),
                    value: node.data.value,
                    original_value: node.data.original_value,
                    variance: node.data.variance,
                    depth,
                    leaf: node.children.is_empty(),
                });
                for &child in node.children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        rows
    }

    /// Sum of root-level node values.
    #[instrument(level = "debug", skip(self))]
    pub fn grand_total(&self) -> f64 {
        self.roots
            .iter()
            .filter_map(|&idx| self.get_node(idx))
            .map(|node| node.data.value)
            .sum()
    }

    /// Sum of root-level baseline values.
    pub fn baseline_total(&self) -> f64 {
        self.roots
            .iter()
            .filter_map(|&idx| self.get_node(idx))
            .map(|node| node.data.original_value)
            .sum()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a AllocTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a AllocTree, starts: &[Index]) -> Self {
        let stack = starts.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a AllocTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a AllocTree, starts: &[Index]) -> Self {
        let stack = starts.iter().rev().map(|&idx| (idx, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
