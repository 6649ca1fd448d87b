//! Tree builder: constructs allocation trees from declarative specs.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{AllocTree, NodeData};
use crate::domain::calc::{aggregate_all, compute_variance_all};
use crate::domain::entities::NodeSpec;
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs fully aggregated allocation trees from node specs.
pub struct TreeBuilder {
    seen_ids: HashSet<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
        }
    }

    /// Build a tree from top-level specs.
    ///
    /// Validates id uniqueness across the whole forest and finiteness of all
    /// spec values, inserts nodes preserving child order, then runs full
    /// bottom-up aggregation and tree-wide variance. A declared internal
    /// value that disagrees with its children's sum is overwritten by
    /// aggregation; the declared baseline stays, so the initial variance
    /// reflects the drift.
    ///
    /// An empty spec list builds an empty forest.
    #[instrument(level = "debug", skip(self, specs))]
    pub fn build(&mut self, specs: Vec<NodeSpec>) -> TreeResult<AllocTree> {
        self.seen_ids.clear();

        let mut tree = AllocTree::new();
        let mut stack: Vec<(NodeSpec, Option<Index>)> =
            specs.into_iter().rev().map(|spec| (spec, None)).collect();

        while let Some((spec, parent_idx)) = stack.pop() {
            if !self.seen_ids.insert(spec.id.clone()) {
                return Err(DomainError::DuplicateNodeId(spec.id));
            }

            let original_value = spec.original_value.unwrap_or(spec.value);
            for candidate in [spec.value, original_value] {
                if !candidate.is_finite() {
                    return Err(DomainError::InvalidSpecValue {
                        id: spec.id.clone(),
                        value: candidate,
                    });
                }
            }

            let node_data = NodeData {
                id: spec.id,
                label: spec.label,
                value: spec.value,
                original_value,
                variance: 0.0,
            };
            let current_idx = tree.insert_node(node_data, parent_idx);

            // Reverse so children pop in display order
            for child in spec.children.into_iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        aggregate_all(&mut tree);
        compute_variance_all(&mut tree);

        Ok(tree)
    }
}
