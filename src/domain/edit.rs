//! Edit orchestration: the single entry point for changing an allocation.
//!
//! An edit never mutates the tree it is given. It clones the snapshot,
//! mutates the private copy, and returns it; any failure leaves the caller's
//! snapshot untouched. After the target is located no failure path remains,
//! so success is atomic for any located node.

use tracing::{debug, instrument};

use crate::domain::arena::AllocTree;
use crate::domain::calc::{compute_variance_all, distribute, resync_ancestors};
use crate::domain::entities::EditMode;
use crate::domain::error::{DomainError, DomainResult};

/// A single user intent against the tree.
#[derive(Debug, Clone)]
pub struct EditRequest<'a> {
    /// Id of the node to edit
    pub target: &'a str,
    /// Unparsed input text; all numeric validation happens here, not in callers
    pub raw_input: &'a str,
    /// How `raw_input` is interpreted
    pub mode: EditMode,
    /// Redistribute the new value across descendants, preserving ratios
    pub distribute: bool,
}

/// Parse raw input text into a finite number.
pub fn parse_amount(raw: &str) -> DomainResult<f64> {
    let trimmed = raw.trim();
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| DomainError::InvalidInput(trimmed.to_string()))?;
    if !parsed.is_finite() {
        return Err(DomainError::InvalidInput(trimmed.to_string()));
    }
    Ok(parsed)
}

/// Apply an edit and return the new snapshot.
///
/// 1. Validate the raw input parses to a finite number.
/// 2. Clone the tree (structural arena copy).
/// 3. Locate the target by depth-first search; read its ancestor path off
///    the parent links, nearest parent first.
/// 4. Compute the new value per mode.
/// 5. Distribute if requested and the node has children, else assign
///    directly (the only path for leaves).
/// 6. Resync the ancestor path, then recompute variance tree-wide.
#[instrument(level = "debug", skip(tree))]
pub fn apply_edit(tree: &AllocTree, request: &EditRequest) -> DomainResult<AllocTree> {
    let amount = parse_amount(request.raw_input)?;

    let mut next = tree.clone();

    let target_idx = next
        .find(request.target)
        .ok_or_else(|| DomainError::NodeNotFound(request.target.to_string()))?;
    let path = next.ancestors(target_idx);

    let (current, has_children) = match next.get_node(target_idx) {
        Some(node) => (node.data.value, !node.children.is_empty()),
        None => return Err(DomainError::NodeNotFound(request.target.to_string())),
    };

    let new_value = match request.mode {
        EditMode::Percentage => current + current * amount / 100.0,
        EditMode::Absolute => amount,
    };
    debug!(target = request.target, current, new_value, "applying edit");

    if request.distribute && has_children {
        distribute(&mut next, target_idx, new_value);
    } else if let Some(node) = next.get_node_mut(target_idx) {
        node.data.value = new_value;
    }

    resync_ancestors(&mut next, &path);
    compute_variance_all(&mut next);

    Ok(next)
}
