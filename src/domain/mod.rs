//! Domain layer: the allocation tree and its recalculation algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod calc;
pub mod edit;
pub mod entities;
pub mod error;

pub use arena::{AllocTree, NodeData, TreeNode};
pub use builder::TreeBuilder;
pub use edit::{apply_edit, EditRequest};
pub use entities::*;
pub use error::{DomainError, DomainResult};
