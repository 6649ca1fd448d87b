//! Allocation service
//!
//! Owns the current tree snapshot and mediates between the CLI and the
//! domain engines. Holds the only process-wide state: the currently
//! displayed snapshot, replaced exclusively on successful edits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::edit::{apply_edit, EditRequest};
use crate::domain::{AllocTree, AllocationDoc, EditMode, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Status summary for the current snapshot.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Total node count
    pub nodes: usize,
    /// Maximum tree depth
    pub depth: usize,
    /// Sum of root-level current values
    pub grand_total: f64,
    /// Sum of root-level baseline values
    pub baseline_total: f64,
}

/// Service holding the current allocation snapshot.
pub struct AllocationService {
    source: PathBuf,
    current: AllocTree,
}

impl AllocationService {
    /// Load an allocation document and build the initial snapshot.
    ///
    /// The document passes through the filesystem boundary trait so the
    /// service stays testable without touching disk. Empty documents are
    /// rejected here; the domain itself accepts an empty forest.
    #[instrument(level = "debug", skip(fs))]
    pub fn load(fs: Arc<dyn FileSystem>, path: &Path) -> ApplicationResult<Self> {
        if !fs.is_file(path) {
            return Err(ApplicationError::io(
                format!("no such document: {}", path.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let content = fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::io(format!("read {}", path.display()), e))?;

        let doc = AllocationDoc::from_toml(&content)?;
        if doc.allocation.is_empty() {
            return Err(ApplicationError::EmptyDocument(path.to_path_buf()));
        }

        let current = TreeBuilder::new().build(doc.allocation)?;
        debug!(nodes = current.node_count(), "loaded allocation document");

        Ok(Self {
            source: path.to_path_buf(),
            current,
        })
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &AllocTree {
        &self.current
    }

    /// Path of the loaded document.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Apply an edit and swap in the new snapshot.
    ///
    /// A failed edit leaves the prior snapshot authoritative; nothing is
    /// replaced until the domain returned a consistent tree.
    #[instrument(level = "debug", skip(self))]
    pub fn edit(
        &mut self,
        target: &str,
        raw_input: &str,
        mode: EditMode,
        distribute: bool,
    ) -> ApplicationResult<()> {
        let request = EditRequest {
            target,
            raw_input,
            mode,
            distribute,
        };
        let next = apply_edit(&self.current, &request)?;
        self.current = next;
        Ok(())
    }

    /// Status summary of the current snapshot.
    pub fn summary(&self) -> Summary {
        Summary {
            nodes: self.current.node_count(),
            depth: self.current.depth(),
            grand_total: self.current.grand_total(),
            baseline_total: self.current.baseline_total(),
        }
    }
}
