use std::path::PathBuf;

use super::config::WorkspaceConfig;
use super::task::Category;

/// A fully loaded close workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of `close/`)
    pub root: PathBuf,
    /// Path to the `close/` directory
    pub close_dir: PathBuf,
    /// Parsed close.toml
    pub config: WorkspaceConfig,
    /// Loaded task catalog, categories in catalog order
    pub categories: Vec<Category>,
}

impl Workspace {
    /// Path to the steps snapshot file
    pub fn steps_path(&self) -> PathBuf {
        self.close_dir.join(&self.config.catalog.steps_file)
    }

    /// Path to the substeps snapshot file
    pub fn substeps_path(&self) -> PathBuf {
        self.close_dir.join(&self.config.catalog.substeps_file)
    }

    /// Path to the reconciliation working set
    pub fn recon_path(&self) -> PathBuf {
        self.close_dir.join("recon.json")
    }

    /// Path to the accrual ledger
    pub fn accruals_path(&self) -> PathBuf {
        self.close_dir.join("accruals.json")
    }
}
