use std::fs;
use std::path::{Path, PathBuf};

use crate::io::audit;
use crate::model::accrual::AccrualBook;
use crate::model::config::WorkspaceConfig;
use crate::model::recon::ReconWorkspace;
use crate::model::workspace::Workspace;
use crate::parse::{attach_substeps, parse_steps, parse_substeps, serialize_steps, serialize_substeps};

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a close workspace: no close/ directory found")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse close.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse close.toml: {0}")]
    ConfigSyntaxError(#[from] toml_edit::TomlError),
    #[error("could not serialize close.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("could not parse {path}: {source}")]
    DataParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the close workspace by walking up from the given directory,
/// looking for a `close/` subdirectory.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let close_dir = current.join("close");
        if close_dir.is_dir() && close_dir.join("close.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load a complete close workspace from the given root directory.
///
/// Catalog anomalies never fail the load; they land in the audit log and
/// the degraded rows stay on the board.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let close_dir = root.join("close");
    if !close_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }

    // Read and parse close.toml
    let config_path = close_dir.join("close.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: WorkspaceConfig = toml::from_str(&config_text)?;

    // Read catalog snapshots. A missing file is an empty catalog, not an error.
    let steps_path = close_dir.join(&config.catalog.steps_file);
    let steps_text = read_optional(&steps_path)?;
    let substeps_path = close_dir.join(&config.catalog.substeps_file);
    let substeps_text = read_optional(&substeps_path)?;

    let (mut categories, step_anomalies) = parse_steps(&steps_text);
    let (substeps, mut substep_anomalies) = parse_substeps(&substeps_text);
    substep_anomalies.extend(attach_substeps(&mut categories, substeps));

    audit::log_anomalies(&close_dir, &config.catalog.steps_file, &step_anomalies);
    audit::log_anomalies(&close_dir, &config.catalog.substeps_file, &substep_anomalies);

    Ok(Workspace {
        root: root.to_path_buf(),
        close_dir,
        config,
        categories,
    })
}

fn read_optional(path: &Path) -> Result<String, WorkspaceError> {
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save both catalog snapshot files back to disk
pub fn save_catalog(workspace: &Workspace) -> Result<(), WorkspaceError> {
    write_snapshot(
        &workspace.close_dir,
        &workspace.config.catalog.steps_file,
        serialize_steps(&workspace.categories),
    )?;
    write_snapshot(
        &workspace.close_dir,
        &workspace.config.catalog.substeps_file,
        serialize_substeps(&workspace.categories),
    )?;
    Ok(())
}

fn write_snapshot(close_dir: &Path, file: &str, content: String) -> Result<(), WorkspaceError> {
    let full_path = close_dir.join(file);
    if let Err(e) = audit::atomic_write(&full_path, content.as_bytes()) {
        audit::log_audit(
            close_dir,
            audit::AuditEntry {
                timestamp: chrono::Utc::now(),
                category: audit::AuditCategory::Write,
                description: "catalog write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), file.to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(WorkspaceError::WriteError {
            path: full_path,
            source: e,
        });
    }
    Ok(())
}

/// Load the reconciliation working set. A missing file is an empty set.
pub fn load_recon(workspace: &Workspace) -> Result<ReconWorkspace, WorkspaceError> {
    load_json(&workspace.recon_path())
}

/// Save the reconciliation working set back to disk
pub fn save_recon(workspace: &Workspace, recon: &ReconWorkspace) -> Result<(), WorkspaceError> {
    save_json(&workspace.close_dir, &workspace.recon_path(), recon)
}

/// Load the accrual ledger. A missing file is an empty ledger.
pub fn load_accruals(workspace: &Workspace) -> Result<AccrualBook, WorkspaceError> {
    load_json(&workspace.accruals_path())
}

/// Save the accrual ledger back to disk
pub fn save_accruals(workspace: &Workspace, book: &AccrualBook) -> Result<(), WorkspaceError> {
    save_json(&workspace.close_dir, &workspace.accruals_path(), book)
}

fn load_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, WorkspaceError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| WorkspaceError::DataParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn save_json<T: serde::Serialize>(
    close_dir: &Path,
    path: &Path,
    value: &T,
) -> Result<(), WorkspaceError> {
    let mut content = serde_json::to_string_pretty(value)
        .map_err(|e| WorkspaceError::DataParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    content.push('\n');
    if let Err(e) = audit::atomic_write(path, content.as_bytes()) {
        let file = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        audit::log_audit(
            close_dir,
            audit::AuditEntry {
                timestamp: chrono::Utc::now(),
                category: audit::AuditCategory::Write,
                description: format!("{} write failed", file),
                fields: vec![
                    ("Target".to_string(), file),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(WorkspaceError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}
