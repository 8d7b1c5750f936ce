use std::fs;
use std::path::Path;

use crate::io::workspace_io::WorkspaceError;
use crate::model::config::WorkspaceConfig;

/// Read the workspace config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(
    close_dir: &Path,
) -> Result<(WorkspaceConfig, toml_edit::DocumentMut), WorkspaceError> {
    let config_path = close_dir.join("close.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    // Syntax errors surface from the document parse; the typed parse then
    // only adds schema failures (missing or mistyped keys).
    let doc: toml_edit::DocumentMut = config_text.parse::<toml_edit::DocumentMut>()?;
    let config: WorkspaceConfig = toml::from_str(&config_text)?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(close_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = close_dir.join("close.toml");
    fs::write(&config_path, doc.to_string()).map_err(|e| WorkspaceError::WriteError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

/// Update the catalog endpoint in the config document
pub fn set_endpoint(doc: &mut toml_edit::DocumentMut, url: &str) {
    if !doc.contains_key("catalog") {
        doc["catalog"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["catalog"]["endpoint"] = toml_edit::value(url);
}
