use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from close.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// HTTP endpoint serving `{ steps, substeps }`; unset disables `cb fetch`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_steps_file")]
    pub steps_file: String,
    #[serde(default = "default_substeps_file")]
    pub substeps_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            endpoint: None,
            steps_file: default_steps_file(),
            substeps_file: default_substeps_file(),
        }
    }
}

fn default_steps_file() -> String {
    "data/steps.csv".to_string()
}

fn default_substeps_file() -> String {
    "data/substeps.csv".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Substep roll-up policy: "independent" or "complete-parent"
    #[serde(default = "default_rollup")]
    pub rollup: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            rollup: default_rollup(),
        }
    }
}

fn default_rollup() -> String {
    "independent".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub show_key_hints: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Kitty keyboard protocol: true = force on, false = force off, absent = on (default).
    /// Disable if your terminal has issues with enhanced key reporting.
    #[serde(default)]
    pub kitty_keyboard: Option<bool>,
}
