use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::task::DetailItem;

/// Which of the two reconciliation lists a value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSide {
    Bank,
    Gl,
}

impl Default for ListSide {
    fn default() -> Self {
        ListSide::Bank
    }
}

/// The one highlighted record across both reconciliation lists. Holding
/// side and id together makes the mutual exclusion structural: setting a
/// highlight on one side necessarily clears the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub side: ListSide,
    pub id: String,
}

/// Persisted TUI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Which view is showing ("tasks", "recon", "accruals")
    pub view: String,
    #[serde(default)]
    pub tasks: TasksUiState,
    #[serde(default)]
    pub recon: ReconUiState,
    #[serde(default)]
    pub accruals: AccrualsUiState,
    /// Last search pattern
    #[serde(default)]
    pub last_search: Option<String>,
}

/// Tasks view state: multi-expansion for categories and task rows,
/// single selection for the detail panel.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TasksUiState {
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub scroll_offset: usize,
    /// Collapsed category names (categories start expanded)
    #[serde(default)]
    pub collapsed_categories: HashSet<String>,
    /// Expanded task rows, keyed `category/step`
    #[serde(default)]
    pub expanded_tasks: HashSet<String>,
    /// What the detail panel shows, if open
    #[serde(default)]
    pub detail: Option<DetailItem>,
}

/// Reconciliation view state: two lists, one active side, at most one
/// highlighted record across both.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReconUiState {
    #[serde(default)]
    pub active_side: ListSide,
    #[serde(default)]
    pub bank_cursor: usize,
    #[serde(default)]
    pub bank_scroll: usize,
    #[serde(default)]
    pub gl_cursor: usize,
    #[serde(default)]
    pub gl_scroll: usize,
    #[serde(default)]
    pub highlight: Option<Highlight>,
}

/// Accruals view state
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccrualsUiState {
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub scroll_offset: usize,
    /// Status label filter ("pending", "complete", ...), None shows all
    #[serde(default)]
    pub status_filter: Option<String>,
}

/// Expansion-set key for a task row. Step numbers repeat across
/// categories, so the key carries both.
pub fn task_key(category: &str, step: u32) -> String {
    format!("{}/{}", category, step)
}

/// Read .state.json from the close directory
pub fn read_ui_state(close_dir: &Path) -> Option<UiState> {
    let path = close_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the close directory
pub fn write_ui_state(close_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = close_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
