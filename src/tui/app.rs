use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use regex::Regex;

use crate::io::state::{UiState, read_ui_state, task_key, write_ui_state};
use crate::io::watcher::CloseWatcher;
use crate::io::workspace_io::{self, discover_workspace, load_workspace};
use crate::model::accrual::AccrualBook;
use crate::model::recon::ReconWorkspace;
use crate::model::task::{Substep, Task};
use crate::model::workspace::Workspace;
use crate::ops::status_ops::StatusTarget;

use super::input;
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Task catalog grouped by category
    Tasks,
    /// Bank feed and GL extract side by side
    Recon,
    /// Accrual ledger
    Accruals,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Search,
    StatusPicker,
}

/// An open status picker: what it targets and which status is selected.
#[derive(Debug, Clone)]
pub struct StatusPickerState {
    pub target: StatusTarget,
    /// Index into `TaskStatus::all()`
    pub selected: usize,
}

/// A flattened row in the tasks view's visible list
#[derive(Debug, Clone, PartialEq)]
pub enum FlatRow {
    Category {
        name: String,
        collapsed: bool,
    },
    Task {
        category: String,
        step: u32,
        has_substeps: bool,
        expanded: bool,
    },
    Substep {
        category: String,
        step: u32,
        substep: u32,
        is_last: bool,
    },
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    pub recon: ReconWorkspace,
    pub accruals: AccrualBook,
    pub view: View,
    pub mode: Mode,
    /// Persisted view state (cursors, scroll, expansion, highlight). Held
    /// live and written back to .state.json on save.
    pub ui: UiState,
    pub theme: Theme,
    pub should_quit: bool,
    /// First Q of the QQ quit sequence seen
    pub quit_pending: bool,
    /// Consecutive Esc presses (for the quit hint)
    pub esc_streak: u32,
    /// Help overlay visible
    pub show_help: bool,
    pub help_scroll: usize,
    /// Audit log overlay visible
    pub show_audit: bool,
    /// Rendered markdown lines of the audit log (filled when opened)
    pub audit_lines: Vec<String>,
    pub audit_scroll: usize,
    /// Wrapped line count from the last audit render, for scroll clamping
    pub audit_wrapped_count: usize,
    /// Search mode: current query being typed
    pub search_input: String,
    /// Current search match index (for n/N cycling)
    pub search_match_idx: usize,
    /// Open status picker, if any
    pub status_picker: Option<StatusPickerState>,
    /// One-line message for the status row
    pub status_message: Option<String>,
    pub status_is_error: bool,
    /// A file change arrived while a prompt was open
    pub pending_reload: bool,
}

impl App {
    pub fn new(workspace: Workspace, recon: ReconWorkspace, accruals: AccrualBook) -> Self {
        let theme = Theme::from_config(&workspace.config.ui.colors);

        App {
            workspace,
            recon,
            accruals,
            view: View::Tasks,
            mode: Mode::Navigate,
            ui: UiState::default(),
            theme,
            should_quit: false,
            quit_pending: false,
            esc_streak: 0,
            show_help: false,
            help_scroll: 0,
            show_audit: false,
            audit_lines: Vec::new(),
            audit_scroll: 0,
            audit_wrapped_count: 0,
            search_input: String::new(),
            search_match_idx: 0,
            status_picker: None,
            status_message: None,
            status_is_error: false,
            pending_reload: false,
        }
    }

    /// Completed and total task counts across all categories, for the tab bar.
    pub fn tasks_completion(&self) -> (usize, usize) {
        self.workspace
            .categories
            .iter()
            .map(|c| c.completion())
            .fold((0, 0), |(d, t), (cd, ct)| (d + cd, t + ct))
    }

    /// Build the flat list of visible rows for the tasks view.
    pub fn build_flat_rows(&self) -> Vec<FlatRow> {
        let mut rows = Vec::new();
        for category in &self.workspace.categories {
            let collapsed = self.ui.tasks.collapsed_categories.contains(&category.name);
            rows.push(FlatRow::Category {
                name: category.name.clone(),
                collapsed,
            });
            if collapsed {
                continue;
            }
            for task in &category.tasks {
                let has_substeps = !task.substeps.is_empty();
                let key = task_key(&category.name, task.step_number);
                let expanded = has_substeps && self.ui.tasks.expanded_tasks.contains(&key);
                rows.push(FlatRow::Task {
                    category: category.name.clone(),
                    step: task.step_number,
                    has_substeps,
                    expanded,
                });
                if expanded {
                    let count = task.substeps.len();
                    for (i, sub) in task.substeps.iter().enumerate() {
                        rows.push(FlatRow::Substep {
                            category: category.name.clone(),
                            step: task.step_number,
                            substep: sub.sub_step_number,
                            is_last: i == count - 1,
                        });
                    }
                }
            }
        }
        rows
    }

    /// Look up a task by category name and step number.
    pub fn resolve_task(&self, category: &str, step: u32) -> Option<&Task> {
        self.workspace
            .categories
            .iter()
            .find(|c| c.name == category)?
            .tasks
            .iter()
            .find(|t| t.step_number == step)
    }

    /// Look up a substep by category name, step, and substep number.
    pub fn resolve_substep(&self, category: &str, step: u32, substep: u32) -> Option<&Substep> {
        self.resolve_task(category, step)?.substep(substep)
    }

    /// Accrual entries after applying the view's status filter.
    pub fn filtered_accruals(&self) -> Vec<&crate::model::accrual::AccrualEntry> {
        let status = self
            .ui
            .accruals
            .status_filter
            .as_deref()
            .and_then(crate::model::status::AccrualStatus::from_label);
        let criteria = crate::model::accrual::AccrualFilter {
            status,
            ..Default::default()
        };
        crate::ops::accrual_ops::filter_entries(&self.accruals, &criteria)
    }

    /// Get the active search regex for highlighting.
    /// In Search mode: compiles from current input. In Navigate: compiles from last_search.
    pub fn active_search_re(&self) -> Option<Regex> {
        let pattern = match self.mode {
            Mode::Search if !self.search_input.is_empty() => &self.search_input,
            Mode::Navigate => self.ui.last_search.as_deref()?,
            _ => return None,
        };
        Regex::new(&format!("(?i){}", pattern))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
            .ok()
    }

    /// Re-read the catalog, recon, and accrual files from disk. Keeps the
    /// current UI state; rows are re-clamped at render time.
    pub fn reload_workspace(&mut self) {
        match load_workspace(&self.workspace.root) {
            Ok(workspace) => {
                self.theme = Theme::from_config(&workspace.config.ui.colors);
                self.recon = workspace_io::load_recon(&workspace).unwrap_or_default();
                self.accruals = workspace_io::load_accruals(&workspace).unwrap_or_default();
                self.workspace = workspace;
                self.status_message = Some("workspace reloaded".to_string());
                self.status_is_error = false;
            }
            Err(e) => {
                self.status_message = Some(format!("reload failed: {}", e));
                self.status_is_error = true;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UI state persistence
// ---------------------------------------------------------------------------

fn view_label(view: View) -> &'static str {
    match view {
        View::Tasks => "tasks",
        View::Recon => "recon",
        View::Accruals => "accruals",
    }
}

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    let Some(ui_state) = read_ui_state(&app.workspace.close_dir) else {
        return;
    };

    app.view = match ui_state.view.as_str() {
        "recon" => View::Recon,
        "accruals" => View::Accruals,
        _ => View::Tasks,
    };
    app.ui = ui_state;
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    let mut ui_state = app.ui.clone();
    ui_state.view = view_label(app.view).to_string();
    let _ = write_ui_state(&app.workspace.close_dir, &ui_state);
}

// ---------------------------------------------------------------------------
// Entry point and event loop
// ---------------------------------------------------------------------------

/// Run the TUI application
pub fn run(workspace_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match workspace_dir {
        Some(dir) => PathBuf::from(dir)
            .canonicalize()
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&start)?;
    let workspace = load_workspace(&root)?;
    let recon = workspace_io::load_recon(&workspace).unwrap_or_default();
    let accruals = workspace_io::load_accruals(&workspace).unwrap_or_default();

    let mut app = App::new(workspace, recon, accruals);

    // Restore saved UI state
    restore_ui_state(&mut app);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Kitty keyboard protocol gives us Shift+symbol disambiguation; opt-out
    // via [ui] kitty_keyboard = false.
    let kitty = app.workspace.config.ui.kitty_keyboard.unwrap_or(true)
        && crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if kitty {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if kitty {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Watch the close/ directory so external edits show up without restarting
    let watcher = CloseWatcher::start(&app.workspace.close_dir).ok();

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Save UI state before exit
    save_ui_state(&app);

    // Restore terminal
    if kitty {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&CloseWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            if app.mode == Mode::Navigate {
                app.reload_workspace();
            } else {
                app.pending_reload = true;
            }
        }

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        // A reload deferred during Search or StatusPicker runs once back in Navigate
        if app.pending_reload && app.mode == Mode::Navigate {
            app.pending_reload = false;
            app.reload_workspace();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
