use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::state::task_key;
use crate::ops::search;
use crate::tui::app::{App, FlatRow, Mode, View};

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Cancel search
        (_, KeyCode::Esc) => {
            app.mode = Mode::Navigate;
            app.search_input.clear();
        }

        // Execute search
        (_, KeyCode::Enter) => {
            let executed = !app.search_input.is_empty();
            if executed {
                app.ui.last_search = Some(app.search_input.clone());
                app.search_match_idx = 0;
            }
            app.mode = Mode::Navigate;
            app.search_input.clear();
            if executed {
                jump_to_match(app);
            }
        }

        // Backspace
        (_, KeyCode::Backspace) => {
            app.search_input.pop();
        }

        // Type character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.search_input.push(c);
        }

        _ => {}
    }
}

/// Deduplicated jump targets for the current search, in catalog order.
/// A target is a task row or, for substep-field hits, a substep row.
fn search_targets(app: &App) -> Vec<(String, u32, Option<u32>)> {
    let Some(re) = app.active_search_re() else {
        return Vec::new();
    };
    let mut targets: Vec<(String, u32, Option<u32>)> = Vec::new();
    for hit in search::search_catalog(&app.workspace.categories, &re) {
        let target = (hit.category, hit.step, hit.substep);
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}

/// Move the cursor to the current match, expanding whatever hides it.
pub(super) fn jump_to_match(app: &mut App) {
    if app.view != View::Tasks {
        return;
    }
    let targets = search_targets(app);
    if targets.is_empty() {
        app.status_message = Some("no matches".to_string());
        return;
    }
    let idx = app.search_match_idx.min(targets.len() - 1);
    app.search_match_idx = idx;
    let (category, step, substep) = targets[idx].clone();
    focus_target(app, &category, step, substep);
}

/// Advance to the next/previous match (wrapping) and move the cursor there.
pub(super) fn search_next(app: &mut App, direction: i32) {
    if app.view != View::Tasks {
        return;
    }
    let targets = search_targets(app);
    if targets.is_empty() {
        app.status_message = Some("no matches".to_string());
        return;
    }
    let len = targets.len() as i32;
    let next = (app.search_match_idx as i32 + direction).rem_euclid(len) as usize;
    app.search_match_idx = next;
    let (category, step, substep) = targets[next].clone();
    focus_target(app, &category, step, substep);
}

fn focus_target(app: &mut App, category: &str, step: u32, substep: Option<u32>) {
    app.ui.tasks.collapsed_categories.remove(category);
    if substep.is_some() {
        app.ui.tasks.expanded_tasks.insert(task_key(category, step));
    }
    let rows = app.build_flat_rows();
    let idx = rows.iter().position(|r| match (r, substep) {
        (
            FlatRow::Substep {
                category: c,
                step: s,
                substep: ss,
                ..
            },
            Some(target),
        ) => c == category && *s == step && *ss == target,
        (
            FlatRow::Task {
                category: c,
                step: s,
                ..
            },
            None,
        ) => c == category && *s == step,
        _ => false,
    });
    if let Some(idx) = idx {
        app.ui.tasks.cursor = idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::accrual::AccrualBook;
    use crate::model::config::{
        CatalogConfig, StatusConfig, UiConfig, WorkspaceConfig, WorkspaceInfo,
    };
    use crate::model::recon::ReconWorkspace;
    use crate::model::status::{Priority, TaskStatus};
    use crate::model::task::{Category, Substep, Task};
    use crate::model::workspace::Workspace;
    use std::path::PathBuf;

    fn press(app: &mut App, code: KeyCode) {
        handle_search(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn task(category: &str, step: u32, name: &str, subs: &[&str]) -> Task {
        let substeps = subs
            .iter()
            .enumerate()
            .map(|(i, sub_name)| Substep {
                main_step: step,
                main_step_name: name.to_string(),
                sub_step_number: (i + 1) as u32,
                sub_step_name: sub_name.to_string(),
                sub_step_description: String::new(),
                estimated_minutes: 5,
                requires_judgment: false,
                requires_system_access: false,
                requires_external_data: false,
                status: TaskStatus::Backlog,
                assigned_to: "Pip".to_string(),
                prepared_by: "Agent".to_string(),
                reviewed_by: "Controller".to_string(),
            })
            .collect();
        Task {
            category: category.to_string(),
            step_number: step,
            step_name: name.to_string(),
            description: String::new(),
            assigned_to: "Pip".to_string(),
            status: TaskStatus::Backlog,
            priority: Some(Priority::P3),
            estimated_minutes: 20,
            requires_approval: false,
            integration_required: false,
            required_integrations: Vec::new(),
            prepared_by: "Agent".to_string(),
            reviewed_by: "Controller".to_string(),
            substeps,
        }
    }

    fn sample_app() -> App {
        let mut cash = Category::new("Cash");
        cash.tasks.push(task("Cash", 1, "Post journals", &[]));
        cash.tasks
            .push(task("Cash", 2, "Reconcile bank", &["Pull feed", "Match items"]));
        let mut revenue = Category::new("Revenue");
        revenue.tasks.push(task("Revenue", 3, "Invoice runs", &[]));
        let workspace = Workspace {
            root: PathBuf::from("/tmp/close-test"),
            close_dir: PathBuf::from("/tmp/close-test/close"),
            config: WorkspaceConfig {
                workspace: WorkspaceInfo {
                    name: "test".to_string(),
                },
                catalog: CatalogConfig::default(),
                status: StatusConfig::default(),
                ui: UiConfig::default(),
            },
            categories: vec![cash, revenue],
        };
        let mut app = App::new(
            workspace,
            ReconWorkspace::default(),
            AccrualBook::default(),
        );
        app.mode = Mode::Search;
        app
    }

    #[test]
    fn typing_builds_query_and_backspace_edits() {
        let mut app = sample_app();
        type_str(&mut app, "rec");
        assert_eq!(app.search_input, "rec");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_input, "re");
    }

    #[test]
    fn esc_cancels_without_storing() {
        let mut app = sample_app();
        type_str(&mut app, "bank");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.search_input.is_empty());
        assert!(app.ui.last_search.is_none());
    }

    #[test]
    fn enter_stores_search_and_jumps_to_first_match() {
        let mut app = sample_app();
        type_str(&mut app, "invoice");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.ui.last_search.as_deref(), Some("invoice"));
        // Rows: Cash, task 1, task 2, Revenue, task 3
        assert_eq!(app.ui.tasks.cursor, 4);
    }

    #[test]
    fn substep_match_expands_the_parent_task() {
        let mut app = sample_app();
        type_str(&mut app, "pull feed");
        press(&mut app, KeyCode::Enter);
        assert!(app.ui.tasks.expanded_tasks.contains(&task_key("Cash", 2)));
        let rows = app.build_flat_rows();
        assert!(matches!(
            rows[app.ui.tasks.cursor],
            FlatRow::Substep {
                step: 2,
                substep: 1,
                ..
            }
        ));
    }

    #[test]
    fn match_in_collapsed_category_uncollapses_it() {
        let mut app = sample_app();
        app.ui
            .tasks
            .collapsed_categories
            .insert("Revenue".to_string());
        type_str(&mut app, "invoice");
        press(&mut app, KeyCode::Enter);
        assert!(!app.ui.tasks.collapsed_categories.contains("Revenue"));
        assert!(matches!(
            app.build_flat_rows()[app.ui.tasks.cursor],
            FlatRow::Task { step: 3, .. }
        ));
    }

    #[test]
    fn n_cycles_through_targets_and_wraps() {
        let mut app = sample_app();
        type_str(&mut app, "journals");
        press(&mut app, KeyCode::Enter);
        let first = app.ui.tasks.cursor;
        search_next(&mut app, 1);
        assert_eq!(app.ui.tasks.cursor, first); // single match wraps onto itself

        app.ui.last_search = Some("re".to_string());
        app.search_match_idx = 0;
        jump_to_match(&mut app);
        let start = app.ui.tasks.cursor;
        search_next(&mut app, 1);
        assert_ne!(app.ui.tasks.cursor, start);
    }

    #[test]
    fn no_match_sets_message() {
        let mut app = sample_app();
        type_str(&mut app, "zzzz");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status_message.as_deref(), Some("no matches"));
        assert_eq!(app.ui.tasks.cursor, 0);
    }

    #[test]
    fn search_outside_tasks_view_only_highlights() {
        let mut app = sample_app();
        app.view = View::Recon;
        type_str(&mut app, "bank");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.last_search.as_deref(), Some("bank"));
        assert_eq!(app.ui.tasks.cursor, 0);
    }
}
