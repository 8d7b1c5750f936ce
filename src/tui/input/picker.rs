use crossterm::event::{KeyCode, KeyEvent};

use crate::io::audit;
use crate::io::lock::FileLock;
use crate::io::workspace_io::save_catalog;
use crate::model::status::TaskStatus;
use crate::ops::status_ops::{self, ChangedEntity};
use crate::tui::app::{App, Mode};

/// Key handling while the status picker popup is open. Every key is
/// consumed here; nothing falls through to the view underneath.
pub(super) fn handle_status_picker(app: &mut App, key: KeyEvent) {
    if app.status_picker.is_none() {
        app.mode = Mode::Navigate;
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.status_picker = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(p) = app.status_picker.as_mut() {
                p.selected = (p.selected + 1).min(TaskStatus::all().len() - 1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(p) = app.status_picker.as_mut() {
                p.selected = p.selected.saturating_sub(1);
            }
        }
        KeyCode::Enter => {
            apply_status_choice(app);
        }
        _ => {}
    }
}

fn apply_status_choice(app: &mut App) {
    let Some(picker) = app.status_picker.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    let new_status = TaskStatus::all()[picker.selected.min(TaskStatus::all().len() - 1)];

    let rollup = &app.workspace.config.status.rollup;
    let Some(policy) = status_ops::rollup_policy(rollup) else {
        app.status_message = Some(format!("unknown rollup policy '{}'", rollup));
        app.status_is_error = true;
        return;
    };

    let outcome = status_ops::update_status(
        &app.workspace.categories,
        picker.target,
        new_status,
        policy.as_ref(),
    );
    let Some(changed) = outcome.changed else {
        app.status_message = Some("no matching task".to_string());
        app.status_is_error = true;
        return;
    };
    app.workspace.categories = outcome.categories;

    // Persist under the workspace lock; the in-memory change stays either way
    let persisted = FileLock::acquire_default(&app.workspace.close_dir)
        .map_err(|e| e.to_string())
        .and_then(|_lock| save_catalog(&app.workspace).map_err(|e| e.to_string()));
    if let Err(e) = persisted {
        app.status_message = Some(format!("save failed: {}", e));
        app.status_is_error = true;
        return;
    }

    // The catalog changed on disk while the popup was open; this write was
    // built from the pre-change snapshot and has overwritten those edits.
    // The deferred reload converges the board, the log keeps the record.
    if app.pending_reload {
        audit::log_audit(
            &app.workspace.close_dir,
            audit::AuditEntry {
                timestamp: chrono::Utc::now(),
                category: audit::AuditCategory::Conflict,
                description: "stale status write".to_string(),
                fields: vec![(
                    "Target".to_string(),
                    app.workspace.config.catalog.steps_file.clone(),
                )],
                body: String::new(),
            },
        );
    }

    app.status_message = Some(describe_change(&changed, new_status, policy.name()));
}

fn describe_change(changed: &ChangedEntity, new_status: TaskStatus, policy_name: &str) -> String {
    match changed {
        ChangedEntity::Task {
            category,
            step,
            from,
        } => {
            format!("{}/{}: {} → {}", category, step, from.label(), new_status.label())
        }
        ChangedEntity::Substep {
            category,
            step,
            substep,
            from,
            parent_status,
        } => {
            let mut msg = format!(
                "{}/{}.{}: {} → {}",
                category,
                step,
                substep,
                from.label(),
                new_status.label()
            );
            if new_status == TaskStatus::Completed
                && *parent_status == TaskStatus::Completed
                && policy_name == "complete-parent"
            {
                msg.push_str(&format!(" (step {} completed)", step));
            }
            msg
        }
    }
}
