use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::audit::read_audit_entries;
use crate::io::state::{Highlight, ListSide, task_key};
use crate::model::status::TaskStatus;
use crate::model::task::DetailItem;
use crate::ops::recon_ops;
use crate::ops::status_ops::StatusTarget;
use crate::tui::app::{App, FlatRow, Mode, StatusPickerState, View};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc, plus scroll keys
    if app.show_help {
        match key.code {
            KeyCode::Char('?') | KeyCode::Esc => {
                app.show_help = false;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                app.help_scroll = app.help_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                app.help_scroll = 0;
            }
            KeyCode::Char('G') => {
                app.help_scroll = usize::MAX;
            }
            _ => {}
        }
        return;
    }

    // Clear any transient status message on keypress
    app.status_message = None;
    app.status_is_error = false;

    // Track consecutive Esc presses; show quit hint after 5
    if matches!(key.code, KeyCode::Esc) {
        app.esc_streak = app.esc_streak.saturating_add(1);
        if app.esc_streak >= 5 {
            app.status_message = Some("type QQ to quit".to_string());
        }
    } else {
        app.esc_streak = 0;
    }

    // QQ quit: second Q confirms, any other key cancels
    if app.quit_pending {
        if matches!(
            (key.modifiers, key.code),
            (KeyModifiers::SHIFT, KeyCode::Char('Q'))
        ) {
            app.should_quit = true;
        } else {
            app.quit_pending = false;
        }
        return;
    }

    match (key.modifiers, key.code) {
        // Quit: Ctrl+Q
        (m, KeyCode::Char('q')) if m.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Quit: Q (first press shows confirmation)
        (KeyModifiers::SHIFT, KeyCode::Char('Q')) => {
            app.quit_pending = true;
            app.status_message = Some("press Q again to quit".to_string());
        }

        // Esc: close detail, clear highlight or filter, or clear search
        (_, KeyCode::Esc) => {
            handle_escape(app);
        }

        // Help overlay
        (KeyModifiers::NONE, KeyCode::Char('?')) => {
            app.show_help = true;
            app.help_scroll = 0;
        }

        // Audit log overlay
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            open_audit_overlay(app);
        }

        // Search: /
        (KeyModifiers::NONE, KeyCode::Char('/')) => {
            app.mode = Mode::Search;
            app.search_input.clear();
        }

        // n/N: next/previous search match
        (KeyModifiers::NONE, KeyCode::Char('n')) => {
            if app.ui.last_search.is_some() {
                search_next(app, 1);
            }
        }
        (KeyModifiers::SHIFT, KeyCode::Char('N')) => {
            if app.ui.last_search.is_some() {
                search_next(app, -1);
            }
        }

        // View switching: direct keys and Tab cycling
        (KeyModifiers::NONE, KeyCode::Char('1')) => {
            app.view = View::Tasks;
        }
        (KeyModifiers::NONE, KeyCode::Char('2')) => {
            app.view = View::Recon;
        }
        (KeyModifiers::NONE, KeyCode::Char('3')) => {
            app.view = View::Accruals;
        }
        (KeyModifiers::NONE, KeyCode::Tab) => {
            switch_tab(app, 1);
        }
        (KeyModifiers::SHIFT, KeyCode::BackTab) => {
            switch_tab(app, -1);
        }

        // Cursor movement: up/down
        (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
            move_cursor(app, -1);
        }
        (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
            move_cursor(app, 1);
        }

        // Jump to top/bottom
        (KeyModifiers::NONE, KeyCode::Char('g')) | (_, KeyCode::Home) => {
            jump_to_top(app);
        }
        (KeyModifiers::SHIFT, KeyCode::Char('G')) | (_, KeyCode::End) => {
            jump_to_bottom(app);
        }

        // Right: expand (tasks) or focus the GL pane (recon)
        (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) => match app.view {
            View::Tasks => expand_row(app),
            View::Recon => app.ui.recon.active_side = ListSide::Gl,
            View::Accruals => {}
        },

        // Left: collapse (tasks) or focus the bank pane (recon)
        (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) => match app.view {
            View::Tasks => collapse_row(app),
            View::Recon => app.ui.recon.active_side = ListSide::Bank,
            View::Accruals => {}
        },

        // Enter: toggle detail / category, or follow a recon match link
        (KeyModifiers::NONE, KeyCode::Enter) => match app.view {
            View::Tasks => handle_tasks_enter(app),
            View::Recon => follow_recon_link(app),
            View::Accruals => {}
        },

        // Space: status picker on the task or substep under the cursor
        (KeyModifiers::NONE, KeyCode::Char(' ')) => {
            open_status_picker(app);
        }

        // f: cycle the accrual status filter
        (KeyModifiers::NONE, KeyCode::Char('f')) => {
            cycle_accrual_filter(app);
        }

        _ => {}
    }
}

pub(super) fn switch_tab(app: &mut App, delta: i32) {
    let order = [View::Tasks, View::Recon, View::Accruals];
    let idx = order.iter().position(|v| *v == app.view).unwrap_or(0);
    let next = (idx as i32 + delta).rem_euclid(order.len() as i32) as usize;
    app.view = order[next];
}

fn handle_escape(app: &mut App) {
    match app.view {
        View::Tasks => {
            if app.ui.tasks.detail.is_some() {
                app.ui.tasks.detail = None;
                return;
            }
        }
        View::Recon => {
            if app.ui.recon.highlight.is_some() {
                app.ui.recon.highlight = None;
                return;
            }
        }
        View::Accruals => {
            if app.ui.accruals.status_filter.is_some() {
                app.ui.accruals.status_filter = None;
                app.ui.accruals.cursor = 0;
                app.ui.accruals.scroll_offset = 0;
                return;
            }
        }
    }
    if app.ui.last_search.is_some() {
        app.ui.last_search = None;
        app.search_match_idx = 0;
    }
}

// ---------------------------------------------------------------------------
// Cursor movement

fn step_index(cur: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if delta < 0 {
        cur.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        (cur + delta as usize).min(len - 1)
    }
}

fn move_cursor(app: &mut App, delta: i32) {
    match app.view {
        View::Tasks => {
            let len = app.build_flat_rows().len();
            app.ui.tasks.cursor = step_index(app.ui.tasks.cursor, delta, len);
        }
        View::Recon => match app.ui.recon.active_side {
            ListSide::Bank => {
                app.ui.recon.bank_cursor =
                    step_index(app.ui.recon.bank_cursor, delta, app.recon.bank.len());
            }
            ListSide::Gl => {
                app.ui.recon.gl_cursor =
                    step_index(app.ui.recon.gl_cursor, delta, app.recon.gl.len());
            }
        },
        View::Accruals => {
            let len = app.filtered_accruals().len();
            app.ui.accruals.cursor = step_index(app.ui.accruals.cursor, delta, len);
        }
    }
}

fn jump_to_top(app: &mut App) {
    match app.view {
        View::Tasks => app.ui.tasks.cursor = 0,
        View::Recon => match app.ui.recon.active_side {
            ListSide::Bank => app.ui.recon.bank_cursor = 0,
            ListSide::Gl => app.ui.recon.gl_cursor = 0,
        },
        View::Accruals => app.ui.accruals.cursor = 0,
    }
}

fn jump_to_bottom(app: &mut App) {
    match app.view {
        View::Tasks => {
            app.ui.tasks.cursor = app.build_flat_rows().len().saturating_sub(1);
        }
        View::Recon => match app.ui.recon.active_side {
            ListSide::Bank => {
                app.ui.recon.bank_cursor = app.recon.bank.len().saturating_sub(1);
            }
            ListSide::Gl => {
                app.ui.recon.gl_cursor = app.recon.gl.len().saturating_sub(1);
            }
        },
        View::Accruals => {
            app.ui.accruals.cursor = app.filtered_accruals().len().saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks view: expand/collapse, detail, status picker

fn expand_row(app: &mut App) {
    let rows = app.build_flat_rows();
    match rows.get(app.ui.tasks.cursor) {
        Some(FlatRow::Category {
            name,
            collapsed: true,
        }) => {
            app.ui.tasks.collapsed_categories.remove(name);
        }
        Some(FlatRow::Task {
            category,
            step,
            has_substeps: true,
            expanded: false,
        }) => {
            app.ui.tasks.expanded_tasks.insert(task_key(category, *step));
        }
        _ => {}
    }
}

fn collapse_row(app: &mut App) {
    let rows = app.build_flat_rows();
    match rows.get(app.ui.tasks.cursor).cloned() {
        Some(FlatRow::Category { name, .. }) => {
            app.ui.tasks.collapsed_categories.insert(name);
        }
        Some(FlatRow::Task {
            category,
            step,
            expanded: true,
            ..
        }) => {
            app.ui.tasks.expanded_tasks.remove(&task_key(&category, step));
        }
        Some(FlatRow::Task { category, .. }) => {
            // Already collapsed: jump to the category header
            if let Some(idx) = rows
                .iter()
                .position(|r| matches!(r, FlatRow::Category { name, .. } if *name == category))
            {
                app.ui.tasks.cursor = idx;
            }
        }
        Some(FlatRow::Substep { category, step, .. }) => {
            // Jump to the parent task row
            if let Some(idx) = rows.iter().position(|r| {
                matches!(r, FlatRow::Task { category: c, step: s, .. }
                    if *c == category && *s == step)
            }) {
                app.ui.tasks.cursor = idx;
            }
        }
        None => {}
    }
}

fn handle_tasks_enter(app: &mut App) {
    let rows = app.build_flat_rows();
    match rows.get(app.ui.tasks.cursor).cloned() {
        Some(FlatRow::Category { name, collapsed }) => {
            if collapsed {
                app.ui.tasks.collapsed_categories.remove(&name);
            } else {
                app.ui.tasks.collapsed_categories.insert(name);
            }
        }
        Some(FlatRow::Task { step, .. }) => {
            toggle_detail(app, DetailItem::TaskDetail { step });
        }
        Some(FlatRow::Substep { step, substep, .. }) => {
            toggle_detail(app, DetailItem::SubstepDetail { step, substep });
        }
        None => {}
    }
}

fn toggle_detail(app: &mut App, target: DetailItem) {
    if app.ui.tasks.detail.as_ref() == Some(&target) {
        app.ui.tasks.detail = None;
    } else {
        app.ui.tasks.detail = Some(target);
    }
}

fn open_status_picker(app: &mut App) {
    if app.view != View::Tasks {
        return;
    }
    let rows = app.build_flat_rows();
    let (target, current) = match rows.get(app.ui.tasks.cursor) {
        Some(FlatRow::Task { category, step, .. }) => {
            let Some(task) = app.resolve_task(category, *step) else {
                return;
            };
            (StatusTarget::Task { step: *step }, task.status)
        }
        Some(FlatRow::Substep {
            category,
            step,
            substep,
            ..
        }) => {
            let Some(sub) = app.resolve_substep(category, *step, *substep) else {
                return;
            };
            (
                StatusTarget::Substep {
                    step: *step,
                    substep: *substep,
                },
                sub.status,
            )
        }
        _ => return,
    };
    let selected = TaskStatus::all()
        .iter()
        .position(|s| *s == current)
        .unwrap_or(0);
    app.status_picker = Some(StatusPickerState { target, selected });
    app.mode = Mode::StatusPicker;
}

// ---------------------------------------------------------------------------
// Recon view

fn follow_recon_link(app: &mut App) {
    match app.ui.recon.active_side {
        ListSide::Bank => {
            let Some(txn) = app.recon.bank.get(app.ui.recon.bank_cursor) else {
                return;
            };
            let linked = recon_ops::linked_gl_entry(&app.recon, &txn.transaction_id)
                .map(|e| e.entry_id.clone());
            match linked {
                Some(id) => {
                    if let Some(idx) = app.recon.gl.iter().position(|e| e.entry_id == id) {
                        app.ui.recon.active_side = ListSide::Gl;
                        app.ui.recon.gl_cursor = idx;
                        app.ui.recon.highlight = Some(Highlight {
                            side: ListSide::Gl,
                            id,
                        });
                    }
                }
                None => {
                    app.status_message = Some("no matched GL entry".to_string());
                }
            }
        }
        ListSide::Gl => {
            let Some(entry) = app.recon.gl.get(app.ui.recon.gl_cursor) else {
                return;
            };
            let linked = recon_ops::linked_bank_transaction(&app.recon, &entry.entry_id)
                .map(|t| t.transaction_id.clone());
            match linked {
                Some(id) => {
                    if let Some(idx) = app
                        .recon
                        .bank
                        .iter()
                        .position(|t| t.transaction_id == id)
                    {
                        app.ui.recon.active_side = ListSide::Bank;
                        app.ui.recon.bank_cursor = idx;
                        app.ui.recon.highlight = Some(Highlight {
                            side: ListSide::Bank,
                            id,
                        });
                    }
                }
                None => {
                    app.status_message = Some("no matched bank transaction".to_string());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Accruals view

fn cycle_accrual_filter(app: &mut App) {
    if app.view != View::Accruals {
        return;
    }
    let next = match app.ui.accruals.status_filter.as_deref() {
        None => Some("pending"),
        Some("pending") => Some("complete"),
        Some("complete") => Some("review"),
        Some("review") => Some("exception"),
        _ => None,
    };
    app.ui.accruals.status_filter = next.map(str::to_string);
    app.ui.accruals.cursor = 0;
    app.ui.accruals.scroll_offset = 0;
}

// ---------------------------------------------------------------------------
// Audit overlay

fn open_audit_overlay(app: &mut App) {
    let entries = read_audit_entries(&app.workspace.close_dir, None, None);
    app.audit_lines = entries
        .iter()
        .flat_map(|e| {
            e.to_display_markdown()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    app.audit_scroll = 0;
    app.show_audit = true;
}
