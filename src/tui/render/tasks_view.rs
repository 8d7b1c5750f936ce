use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::status::Priority;
use crate::tui::app::{App, FlatRow};
use crate::util::unicode;

use super::{detail_view, push_highlighted_spans};

/// Render the checklist: category headers with their tasks and substeps,
/// plus the detail panel when one is open.
pub fn render_tasks_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let list_area = if app.ui.tasks.detail.is_some() {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(44)])
            .split(area);
        detail_view::render_detail_panel(frame, app, chunks[1]);
        chunks[0]
    } else {
        area
    };

    let rows = app.build_flat_rows();
    if rows.is_empty() {
        let empty = Paragraph::new(" No close tasks yet. Run `cb fetch` or edit close/data/steps.csv.")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, list_area);
        return;
    }

    // Clamp cursor
    let cursor = app.ui.tasks.cursor.min(rows.len() - 1);
    app.ui.tasks.cursor = cursor;
    let visible_height = list_area.height as usize;
    let width = list_area.width as usize;

    let search_re = app.active_search_re();
    let hl_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line: Option<usize> = None;

    for (idx, row) in rows.iter().enumerate() {
        let is_cursor = idx == cursor;
        if is_cursor {
            cursor_line = Some(lines.len());
        }
        let bg = if is_cursor {
            app.theme.selection_bg
        } else {
            app.theme.background
        };

        let mut spans: Vec<Span> = Vec::new();

        // Column 0 reservation
        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default()
                    .fg(app.theme.selection_border)
                    .bg(app.theme.selection_bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(app.theme.background)));
        }

        match row {
            FlatRow::Category { name, collapsed } => {
                let arrow = if *collapsed {
                    "\u{25B8} "
                } else {
                    "\u{25BE} "
                };
                spans.push(Span::styled(arrow, Style::default().fg(app.theme.dim).bg(bg)));
                let name_style = Style::default()
                    .fg(app.theme.text_bright)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD);
                push_highlighted_spans(&mut spans, name, name_style, hl_style, search_re.as_ref());
                if let Some(category) = app.workspace.categories.iter().find(|c| c.name == *name) {
                    let (done, total) = category.completion();
                    spans.push(Span::styled(
                        format!("  {}/{} complete", done, total),
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));
                }
            }
            FlatRow::Task {
                category,
                step,
                has_substeps,
                expanded,
            } => {
                spans.push(Span::styled("  ", Style::default().bg(bg)));
                if *has_substeps {
                    let indicator = if *expanded {
                        "\u{25BC} "
                    } else {
                        "\u{25B6} "
                    };
                    spans.push(Span::styled(
                        indicator,
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));
                } else {
                    spans.push(Span::styled("  ", Style::default().bg(bg)));
                }

                if let Some(task) = app.resolve_task(category, *step) {
                    spans.push(Span::styled(
                        format!("{} ", task.status.glyph()),
                        Style::default().fg(app.theme.status_color(task.status)).bg(bg),
                    ));
                    spans.push(Span::styled(
                        format!("{:>2} ", step),
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));
                    if let Some(priority) = task.priority {
                        let color = match priority {
                            Priority::P1 => app.theme.red,
                            Priority::P2 => app.theme.yellow,
                            _ => app.theme.dim,
                        };
                        spans.push(Span::styled(
                            format!("{} ", priority.label()),
                            Style::default().fg(color).bg(bg),
                        ));
                    }

                    let suffix = format!(" ({}, {}m)", task.assigned_to, task.estimated_minutes);
                    let title_style = if is_cursor {
                        Style::default()
                            .fg(app.theme.text_bright)
                            .bg(bg)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(app.theme.text_bright).bg(bg)
                    };
                    let prefix_width: usize = spans
                        .iter()
                        .map(|s| unicode::display_width(&s.content))
                        .sum();
                    let available =
                        width.saturating_sub(prefix_width + unicode::display_width(&suffix) + 1);
                    let display_name = unicode::truncate_to_width(&task.step_name, available);
                    push_highlighted_spans(
                        &mut spans,
                        &display_name,
                        title_style,
                        hl_style,
                        search_re.as_ref(),
                    );
                    spans.push(Span::styled(
                        suffix,
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));
                }
            }
            FlatRow::Substep {
                category,
                step,
                substep,
                is_last,
            } => {
                spans.push(Span::styled("    ", Style::default().bg(bg)));
                let branch = if *is_last {
                    "\u{2514}\u{2500} "
                } else {
                    "\u{251C}\u{2500} "
                };
                spans.push(Span::styled(
                    branch,
                    Style::default().fg(app.theme.dim).bg(bg),
                ));

                if let Some(sub) = app.resolve_substep(category, *step, *substep) {
                    spans.push(Span::styled(
                        format!("{} ", sub.status.glyph()),
                        Style::default().fg(app.theme.status_color(sub.status)).bg(bg),
                    ));
                    spans.push(Span::styled(
                        format!("{}.{} ", step, substep),
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));

                    let suffix = format!(" ({}m)", sub.estimated_minutes);
                    let name_style = Style::default().fg(app.theme.text).bg(bg);
                    let prefix_width: usize = spans
                        .iter()
                        .map(|s| unicode::display_width(&s.content))
                        .sum();
                    let available =
                        width.saturating_sub(prefix_width + unicode::display_width(&suffix) + 1);
                    let display_name = unicode::truncate_to_width(&sub.sub_step_name, available);
                    push_highlighted_spans(
                        &mut spans,
                        &display_name,
                        name_style,
                        hl_style,
                        search_re.as_ref(),
                    );
                    spans.push(Span::styled(
                        suffix,
                        Style::default().fg(app.theme.dim).bg(bg),
                    ));
                }
            }
        }

        // Pad to full width so the selection bg covers the row
        let content_width: usize = spans
            .iter()
            .map(|s| unicode::display_width(&s.content))
            .sum();
        if content_width < width {
            spans.push(Span::styled(
                " ".repeat(width - content_width),
                Style::default().bg(bg),
            ));
        }

        lines.push(Line::from(spans));
    }

    // Auto-adjust scroll to keep cursor visible
    let mut scroll = app.ui.tasks.scroll_offset;
    if let Some(cl) = cursor_line {
        if cl < scroll {
            scroll = cl;
        } else if cl >= scroll + visible_height {
            scroll = cl.saturating_sub(visible_height - 1);
        }
    }
    app.ui.tasks.scroll_offset = scroll;

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .collect();

    let paragraph = Paragraph::new(visible_lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, list_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::TaskStatus;
    use crate::model::task::DetailItem;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn renders_category_headers_with_completion() {
        let mut app = sample_tasks_app();
        app.workspace.categories[0].tasks[0].status = TaskStatus::Completed;
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(output.contains("Cash"), "output:\n{output}");
        assert!(output.contains("1/2 complete"), "output:\n{output}");
        assert!(output.contains("Revenue"), "output:\n{output}");
    }

    #[test]
    fn renders_task_rows_with_glyph_and_estimate() {
        let mut app = sample_tasks_app();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(output.contains("\u{25cb}  1 P1 Post journals (Pip, 30m)"), "output:\n{output}");
        assert!(output.contains("\u{25cb}  2 P1 Reconcile bank (Pip, 30m)"), "output:\n{output}");
    }

    #[test]
    fn substeps_hidden_until_task_expanded() {
        let mut app = sample_tasks_app();
        let collapsed = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(!collapsed.contains("Pull feed"), "output:\n{collapsed}");

        app.ui
            .tasks
            .expanded_tasks
            .insert(crate::io::state::task_key("Cash", 2));
        let expanded = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(expanded.contains("\u{251c}\u{2500} \u{25cb} 2.1 Pull feed (10m)"), "output:\n{expanded}");
        assert!(expanded.contains("\u{2514}\u{2500} \u{25cb} 2.2 Match items (10m)"), "output:\n{expanded}");
    }

    #[test]
    fn collapsed_category_shows_right_arrow_and_no_tasks() {
        let mut app = sample_tasks_app();
        app.ui
            .tasks
            .collapsed_categories
            .insert("Cash".to_string());
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(output.contains("\u{25b8} Cash"), "output:\n{output}");
        assert!(!output.contains("Post journals"), "output:\n{output}");
        // Other categories stay expanded
        assert!(output.contains("Bill runs"), "output:\n{output}");
    }

    #[test]
    fn detail_panel_splits_the_view() {
        let mut app = sample_tasks_app();
        app.ui.tasks.detail = Some(DetailItem::TaskDetail { step: 1 });
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        // Panel border plus the task name inside it
        assert!(output.contains("\u{250c}"), "output:\n{output}");
        assert!(output.contains("step 1"), "output:\n{output}");
    }

    #[test]
    fn empty_catalog_shows_hint() {
        let mut app = test_app(Vec::new());
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(output.contains("No close tasks yet"), "output:\n{output}");
    }

    #[test]
    fn long_task_name_is_truncated_with_ellipsis() {
        let mut app = test_app(vec![category(
            "Cash",
            vec![task(
                "Cash",
                1,
                &"Reconcile the operating account against the bank feed every single day".repeat(2),
                Vec::new(),
            )],
        )]);
        let output = render_to_string(40, 10, |frame, area| {
            render_tasks_view(frame, &mut app, area);
        });
        assert!(output.contains('\u{2026}'), "output:\n{output}");
    }
}
