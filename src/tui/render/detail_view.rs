use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::task::{self, DetailItem, Substep, Task};
use crate::tui::app::App;
use crate::tui::wrap;

/// Render the side panel for the selected task or substep.
pub fn render_detail_panel(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;

    let block = Block::default()
        .title(Span::styled(
            " Detail ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(detail) = &app.ui.tasks.detail else {
        return;
    };

    let lines = match detail {
        DetailItem::TaskDetail { step } => {
            match task::find_task(&app.workspace.categories, *step) {
                Some((category, task)) => task_lines(app, &category.name, task, inner.width),
                None => vec![missing_line(app)],
            }
        }
        DetailItem::SubstepDetail { step, substep } => {
            match task::find_substep(&app.workspace.categories, *step, *substep) {
                Some((task, sub)) => substep_lines(app, task, sub, inner.width),
                None => vec![missing_line(app)],
            }
        }
    };

    let visible: Vec<Line> = lines.into_iter().take(inner.height as usize).collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(bg));
    frame.render_widget(paragraph, inner);
}

fn missing_line(app: &App) -> Line<'static> {
    Line::from(Span::styled(
        "(no longer in the catalog)",
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    ))
}

fn task_lines(app: &App, category: &str, task: &Task, width: u16) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let mut lines: Vec<Line> = Vec::new();

    push_wrapped(
        &mut lines,
        &task.step_name,
        width,
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    );
    lines.push(Line::from(Span::styled(
        format!("{} / step {}", category, task.step_number),
        Style::default().fg(app.theme.dim).bg(bg),
    )));
    lines.push(Line::from(""));

    if !task.description.is_empty() {
        push_wrapped(
            &mut lines,
            &task.description,
            width,
            Style::default().fg(app.theme.text).bg(bg),
        );
        lines.push(Line::from(""));
    }

    lines.push(field_line(
        app,
        "status",
        task.status.label(),
        app.theme.status_color(task.status),
    ));
    lines.push(field_line(app, "assigned", &task.assigned_to, app.theme.text));
    lines.push(field_line(
        app,
        "estimate",
        &format!("{}m", task.estimated_minutes),
        app.theme.text,
    ));
    if let Some(priority) = task.priority {
        lines.push(field_line(app, "priority", priority.label(), app.theme.text));
    }
    if task.requires_approval {
        lines.push(field_line(app, "approval", "required", app.theme.yellow));
    }
    if task.integration_required {
        let value = if task.required_integrations.is_empty() {
            "required".to_string()
        } else {
            task.required_integrations.join(", ")
        };
        lines.push(field_line(app, "systems", &value, app.theme.cyan));
    }
    lines.push(field_line(app, "prepared", &task.prepared_by, app.theme.text));
    lines.push(field_line(app, "reviewed", &task.reviewed_by, app.theme.text));

    if !task.substeps.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("substeps ({})", task.substeps.len()),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        for sub in &task.substeps {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", sub.status.glyph()),
                    Style::default().fg(app.theme.status_color(sub.status)).bg(bg),
                ),
                Span::styled(
                    format!("{}.{} ", task.step_number, sub.sub_step_number),
                    Style::default().fg(app.theme.dim).bg(bg),
                ),
                Span::styled(
                    sub.sub_step_name.clone(),
                    Style::default().fg(app.theme.text).bg(bg),
                ),
            ]));
        }
    }

    lines
}

fn substep_lines(app: &App, task: &Task, sub: &Substep, width: u16) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let mut lines: Vec<Line> = Vec::new();

    push_wrapped(
        &mut lines,
        &sub.sub_step_name,
        width,
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    );
    lines.push(Line::from(Span::styled(
        format!(
            "step {}.{} of {}",
            task.step_number, sub.sub_step_number, task.step_name
        ),
        Style::default().fg(app.theme.dim).bg(bg),
    )));
    lines.push(Line::from(""));

    if !sub.sub_step_description.is_empty() {
        push_wrapped(
            &mut lines,
            &sub.sub_step_description,
            width,
            Style::default().fg(app.theme.text).bg(bg),
        );
        lines.push(Line::from(""));
    }

    lines.push(field_line(
        app,
        "status",
        sub.status.label(),
        app.theme.status_color(sub.status),
    ));
    lines.push(field_line(app, "assigned", &sub.assigned_to, app.theme.text));
    lines.push(field_line(
        app,
        "estimate",
        &format!("{}m", sub.estimated_minutes),
        app.theme.text,
    ));
    if sub.requires_judgment {
        lines.push(field_line(app, "judgment", "required", app.theme.yellow));
    }
    if sub.requires_system_access {
        lines.push(field_line(app, "access", "system", app.theme.cyan));
    }
    if sub.requires_external_data {
        lines.push(field_line(app, "data", "external", app.theme.cyan));
    }
    lines.push(field_line(app, "prepared", &sub.prepared_by, app.theme.text));
    lines.push(field_line(app, "reviewed", &sub.reviewed_by, app.theme.text));

    lines
}

fn field_line(app: &App, key: &str, value: &str, value_color: ratatui::style::Color) -> Line<'static> {
    let bg = app.theme.background;
    Line::from(vec![
        Span::styled(
            format!("{:<10}", key),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
        Span::styled(value.to_string(), Style::default().fg(value_color).bg(bg)),
    ])
}

/// Word-wrap `text` to the panel width, one styled line per visual row.
fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: u16, style: Style) {
    for row in wrap::wrap_line(text, width as usize) {
        lines.push(Line::from(Span::styled(text[row].to_string(), style)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::TaskStatus;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn task_detail_shows_fields_and_substeps() {
        let mut app = sample_tasks_app();
        app.workspace.categories[0].tasks[1].status = TaskStatus::InProgress;
        app.workspace.categories[0].tasks[1].requires_approval = true;
        app.ui.tasks.detail = Some(DetailItem::TaskDetail { step: 2 });
        let output = render_to_string(50, 24, |frame, area| {
            render_detail_panel(frame, &mut app, area);
        });
        assert!(output.contains("Reconcile bank"), "output:\n{output}");
        assert!(output.contains("Cash / step 2"), "output:\n{output}");
        assert!(output.contains("status    In Progress"), "output:\n{output}");
        assert!(output.contains("approval  required"), "output:\n{output}");
        assert!(output.contains("substeps (2)"), "output:\n{output}");
        assert!(output.contains("2.1 Pull feed"), "output:\n{output}");
    }

    #[test]
    fn substep_detail_names_its_parent() {
        let mut app = sample_tasks_app();
        app.ui.tasks.detail = Some(DetailItem::SubstepDetail { step: 2, substep: 2 });
        let output = render_to_string(50, 24, |frame, area| {
            render_detail_panel(frame, &mut app, area);
        });
        assert!(output.contains("Match items"), "output:\n{output}");
        assert!(
            output.contains("step 2.2 of Reconcile bank"),
            "output:\n{output}"
        );
    }

    #[test]
    fn stale_detail_reports_missing() {
        let mut app = sample_tasks_app();
        app.ui.tasks.detail = Some(DetailItem::TaskDetail { step: 99 });
        let output = render_to_string(50, 24, |frame, area| {
            render_detail_panel(frame, &mut app, area);
        });
        assert!(
            output.contains("(no longer in the catalog)"),
            "output:\n{output}"
        );
    }
}
