use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::status::TaskStatus;
use crate::tui::app::App;

/// Render the status picker popup over the checklist.
pub fn render_status_picker(frame: &mut Frame, app: &App, area: Rect) {
    let Some(picker) = &app.status_picker else {
        return;
    };

    let bg = app.theme.background;
    let statuses = TaskStatus::all();

    // Small fixed-size popup, centered
    let popup_w: u16 = 24;
    let popup_h: u16 = statuses.len() as u16 + 2;
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(popup_w) / 2,
        area.y + area.height.saturating_sub(popup_h) / 2,
        popup_w.min(area.width),
        popup_h.min(area.height),
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " Set status ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let selected = picker.selected.min(statuses.len() - 1);
    let width = inner.width as usize;

    let lines: Vec<Line> = statuses
        .iter()
        .enumerate()
        .map(|(idx, status)| {
            let is_selected = idx == selected;
            let row_bg = if is_selected { app.theme.selection_bg } else { bg };
            let mut spans = vec![
                Span::styled(
                    format!(" {} ", status.glyph()),
                    Style::default().fg(app.theme.status_color(*status)).bg(row_bg),
                ),
                Span::styled(
                    status.label().to_string(),
                    if is_selected {
                        Style::default()
                            .fg(app.theme.text_bright)
                            .bg(row_bg)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(app.theme.text).bg(row_bg)
                    },
                ),
            ];
            let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
            if content_width < width {
                spans.push(Span::styled(
                    " ".repeat(width - content_width),
                    Style::default().bg(row_bg),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, inner);
}
