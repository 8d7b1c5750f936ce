use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::format_money;
use crate::ops::accrual_ops;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the accrual ledger as a flat table with a totals footer.
pub fn render_accruals_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // column header
            Constraint::Min(1),    // entries
            Constraint::Length(1), // totals footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_entries(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = format!(
        " {:<8}  {:<10}  {:>12}  {:<9}  {:<15}  {}",
        "entry", "date", "amount", "status", "kind", "description"
    );
    let widget = Paragraph::new(header)
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(widget, area);
}

fn render_entries(frame: &mut Frame, app: &mut App, area: Rect) {
    let cursor_raw = app.ui.accruals.cursor;
    let scroll_raw = app.ui.accruals.scroll_offset;

    let rows = app.filtered_accruals();
    if rows.is_empty() {
        let message = if app.accruals.entries.is_empty() {
            " No accruals recorded. Add one with `cb accrual add`."
        } else {
            " No accruals match the filter. Press f to cycle, Esc to clear."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let cursor = cursor_raw.min(rows.len() - 1);
    let visible_height = area.height as usize;
    let width = area.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (idx, entry) in rows.iter().enumerate() {
        let is_cursor = idx == cursor;
        let bg = if is_cursor {
            app.theme.selection_bg
        } else {
            app.theme.background
        };

        let mut spans: Vec<Span> = Vec::new();
        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default()
                    .fg(app.theme.selection_border)
                    .bg(app.theme.selection_bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(bg)));
        }

        let id_style = if is_cursor {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        spans.push(Span::styled(format!("{:<8}", entry.entry_id), id_style));
        spans.push(Span::styled(
            format!("  {:<10}", entry.date),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        spans.push(Span::styled(
            format!("  {:>12}", format_money(entry.amount)),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
        spans.push(Span::styled(
            format!("  {:<9}", entry.status.label()),
            Style::default()
                .fg(app.theme.accrual_color(entry.status))
                .bg(bg),
        ));
        spans.push(Span::styled(
            format!("  {:<15}", entry.kind.label()),
            Style::default().fg(app.theme.dim).bg(bg),
        ));

        let prefix_width: usize = spans
            .iter()
            .map(|s| unicode::display_width(&s.content))
            .sum();
        let available = width.saturating_sub(prefix_width + 3);
        let desc = unicode::truncate_to_width(&entry.description, available);
        spans.push(Span::styled(
            format!("  {}", desc),
            Style::default().fg(app.theme.text).bg(bg),
        ));

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

    let mut scroll = scroll_raw;
    if cursor < scroll {
        scroll = cursor;
    } else if visible_height > 0 && cursor >= scroll + visible_height {
        scroll = cursor - (visible_height - 1);
    }

    // Writes deferred until the borrow on the filtered rows ends
    app.ui.accruals.cursor = cursor;
    app.ui.accruals.scroll_offset = scroll;

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let s = accrual_ops::accrual_summary(&app.accruals);
    let text = format!(
        " {} accruals  total {}  pending {}  review {}  exceptions {}",
        s.total_accruals,
        format_money(s.total_amount),
        s.pending_count,
        s.review_count,
        s.exception_count
    );
    let footer =
        Paragraph::new(text).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(footer, area);
}
