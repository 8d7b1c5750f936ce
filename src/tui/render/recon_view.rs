use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::cli::output::format_money;
use crate::io::state::ListSide;
use crate::model::status::TxnStatus;
use crate::ops::summary;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the side-by-side reconciliation view: bank feed left, GL extract
/// right, running totals in the footer.
pub fn render_recon_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_bank_pane(frame, app, panes[0]);
    render_gl_pane(frame, app, panes[1]);
    render_footer(frame, app, chunks[1]);
}

fn txn_glyph(status: TxnStatus) -> char {
    match status {
        TxnStatus::Cleared => '\u{2713}',
        TxnStatus::Review => '?',
        TxnStatus::Exception => '!',
    }
}

fn pane_block(app: &App, title: String, is_active: bool) -> Block<'static> {
    let bg = app.theme.background;
    let border_color = if is_active {
        app.theme.selection_border
    } else {
        app.theme.dim
    };
    Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color).bg(bg))
        .style(Style::default().bg(bg))
}

fn render_bank_pane(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_active = app.ui.recon.active_side == ListSide::Bank;
    let block = pane_block(
        app,
        format!(" Bank feed ({}) ", app.recon.bank.len()),
        is_active,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.recon.bank.is_empty() {
        let empty = Paragraph::new("(no bank transactions)")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, inner);
        return;
    }

    let cursor = app.ui.recon.bank_cursor.min(app.recon.bank.len() - 1);
    app.ui.recon.bank_cursor = cursor;
    let visible_height = inner.height as usize;
    let width = inner.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (idx, txn) in app.recon.bank.iter().enumerate() {
        let is_cursor = is_active && idx == cursor;
        let is_highlight = app
            .ui
            .recon
            .highlight
            .as_ref()
            .is_some_and(|h| h.side == ListSide::Bank && h.id == txn.transaction_id);
        let bg = if is_cursor || is_highlight {
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

        spans.push(Span::styled(
            format!("{} ", txn_glyph(txn.status)),
            Style::default().fg(app.theme.txn_color(txn.status)).bg(bg),
        ));
        let id_style = if is_highlight {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        spans.push(Span::styled(txn.transaction_id.clone(), id_style));
        spans.push(Span::styled(
            format!("  {}  ", txn.date),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        spans.push(Span::styled(
            format!("{:>12}", format_money(txn.amount)),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));

        let prefix_width: usize = spans
            .iter()
            .map(|s| unicode::display_width(&s.content))
            .sum();
        let available = width.saturating_sub(prefix_width + 3);
        let desc = unicode::truncate_to_width(&txn.description, available);
        spans.push(Span::styled(
            format!("  {}", desc),
            Style::default().fg(app.theme.text).bg(bg),
        ));

        pad_row(&mut spans, width, bg);
        lines.push(Line::from(spans));
    }

    let scroll = clamp_scroll(app.ui.recon.bank_scroll, cursor, visible_height);
    app.ui.recon.bank_scroll = scroll;

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, inner);
}

fn render_gl_pane(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_active = app.ui.recon.active_side == ListSide::Gl;
    let block = pane_block(
        app,
        format!(" GL extract ({}) ", app.recon.gl.len()),
        is_active,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.recon.gl.is_empty() {
        let empty = Paragraph::new("(no ledger entries)")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, inner);
        return;
    }

    let cursor = app.ui.recon.gl_cursor.min(app.recon.gl.len() - 1);
    app.ui.recon.gl_cursor = cursor;
    let visible_height = inner.height as usize;
    let width = inner.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (idx, entry) in app.recon.gl.iter().enumerate() {
        let is_cursor = is_active && idx == cursor;
        let is_highlight = app
            .ui
            .recon
            .highlight
            .as_ref()
            .is_some_and(|h| h.side == ListSide::Gl && h.id == entry.entry_id);
        let bg = if is_cursor || is_highlight {
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

        spans.push(Span::styled(
            format!("{} ", txn_glyph(entry.status)),
            Style::default()
                .fg(app.theme.txn_color(entry.status))
                .bg(bg),
        ));
        let id_style = if is_highlight {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        spans.push(Span::styled(entry.entry_id.clone(), id_style));
        spans.push(Span::styled(
            format!("  {}  {}  ", entry.date, entry.account_number),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        spans.push(Span::styled(
            format!("{:>12}", format_money(entry.amount)),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));

        // Matched entries carry a link marker back to the bank side
        if entry.matched_bank_transaction.is_some() {
            spans.push(Span::styled(
                " \u{2194}",
                Style::default().fg(app.theme.green).bg(bg),
            ));
        }

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

        pad_row(&mut spans, width, bg);
        lines.push(Line::from(spans));
    }

    let scroll = clamp_scroll(app.ui.recon.gl_scroll, cursor, visible_height);
    app.ui.recon.gl_scroll = scroll;

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, inner);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let s = summary::reconciliation_summary(&app.recon);
    let text = format!(
        " debits {}  credits {}  unmatched {} bank / {} GL  checks {}  exceptions {}",
        format_money(s.total_debits),
        format_money(s.total_credits),
        s.unmatched_bank_transactions,
        s.unmatched_gl_entries,
        s.pending_checks,
        s.exceptions_count
    );
    let footer = Paragraph::new(text)
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(footer, area);
}

fn pad_row(spans: &mut Vec<Span>, width: usize, bg: ratatui::style::Color) {
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
}

fn clamp_scroll(scroll: usize, cursor: usize, visible_height: usize) -> usize {
    if cursor < scroll {
        cursor
    } else if visible_height > 0 && cursor >= scroll + visible_height {
        cursor - (visible_height - 1)
    } else {
        scroll
    }
}
