use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &mut App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let text_color = app.theme.text;
    let bright = app.theme.text_bright;
    let highlight = app.theme.highlight;
    let dim = app.theme.dim;

    let key_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(text_color).bg(bg);
    let header_style = Style::default()
        .fg(bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive help
    match app.view {
        View::Tasks => {
            lines.push(Line::from(Span::styled(" Checklist", header_style)));
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move cursor up/down",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " \u{2190}/h",
                "Collapse / go to parent",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " \u{2192}/l",
                "Expand substeps",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " g/G",
                "Jump to top/bottom",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " Enter",
                "Toggle detail panel",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " Space",
                "Set task status",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " Esc", "Back / close", key_style, desc_style);
            lines.push(Line::from(""));
        }
        View::Recon => {
            lines.push(Line::from(Span::styled(" Reconciliation", header_style)));
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move cursor",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " \u{2190}\u{2192}/hl",
                "Switch bank / GL side",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " Enter",
                "Follow match link",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " Esc",
                "Clear link highlight",
                key_style,
                desc_style,
            );
            lines.push(Line::from(""));
        }
        View::Accruals => {
            lines.push(Line::from(Span::styled(" Accruals", header_style)));
            add_binding(
                &mut lines,
                " \u{2191}\u{2193}/jk",
                "Move cursor",
                key_style,
                desc_style,
            );
            add_binding(
                &mut lines,
                " f",
                "Cycle status filter",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " Esc", "Clear filter", key_style, desc_style);
            lines.push(Line::from(""));
        }
    }

    lines.push(Line::from(Span::styled(" Views", header_style)));
    add_binding(
        &mut lines,
        " 1/2/3",
        "Tasks / Recon / Accruals",
        key_style,
        desc_style,
    );
    add_binding(&mut lines, " Tab", "Next view", key_style, desc_style);
    lines.push(Line::from(""));

    // Global keys
    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " /", "Search tasks", key_style, desc_style);
    add_binding(&mut lines, " n/N", "Next / previous match", key_style, desc_style);
    add_binding(&mut lines, " a", "Audit log", key_style, desc_style);
    add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
    add_binding(&mut lines, " QQ", "Quit", key_style, desc_style);
    add_binding(&mut lines, " Ctrl+Q", "Quit (immediate)", key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .style(Style::default().bg(bg));

    // Scroll clamp against the rendered height
    let inner_height = block.inner(overlay_area).height as usize;
    let scroll = app.help_scroll.min(lines.len().saturating_sub(inner_height));
    app.help_scroll = scroll;

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn help_shows_view_specific_bindings() {
        let mut app = sample_tasks_app();
        app.show_help = true;
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &mut app, area);
        });
        assert!(output.contains("Key Bindings"), "output:\n{output}");
        assert!(output.contains("Set task status"), "output:\n{output}");
        assert!(output.contains("QQ"), "output:\n{output}");
    }

    #[test]
    fn help_follows_the_active_view() {
        let mut app = sample_recon_app();
        app.show_help = true;
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &mut app, area);
        });
        assert!(output.contains("Switch bank / GL side"), "output:\n{output}");
        assert!(!output.contains("Set task status"), "output:\n{output}");
    }

    #[test]
    fn jump_to_bottom_scroll_is_clamped() {
        let mut app = sample_tasks_app();
        app.show_help = true;
        app.help_scroll = usize::MAX;
        let _ = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &mut app, area);
        });
        assert!(app.help_scroll < 40, "scroll: {}", app.help_scroll);
    }
}
