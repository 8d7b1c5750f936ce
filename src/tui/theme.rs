use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::status::{AccrualStatus, TaskStatus, TxnStatus};

/// Parsed color theme for the TUI. Defaults match the commented-out
/// example values in the generated close.toml; every entry can be
/// overridden from `[ui.colors]`.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xA0, 0x9B, 0xFE),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x5A, 0x55, 0x80),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            search_match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_fg: Color::Rgb(0x0C, 0x00, 0x1B),
        }
    }
}

/// Parses a hex color string like "#RRGGBB" or "RRGGBB".
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Builds a theme from the `[ui.colors]` table, keeping the default
    /// for any key that is absent or unparseable.
    pub fn from_config(colors: &HashMap<String, String>) -> Self {
        let mut theme = Theme::default();
        for (key, value) in colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_border" => theme.selection_border = color,
                "search_match_bg" => theme.search_match_bg = color,
                "search_match_fg" => theme.search_match_fg = color,
                _ => {}
            }
        }
        theme
    }

    /// Color for a task status glyph or label.
    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Backlog => self.text,
            TaskStatus::InProgress => self.highlight,
            TaskStatus::Completed => self.green,
        }
    }

    /// Color for a bank/GL transaction status.
    pub fn txn_color(&self, status: TxnStatus) -> Color {
        match status {
            TxnStatus::Cleared => self.green,
            TxnStatus::Review => self.yellow,
            TxnStatus::Exception => self.red,
        }
    }

    /// Color for an accrual entry status.
    pub fn accrual_color(&self, status: AccrualStatus) -> Color {
        match status {
            AccrualStatus::Pending => self.text,
            AccrualStatus::Complete => self.green,
            AccrualStatus::Review => self.yellow,
            AccrualStatus::Exception => self.red,
        }
    }
}
