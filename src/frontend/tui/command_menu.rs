use crate::core::parser::Command;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Icon shown in front of a command, picked from its verb
pub fn command_icon(command: &str) -> Option<&'static str> {
    if command.starts_with("take") {
        Some("📦")
    } else if command.starts_with("go") {
        Some("🚶")
    } else if command.starts_with("examine") {
        Some("🔍")
    } else if command.starts_with("use") {
        Some("🔧")
    } else if command == "inventory" {
        Some("🎒")
    } else if command == "look" {
        Some("👁")
    } else if command == "help" {
        Some("❓")
    } else if command.starts_with("drop") {
        Some("⬇")
    } else {
        None
    }
}

/// Where the menu was drawn last frame, for mapping clicks back to entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuHitMap {
    pub area: Rect,
    /// Index of the entry drawn on the first inner row
    pub first_visible: usize,
    pub entry_count: usize,
}

impl MenuHitMap {
    /// Check if a mouse click at (x, y) hits a menu entry
    /// Returns the index of the clicked entry if any
    pub fn entry_at(&self, x: u16, y: u16) -> Option<usize> {
        let area = self.area;
        if x < area.x || x >= area.x + area.width || y < area.y || y >= area.y + area.height {
            return None;
        }

        // Border takes 1 row at top and bottom
        let relative_y = (y - area.y) as usize;
        if relative_y == 0 || relative_y >= (area.height as usize).saturating_sub(1) {
            return None;
        }
        if x == area.x || x + 1 >= area.x + area.width {
            return None;
        }

        let index = self.first_visible + relative_y - 1;
        if index < self.entry_count {
            Some(index)
        } else {
            None
        }
    }
}

/// Action menu window
pub struct CommandMenu<'a> {
    pub commands: &'a [Command],
    pub cursor: Option<usize>,
    pub pending: bool,
    pub show_icons: bool,
}

impl<'a> CommandMenu<'a> {
    /// First entry to draw so the cursor row stays on screen
    fn first_visible(&self, rows: usize) -> usize {
        match self.cursor {
            Some(cursor) if rows > 0 && cursor >= rows => cursor + 1 - rows,
            _ => 0,
        }
    }

    fn label(&self, command: &Command) -> String {
        match command_icon(command.as_str()).filter(|_| self.show_icons) {
            Some(icon) => format!("{} {}", icon, command),
            None => command.to_string(),
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) -> MenuHitMap {
        let rows = area.height.saturating_sub(2) as usize;
        let first_visible = self.first_visible(rows);
        let inner_width = area.width.saturating_sub(2) as usize;

        // Dim the highlight while a command is in flight
        let selected_style = if self.pending {
            Style::default().fg(Color::Black).bg(Color::DarkGray)
        } else {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD)
        };

        let lines: Vec<Line> = if self.commands.is_empty() {
            vec![Line::from(Span::styled(
                " (no actions)",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.commands
                .iter()
                .enumerate()
                .skip(first_visible)
                .take(rows)
                .map(|(idx, command)| {
                    let style = if Some(idx) == self.cursor {
                        selected_style
                    } else {
                        Style::default().fg(Color::Cyan)
                    };
                    // Pad the text to fill the entire width
                    let text = format!(
                        " {:<width$}",
                        self.label(command),
                        width = inner_width.saturating_sub(1)
                    );
                    Line::from(Span::styled(text, style))
                })
                .collect()
        };

        let title = if self.pending { "Actions (waiting)" } else { "Actions" };
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .render(area, buf);

        MenuHitMap {
            area,
            first_visible,
            entry_count: self.commands.len(),
        }
    }
}
