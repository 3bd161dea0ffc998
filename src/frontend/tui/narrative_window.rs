use crate::core::message_log::{MessageKind, MessageLog};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

fn kind_style(kind: MessageKind) -> Style {
    match kind {
        MessageKind::Look => Style::default().fg(Color::White),
        MessageKind::Success => Style::default().fg(Color::Green),
        MessageKind::Info => Style::default().fg(Color::Cyan),
        MessageKind::System => Style::default().fg(Color::Yellow),
        MessageKind::Error => Style::default().fg(Color::Red),
        MessageKind::Win => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        MessageKind::Command => Style::default().fg(Color::DarkGray),
    }
}

/// Hard-wrap to `width` terminal cells; blank lines stay as one empty row.
/// A glyph wider than the whole row gets a row of its own.
fn wrap_cells(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(c);
        used += w;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

/// Scrollback window, bottom-anchored like a terminal
pub struct NarrativeWindow<'a> {
    pub log: &'a MessageLog,
    pub show_timestamps: bool,
}

impl<'a> NarrativeWindow<'a> {
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let rows = area.height.saturating_sub(2) as usize;
        let width = area.width.saturating_sub(2) as usize;

        // Wrapping only ever grows the row count, so `rows` logical lines is enough
        let mut wrapped: Vec<Line> = Vec::new();
        for line in self.log.visible_lines(rows) {
            let style = kind_style(line.kind);
            let text = if self.show_timestamps {
                format!("[{}] {}", line.received_at.format("%H:%M"), line.text)
            } else {
                line.text.clone()
            };
            for row in wrap_cells(&text, width) {
                wrapped.push(Line::from(Span::styled(row, style)));
            }
        }
        let skip = wrapped.len().saturating_sub(rows);
        let lines: Vec<Line> = wrapped.into_iter().skip(skip).collect();

        let title = if self.log.is_live() {
            "Haunted Mansion".to_string()
        } else {
            format!("Haunted Mansion [scrollback -{}]", self.log.scroll_offset)
        };

        Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .render(area, buf);
    }
}
