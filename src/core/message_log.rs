//! Scrollback for everything the server tells the player.
//!
//! Entries are split into logical lines on arrival so the frontend can scroll
//! line by line. Wrapping to the window width is left to the renderer.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Category of a log entry, mirrors the server's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Look,
    Success,
    Info,
    System,
    Error,
    Win,
    /// Local echo of a submitted command
    Command,
}

impl MessageKind {
    /// Map the wire `type` string; anything missing or unknown is `System`
    pub fn from_wire(kind: Option<&str>) -> Self {
        match kind {
            Some("look") => Self::Look,
            Some("success") => Self::Success,
            Some("info") => Self::Info,
            Some("system") => Self::System,
            Some("error") => Self::Error,
            Some("win") => Self::Win,
            _ => Self::System,
        }
    }

    /// Whether payloads of this kind may carry a refreshed action section
    pub fn refreshes_menu(self) -> bool {
        matches!(self, Self::Look | Self::Success)
    }
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub kind: MessageKind,
    pub text: String,
    pub received_at: DateTime<Local>,
}

pub struct MessageLog {
    /// Logical lines, oldest first
    pub lines: VecDeque<LogLine>,

    /// Maximum number of lines to keep in buffer
    pub max_lines: usize,

    /// Scroll offset from bottom (0 = live view, >0 = scrolled back)
    pub scroll_offset: usize,
}

impl MessageLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            scroll_offset: 0,
        }
    }

    /// Append one message. Multi-line payloads become several lines sharing a timestamp;
    /// an empty payload still takes one blank line.
    pub fn push(&mut self, kind: MessageKind, text: &str) {
        let received_at = Local::now();
        let lines: Vec<&str> = if text.is_empty() {
            vec![""]
        } else {
            text.lines().collect()
        };
        for line in lines {
            self.lines.push_back(LogLine {
                kind,
                text: line.to_string(),
                received_at,
            });
            // Keep the view anchored while the user is reading scrollback
            if self.scroll_offset > 0 {
                self.scroll_offset += 1;
            }
        }

        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
        self.scroll_offset = self.scroll_offset.min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(n).min(max);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn is_live(&self) -> bool {
        self.scroll_offset == 0
    }

    /// Lines that fit in `height` rows at the current scroll position
    pub fn visible_lines(&self, height: usize) -> impl Iterator<Item = &LogLine> {
        let end = self.lines.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(height);
        self.lines.range(start..end)
    }
}
