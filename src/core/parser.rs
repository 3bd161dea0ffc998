//! Narrative parser for the server's "What to do" section.
//!
//! The server has no structured action protocol; it embeds the currently valid
//! commands in the narrative text as a bulleted list of quoted commands after a
//! fixed header. These literals must match the server byte for byte.

use regex::Regex;

/// Header that opens the action section of a narrative payload
pub const ACTION_MARKER: &str = "💡 What to do:";

/// Glyph that starts every action line
pub const BULLET: char = '•';

/// One player-issuable action, identified by its exact text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

pub struct NarrativeParser {
    quoted: Regex,
}

impl NarrativeParser {
    pub fn new() -> Self {
        Self {
            // Non-empty text between the first pair of single quotes
            quoted: Regex::new(r"'([^']+)'").expect("quoted command pattern is valid"),
        }
    }

    /// Extract the command list from a narrative payload.
    ///
    /// Returns `None` when the payload carries no action section, meaning the
    /// caller must leave its current menu alone. `Some(vec![])` is a real
    /// result: the section was present but offered nothing.
    pub fn parse(&self, text: &str) -> Option<Vec<Command>> {
        let start = text.find(ACTION_MARKER)?;
        let body = &text[start + ACTION_MARKER.len()..];

        let commands = body
            .lines()
            .filter(|line| line.trim().starts_with(BULLET))
            .filter_map(|line| {
                let extracted = self.quoted.captures(line).map(|caps| Command(caps[1].to_string()));
                if extracted.is_none() {
                    tracing::debug!("Skipping action line without quoted command: {:?}", line);
                }
                extracted
            })
            .collect();

        Some(commands)
    }
}

impl Default for NarrativeParser {
    fn default() -> Self {
        Self::new()
    }
}
