//! Input routing for the action menu
//!
//! Translates raw key events into semantic `MenuAction`s so the core never
//! matches on crossterm key codes directly.

use crossterm::event::{KeyCode, KeyModifiers};

/// All actions the game screen reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    // Menu navigation
    NavigateUp,
    NavigateDown,
    First,
    Last,

    // Submit selected command
    Select,

    // Log scrolling
    ScrollUp,
    ScrollDown,
    ScrollToBottom,

    Quit,

    // Key not bound
    None,
}

/// Route a key event to a MenuAction
pub fn route_input(code: KeyCode, modifiers: KeyModifiers) -> MenuAction {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => MenuAction::Quit,
            KeyCode::End => MenuAction::ScrollToBottom,
            _ => MenuAction::None,
        };
    }

    match code {
        KeyCode::Up => MenuAction::NavigateUp,
        KeyCode::Down => MenuAction::NavigateDown,
        KeyCode::Home => MenuAction::First,
        KeyCode::End => MenuAction::Last,
        KeyCode::Enter => MenuAction::Select,
        KeyCode::PageUp => MenuAction::ScrollUp,
        KeyCode::PageDown => MenuAction::ScrollDown,
        KeyCode::Esc => MenuAction::Quit,
        _ => MenuAction::None,
    }
}
