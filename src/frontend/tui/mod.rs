//! TUI Frontend (ratatui-based)
//!
//! Implements the Frontend trait using ratatui for terminal rendering.
//! It wraps crossterm for event handling and terminal management.

pub mod app;
pub mod command_menu;
pub mod narrative_window;

pub use app::TuiFrontend;
