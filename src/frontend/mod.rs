//! Frontend abstraction layer
//!
//! This module defines the `Frontend` trait the terminal UI implements.
//! It provides a unified interface for event polling, rendering, and cleanup.

pub mod events;
pub mod tui;

use crate::core::AppCore;
use anyhow::Result;
pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// Frontend trait
///
/// Separates rendering concerns from business logic. The frontend reads
/// `AppCore` to draw and reports raw input as `FrontendEvent`s; it never
/// mutates menu state itself.
pub trait Frontend {
    /// Poll for user input events
    ///
    /// Returns all pending events (keyboard, mouse, resize) converted to the
    /// frontend-agnostic `FrontendEvent` enum, or an empty list if none arrived
    /// within the poll timeout.
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>>;

    /// Render the current application state
    fn render(&mut self, core: &AppCore) -> Result<()>;

    /// Restore the terminal before exit
    fn cleanup(&mut self) -> Result<()>;

    /// Current terminal size in cells
    fn size(&self) -> (u16, u16);
}
