//! Seam between the menu core and whatever carries commands to the server.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Not connected to server")]
    NotConnected,

    #[error("Connection task has shut down")]
    Closed,
}

/// Outbound half of the game transport as seen by the menu core
pub trait MessageChannel {
    fn is_connected(&self) -> bool;

    /// Queue one `command` event. Must fail with `NotConnected` rather than
    /// buffer while the transport is down.
    fn send(&mut self, command: &str) -> Result<(), ChannelError>;
}
