//! Action menu state machine
//!
//! Owns the command list derived from the last narrative payload, the
//! selection cursor into it, and the request gate that allows at most one
//! command in flight. Every mutation of those three goes through here.
//!
//! Gate states:
//! - `Idle`: submit permitted
//! - `Pending`: a command was sent; submit rejected, arrows optionally rejected
//!
//! `Pending` is left only when the next `game_message` arrives, whatever its
//! kind or content. There is no timeout: if the server never answers the menu
//! stays `Pending` until a later payload shows up.

use crate::core::channel::{ChannelError, MessageChannel};
use crate::core::message_log::MessageKind;
use crate::core::parser::{Command, NarrativeParser};
use serde::{Deserialize, Serialize};

/// Whether arrow keys may move the cursor while a command is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingNavigation {
    /// Arrows are ignored while `Pending`
    #[default]
    Block,
    /// Only submission is blocked while `Pending`
    Allow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Pending,
}

/// What a submit attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Command handed to the channel, gate is now `Pending`
    Sent(Command),
    /// Nothing to submit
    EmptyMenu,
    /// A previous command is still in flight
    AlreadyPending,
    /// Click landed on an entry that no longer exists
    StaleSelection,
    /// Transport refused the command, gate rolled back to `Idle`
    Failed(ChannelError),
}

pub struct MenuController<C: MessageChannel> {
    parser: NarrativeParser,
    channel: C,
    commands: Vec<Command>,
    cursor: usize,
    awaiting_response: bool,
    pending_navigation: PendingNavigation,
}

impl<C: MessageChannel> MenuController<C> {
    pub fn new(channel: C, pending_navigation: PendingNavigation) -> Self {
        Self {
            parser: NarrativeParser::new(),
            channel,
            commands: Vec::new(),
            cursor: 0,
            awaiting_response: false,
            pending_navigation,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Selected index, `None` while the menu is empty
    pub fn cursor(&self) -> Option<usize> {
        if self.commands.is_empty() {
            None
        } else {
            Some(self.cursor)
        }
    }

    pub fn gate(&self) -> GateState {
        if self.awaiting_response {
            GateState::Pending
        } else {
            GateState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.awaiting_response
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Inbound `game_message`. Always releases the gate; only look/success
    /// payloads are allowed to touch the menu. Returns true if the menu was replaced.
    pub fn handle_game_message(&mut self, text: &str, kind: MessageKind) -> bool {
        if self.awaiting_response {
            tracing::debug!("Response received, releasing request gate");
        }
        self.awaiting_response = false;

        if kind.refreshes_menu() {
            self.apply_narrative(text)
        } else {
            false
        }
    }

    /// Replace the menu from a narrative payload. Payloads without an action
    /// section leave the current menu and cursor as they are.
    pub fn apply_narrative(&mut self, text: &str) -> bool {
        match self.parser.parse(text) {
            Some(commands) => {
                tracing::debug!("Menu replaced with {} commands", commands.len());
                self.commands = commands;
                self.cursor = 0;
                true
            }
            None => false,
        }
    }

    fn navigation_blocked(&self) -> bool {
        self.awaiting_response && self.pending_navigation == PendingNavigation::Block
    }

    pub fn move_next(&mut self) {
        if self.commands.is_empty() || self.navigation_blocked() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.commands.len();
    }

    pub fn move_previous(&mut self) {
        if self.commands.is_empty() || self.navigation_blocked() {
            return;
        }
        let len = self.commands.len();
        self.cursor = (self.cursor + len - 1) % len;
    }

    /// Jump to the first entry (Home)
    pub fn move_first(&mut self) {
        if self.commands.is_empty() || self.navigation_blocked() {
            return;
        }
        self.cursor = 0;
    }

    /// Jump to the last entry (End)
    pub fn move_last(&mut self) {
        if self.commands.is_empty() || self.navigation_blocked() {
            return;
        }
        self.cursor = self.commands.len() - 1;
    }

    /// Send the selected command if the gate is `Idle`
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.commands.is_empty() {
            tracing::debug!("No commands available, ignoring submit");
            return SubmitOutcome::EmptyMenu;
        }
        if self.awaiting_response {
            tracing::debug!("Already waiting for response, ignoring submit");
            return SubmitOutcome::AlreadyPending;
        }

        let command = self.commands[self.cursor].clone();
        self.awaiting_response = true;

        match self.channel.send(command.as_str()) {
            Ok(()) => {
                tracing::info!("Sent command: {}", command);
                SubmitOutcome::Sent(command)
            }
            Err(e) => {
                // The attempt never happened as far as the gate is concerned
                self.awaiting_response = false;
                tracing::error!(error = %e, "Failed to send command '{}'", command);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Pointer click on entry `index`: select it and submit as one step.
    /// Indexes from a stale render are rejected without touching the cursor.
    pub fn select_and_submit(&mut self, index: usize) -> SubmitOutcome {
        if index >= self.commands.len() {
            tracing::debug!(
                "Click on entry {} ignored, menu has {} entries",
                index,
                self.commands.len()
            );
            return SubmitOutcome::StaleSelection;
        }
        if self.awaiting_response {
            tracing::debug!("Already waiting for response, ignoring click");
            return SubmitOutcome::AlreadyPending;
        }

        self.cursor = index;
        self.submit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "You see a key.\n💡 What to do:\n• take the 'take key'\n• go 'go north'\n";

    /// Channel that records what it was asked to send
    #[derive(Default)]
    struct RecordingChannel {
        sent: Vec<String>,
        disconnected: bool,
    }

    impl MessageChannel for RecordingChannel {
        fn is_connected(&self) -> bool {
            !self.disconnected
        }

        fn send(&mut self, command: &str) -> Result<(), ChannelError> {
            if self.disconnected {
                return Err(ChannelError::NotConnected);
            }
            self.sent.push(command.to_string());
            Ok(())
        }
    }

    fn controller(policy: PendingNavigation) -> MenuController<RecordingChannel> {
        MenuController::new(RecordingChannel::default(), policy)
    }

    fn loaded(policy: PendingNavigation) -> MenuController<RecordingChannel> {
        let mut menu = controller(policy);
        assert!(menu.handle_game_message(FIXTURE, MessageKind::Look));
        menu
    }

    fn menu_text(len: usize) -> String {
        let mut text = String::from("Room.\n💡 What to do:\n");
        for i in 0..len {
            text.push_str(&format!("• 'cmd {}'\n", i));
        }
        text
    }

    fn assert_cursor_in_bounds(menu: &MenuController<RecordingChannel>) {
        match menu.cursor() {
            None => assert!(menu.commands().is_empty()),
            Some(c) => assert!(c < menu.commands().len()),
        }
    }

    #[test]
    fn test_starts_empty_and_idle() {
        let menu = controller(PendingNavigation::Block);
        assert!(menu.commands().is_empty());
        assert_eq!(menu.cursor(), None);
        assert_eq!(menu.gate(), GateState::Idle);
    }

    #[test]
    fn test_look_message_replaces_menu_and_resets_cursor() {
        let mut menu = loaded(PendingNavigation::Block);
        menu.move_next();
        assert_eq!(menu.cursor(), Some(1));

        menu.handle_game_message(FIXTURE, MessageKind::Success);
        let texts: Vec<&str> = menu.commands().iter().map(Command::as_str).collect();
        assert_eq!(texts, vec!["take key", "go north"]);
        assert_eq!(menu.cursor(), Some(0));
    }

    #[test]
    fn test_wrap_around() {
        let mut menu = controller(PendingNavigation::Block);
        menu.apply_narrative(&menu_text(3));

        menu.move_previous();
        assert_eq!(menu.cursor(), Some(2));
        menu.move_next();
        assert_eq!(menu.cursor(), Some(0));
        menu.move_last();
        menu.move_next();
        assert_eq!(menu.cursor(), Some(0));
    }

    #[test]
    fn test_navigation_on_empty_menu_is_noop() {
        let mut menu = controller(PendingNavigation::Block);
        menu.move_next();
        menu.move_previous();
        menu.move_first();
        menu.move_last();
        assert_eq!(menu.cursor(), None);
    }

    #[test]
    fn test_cursor_stays_in_bounds_across_replacements() {
        let mut menu = controller(PendingNavigation::Allow);
        let sizes = [4, 1, 0, 3, 7, 2];

        for (step, len) in sizes.iter().enumerate() {
            menu.apply_narrative(&menu_text(*len));
            assert_cursor_in_bounds(&menu);
            for i in 0..(step + 5) {
                if i % 3 == 0 {
                    menu.move_previous();
                } else {
                    menu.move_next();
                }
                assert_cursor_in_bounds(&menu);
            }
        }
    }

    #[test]
    fn test_payload_without_marker_changes_nothing() {
        let mut menu = loaded(PendingNavigation::Block);
        menu.move_next();

        assert!(!menu.handle_game_message("You feel a chill.", MessageKind::Look));
        assert_eq!(menu.commands().len(), 2);
        assert_eq!(menu.cursor(), Some(1));
    }

    #[test]
    fn test_marker_with_empty_section_clears_menu() {
        let mut menu = loaded(PendingNavigation::Block);
        assert!(menu.apply_narrative("💡 What to do:\n"));
        assert!(menu.commands().is_empty());
        assert_eq!(menu.cursor(), None);
        assert_eq!(menu.submit(), SubmitOutcome::EmptyMenu);
    }

    #[test]
    fn test_submit_twice_sends_once() {
        let mut menu = loaded(PendingNavigation::Block);

        assert_eq!(menu.submit(), SubmitOutcome::Sent(Command::from("take key")));
        assert_eq!(menu.submit(), SubmitOutcome::AlreadyPending);
        assert_eq!(menu.channel().sent, vec!["take key"]);
        assert_eq!(menu.gate(), GateState::Pending);
    }

    #[test]
    fn test_any_message_kind_releases_gate() {
        let kinds = [
            MessageKind::Look,
            MessageKind::Success,
            MessageKind::Info,
            MessageKind::System,
            MessageKind::Error,
            MessageKind::Win,
        ];
        for kind in kinds {
            let mut menu = loaded(PendingNavigation::Block);
            menu.submit();
            assert!(menu.is_pending());

            menu.handle_game_message("anything", kind);
            assert_eq!(menu.gate(), GateState::Idle, "kind {:?}", kind);
        }
    }

    #[test]
    fn test_info_message_releases_gate_but_keeps_menu() {
        let mut menu = loaded(PendingNavigation::Block);
        menu.submit();

        let replaced = menu.handle_game_message(
            "info only\n💡 What to do:\n• 'go south'\n",
            MessageKind::Info,
        );
        assert!(!replaced);
        assert_eq!(menu.gate(), GateState::Idle);
        let texts: Vec<&str> = menu.commands().iter().map(Command::as_str).collect();
        assert_eq!(texts, vec!["take key", "go north"]);
    }

    #[test]
    fn test_click_sends_selected_entry() {
        let mut menu = loaded(PendingNavigation::Block);

        let outcome = menu.select_and_submit(1);
        assert_eq!(outcome, SubmitOutcome::Sent(Command::from("go north")));
        assert_eq!(menu.channel().sent, vec!["go north"]);
        assert_eq!(menu.gate(), GateState::Pending);
        assert_eq!(menu.cursor(), Some(1));
    }

    #[test]
    fn test_click_out_of_range_is_rejected() {
        let mut menu = loaded(PendingNavigation::Block);

        assert_eq!(menu.select_and_submit(2), SubmitOutcome::StaleSelection);
        assert_eq!(menu.cursor(), Some(0));
        assert_eq!(menu.gate(), GateState::Idle);
        assert!(menu.channel().sent.is_empty());
    }

    #[test]
    fn test_click_while_pending_keeps_cursor() {
        let mut menu = loaded(PendingNavigation::Allow);
        menu.submit();

        assert_eq!(menu.select_and_submit(1), SubmitOutcome::AlreadyPending);
        assert_eq!(menu.cursor(), Some(0));
        assert_eq!(menu.channel().sent.len(), 1);
    }

    #[test]
    fn test_disconnected_submit_rolls_back_gate() {
        let mut menu = loaded(PendingNavigation::Block);
        menu.channel_mut().disconnected = true;

        assert_eq!(
            menu.submit(),
            SubmitOutcome::Failed(ChannelError::NotConnected)
        );
        assert_eq!(menu.gate(), GateState::Idle);

        menu.channel_mut().disconnected = false;
        assert_eq!(menu.submit(), SubmitOutcome::Sent(Command::from("take key")));
    }

    #[test]
    fn test_block_policy_freezes_cursor_while_pending() {
        let mut menu = loaded(PendingNavigation::Block);
        menu.submit();

        menu.move_next();
        menu.move_last();
        assert_eq!(menu.cursor(), Some(0));

        menu.handle_game_message("ok", MessageKind::Error);
        menu.move_next();
        assert_eq!(menu.cursor(), Some(1));
    }

    #[test]
    fn test_allow_policy_moves_cursor_while_pending() {
        let mut menu = loaded(PendingNavigation::Allow);
        menu.submit();

        menu.move_next();
        assert_eq!(menu.cursor(), Some(1));
        assert_eq!(menu.submit(), SubmitOutcome::AlreadyPending);
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: PendingNavigation,
        }
        let w: Wrapper = toml::from_str("policy = \"allow\"").unwrap();
        assert_eq!(w.policy, PendingNavigation::Allow);
    }
}
