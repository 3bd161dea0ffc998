use crate::config::Config;
use crate::core::channel::MessageChannel;
use crate::core::input_router::MenuAction;
use crate::core::menu::{MenuController, SubmitOutcome};
use crate::core::message_log::{MessageKind, MessageLog};
use crate::network::{ClientEvent, CommandSender, ServerEvent, ServerMessage};
use crate::session::SessionInfo;
use tokio::sync::mpsc;

/// Rows moved per PageUp/PageDown or wheel notch in the log
const SCROLL_STEP: usize = 5;

/// Core application state (frontend-agnostic)
///
/// Routes transport events and user input into the menu controller and the
/// visible log. Performs no I/O of its own: outbound traffic goes through the
/// `CommandSender` queue and rendering reads the public fields.
pub struct AppCore {
    pub config: Config,

    pub session: SessionInfo,

    /// Command list, cursor and request gate
    pub menu: MenuController<CommandSender>,

    /// Everything shown in the narrative window
    pub log: MessageLog,

    /// Connection id assigned by the server on `connected`
    pub server_session_id: Option<String>,

    /// Application running flag
    pub running: bool,

    /// Set whenever visible state changed since the last frame
    pub needs_render: bool,
}

impl AppCore {
    pub fn new(
        config: Config,
        session: SessionInfo,
        command_tx: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        let menu = MenuController::new(
            CommandSender::new(command_tx),
            config.menu.navigation_while_pending,
        );
        let log = MessageLog::new(config.ui.buffer_size);

        Self {
            config,
            session,
            menu,
            log,
            server_session_id: None,
            running: true,
            needs_render: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.menu.channel().is_connected()
    }

    /// Apply one message from the transport task
    pub fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Connected => {
                tracing::info!("Transport connected");
                self.menu.channel_mut().set_connected(true);
            }
            ServerMessage::Disconnected => {
                tracing::warn!("Transport disconnected");
                // Reader and writer can both notice the same drop
                if self.is_connected() {
                    self.menu.channel_mut().set_connected(false);
                    self.log.push(MessageKind::Error, "Disconnected from server.");
                }
            }
            ServerMessage::ConnectFailed(reason) => {
                tracing::error!("{}", reason);
                self.menu.channel_mut().set_connected(false);
                self.log.push(MessageKind::Error, &reason);
            }
            ServerMessage::Event(event) => self.handle_server_event(event),
        }
        self.needs_render = true;
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected { session_id } => {
                tracing::info!("Connected with session ID: {}", session_id);
                self.server_session_id = Some(session_id);
                self.join_game();
            }
            ServerEvent::GameMessage { message, kind } => {
                let kind = MessageKind::from_wire(kind.as_deref());
                self.log.push(kind, &message);
                self.menu.handle_game_message(&message, kind);
            }
            ServerEvent::PlayerJoined { player_name } => {
                self.log.push(
                    MessageKind::Info,
                    &format!("{} has entered the area.", player_name),
                );
            }
            ServerEvent::PlayerLeft { player_name } => {
                self.log.push(
                    MessageKind::Info,
                    &format!("{} has left the area.", player_name),
                );
            }
            ServerEvent::PlayerArrived { player_name } => {
                self.log.push(
                    MessageKind::Info,
                    &format!("{} has arrived.", player_name),
                );
            }
            ServerEvent::GameWon { player_name } => {
                self.log.push(
                    MessageKind::Win,
                    &format!("🎉 {} has escaped the mansion! 🎉", player_name),
                );
            }
        }
    }

    fn join_game(&mut self) {
        let join = ClientEvent::JoinGame {
            name: self.session.player_name.clone(),
            session_code: self.session.session_code.clone(),
        };
        match self.menu.channel_mut().send_event(join) {
            Ok(()) => tracing::info!(
                "Joining session {} as {}",
                self.session.session_code,
                self.session.player_name
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to send join request");
                self.log.push(MessageKind::Error, &e.to_string());
            }
        }
    }

    /// Apply a keyboard action
    pub fn handle_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::NavigateUp => self.menu.move_previous(),
            MenuAction::NavigateDown => self.menu.move_next(),
            MenuAction::First => self.menu.move_first(),
            MenuAction::Last => self.menu.move_last(),
            MenuAction::Select => {
                let outcome = self.menu.submit();
                self.report_submit(outcome);
            }
            MenuAction::ScrollUp => self.log.scroll_up(SCROLL_STEP),
            MenuAction::ScrollDown => self.log.scroll_down(SCROLL_STEP),
            MenuAction::ScrollToBottom => self.log.scroll_to_bottom(),
            MenuAction::Quit => self.running = false,
            MenuAction::None => return,
        }
        self.needs_render = true;
    }

    /// Pointer click on menu entry `index` as rendered
    pub fn handle_menu_click(&mut self, index: usize) {
        let outcome = self.menu.select_and_submit(index);
        self.report_submit(outcome);
        self.needs_render = true;
    }

    pub fn scroll_log(&mut self, up: bool) {
        if up {
            self.log.scroll_up(SCROLL_STEP);
        } else {
            self.log.scroll_down(SCROLL_STEP);
        }
        self.needs_render = true;
    }

    /// Only transport failures reach the log; empty/pending rejections are routine races
    fn report_submit(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Sent(command) => {
                if self.config.menu.echo_commands {
                    self.log.push(MessageKind::Command, &format!("> {}", command));
                }
                self.log.scroll_to_bottom();
            }
            SubmitOutcome::Failed(e) => {
                self.log.push(MessageKind::Error, &e.to_string());
            }
            SubmitOutcome::EmptyMenu
            | SubmitOutcome::AlreadyPending
            | SubmitOutcome::StaleSelection => {}
        }
    }
}
