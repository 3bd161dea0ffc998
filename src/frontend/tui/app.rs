use super::command_menu::{CommandMenu, MenuHitMap};
use super::narrative_window::NarrativeWindow;
use crate::core::menu::GateState;
use crate::core::AppCore;
use crate::frontend::{Frontend, FrontendEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io;
use std::time::Duration;

/// Split the screen into log, menu and status line
pub fn screen_layout(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(32)])
        .split(rows[0]);
    (columns[0], columns[1], rows[1])
}

fn status_line(core: &AppCore) -> Line<'static> {
    let (gate_text, gate_color) = match core.menu.gate() {
        GateState::Idle => ("Ready", Color::Green),
        GateState::Pending => ("Waiting...", Color::Yellow),
    };
    let (conn_text, conn_color) = if core.is_connected() {
        ("online", Color::Green)
    } else {
        ("offline", Color::Red)
    };

    Line::from(vec![
        Span::raw(format!(
            " Playing as: {} | Room: {} | ",
            core.session.player_name, core.session.session_code
        )),
        Span::styled(gate_text, Style::default().fg(gate_color)),
        Span::raw(" | "),
        Span::styled(conn_text, Style::default().fg(conn_color)),
        Span::styled(
            "  ↑↓ select, Enter run, PgUp/PgDn scroll, Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// TUI Frontend using ratatui
///
/// Renders the game screen with ratatui and handles events via crossterm.
pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    poll_timeout: Duration,
    /// Menu geometry from the last frame
    menu_hits: Option<MenuHitMap>,
    log_area: Rect,
}

impl TuiFrontend {
    /// Create a new TUI frontend
    ///
    /// Initializes terminal in raw mode, enables mouse capture, and enters alternate screen.
    pub fn new(poll_timeout: Duration) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            poll_timeout,
            menu_hits: None,
            log_area: Rect::default(),
        })
    }

    /// Menu entry under a click, using the geometry of the last frame
    pub fn menu_entry_at(&self, x: u16, y: u16) -> Option<usize> {
        self.menu_hits.and_then(|hits| hits.entry_at(x, y))
    }

    pub fn is_over_log(&self, x: u16, y: u16) -> bool {
        let area = self.log_area;
        x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
    }

    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => {
                // Only process key press events (ignore repeats and releases)
                if key_event.kind != KeyEventKind::Press {
                    return None;
                }
                Some(FrontendEvent::key(key_event.code, key_event.modifiers))
            }
            Event::Mouse(mouse_event) => Some(FrontendEvent::mouse(
                mouse_event.kind,
                mouse_event.column,
                mouse_event.row,
            )),
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            _ => None,
        }
    }
}

impl Frontend for TuiFrontend {
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>> {
        let mut events = Vec::new();

        let mut timeout = self.poll_timeout;
        while event::poll(timeout)? {
            if let Some(frontend_event) = Self::convert_event(event::read()?) {
                events.push(frontend_event);
            }
            // Drain whatever else is already queued without waiting again
            timeout = Duration::ZERO;
        }

        Ok(events)
    }

    fn render(&mut self, core: &AppCore) -> Result<()> {
        let mut menu_hits = None;
        let mut log_area = Rect::default();

        self.terminal.draw(|f| {
            let (log_rect, menu_rect, status_rect) = screen_layout(f.area());
            log_area = log_rect;

            NarrativeWindow {
                log: &core.log,
                show_timestamps: core.config.ui.show_timestamps,
            }
            .render(log_rect, f.buffer_mut());

            let menu = CommandMenu {
                commands: core.menu.commands(),
                cursor: core.menu.cursor(),
                pending: core.menu.is_pending(),
                show_icons: core.config.ui.show_icons,
            };
            menu_hits = Some(menu.render(menu_rect, f.buffer_mut()));

            f.render_widget(Paragraph::new(status_line(core)), status_rect);
        })?;

        self.menu_hits = menu_hits;
        self.log_area = log_area;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let size = self.terminal.size().unwrap_or_default();
        (size.width, size.height)
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        // Ensure terminal is restored even if cleanup() wasn't called
        let _ = self.cleanup();
    }
}
