#![forbid(unsafe_code)]

//! Terminal session lifecycle.
//!
//! Creating a [`TerminalSession`] enters raw mode and enables the requested
//! modes; dropping it (or panicking) restores the terminal.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use cardio_core::Event;
use tracing::info;

/// Modes to enable for the session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Draw on the alternate screen buffer, restoring scrollback on exit.
    pub alternate_screen: bool,
    /// Report mouse clicks, drags and wheel.
    pub mouse_capture: bool,
}

/// Raw-mode terminal session. Only one should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        crossterm::terminal::enable_raw_mode()?;
        info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            mouse_enabled: false,
        };
        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
        }
        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
        }
        Ok(session)
    }

    /// Terminal size as (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read one event. `None` for events without a canonical mapping.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(Event::from_crossterm(event))
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        crossterm::execute!(io::stdout(), crossterm::cursor::Hide)
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
        }
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        info!("terminal restored");
        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Restore the terminal without knowing which modes were enabled.
fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(
        stdout,
        crossterm::event::DisableMouseCapture,
        crossterm::cursor::Show,
        crossterm::terminal::LeaveAlternateScreen
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}
