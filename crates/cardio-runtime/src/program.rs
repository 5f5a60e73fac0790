#![forbid(unsafe_code)]

//! Model/update/view runtime.
//!
//! A [`Program`] owns a [`Model`] and a terminal session. It feeds terminal
//! events through `update`, executes the returned [`Cmd`]s and redraws the
//! view when something changed. Blocking work runs as [`Cmd::Task`] on a
//! background thread; its result comes back as a message over a channel.

use std::io::{self, Stdout, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cardio_core::Event;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{cursor, queue, terminal};
use tracing::{debug, debug_span, info, info_span, warn};

use crate::frame::{Emphasis, Frame};
use crate::session::{SessionOptions, TerminalSession};

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages that drive state transitions. Terminal events convert into
    /// messages; background tasks produce them directly.
    type Message: From<Event> + Send + 'static;

    /// Startup commands.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state.
    fn view(&self, frame: &mut Frame);
}

/// Metadata for a background task.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    /// Name for diagnostics.
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Side effects requested by `init` and `update`.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Stop the program.
    Quit,
    /// Several commands, executed in order; stops early on quit.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Run a blocking closure off the event loop; its result is sent back
    /// as a message.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Batch of commands, collapsed when empty or singular.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    /// Background task.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Named background task.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::named(name), Box::new(f))
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Task(..) => "Task",
        }
    }

    /// Number of atomic commands.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

/// Terminal program configuration.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Capture mouse events (needed for wheel on sliders).
    pub mouse: bool,
    /// Render on the alternate screen.
    pub alternate_screen: bool,
    /// Upper bound on how long the loop waits for input.
    pub poll_interval: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            mouse: false,
            alternate_screen: true,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }
}

/// The terminal event loop.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    out: Stdout,
    config: ProgramConfig,
    running: bool,
    dirty: bool,
    task_tx: mpsc::Sender<M::Message>,
    task_rx: mpsc::Receiver<M::Message>,
    in_flight: usize,
}

impl<M: Model> Program<M> {
    /// Enter the terminal session.
    pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
        })?;
        let (task_tx, task_rx) = mpsc::channel();
        Ok(Self {
            model,
            session,
            out: io::stdout(),
            config,
            running: true,
            dirty: true,
            task_tx,
            task_rx,
            in_flight: 0,
        })
    }

    /// Run until the model quits.
    pub fn run(&mut self) -> io::Result<()> {
        let _span = info_span!("program").entered();
        info!(mouse = self.config.mouse, "program started");
        self.session.hide_cursor()?;
        let cmd = self.model.init();
        self.execute(cmd);
        let (width, height) = self.session.size()?;
        self.dispatch(M::Message::from(Event::Resize { width, height }));

        while self.running {
            while let Ok(msg) = self.task_rx.try_recv() {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.dispatch(msg);
            }
            if self.dirty {
                self.render()?;
            }
            if !self.running {
                break;
            }

            if self.session.poll_event(self.config.poll_interval)?
                && let Some(event) = self.session.read_event()?
            {
                self.dispatch(M::Message::from(event));
            }
        }
        info!(pending_tasks = self.in_flight, "program stopped");
        Ok(())
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = {
            let _span = debug_span!("update").entered();
            self.model.update(msg)
        };
        self.dirty = true;
        self.execute(cmd);
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch(m),
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Task(spec, f) => {
                let tx = self.task_tx.clone();
                let name = spec.name.unwrap_or_else(|| "task".to_string());
                debug!(task = %name, "spawning task");
                self.in_flight += 1;
                let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                    let msg = f();
                    let _ = tx.send(msg);
                });
                if let Err(err) = spawned {
                    self.in_flight -= 1;
                    warn!(task = %name, error = %err, "failed to spawn task");
                }
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.session.size()?;
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        write_frame(&mut self.out, &frame)?;
        self.dirty = false;
        Ok(())
    }
}

/// Paint every row of `frame` onto the terminal.
fn write_frame(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    for (y, (text, emphasis)) in (0u16..).zip(frame.rows()) {
        queue!(
            out,
            cursor::MoveTo(0, y),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        match emphasis {
            Emphasis::Plain => {}
            Emphasis::Bold => queue!(out, SetAttribute(Attribute::Bold))?,
            Emphasis::Reverse => queue!(out, SetAttribute(Attribute::Reverse))?,
            Emphasis::Dim => queue!(out, SetAttribute(Attribute::Dim))?,
        }
        queue!(out, Print(text), SetAttribute(Attribute::Reset))?;
    }
    out.flush()
}
