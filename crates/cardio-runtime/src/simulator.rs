#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal. Events and
//! messages are injected directly, background tasks run synchronously, and
//! frames are captured for assertions.
//!
//! ```
//! use cardio_core::{Event, KeyCode};
//! use cardio_runtime::{Cmd, Frame, Model, ProgramSimulator};
//!
//! struct Keys(u32);
//!
//! impl Model for Keys {
//!     type Message = Event;
//!     fn update(&mut self, _msg: Event) -> Cmd<Event> {
//!         self.0 += 1;
//!         Cmd::none()
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         frame.set_line(0, &format!("keys: {}", self.0));
//!     }
//! }
//!
//! let mut sim = ProgramSimulator::new(Keys(0));
//! sim.init();
//! sim.inject_event(Event::key(KeyCode::Enter));
//! assert!(sim.capture_frame(20, 1).contains("keys: 1"));
//! ```

use cardio_core::Event;

use crate::frame::Frame;
use crate::program::{Cmd, Model};

/// Record of a command executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    /// Background task, executed synchronously. Carries the task name.
    Task(Option<String>),
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Frame>,
    command_log: Vec<CmdRecord>,
    running: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Feed events through `From<Event>` and `update`. Stops after a quit.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a message to `update`.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Render the model into a fresh frame and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` once a `Cmd::Quit` ran.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Number of tasks executed so far.
    pub fn task_count(&self) -> usize {
        self.command_log
            .iter()
            .filter(|r| matches!(r, CmdRecord::Task(_)))
            .count()
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
        }
    }

    fn execute_all(&mut self, cmds: Vec<Cmd<M::Message>>) {
        for c in cmds {
            self.execute_cmd(c);
            if !self.running {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_core::KeyCode;

    struct Counter {
        value: i32,
        initialized: bool,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Decrement,
        Quit,
        Fetch,
        Fetched(i32),
        Other,
    }

    impl From<Event> for CounterMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.code == KeyCode::Char('+') => Self::Increment,
                Event::Key(k) if k.code == KeyCode::Char('-') => Self::Decrement,
                Event::Key(k) if k.code == KeyCode::Char('q') => Self::Quit,
                Event::Key(k) if k.code == KeyCode::Char('f') => Self::Fetch,
                _ => Self::Other,
            }
        }
    }

    impl Model for Counter {
        type Message = CounterMsg;

        fn init(&mut self) -> Cmd<CounterMsg> {
            self.initialized = true;
            Cmd::msg(CounterMsg::Increment)
        }

        fn update(&mut self, msg: CounterMsg) -> Cmd<CounterMsg> {
            match msg {
                CounterMsg::Increment => self.value += 1,
                CounterMsg::Decrement => self.value -= 1,
                CounterMsg::Quit => return Cmd::quit(),
                CounterMsg::Fetch => {
                    return Cmd::batch(vec![
                        Cmd::msg(CounterMsg::Decrement),
                        Cmd::task_named("fetch", || CounterMsg::Fetched(10)),
                    ]);
                }
                CounterMsg::Fetched(v) => self.value = v,
                CounterMsg::Other => {}
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Frame) {
            frame.set_line(0, &format!("value = {}", self.value));
        }
    }

    fn sim() -> ProgramSimulator<Counter> {
        let mut sim = ProgramSimulator::new(Counter {
            value: 0,
            initialized: false,
        });
        sim.init();
        sim
    }

    #[test]
    fn init_runs_once() {
        let sim = sim();
        assert!(sim.model().initialized);
        assert_eq!(sim.model().value, 1);
        assert_eq!(sim.command_log(), [CmdRecord::Msg, CmdRecord::None]);
    }

    #[test]
    fn events_update_model() {
        let mut sim = sim();
        sim.inject_events(&[
            Event::key(KeyCode::Char('+')),
            Event::key(KeyCode::Char('+')),
            Event::key(KeyCode::Char('-')),
        ]);
        assert_eq!(sim.model().value, 2);
        assert_eq!(sim.capture_frame(20, 2).line(0), Some("value = 2"));
    }

    #[test]
    fn tasks_run_synchronously() {
        let mut sim = sim();
        sim.inject_event(Event::key(KeyCode::Char('f')));
        assert_eq!(sim.model().value, 10);
        assert_eq!(sim.task_count(), 1);
        assert!(
            sim.command_log()
                .contains(&CmdRecord::Task(Some("fetch".to_string())))
        );
    }

    #[test]
    fn quit_stops_event_processing() {
        let mut sim = sim();
        sim.inject_events(&[
            Event::key(KeyCode::Char('q')),
            Event::key(KeyCode::Char('+')),
        ]);
        assert!(!sim.is_running());
        assert_eq!(sim.model().value, 1);
        sim.send(CounterMsg::Increment);
        assert_eq!(sim.model().value, 1);
    }

    #[test]
    fn frames_accumulate() {
        let mut sim = sim();
        sim.capture_frame(10, 1);
        sim.inject_event(Event::key(KeyCode::Char('+')));
        sim.capture_frame(10, 1);
        assert_eq!(sim.frames().len(), 2);
        assert_eq!(sim.last_frame().and_then(|f| f.line(0)), Some("value = 2"));
    }
}
