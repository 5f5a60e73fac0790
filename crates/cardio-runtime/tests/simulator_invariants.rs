//! Property-based invariant tests for commands and the simulator.
//!
//! 1. `Cmd::count` of a batch is the number of non-`None` leaves.
//! 2. Every message of a batch reaches `update`, in order.
//! 3. Once a quit runs, nothing after it reaches `update`.
//! 4. A task's message is applied before `inject_event` returns.

use cardio_core::{Event, KeyCode};
use cardio_runtime::{Cmd, CmdRecord, Frame, Model, ProgramSimulator};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Nothing,
    Push(u8),
    Task(u8),
    Quit,
}

fn leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        Just(Leaf::Nothing),
        any::<u8>().prop_map(Leaf::Push),
        any::<u8>().prop_map(Leaf::Task),
        Just(Leaf::Quit),
    ]
}

#[derive(Debug)]
enum Note {
    Key(KeyCode),
    Push(u8),
    Run(Vec<Leaf>),
}

impl From<Event> for Note {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Self::Key(key.code),
            _ => Self::Push(0),
        }
    }
}

/// Records every pushed value; a key press runs the scripted batch.
struct Recorder {
    script: Vec<Leaf>,
    seen: Vec<u8>,
}

fn to_cmd(leaf: Leaf) -> Cmd<Note> {
    match leaf {
        Leaf::Nothing => Cmd::none(),
        Leaf::Push(v) => Cmd::msg(Note::Push(v)),
        Leaf::Task(v) => Cmd::task(move || Note::Push(v)),
        Leaf::Quit => Cmd::quit(),
    }
}

impl Model for Recorder {
    type Message = Note;

    fn update(&mut self, msg: Note) -> Cmd<Note> {
        match msg {
            Note::Key(_) => Cmd::msg(Note::Run(self.script.clone())),
            Note::Run(leaves) => Cmd::batch(leaves.into_iter().map(to_cmd).collect()),
            Note::Push(v) => {
                self.seen.push(v);
                Cmd::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        frame.set_line(0, &format!("{}", self.seen.len()));
    }
}

fn run(script: Vec<Leaf>, presses: usize) -> ProgramSimulator<Recorder> {
    let mut sim = ProgramSimulator::new(Recorder {
        script,
        seen: Vec::new(),
    });
    sim.init();
    for _ in 0..presses {
        sim.inject_event(Event::key(KeyCode::Enter));
    }
    sim
}

fn pushed_before_quit(script: &[Leaf]) -> Vec<u8> {
    script
        .iter()
        .take_while(|l| **l != Leaf::Quit)
        .filter_map(|l| match l {
            Leaf::Push(v) | Leaf::Task(v) => Some(*v),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn batch_count_matches_leaves(script in proptest::collection::vec(leaf(), 0..12)) {
        let expected = script.iter().filter(|l| **l != Leaf::Nothing).count();
        let cmd = Cmd::batch(script.into_iter().map(to_cmd).collect());
        prop_assert_eq!(cmd.count(), expected);
    }

    #[test]
    fn batch_messages_arrive_in_order(script in proptest::collection::vec(leaf(), 0..12)) {
        let sim = run(script.clone(), 1);
        prop_assert_eq!(&sim.model().seen, &pushed_before_quit(&script));
        prop_assert_eq!(sim.is_running(), !script.contains(&Leaf::Quit));
    }

    #[test]
    fn nothing_runs_after_quit(script in proptest::collection::vec(leaf(), 0..12), presses in 1usize..4) {
        let sim = run(script.clone(), presses);
        let once = pushed_before_quit(&script);
        if script.contains(&Leaf::Quit) {
            prop_assert_eq!(&sim.model().seen, &once);
        } else {
            prop_assert_eq!(sim.model().seen.len(), once.len() * presses);
        }
    }

    #[test]
    fn tasks_complete_within_the_event(values in proptest::collection::vec(any::<u8>(), 1..8)) {
        let script: Vec<Leaf> = values.iter().copied().map(Leaf::Task).collect();
        let mut sim = run(script, 1);
        prop_assert_eq!(&sim.model().seen, &values);
        let tasks = sim
            .command_log()
            .iter()
            .filter(|r| matches!(r, CmdRecord::Task(None)))
            .count();
        prop_assert_eq!(tasks, values.len());
        let len = values.len().to_string();
        prop_assert!(sim.capture_frame(8, 1).contains(&len));
    }
}
