#![forbid(unsafe_code)]

//! Elm-style runtime for the cardiostack terminal client.
//!
//! Applications implement [`Model`]: `update` turns a message into new state
//! plus a [`Cmd`], `view` draws into a [`Frame`]. [`Program`] drives a model
//! against a real terminal; [`ProgramSimulator`] drives it deterministically
//! in tests, running background tasks inline.

pub mod frame;
pub mod program;
pub mod session;
pub mod simulator;

pub use frame::{Emphasis, Frame};
pub use program::{Cmd, Model, Program, ProgramConfig, TaskSpec};
pub use session::{SessionOptions, TerminalSession};
pub use simulator::{CmdRecord, ProgramSimulator};
