#![forbid(unsafe_code)]

//! Core: input events and the prediction wire format.
//!
//! # Role in cardiostack
//! `cardio-core` is the shared vocabulary. The terminal client turns backend
//! input into [`event::Event`] values, and both the client and the
//! prediction service speak the [`wire`] types over `POST /predict`.

pub mod event;
pub mod wire;

pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseEvent, MouseEventKind};
pub use wire::{FeatureValue, InputMap, PredictRequest, PredictResponse, Tip, input_value};
