#![forbid(unsafe_code)]

//! Terminal client for the cardiovascular risk service.
//!
//! The binary shows the patient [form](cardio_form), posts it to the
//! prediction endpoint and then opens the what-if results view, where sliders
//! can be adjusted and the prediction refreshed in place.

pub mod app;
pub mod cli;
pub mod view;

pub use app::{AppModel, Msg, Screen, base_inputs_from};
