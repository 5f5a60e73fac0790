//! Prediction service for the cardiostack risk client.
//!
//! Serves `POST /predict` from three logistic model artifacts: a UCI heart
//! disease model, a Framingham model, and a meta-model stacking their
//! probabilities. Answers JSON live updates from the terminal client and
//! plain form posts with the same response body.

pub mod api;
pub mod config;
pub mod error;
pub mod inputs;
pub mod model;
pub mod predictor;
pub mod tips;

pub use config::ServerConfig;
pub use error::{ApiError, ConfigError, ModelError};
pub use predictor::Predictor;
