//! Error types for the prediction service.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors loading or validating model artifacts.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model artifact not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model {name}: {features} features but {coefficients} coefficients")]
    Shape {
        name: String,
        features: usize,
        coefficients: usize,
    },

    #[error("model {name}: {importances} importances for {features} features")]
    Importances {
        name: String,
        features: usize,
        importances: usize,
    },
}

/// Errors loading the server configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("top_n must be at least 1")]
    TopN,
}

/// Request handling errors, answered as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unsupported content type {0:?}; send JSON or a form post")]
    UnsupportedMediaType(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
