#![forbid(unsafe_code)]

//! Delivery of `/predict` requests.

use std::time::Duration;

use cardio_core::{PredictRequest, PredictResponse};
use tracing::debug;

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    Status(u16),
    /// The request never got a response.
    Http(String),
    /// The body was not a prediction response.
    Decode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "prediction service returned status {code}"),
            Self::Http(msg) => write!(f, "prediction request failed: {msg}"),
            Self::Decode(msg) => write!(f, "invalid prediction response: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Something that can answer a prediction request.
///
/// Calls block; the runtime runs them on a task thread.
pub trait PredictTransport: Send + Sync {
    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, TransportError>;
}

impl<T: PredictTransport + ?Sized> PredictTransport for std::sync::Arc<T> {
    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, TransportError> {
        (**self).predict(request)
    }
}

/// JSON over HTTP with a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpTransport {
    /// Transport posting to `url`. `None` means no request timeout.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PredictTransport for HttpTransport {
    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, TransportError> {
        debug!(url = %self.url, modified = request.modified.len(), "posting prediction request");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response
            .json::<PredictResponse>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
