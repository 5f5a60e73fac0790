#![forbid(unsafe_code)]

//! The update cycle: collect slider values, post them, patch the view.
//!
//! A cycle is split in two so the request can run off the UI thread:
//! [`LiveUpdater::begin`] validates preconditions, builds the payload and
//! marks the button busy; [`LiveUpdater::finish`] patches the view from the
//! outcome and always restores the button. [`LiveUpdater::run`] chains both
//! around a blocking transport call.

use cardio_core::{PredictRequest, PredictResponse};
use tracing::{debug, info_span, warn};

use crate::results::ResultsView;
use crate::slider::{Normalized, Normalizer};
use crate::transport::{PredictTransport, TransportError};

/// Alert shown when an update is requested without a baseline.
pub const MISSING_BASE_ALERT: &str = "Base inputs are not available; cannot update prediction.";

/// Why an update did not patch the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The view was created without baseline inputs.
    MissingBaseInputs,
    /// Another update is still running.
    AlreadyInFlight,
    /// The request failed.
    Transport(TransportError),
}

impl std::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBaseInputs => f.write_str(MISSING_BASE_ALERT),
            Self::AlreadyInFlight => write!(f, "an update is already in progress"),
            Self::Transport(err) => write!(f, "update failed: {err}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for UpdateError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// Drives update cycles and slider normalization for one results view.
#[derive(Debug, Clone, Default)]
pub struct LiveUpdater {
    normalizer: Normalizer,
    in_flight: bool,
}

impl LiveUpdater {
    #[must_use]
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            in_flight: false,
        }
    }

    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a cycle.
    ///
    /// Without baseline inputs an alert is raised and the button is left
    /// alone. While another cycle runs the call is ignored.
    pub fn begin(&mut self, view: &mut ResultsView) -> Result<PredictRequest, UpdateError> {
        let button = view.ensure_update_button();
        if self.in_flight || !button.enabled {
            debug!("update ignored; request already in flight");
            return Err(UpdateError::AlreadyInFlight);
        }
        let Some(base) = view.base_inputs.clone() else {
            warn!("update requested without base inputs");
            view.alert(MISSING_BASE_ALERT);
            return Err(UpdateError::MissingBaseInputs);
        };
        let modified = view.collect_modified();
        view.ensure_update_button().set_busy();
        self.in_flight = true;
        debug!(sliders = modified.len(), "update started");
        Ok(PredictRequest::new(base, modified))
    }

    /// Complete a cycle with the transport outcome.
    ///
    /// A failure raises an alert and leaves the view as it was. The button
    /// is re-enabled in every case.
    pub fn finish(
        &mut self,
        view: &mut ResultsView,
        outcome: Result<PredictResponse, TransportError>,
    ) -> Result<(), UpdateError> {
        let result = match outcome {
            Ok(response) => {
                self.patch(view, &response);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "prediction update failed");
                view.alert(format!("Could not update prediction: {err}"));
                Err(UpdateError::Transport(err))
            }
        };
        view.ensure_update_button().set_idle();
        self.in_flight = false;
        result
    }

    /// Forget the outstanding request without touching any view, so its reply
    /// can be dropped and a new view can start its own cycle. Returns whether
    /// a request was outstanding.
    pub fn abandon(&mut self) -> bool {
        let was = self.in_flight;
        self.in_flight = false;
        if was {
            debug!("outstanding update abandoned");
        }
        was
    }

    /// Run a whole cycle synchronously.
    pub fn run(
        &mut self,
        view: &mut ResultsView,
        transport: &dyn PredictTransport,
    ) -> Result<(), UpdateError> {
        let _span = info_span!("update_cycle").entered();
        let request = self.begin(view)?;
        let outcome = transport.predict(&request);
        self.finish(view, outcome)
    }

    /// Patch result text, tips and slider corrections. Absent response
    /// fields leave their part of the view untouched.
    pub fn patch(&self, view: &mut ResultsView, response: &PredictResponse) {
        view.apply_result_text(response);
        view.apply_tips(response);
        let touched = view.apply_feature_values(response, &self.normalizer);
        debug!(touched, "view patched");
    }

    /// Re-normalize a slider after an input or change event.
    pub fn slider_input(&self, view: &mut ResultsView, row: usize) -> Normalized {
        match view.rows.get_mut(row) {
            Some(row) => self.normalizer.normalize_row(row),
            None => Normalized::Skipped,
        }
    }

    /// Move a slider by `ticks` steps as an input event: the value is
    /// normalized immediately.
    pub fn nudge(&self, view: &mut ResultsView, row: usize, ticks: i32) -> Normalized {
        let Some(target) = view.rows.get_mut(row) else {
            return Normalized::Skipped;
        };
        target.slider.nudge(ticks);
        self.normalizer.normalize_row(target)
    }

    /// Apply a wheel step to a slider. The caller must follow up with
    /// [`LiveUpdater::slider_input`] on the next frame.
    pub fn wheel(&self, view: &mut ResultsView, row: usize, delta: i32) -> bool {
        let Some(row) = view.rows.get_mut(row) else {
            return false;
        };
        row.slider.nudge(delta);
        row.sync_readout();
        true
    }

    /// Normalize every slider in the view.
    pub fn normalize_all(&self, view: &mut ResultsView) {
        for row in &mut view.rows {
            self.normalizer.normalize_row(row);
        }
    }
}
