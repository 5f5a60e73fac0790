#![forbid(unsafe_code)]

//! Slider normalization and live prediction updates.
//!
//! The results view carries a slider for each of the most important
//! features. Sliders are normalized against a canonical limits table so that
//! broken author bounds never let a value escape its physiological range, and
//! the update cycle re-posts the slider values to the prediction service.
//!
//! ```
//! use cardio_live::{Normalizer, Slider};
//!
//! let mut slider = Slider::for_feature("resting bp s").with_value("500");
//! Normalizer::default().apply_limits(&mut slider);
//! assert_eq!(slider.value, "200");
//! ```

pub mod limits;
pub mod results;
pub mod slider;
pub mod transport;
pub mod updater;

pub use limits::{FeatureCatalog, Limits, LimitsTable, SynonymMap, normalize_key};
pub use results::{BUSY_LABEL, ResultsView, TextElement, UPDATE_LABEL, UpdateButton};
pub use slider::{Normalized, Normalizer, RowLabel, Slider, SliderRow, Step};
pub use transport::{HttpTransport, PredictTransport, TransportError};
pub use updater::{LiveUpdater, MISSING_BASE_ALERT, UpdateError};
