#![forbid(unsafe_code)]

//! Form navigation and validation for the cardiovascular risk client.
//!
//! # Key Components
//!
//! - [`Field`] - one numeric or select input with its constraints and error slot
//! - [`FieldValidity`] - the single outcome of a constraint check
//! - [`FormNavigator`] - panels, the active panel, focus, gated next/submit
//! - [`schema::risk_form`] - the patient form used by the client
//!
//! # Example
//!
//! ```rust
//! use cardio_form::schema::risk_form;
//!
//! let mut form = risk_form();
//! assert!(form.is_active("personal"));
//!
//! // Empty required fields keep the user on the first panel.
//! assert!(!form.next());
//! assert!(form.field("age").unwrap().is_marked_invalid());
//! ```

pub mod field;
pub mod navigator;
pub mod panel;
pub mod schema;
pub mod validity;

pub use field::{Field, FieldKind, SelectOption, parse_number};
pub use navigator::{FieldDependency, FormNavigator, FormValues, KeyDisposition, SubmitBlocked};
pub use panel::{Panel, PanelPresentation, PanelSpec, Tab};
pub use validity::{FieldValidity, ValidationError};
