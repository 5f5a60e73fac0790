#![forbid(unsafe_code)]

//! Native-style constraint validity for form fields.
//!
//! A field is checked against its declared constraints (required, numeric
//! type, min, max, step, option list) and the outcome is exactly one
//! [`FieldValidity`] value. Failures carry a [`ValidationError`] whose message
//! template is interpolated with the offending bound.

use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Error Codes
// ---------------------------------------------------------------------------

/// Error code for a required field left empty.
pub const ERROR_CODE_REQUIRED: &str = "value_missing";
/// Error code for a value below the configured minimum.
pub const ERROR_CODE_UNDERFLOW: &str = "range_underflow";
/// Error code for a value above the configured maximum.
pub const ERROR_CODE_OVERFLOW: &str = "range_overflow";
/// Error code for text that does not parse as a number.
pub const ERROR_CODE_BAD_INPUT: &str = "bad_input";
/// Error code for every other constraint failure.
pub const ERROR_CODE_INVALID: &str = "invalid";

const MSG_REQUIRED: &str = "This field is required.";
const MSG_UNDERFLOW: &str = "Value must be at least {min}.";
const MSG_OVERFLOW: &str = "Value must be at most {max}.";
const MSG_BAD_INPUT: &str = "Please enter a valid number.";
const MSG_INVALID: &str = "Please enter a valid value.";

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A validation error with code, message template, and interpolation parameters.
///
/// The `code` field is a stable identifier; the `message` is a template where
/// `{key}` is replaced by the matching parameter.
///
/// # Example
///
/// ```rust
/// use cardio_form::validity::ValidationError;
///
/// let error = ValidationError::new("range_underflow", "Value must be at least {min}.")
///     .with_param("min", 18);
///
/// assert_eq!(error.format_message(), "Value must be at least 18.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable error code for programmatic handling.
    pub code: &'static str,
    /// Human-readable message template.
    pub message: String,
    /// Parameters for message interpolation.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Create a new validation error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Add a parameter for message interpolation.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Format the message with parameter substitution.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut result = self.message.clone();
        for (key, value) in &self.params {
            result = result.replace(&format!("{{{key}}}"), value);
        }
        result
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// FieldValidity
// ---------------------------------------------------------------------------

/// Outcome of checking one field. Exactly one variant applies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldValidity {
    /// All constraints hold (or the field is disabled).
    #[default]
    Valid,
    /// The field is required and empty.
    ValueMissing,
    /// The value is below the configured minimum.
    RangeUnderflow {
        /// The configured minimum.
        min: f64,
    },
    /// The value is above the configured maximum.
    RangeOverflow {
        /// The configured maximum.
        max: f64,
    },
    /// The text is not a number.
    BadInput,
    /// Any other constraint failure (step mismatch, unknown option).
    Invalid,
}

impl FieldValidity {
    /// Returns `true` if the field passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns `true` if the field failed.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The error to render next to the field, `None` when valid.
    #[must_use]
    pub fn error(&self) -> Option<ValidationError> {
        match *self {
            Self::Valid => None,
            Self::ValueMissing => Some(ValidationError::new(ERROR_CODE_REQUIRED, MSG_REQUIRED)),
            Self::RangeUnderflow { min } => Some(
                ValidationError::new(ERROR_CODE_UNDERFLOW, MSG_UNDERFLOW)
                    .with_param("min", format_bound(min)),
            ),
            Self::RangeOverflow { max } => Some(
                ValidationError::new(ERROR_CODE_OVERFLOW, MSG_OVERFLOW)
                    .with_param("max", format_bound(max)),
            ),
            Self::BadInput => Some(ValidationError::new(ERROR_CODE_BAD_INPUT, MSG_BAD_INPUT)),
            Self::Invalid => Some(ValidationError::new(ERROR_CODE_INVALID, MSG_INVALID)),
        }
    }

    /// The rendered error message, `None` when valid.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.error().map(|e| e.format_message())
    }
}

/// Render a bound the way it was configured: `18`, not `18.0`.
#[must_use]
pub fn format_bound(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_has_no_message() {
        assert!(FieldValidity::Valid.is_valid());
        assert_eq!(FieldValidity::Valid.message(), None);
    }

    #[test]
    fn underflow_interpolates_min() {
        let v = FieldValidity::RangeUnderflow { min: 18.0 };
        assert_eq!(v.message().as_deref(), Some("Value must be at least 18."));
        assert_eq!(v.error().unwrap().code, ERROR_CODE_UNDERFLOW);
    }

    #[test]
    fn overflow_interpolates_fractional_max() {
        let v = FieldValidity::RangeOverflow { max: 6.2 };
        assert_eq!(v.message().as_deref(), Some("Value must be at most 6.2."));
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(
            FieldValidity::ValueMissing.message().as_deref(),
            Some("This field is required.")
        );
        assert_eq!(
            FieldValidity::BadInput.message().as_deref(),
            Some("Please enter a valid number.")
        );
        assert_eq!(
            FieldValidity::Invalid.message().as_deref(),
            Some("Please enter a valid value.")
        );
    }

    #[test]
    fn negative_bound_formats_plainly() {
        assert_eq!(format_bound(-3.0), "-3");
        assert_eq!(format_bound(0.5), "0.5");
    }

    #[test]
    fn display_matches_formatted_message() {
        let err = ValidationError::new("x", "{a} and {b}")
            .with_param("a", 1)
            .with_param("b", "two");
        assert_eq!(err.to_string(), "1 and two");
    }
}
