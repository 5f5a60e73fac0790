#![forbid(unsafe_code)]

//! Field descriptors.
//!
//! A [`Field`] is one input of the patient form: a numeric entry or a select.
//! It owns its current text value, its constraints, its enabled state, and
//! the inline error slot that validation writes into.

use crate::validity::{FieldValidity, ValidationError};

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// One option of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Display text.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The input type of a field and its type-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single-line numeric input with optional bounds and step.
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    /// Single choice from a fixed list. An empty value means "nothing chosen".
    Select { options: Vec<SelectOption> },
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A single form field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Identifier, also the submitted name.
    pub name: String,
    /// Label shown next to the input.
    pub label: String,
    /// Input type and constraints.
    pub kind: FieldKind,
    /// Current value as entered.
    pub value: String,
    /// Whether an empty value fails validation.
    pub required: bool,
    /// Disabled fields are skipped by validation and submission.
    pub disabled: bool,
    /// Inline error currently rendered next to the field.
    error: Option<ValidationError>,
}

impl Field {
    /// Create a numeric field without bounds.
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Number {
                min: None,
                max: None,
                step: None,
            },
            value: String::new(),
            required: false,
            disabled: false,
            error: None,
        }
    }

    /// Create a select field. The value starts empty (placeholder selected).
    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Select { options },
            value: String::new(),
            required: false,
            disabled: false,
            error: None,
        }
    }

    /// Set numeric bounds. No-op on selects.
    #[must_use]
    pub fn bounds(mut self, lo: f64, hi: f64) -> Self {
        if let FieldKind::Number { min, max, .. } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// Set the numeric step. No-op on selects.
    #[must_use]
    pub fn step(mut self, value: f64) -> Self {
        if let FieldKind::Number { step, .. } = &mut self.kind {
            *step = Some(value);
        }
        self
    }

    /// Mark the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set an initial value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Whether this is a single-line numeric input.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Number { .. })
    }

    /// Whether focus can land on this field.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        !self.disabled
    }

    /// Options of a select field (empty for numbers).
    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            FieldKind::Select { options } => options,
            FieldKind::Number { .. } => &[],
        }
    }

    /// Label of the selected option, if any.
    #[must_use]
    pub fn selected_label(&self) -> Option<&str> {
        self.options()
            .iter()
            .find(|o| o.value == self.value)
            .map(|o| o.label.as_str())
    }

    /// Check the native constraints without touching the error slot.
    ///
    /// Disabled fields are always valid.
    #[must_use]
    pub fn check_validity(&self) -> FieldValidity {
        if self.disabled {
            return FieldValidity::Valid;
        }
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return if self.required {
                FieldValidity::ValueMissing
            } else {
                FieldValidity::Valid
            };
        }
        match &self.kind {
            FieldKind::Select { options } => {
                if options.iter().any(|o| o.value == trimmed) {
                    FieldValidity::Valid
                } else {
                    FieldValidity::Invalid
                }
            }
            FieldKind::Number { min, max, step } => {
                let Some(v) = parse_number(trimmed) else {
                    return FieldValidity::BadInput;
                };
                if let Some(min) = *min
                    && v < min
                {
                    return FieldValidity::RangeUnderflow { min };
                }
                if let Some(max) = *max
                    && v > max
                {
                    return FieldValidity::RangeOverflow { max };
                }
                if let Some(step) = *step
                    && step > 0.0
                    && !on_step(v, min.unwrap_or(0.0), step)
                {
                    return FieldValidity::Invalid;
                }
                FieldValidity::Valid
            }
        }
    }

    /// The error currently shown next to the field.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// The rendered error message currently shown.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ValidationError::format_message)
    }

    /// Whether the field is currently marked invalid.
    #[must_use]
    pub fn is_marked_invalid(&self) -> bool {
        self.error.is_some()
    }

    /// Remove the inline error and the invalid mark.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Render an error next to the field and mark it invalid.
    pub fn show_error(&mut self, error: ValidationError) {
        self.error = Some(error);
    }
}

/// Parse a numeric field value. Only finite decimal numbers are accepted.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let v: f64 = text.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

fn on_step(value: f64, base: f64, step: f64) -> bool {
    let steps = (value - base) / step;
    (steps - steps.round()).abs() < 1e-7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age() -> Field {
        Field::number("age", "Age").bounds(18.0, 100.0).required()
    }

    #[test]
    fn empty_required_is_value_missing() {
        assert_eq!(age().check_validity(), FieldValidity::ValueMissing);
    }

    #[test]
    fn empty_optional_is_valid() {
        let f = Field::number("oldpeak", "ST depression").bounds(-3.0, 7.0);
        assert_eq!(f.check_validity(), FieldValidity::Valid);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(age().with_value("18").check_validity().is_valid());
        assert!(age().with_value("100").check_validity().is_valid());
        assert_eq!(
            age().with_value("17").check_validity(),
            FieldValidity::RangeUnderflow { min: 18.0 }
        );
        assert_eq!(
            age().with_value("101").check_validity(),
            FieldValidity::RangeOverflow { max: 100.0 }
        );
    }

    #[test]
    fn garbage_is_bad_input() {
        assert_eq!(age().with_value("abc").check_validity(), FieldValidity::BadInput);
        assert_eq!(age().with_value("inf").check_validity(), FieldValidity::BadInput);
        assert_eq!(age().with_value("NaN").check_validity(), FieldValidity::BadInput);
    }

    #[test]
    fn step_mismatch_is_invalid() {
        let bmi = Field::number("BMI", "BMI").bounds(10.0, 60.0).step(0.1);
        assert!(bmi.clone().with_value("27.3").check_validity().is_valid());
        assert_eq!(
            bmi.with_value("27.35").check_validity(),
            FieldValidity::Invalid
        );
    }

    #[test]
    fn disabled_is_always_valid() {
        let mut f = age().with_value("5");
        f.disabled = true;
        assert_eq!(f.check_validity(), FieldValidity::Valid);
    }

    #[test]
    fn select_checks_membership() {
        let f = Field::select(
            "sex",
            "Sex",
            vec![SelectOption::new("1", "Male"), SelectOption::new("0", "Female")],
        )
        .required();
        assert_eq!(f.check_validity(), FieldValidity::ValueMissing);
        assert!(f.clone().with_value("0").check_validity().is_valid());
        assert_eq!(f.with_value("7").check_validity(), FieldValidity::Invalid);
    }

    #[test]
    fn selected_label_follows_value() {
        let f = Field::select("sex", "Sex", vec![SelectOption::new("1", "Male")]).with_value("1");
        assert_eq!(f.selected_label(), Some("Male"));
    }

    #[test]
    fn error_slot_roundtrip() {
        let mut f = age();
        assert!(!f.is_marked_invalid());
        f.show_error(FieldValidity::ValueMissing.error().unwrap());
        assert_eq!(f.error_message().as_deref(), Some("This field is required."));
        f.clear_error();
        assert!(f.error().is_none());
    }
}
