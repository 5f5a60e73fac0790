#![forbid(unsafe_code)]

//! Range sliders of the results view and their normalization.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::limits::FeatureCatalog;

/// Author-declared minimums below this are treated as broken markup.
pub const MIN_SENTINEL: f64 = -50.0;
/// Author-declared maximums above this are treated as broken markup.
pub const MAX_SENTINEL: f64 = 500.0;

/// Bounds a slider falls back to when nothing is declared.
pub const NATIVE_MIN: f64 = 0.0;
pub const NATIVE_MAX: f64 = 100.0;
pub const NATIVE_STEP: f64 = 1.0;

/// Step attribute of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Step {
    /// No step declared.
    #[default]
    Unset,
    /// Explicit `any`: no granularity.
    Any,
    /// Numeric step, possibly non-positive if the markup is broken.
    Value(f64),
}

impl Step {
    /// Parse a step attribute. Unparseable text counts as unset.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("any") {
            return Self::Any;
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Value(v),
            _ => Self::Unset,
        }
    }

    /// The positive numeric step, if any.
    #[must_use]
    pub fn positive(self) -> Option<f64> {
        match self {
            Self::Value(v) if v > 0.0 => Some(v),
            _ => None,
        }
    }
}

/// One range slider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slider {
    /// Explicit feature tag.
    pub feature: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Step,
    /// Current value as text.
    pub value: String,
}

impl Slider {
    /// Slider tagged with a feature name.
    pub fn for_feature(feature: impl Into<String>) -> Self {
        Self {
            feature: Some(feature.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.step = step;
        self
    }

    /// Feature key: tag, else id, else name.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.feature
            .as_deref()
            .or(self.id.as_deref())
            .or(self.name.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Current value, if numeric.
    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        let v: f64 = self.value.trim().parse().ok()?;
        v.is_finite().then_some(v)
    }

    /// Lower bound used for interaction.
    #[must_use]
    pub fn effective_min(&self) -> f64 {
        self.min.filter(|m| m.is_finite()).unwrap_or(NATIVE_MIN)
    }

    /// Upper bound used for interaction.
    #[must_use]
    pub fn effective_max(&self) -> f64 {
        self.max.filter(|m| m.is_finite()).unwrap_or(NATIVE_MAX)
    }

    /// Step used for interaction.
    #[must_use]
    pub fn effective_step(&self) -> f64 {
        self.step.positive().unwrap_or(NATIVE_STEP)
    }

    /// Move the value by `ticks` steps, clamped to the effective range.
    pub fn nudge(&mut self, ticks: i32) {
        let lo = self.effective_min();
        let hi = self.effective_max().max(lo);
        let current = self.numeric_value().unwrap_or(lo);
        let next = (current + f64::from(ticks) * self.effective_step()).clamp(lo, hi);
        self.value = format_value(round_to_step(next, self.step.positive()));
    }

    /// Fraction of the range covered by the value, for drawing.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        let lo = self.effective_min();
        let hi = self.effective_max();
        if hi <= lo {
            return 0.0;
        }
        let v = self.numeric_value().unwrap_or(lo);
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Render a slider value without trailing zeros.
#[must_use]
pub fn format_value(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn round_to_step(value: f64, step: Option<f64>) -> f64 {
    match step {
        Some(step) if step < 1.0 => {
            let decimals = (-step.log10()).ceil().max(0.0) as i32;
            let scale = 10f64.powi(decimals);
            (value * scale).round() / scale
        }
        _ => value,
    }
}

/// Label preceding a slider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowLabel {
    pub text: String,
    /// Value span inside the label.
    pub value_span: Option<String>,
}

/// A slider with its label and value readout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliderRow {
    pub label: Option<RowLabel>,
    pub slider: Slider,
    /// Sibling value display.
    pub value_display: Option<String>,
}

impl SliderRow {
    /// Row for a top feature, labelled with its name and a value span.
    pub fn for_feature(feature: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: Some(RowLabel {
                text: feature.to_string(),
                value_span: Some(value.clone()),
            }),
            slider: Slider::for_feature(feature).with_value(value),
            value_display: None,
        }
    }

    /// The readout: the label's value span, else the sibling display.
    #[must_use]
    pub fn readout(&self) -> Option<&str> {
        self.label
            .as_ref()
            .and_then(|l| l.value_span.as_deref())
            .or(self.value_display.as_deref())
    }

    fn readout_mut(&mut self) -> Option<&mut String> {
        if let Some(span) = self.label.as_mut().and_then(|l| l.value_span.as_mut()) {
            return Some(span);
        }
        self.value_display.as_mut()
    }

    /// Copy the slider value into the readout, if there is one.
    pub fn sync_readout(&mut self) {
        let value = self.slider.value.clone();
        if let Some(readout) = self.readout_mut() {
            *readout = value;
        }
    }

    /// Display name of the row.
    #[must_use]
    pub fn title(&self) -> &str {
        self.label
            .as_ref()
            .map(|l| l.text.as_str())
            .or(self.slider.key())
            .unwrap_or("")
    }
}

/// What [`Normalizer::apply_limits`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalized {
    /// The key resolved and the slider now honours the canonical bounds.
    Applied,
    /// No key, or the key is not in the table; the slider is untouched.
    Skipped,
}

impl Normalized {
    #[must_use]
    pub fn applied(self) -> bool {
        self == Self::Applied
    }
}

/// Corrects slider attributes against the canonical limits.
#[derive(Clone)]
pub struct Normalizer {
    catalog: Arc<FeatureCatalog>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("limits", &self.catalog.limits.len())
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(FeatureCatalog::cardio()))
    }
}

impl Normalizer {
    #[must_use]
    pub fn new(catalog: Arc<FeatureCatalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// Correct a slider's bounds and step and clamp its value.
    ///
    /// Min is replaced when absent, below [`MIN_SENTINEL`], or below the
    /// canonical min; max likewise against [`MAX_SENTINEL`] and the canonical
    /// max. Author bounds tighter than the canonical ones are kept. If the
    /// result is inverted both bounds fall back to canonical. A non-numeric
    /// value becomes the minimum.
    pub fn apply_limits(&self, slider: &mut Slider) -> Normalized {
        let Some(raw) = slider.key() else {
            return Normalized::Skipped;
        };
        let Some((key, limits)) = self.catalog.limits_for(raw) else {
            return Normalized::Skipped;
        };

        if slider
            .min
            .is_none_or(|m| !m.is_finite() || m < MIN_SENTINEL || m < limits.min)
        {
            slider.min = Some(limits.min);
        }
        if slider
            .max
            .is_none_or(|m| !m.is_finite() || m > MAX_SENTINEL || m > limits.max)
        {
            slider.max = Some(limits.max);
        }
        if slider.step.positive().is_none() {
            slider.step = Step::Value(limits.step);
        }

        let (mut lo, mut hi) = (slider.min.unwrap_or(limits.min), slider.max.unwrap_or(limits.max));
        if lo > hi {
            (lo, hi) = (limits.min, limits.max);
            slider.min = Some(lo);
            slider.max = Some(hi);
        }

        let corrected = match slider.numeric_value() {
            Some(v) if (lo..=hi).contains(&v) => None,
            Some(v) => Some(v.clamp(lo, hi)),
            None => Some(lo),
        };
        if let Some(value) = corrected {
            let text = value.to_string();
            debug!(key = %key, from = %slider.value, to = %text, "slider value corrected");
            slider.value = text;
        }
        Normalized::Applied
    }

    /// Normalize the row's slider and mirror its value into the readout.
    pub fn normalize_row(&self, row: &mut SliderRow) -> Normalized {
        let outcome = self.apply_limits(&mut row.slider);
        row.sync_readout();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm() -> Normalizer {
        Normalizer::default()
    }

    #[test]
    fn trestbps_overflow_clamps_to_canonical_max() {
        let mut s = Slider::for_feature("trestbps").with_value("500");
        assert!(norm().apply_limits(&mut s).applied());
        assert_eq!(s.min, Some(80.0));
        assert_eq!(s.max, Some(200.0));
        assert_eq!(s.value, "200");
        assert_eq!(s.step, Step::Value(1.0));
    }

    #[test]
    fn thalach_bogus_max_replaced() {
        let mut s = Slider::for_feature("thalach")
            .with_bounds(None, Some(9999.0))
            .with_value("250");
        norm().apply_limits(&mut s);
        assert_eq!(s.min, Some(60.0));
        assert_eq!(s.max, Some(220.0));
        assert_eq!(s.value, "220");
    }

    #[test]
    fn sentinels_replace_even_inside_canonical() {
        let catalog = Arc::new(FeatureCatalog::new(
            crate::limits::LimitsTable::new()
                .with("wide", crate::limits::Limits::whole(-1000.0, 1000.0)),
            crate::limits::SynonymMap::new(),
        ));
        let mut s = Slider::for_feature("wide")
            .with_bounds(Some(-60.0), Some(600.0))
            .with_value("0");
        Normalizer::new(catalog).apply_limits(&mut s);
        assert_eq!(s.min, Some(-1000.0));
        assert_eq!(s.max, Some(1000.0));
    }

    #[test]
    fn tighter_author_bounds_are_kept() {
        let mut s = Slider::for_feature("age")
            .with_bounds(Some(30.0), Some(80.0))
            .with_value("90");
        norm().apply_limits(&mut s);
        assert_eq!((s.min, s.max), (Some(30.0), Some(80.0)));
        assert_eq!(s.value, "80");
    }

    #[test]
    fn inverted_bounds_fall_back_to_canonical() {
        let mut s = Slider::for_feature("trestbps")
            .with_bounds(Some(190.0), Some(120.0))
            .with_value("150");
        norm().apply_limits(&mut s);
        assert_eq!((s.min, s.max), (Some(80.0), Some(200.0)));
        assert_eq!(s.value, "150");
    }

    #[test]
    fn non_numeric_value_becomes_min() {
        let mut s = Slider::for_feature("BMI").with_value("abc");
        norm().apply_limits(&mut s);
        assert_eq!(s.value, "15");
        assert_eq!(s.step, Step::Value(0.1));
    }

    #[test]
    fn bad_steps_are_replaced() {
        for step in [Step::Unset, Step::Any, Step::Value(0.0), Step::Value(-2.0)] {
            let mut s = Slider::for_feature("oldpeak").with_step(step).with_value("1");
            norm().apply_limits(&mut s);
            assert_eq!(s.step, Step::Value(0.1), "{step:?}");
        }
        let mut s = Slider::for_feature("oldpeak")
            .with_step(Step::Value(0.5))
            .with_value("1");
        norm().apply_limits(&mut s);
        assert_eq!(s.step, Step::Value(0.5));
    }

    #[test]
    fn unknown_key_is_untouched() {
        let mut s = Slider::for_feature("ST slope").with_value("9");
        let before = s.clone();
        assert_eq!(norm().apply_limits(&mut s), Normalized::Skipped);
        assert_eq!(s, before);
    }

    #[test]
    fn key_falls_back_to_id_then_name() {
        let mut s = Slider {
            id: Some("max heart rate".into()),
            name: Some("ignored".into()),
            value: "1000".into(),
            ..Slider::default()
        };
        assert_eq!(s.key(), Some("max heart rate"));
        norm().apply_limits(&mut s);
        assert_eq!(s.value, "220");

        let s = Slider {
            name: Some("age".into()),
            ..Slider::default()
        };
        assert_eq!(s.key(), Some("age"));
        assert_eq!(Slider::default().key(), None);
    }

    #[test]
    fn readout_prefers_label_span() {
        let mut row = SliderRow::for_feature("resting bp s", "999");
        row.value_display = Some("old".into());
        norm().normalize_row(&mut row);
        assert_eq!(row.readout(), Some("200"));
        assert_eq!(row.value_display.as_deref(), Some("old"));
    }

    #[test]
    fn readout_falls_back_to_value_display() {
        let mut row = SliderRow {
            label: Some(RowLabel {
                text: "Age".into(),
                value_span: None,
            }),
            slider: Slider::for_feature("age").with_value("10"),
            value_display: Some(String::new()),
        };
        norm().normalize_row(&mut row);
        assert_eq!(row.value_display.as_deref(), Some("18"));
    }

    #[test]
    fn nudge_respects_step_and_bounds() {
        let mut s = Slider::for_feature("bmi")
            .with_bounds(Some(15.0), Some(50.0))
            .with_step(Step::Value(0.1))
            .with_value("27.3");
        s.nudge(1);
        assert_eq!(s.value, "27.4");
        s.nudge(-1000);
        assert_eq!(s.value, "15");
    }

    #[test]
    fn step_parse() {
        assert_eq!(Step::parse("any"), Step::Any);
        assert_eq!(Step::parse(" 0.5 "), Step::Value(0.5));
        assert_eq!(Step::parse(""), Step::Unset);
        assert_eq!(Step::parse("x"), Step::Unset);
    }

    #[test]
    fn format_value_trims() {
        assert_eq!(format_value(200.0), "200");
        assert_eq!(format_value(27.400000000001), "27.4");
        assert_eq!(format_value(-0.0), "0");
    }
}
