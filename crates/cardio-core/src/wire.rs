#![forbid(unsafe_code)]

//! JSON bodies exchanged with `POST /predict`.
//!
//! The client decodes responses leniently: every field is optional, and a
//! field holding the wrong shape decodes as absent instead of failing the
//! body. List fields keep the entries that decode and drop the rest, so a
//! partial or older server response still patches whatever it carries.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Feature name to raw value. Values stay untyped JSON because the service
/// coerces them itself (numbers, numeric strings, yes/no flags).
pub type InputMap = BTreeMap<String, Value>;

/// Text typed into a field or slider as a JSON value: an integer or float
/// when it parses as one, otherwise the text itself.
#[must_use]
pub fn input_value(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(text.to_string()), Value::Number)
}

/// Request body for a live update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Snapshot of the submitted form, keyed by form field name.
    #[serde(default)]
    pub base_inputs: InputMap,
    /// Current slider values, keyed by feature tag. Wins over `base_inputs`.
    #[serde(default)]
    pub modified: InputMap,
}

impl PredictRequest {
    /// Build a request from a baseline and a fresh set of modifications.
    #[must_use]
    pub fn new(base_inputs: InputMap, modified: InputMap) -> Self {
        Self {
            base_inputs,
            modified,
        }
    }
}

/// One entry of the tips list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tip {
    /// A tip attached to a named feature.
    Feature {
        /// Feature display name.
        feature: String,
        /// Advice text.
        tip: String,
    },
    /// Free-standing advice.
    Plain(String),
}

impl Tip {
    /// Tip for a named feature.
    #[must_use]
    pub fn feature(feature: impl Into<String>, tip: impl Into<String>) -> Self {
        Self::Feature {
            feature: feature.into(),
            tip: tip.into(),
        }
    }
}

impl fmt::Display for Tip {
    /// Lightweight markup: the feature name is wrapped in `**` for emphasis.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature { feature, tip } => write!(f, "**{feature}** — {tip}"),
            Self::Plain(text) => f.write_str(text),
        }
    }
}

/// A slider correction or seed value: `{name, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    /// Feature name as the model knows it (e.g. `resting bp s`).
    pub name: String,
    /// Value, usually numeric.
    pub value: Value,
}

impl FeatureValue {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The value rendered the way a slider stores it.
    #[must_use]
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Response body from the prediction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub uci_prob: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub fram_prob: Option<f64>,
    /// Stacked probability in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub final_prob: Option<f64>,
    /// Human readable category (`Low Risk`, ...).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub final_cat: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub top_features: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub top_features_values: Option<Vec<FeatureValue>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<Tip>>,
    /// Older name for `tips`; only read when `tips` is absent.
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Tip>>,
}

/// Any value that does not decode as `T` (including `null`) becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A finite number, or a string holding one.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|v: &f64| v.is_finite()))
}

/// An array keeps the entries that decode. A non-array, or an array in
/// which no entry decodes, becomes `None`; `[]` stays an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.is_empty() && total > 0 {
        return Ok(None);
    }
    Ok(Some(kept))
}

impl PredictResponse {
    /// Text for the result element: the category when present, else the
    /// probability as a percentage with one decimal.
    #[must_use]
    pub fn result_text(&self) -> Option<String> {
        if let Some(cat) = &self.final_cat {
            return Some(cat.clone());
        }
        self.final_prob.map(|p| format!("{:.1}%", p * 100.0))
    }

    /// Tips to display. `tips` takes precedence; the lists are never merged.
    #[must_use]
    pub fn effective_tips(&self) -> Option<&[Tip]> {
        self.tips
            .as_deref()
            .or(self.suggestions.as_deref())
    }
}
