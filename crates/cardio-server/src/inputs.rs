//! Turning posted values into model input rows.
//!
//! Posted values are keyed by form field name (`restingBpS`); the models
//! name their columns after the training data (`resting bp s`).

use std::collections::{BTreeMap, HashMap};

use cardio_core::InputMap;
use serde_json::{Number, Value};

/// Numeric inputs keyed by form field name.
pub type UserInputs = BTreeMap<String, Number>;

/// Form field name to model column name.
pub const FORM_TO_MODEL: &[(&str, &str)] = &[
    ("age", "age"),
    ("sex", "sex"),
    ("chestPainType", "chest pain type"),
    ("restingBpS", "resting bp s"),
    ("cholesterol", "cholesterol"),
    ("fastingBloodSugar", "fasting blood sugar"),
    ("restingEcg", "resting ecg"),
    ("maxHeartRate", "max heart rate"),
    ("exerciseAngina", "exercise angina"),
    ("oldpeak", "oldpeak"),
    ("stSlope", "ST slope"),
    ("education", "education"),
    ("currentSmoker", "currentSmoker"),
    ("cigsPerDay", "cigsPerDay"),
    ("BPMeds", "BPMeds"),
    ("prevalentStroke", "prevalentStroke"),
    ("prevalentHyp", "prevalentHyp"),
    ("diabetes", "diabetes"),
    ("totChol", "totChol"),
    ("sysBP", "sysBP"),
    ("diaBP", "diaBP"),
    ("BMI", "BMI"),
    ("heartRate", "heartRate"),
];

/// Fields collected from a form post.
pub const EXPECTED_FORM_FIELDS: &[&str] = &[
    "age",
    "sex",
    "education",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "BMI",
    "heartRate",
    "sysBP",
    "diaBP",
    "restingBpS",
    "maxHeartRate",
    "chestPainType",
    "cholesterol",
    "totChol",
    "fastingBloodSugar",
    "restingEcg",
    "exerciseAngina",
    "oldpeak",
    "stSlope",
];

/// Form field feeding model column `column`. The Framingham `male` column
/// reads `sex`.
pub fn model_to_form(column: &str) -> Option<&'static str> {
    FORM_TO_MODEL
        .iter()
        .find(|(_, model)| *model == column)
        .map(|(form, _)| *form)
        .or((column == "male").then_some("sex"))
}

fn zero() -> Number {
    Number::from(0)
}

/// Coerce a posted value to a number.
///
/// Empty or absent is 0, `true/yes/y` is 1, `false/no/n` is 0, numeric text
/// parses as an integer or float. Anything else is 0.
pub fn to_number(value: &Value) -> Number {
    match value {
        Value::Number(n) => n.clone(),
        Value::Bool(b) => Number::from(u8::from(*b)),
        Value::String(s) => parse_number(s),
        Value::Null | Value::Array(_) | Value::Object(_) => zero(),
    }
}

fn parse_number(text: &str) -> Number {
    let s = text.trim();
    match s.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" => return zero(),
        "true" | "yes" | "y" => return Number::from(1),
        _ => {}
    }
    if !s.contains('.')
        && let Ok(i) = s.parse::<i64>()
    {
        return Number::from(i);
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .unwrap_or_else(zero)
}

/// Inputs of a form post: every expected field, missing ones as 0.
pub fn from_form(form: &HashMap<String, String>) -> UserInputs {
    EXPECTED_FORM_FIELDS
        .iter()
        .map(|&field| {
            let value = form.get(field).map_or_else(zero, |v| parse_number(v));
            (field.to_string(), value)
        })
        .collect()
}

/// Inputs of a live update: the baseline overlaid with the modifications.
///
/// A modified key naming a model column is stored under its form field.
pub fn merge(base: &InputMap, modified: &InputMap) -> UserInputs {
    let mut merged: UserInputs = base
        .iter()
        .map(|(k, v)| (k.clone(), to_number(v)))
        .collect();
    for (key, value) in modified {
        let target = model_to_form(key).unwrap_or(key);
        merged.insert(target.to_string(), to_number(value));
    }
    merged
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

/// Model input row in `features` order. Columns with no input are 0.
pub fn model_row(features: &[String], inputs: &UserInputs) -> Vec<f64> {
    features
        .iter()
        .map(|column| {
            let key = model_to_form(column).unwrap_or(column);
            inputs.get(key).map_or(0.0, as_f64)
        })
        .collect()
}

/// Value of a model feature for seeding a slider.
///
/// Looks up the mapped form field, then any input whose name matches
/// ignoring spaces and case. Falls back to 0.
pub fn value_for_feature(feature: &str, inputs: &UserInputs) -> Number {
    if let Some(value) = model_to_form(feature).and_then(|key| inputs.get(key)) {
        return value.clone();
    }
    let wanted = squash(feature);
    inputs
        .iter()
        .find(|(k, _)| squash(k) == wanted)
        .map_or_else(zero, |(_, v)| v.clone())
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn coercion_rules() {
        assert_eq!(to_number(&json!(null)), Number::from(0));
        assert_eq!(to_number(&json!("")), Number::from(0));
        assert_eq!(to_number(&json!("  Yes ")), Number::from(1));
        assert_eq!(to_number(&json!("n")), Number::from(0));
        assert_eq!(to_number(&json!(true)), Number::from(1));
        assert_eq!(to_number(&json!("54")), Number::from(54));
        assert_eq!(to_number(&json!("1.5")).as_f64(), Some(1.5));
        assert_eq!(to_number(&json!("1e3")).as_f64(), Some(1000.0));
        assert_eq!(to_number(&json!("abc")), Number::from(0));
        assert_eq!(to_number(&json!(27.5)).as_f64(), Some(27.5));
        assert_eq!(to_number(&json!([1])), Number::from(0));
    }

    #[test]
    fn model_columns_map_back_to_form_fields() {
        assert_eq!(model_to_form("resting bp s"), Some("restingBpS"));
        assert_eq!(model_to_form("male"), Some("sex"));
        assert_eq!(model_to_form("glucose"), None);
    }

    #[test]
    fn form_post_collects_expected_fields() {
        let form = HashMap::from([
            ("age".to_string(), "61".to_string()),
            ("ignored".to_string(), "5".to_string()),
        ]);
        let inputs = from_form(&form);
        assert_eq!(inputs.len(), EXPECTED_FORM_FIELDS.len());
        assert_eq!(inputs["age"], Number::from(61));
        assert_eq!(inputs["BMI"], Number::from(0));
        assert!(!inputs.contains_key("ignored"));
    }

    #[test]
    fn modified_model_column_lands_on_form_key() {
        let base = InputMap::from([
            ("restingBpS".to_string(), json!(120)),
            ("age".to_string(), json!("50")),
        ]);
        let modified = InputMap::from([
            ("resting bp s".to_string(), json!(150)),
            ("glucose".to_string(), json!("90")),
        ]);
        let merged = merge(&base, &modified);
        assert_eq!(merged["restingBpS"], Number::from(150));
        assert_eq!(merged["age"], Number::from(50));
        assert_eq!(merged["glucose"], Number::from(90));
        assert!(!merged.contains_key("resting bp s"));
    }

    #[test]
    fn rows_follow_feature_order_with_zero_fill() {
        let features: Vec<String> = ["male", "age", "glucose", "resting bp s"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let inputs = UserInputs::from([
            ("sex".to_string(), Number::from(1)),
            ("age".to_string(), Number::from(60)),
            ("glucose".to_string(), Number::from(95)),
        ]);
        assert_eq!(model_row(&features, &inputs), vec![1.0, 60.0, 95.0, 0.0]);
    }

    #[test]
    fn feature_values_fall_back_to_fuzzy_match() {
        let inputs = UserInputs::from([
            ("sex".to_string(), Number::from(1)),
            ("Glu Cose".to_string(), Number::from(88)),
        ]);
        assert_eq!(value_for_feature("male", &inputs), Number::from(1));
        assert_eq!(value_for_feature("glucose", &inputs), Number::from(88));
        assert_eq!(value_for_feature("BMI", &inputs), Number::from(0));
    }
}
