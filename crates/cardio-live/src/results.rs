#![forbid(unsafe_code)]

//! The results view: prediction text, tips, feature sliders and the update
//! button.

use cardio_core::{InputMap, PredictResponse, Tip, input_value};

use crate::limits::normalize_key;
use crate::slider::{Normalizer, SliderRow};

/// Idle label of the update button.
pub const UPDATE_LABEL: &str = "Update Prediction";
/// Label while a request is in flight.
pub const BUSY_LABEL: &str = "Updating...";

/// The "Update Prediction" button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateButton {
    pub label: String,
    pub enabled: bool,
}

impl Default for UpdateButton {
    fn default() -> Self {
        Self {
            label: UPDATE_LABEL.to_string(),
            enabled: true,
        }
    }
}

impl UpdateButton {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.enabled && self.label == UPDATE_LABEL
    }

    pub(crate) fn set_busy(&mut self) {
        self.enabled = false;
        self.label = BUSY_LABEL.to_string();
    }

    pub(crate) fn set_idle(&mut self) {
        self.enabled = true;
        self.label = UPDATE_LABEL.to_string();
    }
}

/// A text element that may be absent from the view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextElement {
    pub text: String,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Everything shown after a prediction.
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    /// Primary result element.
    pub result: Option<TextElement>,
    /// Fallback element for the result text.
    pub prediction: Option<TextElement>,
    /// Suggestion list; absent means there is nowhere to show tips.
    pub suggestions: Option<Vec<String>>,
    pub rows: Vec<SliderRow>,
    pub button: Option<UpdateButton>,
    /// Snapshot of the inputs the first prediction was made with.
    pub base_inputs: Option<InputMap>,
    alerts: Vec<String>,
}

impl ResultsView {
    /// Empty view with both text elements and a suggestion list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: Some(TextElement::default()),
            suggestions: Some(Vec::new()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_inputs(mut self, base: InputMap) -> Self {
        self.base_inputs = Some(base);
        self
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<SliderRow>) -> Self {
        self.rows = rows;
        self
    }

    /// Build the view for a fresh prediction: result text, tips and one
    /// normalized slider per top feature.
    pub fn from_response(
        response: &PredictResponse,
        base_inputs: Option<InputMap>,
        normalizer: &Normalizer,
    ) -> Self {
        let mut rows: Vec<SliderRow> = response
            .top_features_values
            .iter()
            .flatten()
            .map(|fv| SliderRow::for_feature(&fv.name, fv.value_text()))
            .collect();
        if rows.is_empty() {
            rows = response
                .top_features
                .iter()
                .flatten()
                .map(|name| SliderRow::for_feature(name, ""))
                .collect();
        }
        for row in &mut rows {
            normalizer.normalize_row(row);
        }
        let mut view = Self::new().with_rows(rows);
        view.base_inputs = base_inputs;
        view.apply_result_text(response);
        view.apply_tips(response);
        view.ensure_update_button();
        view
    }

    /// Create the update button if the view lacks one.
    pub fn ensure_update_button(&mut self) -> &mut UpdateButton {
        self.button.get_or_insert_with(UpdateButton::default)
    }

    /// Text currently shown as the result.
    #[must_use]
    pub fn result_text(&self) -> Option<&str> {
        self.result
            .as_ref()
            .or(self.prediction.as_ref())
            .map(|e| e.text.as_str())
    }

    /// Current slider values keyed by each slider's feature key.
    #[must_use]
    pub fn collect_modified(&self) -> InputMap {
        self.rows
            .iter()
            .filter_map(|row| {
                let key = row.slider.key()?;
                Some((key.to_string(), input_value(&row.slider.value)))
            })
            .collect()
    }

    /// Find a slider row by feature name.
    ///
    /// Exact key match first, then a match on the normalized key.
    pub fn row_mut(&mut self, name: &str) -> Option<&mut SliderRow> {
        let idx = self
            .rows
            .iter()
            .position(|r| r.slider.key() == Some(name))
            .or_else(|| {
                let wanted = normalize_key(name);
                self.rows.iter().position(|r| {
                    r.slider.key().map(normalize_key).as_deref() == Some(wanted.as_str())
                })
            })?;
        self.rows.get_mut(idx)
    }

    /// Write the result text into the result element, else the prediction
    /// element. Responses without a category or probability leave it alone.
    pub fn apply_result_text(&mut self, response: &PredictResponse) -> bool {
        let Some(text) = response.result_text() else {
            return false;
        };
        match self.result.as_mut().or(self.prediction.as_mut()) {
            Some(element) => {
                element.text = text;
                true
            }
            None => false,
        }
    }

    /// Replace the suggestion list with the response's tips.
    pub fn apply_tips(&mut self, response: &PredictResponse) -> bool {
        let (Some(list), Some(tips)) = (self.suggestions.as_mut(), response.effective_tips())
        else {
            return false;
        };
        *list = tips.iter().map(Tip::to_string).collect();
        true
    }

    /// Apply server-side value corrections to the named sliders and
    /// re-normalize them. Returns how many rows were touched.
    pub fn apply_feature_values(
        &mut self,
        response: &PredictResponse,
        normalizer: &Normalizer,
    ) -> usize {
        let Some(values) = &response.top_features_values else {
            return 0;
        };
        let mut touched = 0;
        for fv in values {
            if let Some(row) = self.row_mut(&fv.name) {
                row.slider.value = fv.value_text();
                normalizer.normalize_row(row);
                touched += 1;
            }
        }
        touched
    }

    /// Raise an alert.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    /// Pending alerts, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Dismiss the oldest alert.
    pub fn dismiss_alert(&mut self) -> Option<String> {
        if self.alerts.is_empty() {
            None
        } else {
            Some(self.alerts.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_core::FeatureValue;
    use serde_json::{Value, json};

    fn response(value: Value) -> PredictResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn probability_becomes_percentage() {
        let mut view = ResultsView::new();
        assert!(view.apply_result_text(&response(json!({"final_prob": 0.734}))));
        assert_eq!(view.result_text(), Some("73.4%"));
    }

    #[test]
    fn category_preferred_over_probability() {
        let mut view = ResultsView::new();
        view.apply_result_text(&response(
            json!({"final_prob": 0.7, "final_cat": "High Risk"}),
        ));
        assert_eq!(view.result_text(), Some("High Risk"));
    }

    #[test]
    fn result_falls_back_to_prediction_element() {
        let mut view = ResultsView {
            prediction: Some(TextElement::default()),
            ..ResultsView::default()
        };
        view.apply_result_text(&response(json!({"final_cat": "Low Risk"})));
        assert_eq!(view.prediction.as_ref().unwrap().text, "Low Risk");
    }

    #[test]
    fn missing_fields_leave_view_alone() {
        let mut view = ResultsView::new();
        view.result = Some(TextElement::new("old"));
        view.suggestions = Some(vec!["keep".into()]);
        let empty = response(json!({}));
        assert!(!view.apply_result_text(&empty));
        assert!(!view.apply_tips(&empty));
        assert_eq!(view.result_text(), Some("old"));
        assert_eq!(view.suggestions.as_deref(), Some(&["keep".to_string()][..]));
    }

    #[test]
    fn tips_render_feature_and_text() {
        let mut view = ResultsView::new();
        view.apply_tips(&response(
            json!({"tips": [{"feature": "BMI", "tip": "Reduce weight"}]}),
        ));
        assert_eq!(
            view.suggestions.as_deref(),
            Some(&["**BMI** — Reduce weight".to_string()][..])
        );
    }

    #[test]
    fn tips_win_over_suggestions() {
        let mut view = ResultsView::new();
        view.apply_tips(&response(json!({
            "tips": ["a"],
            "suggestions": ["b", "c"],
        })));
        assert_eq!(view.suggestions.as_deref(), Some(&["a".to_string()][..]));
    }

    #[test]
    fn suggestions_used_without_tips() {
        let mut view = ResultsView::new();
        view.apply_tips(&response(json!({"suggestions": ["b"]})));
        assert_eq!(view.suggestions.as_deref(), Some(&["b".to_string()][..]));
    }

    #[test]
    fn modified_keys_follow_slider_keys() {
        let view = ResultsView::new().with_rows(vec![
            SliderRow::for_feature("resting bp s", "140"),
            SliderRow::for_feature("oldpeak", "1.5"),
            SliderRow::for_feature("note", "n/a"),
        ]);
        let modified = view.collect_modified();
        assert_eq!(modified["resting bp s"], json!(140));
        assert_eq!(modified["oldpeak"], json!(1.5));
        assert_eq!(modified["note"], json!("n/a"));
    }

    #[test]
    fn feature_values_renormalize_named_rows() {
        let normalizer = Normalizer::default();
        let mut view = ResultsView::new().with_rows(vec![
            SliderRow::for_feature("max heart rate", "150"),
            SliderRow::for_feature("age", "50"),
        ]);
        let resp = PredictResponse {
            top_features_values: Some(vec![
                FeatureValue::new("Max Heart Rate", json!(9000)),
                FeatureValue::new("unknown", json!(1)),
            ]),
            ..PredictResponse::default()
        };
        assert_eq!(view.apply_feature_values(&resp, &normalizer), 1);
        assert_eq!(view.rows[0].slider.value, "220");
        assert_eq!(view.rows[0].readout(), Some("220"));
        assert_eq!(view.rows[1].slider.value, "50");
    }

    #[test]
    fn from_response_seeds_rows_and_button() {
        let resp = response(json!({
            "final_prob": 0.2,
            "final_cat": "Low Risk",
            "top_features_values": [
                {"name": "resting bp s", "value": 500},
                {"name": "ST slope", "value": 2},
            ],
        }));
        let view = ResultsView::from_response(&resp, None, &Normalizer::default());
        assert_eq!(view.result_text(), Some("Low Risk"));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].slider.value, "200");
        assert_eq!(view.rows[1].slider.value, "2");
        assert!(view.button.as_ref().unwrap().is_idle());
    }

    #[test]
    fn alerts_queue_in_order() {
        let mut view = ResultsView::new();
        view.alert("one");
        view.alert("two");
        assert_eq!(view.dismiss_alert().as_deref(), Some("one"));
        assert_eq!(view.alerts(), ["two".to_string()]);
    }
}
