//! One prediction: inputs in, response body out.

use cardio_core::{FeatureValue, PredictResponse};
use serde_json::Value;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::ModelError;
use crate::inputs::{UserInputs, model_row, value_for_feature};
use crate::model::{LogisticModel, StackedClassifier, risk_category};
use crate::tips::TipTable;

/// Everything needed to answer `POST /predict`.
#[derive(Debug, Clone)]
pub struct Predictor {
    classifier: StackedClassifier,
    tips: TipTable,
    top_n: usize,
}

impl Predictor {
    pub fn new(classifier: StackedClassifier, tips: TipTable, top_n: usize) -> Self {
        Self {
            classifier,
            tips,
            top_n,
        }
    }

    /// Load the three artifacts and the tips named by `config`.
    pub fn load(config: &ServerConfig) -> Result<Self, ModelError> {
        let classifier = StackedClassifier::new(
            LogisticModel::load(&config.uci_path())?,
            LogisticModel::load(&config.fram_path())?,
            LogisticModel::load(&config.meta_path())?,
        );
        let tips = match &config.tips_file {
            Some(path) => TipTable::load(path)?,
            None => TipTable::default(),
        };
        Ok(Self::new(classifier, tips, config.top_n))
    }

    pub fn classifier(&self) -> &StackedClassifier {
        &self.classifier
    }

    /// Score `inputs` and build the response body.
    pub fn predict(&self, inputs: &UserInputs) -> PredictResponse {
        let uci_row = model_row(&self.classifier.uci.feature_names, inputs);
        let fram_row = model_row(&self.classifier.fram.feature_names, inputs);
        let scores = self.classifier.score(&uci_row, &fram_row);
        let top_features = self.classifier.top_features(self.top_n);
        let top_features_values = top_features
            .iter()
            .map(|name| FeatureValue::new(name.clone(), Value::Number(value_for_feature(name, inputs))))
            .collect();
        let tips = self.tips.tips_for(&top_features);
        debug!(final_prob = scores.stacked, "scored");

        PredictResponse {
            uci_prob: Some(round4(scores.uci)),
            fram_prob: Some(round4(scores.fram)),
            final_prob: Some(round4(scores.stacked)),
            final_cat: Some(risk_category(scores.stacked).to_string()),
            top_features: Some(top_features),
            top_features_values: Some(top_features_values),
            tips: Some(tips),
            suggestions: None,
        }
    }
}

/// Round to 4 decimals.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
