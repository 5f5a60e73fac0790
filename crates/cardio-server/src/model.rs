//! Model artifacts and the stacked classifier.
//!
//! Each model is a logistic regression exported to JSON:
//!
//! ```json
//! {
//!   "name": "uci",
//!   "feature_names": ["age", "sex"],
//!   "coefficients": [0.04, 0.9],
//!   "intercept": -3.1,
//!   "importances": [0.6, 0.4]
//! }
//! ```
//!
//! Two first-stage models score the patient; a meta-model combines their
//! probabilities (`p_uci`, `p_fram`) into the final risk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ModelError;

/// What a model's decision function yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutput {
    /// Calibrated probability of the positive class.
    #[default]
    Probability,
    /// Hard 0/1 decision only.
    Decision,
}

/// A logistic model over named features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default)]
    pub name: String,
    /// Column order the model was trained with.
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    /// Per-feature importances; empty means all zero.
    #[serde(default)]
    pub importances: Vec<f64>,
    #[serde(default)]
    pub output: ModelOutput,
}

impl LogisticModel {
    /// Load and validate an artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::Missing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model: Self = serde_json::from_str(&text).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if model.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            model.name = stem.to_string_lossy().into_owned();
        }
        model.validate()?;
        info!(
            model = %model.name,
            features = model.feature_names.len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Check that coefficients and importances line up with the features.
    pub fn validate(&self) -> Result<(), ModelError> {
        let features = self.feature_names.len();
        if self.coefficients.len() != features {
            return Err(ModelError::Shape {
                name: self.name.clone(),
                features,
                coefficients: self.coefficients.len(),
            });
        }
        if !self.importances.is_empty() && self.importances.len() != features {
            return Err(ModelError::Importances {
                name: self.name.clone(),
                features,
                importances: self.importances.len(),
            });
        }
        Ok(())
    }

    fn logit(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(c, x)| c * x)
            .sum::<f64>()
            + self.intercept
    }

    /// Positive-class probability, or `None` for decision-only models.
    pub fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        match self.output {
            ModelOutput::Probability => Some(sigmoid(self.logit(row))),
            ModelOutput::Decision => None,
        }
    }

    /// Hard decision: 1 when the logit is non-negative.
    pub fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.logit(row) >= 0.0)
    }

    /// `(feature, importance)` pairs in feature order.
    pub fn importances(&self) -> impl Iterator<Item = (&str, f64)> {
        self.feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), self.importances.get(i).copied().unwrap_or(0.0)))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Probabilities from one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub uci: f64,
    pub fram: f64,
    pub stacked: f64,
}

/// Two first-stage models and the meta-model over their probabilities.
#[derive(Debug, Clone)]
pub struct StackedClassifier {
    pub uci: LogisticModel,
    pub fram: LogisticModel,
    pub meta: LogisticModel,
}

impl StackedClassifier {
    pub fn new(uci: LogisticModel, fram: LogisticModel, meta: LogisticModel) -> Self {
        Self { uci, fram, meta }
    }

    /// Score one patient from the two first-stage rows.
    ///
    /// First-stage models without probabilities contribute their 0/1
    /// decision, as does a decision-only meta-model.
    pub fn score(&self, uci_row: &[f64], fram_row: &[f64]) -> Scores {
        let uci = probability(&self.uci, uci_row);
        let fram = probability(&self.fram, fram_row);
        let stacked = probability(&self.meta, &[uci, fram]);
        Scores { uci, fram, stacked }
    }

    /// The `top_n` features by importance summed over both first-stage
    /// models. Ties keep first-seen order.
    pub fn top_features(&self, top_n: usize) -> Vec<String> {
        let mut combined: Vec<(&str, f64)> = Vec::new();
        for (name, importance) in self.uci.importances().chain(self.fram.importances()) {
            match combined.iter_mut().find(|(n, _)| *n == name) {
                Some((_, total)) => *total += importance,
                None => combined.push((name, importance)),
            }
        }
        combined.sort_by(|a, b| b.1.total_cmp(&a.1));
        combined
            .into_iter()
            .take(top_n)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

fn probability(model: &LogisticModel, row: &[f64]) -> f64 {
    model
        .predict_proba(row)
        .unwrap_or_else(|| f64::from(model.predict(row)))
}

/// Category label for a final probability.
pub fn risk_category(prob: f64) -> &'static str {
    if prob < 0.4 {
        "Low Risk"
    } else if prob <= 0.6 {
        "Moderate Risk"
    } else {
        "High Risk"
    }
}
