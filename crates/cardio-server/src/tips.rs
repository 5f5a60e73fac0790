//! Health tips for the top features.

use std::collections::HashMap;
use std::path::Path;

use cardio_core::Tip;

use crate::error::ModelError;
use crate::inputs::model_to_form;

/// Tip used for features without an entry.
pub const DEFAULT_TIP: &str =
    "Maintain a balanced diet, regular exercise, avoid smoking, and get routine health checks.";

/// Feature name to advice, with a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipTable {
    tips: HashMap<String, String>,
}

impl Default for TipTable {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl TipTable {
    /// A table over `tips`. A `default` entry overrides [`DEFAULT_TIP`].
    pub fn new(mut tips: HashMap<String, String>) -> Self {
        tips.entry("default".into())
            .or_insert_with(|| DEFAULT_TIP.into());
        Self { tips }
    }

    /// Read a JSON object of feature name to tip.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tips = serde_json::from_str(&text).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(tips))
    }

    /// Advice for `feature`: exact name, lowercase name, then the mapped
    /// form field, then the default.
    pub fn lookup(&self, feature: &str) -> &str {
        self.tips
            .get(feature)
            .or_else(|| self.tips.get(&feature.to_lowercase()))
            .or_else(|| model_to_form(feature).and_then(|key| self.tips.get(key)))
            .or_else(|| self.tips.get("default"))
            .map_or(DEFAULT_TIP, String::as_str)
    }

    /// One tip per feature, in order.
    pub fn tips_for(&self, features: &[String]) -> Vec<Tip> {
        features
            .iter()
            .map(|f| Tip::feature(f.clone(), self.lookup(f)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TipTable {
        TipTable::new(HashMap::from([
            ("BMI".to_string(), "Keep BMI between 18.5 and 25.".to_string()),
            ("age".to_string(), "Screen regularly as you age.".to_string()),
            ("restingBpS".to_string(), "Monitor your blood pressure.".to_string()),
        ]))
    }

    #[test]
    fn lookup_order() {
        let t = table();
        assert_eq!(t.lookup("BMI"), "Keep BMI between 18.5 and 25.");
        assert_eq!(t.lookup("Age"), "Screen regularly as you age.");
        assert_eq!(t.lookup("resting bp s"), "Monitor your blood pressure.");
        assert_eq!(t.lookup("glucose"), DEFAULT_TIP);
    }

    #[test]
    fn custom_default_wins() {
        let t = TipTable::new(HashMap::from([("default".to_string(), "See a doctor.".to_string())]));
        assert_eq!(t.lookup("anything"), "See a doctor.");
    }

    #[test]
    fn tips_keep_feature_order() {
        let tips = table().tips_for(&["glucose".to_string(), "BMI".to_string()]);
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[1], Tip::feature("BMI", "Keep BMI between 18.5 and 25."));
    }
}
