#![forbid(unsafe_code)]

//! Canonical feature bounds and key resolution.
//!
//! The limits table and the synonym map are immutable once built. A
//! [`FeatureCatalog`] bundles both and is shared (behind an `Arc`) by every
//! normalizer, so tests can inject alternate tables without touching globals.

use std::collections::HashMap;

/// Canonical bounds of one physiological measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
    /// Slider granularity; always positive.
    pub step: f64,
}

impl Limits {
    /// Step used when a table entry does not care.
    pub const DEFAULT_STEP: f64 = 1.0;

    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Bounds with the default step.
    #[must_use]
    pub const fn whole(min: f64, max: f64) -> Self {
        Self::new(min, max, Self::DEFAULT_STEP)
    }
}

/// Canonical key to bounds.
#[derive(Debug, Clone, Default)]
pub struct LimitsTable {
    entries: HashMap<String, Limits>,
}

impl LimitsTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Keys are normalized on insert.
    #[must_use]
    pub fn with(mut self, key: &str, limits: Limits) -> Self {
        self.entries.insert(normalize_key(key), limits);
        self
    }

    /// Look up a canonical key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Limits> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bounds for the measurements the risk models use.
    #[must_use]
    pub fn cardio() -> Self {
        Self::new()
            .with("age", Limits::whole(18.0, 100.0))
            .with("trestbps", Limits::whole(80.0, 200.0))
            .with("chol", Limits::whole(100.0, 600.0))
            .with("thalach", Limits::whole(60.0, 220.0))
            .with("oldpeak", Limits::new(-3.0, 7.0, 0.1))
            .with("bmi", Limits::new(15.0, 50.0, 0.1))
            .with("sysbp", Limits::whole(80.0, 300.0))
            .with("diabp", Limits::whole(40.0, 150.0))
            .with("totchol", Limits::whole(100.0, 600.0))
            .with("heartrate", Limits::whole(40.0, 200.0))
            .with("glucose", Limits::whole(40.0, 400.0))
            .with("cigsperday", Limits::whole(0.0, 70.0))
    }
}

/// Alternate spelling to canonical key.
#[derive(Debug, Clone, Default)]
pub struct SynonymMap {
    entries: HashMap<String, String>,
}

impl SynonymMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a synonym. Both sides are normalized on insert.
    #[must_use]
    pub fn with(mut self, alias: &str, canonical: &str) -> Self {
        self.entries
            .insert(normalize_key(alias), normalize_key(canonical));
        self
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    /// Synonyms for the labels and column names used by the form and models.
    #[must_use]
    pub fn cardio() -> Self {
        Self::new()
            .with("resting bp s", "trestbps")
            .with("restingBpS", "trestbps")
            .with("resting blood pressure", "trestbps")
            .with("restingbp", "trestbps")
            .with("max heart rate", "thalach")
            .with("maxHeartRate", "thalach")
            .with("maxhr", "thalach")
            .with("cholesterol", "chol")
            .with("serum cholesterol", "chol")
            .with("total cholesterol", "totchol")
            .with("systolic bp", "sysbp")
            .with("systolic", "sysbp")
            .with("diastolic bp", "diabp")
            .with("diastolic", "diabp")
            .with("body mass index", "bmi")
            .with("hr", "heartrate")
            .with("heart rate", "heartrate")
            .with("st depression", "oldpeak")
            .with("cigarettes per day", "cigsperday")
            .with("cigs", "cigsperday")
            .with("age years", "age")
    }
}

/// Limits table plus synonym map.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    pub limits: LimitsTable,
    pub synonyms: SynonymMap,
}

impl FeatureCatalog {
    #[must_use]
    pub fn new(limits: LimitsTable, synonyms: SynonymMap) -> Self {
        Self { limits, synonyms }
    }

    /// The stock catalog for the risk models.
    #[must_use]
    pub fn cardio() -> Self {
        Self::new(LimitsTable::cardio(), SynonymMap::cardio())
    }

    /// Resolve a raw feature key.
    ///
    /// A direct table hit wins, then the synonym map; otherwise the
    /// normalized string comes back unresolved and the caller must check the
    /// table before using it.
    #[must_use]
    pub fn resolve_key(&self, raw: &str) -> String {
        let key = normalize_key(raw);
        if self.limits.contains(&key) {
            return key;
        }
        match self.synonyms.get(&key) {
            Some(canonical) => canonical.to_string(),
            None => key,
        }
    }

    /// Bounds for a raw key, if it resolves to a table entry.
    #[must_use]
    pub fn limits_for(&self, raw: &str) -> Option<(String, Limits)> {
        let key = self.resolve_key(raw);
        let limits = *self.limits.get(&key)?;
        Some((key, limits))
    }
}

/// Lowercase and keep only alphanumerics (whitespace, punctuation and
/// separators are dropped).
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
