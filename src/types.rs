//! Core domain types for the co-pyrolysis prediction service.
//!
//! Everything the validation, orchestration, and formatting layers exchange
//! lives here: the raw form inputs, the validated parameter triple, and the
//! fixed seven-metric prediction result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Metric Schema
// ============================================================================

/// The seven metric keys every collaborator response must contain,
/// in display order.
pub const METRIC_KEYS: [&str; 7] = [
    "CH4_in_gas_pct",
    "CO2_in_gas_pct",
    "gas_yield_pct",
    "liquid_yield_pct",
    "N_compounds_in_oil_pct",
    "phenol_in_oil_pct",
    "acid_in_oil_pct",
];

/// Display labels matching `METRIC_KEYS` index-for-index.
pub const METRIC_LABELS: [&str; 7] = [
    "CH4 in gas (%)",
    "CO2 in gas (%)",
    "Gas yield (%)",
    "Liquid yield (%)",
    "N-compounds in oil (%)",
    "Phenol in oil (%)",
    "Acid in oil (%)",
];

// ============================================================================
// Inputs
// ============================================================================

/// Raw textual parameter values exactly as submitted from the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParameters {
    /// Sludge blend ratio (%), expected 0-100
    pub sludge_ratio: String,
    /// Carbon content (%), expected 0-100
    pub carbon_content: String,
    /// Pyrolysis temperature (C), expected 500-900
    pub temperature: String,
}

/// Identifies which of the three parameters a range failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterField {
    SludgeRatio,
    CarbonContent,
    Temperature,
}

impl ParameterField {
    /// Inclusive (min, max) bounds for this field.
    #[must_use]
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::SludgeRatio | Self::CarbonContent => (0.0, 100.0),
            Self::Temperature => (500.0, 900.0),
        }
    }

    /// The exact out-of-range message shown to the engineer.
    #[must_use]
    pub fn range_message(self) -> String {
        let (min, max) = self.bounds();
        format!("{} must be between {} and {}", self.name(), min, max)
    }

    /// Human-readable field name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SludgeRatio => "sludge ratio",
            Self::CarbonContent => "carbon content",
            Self::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for ParameterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated, immutable triple of process inputs.
///
/// Constructed only by the validator. Retains the original text of each
/// field so the collaborator request carries exactly what the engineer
/// typed, with no reformatting.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    sludge_ratio_pct: f64,
    carbon_content_pct: f64,
    pyrolysis_temp_c: f64,
    raw: [String; 3],
}

impl ParameterSet {
    /// Crate-visible constructor; callers outside the crate must go
    /// through [`crate::validation::validate`].
    pub(crate) fn new(
        sludge_ratio_pct: f64,
        carbon_content_pct: f64,
        pyrolysis_temp_c: f64,
        raw: [String; 3],
    ) -> Self {
        Self {
            sludge_ratio_pct,
            carbon_content_pct,
            pyrolysis_temp_c,
            raw,
        }
    }

    #[must_use]
    pub const fn sludge_ratio_pct(&self) -> f64 {
        self.sludge_ratio_pct
    }

    #[must_use]
    pub const fn carbon_content_pct(&self) -> f64 {
        self.carbon_content_pct
    }

    #[must_use]
    pub const fn pyrolysis_temp_c(&self) -> f64 {
        self.pyrolysis_temp_c
    }

    /// The ordered request triple (ratio, carbon, temperature) in the
    /// engineer's original textual representation.
    #[must_use]
    pub const fn request_values(&self) -> &[String; 3] {
        &self.raw
    }
}

// ============================================================================
// Prediction Result
// ============================================================================

/// The fixed seven-metric output of the prediction collaborator.
///
/// A value of this type always carries all seven metrics; an incomplete
/// collaborator response never becomes a `PredictionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "CH4_in_gas_pct")]
    pub ch4_in_gas_pct: f64,
    #[serde(rename = "CO2_in_gas_pct")]
    pub co2_in_gas_pct: f64,
    pub gas_yield_pct: f64,
    pub liquid_yield_pct: f64,
    #[serde(rename = "N_compounds_in_oil_pct")]
    pub n_compounds_in_oil_pct: f64,
    pub phenol_in_oil_pct: f64,
    pub acid_in_oil_pct: f64,
}

impl PredictionResult {
    /// Look up a metric by its schema key.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<f64> {
        match key {
            "CH4_in_gas_pct" => Some(self.ch4_in_gas_pct),
            "CO2_in_gas_pct" => Some(self.co2_in_gas_pct),
            "gas_yield_pct" => Some(self.gas_yield_pct),
            "liquid_yield_pct" => Some(self.liquid_yield_pct),
            "N_compounds_in_oil_pct" => Some(self.n_compounds_in_oil_pct),
            "phenol_in_oil_pct" => Some(self.phenol_in_oil_pct),
            "acid_in_oil_pct" => Some(self.acid_in_oil_pct),
            _ => None,
        }
    }

    /// Metric values in display order, matching [`METRIC_KEYS`].
    #[must_use]
    pub const fn in_display_order(&self) -> [f64; 7] {
        [
            self.ch4_in_gas_pct,
            self.co2_in_gas_pct,
            self.gas_yield_pct,
            self.liquid_yield_pct,
            self.n_compounds_in_oil_pct,
            self.phenol_in_oil_pct,
            self.acid_in_oil_pct,
        ]
    }
}

/// A prediction as held by the session store: the typed metrics plus the
/// collaborator's full response, kept verbatim for the raw view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub prediction: PredictionResult,
    /// Collaborator response, passed through unmodified.
    pub raw: serde_json::Value,
    pub predicted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys_and_labels_align() {
        assert_eq!(METRIC_KEYS.len(), METRIC_LABELS.len());
    }

    #[test]
    fn test_field_bounds() {
        assert_eq!(ParameterField::SludgeRatio.bounds(), (0.0, 100.0));
        assert_eq!(ParameterField::CarbonContent.bounds(), (0.0, 100.0));
        assert_eq!(ParameterField::Temperature.bounds(), (500.0, 900.0));
    }

    #[test]
    fn test_parameter_set_preserves_raw_text() {
        let params = ParameterSet::new(
            30.0,
            45.5,
            700.0,
            ["30".to_string(), "45.50".to_string(), "700".to_string()],
        );
        assert_eq!(
            params.request_values(),
            &["30".to_string(), "45.50".to_string(), "700".to_string()]
        );
    }

    #[test]
    fn test_value_of_covers_every_key() {
        let result = PredictionResult {
            ch4_in_gas_pct: 1.0,
            co2_in_gas_pct: 2.0,
            gas_yield_pct: 3.0,
            liquid_yield_pct: 4.0,
            n_compounds_in_oil_pct: 5.0,
            phenol_in_oil_pct: 6.0,
            acid_in_oil_pct: 7.0,
        };
        for (i, key) in METRIC_KEYS.iter().enumerate() {
            assert_eq!(result.value_of(key), Some((i + 1) as f64), "key {key}");
        }
        assert_eq!(result.value_of("unknown_metric"), None);
    }

    #[test]
    fn test_serde_keys_match_schema() {
        let result = PredictionResult {
            ch4_in_gas_pct: 1.0,
            co2_in_gas_pct: 2.0,
            gas_yield_pct: 3.0,
            liquid_yield_pct: 4.0,
            n_compounds_in_oil_pct: 5.0,
            phenol_in_oil_pct: 6.0,
            acid_in_oil_pct: 7.0,
        };
        let json = serde_json::to_value(result).unwrap();
        for key in METRIC_KEYS {
            assert!(json.get(key).is_some(), "serialized form missing {key}");
        }
    }
}
