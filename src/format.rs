//! Result formatting: project the stored prediction into the fixed
//! seven-row display schema, or a placeholder when no result exists yet.
//!
//! Formatting is pure — same input, same output, no store mutation.

use serde::Serialize;

use crate::types::{StoredResult, METRIC_KEYS, METRIC_LABELS};

/// Message shown before the first successful prediction of a session.
pub const NO_RESULT_PLACEHOLDER: &str = "no result yet";

/// One display row: a fixed label plus the metric value, verbatim from
/// the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMetric {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
}

/// The display form of a session's result slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormattedResult {
    /// Store is empty; callers render the placeholder, not a metric list.
    Empty { message: &'static str },
    /// All seven metrics in fixed order plus the raw collaborator response.
    Ready {
        metrics: Vec<DisplayMetric>,
        raw: serde_json::Value,
        predicted_at: chrono::DateTime<chrono::Utc>,
    },
}

impl FormattedResult {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Format the store contents for display.
///
/// Row order is fixed: CH4 in gas, CO2 in gas, gas yield, liquid yield,
/// N-compounds in oil, phenol in oil, acid in oil. Values are passed
/// through without rounding or alteration.
#[must_use]
pub fn format_result(stored: Option<&StoredResult>) -> FormattedResult {
    match stored {
        None => FormattedResult::Empty {
            message: NO_RESULT_PLACEHOLDER,
        },
        Some(stored) => {
            let values = stored.prediction.in_display_order();
            let metrics = METRIC_KEYS
                .iter()
                .zip(METRIC_LABELS.iter())
                .zip(values.iter())
                .map(|((key, label), value)| DisplayMetric {
                    key,
                    label,
                    value: *value,
                })
                .collect();
            FormattedResult::Ready {
                metrics,
                raw: stored.raw.clone(),
                predicted_at: stored.predicted_at,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PredictionResult;

    fn sample() -> StoredResult {
        StoredResult {
            prediction: PredictionResult {
                ch4_in_gas_pct: 12.34,
                co2_in_gas_pct: 30.1,
                gas_yield_pct: 25.6789,
                liquid_yield_pct: 41.2,
                n_compounds_in_oil_pct: 3.05,
                phenol_in_oil_pct: 8.8,
                acid_in_oil_pct: 2.21,
            },
            raw: serde_json::json!({"predictions": {"gas_yield_pct": 25.6789}, "model": "v3"}),
            predicted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_empty_store_yields_placeholder() {
        let formatted = format_result(None);
        assert!(formatted.is_empty());
        assert_eq!(
            formatted,
            FormattedResult::Empty {
                message: NO_RESULT_PLACEHOLDER
            }
        );
    }

    #[test]
    fn test_seven_rows_in_fixed_order() {
        let stored = sample();
        let FormattedResult::Ready { metrics, .. } = format_result(Some(&stored)) else {
            panic!("expected Ready");
        };
        let labels: Vec<&str> = metrics.iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            vec![
                "CH4 in gas (%)",
                "CO2 in gas (%)",
                "Gas yield (%)",
                "Liquid yield (%)",
                "N-compounds in oil (%)",
                "Phenol in oil (%)",
                "Acid in oil (%)",
            ]
        );
    }

    #[test]
    fn test_values_pass_through_unrounded() {
        let stored = sample();
        let FormattedResult::Ready { metrics, .. } = format_result(Some(&stored)) else {
            panic!("expected Ready");
        };
        assert_eq!(metrics[2].value, 25.6789);
        assert_eq!(metrics[0].value, 12.34);
    }

    #[test]
    fn test_raw_view_is_verbatim() {
        let stored = sample();
        let FormattedResult::Ready { raw, .. } = format_result(Some(&stored)) else {
            panic!("expected Ready");
        };
        assert_eq!(raw, stored.raw);
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let stored = sample();
        let first = format_result(Some(&stored));
        let second = format_result(Some(&stored));
        assert_eq!(first, second);
    }
}
