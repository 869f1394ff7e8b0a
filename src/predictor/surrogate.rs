//! Offline surrogate model.
//!
//! Produces plausible co-pyrolysis yields from simple empirical trends so
//! the service can run without a model server: higher temperature shifts
//! product toward gas, higher carbon content raises CH4, sludge ratio
//! pushes nitrogen compounds into the oil. Small random jitter keeps
//! repeated runs from looking suspiciously identical.
//!
//! The numbers are indicative only; the quality of the estimates is not
//! part of this component's contract.

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;

use super::{Predictor, PredictorError};
use crate::types::ParameterSet;

/// Built-in collaborator used when no model server is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurrogateModel;

impl SurrogateModel {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn jitter(span: f64) -> f64 {
    rand::thread_rng().gen_range(-span..=span)
}

#[async_trait]
impl Predictor for SurrogateModel {
    async fn predict(&self, params: &ParameterSet) -> Result<serde_json::Value, PredictorError> {
        let ratio = params.sludge_ratio_pct();
        let carbon = params.carbon_content_pct();
        let temp = params.pyrolysis_temp_c();

        // Normalized temperature position within the valid 500-900 C window.
        let t = (temp - 500.0) / 400.0;

        let gas_yield = clamp_pct(18.0 + 22.0 * t + 0.05 * ratio + jitter(0.8));
        let liquid_yield = clamp_pct(48.0 - 14.0 * t - 0.04 * ratio + jitter(0.8));
        let ch4 = clamp_pct(8.0 + 10.0 * t + 0.12 * carbon + jitter(0.5));
        let co2 = clamp_pct(38.0 - 12.0 * t - 0.06 * carbon + jitter(0.5));
        let n_compounds = clamp_pct(1.5 + 0.09 * ratio + jitter(0.2));
        let phenol = clamp_pct(6.0 + 4.0 * t * (1.0 - t) + 0.02 * ratio + jitter(0.3));
        let acid = clamp_pct(4.5 - 2.5 * t + 0.01 * ratio + jitter(0.2));

        Ok(json!({
            "model": "surrogate",
            "parameters": params.request_values(),
            "predictions": {
                "CH4_in_gas_pct": ch4,
                "CO2_in_gas_pct": co2,
                "gas_yield_pct": gas_yield,
                "liquid_yield_pct": liquid_yield,
                "N_compounds_in_oil_pct": n_compounds,
                "phenol_in_oil_pct": phenol,
                "acid_in_oil_pct": acid,
            },
        }))
    }

    fn describe(&self) -> &'static str {
        "surrogate"
    }
}
