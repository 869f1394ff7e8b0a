//! Prediction orchestration.
//!
//! Takes a validated [`ParameterSet`], holds the session's single-in-flight
//! permit for the duration of the collaborator call, checks the response
//! against the seven-metric schema, and writes the session store on success
//! only. Every failure path leaves the store exactly as it was.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::predictor::{Predictor, PredictorError};
use crate::session::SessionHandle;
use crate::types::{ParameterSet, PredictionResult, StoredResult};

/// A classified orchestration failure. All variants are recoverable: the
/// session survives, the store is untouched, and the engineer resubmits.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// A prediction is already in flight for this session; no second
    /// collaborator call is issued.
    #[error("a prediction is already in progress for this session")]
    InFlight,
    /// The collaborator call itself failed.
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictorError),
    /// The collaborator answered but broke the seven-key contract. This is
    /// the model's fault, not the user's, and is logged accordingly.
    #[error("model response missing required metric '{missing}'")]
    Schema { missing: &'static str },
}

/// Drives one prediction per user action against the configured collaborator.
pub struct PredictionOrchestrator {
    predictor: Arc<dyn Predictor>,
}

impl PredictionOrchestrator {
    #[must_use]
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Name of the backing predictor, for the status endpoint.
    #[must_use]
    pub fn model_mode(&self) -> &'static str {
        self.predictor.describe()
    }

    /// Run one prediction for `session`.
    ///
    /// The collaborator is invoked exactly once, with the ordered triple in
    /// the engineer's original textual representation. On success the
    /// session slot is overwritten (last-write-wins) and the stored result
    /// returned; on any failure the slot keeps its previous contents.
    pub async fn predict(
        &self,
        session: &SessionHandle,
        params: ParameterSet,
    ) -> Result<StoredResult, PredictError> {
        // Permit is held until this function returns, covering the full
        // collaborator call. No cancellation: once issued, the call runs
        // to completion or failure.
        let _permit = session
            .try_begin_prediction()
            .ok_or(PredictError::InFlight)?;

        let raw = match self.predictor.predict(&params).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = self.predictor.describe(), error = %e, "prediction call failed");
                return Err(PredictError::Prediction(e));
            }
        };

        let prediction = match extract_prediction(&raw) {
            Ok(p) => p,
            Err(e) => {
                // Contract violation by the collaborator, distinct from an
                // operational failure.
                error!(model = self.predictor.describe(), error = %e, "model broke response contract");
                return Err(e);
            }
        };

        let stored = StoredResult {
            prediction,
            raw,
            predicted_at: Utc::now(),
        };
        session.store.set(stored.clone()).await;
        session.touch().await;
        info!(
            model = self.predictor.describe(),
            gas_yield_pct = prediction.gas_yield_pct,
            liquid_yield_pct = prediction.liquid_yield_pct,
            "prediction stored"
        );
        Ok(stored)
    }
}

/// Check the collaborator response against the fixed schema: a
/// `predictions` object carrying all seven metrics as numbers.
///
/// A missing or non-numeric key is surfaced, never defaulted.
fn extract_prediction(raw: &serde_json::Value) -> Result<PredictionResult, PredictError> {
    let predictions = raw
        .get("predictions")
        .and_then(serde_json::Value::as_object)
        .ok_or(PredictError::Schema {
            missing: "predictions",
        })?;

    let metric = |key: &'static str| -> Result<f64, PredictError> {
        predictions
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .ok_or(PredictError::Schema { missing: key })
    };

    Ok(PredictionResult {
        ch4_in_gas_pct: metric("CH4_in_gas_pct")?,
        co2_in_gas_pct: metric("CO2_in_gas_pct")?,
        gas_yield_pct: metric("gas_yield_pct")?,
        liquid_yield_pct: metric("liquid_yield_pct")?,
        n_compounds_in_oil_pct: metric("N_compounds_in_oil_pct")?,
        phenol_in_oil_pct: metric("phenol_in_oil_pct")?,
        acid_in_oil_pct: metric("acid_in_oil_pct")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawParameters;
    use crate::validation::validate;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Collaborator double: replays a canned response and records every
    /// request triple it receives.
    struct ScriptedPredictor {
        response: Result<serde_json::Value, ()>,
        calls: Mutex<Vec<[String; 3]>>,
    }

    impl ScriptedPredictor {
        fn ok(response: serde_json::Value) -> Self {
            Self {
                response: Ok(response),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<[String; 3]> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Predictor for ScriptedPredictor {
        async fn predict(
            &self,
            params: &ParameterSet,
        ) -> Result<serde_json::Value, PredictorError> {
            self.calls.lock().unwrap().push(params.request_values().clone());
            match &self.response {
                Ok(v) => Ok(v.clone()),
                Err(()) => Err(PredictorError::Status {
                    status: 500,
                    detail: "model server down".to_string(),
                }),
            }
        }

        fn describe(&self) -> &'static str {
            "scripted"
        }
    }

    fn params(ratio: &str, carbon: &str, temp: &str) -> ParameterSet {
        validate(&RawParameters {
            sludge_ratio: ratio.to_string(),
            carbon_content: carbon.to_string(),
            temperature: temp.to_string(),
        })
        .unwrap()
    }

    fn complete_response() -> serde_json::Value {
        serde_json::json!({
            "predictions": {
                "CH4_in_gas_pct": 12.3,
                "CO2_in_gas_pct": 30.1,
                "gas_yield_pct": 25.6,
                "liquid_yield_pct": 41.2,
                "N_compounds_in_oil_pct": 3.0,
                "phenol_in_oil_pct": 8.8,
                "acid_in_oil_pct": 2.2,
            }
        })
    }

    #[tokio::test]
    async fn test_collaborator_called_once_with_ordered_triple() {
        let predictor = Arc::new(ScriptedPredictor::ok(complete_response()));
        let orchestrator = PredictionOrchestrator::new(Arc::clone(&predictor) as Arc<dyn Predictor>);
        let session = SessionHandle::new();

        let stored = orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap();

        assert_eq!(
            predictor.calls(),
            vec![["30".to_string(), "45".to_string(), "700".to_string()]]
        );
        assert_eq!(stored.prediction.gas_yield_pct, 25.6);
        assert!(session.store.get().await.is_some());
    }

    #[tokio::test]
    async fn test_missing_key_is_schema_error_and_store_unchanged() {
        let mut incomplete = complete_response();
        incomplete["predictions"]
            .as_object_mut()
            .unwrap()
            .remove("liquid_yield_pct");
        let predictor = Arc::new(ScriptedPredictor::ok(incomplete));
        let orchestrator = PredictionOrchestrator::new(predictor as Arc<dyn Predictor>);
        let session = SessionHandle::new();

        let before = session.store.get().await;
        let err = orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PredictError::Schema {
                missing: "liquid_yield_pct"
            }
        ));
        assert!(before.is_none());
        assert!(session.store.get().await.is_none(), "store written on failure");
    }

    #[tokio::test]
    async fn test_non_numeric_metric_is_schema_error() {
        let mut bad = complete_response();
        bad["predictions"]["gas_yield_pct"] = serde_json::json!("25.6");
        let predictor = Arc::new(ScriptedPredictor::ok(bad));
        let orchestrator = PredictionOrchestrator::new(predictor as Arc<dyn Predictor>);
        let session = SessionHandle::new();

        let err = orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_collaborator_failure_keeps_prior_result_visible() {
        let session = SessionHandle::new();

        // First, a successful prediction fills the slot.
        let good = Arc::new(ScriptedPredictor::ok(complete_response()));
        let orchestrator = PredictionOrchestrator::new(good as Arc<dyn Predictor>);
        orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap();

        // Then a failing collaborator must not disturb it.
        let bad = Arc::new(ScriptedPredictor::failing());
        let orchestrator = PredictionOrchestrator::new(bad as Arc<dyn Predictor>);
        let err = orchestrator
            .predict(&session, params("50", "60", "800"))
            .await
            .unwrap_err();

        assert!(matches!(err, PredictError::Prediction(_)));
        let stored = session.store.get().await.unwrap();
        assert_eq!(stored.prediction.gas_yield_pct, 25.6);
    }

    #[tokio::test]
    async fn test_second_call_rejected_while_permit_held() {
        let predictor = Arc::new(ScriptedPredictor::ok(complete_response()));
        let orchestrator = PredictionOrchestrator::new(predictor as Arc<dyn Predictor>);
        let session = SessionHandle::new();

        let _held = session.try_begin_prediction().unwrap();
        let err = orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::InFlight));
    }

    #[tokio::test]
    async fn test_permit_released_after_completion() {
        let predictor = Arc::new(ScriptedPredictor::ok(complete_response()));
        let orchestrator = PredictionOrchestrator::new(predictor as Arc<dyn Predictor>);
        let session = SessionHandle::new();

        orchestrator
            .predict(&session, params("30", "45", "700"))
            .await
            .unwrap();
        // And again — last-write-wins.
        orchestrator
            .predict(&session, params("0", "0", "500"))
            .await
            .unwrap();
        assert!(!session.prediction_in_flight());
    }

    #[test]
    fn test_missing_predictions_object_is_schema_error() {
        let err = extract_prediction(&serde_json::json!({"status": "ok"})).unwrap_err();
        assert!(matches!(err, PredictError::Schema { missing: "predictions" }));
    }
}
