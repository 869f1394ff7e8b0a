//! The prediction collaborator seam.
//!
//! The pretrained co-pyrolysis model is external to this service. This
//! module owns only the boundary: the [`Predictor`] trait the orchestrator
//! calls, an HTTP client for a real model server, and an offline surrogate
//! for development and demos.

mod http;
mod surrogate;

pub use http::HttpPredictor;
pub use surrogate::SurrogateModel;

use async_trait::async_trait;

use crate::types::ParameterSet;

/// Failure modes of the collaborator call itself. Schema violations are
/// not represented here — the orchestrator checks the seven-key contract
/// after a transport-level success.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model server returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("model server returned malformed JSON: {0}")]
    MalformedResponse(String),
}

/// An external prediction model.
///
/// Implementations receive the validated parameter triple and return the
/// model's response as raw JSON; interpreting that JSON against the
/// seven-metric schema is the orchestrator's job, not the predictor's.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Invoke the model once with the ordered (ratio, carbon, temperature)
    /// triple. Runs to completion or failure; no cancellation.
    async fn predict(&self, params: &ParameterSet) -> Result<serde_json::Value, PredictorError>;

    /// Short name for the status endpoint and logs.
    fn describe(&self) -> &'static str;
}
