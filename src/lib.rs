//! PyroSight: sludge-coal co-pyrolysis product prediction service.
//!
//! Collects three process parameters (sludge blend ratio, carbon content,
//! pyrolysis temperature), validates them, forwards them to a pretrained
//! prediction model, and renders seven yield/composition metrics back to
//! the engineer.
//!
//! ## Architecture
//!
//! - **validation**: parse and range-check the raw textual inputs
//! - **orchestrator**: one collaborator call per action, seven-key schema
//!   check, store write on success only
//! - **session**: per-session single-slot result store, isolated by id
//! - **format**: pure projection into the fixed display schema
//! - **predictor**: the external-model seam (HTTP client or offline
//!   surrogate)
//! - **api**: axum HTTP surface plus the embedded form page

pub mod api;
pub mod config;
pub mod format;
pub mod orchestrator;
pub mod predictor;
pub mod session;
pub mod types;
pub mod validation;

// Re-export the core types
pub use types::{
    ParameterField, ParameterSet, PredictionResult, RawParameters, StoredResult, METRIC_KEYS,
    METRIC_LABELS,
};

// Re-export the core operations
pub use format::{format_result, DisplayMetric, FormattedResult, NO_RESULT_PLACEHOLDER};
pub use orchestrator::{PredictError, PredictionOrchestrator};
pub use predictor::{HttpPredictor, Predictor, PredictorError, SurrogateModel};
pub use session::{SessionHandle, SessionManager, SessionResultStore};
pub use validation::{validate, ValidationError};
