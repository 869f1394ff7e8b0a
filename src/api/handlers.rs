//! API route handlers.
//!
//! The thin HTTP shell over the core: extract the session, run the
//! validate -> orchestrate -> format sequence, and map each classified
//! failure to its envelope code. No prediction logic lives here.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::format::format_result;
use crate::orchestrator::{PredictError, PredictionOrchestrator};
use crate::session::SessionManager;
use crate::types::RawParameters;
use crate::validation;

/// Header carrying the session id minted by `POST /api/v1/session`.
pub const SESSION_HEADER: &str = "x-session-id";

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<SessionManager>,
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub started_at: Instant,
}

impl ApiState {
    #[must_use]
    pub fn new(sessions: Arc<SessionManager>, orchestrator: Arc<PredictionOrchestrator>) -> Self {
        Self {
            sessions,
            orchestrator,
            started_at: Instant::now(),
        }
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

// ============================================================================
// Session
// ============================================================================

/// POST /api/v1/session - mint a fresh session with an empty result slot.
pub async fn create_session(State(state): State<ApiState>) -> Response {
    let id = state.sessions.create().await;
    tracing::debug!(session = %id, "session created");
    ApiResponse::ok(json!({ "session_id": id }))
}

// ============================================================================
// Predict
// ============================================================================

/// POST /api/v1/predict - validate the three raw values, run one
/// prediction, and return the formatted result.
///
/// Failure mapping: validation -> 422, second in-flight attempt -> 409,
/// collaborator failure or contract violation -> 502. On every failure the
/// session's previous result (if any) stays in place.
pub async fn predict(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(raw): Json<RawParameters>,
) -> Response {
    let Some(id) = session_id(&headers) else {
        return ApiErrorResponse::bad_request(format!("missing {SESSION_HEADER} header"));
    };

    let params = match validation::validate(&raw) {
        Ok(params) => params,
        Err(e) => return ApiErrorResponse::validation_failed(e.to_string()),
    };

    let session = state.sessions.get_or_create(&id).await;
    match state.orchestrator.predict(&session, params).await {
        Ok(stored) => ApiResponse::ok(format_result(Some(&stored))),
        Err(PredictError::InFlight) => {
            ApiErrorResponse::prediction_in_flight(PredictError::InFlight.to_string())
        }
        Err(e @ PredictError::Prediction(_)) => ApiErrorResponse::prediction_failed(e.to_string()),
        Err(e @ PredictError::Schema { .. }) => {
            ApiErrorResponse::model_contract_violation(e.to_string())
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// GET /api/v1/result - the formatted view of the session's slot, or the
/// "no result yet" placeholder when it is empty.
pub async fn get_result(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return ApiErrorResponse::bad_request(format!("missing {SESSION_HEADER} header"));
    };
    let session = state.sessions.get_or_create(&id).await;
    let stored = session.store.get().await;
    ApiResponse::ok(format_result(stored.as_ref()))
}

/// POST /api/v1/reset - clear the session's result slot.
pub async fn reset(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return ApiErrorResponse::bad_request(format!("missing {SESSION_HEADER} header"));
    };
    let session = state.sessions.get_or_create(&id).await;
    session.store.clear().await;
    ApiResponse::ok(json!({ "cleared": true }))
}

// ============================================================================
// Status
// ============================================================================

/// Service status for operators.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    /// Which collaborator produces predictions ("surrogate" or "http").
    pub model_mode: &'static str,
    pub active_sessions: usize,
}

/// GET /api/v1/status
pub async fn status(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(StatusResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        model_mode: state.orchestrator.model_mode(),
        active_sessions: state.sessions.count().await,
    })
}

/// GET /health - legacy liveness probe, no envelope.
pub async fn legacy_health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
