//! API route definitions.
//!
//! Endpoints for the what-if prediction form:
//! - POST /api/v1/session - mint a session id
//! - POST /api/v1/predict - validate inputs and run one prediction
//! - GET  /api/v1/result  - formatted view of the session's last result
//! - POST /api/v1/reset   - clear the session's result slot
//! - GET  /api/v1/status  - uptime, model mode, session count

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/session", post(handlers::create_session))
        .route("/predict", post(handlers::predict))
        .route("/result", get(handlers::get_result))
        .route("/reset", post(handlers::reset))
        .route("/status", get(handlers::status))
        .with_state(state)
}

/// Legacy health endpoint at root level.
pub fn legacy_routes() -> Router {
    Router::new().route("/health", get(handlers::legacy_health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::PredictionOrchestrator;
    use crate::predictor::{Predictor, SurrogateModel};
    use crate::session::SessionManager;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        let predictor = Arc::new(SurrogateModel::new()) as Arc<dyn Predictor>;
        ApiState::new(
            Arc::new(SessionManager::new()),
            Arc::new(PredictionOrchestrator::new(predictor)),
        )
    }

    #[tokio::test]
    async fn test_status_route() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_route() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_result_requires_session_header() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(Request::builder().uri("/result").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legacy_health_route() {
        let app = legacy_routes();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
