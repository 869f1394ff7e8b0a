//! HTTP client for a remote model server.
//!
//! Sends the ordered parameter triple as JSON and returns the server's
//! response body verbatim. No timeout is applied unless one is configured —
//! an unbounded model call blocks the session's single in-flight slot, and
//! that trade-off is left to the operator rather than guessed here.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{Predictor, PredictorError};
use crate::types::ParameterSet;

/// Predictor backed by a model inference server.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictor {
    /// Build a client for `endpoint` (e.g. `http://model-server:9000`).
    ///
    /// `request_timeout` of `None` means the call may block indefinitely.
    pub fn new(endpoint: &str, request_timeout: Option<Duration>) -> Result<Self, PredictorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, params: &ParameterSet) -> Result<serde_json::Value, PredictorError> {
        let [ratio, carbon, temperature] = params.request_values();
        // The model server expects the original text in this exact order.
        let body = json!({
            "parameters": [ratio, carbon, temperature],
        });

        let resp = self
            .client
            .post(format!("{}/predict", self.endpoint))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(PredictorError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| PredictorError::MalformedResponse(e.to_string()))
    }

    fn describe(&self) -> &'static str {
        "http"
    }
}
