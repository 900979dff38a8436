//! # Prediction Gateway
//!
//! Proxies price predictions to the model service.
//!
//! ## Contract
//! - `POST {MODEL_URL}/predict` with `company`, `car_models`, `year`, `fuel_type`, `kilo_driven`
//! - Response body is a bare JSON number, relayed to the caller untouched (no rounding, formatting is the client's job)
//!
//! ## Failure
//! - Unreachable, rejected and malformed responses are kept apart here so the log says which one happened
//! - Callers only ever see one generic error, see [`crate::error::AppError::PredictionFailed`]
//! - No timeout, no retry
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::{PredictionRequest, UpstreamPayload};

pub const PREDICT_PATH: &str = "/predict";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("prediction service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("prediction service answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("prediction service returned a non-numeric body: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}{PREDICT_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<f64, GatewayError> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(&UpstreamPayload::from(request))
            .send()
            .await
            .map_err(GatewayError::Unreachable)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        let bytes = res.bytes().await.map_err(GatewayError::Unreachable)?;

        serde_json::from_slice(&bytes).map_err(GatewayError::Malformed)
    }
}
