use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bank::BankError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::gateway::GatewayError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Car data not available")]
    DataUnavailable(#[from] BankError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Error predicting price")]
    PredictionFailed(#[from] GatewayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::DataUnavailable(source) => {
                error!("Car data is empty or not loaded: {source}")
            }
            AppError::MalformedPayload(reason) => error!("Rejected prediction payload: {reason}"),
            AppError::PredictionFailed(source) => error!("Prediction failed: {source}"),
        }

        // Flat body, every cause shares the status.
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
