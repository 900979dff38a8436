use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use tracing::{error, info};

use crate::{
    database::PredictionStore,
    error::AppError,
    models::{PredictionRecord, PredictionResponse},
    state::AppState,
    utils::get_request_from_body,
};

pub const PERSISTENCE_WARNING: &str = "Prediction succeeded but could not be saved";

pub async fn companies_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.dataset.list_companies()?))
}

pub async fn models_handler(
    State(state): State<Arc<AppState>>,
    Path(company): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.dataset.list_models(&company)?))
}

pub async fn years_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<i32>>, AppError> {
    Ok(Json(state.dataset.list_years()?))
}

pub async fn fuel_types_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.dataset.list_fuel_types()?))
}

pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, AppError> {
    let request = get_request_from_body(body)?;

    let predicted_price = state.gateway.predict(&request).await?;

    #[cfg(feature = "verbose")]
    info!("Predicted {predicted_price} for {request:?}");

    let record = PredictionRecord::new(request, predicted_price);
    let warning = persist(state.store.as_ref(), &record).await;

    Ok(Json(PredictionResponse {
        predicted_price,
        warning,
    }))
}

// A failed write never fails the prediction, the caller gets a warning instead.
async fn persist(store: &dyn PredictionStore, record: &PredictionRecord) -> Option<String> {
    match store.append(record).await {
        Ok(()) => {
            info!(
                company = %record.company,
                model = %record.model,
                "Saved prediction {}",
                record.predicted_price
            );
            None
        }
        Err(e) => {
            error!("Failed to save prediction: {e}");
            Some(PERSISTENCE_WARNING.to_string())
        }
    }
}
