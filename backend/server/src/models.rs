use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub company: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub kilometers: u64,
}

/// Field names the prediction service expects.
#[derive(Serialize)]
pub struct UpstreamPayload<'a> {
    pub company: &'a str,
    pub car_models: &'a str,
    pub year: i32,
    pub fuel_type: &'a str,
    pub kilo_driven: u64,
}

impl<'a> From<&'a PredictionRequest> for UpstreamPayload<'a> {
    fn from(request: &'a PredictionRequest) -> Self {
        Self {
            company: &request.company,
            car_models: &request.model,
            year: request.year,
            fuel_type: &request.fuel_type,
            kilo_driven: request.kilometers,
        }
    }
}

/// One stored document per successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub company: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub kilometers: u64,
    pub predicted_price: f64,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(request: PredictionRequest, predicted_price: f64) -> Self {
        Self {
            company: request.company,
            model: request.model,
            year: request.year,
            fuel_type: request.fuel_type,
            kilometers: request.kilometers,
            predicted_price,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub predicted_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
