use axum::body::Bytes;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::{
    error::AppError::{self, MalformedPayload},
    models::PredictionRequest,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictPayload {
    company: Option<String>,
    model: Option<String>,
    year: Option<Value>,
    fuel_type: Option<String>,
    kilometers: Option<Value>,
}

pub fn get_request_from_body(body: Bytes) -> Result<PredictionRequest, AppError> {
    let payload: PredictPayload =
        serde_json::from_slice(&body).map_err(|_| MalformedPayload("invalid JSON body".into()))?;

    let year = i32::try_from(integer_field("year", payload.year)?)
        .map_err(|_| MalformedPayload("year is out of range".into()))?;

    let kilometers = integer_field("kilometers", payload.kilometers)?;
    let kilometers = u64::try_from(kilometers).map_err(|_| {
        if kilometers < 0 {
            MalformedPayload("kilometers must not be negative".into())
        } else {
            MalformedPayload("kilometers is out of range".into())
        }
    })?;

    Ok(PredictionRequest {
        company: text_field("company", payload.company)?,
        model: text_field("model", payload.model)?,
        year,
        fuel_type: text_field("fuelType", payload.fuel_type)?,
        kilometers,
    })
}

fn text_field(name: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(MalformedPayload(format!("{name} is required"))),
    }
}

// The form posts raw input values, so "2015", 2015 and 2015.0 are all accepted.
// Widened to i128 so both the i32 and the u64 targets range check in one place.
fn integer_field(name: &str, value: Option<Value>) -> Result<i128, AppError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(MalformedPayload(format!("{name} is required"))),
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err(MalformedPayload(format!("{name} is required")));
        }
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(Value::Number(number)) => number_as_integer(&number),
        Some(_) => None,
    };

    parsed.ok_or_else(|| MalformedPayload(format!("{name} must be an integer")))
}

fn number_as_integer(number: &Number) -> Option<i128> {
    if let Some(n) = number.as_i64() {
        return Some(n.into());
    }

    if let Some(n) = number.as_u64() {
        return Some(n.into());
    }

    // bounds exclusive at the top: 2^64 is exact as f64 and already out of u64 range
    let float = number.as_f64()?;
    (float.fract() == 0.0 && float >= -(2f64.powi(63)) && float < 2f64.powi(64))
        .then_some(float as i128)
}
