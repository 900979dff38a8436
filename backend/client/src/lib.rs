//! # Client
//!
//! Form logic for the price estimator, independent of how it gets rendered.
//!
//! ## States
//!
//! `Idle → LoadingDropdowns → Ready → Submitting → Success | Error → Ready`
//!
//! - Companies, years and fuel types load concurrently, one failure fails all three and disables submission
//! - Picking a company fetches its models, clearing the company (or picking the placeholder) just empties the list
//! - Submitting validates locally first, an incomplete form never reaches the network
//! - Editing any field after a result goes back to `Ready`
//!
//! ## Payloads
//!
//! To server
//! - `{company, model, year, fuelType, kilometers}`
//!
//! From server
//! - `{predictedPrice}` and optionally `{warning}` when the prediction was not saved
//! - `{error}` on failure
use reqwest::StatusCode;
use thiserror::Error;

pub mod api;
pub mod form;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Form is not ready for submission")]
    NotReady,

    #[error("{message} (status {status})")]
    Server { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}
