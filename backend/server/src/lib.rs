//! Documentation of a used car price estimator.
//!
//!
//!
//! # General Infrastructure
//! - Form client talks only to this server
//! - Server answers dropdown lookups from an in-memory CSV dataset
//! - Predictions are proxied to the model service, then appended to Redis
//! - Model service and Redis are reached by internal names when running in containers
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/api/companies` | `["Select Company", ...]`, sorted |
//! | GET | `/api/models/{company}` | models of that company, sorted, `[]` when unknown |
//! | GET | `/api/years` | years, newest first |
//! | GET | `/api/fuel-types` | fuel types, sorted |
//! | POST | `/api/predict` | `{"predictedPrice": n}`, plus `"warning"` when the record was not saved |
//!
//! Every failure is a flat `{"error": "..."}` body with status 500, whether the dataset is not loaded,
//! the prediction payload is malformed or the model service fails. Only the message differs.
//!
//!
//!
//! # Startup Race
//!
//! The CSV load runs in the background and the listener binds right away. Until the load finishes
//! the dropdown endpoints answer 500 instead of empty lists, so the client never caches a partial view.
//! A failed load stays failed until restart.
//!
//!
//!
//! # Configuration
//!
//! Environment variables, `.env` honoured.
//! - `PORT` (8000)
//! - `REDIS_URL` (`redis://127.0.0.1:6379`), `/run/secrets/REDIS_URL` takes precedence
//! - `CSV_FILE_PATH` (`data/car_data.csv`)
//! - `MODEL_URL` (`http://127.0.0.1:5000`)
//! - `PREDICTION_STORE` (`redis` or `memory`)
//! - `PREDICTIONS_KEY` (`predictions`)
//!
//! Logging through `RUST_LOG`.
//! ```sh
//! RUST_LOG=info cargo run -p carprice
//! ```
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{
    companies_handler, fuel_types_handler, models_handler, predict_handler, years_handler,
};
use state::AppState;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/companies", get(companies_handler))
        .route("/api/models/{company}", get(models_handler))
        .route("/api/years", get(years_handler))
        .route("/api/fuel-types", get(fuel_types_handler))
        .route("/api/predict", post(predict_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
