//! # Redis
//!
//! Append-only log of completed predictions.
//!
//! ## Requirements
//!
//! - Write only, nothing in the API reads predictions back
//! - Small documents, one per successful prediction
//! - Server must come up even when Redis is down
//!
//! ## Implementation
//!
//! - Redis list: 1 key (`predictions` by default), `RPUSH` one JSON document per record
//! - Document layout: `company`, `model`, `year`, `fuelType`, `kilometers`, `predictedPrice`, `createdAt`
//! - Connection manager created once at startup, a failed connect is logged and every append
//!   afterwards reports [`StoreError::Unavailable`]
//!
//! ## Commands
//!
//! Inspect stored predictions.
//! ```sh
//! redis-cli LRANGE predictions 0 -1
//! ```
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;
use tracing::{error, info};

use crate::models::PredictionRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Prediction store unavailable")]
    Unavailable,

    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn append(&self, record: &PredictionRecord) -> Result<(), StoreError>;
}

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;

    client.get_connection_manager_with_config(config).await
}

pub struct RedisStore {
    connection: Option<ConnectionManager>,
    key: String,
}

impl RedisStore {
    /// Never fails, a store without a connection rejects writes instead.
    pub async fn connect(redis_url: &str, key: &str) -> Self {
        let connection = match init_redis(redis_url).await {
            Ok(connection) => {
                info!("Connected to Redis successfully");
                Some(connection)
            }
            Err(e) => {
                error!("Redis connection error: {e}");
                None
            }
        };

        Self {
            connection,
            key: key.to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

#[async_trait]
impl PredictionStore for RedisStore {
    async fn append(&self, record: &PredictionRecord) -> Result<(), StoreError> {
        let mut connection = self.connection.clone().ok_or(StoreError::Unavailable)?;
        let document = serde_json::to_string(record)?;

        let () = connection.rpush(&self.key, document).await?;

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<PredictionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PredictionRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    async fn append(&self, record: &PredictionRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());

        Ok(())
    }
}
