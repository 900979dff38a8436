use std::sync::Arc;

use bank::DatasetIndex;
use tracing::info;

use super::{
    config::{Config, StoreKind},
    database::{MemoryStore, PredictionStore, RedisStore},
    gateway::PredictionClient,
};

pub struct AppState {
    pub config: Config,
    pub dataset: Arc<DatasetIndex>,
    pub gateway: PredictionClient,
    pub store: Arc<dyn PredictionStore>,
}

impl AppState {
    /// Kicks off the dataset load in the background, requests arriving before it finishes get `NotLoaded`.
    pub async fn new(config: Config) -> Arc<Self> {
        let dataset = Arc::new(DatasetIndex::new());

        let loader = dataset.clone();
        let csv_path = config.csv_path.clone();
        tokio::spawn(async move {
            // failure already logged by the loader, index stays uninitialized
            let _ = loader.load(csv_path).await;
        });

        let store: Arc<dyn PredictionStore> = match config.store {
            StoreKind::Redis => {
                Arc::new(RedisStore::connect(&config.redis_url, &config.predictions_key).await)
            }
            StoreKind::Memory => {
                info!("Using in-memory prediction store");
                Arc::new(MemoryStore::new())
            }
        };

        let gateway = PredictionClient::new(&config.model_url);
        info!("Forwarding predictions to {}", gateway.endpoint());

        Arc::new(Self {
            config,
            dataset,
            gateway,
            store,
        })
    }
}
