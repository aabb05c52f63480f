use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::pipeline::BatchContext;
use crate::storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub batch: BatchContext,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn BlobStore>) -> Self {
        let batch = BatchContext::from_config(&config, store);
        Self {
            config: Arc::new(config),
            batch,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
