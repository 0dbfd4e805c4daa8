use std::sync::Arc;

use crate::classifier::PhotoClassifier;
use crate::engine::VerificationEngine;
use crate::observability::metrics::Metrics;
use crate::store::{DeliveryStore, InMemoryStore};

pub struct AppState {
    pub engine: VerificationEngine,
    pub metrics: Metrics,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        classifier: Arc<dyn PhotoClassifier>,
        seed_batch_size: usize,
        max_upload_bytes: usize,
    ) -> Self {
        let metrics = Metrics::new();
        Self {
            engine: VerificationEngine::new(store, classifier, metrics.clone(), seed_batch_size),
            metrics,
            max_upload_bytes,
        }
    }

    pub fn in_memory(
        event_buffer_size: usize,
        classifier: Arc<dyn PhotoClassifier>,
        seed_batch_size: usize,
        max_upload_bytes: usize,
    ) -> Self {
        Self::new(
            Arc::new(InMemoryStore::new(event_buffer_size)),
            classifier,
            seed_batch_size,
            max_upload_bytes,
        )
    }
}
