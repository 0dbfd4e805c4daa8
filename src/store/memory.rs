use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::delivery::DeliveryRecord;
use crate::store::{BatchAck, BatchPrecondition, DeliveryStore, Guard, Patch, StoreError};

pub struct InMemoryStore {
    records: DashMap<Uuid, DeliveryRecord>,
    // Serializes batch inserts so an emptiness check can't interleave with
    // another batch. Never held across an await.
    batch_lock: Mutex<()>,
    changes_tx: broadcast::Sender<DeliveryRecord>,
}

impl InMemoryStore {
    pub fn new(event_buffer_size: usize) -> Self {
        let (changes_tx, _unused_rx) = broadcast::channel(event_buffer_size.max(1));
        Self {
            records: DashMap::new(),
            batch_lock: Mutex::new(()),
            changes_tx,
        }
    }

    fn publish(&self, record: DeliveryRecord) {
        let _ = self.changes_tx.send(record);
    }
}

#[async_trait]
impl DeliveryStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<DeliveryRecord>, StoreError> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn conditional_update(
        &self,
        id: Uuid,
        guard: &Guard,
        patch: &Patch,
    ) -> Result<DeliveryRecord, StoreError> {
        let mut entry = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !guard.holds(entry.value()) {
            debug!(delivery_id = %id, "conditional update rejected by guard");
            return Err(StoreError::ConditionFailed(id));
        }
        patch.apply(entry.value_mut());

        // Published before the entry lock drops so subscribers see commits
        // in the order they were made.
        let updated = entry.value().clone();
        self.publish(updated.clone());
        Ok(updated)
    }

    async fn batch_insert(
        &self,
        records: Vec<DeliveryRecord>,
        precondition: BatchPrecondition,
    ) -> Result<BatchAck, StoreError> {
        if let Some(bad) = records.iter().find(|record| !record.is_consistent()) {
            return Err(StoreError::InvalidRecord(bad.id));
        }

        let _batch = self
            .batch_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("batch lock poisoned".to_string()))?;

        if precondition == BatchPrecondition::StoreEmpty && !self.records.is_empty() {
            return Ok(BatchAck::Skipped);
        }

        let inserted = records.len();
        for record in records {
            let entry = self.records.entry(record.id).insert(record);
            self.publish(entry.value().clone());
        }

        Ok(BatchAck::Inserted(inserted))
    }

    fn subscribe(&self) -> broadcast::Receiver<DeliveryRecord> {
        self.changes_tx.subscribe()
    }
}

#[cfg(test)]
impl InMemoryStore {
    pub(crate) fn subscriber_count(&self) -> usize {
        self.changes_tx.receiver_count()
    }
}
