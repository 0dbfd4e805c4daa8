pub mod condition;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::delivery::DeliveryRecord;

pub use condition::{Guard, Patch};
pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("delivery {0} not found")]
    NotFound(Uuid),

    #[error("delivery {0} changed concurrently; update condition no longer holds")]
    ConditionFailed(Uuid),

    #[error("delivery {0} is marked delivered without both parties verified")]
    InvalidRecord(Uuid),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPrecondition {
    None,
    StoreEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAck {
    Inserted(usize),
    Skipped,
}

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<DeliveryRecord>, StoreError>;

    async fn list_all(&self) -> Result<Vec<DeliveryRecord>, StoreError>;

    async fn conditional_update(
        &self,
        id: Uuid,
        guard: &Guard,
        patch: &Patch,
    ) -> Result<DeliveryRecord, StoreError>;

    async fn batch_insert(
        &self,
        records: Vec<DeliveryRecord>,
        precondition: BatchPrecondition,
    ) -> Result<BatchAck, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<DeliveryRecord>;
}
