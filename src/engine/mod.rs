pub mod confirmation;
pub mod photo;
pub mod seeding;
pub mod transition;

use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classifier::PhotoClassifier;
use crate::error::AppError;
use crate::models::delivery::{DeliveryRecord, DeliveryStatus};
use crate::observability::metrics::Metrics;
use crate::store::{DeliveryStore, StoreError};

pub use confirmation::Confirmation;
pub use photo::PhotoOutcome;
pub use seeding::SeedOutcome;
pub use transition::Transition;

const MAX_CONFLICT_RETRIES: u32 = 1;

pub type RecordStream = Pin<Box<dyn Stream<Item = DeliveryRecord> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Delivery(Uuid),
    Status(DeliveryStatus),
}

impl RecordFilter {
    pub fn matches(&self, record: &DeliveryRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Delivery(id) => record.id == *id,
            RecordFilter::Status(status) => record.status == *status,
        }
    }
}

pub(crate) enum Plan {
    Noop,
    Apply(Transition),
}

pub(crate) struct Committed {
    pub record: DeliveryRecord,
    pub applied: Option<Transition>,
}

impl Committed {
    pub fn fired_delivery(&self) -> bool {
        self.applied
            .is_some_and(|transition| transition.patch().marks_delivered())
    }
}

pub struct VerificationEngine {
    store: Arc<dyn DeliveryStore>,
    classifier: Arc<dyn PhotoClassifier>,
    metrics: Metrics,
    seed_batch_size: usize,
}

impl VerificationEngine {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        classifier: Arc<dyn PhotoClassifier>,
        metrics: Metrics,
        seed_batch_size: usize,
    ) -> Self {
        Self {
            store,
            classifier,
            metrics,
            seed_batch_size,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<DeliveryRecord, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<DeliveryRecord>, AppError> {
        let mut records = self.store.list_all().await?;
        records.sort_by(|a, b| {
            a.customer_name
                .cmp(&b.customer_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    pub fn watch(&self, filter: RecordFilter) -> RecordStream {
        let rx = self.store.subscribe();
        let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
            Ok(record) if filter.matches(&record) => Some(record),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "record watcher lagged behind; changes dropped");
                None
            }
        });

        Box::pin(stream)
    }

    async fn transition<F>(
        &self,
        id: Uuid,
        operation: &'static str,
        mut plan: F,
    ) -> Result<Committed, AppError>
    where
        F: FnMut(&DeliveryRecord) -> Result<Plan, AppError>,
    {
        let mut conflicts = 0;

        loop {
            let record = self.get(id).await?;
            let transition = match plan(&record)? {
                Plan::Noop => {
                    return Ok(Committed {
                        record,
                        applied: None,
                    });
                }
                Plan::Apply(transition) => transition,
            };

            match self
                .store
                .conditional_update(id, &transition.guard(), &transition.patch())
                .await
            {
                Ok(updated) => {
                    return Ok(Committed {
                        record: updated,
                        applied: Some(transition),
                    });
                }
                Err(StoreError::ConditionFailed(_)) if conflicts < MAX_CONFLICT_RETRIES => {
                    conflicts += 1;
                    self.metrics
                        .store_conflicts_total
                        .with_label_values(&[operation, "retried"])
                        .inc();
                    debug!(delivery_id = %id, operation, "concurrent write; replanning from fresh read");
                }
                Err(err @ StoreError::ConditionFailed(_)) => {
                    self.metrics
                        .store_conflicts_total
                        .with_label_values(&[operation, "surfaced"])
                        .inc();
                    warn!(delivery_id = %id, operation, "conflict persisted after retry");
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

pub(crate) fn ensure_pending(record: &DeliveryRecord, action: &str) -> Result<(), AppError> {
    if record.is_delivered() {
        return Err(AppError::PreconditionFailed(format!(
            "cannot {action}: delivery {} is already delivered",
            record.id
        )));
    }
    Ok(())
}
