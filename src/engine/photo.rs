use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::Verdict;
use crate::engine::{Plan, Transition, VerificationEngine, ensure_pending};
use crate::error::AppError;
use crate::models::delivery::DeliveryRecord;

#[derive(Debug, Clone)]
pub enum PhotoOutcome {
    Delivered {
        record: DeliveryRecord,
        reason: String,
    },
    Rejected { reason: String },
}

fn ensure_photo_allowed(record: &DeliveryRecord) -> Result<(), AppError> {
    ensure_pending(record, "verify by photo")?;
    if !record.photo_delivery_approved {
        return Err(AppError::PreconditionFailed(format!(
            "customer has not approved photo delivery for {}",
            record.id
        )));
    }
    Ok(())
}

impl VerificationEngine {
    pub async fn request_photo(&self, id: Uuid) -> Result<DeliveryRecord, AppError> {
        let committed = self
            .transition(id, "request_photo", |record| {
                ensure_pending(record, "request photo delivery")?;
                if record.photo_delivery_requested || record.photo_delivery_approved {
                    return Ok(Plan::Noop);
                }
                Ok(Plan::Apply(Transition::RequestPhoto))
            })
            .await?;

        if committed.applied.is_some() {
            info!(delivery_id = %id, "photo delivery requested");
        }
        Ok(committed.record)
    }

    pub async fn approve_photo(&self, id: Uuid) -> Result<DeliveryRecord, AppError> {
        let committed = self
            .transition(id, "approve_photo", |record| {
                ensure_pending(record, "approve photo delivery")?;
                if record.photo_delivery_approved {
                    return Ok(Plan::Noop);
                }
                Ok(Plan::Apply(Transition::ApprovePhoto))
            })
            .await?;

        if committed.applied.is_some() {
            info!(delivery_id = %id, "photo delivery approved");
        }
        Ok(committed.record)
    }

    /// Customer withdraws approval. The courier's request flag is left as is.
    pub async fn cancel_photo(&self, id: Uuid) -> Result<DeliveryRecord, AppError> {
        let committed = self
            .transition(id, "cancel_photo", |record| {
                ensure_pending(record, "cancel photo delivery")?;
                if !record.photo_delivery_approved {
                    return Ok(Plan::Noop);
                }
                Ok(Plan::Apply(Transition::RevokePhotoApproval))
            })
            .await?;

        if committed.applied.is_some() {
            info!(delivery_id = %id, "photo delivery approval revoked");
        }
        Ok(committed.record)
    }

    pub async fn verify_by_photo(&self, id: Uuid, image: &[u8]) -> Result<PhotoOutcome, AppError> {
        let result = self.try_verify_by_photo(id, image).await;

        let outcome = match &result {
            Ok(PhotoOutcome::Delivered { .. }) => "delivered",
            Ok(PhotoOutcome::Rejected { .. }) => "rejected",
            Err(err) => err.kind(),
        };
        self.metrics
            .photo_verifications_total
            .with_label_values(&[outcome])
            .inc();

        result
    }

    async fn try_verify_by_photo(
        &self,
        id: Uuid,
        image: &[u8],
    ) -> Result<PhotoOutcome, AppError> {
        if image.is_empty() {
            return Err(AppError::BadRequest("photo is empty".to_string()));
        }

        // Checked up front so a doomed request never reaches the classifier;
        // checked again in the guard in case approval is revoked meanwhile.
        ensure_photo_allowed(&self.get(id).await?)?;

        let start = Instant::now();
        let verdict = self.classifier.classify(image).await;
        self.metrics
            .classifier_latency_seconds
            .with_label_values(&[verdict.outcome_label()])
            .observe(start.elapsed().as_secs_f64());

        let reason = match verdict {
            Verdict::Unavailable { reason } => {
                warn!(delivery_id = %id, %reason, "photo classifier unavailable");
                return Err(AppError::ClassifierUnavailable(reason));
            }
            Verdict::Rejected { reason } => {
                info!(delivery_id = %id, %reason, "delivery photo rejected");
                return Ok(PhotoOutcome::Rejected { reason });
            }
            Verdict::Accepted { reason } => reason,
        };

        let committed = self
            .transition(id, "verify_by_photo", |record| {
                ensure_photo_allowed(record)?;
                Ok(Plan::Apply(Transition::PhotoDelivery))
            })
            .await?;

        self.metrics
            .deliveries_completed_total
            .with_label_values(&["photo"])
            .inc();
        info!(delivery_id = %id, "delivery completed by photo verification");

        Ok(PhotoOutcome::Delivered {
            record: committed.record,
            reason,
        })
    }
}
