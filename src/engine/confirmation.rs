use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{Plan, Transition, VerificationEngine};
use crate::error::AppError;
use crate::models::delivery::Party;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confirmation {
    Rejected,
    AwaitingCounterparty,
    Delivered,
}

impl Confirmation {
    pub fn accepted(self) -> bool {
        !matches!(self, Confirmation::Rejected)
    }

    fn label(self) -> &'static str {
        match self {
            Confirmation::Rejected => "rejected",
            Confirmation::AwaitingCounterparty => "awaiting_counterparty",
            Confirmation::Delivered => "delivered",
        }
    }
}

impl VerificationEngine {
    pub async fn confirm_by_customer(
        &self,
        id: Uuid,
        entered_code: &str,
    ) -> Result<Confirmation, AppError> {
        self.confirm(Party::Customer, id, entered_code).await
    }

    pub async fn confirm_by_courier(
        &self,
        id: Uuid,
        entered_code: &str,
    ) -> Result<Confirmation, AppError> {
        self.confirm(Party::Courier, id, entered_code).await
    }

    async fn confirm(
        &self,
        party: Party,
        id: Uuid,
        entered_code: &str,
    ) -> Result<Confirmation, AppError> {
        let result = self.try_confirm(party, id, entered_code).await;

        let outcome = match &result {
            Ok(confirmation) => confirmation.label(),
            Err(err) => err.kind(),
        };
        self.metrics
            .confirmations_total
            .with_label_values(&[party.as_str(), outcome])
            .inc();

        result
    }

    async fn try_confirm(
        &self,
        party: Party,
        id: Uuid,
        entered_code: &str,
    ) -> Result<Confirmation, AppError> {
        let Some(record) = self.store.get(id).await? else {
            warn!(delivery_id = %id, %party, "confirmation for unknown delivery");
            return Ok(Confirmation::Rejected);
        };

        if !record.code_entered_by(party).matches(entered_code) {
            info!(delivery_id = %id, %party, "confirmation code mismatch");
            return Ok(Confirmation::Rejected);
        }

        let committed = self
            .transition(id, "confirm", |current| {
                if current.is_delivered() {
                    return Ok(Plan::Noop);
                }
                let counterparty_verified = current.is_verified_by(party.counterparty());
                // Already verified and still waiting: nothing to write. If both
                // flags are set but the status never flipped, fall through and
                // complete it.
                if current.is_verified_by(party) && !counterparty_verified {
                    return Ok(Plan::Noop);
                }
                Ok(Plan::Apply(Transition::Confirm {
                    party,
                    counterparty_verified,
                }))
            })
            .await?;

        if committed.fired_delivery() {
            self.metrics
                .deliveries_completed_total
                .with_label_values(&["code"])
                .inc();
            info!(delivery_id = %id, %party, "delivery completed by code handshake");
        } else if committed.applied.is_some() {
            info!(delivery_id = %id, %party, "party verified; awaiting counterparty");
        }

        Ok(if committed.record.is_delivered() {
            Confirmation::Delivered
        } else {
            Confirmation::AwaitingCounterparty
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Confirmation;
    use crate::engine::test_support::{accepting, engine_with, record};
    use crate::models::delivery::DeliveryStatus;
    use crate::store::{DeliveryStore, Guard, Patch};

    #[tokio::test]
    async fn courier_then_customer_delivers() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, _store) = engine_with(vec![r], accepting()).await;

        let first = engine.confirm_by_courier(id, "017744").await.unwrap();
        assert_eq!(first, Confirmation::AwaitingCounterparty);
        let after_first = engine.get(id).await.unwrap();
        assert!(after_first.is_courier_verified);
        assert_eq!(after_first.status, DeliveryStatus::Pending);

        let second = engine.confirm_by_customer(id, "482913").await.unwrap();
        assert_eq!(second, Confirmation::Delivered);
        let after_second = engine.get(id).await.unwrap();
        assert!(after_second.is_customer_verified);
        assert_eq!(after_second.status, DeliveryStatus::Delivered);

        let late = engine.confirm_by_customer(id, "000000").await.unwrap();
        assert_eq!(late, Confirmation::Rejected);
        assert!(!late.accepted());
        let after_late = engine.get(id).await.unwrap();
        assert_eq!(after_late.updated_at, after_second.updated_at);
    }

    #[tokio::test]
    async fn own_code_is_not_accepted() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, _store) = engine_with(vec![r], accepting()).await;

        // The customer holds 017744 but must enter the courier's 482913.
        let outcome = engine.confirm_by_customer(id, "017744").await.unwrap();
        assert_eq!(outcome, Confirmation::Rejected);
        let outcome = engine.confirm_by_courier(id, "482913").await.unwrap();
        assert_eq!(outcome, Confirmation::Rejected);

        let stored = engine.get(id).await.unwrap();
        assert!(!stored.is_courier_verified);
        assert!(!stored.is_customer_verified);
    }

    #[tokio::test]
    async fn leading_zeros_matter() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, _store) = engine_with(vec![r], accepting()).await;

        let outcome = engine.confirm_by_courier(id, "17744").await.unwrap();
        assert_eq!(outcome, Confirmation::Rejected);
    }

    #[tokio::test]
    async fn unknown_delivery_is_rejected_not_error() {
        let (engine, _store) = engine_with(vec![], accepting()).await;
        let outcome = engine
            .confirm_by_courier(uuid::Uuid::new_v4(), "123456")
            .await
            .unwrap();
        assert_eq!(outcome, Confirmation::Rejected);
    }

    #[tokio::test]
    async fn repeated_confirmation_is_idempotent() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, _store) = engine_with(vec![r], accepting()).await;

        engine.confirm_by_courier(id, "017744").await.unwrap();
        let before = engine.get(id).await.unwrap();

        let again = engine.confirm_by_courier(id, "017744").await.unwrap();
        assert_eq!(again, Confirmation::AwaitingCounterparty);
        let after = engine.get(id).await.unwrap();
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn confirming_a_delivered_record_writes_nothing() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, _store) = engine_with(vec![r], accepting()).await;

        engine.confirm_by_courier(id, "017744").await.unwrap();
        engine.confirm_by_customer(id, "482913").await.unwrap();
        let delivered = engine.get(id).await.unwrap();

        let again = engine.confirm_by_courier(id, "017744").await.unwrap();
        assert_eq!(again, Confirmation::Delivered);
        assert_eq!(engine.get(id).await.unwrap().updated_at, delivered.updated_at);
    }

    #[tokio::test]
    async fn stuck_record_is_completed_by_next_confirmation() {
        let r = record("482913", "017744");
        let id = r.id;
        let (engine, store) = engine_with(vec![r], accepting()).await;

        // Both flags set by a foreign writer without firing the status.
        store
            .conditional_update(
                id,
                &Guard::pending(),
                &Patch::empty()
                    .set_courier_verified()
                    .set_customer_verified(),
            )
            .await
            .unwrap();

        let outcome = engine.confirm_by_customer(id, "482913").await.unwrap();
        assert_eq!(outcome, Confirmation::Delivered);
        assert!(engine.get(id).await.unwrap().is_delivered());
    }
}
