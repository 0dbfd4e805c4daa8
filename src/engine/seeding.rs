use rand::Rng;
use tracing::{debug, info};

use crate::engine::VerificationEngine;
use crate::error::AppError;
use crate::models::code::HandoverCode;
use crate::models::delivery::{DeliveryRecord, GeoPoint};
use crate::store::{BatchAck, BatchPrecondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadySeeded,
}

struct Template {
    customer_name: &'static str,
    address: &'static str,
    coordinate: GeoPoint,
}

const TEMPLATES: [Template; 3] = [
    Template {
        customer_name: "Ahmet Yılmaz",
        address: "Cumhuriyet Mah. Atatürk Cad. No:12 D:4, İstanbul",
        coordinate: GeoPoint {
            lat: 41.0082,
            lng: 28.9784,
        },
    },
    Template {
        customer_name: "Ayşe Demir",
        address: "Kadıköy Rıhtım Cad. No:5, İstanbul",
        coordinate: GeoPoint {
            lat: 40.9901,
            lng: 29.0292,
        },
    },
    Template {
        customer_name: "Mehmet Öz",
        address: "Levent Mah. Büyükdere Cad. No:100, İstanbul",
        coordinate: GeoPoint {
            lat: 41.0772,
            lng: 29.0125,
        },
    },
];

pub fn seed_batch(size: usize) -> Vec<DeliveryRecord> {
    seed_batch_with(&mut rand::thread_rng(), size)
}

pub fn seed_batch_with<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<DeliveryRecord> {
    (0..size)
        .map(|i| {
            let template = &TEMPLATES[i % TEMPLATES.len()];
            let (courier_code, customer_code) = HandoverCode::generate_pair(rng);
            DeliveryRecord::new(
                format!("{} {}", template.customer_name, i + 1),
                template.address.to_string(),
                template.coordinate,
                courier_code,
                customer_code,
            )
        })
        .collect()
}

impl VerificationEngine {
    pub async fn ensure_seeded(&self) -> Result<SeedOutcome, AppError> {
        if !self.store.list_all().await?.is_empty() {
            debug!("store already holds deliveries; skipping seed");
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let batch = seed_batch(self.seed_batch_size);
        match self
            .store
            .batch_insert(batch, BatchPrecondition::StoreEmpty)
            .await?
        {
            BatchAck::Inserted(count) => {
                info!(count, "store seeded with deliveries");
                Ok(SeedOutcome::Seeded(count))
            }
            BatchAck::Skipped => {
                debug!("another caller seeded first");
                Ok(SeedOutcome::AlreadySeeded)
            }
        }
    }
}
