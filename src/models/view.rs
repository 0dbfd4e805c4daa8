use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::delivery::{DeliveryRecord, DeliveryStatus, GeoPoint, PhotoStage};

#[derive(Debug, Clone, Serialize)]
pub struct CourierView {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub coordinate: GeoPoint,
    pub courier_code: String,
    pub is_courier_verified: bool,
    pub is_customer_verified: bool,
    pub photo_delivery_requested: bool,
    pub photo_delivery_approved: bool,
    pub photo_stage: PhotoStage,
    pub status: DeliveryStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub customer_code: String,
    pub is_courier_verified: bool,
    pub is_customer_verified: bool,
    pub photo_delivery_requested: bool,
    pub photo_delivery_approved: bool,
    pub photo_stage: PhotoStage,
    pub status: DeliveryStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&DeliveryRecord> for CourierView {
    fn from(record: &DeliveryRecord) -> Self {
        Self {
            id: record.id,
            customer_name: record.customer_name.clone(),
            address: record.address.clone(),
            coordinate: record.coordinate,
            courier_code: record.courier_code.as_str().to_string(),
            is_courier_verified: record.is_courier_verified,
            is_customer_verified: record.is_customer_verified,
            photo_delivery_requested: record.photo_delivery_requested,
            photo_delivery_approved: record.photo_delivery_approved,
            photo_stage: record.photo_stage(),
            status: record.status,
            updated_at: record.updated_at,
        }
    }
}

impl From<&DeliveryRecord> for CustomerView {
    fn from(record: &DeliveryRecord) -> Self {
        Self {
            id: record.id,
            customer_name: record.customer_name.clone(),
            address: record.address.clone(),
            customer_code: record.customer_code.as_str().to_string(),
            is_courier_verified: record.is_courier_verified,
            is_customer_verified: record.is_customer_verified,
            photo_delivery_requested: record.photo_delivery_requested,
            photo_delivery_approved: record.photo_delivery_approved,
            photo_stage: record.photo_stage(),
            status: record.status,
            updated_at: record.updated_at,
        }
    }
}
