use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::code::HandoverCode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Courier,
    Customer,
}

impl Party {
    pub fn counterparty(self) -> Party {
        match self {
            Party::Courier => Party::Customer,
            Party::Customer => Party::Courier,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Party::Courier => "courier",
            Party::Customer => "customer",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhotoStage {
    NotRequested,
    Requested,
    Approved,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub coordinate: GeoPoint,
    pub courier_code: HandoverCode,
    pub customer_code: HandoverCode,
    pub is_courier_verified: bool,
    pub is_customer_verified: bool,
    pub photo_delivery_requested: bool,
    pub photo_delivery_approved: bool,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn new(
        customer_name: String,
        address: String,
        coordinate: GeoPoint,
        courier_code: HandoverCode,
        customer_code: HandoverCode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_name,
            address,
            coordinate,
            courier_code,
            customer_code,
            is_courier_verified: false,
            is_customer_verified: false,
            photo_delivery_requested: false,
            photo_delivery_approved: false,
            status: DeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The secret `party` must type in: each side proves it holds the
    /// other side's code.
    pub fn code_entered_by(&self, party: Party) -> &HandoverCode {
        match party {
            Party::Customer => &self.courier_code,
            Party::Courier => &self.customer_code,
        }
    }

    pub fn is_verified_by(&self, party: Party) -> bool {
        match party {
            Party::Courier => self.is_courier_verified,
            Party::Customer => self.is_customer_verified,
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }

    pub fn is_consistent(&self) -> bool {
        !self.is_delivered() || (self.is_courier_verified && self.is_customer_verified)
    }

    pub fn photo_stage(&self) -> PhotoStage {
        if self.is_delivered() {
            PhotoStage::Delivered
        } else if self.photo_delivery_approved {
            PhotoStage::Approved
        } else if self.photo_delivery_requested {
            PhotoStage::Requested
        } else {
            PhotoStage::NotRequested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliveryRecord, GeoPoint, Party, PhotoStage};
    use crate::models::code::HandoverCode;

    fn record() -> DeliveryRecord {
        DeliveryRecord::new(
            "Test Customer".to_string(),
            "Somewhere 1".to_string(),
            GeoPoint { lat: 41.0, lng: 29.0 },
            HandoverCode::parse("482913").unwrap(),
            HandoverCode::parse("017744").unwrap(),
        )
    }

    #[test]
    fn codes_are_cross_wired() {
        let r = record();
        assert_eq!(r.code_entered_by(Party::Customer).as_str(), "482913");
        assert_eq!(r.code_entered_by(Party::Courier).as_str(), "017744");
    }

    #[test]
    fn photo_stage_follows_flags() {
        let mut r = record();
        assert_eq!(r.photo_stage(), PhotoStage::NotRequested);

        r.photo_delivery_requested = true;
        assert_eq!(r.photo_stage(), PhotoStage::Requested);

        r.photo_delivery_approved = true;
        assert_eq!(r.photo_stage(), PhotoStage::Approved);

        r.photo_delivery_approved = false;
        assert_eq!(r.photo_stage(), PhotoStage::Requested);
    }

    #[test]
    fn proactive_approval_skips_request() {
        let mut r = record();
        r.photo_delivery_approved = true;
        assert_eq!(r.photo_stage(), PhotoStage::Approved);
        assert!(!r.photo_delivery_requested);
    }
}
