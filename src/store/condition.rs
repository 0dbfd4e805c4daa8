use chrono::Utc;

use crate::models::delivery::{DeliveryRecord, DeliveryStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
    status: Option<DeliveryStatus>,
    courier_verified: Option<bool>,
    customer_verified: Option<bool>,
    photo_approved: Option<bool>,
}

impl Guard {
    pub fn pending() -> Self {
        Self {
            status: Some(DeliveryStatus::Pending),
            ..Self::default()
        }
    }

    pub fn courier_verified(mut self, value: bool) -> Self {
        self.courier_verified = Some(value);
        self
    }

    pub fn customer_verified(mut self, value: bool) -> Self {
        self.customer_verified = Some(value);
        self
    }

    pub fn photo_approved(mut self, value: bool) -> Self {
        self.photo_approved = Some(value);
        self
    }

    pub fn holds(&self, record: &DeliveryRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self
                .courier_verified
                .is_none_or(|v| record.is_courier_verified == v)
            && self
                .customer_verified
                .is_none_or(|v| record.is_customer_verified == v)
            && self
                .photo_approved
                .is_none_or(|v| record.photo_delivery_approved == v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    courier_verified: Option<bool>,
    customer_verified: Option<bool>,
    photo_requested: Option<bool>,
    photo_approved: Option<bool>,
    status: Option<DeliveryStatus>,
}

impl Patch {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn set_courier_verified(mut self) -> Self {
        self.courier_verified = Some(true);
        self
    }

    pub(crate) fn set_customer_verified(mut self) -> Self {
        self.customer_verified = Some(true);
        self
    }

    pub(crate) fn set_photo_requested(mut self) -> Self {
        self.photo_requested = Some(true);
        self
    }

    pub(crate) fn set_photo_approved(mut self, value: bool) -> Self {
        self.photo_approved = Some(value);
        self
    }

    pub(crate) fn set_delivered(mut self) -> Self {
        self.status = Some(DeliveryStatus::Delivered);
        self
    }

    pub fn marks_delivered(&self) -> bool {
        self.status == Some(DeliveryStatus::Delivered)
    }

    pub fn apply(&self, record: &mut DeliveryRecord) {
        if let Some(v) = self.courier_verified {
            record.is_courier_verified = v;
        }
        if let Some(v) = self.customer_verified {
            record.is_customer_verified = v;
        }
        if let Some(v) = self.photo_requested {
            record.photo_delivery_requested = v;
        }
        if let Some(v) = self.photo_approved {
            record.photo_delivery_approved = v;
        }
        if let Some(s) = self.status {
            record.status = s;
        }
        record.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::{Guard, Patch};
    use crate::models::code::HandoverCode;
    use crate::models::delivery::{DeliveryRecord, DeliveryStatus, GeoPoint};

    fn record() -> DeliveryRecord {
        DeliveryRecord::new(
            "Mehmet".to_string(),
            "Buyukdere Cad. 100".to_string(),
            GeoPoint { lat: 41.07, lng: 29.01 },
            HandoverCode::parse("111111").unwrap(),
            HandoverCode::parse("222222").unwrap(),
        )
    }

    #[test]
    fn empty_guard_matches_everything() {
        let mut r = record();
        assert!(Guard::default().holds(&r));
        r.status = DeliveryStatus::Delivered;
        assert!(Guard::default().holds(&r));
    }

    #[test]
    fn guard_checks_every_set_field() {
        let mut r = record();
        let guard = Guard::pending().courier_verified(true);
        assert!(!guard.holds(&r));

        r.is_courier_verified = true;
        assert!(guard.holds(&r));

        r.status = DeliveryStatus::Delivered;
        assert!(!guard.holds(&r));
    }

    #[test]
    fn patch_touches_only_named_fields() {
        let mut r = record();
        r.photo_delivery_requested = true;
        let before = r.updated_at;

        Patch::empty().set_photo_approved(false).apply(&mut r);

        assert!(r.photo_delivery_requested);
        assert!(!r.photo_delivery_approved);
        assert!(!r.is_courier_verified);
        assert_eq!(r.status, DeliveryStatus::Pending);
        assert!(r.updated_at >= before);
    }
}
