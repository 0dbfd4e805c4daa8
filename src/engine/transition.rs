use crate::models::delivery::Party;
use crate::store::{Guard, Patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `party` proved possession of the counterparty's code. When the
    /// counterparty was already verified this also completes the delivery;
    /// the guard pins that flag so the decision holds at commit time.
    Confirm {
        party: Party,
        counterparty_verified: bool,
    },
    RequestPhoto,
    ApprovePhoto,
    RevokePhotoApproval,
    PhotoDelivery,
}

impl Transition {
    pub fn guard(&self) -> Guard {
        match *self {
            Transition::Confirm {
                party,
                counterparty_verified,
            } => match party.counterparty() {
                Party::Courier => Guard::pending().courier_verified(counterparty_verified),
                Party::Customer => Guard::pending().customer_verified(counterparty_verified),
            },
            Transition::RequestPhoto
            | Transition::ApprovePhoto
            | Transition::RevokePhotoApproval => Guard::pending(),
            Transition::PhotoDelivery => Guard::pending().photo_approved(true),
        }
    }

    pub fn patch(&self) -> Patch {
        match *self {
            Transition::Confirm {
                party,
                counterparty_verified,
            } => {
                let patch = match party {
                    Party::Courier => Patch::empty().set_courier_verified(),
                    Party::Customer => Patch::empty().set_customer_verified(),
                };
                if counterparty_verified {
                    patch.set_delivered()
                } else {
                    patch
                }
            }
            Transition::RequestPhoto => Patch::empty().set_photo_requested(),
            Transition::ApprovePhoto => Patch::empty().set_photo_approved(true),
            Transition::RevokePhotoApproval => Patch::empty().set_photo_approved(false),
            Transition::PhotoDelivery => Patch::empty()
                .set_courier_verified()
                .set_customer_verified()
                .set_delivered(),
        }
    }
}
