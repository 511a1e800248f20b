use rigit_core::{EntityKind, Rental};
use rigit_infra::Endpoint;

use crate::topics::Topic;
use crate::view::{EntityView, ViewSpec};

/// The customer's own rentals. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rentals;

impl ViewSpec for Rentals {
    type Item = Rental;

    const KIND: EntityKind = EntityKind::Rental;

    fn list_endpoint(&self) -> Endpoint {
        Endpoint::rentals()
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[Topic::ContractApproved, Topic::RefreshAll, Topic::GlobalRefresh]
    }
}

pub type RentalsView = EntityView<Rentals>;
