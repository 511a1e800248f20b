use rigit_core::{EntityKind, Invoice};
use rigit_infra::Endpoint;

use crate::topics::Topic;
use crate::view::{EntityView, ViewSpec};

/// Finance view of raised invoices. Read-only; new invoices appear when a
/// contract is approved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invoices;

impl ViewSpec for Invoices {
    type Item = Invoice;

    const KIND: EntityKind = EntityKind::Invoice;

    fn list_endpoint(&self) -> Endpoint {
        Endpoint::invoices()
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[Topic::ContractApproved, Topic::RefreshAll, Topic::GlobalRefresh]
    }
}

pub type InvoicesView = EntityView<Invoices>;
