use serde::{Deserialize, Serialize};

pub mod entities;
pub mod filter;
pub mod status;
pub mod validate;

pub use entities::*;
pub use filter::{apply_filter, matches_query, Record};
pub use status::{
    format_status_label, status_variant, ApprovalStatus, ContractStatus, Emphasis,
    EnquiryStatus, InvoiceStatus, LeadStatus, QuotationStatus, RentalStatus, SalesOrderStatus,
    StatusAxis, StatusBadge,
};
pub use validate::{RequiredFields, ValidationError};

/// Kinds of record the client lists and acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lead,
    Enquiry,
    Quotation,
    SalesOrder,
    Contract,
    Rental,
    Invoice,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Enquiry => "enquiry",
            EntityKind::Quotation => "quotation",
            EntityKind::SalesOrder => "sales_order",
            EntityKind::Contract => "contract",
            EntityKind::Rental => "rental",
            EntityKind::Invoice => "invoice",
        }
    }

    /// Status axes rendered for a row of this kind, in column order.
    pub fn axes(self) -> &'static [StatusAxis] {
        match self {
            EntityKind::Lead => &[StatusAxis::Lead],
            EntityKind::Enquiry => &[StatusAxis::Enquiry],
            EntityKind::Quotation => &[StatusAxis::Quotation],
            EntityKind::SalesOrder => &[StatusAxis::SalesOrder],
            EntityKind::Contract => &[StatusAxis::ContractApproval, StatusAxis::ContractLifecycle],
            EntityKind::Rental => &[StatusAxis::Rental],
            EntityKind::Invoice => &[StatusAxis::Invoice],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
