//! Status vocabulary shared by every view.
//!
//! Each entity kind (and each independent axis of a kind) owns its own table.
//! Status strings come straight from the backend and are never validated
//! upstream, so every enum keeps an `Other` branch and unknown values render
//! with [`Emphasis::Neutral`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual severity bucket a status renders with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Neutral,
    Positive,
    Warning,
    Negative,
}

impl Emphasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Emphasis::Neutral => "neutral",
            Emphasis::Positive => "positive",
            Emphasis::Warning => "warning",
            Emphasis::Negative => "negative",
        }
    }
}

impl fmt::Display for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which status table a raw string is looked up in.
///
/// Contracts carry two axes; `"pending"` is a warning on the approval axis and
/// neutral on the lifecycle axis, so callers always name the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAxis {
    Lead,
    Enquiry,
    Quotation,
    SalesOrder,
    ContractApproval,
    ContractLifecycle,
    Rental,
    Invoice,
}

impl StatusAxis {
    pub const ALL: [StatusAxis; 8] = [
        StatusAxis::Lead,
        StatusAxis::Enquiry,
        StatusAxis::Quotation,
        StatusAxis::SalesOrder,
        StatusAxis::ContractApproval,
        StatusAxis::ContractLifecycle,
        StatusAxis::Rental,
        StatusAxis::Invoice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatusAxis::Lead => "lead",
            StatusAxis::Enquiry => "enquiry",
            StatusAxis::Quotation => "quotation",
            StatusAxis::SalesOrder => "sales_order",
            StatusAxis::ContractApproval => "contract_approval",
            StatusAxis::ContractLifecycle => "contract_lifecycle",
            StatusAxis::Rental => "rental",
            StatusAxis::Invoice => "invoice",
        }
    }

    /// Lead statuses arrive in mixed case (`New` from the CRM form, `new` from
    /// older imports); every other axis is a snake_case backend enum.
    fn matches(self, known: &str, raw: &str) -> bool {
        match self {
            StatusAxis::Lead => known.eq_ignore_ascii_case(raw),
            _ => known == raw,
        }
    }

    /// Raw strings this axis knows about, in table order.
    pub fn known_statuses(self) -> &'static [&'static str] {
        match self {
            StatusAxis::Lead => LeadStatus::KNOWN,
            StatusAxis::Enquiry => EnquiryStatus::KNOWN,
            StatusAxis::Quotation => QuotationStatus::KNOWN,
            StatusAxis::SalesOrder => SalesOrderStatus::KNOWN,
            StatusAxis::ContractApproval => ApprovalStatus::KNOWN,
            StatusAxis::ContractLifecycle => ContractStatus::KNOWN,
            StatusAxis::Rental => RentalStatus::KNOWN,
            StatusAxis::Invoice => InvoiceStatus::KNOWN,
        }
    }
}

impl fmt::Display for StatusAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emphasis for a raw backend string on the given axis. Unknown strings map to
/// [`Emphasis::Neutral`].
pub fn status_variant(axis: StatusAxis, raw: &str) -> Emphasis {
    match axis {
        StatusAxis::Lead => LeadStatus::parse(raw).emphasis(),
        StatusAxis::Enquiry => EnquiryStatus::parse(raw).emphasis(),
        StatusAxis::Quotation => QuotationStatus::parse(raw).emphasis(),
        StatusAxis::SalesOrder => SalesOrderStatus::parse(raw).emphasis(),
        StatusAxis::ContractApproval => ApprovalStatus::parse(raw).emphasis(),
        StatusAxis::ContractLifecycle => ContractStatus::parse(raw).emphasis(),
        StatusAxis::Rental => RentalStatus::parse(raw).emphasis(),
        StatusAxis::Invoice => InvoiceStatus::parse(raw).emphasis(),
    }
}

/// `"pending_approval"` -> `"Pending Approval"`.
///
/// Underscores, hyphens and whitespace all separate words; each word is
/// title-cased. Feeding the output back in returns it unchanged.
pub fn format_status_label(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Badge data for one status on one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub axis: StatusAxis,
    pub raw: String,
    pub label: String,
    pub emphasis: Emphasis,
}

impl StatusBadge {
    pub fn new(axis: StatusAxis, raw: &str) -> Self {
        Self {
            axis,
            raw: raw.to_string(),
            label: format_status_label(raw),
            emphasis: status_variant(axis, raw),
        }
    }
}

macro_rules! status_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident on $axis:expr, default $default:ident {
            $($variant:ident => $wire:literal : $emphasis:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub const AXIS: StatusAxis = $axis;
            pub const KNOWN: &'static [&'static str] = &[$($wire),+];

            pub fn parse(raw: &str) -> Self {
                let trimmed = raw.trim();
                $(
                    if Self::AXIS.matches($wire, trimmed) {
                        return Self::$variant;
                    }
                )+
                Self::Other(raw.to_string())
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw,
                }
            }

            pub fn emphasis(&self) -> Emphasis {
                match self {
                    $(Self::$variant => Emphasis::$emphasis,)+
                    Self::Other(raw) => {
                        tracing::debug!(axis = %Self::AXIS, status = %raw, "unmapped status");
                        Emphasis::Neutral
                    }
                }
            }

            pub fn label(&self) -> String {
                format_status_label(self.as_str())
            }

            pub fn badge(&self) -> StatusBadge {
                StatusBadge {
                    axis: Self::AXIS,
                    raw: self.as_str().to_string(),
                    label: self.label(),
                    emphasis: self.emphasis(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match Self::parse(&raw) {
                    Self::Other(_) => Self::Other(raw),
                    known => known,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::parse(raw)
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> String {
                match status {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_vocabulary! {
    /// CRM lead pipeline stage.
    LeadStatus on StatusAxis::Lead, default New {
        New => "New": Neutral,
        Contacted => "Contacted": Neutral,
        Working => "Working": Neutral,
        Qualified => "Qualified": Positive,
        ProposalSent => "Proposal Sent": Warning,
        Negotiation => "Negotiation": Warning,
        Won => "Won": Positive,
        Lost => "Lost": Negative,
        Nurture => "Nurture": Warning,
        Junk => "Junk": Negative,
        Unqualified => "Unqualified": Negative,
    }
}

impl LeadStatus {
    /// Won and Lost close the pipeline; everything else is still being worked.
    pub fn is_open(&self) -> bool {
        !matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

status_vocabulary! {
    /// Enquiry / rental order progress.
    EnquiryStatus on StatusAxis::Enquiry, default SubmittedByCustomer {
        SubmittedByCustomer => "submitted_by_customer": Warning,
        QuotationCreated => "quotation_created": Neutral,
        QuotationSent => "quotation_sent": Neutral,
        Approved => "approved": Positive,
        Rejected => "rejected": Negative,
        ConvertedToOrder => "converted_to_order": Positive,
    }
}

status_vocabulary! {
    QuotationStatus on StatusAxis::Quotation, default Draft {
        Draft => "draft": Neutral,
        Sent => "sent": Warning,
        Approved => "approved": Positive,
        Rejected => "rejected": Negative,
        ConvertedToOrder => "converted_to_order": Positive,
    }
}

status_vocabulary! {
    SalesOrderStatus on StatusAxis::SalesOrder, default Draft {
        Draft => "draft": Neutral,
        PendingApproval => "pending_approval": Warning,
        Approved => "approved": Positive,
        PendingContractApproval => "pending_contract_approval": Warning,
        Processing => "processing": Neutral,
        Completed => "completed": Positive,
        Cancelled => "cancelled": Negative,
    }
}

status_vocabulary! {
    /// Approval axis of a contract.
    ApprovalStatus on StatusAxis::ContractApproval, default Pending {
        Pending => "pending": Warning,
        Approved => "approved": Positive,
        Rejected => "rejected": Negative,
    }
}

status_vocabulary! {
    /// Lifecycle axis of a contract.
    ContractStatus on StatusAxis::ContractLifecycle, default Pending {
        Pending => "pending": Neutral,
        Active => "active": Positive,
        Completed => "completed": Neutral,
        Cancelled => "cancelled": Negative,
    }
}

status_vocabulary! {
    RentalStatus on StatusAxis::Rental, default Pending {
        Active => "active": Positive,
        Approved => "approved": Positive,
        Dispatched => "dispatched": Positive,
        Completed => "completed": Positive,
        Processing => "processing": Neutral,
        Pending => "pending": Warning,
        PendingApproval => "pending_approval": Warning,
        SubmittedByCustomer => "submitted_by_customer": Warning,
        Extended => "extended": Neutral,
        Draft => "draft": Neutral,
        ExpiringSoon => "expiring_soon": Warning,
        Returned => "returned": Neutral,
        Closed => "closed": Negative,
        Rejected => "rejected": Negative,
        Cancelled => "cancelled": Negative,
    }
}

status_vocabulary! {
    InvoiceStatus on StatusAxis::Invoice, default Pending {
        Paid => "paid": Positive,
        Pending => "pending": Warning,
        Overdue => "overdue": Negative,
        Cancelled => "cancelled": Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_lowers_the_tail_of_each_word() {
        assert_eq!(format_status_label("EXPIRING_SOON"), "Expiring Soon");
        assert_eq!(format_status_label("in-progress"), "In Progress");
    }

    #[test]
    fn separators_collapse_and_trim() {
        assert_eq!(format_status_label("__pending__approval "), "Pending Approval");
        assert_eq!(format_status_label(""), "");
    }

    #[test]
    fn unknown_strings_keep_their_exact_text() {
        let status = QuotationStatus::from("on_hold".to_string());
        assert_eq!(status, QuotationStatus::Other("on_hold".into()));
        assert_eq!(String::from(status), "on_hold");
    }

    #[test]
    fn lead_lookup_ignores_case_but_others_do_not() {
        assert_eq!(LeadStatus::parse("proposal sent"), LeadStatus::ProposalSent);
        assert!(matches!(ApprovalStatus::parse("Approved"), ApprovalStatus::Other(_)));
    }
}
