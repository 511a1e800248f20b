pub mod commands;
pub mod render;

use clap::ValueEnum;
use rigit_app_core::{ActionError, ContractScope, LeadScope, QuotationScope};
use rigit_infra::{ApiError, ApiErrorKind, Endpoint};

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliLeadScope {
    Assigned,
    All,
}

impl From<CliLeadScope> for LeadScope {
    fn from(s: CliLeadScope) -> Self {
        match s {
            CliLeadScope::Assigned => LeadScope::Assigned,
            CliLeadScope::All => LeadScope::All,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliQuotationScope {
    Sales,
    Pending,
}

impl From<CliQuotationScope> for QuotationScope {
    fn from(s: CliQuotationScope) -> Self {
        match s {
            CliQuotationScope::Sales => QuotationScope::Sales,
            CliQuotationScope::Pending => QuotationScope::PendingApproval,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliContractScope {
    Pending,
    All,
}

impl From<CliContractScope> for ContractScope {
    fn from(s: CliContractScope) -> Self {
        match s {
            CliContractScope::Pending => ContractScope::PendingApproval,
            CliContractScope::All => ContractScope::All,
        }
    }
}

/// Lists `watch` can keep on screen.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliList {
    Leads,
    Enquiries,
    Quotations,
    Orders,
    Contracts,
    Rentals,
    Invoices,
}

/// Read-only reference lists with no view of their own.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliReference {
    Uom,
    Rates,
    Currencies,
    Vat,
    Employees,
    Dispatch,
    Returns,
    Stock,
    WarehouseReports,
}

impl CliReference {
    pub fn endpoint(self) -> Endpoint {
        match self {
            CliReference::Uom => Endpoint::master_data("uom"),
            CliReference::Rates => Endpoint::master_data("rates"),
            CliReference::Currencies => Endpoint::master_data("currencies"),
            CliReference::Vat => Endpoint::master_data("vat"),
            CliReference::Employees => Endpoint::employees(),
            CliReference::Dispatch => Endpoint::warehouse("dispatch"),
            CliReference::Returns => Endpoint::warehouse("returns"),
            CliReference::Stock => Endpoint::warehouse("stock"),
            CliReference::WarehouseReports => Endpoint::warehouse("reports"),
        }
    }
}

fn api_error_kind(err: &anyhow::Error) -> Option<ApiErrorKind> {
    err.chain().find_map(|cause| {
        if let Some(ActionError::Api(api)) = cause.downcast_ref::<ActionError>() {
            return Some(api.kind());
        }
        cause.downcast_ref::<ApiError>().map(ApiError::kind)
    })
}

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match api_error_kind(err) {
        Some(ApiErrorKind::Config) => 2,
        Some(ApiErrorKind::Auth) => 3,
        Some(ApiErrorKind::Network) => 4,
        Some(ApiErrorKind::Server | ApiErrorKind::Decode) => 5,
        None => 1,
    }
}

/// What the user can do about a failure, when there is something.
pub fn failure_hint(err: &anyhow::Error) -> Option<&'static str> {
    match api_error_kind(err)? {
        ApiErrorKind::Auth => Some("run `rigit login <token>` to sign in again"),
        ApiErrorKind::Network | ApiErrorKind::Config => {
            Some("check the backend address with `rigit config show`")
        }
        ApiErrorKind::Server | ApiErrorKind::Decode => None,
    }
}
