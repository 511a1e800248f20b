use std::fmt;

use serde::{Deserialize, Serialize};

/// Notification topics. Wire names match the event names the dashboards
/// have always used, so payloads from older callers still route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    LeadCreated,
    LeadUpdated,
    RefreshLeads,
    EnquiryCreated,
    RefreshEnquiries,
    ConvertToQuotation,
    OpenQuotationFromEnquiry,
    QuotationSent,
    QuotationApproved,
    ContractApproved,
    SalesTabChange,
    WarehouseTabChange,
    FinanceTabChange,
    CustomerTabChange,
    GlobalRefresh,
    RefreshAll,
    StockDataRefresh,
    EquipmentAdded,
    UserUpdated,
    EventUpdated,
}

impl Topic {
    pub const ALL: [Topic; 20] = [
        Topic::LeadCreated,
        Topic::LeadUpdated,
        Topic::RefreshLeads,
        Topic::EnquiryCreated,
        Topic::RefreshEnquiries,
        Topic::ConvertToQuotation,
        Topic::OpenQuotationFromEnquiry,
        Topic::QuotationSent,
        Topic::QuotationApproved,
        Topic::ContractApproved,
        Topic::SalesTabChange,
        Topic::WarehouseTabChange,
        Topic::FinanceTabChange,
        Topic::CustomerTabChange,
        Topic::GlobalRefresh,
        Topic::RefreshAll,
        Topic::StockDataRefresh,
        Topic::EquipmentAdded,
        Topic::UserUpdated,
        Topic::EventUpdated,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Topic::LeadCreated => "leadCreated",
            Topic::LeadUpdated => "leadUpdated",
            Topic::RefreshLeads => "refreshLeads",
            Topic::EnquiryCreated => "enquiryCreated",
            Topic::RefreshEnquiries => "refreshEnquiries",
            Topic::ConvertToQuotation => "convertToQuotation",
            Topic::OpenQuotationFromEnquiry => "openQuotationFromEnquiry",
            Topic::QuotationSent => "quotationSent",
            Topic::QuotationApproved => "quotationApproved",
            Topic::ContractApproved => "contractApproved",
            Topic::SalesTabChange => "salesTabChange",
            Topic::WarehouseTabChange => "warehouseTabChange",
            Topic::FinanceTabChange => "financeTabChange",
            Topic::CustomerTabChange => "customerTabChange",
            Topic::GlobalRefresh => "globalRefresh",
            Topic::RefreshAll => "refreshAll",
            Topic::StockDataRefresh => "stockDataRefresh",
            Topic::EquipmentAdded => "equipmentAdded",
            Topic::UserUpdated => "userUpdated",
            Topic::EventUpdated => "eventUpdated",
        }
    }

    /// Maps a legacy event name onto its topic; exact, case-sensitive.
    pub fn from_wire(name: &str) -> Option<Topic> {
        Self::ALL.into_iter().find(|t| t.wire_name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
