use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::SalesOrderStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SalesOrderItemWire")]
pub struct SalesOrderItem {
    pub id: String,
    pub equipment: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub rate: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
struct SalesOrderItemWire {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    rate: Option<f64>,
    #[serde(default, rename = "ratePerSqft", deserialize_with = "lenient::number")]
    rate_per_sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total: Option<f64>,
}

impl From<SalesOrderItemWire> for SalesOrderItem {
    fn from(w: SalesOrderItemWire) -> Self {
        let quantity = w.quantity.or(w.sqft).unwrap_or(0.0);
        let rate = w.rate.or(w.rate_per_sqft).unwrap_or(0.0);
        Self {
            id: pick_or_default([w.id]),
            equipment: pick_or_default([w.equipment, w.equipment_name]),
            quantity,
            unit: pick([w.unit]),
            rate,
            total: w.total.unwrap_or(quantity * rate),
        }
    }
}

/// Order raised from an approved quotation; waits on stock and contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SalesOrderWire")]
pub struct SalesOrder {
    pub sales_order_id: String,
    pub quotation_id: Option<String>,
    pub customer_name: String,
    pub company: Option<String>,
    pub project: Option<String>,
    pub items: Vec<SalesOrderItem>,
    pub total_amount: f64,
    pub status: SalesOrderStatus,
    pub stock_checked: bool,
    pub stock_available: Option<bool>,
    pub delivery_address: Option<String>,
    pub contract_id: Option<String>,
    pub created_at: Option<String>,
}

impl SalesOrder {
    /// Why a contract cannot be requested yet, if anything blocks it.
    pub fn contract_blocker(&self) -> Option<String> {
        if !self.stock_checked {
            return Some("Please check stock availability before creating contract".into());
        }
        match &self.status {
            SalesOrderStatus::Approved => None,
            SalesOrderStatus::PendingContractApproval => {
                Some("Contract request is already pending admin approval".into())
            }
            SalesOrderStatus::PendingApproval => Some(
                "Sales order is pending approval. Please wait for approval before creating contract"
                    .into(),
            ),
            other => Some(format!(
                "Cannot create contract. Order status must be \"approved\" (current: {})",
                other.label()
            )),
        }
    }

    pub fn ready_for_contract(&self) -> bool {
        self.contract_blocker().is_none()
    }
}

impl Record for SalesOrder {
    fn record_id(&self) -> &str {
        &self.sales_order_id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.sales_order_id.as_str(), self.customer_name.as_str()];
        fields.extend(self.quotation_id.as_deref());
        fields.extend(self.company.as_deref());
        fields.extend(self.project.as_deref());
        fields
    }
}

#[derive(Debug, Deserialize)]
struct SalesOrderWire {
    #[serde(default, deserialize_with = "lenient::string")]
    sales_order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    quotation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_name: Option<String>,
    #[serde(default, rename = "customerName", deserialize_with = "lenient::string")]
    customer_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    company: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    project: Option<String>,
    #[serde(default)]
    items: Vec<SalesOrderItem>,
    #[serde(default, deserialize_with = "lenient::number")]
    total_amount: Option<f64>,
    #[serde(default, rename = "totalAmount", deserialize_with = "lenient::number")]
    total_amount_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<SalesOrderStatus>,
    #[serde(default, deserialize_with = "lenient::flag")]
    stock_checked: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    stock_available: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    delivery_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    contract_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    created_at: Option<String>,
}

impl From<SalesOrderWire> for SalesOrder {
    fn from(w: SalesOrderWire) -> Self {
        let computed: f64 = w.items.iter().map(|item| item.total).sum();
        Self {
            sales_order_id: pick_or_default([w.sales_order_id, w.id]),
            quotation_id: pick([w.quotation_id]),
            customer_name: pick_or_default([w.customer_name, w.customer_name_camel, w.customer]),
            company: pick([w.company]),
            project: pick([w.project]),
            total_amount: w.total_amount.or(w.total_amount_camel).unwrap_or(computed),
            items: w.items,
            status: w.status.unwrap_or_default(),
            stock_checked: w.stock_checked.unwrap_or(false),
            stock_available: w.stock_available,
            delivery_address: pick([w.delivery_address]),
            contract_id: pick([w.contract_id]),
            created_at: pick([w.created_at]),
        }
    }
}
