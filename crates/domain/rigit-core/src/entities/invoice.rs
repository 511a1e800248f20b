use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::InvoiceStatus;

/// Invoice raised by the backend when a contract is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InvoiceWire")]
pub struct Invoice {
    pub invoice_id: String,
    pub contract_id: Option<String>,
    pub sales_order_id: Option<String>,
    pub customer_name: String,
    pub company: Option<String>,
    pub amount: f64,
    pub vat: f64,
    pub total: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub due_date: Option<String>,
}

impl Record for Invoice {
    fn record_id(&self) -> &str {
        &self.invoice_id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.invoice_id.as_str(), self.customer_name.as_str()];
        fields.extend(self.contract_id.as_deref());
        fields.extend(self.company.as_deref());
        fields
    }
}

#[derive(Debug, Deserialize)]
struct InvoiceWire {
    #[serde(default, deserialize_with = "lenient::string")]
    invoice_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    contract_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    sales_order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    company: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    vat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    vat_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<InvoiceStatus>,
    #[serde(default, deserialize_with = "lenient::string")]
    due_date: Option<String>,
}

impl From<InvoiceWire> for Invoice {
    fn from(w: InvoiceWire) -> Self {
        let amount = w.amount.unwrap_or(0.0);
        let vat = w.vat.or(w.vat_amount).unwrap_or(0.0);
        Self {
            invoice_id: pick_or_default([w.invoice_id, w.id]),
            contract_id: pick([w.contract_id]),
            sales_order_id: pick([w.sales_order_id]),
            customer_name: pick_or_default([w.customer_name, w.customer]),
            company: pick([w.company]),
            amount,
            vat,
            total: w.total.or(w.total_amount).unwrap_or(amount + vat),
            currency: pick([w.currency]).unwrap_or_else(|| "AED".to_string()),
            status: w.status.unwrap_or_default(),
            due_date: pick([w.due_date]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_defaults_to_amount_plus_vat() {
        let invoice: Invoice = serde_json::from_value(serde_json::json!({
            "invoice_id": "INV-001",
            "contract_id": "RC-2025-001",
            "customer": "Gulf Build",
            "amount": 1000,
            "vat_amount": 50
        }))
        .unwrap();
        assert_eq!(invoice.total, 1050.0);
        assert_eq!(invoice.currency, "AED");
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }
}
