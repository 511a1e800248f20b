use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::{ApprovalStatus, ContractStatus};
use crate::validate::{RequiredFields, ValidationError};

/// Rental contract. Approval and lifecycle are independent axes: an approved
/// contract can still be `pending` on the lifecycle axis until it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ContractWire")]
pub struct Contract {
    pub contract_id: String,
    pub quotation_id: Option<String>,
    pub sales_order_id: Option<String>,
    pub customer: String,
    pub company: Option<String>,
    pub project: Option<String>,
    pub equipment: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub amount: f64,
    pub status: ContractStatus,
    pub approval_status: ApprovalStatus,
    pub invoice_id: Option<String>,
    pub renewal_date: Option<String>,
}

impl Contract {
    pub fn awaiting_approval(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }
}

impl Record for Contract {
    fn record_id(&self) -> &str {
        &self.contract_id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.contract_id.as_str(), self.customer.as_str()];
        fields.extend(self.company.as_deref());
        fields.extend(self.project.as_deref());
        fields.extend(self.equipment.as_deref());
        fields
    }
}

#[derive(Debug, Deserialize)]
struct ContractWire {
    #[serde(default, deserialize_with = "lenient::string")]
    contract_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    quotation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    sales_order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_name: Option<String>,
    #[serde(default, rename = "customerName", deserialize_with = "lenient::string")]
    customer_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    company: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    project: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment: Option<String>,
    #[serde(default, rename = "startDate", deserialize_with = "lenient::string")]
    start_date_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    start_date: Option<String>,
    #[serde(default, rename = "endDate", deserialize_with = "lenient::string")]
    end_date_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<ContractStatus>,
    #[serde(default, deserialize_with = "lenient::status")]
    approval_status: Option<ApprovalStatus>,
    #[serde(default, deserialize_with = "lenient::string")]
    invoice_id: Option<String>,
    #[serde(default, rename = "renewalDate", deserialize_with = "lenient::string")]
    renewal_date_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    renewal_date: Option<String>,
}

impl From<ContractWire> for Contract {
    fn from(w: ContractWire) -> Self {
        Self {
            contract_id: pick_or_default([w.contract_id, w.id]),
            quotation_id: pick([w.quotation_id]),
            sales_order_id: pick([w.sales_order_id]),
            customer: pick_or_default([w.customer, w.customer_name, w.customer_name_camel]),
            company: pick([w.company]),
            project: pick([w.project]),
            equipment: pick([w.equipment]),
            start_date: pick([w.start_date_camel, w.start_date]),
            end_date: pick([w.end_date_camel, w.end_date]),
            amount: w.amount.or(w.total_amount).unwrap_or(0.0),
            status: w.status.unwrap_or_default(),
            approval_status: w.approval_status.unwrap_or_default(),
            invoice_id: pick([w.invoice_id]),
            renewal_date: pick([w.renewal_date_camel, w.renewal_date]),
        }
    }
}

/// Partial update for `PUT /api/contracts/{id}`; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<String>,
}

impl ContractPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields that are set must not be blank, and at least one must be set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut required = RequiredFields::new();
        if self.is_empty() {
            return Err(ValidationError {
                missing: vec!["any field".to_string()],
            });
        }
        for (name, value) in [
            ("customer", &self.customer),
            ("project", &self.project),
            ("equipment", &self.equipment),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ] {
            if let Some(value) = value {
                required = required.text(name, value);
            }
        }
        if let Some(amount) = self.amount {
            required = required.positive("amount", amount);
        }
        required.check()
    }

    /// Applies the set fields to a local copy, for the optimistic row update.
    pub fn apply_to(&self, contract: &mut Contract) {
        if let Some(v) = &self.customer {
            contract.customer = v.clone();
        }
        if let Some(v) = &self.project {
            contract.project = Some(v.clone());
        }
        if let Some(v) = &self.equipment {
            contract.equipment = Some(v.clone());
        }
        if let Some(v) = &self.start_date {
            contract.start_date = Some(v.clone());
        }
        if let Some(v) = &self.end_date {
            contract.end_date = Some(v.clone());
        }
        if let Some(v) = self.amount {
            contract.amount = v;
        }
        if let Some(v) = &self.status {
            contract.status = v.clone();
        }
        if let Some(v) = &self.renewal_date {
            contract.renewal_date = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Emphasis;

    #[test]
    fn both_axes_are_kept_apart() {
        let contract: Contract = serde_json::from_value(serde_json::json!({
            "id": "67aa",
            "contract_id": "RC-2025-001",
            "customer_name": "Gulf Build",
            "total_amount": "15400.50",
            "status": "pending",
            "approval_status": "approved"
        }))
        .unwrap();

        assert_eq!(contract.contract_id, "RC-2025-001");
        assert_eq!(contract.customer, "Gulf Build");
        assert_eq!(contract.amount, 15400.5);
        assert_eq!(contract.status.emphasis(), Emphasis::Neutral);
        assert_eq!(contract.approval_status.emphasis(), Emphasis::Positive);
        assert!(!contract.awaiting_approval());
    }

    #[test]
    fn patch_rejects_blank_values_and_empty_patches() {
        assert!(ContractPatch::default().validate().is_err());

        let patch = ContractPatch {
            project: Some("  ".into()),
            amount: Some(-1.0),
            ..Default::default()
        };
        let err = patch.validate().unwrap_err();
        assert_eq!(err.missing, vec!["project", "amount"]);

        let patch = ContractPatch {
            end_date: Some("2025-12-31".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({"endDate": "2025-12-31"}));
    }
}
