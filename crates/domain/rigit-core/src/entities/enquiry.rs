use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::EnquiryStatus;
use crate::validate::{RequiredFields, ValidationError};

/// A customer rental request, either self-service or entered by sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EnquiryWire")]
pub struct Enquiry {
    pub enquiry_id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub equipment_name: String,
    pub quantity: u32,
    pub rental_duration_days: Option<u32>,
    pub delivery_location: Option<String>,
    pub expected_delivery_date: Option<String>,
    pub special_instructions: Option<String>,
    pub assigned_salesperson_name: Option<String>,
    pub status: EnquiryStatus,
    pub created_at: Option<String>,
}

impl Enquiry {
    /// Payload handed from the enquiry list to the quotation form.
    pub fn quotation_seed(&self, default_duration_days: u32) -> QuotationSeed {
        QuotationSeed {
            enquiry_id: self.enquiry_id.clone(),
            customer_id: self.customer_id.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            equipment_name: if self.equipment_name.is_empty() {
                "Equipment".to_string()
            } else {
                self.equipment_name.clone()
            },
            quantity: self.quantity.max(1),
            rental_duration_days: self.rental_duration_days.unwrap_or(default_duration_days),
            delivery_location: self.delivery_location.clone(),
            expected_delivery_date: self.expected_delivery_date.clone(),
            special_instructions: self.special_instructions.clone().unwrap_or_default(),
            status: self.status.clone(),
            is_rental_order: true,
        }
    }
}

impl Record for Enquiry {
    fn record_id(&self) -> &str {
        &self.enquiry_id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.enquiry_id.as_str(),
            self.customer_name.as_str(),
            self.customer_email.as_str(),
            self.equipment_name.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct EnquiryWire {
    #[serde(default, deserialize_with = "lenient::string")]
    enquiry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_name: Option<String>,
    #[serde(default, rename = "customerName", deserialize_with = "lenient::string")]
    customer_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    rental_duration_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    delivery_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    expected_delivery_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    special_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    assigned_salesperson_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<EnquiryStatus>,
    #[serde(default, deserialize_with = "lenient::string")]
    enquiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    created_at: Option<String>,
}

impl From<EnquiryWire> for Enquiry {
    fn from(w: EnquiryWire) -> Self {
        Self {
            enquiry_id: pick_or_default([w.enquiry_id, w.id]),
            customer_id: pick([w.customer_id]),
            customer_name: pick_or_default([w.customer_name, w.customer_name_camel]),
            customer_email: pick_or_default([w.customer_email]),
            equipment_name: pick_or_default([w.equipment_name, w.equipment]),
            quantity: w.quantity.unwrap_or(1),
            rental_duration_days: w.rental_duration_days,
            delivery_location: pick([w.delivery_location]),
            expected_delivery_date: pick([w.expected_delivery_date]),
            special_instructions: pick([w.special_instructions]),
            assigned_salesperson_name: pick([w.assigned_salesperson_name]),
            status: w.status.unwrap_or_default(),
            created_at: pick([w.created_at, w.enquiry_date]),
        }
    }
}

/// Enquiry data carried by `convertToQuotation` / `openQuotationFromEnquiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationSeed {
    pub enquiry_id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub equipment_name: String,
    pub quantity: u32,
    pub rental_duration_days: u32,
    pub delivery_location: Option<String>,
    pub expected_delivery_date: Option<String>,
    pub special_instructions: String,
    pub status: EnquiryStatus,
    pub is_rental_order: bool,
}

/// Admin-side enquiry entry (`POST /api/admin/enquiries`).
#[derive(Debug, Clone, Serialize)]
pub struct EnquiryDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_id: String,
    pub equipment_name: String,
    pub quantity: u32,
    pub rental_duration_days: u32,
    pub delivery_location: String,
    pub expected_delivery_date: String,
    pub special_instructions: String,
    pub assigned_salesperson_name: String,
    pub status: EnquiryStatus,
}

impl EnquiryDraft {
    pub fn new(default_duration_days: u32) -> Self {
        Self {
            customer_name: String::new(),
            customer_email: String::new(),
            customer_id: String::new(),
            equipment_name: String::new(),
            quantity: 1,
            rental_duration_days: default_duration_days,
            delivery_location: String::new(),
            expected_delivery_date: String::new(),
            special_instructions: String::new(),
            assigned_salesperson_name: "Admin".to_string(),
            status: EnquiryStatus::SubmittedByCustomer,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        RequiredFields::new()
            .text("customer_name", &self.customer_name)
            .text("customer_email", &self.customer_email)
            .text("equipment_name", &self.equipment_name)
            .text("delivery_location", &self.delivery_location)
            .text("expected_delivery_date", &self.expected_delivery_date)
            .check()
    }

    /// Request body with the delivery date reduced to `YYYY-MM-DD`.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut draft = self.clone();
        draft.expected_delivery_date = normalize_date(&draft.expected_delivery_date);
        draft.quantity = draft.quantity.max(1);
        serde_json::to_value(draft).unwrap_or(serde_json::Value::Null)
    }
}

/// Reduces an RFC 3339 timestamp or plain date to `YYYY-MM-DD`; anything else
/// is passed through for the backend to judge.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return ts.date_naive().format("%Y-%m-%d").to_string();
    }
    trimmed.to_string()
}
