use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::enquiry::QuotationSeed;
use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::QuotationStatus;
use crate::validate::{RequiredFields, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "QuotationItemWire")]
pub struct QuotationItem {
    pub id: String,
    pub equipment: String,
    pub length: f64,
    pub breadth: f64,
    pub sqft: f64,
    pub rate_per_sqft: f64,
    pub subtotal: f64,
    pub wastage_charges: f64,
    pub cutting_charges: f64,
    pub total: f64,
}

/// Stored lines come back with numeric ids and stringly numbers depending on
/// which form wrote them; missing derived columns are recomputed.
#[derive(Debug, Deserialize)]
struct QuotationItemWire {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    length: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    breadth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    sqft: Option<f64>,
    #[serde(default, rename = "ratePerSqft", deserialize_with = "lenient::number")]
    rate_per_sqft_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    rate_per_sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    subtotal: Option<f64>,
    #[serde(default, rename = "wastageCharges", deserialize_with = "lenient::number")]
    wastage_charges_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    wastage_charges: Option<f64>,
    #[serde(default, rename = "cuttingCharges", deserialize_with = "lenient::number")]
    cutting_charges_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    cutting_charges: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total: Option<f64>,
}

impl From<QuotationItemWire> for QuotationItem {
    fn from(w: QuotationItemWire) -> Self {
        let length = w.length.unwrap_or(0.0);
        let breadth = w.breadth.unwrap_or(0.0);
        let rate_per_sqft = w.rate_per_sqft_camel.or(w.rate_per_sqft).unwrap_or(0.0);
        let wastage_charges = w.wastage_charges_camel.or(w.wastage_charges).unwrap_or(0.0);
        let cutting_charges = w.cutting_charges_camel.or(w.cutting_charges).unwrap_or(0.0);
        let sqft = w.sqft.unwrap_or(length * breadth);
        let subtotal = w.subtotal.unwrap_or(sqft * rate_per_sqft);
        Self {
            id: pick_or_default([w.id]),
            equipment: pick_or_default([w.equipment, w.equipment_name]),
            length,
            breadth,
            sqft,
            rate_per_sqft,
            subtotal,
            wastage_charges,
            cutting_charges,
            total: w.total.unwrap_or(subtotal + wastage_charges + cutting_charges),
        }
    }
}

/// Line item as typed into the form, before the derived columns exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewQuotationItem {
    pub equipment: String,
    pub length: f64,
    pub breadth: f64,
    pub rate_per_sqft: f64,
    pub wastage_charges: f64,
    pub cutting_charges: f64,
}

impl QuotationItem {
    pub fn compute(id: impl Into<String>, item: &NewQuotationItem) -> Self {
        let sqft = item.length * item.breadth;
        let subtotal = sqft * item.rate_per_sqft;
        Self {
            id: id.into(),
            equipment: item.equipment.clone(),
            length: item.length,
            breadth: item.breadth,
            sqft,
            rate_per_sqft: item.rate_per_sqft,
            subtotal,
            wastage_charges: item.wastage_charges,
            cutting_charges: item.cutting_charges,
            total: subtotal + item.wastage_charges + item.cutting_charges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuotationWire")]
pub struct Quotation {
    pub quotation_id: String,
    pub customer_name: String,
    pub company: String,
    pub project: String,
    pub items: Vec<QuotationItem>,
    pub total_amount: f64,
    pub status: QuotationStatus,
    pub created_date: Option<String>,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub enquiry_id: Option<String>,
}

impl Quotation {
    /// Sum of the line totals, independent of what the backend stored.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(|item| item.total).sum()
    }
}

impl Record for Quotation {
    fn record_id(&self) -> &str {
        &self.quotation_id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.quotation_id.as_str(),
            self.customer_name.as_str(),
            self.company.as_str(),
            self.project.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct QuotationWire {
    #[serde(default, deserialize_with = "lenient::string")]
    quotation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, rename = "customerName", deserialize_with = "lenient::string")]
    customer_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    company: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    project: Option<String>,
    #[serde(default)]
    items: Vec<QuotationItem>,
    #[serde(default, rename = "totalAmount", deserialize_with = "lenient::number")]
    total_amount_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<QuotationStatus>,
    #[serde(default, rename = "createdDate", deserialize_with = "lenient::string")]
    created_date_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    created_date: Option<String>,
    #[serde(default, rename = "validUntil", deserialize_with = "lenient::string")]
    valid_until_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    valid_until: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    enquiry_id: Option<String>,
}

impl From<QuotationWire> for Quotation {
    fn from(w: QuotationWire) -> Self {
        let computed: f64 = w.items.iter().map(|item| item.total).sum();
        Self {
            quotation_id: pick_or_default([w.quotation_id, w.id]),
            customer_name: pick_or_default([w.customer_name_camel, w.customer_name]),
            company: pick_or_default([w.company]),
            project: pick_or_default([w.project]),
            total_amount: w.total_amount_camel.or(w.total_amount).unwrap_or(computed),
            items: w.items,
            status: w.status.unwrap_or_default(),
            created_date: pick([w.created_date_camel, w.created_date]),
            valid_until: pick([w.valid_until_camel, w.valid_until]),
            notes: pick([w.notes]),
            enquiry_id: pick([w.enquiry_id]),
        }
    }
}

/// Quotation being composed in the sales form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotationDraft {
    pub customer_name: String,
    pub company: String,
    pub project: String,
    pub notes: Option<String>,
    pub enquiry_id: Option<String>,
    items: Vec<QuotationItem>,
    total_amount: f64,
    next_item_id: usize,
}

impl QuotationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills the form from an enquiry handed over by the enquiry list,
    /// with one placeholder line for the salesperson to adjust.
    pub fn from_seed(seed: &QuotationSeed) -> Self {
        let prefix = if seed.is_rental_order { "Rental Order" } else { "Enquiry" };
        let mut draft = Self {
            customer_name: seed.customer_name.clone(),
            company: seed.customer_name.clone(),
            project: format!("{prefix}: {}", seed.equipment_name),
            notes: Some(seed.special_instructions.clone()).filter(|n| !n.trim().is_empty()),
            enquiry_id: Some(seed.enquiry_id.clone()),
            ..Self::default()
        };
        draft.add_item(&NewQuotationItem {
            equipment: seed.equipment_name.clone(),
            length: 10.0,
            breadth: 5.0,
            rate_per_sqft: 25.0,
            wastage_charges: 50.0,
            cutting_charges: 25.0,
        });
        draft
    }

    pub fn items(&self) -> &[QuotationItem] {
        &self.items
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Appends a computed line and recomputes the total from scratch.
    pub fn add_item(&mut self, item: &NewQuotationItem) -> &QuotationItem {
        // Never reused, so removing a line cannot make two ids collide.
        self.next_item_id += 1;
        let id = format!("item-{}", self.next_item_id);
        self.items.push(QuotationItem::compute(id, item));
        self.recompute();
        &self.items[self.items.len() - 1]
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.total).sum();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        RequiredFields::new()
            .text("customerName", &self.customer_name)
            .text("company", &self.company)
            .text("project", &self.project)
            .non_empty("items", &self.items)
            .check()
    }

    /// Request body. New quotations go straight to admin approval, so the
    /// status is `sent` rather than `draft`.
    pub fn to_payload(&self, today: NaiveDate, validity_days: u32) -> serde_json::Value {
        let valid_until = today
            .checked_add_days(Days::new(u64::from(validity_days)))
            .unwrap_or(today);
        serde_json::json!({
            "customerName": self.customer_name,
            "company": self.company,
            "project": self.project,
            "items": self.items,
            "totalAmount": self.total_amount,
            "notes": self.notes,
            "enquiry_id": self.enquiry_id,
            "status": QuotationStatus::Sent,
            "createdDate": today.format("%Y-%m-%d").to_string(),
            "validUntil": valid_until.format("%Y-%m-%d").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(equipment: &str, length: f64, breadth: f64, rate: f64) -> NewQuotationItem {
        NewQuotationItem {
            equipment: equipment.into(),
            length,
            breadth,
            rate_per_sqft: rate,
            wastage_charges: 50.0,
            cutting_charges: 25.0,
        }
    }

    #[test]
    fn item_math_matches_the_sales_form() {
        let item = QuotationItem::compute("i1", &frame("H-Frame", 10.0, 5.0, 25.0));
        assert_eq!(item.sqft, 50.0);
        assert_eq!(item.subtotal, 1250.0);
        assert_eq!(item.total, 1325.0);
    }

    #[test]
    fn total_is_recomputed_on_every_change() {
        let mut draft = QuotationDraft::new();
        draft.add_item(&frame("H-Frame", 10.0, 5.0, 25.0));
        draft.add_item(&frame("Cuplock", 2.0, 2.0, 10.0));
        assert_eq!(draft.total_amount(), 1325.0 + 115.0);

        draft.remove_item("item-1");
        assert_eq!(draft.total_amount(), 115.0);
    }

    #[test]
    fn item_ids_stay_unique_after_removal() {
        let mut draft = QuotationDraft::new();
        draft.add_item(&frame("H-Frame", 10.0, 5.0, 25.0));
        draft.add_item(&frame("Cuplock", 2.0, 2.0, 10.0));
        draft.remove_item("item-1");
        let added = draft.add_item(&frame("Ringlock", 1.0, 1.0, 1.0)).id.clone();
        assert_eq!(added, "item-3");

        draft.remove_item("item-2");
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.items()[0].equipment, "Ringlock");
        assert_eq!(draft.total_amount(), 76.0);
    }

    #[test]
    fn stored_items_are_normalized() {
        let q: Quotation = serde_json::from_value(serde_json::json!({
            "quotation_id": "QT-2025-009",
            "customer_name": "A",
            "items": [{"id": 1712, "equipment": "H-Frame", "length": "10", "breadth": 5, "ratePerSqft": "25"}],
            "status": "sent"
        }))
        .unwrap();
        let item = &q.items[0];
        assert_eq!(item.id, "1712");
        assert_eq!(item.sqft, 50.0);
        assert_eq!(item.subtotal, 1250.0);
        assert_eq!(item.total, 1250.0);
        assert_eq!(q.computed_total(), 1250.0);
    }

    #[test]
    fn payload_is_sent_with_validity_window() {
        let mut draft = QuotationDraft {
            customer_name: "Gulf Build".into(),
            company: "Gulf Build LLC".into(),
            project: "Marina Tower".into(),
            ..Default::default()
        };
        draft.add_item(&frame("H-Frame", 1.0, 1.0, 1.0));
        let today = NaiveDate::from_ymd_opt(2025, 1, 28).unwrap();
        let payload = draft.to_payload(today, 10);
        assert_eq!(payload["status"], "sent");
        assert_eq!(payload["createdDate"], "2025-01-28");
        assert_eq!(payload["validUntil"], "2025-02-07");
        assert_eq!(payload["items"][0]["ratePerSqft"], 1.0);
    }

    #[test]
    fn missing_total_falls_back_to_item_sum() {
        let q: Quotation = serde_json::from_value(serde_json::json!({
            "id": "QT-2025-003",
            "customer_name": "A",
            "items": [{
                "id": "1", "equipment": "x", "length": 1, "breadth": 2, "sqft": 2,
                "ratePerSqft": 3, "subtotal": 6, "total": 6
            }],
            "status": "approved"
        }))
        .unwrap();
        assert_eq!(q.quotation_id, "QT-2025-003");
        assert_eq!(q.total_amount, 6.0);
        assert_eq!(q.status, QuotationStatus::Approved);
    }
}
