use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::RentalStatus;

/// A customer's rental as shown in the customer portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RentalWire")]
pub struct Rental {
    pub id: String,
    pub enquiry_id: Option<String>,
    pub equipment_name: String,
    pub quantity: u32,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: RentalStatus,
    pub total_amount: Option<f64>,
}

impl Record for Rental {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.equipment_name.as_str()];
        fields.extend(self.enquiry_id.as_deref());
        fields
    }
}

#[derive(Debug, Deserialize)]
struct RentalWire {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    rental_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    enquiry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    equipment: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<RentalStatus>,
    #[serde(default, deserialize_with = "lenient::number")]
    total_amount: Option<f64>,
}

impl From<RentalWire> for Rental {
    fn from(w: RentalWire) -> Self {
        let enquiry_id = pick([w.enquiry_id]);
        Self {
            id: pick_or_default([w.id, w.rental_id, enquiry_id.clone()]),
            enquiry_id,
            equipment_name: pick_or_default([w.equipment_name, w.equipment]),
            quantity: w.quantity.unwrap_or(1),
            start_date: pick([w.start_date]),
            end_date: pick([w.end_date]),
            status: w.status.unwrap_or_default(),
            total_amount: w.total_amount,
        }
    }
}
