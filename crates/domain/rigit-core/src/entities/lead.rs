use serde::{Deserialize, Serialize};

use super::{lenient, pick, pick_or_default};
use crate::filter::Record;
use crate::status::LeadStatus;
use crate::validate::{RequiredFields, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LeadWire")]
pub struct Lead {
    pub lead_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile: Option<String>,
    pub organization: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub assigned_salesperson_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Lead {
    pub fn display_name(&self) -> String {
        let full = match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        };
        let full = full.trim().to_string();
        if !full.is_empty() {
            full
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            self.lead_id.clone()
        }
    }
}

impl Record for Lead {
    fn record_id(&self) -> &str {
        &self.lead_id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.lead_id.as_str(), self.first_name.as_str(), self.email.as_str()];
        fields.extend(self.last_name.as_deref());
        fields.extend(self.organization.as_deref());
        fields
    }
}

#[derive(Debug, Default, Deserialize)]
struct LeadWire {
    #[serde(default, deserialize_with = "lenient::string")]
    lead_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, rename = "firstName", deserialize_with = "lenient::string")]
    first_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
    #[serde(default, rename = "lastName", deserialize_with = "lenient::string")]
    last_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    mobile: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    organization: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    company: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient::status")]
    status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "lenient::string")]
    assigned_salesperson_name: Option<String>,
    #[serde(default, rename = "leadOwner", deserialize_with = "lenient::string")]
    lead_owner: Option<String>,
    #[serde(default, rename = "createdAt", deserialize_with = "lenient::string")]
    created_at_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    created_at: Option<String>,
    #[serde(default, rename = "updatedAt", deserialize_with = "lenient::string")]
    updated_at_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    updated_at: Option<String>,
}

impl From<LeadWire> for Lead {
    fn from(w: LeadWire) -> Self {
        Self {
            lead_id: pick_or_default([w.lead_id, w.id]),
            first_name: pick_or_default([w.first_name_camel, w.first_name, w.name]),
            last_name: pick([w.last_name_camel, w.last_name]),
            email: pick_or_default([w.email]),
            mobile: pick([w.mobile, w.phone]),
            organization: pick([w.organization, w.company]),
            source: pick([w.source]),
            status: w.status.unwrap_or_default(),
            assigned_salesperson_name: pick([w.assigned_salesperson_name, w.lead_owner]),
            created_at: pick([w.created_at_camel, w.created_at]),
            updated_at: pick([w.updated_at_camel, w.updated_at]),
        }
    }
}

/// CRM manual entry (`POST /api/crm/leads`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: LeadStatus,
}

impl LeadDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        RequiredFields::new()
            .text("firstName", &self.first_name)
            .text("email", &self.email)
            .check()
    }
}

/// The landing page enquiry form (`POST /api/crm/leads/public`, no credential).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEnquiryForm {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub equipment_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PublicEnquiryForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        RequiredFields::new()
            .text("firstName", &self.first_name)
            .text("email", &self.email)
            .text("phone", &self.phone)
            .text("equipmentCategory", &self.equipment_category)
            .check()
    }

    /// Request body; a zero quantity is sent as one.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut form = self.clone();
        form.quantity = form.quantity.max(1);
        serde_json::to_value(form).unwrap_or(serde_json::Value::Null)
    }
}

/// Identifiers the backend hands back for a public enquiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEnquiryReceipt {
    #[serde(default, deserialize_with = "lenient::string")]
    pub enquiry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub lead_id: Option<String>,
}
