//! Canonical entity shapes.
//!
//! The backend is loose about field names (`contract_id` vs `id`,
//! `customerName` vs `customer_name`) and about types (quantities sometimes
//! arrive as strings). Every entity therefore deserializes through a private
//! wire struct whose fields are all optional, and one `From<Wire>` impl
//! resolves the fallbacks. Render sites only ever see the canonical struct.

pub mod contract;
pub mod enquiry;
pub mod invoice;
pub mod lead;
pub mod quotation;
pub mod rental;
pub mod sales_order;

pub use contract::{Contract, ContractPatch};
pub use enquiry::{Enquiry, EnquiryDraft, QuotationSeed};
pub use invoice::Invoice;
pub use lead::{Lead, LeadDraft, PublicEnquiryForm, PublicEnquiryReceipt};
pub use quotation::{NewQuotationItem, Quotation, QuotationDraft, QuotationItem};
pub use rental::Rental;
pub use sales_order::{SalesOrder, SalesOrderItem};

/// First candidate that is present and not blank.
pub(crate) fn pick<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

pub(crate) fn pick_or_default<const N: usize>(candidates: [Option<String>; N]) -> String {
    pick(candidates).unwrap_or_default()
}

/// Deserializers that accept the type drift seen in backend payloads.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
        Ok(number(de)?
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round() as u32))
    }

    pub fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        })
    }

    pub fn status<'de, D, S>(de: D) -> Result<Option<S>, D::Error>
    where
        D: Deserializer<'de>,
        S: From<String>,
    {
        Ok(string(de)?
            .filter(|s| !s.trim().is_empty())
            .map(S::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_skips_blank_candidates() {
        assert_eq!(
            pick([Some("  ".into()), None, Some("RC-1".into())]),
            Some("RC-1".to_string())
        );
        assert_eq!(pick::<2>([None, Some(String::new())]), None);
    }
}
