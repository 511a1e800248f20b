//! Backend REST paths.
//!
//! Paths are kept as segment lists and pushed onto the base URL with
//! `path_segments_mut`, so record ids are percent-encoded and a base URL with
//! a path prefix (`https://host/erp`) keeps its prefix.

use reqwest::Url;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    trailing_slash: bool,
    public: bool,
}

impl Endpoint {
    fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            trailing_slash: false,
            public: false,
        }
    }

    fn with_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    fn unauthenticated(mut self) -> Self {
        self.public = true;
        self
    }

    /// Whether the request carries the bearer credential.
    pub fn requires_auth(&self) -> bool {
        !self.public
    }

    /// `/api/...` form, for logs and tests.
    pub fn path(&self) -> String {
        let mut path = format!("/{}", self.segments.join("/"));
        if self.trailing_slash {
            path.push('/');
        }
        path
    }

    pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        let mut segs = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{base} cannot be a base")))?;
        segs.pop_if_empty();
        segs.extend(&self.segments);
        if self.trailing_slash {
            segs.push("");
        }
        drop(segs);
        Ok(url)
    }

    // --- CRM ---

    pub fn assigned_leads() -> Self {
        Self::new(["api", "crm", "leads", "assigned"])
    }

    pub fn leads() -> Self {
        Self::new(["api", "crm", "leads"])
    }

    pub fn public_lead() -> Self {
        Self::new(["api", "crm", "leads", "public"]).unauthenticated()
    }

    pub fn lead_status(lead_id: &str) -> Self {
        Self::new(["api", "crm", "leads", lead_id, "status"])
    }

    // --- Enquiries ---

    pub fn admin_enquiries() -> Self {
        Self::new(["api", "admin", "enquiries"])
    }

    pub fn sales_enquiries() -> Self {
        Self::new(["api", "sales", "enquiries"])
    }

    pub fn enquiry_status(enquiry_id: &str) -> Self {
        Self::new(["api", "sales", "enquiries", enquiry_id, "status"])
    }

    // --- Quotations ---

    pub fn sales_quotations() -> Self {
        Self::new(["api", "sales", "quotations"])
    }

    pub fn quotation_send(quotation_id: &str) -> Self {
        Self::new(["api", "sales", "quotations", quotation_id, "send"])
    }

    pub fn pending_quotations() -> Self {
        Self::new(["api", "admin", "quotations", "pending"])
    }

    pub fn quotation_approve(quotation_id: &str) -> Self {
        Self::new(["api", "admin", "quotations", quotation_id, "approve"])
    }

    pub fn quotation_reject(quotation_id: &str) -> Self {
        Self::new(["api", "admin", "quotations", quotation_id, "reject"])
    }

    // --- Sales orders ---

    pub fn sales_orders() -> Self {
        Self::new(["api", "sales", "orders"])
    }

    pub fn order_check_stock(order_id: &str) -> Self {
        Self::new(["api", "sales", "orders", order_id, "check-stock"])
    }

    pub fn order_create_contract(order_id: &str) -> Self {
        Self::new(["api", "sales", "orders", order_id, "create-contract"])
    }

    // --- Contracts ---

    pub fn pending_contracts() -> Self {
        Self::new(["api", "admin", "contracts", "pending"])
    }

    pub fn contract_approve(contract_id: &str) -> Self {
        Self::new(["api", "admin", "contracts", contract_id, "approve"])
    }

    pub fn contract_reject(contract_id: &str) -> Self {
        Self::new(["api", "admin", "contracts", contract_id, "reject"])
    }

    pub fn contracts() -> Self {
        Self::new(["api", "contracts"]).with_trailing_slash()
    }

    pub fn contract(contract_id: &str) -> Self {
        Self::new(["api", "contracts", contract_id])
    }

    // --- Customer / finance ---

    pub fn rentals() -> Self {
        Self::new(["api", "rentals"]).with_trailing_slash()
    }

    pub fn invoices() -> Self {
        Self::new(["api", "invoices"]).with_trailing_slash()
    }

    // --- Reference data ---

    /// `uom`, `rates`, `currencies` or `vat`.
    pub fn master_data(table: &str) -> Self {
        Self::new(["api", "master-data", table])
    }

    pub fn employees() -> Self {
        Self::new(["api", "hr", "employees"])
    }

    /// `dispatch`, `returns`, `stock` or `reports`.
    pub fn warehouse(section: &str) -> Self {
        Self::new(["api", "warehouse", section])
    }
}
