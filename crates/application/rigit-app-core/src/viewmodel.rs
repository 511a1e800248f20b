use std::collections::BTreeMap;

use rigit_core::{
    Contract, Enquiry, Invoice, Lead, LeadStatus, Quotation, Rental, SalesOrder, StatusBadge,
};

fn format_amount(currency: &str, amount: f64) -> String {
    format!("{currency} {amount:.2}")
}

const DEFAULT_CURRENCY: &str = "AED";

#[derive(Debug, Clone, PartialEq)]
pub struct LeadRowVm {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub assigned_to: String,
    pub status: StatusBadge,
}

impl From<&Lead> for LeadRowVm {
    fn from(l: &Lead) -> Self {
        Self {
            id: l.lead_id.clone(),
            name: l.display_name(),
            email: l.email.clone(),
            organization: l.organization.clone().unwrap_or_default(),
            assigned_to: l
                .assigned_salesperson_name
                .clone()
                .unwrap_or_else(|| "Unassigned".into()),
            status: l.status.badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnquiryRowVm {
    pub id: String,
    pub customer: String,
    pub equipment: String,
    pub quantity: u32,
    pub duration: String,
    pub delivery_location: String,
    pub status: StatusBadge,
}

impl From<&Enquiry> for EnquiryRowVm {
    fn from(e: &Enquiry) -> Self {
        Self {
            id: e.enquiry_id.clone(),
            customer: e.customer_name.clone(),
            equipment: e.equipment_name.clone(),
            quantity: e.quantity,
            duration: e
                .rental_duration_days
                .map(|d| format!("{d} days"))
                .unwrap_or_default(),
            delivery_location: e.delivery_location.clone().unwrap_or_default(),
            status: e.status.badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotationRowVm {
    pub id: String,
    pub customer: String,
    pub project: String,
    pub item_count: usize,
    pub total: String,
    pub valid_until: String,
    pub status: StatusBadge,
}

impl From<&Quotation> for QuotationRowVm {
    fn from(q: &Quotation) -> Self {
        Self {
            id: q.quotation_id.clone(),
            customer: q.customer_name.clone(),
            project: q.project.clone(),
            item_count: q.items.len(),
            total: format_amount(DEFAULT_CURRENCY, q.total_amount),
            valid_until: q.valid_until.clone().unwrap_or_default(),
            status: q.status.badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesOrderRowVm {
    pub id: String,
    pub quotation_id: String,
    pub customer: String,
    pub total: String,
    pub stock: &'static str,
    pub status: StatusBadge,
    /// Shown instead of the create-contract button while it is blocked.
    pub contract_blocker: Option<String>,
}

impl From<&SalesOrder> for SalesOrderRowVm {
    fn from(o: &SalesOrder) -> Self {
        let stock = match (o.stock_checked, o.stock_available) {
            (false, _) => "Not checked",
            (true, Some(true)) => "In stock",
            (true, Some(false)) => "Out of stock",
            (true, None) => "Checked",
        };
        Self {
            id: o.sales_order_id.clone(),
            quotation_id: o.quotation_id.clone().unwrap_or_default(),
            customer: o.customer_name.clone(),
            total: format_amount(DEFAULT_CURRENCY, o.total_amount),
            stock,
            status: o.status.badge(),
            contract_blocker: o.contract_blocker(),
        }
    }
}

/// Contract row; approval and lifecycle render as separate badges.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRowVm {
    pub id: String,
    pub customer: String,
    pub project: String,
    pub period: String,
    pub amount: String,
    pub approval: StatusBadge,
    pub lifecycle: StatusBadge,
    pub invoice_id: Option<String>,
}

impl From<&Contract> for ContractRowVm {
    fn from(c: &Contract) -> Self {
        let period = match (&c.start_date, &c.end_date) {
            (Some(start), Some(end)) => format!("{start} to {end}"),
            (Some(start), None) => format!("from {start}"),
            (None, Some(end)) => format!("until {end}"),
            (None, None) => String::new(),
        };
        Self {
            id: c.contract_id.clone(),
            customer: c.customer.clone(),
            project: c.project.clone().unwrap_or_default(),
            period,
            amount: format_amount(DEFAULT_CURRENCY, c.amount),
            approval: c.approval_status.badge(),
            lifecycle: c.status.badge(),
            invoice_id: c.invoice_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentalRowVm {
    pub id: String,
    pub equipment: String,
    pub quantity: u32,
    pub period: String,
    pub status: StatusBadge,
}

impl From<&Rental> for RentalRowVm {
    fn from(r: &Rental) -> Self {
        Self {
            id: r.id.clone(),
            equipment: r.equipment_name.clone(),
            quantity: r.quantity,
            period: match (&r.start_date, &r.end_date) {
                (Some(start), Some(end)) => format!("{start} to {end}"),
                _ => String::new(),
            },
            status: r.status.badge(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRowVm {
    pub id: String,
    pub customer: String,
    pub contract_id: String,
    pub total: String,
    pub due_date: String,
    pub status: StatusBadge,
}

impl From<&Invoice> for InvoiceRowVm {
    fn from(i: &Invoice) -> Self {
        Self {
            id: i.invoice_id.clone(),
            customer: i.customer_name.clone(),
            contract_id: i.contract_id.clone().unwrap_or_default(),
            total: format_amount(&i.currency, i.total),
            due_date: i.due_date.clone().unwrap_or_default(),
            status: i.status.badge(),
        }
    }
}

/// Lead counts per status for the CRM pipeline header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPipelineSummary {
    /// Status label -> count. Leads without a status count as `New`.
    pub by_status: BTreeMap<String, usize>,
    pub total: usize,
    /// Everything that is neither won nor lost.
    pub active: usize,
}

impl LeadPipelineSummary {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let mut summary = Self {
            total: leads.len(),
            ..Self::default()
        };
        for lead in leads {
            *summary
                .by_status
                .entry(lead.status.label())
                .or_insert(0) += 1;
            if lead.status.is_open() {
                summary.active += 1;
            }
        }
        summary
    }

    pub fn count(&self, status: &LeadStatus) -> usize {
        self.by_status.get(&status.label()).copied().unwrap_or(0)
    }
}
