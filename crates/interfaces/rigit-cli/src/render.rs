//! Plain-text tables and notices for the terminal.

use rigit_app_core::{
    ContractRowVm, EnquiryRowVm, InvoiceRowVm, LeadPipelineSummary, LeadRowVm, NoticeLevel,
    Notifier, QuotationRowVm, RentalRowVm, SalesOrderRowVm, UserNotice,
};
use rigit_core::{Emphasis, StatusBadge};
use serde_json::Value;

pub fn badge(b: &StatusBadge) -> String {
    let marker = match b.emphasis {
        Emphasis::Positive => "[+]",
        Emphasis::Warning => "[!]",
        Emphasis::Negative => "[x]",
        Emphasis::Neutral => "[ ]",
    };
    format!("{marker} {}", b.label)
}

fn pad_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Left-aligned columns, two spaces apart.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();

    let mut out = pad_line(headers, &widths);
    out.push('\n');
    out.push_str(&pad_line(&rule, &widths));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push('\n');
        out.push_str(&pad_line(&cells, &widths));
    }
    out
}

pub fn leads_table(rows: &[LeadRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.name.clone(),
                r.email.clone(),
                r.organization.clone(),
                r.assigned_to.clone(),
                badge(&r.status),
            ]
        })
        .collect();
    table(&["ID", "NAME", "EMAIL", "ORGANIZATION", "ASSIGNED", "STATUS"], &body)
}

pub fn pipeline_summary(summary: &LeadPipelineSummary) -> String {
    let mut out = format!("{} leads, {} active", summary.total, summary.active);
    for (status, count) in &summary.by_status {
        out.push_str(&format!("\n  {status:<16} {count}"));
    }
    out
}

pub fn enquiries_table(rows: &[EnquiryRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.customer.clone(),
                r.equipment.clone(),
                r.quantity.to_string(),
                r.duration.clone(),
                r.delivery_location.clone(),
                badge(&r.status),
            ]
        })
        .collect();
    table(
        &["ID", "CUSTOMER", "EQUIPMENT", "QTY", "DURATION", "DELIVERY", "STATUS"],
        &body,
    )
}

pub fn quotations_table(rows: &[QuotationRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.customer.clone(),
                r.project.clone(),
                r.item_count.to_string(),
                r.total.clone(),
                r.valid_until.clone(),
                badge(&r.status),
            ]
        })
        .collect();
    table(
        &["ID", "CUSTOMER", "PROJECT", "ITEMS", "TOTAL", "VALID UNTIL", "STATUS"],
        &body,
    )
}

pub fn orders_table(rows: &[SalesOrderRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.quotation_id.clone(),
                r.customer.clone(),
                r.total.clone(),
                r.stock.to_string(),
                badge(&r.status),
            ]
        })
        .collect();
    table(
        &["ID", "QUOTATION", "CUSTOMER", "TOTAL", "STOCK", "STATUS"],
        &body,
    )
}

pub fn contracts_table(rows: &[ContractRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.customer.clone(),
                r.project.clone(),
                r.period.clone(),
                r.amount.clone(),
                badge(&r.approval),
                badge(&r.lifecycle),
                r.invoice_id.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["ID", "CUSTOMER", "PROJECT", "PERIOD", "AMOUNT", "APPROVAL", "STATUS", "INVOICE"],
        &body,
    )
}

pub fn rentals_table(rows: &[RentalRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.equipment.clone(),
                r.quantity.to_string(),
                r.period.clone(),
                badge(&r.status),
            ]
        })
        .collect();
    table(&["ID", "EQUIPMENT", "QTY", "PERIOD", "STATUS"], &body)
}

pub fn invoices_table(rows: &[InvoiceRowVm]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.customer.clone(),
                r.contract_id.clone(),
                r.total.clone(),
                r.due_date.clone(),
                badge(&r.status),
            ]
        })
        .collect();
    table(
        &["ID", "CUSTOMER", "CONTRACT", "TOTAL", "DUE", "STATUS"],
        &body,
    )
}

fn scalar_cell(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Table for rows of unknown shape. Columns are the scalar keys in the
/// order they first appear; nested values are left out.
pub fn json_table(rows: &[Value]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        let Value::Object(fields) = row else { continue };
        for (key, value) in fields {
            if scalar_cell(value).is_some() && !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    if columns.is_empty() {
        return "No records.".to_string();
    }

    let headers: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).and_then(scalar_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    table(&headers, &cells)
}

/// Prints notices on stderr so tables on stdout stay pipeable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: UserNotice) {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("{tag}: {}: {}", notice.title, notice.message);
    }
}
