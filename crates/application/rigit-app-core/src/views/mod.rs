//! One module per entity kind: the list it reads and the row actions it
//! offers.

pub mod contracts;
pub mod enquiries;
pub mod invoices;
pub mod leads;
pub mod quotations;
pub mod rentals;
pub mod sales_orders;

pub use contracts::{ContractScope, Contracts, ContractsView};
pub use enquiries::{Enquiries, EnquiriesView};
pub use invoices::{Invoices, InvoicesView};
pub use leads::{LeadScope, Leads, LeadsView};
pub use quotations::{QuotationScope, Quotations, QuotationsView};
pub use rentals::{Rentals, RentalsView};
pub use sales_orders::{SalesOrders, SalesOrdersView};
