use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use rigit_app_core::{
    AppKernel, ContractRowVm, ContractScope, EnquiryRowVm, EntityView, InvoiceRowVm, LeadPipelineSummary,
    LeadRowVm, LeadScope, QuotationRowVm, QuotationScope, RentalRowVm, SalesOrderRowVm, ViewSpec,
};
use rigit_config::{ConfigDir, Settings};
use rigit_core::{
    ContractPatch, EnquiryDraft, EnquiryStatus, LeadDraft, LeadStatus, PublicEnquiryForm,
    PublicEnquiryReceipt,
};
use rigit_infra::FileCredentialStore;
use serde_json::Value;
use tracing::debug;

use crate::render::{self, ConsoleNotifier};
use crate::{CliContractScope, CliLeadScope, CliList, CliQuotationScope, CliReference};

/// `--config-dir` if given, the platform directory otherwise.
pub fn config_dir(explicit: Option<Utf8PathBuf>) -> Result<ConfigDir> {
    match explicit {
        Some(root) => Ok(ConfigDir::at(root)),
        None => ConfigDir::platform(),
    }
}

/// Settings from disk, then the environment, then `--base-url`.
pub fn load_settings(dir: &ConfigDir, base_url: Option<String>) -> Result<Settings> {
    Ok(Settings::load(dir)?
        .with_env_overrides()
        .with_base_url_override(base_url))
}

pub fn open_kernel(dir: &ConfigDir, base_url: Option<String>) -> Result<AppKernel> {
    let settings = load_settings(dir, base_url)?;
    let credentials = FileCredentialStore::shared(dir.clone());
    AppKernel::new(settings, credentials, Arc::new(ConsoleNotifier))
        .context("Failed to set up the API client")
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn load<S: ViewSpec>(view: &EntityView<S>) -> Result<()> {
    let pb = spinner(format!("Loading {}...", view.kind()));
    let outcome = view.load().await;
    pb.finish_and_clear();
    outcome?;
    Ok(())
}

fn filtered<S: ViewSpec>(view: &EntityView<S>, filter: Option<&str>) -> Vec<S::Item> {
    match filter {
        Some(query) => view.apply_filter(query),
        None => view.items(),
    }
}

pub fn cmd_login(kernel: &AppKernel, token: &str) -> Result<()> {
    kernel.login(token)?;
    println!(":: Token stored.");
    Ok(())
}

pub fn cmd_logout(kernel: &AppKernel) -> Result<()> {
    kernel.logout()?;
    println!(":: Logged out.");
    Ok(())
}

pub fn cmd_config_show(dir: &ConfigDir, settings: &Settings) -> Result<()> {
    println!(":: Config directory: {}", dir.root());
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

/// Fields `config set` may change; unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub api_base_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub dispatch_delay_ms: Option<u64>,
    pub quotation_validity_days: Option<u32>,
    pub default_rental_duration_days: Option<u32>,
}

pub fn cmd_config_set(dir: &ConfigDir, update: SettingsUpdate) -> Result<Settings> {
    let mut settings = Settings::load(dir)?;
    if let Some(url) = update.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(v) = update.http_timeout_secs {
        settings.http_timeout_secs = v;
    }
    if let Some(v) = update.refresh_interval_secs {
        settings.refresh_interval_secs = v;
    }
    if let Some(v) = update.dispatch_delay_ms {
        settings.dispatch_delay_ms = v;
    }
    if let Some(v) = update.quotation_validity_days {
        settings.quotation_validity_days = v;
    }
    if let Some(v) = update.default_rental_duration_days {
        settings.default_rental_duration_days = v;
    }
    settings.save(dir)?;
    println!(":: Saved {}", dir.settings_path());
    Ok(settings)
}

pub async fn cmd_leads(
    kernel: &AppKernel,
    scope: CliLeadScope,
    filter: Option<&str>,
) -> Result<Vec<LeadRowVm>> {
    let view = kernel.leads(scope.into());
    load(&view).await?;
    let rows: Vec<LeadRowVm> = filtered(&view, filter).iter().map(LeadRowVm::from).collect();
    println!("{}", render::leads_table(&rows));
    Ok(rows)
}

pub async fn cmd_leads_summary(
    kernel: &AppKernel,
    scope: CliLeadScope,
) -> Result<LeadPipelineSummary> {
    let view = kernel.leads(scope.into());
    load(&view).await?;
    let summary = LeadPipelineSummary::from_leads(&view.items());
    println!("{}", render::pipeline_summary(&summary));
    Ok(summary)
}

pub async fn cmd_lead_status(kernel: &AppKernel, lead_id: &str, status: &str) -> Result<()> {
    let view = kernel.leads(LeadScope::All);
    load(&view).await?;
    view.set_status(lead_id, LeadStatus::parse(status)).await?;
    Ok(())
}

pub async fn cmd_lead_add(kernel: &AppKernel, draft: &LeadDraft) -> Result<Option<String>> {
    let id = kernel.leads(LeadScope::All).create(draft).await?;
    if let Some(id) = &id {
        println!(":: Created lead {id}");
    }
    Ok(id)
}

/// The landing page form. Works without a stored token.
pub async fn cmd_enquire(
    kernel: &AppKernel,
    form: &PublicEnquiryForm,
) -> Result<PublicEnquiryReceipt> {
    let pb = spinner("Submitting enquiry...".to_string());
    let receipt = kernel.leads(LeadScope::All).submit_public_enquiry(form).await;
    pb.finish_and_clear();
    let receipt = receipt?;
    if let Some(id) = &receipt.enquiry_id {
        println!(":: Enquiry reference: {id}");
    }
    Ok(receipt)
}

pub async fn cmd_enquiries(kernel: &AppKernel, filter: Option<&str>) -> Result<Vec<EnquiryRowVm>> {
    let view = kernel.enquiries();
    load(&view).await?;
    let rows: Vec<EnquiryRowVm> = filtered(&view, filter).iter().map(EnquiryRowVm::from).collect();
    println!("{}", render::enquiries_table(&rows));
    Ok(rows)
}

pub async fn cmd_enquiry_add(kernel: &AppKernel, draft: &EnquiryDraft) -> Result<Option<String>> {
    let id = kernel.enquiries().create(draft).await?;
    if let Some(id) = &id {
        println!(":: Created enquiry {id}");
    }
    Ok(id)
}

pub async fn cmd_enquiry_status(kernel: &AppKernel, enquiry_id: &str, status: &str) -> Result<()> {
    let view = kernel.enquiries();
    load(&view).await?;
    view.update_status(enquiry_id, EnquiryStatus::parse(status)).await?;
    Ok(())
}

/// Turns an enquiry into a quotation with the default placeholder line and
/// sends it for approval.
pub async fn cmd_enquiry_quote(kernel: &AppKernel, enquiry_id: &str) -> Result<Option<String>> {
    let enquiries = kernel.enquiries();
    load(&enquiries).await?;
    let seed = enquiries.convert_to_quotation(enquiry_id)?;

    let quotations = kernel.quotations(QuotationScope::Sales);
    let draft = quotations.draft_from_seed(&seed);
    debug!(enquiry_id, total = draft.total_amount(), "quotation drafted");
    let id = quotations.create(&draft).await?;
    if let Some(id) = &id {
        println!(":: Quotation {id} created for {enquiry_id}");
    }
    Ok(id)
}

pub async fn cmd_quotations(
    kernel: &AppKernel,
    scope: CliQuotationScope,
    filter: Option<&str>,
) -> Result<Vec<QuotationRowVm>> {
    let view = kernel.quotations(scope.into());
    load(&view).await?;
    let rows: Vec<QuotationRowVm> = filtered(&view, filter)
        .iter()
        .map(QuotationRowVm::from)
        .collect();
    println!("{}", render::quotations_table(&rows));
    Ok(rows)
}

pub async fn cmd_quotation_send(kernel: &AppKernel, quotation_id: &str) -> Result<()> {
    kernel
        .quotations(QuotationScope::Sales)
        .send(quotation_id)
        .await?;
    Ok(())
}

pub async fn cmd_quotation_approve(kernel: &AppKernel, quotation_id: &str) -> Result<Option<String>> {
    let order = kernel
        .quotations(QuotationScope::PendingApproval)
        .approve(quotation_id)
        .await?;
    if let Some(order) = &order {
        println!(":: Sales order {order} created");
    }
    Ok(order)
}

pub async fn cmd_quotation_reject(kernel: &AppKernel, quotation_id: &str) -> Result<()> {
    kernel
        .quotations(QuotationScope::PendingApproval)
        .reject(quotation_id)
        .await?;
    Ok(())
}

pub async fn cmd_orders(kernel: &AppKernel, filter: Option<&str>) -> Result<Vec<SalesOrderRowVm>> {
    let view = kernel.sales_orders();
    load(&view).await?;
    let rows: Vec<SalesOrderRowVm> = filtered(&view, filter)
        .iter()
        .map(SalesOrderRowVm::from)
        .collect();
    println!("{}", render::orders_table(&rows));
    Ok(rows)
}

pub async fn cmd_order_check_stock(kernel: &AppKernel, order_id: &str) -> Result<bool> {
    let view = kernel.sales_orders();
    load(&view).await?;
    Ok(view.check_stock(order_id).await?)
}

/// The order list is loaded first so the stock-check gate sees the row.
pub async fn cmd_order_create_contract(kernel: &AppKernel, order_id: &str) -> Result<Option<String>> {
    let view = kernel.sales_orders();
    load(&view).await?;
    let contract = view.create_contract(order_id).await?;
    if let Some(contract) = &contract {
        println!(":: Contract {contract} awaiting approval");
    }
    Ok(contract)
}

pub async fn cmd_contracts(
    kernel: &AppKernel,
    scope: CliContractScope,
    filter: Option<&str>,
) -> Result<Vec<ContractRowVm>> {
    let view = kernel.contracts(scope.into());
    load(&view).await?;
    let rows: Vec<ContractRowVm> = filtered(&view, filter)
        .iter()
        .map(ContractRowVm::from)
        .collect();
    println!("{}", render::contracts_table(&rows));
    Ok(rows)
}

pub async fn cmd_contract_approve(kernel: &AppKernel, contract_id: &str) -> Result<Option<String>> {
    let view = kernel.contracts(ContractScope::All);
    load(&view).await?;
    Ok(view.approve(contract_id).await?)
}

pub async fn cmd_contract_reject(kernel: &AppKernel, contract_id: &str) -> Result<()> {
    let view = kernel.contracts(ContractScope::All);
    load(&view).await?;
    view.reject(contract_id).await?;
    Ok(())
}

pub async fn cmd_contract_edit(
    kernel: &AppKernel,
    contract_id: &str,
    patch: &ContractPatch,
) -> Result<()> {
    let view = kernel.contracts(ContractScope::All);
    load(&view).await?;
    view.edit(contract_id, patch).await?;
    Ok(())
}

pub async fn cmd_contract_delete(kernel: &AppKernel, contract_id: &str) -> Result<()> {
    let view = kernel.contracts(ContractScope::All);
    load(&view).await?;
    view.delete(contract_id).await?;
    Ok(())
}

pub async fn cmd_rentals(kernel: &AppKernel, filter: Option<&str>) -> Result<Vec<RentalRowVm>> {
    let view = kernel.rentals();
    load(&view).await?;
    let rows: Vec<RentalRowVm> = filtered(&view, filter).iter().map(RentalRowVm::from).collect();
    println!("{}", render::rentals_table(&rows));
    Ok(rows)
}

/// Prints one of the read-only reference lists as returned by the backend.
pub async fn cmd_reference(kernel: &AppKernel, list: CliReference) -> Result<Vec<Value>> {
    let endpoint = list.endpoint();
    let pb = spinner(format!("Loading {}...", endpoint.path()));
    let fetched = kernel.dispatcher().fetch_list::<Value>(&endpoint).await;
    pb.finish_and_clear();
    let rows = fetched.inspect_err(|e| kernel.dispatcher().report("Loading reference list", e))?;
    debug!(path = %endpoint.path(), count = rows.len(), "reference list loaded");
    println!("{}", render::json_table(&rows));
    Ok(rows)
}

pub async fn cmd_invoices(kernel: &AppKernel, filter: Option<&str>) -> Result<Vec<InvoiceRowVm>> {
    let view = kernel.invoices();
    load(&view).await?;
    let rows: Vec<InvoiceRowVm> = filtered(&view, filter)
        .iter()
        .map(InvoiceRowVm::from)
        .collect();
    println!("{}", render::invoices_table(&rows));
    Ok(rows)
}

/// Keeps a list on screen, re-rendering whenever a load lands, until Ctrl-C.
pub async fn cmd_watch(kernel: &AppKernel, list: CliList, interval: Option<Duration>) -> Result<()> {
    let interval = interval.unwrap_or_else(|| kernel.settings().refresh_interval());
    println!(":: Watching {list:?} every {}s (Ctrl-C to stop)", interval.as_secs());

    match list {
        CliList::Leads => {
            watch_view(kernel.leads(LeadScope::Assigned), interval, |items| {
                render::leads_table(&items.iter().map(LeadRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Enquiries => {
            watch_view(kernel.enquiries(), interval, |items| {
                render::enquiries_table(&items.iter().map(EnquiryRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Quotations => {
            watch_view(kernel.quotations(QuotationScope::Sales), interval, |items| {
                render::quotations_table(&items.iter().map(QuotationRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Orders => {
            watch_view(kernel.sales_orders(), interval, |items| {
                render::orders_table(&items.iter().map(SalesOrderRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Contracts => {
            watch_view(kernel.contracts(ContractScope::All), interval, |items| {
                render::contracts_table(&items.iter().map(ContractRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Rentals => {
            watch_view(kernel.rentals(), interval, |items| {
                render::rentals_table(&items.iter().map(RentalRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
        CliList::Invoices => {
            watch_view(kernel.invoices(), interval, |items| {
                render::invoices_table(&items.iter().map(InvoiceRowVm::from).collect::<Vec<_>>())
            })
            .await
        }
    }
}

async fn watch_view<S, F>(view: EntityView<S>, interval: Duration, draw: F) -> Result<()>
where
    S: ViewSpec,
    F: Fn(&[S::Item]) -> String,
{
    let mounted = view.mount(interval).await;
    let mut shown: Option<(u64, Option<String>)> = None;
    let mut tick = tokio::time::interval(Duration::from_millis(250));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tick.tick() => {
                let state = view.state();
                let marker = (state.loads_applied, state.last_error.clone());
                if shown.as_ref() == Some(&marker) {
                    continue;
                }
                println!("\n{}", draw(&state.items));
                if let Some(error) = &state.last_error {
                    eprintln!("error: {error}");
                }
                shown = Some(marker);
            }
        }
    }

    mounted.unmount().await;
    println!(":: Stopped.");
    Ok(())
}
