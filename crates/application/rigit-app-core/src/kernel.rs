use std::sync::Arc;

use chrono::Utc;
use rigit_config::Settings;
use rigit_infra::{ApiClient, ApiError, CredentialStore};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::bus::{NotificationBus, Subscription};
use crate::dispatcher::ActionDispatcher;
use crate::ports::Notifier;
use crate::topics::Topic;
use crate::view::{EntityView, ViewContext};
use crate::views::{
    ContractScope, Contracts, ContractsView, Enquiries, EnquiriesView, Invoices, InvoicesView,
    LeadScope, Leads, LeadsView, QuotationScope, Quotations, QuotationsView, Rentals,
    RentalsView, SalesOrders, SalesOrdersView,
};

/// One per process. Owns the client, the bus and the dispatcher, and builds
/// every view from them.
pub struct AppKernel {
    settings: Arc<Settings>,
    client: ApiClient,
    bus: NotificationBus,
    dispatcher: ActionDispatcher,
    _relays: Vec<Subscription>,
}

impl AppKernel {
    pub fn new(
        settings: Settings,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let client = ApiClient::new(&settings, credentials)?;
        let bus = NotificationBus::new();
        let dispatcher = ActionDispatcher::new(client.clone(), notifier);
        let settings = Arc::new(settings);

        let relays = vec![quotation_relay(&bus, &settings)];
        info!(base_url = %client.base_url(), "kernel ready");

        Ok(Self {
            settings,
            client,
            bus,
            dispatcher,
            _relays: relays,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn context(&self) -> ViewContext {
        ViewContext {
            dispatcher: self.dispatcher.clone(),
            bus: self.bus.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn leads(&self, scope: LeadScope) -> LeadsView {
        EntityView::new(Leads { scope }, self.context())
    }

    pub fn enquiries(&self) -> EnquiriesView {
        EntityView::new(Enquiries, self.context())
    }

    pub fn quotations(&self, scope: QuotationScope) -> QuotationsView {
        EntityView::new(Quotations { scope }, self.context())
    }

    pub fn sales_orders(&self) -> SalesOrdersView {
        EntityView::new(SalesOrders, self.context())
    }

    pub fn contracts(&self, scope: ContractScope) -> ContractsView {
        EntityView::new(Contracts { scope }, self.context())
    }

    pub fn rentals(&self) -> RentalsView {
        EntityView::new(Rentals, self.context())
    }

    pub fn invoices(&self) -> InvoicesView {
        EntityView::new(Invoices, self.context())
    }

    /// Stores a bearer token obtained elsewhere.
    pub fn login(&self, token: &str) -> anyhow::Result<()> {
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("token must not be empty");
        }
        self.client.credentials().store(token)
    }

    pub fn logout(&self) -> anyhow::Result<()> {
        self.client.credentials().clear()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// The dashboard refresh button: every mounted view re-fetches.
    pub fn refresh_all(&self) {
        self.bus.publish(Topic::RefreshLeads, None);
        self.bus.publish(Topic::RefreshEnquiries, None);
        self.bus.publish(Topic::RefreshAll, None);
        self.bus.publish(
            Topic::GlobalRefresh,
            Some(json!({ "timestamp": Utc::now().to_rfc3339() })),
        );
    }
}

/// Re-publishes `convertToQuotation` as `openQuotationFromEnquiry` once the
/// dispatch delay has passed, so the quotation form opens after the tab
/// switch.
fn quotation_relay(bus: &NotificationBus, settings: &Settings) -> Subscription {
    let delay = settings.dispatch_delay();
    let relay_bus = bus.clone();
    bus.subscribe(Topic::ConvertToQuotation, move |note| {
        let payload = note.payload.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(_) => {
                debug!(?delay, "relaying enquiry to the quotation form");
                drop(relay_bus.publish_after(delay, Topic::OpenQuotationFromEnquiry, payload));
            }
            Err(_) => {
                warn!("no async runtime; relaying enquiry without delay");
                relay_bus.publish(Topic::OpenQuotationFromEnquiry, payload);
            }
        }
        Ok(())
    })
}
