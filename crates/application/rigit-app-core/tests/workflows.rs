use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::Path;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Duration as Days, Local};
use rigit_app_core::{
    ActionError, AppKernel, ContractScope, LeadScope, MemoryNotifier, NoticeLevel, Notifier,
    QuotationScope, Topic,
};
use rigit_config::Settings;
use rigit_core::{ContractPatch, LeadStatus, NewQuotationItem, QuotationDraft};
use rigit_infra::MemoryCredentialStore;
use serde_json::{json, Value};

#[derive(Default)]
struct Backend {
    requests: Mutex<Vec<(String, Value)>>,
    create_contract_calls: AtomicUsize,
    pending_quotation_hits: AtomicUsize,
}

impl Backend {
    fn record(&self, what: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push((what.into(), body));
    }

    fn bodies(&self, what: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(w, _)| w == what)
            .map(|(_, b)| b.clone())
            .collect()
    }
}

async fn start_backend(backend: Arc<Backend>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route(
            "/api/sales/orders",
            get(|| async {
                Json(json!([{
                    "sales_order_id": "SO-2025-001",
                    "quotation_id": "QT-2025-001",
                    "customer_name": "Gulf Build",
                    "status": "approved",
                    "stock_checked": false
                }]))
            }),
        )
        .route(
            "/api/sales/orders/:id/check-stock",
            put({
                let backend = backend.clone();
                move |Path(id): Path<String>| async move {
                    backend.record(format!("check-stock {id}"), Value::Null);
                    Json(json!({"stock_available": true}))
                }
            }),
        )
        .route(
            "/api/sales/orders/:id/create-contract",
            put({
                let backend = backend.clone();
                move |Path(_id): Path<String>| async move {
                    backend.create_contract_calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"message": "Contract request created", "contract_id": "RC-2025-002"}))
                }
            }),
        )
        .route(
            "/api/sales/quotations",
            post({
                let backend = backend.clone();
                move |Json(body): Json<Value>| async move {
                    backend.record("create-quotation", body);
                    Json(json!({"quotation_id": "QT-2025-007"}))
                }
            })
            .get(|| async { Json(json!([])) }),
        )
        .route(
            "/api/sales/enquiries/:id/status",
            put({
                let backend = backend.clone();
                move |Path(id): Path<String>, Json(body): Json<Value>| async move {
                    backend.record(format!("enquiry-status {id}"), body);
                    Json(json!({"message": "updated"}))
                }
            }),
        )
        .route(
            "/api/crm/leads",
            get(|| async {
                Json(json!([{"lead_id": "LEAD-001", "firstName": "Amira", "status": "Contacted"}]))
            }),
        )
        .route(
            "/api/crm/leads/:id/status",
            put({
                let backend = backend.clone();
                move |Path(id): Path<String>, Json(body): Json<Value>| async move {
                    backend.record(format!("lead-status {id}"), body);
                    Json(json!({"message": "ok"}))
                }
            }),
        )
        .route(
            "/api/sales/quotations/:id/send",
            put({
                let backend = backend.clone();
                move |Path(id): Path<String>| async move {
                    backend.record(format!("send-quotation {id}"), Value::Null);
                    Json(json!({"message": "sent"}))
                }
            }),
        )
        .route(
            "/api/admin/quotations/pending",
            get({
                let backend = backend.clone();
                move || async move {
                    backend.pending_quotation_hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!([]))
                }
            }),
        )
        .route(
            "/api/contracts/:id",
            put({
                let backend = backend.clone();
                move |Path(id): Path<String>, Json(body): Json<Value>| async move {
                    backend.record(format!("edit-contract {id}"), body);
                    Json(json!({"message": "updated"}))
                }
            })
            .delete({
                let backend = backend.clone();
                move |Path(id): Path<String>| async move {
                    backend.record(format!("delete-contract {id}"), Value::Null);
                    Json(json!({"message": "deleted"}))
                }
            }),
        )
        .route("/api/contracts/", get(|| async { Json(json!([])) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn kernel_for(addr: SocketAddr, notifier: Arc<MemoryNotifier>) -> AppKernel {
    let settings = Settings {
        api_base_url: format!("http://{addr}"),
        ..Settings::default()
    };
    let notifier: Arc<dyn Notifier> = notifier;
    AppKernel::new(
        settings,
        Arc::new(MemoryCredentialStore::with_token("good-token")),
        notifier,
    )
    .unwrap()
}

#[tokio::test]
async fn contract_request_waits_for_a_stock_check() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let notifier = Arc::new(MemoryNotifier::new());
    let kernel = kernel_for(addr, notifier.clone());
    let orders = kernel.sales_orders();
    orders.load().await.unwrap();

    let err = orders.create_contract("SO-2025-001").await.unwrap_err();
    assert!(matches!(err, ActionError::NotAllowed(ref m) if m.contains("check stock")));
    assert_eq!(backend.create_contract_calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);

    assert!(orders.check_stock("SO-2025-001").await.unwrap());
    let order = orders.find("SO-2025-001").unwrap();
    assert!(order.stock_checked);
    assert_eq!(order.stock_available, Some(true));

    let contract_id = orders.create_contract("SO-2025-001").await.unwrap();
    assert_eq!(contract_id.as_deref(), Some("RC-2025-002"));
    assert_eq!(backend.create_contract_calls.load(Ordering::SeqCst), 1);

    server.abort();
}

#[tokio::test]
async fn unknown_order_cannot_request_a_contract() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));

    let err = kernel
        .sales_orders()
        .create_contract("SO-404")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Sales Order SO-404 is not loaded");
    assert_eq!(backend.create_contract_calls.load(Ordering::SeqCst), 0);

    server.abort();
}

#[tokio::test]
async fn quotation_from_enquiry_is_sent_and_marks_the_enquiry() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));
    let quotations = kernel.quotations(QuotationScope::Sales);

    let mut draft = QuotationDraft::new();
    draft.customer_name = "Gulf Build".into();
    draft.company = "Gulf Build LLC".into();
    draft.project = "Marina Tower".into();
    draft.enquiry_id = Some("ENQ-2025-001".into());
    draft.add_item(&NewQuotationItem {
        equipment: "Cuplock".into(),
        length: 4.0,
        breadth: 5.0,
        rate_per_sqft: 10.0,
        wastage_charges: 0.0,
        cutting_charges: 0.0,
    });

    let id = quotations.create(&draft).await.unwrap();
    assert_eq!(id.as_deref(), Some("QT-2025-007"));

    let created = backend.bodies("create-quotation");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["status"], "sent");
    assert_eq!(created[0]["totalAmount"], 200.0);
    let valid_until = (Local::now().date_naive() + Days::days(10))
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(created[0]["validUntil"], valid_until);

    assert_eq!(
        backend.bodies("enquiry-status ENQ-2025-001"),
        vec![json!({"status": "quotation_created"})]
    );

    server.abort();
}

#[tokio::test]
async fn empty_quotation_is_not_sent() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));

    let err = kernel
        .quotations(QuotationScope::Sales)
        .create(&QuotationDraft::new())
        .await
        .unwrap_err();
    let ActionError::Validation { missing } = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert!(missing.contains(&"items".to_string()));
    assert!(backend.bodies("create-quotation").is_empty());

    server.abort();
}

#[tokio::test]
async fn lead_status_change_is_applied_and_announced() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));
    let leads = kernel.leads(LeadScope::All);
    leads.load().await.unwrap();

    let updates: Arc<Mutex<Vec<Value>>> = Arc::default();
    let _sub = kernel.bus().subscribe(Topic::LeadUpdated, {
        let updates = updates.clone();
        move |note| {
            updates.lock().unwrap().extend(note.payload.clone());
            Ok(())
        }
    });

    leads.set_status("LEAD-001", LeadStatus::Qualified).await.unwrap();

    assert_eq!(
        backend.bodies("lead-status LEAD-001"),
        vec![json!({"status": "Qualified"})]
    );
    assert_eq!(
        *updates.lock().unwrap(),
        vec![json!({"lead_id": "LEAD-001", "status": "Qualified"})]
    );

    server.abort();
}

#[tokio::test]
async fn empty_contract_patch_is_rejected_locally() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));

    let err = kernel
        .contracts(ContractScope::All)
        .edit("RC-2025-001", &ContractPatch::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ActionError::Validation {
            missing: vec!["any field".into()]
        }
    );

    server.abort();
}

fn record_topic(kernel: &AppKernel, topic: Topic, seen: &Arc<Mutex<Vec<(Topic, Option<Value>)>>>) -> rigit_app_core::Subscription {
    let seen = seen.clone();
    kernel.bus().subscribe(topic, move |note| {
        seen.lock().unwrap().push((note.topic, note.payload.clone()));
        Ok(())
    })
}

#[tokio::test]
async fn sending_a_quotation_refreshes_the_approval_queue() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));

    let seen = Arc::default();
    let _sent = record_topic(&kernel, Topic::QuotationSent, &seen);
    let queue = kernel.quotations(QuotationScope::PendingApproval);
    let _mounted = queue.mount(Duration::from_secs(3600)).await;
    assert_eq!(backend.pending_quotation_hits.load(Ordering::SeqCst), 1);

    kernel
        .quotations(QuotationScope::Sales)
        .send("QT-2025-007")
        .await
        .unwrap();

    assert_eq!(backend.bodies("send-quotation QT-2025-007").len(), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Topic::QuotationSent, Some(json!({"quotation_id": "QT-2025-007"})))]
    );
    let deadline = Instant::now() + Duration::from_secs(3);
    while backend.pending_quotation_hits.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(backend.pending_quotation_hits.load(Ordering::SeqCst) >= 2);

    server.abort();
}

#[tokio::test]
async fn contract_edit_and_delete_refresh_dependent_lists() {
    let backend = Arc::new(Backend::default());
    let (addr, server) = start_backend(backend.clone()).await;
    let kernel = kernel_for(addr, Arc::new(MemoryNotifier::new()));
    let contracts = kernel.contracts(ContractScope::All);

    let seen = Arc::default();
    let _refresh = record_topic(&kernel, Topic::RefreshAll, &seen);

    let patch = ContractPatch {
        amount: Some(1200.0),
        ..ContractPatch::default()
    };
    contracts.edit("RC-2025-001", &patch).await.unwrap();
    assert_eq!(
        backend.bodies("edit-contract RC-2025-001"),
        vec![json!({"amount": 1200.0})]
    );
    assert_eq!(seen.lock().unwrap().len(), 1);

    contracts.delete("RC-2025-001").await.unwrap();
    assert_eq!(backend.bodies("delete-contract RC-2025-001").len(), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Topic::RefreshAll, None), (Topic::RefreshAll, None)]
    );

    server.abort();
}
