use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use rigit_config::Settings;
use rigit_infra::{ApiClient, ApiError, ApiErrorKind, CredentialStore, Endpoint, MemoryCredentialStore};
use serde_json::{json, Value};

#[derive(Default)]
struct Seen {
    auth_headers: Mutex<Vec<Option<String>>>,
    lead_hits: AtomicUsize,
}

async fn start_mock_server(seen: Arc<Seen>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route(
            "/api/crm/leads",
            get({
                let seen = seen.clone();
                move |headers: HeaderMap| async move {
                    seen.lead_hits.fetch_add(1, Ordering::SeqCst);
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    seen.auth_headers.lock().unwrap().push(auth.clone());
                    if auth.as_deref() == Some("Bearer good-token") {
                        (
                            StatusCode::OK,
                            Json(json!([
                                {"lead_id": "LEAD-001", "firstName": "Amira", "email": "a@x.ae"},
                                "not-a-lead",
                                {"id": "LEAD-002", "name": "Omar"}
                            ])),
                        )
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token"})))
                    }
                }
            }),
        )
        .route(
            "/api/crm/leads/public",
            axum::routing::post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert!(headers.get("authorization").is_none());
                Json(json!({"lead_id": "LEAD-009", "enquiry_id": "ENQ-2025-100", "echo": body["firstName"]}))
            }),
        )
        .route(
            "/api/sales/orders/:id/check-stock",
            put(|Path(id): Path<String>| async move {
                if id == "SO-404" {
                    (StatusCode::NOT_FOUND, "{\"detail\": \"Sales order not found\"}".to_string())
                } else {
                    (StatusCode::OK, String::new())
                }
            }),
        )
        .route(
            "/api/rentals/",
            get(|| async { Json(Value::Null) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn client_for(addr: SocketAddr, store: Arc<dyn CredentialStore>) -> ApiClient {
    let settings = Settings {
        api_base_url: format!("http://{addr}"),
        ..Settings::default()
    };
    ApiClient::new(&settings, store).unwrap()
}

#[tokio::test]
async fn authenticated_list_sends_bearer_and_skips_bad_rows() {
    let seen = Arc::new(Seen::default());
    let (addr, server) = start_mock_server(seen.clone()).await;
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::with_token("good-token"));
    let client = client_for(addr, store);

    let leads: Vec<rows::LeadRow> = client.get_list(&Endpoint::leads()).await.unwrap();
    assert_eq!(leads.len(), 2);
    assert_eq!(leads[1].id.as_deref(), Some("LEAD-002"));
    assert_eq!(
        seen.auth_headers.lock().unwrap().as_slice(),
        &[Some("Bearer good-token".to_string())]
    );

    server.abort();
}

#[tokio::test]
async fn unauthorized_clears_the_credential_without_retry() {
    let seen = Arc::new(Seen::default());
    let (addr, server) = start_mock_server(seen.clone()).await;
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::with_token("expired"));
    let client = client_for(addr, store.clone());

    let err = client.get(&Endpoint::leads()).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(err.kind(), ApiErrorKind::Auth);
    assert!(store.load().is_none());
    assert_eq!(seen.lead_hits.load(Ordering::SeqCst), 1);

    // With the credential gone the next call fails locally.
    let err = client.get(&Endpoint::leads()).await.unwrap_err();
    assert_eq!(err, ApiError::MissingCredential);
    assert_eq!(seen.lead_hits.load(Ordering::SeqCst), 1);

    server.abort();
}

#[tokio::test]
async fn public_endpoint_works_without_credential() {
    let (addr, server) = start_mock_server(Arc::new(Seen::default())).await;
    let client = client_for(addr, Arc::new(MemoryCredentialStore::new()));

    let reply = client
        .post(&Endpoint::public_lead(), &json!({"firstName": "Omar"}))
        .await
        .unwrap();
    assert_eq!(reply["enquiry_id"], "ENQ-2025-100");
    assert_eq!(reply["echo"], "Omar");

    server.abort();
}

#[tokio::test]
async fn empty_success_body_is_null_and_errors_carry_detail() {
    let (addr, server) = start_mock_server(Arc::new(Seen::default())).await;
    let client = client_for(addr, Arc::new(MemoryCredentialStore::with_token("t")));

    let ok = client.put(&Endpoint::order_check_stock("SO-1"), None).await.unwrap();
    assert_eq!(ok, Value::Null);

    let err = client
        .put(&Endpoint::order_check_stock("SO-404"), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            message: "Sales order not found".into()
        }
    );

    let rentals: Vec<Value> = client.get_list(&Endpoint::rentals()).await.unwrap();
    assert!(rentals.is_empty());

    server.abort();
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Arc::new(MemoryCredentialStore::with_token("t")));
    let err = client.get(&Endpoint::leads()).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Network);
}

/// Serves one canned response per connection, announcing more body bytes
/// than it sends before closing the socket.
async fn start_truncating_server(status_line: &'static str) -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{{\"detail\":\"expired\"}}"
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    addr
}

#[tokio::test]
async fn truncated_unauthorized_body_still_clears_the_credential() {
    let addr = start_truncating_server("401 Unauthorized").await;
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::with_token("expired"));
    let client = client_for(addr, store.clone());

    let err = client.get(&Endpoint::leads()).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(store.load().is_none());
}

#[tokio::test]
async fn truncated_error_body_keeps_the_status() {
    let addr = start_truncating_server("500 Internal Server Error").await;
    let client = client_for(addr, Arc::new(MemoryCredentialStore::with_token("t")));

    let err = client.get(&Endpoint::leads()).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }), "{err:?}");
    assert_eq!(err.kind(), ApiErrorKind::Server);
}

mod rows {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct LeadRow {
        #[serde(alias = "lead_id")]
        pub id: Option<String>,
    }
}
