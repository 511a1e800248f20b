use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rigit_app_core::{AppKernel, LoadOutcome, MemoryNotifier, NoticeLevel, Notifier, Topic};
use rigit_config::Settings;
use rigit_infra::MemoryCredentialStore;
use serde_json::json;

/// Rentals endpoint that answers the first request at once and every later
/// one after `slow` with an extra row.
async fn start_rentals(hits: Arc<AtomicUsize>, slow: Duration) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new().route(
        "/api/rentals/",
        get(move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    return Json(json!([{"rental_id": "R-1", "equipment_name": "Cuplock", "status": "active"}]));
                }
                tokio::time::sleep(slow).await;
                Json(json!([
                    {"rental_id": "R-1", "equipment_name": "Cuplock", "status": "active"},
                    {"rental_id": "R-2", "equipment_name": "H-Frame", "status": "dispatched"}
                ]))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

/// Rentals endpoint that lists one row first and then fails after `slow`.
async fn start_failing_rentals(slow: Duration) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/api/rentals/",
        get(move || {
            let hits = hits.clone();
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    return (StatusCode::OK, Json(json!([{"rental_id": "R-1", "equipment_name": "Cuplock", "status": "active"}])));
                }
                tokio::time::sleep(slow).await;
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "database offline"})))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn kernel_for(addr: SocketAddr) -> AppKernel {
    kernel_with_notifier(addr, Arc::new(MemoryNotifier::new()))
}

fn kernel_with_notifier(addr: SocketAddr, notifier: Arc<MemoryNotifier>) -> AppKernel {
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
async fn late_results_after_unmount_are_dropped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, server) = start_rentals(hits.clone(), Duration::from_millis(200)).await;
    let kernel = kernel_for(addr);
    let rentals = kernel.rentals();

    let mounted = rentals.mount(Duration::from_secs(3600)).await;
    assert_eq!(rentals.items().len(), 1);

    let in_flight = tokio::spawn({
        let rentals = rentals.clone();
        async move { rentals.load().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    mounted.unmount().await;

    assert_eq!(in_flight.await.unwrap().unwrap(), LoadOutcome::Stale);
    assert_eq!(rentals.items().len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    server.abort();
}

#[tokio::test]
async fn results_from_an_earlier_mount_do_not_land_on_a_remount() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, server) = start_rentals(hits.clone(), Duration::from_millis(200)).await;
    let kernel = kernel_for(addr);
    let rentals = kernel.rentals();

    let first = rentals.mount(Duration::from_secs(3600)).await;
    let in_flight = tokio::spawn({
        let rentals = rentals.clone();
        async move { rentals.load().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    first.unmount().await;

    // The remount's own load is slow too; the old one finishes first.
    let second = tokio::spawn({
        let rentals = rentals.clone();
        async move { rentals.mount(Duration::from_secs(3600)).await }
    });

    assert_eq!(in_flight.await.unwrap().unwrap(), LoadOutcome::Stale);
    let second = second.await.unwrap();
    assert_eq!(rentals.items().len(), 2);
    assert_eq!(rentals.state().mount, Some(second.mount_id()));

    server.abort();
}

#[tokio::test]
async fn poll_stops_after_unmount() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, server) = start_rentals(hits.clone(), Duration::ZERO).await;
    let kernel = kernel_for(addr);
    let rentals = kernel.rentals();

    let mounted = rentals.mount(Duration::from_millis(40)).await;
    assert!(mounted.is_polling());
    let deadline = Instant::now() + Duration::from_secs(3);
    while hits.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(hits.load(Ordering::SeqCst) >= 3);

    mounted.unmount().await;
    assert_eq!(kernel.bus().subscriber_count(Topic::RefreshAll), 0);
    assert_eq!(rentals.state().mount, None);

    let after_unmount = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    kernel.refresh_all();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(hits.load(Ordering::SeqCst), after_unmount);

    server.abort();
}

#[tokio::test]
async fn refresh_all_makes_mounted_views_refetch() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, server) = start_rentals(hits.clone(), Duration::ZERO).await;
    let kernel = kernel_for(addr);
    let rentals = kernel.rentals();

    let _mounted = rentals.mount(Duration::from_secs(3600)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    kernel.refresh_all();
    let deadline = Instant::now() + Duration::from_secs(3);
    while rentals.items().len() < 2 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(rentals.items().len(), 2);
    assert!(hits.load(Ordering::SeqCst) >= 2);

    server.abort();
}

#[tokio::test]
async fn dropping_the_mount_unsubscribes() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (addr, server) = start_rentals(hits, Duration::ZERO).await;
    let kernel = kernel_for(addr);

    let mounted = kernel.rentals().mount(Duration::from_secs(3600)).await;
    assert_eq!(kernel.bus().subscriber_count(Topic::ContractApproved), 1);
    drop(mounted);
    assert_eq!(kernel.bus().subscriber_count(Topic::ContractApproved), 0);

    server.abort();
}

#[tokio::test]
async fn failed_load_after_unmount_is_not_reported() {
    let (addr, server) = start_failing_rentals(Duration::from_millis(200)).await;
    let notifier = Arc::new(MemoryNotifier::new());
    let kernel = kernel_with_notifier(addr, notifier.clone());
    let rentals = kernel.rentals();

    let mounted = rentals.mount(Duration::from_secs(3600)).await;
    let in_flight = tokio::spawn({
        let rentals = rentals.clone();
        async move { rentals.load().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    mounted.unmount().await;

    assert!(in_flight.await.unwrap().is_err());
    assert!(notifier
        .notices()
        .iter()
        .all(|n| n.level != NoticeLevel::Error));
    assert_eq!(rentals.state().last_error, None);

    server.abort();
}

#[tokio::test]
async fn failed_load_while_mounted_is_reported() {
    let (addr, server) = start_failing_rentals(Duration::ZERO).await;
    let notifier = Arc::new(MemoryNotifier::new());
    let kernel = kernel_with_notifier(addr, notifier.clone());
    let rentals = kernel.rentals();

    let _mounted = rentals.mount(Duration::from_secs(3600)).await;
    assert!(rentals.load().await.is_err());

    let last = notifier.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "database offline");
    assert_eq!(rentals.items().len(), 1);

    server.abort();
}
