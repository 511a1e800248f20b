use std::sync::{Arc, Mutex};
use std::time::Duration;

use rigit_app_core::{Notification, NotificationBus, Subscription, Topic};
use serde_json::json;

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, name: &str) -> impl Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static {
    let log = log.clone();
    let name = name.to_string();
    move |_: &Notification| {
        log.lock().unwrap().push(name.clone());
        Ok(())
    }
}

#[test]
fn publish_without_subscribers_is_a_no_op() {
    let bus = NotificationBus::new();
    assert_eq!(bus.publish(Topic::RefreshAll, None), 0);
    assert_eq!(bus.publish_wire("globalRefresh", Some(json!({"timestamp": "now"}))), 0);
}

#[test]
fn handlers_run_in_registration_order() {
    let bus = NotificationBus::new();
    let log = Log::default();
    let _a = bus.subscribe(Topic::RefreshLeads, record(&log, "first"));
    let _b = bus.subscribe(Topic::RefreshLeads, record(&log, "second"));
    let _other = bus.subscribe(Topic::RefreshEnquiries, record(&log, "other"));

    assert_eq!(bus.publish(Topic::RefreshLeads, None), 2);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn failing_and_panicking_handlers_do_not_stop_later_ones() {
    let bus = NotificationBus::new();
    let log = Log::default();
    let _err = bus.subscribe(Topic::LeadCreated, |_| anyhow::bail!("handler failed"));
    let _panic = bus.subscribe(Topic::LeadCreated, |_| panic!("handler panicked"));
    let _ok = bus.subscribe(Topic::LeadCreated, record(&log, "survivor"));

    assert_eq!(bus.publish(Topic::LeadCreated, Some(json!({"lead_id": "LEAD-001"}))), 3);
    assert_eq!(*log.lock().unwrap(), vec!["survivor"]);

    // The bus is still usable afterwards.
    bus.publish(Topic::LeadCreated, None);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn handler_removed_mid_dispatch_is_not_invoked() {
    let bus = NotificationBus::new();
    let log = Log::default();
    let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let _killer = bus.subscribe(Topic::RefreshAll, {
        let victim = victim.clone();
        move |_| {
            // Dropping the guard unsubscribes.
            victim.lock().unwrap().take();
            Ok(())
        }
    });
    *victim.lock().unwrap() = Some(bus.subscribe(Topic::RefreshAll, record(&log, "victim")));

    assert_eq!(bus.publish(Topic::RefreshAll, None), 1);
    assert_eq!(bus.publish(Topic::RefreshAll, None), 1);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(bus.subscriber_count(Topic::RefreshAll), 1);
}

#[test]
fn handler_can_unsubscribe_itself() {
    let bus = NotificationBus::new();
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(Mutex::new(0));

    let sub = bus.subscribe(Topic::UserUpdated, {
        let slot = slot.clone();
        let calls = calls.clone();
        move |_| {
            *calls.lock().unwrap() += 1;
            slot.lock().unwrap().take();
            Ok(())
        }
    });
    *slot.lock().unwrap() = Some(sub);

    bus.publish(Topic::UserUpdated, None);
    bus.publish(Topic::UserUpdated, None);
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(bus.subscriber_count(Topic::UserUpdated), 0);
}

#[test]
fn payload_reaches_the_handler() {
    let bus = NotificationBus::new();
    let seen = Arc::new(Mutex::new(None));
    let _sub = bus.subscribe(Topic::FinanceTabChange, {
        let seen = seen.clone();
        move |note| {
            *seen.lock().unwrap() = note.payload.clone();
            Ok(())
        }
    });

    bus.publish_wire("financeTabChange", Some(json!("invoices")));
    assert_eq!(*seen.lock().unwrap(), Some(json!("invoices")));
    assert_eq!(bus.publish_wire("noSuchTopic", None), 0);
}

#[tokio::test]
async fn delayed_publish_waits_for_the_delay() {
    let bus = NotificationBus::new();
    let log = Log::default();
    let _sub = bus.subscribe(Topic::OpenQuotationFromEnquiry, record(&log, "opened"));

    let handle = bus.publish_after(Duration::from_millis(50), Topic::OpenQuotationFromEnquiry, None);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(handle.await.unwrap(), 1);
    assert_eq!(*log.lock().unwrap(), vec!["opened"]);
}
