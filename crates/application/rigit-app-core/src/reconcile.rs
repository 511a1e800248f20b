//! Reconciliation poll for mounted views.
//!
//! A mounted view re-fetches on a fixed interval and whenever one of its
//! refresh topics is published. Bus handlers only signal the poll task; the
//! fetch always happens on the task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::app_core::{MountId, ViewEvent};
use crate::bus::Subscription;
use crate::view::{EntityView, ViewSpec};

/// A view on screen. Dropping it (or calling [`MountedView::unmount`]) stops
/// the poll and unsubscribes; results still in flight are discarded.
pub struct MountedView<S: ViewSpec> {
    view: EntityView<S>,
    mount: MountId,
    cancel: CancellationToken,
    subscriptions: Vec<Subscription>,
    task: Option<JoinHandle<()>>,
}

impl<S: ViewSpec> MountedView<S> {
    pub(crate) async fn start(view: EntityView<S>, period: Duration) -> Self {
        let mount = Uuid::new_v4();
        view.store().apply(ViewEvent::Mounted(mount));
        info!(kind = %S::KIND, %mount, "view mounted");

        if let Err(e) = view.load().await {
            debug!(kind = %S::KIND, "initial load failed: {e}");
        }

        // Capacity one: signals that arrive while a fetch is pending collapse.
        let (tx, rx) = mpsc::channel::<()>(1);
        let bus = view.context().bus.clone();
        let subscriptions = view
            .spec()
            .refresh_topics()
            .iter()
            .map(|&topic| {
                let tx = tx.clone();
                bus.subscribe(topic, move |_| {
                    let _ = tx.try_send(());
                    Ok(())
                })
            })
            .collect();
        drop(tx);

        let cancel = CancellationToken::new();
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(poll(view.clone(), period, rx, cancel.clone()));

        Self {
            view,
            mount,
            cancel,
            subscriptions,
            task: Some(task),
        }
    }

    pub fn view(&self) -> &EntityView<S> {
        &self.view
    }

    pub fn mount_id(&self) -> MountId {
        self.mount
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the poll and waits for the task to finish.
    pub async fn unmount(mut self) {
        let task = self.teardown();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn teardown(&mut self) -> Option<JoinHandle<()>> {
        self.cancel.cancel();
        self.subscriptions.clear();
        let task = self.task.take();
        if task.is_some() {
            self.view.store().apply(ViewEvent::Unmounted(self.mount));
            info!(kind = %S::KIND, mount = %self.mount, "view unmounted");
        }
        task
    }
}

impl<S: ViewSpec> Drop for MountedView<S> {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

async fn poll<S: ViewSpec>(
    view: EntityView<S>,
    period: Duration,
    mut signals: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            signal = signals.recv() => {
                if signal.is_none() {
                    break;
                }
                debug!(kind = %S::KIND, "refresh requested");
            }
            _ = ticker.tick() => {}
        }

        if cancel.is_cancelled() {
            break;
        }
        if let Err(e) = view.load().await {
            debug!(kind = %S::KIND, "reconciliation load failed: {e}");
        }
    }
    debug!(kind = %S::KIND, "poll stopped");
}
