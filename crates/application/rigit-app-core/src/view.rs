use std::sync::Arc;
use std::time::Duration;

use rigit_config::Settings;
use rigit_core::{apply_filter, EntityKind, Record};
use rigit_infra::{ApiClient, Endpoint};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::app_core::{ViewEvent, ViewState, ViewStore};
use crate::bus::NotificationBus;
use crate::dispatcher::{Action, ActionDispatcher, ActionError};
use crate::reconcile::MountedView;
use crate::topics::Topic;

/// What a view lists and which topics make it re-fetch.
pub trait ViewSpec: Clone + Send + Sync + 'static {
    type Item: Record + DeserializeOwned;

    const KIND: EntityKind;

    fn list_endpoint(&self) -> Endpoint;

    fn refresh_topics(&self) -> &'static [Topic];
}

/// Shared handles every view is built from.
#[derive(Clone)]
pub struct ViewContext {
    pub dispatcher: ActionDispatcher,
    pub bus: NotificationBus,
    pub settings: Arc<Settings>,
}

impl ViewContext {
    pub fn client(&self) -> &ApiClient {
        self.dispatcher.client()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(usize),
    /// The view was unmounted or remounted while the request was running.
    Stale,
}

/// A list of one entity kind with its load, filter and row actions.
#[derive(Clone)]
pub struct EntityView<S: ViewSpec> {
    spec: S,
    ctx: ViewContext,
    store: ViewStore<S::Item>,
}

impl<S: ViewSpec> EntityView<S> {
    pub fn new(spec: S, ctx: ViewContext) -> Self {
        Self {
            spec,
            ctx,
            store: ViewStore::default(),
        }
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    pub fn kind(&self) -> EntityKind {
        S::KIND
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub(crate) fn store(&self) -> &ViewStore<S::Item> {
        &self.store
    }

    pub fn state(&self) -> ViewState<S::Item> {
        self.store.state()
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.store.with_state(|s| s.items.clone())
    }

    pub fn apply_filter(&self, query: &str) -> Vec<S::Item> {
        self.store.with_state(|s| apply_filter(&s.items, query))
    }

    pub fn find(&self, id: &str) -> Option<S::Item> {
        self.store
            .with_state(|s| s.items.iter().find(|x| x.record_id() == id).cloned())
    }

    /// True while at least one action for row `id` is in flight.
    pub fn is_busy(&self, id: &str) -> bool {
        self.store.with_state(|s| s.in_flight.contains_key(id))
    }

    pub fn is_loading(&self) -> bool {
        self.store.with_state(|s| s.loading)
    }

    pub fn last_error(&self) -> Option<String> {
        self.store.with_state(|s| s.last_error.clone())
    }

    /// Fetches the list. The result is only applied if the view is still on
    /// the mount that started the request.
    pub async fn load(&self) -> Result<LoadOutcome, ActionError> {
        let mount = self.store.with_state(|s| s.mount);
        self.store.apply(ViewEvent::LoadStarted);

        let fetched = self
            .ctx
            .dispatcher
            .fetch_list::<S::Item>(&self.spec.list_endpoint())
            .await;

        match fetched {
            Ok(items) => {
                let count = items.len();
                let current = self
                    .store
                    .apply_then(ViewEvent::Loaded { mount, items }, |s| s.mount);
                if current != mount {
                    return Ok(LoadOutcome::Stale);
                }
                debug!(kind = %S::KIND, count, "list loaded");
                Ok(LoadOutcome::Applied(count))
            }
            Err(e) => {
                let current = self.store.apply_then(
                    ViewEvent::LoadFailed {
                        mount,
                        message: e.user_message(),
                    },
                    |s| s.mount,
                );
                if current == mount {
                    self.ctx
                        .dispatcher
                        .report(&format!("Loading {}", S::KIND), &e);
                } else {
                    debug!(kind = %S::KIND, "dropping load failure for a departed mount: {e}");
                }
                Err(e)
            }
        }
    }

    /// Starts the reconciliation poll; see [`MountedView`].
    pub async fn mount(&self, interval: Duration) -> MountedView<S> {
        MountedView::start(self.clone(), interval).await
    }

    /// Mounts with the configured refresh interval.
    pub async fn mount_default(&self) -> MountedView<S> {
        let interval = self.ctx.settings.refresh_interval();
        self.mount(interval).await
    }

    pub(crate) async fn run_action(
        &self,
        row_id: Option<&str>,
        action: Action,
    ) -> Result<Value, ActionError> {
        let Some(id) = row_id.map(str::to_owned) else {
            return self.ctx.dispatcher.dispatch(action).await;
        };
        self.store.apply(ViewEvent::ActionStarted(id.clone()));
        let result = self.ctx.dispatcher.dispatch(action).await;
        self.store.apply(ViewEvent::ActionFinished(id));
        result
    }

    /// Optimistic edit of one row. Returns false if the row is not loaded.
    pub(crate) fn update_row(&self, id: &str, edit: impl FnOnce(&mut S::Item)) -> bool {
        let Some(mut item) = self.find(id) else {
            return false;
        };
        edit(&mut item);
        self.store.apply(ViewEvent::ItemUpserted(item));
        true
    }

    pub(crate) fn upsert_row(&self, item: S::Item) {
        self.store.apply(ViewEvent::ItemUpserted(item));
    }

    pub(crate) fn remove_row(&self, id: &str) {
        self.store.apply(ViewEvent::ItemRemoved(id.to_string()));
    }

    /// Full re-fetch after a successful action. A failure here has already
    /// been reported and does not undo the action.
    pub(crate) async fn reload(&self) {
        if let Err(e) = self.load().await {
            debug!(kind = %S::KIND, "re-fetch after action failed: {e}");
        }
    }

    pub(crate) fn publish(&self, topic: Topic, payload: Option<Value>) {
        self.ctx.bus.publish(topic, payload);
    }

    pub(crate) fn missing_row(&self, id: &str) -> ActionError {
        ActionError::NotAllowed(format!("{} {id} is not loaded", capitalized(S::KIND)))
    }
}

fn capitalized(kind: EntityKind) -> String {
    rigit_core::format_status_label(kind.name())
}

/// Reads a string field out of an action reply.
pub(crate) fn reply_str(reply: &Value, key: &str) -> Option<String> {
    match reply.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_fields_accept_strings_and_numbers() {
        let reply = json!({"invoice_id": "INV-001", "lead_id": 42, "blank": " "});
        assert_eq!(reply_str(&reply, "invoice_id").as_deref(), Some("INV-001"));
        assert_eq!(reply_str(&reply, "lead_id").as_deref(), Some("42"));
        assert_eq!(reply_str(&reply, "blank"), None);
        assert_eq!(reply_str(&Value::Null, "invoice_id"), None);
    }
}
