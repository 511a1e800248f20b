use rigit_core::Record;
use tracing::debug;

use super::events::ViewEvent;
use super::store::ViewState;

pub fn reduce<R: Record>(mut state: ViewState<R>, ev: ViewEvent<R>) -> ViewState<R> {
    match ev {
        ViewEvent::Mounted(id) => {
            state.mount = Some(id);
            state.last_error = None;
        }
        ViewEvent::Unmounted(id) => {
            // A newer mount may already own the view.
            if state.mount == Some(id) {
                state.mount = None;
                state.loading = false;
            }
        }

        ViewEvent::LoadStarted => state.loading = true,
        ViewEvent::Loaded { mount, items } => {
            if mount != state.mount {
                debug!(?mount, current = ?state.mount, "dropping stale list");
                return state;
            }
            state.items = items;
            state.loading = false;
            state.last_error = None;
            state.loads_applied += 1;
        }
        ViewEvent::LoadFailed { mount, message } => {
            if mount != state.mount {
                return state;
            }
            state.loading = false;
            state.last_error = Some(message);
        }

        ViewEvent::ItemUpserted(item) => {
            match state
                .items
                .iter()
                .position(|x| x.record_id() == item.record_id())
            {
                Some(ix) => state.items[ix] = item,
                None => state.items.push(item),
            }
        }
        ViewEvent::ItemRemoved(id) => state.items.retain(|x| x.record_id() != id),

        ViewEvent::ActionStarted(id) => *state.in_flight.entry(id).or_insert(0) += 1,
        ViewEvent::ActionFinished(id) => {
            if let Some(count) = state.in_flight.get_mut(&id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    state.in_flight.remove(&id);
                }
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(String, u32);

    impl Record for Row {
        fn record_id(&self) -> &str {
            &self.0
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.0]
        }
    }

    fn loaded(mount: Option<Uuid>, items: Vec<Row>) -> ViewEvent<Row> {
        ViewEvent::Loaded { mount, items }
    }

    #[test]
    fn list_from_previous_mount_is_dropped() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut state = reduce(ViewState::default(), ViewEvent::Mounted(first));
        state = reduce(state, ViewEvent::Unmounted(first));
        state = reduce(state, ViewEvent::Mounted(second));

        state = reduce(state, loaded(Some(first), vec![Row("a".into(), 1)]));
        assert!(state.items.is_empty());
        assert_eq!(state.loads_applied, 0);

        state = reduce(state, loaded(Some(second), vec![Row("b".into(), 1)]));
        assert_eq!(state.items, vec![Row("b".into(), 1)]);
    }

    #[test]
    fn failed_load_keeps_previous_items() {
        let mut state = reduce(ViewState::default(), loaded(None, vec![Row("a".into(), 1)]));
        state = reduce(state, ViewEvent::LoadStarted);
        state = reduce(
            state,
            ViewEvent::LoadFailed {
                mount: None,
                message: "boom".into(),
            },
        );
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert!(!state.loading);
    }

    #[test]
    fn duplicate_actions_are_counted() {
        let mut state: ViewState<Row> = ViewState::default();
        state = reduce(state, ViewEvent::ActionStarted("a".into()));
        state = reduce(state, ViewEvent::ActionStarted("a".into()));
        state = reduce(state, ViewEvent::ActionFinished("a".into()));
        assert_eq!(state.in_flight.get("a"), Some(&1));
        state = reduce(state, ViewEvent::ActionFinished("a".into()));
        assert!(state.in_flight.is_empty());
    }

    #[test]
    fn upsert_replaces_by_record_id() {
        let mut state = reduce(ViewState::default(), loaded(None, vec![Row("a".into(), 1)]));
        state = reduce(state, ViewEvent::ItemUpserted(Row("a".into(), 2)));
        state = reduce(state, ViewEvent::ItemUpserted(Row("b".into(), 1)));
        assert_eq!(state.items, vec![Row("a".into(), 2), Row("b".into(), 1)]);
    }
}
