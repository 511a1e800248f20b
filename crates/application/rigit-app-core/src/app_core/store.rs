use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rigit_core::Record;

use super::events::{MountId, ViewEvent};
use super::reducer::reduce;

#[derive(Debug, Clone)]
pub struct ViewState<R> {
    pub items: Vec<R>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub mount: Option<MountId>,
    /// Row id -> number of actions currently running for it.
    pub in_flight: HashMap<String, usize>,
    pub loads_applied: u64,
}

impl<R> Default for ViewState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            last_error: None,
            mount: None,
            in_flight: HashMap::new(),
            loads_applied: 0,
        }
    }
}

#[derive(Clone)]
pub struct ViewStore<R> {
    inner: Arc<Mutex<ViewState<R>>>,
}

impl<R: Record> Default for ViewStore<R> {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl<R: Record> ViewStore<R> {
    pub fn new(state: ViewState<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<R>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ViewState<R> {
        self.lock().clone()
    }

    pub fn apply(&self, ev: ViewEvent<R>) {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, ev);
    }

    /// Applies `ev` and reads the resulting state under the same lock.
    pub fn apply_then<T>(&self, ev: ViewEvent<R>, f: impl FnOnce(&ViewState<R>) -> T) -> T {
        let mut guard = self.lock();
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, ev);
        f(&guard)
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&ViewState<R>) -> T) -> T {
        f(&self.lock())
    }
}
