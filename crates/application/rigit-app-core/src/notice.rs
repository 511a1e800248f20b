use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::ports::{NoticeLevel, Notifier, UserNotice};

/// Collects notices in memory; front ends drain it after each action.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<UserNotice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<UserNotice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<UserNotice> {
        self.notices
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<UserNotice> {
        self.notices.lock().ok().and_then(|n| n.last().cloned())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: UserNotice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

/// Sends notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: UserNotice) {
        let UserNotice {
            level,
            title,
            message,
        } = notice;
        match level {
            NoticeLevel::Success | NoticeLevel::Info => info!(%title, "{message}"),
            NoticeLevel::Warning => warn!(%title, "{message}"),
            NoticeLevel::Error => error!(%title, "{message}"),
        }
    }
}
