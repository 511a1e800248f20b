//! Central configuration constants and persisted client settings.

use std::time::Duration;

pub mod files;
pub mod settings;

pub use files::{atomic_write, atomic_write_private, ConfigDir};
pub use settings::Settings;

/// Backend the client talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured backend URL.
pub const API_BASE_URL_ENV: &str = "RIGIT_API_BASE_URL";

/// Environment variable holding a `tracing` filter directive for the CLI.
pub const LOG_FILTER_ENV: &str = "RIGIT_LOG";

/// Per-request timeout for backend calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Shortest and longest accepted request timeout, in seconds.
pub const MIN_HTTP_TIMEOUT_SECS: u64 = 10;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 30;

/// How often a mounted view re-fetches its list, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Delay before follow-up notifications are published, in milliseconds.
/// Gives freshly mounted views time to subscribe.
pub const DEFAULT_DISPATCH_DELAY_MS: u64 = 100;

/// Days a sent quotation stays valid.
pub const DEFAULT_QUOTATION_VALIDITY_DAYS: u32 = 10;

/// Rental duration assumed when an enquiry does not state one.
pub const DEFAULT_RENTAL_DURATION_DAYS: u32 = 30;

pub fn clamp_http_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS))
}
