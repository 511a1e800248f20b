use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::files::{atomic_write, ConfigDir};
use crate::{
    clamp_http_timeout, API_BASE_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_DISPATCH_DELAY_MS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_QUOTATION_VALIDITY_DAYS, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_RENTAL_DURATION_DAYS,
};

/// User-editable client settings, stored as `settings.json`.
///
/// Missing keys fall back to the crate defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub http_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub dispatch_delay_ms: u64,
    pub quotation_validity_days: u32,
    pub default_rental_duration_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            dispatch_delay_ms: DEFAULT_DISPATCH_DELAY_MS,
            quotation_validity_days: DEFAULT_QUOTATION_VALIDITY_DAYS,
            default_rental_duration_days: DEFAULT_RENTAL_DURATION_DAYS,
        }
    }
}

impl Settings {
    pub fn load(dir: &ConfigDir) -> Result<Self> {
        let path = dir.settings_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read settings")?;
        let settings: Settings =
            serde_json::from_str(&content).with_context(|| format!("Invalid settings file {path}"))?;
        Ok(settings)
    }

    pub fn save(&self, dir: &ConfigDir) -> Result<()> {
        dir.ensure()?;
        let json = serde_json::to_string_pretty(self)?;
        atomic_write(&dir.settings_path(), json.as_bytes()).context("Failed to write settings")?;
        Ok(())
    }

    /// Applies `RIGIT_API_BASE_URL` when it is set and not blank.
    pub fn with_env_overrides(self) -> Self {
        self.with_base_url_override(std::env::var(API_BASE_URL_ENV).ok())
    }

    pub fn with_base_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            tracing::debug!(%url, "overriding backend URL");
            self.api_base_url = url;
        }
        self
    }

    pub fn http_timeout(&self) -> Duration {
        clamp_http_timeout(self.http_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }
}
