use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rigit_config::{atomic_write_private, ConfigDir};
use serde::{Deserialize, Serialize};

/// Where the bearer token lives between runs.
///
/// One store is shared by every request of a process; a 401 clears it.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Keeps the token in `credentials.json` next to the settings.
#[derive(Debug)]
pub struct FileCredentialStore {
    dir: ConfigDir,
    cached: Mutex<Option<String>>,
}

impl FileCredentialStore {
    pub fn new(dir: ConfigDir) -> Self {
        Self {
            dir,
            cached: Mutex::new(None),
        }
    }

    pub fn shared(dir: ConfigDir) -> Arc<dyn CredentialStore> {
        Arc::new(Self::new(dir))
    }

    fn read_file(&self) -> Result<Option<String>> {
        let path = self.dir.credentials_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context("Failed to read credentials")?;
        let file: CredentialFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid credentials file {path}"))?;
        Ok(file.auth_token.filter(|t| !t.trim().is_empty()))
    }

    fn write_file(&self, token: Option<&str>) -> Result<()> {
        self.dir.ensure()?;
        let file = CredentialFile {
            auth_token: token.map(str::to_string),
        };
        let json = serde_json::to_string_pretty(&file)?;
        atomic_write_private(&self.dir.credentials_path(), json.as_bytes())
            .context("Failed to write credentials")
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let Ok(mut cached) = self.cached.lock() else {
            return None;
        };
        if cached.is_none() {
            match self.read_file() {
                Ok(token) => *cached = token,
                Err(e) => tracing::warn!("ignoring unreadable credentials: {e:#}"),
            }
        }
        cached.clone()
    }

    fn store(&self, token: &str) -> Result<()> {
        self.write_file(Some(token))?;
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
        if self.dir.credentials_path().exists() {
            self.write_file(None)?;
        }
        Ok(())
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
