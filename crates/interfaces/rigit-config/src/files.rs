use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORG: &str = "rigit";
const APP: &str = "client";

const SETTINGS_FILE: &str = "settings.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Directory holding the client's settings and stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: Utf8PathBuf,
}

impl ConfigDir {
    /// The platform config directory (`~/.config/rigit-client` and friends).
    pub fn platform() -> Result<Self> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        let root = Utf8PathBuf::try_from(proj_dirs.config_dir().to_path_buf())
            .context("Config directory is not valid UTF-8")?;
        Ok(Self { root })
    }

    pub fn at(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .with_context(|| format!("Failed to create config directory {}", self.root))?;
        }
        Ok(())
    }

    pub fn settings_path(&self) -> Utf8PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn credentials_path(&self) -> Utf8PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }
}

/// Write to `<path>.tmp`, sync, then rename over the destination.
pub fn atomic_write(path: &Utf8Path, contents: &[u8]) -> Result<()> {
    write_replacing(path, contents, false)
}

/// Like [`atomic_write`], but the file is readable by its owner only.
pub fn atomic_write_private(path: &Utf8Path, contents: &[u8]) -> Result<()> {
    write_replacing(path, contents, true)
}

fn open_temp(tmp_path: &Utf8Path, private: bool) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    let file = options.open(tmp_path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // A leftover temp file keeps its old mode through open.
        if private {
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;
    Ok(file)
}

fn write_replacing(path: &Utf8Path, contents: &[u8], private: bool) -> Result<()> {
    let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));

    let mut file = open_temp(&tmp_path, private)
        .with_context(|| format!("Failed to create temp file {tmp_path}"))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {tmp_path}"))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {tmp_path}"))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path)
                .with_context(|| format!("Failed to replace destination file {path}"))?;
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to rename temp file {tmp_path} to {path}"));
        }
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
