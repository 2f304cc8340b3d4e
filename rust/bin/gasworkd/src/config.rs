//! Server-side configuration.
//!
//! A context name resolves to `/etc/gaswork/<name>.toml`; a value containing
//! `/` or `.` is treated as a direct path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub root: RootConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
}

/// Root operator credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// argon2id password hash for the root account.
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

fn default_expire_secs() -> u64 {
    8 * 3600
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/gaswork/{}.toml", name_or_path))
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the SQLite database inside the data directory.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("gaswork.sqlite")
    }
}
