use std::{
    collections::HashSet,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use taskify_shared::OwnerId;

const CONFIG_ENV: &str = "TASKIFY_CONFIG";
const CONFIG_FILE: &str = "taskify.toml";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Server configuration loaded from `taskify.toml`, then overridden from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Allowed CORS origin; any origin is accepted when unset.
    pub client_url: Option<String>,
    /// Fixed offset used for calendar-day buckets instead of the host time zone.
    pub utc_offset_minutes: Option<i32>,
    pub store: StoreConfig,
    pub accounts: Vec<AccountConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            client_url: None,
            utc_offset_minutes: None,
            store: StoreConfig::default(),
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

/// A bearer token and the owner it authenticates as.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub token: String,
    pub owner: OwnerId,
    #[serde(default)]
    pub name: Option<String>,
}

impl ServerConfig {
    /// Load from `$TASKIFY_CONFIG` (or `./taskify.toml`) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let mut config = Self::from_path(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// `REDIS_URL`, `PORT` and `CLIENT_URL` win over file values.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("REDIS_URL") {
            self.store.redis_url = url;
        }
        if let Some(port) = var("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
            self.bind.set_port(port);
        }
        if let Some(origin) = var("CLIENT_URL") {
            self.client_url = Some(origin);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.token.trim().is_empty() {
                bail!("account {} has an empty token", account.owner);
            }
            if !seen.insert(account.token.as_str()) {
                bail!("duplicate account token for owner {}", account.owner);
            }
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if !(-24 * 60 < minutes && minutes < 24 * 60) {
                bail!("utc_offset_minutes out of range: {minutes}");
            }
        }
        Ok(())
    }
}
