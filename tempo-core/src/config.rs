use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::provider::{
    ProviderId, backend::DEFAULT_BACKEND_URL, openweather::DEFAULT_OPENWEATHER_URL,
};

/// Quiet period after the last edit before a lookup fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_provider = "backend"
/// backend_url = "http://192.168.0.10:5000"
/// debounce_ms = 500
///
/// [providers.openweather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider id, "backend" or "openweather". Unset means "backend".
    pub default_provider: Option<String>,

    pub backend_url: Option<String>,

    pub openweather_url: Option<String>,

    pub debounce_ms: Option<u64>,

    /// Unset leaves the HTTP client's own defaults in place.
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s).with_context(|| {
                "Invalid default provider in config.\n\
                 Hint: run `tempo configure <provider>` (e.g. `tempo configure backend`)."
            }),
            None => Ok(ProviderId::Backend),
        }
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// Set the backend base URL and make the backend the default when no
    /// default has been chosen yet.
    pub fn set_backend_url(&mut self, url: String) {
        self.backend_url = Some(url);

        if self.default_provider.is_none() {
            self.set_default_provider(ProviderId::Backend);
        }
    }

    pub fn openweather_url(&self) -> &str {
        self.openweather_url.as_deref().unwrap_or(DEFAULT_OPENWEATHER_URL)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "tempo", "tempo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.set_default_provider(provider_id);
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// The backend needs no credentials, so it always counts as configured.
    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        match provider_id {
            ProviderId::Backend => true,
            ProviderId::OpenWeather => self.provider_api_key(provider_id).is_some(),
        }
    }
}
