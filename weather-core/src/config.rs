use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::{model::Coordinate, provider::ProviderId, region::RegionCode};

/// Used when the user's position cannot be determined.
pub const DEFAULT_LOCATION: &str = "London";

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Completion model name; ignored by the weather provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A fixed user position, used instead of a live lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomeConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Place shown when geolocation fails, e.g. "London".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,

    /// Region code for suggestions when the user's country is unknown, e.g. "PK".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeConfig>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    pub fn default_location(&self) -> &str {
        self.default_location.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_LOCATION)
    }

    pub fn default_region(&self) -> RegionCode {
        self.default_region
            .as_deref()
            .map(RegionCode::from_country_code)
            .unwrap_or(RegionCode::Unknown)
    }

    /// The configured home position, if present and in range.
    pub fn home_coordinate(&self) -> Option<Coordinate> {
        self.home.and_then(|h| Coordinate::new(h.latitude, h.longitude))
    }

    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.providers.contains_key(id.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk with API keys from the environment taking
    /// precedence over the file.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk only, or return an empty default if it doesn't
    /// exist yet. Use this before [`Config::save`] so environment keys are
    /// never written out.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            // First run: no config file, start empty.
            Self::default()
        };

        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Replace API keys with values from `lookup` where present and non-empty.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.api_key_env()).filter(|k| !k.trim().is_empty()) {
                self.providers.entry(id.as_str().to_string()).or_default().api_key = key;
            }
        }
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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key, keeping any other provider settings.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key = api_key;
    }

    pub fn set_provider_endpoint(
        &mut self,
        provider_id: ProviderId,
        base_url: Option<String>,
        model: Option<String>,
    ) {
        let entry = self.providers.entry(provider_id.as_str().to_string()).or_default();
        entry.base_url = base_url.filter(|s| !s.trim().is_empty());
        entry.model = model.filter(|s| !s.trim().is_empty());
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
