use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::Location, provider::ProviderId};

/// Provider order used to pick each day's default values when none is configured.
pub const DEFAULT_PRIORITY: &[ProviderId] = &[
    ProviderId::OpenMeteo,
    ProviderId::WeatherApi,
    ProviderId::OpenWeatherMap,
    ProviderId::Amap,
];

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Per-provider settings (API key, endpoint overrides).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocode_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Language code passed to providers that localize condition text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Provider ids in the order they win a day's default values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Location id shown when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,

    /// Example TOML:
    /// [providers.openweathermap]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

impl Config {
    /// Priority list as strongly-typed ids, falling back to [`DEFAULT_PRIORITY`].
    pub fn priority_ids(&self) -> Result<Vec<ProviderId>> {
        if self.priority.is_empty() {
            return Ok(DEFAULT_PRIORITY.to_vec());
        }

        self.priority
            .iter()
            .map(|s| ProviderId::try_from(s.as_str()))
            .collect::<Result<Vec<_>>>()
            .context("Invalid `priority` entry in config")
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.providers.contains_key(id.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Configured locations, or the built-in pair when none are configured.
    pub fn locations(&self) -> Vec<Location> {
        if self.locations.is_empty() { builtin_locations() } else { self.locations.clone() }
    }

    pub fn location(&self, id: &str) -> Option<Location> {
        self.locations().into_iter().find(|loc| loc.id.eq_ignore_ascii_case(id))
    }

    /// The configured default location, or the first known location.
    pub fn default_location(&self) -> Result<Location> {
        match &self.default_location {
            Some(id) => self.location(id).ok_or_else(|| {
                anyhow!(
                    "Default location '{id}' is not configured.\n\
                     Hint: add a [[locations]] entry with id = \"{id}\" or change `default_location`."
                )
            }),
            None => self
                .locations()
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("No locations configured")),
        }
    }

    pub fn set_default_location(&mut self, id: &str) {
        self.default_location = Some(id.to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-compare", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key, keeping any endpoint overrides.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key =
            Some(api_key);
    }

    pub fn set_base_url(&mut self, provider_id: ProviderId, base_url: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().base_url =
            Some(base_url);
    }

    /// Returns the API key stored in the config file, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.api_key.as_deref())
    }

    /// API key from `FORECAST_<PROVIDER>_API_KEY`, falling back to the config file.
    pub fn resolved_api_key(&self, provider_id: ProviderId) -> Option<String> {
        self.resolved_api_key_with(provider_id, |name| std::env::var(name).ok())
    }

    pub fn resolved_api_key_with(
        &self,
        provider_id: ProviderId,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        lookup_env(&api_key_env_var(provider_id))
            .filter(|key| !key.is_empty())
            .or_else(|| self.provider_api_key(provider_id).map(str::to_string))
            .filter(|key| !key.is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.resolved_api_key(provider_id).is_some()
    }
}

/// Environment variable holding the API key for `provider_id`.
pub fn api_key_env_var(provider_id: ProviderId) -> String {
    format!("FORECAST_{}_API_KEY", provider_id.as_str().to_uppercase())
}

fn builtin_locations() -> Vec<Location> {
    vec![
        Location {
            id: "anda".to_string(),
            name: "Anda".to_string(),
            latitude: 46.39,
            longitude: 125.32,
            timezone: Some("Asia/Shanghai".to_string()),
            provider_code: None,
        },
        Location {
            id: "gannan".to_string(),
            name: "Gannan".to_string(),
            latitude: 47.92,
            longitude: 123.50,
            timezone: Some("Asia/Shanghai".to_string()),
            provider_code: None,
        },
    ]
}
