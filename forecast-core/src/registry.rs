//! Provider metadata and per-provider weather-code lookup.

use std::{collections::HashMap, fmt};

use crate::{
    Config,
    model::{WeatherCode, WeatherCodeEntry},
    provider::ProviderId,
};

mod codes;

/// Static description of one data source.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: String,
    pub base_url: String,
    /// Location-key lookup endpoint for two-step providers.
    pub geocode_url: Option<String>,
    pub requires_api_key: bool,
    pub api_key: Option<String>,
    pub color: String,
    pub icon: String,
}

impl ProviderDescriptor {
    /// Built-in metadata for `id`, without credentials.
    pub fn builtin(id: ProviderId) -> Self {
        let (display_name, base_url, geocode_url, requires_api_key, color, icon) = match id {
            ProviderId::OpenMeteo => (
                "Open-Meteo",
                "https://api.open-meteo.com/v1/forecast",
                None,
                false,
                "#6c5ce7",
                "🌤️",
            ),
            ProviderId::OpenWeatherMap => (
                "OpenWeatherMap",
                "https://api.openweathermap.org/data/2.5/forecast",
                None,
                true,
                "#e17055",
                "🌥️",
            ),
            ProviderId::WeatherApi => (
                "WeatherAPI.com",
                "https://api.weatherapi.com/v1/forecast.json",
                None,
                true,
                "#0984e3",
                "🌡️",
            ),
            ProviderId::Amap => (
                "AMap Weather",
                "https://restapi.amap.com/v3/weather/weatherInfo",
                Some("https://restapi.amap.com/v3/geocode/regeo"),
                true,
                "#3498db",
                "🗺️",
            ),
        };

        Self {
            id,
            display_name: display_name.to_string(),
            base_url: base_url.to_string(),
            geocode_url: geocode_url.map(str::to_string),
            requires_api_key,
            api_key: None,
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    /// Key requirement satisfied.
    pub fn is_ready(&self) -> bool {
        !self.requires_api_key || self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("base_url", &self.base_url)
            .field("geocode_url", &self.geocode_url)
            .field("requires_api_key", &self.requires_api_key)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("color", &self.color)
            .field("icon", &self.icon)
            .finish()
    }
}

/// Immutable provider table plus code tables, built once at startup and shared.
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<ProviderDescriptor>,
    codes: HashMap<ProviderId, HashMap<WeatherCode, WeatherCodeEntry>>,
}

impl Registry {
    /// Registry of all known providers with no credentials.
    pub fn builtin() -> Self {
        Self::from_descriptors(ProviderId::all().iter().map(|id| ProviderDescriptor::builtin(*id)))
    }

    /// Registry with API keys and endpoint overrides taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::from_descriptors(ProviderId::all().iter().map(|&id| {
            let mut descriptor = ProviderDescriptor::builtin(id);
            if let Some(provider) = config.provider_config(id) {
                if let Some(url) = &provider.base_url {
                    descriptor.base_url = url.clone();
                }
                if let Some(url) = &provider.geocode_url {
                    descriptor.geocode_url = Some(url.clone());
                }
            }
            descriptor.api_key = config.resolved_api_key(id);
            descriptor
        }))
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ProviderDescriptor>) -> Self {
        Self { descriptors: descriptors.into_iter().collect(), codes: code_tables() }
    }

    /// Resolve `code` in `provider`'s own table; unknown codes yield [`WeatherCodeEntry::UNKNOWN`].
    pub fn lookup_code(&self, provider: ProviderId, code: &WeatherCode) -> WeatherCodeEntry {
        self.codes
            .get(&provider)
            .and_then(|table| table.get(code))
            .copied()
            .unwrap_or(WeatherCodeEntry::UNKNOWN)
    }

    pub fn list_providers(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, id: ProviderId) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }
}

fn code_tables() -> HashMap<ProviderId, HashMap<WeatherCode, WeatherCodeEntry>> {
    fn numeric(table: &[(i64, &'static str, &'static str)]) -> HashMap<WeatherCode, WeatherCodeEntry> {
        table
            .iter()
            .map(|&(code, description, icon)| {
                (WeatherCode::Numeric(code), WeatherCodeEntry { description, icon })
            })
            .collect()
    }

    let amap = codes::AMAP
        .iter()
        .map(|&(code, description, icon)| (WeatherCode::from(code), WeatherCodeEntry { description, icon }))
        .collect();

    HashMap::from([
        (ProviderId::OpenMeteo, numeric(codes::OPEN_METEO)),
        (ProviderId::OpenWeatherMap, numeric(codes::OPEN_WEATHER_MAP)),
        (ProviderId::WeatherApi, numeric(codes::WEATHER_API)),
        (ProviderId::Amap, amap),
    ])
}
