use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections::HashSet, convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    model::{DailyForecast, FORECAST_DAYS, Location, WeatherCode, WeatherCodeEntry},
    provider::{
        amap::AmapProvider, openmeteo::OpenMeteoProvider, openweathermap::OpenWeatherMapProvider,
        weatherapi::WeatherApiProvider,
    },
    registry::Registry,
};

pub mod amap;
pub mod openmeteo;
pub mod openweathermap;
pub mod weatherapi;

const USER_AGENT: &str = concat!("forecast-compare/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenMeteo,
    OpenWeatherMap,
    WeatherApi,
    Amap,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::OpenWeatherMap => "openweathermap",
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::Amap => "amap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeatherMap, ProviderId::WeatherApi, ProviderId::Amap]
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderId::OpenMeteo)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openmeteo" => Ok(ProviderId::OpenMeteo),
            "openweathermap" => Ok(ProviderId::OpenWeatherMap),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "amap" => Ok(ProviderId::Amap),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openmeteo, openweathermap, weatherapi, amap."
            )),
        }
    }
}

/// One weather data source able to produce normalized daily forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch_forecast(&self, location: &Location) -> Result<Vec<DailyForecast>, FetchError>;
}

/// A provider's decoded response, one variant per provider schema.
#[derive(Debug)]
pub enum RawForecast {
    OpenMeteo(openmeteo::OmResponse),
    OpenWeatherMap(openweathermap::OwForecastResponse),
    WeatherApi(weatherapi::WaForecastResponse),
    Amap(amap::AmapForecastResponse),
}

impl RawForecast {
    pub fn provider(&self) -> ProviderId {
        match self {
            RawForecast::OpenMeteo(_) => ProviderId::OpenMeteo,
            RawForecast::OpenWeatherMap(_) => ProviderId::OpenWeatherMap,
            RawForecast::WeatherApi(_) => ProviderId::WeatherApi,
            RawForecast::Amap(_) => ProviderId::Amap,
        }
    }

    /// Canonical records: at most [`FORECAST_DAYS`], one per date, temperatures consistent.
    pub fn normalize(&self, registry: &Registry) -> Result<Vec<DailyForecast>, FetchError> {
        let days = match self {
            RawForecast::OpenMeteo(raw) => openmeteo::normalize(raw, registry)?,
            RawForecast::OpenWeatherMap(raw) => openweathermap::normalize(raw, registry)?,
            RawForecast::WeatherApi(raw) => weatherapi::normalize(raw, registry)?,
            RawForecast::Amap(raw) => amap::normalize(raw, registry)?,
        };

        Ok(finalize(self.provider(), days))
    }
}

/// Construct the adapter for `id` from the registry's descriptor.
pub fn provider_from_registry(
    id: ProviderId,
    registry: &Arc<Registry>,
    http: &Client,
    language: &str,
) -> Result<Arc<dyn ForecastProvider>, FetchError> {
    let descriptor = registry.descriptor(id).cloned().ok_or_else(|| FetchError::NotConfigured {
        provider: id,
        reason: "provider is not registered".to_string(),
    })?;

    if !descriptor.is_ready() {
        return Err(FetchError::NotConfigured {
            provider: id,
            reason: format!(
                "no API key. Hint: run `forecast configure {id}` or set {}.",
                crate::config::api_key_env_var(id)
            ),
        });
    }

    let registry = Arc::clone(registry);
    let http = http.clone();

    let provider: Arc<dyn ForecastProvider> = match id {
        ProviderId::OpenMeteo => Arc::new(OpenMeteoProvider::new(descriptor, registry, http)),
        ProviderId::OpenWeatherMap => Arc::new(
            OpenWeatherMapProvider::new(descriptor, registry, http).with_language(language),
        ),
        ProviderId::WeatherApi => {
            Arc::new(WeatherApiProvider::new(descriptor, registry, http).with_language(language))
        }
        ProviderId::Amap => Arc::new(AmapProvider::new(descriptor, registry, http)),
    };

    Ok(provider)
}

/// Shared HTTP client for all adapters.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).user_agent(USER_AGENT).build()
}

/// GET `url` and decode a JSON body; non-2xx statuses and undecodable bodies are errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    provider: ProviderId,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    debug!(%provider, url, "sending request");

    // Query strings carry API keys, keep them out of error messages.
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| FetchError::Transport { provider, source: e.without_url() })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| FetchError::Transport { provider, source: e.without_url() })?;

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            provider,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| FetchError::schema(provider, format!("failed to parse JSON: {e}")))
}

/// Description prefers the provider's own text; the icon always comes from the code table.
pub(crate) fn describe(
    registry: &Registry,
    provider: ProviderId,
    code: Option<&WeatherCode>,
    provider_text: Option<&str>,
) -> (String, String) {
    let entry = code
        .map(|c| registry.lookup_code(provider, c))
        .unwrap_or(WeatherCodeEntry::UNKNOWN);

    let description = provider_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(entry.description);

    (description.to_string(), entry.icon.to_string())
}

pub(crate) fn parse_date(provider: ProviderId, value: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| FetchError::schema(provider, format!("invalid date '{value}': {e}")))
}

fn finalize(provider: ProviderId, days: Vec<DailyForecast>) -> Vec<DailyForecast> {
    let mut seen = HashSet::new();

    days.into_iter()
        .filter(|day| {
            if !seen.insert(day.date) {
                warn!(%provider, date = %day.date, "dropping duplicate forecast day");
                return false;
            }
            if !day.has_consistent_temps() {
                warn!(
                    %provider,
                    date = %day.date,
                    high = ?day.temp_high,
                    low = ?day.temp_low,
                    "dropping forecast day with high below low"
                );
                return false;
            }
            true
        })
        .take(FORECAST_DAYS)
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
