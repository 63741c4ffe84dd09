use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::FetchError,
    model::{DailyForecast, FORECAST_DAYS, Location, WeatherCode},
    provider::{ForecastProvider, ProviderId, RawForecast, describe, get_json, parse_date},
    registry::{ProviderDescriptor, Registry},
};

/// WeatherAPI.com: pre-aggregated daily objects, sun times as "HH:MM AM".
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    descriptor: ProviderDescriptor,
    registry: Arc<Registry>,
    http: Client,
    language: String,
}

impl WeatherApiProvider {
    pub fn new(descriptor: ProviderDescriptor, registry: Arc<Registry>, http: Client) -> Self {
        Self { descriptor, registry, http, language: "en".to_string() }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub async fn fetch_raw(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let api_key = self.descriptor.api_key.clone().unwrap_or_default();
        let query = [
            ("key", api_key),
            ("q", format!("{},{}", location.latitude, location.longitude)),
            ("days", FORECAST_DAYS.to_string()),
            ("aqi", "no".to_string()),
            ("alerts", "no".to_string()),
            ("lang", self.language.clone()),
        ];

        let parsed: WaForecastResponse =
            get_json(&self.http, ProviderId::WeatherApi, &self.descriptor.base_url, &query).await?;

        Ok(RawForecast::WeatherApi(parsed))
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<Vec<DailyForecast>, FetchError> {
        self.fetch_raw(location).await?.normalize(&self.registry)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: Option<f64>,
    mintemp_c: Option<f64>,
    totalprecip_mm: Option<f64>,
    daily_chance_of_rain: Option<f64>,
    maxwind_kph: Option<f64>,
    uv: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    feelslike_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: Option<WaDay>,
    astro: Option<WaAstro>,
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
pub struct WaForecastResponse {
    forecast: Option<WaForecast>,
}

pub(crate) fn normalize(
    raw: &WaForecastResponse,
    registry: &Registry,
) -> Result<Vec<DailyForecast>, FetchError> {
    let forecast = raw.forecast.as_ref().ok_or_else(|| {
        FetchError::schema(ProviderId::WeatherApi, "response has no `forecast.forecastday`")
    })?;

    forecast
        .forecastday
        .iter()
        .map(|fd| {
            let day = fd.day.as_ref();
            let condition = day.and_then(|d| d.condition.as_ref());
            let weather_code = condition.and_then(|c| c.code).map(WeatherCode::Numeric);
            let (weather_desc, weather_icon) = describe(
                registry,
                ProviderId::WeatherApi,
                weather_code.as_ref(),
                condition.and_then(|c| c.text.as_deref()),
            );

            let feels = fd.hour.iter().filter_map(|h| h.feelslike_c);
            let astro = fd.astro.as_ref();

            Ok(DailyForecast {
                date: parse_date(ProviderId::WeatherApi, &fd.date)?,
                temp_high: day.and_then(|d| d.maxtemp_c),
                temp_low: day.and_then(|d| d.mintemp_c),
                temp_apparent_high: feels.clone().reduce(f64::max),
                temp_apparent_low: feels.reduce(f64::min),
                precipitation: day.and_then(|d| d.totalprecip_mm),
                precipitation_prob: day.and_then(|d| d.daily_chance_of_rain),
                wind_speed: day.and_then(|d| d.maxwind_kph),
                uv_index: day.and_then(|d| d.uv),
                sunrise: astro.and_then(|a| a.sunrise.clone()),
                sunset: astro.and_then(|a| a.sunset.clone()),
                weather_code,
                weather_desc,
                weather_icon,
            })
        })
        .collect()
}
