use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::FetchError,
    model::{DailyForecast, FORECAST_DAYS, Location, WeatherCode},
    provider::{ForecastProvider, ProviderId, RawForecast, describe, get_json, parse_date},
    registry::{ProviderDescriptor, Registry},
};

const MPS_TO_KPH: f64 = 3.6;

/// OpenWeatherMap 5 day / 3 hour forecast, reduced to one record per date.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    descriptor: ProviderDescriptor,
    registry: Arc<Registry>,
    http: Client,
    language: String,
}

impl OpenWeatherMapProvider {
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
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", api_key),
            ("units", "metric".to_string()),
            ("lang", self.language.clone()),
        ];

        let parsed: OwForecastResponse =
            get_json(&self.http, ProviderId::OpenWeatherMap, &self.descriptor.base_url, &query)
                .await?;

        Ok(RawForecast::OpenWeatherMap(parsed))
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherMapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeatherMap
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<Vec<DailyForecast>, FetchError> {
        self.fetch_raw(location).await?.normalize(&self.registry)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp_max: Option<f64>,
    temp_min: Option<f64>,
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwPrecip {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    /// Probability of precipitation, 0–1.
    pop: Option<f64>,
    rain: Option<OwPrecip>,
    snow: Option<OwPrecip>,
}

#[derive(Debug, Deserialize)]
pub struct OwForecastResponse {
    list: Option<Vec<OwForecastEntry>>,
}

fn max_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().reduce(f64::max)
}

fn min_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().reduce(f64::min)
}

/// Group 3-hour buckets by the date part of `dt_txt` and reduce each group.
///
/// Condition code and text come from the first bucket of each day.
pub(crate) fn normalize(
    raw: &OwForecastResponse,
    registry: &Registry,
) -> Result<Vec<DailyForecast>, FetchError> {
    let list = raw
        .list
        .as_ref()
        .ok_or_else(|| FetchError::schema(ProviderId::OpenWeatherMap, "response has no `list`"))?;

    let mut by_date: BTreeMap<&str, Vec<&OwForecastEntry>> = BTreeMap::new();
    for entry in list {
        let date = entry.dt_txt.split(' ').next().unwrap_or_default();
        by_date.entry(date).or_default().push(entry);
    }

    by_date
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, buckets)| reduce_day(date, &buckets, registry))
        .collect()
}

fn reduce_day(
    date: &str,
    buckets: &[&OwForecastEntry],
    registry: &Registry,
) -> Result<DailyForecast, FetchError> {
    let mains = || buckets.iter().filter_map(|b| b.main.as_ref());

    let precip: Vec<f64> = buckets
        .iter()
        .flat_map(|b| [b.rain.as_ref(), b.snow.as_ref()])
        .flatten()
        .filter_map(|p| p.three_hours)
        .collect();

    let first_weather = buckets.first().and_then(|b| b.weather.first());
    let weather_code = first_weather.and_then(|w| w.id).map(WeatherCode::Numeric);
    let (weather_desc, weather_icon) = describe(
        registry,
        ProviderId::OpenWeatherMap,
        weather_code.as_ref(),
        first_weather.and_then(|w| w.description.as_deref()),
    );

    Ok(DailyForecast {
        date: parse_date(ProviderId::OpenWeatherMap, date)?,
        temp_high: max_of(mains().map(|m| m.temp_max)),
        temp_low: min_of(mains().map(|m| m.temp_min)),
        temp_apparent_high: max_of(mains().map(|m| m.feels_like)),
        temp_apparent_low: min_of(mains().map(|m| m.feels_like)),
        precipitation: (!precip.is_empty()).then(|| precip.iter().sum()),
        precipitation_prob: max_of(buckets.iter().map(|b| b.pop)).map(|p| p * 100.0),
        wind_speed: max_of(buckets.iter().map(|b| b.wind.as_ref().and_then(|w| w.speed)))
            .map(|mps| mps * MPS_TO_KPH),
        uv_index: None,
        sunrise: None,
        sunset: None,
        weather_code,
        weather_desc,
        weather_icon,
    })
}
