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

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
apparent_temperature_max,apparent_temperature_min,precipitation_sum,\
precipitation_probability_max,windspeed_10m_max,uv_index_max,sunrise,sunset";

/// Open-Meteo: no key, columnar daily arrays, native sunrise/sunset and UV.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    descriptor: ProviderDescriptor,
    registry: Arc<Registry>,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(descriptor: ProviderDescriptor, registry: Arc<Registry>, http: Client) -> Self {
        Self { descriptor, registry, http }
    }

    pub async fn fetch_raw(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let timezone = location.timezone.clone().unwrap_or_else(|| "auto".to_string());
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", timezone),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ];

        let parsed: OmResponse =
            get_json(&self.http, ProviderId::OpenMeteo, &self.descriptor.base_url, &query).await?;

        Ok(RawForecast::OpenMeteo(parsed))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<Vec<DailyForecast>, FetchError> {
        self.fetch_raw(location).await?.normalize(&self.registry)
    }
}

#[derive(Debug, Deserialize)]
pub struct OmResponse {
    daily: Option<OmDaily>,
}

/// Parallel arrays indexed by day offset. Only `time` is required.
#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature_max: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default, alias = "wind_speed_10m_max")]
    windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
}

fn at<T: Clone>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).cloned().flatten()
}

pub(crate) fn normalize(
    raw: &OmResponse,
    registry: &Registry,
) -> Result<Vec<DailyForecast>, FetchError> {
    let daily = raw
        .daily
        .as_ref()
        .ok_or_else(|| FetchError::schema(ProviderId::OpenMeteo, "response has no `daily` block"))?;

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let weather_code = at(&daily.weathercode, i).map(WeatherCode::Numeric);
            let (weather_desc, weather_icon) =
                describe(registry, ProviderId::OpenMeteo, weather_code.as_ref(), None);

            Ok(DailyForecast {
                date: parse_date(ProviderId::OpenMeteo, date)?,
                temp_high: at(&daily.temperature_2m_max, i),
                temp_low: at(&daily.temperature_2m_min, i),
                temp_apparent_high: at(&daily.apparent_temperature_max, i),
                temp_apparent_low: at(&daily.apparent_temperature_min, i),
                precipitation: at(&daily.precipitation_sum, i),
                precipitation_prob: at(&daily.precipitation_probability_max, i),
                wind_speed: at(&daily.windspeed_10m_max, i),
                uv_index: at(&daily.uv_index_max, i),
                sunrise: at(&daily.sunrise, i),
                sunset: at(&daily.sunset, i),
                weather_code,
                weather_desc,
                weather_icon,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture() -> serde_json::Value {
        json!({
            "latitude": 46.375,
            "longitude": 125.375,
            "timezone": "Asia/Shanghai",
            "daily": {
                "time": ["2025-01-10", "2025-01-11", "2025-01-12"],
                "weathercode": [3, 71, 9999],
                "temperature_2m_max": [-8.1, -10.4, null],
                "temperature_2m_min": [-21.3, -24.0, -19.5],
                "apparent_temperature_max": [-13.0, -16.2, -12.1],
                "apparent_temperature_min": [-27.5, -30.1, -25.0],
                "precipitation_sum": [0.0, 1.2, 0.0],
                "precipitation_probability_max": [5, 60, 10],
                "windspeed_10m_max": [14.2, 22.7, 9.0],
                "uv_index_max": [1.35, 0.9, 1.6],
                "sunrise": ["2025-01-10T07:01", "2025-01-11T07:01", "2025-01-12T07:00"],
                "sunset": ["2025-01-10T15:55", "2025-01-11T15:56", "2025-01-12T15:58"]
            }
        })
    }

    fn parse(value: serde_json::Value) -> OmResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn transposes_columns_into_day_records() {
        let registry = Registry::builtin();
        let days = normalize(&parse(fixture()), &registry).unwrap();

        assert_eq!(days.len(), 3);
        let first = &days[0];
        assert_eq!(first.date.to_string(), "2025-01-10");
        assert_eq!(first.temp_high, Some(-8.1));
        assert_eq!(first.temp_low, Some(-21.3));
        assert_eq!(first.temp_apparent_low, Some(-27.5));
        assert_eq!(first.precipitation_prob, Some(5.0));
        assert_eq!(first.wind_speed, Some(14.2));
        assert_eq!(first.uv_index, Some(1.35));
        assert_eq!(first.sunrise.as_deref(), Some("2025-01-10T07:01"));
        assert_eq!(first.weather_code, Some(WeatherCode::Numeric(3)));
        assert_eq!(first.weather_desc, "Overcast");
        assert_eq!(first.weather_icon, "☁️");

        assert_eq!(days[1].weather_desc, "Slight snowfall");
    }

    #[test]
    fn nulls_and_unknown_codes_degrade_gracefully() {
        let registry = Registry::builtin();
        let days = normalize(&parse(fixture()), &registry).unwrap();

        let third = &days[2];
        assert_eq!(third.temp_high, None);
        assert_eq!(third.weather_desc, "unknown");
        assert_eq!(third.weather_icon, "?");
    }

    #[test]
    fn short_columns_become_none() {
        let registry = Registry::builtin();
        let raw = parse(json!({
            "daily": {
                "time": ["2025-01-10", "2025-01-11"],
                "temperature_2m_max": [1.0]
            }
        }));

        let days = normalize(&raw, &registry).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].temp_high, None);
        assert_eq!(days[1].weather_code, None);
        assert_eq!(days[1].sunset, None);
    }

    #[test]
    fn missing_daily_block_is_schema_error() {
        let registry = Registry::builtin();
        let err = normalize(&parse(json!({ "latitude": 1.0 })), &registry).unwrap_err();

        assert!(matches!(err, FetchError::Schema { provider: ProviderId::OpenMeteo, .. }));
    }

    #[tokio::test]
    async fn fetch_sends_coordinates_and_horizon() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "46.39"))
            .and(query_param("longitude", "125.32"))
            .and(query_param("forecast_days", "5"))
            .and(query_param("timezone", "Asia/Shanghai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture()))
            .mount(&mock_server)
            .await;

        let mut descriptor = ProviderDescriptor::builtin(ProviderId::OpenMeteo);
        descriptor.base_url = format!("{}/v1/forecast", mock_server.uri());
        let provider =
            OpenMeteoProvider::new(descriptor, Arc::new(Registry::builtin()), Client::new());

        let mut location = Location::ad_hoc("Anda", 46.39, 125.32);
        location.timezone = Some("Asia/Shanghai".into());

        let days = provider.fetch_forecast(&location).await.unwrap();
        assert_eq!(days.len(), 3);
    }

    #[tokio::test]
    async fn fetch_maps_server_error_to_http_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let mut descriptor = ProviderDescriptor::builtin(ProviderId::OpenMeteo);
        descriptor.base_url = format!("{}/v1/forecast", mock_server.uri());
        let provider =
            OpenMeteoProvider::new(descriptor, Arc::new(Registry::builtin()), Client::new());

        let err = provider.fetch_forecast(&Location::ad_hoc("x", 0.0, 0.0)).await.unwrap_err();
        match err {
            FetchError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_server_past_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(fixture())
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let mut descriptor = ProviderDescriptor::builtin(ProviderId::OpenMeteo);
        descriptor.base_url = mock_server.uri();
        let http = crate::provider::http_client(std::time::Duration::from_millis(200)).unwrap();
        let provider = OpenMeteoProvider::new(descriptor, Arc::new(Registry::builtin()), http);

        let err = provider.fetch_forecast(&Location::ad_hoc("x", 0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { provider: ProviderId::OpenMeteo, .. }));
        assert_eq!(err.kind(), crate::error::FailureKind::Transport);
    }
}
