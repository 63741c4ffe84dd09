use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{DailyForecast, Location, WeatherCode},
    provider::{ForecastProvider, ProviderId, RawForecast, describe, get_json, parse_date},
    registry::{ProviderDescriptor, Registry},
};

const STATUS_OK: &str = "1";

/// AMap weather: resolve an adcode from coordinates, then fetch the forecast by adcode.
#[derive(Debug, Clone)]
pub struct AmapProvider {
    descriptor: ProviderDescriptor,
    registry: Arc<Registry>,
    http: Client,
}

impl AmapProvider {
    pub fn new(descriptor: ProviderDescriptor, registry: Arc<Registry>, http: Client) -> Self {
        Self { descriptor, registry, http }
    }

    fn api_key(&self) -> String {
        self.descriptor.api_key.clone().unwrap_or_default()
    }

    /// The location's pre-set code, or one looked up through the reverse geocoder.
    pub async fn resolve_adcode(&self, location: &Location) -> Result<String, FetchError> {
        if let Some(code) = location.provider_code.as_deref().filter(|c| !c.is_empty()) {
            return Ok(code.to_string());
        }

        let geocode_url = self.descriptor.geocode_url.as_deref().ok_or_else(|| {
            FetchError::NotConfigured {
                provider: ProviderId::Amap,
                reason: "no geocode endpoint configured".to_string(),
            }
        })?;

        let query = [
            ("key", self.api_key()),
            ("location", format!("{},{}", location.longitude, location.latitude)),
        ];
        let geo: AmapRegeoResponse = get_json(&self.http, ProviderId::Amap, geocode_url, &query).await?;

        if geo.status != STATUS_OK {
            return Err(FetchError::unresolved(
                ProviderId::Amap,
                format!("geocoder returned status {}: {}", geo.status, geo.info.unwrap_or_default()),
            ));
        }

        let adcode = geo
            .regeocode
            .and_then(|r| r.address_component)
            .and_then(|c| c.adcode)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|code| !code.is_empty())
            .ok_or_else(|| FetchError::unresolved(ProviderId::Amap, "geocoder returned no adcode"))?;

        debug!(adcode = %adcode, location = %location.name, "resolved AMap location key");
        Ok(adcode)
    }

    pub async fn fetch_raw(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let adcode = self.resolve_adcode(location).await?;

        let query = [
            ("key", self.api_key()),
            ("city", adcode),
            ("extensions", "all".to_string()),
        ];
        let parsed: AmapForecastResponse =
            get_json(&self.http, ProviderId::Amap, &self.descriptor.base_url, &query).await?;

        Ok(RawForecast::Amap(parsed))
    }
}

#[async_trait]
impl ForecastProvider for AmapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Amap
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<Vec<DailyForecast>, FetchError> {
        self.fetch_raw(location).await?.normalize(&self.registry)
    }
}

#[derive(Debug, Deserialize)]
struct AmapRegeoResponse {
    /// Absent status is treated like a failed lookup.
    #[serde(default)]
    status: String,
    info: Option<String>,
    regeocode: Option<AmapRegeocode>,
}

#[derive(Debug, Deserialize)]
struct AmapRegeocode {
    #[serde(rename = "addressComponent")]
    address_component: Option<AmapAddressComponent>,
}

/// `adcode` is a string, or an empty array when the point has no administrative area.
#[derive(Debug, Deserialize)]
struct AmapAddressComponent {
    adcode: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AmapCast {
    date: String,
    dayweather: Option<String>,
    daytemp: Option<String>,
    nighttemp: Option<String>,
    daytemp_float: Option<String>,
    nighttemp_float: Option<String>,
    daypower: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AmapForecast {
    casts: Option<Vec<AmapCast>>,
}

#[derive(Debug, Deserialize)]
pub struct AmapForecastResponse {
    status: String,
    info: Option<String>,
    #[serde(default)]
    forecasts: Vec<AmapForecast>,
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Upper Beaufort level of a wind-force range ("1-3", "≤3", "4") as km/h.
fn wind_force_to_kph(power: &str) -> Option<f64> {
    let level = power
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse::<u32>().ok())
        .max()?;

    let mps = 0.836 * f64::from(level).powf(1.5);
    Some(mps * 3.6)
}

pub(crate) fn normalize(
    raw: &AmapForecastResponse,
    registry: &Registry,
) -> Result<Vec<DailyForecast>, FetchError> {
    if raw.status != STATUS_OK {
        return Err(FetchError::schema(
            ProviderId::Amap,
            format!("provider returned status {}: {}", raw.status, raw.info.as_deref().unwrap_or_default()),
        ));
    }

    let casts = raw
        .forecasts
        .first()
        .and_then(|f| f.casts.as_ref())
        .ok_or_else(|| FetchError::schema(ProviderId::Amap, "response has no `forecasts[0].casts`"))?;

    casts
        .iter()
        .map(|cast| {
            let condition = cast.dayweather.as_deref().map(str::trim).filter(|w| !w.is_empty());
            let weather_code = condition.map(WeatherCode::from);
            let (weather_desc, weather_icon) =
                describe(registry, ProviderId::Amap, weather_code.as_ref(), condition);

            Ok(DailyForecast {
                date: parse_date(ProviderId::Amap, &cast.date)?,
                temp_high: parse_number(cast.daytemp_float.as_deref())
                    .or_else(|| parse_number(cast.daytemp.as_deref())),
                temp_low: parse_number(cast.nighttemp_float.as_deref())
                    .or_else(|| parse_number(cast.nighttemp.as_deref())),
                temp_apparent_high: None,
                temp_apparent_low: None,
                precipitation: None,
                precipitation_prob: None,
                wind_speed: cast.daypower.as_deref().and_then(wind_force_to_kph),
                uv_index: None,
                sunrise: None,
                sunset: None,
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

    fn cast(date: &str, weather: &str, day: &str, night: &str, power: &str) -> serde_json::Value {
        json!({
            "date": date,
            "week": "5",
            "dayweather": weather,
            "nightweather": weather,
            "daywind": "西北",
            "nightwind": "西北",
            "daytemp": day,
            "nighttemp": night,
            "daypower": power,
            "nightpower": power
        })
    }

    fn forecast_body(casts: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "status": "1",
            "count": "1",
            "info": "OK",
            "infocode": "10000",
            "forecasts": [{
                "city": "安达市",
                "adcode": "230681",
                "province": "黑龙江",
                "reporttime": "2025-01-10 11:02:42",
                "casts": casts
            }]
        })
    }

    fn regeo_body(adcode: serde_json::Value) -> serde_json::Value {
        json!({
            "status": "1",
            "info": "OK",
            "regeocode": {
                "formatted_address": "黑龙江省绥化市安达市",
                "addressComponent": { "province": "黑龙江省", "adcode": adcode }
            }
        })
    }

    fn provider_for(server: &MockServer) -> AmapProvider {
        let mut descriptor = ProviderDescriptor::builtin(ProviderId::Amap);
        descriptor.base_url = format!("{}/v3/weather/weatherInfo", server.uri());
        descriptor.geocode_url = Some(format!("{}/v3/geocode/regeo", server.uri()));
        descriptor.api_key = Some("AMAP_KEY".into());
        AmapProvider::new(descriptor, Arc::new(Registry::builtin()), Client::new())
    }

    #[test]
    fn parses_string_temperatures_and_text_conditions() {
        let registry = Registry::builtin();
        let raw: AmapForecastResponse = serde_json::from_value(forecast_body(vec![
            cast("2025-01-10", "晴", "-9", "-22", "1-3"),
            cast("2025-01-11", "小雪", "-12", "-25", "≤3"),
        ]))
        .unwrap();

        let days = normalize(&raw, &registry).unwrap();
        assert_eq!(days.len(), 2);

        let first = &days[0];
        assert_eq!(first.temp_high, Some(-9.0));
        assert_eq!(first.temp_low, Some(-22.0));
        assert_eq!(first.weather_code, Some(WeatherCode::from("晴")));
        assert_eq!(first.weather_desc, "晴");
        assert_eq!(first.weather_icon, "☀️");
        assert_eq!(first.precipitation, None);
        assert_eq!(first.temp_apparent_high, None);

        assert_eq!(days[1].weather_icon, "❄️");
        assert_eq!(days[0].wind_speed, days[1].wind_speed);
    }

    #[test]
    fn unknown_condition_text_keeps_text_with_unknown_icon() {
        let registry = Registry::builtin();
        let raw: AmapForecastResponse =
            serde_json::from_value(forecast_body(vec![cast("2025-01-10", "热", "35", "25", "4")]))
                .unwrap();

        let days = normalize(&raw, &registry).unwrap();
        assert_eq!(days[0].weather_desc, "热");
        assert_eq!(days[0].weather_icon, "?");
    }

    #[test]
    fn wind_force_uses_upper_level() {
        let three = wind_force_to_kph("1-3").unwrap();
        assert!((three - 15.64).abs() < 0.01, "got {three}");
        assert_eq!(wind_force_to_kph("≤3"), wind_force_to_kph("3"));
        assert!(wind_force_to_kph("4-5").unwrap() > wind_force_to_kph("4").unwrap());
        assert_eq!(wind_force_to_kph("微风"), None);
    }

    #[test]
    fn error_status_is_schema_error() {
        let registry = Registry::builtin();
        let raw: AmapForecastResponse = serde_json::from_value(json!({
            "status": "0",
            "info": "INVALID_USER_KEY",
            "infocode": "10001"
        }))
        .unwrap();

        let err = normalize(&raw, &registry).unwrap_err();
        assert!(matches!(err, FetchError::Schema { provider: ProviderId::Amap, .. }));
        assert!(err.to_string().contains("INVALID_USER_KEY"));
    }

    #[tokio::test]
    async fn resolves_adcode_then_fetches_forecast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .and(query_param("location", "125.32,46.39"))
            .and(query_param("key", "AMAP_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(regeo_body(json!("230681"))))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/weather/weatherInfo"))
            .and(query_param("city", "230681"))
            .and(query_param("extensions", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![cast(
                "2025-01-10",
                "多云",
                "-8",
                "-21",
                "1-3",
            )])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let days = provider.fetch_forecast(&Location::ad_hoc("Anda", 46.39, 125.32)).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].weather_desc, "多云");
        assert_eq!(days[0].weather_icon, "⛅");
    }

    #[tokio::test]
    async fn preset_code_skips_geocoding() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(regeo_body(json!("000000"))))
            .expect(0)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/weather/weatherInfo"))
            .and(query_param("city", "230681"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![cast(
                "2025-01-10",
                "阴",
                "-8",
                "-21",
                "1-3",
            )])))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let mut location = Location::ad_hoc("Anda", 46.39, 125.32);
        location.provider_code = Some("230681".into());

        let days = provider.fetch_forecast(&location).await.unwrap();
        assert_eq!(days[0].weather_icon, "☁️");
    }

    #[tokio::test]
    async fn empty_adcode_short_circuits_before_forecast_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(regeo_body(json!([]))))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/weather/weatherInfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let err = provider.fetch_forecast(&Location::ad_hoc("Sea", 30.0, 140.0)).await.unwrap_err();

        assert!(matches!(err, FetchError::UnresolvedKey { provider: ProviderId::Amap, .. }));
    }

    #[tokio::test]
    async fn geocoder_error_status_is_unresolved_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "info": "INVALID_USER_KEY"
            })))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let err = provider.fetch_forecast(&Location::ad_hoc("Anda", 46.39, 125.32)).await.unwrap_err();

        assert!(matches!(err, FetchError::UnresolvedKey { .. }));
        assert!(err.to_string().contains("INVALID_USER_KEY"));
    }

    #[tokio::test]
    async fn geocoder_body_without_status_is_unresolved_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "info": "OK" })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/weather/weatherInfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let err = provider.fetch_forecast(&Location::ad_hoc("Anda", 46.39, 125.32)).await.unwrap_err();

        assert!(matches!(err, FetchError::UnresolvedKey { provider: ProviderId::Amap, .. }));
    }

    #[tokio::test]
    async fn geocoder_server_error_is_http_status_and_skips_forecast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/geocode/regeo"))
            .respond_with(ResponseTemplate::new(500).set_body_string("geocoder down"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/weather/weatherInfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(vec![])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let err = provider.fetch_forecast(&Location::ad_hoc("Anda", 46.39, 125.32)).await.unwrap_err();

        match err {
            FetchError::HttpStatus { provider, status, .. } => {
                assert_eq!(provider, ProviderId::Amap);
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
