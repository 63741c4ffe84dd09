use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{error::FailureKind, provider::ProviderId, registry::ProviderDescriptor};

/// Number of consecutive days every adapter asks for and keeps.
pub const FORECAST_DAYS: usize = 5;

/// A place forecasts are requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name; providers fall back to their own detection when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Pre-resolved location key for two-step providers (AMap adcode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
}

impl Location {
    /// Session-local location built from bare coordinates.
    pub fn ad_hoc(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: "custom".to_string(),
            name: name.into(),
            latitude,
            longitude,
            timezone: None,
            provider_code: None,
        }
    }
}

/// Provider-native weather condition token.
///
/// Codes carry no meaning outside the table of the provider that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherCode {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherCode::Numeric(n) => write!(f, "{n}"),
            WeatherCode::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for WeatherCode {
    fn from(value: i64) -> Self {
        WeatherCode::Numeric(value)
    }
}

impl From<&str> for WeatherCode {
    fn from(value: &str) -> Self {
        WeatherCode::Text(value.to_string())
    }
}

/// Description and display glyph for one weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCodeEntry {
    pub description: &'static str,
    pub icon: &'static str,
}

impl WeatherCodeEntry {
    pub const UNKNOWN: WeatherCodeEntry = WeatherCodeEntry { description: "unknown", icon: "?" };
}

/// Canonical per-day forecast produced by every adapter.
///
/// Temperatures are °C, precipitation mm, probability 0–100, wind km/h.
/// Sun times keep the provider's own format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_high: Option<f64>,
    pub temp_low: Option<f64>,
    pub temp_apparent_high: Option<f64>,
    pub temp_apparent_low: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_prob: Option<f64>,
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub weather_code: Option<WeatherCode>,
    pub weather_desc: String,
    pub weather_icon: String,
}

impl DailyForecast {
    /// `temp_high >= temp_low` whenever both are known.
    pub fn has_consistent_temps(&self) -> bool {
        match (self.temp_high, self.temp_low) {
            (Some(high), Some(low)) => high >= low,
            _ => true,
        }
    }
}

/// One provider's record for a date, tagged with the provider's display metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderDay {
    #[serde(flatten)]
    pub forecast: DailyForecast,
    pub provider_name: String,
    pub provider_color: String,
    pub provider_icon: String,
}

impl ProviderDay {
    pub fn new(descriptor: &ProviderDescriptor, forecast: DailyForecast) -> Self {
        Self {
            forecast,
            provider_name: descriptor.display_name.clone(),
            provider_color: descriptor.color.clone(),
            provider_icon: descriptor.icon.clone(),
        }
    }
}

/// All providers' data for one calendar date plus a representative default set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedDay {
    pub date: NaiveDate,
    pub temp_high: Option<f64>,
    pub temp_low: Option<f64>,
    pub weather_desc: String,
    pub weather_icon: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    /// Provider whose record seeded the default fields.
    pub default_provider: ProviderId,
    pub providers: BTreeMap<ProviderId, ProviderDay>,
}

impl MergedDay {
    pub(crate) fn seed(provider: ProviderId, forecast: &DailyForecast) -> Self {
        Self {
            date: forecast.date,
            temp_high: forecast.temp_high,
            temp_low: forecast.temp_low,
            weather_desc: forecast.weather_desc.clone(),
            weather_icon: forecast.weather_icon.clone(),
            sunrise: None,
            sunset: None,
            default_provider: provider,
            providers: BTreeMap::new(),
        }
    }
}

/// A provider that contributed nothing to an aggregation, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.provider, self.kind, self.message)
    }
}

/// Outcome of one aggregation run for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub location: Option<String>,
    /// Keyed by date, iterates in ascending order.
    pub days: BTreeMap<NaiveDate, MergedDay>,
    pub failures: Vec<ProviderFailure>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(high: Option<f64>, low: Option<f64>) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            temp_high: high,
            temp_low: low,
            temp_apparent_high: None,
            temp_apparent_low: None,
            precipitation: None,
            precipitation_prob: None,
            wind_speed: None,
            uv_index: None,
            sunrise: None,
            sunset: None,
            weather_code: None,
            weather_desc: "unknown".into(),
            weather_icon: "?".into(),
        }
    }

    #[test]
    fn consistent_temps_accepts_missing_values() {
        assert!(day(None, Some(3.0)).has_consistent_temps());
        assert!(day(Some(3.0), None).has_consistent_temps());
        assert!(day(Some(3.0), Some(3.0)).has_consistent_temps());
        assert!(!day(Some(1.0), Some(3.0)).has_consistent_temps());
    }

    #[test]
    fn weather_code_serializes_untagged() {
        let numeric = serde_json::to_string(&WeatherCode::Numeric(1003)).unwrap();
        let text = serde_json::to_string(&WeatherCode::from("晴")).unwrap();

        assert_eq!(numeric, "1003");
        assert_eq!(text, "\"晴\"");
    }

    #[test]
    fn ad_hoc_location_has_no_timezone() {
        let loc = Location::ad_hoc("Harbin", 45.75, 126.65);
        assert_eq!(loc.id, "custom");
        assert!(loc.timezone.is_none());
        assert!(loc.provider_code.is_none());
    }
}
