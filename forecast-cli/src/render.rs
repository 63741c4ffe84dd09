//! Plain-text rendering of aggregation results.

use chrono::{NaiveDateTime, NaiveTime};
use forecast_core::{AggregationResult, MergedDay, ProviderDay};
use std::fmt::Write;

const MISSING: &str = "--";

pub fn render_result(result: &AggregationResult) -> String {
    let mut out = String::new();

    if let Some(name) = &result.location {
        writeln!(out, "{name}").ok();
        writeln!(out, "{}", "=".repeat(name.chars().count())).ok();
    }

    if result.is_empty() {
        out.push_str("No forecast data.\n");
    }

    for day in result.days.values() {
        render_day(&mut out, day);
    }

    if !result.failures.is_empty() {
        out.push_str("Unavailable providers:\n");
        for failure in &result.failures {
            writeln!(out, "  - {failure}").ok();
        }
    }

    out
}

fn render_day(out: &mut String, day: &MergedDay) {
    writeln!(
        out,
        "{}  {} {}  {} / {}  sunrise {}  sunset {}",
        day.date.format("%a %Y-%m-%d"),
        day.weather_icon,
        day.weather_desc,
        format_temp(day.temp_high),
        format_temp(day.temp_low),
        format_sun(day.sunrise.as_deref()),
        format_sun(day.sunset.as_deref()),
    )
    .ok();

    for entry in day.providers.values() {
        writeln!(out, "    {}", provider_row(entry)).ok();
    }
    out.push('\n');
}

fn provider_row(entry: &ProviderDay) -> String {
    let f = &entry.forecast;
    format!(
        "{} {:<16} {} {:<22} {} / {}  feels {} / {}  precip {} ({})  wind {}  UV {}",
        entry.provider_icon,
        entry.provider_name,
        f.weather_icon,
        f.weather_desc,
        format_temp(f.temp_high),
        format_temp(f.temp_low),
        format_temp(f.temp_apparent_high),
        format_temp(f.temp_apparent_low),
        format_unit(f.precipitation, "mm"),
        format_percent(f.precipitation_prob),
        format_unit(f.wind_speed, "km/h"),
        f.uv_index.map_or_else(|| MISSING.to_string(), |uv| format!("{uv:.1}")),
    )
}

pub fn format_temp(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |t| format!("{t:.1}°"))
}

fn format_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.1} {unit}"))
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |p| format!("{p:.0}%"))
}

fn format_sun(value: Option<&str>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_sun_time)
}

/// Normalize provider sun times to `HH:MM`.
///
/// Accepts ISO local date-times (`2025-01-10T07:01`), 12-hour clock (`07:01 AM`)
/// and 24-hour clock (`07:01`). Anything else is shown as-is.
pub fn format_sun_time(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return dt.format("%H:%M").to_string();
    }

    ["%I:%M %p", "%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .map_or_else(|| raw.to_string(), |t| t.format("%H:%M").to_string())
}
