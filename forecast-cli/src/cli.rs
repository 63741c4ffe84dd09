use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    Aggregator, Config, Location, ProviderId, Registry, config::api_key_env_var,
    provider::http_client,
};
use inquire::{Password, PasswordDisplayMode};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Compare daily forecasts across weather providers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweathermap" or "amap".
        provider: String,
    },

    /// List known providers and whether they are ready to use.
    Providers,

    /// List configured locations.
    Locations,

    /// Show the merged 5-day forecast.
    Show {
        /// Location id; the configured default when omitted.
        #[arg(conflicts_with_all = ["all", "lat"])]
        location: Option<String>,

        /// Show every configured location.
        #[arg(long, conflicts_with = "lat")]
        all: bool,

        /// Restrict to these providers (repeatable); all ready providers by default.
        #[arg(long = "provider", short = 'p')]
        providers: Vec<String>,

        /// Latitude of an ad-hoc location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of an ad-hoc location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Display name for an ad-hoc location.
        #[arg(long, requires = "lat")]
        name: Option<String>,

        /// Print the aggregation result as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Providers => list_providers(),
            Command::Locations => list_locations(),
            Command::Show { location, all, providers, lat, lon, name, json } => {
                let config = Config::load()?;
                let locations = match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        let name = name.unwrap_or_else(|| format!("{lat:.2}, {lon:.2}"));
                        vec![Location::ad_hoc(name, lat, lon)]
                    }
                    _ if all => config.locations(),
                    _ => vec![resolve_location(&config, location.as_deref())?],
                };
                show(&config, &locations, &providers, json).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let provider_id = ProviderId::try_from(provider)?;

    if !provider_id.requires_api_key() {
        println!("{provider_id} needs no API key.");
        return Ok(());
    }

    let mut config = Config::load()?;
    if config.is_provider_configured(provider_id) {
        println!("{provider_id} already has a key; entering a new one replaces it.");
    }

    let api_key = Password::new(&format!("API key for {provider_id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(provider_id, api_key);
    config.save()?;

    println!("Saved {provider_id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

fn list_providers() -> anyhow::Result<()> {
    let config = Config::load()?;
    let registry = Registry::from_config(&config);

    for descriptor in registry.list_providers() {
        let status = if descriptor.is_ready() {
            "ready".to_string()
        } else {
            format!(
                "needs key (`forecast configure {}` or {})",
                descriptor.id,
                api_key_env_var(descriptor.id)
            )
        };
        println!(
            "{} {:<15} {:<16} {status}",
            descriptor.icon, descriptor.id, descriptor.display_name
        );
    }

    Ok(())
}

fn list_locations() -> anyhow::Result<()> {
    let config = Config::load()?;
    let default = config.default_location().ok().map(|loc| loc.id);

    for location in config.locations() {
        let marker = if default.as_deref() == Some(location.id.as_str()) { "*" } else { " " };
        println!(
            "{marker} {:<10} {:<12} {:>8.2} {:>8.2}  {}",
            location.id,
            location.name,
            location.latitude,
            location.longitude,
            location.timezone.as_deref().unwrap_or("auto"),
        );
    }

    Ok(())
}

fn resolve_location(config: &Config, id: Option<&str>) -> anyhow::Result<Location> {
    match id {
        Some(id) => config.location(id).ok_or_else(|| {
            anyhow!("Unknown location '{id}'.\nHint: run `forecast locations` to list configured ones.")
        }),
        None => config.default_location(),
    }
}

async fn show(
    config: &Config,
    locations: &[Location],
    requested: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let registry = Arc::new(Registry::from_config(config));
    let http = http_client(config.request_timeout()).context("Failed to build HTTP client")?;
    let priority = config.priority_ids()?;
    let aggregator = Aggregator::from_registry(registry, priority.clone(), &http, config.language());

    let provider_ids = if requested.is_empty() {
        let mut available = aggregator.available();
        available.sort_by_key(|id| priority.iter().position(|p| p == id).unwrap_or(priority.len()));
        available
    } else {
        requested
            .iter()
            .map(|p| ProviderId::try_from(p.as_str()))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let outcomes = aggregator.aggregate_all(locations, &provider_ids).await;

    let mut failed = 0;
    let mut results = Vec::new();
    for (location, outcome) in locations.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", location.name);
            }
        }
    }

    if json {
        let out = match results.as_slice() {
            [single] if locations.len() == 1 => serde_json::to_string_pretty(single),
            _ => serde_json::to_string_pretty(&results),
        }
        .context("Failed to serialize forecast")?;
        println!("{out}");
    } else {
        for result in &results {
            println!("{}", render::render_result(result));
        }
    }

    if failed > 0 {
        bail!("no forecast data for {failed} of {} location(s)", locations.len());
    }

    Ok(())
}
