//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A registry of provider metadata and weather-code tables
//! - One adapter per upstream forecast API, normalizing into [`DailyForecast`]
//! - The [`Aggregator`], which queries providers concurrently and merges by date
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod registry;

pub use aggregate::Aggregator;
pub use config::{Config, ProviderConfig};
pub use error::{AggregateError, FailureKind, FetchError};
pub use model::{
    AggregationResult, DailyForecast, Location, MergedDay, ProviderDay, ProviderFailure,
    WeatherCode, WeatherCodeEntry,
};
pub use provider::{ForecastProvider, ProviderId, RawForecast};
pub use registry::{ProviderDescriptor, Registry};
