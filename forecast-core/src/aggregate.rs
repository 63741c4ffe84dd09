//! Concurrent fan-out to every requested provider and date-keyed merge of the results.
//!
//! Each provider call is isolated: one failing or slow provider never cancels the
//! others. Results are joined per provider first and merged afterwards, so the
//! merge itself needs no synchronization.

use futures::future::join_all;
use reqwest::Client;
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use tracing::{info, warn};

use crate::{
    error::{AggregateError, FetchError},
    model::{AggregationResult, DailyForecast, Location, MergedDay, ProviderDay, ProviderFailure},
    provider::{ForecastProvider, ProviderId, provider_from_registry},
    registry::{ProviderDescriptor, Registry},
};

/// The provider whose sun times are shown for a day whenever it has that day.
const SUN_TIME_SOURCE: ProviderId = ProviderId::OpenMeteo;

#[derive(Debug)]
pub struct Aggregator {
    registry: Arc<Registry>,
    priority: Vec<ProviderId>,
    providers: BTreeMap<ProviderId, Arc<dyn ForecastProvider>>,
}

impl Aggregator {
    /// Empty aggregator; register providers with [`Aggregator::with_provider`].
    pub fn new(registry: Arc<Registry>, priority: Vec<ProviderId>) -> Self {
        Self { registry, priority, providers: BTreeMap::new() }
    }

    /// Aggregator with an adapter for every provider whose key requirement is met.
    pub fn from_registry(
        registry: Arc<Registry>,
        priority: Vec<ProviderId>,
        http: &Client,
        language: &str,
    ) -> Self {
        let mut aggregator = Self::new(Arc::clone(&registry), priority);

        for descriptor in registry.list_providers() {
            match provider_from_registry(descriptor.id, &registry, http, language) {
                Ok(provider) => aggregator = aggregator.with_provider(provider),
                Err(e) => info!(provider = %descriptor.id, "skipping provider: {e}"),
            }
        }

        aggregator
    }

    pub fn with_provider(mut self, provider: Arc<dyn ForecastProvider>) -> Self {
        self.providers.insert(provider.id(), provider);
        self
    }

    /// Providers that can actually be queried.
    pub fn available(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }

    /// Fetch every requested provider concurrently and merge successes by date.
    ///
    /// Partial failure yields `Ok` with the failures listed; only when every
    /// requested provider fails is an error returned.
    pub async fn aggregate(
        &self,
        location: &Location,
        provider_ids: &[ProviderId],
    ) -> Result<AggregationResult, AggregateError> {
        let mut seen = HashSet::new();
        let requested: Vec<ProviderId> =
            provider_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        info!(location = %location.name, providers = ?requested, "aggregating forecasts");

        let calls = requested.iter().map(|&id| async move {
            let outcome = match self.providers.get(&id) {
                Some(provider) => provider.fetch_forecast(location).await,
                None => Err(FetchError::NotConfigured {
                    provider: id,
                    reason: "provider is not available in this session".to_string(),
                }),
            };
            (id, outcome)
        });
        let outcomes = join_all(calls).await;

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(days) => successes.push((id, days)),
                Err(e) => {
                    warn!(provider = %id, kind = %e.kind(), "provider failed: {e}");
                    failures.push(ProviderFailure::from(&e));
                }
            }
        }

        if successes.is_empty() && !failures.is_empty() {
            return Err(AggregateError::AllProvidersFailed {
                location: location.name.clone(),
                failures,
            });
        }

        let days = self.merge(successes);

        info!(
            location = %location.name,
            days = days.len(),
            failed = failures.len(),
            "aggregation finished"
        );

        Ok(AggregationResult { location: Some(location.name.clone()), days, failures })
    }

    /// Aggregate several locations concurrently; results keep the input order.
    pub async fn aggregate_all(
        &self,
        locations: &[Location],
        provider_ids: &[ProviderId],
    ) -> Vec<Result<AggregationResult, AggregateError>> {
        join_all(locations.iter().map(|location| self.aggregate(location, provider_ids))).await
    }

    fn rank(&self, id: ProviderId) -> (usize, ProviderId) {
        let position = self.priority.iter().position(|p| *p == id).unwrap_or(self.priority.len());
        (position, id)
    }

    fn merge(
        &self,
        mut successes: Vec<(ProviderId, Vec<DailyForecast>)>,
    ) -> BTreeMap<chrono::NaiveDate, MergedDay> {
        successes.sort_by_key(|(id, _)| self.rank(*id));

        let mut days: BTreeMap<chrono::NaiveDate, MergedDay> = BTreeMap::new();

        for (id, forecasts) in successes {
            let descriptor = self
                .registry
                .descriptor(id)
                .cloned()
                .unwrap_or_else(|| ProviderDescriptor::builtin(id));

            for forecast in forecasts {
                let merged =
                    days.entry(forecast.date).or_insert_with(|| MergedDay::seed(id, &forecast));

                fill_sun_time(&mut merged.sunrise, &forecast.sunrise, id);
                fill_sun_time(&mut merged.sunset, &forecast.sunset, id);

                merged.providers.insert(id, ProviderDay::new(&descriptor, forecast));
            }
        }

        days
    }
}

/// Sources arrive in priority order: the first reported value sticks unless
/// the preferred sun-time source reports one.
fn fill_sun_time(slot: &mut Option<String>, value: &Option<String>, source: ProviderId) {
    if value.is_some() && (slot.is_none() || source == SUN_TIME_SOURCE) {
        slot.clone_from(value);
    }
}
