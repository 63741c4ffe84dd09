use serde::Serialize;
use std::fmt;

use crate::{model::ProviderFailure, provider::ProviderId};

/// Why a single provider produced no forecast.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: HTTP {status}: {body}")]
    HttpStatus { provider: ProviderId, status: u16, body: String },

    #[error("{provider}: unexpected response: {reason}")]
    Schema { provider: ProviderId, reason: String },

    #[error("{provider}: could not resolve location key: {reason}")]
    UnresolvedKey { provider: ProviderId, reason: String },

    #[error("{provider}: not configured: {reason}")]
    NotConfigured { provider: ProviderId, reason: String },
}

impl FetchError {
    pub fn provider(&self) -> ProviderId {
        match self {
            FetchError::Transport { provider, .. }
            | FetchError::HttpStatus { provider, .. }
            | FetchError::Schema { provider, .. }
            | FetchError::UnresolvedKey { provider, .. }
            | FetchError::NotConfigured { provider, .. } => *provider,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport { .. } => FailureKind::Transport,
            FetchError::HttpStatus { .. } => FailureKind::HttpStatus,
            FetchError::Schema { .. } => FailureKind::Schema,
            FetchError::UnresolvedKey { .. } => FailureKind::UnresolvedKey,
            FetchError::NotConfigured { .. } => FailureKind::NotConfigured,
        }
    }

    pub(crate) fn schema(provider: ProviderId, reason: impl Into<String>) -> Self {
        FetchError::Schema { provider, reason: reason.into() }
    }

    pub(crate) fn unresolved(provider: ProviderId, reason: impl Into<String>) -> Self {
        FetchError::UnresolvedKey { provider, reason: reason.into() }
    }
}

impl From<&FetchError> for ProviderFailure {
    fn from(err: &FetchError) -> Self {
        ProviderFailure { provider: err.provider(), kind: err.kind(), message: err.to_string() }
    }
}

/// Serializable tag for [`FetchError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    HttpStatus,
    Schema,
    UnresolvedKey,
    NotConfigured,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Schema => "schema",
            FailureKind::UnresolvedKey => "unresolved_key",
            FailureKind::NotConfigured => "not_configured",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("every provider failed for {location}: {}", join_failures(.failures))]
    AllProvidersFailed { location: String, failures: Vec<ProviderFailure> },
}

impl AggregateError {
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            AggregateError::AllProvidersFailed { failures, .. } => failures,
        }
    }
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
