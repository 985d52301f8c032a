//! Error types for the route risk pipeline.
//!
//! Only [`PlanError::NoRouteFound`] is a hard failure of the core. Every
//! other upstream failure is degraded to a default somewhere between the
//! providers and the scorer.

use std::time::Duration;

use thiserror::Error;

/// Errors from the geocoding, routing and weather HTTP clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// A provider that needs an API key was called without one.
    #[error("Missing API key: set {variable}")]
    MissingApiKey {
        /// Environment variable the key is read from.
        variable: &'static str,
    },

    /// The provider answered but had nothing for the query.
    #[error("Not found: {query}")]
    NotFound {
        /// The query that produced no result.
        query: String,
    },
}

/// Reasons a risk model could not produce a score.
///
/// These never escape [`crate::scorer::RiskScorer`]; they select the
/// local fallback path and are logged.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Remote model call failed at the HTTP level.
    #[error("risk model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote model did not answer within the configured bound.
    #[error("risk model timed out after {0:?}")]
    Timeout(Duration),

    /// Remote model answered without a usable score.
    #[error("incomplete risk model payload: {0}")]
    IncompletePayload(String),
}

/// Errors from the hazard store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reported location is not a valid WGS84 coordinate.
    #[error("invalid hazard location ({lat}, {lon})")]
    InvalidLocation {
        /// Latitude as submitted.
        lat: f64,
        /// Longitude as submitted.
        lon: f64,
    },
}

/// Errors surfaced by [`crate::planner::RoutePlanner::plan`].
#[derive(Debug, Error)]
pub enum PlanError {
    /// Start or end could not be resolved to a coordinate.
    #[error("could not resolve '{query}': {source}")]
    Geocoding {
        /// The address text that failed.
        query: String,
        /// Underlying provider failure.
        #[source]
        source: ProviderError,
    },

    /// The routing provider failed.
    #[error("routing service failed: {0}")]
    Routing(#[source] ProviderError),

    /// The routing provider returned zero candidates.
    #[error("no route found")]
    NoRouteFound,
}

/// Errors loading the tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`crate::config::Settings`].
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
