//! Upstream geocoding, routing and weather collaborators.
//!
//! Each concern is a trait; the planner only sees the traits, never the
//! HTTP clients. The HTTP implementations are:
//!
//! 1. **Photon** ([`photon`]): free-text geocoding, no API key.
//! 2. **Geoapify** ([`geoapify`]): driving routes with alternatives,
//!    needs `GEOAPIFY_API_KEY`.
//! 3. **Open-Meteo** ([`open_meteo`]): current weather, hourly forecast
//!    and air quality, no API key.

pub mod geoapify;
pub mod geocode;
pub mod open_meteo;
pub mod photon;

use std::time::Duration;

use crate::error::ProviderError;
use crate::models::{GeoPoint, RouteCandidate, WeatherReport};

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves free-form address text to a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if nothing matches, or another
    /// [`ProviderError`] if the request fails.
    async fn geocode(&self, query: &str) -> Result<GeoPoint, ProviderError>;
}

#[async_trait::async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Returns zero or more driving routes from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request fails.
    async fn routes(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<RouteCandidate>, ProviderError>;
}

#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather at `at`, plus a snapshot `lookahead_hours` ahead when
    /// the provider has one.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if current weather cannot be read.
    async fn weather(&self, at: GeoPoint, lookahead_hours: u32) -> Result<WeatherReport, ProviderError>;
}

/// Shared client with a request timeout.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if the client cannot be built.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("saferoute/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
