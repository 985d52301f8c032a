//! Location input resolution.
//!
//! Users may type either an address or a raw `"lat, lon"` pair (the
//! client sends the latter for "use my location"). Raw pairs never reach
//! the geocoder.

use super::Geocoder;
use crate::error::ProviderError;
use crate::models::GeoPoint;

/// Parses `"lat, lon"` into a point. Returns `None` for anything else,
/// including out-of-range pairs.
#[must_use]
pub fn parse_coordinates(input: &str) -> Option<GeoPoint> {
    let (lat, lon) = input.split_once(',')?;
    let point = GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    point.is_valid().then_some(point)
}

/// Resolves `input` to a coordinate, geocoding only when it is not a
/// coordinate pair.
///
/// # Errors
///
/// Returns [`ProviderError`] if geocoding is needed and fails.
pub async fn resolve_location(geocoder: &dyn Geocoder, input: &str) -> Result<GeoPoint, ProviderError> {
    if let Some(point) = parse_coordinates(input) {
        return Ok(point);
    }
    log::info!("Geocoding \"{input}\"");
    geocoder.geocode(input).await
}
