//! Geoapify routing client.
//!
//! Requests driving routes with alternatives and reads the `GeoJSON`
//! response: one feature per route, geometry as a `LineString` or a
//! `MultiLineString` (one line per leg), `properties.distance` in metres
//! and `properties.time` in seconds.
//!
//! See <https://apidocs.geoapify.com/docs/routing/>

use super::RoutingProvider;
use crate::error::ProviderError;
use crate::models::{GeoPoint, RouteCandidate, RoutePolyline};

pub struct GeoapifyRouter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    alternatives: u8,
}

impl GeoapifyRouter {
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        alternatives: u8,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            alternatives,
        }
    }
}

#[async_trait::async_trait]
impl RoutingProvider for GeoapifyRouter {
    async fn routes(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<RouteCandidate>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey {
            variable: "GEOAPIFY_API_KEY",
        })?;

        let waypoints = format!("{},{}|{},{}", from.lat, from.lon, to.lat, to.lon);
        let alternatives = self.alternatives.to_string();

        log::info!("Fetching routes from Geoapify...");
        let body: serde_json::Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("waypoints", waypoints.as_str()),
                ("mode", "drive"),
                ("alternatives", alternatives.as_str()),
                ("format", "geojson"),
                ("apiKey", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let routes = parse_routes(&body)?;
        log::info!("Geoapify returned {} route(s)", routes.len());
        Ok(routes)
    }
}

/// Parses a Geoapify `FeatureCollection` into route candidates.
///
/// Features without usable geometry or metrics are skipped rather than
/// failing the whole response.
fn parse_routes(body: &serde_json::Value) -> Result<Vec<RouteCandidate>, ProviderError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| ProviderError::Parse {
            message: "Geoapify response has no features array".to_string(),
        })?;

    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| {
            let candidate = parse_feature(feature);
            if candidate.is_none() {
                log::warn!("Skipping malformed Geoapify route feature {i}");
            }
            candidate
        })
        .collect())
}

fn parse_feature(feature: &serde_json::Value) -> Option<RouteCandidate> {
    let geometry = &feature["geometry"];
    let coords = geometry["coordinates"].as_array()?;

    let lines: Vec<&serde_json::Value> = match geometry["type"].as_str()? {
        "LineString" => vec![&geometry["coordinates"]],
        "MultiLineString" => coords.iter().collect(),
        _ => return None,
    };

    let points: Vec<GeoPoint> = lines
        .iter()
        .filter_map(|line| line.as_array())
        .flatten()
        .filter_map(|pair| Some(GeoPoint::new(pair[1].as_f64()?, pair[0].as_f64()?)))
        .collect();

    let distance_meters = feature["properties"]["distance"].as_f64()?;
    let base_duration_seconds = feature["properties"]["time"].as_f64()?;

    Some(RouteCandidate {
        geometry: RoutePolyline::new(points).ok()?,
        distance_meters: distance_meters.max(0.0),
        base_duration_seconds: base_duration_seconds.max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_line_and_multiline_features() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [[[77.20, 28.60], [77.21, 28.61]], [[77.21, 28.61], [77.22, 28.62]]]
                    },
                    "properties": {"distance": 3200, "time": 540.5}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[77.20, 28.60], [77.23, 28.63]]
                    },
                    "properties": {"distance": 4100, "time": 600}
                }
            ]
        });

        let routes = parse_routes(&body).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].geometry.vertex_count(), 4);
        assert_eq!(routes[0].geometry.points()[0], GeoPoint::new(28.60, 77.20));
        assert!((routes[0].base_duration_seconds - 540.5).abs() < f64::EPSILON);
        assert!((routes[1].distance_meters - 4100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_features_without_metrics_or_geometry() {
        let body = json!({
            "features": [
                {"geometry": {"type": "LineString", "coordinates": [[77.2, 28.6], [77.3, 28.7]]}, "properties": {}},
                {"geometry": {"type": "LineString", "coordinates": [[77.2, 28.6]]}, "properties": {"distance": 1, "time": 1}},
                {"geometry": {"type": "Point", "coordinates": [77.2, 28.6]}, "properties": {"distance": 1, "time": 1}}
            ]
        });
        assert!(parse_routes(&body).unwrap().is_empty());
    }

    #[test]
    fn error_body_is_parse_error() {
        let body = json!({"statusCode": 401, "message": "Invalid apiKey"});
        assert!(matches!(parse_routes(&body), Err(ProviderError::Parse { .. })));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let router = GeoapifyRouter::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1/routing".to_string(),
            None,
            3,
        );
        let err = router
            .routes(GeoPoint::new(28.6, 77.2), GeoPoint::new(28.7, 77.3))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }
}
