//! Photon (Komoot) geocoder client.
//!
//! See <https://photon.komoot.io/>

use super::Geocoder;
use crate::error::ProviderError;
use crate::models::GeoPoint;

pub struct PhotonGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl PhotonGeocoder {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait::async_trait]
impl Geocoder for PhotonGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeoPoint, ProviderError> {
        let body: serde_json::Value = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_response(&body)?.ok_or_else(|| ProviderError::NotFound {
            query: query.to_string(),
        })
    }
}

/// Parses a Photon `GeoJSON` `FeatureCollection`, returning the first hit.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeoPoint>, ProviderError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| ProviderError::Parse {
            message: "Photon response has no features array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    // GeoJSON order is [lon, lat].
    let coords = &first["geometry"]["coordinates"];
    match (coords[0].as_f64(), coords[1].as_f64()) {
        (Some(lon), Some(lat)) => Ok(Some(GeoPoint::new(lat, lon))),
        _ => Err(ProviderError::Parse {
            message: "Missing coordinates in Photon feature".to_string(),
        }),
    }
}
