//! Open-Meteo weather and air-quality client.
//!
//! Weather comes from the forecast API (`current` block plus `hourly`
//! series for the look-ahead snapshot, all in UTC). AQI comes from the
//! separate air-quality API; if that call fails the default AQI is used
//! and the weather is still returned.
//!
//! See <https://open-meteo.com/en/docs>

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};

use super::WeatherProvider;
use crate::error::ProviderError;
use crate::models::{DEFAULT_AQI, GeoPoint, WeatherCondition, WeatherReport, WeatherSnapshot};

const VARIABLES: &str = "temperature_2m,precipitation,wind_speed_10m,weather_code";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct OpenMeteoWeather {
    client: reqwest::Client,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoWeather {
    #[must_use]
    pub const fn new(client: reqwest::Client, forecast_url: String, air_quality_url: String) -> Self {
        Self {
            client,
            forecast_url,
            air_quality_url,
        }
    }

    async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<serde_json::Value, ProviderError> {
        Ok(self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn fetch_aqi(&self, at: GeoPoint) -> Result<u8, ProviderError> {
        let body = self
            .fetch_json(
                &self.air_quality_url,
                &[
                    ("latitude", at.lat.to_string()),
                    ("longitude", at.lon.to_string()),
                    ("current", "european_aqi".to_string()),
                ],
            )
            .await?;
        parse_aqi(&body)
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenMeteoWeather {
    async fn weather(&self, at: GeoPoint, lookahead_hours: u32) -> Result<WeatherReport, ProviderError> {
        let forecast_params = [
            ("latitude", at.lat.to_string()),
            ("longitude", at.lon.to_string()),
            ("current", VARIABLES.to_string()),
            ("hourly", VARIABLES.to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("timezone", "UTC".to_string()),
            ("forecast_days", "2".to_string()),
        ];

        let (forecast, aqi) = tokio::join!(
            self.fetch_json(&self.forecast_url, &forecast_params),
            self.fetch_aqi(at)
        );

        let aqi = aqi.unwrap_or_else(|e| {
            log::warn!("Air quality unavailable ({e}), using default AQI {DEFAULT_AQI}");
            DEFAULT_AQI
        });

        parse_forecast(&forecast?, aqi, lookahead_hours)
    }
}

/// Maps the European AQI (0-100+) onto the 1-5 ordinal scale.
#[must_use]
pub fn european_aqi_to_ordinal(eaqi: f64) -> u8 {
    match eaqi {
        x if x <= 20.0 => 1,
        x if x <= 40.0 => 2,
        x if x <= 60.0 => 3,
        x if x <= 80.0 => 4,
        _ => 5,
    }
}

fn parse_aqi(body: &serde_json::Value) -> Result<u8, ProviderError> {
    body["current"]["european_aqi"]
        .as_f64()
        .map(european_aqi_to_ordinal)
        .ok_or_else(|| ProviderError::Parse {
            message: "Missing current.european_aqi".to_string(),
        })
}

fn parse_time(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.as_str()?, TIME_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

/// Builds a snapshot from one set of readings. Missing numbers fall back
/// to calm values; an unknown weather code maps to `Other`.
fn snapshot(
    observed_at: DateTime<Utc>,
    temperature: &serde_json::Value,
    precipitation: &serde_json::Value,
    wind: &serde_json::Value,
    code: &serde_json::Value,
    aqi: u8,
) -> WeatherSnapshot {
    let condition = code
        .as_u64()
        .and_then(|c| u16::try_from(c).ok())
        .map_or(WeatherCondition::Other, WeatherCondition::from_wmo_code);

    WeatherSnapshot {
        condition,
        temperature_c: temperature.as_f64().unwrap_or(20.0),
        wind_speed_kmh: wind.as_f64().unwrap_or(0.0).max(0.0),
        precipitation_mm: precipitation.as_f64().unwrap_or(0.0).max(0.0),
        aqi,
        observed_at,
    }
}

fn parse_forecast(
    body: &serde_json::Value,
    aqi: u8,
    lookahead_hours: u32,
) -> Result<WeatherReport, ProviderError> {
    let current = &body["current"];
    let observed_at = parse_time(&current["time"]).ok_or_else(|| ProviderError::Parse {
        message: "Missing current.time in Open-Meteo response".to_string(),
    })?;

    let current_snapshot = snapshot(
        observed_at,
        &current["temperature_2m"],
        &current["precipitation"],
        &current["wind_speed_10m"],
        &current["weather_code"],
        aqi,
    );

    let future = future_snapshot(&body["hourly"], observed_at, lookahead_hours, aqi);
    if future.is_none() {
        log::debug!("No hourly forecast {lookahead_hours}h after {observed_at}");
    }

    Ok(WeatherReport {
        current: current_snapshot,
        future,
    })
}

/// Picks the hourly entry `lookahead_hours` after the current hour.
fn future_snapshot(
    hourly: &serde_json::Value,
    observed_at: DateTime<Utc>,
    lookahead_hours: u32,
    aqi: u8,
) -> Option<WeatherSnapshot> {
    let target = observed_at.with_minute(0)?.with_second(0)?
        + Duration::hours(i64::from(lookahead_hours));

    let index = hourly["time"]
        .as_array()?
        .iter()
        .position(|t| parse_time(t) == Some(target))?;

    Some(snapshot(
        target,
        &hourly["temperature_2m"][index],
        &hourly["precipitation"][index],
        &hourly["wind_speed_10m"][index],
        &hourly["weather_code"][index],
        aqi,
    ))
}
