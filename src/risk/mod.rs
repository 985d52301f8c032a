//! Pluggable risk models.
//!
//! A [`RiskModel`] scores the driving conditions of a route: weather, trip
//! length and time of day. Hazards along the route are not part of the
//! model input; the scorer adds them on top of whatever the model returns.
//!
//! Implementations:
//! - [`heuristic::LocalHeuristic`]: additive point system, never fails.
//! - [`remote::RemoteModel`]: HTTP prediction service, unreliable.
//! - [`fallback::FallbackModel`]: tries one model, falls back to another.

pub mod fallback;
pub mod heuristic;
pub mod remote;

use strum_macros::{AsRefStr, Display};

use crate::error::ScoringError;
use crate::models::{RouteCandidate, WeatherSnapshot};

/// Routes longer than this are treated as highway trips by the remote model.
const HIGHWAY_DISTANCE_METERS: f64 = 15_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum RoadType {
    Highway,
    #[strum(serialize = "City Street")]
    CityStreet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum TimeOfDay {
    Day,
    Night,
}

/// Inputs shared by every risk model.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskFeatures {
    pub weather: WeatherSnapshot,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Local hour of departure, `0..24`.
    pub departure_hour: u8,
}

impl RiskFeatures {
    #[must_use]
    pub fn new(weather: &WeatherSnapshot, route: &RouteCandidate, departure_hour: u8) -> Self {
        Self {
            weather: weather.clone(),
            distance_meters: route.distance_meters,
            duration_seconds: route.base_duration_seconds,
            departure_hour: departure_hour % 24,
        }
    }

    #[must_use]
    pub fn road_type(&self) -> RoadType {
        if self.distance_meters > HIGHWAY_DISTANCE_METERS {
            RoadType::Highway
        } else {
            RoadType::CityStreet
        }
    }

    #[must_use]
    pub const fn time_of_day(&self) -> TimeOfDay {
        if self.departure_hour >= 20 || self.departure_hour < 6 {
            TimeOfDay::Night
        } else {
            TimeOfDay::Day
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ModelSource {
    #[strum(serialize = "local")]
    Local,
    #[strum(serialize = "remote")]
    Remote,
}

/// Condition score produced by a model, before hazards are added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskResult {
    /// Unclamped points, including the baseline.
    pub score: u32,
    pub factors: Vec<String>,
    /// Short description of the largest contributor, if any.
    pub headline: Option<String>,
    pub source: ModelSource,
}

#[async_trait::async_trait]
pub trait RiskModel: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Scores the driving conditions described by `features`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] if the model is unavailable or answers
    /// with an unusable payload.
    async fn score(&self, features: &RiskFeatures) -> Result<RiskResult, ScoringError>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{GeoPoint, RoutePolyline};

    fn features(distance_meters: f64, departure_hour: u8) -> RiskFeatures {
        let route = RouteCandidate {
            geometry: RoutePolyline::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.1)])
                .unwrap(),
            distance_meters,
            base_duration_seconds: 600.0,
        };
        RiskFeatures::new(&WeatherSnapshot::fallback(Utc::now()), &route, departure_hour)
    }

    #[test]
    fn road_type_follows_distance() {
        assert_eq!(features(20_000.0, 12).road_type(), RoadType::Highway);
        assert_eq!(features(5_000.0, 12).road_type().to_string(), "City Street");
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(features(1.0, 21).time_of_day(), TimeOfDay::Night);
        assert_eq!(features(1.0, 5).time_of_day(), TimeOfDay::Night);
        assert_eq!(features(1.0, 6).time_of_day(), TimeOfDay::Day);
    }

    #[test]
    fn departure_hour_wraps() {
        assert_eq!(features(1.0, 26).departure_hour, 2);
    }
}
