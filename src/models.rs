//! Data model shared by the matcher, scorer, synthesizer and planner.

use chrono::{DateTime, Utc};
use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use uuid::Uuid;

/// AQI substituted when the air-quality provider is unavailable.
pub const DEFAULT_AQI: u8 = 1;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` if both components are finite and inside WGS84 bounds.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// `geo` points are (x = lon, y = lat).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn haversine_km(self, other: Self) -> f64 {
        self.to_point().haversine_distance(&other.to_point()) / 1000.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("route polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
}

/// Ordered driving path from origin to destination, at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePolyline {
    points: Vec<GeoPoint>,
}

impl RoutePolyline {
    /// # Errors
    ///
    /// Returns [`ModelError::TooFewPoints`] for fewer than two points.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, ModelError> {
        if points.len() < 2 {
            return Err(ModelError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// The middle vertex, where weather is sampled for the route.
    #[must_use]
    pub fn midpoint(&self) -> GeoPoint {
        self.points[self.points.len() / 2]
    }
}

/// One physical path option returned by the routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub geometry: RoutePolyline,
    pub distance_meters: f64,
    /// Provider estimate with no hazards or weather applied.
    pub base_duration_seconds: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Fog,
    Snow,
    Other,
}

impl WeatherCondition {
    /// Maps a WMO weather interpretation code onto a condition.
    #[must_use]
    pub const fn from_wmo_code(code: u16) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51..=67 | 80..=82 => Self::Rain,
            71..=77 | 85 | 86 => Self::Snow,
            95..=99 => Self::Storm,
            _ => Self::Other,
        }
    }

    /// Rain is falling right now (storms imply rain).
    #[must_use]
    pub const fn is_raining(self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }
}

/// Point-in-time weather read near the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
    /// Ordinal 1 (good) to 5 (very poor).
    pub aqi: u8,
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Calm clear weather, used to score routes when no weather is available.
    #[must_use]
    pub const fn fallback(observed_at: DateTime<Utc>) -> Self {
        Self {
            condition: WeatherCondition::Clear,
            temperature_c: 20.0,
            wind_speed_kmh: 0.0,
            precipitation_mm: 0.0,
            aqi: DEFAULT_AQI,
            observed_at,
        }
    }
}

/// Current weather plus, when the provider has one, a look-ahead forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub current: WeatherSnapshot,
    pub future: Option<WeatherSnapshot>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum HazardType {
    Accident,
    Fog,
    Flooding,
    Pothole,
    Construction,
    Police,
    Traffic,
    #[serde(rename = "Traffic Jam")]
    #[strum(serialize = "Traffic Jam")]
    TrafficJam,
    #[serde(rename = "Road Closure")]
    #[strum(serialize = "Road Closure")]
    RoadClosure,
    Other,
}

/// A user-submitted point hazard. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardReport {
    pub id: Uuid,
    pub location: GeoPoint,
    pub hazard_type: HazardType,
    pub description: Option<String>,
    pub reported_at: DateTime<Utc>,
}

/// Presentation band for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorClass {
    Safe,
    Moderate,
    High,
}

impl ColorClass {
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Safe => "#00cc66",
            Self::Moderate => "#ff9933",
            Self::High => "#ff4d4d",
        }
    }

    /// Prefix used when composing assessment messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Low risk",
            Self::Moderate => "Caution",
            Self::High => "Danger",
        }
    }
}

/// Risk annotation attached to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyAssessment {
    /// Clamped to `0..=100`.
    pub score: u8,
    pub color_class: ColorClass,
    pub message: String,
    /// Contributing causes, each at most once.
    pub factors: Vec<String>,
    /// Extra travel time attributed to hazards.
    pub delay_seconds: u32,
}

/// Distance and hazard-adjusted duration of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteSummary {
    /// e.g. `"12.3 km"`.
    #[must_use]
    pub fn distance_text(&self) -> String {
        format!("{:.1} km", self.distance_meters / 1000.0)
    }

    /// e.g. `"25 min"`.
    #[must_use]
    pub fn duration_text(&self) -> String {
        format!("{:.0} min", (self.duration_seconds / 60.0).round())
    }
}

/// A candidate with its summary and safety assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRoute {
    pub id: usize,
    pub candidate: RouteCandidate,
    pub summary: RouteSummary,
    pub safety: SafetyAssessment,
    /// Derived by the alternative synthesizer; shares its base route's
    /// geometry rather than describing a distinct path.
    pub synthetic: bool,
}

impl AnnotatedRoute {
    #[must_use]
    pub const fn geometry(&self) -> &RoutePolyline {
        &self.candidate.geometry
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub should_wait: bool,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_rejects_single_point() {
        let err = RoutePolyline::new(vec![GeoPoint::new(28.6, 77.2)]).unwrap_err();
        assert_eq!(err, ModelError::TooFewPoints(1));
    }

    #[test]
    fn haversine_matches_known_distance() {
        // One degree of latitude is ~111.2 km.
        let d = GeoPoint::new(0.0, 0.0).haversine_km(GeoPoint::new(1.0, 0.0));
        assert!((d - 111.2).abs() < 0.5, "got {d}");
    }

    #[test]
    fn hazard_types_use_display_names() {
        assert_eq!(HazardType::TrafficJam.to_string(), "Traffic Jam");
        assert_eq!("Road Closure".parse::<HazardType>().unwrap(), HazardType::RoadClosure);
        let json = serde_json::to_string(&HazardType::TrafficJam).unwrap();
        assert_eq!(json, "\"Traffic Jam\"");
    }

    #[test]
    fn wmo_codes_map_to_conditions() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(63), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_wmo_code(95), WeatherCondition::Storm);
        assert_eq!(WeatherCondition::from_wmo_code(45), WeatherCondition::Fog);
        assert!(WeatherCondition::Storm.is_raining());
        assert!(!WeatherCondition::Fog.is_raining());
    }

    #[test]
    fn summary_text_formats() {
        let summary = RouteSummary {
            distance_meters: 12_345.0,
            duration_seconds: 1_530.0,
        };
        assert_eq!(summary.distance_text(), "12.3 km");
        assert_eq!(summary.duration_text(), "26 min");
    }
}
