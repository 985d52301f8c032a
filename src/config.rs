//! Runtime configuration.
//!
//! Deployment settings (bind address, API keys, model URL) come from the
//! command line or environment. Scoring constants come from an optional
//! TOML file; any field it omits keeps the default documented here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::models::{ColorClass, HazardType};

#[derive(Debug, Parser)]
#[command(name = "saferoute", version, about = "Route risk-scoring API server")]
pub struct Args {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Key for the Geoapify routing API.
    #[arg(long, env = "GEOAPIFY_API_KEY")]
    pub geoapify_api_key: Option<String>,

    /// Prediction endpoint of the remote risk model. Local heuristic only
    /// when unset.
    #[arg(long, env = "ML_API_URL")]
    pub risk_model_url: Option<String>,

    /// TOML file overriding scoring and provider defaults.
    #[arg(long, env = "SAFEROUTE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub matcher: MatcherConfig,
    pub scoring: ScoringConfig,
    pub synthesis: SynthesisConfig,
    pub advisor: AdvisorConfig,
    pub remote_model: RemoteModelConfig,
    pub hazards: HazardConfig,
    pub providers: ProviderConfig,
}

impl Settings {
    /// Loads settings from `path`, or defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if `text` does not describe valid settings.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Hazard-to-route matching.
///
/// `stride` is the sampling step along the polyline: only every
/// `stride`-th vertex (and the final one) is tested, so hazards beside a
/// long unsampled stretch can be missed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub stride: usize,
    pub radius_km: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            stride: 10,
            radius_km: 0.3,
        }
    }
}

/// Risk and delay penalty for one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HazardPenalty {
    pub risk: u32,
    pub delay_seconds: u32,
}

impl HazardPenalty {
    #[must_use]
    pub const fn new(risk: u32, delay_minutes: u32) -> Self {
        Self {
            risk,
            delay_seconds: delay_minutes * 60,
        }
    }
}

/// Additive point system used by the local heuristic and the scorer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub baseline: u32,
    pub rain_penalty: u32,
    /// Precipitation at or above this counts as wet roads whatever the
    /// reported condition.
    pub wet_road_precipitation_mm: f64,
    pub storm_penalty: u32,
    pub fog_penalty: u32,
    pub wind_threshold_kmh: f64,
    pub wind_penalty: u32,
    pub aqi_threshold: u8,
    pub aqi_penalty: u32,
    pub long_trip_seconds: f64,
    pub long_trip_penalty: u32,
    /// Night is `[night_start_hour, 24) ∪ [0, night_end_hour)`.
    pub night_start_hour: u8,
    pub night_end_hour: u8,
    pub night_penalty: u32,
    /// Highest score still classed as safe.
    pub safe_max: u8,
    /// Highest score still classed as moderate.
    pub moderate_max: u8,
    /// Entries given in a file are laid over the default table.
    #[serde(deserialize_with = "merge_hazard_table")]
    pub hazards: BTreeMap<HazardType, HazardPenalty>,
    /// Used for hazard types missing from `hazards`.
    pub default_hazard: HazardPenalty,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: 10,
            rain_penalty: 35,
            wet_road_precipitation_mm: 0.5,
            storm_penalty: 55,
            fog_penalty: 30,
            wind_threshold_kmh: 15.0,
            wind_penalty: 15,
            aqi_threshold: 3,
            aqi_penalty: 20,
            long_trip_seconds: 3600.0,
            long_trip_penalty: 10,
            night_start_hour: 22,
            night_end_hour: 5,
            night_penalty: 25,
            safe_max: 40,
            moderate_max: 75,
            hazards: default_hazard_table(),
            default_hazard: HazardPenalty::new(20, 10),
        }
    }
}

fn default_hazard_table() -> BTreeMap<HazardType, HazardPenalty> {
    BTreeMap::from([
        (HazardType::Accident, HazardPenalty::new(40, 20)),
        (HazardType::Flooding, HazardPenalty::new(40, 20)),
        (HazardType::RoadClosure, HazardPenalty::new(40, 20)),
        (HazardType::Pothole, HazardPenalty::new(15, 2)),
        (HazardType::Police, HazardPenalty::new(0, 5)),
        (HazardType::Traffic, HazardPenalty::new(5, 15)),
        (HazardType::TrafficJam, HazardPenalty::new(5, 15)),
    ])
}

fn merge_hazard_table<'de, D>(deserializer: D) -> Result<BTreeMap<HazardType, HazardPenalty>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<HazardType, HazardPenalty>::deserialize(deserializer)?;
    let mut table = default_hazard_table();
    table.extend(overrides);
    Ok(table)
}

impl ScoringConfig {
    #[must_use]
    pub fn hazard_penalty(&self, hazard_type: HazardType) -> HazardPenalty {
        self.hazards
            .get(&hazard_type)
            .copied()
            .unwrap_or(self.default_hazard)
    }

    #[must_use]
    pub const fn is_night(&self, hour: u8) -> bool {
        if self.night_start_hour > self.night_end_hour {
            hour >= self.night_start_hour || hour < self.night_end_hour
        } else {
            hour >= self.night_start_hour && hour < self.night_end_hour
        }
    }

    #[must_use]
    pub const fn classify(&self, score: u8) -> ColorClass {
        if score <= self.safe_max {
            ColorClass::Safe
        } else if score <= self.moderate_max {
            ColorClass::Moderate
        } else {
            ColorClass::High
        }
    }
}

/// Summary scaling and fixed score for one synthetic alternative.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VariantConfig {
    pub distance_factor: f64,
    pub duration_factor: f64,
    pub score: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub safer: VariantConfig,
    pub riskier: VariantConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            safer: VariantConfig {
                distance_factor: 1.05,
                duration_factor: 1.10,
                score: 20,
            },
            riskier: VariantConfig {
                distance_factor: 0.98,
                duration_factor: 0.95,
                score: 85,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Wait when the projected risk is lower by more than this.
    pub wait_margin: u8,
    /// Without a projection, wait when the current score is above this.
    pub high_risk_score: u8,
    pub lookahead_hours: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            wait_margin: 10,
            high_risk_score: 60,
            lookahead_hours: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteModelConfig {
    pub timeout_ms: u64,
}

impl Default for RemoteModelConfig {
    fn default() -> Self {
        Self { timeout_ms: 3000 }
    }
}

impl RemoteModelConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Hazards never expire unless `max_age_hours` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub max_age_hours: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub photon_url: String,
    pub geoapify_routing_url: String,
    pub open_meteo_forecast_url: String,
    pub open_meteo_air_quality_url: String,
    pub timeout_secs: u64,
    /// Alternatives requested from the routing provider.
    pub alternatives: u8,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            photon_url: "https://photon.komoot.io/api/".to_string(),
            geoapify_routing_url: "https://api.geoapify.com/v1/routing".to_string(),
            open_meteo_forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            open_meteo_air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality"
                .to_string(),
            timeout_secs: 10,
            alternatives: 3,
        }
    }
}

impl ProviderConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
