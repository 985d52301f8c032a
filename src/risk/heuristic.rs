//! Local additive risk heuristic.

use super::{ModelSource, RiskFeatures, RiskModel, RiskResult};
use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::models::WeatherCondition;

/// Running total while the heuristic walks its rules.
#[derive(Default)]
struct Tally {
    score: u32,
    factors: Vec<String>,
    headline: Option<(u32, &'static str)>,
}

impl Tally {
    fn add(&mut self, points: u32, factor: &str, headline: &'static str) {
        self.score = self.score.saturating_add(points);
        self.factors.push(factor.to_string());
        if points > 0 && self.headline.is_none_or(|(best, _)| points > best) {
            self.headline = Some((points, headline));
        }
    }
}

/// Baseline plus fixed penalties for weather, trip length and night
/// driving. Each rule only ever adds points, so worse conditions never
/// lower the score.
#[derive(Debug, Clone)]
pub struct LocalHeuristic {
    config: ScoringConfig,
}

impl LocalHeuristic {
    #[must_use]
    pub const fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluate(&self, features: &RiskFeatures) -> RiskResult {
        let cfg = &self.config;
        let weather = &features.weather;
        let mut tally = Tally {
            score: cfg.baseline,
            ..Tally::default()
        };

        let wet_condition = matches!(
            weather.condition,
            WeatherCondition::Rain | WeatherCondition::Snow
        );
        if wet_condition || weather.precipitation_mm >= cfg.wet_road_precipitation_mm {
            tally.add(cfg.rain_penalty, "Wet Roads", "Slippery roads.");
        }
        if weather.condition == WeatherCondition::Storm {
            tally.add(cfg.storm_penalty, "Stormy Conditions", "High winds and rain.");
        }
        if weather.condition == WeatherCondition::Fog {
            tally.add(cfg.fog_penalty, "Low Visibility", "Low visibility from fog.");
        }
        if weather.wind_speed_kmh > cfg.wind_threshold_kmh {
            tally.add(cfg.wind_penalty, "High Winds", "Strong crosswinds.");
        }
        if weather.aqi > cfg.aqi_threshold {
            tally.add(cfg.aqi_penalty, "Poor Air Quality", "Poor visibility from smog.");
        }
        if features.duration_seconds > cfg.long_trip_seconds {
            tally.add(cfg.long_trip_penalty, "Long Trip", "Long drive, plan rest stops.");
        }
        if cfg.is_night(features.departure_hour) {
            tally.add(
                cfg.night_penalty,
                "Night Driving",
                "Reduced visibility due to night time.",
            );
        }

        RiskResult {
            score: tally.score,
            factors: tally.factors,
            headline: tally.headline.map(|(_, text)| text.to_string()),
            source: ModelSource::Local,
        }
    }
}

#[async_trait::async_trait]
impl RiskModel for LocalHeuristic {
    fn name(&self) -> &'static str {
        "local-heuristic"
    }

    async fn score(&self, features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
        Ok(self.evaluate(features))
    }
}
