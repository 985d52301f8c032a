//! Route risk scoring.
//!
//! A route's score is the condition score from the configured
//! [`RiskModel`] plus a per-hazard penalty from the severity table,
//! clamped to `0..=100`. Scoring never fails: if the model errors, the
//! local heuristic answers instead and the failure is logged.

use std::sync::Arc;

use itertools::Itertools;

use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::models::{ColorClass, HazardReport, RouteCandidate, SafetyAssessment, WeatherSnapshot};
use crate::risk::heuristic::LocalHeuristic;
use crate::risk::{RiskFeatures, RiskModel, RiskResult};

/// Combined effect of the hazards matched to a route.
#[derive(Debug, Default, PartialEq, Eq)]
struct HazardImpact {
    points: u32,
    delay_seconds: u32,
    count: usize,
    /// One entry per distinct hazard type, first-seen order.
    factors: Vec<String>,
}

pub struct RiskScorer {
    model: Arc<dyn RiskModel>,
    local: LocalHeuristic,
}

impl RiskScorer {
    /// Scorer that only uses the local heuristic.
    #[must_use]
    pub fn local(config: ScoringConfig) -> Self {
        let local = LocalHeuristic::new(config);
        Self {
            model: Arc::new(local.clone()),
            local,
        }
    }

    /// Scorer that asks `model` first. The local heuristic built from
    /// `config` still supplies the hazard table and the last-resort fallback.
    #[must_use]
    pub fn with_model(config: ScoringConfig, model: Arc<dyn RiskModel>) -> Self {
        Self {
            model,
            local: LocalHeuristic::new(config),
        }
    }

    const fn config(&self) -> &ScoringConfig {
        self.local.config()
    }

    /// Scores one route under `weather` with the hazards already matched
    /// to it.
    pub async fn score_route(
        &self,
        weather: &WeatherSnapshot,
        route: &RouteCandidate,
        nearby_hazards: &[&HazardReport],
        departure_hour: u8,
    ) -> SafetyAssessment {
        let features = RiskFeatures::new(weather, route, departure_hour);
        let conditions = match self.try_model(&features).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!(
                    "Risk model '{}' unavailable ({e}), scoring with local heuristic",
                    self.model.name()
                );
                self.local.evaluate(&features)
            }
        };
        self.assess(conditions, self.hazard_impact(nearby_hazards))
    }

    async fn try_model(&self, features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
        let result = self.model.score(features).await?;
        log::debug!(
            "Condition score {} from {} model",
            result.score,
            result.source
        );
        Ok(result)
    }

    fn hazard_impact(&self, nearby: &[&HazardReport]) -> HazardImpact {
        let cfg = self.config();
        let (points, delay_seconds) = nearby.iter().fold((0u32, 0u32), |(points, delay), h| {
            let penalty = cfg.hazard_penalty(h.hazard_type);
            (
                points.saturating_add(penalty.risk),
                delay.saturating_add(penalty.delay_seconds),
            )
        });

        HazardImpact {
            points,
            delay_seconds,
            count: nearby.len(),
            factors: nearby
                .iter()
                .map(|h| h.hazard_type)
                .unique()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    fn assess(&self, conditions: RiskResult, hazards: HazardImpact) -> SafetyAssessment {
        let cfg = self.config();
        let total = conditions.score.saturating_add(hazards.points).min(100);
        let score = u8::try_from(total).unwrap_or(100);
        let color_class = cfg.classify(score);
        let condition_points = conditions.score.saturating_sub(cfg.baseline);

        let message = compose_message(
            color_class,
            condition_points,
            conditions.headline.as_deref(),
            &hazards,
        );

        let mut factors = conditions.factors;
        for factor in hazards.factors {
            if !factors.contains(&factor) {
                factors.push(factor);
            }
        }

        SafetyAssessment {
            score,
            color_class,
            message,
            factors,
            delay_seconds: hazards.delay_seconds,
        }
    }
}

/// Describes whichever of hazards or conditions added more points.
fn compose_message(
    color: ColorClass,
    condition_points: u32,
    headline: Option<&str>,
    hazards: &HazardImpact,
) -> String {
    let level = color.label();

    if hazards.count > 0 && hazards.points >= condition_points && hazards.points > 0 {
        let plural = if hazards.count == 1 { "" } else { "s" };
        return format!("{level}: {} reported hazard{plural} along the route.", hazards.count);
    }

    if condition_points > 0 {
        return match headline {
            Some(headline) => format!("{level}: {headline}"),
            None => format!("{level}: risky driving conditions."),
        };
    }

    match color {
        ColorClass::Safe => "Safe driving conditions.".to_string(),
        _ => format!("{level}: elevated baseline risk."),
    }
}
