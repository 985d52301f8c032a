//! End-to-end route planning for one user request.
//!
//! Resolves the endpoints, fetches candidates, weather and the hazard
//! snapshot, scores every candidate, pads the list with synthetic
//! alternatives when needed, picks safest/fastest/moderate and asks the
//! departure advisor for a recommendation.

use std::sync::Arc;

use chrono::Utc;

use crate::advisor::recommend_departure;
use crate::analyzer::RouteAnalyzer;
use crate::config::{AdvisorConfig, SynthesisConfig};
use crate::error::PlanError;
use crate::hazards::HazardStore;
use crate::models::{AnnotatedRoute, GeoPoint, HazardReport, Recommendation, WeatherReport, WeatherSnapshot};
use crate::providers::geocode::resolve_location;
use crate::providers::{Geocoder, RoutingProvider, WeatherProvider};
use crate::synthesize::ensure_alternatives;

/// The external services a plan is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn RoutingProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub hazards: Arc<dyn HazardStore>,
}

/// Routes chosen for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub safest: AnnotatedRoute,
    pub fastest: AnnotatedRoute,
    pub moderate: AnnotatedRoute,
    /// Number of routes the selection was made from.
    pub count: usize,
    pub weather: Option<WeatherReport>,
    pub recommendation: Option<Recommendation>,
}

pub struct RoutePlanner {
    collaborators: Collaborators,
    analyzer: RouteAnalyzer,
    synthesis: SynthesisConfig,
    advisor: AdvisorConfig,
}

impl RoutePlanner {
    #[must_use]
    pub const fn new(
        collaborators: Collaborators,
        analyzer: RouteAnalyzer,
        synthesis: SynthesisConfig,
        advisor: AdvisorConfig,
    ) -> Self {
        Self {
            collaborators,
            analyzer,
            synthesis,
            advisor,
        }
    }

    /// Plans a drive from `start` to `end` leaving at `departure_hour`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Geocoding`] if an endpoint cannot be resolved,
    /// [`PlanError::Routing`] if the routing provider fails, and
    /// [`PlanError::NoRouteFound`] if it returns no routes. Weather,
    /// hazard and risk-model failures only degrade the result.
    pub async fn plan(&self, start: &str, end: &str, departure_hour: u8) -> Result<RoutePlan, PlanError> {
        let departure_hour = departure_hour % 24;

        // 1. Resolve endpoints
        let geocoder = self.collaborators.geocoder.as_ref();
        let (from, to) = tokio::try_join!(
            resolve(geocoder, start),
            resolve(geocoder, end)
        )?;

        // 2. Candidate routes
        let candidates = self
            .collaborators
            .router
            .routes(from, to)
            .await
            .map_err(PlanError::Routing)?;
        let Some(first) = candidates.first() else {
            return Err(PlanError::NoRouteFound);
        };

        // 3. Weather at the first route's midpoint, plus the hazard snapshot
        let (weather, hazards) = tokio::join!(
            self.fetch_weather(first.geometry.midpoint()),
            self.fetch_hazards()
        );
        let current = weather
            .as_ref()
            .map_or_else(|| WeatherSnapshot::fallback(Utc::now()), |w| w.current.clone());

        // 4. Score, then pad with synthetic alternatives
        let analyzed = self
            .analyzer
            .analyze_routes(&candidates, &current, &hazards, departure_hour)
            .await;
        let routes = ensure_alternatives(analyzed, &self.synthesis);

        // 5. Select
        let (Some(safest), Some(fastest), Some(moderate), Some(best)) = (
            pick_safest(&routes),
            pick_fastest(&routes),
            routes.iter().find(|r| !r.synthetic),
            pick_safest(routes.iter().filter(|r| !r.synthetic)),
        ) else {
            return Err(PlanError::NoRouteFound);
        };

        // 6. Departure advice
        let recommendation = match &weather {
            Some(report) => {
                let projected = match &report.future {
                    Some(future) => Some(
                        self.analyzer
                            .projected_score(best, future, &hazards, self.future_hour(departure_hour))
                            .await,
                    ),
                    None => None,
                };
                recommend_departure(best, Some(report), projected, &self.advisor)
            }
            None => None,
        };

        log::info!(
            "Planned {} route(s): safest {} ({}), fastest {} ({})",
            routes.len(),
            safest.id,
            safest.safety.score,
            fastest.id,
            fastest.summary.duration_text()
        );

        Ok(RoutePlan {
            safest: safest.clone(),
            fastest: fastest.clone(),
            moderate: moderate.clone(),
            count: routes.len(),
            weather,
            recommendation,
        })
    }

    fn future_hour(&self, departure_hour: u8) -> u8 {
        let hour = (u32::from(departure_hour) + self.advisor.lookahead_hours) % 24;
        u8::try_from(hour).unwrap_or(0)
    }

    async fn fetch_weather(&self, at: GeoPoint) -> Option<WeatherReport> {
        match self
            .collaborators
            .weather
            .weather(at, self.advisor.lookahead_hours)
            .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("Weather unavailable ({e}), scoring with clear-weather defaults");
                None
            }
        }
    }

    async fn fetch_hazards(&self) -> Vec<HazardReport> {
        self.collaborators.hazards.list().await.unwrap_or_else(|e| {
            log::warn!("Hazard store unavailable ({e}), scoring without hazards");
            Vec::new()
        })
    }
}

async fn resolve(geocoder: &dyn Geocoder, query: &str) -> Result<GeoPoint, PlanError> {
    resolve_location(geocoder, query)
        .await
        .map_err(|source| PlanError::Geocoding {
            query: query.to_string(),
            source,
        })
}

/// Lowest score; the earliest route wins ties.
fn pick_safest<'a>(routes: impl IntoIterator<Item = &'a AnnotatedRoute>) -> Option<&'a AnnotatedRoute> {
    routes.into_iter().min_by_key(|r| r.safety.score)
}

/// Shortest hazard-adjusted duration; the earliest route wins ties.
fn pick_fastest(routes: &[AnnotatedRoute]) -> Option<&AnnotatedRoute> {
    routes
        .iter()
        .min_by(|a, b| a.summary.duration_seconds.total_cmp(&b.summary.duration_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorClass, RouteCandidate, RoutePolyline, RouteSummary, SafetyAssessment};

    fn route(id: usize, score: u8, minutes: f64) -> AnnotatedRoute {
        AnnotatedRoute {
            id,
            candidate: RouteCandidate {
                geometry: RoutePolyline::new(vec![GeoPoint::new(28.6, 77.2), GeoPoint::new(28.7, 77.3)])
                    .unwrap(),
                distance_meters: 9_000.0,
                base_duration_seconds: minutes * 60.0,
            },
            summary: RouteSummary {
                distance_meters: 9_000.0,
                duration_seconds: minutes * 60.0,
            },
            safety: SafetyAssessment {
                score,
                color_class: ColorClass::Safe,
                message: String::new(),
                factors: Vec::new(),
                delay_seconds: 0,
            },
            synthetic: false,
        }
    }

    #[test]
    fn earliest_route_wins_ties() {
        let routes = vec![route(0, 30, 12.0), route(1, 30, 12.0), route(2, 45, 15.0)];
        assert_eq!(pick_safest(&routes).unwrap().id, 0);
        assert_eq!(pick_fastest(&routes).unwrap().id, 0);
    }

    #[test]
    fn safest_and_fastest_can_differ() {
        let routes = vec![route(0, 60, 9.0), route(1, 25, 14.0)];
        assert_eq!(pick_safest(&routes).unwrap().id, 1);
        assert_eq!(pick_fastest(&routes).unwrap().id, 0);
        assert!(pick_safest(&[]).is_none());
    }
}
