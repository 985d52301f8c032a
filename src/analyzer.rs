//! Per-candidate matching and scoring.

use futures::future::join_all;

use crate::models::{AnnotatedRoute, HazardReport, RouteCandidate, RouteSummary, WeatherSnapshot};
use crate::proximity::ProximityMatcher;
use crate::scorer::RiskScorer;

/// Runs the proximity matcher and the scorer over each candidate route.
///
/// Holds no per-request state, so identical inputs give identical output.
pub struct RouteAnalyzer {
    matcher: ProximityMatcher,
    scorer: RiskScorer,
}

impl RouteAnalyzer {
    #[must_use]
    pub const fn new(matcher: ProximityMatcher, scorer: RiskScorer) -> Self {
        Self { matcher, scorer }
    }

    /// Annotates every candidate, preserving input order. Candidates are
    /// scored concurrently; none depends on another.
    pub async fn analyze_routes(
        &self,
        candidates: &[RouteCandidate],
        weather: &WeatherSnapshot,
        hazards: &[HazardReport],
        departure_hour: u8,
    ) -> Vec<AnnotatedRoute> {
        join_all(
            candidates
                .iter()
                .enumerate()
                .map(|(id, candidate)| self.annotate(id, candidate, weather, hazards, departure_hour)),
        )
        .await
    }

    /// Annotates a single candidate under the given id.
    pub async fn annotate(
        &self,
        id: usize,
        candidate: &RouteCandidate,
        weather: &WeatherSnapshot,
        hazards: &[HazardReport],
        departure_hour: u8,
    ) -> AnnotatedRoute {
        let nearby = self.matcher.find_nearby_hazards(&candidate.geometry, hazards);
        log::debug!(
            "Route {id}: {} of {} hazards within {} km",
            nearby.len(),
            hazards.len(),
            self.matcher.radius_km()
        );

        let safety = self
            .scorer
            .score_route(weather, candidate, &nearby, departure_hour)
            .await;

        AnnotatedRoute {
            id,
            summary: RouteSummary {
                distance_meters: candidate.distance_meters,
                duration_seconds: candidate.base_duration_seconds + f64::from(safety.delay_seconds),
            },
            candidate: candidate.clone(),
            safety,
            synthetic: false,
        }
    }

    /// Re-scores `route`'s physical path under different weather and
    /// departure hour, e.g. a forecast a few hours ahead.
    pub async fn projected_score(
        &self,
        route: &AnnotatedRoute,
        weather: &WeatherSnapshot,
        hazards: &[HazardReport],
        departure_hour: u8,
    ) -> u8 {
        self.annotate(route.id, &route.candidate, weather, hazards, departure_hour)
            .await
            .safety
            .score
    }
}
