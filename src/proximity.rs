//! Hazard-to-route proximity matching.
//!
//! Hazards are tested against a strided sample of the route's vertices
//! instead of every vertex or segment. A hazard lying beside a segment
//! between two sampled vertices can therefore be missed; the stride is
//! the knob that trades that accuracy for fewer distance evaluations.

use geo::{HaversineDistance, Point};
use itertools::Itertools;

use crate::config::MatcherConfig;
use crate::models::{HazardReport, RoutePolyline};

#[derive(Debug, Clone)]
pub struct ProximityMatcher {
    stride: usize,
    radius_km: f64,
}

impl ProximityMatcher {
    #[must_use]
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            stride: config.stride.max(1),
            radius_km: config.radius_km,
        }
    }

    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Every `stride`-th vertex, plus the destination.
    fn sample(&self, route: &RoutePolyline) -> Vec<Point<f64>> {
        let last = route.vertex_count() - 1;
        route
            .points()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i % self.stride == 0 || i == last)
            .map(|(_, p)| p.to_point())
            .collect()
    }

    /// Returns the hazards whose closest sampled vertex is within
    /// `radius_km`, deduplicated by hazard id, in input order.
    #[must_use]
    pub fn find_nearby_hazards<'h>(
        &self,
        route: &RoutePolyline,
        hazards: &'h [HazardReport],
    ) -> Vec<&'h HazardReport> {
        if hazards.is_empty() {
            return Vec::new();
        }

        let samples = self.sample(route);
        let radius_m = self.radius_km * 1000.0;

        hazards
            .iter()
            .filter(|hazard| {
                let location = hazard.location.to_point();
                samples
                    .iter()
                    .any(|s| s.haversine_distance(&location) < radius_m)
            })
            .unique_by(|hazard| hazard.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::{GeoPoint, HazardType};

    fn hazard(lat: f64, lon: f64, hazard_type: HazardType) -> HazardReport {
        HazardReport {
            id: Uuid::new_v4(),
            location: GeoPoint::new(lat, lon),
            hazard_type,
            description: None,
            reported_at: Utc::now(),
        }
    }

    /// A straight east-west line of `n` vertices ~111 m apart at the equator.
    fn straight_route(n: usize) -> RoutePolyline {
        let points = (0..n)
            .map(|i| GeoPoint::new(0.0, i as f64 * 0.001))
            .collect();
        RoutePolyline::new(points).unwrap()
    }

    fn matcher(stride: usize, radius_km: f64) -> ProximityMatcher {
        ProximityMatcher::new(&MatcherConfig { stride, radius_km })
    }

    #[test]
    fn no_hazards_yields_nothing() {
        let m = matcher(10, 0.3);
        assert!(m.find_nearby_hazards(&straight_route(5), &[]).is_empty());
    }

    #[test]
    fn matches_hazard_near_sampled_vertex() {
        let m = matcher(10, 0.3);
        let near = hazard(0.001, 0.0, HazardType::Pothole); // ~111 m north of vertex 0
        let far = hazard(0.05, 0.0, HazardType::Accident); // ~5.5 km away
        let hazards = vec![near.clone(), far];

        let found = m.find_nearby_hazards(&straight_route(30), &hazards);
        assert_eq!(found, vec![&near]);
    }

    #[test]
    fn destination_vertex_is_always_sampled() {
        // 15 vertices, stride 10: samples are 0, 10 and the last (14).
        let m = matcher(10, 0.05);
        let at_end = hazard(0.0, 0.014, HazardType::Traffic);
        let hazards = vec![at_end.clone()];
        assert_eq!(m.find_nearby_hazards(&straight_route(15), &hazards), vec![&at_end]);
    }

    #[test]
    fn hazard_between_samples_can_be_missed() {
        // Sits on vertex 5, which stride 10 skips; nearest samples are ~555 m away.
        let hazards = vec![hazard(0.0, 0.005, HazardType::Accident)];
        let route = straight_route(30);

        assert!(matcher(10, 0.3).find_nearby_hazards(&route, &hazards).is_empty());
        assert_eq!(matcher(1, 0.3).find_nearby_hazards(&route, &hazards).len(), 1);
    }

    #[test]
    fn duplicates_are_collapsed_by_id() {
        let m = matcher(1, 0.3);
        let h = hazard(0.0, 0.002, HazardType::Police);
        let hazards = vec![h.clone(), h.clone()];
        assert_eq!(m.find_nearby_hazards(&straight_route(5), &hazards), vec![&h]);
    }

    #[test]
    fn zero_stride_is_treated_as_every_vertex() {
        let m = matcher(0, 0.3);
        let hazards = vec![hazard(0.0, 0.005, HazardType::Accident)];
        assert_eq!(m.find_nearby_hazards(&straight_route(30), &hazards).len(), 1);
    }
}
