//! Crowd-sourced hazard storage.
//!
//! The core reads one snapshot of hazards per request; reports submitted
//! while a request is scoring are picked up by the next one.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::HazardConfig;
use crate::error::StoreError;
use crate::models::{GeoPoint, HazardReport, HazardType};

/// A hazard as submitted by a user, before it gets an id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHazard {
    pub location: GeoPoint,
    pub hazard_type: HazardType,
    #[serde(default)]
    pub description: Option<String>,
    /// Submission time when absent.
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait HazardStore: Send + Sync {
    /// Returns every live hazard.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    async fn list(&self) -> Result<Vec<HazardReport>, StoreError>;

    /// Stores a new hazard and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidLocation`] for out-of-range coordinates.
    async fn create(&self, hazard: NewHazard) -> Result<HazardReport, StoreError>;
}

/// Process-local hazard store, optionally dropping reports older than
/// `max_age_hours` from listings.
pub struct InMemoryHazardStore {
    hazards: RwLock<Vec<HazardReport>>,
    max_age: Option<Duration>,
}

impl InMemoryHazardStore {
    #[must_use]
    pub fn new(config: &HazardConfig) -> Self {
        Self {
            hazards: RwLock::new(Vec::new()),
            max_age: config.max_age_hours.map(|h| Duration::hours(i64::from(h))),
        }
    }

    async fn list_at(&self, now: DateTime<Utc>) -> Vec<HazardReport> {
        let hazards = self.hazards.read().await;
        match self.max_age {
            Some(max_age) => hazards
                .iter()
                .filter(|h| now - h.reported_at <= max_age)
                .cloned()
                .collect(),
            None => hazards.clone(),
        }
    }
}

#[async_trait::async_trait]
impl HazardStore for InMemoryHazardStore {
    async fn list(&self) -> Result<Vec<HazardReport>, StoreError> {
        Ok(self.list_at(Utc::now()).await)
    }

    async fn create(&self, hazard: NewHazard) -> Result<HazardReport, StoreError> {
        let location = hazard.location;
        if !location.is_valid() {
            return Err(StoreError::InvalidLocation {
                lat: location.lat,
                lon: location.lon,
            });
        }

        let report = HazardReport {
            id: Uuid::new_v4(),
            location,
            hazard_type: hazard.hazard_type,
            description: hazard
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            reported_at: hazard.reported_at.unwrap_or_else(Utc::now),
        };

        log::info!(
            "Hazard reported: {} at ({:.5}, {:.5})",
            report.hazard_type,
            location.lat,
            location.lon
        );
        self.hazards.write().await.push(report.clone());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_hazard(hazard_type: HazardType) -> NewHazard {
        NewHazard {
            location: GeoPoint::new(28.61, 77.21),
            hazard_type,
            description: None,
            reported_at: None,
        }
    }

    #[tokio::test]
    async fn created_hazards_are_listed() {
        let store = InMemoryHazardStore::new(&HazardConfig::default());
        let created = store.create(new_hazard(HazardType::Pothole)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn invalid_location_is_rejected() {
        let store = InMemoryHazardStore::new(&HazardConfig::default());
        let mut hazard = new_hazard(HazardType::Accident);
        hazard.location = GeoPoint::new(91.0, 0.0);

        let err = store.create(hazard).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidLocation { .. }));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_description_is_dropped() {
        let store = InMemoryHazardStore::new(&HazardConfig::default());
        let mut hazard = new_hazard(HazardType::Other);
        hazard.description = Some("   ".to_string());
        assert!(store.create(hazard).await.unwrap().description.is_none());
    }

    #[tokio::test]
    async fn hazards_never_expire_by_default() {
        let store = InMemoryHazardStore::new(&HazardConfig::default());
        let mut old = new_hazard(HazardType::Traffic);
        old.reported_at = Some(Utc::now() - Duration::days(365));
        store.create(old).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_hazards_are_filtered_when_ttl_set() {
        let store = InMemoryHazardStore::new(&HazardConfig {
            max_age_hours: Some(6),
        });
        let now = Utc::now();

        let mut stale = new_hazard(HazardType::Traffic);
        stale.reported_at = Some(now - Duration::hours(7));
        store.create(stale).await.unwrap();
        let fresh = store.create(new_hazard(HazardType::Police)).await.unwrap();

        assert_eq!(store.list_at(now).await, vec![fresh]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let hazard: NewHazard = serde_json::from_value(serde_json::json!({
            "location": {"lat": 28.6, "lon": 77.2},
            "hazardType": "Traffic Jam"
        }))
        .unwrap();
        assert_eq!(hazard.hazard_type, HazardType::TrafficJam);
        assert!(hazard.description.is_none());
        assert!(hazard.reported_at.is_none());
    }
}
