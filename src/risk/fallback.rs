//! Primary-then-fallback composition of two risk models.

use super::{RiskFeatures, RiskModel, RiskResult};
use crate::error::ScoringError;

/// Asks `primary` first and `fallback` only when `primary` fails.
///
/// The usual shape is `FallbackModel::new(RemoteModel, LocalHeuristic)`.
pub struct FallbackModel<P, F> {
    primary: P,
    fallback: F,
}

impl<P: RiskModel, F: RiskModel> FallbackModel<P, F> {
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait::async_trait]
impl<P: RiskModel, F: RiskModel> RiskModel for FallbackModel<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn score(&self, features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
        match self.primary.score(features).await {
            Ok(result) => Ok(result),
            Err(e) => {
                log::warn!(
                    "Risk model '{}' failed ({e}), falling back to '{}'",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.score(features).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::ScoringConfig;
    use crate::models::WeatherSnapshot;
    use crate::risk::ModelSource;
    use crate::risk::heuristic::LocalHeuristic;

    struct Failing;

    #[async_trait::async_trait]
    impl RiskModel for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn score(&self, _features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
            Err(ScoringError::IncompletePayload("no score".to_string()))
        }
    }

    struct Fixed(u32);

    #[async_trait::async_trait]
    impl RiskModel for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn score(&self, _features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
            Ok(RiskResult {
                score: self.0,
                factors: Vec::new(),
                headline: None,
                source: ModelSource::Remote,
            })
        }
    }

    fn features() -> RiskFeatures {
        RiskFeatures {
            weather: WeatherSnapshot::fallback(Utc::now()),
            distance_meters: 5_000.0,
            duration_seconds: 600.0,
            departure_hour: 12,
        }
    }

    #[tokio::test]
    async fn uses_primary_when_it_answers() {
        let model = FallbackModel::new(Fixed(50), LocalHeuristic::new(ScoringConfig::default()));
        let result = model.score(&features()).await.unwrap();
        assert_eq!(result.score, 50);
        assert_eq!(result.source, ModelSource::Remote);
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let model = FallbackModel::new(Failing, LocalHeuristic::new(ScoringConfig::default()));
        let result = model.score(&features()).await.unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.source, ModelSource::Local);
    }
}
