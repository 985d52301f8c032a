//! HTTP client for the remote accident-risk prediction service.
//!
//! The service takes categorical features and answers with
//! `{"estimated_risk_score": 0-100, "severity": "Low" | "Moderate" | "High"}`.
//! It is treated as unreliable: every call is bounded by a timeout, and
//! a missing or non-numeric score is reported as an incomplete payload.

use std::time::Duration;

use serde::Serialize;

use super::{ModelSource, RiskFeatures, RiskModel, RiskResult};
use crate::config::RemoteModelConfig;
use crate::error::ScoringError;
use crate::models::WeatherCondition;

#[derive(Serialize)]
struct PredictRequest<'a> {
    weather: &'a str,
    road_type: &'a str,
    time_of_day: &'a str,
}

pub struct RemoteModel {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteModel {
    /// # Errors
    ///
    /// Returns [`ScoringError::Http`] if the HTTP client cannot be built.
    pub fn new(url: String, config: &RemoteModelConfig) -> Result<Self, ScoringError> {
        // The deadline is enforced in `score` so it surfaces as `Timeout`.
        let timeout = config.timeout();
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    async fn predict(&self, request: &PredictRequest<'_>) -> Result<serde_json::Value, ScoringError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl RiskModel for RemoteModel {
    fn name(&self) -> &'static str {
        "remote-model"
    }

    async fn score(&self, features: &RiskFeatures) -> Result<RiskResult, ScoringError> {
        let road_type = features.road_type();
        let time_of_day = features.time_of_day();
        let request = PredictRequest {
            weather: weather_label(features.weather.condition),
            road_type: road_type.as_ref(),
            time_of_day: time_of_day.as_ref(),
        };

        let body = tokio::time::timeout(self.timeout, self.predict(&request))
            .await
            .map_err(|_| ScoringError::Timeout(self.timeout))??;

        parse_prediction(&body)
    }
}

/// Weather labels the prediction service was trained on.
const fn weather_label(condition: WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Clear | WeatherCondition::Other => "Clear",
        WeatherCondition::Cloudy => "Clouds",
        WeatherCondition::Rain | WeatherCondition::Snow => "Rain",
        WeatherCondition::Storm => "Thunderstorm",
        WeatherCondition::Fog => "Fog",
    }
}

fn parse_prediction(body: &serde_json::Value) -> Result<RiskResult, ScoringError> {
    let score = body["estimated_risk_score"]
        .as_f64()
        .filter(|s| s.is_finite())
        .ok_or_else(|| {
            ScoringError::IncompletePayload("missing estimated_risk_score".to_string())
        })?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = score.round().clamp(0.0, 100.0) as u32;

    let headline = body["severity"]
        .as_str()
        .map(|severity| format!("Model predicts {} risk.", severity.to_lowercase()));

    Ok(RiskResult {
        score,
        factors: Vec::new(),
        headline,
        source: ModelSource::Remote,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::config::ScoringConfig;
    use crate::models::{GeoPoint, RouteCandidate, RoutePolyline, WeatherSnapshot};
    use crate::scorer::RiskScorer;

    /// Accepts connections and never answers them.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/predict")
    }

    fn features() -> RiskFeatures {
        RiskFeatures {
            weather: WeatherSnapshot::fallback(chrono::Utc::now()),
            distance_meters: 1000.0,
            duration_seconds: 120.0,
            departure_hour: 12,
        }
    }

    #[test]
    fn parses_full_prediction() {
        let result = parse_prediction(&json!({
            "prediction_class": 2,
            "severity": "High",
            "estimated_risk_score": 90
        }))
        .unwrap();
        assert_eq!(result.score, 90);
        assert_eq!(result.source, ModelSource::Remote);
        assert_eq!(result.headline.as_deref(), Some("Model predicts high risk."));
    }

    #[test]
    fn missing_score_is_incomplete() {
        let err = parse_prediction(&json!({"severity": "Low"})).unwrap_err();
        assert!(matches!(err, ScoringError::IncompletePayload(_)));
    }

    #[test]
    fn error_payload_is_incomplete() {
        let err = parse_prediction(&json!({"error": "model not loaded"})).unwrap_err();
        assert!(matches!(err, ScoringError::IncompletePayload(_)));
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let result = parse_prediction(&json!({"estimated_risk_score": 140.2})).unwrap();
        assert_eq!(result.score, 100);
        assert!(result.headline.is_none());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Port 9 (discard) on localhost is not an HTTP server.
        let model = RemoteModel::new(
            "http://127.0.0.1:9/predict".to_string(),
            &RemoteModelConfig { timeout_ms: 500 },
        )
        .unwrap();
        assert!(model.score(&features()).await.is_err());
    }

    #[tokio::test]
    async fn hung_service_times_out() {
        let config = RemoteModelConfig { timeout_ms: 200 };
        let model = RemoteModel::new(silent_server().await, &config).unwrap();

        let started = Instant::now();
        let err = model.score(&features()).await.unwrap_err();
        assert!(matches!(err, ScoringError::Timeout(t) if t == Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn hung_service_falls_back_to_local_score() {
        let config = RemoteModelConfig { timeout_ms: 200 };
        let model = RemoteModel::new(silent_server().await, &config).unwrap();
        let scorer = RiskScorer::with_model(ScoringConfig::default(), Arc::new(model));
        let route = RouteCandidate {
            geometry: RoutePolyline::new(vec![GeoPoint::new(28.6, 77.2), GeoPoint::new(28.61, 77.2)])
                .unwrap(),
            distance_meters: 1_100.0,
            base_duration_seconds: 180.0,
        };

        let started = Instant::now();
        let assessment = scorer
            .score_route(&WeatherSnapshot::fallback(chrono::Utc::now()), &route, &[], 12)
            .await;
        assert_eq!(assessment.score, 10);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
