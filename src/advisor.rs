//! Leave-now-or-wait advice.

use chrono::Local;

use crate::config::AdvisorConfig;
use crate::models::{AnnotatedRoute, Recommendation, WeatherReport};

/// Recommends waiting or leaving for `best_route`.
///
/// With a projected future risk, waiting is advised only when the risk
/// drops by more than `wait_margin`. Without one, waiting is advised when
/// it is raining or the current score is above `high_risk_score`.
///
/// Wait times are given in the server's local time, the same clock
/// departure hours are read in.
///
/// Returns `None` when no weather is available.
#[must_use]
pub fn recommend_departure(
    best_route: &AnnotatedRoute,
    weather: Option<&WeatherReport>,
    projected_future_risk: Option<u8>,
    config: &AdvisorConfig,
) -> Option<Recommendation> {
    let weather = weather?;
    let current = best_route.safety.score;

    let recommendation = match projected_future_risk {
        Some(future) => {
            let drop = current.saturating_sub(future);
            if drop > config.wait_margin {
                let when = weather.future.as_ref().map_or_else(
                    || format!("in {} hours", config.lookahead_hours),
                    |f| format!("until {}", f.observed_at.with_timezone(&Local).format("%H:%M")),
                );
                wait(format!("Wait {when}. Risk drops by {drop} points."))
            } else {
                go()
            }
        }
        None if weather.current.condition.is_raining() => wait(format!(
            "{} on the route. Consider waiting for it to pass.",
            weather.current.condition
        )),
        None if current > config.high_risk_score => wait(format!(
            "Route risk is high ({current}/100). Consider delaying your trip."
        )),
        None => go(),
    };

    Some(recommendation)
}

const fn wait(text: String) -> Recommendation {
    Recommendation {
        should_wait: true,
        text,
    }
}

fn go() -> Recommendation {
    Recommendation {
        should_wait: false,
        text: "Good time to leave. Risk is stable.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{
        ColorClass, GeoPoint, RouteCandidate, RoutePolyline, RouteSummary, SafetyAssessment,
        WeatherCondition, WeatherSnapshot,
    };

    fn route(score: u8) -> AnnotatedRoute {
        AnnotatedRoute {
            id: 0,
            candidate: RouteCandidate {
                geometry: RoutePolyline::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.1)])
                    .unwrap(),
                distance_meters: 11_000.0,
                base_duration_seconds: 900.0,
            },
            summary: RouteSummary {
                distance_meters: 11_000.0,
                duration_seconds: 900.0,
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

    fn snapshot(condition: WeatherCondition, hour: u32) -> WeatherSnapshot {
        WeatherSnapshot {
            condition,
            temperature_c: 12.0,
            wind_speed_kmh: 3.0,
            precipitation_mm: 0.0,
            aqi: 2,
            observed_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        }
    }

    fn report(condition: WeatherCondition, future: Option<WeatherSnapshot>) -> WeatherReport {
        WeatherReport {
            current: snapshot(condition, 14),
            future,
        }
    }

    #[test]
    fn no_weather_means_no_recommendation() {
        assert!(recommend_departure(&route(80), None, Some(10), &AdvisorConfig::default()).is_none());
    }

    #[test]
    fn rain_without_projection_always_waits() {
        let weather = report(WeatherCondition::Rain, None);
        for score in [0, 10, 45, 100] {
            let rec =
                recommend_departure(&route(score), Some(&weather), None, &AdvisorConfig::default())
                    .unwrap();
            assert!(rec.should_wait, "score {score}");
        }
    }

    #[test]
    fn high_score_without_projection_waits() {
        let weather = report(WeatherCondition::Clear, None);
        let cfg = AdvisorConfig::default();
        assert!(recommend_departure(&route(61), Some(&weather), None, &cfg).unwrap().should_wait);
        assert!(!recommend_departure(&route(60), Some(&weather), None, &cfg).unwrap().should_wait);
    }

    #[test]
    fn projection_drop_beyond_margin_waits() {
        let clearing = snapshot(WeatherCondition::Clear, 17);
        let local_time = clearing.observed_at.with_timezone(&Local).format("%H:%M").to_string();
        let weather = report(WeatherCondition::Rain, Some(clearing));
        let rec = recommend_departure(&route(45), Some(&weather), Some(10), &AdvisorConfig::default())
            .unwrap();
        assert!(rec.should_wait);
        assert_eq!(rec.text, format!("Wait until {local_time}. Risk drops by 35 points."));
    }

    #[test]
    fn projection_within_margin_goes_even_in_rain() {
        let weather = report(
            WeatherCondition::Rain,
            Some(snapshot(WeatherCondition::Rain, 17)),
        );
        let rec = recommend_departure(&route(45), Some(&weather), Some(35), &AdvisorConfig::default())
            .unwrap();
        assert!(!rec.should_wait);
        assert_eq!(rec.text, "Good time to leave. Risk is stable.");
    }

    #[test]
    fn projected_increase_goes() {
        let weather = report(WeatherCondition::Clear, None);
        let rec = recommend_departure(&route(20), Some(&weather), Some(90), &AdvisorConfig::default())
            .unwrap();
        assert!(!rec.should_wait);
    }
}
