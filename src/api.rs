//! HTTP surface: route planning and hazard reporting.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::{PlanError, ProviderError, StoreError};
use crate::hazards::{HazardStore, NewHazard};
use crate::models::{
    AnnotatedRoute, ColorClass, GeoPoint, HazardReport, HazardType, Recommendation, WeatherReport,
};
use crate::planner::{RoutePlan, RoutePlanner};

// Shared State for concurrency
pub struct AppState {
    pub planner: RoutePlanner,
    pub hazards: Arc<dyn HazardStore>,
}

/// Builds the API router. CORS is open so a static front-end can call it
/// from any origin.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/route", post(plan_route))
        .route("/api/hazards", get(list_hazards).post(report_hazard))
        .route("/api/hazards/types", get(hazard_types))
        .layer(cors)
        .with_state(state)
}

// --- Errors ---

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Store(StoreError::InvalidLocation { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Plan(
                PlanError::NoRouteFound
                | PlanError::Geocoding {
                    source: ProviderError::NotFound { .. },
                    ..
                },
            ) => StatusCode::NOT_FOUND,
            Self::Plan(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::warn!("Request rejected: {self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// --- API DTOs ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteRequest {
    start: String,
    end: String,
    /// Local hour 0-23; the server's current hour when absent.
    #[serde(default)]
    departure_hour: Option<u8>,
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    routes: RoutesDto,
    weather: Option<WeatherReport>,
    recommendation: Option<Recommendation>,
}

#[derive(Debug, Serialize)]
struct RoutesDto {
    safest: RouteDto,
    fastest: RouteDto,
    moderate: RouteDto,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RouteDto {
    id: usize,
    geometry: GeoJsonLineString,
    summary: SummaryDto,
    safety: SafetyDto,
    synthetic: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDto {
    distance: String,
    duration: String,
    distance_meters: f64,
    duration_seconds: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetyDto {
    score: u8,
    color: &'static str,
    level: ColorClass,
    message: String,
    factors: Vec<String>,
    delay_seconds: u32,
}

#[derive(Debug, Serialize)]
struct GeoJsonLineString {
    r#type: String,
    coordinates: Vec<[f64; 2]>, // [lon, lat] standard for GeoJSON
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewHazardRequest {
    latitude: f64,
    longitude: f64,
    hazard_type: HazardType,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HazardDto {
    id: Uuid,
    latitude: f64,
    longitude: f64,
    hazard_type: HazardType,
    description: Option<String>,
    reported_at: DateTime<Utc>,
}

impl From<&AnnotatedRoute> for RouteDto {
    fn from(route: &AnnotatedRoute) -> Self {
        Self {
            id: route.id,
            geometry: GeoJsonLineString {
                r#type: "LineString".to_string(),
                coordinates: route.geometry().points().iter().map(|p| [p.lon, p.lat]).collect(),
            },
            summary: SummaryDto {
                distance: route.summary.distance_text(),
                duration: route.summary.duration_text(),
                distance_meters: route.summary.distance_meters,
                duration_seconds: route.summary.duration_seconds,
            },
            safety: SafetyDto {
                score: route.safety.score,
                color: route.safety.color_class.hex(),
                level: route.safety.color_class,
                message: route.safety.message.clone(),
                factors: route.safety.factors.clone(),
                delay_seconds: route.safety.delay_seconds,
            },
            synthetic: route.synthetic,
        }
    }
}

impl From<RoutePlan> for RouteResponse {
    fn from(plan: RoutePlan) -> Self {
        Self {
            routes: RoutesDto {
                safest: RouteDto::from(&plan.safest),
                fastest: RouteDto::from(&plan.fastest),
                moderate: RouteDto::from(&plan.moderate),
                count: plan.count,
            },
            weather: plan.weather,
            recommendation: plan.recommendation,
        }
    }
}

impl From<HazardReport> for HazardDto {
    fn from(h: HazardReport) -> Self {
        Self {
            id: h.id,
            latitude: h.location.lat,
            longitude: h.location.lon,
            hazard_type: h.hazard_type,
            description: h.description,
            reported_at: h.reported_at,
        }
    }
}

// --- Handlers ---

async fn plan_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(payload) = payload?;
    let start = payload.start.trim();
    let end = payload.end.trim();
    if start.is_empty() || end.is_empty() {
        return Err(ApiError::BadRequest("start and end are required".to_string()));
    }

    let departure_hour = match payload.departure_hour {
        Some(hour) if hour > 23 => {
            return Err(ApiError::BadRequest(format!(
                "departureHour must be 0-23, got {hour}"
            )));
        }
        Some(hour) => hour,
        None => u8::try_from(Local::now().hour()).unwrap_or_default(),
    };

    log::info!("Route request: '{start}' -> '{end}' at {departure_hour:02}:00");
    let plan = state.planner.plan(start, end, departure_hour).await?;
    Ok(Json(plan.into()))
}

async fn list_hazards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<HazardDto>>, ApiError> {
    let hazards = state.hazards.list().await?;
    Ok(Json(hazards.into_iter().map(HazardDto::from).collect()))
}

async fn report_hazard(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewHazardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HazardDto>), ApiError> {
    let Json(payload) = payload?;
    let report = state
        .hazards
        .create(NewHazard {
            location: GeoPoint::new(payload.latitude, payload.longitude),
            hazard_type: payload.hazard_type,
            description: payload.description,
            reported_at: None,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

async fn hazard_types() -> Json<Vec<String>> {
    Json(HazardType::iter().map(|t| t.to_string()).collect())
}
