mod availability;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nearbite_availability::{
    AvailabilityService, GeoIpLocator, LocationAcquirer, LocationConfig, SystemClock,
};
use nearbite_core::AppConfig;
use nearbite_db::DbMerchantSource;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

pub type AppService = AvailabilityService<DbMerchantSource, GeoIpLocator, SystemClock>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub service: Arc<AppService>,
}

/// JSON error body: `{ "error": ..., "message": ... }` with a matching status.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    message: String,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Assemble the availability service from app configuration.
///
/// # Errors
///
/// Fails if a configured geolocation endpoint yields an unusable HTTP client.
pub fn build_service(pool: PgPool, config: &AppConfig) -> anyhow::Result<AppService> {
    let provider = match &config.geolocate_url {
        Some(url) => Some(GeoIpLocator::new(url, config.location_timeout_secs)?),
        None => None,
    };

    let mut location_config = LocationConfig::new(config.fallback_coordinate);
    location_config.ttl = Duration::from_secs(config.location_ttl_secs);
    location_config.timeout = Duration::from_secs(config.location_timeout_secs);

    let acquirer = LocationAcquirer::new(provider, SystemClock, location_config);
    Ok(AvailabilityService::new(
        DbMerchantSource::new(pool),
        acquirer,
        config.default_radius_meters,
    ))
}

fn build_cors() -> CorsLayer {
    // Storefront clients call from arbitrary origins; preflights get an
    // empty 200.
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/availability",
            get(availability::check_by_query).post(availability::check_by_body),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match nearbite_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
