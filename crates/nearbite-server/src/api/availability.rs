use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use nearbite_availability::ServiceError;
use nearbite_core::{AvailabilityResult, Coordinate, CoreError};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AvailabilityParams {
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AvailabilityBody {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lng")]
    longitude: Option<f64>,
    radius: Option<f64>,
}

pub(super) async fn check_by_query(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResult>, ApiError> {
    run_check(&state, params.lat, params.lng, params.radius).await
}

pub(super) async fn check_by_body(
    State(state): State<AppState>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Json<AvailabilityResult>, ApiError> {
    run_check(&state, body.latitude, body.longitude, body.radius).await
}

async fn run_check(
    state: &AppState,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
) -> Result<Json<AvailabilityResult>, ApiError> {
    let origin = validate_origin(latitude, longitude)?;
    let radius = radius.unwrap_or_else(|| state.service.default_radius_meters());

    match state.service.check_at(origin, radius).await {
        Ok(result) => Ok(Json(result)),
        Err(ServiceError::InvalidQuery(CoreError::InvalidRadius(r))) => Err(ApiError::bad_request(
            "Invalid radius",
            format!("radius must be a positive number of meters, got {r}"),
        )),
        Err(ServiceError::InvalidQuery(e)) => {
            Err(ApiError::bad_request("Invalid coordinates", e.to_string()))
        }
        Err(ServiceError::CheckFailed(message)) => {
            tracing::error!(error = %message, "availability check failed");
            Err(ApiError::internal("Service check failed", message))
        }
    }
}

/// Coordinates must both be present, non-zero as a pair, and in range.
///
/// Clients that never obtained a position send zeros, so an exact 0/0 pair is
/// treated the same as absent fields.
#[allow(clippy::float_cmp)]
fn validate_origin(latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinate, ApiError> {
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ApiError::bad_request(
            "Missing coordinates",
            "latitude and longitude are required",
        ));
    };

    if latitude == 0.0 && longitude == 0.0 {
        return Err(ApiError::bad_request(
            "Missing coordinates",
            "latitude and longitude are unset",
        ));
    }

    Coordinate::new(latitude, longitude)
        .map_err(|e| ApiError::bad_request("Invalid coordinates", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_origin_accepts_in_range_pair() {
        let coordinate = validate_origin(Some(31.8206), Some(117.2272)).expect("valid");
        assert!((coordinate.latitude() - 31.8206).abs() < 1e-9);
    }

    #[test]
    fn validate_origin_rejects_absent_fields() {
        assert!(validate_origin(None, Some(117.2272)).is_err());
        assert!(validate_origin(Some(31.8206), None).is_err());
        assert!(validate_origin(None, None).is_err());
    }

    #[test]
    fn validate_origin_rejects_zero_pair() {
        assert!(validate_origin(Some(0.0), Some(0.0)).is_err());
    }

    #[test]
    fn validate_origin_allows_single_zero_component() {
        // A position on the equator or the prime meridian is legitimate.
        assert!(validate_origin(Some(0.0), Some(117.2272)).is_ok());
        assert!(validate_origin(Some(31.8206), Some(0.0)).is_ok());
    }

    #[test]
    fn validate_origin_rejects_out_of_range_values() {
        assert!(validate_origin(Some(91.0), Some(117.2272)).is_err());
        assert!(validate_origin(Some(31.8206), Some(-181.0)).is_err());
    }
}
