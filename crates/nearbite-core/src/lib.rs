use serde::Serialize;
use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod geo;
pub mod merchants;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

/// Radius applied when a caller does not specify one, in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 2000.0;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid radius: {0} (must be a positive number of meters)")]
    InvalidRadius(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read merchants file {path}: {source}")]
    MerchantsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse merchants file: {0}")]
    MerchantsFileParse(#[from] serde_yaml::Error),

    #[error("merchants file validation failed: {0}")]
    Validation(String),
}

/// A validated point on the globe.
///
/// Construction rejects out-of-range values, so any `Coordinate` held by the
/// rest of the system is known to be a real position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting latitudes outside [-90, 90] and
    /// longitudes outside [-180, 180].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] if either component is out of
    /// range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lng_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if lat_ok && lng_ok {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoreError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Point-in-time snapshot of a merchant as seen by the matcher.
///
/// Merchant lifecycle is owned by the external merchant-management system;
/// this type is read-only within a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub is_online: bool,
}

/// A single availability question: "who can serve this origin within this
/// radius?". Constructed per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityQuery {
    origin: Coordinate,
    radius_meters: f64,
}

impl AvailabilityQuery {
    /// Builds a query with an explicit radius.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRadius`] if `radius_meters` is not a
    /// finite positive number. A non-positive radius is a caller error, not
    /// something to clamp.
    pub fn new(origin: Coordinate, radius_meters: f64) -> Result<Self, CoreError> {
        if radius_meters.is_finite() && radius_meters > 0.0 {
            Ok(Self {
                origin,
                radius_meters,
            })
        } else {
            Err(CoreError::InvalidRadius(radius_meters))
        }
    }

    /// Builds a query with the default radius of [`DEFAULT_RADIUS_METERS`].
    #[must_use]
    pub fn with_default_radius(origin: Coordinate) -> Self {
        Self {
            origin,
            radius_meters: DEFAULT_RADIUS_METERS,
        }
    }

    #[must_use]
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    #[must_use]
    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

/// Nearest in-range merchant, with its distance rounded to whole meters for
/// display stability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestMerchant {
    pub id: String,
    pub name: String,
    pub distance_meters: u64,
}

/// Outcome of one availability query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub is_available: bool,
    pub nearby_merchant_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_merchant: Option<NearestMerchant>,
}

impl AvailabilityResult {
    /// The result for a query that matched nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            is_available: false,
            nearby_merchant_count: 0,
            nearest_merchant: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_valid_ranges() {
        assert!(Coordinate::new(31.8206, 117.2272).is_ok());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range_latitude() {
        let err = Coordinate::new(90.01, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCoordinate { .. }));
    }

    #[test]
    fn coordinate_rejects_out_of_range_longitude() {
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(0.0, 181.0).is_err());
    }

    #[test]
    fn coordinate_rejects_non_finite_components() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn query_rejects_zero_and_negative_radius() {
        let origin = Coordinate::new(31.8206, 117.2272).unwrap();
        assert!(matches!(
            AvailabilityQuery::new(origin, 0.0),
            Err(CoreError::InvalidRadius(_))
        ));
        assert!(matches!(
            AvailabilityQuery::new(origin, -5.0),
            Err(CoreError::InvalidRadius(_))
        ));
        assert!(matches!(
            AvailabilityQuery::new(origin, f64::NAN),
            Err(CoreError::InvalidRadius(_))
        ));
    }

    #[test]
    fn query_default_radius_is_2000m() {
        let origin = Coordinate::new(31.8206, 117.2272).unwrap();
        let query = AvailabilityQuery::with_default_radius(origin);
        assert!((query.radius_meters() - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let result = AvailabilityResult {
            is_available: true,
            nearby_merchant_count: 2,
            nearest_merchant: Some(NearestMerchant {
                id: "m1".to_string(),
                name: "Dumpling House".to_string(),
                distance_meters: 88,
            }),
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["isAvailable"], true);
        assert_eq!(json["nearbyMerchantCount"], 2);
        assert_eq!(json["nearestMerchant"]["distanceMeters"], 88);
    }

    #[test]
    fn empty_result_omits_nearest_merchant() {
        let json = serde_json::to_value(AvailabilityResult::none()).expect("serialize");
        assert_eq!(json["isAvailable"], false);
        assert_eq!(json["nearbyMerchantCount"], 0);
        assert!(json.get("nearestMerchant").is_none());
    }
}
