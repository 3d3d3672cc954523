//! HTTP geolocation provider.
//!
//! Wraps `reqwest` against a configurable endpoint that reports the caller's
//! approximate position as JSON. Field aliases cover the common response
//! shapes (`latitude`/`lat`, `longitude`/`lng`/`lon`).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use nearbite_core::Coordinate;

use super::LocationProvider;
use crate::PositioningError;

#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lng", alias = "lon")]
    longitude: Option<f64>,
}

/// Positioning provider backed by an HTTP geolocation endpoint.
pub struct GeoIpLocator {
    client: Client,
    endpoint: String,
}

impl GeoIpLocator {
    /// Creates a locator for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PositioningError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, PositioningError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nearbite/0.1 (availability-check)")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl LocationProvider for GeoIpLocator {
    async fn locate(&self) -> Result<Coordinate, PositioningError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;

        let body: GeolocateResponse = response
            .json()
            .await
            .map_err(|e| PositioningError::Malformed(e.to_string()))?;

        let latitude = body
            .latitude
            .ok_or_else(|| PositioningError::Malformed("missing latitude".to_string()))?;
        let longitude = body
            .longitude
            .ok_or_else(|| PositioningError::Malformed("missing longitude".to_string()))?;

        Coordinate::new(latitude, longitude)
            .map_err(|e| PositioningError::Malformed(e.to_string()))
    }
}
