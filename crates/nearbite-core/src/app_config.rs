use std::net::SocketAddr;
use std::path::PathBuf;

use crate::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub merchants_path: PathBuf,
    pub default_radius_meters: f64,
    /// Returned by the location acquirer when live positioning is
    /// unavailable.
    pub fallback_coordinate: Coordinate,
    pub location_ttl_secs: u64,
    pub location_timeout_secs: u64,
    /// HTTP geolocation endpoint; `None` means no live positioning
    /// capability and the acquirer falls back immediately.
    pub geolocate_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("merchants_path", &self.merchants_path)
            .field("database_url", &"[redacted]")
            .field("default_radius_meters", &self.default_radius_meters)
            .field("fallback_coordinate", &self.fallback_coordinate)
            .field("location_ttl_secs", &self.location_ttl_secs)
            .field("location_timeout_secs", &self.location_timeout_secs)
            .field("geolocate_url", &self.geolocate_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
