use std::time::Duration;

use anyhow::Context;
use clap::Args;

use nearbite_availability::{
    AvailabilityService, GeoIpLocator, LocationAcquirer, LocationConfig, SystemClock,
};
use nearbite_core::{AppConfig, Coordinate};
use nearbite_db::DbMerchantSource;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Latitude to check; omit (with --lng) to use the acquired location.
    #[arg(long, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude to check.
    #[arg(long, requires = "lat")]
    pub lng: Option<f64>,

    /// Search radius in meters.
    #[arg(long)]
    pub radius: Option<f64>,
}

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = nearbite_core::load_app_config()?;
    let pool = nearbite_db::connect_pool(
        &config.database_url,
        nearbite_db::PoolConfig::from_app_config(&config),
    )
    .await
    .context("connecting to database")?;
    nearbite_db::run_migrations(&pool).await?;

    let acquirer = build_acquirer(&config)?;
    let service = AvailabilityService::new(
        DbMerchantSource::new(pool),
        acquirer,
        config.default_radius_meters,
    );

    let radius = args.radius.unwrap_or(config.default_radius_meters);
    let result = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => {
            let origin = Coordinate::new(lat, lng)?;
            service.check_at(origin, radius).await?
        }
        _ => service.check_with_radius(radius).await?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_acquirer(
    config: &AppConfig,
) -> anyhow::Result<LocationAcquirer<GeoIpLocator, SystemClock>> {
    let provider = match &config.geolocate_url {
        Some(url) => Some(GeoIpLocator::new(url, config.location_timeout_secs)?),
        None => {
            tracing::debug!("no geolocation endpoint configured, fallback coordinate will be used");
            None
        }
    };

    let mut location_config = LocationConfig::new(config.fallback_coordinate);
    location_config.ttl = Duration::from_secs(config.location_ttl_secs);
    location_config.timeout = Duration::from_secs(config.location_timeout_secs);

    Ok(LocationAcquirer::new(provider, SystemClock, location_config))
}
