//! Location acquisition with caching, timeout bounding, and fallback.
//!
//! `acquire()` always yields a coordinate. Live positioning failures are
//! absorbed here and only observable through [`LocationAcquirer::last_source`]
//! and a debug log line.

mod geolocate;

pub use geolocate::GeoIpLocator;

use std::future::Future;
use std::time::{Duration, Instant};

use nearbite_core::Coordinate;
use tokio::sync::Mutex;

use crate::PositioningError;

/// Time source for the fix cache. Injectable so ttl behavior is testable
/// without real timers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A live positioning capability.
pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinate, PositioningError>> + Send;
}

/// Where the most recent acquisition got its coordinate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSource {
    Cache,
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct LocationConfig {
    /// Returned when live positioning is unavailable.
    pub fallback: Coordinate,
    /// How long a cached fix stays valid.
    pub ttl: Duration,
    /// Upper bound on one live positioning attempt.
    pub timeout: Duration,
}

impl LocationConfig {
    /// Config with the standard ttl (5 minutes) and timeout (10 seconds).
    #[must_use]
    pub fn new(fallback: Coordinate) -> Self {
        Self {
            fallback,
            ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedFix {
    coordinate: Coordinate,
    acquired_at: Instant,
}

/// Obtains the caller's coordinate: cached fix if fresh, live positioning
/// bounded by a timeout otherwise, configured fallback when positioning is
/// absent or fails.
///
/// Failed attempts do not populate the cache, so the next `acquire()` retries
/// live positioning.
pub struct LocationAcquirer<P, C = SystemClock> {
    provider: Option<P>,
    clock: C,
    config: LocationConfig,
    cache: Mutex<Option<CachedFix>>,
    last_source: Mutex<Option<FixSource>>,
}

impl<P: LocationProvider, C: Clock> LocationAcquirer<P, C> {
    /// `provider: None` models an absent positioning capability; every
    /// acquisition then resolves to the fallback coordinate.
    pub fn new(provider: Option<P>, clock: C, config: LocationConfig) -> Self {
        Self {
            provider,
            clock,
            config,
            cache: Mutex::new(None),
            last_source: Mutex::new(None),
        }
    }

    /// Yield a coordinate: cache hit, live fix, or fallback. Never fails.
    pub async fn acquire(&self) -> Coordinate {
        if let Some(coordinate) = self.fresh_cached_fix().await {
            *self.last_source.lock().await = Some(FixSource::Cache);
            return coordinate;
        }
        self.acquire_live().await
    }

    /// Force re-acquisition, ignoring any cached fix.
    pub async fn refresh(&self) -> Coordinate {
        self.acquire_live().await
    }

    /// Diagnostic: where the most recent acquisition came from. `None` until
    /// the first `acquire()`/`refresh()`.
    pub async fn last_source(&self) -> Option<FixSource> {
        *self.last_source.lock().await
    }

    async fn fresh_cached_fix(&self) -> Option<Coordinate> {
        let cache = self.cache.lock().await;
        let fix = (*cache)?;
        let age = self.clock.now().saturating_duration_since(fix.acquired_at);
        (age < self.config.ttl).then_some(fix.coordinate)
    }

    async fn acquire_live(&self) -> Coordinate {
        let Some(provider) = &self.provider else {
            return self.fall_back(&PositioningError::Unavailable).await;
        };

        match tokio::time::timeout(self.config.timeout, provider.locate()).await {
            Ok(Ok(coordinate)) => {
                *self.cache.lock().await = Some(CachedFix {
                    coordinate,
                    acquired_at: self.clock.now(),
                });
                *self.last_source.lock().await = Some(FixSource::Live);
                coordinate
            }
            Ok(Err(e)) => self.fall_back(&e).await,
            Err(_) => self.fall_back(&PositioningError::TimedOut).await,
        }
    }

    async fn fall_back(&self, reason: &PositioningError) -> Coordinate {
        tracing::debug!(error = %reason, "live positioning unavailable, using fallback coordinate");
        *self.last_source.lock().await = Some(FixSource::Fallback);
        self.config.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("test coordinate")
    }

    fn fallback() -> Coordinate {
        coord(31.8206, 117.2272)
    }

    fn live_fix() -> Coordinate {
        coord(31.8300, 117.2400)
    }

    #[derive(Clone)]
    struct ManualClock(Arc<StdMutex<Instant>>);

    impl ManualClock {
        fn start() -> Self {
            Self(Arc::new(StdMutex::new(Instant::now())))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().expect("clock lock")
        }
    }

    struct CountingProvider {
        calls: Arc<AtomicU32>,
        result: Result<Coordinate, ()>,
    }

    impl LocationProvider for CountingProvider {
        async fn locate(&self) -> Result<Coordinate, PositioningError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map_err(|()| PositioningError::Malformed("permission denied".to_string()))
        }
    }

    struct HangingProvider;

    impl LocationProvider for HangingProvider {
        async fn locate(&self) -> Result<Coordinate, PositioningError> {
            std::future::pending().await
        }
    }

    fn acquirer_with(
        provider: Option<CountingProvider>,
        clock: ManualClock,
    ) -> LocationAcquirer<CountingProvider, ManualClock> {
        LocationAcquirer::new(provider, clock, LocationConfig::new(fallback()))
    }

    #[tokio::test]
    async fn second_acquire_within_ttl_hits_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let clock = ManualClock::start();
        let acquirer = acquirer_with(
            Some(CountingProvider {
                calls: Arc::clone(&calls),
                result: Ok(live_fix()),
            }),
            clock.clone(),
        );

        let first = acquirer.acquire().await;
        clock.advance(Duration::from_secs(60));
        let second = acquirer.acquire().await;

        assert_eq!(first, live_fix());
        assert_eq!(second, first, "cached coordinate must be identical");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "provider invoked once");
        assert_eq!(acquirer.last_source().await, Some(FixSource::Cache));
    }

    #[tokio::test]
    async fn cache_expires_after_ttl() {
        let calls = Arc::new(AtomicU32::new(0));
        let clock = ManualClock::start();
        let acquirer = acquirer_with(
            Some(CountingProvider {
                calls: Arc::clone(&calls),
                result: Ok(live_fix()),
            }),
            clock.clone(),
        );

        acquirer.acquire().await;
        clock.advance(Duration::from_secs(301));
        acquirer.acquire().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(acquirer.last_source().await, Some(FixSource::Live));
    }

    #[tokio::test]
    async fn provider_denial_falls_back_without_caching() {
        let calls = Arc::new(AtomicU32::new(0));
        let acquirer = acquirer_with(
            Some(CountingProvider {
                calls: Arc::clone(&calls),
                result: Err(()),
            }),
            ManualClock::start(),
        );

        let first = acquirer.acquire().await;
        let second = acquirer.acquire().await;

        assert_eq!(first, fallback());
        assert_eq!(second, fallback());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            2,
            "failures must not populate the cache"
        );
        assert_eq!(acquirer.last_source().await, Some(FixSource::Fallback));
    }

    #[tokio::test]
    async fn absent_capability_falls_back() {
        let acquirer: LocationAcquirer<CountingProvider, _> =
            LocationAcquirer::new(None, ManualClock::start(), LocationConfig::new(fallback()));

        assert_eq!(acquirer.acquire().await, fallback());
        assert_eq!(acquirer.last_source().await, Some(FixSource::Fallback));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_resolves_to_fallback_at_timeout() {
        let acquirer = LocationAcquirer::new(
            Some(HangingProvider),
            SystemClock,
            LocationConfig::new(fallback()),
        );

        assert_eq!(acquirer.acquire().await, fallback());
        assert_eq!(acquirer.last_source().await, Some(FixSource::Fallback));
    }

    #[tokio::test]
    async fn refresh_ignores_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let acquirer = acquirer_with(
            Some(CountingProvider {
                calls: Arc::clone(&calls),
                result: Ok(live_fix()),
            }),
            ManualClock::start(),
        );

        acquirer.acquire().await;
        let refreshed = acquirer.refresh().await;

        assert_eq!(refreshed, live_fix());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(acquirer.last_source().await, Some(FixSource::Live));
    }
}
