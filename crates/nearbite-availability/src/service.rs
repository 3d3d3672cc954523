//! Availability orchestration: acquire a position, run the matcher, and keep
//! an observable check state for display consumers.
//!
//! The latest-result contract: every check takes a ticket from a monotonic
//! sequence; a completion only updates the observable state if its ticket is
//! still the newest. Superseded completions return their result to their own
//! caller and are otherwise dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use nearbite_core::{AvailabilityQuery, AvailabilityResult, Coordinate};
use tokio::sync::Mutex;

use crate::location::{Clock, LocationAcquirer, LocationProvider};
use crate::matcher::AvailabilityMatcher;
use crate::{MerchantSource, ServiceError};

/// Observable state of the most recent availability check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckState {
    /// No check has been issued yet.
    Idle,
    /// A check is in flight.
    Loading,
    Succeeded(AvailabilityResult),
    Failed(String),
}

struct DisplayState {
    state: CheckState,
    /// Survives failures: a failed refresh leaves the previous result
    /// readable (stale-but-shown).
    last_result: Option<AvailabilityResult>,
}

pub struct AvailabilityService<S, P, C> {
    matcher: AvailabilityMatcher<S>,
    acquirer: LocationAcquirer<P, C>,
    default_radius_meters: f64,
    seq: AtomicU64,
    display: Mutex<DisplayState>,
}

impl<S, P, C> AvailabilityService<S, P, C>
where
    S: MerchantSource,
    P: LocationProvider,
    C: Clock,
{
    pub fn new(
        source: S,
        acquirer: LocationAcquirer<P, C>,
        default_radius_meters: f64,
    ) -> Self {
        Self {
            matcher: AvailabilityMatcher::new(source),
            acquirer,
            default_radius_meters,
            seq: AtomicU64::new(0),
            display: Mutex::new(DisplayState {
                state: CheckState::Idle,
                last_result: None,
            }),
        }
    }

    /// Acquire a position and check availability with the default radius.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CheckFailed`] if the merchant index is
    /// unreachable. Positioning failures never error; they resolve to the
    /// fallback coordinate.
    pub async fn check_availability(&self) -> Result<AvailabilityResult, ServiceError> {
        self.check_with_radius(self.default_radius_meters).await
    }

    /// Same as [`Self::check_availability`] with an explicit radius.
    ///
    /// # Errors
    ///
    /// Additionally returns [`ServiceError::InvalidQuery`] for a non-positive
    /// radius, before any distance work.
    pub async fn check_with_radius(
        &self,
        radius_meters: f64,
    ) -> Result<AvailabilityResult, ServiceError> {
        let origin = self.acquirer.acquire().await;
        self.check_at(origin, radius_meters).await
    }

    /// Check availability for an explicit origin (the HTTP boundary passes
    /// the client-reported position through here).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidQuery`] for a non-positive radius and
    /// [`ServiceError::CheckFailed`] if the merchant index is unreachable.
    pub async fn check_at(
        &self,
        origin: Coordinate,
        radius_meters: f64,
    ) -> Result<AvailabilityResult, ServiceError> {
        let query = AvailabilityQuery::new(origin, radius_meters)?;
        let ticket = self.begin().await;

        match self.matcher.evaluate(&query).await {
            Ok(result) => {
                self.complete_ok(ticket, &result).await;
                Ok(result)
            }
            Err(e) => {
                let message = e.to_string();
                self.complete_err(ticket, &message).await;
                Err(ServiceError::CheckFailed(message))
            }
        }
    }

    /// Force location re-acquisition and re-run the pipeline with the
    /// default radius.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CheckFailed`] if the merchant index is
    /// unreachable.
    pub async fn refresh(&self) -> Result<AvailabilityResult, ServiceError> {
        let origin = self.acquirer.refresh().await;
        self.check_at(origin, self.default_radius_meters).await
    }

    /// Radius applied when the caller does not pass one.
    #[must_use]
    pub fn default_radius_meters(&self) -> f64 {
        self.default_radius_meters
    }

    /// Current observable state.
    pub async fn state(&self) -> CheckState {
        self.display.lock().await.state.clone()
    }

    /// Most recent successful result, retained across failures.
    pub async fn last_result(&self) -> Option<AvailabilityResult> {
        self.display.lock().await.last_result.clone()
    }

    async fn begin(&self) -> u64 {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut display = self.display.lock().await;
        // A slow check may reach this point after a newer one already
        // finished; its Loading marker must not clobber the newer state.
        if ticket == self.seq.load(Ordering::SeqCst) {
            display.state = CheckState::Loading;
        }
        ticket
    }

    async fn complete_ok(&self, ticket: u64, result: &AvailabilityResult) {
        let mut display = self.display.lock().await;
        if ticket == self.seq.load(Ordering::SeqCst) {
            display.state = CheckState::Succeeded(result.clone());
            display.last_result = Some(result.clone());
        } else {
            tracing::debug!(ticket, "dropping superseded availability result");
        }
    }

    async fn complete_err(&self, ticket: u64, message: &str) {
        let mut display = self.display.lock().await;
        if ticket == self.seq.load(Ordering::SeqCst) {
            tracing::warn!(error = message, "availability check failed");
            display.state = CheckState::Failed(message.to_string());
        } else {
            tracing::debug!(ticket, "dropping superseded availability failure");
        }
    }
}
