//! Service-availability core: decide whether any online merchant can serve a
//! given position, how many candidates are in range, and which is nearest.

use std::future::Future;

use nearbite_core::{CoreError, Merchant};
use thiserror::Error;

pub mod location;
pub mod matcher;
pub mod service;

pub use location::{
    Clock, FixSource, GeoIpLocator, LocationAcquirer, LocationConfig, LocationProvider,
    SystemClock,
};
pub use matcher::{rank, AvailabilityMatcher};
pub use service::{AvailabilityService, CheckState};

/// The merchant index could not be reached.
///
/// This is never collapsed into "no merchants nearby" — callers surface it as
/// a recoverable failure and keep any previously known result.
#[derive(Debug, Error)]
#[error("merchant source unavailable: {reason}")]
pub struct SourceUnavailable {
    pub reason: String,
}

impl SourceUnavailable {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors from live positioning. These never reach availability callers; the
/// acquirer absorbs them into the fallback-coordinate path.
#[derive(Debug, Error)]
pub enum PositioningError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed geolocation response: {0}")]
    Malformed(String),

    #[error("positioning timed out")]
    TimedOut,

    #[error("no positioning capability configured")]
    Unavailable,
}

/// Errors surfaced by [`AvailabilityService`] to its callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The query itself was invalid (bad radius); terminal for this request.
    #[error(transparent)]
    InvalidQuery(#[from] CoreError),

    /// The merchant index was unreachable; recoverable, retry via refresh.
    #[error("availability check failed: {0}")]
    CheckFailed(String),
}

/// A point-in-time view of the online merchants.
///
/// Implementations return only merchants that are online at query time, in a
/// stable order (ascending id), and signal an unreachable backing store as
/// [`SourceUnavailable`] rather than an empty list.
pub trait MerchantSource: Send + Sync {
    fn list_online(&self)
        -> impl Future<Output = Result<Vec<Merchant>, SourceUnavailable>> + Send;
}
