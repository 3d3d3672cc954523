//! Radius matching over the merchant snapshot.
//!
//! A linear scan is the reference implementation; merchant counts are small
//! and the snapshot arrives pre-sorted by id, so the scan is deterministic.

use std::cmp::Ordering;

use nearbite_core::{geo, AvailabilityQuery, AvailabilityResult, Coordinate, Merchant, NearestMerchant};

use crate::{MerchantSource, SourceUnavailable};

/// Rank a merchant snapshot against an origin and radius.
///
/// Keeps online merchants within `radius_meters` of `origin` (inclusive
/// boundary), counts them, and picks the nearest with ties broken by
/// ascending merchant id. Comparisons use unrounded distances; only the
/// distance exposed in the result is rounded to whole meters.
#[must_use]
pub fn rank(origin: Coordinate, radius_meters: f64, merchants: &[Merchant]) -> AvailabilityResult {
    let mut count = 0usize;
    let mut nearest: Option<(f64, &Merchant)> = None;

    for merchant in merchants.iter().filter(|m| m.is_online) {
        let distance = geo::distance_meters(origin, merchant.coordinate);
        if distance > radius_meters {
            continue;
        }
        count += 1;

        let closer = match &nearest {
            None => true,
            Some((best_distance, best)) => match distance.total_cmp(best_distance) {
                Ordering::Less => true,
                Ordering::Equal => merchant.id < best.id,
                Ordering::Greater => false,
            },
        };
        if closer {
            nearest = Some((distance, merchant));
        }
    }

    AvailabilityResult {
        is_available: count > 0,
        nearby_merchant_count: count,
        nearest_merchant: nearest.map(|(distance, merchant)| NearestMerchant {
            id: merchant.id.clone(),
            name: merchant.name.clone(),
            distance_meters: round_meters(distance),
        }),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_meters(distance: f64) -> u64 {
    distance.round() as u64
}

/// Availability matcher over a [`MerchantSource`].
pub struct AvailabilityMatcher<S> {
    source: S,
}

impl<S: MerchantSource> AvailabilityMatcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Evaluate one availability query against the current snapshot.
    ///
    /// An empty snapshot yields a negative result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceUnavailable`] if the merchant index cannot be reached.
    pub async fn evaluate(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResult, SourceUnavailable> {
        let merchants = self.source.list_online().await?;
        Ok(rank(query.origin(), query.radius_meters(), &merchants))
    }
}
