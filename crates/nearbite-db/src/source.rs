//! [`MerchantSource`] implementation backed by the `merchants` table.

use nearbite_availability::{MerchantSource, SourceUnavailable};
use nearbite_core::Merchant;
use sqlx::PgPool;

use crate::merchants::list_online_merchants;

/// Merchant snapshot source reading from Postgres.
#[derive(Clone)]
pub struct DbMerchantSource {
    pool: PgPool,
}

impl DbMerchantSource {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MerchantSource for DbMerchantSource {
    async fn list_online(&self) -> Result<Vec<Merchant>, SourceUnavailable> {
        let rows = list_online_merchants(&self.pool)
            .await
            .map_err(|e| SourceUnavailable::new(e.to_string()))?;

        let mut merchants = Vec::with_capacity(rows.len());
        for row in rows {
            let merchant_id = row.merchant_id.clone();
            match row.into_merchant() {
                Ok(merchant) => merchants.push(merchant),
                Err(e) => {
                    tracing::warn!(
                        merchant_id,
                        error = %e,
                        "skipping merchant row with out-of-range coordinates"
                    );
                }
            }
        }
        Ok(merchants)
    }
}
