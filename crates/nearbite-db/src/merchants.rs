//! Read/write operations for the `merchants` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nearbite_core::{Coordinate, CoreError, Merchant};

/// A row from the `merchants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MerchantRow {
    pub id: i64,
    pub merchant_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MerchantRow {
    /// Convert the row into the domain snapshot type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] if the stored position is out
    /// of range (the schema CHECKs make this unreachable for rows written
    /// through this crate).
    pub fn into_merchant(self) -> Result<Merchant, CoreError> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)?;
        Ok(Merchant {
            id: self.merchant_id,
            name: self.name,
            coordinate,
            is_online: self.is_online,
        })
    }
}

/// Return all online merchants, ordered by merchant id ascending.
///
/// The ordering keeps downstream nearest-merchant tie-breaking deterministic.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_online_merchants(pool: &PgPool) -> Result<Vec<MerchantRow>, sqlx::Error> {
    sqlx::query_as::<_, MerchantRow>(
        "SELECT id, merchant_id, name, latitude, longitude, is_online, \
                created_at, updated_at \
         FROM merchants \
         WHERE is_online = TRUE \
         ORDER BY merchant_id ASC",
    )
    .fetch_all(pool)
    .await
}

/// Insert or update a merchant by its opaque `merchant_id`.
///
/// Returns the surrogate row id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_merchant(
    pool: &PgPool,
    merchant_id: &str,
    name: &str,
    latitude: f64,
    longitude: f64,
    is_online: bool,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO merchants (merchant_id, name, latitude, longitude, is_online) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (merchant_id) DO UPDATE SET \
             name = EXCLUDED.name, \
             latitude = EXCLUDED.latitude, \
             longitude = EXCLUDED.longitude, \
             is_online = EXCLUDED.is_online, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(merchant_id)
    .bind(name)
    .bind(latitude)
    .bind(longitude)
    .bind(is_online)
    .fetch_one(pool)
    .await
}
