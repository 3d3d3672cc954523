use nearbite_core::merchants::MerchantEntry;
use sqlx::PgPool;

use crate::DbError;

/// Upsert merchants from the seed file into the database.
///
/// Returns the number of merchants processed (inserted or updated). All
/// upserts run inside a single transaction; if any operation fails the
/// entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_merchants(pool: &PgPool, merchants: &[MerchantEntry]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for merchant in merchants {
        sqlx::query(
            "INSERT INTO merchants (merchant_id, name, latitude, longitude, is_online) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (merchant_id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 is_online = EXCLUDED.is_online, \
                 updated_at = NOW()",
        )
        .bind(&merchant.id)
        .bind(&merchant.name)
        .bind(merchant.latitude)
        .bind(merchant.longitude)
        .bind(merchant.online)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
