//! Database integration tests. Each test gets a fresh schema via
//! `#[sqlx::test]` with the workspace migrations applied.

use nearbite_availability::MerchantSource;
use nearbite_core::merchants::MerchantEntry;
use nearbite_db::{list_online_merchants, seed_merchants, upsert_merchant, DbMerchantSource};

fn entry(id: &str, lat: f64, lng: f64, online: bool) -> MerchantEntry {
    MerchantEntry {
        id: id.to_string(),
        name: format!("Merchant {id}"),
        latitude: lat,
        longitude: lng,
        online,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_online_merchants_filters_offline(pool: sqlx::PgPool) {
    upsert_merchant(&pool, "open-kitchen", "Open Kitchen", 31.8210, 117.2280, true)
        .await
        .expect("insert online");
    upsert_merchant(&pool, "dark-kitchen", "Dark Kitchen", 31.8195, 117.2301, false)
        .await
        .expect("insert offline");

    let rows = list_online_merchants(&pool).await.expect("list");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].merchant_id, "open-kitchen");
    assert!(rows[0].is_online);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_online_merchants_orders_by_merchant_id(pool: sqlx::PgPool) {
    for id in ["m3", "m1", "m2"] {
        upsert_merchant(&pool, id, id, 31.8210, 117.2280, true)
            .await
            .expect("insert");
    }

    let rows = list_online_merchants(&pool).await.expect("list");
    let ids: Vec<&str> = rows.iter().map(|r| r.merchant_id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2", "m3"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_merchant_updates_existing_row(pool: sqlx::PgPool) {
    let first_id = upsert_merchant(&pool, "noodles", "Old Name", 31.8210, 117.2280, true)
        .await
        .expect("insert");
    let second_id = upsert_merchant(&pool, "noodles", "New Name", 31.8211, 117.2281, false)
        .await
        .expect("update");

    assert_eq!(first_id, second_id, "upsert must reuse the row");

    let rows = list_online_merchants(&pool).await.expect("list");
    assert!(rows.is_empty(), "merchant went offline in the update");
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_rejects_out_of_range_coordinates(pool: sqlx::PgPool) {
    let result = upsert_merchant(&pool, "nowhere", "Nowhere", 91.0, 117.2280, true).await;
    assert!(result.is_err(), "schema CHECK must reject latitude 91");
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_merchants_is_transactional_and_idempotent(pool: sqlx::PgPool) {
    let merchants = vec![
        entry("lakeside-noodles", 31.8210, 117.2280, true),
        entry("old-town-dumplings", 31.8195, 117.2301, true),
        entry("dark-kitchen", 31.8260, 117.2240, false),
    ];

    let count = seed_merchants(&pool, &merchants).await.expect("seed");
    assert_eq!(count, 3);

    // Re-seeding the same file changes nothing structurally.
    let count = seed_merchants(&pool, &merchants).await.expect("re-seed");
    assert_eq!(count, 3);

    let rows = list_online_merchants(&pool).await.expect("list");
    assert_eq!(rows.len(), 2, "offline seed entries stay out of the snapshot");
}

#[sqlx::test(migrations = "../../migrations")]
async fn db_source_maps_rows_to_domain_merchants(pool: sqlx::PgPool) {
    upsert_merchant(&pool, "lakeside-noodles", "Lakeside Noodles", 31.8210, 117.2280, true)
        .await
        .expect("insert");

    let source = DbMerchantSource::new(pool);
    let merchants = source.list_online().await.expect("list");

    assert_eq!(merchants.len(), 1);
    let m = &merchants[0];
    assert_eq!(m.id, "lakeside-noodles");
    assert_eq!(m.name, "Lakeside Noodles");
    assert!(m.is_online);
    assert!((m.coordinate.latitude() - 31.8210).abs() < 1e-9);
    assert!((m.coordinate.longitude() - 117.2280).abs() < 1e-9);
}

#[sqlx::test(migrations = "../../migrations")]
async fn db_source_reports_closed_pool_as_unavailable(pool: sqlx::PgPool) {
    let source = DbMerchantSource::new(pool.clone());
    pool.close().await;

    let err = source.list_online().await.unwrap_err();
    assert!(!err.reason.is_empty());
}
