//! Live integration tests for geosim-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/geosim-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use geosim_core::{BoundingBox, Catalog, OrderRecord, SpatialPoint, ZoneRecord};
use geosim_db::{
    count_orders, count_zones, insert_order_chunks, insert_orders, insert_zones, list_orders,
    list_orders_for_stores, list_orders_in_window, list_store_locations, list_zones,
    max_order_sequence, order_overview, run_migrations, DbError,
};
use geosim_engine::{generate_orders, generate_zones, OrderGeneratorConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_order(id: &str, store_id: &str, customer: SpatialPoint, value: f64) -> OrderRecord {
    OrderRecord {
        order_id: id.to_string(),
        customer,
        order_value: value,
        order_date: NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
        store_id: store_id.to_string(),
        store: SpatialPoint::new(12.9279, 77.6271),
        delivery_time_minutes: 25,
    }
}

fn records(rows: Vec<geosim_db::OrderRow>) -> Vec<OrderRecord> {
    rows.into_iter()
        .map(|r| OrderRecord::try_from(r).expect("stored row is valid"))
        .collect()
}

// ---------------------------------------------------------------------------
// Section 1: Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_orders_round_trips(pool: sqlx::PgPool) {
    let orders = vec![
        make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 120.5),
        make_order("ORD_000002", "STORE_002", SpatialPoint::new(12.98, 77.64), 80.0),
    ];

    let inserted = insert_orders(&pool, &orders).await.expect("insert_orders failed");
    assert_eq!(inserted, 2);

    let stored = records(list_orders(&pool).await.expect("list_orders failed"));
    assert_eq!(stored, orders);
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_orders_skips_existing_ids(pool: sqlx::PgPool) {
    let first = vec![make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0)];
    insert_orders(&pool, &first).await.expect("first insert failed");

    let again = vec![
        make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
        make_order("ORD_000002", "STORE_001", SpatialPoint::new(12.94, 77.62), 20.0),
    ];
    let inserted = insert_orders(&pool, &again).await.expect("second insert failed");
    assert_eq!(inserted, 1);
    assert_eq!(count_orders(&pool).await.expect("count failed"), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_orders_empty_is_noop(pool: sqlx::PgPool) {
    assert_eq!(insert_orders(&pool, &[]).await.expect("empty insert failed"), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn generated_chunks_are_all_committed(pool: sqlx::PgPool) {
    let catalog = Catalog::bengaluru();
    let config = OrderGeneratorConfig::new(2_345, 90, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
    let generator = generate_orders(&catalog, config, StdRng::seed_from_u64(12)).unwrap();

    let committed = insert_order_chunks(&pool, generator.chunks(1_000))
        .await
        .expect("chunked insert failed");
    assert_eq!(committed, 2_345);
    assert_eq!(count_orders(&pool).await.unwrap(), 2_345);
}

#[sqlx::test(migrations = "../../migrations")]
async fn run_migrations_is_idempotent(pool: sqlx::PgPool) {
    let applied = run_migrations(&pool).await.expect("migrations already applied");
    assert_eq!(applied, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn max_order_sequence_ignores_foreign_ids(pool: sqlx::PgPool) {
    assert_eq!(max_order_sequence(&pool).await.unwrap(), 0);

    let orders = vec![
        make_order("ORD_000007", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
        make_order("ORD_000012", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
        make_order("LEGACY_99999", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
    ];
    insert_orders(&pool, &orders).await.unwrap();

    assert_eq!(max_order_sequence(&pool).await.unwrap(), 12);
}

#[sqlx::test(migrations = "../../migrations")]
async fn append_after_gap_commits_every_order(pool: sqlx::PgPool) {
    let catalog = Catalog::bengaluru();
    let end = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let first = generate_orders(
        &catalog,
        OrderGeneratorConfig::new(100, 30, end),
        StdRng::seed_from_u64(3),
    )
    .unwrap();
    insert_order_chunks(&pool, first.chunks(40)).await.unwrap();

    sqlx::query("DELETE FROM customer_orders WHERE order_id = 'ORD_000050'")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(count_orders(&pool).await.unwrap(), 99);

    let next = usize::try_from(max_order_sequence(&pool).await.unwrap()).unwrap() + 1;
    assert_eq!(next, 101);
    let appended = generate_orders(
        &catalog,
        OrderGeneratorConfig::new(25, 30, end).starting_at(next),
        StdRng::seed_from_u64(4),
    )
    .unwrap();

    let committed = insert_order_chunks(&pool, appended.chunks(10)).await.unwrap();
    assert_eq!(committed, 25);
    assert_eq!(count_orders(&pool).await.unwrap(), 124);
}

#[sqlx::test(migrations = "../../migrations")]
async fn failing_chunk_reports_its_index(pool: sqlx::PgPool) {
    let good = vec![make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0)];
    // Negative value violates the table's CHECK constraint.
    let bad = vec![make_order("ORD_000002", "STORE_001", SpatialPoint::new(12.93, 77.62), -1.0)];

    let err = insert_order_chunks(&pool, vec![good, bad])
        .await
        .expect_err("second chunk must fail");
    match err {
        DbError::ChunkInsert {
            chunk_index,
            rows_committed,
            ..
        } => {
            assert_eq!(chunk_index, 1);
            assert_eq!(rows_committed, 1);
        }
        other => panic!("expected ChunkInsert, got {other:?}"),
    }
    assert_eq!(count_orders(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn store_filter_applies_value_floor(pool: sqlx::PgPool) {
    let orders = vec![
        make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 40.0),
        make_order("ORD_000002", "STORE_001", SpatialPoint::new(12.93, 77.62), 400.0),
        make_order("ORD_000003", "STORE_003", SpatialPoint::new(12.93, 77.62), 400.0),
    ];
    insert_orders(&pool, &orders).await.unwrap();

    let rows = list_orders_for_stores(&pool, &["STORE_001".to_string()], 100.0)
        .await
        .expect("list_orders_for_stores failed");
    let ids: Vec<&str> = rows.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(ids, vec!["ORD_000002"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn window_filter_is_inclusive(pool: sqlx::PgPool) {
    let orders = vec![
        make_order("ORD_000001", "STORE_001", SpatialPoint::new(13.0, 77.6), 10.0),
        make_order("ORD_000002", "STORE_001", SpatialPoint::new(13.1, 77.6), 10.0),
        make_order("ORD_000003", "STORE_001", SpatialPoint::new(13.5, 77.6), 10.0),
    ];
    insert_orders(&pool, &orders).await.unwrap();

    let window = BoundingBox {
        min_lat: 12.9,
        max_lat: 13.1,
        min_lon: 77.5,
        max_lon: 77.7,
    };
    let rows = list_orders_in_window(&pool, window).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn store_locations_are_distinct(pool: sqlx::PgPool) {
    let orders = vec![
        make_order("ORD_000001", "STORE_002", SpatialPoint::new(12.93, 77.62), 10.0),
        make_order("ORD_000002", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
        make_order("ORD_000003", "STORE_001", SpatialPoint::new(12.93, 77.62), 10.0),
    ];
    insert_orders(&pool, &orders).await.unwrap();

    let stores = list_store_locations(&pool).await.unwrap();
    let summary: Vec<(&str, i64)> = stores
        .iter()
        .map(|s| (s.store_id.as_str(), s.order_count))
        .collect();
    assert_eq!(summary, vec![("STORE_001", 2), ("STORE_002", 1)]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn overview_handles_empty_and_populated_tables(pool: sqlx::PgPool) {
    let empty = order_overview(&pool).await.unwrap();
    assert_eq!(empty.order_count, 0);
    assert!(empty.avg_value.is_none());
    assert!(empty.first_order_date.is_none());

    let orders = vec![
        make_order("ORD_000001", "STORE_001", SpatialPoint::new(12.93, 77.62), 100.0),
        make_order("ORD_000002", "STORE_002", SpatialPoint::new(12.93, 77.62), 300.0),
    ];
    insert_orders(&pool, &orders).await.unwrap();

    let overview = order_overview(&pool).await.unwrap();
    assert_eq!(overview.order_count, 2);
    assert_eq!(overview.store_count, 2);
    assert_eq!(overview.total_value, Some(400.0));
    assert_eq!(overview.avg_value, Some(200.0));
    assert_eq!(overview.avg_delivery_minutes, Some(25.0));
}

// ---------------------------------------------------------------------------
// Section 2: Zones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn zones_upsert_and_list_in_id_order(pool: sqlx::PgPool) {
    let zones = generate_zones(&Catalog::bengaluru());
    let written = insert_zones(&pool, &zones).await.expect("insert_zones failed");
    assert_eq!(written, 10);

    // Re-seeding updates rather than duplicates.
    insert_zones(&pool, &zones).await.expect("re-seed failed");
    assert_eq!(count_zones(&pool).await.unwrap(), 10);

    let stored: Vec<ZoneRecord> = list_zones(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| ZoneRecord::try_from(r).unwrap())
        .collect();
    assert_eq!(stored, zones);
}
