//! Read operations for the `customer_orders` table.

use geosim_core::BoundingBox;
use sqlx::PgPool;

use super::types::{OrderOverviewRow, OrderRow, StoreLocationRow};
use crate::DbError;

const ORDER_COLUMNS: &str = "order_id, customer_lat, customer_lon, order_value, order_date, \
                             store_id, store_lat, store_lon, delivery_time_minutes";

/// Every stored order, ordered by `order_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_orders ORDER BY order_id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Orders placed at any of `store_ids` with `order_value >= min_order_value`.
///
/// This is the cheap pre-filter for distance analysis; the distance
/// threshold itself is applied by the engine.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_for_stores(
    pool: &PgPool,
    store_ids: &[String],
    min_order_value: f64,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_orders \
         WHERE store_id = ANY($1::text[]) \
           AND order_value >= $2 \
         ORDER BY order_id"
    ))
    .bind(store_ids)
    .bind(min_order_value)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Orders whose customer point lies inside `window`, edges inclusive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_in_window(
    pool: &PgPool,
    window: BoundingBox,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM customer_orders \
         WHERE customer_lat BETWEEN $1 AND $2 \
           AND customer_lon BETWEEN $3 AND $4 \
         ORDER BY order_id"
    ))
    .bind(window.min_lat)
    .bind(window.max_lat)
    .bind(window.min_lon)
    .bind(window.max_lon)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct stores referenced by stored orders, ordered by `store_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_store_locations(pool: &PgPool) -> Result<Vec<StoreLocationRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreLocationRow>(
        "SELECT store_id, \
                MIN(store_lat) AS store_lat, \
                MIN(store_lon) AS store_lon, \
                COUNT(*)       AS order_count \
         FROM customer_orders \
         GROUP BY store_id \
         ORDER BY store_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_orders(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer_orders")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Highest numeric suffix among `ORD_<digits>` ids, or `0` for an empty table.
///
/// Ids in any other shape are ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn max_order_sequence(pool: &PgPool) -> Result<i64, DbError> {
    let max = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(CAST(SUBSTRING(order_id FROM '^ORD_([0-9]+)$') AS BIGINT)) \
         FROM customer_orders",
    )
    .fetch_one(pool)
    .await?;

    Ok(max.unwrap_or(0))
}

/// Headline totals across all orders.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn order_overview(pool: &PgPool) -> Result<OrderOverviewRow, DbError> {
    let row = sqlx::query_as::<_, OrderOverviewRow>(
        "SELECT COUNT(*)                                AS order_count, \
                COUNT(DISTINCT store_id)                AS store_count, \
                SUM(order_value)                        AS total_value, \
                AVG(order_value)                        AS avg_value, \
                AVG(delivery_time_minutes)::float8      AS avg_delivery_minutes, \
                MIN(order_date)                         AS first_order_date, \
                MAX(order_date)                         AS last_order_date \
         FROM customer_orders",
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}
