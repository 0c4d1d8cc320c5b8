//! Write operations for the `customer_orders` table.

use geosim_core::OrderRecord;
use sqlx::PgPool;

use crate::DbError;

/// Insert a batch of orders in one `INSERT … SELECT * FROM UNNEST(…)`.
///
/// Rows whose `order_id` already exists are skipped. Returns the number of
/// rows actually inserted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn insert_orders(pool: &PgPool, orders: &[OrderRecord]) -> Result<u64, sqlx::Error> {
    if orders.is_empty() {
        return Ok(0);
    }

    let mut order_ids: Vec<&str> = Vec::with_capacity(orders.len());
    let mut customer_lats: Vec<f64> = Vec::with_capacity(orders.len());
    let mut customer_lons: Vec<f64> = Vec::with_capacity(orders.len());
    let mut order_values: Vec<f64> = Vec::with_capacity(orders.len());
    let mut order_dates = Vec::with_capacity(orders.len());
    let mut store_ids: Vec<&str> = Vec::with_capacity(orders.len());
    let mut store_lats: Vec<f64> = Vec::with_capacity(orders.len());
    let mut store_lons: Vec<f64> = Vec::with_capacity(orders.len());
    let mut delivery_minutes: Vec<i32> = Vec::with_capacity(orders.len());

    for order in orders {
        order_ids.push(&order.order_id);
        customer_lats.push(order.customer.lat);
        customer_lons.push(order.customer.lon);
        order_values.push(order.order_value);
        order_dates.push(order.order_date);
        store_ids.push(&order.store_id);
        store_lats.push(order.store.lat);
        store_lons.push(order.store.lon);
        delivery_minutes.push(order.delivery_time_minutes);
    }

    let inserted = sqlx::query(
        "INSERT INTO customer_orders \
             (order_id, customer_lat, customer_lon, order_value, order_date, \
              store_id, store_lat, store_lon, delivery_time_minutes) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::float8[], $3::float8[], $4::float8[], $5::date[], \
              $6::text[], $7::float8[], $8::float8[], $9::int4[]) \
         ON CONFLICT (order_id) DO NOTHING",
    )
    .bind(&order_ids)
    .bind(&customer_lats)
    .bind(&customer_lons)
    .bind(&order_values)
    .bind(&order_dates)
    .bind(&store_ids)
    .bind(&store_lats)
    .bind(&store_lons)
    .bind(&delivery_minutes)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(inserted)
}

/// Insert `chunks` one statement at a time, stopping at the first failure.
///
/// Each chunk commits independently, so on failure the error carries the
/// failing chunk's index and how many rows earlier chunks committed. A caller
/// can resume from that chunk without replaying the rest.
///
/// # Errors
///
/// Returns [`DbError::ChunkInsert`] if any chunk fails.
pub async fn insert_order_chunks<I>(pool: &PgPool, chunks: I) -> Result<u64, DbError>
where
    I: IntoIterator<Item = Vec<OrderRecord>>,
{
    let mut rows_committed = 0_u64;

    for (chunk_index, chunk) in chunks.into_iter().enumerate() {
        let inserted = insert_orders(pool, &chunk)
            .await
            .map_err(|source| DbError::ChunkInsert {
                chunk_index,
                rows_committed,
                source,
            })?;

        rows_committed += inserted;
        tracing::info!(
            chunk = chunk_index,
            chunk_rows = chunk.len(),
            inserted,
            total = rows_committed,
            "inserted order chunk"
        );
    }

    Ok(rows_committed)
}
