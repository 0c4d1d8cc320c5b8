//! Row types for the `customer_orders` table.

use chrono::NaiveDate;
use geosim_core::{OrderRecord, SpatialPoint, StoreLocation};

use crate::DbError;

/// A row from the `customer_orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub order_id: String,
    pub customer_lat: f64,
    pub customer_lon: f64,
    pub order_value: f64,
    pub order_date: NaiveDate,
    pub store_id: String,
    pub store_lat: f64,
    pub store_lon: f64,
    pub delivery_time_minutes: i32,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = DbError;

    /// Coordinates are validated here so the engine never sees out-of-range
    /// degrees.
    fn try_from(row: OrderRow) -> Result<Self, DbError> {
        let invalid = |source| DbError::InvalidRow {
            id: row.order_id.clone(),
            source,
        };
        let customer = SpatialPoint::try_new(row.customer_lat, row.customer_lon).map_err(invalid)?;
        let store = SpatialPoint::try_new(row.store_lat, row.store_lon).map_err(invalid)?;

        Ok(OrderRecord {
            order_id: row.order_id,
            customer,
            order_value: row.order_value,
            order_date: row.order_date,
            store_id: row.store_id,
            store,
            delivery_time_minutes: row.delivery_time_minutes,
        })
    }
}

/// One distinct store as seen in stored orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreLocationRow {
    pub store_id: String,
    pub store_lat: f64,
    pub store_lon: f64,
    pub order_count: i64,
}

impl StoreLocationRow {
    /// Convert to a [`StoreLocation`], taking the display name from `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] for out-of-range coordinates.
    pub fn into_store_location(self, name: String) -> Result<StoreLocation, DbError> {
        let location =
            SpatialPoint::try_new(self.store_lat, self.store_lon).map_err(|source| {
                DbError::InvalidRow {
                    id: self.store_id.clone(),
                    source,
                }
            })?;
        Ok(StoreLocation {
            store_id: self.store_id,
            name,
            location,
        })
    }
}

/// Headline figures over the whole `customer_orders` table.
///
/// Averages and dates are `None` when the table is empty.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderOverviewRow {
    pub order_count: i64,
    pub store_count: i64,
    pub total_value: Option<f64>,
    pub avg_value: Option<f64>,
    pub avg_delivery_minutes: Option<f64>,
    pub first_order_date: Option<NaiveDate>,
    pub last_order_date: Option<NaiveDate>,
}
