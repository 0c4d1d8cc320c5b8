//! Database operations for the `customer_orders` table.

mod read;
mod types;
mod write;

pub use read::{
    count_orders, list_orders, list_orders_for_stores, list_orders_in_window,
    list_store_locations, max_order_sequence, order_overview,
};
pub use types::{OrderOverviewRow, OrderRow, StoreLocationRow};
pub use write::{insert_order_chunks, insert_orders};
