//! Store-to-customer distance filter (`ST_Distance` simulation).

use std::collections::HashSet;

use geosim_core::OrderRecord;

use super::{cmp_distance, truncate, EvaluatedRecord};
use crate::error::{require_limit, require_positive, EngineError};
use crate::geometry::{great_circle_distance_meters, round2};

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceQuery {
    /// Stores whose orders are considered. Must be non-empty.
    pub store_ids: Vec<String>,
    pub max_distance_km: f64,
    /// Inclusive lower bound on `order_value`; `0` keeps everything.
    pub min_order_value: f64,
    pub limit: Option<usize>,
}

impl DistanceQuery {
    #[must_use]
    pub fn new(store_ids: Vec<String>, max_distance_km: f64, min_order_value: f64) -> Self {
        Self {
            store_ids,
            max_distance_km,
            min_order_value,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] for an empty store set, a
    /// non-positive distance, a negative or non-finite minimum value, or a
    /// zero limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.store_ids.is_empty() {
            return Err(EngineError::invalid(
                "store_ids",
                "at least one store must be selected",
            ));
        }
        require_positive("max_distance_km", self.max_distance_km)?;
        if !(self.min_order_value.is_finite() && self.min_order_value >= 0.0) {
            return Err(EngineError::invalid(
                "min_order_value",
                format!("{} must be >= 0", self.min_order_value),
            ));
        }
        require_limit(self.limit)
    }
}

/// Keep orders for the selected stores with `order_value >= min` and
/// haversine distance to their store `<= max_distance_km`.
///
/// The distance is rounded to 2 decimals before the threshold comparison.
/// Output is sorted by `(store_id, distance_km, order_id)` ascending, then
/// capped at `limit`.
///
/// # Errors
///
/// See [`DistanceQuery::validate`].
pub fn evaluate_distance(
    orders: &[OrderRecord],
    query: &DistanceQuery,
) -> Result<Vec<EvaluatedRecord>, EngineError> {
    query.validate()?;

    let stores: HashSet<&str> = query.store_ids.iter().map(String::as_str).collect();

    let mut records: Vec<EvaluatedRecord> = orders
        .iter()
        .filter(|o| stores.contains(o.store_id.as_str()))
        .filter(|o| o.order_value >= query.min_order_value)
        .filter_map(|o| {
            let distance_km = round2(great_circle_distance_meters(o.customer, o.store) / 1000.0);
            (distance_km <= query.max_distance_km).then(|| {
                let mut record = EvaluatedRecord::from_order(o);
                record.distance_km = Some(distance_km);
                record
            })
        })
        .collect();

    records.sort_by(|a, b| {
        a.order
            .store_id
            .cmp(&b.order.store_id)
            .then_with(|| cmp_distance(a, b))
            .then_with(|| a.order.order_id.cmp(&b.order.order_id))
    });
    truncate(&mut records, query.limit);

    Ok(records)
}
