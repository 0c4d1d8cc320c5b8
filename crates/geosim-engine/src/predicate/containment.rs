//! Zone assignment by square degree box (`ST_Contains` simulation).

use geosim_core::{BoundingBox, OrderRecord, SpatialPoint, ZoneRecord};

use super::{truncate, EvaluatedRecord};
use crate::error::{require_limit, require_positive, EngineError};

pub const DEFAULT_CONTAINMENT_MARGIN_DEG: f64 = 0.05;

/// Zone id assigned to orders no zone box contains.
pub const UNKNOWN_ZONE: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct ContainmentQuery {
    /// Checked in order; the first zone whose box holds the customer wins.
    pub zones: Vec<ZoneRecord>,
    pub margin_deg: f64,
    /// Drop orders that end up in [`UNKNOWN_ZONE`].
    pub matched_only: bool,
    pub limit: Option<usize>,
}

impl ContainmentQuery {
    #[must_use]
    pub fn new(zones: Vec<ZoneRecord>) -> Self {
        Self {
            zones,
            margin_deg: DEFAULT_CONTAINMENT_MARGIN_DEG,
            matched_only: false,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin_deg: f64) -> Self {
        self.margin_deg = margin_deg;
        self
    }

    #[must_use]
    pub fn matched_only(mut self) -> Self {
        self.matched_only = true;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] for an empty zone list, a
    /// non-positive margin, or a zero limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.zones.is_empty() {
            return Err(EngineError::invalid("zones", "at least one zone is required"));
        }
        require_positive("margin_deg", self.margin_deg)?;
        require_limit(self.limit)
    }
}

/// The zones named by `ids`, in that order, or all of `zones` when `ids` is
/// empty. The returned order is the first-match order used by containment.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] if an id names no zone.
pub fn select_zones(zones: &[ZoneRecord], ids: &[String]) -> Result<Vec<ZoneRecord>, EngineError> {
    if ids.is_empty() {
        return Ok(zones.to_vec());
    }
    ids.iter()
        .map(|id| {
            zones
                .iter()
                .find(|z| z.zone_id == *id)
                .cloned()
                .ok_or_else(|| EngineError::invalid("zones", format!("unknown zone '{id}'")))
        })
        .collect()
}

/// First zone in `boxes` containing `point`, or [`UNKNOWN_ZONE`].
#[must_use]
pub fn assign_zone<'a>(point: SpatialPoint, boxes: &[(&'a str, BoundingBox)]) -> &'a str {
    boxes
        .iter()
        .find(|(_, bbox)| bbox.contains(point))
        .map_or(UNKNOWN_ZONE, |(zone_id, _)| *zone_id)
}

/// Tag every order with the first zone whose box contains the customer.
///
/// Output is sorted by `order_value` descending, ties broken by `order_id`,
/// then capped at `limit`.
///
/// # Errors
///
/// See [`ContainmentQuery::validate`].
pub fn evaluate_containment(
    orders: &[OrderRecord],
    query: &ContainmentQuery,
) -> Result<Vec<EvaluatedRecord>, EngineError> {
    query.validate()?;

    let boxes: Vec<(&str, BoundingBox)> = query
        .zones
        .iter()
        .map(|z| (z.zone_id.as_str(), z.bounding_box(query.margin_deg)))
        .collect();

    let mut records: Vec<EvaluatedRecord> = orders
        .iter()
        .filter_map(|o| {
            let zone_id = assign_zone(o.customer, &boxes);
            if query.matched_only && zone_id == UNKNOWN_ZONE {
                return None;
            }
            let mut record = EvaluatedRecord::from_order(o);
            record.zone_id = Some(zone_id.to_string());
            Some(record)
        })
        .collect();

    records.sort_by(|a, b| {
        b.order
            .order_value
            .total_cmp(&a.order.order_value)
            .then_with(|| a.order.order_id.cmp(&b.order.order_id))
    });
    truncate(&mut records, query.limit);

    Ok(records)
}
