//! Spatial predicate evaluation over order batches.
//!
//! Three simulated predicates, one per submodule:
//!
//! | Mode | Simulates | Membership test |
//! |------|-----------|-----------------|
//! | [`distance`] | `ST_Distance` | haversine km to the assigned store `<= max` |
//! | [`containment`] | `ST_Contains` | square degree box around each zone center |
//! | [`coverage`] | `ST_COVERS` | equirectangular km to one center `<= radius` |
//!
//! Every mode is a pure function of its inputs. Input records are never
//! mutated; each mode returns fresh [`EvaluatedRecord`]s in a documented order.

pub mod containment;
pub mod coverage;
pub mod distance;

use std::cmp::Ordering;

use geosim_core::OrderRecord;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use containment::{
    assign_zone, evaluate_containment, select_zones, ContainmentQuery, DEFAULT_CONTAINMENT_MARGIN_DEG,
    UNKNOWN_ZONE,
};
pub use coverage::{evaluate_coverage, CoverageQuery, CoverageReport};
pub use distance::{evaluate_distance, DistanceQuery};

/// An order plus whatever the chosen predicate derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRecord {
    #[serde(flatten)]
    pub order: OrderRecord,
    /// Kilometres to the mode's reference point, rounded to 2 decimals.
    pub distance_km: Option<f64>,
    /// Set by coverage mode only.
    pub covered: Option<bool>,
    /// Set by containment mode only; [`UNKNOWN_ZONE`] when nothing matched.
    pub zone_id: Option<String>,
}

impl EvaluatedRecord {
    pub(crate) fn from_order(order: &OrderRecord) -> Self {
        Self {
            order: order.clone(),
            distance_km: None,
            covered: None,
            zone_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Distance,
    Containment,
    Coverage,
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::Distance => write!(f, "distance"),
            QueryMode::Containment => write!(f, "containment"),
            QueryMode::Coverage => write!(f, "coverage"),
        }
    }
}

/// A fully-specified query for one of the three modes.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialQuery {
    Distance(DistanceQuery),
    Containment(ContainmentQuery),
    Coverage(CoverageQuery),
}

impl SpatialQuery {
    #[must_use]
    pub fn mode(&self) -> QueryMode {
        match self {
            SpatialQuery::Distance(_) => QueryMode::Distance,
            SpatialQuery::Containment(_) => QueryMode::Containment,
            SpatialQuery::Coverage(_) => QueryMode::Coverage,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Distance(Vec<EvaluatedRecord>),
    Containment(Vec<EvaluatedRecord>),
    Coverage(CoverageReport),
}

impl Evaluation {
    #[must_use]
    pub fn mode(&self) -> QueryMode {
        match self {
            Evaluation::Distance(_) => QueryMode::Distance,
            Evaluation::Containment(_) => QueryMode::Containment,
            Evaluation::Coverage(_) => QueryMode::Coverage,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[EvaluatedRecord] {
        match self {
            Evaluation::Distance(records) | Evaluation::Containment(records) => records,
            Evaluation::Coverage(report) => &report.records,
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<EvaluatedRecord> {
        match self {
            Evaluation::Distance(records) | Evaluation::Containment(records) => records,
            Evaluation::Coverage(report) => report.records,
        }
    }
}

/// Evaluate `query` against `orders`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] or [`EngineError::Coordinate`]
/// when the query parameters are unusable. An empty `orders` slice is not an
/// error.
pub fn evaluate(orders: &[OrderRecord], query: &SpatialQuery) -> Result<Evaluation, EngineError> {
    let evaluation = match query {
        SpatialQuery::Distance(q) => Evaluation::Distance(evaluate_distance(orders, q)?),
        SpatialQuery::Containment(q) => Evaluation::Containment(evaluate_containment(orders, q)?),
        SpatialQuery::Coverage(q) => Evaluation::Coverage(evaluate_coverage(orders, q)?),
    };

    tracing::debug!(
        mode = %evaluation.mode(),
        input = orders.len(),
        output = evaluation.records().len(),
        "spatial query evaluated"
    );

    Ok(evaluation)
}

/// Ascending by distance with unset distances last.
pub(crate) fn cmp_distance(a: &EvaluatedRecord, b: &EvaluatedRecord) -> Ordering {
    match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn truncate(records: &mut Vec<EvaluatedRecord>, limit: Option<usize>) {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use geosim_core::{OrderRecord, SpatialPoint};

    pub(crate) fn order(
        id: &str,
        store_id: &str,
        store: SpatialPoint,
        customer: SpatialPoint,
        value: f64,
    ) -> OrderRecord {
        OrderRecord {
            order_id: id.to_string(),
            customer,
            order_value: value,
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            store_id: store_id.to_string(),
            store,
            delivery_time_minutes: 30,
        }
    }
}
