//! Radius coverage around a single center (`ST_COVERS` simulation).

use geosim_core::{BoundingBox, OrderRecord, SpatialPoint};
use serde::Serialize;

use super::{cmp_distance, truncate, EvaluatedRecord};
use crate::aggregate::{summarize_all, CoverageSummary};
use crate::error::{require_limit, require_positive, EngineError};
use crate::geometry::{planar_approx_distance_km, round2};

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageQuery {
    pub center: SpatialPoint,
    pub radius_km: f64,
    /// Optional square pre-filter of this half-width in degrees around
    /// `center`. Orders outside it are not candidates at all.
    pub window_deg: Option<f64>,
    pub limit: Option<usize>,
}

impl CoverageQuery {
    #[must_use]
    pub fn new(center: SpatialPoint, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            window_deg: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window_deg: f64) -> Self {
        self.window_deg = Some(window_deg);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Coordinate`] for an out-of-range center and
    /// [`EngineError::InvalidParameter`] for a non-positive radius or window,
    /// or a zero limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.center.validate()?;
        require_positive("radius_km", self.radius_km)?;
        if let Some(window) = self.window_deg {
            require_positive("window_deg", window)?;
        }
        require_limit(self.limit)
    }
}

/// Coverage result: per-order flags plus totals over every candidate.
///
/// `total`, `covered`, `covered_rate`, `covered_revenue` and `summary` are
/// computed before `limit` truncates `records`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub records: Vec<EvaluatedRecord>,
    pub total: usize,
    pub covered: usize,
    /// `covered / total`, or `0.0` when there are no candidates.
    pub covered_rate: f64,
    pub covered_revenue: f64,
    /// Unrounded summary of every candidate, labelled `all`.
    pub summary: CoverageSummary,
}

/// Mark each candidate order covered when its equirectangular distance to
/// `center` is within `radius_km`.
///
/// Membership uses the unrounded distance; the stored `distance_km` is rounded
/// to 2 decimals. Records are sorted by distance then `order_id`.
///
/// # Errors
///
/// See [`CoverageQuery::validate`].
pub fn evaluate_coverage(
    orders: &[OrderRecord],
    query: &CoverageQuery,
) -> Result<CoverageReport, EngineError> {
    query.validate()?;

    let window = query
        .window_deg
        .map(|w| BoundingBox::around(query.center, w));

    let mut covered = 0_usize;
    let mut covered_revenue = 0.0_f64;

    let mut records: Vec<EvaluatedRecord> = orders
        .iter()
        .filter(|o| window.is_none_or(|bbox| bbox.contains(o.customer)))
        .map(|o| {
            let distance_km = planar_approx_distance_km(o.customer, query.center, query.center.lat);
            let is_covered = distance_km <= query.radius_km;
            if is_covered {
                covered += 1;
                covered_revenue += o.order_value;
            }
            let mut record = EvaluatedRecord::from_order(o);
            record.distance_km = Some(round2(distance_km));
            record.covered = Some(is_covered);
            record
        })
        .collect();

    let total = records.len();
    #[allow(clippy::cast_precision_loss)]
    let covered_rate = if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    };

    let summary = summarize_all(&records, "all");

    records.sort_by(|a, b| cmp_distance(a, b).then_with(|| a.order.order_id.cmp(&b.order.order_id)));
    truncate(&mut records, query.limit);

    Ok(CoverageReport {
        records,
        total,
        covered,
        covered_rate,
        covered_revenue,
        summary,
    })
}
