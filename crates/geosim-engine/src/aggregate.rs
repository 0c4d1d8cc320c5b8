//! Per-group summary statistics over evaluated batches.
//!
//! Accumulation is exact; [`CoverageSummary::rounded`] applies the 2-decimal
//! presentation rounding once at the end.

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::round2;
use crate::predicate::{CoverageReport, EvaluatedRecord, Evaluation, QueryMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// Groups appear in the order their first record was seen.
    #[default]
    FirstAppearance,
    KeyAscending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub group: String,
    pub record_count: usize,
    pub total_value: f64,
    pub mean_value: f64,
    pub mean_distance_km: Option<f64>,
    pub min_distance_km: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub mean_delivery_minutes: f64,
    pub covered_count: usize,
    /// Present only when the group's records carry coverage flags.
    pub coverage_rate: Option<f64>,
}

impl CoverageSummary {
    /// Copy with every float rounded to 2 decimals.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            group: self.group.clone(),
            record_count: self.record_count,
            total_value: round2(self.total_value),
            mean_value: round2(self.mean_value),
            mean_distance_km: self.mean_distance_km.map(round2),
            min_distance_km: self.min_distance_km.map(round2),
            max_distance_km: self.max_distance_km.map(round2),
            mean_delivery_minutes: round2(self.mean_delivery_minutes),
            covered_count: self.covered_count,
            coverage_rate: self.coverage_rate.map(round2),
        }
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    value_sum: f64,
    delivery_sum: i64,
    distance_count: usize,
    distance_sum: f64,
    distance_min: Option<f64>,
    distance_max: Option<f64>,
    flagged: usize,
    covered: usize,
}

impl Accumulator {
    fn push(&mut self, record: &EvaluatedRecord) {
        self.count += 1;
        self.value_sum += record.order.order_value;
        self.delivery_sum += i64::from(record.order.delivery_time_minutes);

        if let Some(d) = record.distance_km {
            self.distance_count += 1;
            self.distance_sum += d;
            self.distance_min = Some(self.distance_min.map_or(d, |m| m.min(d)));
            self.distance_max = Some(self.distance_max.map_or(d, |m| m.max(d)));
        }

        if let Some(covered) = record.covered {
            self.flagged += 1;
            if covered {
                self.covered += 1;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, group: String) -> CoverageSummary {
        let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };

        CoverageSummary {
            group,
            record_count: self.count,
            total_value: self.value_sum,
            mean_value: mean(self.value_sum, self.count),
            mean_distance_km: (self.distance_count > 0)
                .then(|| mean(self.distance_sum, self.distance_count)),
            min_distance_km: self.distance_min,
            max_distance_km: self.distance_max,
            mean_delivery_minutes: mean(self.delivery_sum as f64, self.count),
            covered_count: self.covered,
            coverage_rate: (self.flagged > 0).then(|| mean(self.covered as f64, self.flagged)),
        }
    }
}

/// One summary per distinct key produced by `key_fn`.
#[must_use]
pub fn summarize<F>(records: &[EvaluatedRecord], key_fn: F, order: GroupOrder) -> Vec<CoverageSummary>
where
    F: Fn(&EvaluatedRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Accumulator)> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Accumulator::default()));
                groups.len() - 1
            }
        };
        groups[slot].1.push(record);
    }

    if order == GroupOrder::KeyAscending {
        groups.sort_by(|a, b| a.0.cmp(&b.0));
    }

    groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect()
}

/// A single summary over the whole batch, labelled `label`.
#[must_use]
pub fn summarize_all(records: &[EvaluatedRecord], label: &str) -> CoverageSummary {
    let mut acc = Accumulator::default();
    for record in records {
        acc.push(record);
    }
    acc.finish(label.to_string())
}

#[must_use]
pub fn by_store(record: &EvaluatedRecord) -> String {
    record.order.store_id.clone()
}

/// Zone id, or the empty string for records that never went through containment.
#[must_use]
pub fn by_zone(record: &EvaluatedRecord) -> String {
    record.zone_id.clone().unwrap_or_default()
}

/// Coverage totals taken before any row limit, without the records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageTotals {
    pub total: usize,
    pub covered: usize,
    pub covered_rate: f64,
    pub covered_revenue: f64,
}

impl From<&CoverageReport> for CoverageTotals {
    fn from(report: &CoverageReport) -> Self {
        Self {
            total: report.total,
            covered: report.covered,
            covered_rate: round2(report.covered_rate),
            covered_revenue: round2(report.covered_revenue),
        }
    }
}

/// Everything a presentation layer needs from one evaluation.
///
/// Distance results are grouped by store, containment results by zone, both
/// in ascending key order. Coverage has no groups, and its `overall` covers
/// every candidate so it agrees with `coverage`. Otherwise summaries cover
/// the returned `records`. All summaries are already rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub mode: QueryMode,
    pub overall: CoverageSummary,
    pub groups: Vec<CoverageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageTotals>,
    pub records: Vec<EvaluatedRecord>,
}

impl AnalysisReport {
    #[must_use]
    pub fn build(evaluation: Evaluation) -> Self {
        let mode = evaluation.mode();
        let (coverage, candidates) = match &evaluation {
            Evaluation::Coverage(report) => {
                (Some(CoverageTotals::from(report)), Some(report.summary.clone()))
            }
            Evaluation::Distance(_) | Evaluation::Containment(_) => (None, None),
        };
        let records = evaluation.into_records();
        let overall = candidates.unwrap_or_else(|| summarize_all(&records, "all"));

        let groups = match mode {
            QueryMode::Distance => summarize(&records, by_store, GroupOrder::KeyAscending),
            QueryMode::Containment => summarize(&records, by_zone, GroupOrder::KeyAscending),
            QueryMode::Coverage => Vec::new(),
        };

        Self {
            mode,
            overall: overall.rounded(),
            groups: groups.iter().map(CoverageSummary::rounded).collect(),
            coverage,
            records,
        }
    }
}
