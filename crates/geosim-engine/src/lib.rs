//! Spatial predicate simulation over order batches.
//!
//! Data flows generator → [`predicate::evaluate`] → [`aggregate::summarize`].
//! Nothing in this crate performs I/O; callers fetch rows and hand them in.

pub mod aggregate;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod predicate;

pub use aggregate::{
    summarize, summarize_all, AnalysisReport, CoverageSummary, CoverageTotals, GroupOrder,
};
pub use error::EngineError;
pub use generator::{
    generate_orders, generate_zones, OrderChunks, OrderGenerator, OrderGeneratorConfig,
};
pub use geometry::{
    coverage_circle, great_circle_distance_meters, offset_degrees, planar_approx_distance_km,
    round2,
};
pub use predicate::{
    evaluate, select_zones, ContainmentQuery, CoverageQuery, CoverageReport, DistanceQuery,
    EvaluatedRecord, Evaluation, QueryMode, SpatialQuery, DEFAULT_CONTAINMENT_MARGIN_DEG,
    UNKNOWN_ZONE,
};
