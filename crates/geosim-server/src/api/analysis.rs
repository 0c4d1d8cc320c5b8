use std::num::FpCategory;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use geosim_core::{BoundingBox, OrderRecord, SpatialPoint};
use geosim_engine::{
    evaluate, select_zones, AnalysisReport, ContainmentQuery, CoverageQuery, DistanceQuery,
    SpatialQuery,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_engine_error, normalize_limit, zones::load_zones};
use super::{ApiError, ApiResponse, AppState};

const DEFAULT_CONTAINMENT_LIMIT: usize = 500;
const DEFAULT_COVERAGE_LIMIT: usize = 200;
const DEFAULT_WINDOW_DEG: f64 = 0.1;

#[derive(Debug, Deserialize)]
pub(super) struct DistanceParams {
    /// Comma-separated store ids; every catalog store when absent.
    pub stores: Option<String>,
    pub max_km: Option<f64>,
    pub min_value: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContainmentParams {
    /// Comma-separated zone ids, checked in the order given; every zone when absent.
    pub zones: Option<String>,
    pub margin: Option<f64>,
    #[serde(default)]
    pub matched_only: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CoverageParams {
    pub center: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    /// `0` disables the candidate window.
    pub window_deg: Option<f64>,
    pub limit: Option<usize>,
}

fn into_records(
    rows: Vec<geosim_db::OrderRow>,
    req_id: &RequestId,
) -> Result<Vec<OrderRecord>, ApiError> {
    rows.into_iter()
        .map(|row| OrderRecord::try_from(row).map_err(|e| map_db_error(req_id.0.clone(), &e)))
        .collect()
}

fn split_ids(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn run(
    orders: &[OrderRecord],
    query: &SpatialQuery,
    req_id: RequestId,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let evaluation = evaluate(orders, query).map_err(|e| map_engine_error(req_id.0.clone(), &e))?;
    let report = AnalysisReport::build(evaluation);

    tracing::info!(
        mode = %query.mode(),
        candidates = orders.len(),
        returned = report.records.len(),
        "analysis complete"
    );

    Ok(ApiResponse::new(report, req_id.0))
}

pub(super) async fn distance(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<DistanceParams>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let requested = split_ids(params.stores.as_deref());
    let store_ids: Vec<String> = if requested.is_empty() {
        state.catalog.stores.iter().map(|s| s.store_id.clone()).collect()
    } else {
        if let Some(unknown) = requested.iter().find(|id| state.catalog.store(id).is_none()) {
            return Err(ApiError::validation(
                req_id.0,
                format!("store '{unknown}' is not in the catalog"),
            ));
        }
        requested
    };

    let limit = normalize_limit(
        params.limit,
        state.config.query_row_limit,
        state.config.query_row_limit,
    );
    let query = DistanceQuery::new(
        store_ids,
        params.max_km.unwrap_or(5.0),
        params.min_value.unwrap_or(0.0),
    )
    .with_limit(limit);
    query
        .validate()
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let rows = geosim_db::list_orders_for_stores(&state.pool, &query.store_ids, query.min_order_value)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let orders = into_records(rows, &req_id)?;

    run(&orders, &SpatialQuery::Distance(query), req_id)
}

pub(super) async fn containment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ContainmentParams>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let limit = normalize_limit(
        params.limit,
        DEFAULT_CONTAINMENT_LIMIT,
        state.config.query_row_limit,
    );
    let available = load_zones(&state, &req_id).await?;
    let zones = select_zones(&available, &split_ids(params.zones.as_deref()))
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;
    let mut query = ContainmentQuery::new(zones)
        .with_margin(params.margin.unwrap_or(state.config.containment_margin_deg))
        .with_limit(limit);
    query.matched_only = params.matched_only;
    query
        .validate()
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let rows = geosim_db::list_orders(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let orders = into_records(rows, &req_id)?;

    run(&orders, &SpatialQuery::Containment(query), req_id)
}

pub(super) async fn coverage(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<CoverageParams>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let center = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => SpatialPoint::try_new(lat, lon)
            .map_err(|e| ApiError::validation(req_id.0.clone(), e.to_string()))?,
        (None, None) => {
            let key = params.center.as_deref().unwrap_or("central");
            state
                .catalog
                .coverage_center(key)
                .map(|c| c.center)
                .ok_or_else(|| {
                    ApiError::validation(req_id.0.clone(), format!("unknown coverage center '{key}'"))
                })?
        }
        _ => {
            return Err(ApiError::validation(
                req_id.0,
                "lat and lon must be given together",
            ))
        }
    };

    let limit = normalize_limit(params.limit, DEFAULT_COVERAGE_LIMIT, state.config.query_row_limit);
    let window_deg = params.window_deg.unwrap_or(DEFAULT_WINDOW_DEG);
    let mut query = CoverageQuery::new(center, params.radius_km.unwrap_or(5.0)).with_limit(limit);
    if window_deg.classify() != FpCategory::Zero {
        query = query.with_window(window_deg);
    }
    query
        .validate()
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let rows = match query.window_deg {
        Some(w) => geosim_db::list_orders_in_window(&state.pool, BoundingBox::around(center, w)).await,
        None => geosim_db::list_orders(&state.pool).await,
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let orders = into_records(rows, &req_id)?;

    run(&orders, &SpatialQuery::Coverage(query), req_id)
}
