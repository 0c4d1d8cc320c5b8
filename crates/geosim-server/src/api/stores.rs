use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use geosim_core::SpatialPoint;
use geosim_engine::round2;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    pub store_id: String,
    pub name: String,
    pub location: SpatialPoint,
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct OverviewData {
    pub order_count: i64,
    pub store_count: i64,
    pub zone_count: i64,
    pub total_value: Option<f64>,
    pub avg_value: Option<f64>,
    pub avg_delivery_minutes: Option<f64>,
    pub first_order_date: Option<NaiveDate>,
    pub last_order_date: Option<NaiveDate>,
}

/// Distinct stores seen in stored orders, named from the catalog.
pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StoreItem>>>, ApiError> {
    let rows = geosim_db::list_store_locations(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let name = state
            .catalog
            .store(&row.store_id)
            .map_or_else(|| row.store_id.clone(), |s| s.name.clone());
        let order_count = row.order_count;
        let store = row
            .into_store_location(name)
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        data.push(StoreItem {
            store_id: store.store_id,
            name: store.name,
            location: store.location,
            order_count,
        });
    }

    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<OverviewData>>, ApiError> {
    let overview = geosim_db::order_overview(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let zone_count = geosim_db::count_zones(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = OverviewData {
        order_count: overview.order_count,
        store_count: overview.store_count,
        zone_count,
        total_value: overview.total_value.map(round2),
        avg_value: overview.avg_value.map(round2),
        avg_delivery_minutes: overview.avg_delivery_minutes.map(round2),
        first_order_date: overview.first_order_date,
        last_order_date: overview.last_order_date,
    };

    Ok(ApiResponse::new(data, req_id.0))
}
