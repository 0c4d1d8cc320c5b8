use axum::{
    extract::{Query, State},
    Extension, Json,
};
use geosim_core::{SpatialPoint, ZoneRecord};
use geosim_engine::coverage_circle;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const CIRCLE_POINTS: usize = 64;

#[derive(Debug, Deserialize)]
pub(super) struct ZonesQuery {
    /// Half-width of the drawn box; defaults to the configured containment margin.
    pub margin: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ZoneItem {
    #[serde(flatten)]
    pub zone: ZoneRecord,
    /// Containment box corners, closed ring.
    pub bounding_box: [SpatialPoint; 5],
    /// `radius_km` circle, closed ring.
    pub coverage_circle: Vec<SpatialPoint>,
}

pub(super) fn zone_item(zone: ZoneRecord, margin_deg: f64) -> ZoneItem {
    ZoneItem {
        bounding_box: zone.bounding_box(margin_deg).outline(),
        coverage_circle: coverage_circle(zone.center, zone.radius_km, CIRCLE_POINTS),
        zone,
    }
}

/// Zones from `geo_zones`, falling back to the catalog when the table is empty.
pub(super) async fn load_zones(
    state: &AppState,
    req_id: &RequestId,
) -> Result<Vec<ZoneRecord>, ApiError> {
    let rows = geosim_db::list_zones(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if rows.is_empty() {
        return Ok(state.catalog.zones.clone());
    }
    rows.into_iter()
        .map(|row| ZoneRecord::try_from(row).map_err(|e| map_db_error(req_id.0.clone(), &e)))
        .collect()
}

pub(super) async fn list_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ZonesQuery>,
) -> Result<Json<ApiResponse<Vec<ZoneItem>>>, ApiError> {
    let margin = params.margin.unwrap_or(state.config.containment_margin_deg);
    if !(margin.is_finite() && margin > 0.0) {
        return Err(ApiError::validation(req_id.0, "margin must be > 0"));
    }

    let zones = load_zones(&state, &req_id).await?;
    let data = zones.into_iter().map(|z| zone_item(z, margin)).collect();

    Ok(ApiResponse::new(data, req_id.0))
}
