//! Database operations for the `geo_zones` table.

use geosim_core::{SpatialPoint, ZoneRecord};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `geo_zones` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ZoneRow {
    pub zone_id: String,
    pub zone_name: String,
    pub zone_type: String,
    pub zone_lat: f64,
    pub zone_lon: f64,
    pub zone_radius: f64,
}

impl TryFrom<ZoneRow> for ZoneRecord {
    type Error = DbError;

    fn try_from(row: ZoneRow) -> Result<Self, DbError> {
        let center =
            SpatialPoint::try_new(row.zone_lat, row.zone_lon).map_err(|source| DbError::InvalidRow {
                id: row.zone_id.clone(),
                source,
            })?;

        Ok(ZoneRecord {
            zone_id: row.zone_id,
            zone_name: row.zone_name,
            zone_type: row.zone_type,
            center,
            radius_km: row.zone_radius,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Upsert the zone table in one statement. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_zones(pool: &PgPool, zones: &[ZoneRecord]) -> Result<u64, DbError> {
    if zones.is_empty() {
        return Ok(0);
    }

    let zone_ids: Vec<&str> = zones.iter().map(|z| z.zone_id.as_str()).collect();
    let names: Vec<&str> = zones.iter().map(|z| z.zone_name.as_str()).collect();
    let types: Vec<&str> = zones.iter().map(|z| z.zone_type.as_str()).collect();
    let lats: Vec<f64> = zones.iter().map(|z| z.center.lat).collect();
    let lons: Vec<f64> = zones.iter().map(|z| z.center.lon).collect();
    let radii: Vec<f64> = zones.iter().map(|z| z.radius_km).collect();

    let written = sqlx::query(
        "INSERT INTO geo_zones (zone_id, zone_name, zone_type, zone_lat, zone_lon, zone_radius) \
         SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], \
                              $4::float8[], $5::float8[], $6::float8[]) \
         ON CONFLICT (zone_id) DO UPDATE SET \
             zone_name   = EXCLUDED.zone_name, \
             zone_type   = EXCLUDED.zone_type, \
             zone_lat    = EXCLUDED.zone_lat, \
             zone_lon    = EXCLUDED.zone_lon, \
             zone_radius = EXCLUDED.zone_radius",
    )
    .bind(&zone_ids)
    .bind(&names)
    .bind(&types)
    .bind(&lats)
    .bind(&lons)
    .bind(&radii)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(written)
}

/// All zones ordered by `zone_id`, which is also their containment priority.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_zones(pool: &PgPool) -> Result<Vec<ZoneRow>, DbError> {
    let rows = sqlx::query_as::<_, ZoneRow>(
        "SELECT zone_id, zone_name, zone_type, zone_lat, zone_lon, zone_radius \
         FROM geo_zones \
         ORDER BY zone_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_zones(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM geo_zones")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
