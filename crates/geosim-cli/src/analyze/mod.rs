//! Spatial analysis command handlers for the CLI.
//!
//! Each handler fetches a candidate set from the database, hands it to the
//! engine, and prints the resulting report as a table or as JSON.

mod render;

use anyhow::Context;
use clap::Subcommand;
use geosim_core::{AppConfig, BoundingBox, Catalog, OrderRecord, SpatialPoint, ZoneRecord};
use geosim_engine::{
    evaluate, select_zones, AnalysisReport, ContainmentQuery, CoverageQuery, DistanceQuery,
    SpatialQuery,
};

/// Sub-commands available under `analyze`.
#[derive(Debug, Subcommand)]
pub enum AnalyzeCommands {
    /// Orders within a haversine distance of their store
    Distance {
        /// Comma-separated store ids; all catalog stores when omitted
        #[arg(long, value_delimiter = ',')]
        stores: Vec<String>,
        #[arg(long, default_value_t = 5.0)]
        max_km: f64,
        #[arg(long, default_value_t = 0.0)]
        min_value: f64,
        /// Row cap (defaults to GEOSIM_QUERY_ROW_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Assign orders to zones by square degree box
    Zones {
        /// Comma-separated zone ids, checked in the order given; all zones when omitted
        #[arg(long, value_delimiter = ',')]
        zones: Vec<String>,
        /// Box half-width in degrees (defaults to GEOSIM_CONTAINMENT_MARGIN_DEG)
        #[arg(long)]
        margin: Option<f64>,
        /// Drop orders outside every zone
        #[arg(long)]
        matched_only: bool,
        #[arg(long, default_value_t = 500)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Share of orders within a radius of one center
    Coverage {
        /// Coverage center key or name from the catalog
        #[arg(long, default_value = "central")]
        center: String,
        /// Explicit center latitude; overrides --center
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Explicit center longitude; overrides --center
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = 5.0)]
        radius_km: f64,
        /// Candidate pre-filter half-width in degrees
        #[arg(long, default_value_t = 0.1)]
        window_deg: f64,
        /// Consider every order, not just those inside the window
        #[arg(long)]
        no_window: bool,
        #[arg(long, default_value_t = 200)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

/// Build a distance query, defaulting to every catalog store.
///
/// # Errors
///
/// Returns an error if a requested store id is not in the catalog.
pub(crate) fn distance_query(
    catalog: &Catalog,
    stores: &[String],
    max_km: f64,
    min_value: f64,
    limit: usize,
) -> anyhow::Result<DistanceQuery> {
    let store_ids: Vec<String> = if stores.is_empty() {
        catalog.stores.iter().map(|s| s.store_id.clone()).collect()
    } else {
        for id in stores {
            if catalog.store(id).is_none() {
                anyhow::bail!("store '{id}' is not in the catalog");
            }
        }
        stores.to_vec()
    };

    Ok(DistanceQuery::new(store_ids, max_km, min_value).with_limit(limit))
}

/// Resolve the coverage center from explicit coordinates or a catalog key.
///
/// # Errors
///
/// Returns an error if the key matches no catalog center or the explicit
/// coordinates are out of range.
pub(crate) fn resolve_center(
    catalog: &Catalog,
    center: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<SpatialPoint> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Ok(SpatialPoint::try_new(lat, lon)?);
    }
    catalog
        .coverage_center(center)
        .map(|c| c.center)
        .ok_or_else(|| anyhow::anyhow!("unknown coverage center '{center}'"))
}

fn into_records(rows: Vec<geosim_db::OrderRow>) -> anyhow::Result<Vec<OrderRecord>> {
    rows.into_iter()
        .map(|row| OrderRecord::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

/// Zones from `geo_zones`, or the catalog's when the table is empty.
async fn load_zones(pool: &sqlx::PgPool, catalog: &Catalog) -> anyhow::Result<Vec<ZoneRecord>> {
    let rows = geosim_db::list_zones(pool).await?;
    if rows.is_empty() {
        tracing::warn!("geo_zones is empty; using catalog zones (run `zones seed` to persist)");
        return Ok(catalog.zones.clone());
    }
    rows.into_iter()
        .map(|row| ZoneRecord::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

/// Dispatch an `analyze` sub-command.
///
/// # Errors
///
/// Returns an error if parameters are invalid, a query fails, or a stored row
/// has out-of-range coordinates.
pub(crate) async fn run_analyze(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    catalog: &Catalog,
    command: AnalyzeCommands,
) -> anyhow::Result<()> {
    let (orders, query, json) = match command {
        AnalyzeCommands::Distance {
            stores,
            max_km,
            min_value,
            limit,
            json,
        } => {
            let query = distance_query(
                catalog,
                &stores,
                max_km,
                min_value,
                limit.unwrap_or(config.query_row_limit),
            )?;
            let rows =
                geosim_db::list_orders_for_stores(pool, &query.store_ids, query.min_order_value)
                    .await?;
            (into_records(rows)?, SpatialQuery::Distance(query), json)
        }
        AnalyzeCommands::Zones {
            zones,
            margin,
            matched_only,
            limit,
            json,
        } => {
            let available = load_zones(pool, catalog).await?;
            let zones = select_zones(&available, &zones)?;
            let mut query = ContainmentQuery::new(zones)
                .with_margin(margin.unwrap_or(config.containment_margin_deg))
                .with_limit(limit);
            query.matched_only = matched_only;
            let rows = geosim_db::list_orders(pool).await?;
            (into_records(rows)?, SpatialQuery::Containment(query), json)
        }
        AnalyzeCommands::Coverage {
            center,
            lat,
            lon,
            radius_km,
            window_deg,
            no_window,
            limit,
            json,
        } => {
            let center = resolve_center(catalog, &center, lat, lon)?;
            let mut query = CoverageQuery::new(center, radius_km).with_limit(limit);
            let rows = if no_window {
                geosim_db::list_orders(pool).await?
            } else {
                query = query.with_window(window_deg);
                geosim_db::list_orders_in_window(pool, BoundingBox::around(center, window_deg))
                    .await?
            };
            (into_records(rows)?, SpatialQuery::Coverage(query), json)
        }
    };

    let mode = query.mode();
    let evaluation =
        evaluate(&orders, &query).with_context(|| format!("{mode} analysis rejected its parameters"))?;
    let report = AnalysisReport::build(evaluation);

    tracing::info!(
        %mode,
        candidates = orders.len(),
        returned = report.records.len(),
        "analysis complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report, catalog);
    }

    Ok(())
}
