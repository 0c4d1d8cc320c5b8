//! `generate` and `zones seed` handlers.

use chrono::Utc;
use geosim_core::{AppConfig, Catalog};
use geosim_engine::{generate_orders, generate_zones, OrderGenerator, OrderGeneratorConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub(crate) struct GenerateOptions {
    pub orders: usize,
    pub days: u32,
    pub chunk_size: usize,
    pub seed: Option<u64>,
    pub append: bool,
}

fn rng_for(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

fn start_generator(
    catalog: &Catalog,
    config: OrderGeneratorConfig,
    seed: Option<u64>,
) -> anyhow::Result<OrderGenerator<'_, StdRng>> {
    Ok(generate_orders(catalog, config, rng_for(seed))?)
}

/// Print the first few orders of a would-be run.
///
/// # Errors
///
/// Returns an error if the generator rejects the catalog or parameters.
pub(crate) fn run_generate_preview(
    config: &AppConfig,
    catalog: &Catalog,
    orders: Option<usize>,
    days: Option<u32>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let count = orders.unwrap_or(config.generator_order_count);
    let window = days.unwrap_or(config.generator_window_days);
    let generator = start_generator(
        catalog,
        OrderGeneratorConfig::new(count, window, Utc::now().date_naive()),
        seed,
    )?;

    println!(
        "[dry-run] would generate {count} orders over {} stores and {} zones",
        catalog.stores.len(),
        catalog.zones.len()
    );
    println!(
        "{:<12}{:<11}{:<24}{:>10}{:>12}{:>6}",
        "ORDER", "STORE", "CUSTOMER", "VALUE", "DATE", "MIN"
    );
    for order in generator.take(PREVIEW_ROWS) {
        println!(
            "{:<12}{:<11}{:<24}{:>10.2}{:>12}{:>6}",
            order.order_id,
            order.store_id,
            order.customer.to_string(),
            order.order_value,
            order.order_date.format("%Y-%m-%d"),
            order.delivery_time_minutes
        );
    }

    Ok(())
}

/// Generate orders and stream them into `customer_orders` chunk by chunk.
///
/// Refuses to run against a non-empty table unless `append` is set; appended
/// ids continue after the highest stored `ORD_` sequence. Zones are upserted
/// as well.
///
/// # Errors
///
/// Returns an error if the table already has data without `append`, the
/// generator rejects its inputs, or a chunk insert fails. A chunk failure
/// names the chunk index and how many rows were committed before it.
pub(crate) async fn run_generate(
    pool: &sqlx::PgPool,
    catalog: &Catalog,
    options: &GenerateOptions,
) -> anyhow::Result<()> {
    let existing = geosim_db::count_orders(pool).await?;
    if existing > 0 && !options.append {
        anyhow::bail!(
            "customer_orders already holds {existing} rows; pass --append to add more"
        );
    }

    let first_sequence = usize::try_from(geosim_db::max_order_sequence(pool).await?)? + 1;
    let config = OrderGeneratorConfig::new(options.orders, options.days, Utc::now().date_naive())
        .starting_at(first_sequence);
    let generator = start_generator(catalog, config, options.seed)?;

    tracing::info!(
        orders = options.orders,
        chunk_size = options.chunk_size,
        first_sequence,
        "generating orders"
    );

    let inserted =
        geosim_db::insert_order_chunks(pool, generator.chunks(options.chunk_size)).await?;
    if usize::try_from(inserted).unwrap_or(usize::MAX) < options.orders {
        tracing::warn!(
            inserted,
            requested = options.orders,
            "some generated ids already existed and were skipped"
        );
    }

    let zones = geosim_db::insert_zones(pool, &generate_zones(catalog)).await?;
    println!("inserted {inserted} orders; upserted {zones} zones");

    Ok(())
}

/// Upsert the catalog's zone table.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub(crate) async fn run_zones_seed(pool: &sqlx::PgPool, catalog: &Catalog) -> anyhow::Result<()> {
    let zones = generate_zones(catalog);
    if zones.is_empty() {
        println!("catalog defines no zones; nothing to seed");
        return Ok(());
    }
    let written = geosim_db::insert_zones(pool, &zones).await?;
    println!("upserted {written} zones");
    Ok(())
}
