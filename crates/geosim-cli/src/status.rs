use geosim_core::Catalog;

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), |v| format!("{v:.2}"))
}

/// Print headline order figures, zone count and per-store order counts.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_status(pool: &sqlx::PgPool, catalog: &Catalog) -> anyhow::Result<()> {
    let overview = geosim_db::order_overview(pool).await?;
    let zones = geosim_db::count_zones(pool).await?;

    if overview.order_count == 0 {
        println!("no orders stored; run `generate` first");
        println!("zones: {zones}");
        return Ok(());
    }

    println!("orders:           {}", overview.order_count);
    println!("stores:           {}", overview.store_count);
    println!("zones:            {zones}");
    println!("total value:      {}", fmt_opt(overview.total_value));
    println!("mean value:       {}", fmt_opt(overview.avg_value));
    println!("mean delivery:    {} min", fmt_opt(overview.avg_delivery_minutes));
    if let (Some(first), Some(last)) = (overview.first_order_date, overview.last_order_date) {
        println!("date range:       {first} .. {last}");
    }
    println!();

    println!("{:<11}{:<20}{:<24}{:>8}", "STORE", "NAME", "LOCATION", "ORDERS");
    for row in geosim_db::list_store_locations(pool).await? {
        let name = catalog
            .store(&row.store_id)
            .map_or_else(|| row.store_id.clone(), |s| s.name.clone());
        let order_count = row.order_count;
        let store = row.into_store_location(name)?;
        println!(
            "{:<11}{:<20}{:<24}{:>8}",
            store.store_id,
            store.name,
            store.location.to_string(),
            order_count
        );
    }

    Ok(())
}
