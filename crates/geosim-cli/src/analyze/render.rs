use geosim_core::Catalog;
use geosim_engine::{AnalysisReport, CoverageSummary, EvaluatedRecord, QueryMode};

const MAX_PRINTED_ROWS: usize = 20;

fn fmt_km(value: Option<f64>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), |v| format!("{v:.2}"))
}

fn print_summary_header(label: &str) {
    println!(
        "{label:<28}{:>8}{:>14}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "ORDERS", "REVENUE", "AVG", "AVG KM", "MIN KM", "MAX KM", "AVG MIN"
    );
}

fn print_summary_row(label: &str, s: &CoverageSummary) {
    println!(
        "{label:<28}{:>8}{:>14.2}{:>10.2}{:>10}{:>10}{:>10}{:>10.2}",
        s.record_count,
        s.total_value,
        s.mean_value,
        fmt_km(s.mean_distance_km),
        fmt_km(s.min_distance_km),
        fmt_km(s.max_distance_km),
        s.mean_delivery_minutes
    );
}

fn group_label(mode: QueryMode, group: &str, catalog: &Catalog) -> String {
    let name = match mode {
        QueryMode::Distance => catalog.store(group).map(|s| s.name.as_str()),
        QueryMode::Containment => catalog.zone(group).map(|z| z.zone_name.as_str()),
        QueryMode::Coverage => None,
    };
    name.map_or_else(|| group.to_string(), |n| format!("{group} {n}"))
}

fn print_record(record: &EvaluatedRecord) {
    let tag = match (&record.zone_id, record.covered) {
        (Some(zone), _) => zone.clone(),
        (None, Some(true)) => "covered".to_string(),
        (None, Some(false)) => "outside".to_string(),
        (None, None) => String::new(),
    };
    println!(
        "{:<12}{:<11}{:<24}{:>10.2}{:>10}  {}",
        record.order.order_id,
        record.order.store_id,
        record.order.customer.to_string(),
        record.order.order_value,
        fmt_km(record.distance_km),
        tag
    );
}

/// Print a report as plain-text tables.
pub(super) fn print_report(report: &AnalysisReport, catalog: &Catalog) {
    println!("{} analysis", report.mode);
    println!();

    if let Some(totals) = &report.coverage {
        println!(
            "covered {} of {} candidates ({:.2}%), covered revenue {:.2}",
            totals.covered,
            totals.total,
            totals.covered_rate * 100.0,
            totals.covered_revenue
        );
        println!();
    }

    if report.groups.is_empty() {
        print_summary_header("");
    } else {
        let label = match report.mode {
            QueryMode::Containment => "ZONE",
            _ => "STORE",
        };
        print_summary_header(label);
        for group in &report.groups {
            print_summary_row(&group_label(report.mode, &group.group, catalog), group);
        }
    }
    print_summary_row("all", &report.overall);
    println!();

    if report.records.is_empty() {
        println!("no matching orders");
        return;
    }

    println!(
        "{:<12}{:<11}{:<24}{:>10}{:>10}",
        "ORDER", "STORE", "CUSTOMER", "VALUE", "KM"
    );
    for record in report.records.iter().take(MAX_PRINTED_ROWS) {
        print_record(record);
    }
    if report.records.len() > MAX_PRINTED_ROWS {
        println!(
            "... {} more (use --json for all rows)",
            report.records.len() - MAX_PRINTED_ROWS
        );
    }
}
