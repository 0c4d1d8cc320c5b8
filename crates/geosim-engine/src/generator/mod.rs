//! Synthetic order and zone data.
//!
//! Orders are produced lazily so callers can stream them into chunked writes
//! without holding the whole dataset in memory.

mod orders;
mod sampling;

use geosim_core::{Catalog, ZoneRecord};

pub use orders::{generate_orders, OrderChunks, OrderGenerator, OrderGeneratorConfig};

/// The catalog's zone table, unchanged. Zones are reference data, not sampled.
#[must_use]
pub fn generate_zones(catalog: &Catalog) -> Vec<ZoneRecord> {
    catalog.zones.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_come_from_catalog_in_order() {
        let catalog = Catalog::bengaluru();
        let zones = generate_zones(&catalog);
        assert_eq!(zones.len(), 10);
        assert_eq!(zones[0].zone_id, "ZONE_001");
        assert!(zones.iter().all(|z| z.radius_km > 0.0));
    }
}
