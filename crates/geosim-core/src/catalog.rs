//! Reference data: stores, zones and coverage centers.
//!
//! The built-in catalog describes Bengaluru. A YAML file with the same shape
//! can replace it via `GEOSIM_CATALOG_PATH`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::point::SpatialPoint;
use crate::records::{BoundingBox, StoreLocation, ZoneRecord};
use crate::ConfigError;

/// A named point used as the reference center for coverage analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageCenter {
    /// Short lookup key, e.g. `central`.
    pub key: String,
    pub name: String,
    pub center: SpatialPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Generated customer coordinates are clamped into this rectangle.
    #[serde(default = "bengaluru_bounds")]
    pub bounds: BoundingBox,
    pub stores: Vec<StoreLocation>,
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
    #[serde(default)]
    pub coverage_centers: Vec<CoverageCenter>,
}

const BENGALURU_STORES: &[(&str, &str, f64, f64)] = &[
    ("STORE_001", "Koramangala", 12.9279, 77.6271),
    ("STORE_002", "Indiranagar", 12.9784, 77.6408),
    ("STORE_003", "Whitefield", 12.9698, 77.7500),
    ("STORE_004", "Electronic City", 12.8456, 77.6603),
    ("STORE_005", "JP Nagar", 12.9083, 77.5833),
    ("STORE_006", "Marathahalli", 12.9591, 77.6974),
    ("STORE_007", "HSR Layout", 12.9116, 77.6473),
    ("STORE_008", "Rajajinagar", 12.9915, 77.5632),
];

const BENGALURU_ZONES: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("ZONE_001", "Central Business District", "commercial", 12.9716, 77.5946, 2.0),
    ("ZONE_002", "Koramangala District", "mixed", 12.9279, 77.6271, 1.5),
    ("ZONE_003", "Indiranagar District", "residential", 12.9784, 77.6408, 1.2),
    ("ZONE_004", "Whitefield Tech Hub", "technology", 12.9698, 77.7500, 2.5),
    ("ZONE_005", "Electronic City", "technology", 12.8456, 77.6603, 3.0),
    ("ZONE_006", "JP Nagar Residential", "residential", 12.9083, 77.5833, 1.8),
    ("ZONE_007", "HSR Layout", "residential", 12.9116, 77.6473, 1.5),
    ("ZONE_008", "Marathahalli Area", "mixed", 12.9591, 77.6974, 2.0),
    ("ZONE_009", "North Bengaluru", "industrial", 13.1500, 77.6000, 4.0),
    ("ZONE_010", "South Bengaluru", "residential", 12.8500, 77.6000, 3.5),
];

const BENGALURU_CENTERS: &[(&str, &str, f64, f64)] = &[
    ("central", "Central Bangalore", 13.0, 77.6),
    ("north", "North Bangalore", 13.1, 77.6),
    ("south", "South Bangalore", 12.9, 77.6),
    ("east", "East Bangalore", 13.0, 77.7),
    ("west", "West Bangalore", 13.0, 77.5),
];

fn bengaluru_bounds() -> BoundingBox {
    BoundingBox {
        min_lat: 12.8,
        max_lat: 13.2,
        min_lon: 77.4,
        max_lon: 77.8,
    }
}

impl Catalog {
    /// The built-in Bengaluru catalog: 8 stores, 10 zones, 5 coverage centers.
    #[must_use]
    pub fn bengaluru() -> Self {
        Self {
            bounds: bengaluru_bounds(),
            stores: BENGALURU_STORES
                .iter()
                .map(|&(id, name, lat, lon)| StoreLocation {
                    store_id: id.to_string(),
                    name: name.to_string(),
                    location: SpatialPoint::new(lat, lon),
                })
                .collect(),
            zones: BENGALURU_ZONES
                .iter()
                .map(|&(id, name, zone_type, lat, lon, radius_km)| ZoneRecord {
                    zone_id: id.to_string(),
                    zone_name: name.to_string(),
                    zone_type: zone_type.to_string(),
                    center: SpatialPoint::new(lat, lon),
                    radius_km,
                })
                .collect(),
            coverage_centers: BENGALURU_CENTERS
                .iter()
                .map(|&(key, name, lat, lon)| CoverageCenter {
                    key: key.to_string(),
                    name: name.to_string(),
                    center: SpatialPoint::new(lat, lon),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn store(&self, store_id: &str) -> Option<&StoreLocation> {
        self.stores.iter().find(|s| s.store_id == store_id)
    }

    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<&ZoneRecord> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    /// Look up a coverage center by key or display name, ignoring ASCII case.
    #[must_use]
    pub fn coverage_center(&self, key_or_name: &str) -> Option<&CoverageCenter> {
        self.coverage_centers.iter().find(|c| {
            c.key.eq_ignore_ascii_case(key_or_name) || c.name.eq_ignore_ascii_case(key_or_name)
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::bengaluru()
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    let bounds = &catalog.bounds;
    if !(bounds.min_lat < bounds.max_lat && bounds.min_lon < bounds.max_lon) {
        return Err(ConfigError::Validation(
            "bounds must have min_lat < max_lat and min_lon < max_lon".to_string(),
        ));
    }
    for corner in [
        SpatialPoint::new(bounds.min_lat, bounds.min_lon),
        SpatialPoint::new(bounds.max_lat, bounds.max_lon),
    ] {
        corner
            .validate()
            .map_err(|e| ConfigError::Validation(format!("bounds: {e}")))?;
    }

    let mut seen = HashSet::new();
    for store in &catalog.stores {
        require_id("store", &store.store_id)?;
        if !seen.insert(store.store_id.as_str()) {
            return Err(duplicate("store", &store.store_id));
        }
        store
            .location
            .validate()
            .map_err(|e| ConfigError::Validation(format!("store '{}': {e}", store.store_id)))?;
    }

    let mut seen = HashSet::new();
    for zone in &catalog.zones {
        require_id("zone", &zone.zone_id)?;
        if !seen.insert(zone.zone_id.as_str()) {
            return Err(duplicate("zone", &zone.zone_id));
        }
        zone.center
            .validate()
            .map_err(|e| ConfigError::Validation(format!("zone '{}': {e}", zone.zone_id)))?;
        if !(zone.radius_km > 0.0) {
            return Err(ConfigError::Validation(format!(
                "zone '{}' has radius {}; must be > 0",
                zone.zone_id, zone.radius_km
            )));
        }
    }

    let mut seen = HashSet::new();
    for center in &catalog.coverage_centers {
        require_id("coverage center", &center.key)?;
        if !seen.insert(center.key.to_ascii_lowercase()) {
            return Err(duplicate("coverage center", &center.key));
        }
        center.center.validate().map_err(|e| {
            ConfigError::Validation(format!("coverage center '{}': {e}", center.key))
        })?;
    }

    Ok(())
}

fn require_id(kind: &str, id: &str) -> Result<(), ConfigError> {
    if id.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{kind} id must be non-empty")));
    }
    Ok(())
}

fn duplicate(kind: &str, id: &str) -> ConfigError {
    ConfigError::Validation(format!("duplicate {kind} id: '{id}'"))
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
