//! Record types flowing between the generator, the evaluator and storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::point::SpatialPoint;

pub const DELIVERY_MINUTES_MIN: i32 = 10;
pub const DELIVERY_MINUTES_MAX: i32 = 90;

/// One customer transaction, as stored in `customer_orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer: SpatialPoint,
    pub order_value: f64,
    pub order_date: NaiveDate,
    pub store_id: String,
    pub store: SpatialPoint,
    /// Always within [`DELIVERY_MINUTES_MIN`, `DELIVERY_MINUTES_MAX`] for generated rows.
    pub delivery_time_minutes: i32,
}

/// A fulfilment location orders are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub store_id: String,
    pub name: String,
    pub location: SpatialPoint,
}

/// A named region, as stored in `geo_zones`.
///
/// `radius_km` is the circular extent; containment checks ignore it and use a
/// square degree margin around `center` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub zone_id: String,
    pub zone_name: String,
    pub zone_type: String,
    pub center: SpatialPoint,
    pub radius_km: f64,
}

/// Axis-aligned rectangle in degrees, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Square box of half-width `margin_deg` around `center`.
    #[must_use]
    pub fn around(center: SpatialPoint, margin_deg: f64) -> Self {
        Self {
            min_lat: center.lat - margin_deg,
            max_lat: center.lat + margin_deg,
            min_lon: center.lon - margin_deg,
            max_lon: center.lon + margin_deg,
        }
    }

    #[must_use]
    pub fn contains(&self, point: SpatialPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// Closed ring of corners (5 points, first repeated last) for drawing.
    #[must_use]
    pub fn outline(&self) -> [SpatialPoint; 5] {
        [
            SpatialPoint::new(self.min_lat, self.min_lon),
            SpatialPoint::new(self.min_lat, self.max_lon),
            SpatialPoint::new(self.max_lat, self.max_lon),
            SpatialPoint::new(self.max_lat, self.min_lon),
            SpatialPoint::new(self.min_lat, self.min_lon),
        ]
    }
}

impl ZoneRecord {
    #[must_use]
    pub fn bounding_box(&self, margin_deg: f64) -> BoundingBox {
        BoundingBox::around(self.center, margin_deg)
    }
}
