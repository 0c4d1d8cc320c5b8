//! Latitude/longitude value type shared by every crate in the workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("coordinate is not a finite number (lat {lat}, lon {lon})")]
    NotFinite { lat: f64, lon: f64 },
}

/// A point in decimal degrees.
///
/// Fields are public so catalogs can be written as constants; anything read
/// from outside the process should go through [`SpatialPoint::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialPoint {
    pub lat: f64,
    pub lon: f64,
}

impl SpatialPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point, rejecting NaN/infinite values and out-of-range degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] describing the first offending component.
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        let point = Self { lat, lon };
        point.validate()?;
        Ok(point)
    }

    /// Check an already-constructed point against the valid degree ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is non-finite or out of range.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(CoordinateError::NotFinite {
                lat: self.lat,
                lon: self.lon,
            });
        }
        if !(LAT_MIN..=LAT_MAX).contains(&self.lat) {
            return Err(CoordinateError::LatitudeOutOfRange(self.lat));
        }
        if !(LON_MIN..=LON_MAX).contains(&self.lon) {
            return Err(CoordinateError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }
}

impl std::fmt::Display for SpatialPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}
