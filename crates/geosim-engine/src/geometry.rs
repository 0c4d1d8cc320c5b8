//! Distance and degree-offset math.
//!
//! Two distance formulas live side by side: the haversine great-circle
//! distance, and an equirectangular approximation that treats one degree as
//! 111.32 km scaled by `cos(ref_lat)` along longitude. Coverage analysis uses
//! the approximation; everything else uses haversine.

use std::f64::consts::TAU;

use geosim_core::SpatialPoint;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
pub const KM_PER_DEGREE: f64 = 111.32;

/// Haversine great-circle distance in meters.
#[must_use]
pub fn great_circle_distance_meters(a: SpatialPoint, b: SpatialPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Equirectangular distance in km, with longitude scaled at `ref_lat`.
#[must_use]
pub fn planar_approx_distance_km(a: SpatialPoint, b: SpatialPoint, ref_lat: f64) -> f64 {
    let dy = (a.lat - b.lat) * KM_PER_DEGREE;
    let dx = (a.lon - b.lon) * KM_PER_DEGREE * ref_lat.to_radians().cos();
    dy.hypot(dx)
}

/// Degree deltas `(lat, lon)` spanning `radius_km` at the given latitude.
///
/// Inverse of [`planar_approx_distance_km`] along each axis.
#[must_use]
pub fn offset_degrees(radius_km: f64, at_latitude: f64) -> (f64, f64) {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let lon_delta = radius_km / (KM_PER_DEGREE * at_latitude.to_radians().cos());
    (lat_delta, lon_delta)
}

/// Ring of `points` evenly spaced angles around `center`, first and last equal.
///
/// Returns an empty ring for `points == 0`.
#[must_use]
pub fn coverage_circle(center: SpatialPoint, radius_km: f64, points: usize) -> Vec<SpatialPoint> {
    let (lat_delta, lon_delta) = offset_degrees(radius_km, center.lat);
    #[allow(clippy::cast_precision_loss)]
    let step = if points > 1 {
        TAU / (points - 1) as f64
    } else {
        0.0
    };

    (0..points)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = step * i as f64;
            SpatialPoint::new(
                center.lat + lat_delta * angle.sin(),
                center.lon + lon_delta * angle.cos(),
            )
        })
        .collect()
}

/// Round half away from zero to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
