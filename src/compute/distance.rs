//! Distance helpers shared by the indexes and the pipeline.

use geo::{Distance, Euclidean, HaversineMeasure, Point};
use quakezone_types::point::GeoCoord;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
///
/// # Examples
///
/// ```
/// use quakezone::compute::distance::haversine_km;
/// use quakezone::GeoCoord;
///
/// let d = haversine_km(GeoCoord::new(-7.0, 110.0), GeoCoord::new(-7.1, 110.0));
/// assert!((d - 11.12).abs() < 0.01);
/// ```
#[inline]
pub fn haversine_km(a: GeoCoord, b: GeoCoord) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_KM).distance(a.to_point(), b.to_point())
}

/// Planar distance between `(x1, y1)` and `(x2, y2)`.
#[inline]
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    Euclidean.distance(Point::new(x1, y1), Point::new(x2, y2))
}
