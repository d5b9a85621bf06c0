use geo::Point;
use serde::{Deserialize, Serialize};

/// A planar point carrying an owned caller payload.
///
/// The quadtree treats `x`/`y` as plain planar coordinates (longitude and
/// latitude in practice) and never looks inside `payload`.
///
/// # Examples
///
/// ```
/// use quakezone_types::point::IndexedPoint;
///
/// let p = IndexedPoint::new(110.4, -7.8, 42_usize);
/// assert_eq!(p.payload, 42);
/// assert_eq!(p.position(), (110.4, -7.8));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPoint<T> {
    pub x: f64,
    pub y: f64,
    pub payload: T,
}

impl<T> IndexedPoint<T> {
    #[inline]
    pub fn new(x: f64, y: f64, payload: T) -> Self {
        Self { x, y, payload }
    }

    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Planar (Euclidean) distance from this point to `(x, y)`.
    #[inline]
    pub fn planar_distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A geographic coordinate in decimal degrees, latitude first.
///
/// Reference feature sets (faults, volcanoes) and earthquake catalogs list
/// coordinates as `(lat, lon)`; this type keeps that order explicit and
/// converts to `geo::Point` (x = lon, y = lat) for distance calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoord {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude and longitude converted to radians.
    #[inline]
    pub fn to_radians(&self) -> (f64, f64) {
        (self.lat.to_radians(), self.lon.to_radians())
    }

    /// Position on the unit sphere (x towards lon 0, z towards the north pole).
    pub fn to_unit_vector(&self) -> [f64; 3] {
        let (lat, lon) = self.to_radians();
        let cos_lat = lat.cos();
        [cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin()]
    }

    #[inline]
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<(f64, f64)> for GeoCoord {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}
