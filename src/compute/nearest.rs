//! Geodesic nearest-feature lookup over a fixed reference set.
//!
//! Reference coordinates (fault traces, volcano summits) are projected onto
//! the unit sphere and bulk-loaded into an R*-tree. Straight-line chord length
//! between unit vectors grows monotonically with the great-circle angle, so the
//! Euclidean nearest neighbour in 3D is also the geodesic nearest neighbour.
//! The reported distance is then computed exactly with the haversine formula.
//!
//! An index built from zero coordinates is valid and answers every query
//! with its feature kind's fallback distance.
//!
//! # Example
//!
//! ```rust
//! use quakezone::compute::nearest::{FeatureKind, NearestFeatureIndex};
//! use quakezone::GeoCoord;
//!
//! let faults = NearestFeatureIndex::build(
//!     FeatureKind::Fault,
//!     vec![GeoCoord::new(-7.0, 110.0), GeoCoord::new(-7.5, 110.5)],
//! )?;
//! let d = faults.nearest_distance_km(-7.1, 110.0);
//! assert!(d > 10.0 && d < 13.0);
//!
//! let none = NearestFeatureIndex::build(FeatureKind::Volcano, Vec::new())?;
//! assert_eq!(none.nearest_distance_km(-7.1, 110.0), 150.0);
//! # Ok::<(), quakezone::QuakeError>(())
//! ```

use crate::compute::distance::haversine_km;
use crate::compute::validation::validate_coords;
use crate::error::Result;
use quakezone_types::point::GeoCoord;
use rstar::{Point as RstarPoint, RTree};
use serde::{Deserialize, Serialize};

/// Fault distance reported when no fault data is loaded.
pub const FAULT_FALLBACK_KM: f64 = 200.0;

/// Volcano distance reported when no volcano data is loaded.
pub const VOLCANO_FALLBACK_KM: f64 = 150.0;

/// Which reference set an index covers. Only the fallback distance differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Fault,
    Volcano,
}

impl FeatureKind {
    /// Distance used when the index is empty. Equal to the normalization
    /// ceiling, so missing data scores as zero risk contribution.
    pub const fn fallback_km(self) -> f64 {
        match self {
            FeatureKind::Fault => FAULT_FALLBACK_KM,
            FeatureKind::Volcano => VOLCANO_FALLBACK_KM,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Fault => "fault",
            FeatureKind::Volcano => "volcano",
        }
    }
}

/// Unit-sphere position of a reference feature for R*-tree indexing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpherePoint {
    x: f64,
    y: f64,
    z: f64,
    /// Position of the feature in the reference set.
    feature: usize,
}

impl SpherePoint {
    fn new(coord: &GeoCoord, feature: usize) -> Self {
        let [x, y, z] = coord.to_unit_vector();
        Self { x, y, z, feature }
    }
}

impl RstarPoint for SpherePoint {
    type Scalar = f64;
    const DIMENSIONS: usize = 3;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            x: generator(0),
            y: generator(1),
            z: generator(2),
            feature: 0,
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => unreachable!(),
        }
    }
}

/// Result of a nearest-feature lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestFeature {
    /// Position of the feature in the coordinates passed to `build`.
    pub index: usize,
    pub coord: GeoCoord,
    pub distance_km: f64,
}

/// Immutable nearest-neighbour index over reference coordinates.
///
/// Build once, then query from any number of threads; queries take `&self`.
#[derive(Clone)]
pub struct NearestFeatureIndex {
    kind: FeatureKind,
    fallback_km: f64,
    coords: Vec<GeoCoord>,
    /// `None` for an empty reference set.
    tree: Option<RTree<SpherePoint>>,
}

impl std::fmt::Debug for NearestFeatureIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestFeatureIndex")
            .field("kind", &self.kind)
            .field("fallback_km", &self.fallback_km)
            .field("features", &self.coords.len())
            .finish()
    }
}

impl NearestFeatureIndex {
    /// Build an index over `coords` (degrees, latitude first).
    ///
    /// An empty input produces an empty index rather than an error. Returns
    /// [`QuakeError::InvalidInput`](crate::QuakeError::InvalidInput) if any
    /// coordinate is non-finite or out of range.
    pub fn build(kind: FeatureKind, coords: Vec<GeoCoord>) -> Result<Self> {
        validate_coords(&coords)?;

        let tree = if coords.is_empty() {
            log::warn!(
                "No {} coordinates supplied; distances fall back to {} km",
                kind.as_str(),
                kind.fallback_km()
            );
            None
        } else {
            let points = coords
                .iter()
                .enumerate()
                .map(|(i, c)| SpherePoint::new(c, i))
                .collect();
            Some(RTree::bulk_load(points))
        };

        log::debug!("Built {} index over {} features", kind.as_str(), coords.len());

        Ok(Self {
            kind,
            fallback_km: kind.fallback_km(),
            coords,
            tree,
        })
    }

    /// Build from `(lat, lon)` pairs.
    pub fn from_lat_lon<I>(kind: FeatureKind, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::build(kind, pairs.into_iter().map(GeoCoord::from).collect())
    }

    /// Override the distance reported by an empty index.
    pub fn with_fallback_km(mut self, fallback_km: f64) -> Self {
        assert!(
            fallback_km.is_finite() && fallback_km >= 0.0,
            "Fallback distance must be finite and non-negative"
        );
        self.fallback_km = fallback_km;
        self
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn fallback_km(&self) -> f64 {
        self.fallback_km
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    pub fn coords(&self) -> &[GeoCoord] {
        &self.coords
    }

    /// Nearest reference feature to `(lat, lon)`, or `None` for an empty index.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<NearestFeature> {
        let tree = self.tree.as_ref()?;
        let query = GeoCoord::new(lat, lon);
        let hit = tree.nearest_neighbor(&SpherePoint::new(&query, 0))?;
        let coord = self.coords[hit.feature];
        Some(NearestFeature {
            index: hit.feature,
            coord,
            distance_km: haversine_km(query, coord),
        })
    }

    /// Great-circle distance in kilometers to the nearest reference feature.
    ///
    /// An empty index returns its fallback: 200 km for faults, 150 km for
    /// volcanoes unless overridden.
    pub fn nearest_distance_km(&self, lat: f64, lon: f64) -> f64 {
        self.nearest(lat, lon)
            .map_or(self.fallback_km, |hit| hit.distance_km)
    }
}
