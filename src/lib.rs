//! Earthquake risk zoning over a capacity-bounded quadtree.
//!
//! ## Features
//! - **Quadtree**: adaptive region quadtree with rectangular and radius queries
//! - **Nearest features**: geodesic distance to the nearest fault or volcano via an R*-tree
//! - **Risk scoring**: deterministic weighted score (0-100) and five-level classification
//! - **Pipeline**: score a catalog of events and index them for spatial queries
//!
//! ```rust
//! use quakezone::prelude::*;
//!
//! let zoner = RiskZoner::builder()
//!     .faults(vec![GeoCoord::new(-7.0, 110.0), GeoCoord::new(-7.5, 110.5)])
//!     .build()?;
//!
//! let events = vec![
//!     EarthquakeRecord::new(-7.05, 110.02, 6.1, 12.0, 8.0, 6.0, 2),
//!     EarthquakeRecord::new(-6.40, 106.90, 4.2, 80.0, 4.0, 1.0, 1),
//! ];
//! let map = zoner.zone(&events)?;
//!
//! let hits = map.query_range(&Rectangle::new(110.0, -7.0, 0.5, 0.5))?;
//! assert_eq!(hits.len(), 1);
//! assert!(hits[0].fault_distance_km < 10.0);
//! # Ok::<(), quakezone::QuakeError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
#[cfg(feature = "sync")]
pub mod sync;
pub mod zoning;

pub use builder::ZonerBuilder;
pub use config::Config;
pub use error::{QuakeError, Result};

pub use compute::nearest::{FeatureKind, NearestFeatureIndex};
pub use compute::quadtree::QuadTree;
pub use compute::risk::{RiskScore, RiskWeights, WeightTable, score_risk};
pub use compute::validation;

pub use quakezone_types::point::{GeoCoord, IndexedPoint};
pub use quakezone_types::rect::{Quadrant, Rectangle};
pub use quakezone_types::risk::{PlateZone, RiskFactors, RiskLevel};

pub use zoning::{EarthquakeRecord, RiskMap, RiskSummary, RiskZoner, ScoredEvent};

#[cfg(feature = "sync")]
pub use sync::SharedQuadTree;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, QuakeError, Result, ZonerBuilder};

    pub use crate::{GeoCoord, IndexedPoint, Quadrant, Rectangle};

    pub use crate::{FeatureKind, NearestFeatureIndex, QuadTree};

    pub use crate::{PlateZone, RiskFactors, RiskLevel, RiskScore, RiskWeights, WeightTable};

    pub use crate::{EarthquakeRecord, RiskMap, RiskZoner, ScoredEvent, score_risk};

    #[cfg(feature = "sync")]
    pub use crate::SharedQuadTree;
}
