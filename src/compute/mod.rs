//! Spatial indexing, geodesic lookup, scoring, and validation.

pub mod distance;
pub mod nearest;
pub mod quadtree;
pub mod risk;
pub mod validation;

pub use distance::{EARTH_RADIUS_KM, euclidean_distance, haversine_km};
pub use nearest::{FeatureKind, NearestFeature, NearestFeatureIndex};
pub use quadtree::QuadTree;
pub use risk::{NormalizedFactors, RiskScore, RiskWeights, WeightTable, score_risk};
