//! # quakezone-types
//!
//! Core geometry and risk data types for the quakezone engine.
//!
//! - **Geometry**: [`rect::Rectangle`] (center + half extents), [`point::IndexedPoint`], [`point::GeoCoord`]
//! - **Risk inputs**: [`risk::RiskFactors`], [`risk::PlateZone`]
//! - **Risk outputs**: [`risk::RiskLevel`]
//!
//! All types are serializable with Serde. Rectangles convert to and from the
//! `geo` crate's `Rect`.
//!
//! ## Examples
//!
//! ```rust
//! use quakezone_types::point::IndexedPoint;
//! use quakezone_types::rect::Rectangle;
//!
//! let java = Rectangle::new(110.0, -7.5, 5.0, 2.0);
//! let event = IndexedPoint::new(110.4, -7.8, "yogyakarta");
//! assert!(java.contains(event.x, event.y));
//! ```

pub mod point;
pub mod rect;
pub mod risk;
