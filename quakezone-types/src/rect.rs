use geo::Rect;
use serde::{Deserialize, Serialize};

/// One of the four equal sub-rectangles produced by splitting a rectangle at its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Quadrant {
    /// Fixed traversal order used for insertion and queries.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];

    /// Sign of the child's center offset along (x, y).
    #[inline]
    fn signs(self) -> (f64, f64) {
        match self {
            Quadrant::NorthEast => (1.0, 1.0),
            Quadrant::NorthWest => (-1.0, 1.0),
            Quadrant::SouthEast => (1.0, -1.0),
            Quadrant::SouthWest => (-1.0, -1.0),
        }
    }
}

/// An axis-aligned rectangle stored as a center and half extents.
///
/// Unlike `geo::Rect` (min/max corners), this representation makes quadrant
/// splitting a matter of halving the extents and shifting the center.
/// Both [`contains`](Rectangle::contains) and
/// [`intersects`](Rectangle::intersects) are inclusive of the boundary.
///
/// # Examples
///
/// ```
/// use quakezone_types::rect::Rectangle;
///
/// let rect = Rectangle::new(0.0, 0.0, 10.0, 5.0);
/// assert!(rect.contains(10.0, -5.0)); // corner is inside
/// assert!(!rect.contains(10.1, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub cx: f64,
    pub cy: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl Rectangle {
    /// Create a rectangle from its center and half extents.
    ///
    /// # Panics
    ///
    /// Panics if either half extent is negative or NaN. Callers holding
    /// untrusted input should validate first.
    pub fn new(cx: f64, cy: f64, half_width: f64, half_height: f64) -> Self {
        assert!(
            half_width >= 0.0 && half_height >= 0.0,
            "Rectangle half extents must be non-negative, got ({}, {})",
            half_width,
            half_height
        );
        Self {
            cx,
            cy,
            half_width,
            half_height,
        }
    }

    /// Square of half extent `radius` centered at `(x, y)`.
    pub fn around(x: f64, y: f64, radius: f64) -> Self {
        Self::new(x, y, radius, radius)
    }

    /// Build from min/max corners.
    pub fn from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(
            (min_x + max_x) / 2.0,
            (min_y + max_y) / 2.0,
            (max_x - min_x) / 2.0,
            (max_y - min_y) / 2.0,
        )
    }

    /// Convert a `geo::Rect`. `geo` normalizes corners, so this never panics.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_corners(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.cx - self.half_width
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.cx + self.half_width
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.cy - self.half_height
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.cy + self.half_height
    }

    /// Check whether `(x, y)` lies inside the rectangle or on its boundary.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min_x() <= x && x <= self.max_x() && self.min_y() <= y && y <= self.max_y()
    }

    /// Check whether two rectangles overlap. Touching edges count as overlap.
    #[inline]
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(other.min_x() > self.max_x()
            || other.max_x() < self.min_x()
            || other.min_y() > self.max_y()
            || other.max_y() < self.min_y())
    }

    /// The child rectangle for `quadrant`: half the extents, center offset by
    /// `(±half_width/2, ±half_height/2)`.
    pub fn quadrant(&self, quadrant: Quadrant) -> Rectangle {
        let w = self.half_width / 2.0;
        let h = self.half_height / 2.0;
        let (sx, sy) = quadrant.signs();
        Rectangle::new(self.cx + sx * w, self.cy + sy * h, w, h)
    }
}
