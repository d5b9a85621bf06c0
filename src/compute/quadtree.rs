//! Capacity-bounded region quadtree over planar points.
//!
//! Each node covers a [`Rectangle`] and stores up to `capacity` points. When a
//! full leaf receives another point it splits into four quadrants and hands
//! the point to the first child (NE, NW, SE, SW) whose boundary contains it.
//! Points already stored in a node stay there after the split, so internal
//! nodes keep their original `capacity` points and queries still inspect them.
//! An internal node also keeps any in-bounds point that no child accepts.
//!
//! Longitude/latitude are treated as planar coordinates. For geodesic
//! distances use [`NearestFeatureIndex`](crate::compute::nearest::NearestFeatureIndex).
//!
//! # Example
//!
//! ```rust
//! use quakezone::compute::quadtree::QuadTree;
//! use quakezone::{IndexedPoint, Rectangle};
//!
//! let mut tree = QuadTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0), 4);
//! for (i, xy) in [10.0, 20.0, 30.0, -10.0, -20.0].into_iter().enumerate() {
//!     assert!(tree.insert(IndexedPoint::new(xy, xy, i)));
//! }
//! assert!(tree.is_divided());
//!
//! let found = tree.query(&Rectangle::new(0.0, 0.0, 50.0, 50.0));
//! assert_eq!(found.len(), 5);
//! ```

use quakezone_types::point::IndexedPoint;
use quakezone_types::rect::{Quadrant, Rectangle};
use smallvec::SmallVec;

/// Default number of points a leaf holds before it subdivides.
pub const DEFAULT_CAPACITY: usize = 4;

/// Default depth below which nodes stop subdividing.
///
/// Without a limit, more than `capacity` identical coordinates would split
/// forever. Nodes at this depth keep accepting points past capacity instead.
pub const DEFAULT_MAX_DEPTH: usize = 24;

type LocalPoints<T> = SmallVec<[IndexedPoint<T>; DEFAULT_CAPACITY]>;

/// A node of the quadtree; the root node is the tree.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    boundary: Rectangle,
    capacity: usize,
    max_depth: usize,
    depth: usize,
    points: LocalPoints<T>,
    /// Children in NE, NW, SE, SW order. `Some` iff the node is divided.
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T> QuadTree<T> {
    /// Create an empty tree over `boundary` with the default depth limit.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(boundary: Rectangle, capacity: usize) -> Self {
        Self::with_max_depth(boundary, capacity, DEFAULT_MAX_DEPTH)
    }

    /// Create an empty tree with an explicit depth limit.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `max_depth` is zero.
    pub fn with_max_depth(boundary: Rectangle, capacity: usize, max_depth: usize) -> Self {
        assert!(capacity > 0, "Quadtree capacity must be greater than zero");
        assert!(max_depth > 0, "Quadtree max depth must be greater than zero");
        Self::node(boundary, capacity, max_depth, 0)
    }

    fn node(boundary: Rectangle, capacity: usize, max_depth: usize, depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            max_depth,
            depth,
            points: SmallVec::new(),
            children: None,
        }
    }

    #[inline]
    pub fn boundary(&self) -> &Rectangle {
        &self.boundary
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth of this node; the root is at depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    /// Points stored directly at this node (not in its children).
    #[inline]
    pub fn local_points(&self) -> &[IndexedPoint<T>] {
        &self.points
    }

    /// Child covering `quadrant`, if this node has been divided.
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadTree<T>> {
        self.children
            .as_deref()
            .map(|children| &children[quadrant_slot(quadrant)])
    }

    /// Insert a point. Returns `false` without modifying the tree when the
    /// point lies outside the boundary; every point inside it is accepted.
    ///
    /// Duplicate coordinates are kept as separate entries.
    pub fn insert(&mut self, point: IndexedPoint<T>) -> bool {
        self.try_insert(point).is_ok()
    }

    /// Like [`insert`](Self::insert) but hands the point back on failure.
    pub fn try_insert(&mut self, point: IndexedPoint<T>) -> Result<(), IndexedPoint<T>> {
        if !self.boundary.contains(point.x, point.y) {
            return Err(point);
        }

        if self.points.len() < self.capacity {
            self.points.push(point);
            return Ok(());
        }

        if self.children.is_none() {
            if self.depth >= self.max_depth {
                if self.points.len() == self.capacity {
                    log::warn!(
                        "Quadtree node at depth {} reached the depth limit; storing past capacity {}",
                        self.depth,
                        self.capacity
                    );
                }
                self.points.push(point);
                return Ok(());
            }
            self.subdivide();
        }

        let Some(children) = self.children.as_deref_mut() else {
            unreachable!("full quadtree node below the depth limit is always divided");
        };

        let mut point = point;
        for child in children.iter_mut() {
            match child.try_insert(point) {
                Ok(()) => return Ok(()),
                Err(rejected) => point = rejected,
            }
        }

        // Child edges are recomputed from rounded centers and can leave an
        // ulp-wide gap along this node's edges. The point is inside this
        // node, so it stays here.
        self.points.push(point);
        Ok(())
    }

    /// Insert every point, returning how many were accepted.
    pub fn insert_all<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = IndexedPoint<T>>,
    {
        points
            .into_iter()
            .fold(0, |accepted, point| accepted + usize::from(self.insert(point)))
    }

    /// Split into four quadrants. Existing points are not redistributed.
    ///
    /// # Panics
    ///
    /// Panics if the node is already divided.
    fn subdivide(&mut self) {
        assert!(
            self.children.is_none(),
            "Quadtree node at depth {} subdivided twice",
            self.depth
        );
        let depth = self.depth + 1;
        let make = |quadrant| {
            QuadTree::node(
                self.boundary.quadrant(quadrant),
                self.capacity,
                self.max_depth,
                depth,
            )
        };
        let [ne, nw, se, sw] = Quadrant::ALL;
        self.children = Some(Box::new([make(ne), make(nw), make(se), make(sw)]));
    }

    /// All points inside `range` (inclusive of its boundary).
    ///
    /// Subtrees whose boundary does not intersect `range` are skipped. Results
    /// come back in traversal order: local points, then NE, NW, SE, SW.
    pub fn query(&self, range: &Rectangle) -> Vec<&IndexedPoint<T>> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    fn query_into<'a>(&'a self, range: &Rectangle, found: &mut Vec<&'a IndexedPoint<T>>) {
        if !self.boundary.intersects(range) {
            return;
        }

        found.extend(self.points.iter().filter(|p| range.contains(p.x, p.y)));

        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.query_into(range, found);
            }
        }
    }

    /// All points within planar distance `radius` of `(cx, cy)`.
    ///
    /// Candidates come from a square range query and are then filtered by
    /// Euclidean distance. On lon/lat data this is a degree-space
    /// approximation, not a geodesic radius.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is negative or NaN.
    pub fn query_radius(&self, cx: f64, cy: f64, radius: f64) -> Vec<&IndexedPoint<T>> {
        let mut candidates = self.query(&Rectangle::around(cx, cy, radius));
        candidates.retain(|p| p.planar_distance_to(cx, cy) <= radius);
        candidates
    }

    /// Every stored point in traversal order.
    pub fn all_points(&self) -> Vec<&IndexedPoint<T>> {
        let mut all = Vec::with_capacity(self.len());
        self.walk(&mut |node| all.extend(node.points.iter()));
        all
    }

    /// Total node count including this one.
    pub fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .map_or(0, |children| children.iter().map(QuadTree::count_nodes).sum())
    }

    /// Total number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
            + self
                .children
                .as_deref()
                .map_or(0, |children| children.iter().map(QuadTree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels below and including this node.
    pub fn height(&self) -> usize {
        1 + self.children.as_deref().map_or(0, |children| {
            children.iter().map(QuadTree::height).max().unwrap_or(0)
        })
    }

    /// Visit this node and every descendant in pre-order (self, NE, NW, SE, SW).
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a QuadTree<T>),
    {
        visit(self);
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

#[inline]
fn quadrant_slot(quadrant: Quadrant) -> usize {
    match quadrant {
        Quadrant::NorthEast => 0,
        Quadrant::NorthWest => 1,
        Quadrant::SouthEast => 2,
        Quadrant::SouthWest => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(capacity: usize) -> QuadTree<usize> {
        QuadTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0), capacity)
    }

    #[test]
    fn test_insert_outside_boundary_fails() {
        let mut qt = tree(4);
        assert!(!qt.insert(IndexedPoint::new(150.0, 0.0, 0)));
        assert!(qt.is_empty());
        assert_eq!(qt.count_nodes(), 1);

        let rejected = qt.try_insert(IndexedPoint::new(0.0, -101.0, 9)).unwrap_err();
        assert_eq!(rejected.payload, 9);
    }

    #[test]
    fn test_leaf_fills_before_dividing() {
        let mut qt = tree(4);
        for i in 0..4 {
            assert!(qt.insert(IndexedPoint::new(i as f64, i as f64, i)));
        }
        assert!(!qt.is_divided());
        assert_eq!(qt.local_points().len(), 4);

        assert!(qt.insert(IndexedPoint::new(50.0, 50.0, 4)));
        assert!(qt.is_divided());
        assert_eq!(qt.count_nodes(), 5);
        // Resident points are not pushed down.
        assert_eq!(qt.local_points().len(), 4);
        let ne = qt.child(Quadrant::NorthEast).unwrap();
        assert_eq!(ne.local_points()[0].payload, 4);
        assert_eq!(ne.depth(), 1);
    }

    #[test]
    fn test_center_point_goes_northeast_first() {
        let mut qt = tree(1);
        qt.insert(IndexedPoint::new(-50.0, -50.0, 0));
        qt.insert(IndexedPoint::new(0.0, 0.0, 1));
        let ne = qt.child(Quadrant::NorthEast).unwrap();
        assert_eq!(ne.local_points().len(), 1);
        assert_eq!(ne.local_points()[0].payload, 1);
        assert!(qt.child(Quadrant::SouthWest).unwrap().local_points().is_empty());
    }

    #[test]
    fn test_query_includes_internal_node_points() {
        let mut qt = tree(2);
        qt.insert(IndexedPoint::new(-60.0, 60.0, 0));
        qt.insert(IndexedPoint::new(60.0, -60.0, 1));
        qt.insert(IndexedPoint::new(10.0, 10.0, 2));
        assert!(qt.is_divided());

        let found = qt.query(&Rectangle::new(-60.0, 60.0, 1.0, 1.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].payload, 0);
    }

    #[test]
    fn test_query_prunes_disjoint_range() {
        let mut qt = tree(4);
        qt.insert(IndexedPoint::new(1.0, 1.0, 0));
        assert!(qt.query(&Rectangle::new(500.0, 500.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_query_radius_filters_square_corners() {
        let mut qt = tree(4);
        qt.insert(IndexedPoint::new(3.0, 4.0, 0)); // distance 5
        qt.insert(IndexedPoint::new(4.9, 4.9, 1)); // in square, outside circle
        qt.insert(IndexedPoint::new(-5.0, 0.0, 2)); // on the circle

        let found = qt.query_radius(0.0, 0.0, 5.0);
        let mut ids: Vec<_> = found.iter().map(|p| p.payload).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut qt = tree(4);
        for i in 0..3 {
            qt.insert(IndexedPoint::new(5.0, 5.0, i));
        }
        assert_eq!(qt.len(), 3);
        assert_eq!(qt.query_radius(5.0, 5.0, 0.0).len(), 3);
    }

    #[test]
    fn test_coincident_points_stop_at_depth_limit() {
        let mut qt = QuadTree::with_max_depth(Rectangle::new(0.0, 0.0, 1.0, 1.0), 2, 3);
        for i in 0..50 {
            assert!(qt.insert(IndexedPoint::new(0.25, 0.25, i)));
        }
        assert_eq!(qt.len(), 50);
        assert_eq!(qt.height(), 4);
        assert_eq!(qt.query_radius(0.25, 0.25, 0.0).len(), 50);
    }

    #[test]
    fn test_all_points_traversal_order() {
        let mut qt = tree(1);
        qt.insert(IndexedPoint::new(0.0, 0.0, 0));
        qt.insert(IndexedPoint::new(-50.0, -50.0, 1)); // SW
        qt.insert(IndexedPoint::new(50.0, 50.0, 2)); // NE
        let order: Vec<_> = qt.all_points().iter().map(|p| p.payload).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_insert_all_counts_accepted() {
        let mut qt = tree(4);
        let points = vec![
            IndexedPoint::new(0.0, 0.0, 0),
            IndexedPoint::new(1000.0, 0.0, 1),
            IndexedPoint::new(-99.0, 99.0, 2),
        ];
        assert_eq!(qt.insert_all(points), 2);
    }

    #[test]
    fn test_edge_points_on_unaligned_boundary_are_kept() {
        let boundaries = [
            Rectangle::new(110.37, -7.913, 3.141_592_653, 0.717_171_7),
            Rectangle::new(-73.985_7, 40.748_4, 0.123_456_789, 0.987_654_321),
            Rectangle::new(1e-3, 179.9, 1.0 / 3.0, 2.0 / 7.0),
        ];

        for b in boundaries {
            let mut qt = QuadTree::new(b, 1);
            assert!(qt.insert(IndexedPoint::new(b.cx, b.cy, 0)));

            let edges = [
                (b.min_x(), b.cy),
                (b.max_x(), b.cy),
                (b.cx, b.min_y()),
                (b.cx, b.max_y()),
                (b.min_x(), b.min_y()),
                (b.max_x(), b.max_y()),
            ];
            for (i, (x, y)) in edges.into_iter().enumerate() {
                assert!(qt.insert(IndexedPoint::new(x, y, i + 1)), "{:?} rejected ({}, {})", b, x, y);
            }
            assert_eq!(qt.len(), 7);
            assert_eq!(qt.query(&b).len(), 7);
        }
    }

    #[test]
    #[should_panic(expected = "subdivided twice")]
    fn test_subdivide_twice_panics() {
        let mut qt = tree(1);
        qt.subdivide();
        qt.subdivide();
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn test_zero_capacity_panics() {
        let _ = tree(0);
    }
}
