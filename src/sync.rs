//! Thread-safe quadtree wrapper.
//!
//! [`QuadTree`] itself needs `&mut` to insert, so concurrent use is only
//! possible after the build phase. `SharedQuadTree` wraps a tree in an
//! `Arc<RwLock<_>>` for callers that must interleave inserts and queries
//! across threads. Queries clone the matching points out of the lock.

use crate::compute::quadtree::QuadTree;
use parking_lot::RwLock;
use quakezone_types::point::IndexedPoint;
use quakezone_types::rect::Rectangle;
use std::sync::Arc;

/// Shared, lock-protected quadtree handle. Clones share the same tree.
#[derive(Debug)]
pub struct SharedQuadTree<T> {
    inner: Arc<RwLock<QuadTree<T>>>,
}

impl<T> Clone for SharedQuadTree<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedQuadTree<T> {
    pub fn new(tree: QuadTree<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Insert under the write lock.
    pub fn insert(&self, point: IndexedPoint<T>) -> bool {
        self.inner.write().insert(point)
    }

    pub fn count_nodes(&self) -> usize {
        self.inner.read().count_nodes()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` against the tree under the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&QuadTree<T>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<T: Clone> SharedQuadTree<T> {
    pub fn query(&self, range: &Rectangle) -> Vec<IndexedPoint<T>> {
        self.inner
            .read()
            .query(range)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn query_radius(&self, cx: f64, cy: f64, radius: f64) -> Vec<IndexedPoint<T>> {
        self.inner
            .read()
            .query_radius(cx, cy, radius)
            .into_iter()
            .cloned()
            .collect()
    }
}
