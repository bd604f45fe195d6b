//! Spatial indexing for fast position-to-site lookups
//!
//! This module is only available with the `spatial-index` feature.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point;

/// Wrapper around KD-tree for nearest-site queries
///
/// The nearest site to a position is the site whose Voronoi cell contains
/// it, so this doubles as a point-to-cell lookup for click and drag handling.
/// An index built from no sites answers every query with `None`.
#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
}

impl SpatialIndex {
    /// Build spatial index from site positions
    ///
    /// # Example
    ///
    /// ```
    /// use constrained_voronoi::*;
    ///
    /// let sites = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(Point::new(0.9, 0.8)), Some(1));
    /// ```
    pub fn new(positions: &[Point]) -> Self {
        if positions.is_empty() {
            return Self { tree: None };
        }

        let points: Vec<[f64; 2]> = positions.iter().map(|&p| p.into()).collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&points)),
        }
    }

    /// Index of the position nearest to `query`
    pub fn find_nearest(&self, query: Point) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[query.lat, query.lng]);
        Some(result.item as usize)
    }
}
