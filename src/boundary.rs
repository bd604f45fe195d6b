//! Admissible region: one outer ring and ordered exclusion holes
//!
//! Holes are expected to lie inside the outer ring and not to overlap each
//! other. Neither is checked; violations simply flow through the clipper.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Polygon};

#[cfg(feature = "serde")]
use crate::error::Result;
#[cfg(feature = "serde")]
use crate::geometry::Point;

/// Outer boundary plus holes, all rings closed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryModel {
    outer: Polygon,
    holes: Vec<Polygon>,
}

impl BoundaryModel {
    /// Create a boundary, closing every ring that is open
    pub fn new(mut outer: Polygon, holes: Vec<Polygon>) -> Self {
        outer.close();
        let holes = holes
            .into_iter()
            .map(|mut hole| {
                hole.close();
                hole
            })
            .collect();
        Self { outer, holes }
    }

    /// A boundary with no outer ring: every site is admissible
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[inline]
    pub fn outer(&self) -> &Polygon {
        &self.outer
    }

    /// Holes in declared order
    #[inline]
    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    /// False when no outer ring is loaded
    #[inline]
    pub fn has_outer(&self) -> bool {
        !self.outer.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.outer.bounding_box()
    }

    /// Parse a boundary document of the form
    /// `{"outer": [[lat, lng], ...], "inner": [[[lat, lng], ...], ...]}`
    ///
    /// # Example
    ///
    /// ```rust
    /// use constrained_voronoi::BoundaryModel;
    ///
    /// let boundary = BoundaryModel::from_json(
    ///     r#"{"outer": [[0, 0], [0, 1], [1, 1], [1, 0]], "inner": []}"#,
    /// )
    /// .unwrap();
    /// assert!(boundary.outer().is_closed());
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let document: BoundaryDocument = serde_json::from_str(json)?;
        Ok(document.into())
    }
}

/// Boundary ingestion document
///
/// `inner` may be omitted. Rings may be open; they are closed on conversion.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryDocument {
    pub outer: Vec<[f64; 2]>,
    #[serde(default)]
    pub inner: Vec<Vec<[f64; 2]>>,
}

#[cfg(feature = "serde")]
fn ring_from_pairs(pairs: Vec<[f64; 2]>) -> Polygon {
    pairs.into_iter().map(Point::from).collect()
}

#[cfg(feature = "serde")]
impl From<BoundaryDocument> for BoundaryModel {
    fn from(document: BoundaryDocument) -> Self {
        BoundaryModel::new(
            ring_from_pairs(document.outer),
            document.inner.into_iter().map(ring_from_pairs).collect(),
        )
    }
}

#[cfg(feature = "serde")]
impl From<&BoundaryModel> for BoundaryDocument {
    fn from(boundary: &BoundaryModel) -> Self {
        let pairs = |ring: &Polygon| -> Vec<[f64; 2]> { ring.points().iter().map(|&p| p.into()).collect() };
        BoundaryDocument {
            outer: pairs(&boundary.outer),
            inner: boundary.holes.iter().map(pairs).collect(),
        }
    }
}
