//! Sites, cells and the published tessellation
//!
//! A [`Tessellation`] is produced fresh by every recompute and never mutated
//! afterwards; the session replaces it wholesale.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Polygon};

/// Stable identifier of a site in the working set
///
/// Identifiers are assigned sequentially by the session and never reused.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u64);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identifiable point participating in the tessellation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub id: SiteId,
    pub position: Point,
}

impl Site {
    pub fn new(id: SiteId, position: Point) -> Self {
        Self { id, position }
    }
}

/// The region assigned to one site after constraint clipping
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Position of the owning site in [`Tessellation::sites`]
    ///
    /// Cells that collapse during clipping are dropped without reindexing, so
    /// this index (not the cell's position in the cell list) pairs a cell
    /// with its site.
    pub site_index: usize,

    /// Identifier of the owning site
    pub site_id: SiteId,

    /// Closed ring of the cell boundary
    pub polygon: Polygon,
}

impl Cell {
    /// Number of distinct boundary vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.polygon.distinct_vertex_count()
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.polygon.area()
    }
}

/// Cells for the current filtered site set
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tessellation {
    sites: Vec<Site>,
    cells: Vec<Cell>,
}

impl Tessellation {
    pub(crate) fn new(sites: Vec<Site>, cells: Vec<Cell>) -> Self {
        Self { sites, cells }
    }

    /// Sites that passed the boundary constraints, in working-set order
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Published cells, ordered by `site_index`
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The site a cell belongs to
    pub fn site_of(&self, cell: &Cell) -> Option<&Site> {
        self.sites.get(cell.site_index)
    }

    /// The cell of a site, if the site survived filtering and clipping
    pub fn cell_for(&self, id: SiteId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.site_id == id)
    }

    /// Sum of all cell areas
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(Cell::area).sum()
    }
}
