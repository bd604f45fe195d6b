//! Recompute pipeline and session state
//!
//! A [`Session`] owns the working set of sites and the boundary. Each
//! [`Command`] mutates that state and then runs the full pipeline
//! synchronously before returning:
//!
//! 1. filter sites against the boundary
//! 2. derive the bounding box (outer ring, or the filtered sites)
//! 3. compute raw Voronoi cells
//! 4. clip each cell to the outer ring, keeping the raw cell if that fails
//! 5. subtract holes in declared order
//! 6. drop cells with fewer than three distinct vertices
//! 7. publish the new [`Tessellation`]

use tracing::{debug, trace};

use crate::boundary::BoundaryModel;
use crate::cell::{Cell, Site, SiteId, Tessellation};
use crate::config::{SitePolicy, TessellationConfig};
use crate::constraint::apply_constraints_with;
use crate::error::{Result, TessellationError};
use crate::geometry::{BoundingBox, Point, Polygon};
use crate::kernel::{GeometryKernel, PlanarKernel};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Margin around a lone site (or coincident sites) when no outer ring is loaded
pub const DEGENERATE_BOUNDS_MARGIN: f64 = 0.5;

/// A state transition request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add one site to the working set
    AddSite(Point),
    /// Add many sites at once with a single recompute
    AddSites(Vec<Point>),
    /// Move an existing site
    MoveSite { id: SiteId, to: Point },
    /// Replace the boundary; open rings are closed
    LoadBoundary { outer: Polygon, holes: Vec<Polygon> },
}

/// Receiver of published tessellations (typically a rendering layer)
pub trait TessellationSink {
    fn publish(&mut self, tessellation: &Tessellation);
}

/// Records every published tessellation
impl TessellationSink for Vec<Tessellation> {
    fn publish(&mut self, tessellation: &Tessellation) {
        self.push(tessellation.clone());
    }
}

/// Constrained Voronoi session
///
/// Generic over the geometry kernel `K`; [`PlanarKernel`] is the default.
///
/// # Examples
///
/// ```
/// use constrained_voronoi::*;
///
/// let mut session = Session::new();
/// session.load_boundary(
///     Polygon::new(vec![
///         Point::new(0.0, 0.0),
///         Point::new(0.0, 1.0),
///         Point::new(1.0, 1.0),
///         Point::new(1.0, 0.0),
///     ]),
///     vec![],
/// );
/// session.add_site(Point::new(0.25, 0.25));
/// session.add_site(Point::new(0.75, 0.75));
///
/// let tessellation = session.tessellation();
/// assert_eq!(tessellation.cell_count(), 2);
/// assert!((tessellation.total_area() - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone)]
pub struct Session<K = PlanarKernel> {
    /// Configuration this session was created with
    config: TessellationConfig,

    kernel: K,

    /// Working set of sites, in insertion order
    sites: Vec<Site>,

    boundary: BoundaryModel,

    next_id: u64,

    /// Result of the latest recompute
    tessellation: Tessellation,

    /// Nearest-site lookup over the published sites (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Session<PlanarKernel> {
    /// Create an empty session with the default configuration
    pub fn new() -> Self {
        Self::with_config(TessellationConfig::default())
    }

    /// Create an empty session using the planar kernel configured by `config`
    pub fn with_config(config: TessellationConfig) -> Self {
        Self::with_kernel(config, PlanarKernel::from_config(&config))
    }
}

impl Default for Session<PlanarKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: GeometryKernel> Session<K> {
    /// Create an empty session with a custom geometry kernel
    pub fn with_kernel(config: TessellationConfig, kernel: K) -> Self {
        Self {
            config,
            kernel,
            sites: Vec::new(),
            boundary: BoundaryModel::unbounded(),
            next_id: 0,
            tessellation: Tessellation::default(),
            #[cfg(feature = "spatial-index")]
            spatial_index: SpatialIndex::default(),
        }
    }

    /// Apply a command and recompute
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if `MoveSite` names a site that is not in the
    /// working set. The session is left untouched in that case.
    pub fn apply(&mut self, command: Command) -> Result<&Tessellation> {
        match command {
            Command::AddSite(position) => {
                self.insert_site(position);
            }
            Command::AddSites(positions) => {
                for position in positions {
                    self.insert_site(position);
                }
            }
            Command::MoveSite { id, to } => {
                let site = self
                    .sites
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(TessellationError::SiteNotFound(id))?;
                site.position = to;
            }
            Command::LoadBoundary { outer, holes } => {
                self.boundary = BoundaryModel::new(outer, holes);
            }
        }
        Ok(self.recompute())
    }

    /// Apply a command, then hand the new tessellation to `sink`
    pub fn dispatch<S: TessellationSink + ?Sized>(&mut self, command: Command, sink: &mut S) -> Result<()> {
        let tessellation = self.apply(command)?;
        sink.publish(tessellation);
        Ok(())
    }

    /// Add a site and recompute, returning the new site's identifier
    ///
    /// The identifier is returned even if the site is immediately filtered
    /// out by the boundary.
    pub fn add_site(&mut self, position: Point) -> SiteId {
        let id = self.insert_site(position);
        self.recompute();
        id
    }

    /// Move a site and recompute
    pub fn move_site(&mut self, id: SiteId, to: Point) -> Result<&Tessellation> {
        self.apply(Command::MoveSite { id, to })
    }

    /// Replace the boundary and recompute
    pub fn load_boundary(&mut self, outer: Polygon, holes: Vec<Polygon>) -> &Tessellation {
        self.boundary = BoundaryModel::new(outer, holes);
        self.recompute()
    }

    /// Run the full pipeline on the current state
    ///
    /// Recomputing twice without a mutation in between yields identical cells.
    /// Failures are isolated per cell: a failed outer clip keeps the raw
    /// cell, and a cell that collapses is dropped without affecting the rest.
    ///
    /// # Returns
    ///
    /// The new tessellation, which is also kept as [`Session::tessellation`]
    pub fn recompute(&mut self) -> &Tessellation {
        let kernel = &self.kernel;
        let boundary = &self.boundary;

        let filtered = apply_constraints_with(kernel, &self.sites, boundary);
        if self.config.site_policy == SitePolicy::Discard && filtered.len() != self.sites.len() {
            debug!(
                discarded = self.sites.len() - filtered.len(),
                "removing sites outside the admissible region"
            );
            self.sites = filtered.clone();
        }

        let positions: Vec<Point> = filtered.iter().map(|s| s.position).collect();
        let raw = match self.bounds(&positions) {
            Some(bounds) => kernel.compute_voronoi(&positions, &bounds),
            None => Vec::new(),
        };
        let raw_count = raw.len();

        let mut cells = Vec::with_capacity(raw_count);
        for (site_index, raw_cell) in raw.into_iter().enumerate() {
            let site_id = filtered[site_index].id;

            let mut polygon = match kernel.clip_intersect(&raw_cell, boundary.outer()) {
                Some(clipped) => clipped,
                None => {
                    if boundary.has_outer() {
                        trace!(site = %site_id, "outer clip failed, keeping raw cell");
                    }
                    raw_cell
                }
            };

            for hole in boundary.holes() {
                polygon = kernel.clip_difference(&polygon, hole);
            }

            if polygon.is_degenerate() {
                trace!(site = %site_id, "dropping degenerate cell");
                continue;
            }
            polygon.close();

            cells.push(Cell {
                site_index,
                site_id,
                polygon,
            });
        }

        debug!(
            sites = self.sites.len(),
            retained = filtered.len(),
            raw_cells = raw_count,
            cells = cells.len(),
            "recomputed tessellation"
        );

        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index = SpatialIndex::new(&positions);
        }

        self.tessellation = Tessellation::new(filtered, cells);
        &self.tessellation
    }

    /// Bounding box for the raw tessellation
    ///
    /// Without an outer ring the sites' box is padded by the configured
    /// fraction. A box that still spans no area (one site, or sites on one
    /// axis-parallel line) is grown by half its longer side, or by
    /// [`DEGENERATE_BOUNDS_MARGIN`] when it is a single point.
    fn bounds(&self, positions: &[Point]) -> Option<BoundingBox> {
        if let Some(bbox) = self.boundary.bounding_box() {
            return Some(bbox);
        }

        let bbox = BoundingBox::from_points(positions.iter().copied())?
            .padded(self.config.bounds_padding);
        if bbox.width() > 0.0 && bbox.height() > 0.0 {
            return Some(bbox);
        }

        let extent = bbox.width().max(bbox.height());
        let margin = if extent > 0.0 {
            0.5 * extent
        } else {
            DEGENERATE_BOUNDS_MARGIN
        };
        Some(bbox.expanded(margin))
    }

    fn insert_site(&mut self, position: Point) -> SiteId {
        let id = SiteId(self.next_id);
        self.next_id += 1;
        self.sites.push(Site::new(id, position));
        id
    }

    /// The latest published tessellation
    #[inline]
    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    /// The working set of sites
    ///
    /// With [`SitePolicy::Retain`] this may include sites that are currently
    /// excluded from the tessellation.
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    #[inline]
    pub fn boundary(&self) -> &BoundaryModel {
        &self.boundary
    }

    #[inline]
    pub fn config(&self) -> &TessellationConfig {
        &self.config
    }

    #[inline]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Find the published site whose cell contains a position (requires spatial-index feature)
    ///
    /// Returns the nearest published site, which is the owner of the Voronoi
    /// cell around `position`. `None` when nothing is published.
    #[cfg(feature = "spatial-index")]
    pub fn find_site_at(&self, position: Point) -> Option<SiteId> {
        let index = self.spatial_index.find_nearest(position)?;
        self.tessellation.sites().get(index).map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TessellationConfigBuilder;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::closed(vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ])
    }

    #[test]
    fn test_empty_session() {
        let mut session = Session::new();
        assert!(session.recompute().is_empty());
        assert!(session.tessellation().sites().is_empty());
    }

    #[test]
    fn test_add_sites_assigns_sequential_ids() {
        let mut session = Session::new();
        let a = session.add_site(Point::new(0.0, 0.0));
        let b = session.add_site(Point::new(1.0, 1.0));
        assert_eq!(a, SiteId(0));
        assert_eq!(b, SiteId(1));

        session
            .apply(Command::AddSites(vec![Point::new(0.0, 1.0), Point::new(1.0, 0.0)]))
            .unwrap();
        let ids: Vec<SiteId> = session.sites().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SiteId(0), SiteId(1), SiteId(2), SiteId(3)]);
    }

    #[test]
    fn test_unbounded_session_uses_site_extent() {
        let mut session = Session::new();
        session
            .apply(Command::AddSites(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(0.0, 2.0),
                Point::new(2.0, 2.0),
            ]))
            .unwrap();
        let tessellation = session.tessellation();
        assert_eq!(tessellation.cell_count(), 4);
        assert!((tessellation.total_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_single_site_gets_a_cell() {
        let mut session = Session::new();
        session.add_site(Point::new(3.0, 4.0));

        let tessellation = session.tessellation();
        assert_eq!(tessellation.cell_count(), 1);
        let side = 2.0 * DEGENERATE_BOUNDS_MARGIN;
        assert!((tessellation.total_area() - side * side).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_axis_aligned_sites_get_cells() {
        let mut session = Session::new();
        session
            .apply(Command::AddSites(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]))
            .unwrap();

        // Box grows from the 1x0 segment to 2x1
        let tessellation = session.tessellation();
        assert_eq!(tessellation.cell_count(), 2);
        for cell in tessellation.cells() {
            assert!((cell.area() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bounds_padding() {
        let config = TessellationConfigBuilder::new()
            .bounds_padding(0.5)
            .unwrap()
            .build()
            .unwrap();
        let mut session = Session::with_config(config);
        session
            .apply(Command::AddSites(vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0)]))
            .unwrap();
        // Box grows from 2x2 to 4x4
        assert!((session.tessellation().total_area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_site() {
        let mut session = Session::new();
        session.load_boundary(square(0.0, 0.0, 1.0, 1.0), vec![]);
        let a = session.add_site(Point::new(0.25, 0.5));
        session.add_site(Point::new(0.75, 0.5));
        let before = session.tessellation().cell_for(a).unwrap().area();
        assert!((before - 0.5).abs() < 1e-9);

        session.move_site(a, Point::new(0.05, 0.5)).unwrap();
        let after = session.tessellation().cell_for(a).unwrap().area();
        assert!((after - 0.4).abs() < 1e-9);
        assert_eq!(session.site(a).unwrap().position, Point::new(0.05, 0.5));
    }

    #[test]
    fn test_move_unknown_site() {
        let mut session = Session::new();
        session.add_site(Point::new(0.5, 0.5));
        let before = session.tessellation().clone();

        let result = session.move_site(SiteId(99), Point::new(0.0, 0.0));
        assert!(matches!(result, Err(TessellationError::SiteNotFound(SiteId(99)))));
        assert_eq!(session.tessellation(), &before);
    }

    #[test]
    fn test_discard_policy_drops_sites() {
        let mut session = Session::new();
        session.add_site(Point::new(0.5, 0.5));
        let outside = session.add_site(Point::new(5.0, 5.0));
        session.load_boundary(square(0.0, 0.0, 1.0, 1.0), vec![]);

        assert_eq!(session.sites().len(), 1);
        assert!(session.site(outside).is_none());

        // Widening the boundary does not bring it back
        session.load_boundary(square(0.0, 0.0, 10.0, 10.0), vec![]);
        assert_eq!(session.tessellation().sites().len(), 1);
    }

    #[test]
    fn test_retain_policy_keeps_sites() {
        let config = TessellationConfigBuilder::new()
            .site_policy(SitePolicy::Retain)
            .build()
            .unwrap();
        let mut session = Session::with_config(config);
        session.add_site(Point::new(0.5, 0.5));
        let outside = session.add_site(Point::new(5.0, 5.0));
        session.load_boundary(square(0.0, 0.0, 1.0, 1.0), vec![]);

        assert_eq!(session.sites().len(), 2);
        assert_eq!(session.tessellation().sites().len(), 1);
        assert!(session.tessellation().cell_for(outside).is_none());

        session.load_boundary(square(0.0, 0.0, 10.0, 10.0), vec![]);
        assert!(session.tessellation().cell_for(outside).is_some());
    }

    #[test]
    fn test_dispatch_publishes_each_command() {
        let mut session = Session::new();
        let mut published: Vec<Tessellation> = Vec::new();

        session
            .dispatch(
                Command::LoadBoundary {
                    outer: square(0.0, 0.0, 1.0, 1.0),
                    holes: vec![],
                },
                &mut published,
            )
            .unwrap();
        session
            .dispatch(Command::AddSite(Point::new(0.5, 0.5)), &mut published)
            .unwrap();
        assert!(session
            .dispatch(
                Command::MoveSite {
                    id: SiteId(42),
                    to: Point::new(0.1, 0.1)
                },
                &mut published
            )
            .is_err());

        assert_eq!(published.len(), 2);
        assert!(published[0].is_empty());
        assert_eq!(published[1].cell_count(), 1);
    }

    #[test]
    fn test_holes_erode_cells() {
        let mut session = Session::new();
        // The hole straddles the bisector and reaches past the outer ring
        session.load_boundary(
            square(0.0, 0.0, 3.0, 1.0),
            vec![square(1.0, -1.0, 2.0, 2.0)],
        );
        session
            .apply(Command::AddSites(vec![
                Point::new(0.5, 0.5),
                Point::new(2.5, 0.5),
            ]))
            .unwrap();
        assert_eq!(session.tessellation().cell_count(), 2);
        assert!((session.tessellation().total_area() - 2.0).abs() < 1e-9);
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_site_at() {
        let mut session = Session::new();
        session.load_boundary(square(0.0, 0.0, 1.0, 1.0), vec![]);
        let a = session.add_site(Point::new(0.25, 0.25));
        let b = session.add_site(Point::new(0.75, 0.75));

        assert_eq!(session.find_site_at(Point::new(0.1, 0.2)), Some(a));
        assert_eq!(session.find_site_at(Point::new(0.9, 0.6)), Some(b));
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_site_at_empty() {
        let session = Session::new();
        assert_eq!(session.find_site_at(Point::new(0.0, 0.0)), None);
    }
}
