//! Geometry kernel seam
//!
//! The session only talks to geometry through [`GeometryKernel`], so the
//! clipping and tessellation algorithms can be swapped without touching the
//! recompute pipeline.

use crate::clip::Clipper;
use crate::config::TessellationConfig;
use crate::generation::compute_voronoi;
use crate::geometry::{BoundingBox, Point, Polygon};

/// Trait for the geometric operations used by the recompute pipeline
pub trait GeometryKernel {
    /// Boundary-inclusive inclusion test; `false` for rings under four points
    fn point_in_polygon(&self, point: Point, polygon: &Polygon) -> bool;

    /// Intersection of `a` and `b`, `None` for short operands or no overlap
    fn clip_intersect(&self, a: &Polygon, b: &Polygon) -> Option<Polygon>;

    /// `a` minus `b`, `a` unchanged when they do not overlap
    fn clip_difference(&self, a: &Polygon, b: &Polygon) -> Polygon;

    /// One Voronoi polygon per site, same length and order as `sites`
    fn compute_voronoi(&self, sites: &[Point], bounds: &BoundingBox) -> Vec<Polygon>;
}

/// Default kernel: edge-overlay clipper and Delaunay-dual tessellation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanarKernel {
    clipper: Clipper,
}

impl PlanarKernel {
    pub fn new(clipper: Clipper) -> Self {
        Self { clipper }
    }

    pub fn from_config(config: &TessellationConfig) -> Self {
        Self::new(Clipper::new(config.epsilon))
    }

    #[inline]
    pub fn clipper(&self) -> &Clipper {
        &self.clipper
    }
}

impl GeometryKernel for PlanarKernel {
    fn point_in_polygon(&self, point: Point, polygon: &Polygon) -> bool {
        self.clipper.point_in_polygon(point, polygon)
    }

    fn clip_intersect(&self, a: &Polygon, b: &Polygon) -> Option<Polygon> {
        self.clipper.intersect(a, b)
    }

    fn clip_difference(&self, a: &Polygon, b: &Polygon) -> Polygon {
        self.clipper.difference(a, b)
    }

    fn compute_voronoi(&self, sites: &[Point], bounds: &BoundingBox) -> Vec<Polygon> {
        compute_voronoi(sites, bounds)
    }
}
