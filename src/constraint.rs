//! Boundary constraint filter
//!
//! Sites must lie inside (or on) the outer ring and outside every hole.

use crate::boundary::BoundaryModel;
use crate::cell::Site;
use crate::geometry::Point;
use crate::kernel::{GeometryKernel, PlanarKernel};

/// Keep the sites admitted by `boundary`, preserving their order
///
/// Uses the default [`PlanarKernel`].
pub fn apply_constraints(sites: &[Site], boundary: &BoundaryModel) -> Vec<Site> {
    apply_constraints_with(&PlanarKernel::default(), sites, boundary)
}

/// Keep the sites admitted by `boundary` using a specific kernel
///
/// With no outer ring loaded the outer test is skipped. Holes are then
/// applied in declared order.
pub fn apply_constraints_with<K: GeometryKernel + ?Sized>(
    kernel: &K,
    sites: &[Site],
    boundary: &BoundaryModel,
) -> Vec<Site> {
    let mut retained: Vec<Site> = if boundary.has_outer() {
        sites
            .iter()
            .filter(|s| kernel.point_in_polygon(s.position, boundary.outer()))
            .copied()
            .collect()
    } else {
        sites.to_vec()
    };

    for hole in boundary.holes() {
        retained.retain(|s| !kernel.point_in_polygon(s.position, hole));
    }

    retained
}

/// Whether a single point passes the constraints
pub fn is_admissible<K: GeometryKernel + ?Sized>(
    kernel: &K,
    point: Point,
    boundary: &BoundaryModel,
) -> bool {
    (!boundary.has_outer() || kernel.point_in_polygon(point, boundary.outer()))
        && boundary
            .holes()
            .iter()
            .all(|hole| !kernel.point_in_polygon(point, hole))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::SiteId;
    use crate::geometry::Polygon;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::closed(vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ])
    }

    fn sites(points: &[(f64, f64)]) -> Vec<Site> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Site::new(SiteId(i as u64), Point::new(x, y)))
            .collect()
    }

    #[test]
    fn test_outer_filter_is_stable() {
        let boundary = BoundaryModel::new(square(0.0, 0.0, 1.0, 1.0), vec![]);
        let input = sites(&[(0.9, 0.9), (2.0, 2.0), (0.1, 0.1), (-1.0, 0.5)]);
        let kept = apply_constraints(&input, &boundary);
        let ids: Vec<u64> = kept.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_holes_exclude_sites() {
        let boundary = BoundaryModel::new(
            square(0.0, 0.0, 1.0, 1.0),
            vec![square(0.4, 0.4, 0.6, 0.6), square(0.0, 0.0, 0.2, 0.2)],
        );
        let input = sites(&[(0.5, 0.5), (0.1, 0.1), (0.8, 0.8), (0.3, 0.7)]);
        let kept = apply_constraints(&input, &boundary);
        let ids: Vec<u64> = kept.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_unbounded_keeps_everything_but_holes() {
        let boundary = BoundaryModel::new(Polygon::default(), vec![square(0.0, 0.0, 1.0, 1.0)]);
        let input = sites(&[(0.5, 0.5), (5.0, 5.0), (-3.0, 1.0)]);
        let kept = apply_constraints(&input, &boundary);
        assert_eq!(kept.len(), 2);
        assert!(!is_admissible(&PlanarKernel::default(), Point::new(0.5, 0.5), &boundary));
        assert!(is_admissible(&PlanarKernel::default(), Point::new(5.0, 5.0), &boundary));
    }

    #[test]
    fn test_boundary_points_are_admitted() {
        let boundary = BoundaryModel::new(square(0.0, 0.0, 1.0, 1.0), vec![]);
        let kept = apply_constraints(&sites(&[(0.0, 0.5), (1.0, 1.0)]), &boundary);
        assert_eq!(kept.len(), 2);
    }
}
