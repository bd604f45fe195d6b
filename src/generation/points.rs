//! Seeded site scattering
//!
//! Deterministic uniform sampling of site positions, used to seed demos and
//! tests. The same seed always yields the same sites.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::boundary::BoundaryModel;
use crate::constraint::is_admissible;
use crate::geometry::{BoundingBox, Point};
use crate::kernel::PlanarKernel;

/// Candidate draws allowed per requested site before giving up
const MAX_ATTEMPTS_PER_SITE: usize = 1000;

/// Uniformly random points inside a bounding box
///
/// # Example
///
/// ```rust
/// use constrained_voronoi::generation::scatter_in_box;
/// use constrained_voronoi::{BoundingBox, Point};
///
/// let bounds = BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
/// let sites = scatter_in_box(&bounds, 100, 42);
/// assert_eq!(sites.len(), 100);
/// ```
pub fn scatter_in_box(bounds: &BoundingBox, count: usize, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| sample_box(&mut rng, bounds)).collect()
}

/// Uniformly random points inside the admissible region of a boundary
///
/// Candidates are drawn from the outer ring's bounding box and rejected when
/// they fall outside the outer ring or inside a hole. Returns fewer than
/// `count` points if the region is too small to hit within the attempt
/// budget, and none at all when no outer ring is loaded.
pub fn scatter_sites(boundary: &BoundaryModel, count: usize, seed: u64) -> Vec<Point> {
    let Some(bounds) = boundary.bounding_box() else {
        return Vec::new();
    };

    let kernel = PlanarKernel::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sites = Vec::with_capacity(count);

    for _ in 0..count.saturating_mul(MAX_ATTEMPTS_PER_SITE) {
        if sites.len() == count {
            break;
        }
        let candidate = sample_box(&mut rng, &bounds);
        if is_admissible(&kernel, candidate, boundary) {
            sites.push(candidate);
        }
    }

    sites
}

fn sample_box<R: Rng>(rng: &mut R, bounds: &BoundingBox) -> Point {
    let u: f64 = rng.gen();
    let v: f64 = rng.gen();
    Point::new(
        bounds.min.lat + u * bounds.width(),
        bounds.min.lng + v * bounds.height(),
    )
}
