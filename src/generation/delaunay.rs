//! Incremental Delaunay triangulation (Bowyer–Watson)
//!
//! Points are inserted one by one into a triangulation seeded with a large
//! enclosing "super" triangle. Each insertion removes every triangle whose
//! circumcircle contains the new point and re-triangulates the cavity by
//! connecting its boundary to the point.
//!
//! The super triangle's three vertices are kept in the result (indices
//! `vertex_count..vertex_count + 3`). Triangles touching them still carry real
//! Delaunay edges between input points near the convex hull, so callers that
//! only need adjacency should skip the virtual indices rather than drop those
//! triangles.

use glam::DVec2;

/// Distance of the super triangle's incircle from the input's center, in
/// multiples of the input extent
const SUPER_SCALE: f64 = 64.0;

/// Result of Delaunay triangulation
pub struct DelaunayResult {
    /// Number of real input points; larger indices are super triangle vertices
    pub vertex_count: usize,
    /// Triangle indices, counter-clockwise
    pub triangles: Vec<[usize; 3]>,
}

impl DelaunayResult {
    /// True for indices of the enclosing super triangle
    #[inline]
    pub fn is_virtual(&self, vertex: usize) -> bool {
        vertex >= self.vertex_count
    }

    /// Triangles made of input points only
    pub fn real_triangles(&self) -> impl Iterator<Item = &[usize; 3]> + '_ {
        self.triangles
            .iter()
            .filter(|t| t.iter().all(|&v| !self.is_virtual(v)))
    }
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    center: DVec2,
    radius2: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], positions: &[DVec2]) -> Self {
        let a = positions[vertices[0]];
        let b = positions[vertices[1]] - a;
        let c = positions[vertices[2]] - a;
        let d = 2.0 * b.perp_dot(c);
        if d == 0.0 {
            // Collinear: treat the circumcircle as the whole plane so the
            // triangle is replaced by the next insertion
            return Self {
                vertices,
                center: a,
                radius2: f64::INFINITY,
            };
        }
        let b2 = b.length_squared();
        let c2 = c.length_squared();
        let offset = DVec2::new(c.y * b2 - b.y * c2, b.x * c2 - c.x * b2) / d;
        Self {
            vertices,
            center: a + offset,
            radius2: offset.length_squared(),
        }
    }

    #[inline]
    fn circumcircle_contains(&self, p: DVec2) -> bool {
        p.distance_squared(self.center) < self.radius2
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Compute the Delaunay triangulation of `points`
///
/// The super triangle encloses `points` and `frame`. Pass the corners of the
/// region the diagram will be evaluated in as `frame`, so that the virtual
/// vertices stay far from every point of that region.
///
/// Exactly duplicated points are skipped; callers wanting a cell per
/// duplicate should deduplicate beforehand.
///
/// # Arguments
///
/// * `points` - Points to triangulate
/// * `frame` - Extra points the super triangle must enclose (not triangulated)
///
/// # Returns
///
/// Counter-clockwise triangles over `points` plus the three super triangle
/// vertices at indices `points.len()..points.len() + 3`
pub fn compute_delaunay(points: &[DVec2], frame: &[DVec2]) -> DelaunayResult {
    let n = points.len();
    if n == 0 {
        return DelaunayResult {
            vertex_count: 0,
            triangles: Vec::new(),
        };
    }

    let (min, max) = points
        .iter()
        .chain(frame)
        .fold((points[0], points[0]), |(min, max), &p| (min.min(p), max.max(p)));
    let center = (min + max) * 0.5;
    let extent = (max - min).max_element();
    let r = if extent > 0.0 { extent } else { 1.0 } * SUPER_SCALE;
    let sqrt3 = 3.0_f64.sqrt();

    let mut positions = points.to_vec();
    positions.push(center + DVec2::new(0.0, 2.0 * r));
    positions.push(center + DVec2::new(-sqrt3 * r, -r));
    positions.push(center + DVec2::new(sqrt3 * r, -r));

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &positions)];

    for i in 0..n {
        let p = positions[i];
        if positions[..i].contains(&p) {
            continue;
        }

        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(p));
        triangles = good;

        if bad.is_empty() {
            continue;
        }

        // Cavity boundary: directed edges whose reverse is not in another bad triangle
        let edges: Vec<(usize, usize)> = bad.iter().flat_map(|t| t.edges()).collect();
        for &(a, b) in &edges {
            if !edges.contains(&(b, a)) {
                triangles.push(Triangle::new([a, b, i], &positions));
            }
        }
    }

    DelaunayResult {
        vertex_count: n,
        triangles: triangles.into_iter().map(|t| t.vertices).collect(),
    }
}
