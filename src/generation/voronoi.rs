//! Voronoi cell construction from Delaunay triangulation
//!
//! Each site's cell is the bounding box cut down by the perpendicular
//! bisectors towards its Delaunay neighbours. Because every bisector is the
//! dual of a Delaunay edge this yields exactly the Voronoi cell restricted to
//! the box, and it stays well-formed for sites on the convex hull whose cells
//! would otherwise be unbounded.

use glam::DVec2;
use std::collections::{HashMap, HashSet};

use super::delaunay::{compute_delaunay, DelaunayResult};
use crate::geometry::{BoundingBox, Point, Polygon};

/// Type alias for vertex-triangle adjacency map
type VertexTriangleMap = HashMap<usize, Vec<usize>>;

/// A Voronoi cell before any boundary constraint is applied
///
/// This is an intermediate representation; the session clips it against the
/// outer boundary and subtracts holes to produce the published
/// [`Cell`](crate::cell::Cell).
#[derive(Debug, Clone)]
pub struct RawCell {
    /// Index of the site in the input slice
    pub site: usize,
    /// Indices of sites whose cells share an edge with this one
    pub neighbors: Vec<usize>,
    /// Closed clockwise ring, restricted to the bounding box
    pub polygon: Polygon,
}

/// Compute one Voronoi polygon per site, in input order
///
/// Zero sites give an empty list and a single site gets the whole box.
/// Duplicate sites each receive a copy of the same cell.
///
/// # Arguments
///
/// * `sites` - Site positions; duplicates are allowed
/// * `bounds` - Box the cells are restricted to
///
/// # Returns
///
/// Closed clockwise rings, `cells[i]` belonging to `sites[i]`
pub fn compute_voronoi(sites: &[Point], bounds: &BoundingBox) -> Vec<Polygon> {
    generate_cells(sites, bounds)
        .into_iter()
        .map(|cell| cell.polygon)
        .collect()
}

/// Generate Voronoi cells for sites inside a bounding box
///
/// This is the main entry point for cell construction. It deduplicates
/// identical sites, computes the Delaunay triangulation, builds adjacency maps
/// and constructs each cell's geometry and neighbor list.
///
/// # Arguments
///
/// * `sites` - Site positions; duplicates are allowed
/// * `bounds` - Box the cells are restricted to
///
/// # Returns
///
/// One raw cell per input site, `cells[i].site == i`
pub fn generate_cells(sites: &[Point], bounds: &BoundingBox) -> Vec<RawCell> {
    if sites.is_empty() {
        return Vec::new();
    }

    // Map every site to the first site with identical coordinates
    let mut unique: Vec<DVec2> = Vec::new();
    let mut first_site: Vec<usize> = Vec::new();
    let mut owner: Vec<usize> = Vec::with_capacity(sites.len());
    let mut seen: HashMap<(u64, u64), usize> = HashMap::new();
    for (i, site) in sites.iter().enumerate() {
        // Adding zero folds -0.0 into 0.0 so equal points share a key
        let key = ((site.lat + 0.0).to_bits(), (site.lng + 0.0).to_bits());
        let u = *seen.entry(key).or_insert_with(|| {
            unique.push(site.to_vec());
            first_site.push(i);
            unique.len() - 1
        });
        owner.push(u);
    }

    let box_ring: Vec<DVec2> = bounds
        .to_ring()
        .open_points()
        .iter()
        .map(|p| p.to_vec())
        .collect();

    let unique_cells: Vec<(Vec<usize>, Polygon)> = if unique.len() == 1 {
        vec![(Vec::new(), bounds.to_ring())]
    } else {
        let triangulation = compute_delaunay(&unique, &box_ring);
        let vertex_triangle_map = build_vertex_triangle_map(&triangulation);
        let triangle_vertex_map = build_triangle_vertex_map(&vertex_triangle_map);

        (0..unique.len())
            .map(|u| {
                let neighbors = find_cell_neighbors(u, &vertex_triangle_map, &triangle_vertex_map);
                let mut ring = box_ring.clone();
                for &v in &neighbors {
                    ring = clip_to_bisector(&ring, unique[u], unique[v]);
                }
                let polygon = Polygon::closed(ring.into_iter().map(Point::from_vec).collect());
                (neighbors, polygon)
            })
            .collect()
    };

    owner
        .iter()
        .enumerate()
        .map(|(site, &u)| {
            let (neighbors, polygon) = &unique_cells[u];
            RawCell {
                site,
                neighbors: neighbors.iter().map(|&v| first_site[v]).collect(),
                polygon: polygon.clone(),
            }
        })
        .collect()
}

/// Build map from real vertex index to all triangles that include it
///
/// Triangles touching the super triangle are included; only the virtual
/// vertices themselves are skipped.
fn build_vertex_triangle_map(triangulation: &DelaunayResult) -> VertexTriangleMap {
    let mut map: VertexTriangleMap = HashMap::new();

    for (tri_idx, triangle) in triangulation.triangles.iter().enumerate() {
        for &vertex_idx in triangle.iter() {
            if !triangulation.is_virtual(vertex_idx) {
                map.entry(vertex_idx).or_default().push(tri_idx);
            }
        }
    }

    map
}

/// Build reverse lookup from triangle index to the real vertices in that triangle
fn build_triangle_vertex_map(vertex_triangle_map: &VertexTriangleMap) -> HashMap<usize, Vec<usize>> {
    let mut triangle_vertex_map: HashMap<usize, Vec<usize>> = HashMap::new();

    for (&vertex_idx, triangle_list) in vertex_triangle_map.iter() {
        for &tri_idx in triangle_list {
            triangle_vertex_map.entry(tri_idx).or_default().push(vertex_idx);
        }
    }

    triangle_vertex_map
}

/// Find neighbor sites by checking shared triangles
///
/// Two sites are neighbors if they share at least one Delaunay triangle.
fn find_cell_neighbors(
    cell_idx: usize,
    vertex_triangle_map: &VertexTriangleMap,
    triangle_vertex_map: &HashMap<usize, Vec<usize>>,
) -> Vec<usize> {
    let Some(my_triangles) = vertex_triangle_map.get(&cell_idx) else {
        return Vec::new();
    };

    let mut neighbors = HashSet::new();

    for &tri_idx in my_triangles {
        if let Some(triangle_vertices) = triangle_vertex_map.get(&tri_idx) {
            for &vertex in triangle_vertices {
                if vertex != cell_idx {
                    neighbors.insert(vertex);
                }
            }
        }
    }

    let mut neighbor_list: Vec<usize> = neighbors.into_iter().collect();
    neighbor_list.sort(); // Deterministic ordering
    neighbor_list
}

/// Keep the part of a convex ring closer to `site` than to `other`
///
/// Sutherland–Hodgman against a single half-plane. Consecutive repeated
/// vertices produced by cuts through existing vertices are removed.
fn clip_to_bisector(ring: &[DVec2], site: DVec2, other: DVec2) -> Vec<DVec2> {
    let normal = other - site;
    let mid = (site + other) * 0.5;
    let side = |p: DVec2| (p - mid).dot(normal);

    let mut out: Vec<DVec2> = Vec::with_capacity(ring.len() + 1);
    for i in 0..ring.len() {
        let current = ring[i];
        let next = ring[(i + 1) % ring.len()];
        let (sc, sn) = (side(current), side(next));

        if sc <= 0.0 {
            out.push(current);
        }
        if (sc <= 0.0) != (sn <= 0.0) {
            let t = sc / (sc - sn);
            out.push(current + (next - current) * t);
        }
    }

    out.dedup();
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::points::scatter_in_box;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
    }

    #[test]
    fn test_generate_cells() {
        let sites = scatter_in_box(&unit_box(), 100, 42);
        let cells = generate_cells(&sites, &unit_box());

        assert_eq!(cells.len(), 100);

        let mut total = 0.0;
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.site, i);
            assert!(cell.polygon.is_closed());
            assert!(cell.polygon.distinct_vertex_count() >= 3, "Cell should have at least 3 vertices");
            assert!(!cell.neighbors.is_empty(), "Cell should have neighbors");
            for p in cell.polygon.points() {
                assert!(unit_box().padded(1e-12).contains(*p));
            }
            total += cell.polygon.area();
        }

        // Cells partition the box
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cells_contain_their_sites() {
        let sites = scatter_in_box(&unit_box(), 50, 7);
        for cell in generate_cells(&sites, &unit_box()) {
            assert!(crate::clip::point_in_polygon(sites[cell.site], &cell.polygon));
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let sites = scatter_in_box(&unit_box(), 50, 12345);
        let cells = generate_cells(&sites, &unit_box());

        // If A is a neighbor of B, then B should be a neighbor of A
        for cell in &cells {
            for &neighbor_id in &cell.neighbors {
                let neighbor = &cells[neighbor_id];
                assert!(
                    neighbor.neighbors.contains(&cell.site),
                    "Neighbor relationship should be symmetric"
                );
            }
        }
    }

    #[test]
    fn test_degenerate_site_counts() {
        assert!(compute_voronoi(&[], &unit_box()).is_empty());

        let single = compute_voronoi(&[Point::new(0.3, 0.3)], &unit_box());
        assert_eq!(single.len(), 1);
        assert_eq!(single[0], unit_box().to_ring());
    }

    #[test]
    fn test_two_sites_split_on_bisector() {
        let sites = [Point::new(0.25, 0.25), Point::new(0.75, 0.75)];
        let cells = compute_voronoi(&sites, &unit_box());
        assert_eq!(cells.len(), 2);
        for cell in &cells {
            assert!((cell.area() - 0.5).abs() < 1e-12);
        }
        assert!(crate::clip::point_in_polygon(Point::new(0.1, 0.1), &cells[0]));
        assert!(crate::clip::point_in_polygon(Point::new(0.9, 0.9), &cells[1]));
    }

    #[test]
    fn test_duplicate_sites_share_a_cell() {
        let sites = [
            Point::new(0.2, 0.2),
            Point::new(0.8, 0.8),
            Point::new(0.2, 0.2),
        ];
        let cells = compute_voronoi(&sites, &unit_box());
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], cells[2]);
        assert!((cells[0].area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nearly_coincident_sites() {
        let sites = [
            Point::new(0.5, 0.5),
            Point::new(0.5, 0.5 + 1e-15),
            Point::new(0.1, 0.9),
        ];
        let cells = compute_voronoi(&sites, &unit_box());
        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert!(cell.is_closed() || cell.is_empty());
        }
    }

    #[test]
    fn test_collinear_sites() {
        let sites: Vec<Point> = (0..4).map(|i| Point::new(0.1 + 0.2 * i as f64, 0.5)).collect();
        let cells = compute_voronoi(&sites, &unit_box());
        let total: f64 = cells.iter().map(Polygon::area).sum();
        assert!((total - 1.0).abs() < 1e-9);
        // Vertical bands split halfway between neighbouring sites
        assert!((cells[0].area() - 0.2).abs() < 1e-9);
        assert!((cells[1].area() - 0.2).abs() < 1e-9);
        assert!((cells[3].area() - 0.4).abs() < 1e-9);
    }
}
