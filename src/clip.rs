//! Polygon boolean operations and point-in-polygon
//!
//! Both operands are closed and normalized to clockwise winding (on copies)
//! before any boolean operation. The boolean operations run an edge overlay:
//!
//! 1. Vertices of both rings are snapped into a shared vertex pool so that
//!    nearly coincident points get a single identity.
//! 2. Every edge is split at the points where it touches or crosses the other
//!    ring, so that the two rings only meet at pool vertices.
//! 3. Each split edge is classified against the other ring: inside, outside,
//!    or shared with an edge of the other ring (same or opposite direction).
//! 4. The edges selected by the operation are linked back into rings.
//!
//! Results are always a single ring. When an operation produces several
//! disjoint components (or a component with a hole) the ring with the largest
//! area is returned and the rest is discarded.

use std::collections::{HashMap, HashSet};

use glam::DVec2;

use crate::geometry::{BoundingBox, Point, Polygon};

/// Default relative snapping tolerance
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Minimum number of points of a closed ring operand
pub const MIN_RING_POINTS: usize = 4;

/// Where a point lies relative to a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Outside,
    Boundary,
}

/// Boundary-inclusive point-in-polygon test with the default tolerance
///
/// Returns `false` for rings with fewer than four points.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    Clipper::default().point_in_polygon(point, polygon)
}

/// Intersection of `a` and `b` with the default tolerance
pub fn intersect(a: &Polygon, b: &Polygon) -> Option<Polygon> {
    Clipper::default().intersect(a, b)
}

/// `a` minus `b` with the default tolerance
pub fn difference(a: &Polygon, b: &Polygon) -> Polygon {
    Clipper::default().difference(a, b)
}

/// Polygon clipper carrying a relative snapping tolerance
///
/// The tolerance is scaled by the diagonal of the operands' combined bounding
/// box, so it behaves the same for unit squares and for city-sized rings
/// expressed in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipper {
    epsilon: f64,
}

impl Default for Clipper {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Clipper {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Classify `point` against `polygon`
    ///
    /// Rings with fewer than four points contain nothing.
    pub fn locate(&self, point: Point, polygon: &Polygon) -> Location {
        if polygon.len() < MIN_RING_POINTS {
            return Location::Outside;
        }
        let ring: Vec<DVec2> = polygon.open_points().iter().map(|p| p.to_vec()).collect();
        let tol = polygon
            .bounding_box()
            .map(|bbox| self.tolerance(&bbox))
            .unwrap_or(0.0);
        locate_in(point.to_vec(), &ring, tol)
    }

    /// Boundary-inclusive inclusion test
    pub fn point_in_polygon(&self, point: Point, polygon: &Polygon) -> bool {
        matches!(
            self.locate(point, polygon),
            Location::Inside | Location::Boundary
        )
    }

    /// The region shared by `a` and `b`
    ///
    /// # Arguments
    ///
    /// * `a` - Subject ring, open or closed, any winding
    /// * `b` - Clip ring, open or closed, any winding
    ///
    /// # Returns
    ///
    /// The largest component of the intersection as a closed clockwise ring.
    /// `None` when either operand has fewer than four points, or when the
    /// operands are disjoint or only touch along edges or vertices.
    pub fn intersect(&self, a: &Polygon, b: &Polygon) -> Option<Polygon> {
        if a.len() < MIN_RING_POINTS || b.len() < MIN_RING_POINTS {
            return None;
        }
        Overlay::build(a, b, self.epsilon)?.extract(Operation::Intersection)
    }

    /// `a` with the region it shares with `b` removed
    ///
    /// # Arguments
    ///
    /// * `a` - Ring to subtract from
    /// * `b` - Ring to remove
    ///
    /// # Returns
    ///
    /// The largest remaining component as a closed clockwise ring. `a`
    /// unchanged when either operand has fewer than four points or when the
    /// operands do not overlap. An empty ring when `b` covers `a` entirely.
    pub fn difference(&self, a: &Polygon, b: &Polygon) -> Polygon {
        if a.len() < MIN_RING_POINTS || b.len() < MIN_RING_POINTS {
            return a.clone();
        }
        let Some(overlay) = Overlay::build(a, b, self.epsilon) else {
            return a.clone();
        };
        if overlay.extract(Operation::Intersection).is_none() {
            return a.clone();
        }
        overlay.extract(Operation::Difference).unwrap_or_default()
    }

    fn tolerance(&self, bbox: &BoundingBox) -> f64 {
        (self.epsilon * bbox.diagonal()).max(f64::MIN_POSITIVE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Intersection,
    Difference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    Inside,
    Outside,
    SharedSame,
    SharedOpposite,
    Ambiguous,
}

/// Split and classified edges of two rings over a shared vertex pool
struct Overlay {
    vertices: Vec<DVec2>,
    a_edges: Vec<((usize, usize), EdgeClass)>,
    b_edges: Vec<((usize, usize), EdgeClass)>,
    tol: f64,
}

impl Overlay {
    /// Returns `None` when either ring collapses below three vertices after snapping
    fn build(a: &Polygon, b: &Polygon, epsilon: f64) -> Option<Self> {
        let a = Polygon::closed(a.points().to_vec()).to_clockwise();
        let b = Polygon::closed(b.points().to_vec()).to_clockwise();

        let bbox = BoundingBox::from_points(a.points().iter().chain(b.points()).copied())?;
        let tol = (epsilon * bbox.diagonal()).max(f64::MIN_POSITIVE);

        let a_extent = SegmentBox::of_points(a.points(), tol)?;
        let b_extent = SegmentBox::of_points(b.points(), tol)?;
        if !a_extent.overlaps(&b_extent) {
            return None;
        }

        let mut pool = VertexPool::new(tol);
        let a_ring = pool.ring(a.open_points());
        let b_ring = pool.ring(b.open_points());
        if a_ring.len() < 3 || b_ring.len() < 3 {
            return None;
        }

        let a_segments = ring_segments(&a_ring);
        let b_segments = ring_segments(&b_ring);
        let mut a_splits: Vec<Vec<usize>> = vec![Vec::new(); a_segments.len()];
        let mut b_splits: Vec<Vec<usize>> = vec![Vec::new(); b_segments.len()];

        // Only b segments near a can touch it
        let b_boxes: Vec<(usize, SegmentBox)> = b_segments
            .iter()
            .enumerate()
            .map(|(j, &(q0, q1))| (j, SegmentBox::new(pool.get(q0), pool.get(q1), tol)))
            .filter(|(_, b)| b.overlaps(&a_extent))
            .collect();

        for (i, &(p0, p1)) in a_segments.iter().enumerate() {
            let a_box = SegmentBox::new(pool.get(p0), pool.get(p1), tol);
            for &(j, b_box) in &b_boxes {
                if !a_box.overlaps(&b_box) {
                    continue;
                }
                let (q0, q1) = b_segments[j];
                for q in [q0, q1] {
                    if on_segment(pool.get(q), pool.get(p0), pool.get(p1), tol) {
                        a_splits[i].push(q);
                    }
                }
                for p in [p0, p1] {
                    if on_segment(pool.get(p), pool.get(q0), pool.get(q1), tol) {
                        b_splits[j].push(p);
                    }
                }
                if let Some(x) = crossing(pool.get(p0), pool.get(p1), pool.get(q0), pool.get(q1)) {
                    let x = pool.snap(x);
                    a_splits[i].push(x);
                    b_splits[j].push(x);
                }
            }
        }

        let a_sub = split_segments(&a_segments, &a_splits, &pool);
        let b_sub = split_segments(&b_segments, &b_splits, &pool);

        let a_pos: Vec<DVec2> = a_ring.iter().map(|&i| pool.get(i)).collect();
        let b_pos: Vec<DVec2> = b_ring.iter().map(|&i| pool.get(i)).collect();

        let a_edges = classify(&a_sub, &b_sub, &b_pos, &pool, tol);
        let b_edges = classify(&b_sub, &a_sub, &a_pos, &pool, tol);

        Some(Self {
            vertices: pool.into_vertices(),
            a_edges,
            b_edges,
            tol,
        })
    }

    fn extract(&self, op: Operation) -> Option<Polygon> {
        let mut kept: Vec<(usize, usize)> = Vec::new();
        for &(edge, class) in &self.a_edges {
            let keep = match op {
                Operation::Intersection => matches!(
                    class,
                    EdgeClass::Inside | EdgeClass::SharedSame | EdgeClass::Ambiguous
                ),
                Operation::Difference => {
                    matches!(class, EdgeClass::Outside | EdgeClass::SharedOpposite)
                }
            };
            if keep {
                kept.push(edge);
            }
        }
        for &((s, e), class) in &self.b_edges {
            if class == EdgeClass::Inside {
                match op {
                    Operation::Intersection => kept.push((s, e)),
                    Operation::Difference => kept.push((e, s)),
                }
            }
        }

        self.link(&kept)
            .into_iter()
            .map(|ring| ring.iter().map(|&i| Point::from_vec(self.vertices[i])).collect::<Vec<_>>())
            .map(Polygon::closed)
            .filter(|ring| !ring.is_degenerate() && ring.area() > self.tol * self.tol)
            .max_by(|x, y| x.area().total_cmp(&y.area()))
            .map(|ring| ring.to_clockwise())
    }

    /// Link directed edges into closed vertex loops
    ///
    /// At a vertex with several unused outgoing edges the sharpest clockwise
    /// turn is taken, which keeps rings that touch at a single vertex apart.
    /// Chains that do not close are dropped.
    fn link(&self, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
        for (id, &(s, _)) in edges.iter().enumerate() {
            outgoing.entry(s).or_default().push(id);
        }
        let mut used = vec![false; edges.len()];
        let mut rings = Vec::new();

        for first in 0..edges.len() {
            if used[first] {
                continue;
            }
            used[first] = true;
            let (start, mut current) = edges[first];
            let mut incoming = self.vertices[current] - self.vertices[start];
            let mut ring = vec![start];
            let mut closed = false;

            loop {
                if current == start {
                    closed = true;
                    break;
                }
                ring.push(current);
                let next = outgoing
                    .get(&current)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|&id| !used[id])
                    .min_by(|&x, &y| {
                        let tx = turn(incoming, self.direction(edges[x]));
                        let ty = turn(incoming, self.direction(edges[y]));
                        tx.total_cmp(&ty)
                    });
                let Some(id) = next else {
                    break;
                };
                used[id] = true;
                incoming = self.direction(edges[id]);
                current = edges[id].1;
            }

            if closed && ring.len() >= 3 {
                rings.push(ring);
            }
        }
        rings
    }

    fn direction(&self, (s, e): (usize, usize)) -> DVec2 {
        self.vertices[e] - self.vertices[s]
    }
}

/// Signed turning angle from `incoming` to `outgoing`; negative turns clockwise
fn turn(incoming: DVec2, outgoing: DVec2) -> f64 {
    incoming.perp_dot(outgoing).atan2(incoming.dot(outgoing))
}

/// Vertex pool that merges points closer than the tolerance
///
/// Vertices are bucketed on a grid of twice the tolerance, so a lookup only
/// visits the 3x3 block of buckets around the query point. Among several
/// matches the earliest vertex wins.
struct VertexPool {
    vertices: Vec<DVec2>,
    buckets: HashMap<(i64, i64), Vec<usize>>,
    tol: f64,
}

impl VertexPool {
    fn new(tol: f64) -> Self {
        Self {
            vertices: Vec::new(),
            buckets: HashMap::new(),
            tol,
        }
    }

    /// Quantised grid key; saturates for coordinates far beyond the grid
    fn key(&self, p: DVec2) -> (i64, i64) {
        let cell = 2.0 * self.tol;
        ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
    }

    fn snap(&mut self, p: DVec2) -> usize {
        let (kx, ky) = self.key(p);
        let mut found: Option<usize> = None;
        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                let key = (kx.saturating_add(dx), ky.saturating_add(dy));
                let Some(bucket) = self.buckets.get(&key) else {
                    continue;
                };
                for &i in bucket {
                    if self.vertices[i].distance(p) <= self.tol && found.map_or(true, |f| i < f) {
                        found = Some(i);
                    }
                }
            }
        }
        if let Some(i) = found {
            return i;
        }

        let i = self.vertices.len();
        self.vertices.push(p);
        self.buckets.entry((kx, ky)).or_default().push(i);
        i
    }

    /// Snap a ring's vertices, dropping consecutive repeats and the wrap repeat
    fn ring(&mut self, points: &[Point]) -> Vec<usize> {
        let mut ring: Vec<usize> = Vec::with_capacity(points.len());
        for p in points {
            let i = self.snap(p.to_vec());
            if ring.last() != Some(&i) {
                ring.push(i);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }

    #[inline]
    fn get(&self, i: usize) -> DVec2 {
        self.vertices[i]
    }

    fn into_vertices(self) -> Vec<DVec2> {
        self.vertices
    }
}

/// Axis-aligned box grown by the tolerance on every side
#[derive(Debug, Clone, Copy)]
struct SegmentBox {
    min: DVec2,
    max: DVec2,
}

impl SegmentBox {
    fn new(a: DVec2, b: DVec2, tol: f64) -> Self {
        Self {
            min: a.min(b) - DVec2::splat(tol),
            max: a.max(b) + DVec2::splat(tol),
        }
    }

    fn of_points(points: &[Point], tol: f64) -> Option<Self> {
        let bbox = BoundingBox::from_points(points.iter().copied())?;
        Some(Self::new(bbox.min.to_vec(), bbox.max.to_vec(), tol))
    }

    #[inline]
    fn overlaps(&self, other: &SegmentBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

fn ring_segments(ring: &[usize]) -> Vec<(usize, usize)> {
    (0..ring.len())
        .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
        .collect()
}

/// Distance from `p` to the segment `a`-`b` is within `tol`
fn on_segment(p: DVec2, a: DVec2, b: DVec2, tol: f64) -> bool {
    segment_distance(p, a, b) <= tol
}

fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let d = b - a;
    let len2 = d.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(d) / len2).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

/// Proper crossing point of two non-parallel segments
fn crossing(p0: DVec2, p1: DVec2, q0: DVec2, q1: DVec2) -> Option<DVec2> {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let denom = d1.perp_dot(d2);
    if denom.abs() <= f64::EPSILON * d1.length() * d2.length() {
        return None;
    }
    let w = q0 - p0;
    let t = w.perp_dot(d2) / denom;
    let u = w.perp_dot(d1) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p0 + d1 * t)
    } else {
        None
    }
}

/// Break every segment at its split vertices, ordered along the segment
fn split_segments(
    segments: &[(usize, usize)],
    splits: &[Vec<usize>],
    pool: &VertexPool,
) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (&(s, e), extra) in segments.iter().zip(splits) {
        let origin = pool.get(s);
        let d = pool.get(e) - origin;
        let len2 = d.length_squared();

        let mut inner: Vec<(f64, usize)> = extra
            .iter()
            .copied()
            .filter(|&v| v != s && v != e)
            .map(|v| {
                let t = if len2 > 0.0 {
                    (pool.get(v) - origin).dot(d) / len2
                } else {
                    0.0
                };
                (t, v)
            })
            .collect();
        inner.sort_by(|x, y| x.0.total_cmp(&y.0));
        inner.dedup_by_key(|&mut (_, v)| v);

        let mut prev = s;
        for v in inner.into_iter().map(|(_, v)| v).chain(std::iter::once(e)) {
            if v != prev {
                out.push((prev, v));
                prev = v;
            }
        }
    }
    out
}

fn classify(
    edges: &[(usize, usize)],
    other: &[(usize, usize)],
    other_ring: &[DVec2],
    pool: &VertexPool,
    tol: f64,
) -> Vec<((usize, usize), EdgeClass)> {
    let other_set: HashSet<(usize, usize)> = other.iter().copied().collect();
    edges
        .iter()
        .map(|&(s, e)| {
            let class = if other_set.contains(&(s, e)) {
                EdgeClass::SharedSame
            } else if other_set.contains(&(e, s)) {
                EdgeClass::SharedOpposite
            } else {
                let mid = (pool.get(s) + pool.get(e)) * 0.5;
                match locate_in(mid, other_ring, tol) {
                    Location::Inside => EdgeClass::Inside,
                    Location::Outside => EdgeClass::Outside,
                    Location::Boundary => EdgeClass::Ambiguous,
                }
            };
            ((s, e), class)
        })
        .collect()
}

/// Even-odd ray casting over an open vertex ring, with a boundary band of `tol`
fn locate_in(p: DVec2, ring: &[DVec2], tol: f64) -> Location {
    let n = ring.len();
    if n < 3 {
        return Location::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if segment_distance(p, a, b) <= tol {
            return Location::Boundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}
