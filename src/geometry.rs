//! Shared planar geometry primitives
//!
//! Points, rings and axis-aligned bounding boxes used by every other module.
//! Coordinates are `(lat, lng)` pairs treated as planar `(x, y)`; no
//! projection is applied.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A site or vertex location
///
/// Equality is exact (bitwise float comparison, no tolerance).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// First coordinate, used as `x`
    pub lat: f64,
    /// Second coordinate, used as `y`
    pub lng: f64,
}

impl Point {
    /// Create a point from its coordinates
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// View this point as a planar vector
    #[inline]
    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.lat, self.lng)
    }

    #[inline]
    pub fn from_vec(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.lat, p.lng]
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self::from_vec(v)
    }
}

/// A polygon ring: an ordered loop of points
///
/// A ring is *closed* when its first point equals its last point bit-exactly.
/// Rings with fewer than four points (three distinct plus the closing point)
/// are degenerate operands for the boolean operations in [`crate::clip`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Wrap a point sequence as-is (no closing, no reorientation)
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Wrap a point sequence and close it if needed
    pub fn closed(points: Vec<Point>) -> Self {
        let mut polygon = Self::new(points);
        polygon.close();
        polygon
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the first and last points are identical
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Append the first point if the ring is open
    pub fn close(&mut self) {
        if let Some(&first) = self.points.first() {
            if !self.is_closed() {
                self.points.push(first);
            }
        }
    }

    /// Iterate over the ring's edges, including the wrap-around edge of an open ring
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let wrap = if self.points.len() > 1 && !self.is_closed() {
            Some((self.points[self.points.len() - 1], self.points[0]))
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(wrap)
    }

    /// The ring's vertices without the closing duplicate
    pub fn open_points(&self) -> &[Point] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Shoelace area; negative for clockwise rings
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|(a, b)| a.to_vec().perp_dot(b.to_vec()))
            .sum::<f64>()
            * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// A clockwise copy of this ring; the receiver is left untouched
    pub fn to_clockwise(&self) -> Polygon {
        let mut points = self.points.clone();
        if !self.is_clockwise() {
            points.reverse();
        }
        Polygon::new(points)
    }

    /// Number of pairwise-distinct vertices
    pub fn distinct_vertex_count(&self) -> usize {
        let mut seen: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        seen.len()
    }

    /// A ring with fewer than three distinct vertices encloses no area
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.distinct_vertex_count() < 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Axis-aligned box bounding the area of interest
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box covering all points, `None` for an empty input
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Point::new(min.lat.min(p.lat), min.lng.min(p.lng)),
                Point::new(max.lat.max(p.lat), max.lng.max(p.lng)),
            )
        });
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.lng - self.min.lng
    }

    /// Length of the diagonal, used as the scale for tolerances
    pub fn diagonal(&self) -> f64 {
        self.max.to_vec().distance(self.min.to_vec())
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point::new(self.min.lat - margin, self.min.lng - margin),
            max: Point::new(self.max.lat + margin, self.max.lng + margin),
        }
    }

    /// Grow the box by `fraction` of its extent on every side
    pub fn padded(&self, fraction: f64) -> Self {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Self {
            min: Point::new(self.min.lat - dx, self.min.lng - dy),
            max: Point::new(self.max.lat + dx, self.max.lng + dy),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.lat >= self.min.lat && p.lat <= self.max.lat && p.lng >= self.min.lng && p.lng <= self.max.lng
    }

    /// The box as a closed clockwise ring starting at `min`
    pub fn to_ring(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            Point::new(self.min.lat, self.max.lng),
            self.max,
            Point::new(self.max.lat, self.min.lng),
            self.min,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_open() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_close_appends_first_point() {
        let mut ring = Polygon::new(unit_square_open());
        assert!(!ring.is_closed());
        ring.close();
        assert!(ring.is_closed());
        assert_eq!(ring.len(), 5);

        // Closing twice is a no-op
        ring.close();
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn test_area_open_and_closed_agree() {
        let open = Polygon::new(unit_square_open());
        let closed = Polygon::closed(unit_square_open());
        assert!((open.area() - 1.0).abs() < 1e-12);
        assert!((closed.area() - 1.0).abs() < 1e-12);
        assert_eq!(open.signed_area(), closed.signed_area());
    }

    #[test]
    fn test_orientation_normalization_copies() {
        let mut points = unit_square_open();
        points.reverse();
        let ccw = Polygon::closed(points);
        assert!(!ccw.is_clockwise());

        let cw = ccw.to_clockwise();
        assert!(cw.is_clockwise());
        // The original is not mutated
        assert!(!ccw.is_clockwise());
        assert!((cw.area() - ccw.area()).abs() < 1e-12);
    }

    #[test]
    fn test_distinct_vertices() {
        let ring = Polygon::closed(unit_square_open());
        assert_eq!(ring.distinct_vertex_count(), 4);
        assert!(!ring.is_degenerate());

        let sliver = Polygon::closed(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(sliver.is_degenerate());
    }

    #[test]
    fn test_bounding_box_ring() {
        let bbox = BoundingBox::from_points(unit_square_open()).unwrap();
        assert_eq!(bbox.min, Point::new(0.0, 0.0));
        assert_eq!(bbox.max, Point::new(1.0, 1.0));

        let ring = bbox.to_ring();
        assert!(ring.is_closed());
        assert!(ring.is_clockwise());
        assert_eq!(ring.open_points(), unit_square_open().as_slice());

        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_padded_box() {
        let bbox = BoundingBox::new(Point::new(0.0, 0.0), Point::new(2.0, 4.0)).padded(0.5);
        assert_eq!(bbox.min, Point::new(-1.0, -2.0));
        assert_eq!(bbox.max, Point::new(3.0, 6.0));
        assert!(bbox.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_expanded_point_box() {
        let point = BoundingBox::from_points([Point::new(1.0, 1.0)]).unwrap();
        assert_eq!(point.padded(0.5), point);

        let bbox = point.expanded(0.5);
        assert_eq!(bbox.min, Point::new(0.5, 0.5));
        assert_eq!(bbox.max, Point::new(1.5, 1.5));
    }
}
