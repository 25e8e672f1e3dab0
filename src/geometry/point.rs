//! Data and operations on two-dimensional points.
//!
//! # Equality Semantics
//!
//! `Point` equality is **exact**: two points are equal iff their coordinates are
//! bit-for-bit identical under IEEE 754 comparison. Geometric (tolerant) equality is
//! provided separately by [`Point::approx_eq`], which is what the vertex registry and
//! [`Vertex`](crate::core::vertex::Vertex) equality use.

#![forbid(unsafe_code)]

use std::fmt;

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point in the plane.
///
/// Points are immutable once created, so the `coords` field is private.
///
/// # Examples
///
/// ```rust
/// use quadforest::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0]);
/// assert_eq!(p.x(), 1.0);
/// assert_eq!(p.y(), 2.0);
/// assert_eq!(p.coords(), &[1.0, 2.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    coords: [f64; 2],
}

impl Point {
    /// Creates a new point from its `[x, y]` coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; 2]) -> Self {
        Self { coords }
    }

    /// Returns the coordinates as an `[x, y]` array reference.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 2] {
        &self.coords
    }

    /// Returns the x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// Returns the y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// Returns `true` if both coordinates are finite (neither NaN nor infinite).
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.coords[0].is_finite() && self.coords[1].is_finite()
    }

    /// Returns `true` if `self` and `other` agree coordinate-wise within `tolerance`.
    ///
    /// The comparison uses the max-norm, so the tolerance region is a square of
    /// half-width `tolerance` around each point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::geometry::point::Point;
    ///
    /// let a = Point::new([0.5, 0.5]);
    /// let b = Point::new([0.5 + 1e-12, 0.5]);
    /// assert!(a.approx_eq(&b, 1e-10));
    /// assert!(!a.approx_eq(&Point::new([0.6, 0.5]), 1e-10));
    /// ```
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.coords[0] - other.coords[0]).abs() <= tolerance
            && (self.coords[1] - other.coords[1]).abs() <= tolerance
    }

    /// Returns the midpoint of the segment from `self` to `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new([
            0.5 * (self.coords[0] + other.coords[0]),
            0.5 * (self.coords[1] + other.coords[1]),
        ])
    }
}

impl From<[f64; 2]> for Point {
    #[inline]
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords)
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new([x, y])
    }
}

impl From<Point> for [f64; 2] {
    #[inline]
    fn from(point: Point) -> [f64; 2] {
        point.coords
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.coords[0], self.coords[1])
    }
}
