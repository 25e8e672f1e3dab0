//! Axis-aligned rectangles.
//!
//! A [`Rectangle`] is stored as `(x0, x1, y0, y1)` with `x0 <= x1` and `y0 <= y1`.
//! It is the bounding box of a cell and of the whole forest.

#![forbid(unsafe_code)]

use std::fmt;

use super::point::Point;

/// An axis-aligned rectangle `[x0, x1] × [y0, y1]`.
///
/// # Examples
///
/// ```rust
/// use quadforest::geometry::rectangle::Rectangle;
///
/// let r = Rectangle::new(0.0, 2.0, 0.0, 1.0);
/// assert_eq!(r.area(), 2.0);
/// assert_eq!(r.width(), 2.0);
/// assert_eq!(r.height(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    /// Minimum x.
    pub x0: f64,
    /// Maximum x.
    pub x1: f64,
    /// Minimum y.
    pub y0: f64,
    /// Maximum y.
    pub y1: f64,
}

impl Rectangle {
    /// Creates a rectangle from its bounds in `(x0, x1, y0, y1)` order.
    #[inline]
    #[must_use]
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Returns the smallest rectangle containing every point in `points`.
    ///
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let seed = Self::new(first.x(), first.x(), first.y(), first.y());
        Some(iter.fold(seed, |acc, p| {
            Self::new(
                acc.x0.min(p.x()),
                acc.x1.max(p.x()),
                acc.y0.min(p.y()),
                acc.y1.max(p.y()),
            )
        }))
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.x0.min(other.x0),
            self.x1.max(other.x1),
            self.y0.min(other.y0),
            self.y1.max(other.y1),
        )
    }

    /// Width `x1 - x0`.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height `y1 - y0`.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area `width * height`.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The center point of the rectangle.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new([0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1)])
    }

    /// Returns `true` if the rectangle has finite bounds and strictly positive
    /// width and height.
    #[inline]
    #[must_use]
    pub fn is_non_degenerate(&self) -> bool {
        [self.x0, self.x1, self.y0, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 < self.x1
            && self.y0 < self.y1
    }

    /// Closed containment test: `x0 <= x <= x1` and `y0 <= y <= y1`.
    #[inline]
    #[must_use]
    pub fn contains_closed(&self, point: &Point) -> bool {
        self.x0 <= point.x() && point.x() <= self.x1 && self.y0 <= point.y() && point.y() <= self.y1
    }

    /// Half-open containment test `[x0, x1) × [y0, y1)`, optionally closing the
    /// maximum side on either axis.
    ///
    /// `close_x` / `close_y` turn the `< x1` / `< y1` comparison into `<=`; they are set
    /// for cells that lie on the maximum boundary of the forest so that every point of
    /// the domain belongs to exactly one leaf.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::geometry::{point::Point, rectangle::Rectangle};
    ///
    /// let r = Rectangle::new(0.0, 1.0, 0.0, 1.0);
    /// assert!(r.contains_half_open(&Point::new([0.0, 0.0]), false, false));
    /// assert!(!r.contains_half_open(&Point::new([1.0, 0.5]), false, false));
    /// assert!(r.contains_half_open(&Point::new([1.0, 0.5]), true, false));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains_half_open(&self, point: &Point, close_x: bool, close_y: bool) -> bool {
        let (x, y) = (point.x(), point.y());
        let in_x = self.x0 <= x && (x < self.x1 || (close_x && x <= self.x1));
        let in_y = self.y0 <= y && (y < self.y1 || (close_y && y <= self.y1));
        in_x && in_y
    }

    /// Returns `true` if `other` lies inside `self`, with `tolerance` slack on each side.
    #[inline]
    #[must_use]
    pub fn encloses(&self, other: &Self, tolerance: f64) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y0 >= self.y0 - tolerance
            && other.y1 <= self.y1 + tolerance
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] × [{}, {}]", self.x0, self.x1, self.y0, self.y1)
    }
}
