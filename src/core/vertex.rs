//! Data and operations on mesh vertices.
//!
//! A [`Vertex`] is an immutable point in the plane with an optional global index. Vertices
//! live in the [`Forest`](crate::core::forest::Forest) vertex arena and are shared by
//! every cell that uses them as a corner; the forest's registry guarantees that no two
//! live vertices are geometrically equal.
//!
//! # Examples
//!
//! ```rust
//! use quadforest::core::vertex::Vertex;
//! use quadforest::vertex;
//!
//! let a: Vertex = vertex!([0.5, 0.5]);
//! let b: Vertex = vertex!([0.5 + 1e-12, 0.5]);
//! assert_eq!(a, b); // equal within VERTEX_TOLERANCE
//! assert_eq!(a.global_index(), None);
//! ```

#![forbid(unsafe_code)]

use crate::geometry::point::Point;

/// Default tolerance for geometric vertex equality.
pub const VERTEX_TOLERANCE: f64 = 1e-10;

// =============================================================================
// CONVENIENCE MACROS AND HELPERS
// =============================================================================

/// Convenience macro for creating vertices from `[x, y]` coordinates.
///
/// ```rust
/// use quadforest::vertex;
/// use quadforest::core::vertex::Vertex;
///
/// let v: Vertex = vertex!([1.0, 2.0]);
/// let numbered: Vertex = vertex!([1.0, 2.0], 7);
/// assert_eq!(numbered.global_index(), Some(7));
/// assert_eq!(v.point().x(), 1.0);
/// ```
#[macro_export]
macro_rules! vertex {
    ($coords:expr) => {
        $crate::core::vertex::Vertex::new($crate::geometry::point::Point::new($coords))
    };

    ($coords:expr, $index:expr) => {
        $crate::core::vertex::Vertex::new($crate::geometry::point::Point::new($coords))
            .with_global_index($index)
    };
}

// Re-export the macro at the crate level for convenience
pub use crate::vertex;

// =============================================================================
// VERTEX STRUCT DEFINITION
// =============================================================================

/// A mesh vertex.
///
/// # Properties
///
/// - **`point`**: the coordinate of the vertex
/// - **`global_index`**: optional global number assigned by
///   [`Forest::assign_global_indices`](crate::core::forest::Forest::assign_global_indices)
///
/// Equality is geometric: two vertices are equal iff their coordinates agree within
/// [`VERTEX_TOLERANCE`]. The global index does not take part in equality.
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    point: Point,
    global_index: Option<u32>,
}

impl Vertex {
    /// Creates an unnumbered vertex at `point`.
    #[inline]
    #[must_use]
    pub const fn new(point: Point) -> Self {
        Self {
            point,
            global_index: None,
        }
    }

    /// Returns a copy of this vertex carrying `index` as its global index.
    #[inline]
    #[must_use]
    pub const fn with_global_index(mut self, index: u32) -> Self {
        self.global_index = Some(index);
        self
    }

    /// The coordinate of this vertex.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    /// The coordinate as an `[x, y]` array reference.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 2] {
        self.point.coords()
    }

    /// The global index, if one has been assigned.
    #[inline]
    #[must_use]
    pub const fn global_index(&self) -> Option<u32> {
        self.global_index
    }

    pub(crate) const fn set_global_index(&mut self, index: Option<u32>) {
        self.global_index = index;
    }

    /// Returns `true` if `self` and `other` are within `tolerance` of each other.
    #[inline]
    #[must_use]
    pub fn coincides_with(&self, other: &Self, tolerance: f64) -> bool {
        self.point.approx_eq(&other.point, tolerance)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.coincides_with(other, VERTEX_TOLERANCE)
    }
}

impl From<Point> for Vertex {
    fn from(point: Point) -> Self {
        Self::new(point)
    }
}

impl From<&Vertex> for Point {
    fn from(vertex: &Vertex) -> Self {
        vertex.point
    }
}
