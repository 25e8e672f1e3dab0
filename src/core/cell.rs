//! Data and operations on quadtree cells.
//!
//! A [`Cell`] is a node of one quadtree in the forest. It records where it sits in its
//! tree (parent, position, children, depth), its geometry (bounding rectangle, four
//! corner vertices, and, once refined, four edge midpoints and a center vertex) and its
//! four oriented [`Edge`]s.
//!
//! Cells are created by [`Forest`](crate::core::forest::Forest) construction (roots) and
//! by [`Forest::refine`](crate::core::forest::Forest::refine) (children); they are never
//! built directly by user code. Root geometry is supplied as a [`CornerSet`].
//!
//! # Examples
//!
//! ```rust
//! use quadforest::prelude::*;
//!
//! let mut forest =
//!     Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
//! let root = forest.roots()[0];
//! let children = forest.refine(root).unwrap();
//!
//! let sw = forest.cell(children[Quadrant::SW.index()]).unwrap();
//! assert_eq!(sw.kind(), CellKind::Leaf);
//! assert_eq!(sw.depth(), 1);
//! assert_eq!(sw.parent(), Some(root));
//! assert_eq!(sw.position(), Some(Quadrant::SW));
//! assert_eq!(*sw.rectangle(), Rectangle::new(0.0, 0.5, 0.0, 0.5));
//! ```

#![forbid(unsafe_code)]

use std::fmt;

use super::edge::Edge;
use super::forest::{CellKey, ForestError, VertexKey};
use super::quadrant::{Direction, Quadrant};
use crate::geometry::point::Point;
use crate::geometry::rectangle::Rectangle;

// =============================================================================
// CELL KIND
// =============================================================================

/// Classification of a cell within its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Top-level cell with no parent. Stays `Root` after refinement.
    Root,
    /// Non-root cell with children.
    Branch,
    /// Non-root cell without children.
    Leaf,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Branch => f.write_str("branch"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

// =============================================================================
// CORNER SET
// =============================================================================

/// The four corner points of a root cell, keyed by [`Quadrant`].
///
/// A corner set may be assembled piecewise; [`Forest::new`](crate::core::forest::Forest::new)
/// rejects sets with a missing corner or corners that do not span a non-degenerate
/// axis-aligned rectangle.
///
/// # Examples
///
/// ```rust
/// use quadforest::prelude::*;
///
/// let corners = CornerSet::new()
///     .with(Quadrant::SW, Point::new([0.0, 0.0]))
///     .with(Quadrant::SE, Point::new([2.0, 0.0]))
///     .with(Quadrant::NE, Point::new([2.0, 1.0]))
///     .with(Quadrant::NW, Point::new([0.0, 1.0]));
/// assert_eq!(corners, CornerSet::from_rectangle(Rectangle::new(0.0, 2.0, 0.0, 1.0)));
///
/// let incomplete = CornerSet::new().with(Quadrant::SW, Point::new([0.0, 0.0]));
/// assert!(Forest::new(&[incomplete]).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerSet {
    corners: [Option<Point>; 4],
}

impl CornerSet {
    /// An empty corner set.
    #[must_use]
    pub const fn new() -> Self {
        Self { corners: [None; 4] }
    }

    /// The four corners of `rectangle`.
    #[must_use]
    pub fn from_rectangle(rectangle: Rectangle) -> Self {
        let mut set = Self::new();
        for q in Quadrant::ALL {
            set.insert(q, corner_of(&rectangle, q));
        }
        set
    }

    /// Sets corner `quadrant`, returning the updated set.
    #[must_use]
    pub const fn with(mut self, quadrant: Quadrant, point: Point) -> Self {
        self.corners[quadrant.index()] = Some(point);
        self
    }

    /// Sets corner `quadrant`, returning the previous point if any.
    pub fn insert(&mut self, quadrant: Quadrant, point: Point) -> Option<Point> {
        self.corners[quadrant.index()].replace(point)
    }

    /// The point at corner `quadrant`, if set.
    #[must_use]
    pub const fn get(&self, quadrant: Quadrant) -> Option<Point> {
        self.corners[quadrant.index()]
    }

    /// Checks that all four corners are present and span a non-degenerate rectangle.
    ///
    /// Returns the bounding rectangle and the corners in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedGeometry`] if a corner is missing or
    /// non-finite, if the rectangle is degenerate, or if a corner does not sit on the
    /// matching corner of the bounding rectangle (within `tolerance`).
    pub fn resolve(&self, tolerance: f64) -> Result<(Rectangle, [Point; 4]), ForestError> {
        let mut points = [Point::default(); 4];
        for q in Quadrant::ALL {
            let point = self.get(q).ok_or_else(|| ForestError::MalformedGeometry {
                message: format!("missing {q} corner"),
            })?;
            if !point.is_finite() {
                return Err(ForestError::MalformedGeometry {
                    message: format!("{q} corner {point} is not finite"),
                });
            }
            points[q.index()] = point;
        }

        let rectangle =
            Rectangle::bounding(points).ok_or_else(|| ForestError::MalformedGeometry {
                message: "corner set is empty".to_string(),
            })?;
        if !rectangle.is_non_degenerate() {
            return Err(ForestError::MalformedGeometry {
                message: format!("corners span a degenerate rectangle {rectangle}"),
            });
        }
        // Thinner than the tolerance, the registry would merge opposite corners.
        if rectangle.width() <= tolerance || rectangle.height() <= tolerance {
            return Err(ForestError::MalformedGeometry {
                message: format!(
                    "rectangle {rectangle} is not wider and taller than the tolerance {tolerance}"
                ),
            });
        }

        for q in Quadrant::ALL {
            let expected = corner_of(&rectangle, q);
            if !points[q.index()].approx_eq(&expected, tolerance) {
                return Err(ForestError::MalformedGeometry {
                    message: format!(
                        "{q} corner {} does not match {expected} of the bounding rectangle",
                        points[q.index()]
                    ),
                });
            }
        }

        Ok((rectangle, points))
    }
}

impl From<Rectangle> for CornerSet {
    fn from(rectangle: Rectangle) -> Self {
        Self::from_rectangle(rectangle)
    }
}

impl FromIterator<(Quadrant, Point)> for CornerSet {
    fn from_iter<I: IntoIterator<Item = (Quadrant, Point)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (q, p) in iter {
            set.insert(q, p);
        }
        set
    }
}

/// Corner `quadrant` of `rectangle`.
pub(crate) fn corner_of(rectangle: &Rectangle, quadrant: Quadrant) -> Point {
    let (col, row) = quadrant.offset();
    let x = if col == 0 { rectangle.x0 } else { rectangle.x1 };
    let y = if row == 0 { rectangle.y0 } else { rectangle.y1 };
    Point::new([x, y])
}

// =============================================================================
// CELL STRUCT DEFINITION
// =============================================================================

/// A node of a quadtree.
///
/// # Properties
///
/// - **`kind`**: [`CellKind::Root`] for depth 0, otherwise `Branch` or `Leaf`
/// - **`parent`** / **`position`**: `None` exactly for roots
/// - **`children`**: indexed by [`Quadrant::index`]; all `None` or all `Some`
/// - **`corners`**: indexed by [`Quadrant::index`]
/// - **`midpoints`** / **`center`**: populated exactly while the cell has children
/// - **`edges`**: indexed by [`Direction::index`]
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) kind: CellKind,
    pub(crate) parent: Option<CellKey>,
    pub(crate) position: Option<Quadrant>,
    pub(crate) children: [Option<CellKey>; 4],
    pub(crate) corners: [VertexKey; 4],
    pub(crate) midpoints: [Option<VertexKey>; 4],
    pub(crate) center: Option<VertexKey>,
    pub(crate) rectangle: Rectangle,
    pub(crate) depth: u32,
    pub(crate) flag: bool,
    pub(crate) edges: [Edge; 4],
}

impl Cell {
    /// Builds a childless cell stored under `key`.
    ///
    /// A cell without a parent is a root at depth 0; any other cell is a leaf.
    pub(crate) fn new(
        key: CellKey,
        parent: Option<(CellKey, Quadrant, u32)>,
        corners: [VertexKey; 4],
        rectangle: Rectangle,
    ) -> Self {
        let (kind, parent_key, position, depth) = match parent {
            None => (CellKind::Root, None, None, 0),
            Some((parent_key, position, parent_depth)) => (
                CellKind::Leaf,
                Some(parent_key),
                Some(position),
                parent_depth + 1,
            ),
        };

        let edges = Direction::ALL.map(|d| {
            let (start, end) = d.endpoints();
            Edge::new(corners[start.index()], corners[end.index()], key, d)
        });

        Self {
            kind,
            parent: parent_key,
            position,
            children: [None; 4],
            corners,
            midpoints: [None; 4],
            center: None,
            rectangle,
            depth,
            flag: false,
            edges,
        }
    }

    /// Classification of this cell.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Parent cell, `None` for roots.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<CellKey> {
        self.parent
    }

    /// Which child of its parent this cell is, `None` for roots.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Option<Quadrant> {
        self.position
    }

    /// Children in storage order (see [`Quadrant::index`]).
    #[inline]
    #[must_use]
    pub const fn children(&self) -> &[Option<CellKey>; 4] {
        &self.children
    }

    /// The child in `quadrant`, if refined.
    #[inline]
    #[must_use]
    pub const fn child(&self, quadrant: Quadrant) -> Option<CellKey> {
        self.children[quadrant.index()]
    }

    /// The vertex at corner `quadrant`.
    #[inline]
    #[must_use]
    pub const fn corner(&self, quadrant: Quadrant) -> VertexKey {
        self.corners[quadrant.index()]
    }

    /// Corner vertices in counterclockwise order starting at the south-west.
    #[must_use]
    pub fn corners(&self) -> [VertexKey; 4] {
        Quadrant::COUNTERCLOCKWISE.map(|q| self.corner(q))
    }

    /// The midpoint vertex of side `direction`, present while the cell has children.
    #[inline]
    #[must_use]
    pub const fn midpoint(&self, direction: Direction) -> Option<VertexKey> {
        self.midpoints[direction.index()]
    }

    /// The center vertex, present while the cell has children.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Option<VertexKey> {
        self.center
    }

    /// Axis-aligned bounding rectangle.
    #[inline]
    #[must_use]
    pub const fn rectangle(&self) -> &Rectangle {
        &self.rectangle
    }

    /// Distance from the root (roots have depth 0).
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns `true` if the cell is marked for adaptation.
    #[inline]
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.flag
    }

    /// The edge on side `direction`.
    #[inline]
    #[must_use]
    pub const fn edge(&self, direction: Direction) -> &Edge {
        &self.edges[direction.index()]
    }

    /// All four edges in storage order (see [`Direction::index`]).
    #[inline]
    #[must_use]
    pub const fn edges(&self) -> &[Edge; 4] {
        &self.edges
    }

    /// Returns `true` if the cell has no children. Unrefined roots are leaves.
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Returns `true` for depth-0 cells.
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self.kind, CellKind::Root)
    }

    /// Iterator over the existing children in counterclockwise order.
    pub fn child_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        Quadrant::COUNTERCLOCKWISE
            .into_iter()
            .filter_map(|q| self.child(q))
    }
}
