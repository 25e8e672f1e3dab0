//! Oriented cell edges.
//!
//! Every cell owns four [`Edge`]s, one per side, oriented counterclockwise around the
//! cell (`S: SW→SE`, `E: SE→NE`, `N: NE→NW`, `W: NW→SW`). An edge refers to its
//! endpoints and its owner by key only: it neither owns the shared vertices nor keeps
//! the owning cell alive. When the owner is coarsened away the edge goes with it.

use crate::core::forest::{CellKey, VertexKey};
use crate::core::quadrant::Direction;

/// An oriented boundary segment of a cell.
///
/// # Examples
///
/// ```rust
/// use quadforest::prelude::*;
///
/// let forest = Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
/// let root = forest.roots()[0];
/// let south = forest.cell(root).unwrap().edge(Direction::S);
///
/// assert_eq!(south.owner(), root);
/// assert_eq!(forest.vertex(south.start()).unwrap().coords(), &[0.0, 0.0]);
/// assert_eq!(forest.vertex(south.end()).unwrap().coords(), &[1.0, 0.0]);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    endpoints: (VertexKey, VertexKey),
    owner: CellKey,
    direction: Direction,
}

impl Edge {
    /// Creates the edge on side `direction` of cell `owner`, running from `start` to
    /// `end`.
    #[inline]
    #[must_use]
    pub const fn new(start: VertexKey, end: VertexKey, owner: CellKey, direction: Direction) -> Self {
        Self {
            endpoints: (start, end),
            owner,
            direction,
        }
    }

    /// Both endpoints, in orientation order.
    #[inline]
    #[must_use]
    pub const fn endpoints(&self) -> (VertexKey, VertexKey) {
        self.endpoints
    }

    /// The first endpoint.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> VertexKey {
        self.endpoints.0
    }

    /// The second endpoint.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> VertexKey {
        self.endpoints.1
    }

    /// Key of the cell this edge bounds.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> CellKey {
        self.owner
    }

    /// The side of the owner this edge lies on.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if `self` and `other` join the same two vertices, in either
    /// orientation.
    #[inline]
    #[must_use]
    pub fn same_segment(&self, other: &Self) -> bool {
        self.endpoints == other.endpoints
            || (self.endpoints.0 == other.endpoints.1 && self.endpoints.1 == other.endpoints.0)
    }
}
