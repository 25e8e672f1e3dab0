//! # quadforest
//!
//! A forest of quadtrees: the hierarchical, axis-aligned rectangular mesh underlying
//! adaptive finite-element discretizations.
//!
//! A [`Forest`](core::forest::Forest) is built from one or more root rectangles (or a
//! regular grid of them). Each root is the top of a quadtree whose leaves form the
//! active mesh. Leaves can be refined into four children and sibling leaves coarsened
//! back into their parent; coincident vertices are shared across cells and trees.
//!
//! # Features
//!
//! - Refinement and coarsening, individually or for all marked cells
//! - Cross-level neighbor finding in O(depth)
//! - Point location with a half-open containment convention
//! - Lazy, restartable leaf enumeration
//! - Vertex deduplication with reference counting and global vertex numbering
//! - Structural validation with per-invariant reports
//!
//! # Basic Usage
//!
//! ```rust
//! use quadforest::prelude::*;
//!
//! // Unit square, refined once.
//! let mut forest =
//!     Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
//! let root = forest.roots()[0];
//! let children = forest.refine(root).unwrap();
//! let [nw, _ne, sw, se] = children;
//!
//! assert_eq!(forest.number_of_leaves(), 4);
//! assert_eq!(forest.number_of_vertices(), 9);
//!
//! // Neighbors across sides.
//! assert_eq!(forest.find_neighbor(sw, Direction::E).unwrap(), Some(se));
//! assert_eq!(forest.find_neighbor(sw, Direction::N).unwrap(), Some(nw));
//! assert_eq!(forest.find_neighbor(sw, Direction::S).unwrap(), None);
//!
//! // Point location.
//! assert_eq!(forest.locate(&Point::new([0.25, 0.25])).unwrap(), Some(sw));
//!
//! // Undo the refinement.
//! forest.coarsen(root).unwrap();
//! assert_eq!(forest.number_of_vertices(), 4);
//! ```
//!
//! # Adaptive Loops
//!
//! Marking cells and adapting in batches:
//!
//! ```rust
//! use quadforest::prelude::*;
//!
//! let mut forest = Forest::grid(Rectangle::new(0.0, 1.0, 0.0, 1.0), (4, 4)).unwrap();
//!
//! // Refine twice towards the origin.
//! for _ in 0..2 {
//!     forest.mark_where(|cell| cell.rectangle().contains_closed(&Point::new([0.0, 0.0])));
//!     forest.refine_marked().unwrap();
//! }
//! assert_eq!(forest.max_depth(), 2);
//! assert!(forest.validate().is_ok());
//!
//! // Number the vertices for an external DOF map.
//! let count = forest.assign_global_indices();
//! assert_eq!(count as usize, forest.number_of_vertices());
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`ForestError`](core::forest::ForestError). Structural
//! checks return [`ForestValidationError`](core::validation::ForestValidationError) or a
//! [`ValidationReport`](core::validation::ValidationReport).
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (`debug` for adaptation,
//! `trace` for neighbor searches, `warn`/`error` for broken invariants) and never
//! installs a subscriber.

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Mesh data structures and algorithms: the forest, its cells, edges and vertices,
/// configuration and validation.
pub mod core {
    /// Forest algorithms: traversal, neighbor finding, point location, adaptation.
    pub mod algorithms {
        pub mod locate;
        pub mod neighbors;
        pub mod refinement;
        pub mod traversal;
    }
    pub mod cell;
    pub mod collections;
    pub mod config;
    pub mod edge;
    pub mod forest;
    pub mod quadrant;
    pub(crate) mod registry;
    pub mod validation;
    pub mod vertex;

    pub use algorithms::traversal::Leaves;
    pub use cell::*;
    pub use config::*;
    pub use edge::*;
    pub use forest::*;
    pub use quadrant::*;
    pub use validation::{
        ForestValidationError, InvariantKind, InvariantViolation, ValidationReport,
    };
    pub use vertex::*;
}

/// Geometric value types.
pub mod geometry {
    pub mod point;
    pub mod rectangle;

    pub use point::*;
    pub use rectangle::*;
}

/// A prelude module that re-exports commonly used types and macros.
pub mod prelude {
    pub use crate::core::{
        Leaves,
        cell::*,
        config::*,
        edge::*,
        forest::*,
        quadrant::*,
        validation::{ForestValidationError, InvariantKind, InvariantViolation, ValidationReport},
        vertex::*,
    };

    pub use crate::core::collections::{
        CellSecondaryMap, FastHashMap, FastHashSet, VertexSecondaryMap,
        fast_hash_map_with_capacity, fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{point::*, rectangle::*};

    pub use crate::vertex;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{
        core::{
            cell::{Cell, CornerSet},
            edge::Edge,
            forest::Forest,
            vertex::Vertex,
        },
        geometry::{Point, Rectangle},
        is_normal,
    };

    #[test]
    fn normal_types() {
        assert!(is_normal::<Point>());
        assert!(is_normal::<Rectangle>());
        assert!(is_normal::<Vertex>());
        assert!(is_normal::<Edge>());
        assert!(is_normal::<Cell>());
        assert!(is_normal::<CornerSet>());
        assert!(is_normal::<Forest>());
    }

    #[test]
    fn test_prelude_exports() {
        use crate::prelude::*;

        let mut forest = Forest::grid(Rectangle::new(0.0, 1.0, 0.0, 1.0), (1, 1)).unwrap();
        let root = forest.roots()[0];
        forest.refine(root).unwrap();

        let mut depths: CellSecondaryMap<u32> = CellSecondaryMap::new();
        for (key, cell) in forest.cells() {
            depths.insert(key, cell.depth());
        }
        assert_eq!(depths.len(), 5);

        let mut seen: FastHashSet<VertexKey> = fast_hash_set_with_capacity(9);
        for leaf in forest.leaves() {
            seen.extend(forest.cell(leaf).unwrap().corners());
        }
        assert_eq!(seen.len(), 9);

        let v: Vertex = vertex!([0.5, 0.5]);
        assert_eq!(v.point(), &Point::new([0.5, 0.5]));
        assert_eq!("N".parse::<Direction>(), Ok(Direction::N));
        assert!(matches!(
            "X".parse::<Direction>(),
            Err(ForestError::InvalidDirection { .. })
        ));
    }
}
