//! The forest of quadtrees.
//!
//! [`Forest`] owns every cell and vertex of the mesh:
//!
//! - a cell arena addressed by [`CellKey`], holding every live cell of every tree;
//! - the ordered list of root cells;
//! - a vertex arena addressed by [`VertexKey`];
//! - a vertex registry that deduplicates coincident vertices and counts how many
//!   live cells use each one as a corner.
//!
//! Relationships (parent, children, neighbors, edge owners) are expressed as keys into
//! the arenas. A key whose cell was removed by coarsening is detected on use and
//! reported as [`ForestError::CellNotFound`].
//!
//! # Examples
//!
//! ```rust
//! use quadforest::prelude::*;
//!
//! // A 2×1 strip of root cells over [0, 2] × [0, 1].
//! let mut forest = Forest::grid(Rectangle::new(0.0, 2.0, 0.0, 1.0), (2, 1)).unwrap();
//! assert_eq!(forest.number_of_roots(), 2);
//! assert_eq!(forest.number_of_vertices(), 6); // shared corners are deduplicated
//!
//! let (west, east) = (forest.roots()[0], forest.roots()[1]);
//! assert_eq!(forest.find_neighbor(west, Direction::E).unwrap(), Some(east));
//!
//! forest.refine(west).unwrap();
//! assert_eq!(forest.number_of_leaves(), 5);
//! assert!(forest.validate().is_ok());
//! ```

#![forbid(unsafe_code)]

use slotmap::new_key_type;
use thiserror::Error;

use super::algorithms::{locate, neighbors, refinement, traversal::Leaves};
use super::cell::{Cell, CornerSet};
use super::collections::StorageMap;
use super::config::ForestConfig;
use super::edge::Edge;
use super::quadrant::{Direction, Quadrant};
use super::registry::VertexRegistry;
use super::validation::{self, ForestValidationError, ValidationReport};
use super::vertex::Vertex;
use crate::geometry::point::Point;
use crate::geometry::rectangle::Rectangle;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned by forest construction, queries and adaptation.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ForestError {
    /// A direction label outside `{N, S, E, W}`.
    #[error("Invalid direction {found:?}: expected one of N, S, E, W")]
    InvalidDirection {
        /// The rejected input.
        found: String,
    },

    /// A quadrant label outside `{NW, NE, SW, SE}`.
    #[error("Invalid quadrant {found:?}: expected one of NW, NE, SW, SE")]
    InvalidQuadrant {
        /// The rejected input.
        found: String,
    },

    /// Missing or degenerate corners supplied at construction.
    #[error("Malformed cell geometry: {message}")]
    MalformedGeometry {
        /// Description of the defect.
        message: String,
    },

    /// `refine` on a cell that already has children.
    #[error("Cell {cell_key:?} is already refined")]
    AlreadyRefined {
        /// The cell that was asked to refine.
        cell_key: CellKey,
    },

    /// `coarsen` on a cell with at least one non-leaf child.
    #[error("Cannot coarsen cell {cell_key:?}: not all children are leaves")]
    ChildrenNotLeaves {
        /// The cell that was asked to coarsen.
        cell_key: CellKey,
    },

    /// `coarsen` on a cell without children.
    #[error("Cannot coarsen cell {cell_key:?}: it has no children")]
    NotRefined {
        /// The cell that was asked to coarsen.
        cell_key: CellKey,
    },

    /// `refine` would produce a child smaller than the configured minimum size, or no
    /// wider or taller than the vertex tolerance.
    #[error(
        "Cannot refine cell {cell_key:?}: children would be {width} × {height}, below the minimum size {min_cell_size}"
    )]
    BelowMinimumSize {
        /// The cell that was asked to refine.
        cell_key: CellKey,
        /// Width of the would-be children.
        width: f64,
        /// Height of the would-be children.
        height: f64,
        /// The limit that applied: the configured minimum or the tolerance, whichever
        /// is larger.
        min_cell_size: f64,
    },

    /// A stale or foreign cell key.
    #[error("Cell {cell_key:?} not found in forest")]
    CellNotFound {
        /// The key that could not be resolved.
        cell_key: CellKey,
    },

    /// Descent found no child containing a point its parent contains.
    #[error("Point {point} is inside a cell but inside none of its children")]
    PointNotFound {
        /// The query point.
        point: Point,
    },

    /// Inconsistent [`ForestConfig`].
    #[error("Invalid forest configuration: {message}")]
    InvalidConfig {
        /// Description of the inconsistency.
        message: String,
    },
}

// =============================================================================
// KEY TYPES
// =============================================================================

new_key_type! {
    /// Key type for accessing vertices in the forest's vertex arena.
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for accessing cells in the forest's cell arena.
    ///
    /// Keys stay valid until the cell is removed by coarsening.
    pub struct CellKey;
}

// =============================================================================
// FOREST
// =============================================================================

/// A forest of quadtrees over a set of axis-aligned root rectangles.
///
/// # Properties
///
/// - `cells`: every live cell (roots, branches and leaves) of every tree
/// - `vertices`: every live vertex; coincident vertices are shared, never duplicated
/// - `roots`: root cells in construction order
/// - `bounds`: union of the root rectangles
#[derive(Clone, Debug)]
pub struct Forest {
    pub(crate) cells: StorageMap<CellKey, Cell>,
    pub(crate) vertices: StorageMap<VertexKey, Vertex>,
    pub(crate) registry: VertexRegistry,
    pub(crate) roots: Vec<CellKey>,
    bounds: Rectangle,
    config: ForestConfig,
}

impl Forest {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Builds a forest with one unrefined root per corner set, using the default
    /// configuration.
    ///
    /// Corners shared by adjacent roots are registered once, so adjacent roots share
    /// vertex keys.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedGeometry`] if `corner_sets` is empty or any set
    /// is missing a corner or does not span a non-degenerate rectangle.
    pub fn new(corner_sets: &[CornerSet]) -> Result<Self, ForestError> {
        Self::with_config(corner_sets, ForestConfig::default())
    }

    /// Builds a forest with an explicit configuration.
    ///
    /// # Errors
    ///
    /// As [`Forest::new`], plus [`ForestError::InvalidConfig`] for an inconsistent
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::prelude::*;
    ///
    /// let config = ForestConfigBuilder::default().min_cell_size(0.3).build().unwrap();
    /// let mut forest = Forest::with_config(
    ///     &[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))],
    ///     config,
    /// )
    /// .unwrap();
    ///
    /// let children = forest.refine(forest.roots()[0]).unwrap();
    /// assert!(matches!(
    ///     forest.refine(children[0]),
    ///     Err(ForestError::BelowMinimumSize { .. })
    /// ));
    /// ```
    pub fn with_config(corner_sets: &[CornerSet], config: ForestConfig) -> Result<Self, ForestError> {
        config.validate()?;

        let resolved = corner_sets
            .iter()
            .map(|set| set.resolve(config.tolerance()))
            .collect::<Result<Vec<_>, _>>()?;

        let bounds = resolved
            .iter()
            .map(|(rectangle, _)| *rectangle)
            .reduce(|acc, r| acc.union(&r))
            .ok_or_else(|| ForestError::MalformedGeometry {
                message: "a forest needs at least one root cell".to_string(),
            })?;

        let mut forest = Self {
            cells: StorageMap::with_capacity_and_key(resolved.len()),
            vertices: StorageMap::with_key(),
            registry: VertexRegistry::new(&config),
            roots: Vec::with_capacity(resolved.len()),
            bounds,
            config,
        };

        for (rectangle, points) in resolved {
            let corners = points.map(|p| forest.registry.resolve(&mut forest.vertices, p));
            let root = forest.insert_cell(None, corners, rectangle);
            forest.roots.push(root);
        }

        tracing::debug!(
            roots = forest.roots.len(),
            vertices = forest.vertices.len(),
            "constructed forest"
        );
        Ok(forest)
    }

    /// Builds an `nx × ny` grid of equal root cells covering `bounds`.
    ///
    /// Roots are ordered row by row from the south-west corner: root `j * nx + i`
    /// covers column `i`, row `j`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedGeometry`] for a zero resolution or a
    /// degenerate `bounds`.
    pub fn grid(bounds: Rectangle, resolution: (usize, usize)) -> Result<Self, ForestError> {
        Self::grid_with_config(bounds, resolution, ForestConfig::default())
    }

    /// [`Forest::grid`] with an explicit configuration.
    ///
    /// # Errors
    ///
    /// As [`Forest::grid`] and [`Forest::with_config`].
    pub fn grid_with_config(
        bounds: Rectangle,
        resolution: (usize, usize),
        config: ForestConfig,
    ) -> Result<Self, ForestError> {
        let (nx, ny) = resolution;
        if nx == 0 || ny == 0 {
            return Err(ForestError::MalformedGeometry {
                message: format!("grid resolution must be positive, got {nx} × {ny}"),
            });
        }
        if !bounds.is_non_degenerate() {
            return Err(ForestError::MalformedGeometry {
                message: format!("grid bounds {bounds} are degenerate"),
            });
        }

        let xs = subdivide(bounds.x0, bounds.x1, nx);
        let ys = subdivide(bounds.y0, bounds.y1, ny);
        let mut corner_sets = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                corner_sets.push(CornerSet::from_rectangle(Rectangle::new(
                    xs[i],
                    xs[i + 1],
                    ys[j],
                    ys[j + 1],
                )));
            }
        }

        Self::with_config(&corner_sets, config)
    }

    /// Inserts a childless cell and takes a corner reference on each corner.
    pub(crate) fn insert_cell(
        &mut self,
        parent: Option<(CellKey, Quadrant, u32)>,
        corners: [VertexKey; 4],
        rectangle: Rectangle,
    ) -> CellKey {
        for &corner in &corners {
            self.registry.retain(corner);
        }
        self.cells
            .insert_with_key(|key| Cell::new(key, parent, corners, rectangle))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Root cells in construction order.
    #[must_use]
    pub fn roots(&self) -> &[CellKey] {
        &self.roots
    }

    /// The cell stored under `key`, if live.
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// The vertex stored under `key`, if live.
    #[must_use]
    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex> {
        self.vertices.get(key)
    }

    /// The cell stored under `key`, or [`ForestError::CellNotFound`].
    pub(crate) fn cell_or_err(&self, key: CellKey) -> Result<&Cell, ForestError> {
        self.cells
            .get(key)
            .ok_or(ForestError::CellNotFound { cell_key: key })
    }

    pub(crate) fn cell_mut_or_err(&mut self, key: CellKey) -> Result<&mut Cell, ForestError> {
        self.cells
            .get_mut(key)
            .ok_or(ForestError::CellNotFound { cell_key: key })
    }

    /// Iterator over every live cell.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cells.iter()
    }

    /// Iterator over every live vertex.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> {
        self.vertices.iter()
    }

    /// Number of live cells (all levels).
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of leaf cells.
    #[must_use]
    pub fn number_of_leaves(&self) -> usize {
        self.cells.values().filter(|c| c.is_leaf()).count()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of root cells.
    #[must_use]
    pub fn number_of_roots(&self) -> usize {
        self.roots.len()
    }

    /// Union of the root rectangles.
    #[must_use]
    pub const fn bounds(&self) -> &Rectangle {
        &self.bounds
    }

    /// The configuration this forest was built with.
    #[must_use]
    pub const fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Depth of the deepest cell.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.cells.values().map(Cell::depth).max().unwrap_or(0)
    }

    /// Number of live cells using `key` as a corner.
    #[must_use]
    pub fn vertex_references(&self, key: VertexKey) -> u32 {
        self.registry.refcount(key)
    }

    // -------------------------------------------------------------------------
    // Marking
    // -------------------------------------------------------------------------

    /// Sets the adaptation flag of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key.
    pub fn mark(&mut self, key: CellKey) -> Result<(), ForestError> {
        self.cell_mut_or_err(key)?.flag = true;
        Ok(())
    }

    /// Clears the adaptation flag of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key.
    pub fn unmark(&mut self, key: CellKey) -> Result<(), ForestError> {
        self.cell_mut_or_err(key)?.flag = false;
        Ok(())
    }

    /// Marks every leaf for which `predicate` holds and returns how many matched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::prelude::*;
    ///
    /// let mut forest = Forest::grid(Rectangle::new(0.0, 4.0, 0.0, 1.0), (4, 1)).unwrap();
    /// let marked = forest.mark_where(|cell| cell.rectangle().center().x() < 2.0);
    /// assert_eq!(marked, 2);
    /// assert_eq!(forest.refine_marked().unwrap(), 2);
    /// assert_eq!(forest.number_of_leaves(), 10);
    /// ```
    pub fn mark_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Cell) -> bool,
    {
        let selected: Vec<CellKey> = self
            .leaves()
            .filter(|&key| self.cells.get(key).is_some_and(&mut predicate))
            .collect();
        for &key in &selected {
            if let Some(cell) = self.cells.get_mut(key) {
                cell.flag = true;
            }
        }
        selected.len()
    }

    /// Keys of every marked cell.
    pub fn marked_cells(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells
            .iter()
            .filter_map(|(key, cell)| cell.is_marked().then_some(key))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The neighbor of `key` across side `direction`, at the same depth or shallower.
    ///
    /// Returns `Ok(None)` on the boundary of the forest.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key.
    pub fn find_neighbor(
        &self,
        key: CellKey,
        direction: Direction,
    ) -> Result<Option<CellKey>, ForestError> {
        neighbors::find_neighbor(self, key, direction)
    }

    /// Lazy pre-order iterator over the leaves below `key` (or `key` itself if it is a
    /// leaf), visiting children in counterclockwise order from the south-west.
    ///
    /// A stale key yields an empty iterator.
    #[must_use]
    pub fn find_leaves(&self, key: CellKey) -> Leaves<'_> {
        Leaves::new(self, std::iter::once(key))
    }

    /// Lazy iterator over every leaf of every tree, roots in construction order.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self, self.roots.iter().copied())
    }

    /// The root of the tree containing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key.
    pub fn find_root(&self, key: CellKey) -> Result<CellKey, ForestError> {
        super::algorithms::traversal::find_root(self, key)
    }

    /// Returns `true` if `point` lies in cell `key`.
    ///
    /// Cells are half-open (`x0 <= x < x1`, `y0 <= y < y1`) except on sides lying on
    /// the maximum x or y of [`Forest::bounds`], which are closed.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key.
    pub fn contains_point(&self, key: CellKey, point: &Point) -> Result<bool, ForestError> {
        locate::contains_point(self, key, point)
    }

    /// The leaf below `key` containing `point`, or `None` if `key` does not contain it.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::CellNotFound`] for a stale key and
    /// [`ForestError::PointNotFound`] if no child of a containing cell contains the
    /// point.
    pub fn locate_point(&self, key: CellKey, point: &Point) -> Result<Option<CellKey>, ForestError> {
        locate::locate_point(self, key, point)
    }

    /// The leaf containing `point`, searching every root.
    ///
    /// # Errors
    ///
    /// As [`Forest::locate_point`].
    pub fn locate(&self, point: &Point) -> Result<Option<CellKey>, ForestError> {
        locate::locate(self, point)
    }

    /// Edges of leaves that have no neighbor across that side.
    pub fn boundary_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.leaves()
            .filter_map(move |key| self.cells.get(key).map(|cell| (key, cell)))
            .flat_map(move |(key, cell)| {
                // `leaves()` yields live keys only, so the lookup cannot fail.
                cell.edges()
                    .iter()
                    .filter(move |edge| {
                        self.find_neighbor(key, edge.direction())
                            .ok()
                            .flatten()
                            .is_none()
                    })
            })
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    /// Splits leaf `key` into four children and returns them in storage order
    /// (index with [`Quadrant::index`]).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::AlreadyRefined`] if `key` has children,
    /// [`ForestError::BelowMinimumSize`] if the children would be smaller than the
    /// configured minimum, and [`ForestError::CellNotFound`] for a stale key.
    pub fn refine(&mut self, key: CellKey) -> Result<[CellKey; 4], ForestError> {
        refinement::refine(self, key)
    }

    /// Removes the four leaf children of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::NotRefined`] if `key` has no children,
    /// [`ForestError::ChildrenNotLeaves`] if a child has children of its own, and
    /// [`ForestError::CellNotFound`] for a stale key.
    pub fn coarsen(&mut self, key: CellKey) -> Result<(), ForestError> {
        refinement::coarsen(self, key)
    }

    /// Refines every marked leaf, clearing its mark. Returns the number refined.
    ///
    /// # Errors
    ///
    /// Stops at the first failing [`Forest::refine`]; cells refined before the
    /// failure stay refined.
    pub fn refine_marked(&mut self) -> Result<usize, ForestError> {
        refinement::refine_marked(self)
    }

    /// Coarsens every cell whose four children are marked leaves. Returns the number
    /// coarsened.
    ///
    /// # Errors
    ///
    /// Stops at the first failing [`Forest::coarsen`].
    pub fn coarsen_marked(&mut self) -> Result<usize, ForestError> {
        refinement::coarsen_marked(self)
    }

    /// Numbers every live vertex in order of first appearance over
    /// [`Forest::leaves`] (corners SW, SE, NE, NW of each leaf) and returns the number
    /// of indices assigned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::prelude::*;
    ///
    /// let mut forest = Forest::grid(Rectangle::new(0.0, 2.0, 0.0, 1.0), (2, 1)).unwrap();
    /// assert_eq!(forest.assign_global_indices(), 6);
    ///
    /// let first = forest.cell(forest.roots()[0]).unwrap();
    /// let sw = forest.vertex(first.corner(Quadrant::SW)).unwrap();
    /// assert_eq!(sw.global_index(), Some(0));
    /// ```
    pub fn assign_global_indices(&mut self) -> u32 {
        for vertex in self.vertices.values_mut() {
            vertex.set_global_index(None);
        }

        let order: Vec<VertexKey> = self
            .leaves()
            .filter_map(|key| self.cells.get(key))
            .flat_map(Cell::corners)
            .collect();

        let mut next = 0_u32;
        let mut number = |vertex: &mut Vertex| {
            if vertex.global_index().is_none() {
                vertex.set_global_index(Some(next));
                next += 1;
            }
        };
        for key in order {
            if let Some(vertex) = self.vertices.get_mut(key) {
                number(vertex);
            }
        }
        // Every live vertex is a leaf corner; this only catches a broken registry.
        for vertex in self.vertices.values_mut() {
            number(vertex);
        }

        tracing::debug!(count = next, "assigned global vertex indices");
        next
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Checks every structural invariant and returns the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ForestValidationError`] found.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        validation::validate(self)
    }

    /// Checks every structural invariant and reports all violations.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationReport`] listing every violation found.
    pub fn validation_report(&self) -> Result<(), ValidationReport> {
        validation::validation_report(self)
    }
}

/// `n + 1` evenly spaced breakpoints from `lo` to `hi`, with both ends exact.
#[expect(
    clippy::cast_precision_loss,
    reason = "grid resolutions are far below 2^52"
)]
fn subdivide(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..=n)
        .map(|i| {
            if i == n {
                hi
            } else {
                lo + (hi - lo) * (i as f64) / (n as f64)
            }
        })
        .collect()
}
