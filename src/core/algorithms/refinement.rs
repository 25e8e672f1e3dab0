//! Refinement and coarsening.
//!
//! Refining a leaf splits it into four equal children. The nine vertices of the 2×2
//! subdivision are laid out as a 3×3 grid indexed `[column][row]` from the
//! south-west:
//!
//! ```text
//!   [0][2] --- [1][2] --- [2][2]        NW ---- N ---- NE
//!     |          |          |           |       |       |
//!   [0][1] --- [1][1] --- [2][1]   =    W ---- center -- E
//!     |          |          |           |       |       |
//!   [0][0] --- [1][0] --- [2][0]        SW ---- S ---- SE
//! ```
//!
//! The four outer corners are the parent's own vertices. The four edge midpoints and
//! the center are taken from the registry, so a midpoint already created by a refined
//! neighbor is reused. Each child takes one corner reference per corner.
//!
//! Coarsening removes four leaf children and drops their corner references; a
//! vertex is deleted only when no live cell uses it as a corner any more.

use crate::core::cell::CellKind;
use crate::core::collections::{CellKeyBuffer, FastHashSet};
use crate::core::forest::{CellKey, Forest, ForestError, VertexKey};
use crate::core::quadrant::{Direction, Quadrant};
use crate::geometry::point::Point;
use crate::geometry::rectangle::Rectangle;

/// Splits leaf `key` into four children, returned in storage order.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`], [`ForestError::AlreadyRefined`] or
/// [`ForestError::BelowMinimumSize`] (children below the configured minimum, or no
/// wider or taller than the vertex tolerance); the forest is unchanged on error.
pub fn refine(forest: &mut Forest, key: CellKey) -> Result<[CellKey; 4], ForestError> {
    let cell = forest.cell_or_err(key)?;
    if !cell.is_leaf() {
        return Err(ForestError::AlreadyRefined { cell_key: key });
    }

    let rectangle = *cell.rectangle();
    let depth = cell.depth();
    let (width, height) = (rectangle.width() / 2.0, rectangle.height() / 2.0);
    // Children no wider than the tolerance would get midpoints merged into corners.
    let tolerance = forest.config().tolerance();
    let limit = forest.config().min_cell_size();
    if width <= tolerance
        || height <= tolerance
        || limit.is_some_and(|min| width < min || height < min)
    {
        return Err(ForestError::BelowMinimumSize {
            cell_key: key,
            width,
            height,
            min_cell_size: limit.map_or(tolerance, |min| min.max(tolerance)),
        });
    }

    let center = rectangle.center();
    let xs = [rectangle.x0, center.x(), rectangle.x1];
    let ys = [rectangle.y0, center.y(), rectangle.y1];

    // Parent corners fill the outer slots; the rest come from the registry.
    let mut grid: [[Option<VertexKey>; 3]; 3] = [[None; 3]; 3];
    for q in Quadrant::ALL {
        let (col, row) = q.offset();
        grid[2 * col][2 * row] = Some(cell.corner(q));
    }
    let mut vertex_grid = [[VertexKey::default(); 3]; 3];
    for (col, column) in grid.iter().enumerate() {
        for (row, slot) in column.iter().enumerate() {
            vertex_grid[col][row] = match slot {
                Some(corner) => *corner,
                None => forest
                    .registry
                    .resolve(&mut forest.vertices, Point::new([xs[col], ys[row]])),
            };
        }
    }

    let mut children = [CellKey::default(); 4];
    for q in Quadrant::ALL {
        let (col, row) = q.offset();
        let mut corners = [VertexKey::default(); 4];
        corners[Quadrant::SW.index()] = vertex_grid[col][row];
        corners[Quadrant::SE.index()] = vertex_grid[col + 1][row];
        corners[Quadrant::NE.index()] = vertex_grid[col + 1][row + 1];
        corners[Quadrant::NW.index()] = vertex_grid[col][row + 1];
        let child_rectangle = Rectangle::new(xs[col], xs[col + 1], ys[row], ys[row + 1]);
        children[q.index()] = forest.insert_cell(Some((key, q, depth)), corners, child_rectangle);
    }

    let parent = forest.cell_mut_or_err(key)?;
    parent.children = children.map(Some);
    parent.midpoints[Direction::N.index()] = Some(vertex_grid[1][2]);
    parent.midpoints[Direction::S.index()] = Some(vertex_grid[1][0]);
    parent.midpoints[Direction::E.index()] = Some(vertex_grid[2][1]);
    parent.midpoints[Direction::W.index()] = Some(vertex_grid[0][1]);
    parent.center = Some(vertex_grid[1][1]);
    if parent.kind == CellKind::Leaf {
        parent.kind = CellKind::Branch;
    }

    tracing::debug!(
        ?key,
        depth = depth + 1,
        vertices = forest.number_of_vertices(),
        "refined cell"
    );
    Ok(children)
}

/// Removes the four leaf children of `key`.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`], [`ForestError::NotRefined`] or
/// [`ForestError::ChildrenNotLeaves`]; the forest is unchanged on error.
pub fn coarsen(forest: &mut Forest, key: CellKey) -> Result<(), ForestError> {
    let cell = forest.cell_or_err(key)?;
    if cell.is_leaf() {
        return Err(ForestError::NotRefined { cell_key: key });
    }

    let children: CellKeyBuffer = cell.child_keys().collect();
    for &child in &children {
        if !forest.cell_or_err(child)?.is_leaf() {
            return Err(ForestError::ChildrenNotLeaves { cell_key: key });
        }
    }

    let mut released = 0_usize;
    for child in children {
        if let Some(removed) = forest.cells.remove(child) {
            for corner in removed.corners {
                if forest.registry.release(&mut forest.vertices, corner) {
                    released += 1;
                }
            }
        }
    }

    let parent = forest.cell_mut_or_err(key)?;
    parent.children = [None; 4];
    parent.midpoints = [None; 4];
    parent.center = None;
    if parent.kind == CellKind::Branch {
        parent.kind = CellKind::Leaf;
    }

    tracing::debug!(?key, released, "coarsened cell");
    Ok(())
}

/// Refines every marked leaf and clears its mark. Returns the number refined.
///
/// # Errors
///
/// Propagates the first [`refine`] failure.
pub fn refine_marked(forest: &mut Forest) -> Result<usize, ForestError> {
    let marked: Vec<CellKey> = forest
        .leaves()
        .filter(|&key| forest.cell(key).is_some_and(|c| c.is_marked()))
        .collect();

    for &key in &marked {
        refine(forest, key)?;
        forest.unmark(key)?;
    }

    tracing::debug!(refined = marked.len(), "refined marked cells");
    Ok(marked.len())
}

/// Coarsens every cell whose four children are marked leaves. Returns the number
/// coarsened.
///
/// # Errors
///
/// Propagates the first [`coarsen`] failure.
pub fn coarsen_marked(forest: &mut Forest) -> Result<usize, ForestError> {
    let mut seen: FastHashSet<CellKey> = FastHashSet::default();
    let mut candidates: Vec<CellKey> = Vec::new();
    for leaf in forest.leaves() {
        let Some(cell) = forest.cell(leaf) else {
            continue;
        };
        if let Some(parent) = cell.parent()
            && cell.is_marked()
            && seen.insert(parent)
        {
            candidates.push(parent);
        }
    }

    let mut coarsened = 0;
    for parent in candidates {
        let all_marked_leaves = forest.cell_or_err(parent)?.child_keys().all(|child| {
            forest
                .cell(child)
                .is_some_and(|c| c.is_leaf() && c.is_marked())
        });
        if all_marked_leaves {
            coarsen(forest, parent)?;
            coarsened += 1;
        }
    }

    tracing::debug!(coarsened, "coarsened marked cells");
    Ok(coarsened)
}
