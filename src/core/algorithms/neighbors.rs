//! Cross-level neighbor finding.
//!
//! The neighbor of a cell across a side is the adjacent cell at the same depth, or
//! the shallower leaf covering that side when the other tree is coarser there.
//!
//! # Algorithm
//!
//! 1. A root scans every other root for one sharing the two corner vertices of that
//!    side. Adjacent roots share corner keys because the vertex registry
//!    deduplicates them, so the test is key equality.
//! 2. A child whose neighbor is a sibling answers from its parent
//!    ([`Quadrant::interior_neighbor`]).
//! 3. Otherwise the parent's neighbor `mu` is found recursively. If `mu` is missing
//!    the cell is on the boundary; if `mu` is a leaf it is the answer; else the answer
//!    is `mu`'s child mirrored across the side ([`Quadrant::exterior_neighbor`]).
//!
//! Cost is O(depth) plus one root scan at the top.

use crate::core::cell::Cell;
use crate::core::forest::{CellKey, Forest, ForestError};
use crate::core::quadrant::{Direction, Quadrant};

/// The neighbor of `key` across side `direction`, at the same depth or shallower.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`] if `key` or an ancestor is missing.
///
/// # Examples
///
/// ```rust
/// use quadforest::prelude::*;
///
/// let mut forest =
///     Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
/// let children = forest.refine(forest.roots()[0]).unwrap();
/// let [nw, ne, sw, se] = children;
///
/// assert_eq!(forest.find_neighbor(sw, Direction::E).unwrap(), Some(se));
/// assert_eq!(forest.find_neighbor(sw, Direction::N).unwrap(), Some(nw));
/// assert_eq!(forest.find_neighbor(sw, Direction::S).unwrap(), None);
/// assert_eq!(forest.find_neighbor(ne, Direction::W).unwrap(), Some(nw));
/// ```
pub fn find_neighbor(
    forest: &Forest,
    key: CellKey,
    direction: Direction,
) -> Result<Option<CellKey>, ForestError> {
    let cell = forest.cell_or_err(key)?;

    let (parent_key, position) = match (cell.parent(), cell.position()) {
        (Some(parent_key), Some(position)) => (parent_key, position),
        _ => return Ok(root_neighbor(forest, key, cell, direction)),
    };

    let parent = forest.cell_or_err(parent_key)?;
    if let Some(sibling) = position.interior_neighbor(direction) {
        return Ok(parent.child(sibling));
    }

    let Some(mu_key) = find_neighbor(forest, parent_key, direction)? else {
        tracing::trace!(?key, %direction, "no neighbor: parent is on the boundary");
        return Ok(None);
    };
    let mu = forest.cell_or_err(mu_key)?;
    if mu.is_leaf() {
        tracing::trace!(?key, %direction, ?mu_key, "neighbor is a coarser leaf");
        return Ok(Some(mu_key));
    }

    Ok(position
        .exterior_neighbor(direction)
        .and_then(|mirror| mu.child(mirror)))
}

/// Scans all roots for one sharing side `direction` of root `key`.
///
/// The whole list is scanned; the first match in construction order wins.
fn root_neighbor(forest: &Forest, key: CellKey, cell: &Cell, direction: Direction) -> Option<CellKey> {
    let found = forest.roots().iter().copied().find(|&candidate| {
        candidate != key
            && forest
                .cell(candidate)
                .is_some_and(|other| shares_side(cell, other, direction))
    });
    tracing::trace!(?key, %direction, ?found, "scanned roots for neighbor");
    found
}

/// Returns `true` if `other` sits across side `direction` of `cell`: each corner of
/// `cell` on that side equals the mirrored corner of `other`.
fn shares_side(cell: &Cell, other: &Cell, direction: Direction) -> bool {
    Quadrant::ALL
        .into_iter()
        .filter(|q| q.touches(direction))
        .all(|q| {
            q.exterior_neighbor(direction)
                .is_some_and(|mirror| cell.corner(q) == other.corner(mirror))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::CornerSet;
    use crate::geometry::rectangle::Rectangle;

    fn init_tracing() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        });
    }

    #[test]
    fn unit_square_children_neighbors() {
        init_tracing();
        let mut forest =
            Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
        let children = forest.refine(forest.roots()[0]).unwrap();
        let child = |q: Quadrant| children[q.index()];

        assert_eq!(*forest.cell(child(Quadrant::SW)).unwrap().rectangle(), Rectangle::new(0.0, 0.5, 0.0, 0.5));
        assert_eq!(*forest.cell(child(Quadrant::SE)).unwrap().rectangle(), Rectangle::new(0.5, 1.0, 0.0, 0.5));
        assert_eq!(*forest.cell(child(Quadrant::NE)).unwrap().rectangle(), Rectangle::new(0.5, 1.0, 0.5, 1.0));
        assert_eq!(*forest.cell(child(Quadrant::NW)).unwrap().rectangle(), Rectangle::new(0.0, 0.5, 0.5, 1.0));

        let sw = child(Quadrant::SW);
        assert_eq!(find_neighbor(&forest, sw, Direction::E), Ok(Some(child(Quadrant::SE))));
        assert_eq!(find_neighbor(&forest, sw, Direction::N), Ok(Some(child(Quadrant::NW))));
        assert_eq!(find_neighbor(&forest, sw, Direction::S), Ok(None));
        assert_eq!(find_neighbor(&forest, sw, Direction::W), Ok(None));
    }

    #[test]
    fn root_scan_finds_neighbors_in_every_direction() {
        init_tracing();
        let forest = Forest::grid(Rectangle::new(0.0, 3.0, 0.0, 3.0), (3, 3)).unwrap();
        let roots = forest.roots();
        let center = roots[4];

        assert_eq!(find_neighbor(&forest, center, Direction::N), Ok(Some(roots[7])));
        assert_eq!(find_neighbor(&forest, center, Direction::S), Ok(Some(roots[1])));
        assert_eq!(find_neighbor(&forest, center, Direction::E), Ok(Some(roots[5])));
        assert_eq!(find_neighbor(&forest, center, Direction::W), Ok(Some(roots[3])));

        // Corner root: two sides on the boundary.
        assert_eq!(find_neighbor(&forest, roots[0], Direction::S), Ok(None));
        assert_eq!(find_neighbor(&forest, roots[0], Direction::W), Ok(None));
        // The last root in the list is found from the first row.
        assert_eq!(find_neighbor(&forest, roots[5], Direction::N), Ok(Some(roots[8])));
    }

    #[test]
    fn neighbor_crosses_root_boundary_at_equal_depth() {
        init_tracing();
        let mut forest = Forest::grid(Rectangle::new(0.0, 2.0, 0.0, 1.0), (2, 1)).unwrap();
        let (west, east) = (forest.roots()[0], forest.roots()[1]);
        let west_children = forest.refine(west).unwrap();
        let east_children = forest.refine(east).unwrap();

        let west_se = west_children[Quadrant::SE.index()];
        let east_sw = east_children[Quadrant::SW.index()];
        assert_eq!(find_neighbor(&forest, west_se, Direction::E), Ok(Some(east_sw)));
        assert_eq!(find_neighbor(&forest, east_sw, Direction::W), Ok(Some(west_se)));
    }

    #[test]
    fn neighbor_of_finer_cell_is_coarser_leaf() {
        init_tracing();
        let mut forest = Forest::grid(Rectangle::new(0.0, 2.0, 0.0, 1.0), (2, 1)).unwrap();
        let (west, east) = (forest.roots()[0], forest.roots()[1]);
        let west_children = forest.refine(west).unwrap();
        let ne = west_children[Quadrant::NE.index()];
        let ne_children = forest.refine(ne).unwrap();

        // Depth-2 cell on the east edge of the west root sees the unrefined east root.
        let deep = ne_children[Quadrant::SE.index()];
        assert_eq!(find_neighbor(&forest, deep, Direction::E), Ok(Some(east)));
        // The coarser root sees only a cell at depth <= its own, i.e. not into `west`.
        assert_eq!(find_neighbor(&forest, east, Direction::W), Ok(Some(west)));
        // Interior neighbor inside the refined NE quadrant.
        assert_eq!(
            find_neighbor(&forest, deep, Direction::N),
            Ok(Some(ne_children[Quadrant::NE.index()]))
        );
        // Across the NE child's south side into the unrefined SE child.
        assert_eq!(
            find_neighbor(&forest, deep, Direction::S),
            Ok(Some(west_children[Quadrant::SE.index()]))
        );
    }

    #[test]
    fn stale_key_is_reported() {
        let mut forest =
            Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
        let root = forest.roots()[0];
        let children = forest.refine(root).unwrap();
        forest.coarsen(root).unwrap();
        assert_eq!(
            find_neighbor(&forest, children[0], Direction::N),
            Err(ForestError::CellNotFound {
                cell_key: children[0]
            })
        );
    }

    #[test]
    fn disjoint_roots_are_not_neighbors() {
        let forest = Forest::new(&[
            CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0)),
            CornerSet::from_rectangle(Rectangle::new(1.5, 2.5, 0.0, 1.0)),
        ])
        .unwrap();
        for d in Direction::ALL {
            assert_eq!(find_neighbor(&forest, forest.roots()[0], d), Ok(None));
        }
    }
}
