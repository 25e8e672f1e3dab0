//! Point location.
//!
//! Descends from a cell to the leaf containing a query point, trying children in
//! counterclockwise order from the south-west and taking the first that contains the
//! point. Cost is O(depth).
//!
//! # Containment convention
//!
//! Cells are half-open, `x0 <= x < x1` and `y0 <= y < y1`, so a point on an interior
//! edge belongs to exactly one cell. Sides lying on the maximum x or maximum y of the
//! forest bounds are closed so that the outer boundary is covered too.

use crate::core::forest::{CellKey, Forest, ForestError};
use crate::core::quadrant::Quadrant;
use crate::geometry::point::Point;

/// Returns `true` if `point` lies in cell `key` under the half-open convention.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`] for a stale key.
pub fn contains_point(forest: &Forest, key: CellKey, point: &Point) -> Result<bool, ForestError> {
    let rectangle = forest.cell_or_err(key)?.rectangle();
    let bounds = forest.bounds();
    let tolerance = forest.config().tolerance();
    let close_x = (rectangle.x1 - bounds.x1).abs() <= tolerance;
    let close_y = (rectangle.y1 - bounds.y1).abs() <= tolerance;
    Ok(rectangle.contains_half_open(point, close_x, close_y))
}

/// The leaf at or below `key` containing `point`.
///
/// Returns `Ok(None)` if `key` itself does not contain the point.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`] for a stale key, and
/// [`ForestError::PointNotFound`] if a cell contains the point but none of its
/// children does.
///
/// # Examples
///
/// ```rust
/// use quadforest::prelude::*;
///
/// let mut forest =
///     Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
/// let root = forest.roots()[0];
/// let children = forest.refine(root).unwrap();
///
/// let hit = forest.locate_point(root, &Point::new([0.75, 0.25])).unwrap();
/// assert_eq!(hit, Some(children[Quadrant::SE.index()]));
///
/// // The shared center belongs to the north-east child.
/// let center = forest.locate_point(root, &Point::new([0.5, 0.5])).unwrap();
/// assert_eq!(center, Some(children[Quadrant::NE.index()]));
///
/// assert_eq!(forest.locate_point(root, &Point::new([2.0, 0.5])).unwrap(), None);
/// ```
pub fn locate_point(
    forest: &Forest,
    key: CellKey,
    point: &Point,
) -> Result<Option<CellKey>, ForestError> {
    if !contains_point(forest, key, point)? {
        return Ok(None);
    }

    let mut current = key;
    loop {
        let cell = forest.cell_or_err(current)?;
        if cell.is_leaf() {
            return Ok(Some(current));
        }

        let mut next = None;
        for q in Quadrant::COUNTERCLOCKWISE {
            if let Some(child) = cell.child(q)
                && contains_point(forest, child, point)?
            {
                next = Some(child);
                break;
            }
        }

        match next {
            Some(child) => current = child,
            None => {
                tracing::error!(
                    ?current,
                    %point,
                    "point lies in a cell but in none of its children"
                );
                return Err(ForestError::PointNotFound { point: *point });
            }
        }
    }
}

/// The leaf containing `point`, trying roots in construction order.
///
/// # Errors
///
/// As [`locate_point`].
pub fn locate(forest: &Forest, point: &Point) -> Result<Option<CellKey>, ForestError> {
    for &root in forest.roots() {
        if let Some(leaf) = locate_point(forest, root, point)? {
            return Ok(Some(leaf));
        }
    }
    Ok(None)
}
