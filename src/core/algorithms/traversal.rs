//! Tree traversal: leaf enumeration and root lookup.
//!
//! [`Leaves`] walks one or more subtrees depth-first with an explicit stack, yielding
//! leaves in pre-order with children visited counterclockwise from the south-west
//! (`SW, SE, NE, NW`). It holds only a shared borrow of the forest, so it is lazy and
//! can be cloned to restart from the current position.

use crate::core::collections::CellStack;
use crate::core::forest::{CellKey, Forest, ForestError};
use crate::core::quadrant::Quadrant;

/// Lazy iterator over leaf cells.
///
/// Created by [`Forest::find_leaves`] and [`Forest::leaves`].
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
/// let order: Vec<_> = forest.find_leaves(root).collect();
/// let expected: Vec<_> = [Quadrant::SW, Quadrant::SE, Quadrant::NE, Quadrant::NW]
///     .iter()
///     .map(|q| children[q.index()])
///     .collect();
/// assert_eq!(order, expected);
/// ```
#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    forest: &'a Forest,
    stack: CellStack,
}

impl<'a> Leaves<'a> {
    /// Starts a walk over the subtrees rooted at `starts`, in the given order.
    pub(crate) fn new<I>(forest: &'a Forest, starts: I) -> Self
    where
        I: IntoIterator<Item = CellKey>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut stack = CellStack::new();
        stack.extend(starts.into_iter().rev());
        Self { forest, stack }
    }
}

impl Iterator for Leaves<'_> {
    type Item = CellKey;

    fn next(&mut self) -> Option<CellKey> {
        while let Some(key) = self.stack.pop() {
            // Keys removed by coarsening are skipped.
            let Some(cell) = self.forest.cell(key) else {
                continue;
            };
            if cell.is_leaf() {
                return Some(key);
            }
            for q in Quadrant::COUNTERCLOCKWISE.iter().rev() {
                if let Some(child) = cell.child(*q) {
                    self.stack.push(child);
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Leaves<'_> {}

/// Follows parent links from `key` up to its root.
///
/// # Errors
///
/// Returns [`ForestError::CellNotFound`] if `key` or any ancestor is missing.
pub fn find_root(forest: &Forest, key: CellKey) -> Result<CellKey, ForestError> {
    let mut current = key;
    while let Some(parent) = forest.cell_or_err(current)?.parent() {
        current = parent;
    }
    Ok(current)
}
