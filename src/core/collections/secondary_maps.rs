use crate::core::forest::{CellKey, VertexKey};
use slotmap::SparseSecondaryMap;

// =============================================================================
// SLOTMAP SECONDARY MAPS FOR AUXILIARY DATA
// =============================================================================

/// Sparse secondary map associating auxiliary data with cells.
///
/// Only cells that carry data take up space. Used by validation and batch
/// adaptation to tag cells without touching the cell arena.
pub type CellSecondaryMap<V> = SparseSecondaryMap<CellKey, V>;

/// Sparse secondary map associating auxiliary data with vertices.
///
/// The vertex registry stores its reference counts in one of these.
///
/// # Examples
///
/// ```rust
/// use quadforest::prelude::*;
/// use quadforest::core::collections::VertexSecondaryMap;
///
/// let forest = Forest::new(&[CornerSet::from_rectangle(Rectangle::new(0.0, 1.0, 0.0, 1.0))]).unwrap();
/// let mut visited: VertexSecondaryMap<bool> = VertexSecondaryMap::new();
/// for (vertex_key, _) in forest.vertices() {
///     visited.insert(vertex_key, true);
/// }
/// assert_eq!(visited.len(), 4);
/// ```
pub type VertexSecondaryMap<V> = SparseSecondaryMap<VertexKey, V>;
