//! Collection types used by the forest.
//!
//! - [`StorageMap`]: slotmap-backed arena for cells and vertices
//! - [`FastHashMap`] / [`FastHashSet`]: `FxHasher`-backed maps for internal keys
//! - [`SmallBuffer`]: inline-first vectors for traversal stacks and batch buffers
//! - [`CellSecondaryMap`] / [`VertexSecondaryMap`]: sparse per-key side tables
//! - `HashGridIndex`: spatial hash used by the vertex registry

mod aliases;
mod secondary_maps;
pub(in crate::core) mod spatial_hash_grid;

pub use aliases::*;
pub use secondary_maps::*;
