//! Vertex registry: deduplication and reference counting of shared vertices.
//!
//! Adjacent cells share corner and midpoint vertices. The registry guarantees that a
//! coordinate (within the configured tolerance) maps to at most one live [`Vertex`],
//! and counts how many live cells use each vertex as a corner so that coarsening can
//! drop vertices nobody references any more.
//!
//! Lookups go through a spatial hash grid; if the grid has disabled itself (a
//! coordinate it cannot key), the registry falls back to a linear scan of the arena.

#![forbid(unsafe_code)]

use crate::core::collections::{StorageMap, VertexSecondaryMap, spatial_hash_grid::HashGridIndex};
use crate::core::config::ForestConfig;
use crate::core::forest::VertexKey;
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;

/// Coordinate index and reference counts for the vertex arena of a forest.
#[derive(Clone, Debug)]
pub(crate) struct VertexRegistry {
    tolerance: f64,
    grid: HashGridIndex<VertexKey>,
    refcounts: VertexSecondaryMap<u32>,
}

impl VertexRegistry {
    pub(crate) fn new(config: &ForestConfig) -> Self {
        Self {
            tolerance: config.tolerance(),
            grid: HashGridIndex::new(config.vertex_grid_cell_size()),
            refcounts: VertexSecondaryMap::new(),
        }
    }

    /// Finds a live vertex within tolerance of `point`.
    pub(crate) fn find(
        &self,
        vertices: &StorageMap<VertexKey, Vertex>,
        point: &Point,
    ) -> Option<VertexKey> {
        let matches = |key: VertexKey| {
            vertices
                .get(key)
                .is_some_and(|v| v.point().approx_eq(point, self.tolerance))
        };

        let mut found = None;
        let used_index = self.grid.for_each_candidate(point.coords(), |key| {
            if matches(key) {
                found = Some(key);
                return false;
            }
            true
        });
        if used_index {
            return found;
        }

        vertices.keys().find(|&key| matches(key))
    }

    /// Returns the vertex at `point`, inserting a new one if none exists.
    ///
    /// The reference count is left unchanged; call [`retain`](Self::retain) for each
    /// cell that adopts the vertex as a corner.
    pub(crate) fn resolve(
        &mut self,
        vertices: &mut StorageMap<VertexKey, Vertex>,
        point: Point,
    ) -> VertexKey {
        if let Some(key) = self.find(vertices, &point) {
            return key;
        }
        let key = vertices.insert(Vertex::new(point));
        self.grid.insert(key, point.coords());
        self.refcounts.insert(key, 0);
        key
    }

    /// [`resolve`](Self::resolve) followed by [`retain`](Self::retain).
    #[cfg(test)]
    pub(crate) fn acquire(
        &mut self,
        vertices: &mut StorageMap<VertexKey, Vertex>,
        point: Point,
    ) -> VertexKey {
        let key = self.resolve(vertices, point);
        self.retain(key);
        key
    }

    /// Adds one corner reference to `key`.
    pub(crate) fn retain(&mut self, key: VertexKey) {
        if let Some(count) = self.refcounts.get_mut(key) {
            *count += 1;
        } else {
            self.refcounts.insert(key, 1);
        }
    }

    /// Drops one corner reference to `key`, removing the vertex when none remain.
    ///
    /// Returns `true` if the vertex was removed from the arena.
    pub(crate) fn release(
        &mut self,
        vertices: &mut StorageMap<VertexKey, Vertex>,
        key: VertexKey,
    ) -> bool {
        let Some(count) = self.refcounts.get_mut(key) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return false;
        }

        self.refcounts.remove(key);
        if let Some(vertex) = vertices.remove(key) {
            self.grid.remove(key, vertex.coords());
            return true;
        }
        false
    }

    /// Number of live cells using `key` as a corner.
    pub(crate) fn refcount(&self, key: VertexKey) -> u32 {
        self.refcounts.get(key).copied().unwrap_or(0)
    }
}
