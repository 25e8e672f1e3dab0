//! Spatial hash-grid acceleration structure.
//!
//! The vertex registry uses this index to find an already-registered vertex within
//! tolerance of a new coordinate without scanning every vertex.
//!
//! Points are bucketed by `floor(coord / cell_size)`. A query visits the 3×3 Moore
//! neighborhood of the query's bucket, so any stored point within `cell_size` of the
//! query (max-norm) is among the candidates.
//!
//! If a coordinate cannot be keyed robustly (non-finite, or so large that the grid
//! index has no unit resolution), the index disables itself and callers fall back to
//! a linear scan.

use super::{FastHashMap, SmallBuffer};
use crate::core::forest::VertexKey;

const BUCKET_INLINE_CAPACITY: usize = 4;

/// Largest grid coordinate with unit resolution in `f64` (2^53).
const MAX_EXACT_GRID_COORD: f64 = 9_007_199_254_740_992.0;

/// Integer bucket coordinates.
type GridKey = (i64, i64);

/// A simple spatial hash grid mapping grid cells to the keys stored inside them.
#[derive(Clone, Debug)]
pub(in crate::core) struct HashGridIndex<K = VertexKey> {
    cell_size: f64,
    usable: bool,
    cells: FastHashMap<GridKey, SmallBuffer<K, BUCKET_INLINE_CAPACITY>>,
}

impl<K> HashGridIndex<K>
where
    K: Copy + PartialEq,
{
    /// Create a new grid index with the given cell size.
    pub(in crate::core) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            usable: cell_size.is_finite() && cell_size > 0.0,
            cells: FastHashMap::default(),
        }
    }

    #[cfg(test)]
    pub(in crate::core) const fn is_usable(&self) -> bool {
        self.usable
    }

    const fn disable(&mut self) {
        self.usable = false;
    }

    /// Insert a key into the bucket containing `coords`.
    ///
    /// If the point cannot be keyed, the index is disabled.
    pub(in crate::core) fn insert(&mut self, key: K, coords: &[f64; 2]) {
        if !self.usable {
            return;
        }

        let Some(grid_key) = self.key_for_coords(coords) else {
            self.disable();
            return;
        };

        self.cells.entry(grid_key).or_default().push(key);
    }

    /// Remove a key previously inserted at `coords`.
    ///
    /// Returns `true` if the key was found and removed.
    pub(in crate::core) fn remove(&mut self, key: K, coords: &[f64; 2]) -> bool {
        if !self.usable {
            return false;
        }
        let Some(grid_key) = self.key_for_coords(coords) else {
            return false;
        };
        let Some(bucket) = self.cells.get_mut(&grid_key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&k| k == key) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.cells.remove(&grid_key);
        }
        true
    }

    /// Visit all candidate keys in the 3×3 neighborhood around `coords`.
    ///
    /// The visitor returns `false` to stop early. Returns `true` if the index was used
    /// for the query (even if it yielded zero candidates), `false` if the index was
    /// unusable and the caller must fall back to a linear scan.
    pub(in crate::core) fn for_each_candidate<F>(&self, coords: &[f64; 2], mut f: F) -> bool
    where
        F: FnMut(K) -> bool,
    {
        if !self.usable {
            return false;
        }

        let Some((bx, by)) = self.key_for_coords(coords) else {
            return false;
        };

        'outer: for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.cells.get(&(bx + dx, by + dy)) {
                    for &key in bucket {
                        if !f(key) {
                            break 'outer;
                        }
                    }
                }
            }
        }

        true
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounded by MAX_EXACT_GRID_COORD before the cast"
    )]
    fn key_for_coords(&self, coords: &[f64; 2]) -> Option<GridKey> {
        if !self.usable {
            return None;
        }

        let mut key = [0_i64; 2];
        for (slot, coord) in key.iter_mut().zip(coords) {
            if !coord.is_finite() {
                return None;
            }
            let cell_coord = (coord / self.cell_size).floor();
            // Neighbor enumeration needs unit resolution (cell_coord + 1 != cell_coord).
            if !cell_coord.is_finite() || cell_coord.abs() >= MAX_EXACT_GRID_COORD {
                return None;
            }
            *slot = cell_coord as i64;
        }

        Some((key[0], key[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashSet;
    use slotmap::SlotMap;

    #[test]
    fn test_hash_grid_index_candidate_lookup() {
        let mut slots: SlotMap<VertexKey, i32> = SlotMap::default();
        let v1 = slots.insert(1);
        let v2 = slots.insert(2);
        let far = slots.insert(3);

        let mut grid: HashGridIndex = HashGridIndex::new(1.0);
        grid.insert(v1, &[0.2, 0.2]);
        grid.insert(v2, &[-0.2, 0.2]);
        grid.insert(far, &[5.0, 5.0]);

        let mut found: FastHashSet<VertexKey> = FastHashSet::default();
        let used = grid.for_each_candidate(&[0.9, 0.1], |vkey| {
            found.insert(vkey);
            true
        });

        assert!(used);
        assert!(found.contains(&v1));
        assert!(found.contains(&v2));
        assert!(!found.contains(&far));
    }

    #[test]
    fn test_hash_grid_index_visits_full_moore_neighborhood() {
        let mut slots: SlotMap<VertexKey, i32> = SlotMap::default();
        let mut grid: HashGridIndex = HashGridIndex::new(1.0);
        let mut expected: FastHashSet<VertexKey> = FastHashSet::default();

        for x in [-1.0, 0.0, 1.0] {
            for y in [-1.0, 0.0, 1.0] {
                let v = slots.insert(1);
                expected.insert(v);
                grid.insert(v, &[x + 0.25, y + 0.25]);
            }
        }

        let mut found: FastHashSet<VertexKey> = FastHashSet::default();
        assert!(grid.for_each_candidate(&[0.25, 0.25], |vkey| {
            found.insert(vkey);
            true
        }));
        assert_eq!(found, expected);
    }

    #[test]
    fn test_hash_grid_index_remove() {
        let mut slots: SlotMap<VertexKey, i32> = SlotMap::default();
        let v = slots.insert(1);
        let mut grid: HashGridIndex = HashGridIndex::new(0.5);
        grid.insert(v, &[1.0, 1.0]);
        assert!(grid.remove(v, &[1.0, 1.0]));
        assert!(!grid.remove(v, &[1.0, 1.0]));

        let mut count = 0;
        grid.for_each_candidate(&[1.0, 1.0], |_| {
            count += 1;
            true
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn test_hash_grid_index_disables_on_unkeyable_coordinates() {
        let mut slots: SlotMap<VertexKey, i32> = SlotMap::default();
        let v = slots.insert(1);
        let mut grid: HashGridIndex = HashGridIndex::new(1e-6);
        grid.insert(v, &[1e300, 0.0]);
        assert!(!grid.is_usable());
        assert!(!grid.for_each_candidate(&[0.0, 0.0], |_| true));

        let invalid: HashGridIndex = HashGridIndex::new(0.0);
        assert!(!invalid.is_usable());
    }
}
