use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::core::forest::CellKey;

// Import slotmap types for storage backend
#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for the forest's cell and vertex arenas.
///
/// # Feature Flags
///
/// - **default**: Uses `DenseSlotMap` (enabled via the default `dense-slotmap` feature)
/// - **--no-default-features**: Uses `SlotMap`
///
/// Public methods return iterators or references rather than exposing this type.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Internal storage backend for the forest's cell and vertex arenas.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// `HashMap` with the non-cryptographic `FxHasher`.
///
/// Not DoS-resistant: keys here are always internal (grid buckets, arena keys).
///
/// # Examples
///
/// ```rust
/// use quadforest::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// `HashSet` with the non-cryptographic `FxHasher`.
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec: inline storage for up to `N` elements, heap afterwards.
///
/// # Examples
///
/// ```rust
/// use quadforest::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// buffer.push(42);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashMap`] with pre-allocated capacity.
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}

/// Creates a [`FastHashSet`] with pre-allocated capacity.
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FxBuildHasher)
}

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Inline capacity of the traversal stack used by leaf enumeration.
///
/// A pre-order walk keeps at most `3 * depth + 1` pending cells, so 32 covers trees
/// roughly ten levels deep without touching the heap.
pub const TRAVERSAL_STACK_SIZE: usize = 32;

/// Pending-cell stack for depth-first traversals.
pub type CellStack = SmallBuffer<CellKey, TRAVERSAL_STACK_SIZE>;

/// Buffer of cell keys collected by batch operations (e.g. cells to refine).
pub type CellKeyBuffer = SmallBuffer<CellKey, 16>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<u64, usize> = fast_hash_map_with_capacity(4);
        assert!(map.is_empty());
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut set: FastHashSet<u64> = fast_hash_set_with_capacity(4);
        set.insert(789);
        assert!(set.contains(&789));
        assert!(!set.contains(&999));
        assert!(set.capacity() >= 4);
    }

    #[test]
    fn test_small_buffer_spills_past_inline_capacity() {
        let mut buffer: SmallBuffer<i32, 4> = SmallBuffer::new();
        for i in 0..4 {
            buffer.push(i);
        }
        assert!(!buffer.spilled());
        buffer.push(4);
        assert!(buffer.spilled());
    }
}
