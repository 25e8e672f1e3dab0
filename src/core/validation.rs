//! Structural validation of a forest.
//!
//! [`validate`] stops at the first broken invariant; [`validation_report`] collects
//! every violation, grouped by [`InvariantKind`], for debugging and test diagnostics.
//!
//! Checked invariants:
//!
//! - **Hierarchy**: depth, kind, parent and position agree; children point back to
//!   their parent; roots are exactly the depth-0 cells; edges match corners.
//! - **Partition**: a cell has zero or four children, the children tile it, and
//!   midpoints and center are set exactly while children exist.
//! - **Vertex uniqueness**: no two live vertices lie within tolerance, and no cell
//!   uses one vertex for two of its corners.
//! - **Reference counts**: each vertex's registry count equals the number of live
//!   cells using it as a corner, and every referenced vertex is live.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::core::cell::{Cell, CellKind};
use crate::core::collections::{FastHashMap, FastHashSet, fast_hash_map_with_capacity};
use crate::core::forest::{CellKey, Forest, VertexKey};
use crate::core::quadrant::{Direction, Quadrant};

// =============================================================================
// ERROR AND REPORT TYPES
// =============================================================================

/// A broken structural invariant.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ForestValidationError {
    /// Parent/child, depth or kind bookkeeping is inconsistent.
    #[error("Inconsistent hierarchy at cell {cell_key:?}: {message}")]
    InconsistentHierarchy {
        /// The offending cell.
        cell_key: CellKey,
        /// Description of the inconsistency.
        message: String,
    },

    /// Children do not tile their parent, or refinement vertices are out of sync.
    #[error("Broken partition at cell {cell_key:?}: {message}")]
    BrokenPartition {
        /// The parent cell.
        cell_key: CellKey,
        /// Description of the defect.
        message: String,
    },

    /// Two live vertices are geometrically equal.
    #[error("Vertices {first:?} and {second:?} coincide within tolerance")]
    DuplicateVertices {
        /// One vertex.
        first: VertexKey,
        /// The other vertex.
        second: VertexKey,
    },

    /// A cell uses the same vertex for two of its corners.
    #[error("Cell {cell_key:?} uses vertex {vertex_key:?} for more than one corner")]
    CollapsedCorners {
        /// The collapsed cell.
        cell_key: CellKey,
        /// The repeated vertex.
        vertex_key: VertexKey,
    },

    /// A registry count disagrees with the number of cells using the vertex.
    #[error("Vertex {vertex_key:?} has {found} registered references, expected {expected}")]
    ReferenceCountMismatch {
        /// The vertex.
        vertex_key: VertexKey,
        /// Number of live cells using it as a corner.
        expected: u32,
        /// Count held by the registry.
        found: u32,
    },

    /// A cell refers to a vertex that is not live.
    #[error("Cell {cell_key:?} refers to missing vertex {vertex_key:?}")]
    DanglingVertex {
        /// The referring cell.
        cell_key: CellKey,
        /// The missing vertex.
        vertex_key: VertexKey,
    },
}

/// Classifies the invariant a violation belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InvariantKind {
    /// Depth, kind, parent and position bookkeeping.
    Hierarchy,
    /// Children tile their parent.
    Partition,
    /// No duplicate vertices and no collapsed cells.
    VertexUniqueness,
    /// Registry counts and live vertex references.
    ReferenceCounts,
}

/// A single invariant violation.
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// The kind of invariant that failed.
    pub kind: InvariantKind,
    /// The detailed error.
    pub error: ForestValidationError,
}

/// Every violation found by [`Forest::validation_report`].
#[derive(Clone, Debug)]
pub struct ValidationReport {
    /// Violations in the order they were found.
    pub violations: Vec<InvariantViolation>,
}

impl ValidationReport {
    /// Returns `true` if no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: InvariantKind) -> impl Iterator<Item = &ForestValidationError> {
        self.violations
            .iter()
            .filter(move |v| v.kind == kind)
            .map(|v| &v.error)
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

type Check = fn(&Forest, &mut Vec<ForestValidationError>);

const CHECKS: [(InvariantKind, Check); 4] = [
    (InvariantKind::Hierarchy, check_hierarchy),
    (InvariantKind::Partition, check_partition),
    (InvariantKind::VertexUniqueness, check_vertex_uniqueness),
    (InvariantKind::ReferenceCounts, check_reference_counts),
];

/// Returns the first violation found.
///
/// # Errors
///
/// Returns the first [`ForestValidationError`] in check order.
pub fn validate(forest: &Forest) -> Result<(), ForestValidationError> {
    for (kind, check) in CHECKS {
        let mut errors = Vec::new();
        check(forest, &mut errors);
        if let Some(error) = errors.into_iter().next() {
            tracing::warn!(?kind, %error, "forest validation failed");
            return Err(error);
        }
    }
    Ok(())
}

/// Collects every violation.
///
/// # Errors
///
/// Returns a [`ValidationReport`] if any check fails.
pub fn validation_report(forest: &Forest) -> Result<(), ValidationReport> {
    let mut violations = Vec::new();
    for (kind, check) in CHECKS {
        let mut errors = Vec::new();
        check(forest, &mut errors);
        violations.extend(errors.into_iter().map(|error| InvariantViolation { kind, error }));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::warn!(count = violations.len(), "forest validation found violations");
        Err(ValidationReport { violations })
    }
}

// =============================================================================
// CHECKS
// =============================================================================

fn hierarchy(cell_key: CellKey, message: impl Into<String>) -> ForestValidationError {
    ForestValidationError::InconsistentHierarchy {
        cell_key,
        message: message.into(),
    }
}

fn partition(cell_key: CellKey, message: impl Into<String>) -> ForestValidationError {
    ForestValidationError::BrokenPartition {
        cell_key,
        message: message.into(),
    }
}

fn check_hierarchy(forest: &Forest, errors: &mut Vec<ForestValidationError>) {
    let roots: FastHashSet<CellKey> = forest.roots().iter().copied().collect();
    if roots.len() != forest.roots().len()
        && let Some(&first) = forest.roots().first()
    {
        errors.push(hierarchy(first, "root list contains duplicates"));
    }

    for (key, cell) in forest.cells() {
        match (cell.kind(), cell.parent(), cell.position()) {
            (CellKind::Root, None, None) => {
                if cell.depth() != 0 {
                    errors.push(hierarchy(key, format!("root at depth {}", cell.depth())));
                }
                if !roots.contains(&key) {
                    errors.push(hierarchy(key, "root missing from the root list"));
                }
            }
            (CellKind::Branch | CellKind::Leaf, Some(parent_key), Some(position)) => {
                check_parent_link(forest, key, cell, parent_key, position, errors);
                let expects_leaf = cell.kind() == CellKind::Leaf;
                if expects_leaf != cell.is_leaf() {
                    errors.push(hierarchy(
                        key,
                        format!("kind {} disagrees with children", cell.kind()),
                    ));
                }
            }
            (kind, parent, position) => errors.push(hierarchy(
                key,
                format!("kind {kind} with parent {parent:?} and position {position:?}"),
            )),
        }

        for q in Quadrant::ALL {
            let Some(child_key) = cell.child(q) else {
                continue;
            };
            match forest.cell(child_key) {
                None => errors.push(hierarchy(key, format!("{q} child {child_key:?} is missing"))),
                Some(child) if child.parent() != Some(key) || child.position() != Some(q) => {
                    errors.push(hierarchy(key, format!("{q} child does not point back")));
                }
                Some(_) => {}
            }
        }

        for d in Direction::ALL {
            let edge = cell.edge(d);
            let (start, end) = d.endpoints();
            if edge.owner() != key
                || edge.direction() != d
                || edge.endpoints() != (cell.corner(start), cell.corner(end))
            {
                errors.push(hierarchy(key, format!("{d} edge does not match the cell corners")));
            }
        }
    }

    for &root in forest.roots() {
        if forest.cell(root).is_none_or(|c| !c.is_root()) {
            errors.push(hierarchy(root, "root list entry is not a live root"));
        }
    }
}

fn check_parent_link(
    forest: &Forest,
    key: CellKey,
    cell: &Cell,
    parent_key: CellKey,
    position: Quadrant,
    errors: &mut Vec<ForestValidationError>,
) {
    let Some(parent) = forest.cell(parent_key) else {
        errors.push(hierarchy(key, format!("parent {parent_key:?} is missing")));
        return;
    };
    if parent.child(position) != Some(key) {
        errors.push(hierarchy(key, format!("parent's {position} child is not this cell")));
    }
    if cell.depth() != parent.depth() + 1 {
        errors.push(hierarchy(
            key,
            format!("depth {} under parent at depth {}", cell.depth(), parent.depth()),
        ));
    }
}

fn check_partition(forest: &Forest, errors: &mut Vec<ForestValidationError>) {
    let tolerance = forest.config().tolerance();

    for (key, cell) in forest.cells() {
        let child_count = cell.children().iter().flatten().count();
        let has_midpoints = Direction::ALL.iter().all(|&d| cell.midpoint(d).is_some())
            && cell.center().is_some();
        let no_midpoints = Direction::ALL.iter().all(|&d| cell.midpoint(d).is_none())
            && cell.center().is_none();

        match child_count {
            0 => {
                if !no_midpoints {
                    errors.push(partition(key, "leaf carries refinement vertices"));
                }
                continue;
            }
            4 => {
                if !has_midpoints {
                    errors.push(partition(key, "refined cell lacks midpoints or center"));
                }
            }
            n => {
                errors.push(partition(key, format!("{n} children, expected 0 or 4")));
                continue;
            }
        }

        let rectangle = cell.rectangle();
        let mut area = 0.0;
        for child_key in cell.child_keys() {
            let Some(child) = forest.cell(child_key) else {
                continue;
            };
            if !rectangle.encloses(child.rectangle(), tolerance) {
                errors.push(partition(
                    key,
                    format!("child {} escapes parent {rectangle}", child.rectangle()),
                ));
            }
            area += child.rectangle().area();
        }
        let parent_area = rectangle.area();
        if (area - parent_area).abs() > tolerance * parent_area.max(1.0) {
            errors.push(partition(
                key,
                format!("children cover area {area}, parent has {parent_area}"),
            ));
        }
    }
}

fn check_vertex_uniqueness(forest: &Forest, errors: &mut Vec<ForestValidationError>) {
    for (cell_key, cell) in forest.cells() {
        let corners = cell.corners();
        for (i, &vertex_key) in corners.iter().enumerate() {
            if corners[..i].contains(&vertex_key) {
                errors.push(ForestValidationError::CollapsedCorners {
                    cell_key,
                    vertex_key,
                });
                break;
            }
        }
    }

    let tolerance = forest.config().tolerance();
    let mut sorted: Vec<(VertexKey, [f64; 2])> =
        forest.vertices().map(|(k, v)| (k, *v.coords())).collect();
    sorted.sort_by(|a, b| a.1[0].total_cmp(&b.1[0]));

    // Sweep in x; only vertices within `tolerance` in x can coincide.
    for (i, (first, a)) in sorted.iter().enumerate() {
        for (second, b) in &sorted[i + 1..] {
            if b[0] - a[0] > tolerance {
                break;
            }
            if (b[1] - a[1]).abs() <= tolerance {
                errors.push(ForestValidationError::DuplicateVertices {
                    first: *first,
                    second: *second,
                });
            }
        }
    }
}

fn check_reference_counts(forest: &Forest, errors: &mut Vec<ForestValidationError>) {
    let mut expected: FastHashMap<VertexKey, u32> =
        fast_hash_map_with_capacity(forest.number_of_vertices());

    for (key, cell) in forest.cells() {
        for q in Quadrant::ALL {
            *expected.entry(cell.corner(q)).or_insert(0) += 1;
        }
        let refinement_vertices = Direction::ALL
            .iter()
            .filter_map(|&d| cell.midpoint(d))
            .chain(cell.center());
        for vertex_key in Quadrant::ALL
            .iter()
            .map(|&q| cell.corner(q))
            .chain(refinement_vertices)
        {
            if forest.vertex(vertex_key).is_none() {
                errors.push(ForestValidationError::DanglingVertex {
                    cell_key: key,
                    vertex_key,
                });
            }
        }
    }

    for (vertex_key, _) in forest.vertices() {
        let expected_count = expected.get(&vertex_key).copied().unwrap_or(0);
        let found = forest.vertex_references(vertex_key);
        if expected_count != found {
            errors.push(ForestValidationError::ReferenceCountMismatch {
                vertex_key,
                expected: expected_count,
                found,
            });
        }
    }
}
