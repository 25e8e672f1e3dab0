//! Property-based tests for forest invariants under random adaptation.
//!
//! Each case builds a random grid of roots over random bounds, then refines the leaves
//! containing a random set of points (each point located as a fraction of the bounds).
//!
//! ## Invariants Tested
//!
//! - **Validation** - every structural check passes after adaptation
//! - **Partition** - leaf areas sum to the area of the bounds
//! - **Unique ownership** - every point of the domain lies in exactly one leaf
//! - **Neighbor symmetry** - equal-depth neighbors see each other
//! - **Reversibility** - coarsening everything restores the root vertex count
//! - **Boundary** - boundary edges add up to the perimeter of the bounds
//! - **Numbering** - global vertex indices are `0..n` without gaps

use approx::relative_eq;
use proptest::prelude::*;
use quadforest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

const MAX_DEPTH: u32 = 5;

/// Strategy for generating non-degenerate bounds.
fn bounds() -> impl Strategy<Value = Rectangle> {
    (-10.0..10.0_f64, -10.0..10.0_f64, 0.5..5.0_f64, 0.5..5.0_f64)
        .prop_map(|(x0, y0, w, h)| Rectangle::new(x0, x0 + w, y0, y0 + h))
}

/// Strategy for generating a point as fractions of the bounds.
fn fraction() -> impl Strategy<Value = (f64, f64)> {
    (0.0..1.0_f64, 0.0..1.0_f64)
}

fn at(bounds: &Rectangle, (fx, fy): (f64, f64)) -> Point {
    Point::new([
        bounds.x0 + fx * bounds.width(),
        bounds.y0 + fy * bounds.height(),
    ])
}

/// Builds the grid and refines the leaf under each target point.
fn adapted_forest(
    bounds: Rectangle,
    resolution: (usize, usize),
    targets: &[(f64, f64)],
) -> Forest {
    let mut forest = Forest::grid(bounds, resolution).unwrap();
    for &target in targets {
        let leaf = forest.locate(&at(&bounds, target)).unwrap().unwrap();
        if forest.cell(leaf).unwrap().depth() < MAX_DEPTH {
            forest.refine(leaf).unwrap();
        }
    }
    forest
}

fn forest_case() -> impl Strategy<Value = (Rectangle, (usize, usize), Vec<(f64, f64)>)> {
    (
        bounds(),
        (1_usize..=3, 1_usize..=3),
        prop::collection::vec(fraction(), 0..=12),
    )
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_adapted_forest_is_valid((b, res, targets) in forest_case()) {
        let forest = adapted_forest(b, res, &targets);
        prop_assert!(forest.validate().is_ok());
        prop_assert!(forest.validation_report().is_ok());
        prop_assert!(forest.max_depth() <= MAX_DEPTH);
    }

    #[test]
    fn prop_leaves_partition_the_bounds((b, res, targets) in forest_case()) {
        let forest = adapted_forest(b, res, &targets);
        let area: f64 = forest
            .leaves()
            .map(|leaf| forest.cell(leaf).unwrap().rectangle().area())
            .sum();
        prop_assert!(relative_eq!(area, b.area(), max_relative = 1e-10));
        prop_assert_eq!(forest.leaves().count(), forest.number_of_leaves());
    }

    #[test]
    fn prop_every_point_has_one_leaf(
        (b, res, targets) in forest_case(),
        probes in prop::collection::vec(fraction(), 1..=16),
    ) {
        let forest = adapted_forest(b, res, &targets);
        let leaves: Vec<CellKey> = forest.leaves().collect();
        for probe in probes {
            let point = at(&b, probe);
            let owners: Vec<CellKey> = leaves
                .iter()
                .copied()
                .filter(|&leaf| forest.contains_point(leaf, &point).unwrap())
                .collect();
            prop_assert_eq!(owners.len(), 1, "{} owned by {:?}", point, owners);
            prop_assert_eq!(forest.locate(&point).unwrap(), Some(owners[0]));
        }
    }

    #[test]
    fn prop_equal_depth_neighbors_are_symmetric((b, res, targets) in forest_case()) {
        let forest = adapted_forest(b, res, &targets);
        for (key, cell) in forest.cells() {
            for d in Direction::ALL {
                let Some(other) = forest.find_neighbor(key, d).unwrap() else {
                    continue;
                };
                let depth = forest.cell(other).unwrap().depth();
                prop_assert!(depth <= cell.depth());
                if depth == cell.depth() {
                    prop_assert_eq!(forest.find_neighbor(other, d.opposite()).unwrap(), Some(key));
                }
            }
        }
    }

    #[test]
    fn prop_coarsening_everything_restores_the_grid((b, res, targets) in forest_case()) {
        let mut forest = adapted_forest(b, res, &targets);
        while forest.max_depth() > 0 {
            forest.mark_where(|cell| cell.depth() > 0);
            prop_assert!(forest.coarsen_marked().unwrap() > 0);
        }
        prop_assert_eq!(forest.number_of_cells(), res.0 * res.1);
        prop_assert_eq!(forest.number_of_vertices(), (res.0 + 1) * (res.1 + 1));
        prop_assert!(forest.validate().is_ok());
    }

    #[test]
    fn prop_boundary_edges_trace_the_perimeter((b, res, targets) in forest_case()) {
        let forest = adapted_forest(b, res, &targets);
        let perimeter: f64 = forest
            .boundary_edges()
            .map(|edge| {
                let p = forest.vertex(edge.start()).unwrap().point();
                let q = forest.vertex(edge.end()).unwrap().point();
                (q.x() - p.x()).abs() + (q.y() - p.y()).abs()
            })
            .sum();
        let expected = 2.0 * (b.width() + b.height());
        prop_assert!(relative_eq!(perimeter, expected, max_relative = 1e-10));
    }

    #[test]
    fn prop_global_indices_are_contiguous((b, res, targets) in forest_case()) {
        let mut forest = adapted_forest(b, res, &targets);
        let count = forest.assign_global_indices();
        prop_assert_eq!(count as usize, forest.number_of_vertices());

        let mut seen = vec![false; count as usize];
        for (_, vertex) in forest.vertices() {
            let index = vertex.global_index().unwrap() as usize;
            prop_assert!(!seen[index]);
            seen[index] = true;
        }
        prop_assert!(seen.into_iter().all(|s| s));
    }
}
