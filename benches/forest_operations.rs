//! Benchmarks for core forest operations.
//!
//! 1. **`Forest::grid`**: root construction with vertex deduplication
//! 2. **`Forest::refine_marked`**: uniform refinement of every leaf
//! 3. **`Forest::find_neighbor`**: all four directions for every leaf of a graded mesh
//! 4. **`Forest::locate`**: point location across roots
//! 5. **`Forest::leaves`**: full leaf enumeration
//!
//! Query benchmarks run on a mesh graded towards the origin so that neighbor
//! searches cross refinement levels and tree boundaries.

#![allow(missing_docs)] // Criterion macros generate undocumented functions

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quadforest::prelude::*;
use std::hint::black_box;

const UNIT: Rectangle = Rectangle::new(0.0, 1.0, 0.0, 1.0);

/// Grid refined `levels` times towards the origin.
fn graded_forest(resolution: usize, levels: u32) -> Forest {
    let mut forest = Forest::grid(UNIT, (resolution, resolution)).unwrap();
    let origin = Point::new([0.0, 0.0]);
    for level in 0..levels {
        let reach = 0.5_f64.powi(level.cast_signed());
        forest.mark_where(|cell| {
            let c = cell.rectangle().center();
            c.x().hypot(c.y()) < reach || cell.rectangle().contains_closed(&origin)
        });
        forest.refine_marked().unwrap();
    }
    forest
}

/// Deterministic, well-spread query points (additive recurrence on the golden ratio).
fn query_points(n: usize) -> Vec<Point> {
    let (a, b) = (0.618_033_988_749_895, 0.754_877_666_246_693);
    let mut p = [0.5, 0.5];
    (0..n)
        .map(|_| {
            p = [(p[0] + a) % 1.0, (p[1] + b) % 1.0];
            Point::new(p)
        })
        .collect()
}

fn benchmark_grid_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_construction");
    for &n in &[4_usize, 16, 64] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(Forest::grid(UNIT, (n, n)).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_uniform_refinement(c: &mut Criterion) {
    let mut group = c.benchmark_group("refine_marked_uniform");
    for &n in &[4_usize, 16, 32] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut forest = Forest::grid(UNIT, (n, n)).unwrap();
                    forest.mark_where(|_| true);
                    forest
                },
                |mut forest| black_box(forest.refine_marked().unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn benchmark_neighbor_finding(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_neighbor_all_leaves");
    for &levels in &[2_u32, 4, 6] {
        let forest = graded_forest(8, levels);
        let leaves: Vec<CellKey> = forest.leaves().collect();
        group.throughput(Throughput::Elements(4 * leaves.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(levels), &leaves, |b, leaves| {
            b.iter(|| {
                let mut found = 0_usize;
                for &leaf in leaves {
                    for d in Direction::ALL {
                        found += usize::from(forest.find_neighbor(leaf, d).unwrap().is_some());
                    }
                }
                black_box(found)
            });
        });
    }
    group.finish();
}

fn benchmark_point_location(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    let points = query_points(1000);
    for &levels in &[2_u32, 4, 6] {
        let forest = graded_forest(8, levels);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(levels), &points, |b, points| {
            b.iter(|| {
                for point in points {
                    black_box(forest.locate(point).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn benchmark_leaf_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaves");
    for &levels in &[2_u32, 4, 6] {
        let forest = graded_forest(8, levels);
        group.throughput(Throughput::Elements(forest.number_of_leaves() as u64));
        group.bench_function(BenchmarkId::from_parameter(levels), |b| {
            b.iter(|| black_box(forest.leaves().count()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_grid_construction,
    benchmark_uniform_refinement,
    benchmark_neighbor_finding,
    benchmark_point_location,
    benchmark_leaf_enumeration
);
criterion_main!(benches);
