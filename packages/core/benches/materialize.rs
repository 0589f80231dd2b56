//! Performance benchmarks for tree materialization
//!
//! Run with: `cargo bench -p sober-core`
//!
//! These benchmarks measure the per-request cost of a discussion view:
//! - Full materialization of a wide, deep tree
//! - Bounded materialization from a deep entry brick
//! - Render list extraction from an already materialized tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sober_core::db::InMemoryStore;
use sober_core::models::{BrickId, BrickType, NewBrick};
use sober_core::services::BrickService;
use sober_core::tree::{DepthBound, IncludedIds};
use std::sync::Arc;
use tokio::runtime::Runtime;

const RESPONSE_TYPES: [BrickType; 5] = [
    BrickType::Pro,
    BrickType::Contra,
    BrickType::Comment,
    BrickType::Question,
    BrickType::Improvement,
];

/// Build a tree where every brick has `fan_out` responses, `depth` levels deep
///
/// Returns the service, the thesis id and the id of one deepest brick.
async fn setup_tree(fan_out: usize, depth: usize) -> (BrickService, BrickId, BrickId) {
    let service = BrickService::new(Arc::new(InMemoryStore::new()));
    let thesis = service
        .create_brick(NewBrick::thesis("Bench thesis", "content", "public"))
        .await
        .unwrap();

    let mut frontier = vec![thesis.id];
    let mut deepest = thesis.id;
    for level in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..fan_out {
                let brick_type = RESPONSE_TYPES[i % RESPONSE_TYPES.len()];
                let child = service
                    .create_brick(NewBrick::response(
                        brick_type,
                        *parent,
                        format!("L{} R{}", level, i),
                        "content",
                    ))
                    .await
                    .unwrap();
                next.push(child.id);
            }
        }
        deepest = next[0];
        frontier = next;
    }

    (service, thesis.id, deepest)
}

/// Benchmark unbounded materialization for growing trees
fn bench_full_materialization(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("materialize_unbounded");
    group.sample_size(20);

    for (fan_out, depth) in [(3, 3), (4, 4), (5, 4)] {
        let (service, root_id, _) = rt.block_on(setup_tree(fan_out, depth));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", fan_out, depth)),
            &root_id,
            |b, &root_id| {
                b.iter(|| {
                    let tree = rt
                        .block_on(service.materialize(root_id, DepthBound::Unbounded))
                        .unwrap();
                    black_box(tree.len())
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a bounded view opened on a deep brick
fn bench_relative_materialization(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, _, deepest) = rt.block_on(setup_tree(4, 5));

    c.bench_function("materialize_relative_from_leaf", |b| {
        b.iter(|| {
            let tree = rt
                .block_on(service.materialize(deepest, DepthBound::Relative(1)))
                .unwrap();
            black_box(tree.len())
        });
    });
}

/// Benchmark render list extraction, which never touches the store
fn bench_subtree_extraction(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, root_id, _) = rt.block_on(setup_tree(4, 4));
    let tree = rt
        .block_on(service.materialize(root_id, DepthBound::Unbounded))
        .unwrap();

    c.bench_function("subtree_all", |b| {
        b.iter(|| {
            let views = tree
                .subtree(root_id, DepthBound::Unbounded, &IncludedIds::All)
                .unwrap();
            black_box(views.len())
        });
    });
}

criterion_group!(
    benches,
    bench_full_materialization,
    bench_relative_materialization,
    bench_subtree_extraction
);
criterion_main!(benches);
