use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Quat, Vec3};
use model_viewer::bounds::compute_bounds;
use model_viewer::normalize::{normalize, CANONICAL_SIZE};
use model_viewer::scene::{Mesh, NodeId, Primitive, SceneGraph, Transform};

/// Deterministic point cloud on a lumpy sphere
fn cloud(count: usize, seed: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 0.618_034 + seed;
            let theta = t * std::f32::consts::TAU;
            let phi = (i as f32 / count as f32) * std::f32::consts::PI;
            let radius = 1.0 + 0.2 * (t * 7.0).sin();
            Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            )
        })
        .collect()
}

/// Chain of `depth` nodes, each rotated and carrying `vertices_per_node` points
fn build_model(depth: usize, vertices_per_node: usize) -> (SceneGraph, NodeId) {
    let mut scene = SceneGraph::new();
    let root = scene.add_node(Some("model".into()), Transform::IDENTITY);
    let mut parent = root;
    for level in 0..depth {
        let mesh = scene.add_mesh(Mesh {
            name: None,
            primitives: vec![Primitive {
                positions: cloud(vertices_per_node, level as f32),
                ..Default::default()
            }],
        });
        let node = scene.add_node(
            None,
            Transform {
                translation: Vec3::new(0.5, 0.0, 0.0),
                rotation: Quat::from_rotation_y(0.3),
                scale: Vec3::splat(0.9),
            },
        );
        scene.node_mut(node).mesh = Some(mesh);
        scene.attach(parent, node);
        parent = node;
    }
    (scene, root)
}

fn bench_compute_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_bounds");
    for (depth, vertices) in [(1, 10_000), (10, 1_000), (100, 100)] {
        let (scene, root) = build_model(depth, vertices);
        group.bench_with_input(
            BenchmarkId::new("nodes_x_vertices", format!("{depth}x{vertices}")),
            &(scene, root),
            |b, (scene, root)| b.iter(|| black_box(compute_bounds(scene, *root))),
        );
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_10x1000", |b| {
        b.iter_batched(
            || build_model(10, 1_000),
            |(mut scene, root)| black_box(normalize(&mut scene, root, CANONICAL_SIZE)),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_compute_bounds, bench_normalize);
criterion_main!(benches);
