use svo_core::prelude::*;
use svo_storage::prelude::*;
use utilities::scenes::{build_octree, cube_bounds, random_spheres};

use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};

fn scene() -> VoxelOctree {
    build_octree(cube_bounds(32.0), 1.0, random_spheres(32.0, 32, 3))
}

fn address_from_position(c: &mut Criterion) {
    let octree = scene();
    let positions: Vec<Point3f> = (0..32)
        .map(|i| PointN([i as f32 + 0.3, 31.7 - i as f32, 0.5 * i as f32]))
        .collect();

    c.bench_function("address_from_position", |b| {
        b.iter(|| {
            positions
                .iter()
                .filter_map(|p| octree.address_from_position(*p))
                .count()
        })
    });
}

fn neighbors_of_every_free_cell(c: &mut Criterion) {
    let octree = scene();
    let free_nodes = octree.free_nodes();

    c.bench_function("neighbors_of_every_free_cell", |b| {
        b.iter(|| {
            free_nodes
                .iter()
                .map(|a| octree.neighbors_of(*a).unwrap().len())
                .sum::<usize>()
        })
    });
}

fn random_point(c: &mut Criterion) {
    let octree = scene();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("random_point", |b| b.iter(|| octree.random_point(&mut rng)));
}

criterion_group!(
    benches,
    address_from_position,
    neighbors_of_every_free_cell,
    random_point
);
criterion_main!(benches);
