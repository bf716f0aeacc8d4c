use svo_storage::prelude::*;
use utilities::scenes::{cube_bounds, random_spheres, sphere_scene};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn build_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_sphere");
    for edge in [16.0, 32.0, 64.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(edge), edge, |b, &edge| {
            let builder = OctreeBuilder::new(
                cube_bounds(edge),
                GenerationSettings {
                    voxel_size: 1.0,
                    clearance: 0.0,
                },
            );
            let oracle = sphere_scene(edge, 0.3 * edge);
            b.iter(|| builder.build(&oracle).unwrap());
        });
    }
    group.finish();
}

fn build_random_spheres(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_random_spheres");
    for count in [8, 64].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let builder = OctreeBuilder::new(cube_bounds(32.0), GenerationSettings::default());
            let oracle = random_spheres(32.0, count, 1);
            b.iter(|| builder.build(&oracle).unwrap());
        });
    }
    group.finish();
}

fn build_with_clearance(c: &mut Criterion) {
    c.bench_function("build_with_clearance", |b| {
        let builder = OctreeBuilder::new(
            cube_bounds(32.0),
            GenerationSettings {
                voxel_size: 1.0,
                clearance: 0.5,
            },
        );
        let oracle = sphere_scene(32.0, 8.0);
        b.iter(|| builder.build(&oracle).unwrap());
    });
}

criterion_group!(
    benches,
    build_sphere,
    build_random_spheres,
    build_with_clearance
);
criterion_main!(benches);
