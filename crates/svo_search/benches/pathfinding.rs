use svo_core::prelude::*;
use svo_search::prelude::*;
use utilities::scenes::{build_octree, cube_bounds, random_spheres};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn find_path_through_random_spheres(c: &mut Criterion) {
    let octree = build_octree(cube_bounds(32.0), 1.0, random_spheres(32.0, 24, 7));
    let start = PointN([0.5; 3]);
    let end = PointN([31.5; 3]);

    let mut group = c.benchmark_group("find_path_through_random_spheres");
    for algorithm in [
        PathfindingAlgorithm::AStar,
        PathfindingAlgorithm::ThetaStar,
        PathfindingAlgorithm::LazyThetaStar,
    ]
    .iter()
    {
        let settings = PathfindingSettings {
            algorithm: *algorithm,
            allow_partial_paths: true,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", algorithm)),
            &settings,
            |b, settings| {
                b.iter(|| find_path(&octree, AgentProperties::default(), start, end, *settings))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, find_path_through_random_spheres);
criterion_main!(benches);
