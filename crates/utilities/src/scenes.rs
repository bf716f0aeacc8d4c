use crate::occluders::{BoxOccluder, Occluders, SphereOccluder};

use svo_core::prelude::*;
use svo_storage::prelude::*;

use rand::{rngs::StdRng, Rng, SeedableRng};

// TODO: it would be nice if the crate unit tests could share this module, but it causes this issue:
// https://github.com/rust-lang/cargo/issues/6765

pub fn cube_bounds(edge: f32) -> Extent3f {
    Extent3f::from_min_and_shape(PointN([0.0; 3]), Point3f::fill(edge))
}

pub fn build_octree(bounds: Extent3f, voxel_size: f32, oracle: impl OcclusionOracle) -> VoxelOctree {
    OctreeBuilder::new(
        bounds,
        GenerationSettings {
            voxel_size,
            clearance: 0.0,
        },
    )
    .build(oracle)
    .unwrap()
}

/// A 2m cube spanning 3..5 on each axis of an 8m volume.
pub fn centered_obstacle() -> BoxOccluder {
    BoxOccluder(Extent3f::from_min_and_shape(PointN([3.0; 3]), PointN([2.0; 3])))
}

/// An 8m volume of 1m voxels around `centered_obstacle`.
pub fn centered_obstacle_octree() -> VoxelOctree {
    build_octree(cube_bounds(8.0), 1.0, centered_obstacle())
}

/// A wall at `x` in 4..5 that spans the whole volume except for a 2m square hole around `(y, z) = (6, 6)`.
pub fn wall_with_hole() -> Occluders {
    let low_y = Extent3f::from_min_and_max(PointN([4.0, 0.0, 0.0]), PointN([5.0, 5.0, 8.0]));
    let high_y = Extent3f::from_min_and_max(PointN([4.0, 7.0, 0.0]), PointN([5.0, 8.0, 8.0]));
    let low_z = Extent3f::from_min_and_max(PointN([4.0, 5.0, 0.0]), PointN([5.0, 7.0, 5.0]));
    let high_z = Extent3f::from_min_and_max(PointN([4.0, 5.0, 7.0]), PointN([5.0, 7.0, 8.0]));

    Occluders::default()
        .with(BoxOccluder(low_y))
        .with(BoxOccluder(high_y))
        .with(BoxOccluder(low_z))
        .with(BoxOccluder(high_z))
}

/// A sealed 1m thick shell spanning 2..6 on each axis, around an empty 2m cavity spanning 3..5.
pub fn hollow_shell() -> OcclusionFn<impl Fn(Point3f, f32) -> bool> {
    let outer = Extent3f::from_min_and_max(PointN([2.0; 3]), PointN([6.0; 3]));

    OcclusionFn(move |center: Point3f, half_extent: f32| {
        let probe = Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent));
        let in_cavity = probe.minimum.min_component() >= 3.0 && probe.max().max_component() <= 5.0;

        probe.intersects(&outer) && !in_cavity
    })
}

/// A ball of `radius` in the middle of a cube of `edge`.
pub fn sphere_scene(edge: f32, radius: f32) -> SphereOccluder {
    SphereOccluder {
        center: Point3f::fill(0.5 * edge),
        radius,
    }
}

/// `count` random balls of radius 0.5 to 2 scattered over a cube of `edge`, reproducible from `seed`.
pub fn random_spheres(edge: f32, count: usize, seed: u64) -> Occluders {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut occluders = Occluders::default();
    for _ in 0..count {
        let center = PointN([
            rng.gen_range(0.0..edge),
            rng.gen_range(0.0..edge),
            rng.gen_range(0.0..edge),
        ]);
        occluders = occluders.with(SphereOccluder {
            center,
            radius: rng.gen_range(0.5..2.0),
        });
    }

    occluders
}
