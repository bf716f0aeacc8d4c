use crate::{
    GenerationSettings, NodeAddress, OcclusionFn, OcclusionOracle, OctreeBuilder, VoxelOctree,
};

use svo_core::{Extent3f, Point3f, PointN};

pub fn cube_bounds(edge: f32) -> Extent3f {
    Extent3f::from_min_and_shape(PointN([0.0; 3]), Point3f::fill(edge))
}

pub fn build_with(
    bounds: Extent3f,
    voxel_size: f32,
    is_occluded: impl Fn(Point3f, f32) -> bool,
) -> VoxelOctree {
    build_with_settings(
        bounds,
        GenerationSettings {
            voxel_size,
            clearance: 0.0,
        },
        OcclusionFn(is_occluded),
    )
}

pub fn build_with_settings(
    bounds: Extent3f,
    settings: GenerationSettings,
    oracle: impl OcclusionOracle,
) -> VoxelOctree {
    OctreeBuilder::new(bounds, settings).build(oracle).unwrap()
}

/// A 2m cube spanning 3..5 on each axis.
pub fn centered_obstacle() -> OcclusionFn<impl Fn(Point3f, f32) -> bool> {
    let obstacle = Extent3f::from_min_and_shape(PointN([3.0; 3]), PointN([2.0; 3]));

    OcclusionFn(move |center: Point3f, half_extent: f32| {
        Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent))
            .intersects(&obstacle)
    })
}

/// An 8m volume of 1m voxels around `centered_obstacle`.
pub fn centered_obstacle_octree() -> VoxelOctree {
    build_with_settings(
        cube_bounds(8.0),
        GenerationSettings::default(),
        centered_obstacle(),
    )
}

/// An 8m volume of 1m voxels around a ball, so that many leaves are only partially occluded.
pub fn sphere_octree() -> VoxelOctree {
    let center = PointN([4.0; 3]);
    let radius = 2.3;

    build_with(cube_bounds(8.0), 1.0, move |c: Point3f, h: f32| {
        Extent3f::from_center_and_half_extent(c, Point3f::fill(h)).distance_squared_to(center)
            < radius * radius
    })
}

pub fn all_free_addresses(octree: &VoxelOctree) -> Vec<NodeAddress> {
    octree.free_nodes()
}
