use svo_navigation::prelude::*;

fn main() {
    let args: Vec<_> = std::env::args().collect();
    let edge: f32 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(64.0);
    let voxel_size: f32 = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(1.0);

    println!("Building a {}m volume with {}m voxels\n", edge, voxel_size);

    let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), Point3f::fill(edge));
    let settings = GenerationSettings {
        voxel_size,
        clearance: 0.0,
    };

    println!("Empty volume:");
    measure_octree_size(bounds, settings, NoOcclusion);

    println!("Centered ball:");
    let center = Point3f::fill(0.5 * edge);
    let radius = 0.3 * edge;
    measure_octree_size(
        bounds,
        settings,
        OcclusionFn(|c: Point3f, half_extent: f32| {
            Extent3f::from_center_and_half_extent(c, Point3f::fill(half_extent)).distance_squared_to(center)
                < radius * radius
        }),
    );

    println!("Ground plane:");
    let ground = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([edge, edge, 0.1 * edge]));
    measure_octree_size(
        bounds,
        settings,
        OcclusionFn(|c: Point3f, half_extent: f32| {
            Extent3f::from_center_and_half_extent(c, Point3f::fill(half_extent)).intersects(&ground)
        }),
    );
}

fn measure_octree_size(bounds: Extent3f, settings: GenerationSettings, oracle: impl OcclusionOracle) {
    let octree = OctreeBuilder::new(bounds, settings).build(oracle).unwrap();

    let dense_voxel_count = octree
        .layer(0)
        .map(|layer| layer.max_node_count() * 64)
        .unwrap_or(0);
    let serialized_size_bytes = octree.to_bytes().unwrap().len();

    println!(
        "layers = {}, nodes = {}, leaves = {}, free nodes = {}",
        octree.layer_count(),
        octree.node_count(),
        octree.leaves().len(),
        octree.free_nodes().len(),
    );
    println!(
        "dense sub-voxels = {}, serialized = {} bytes; {:.2} bits per sub-voxel\n",
        dense_voxel_count,
        serialized_size_bytes,
        8.0 * serialized_size_bytes as f32 / dense_voxel_count.max(1) as f32
    );
}
