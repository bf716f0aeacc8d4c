//! Generation of a `VoxelOctree` from an occlusion oracle.
//!
//! The builder runs in phases, each in its own tracing span:
//!
//! 1. **First pass rasterization**: every cell of layer 1 is probed once. The blocked codes are then propagated up to
//!    every coarser layer by Morton parent (`code >> 3`). Coarse layers are never probed directly.
//! 2. **Layer 0 rasterization**: the 8 children of every blocked layer-1 cell become layer-0 nodes. Each is probed at
//!    full resolution, and the ones that hit are probed again per sub-voxel to fill their `LeafNode`.
//! 3. **Layer i rasterization** (i = 1 .. top): the children of every blocked cell of layer `i + 1` become nodes; the
//!    top layer is always fully materialized. Each node is linked to its 8 children, found by binary search for
//!    `code << 3` in the layer below.
//! 4. **Neighbor links**, from the second highest layer down to layer 0: each node links to the node across each of
//!    its faces, at the same layer if it exists, otherwise at the first coarser layer where it does.
//!
//! ```
//! use svo_core::prelude::*;
//! use svo_storage::prelude::*;
//!
//! let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([8.0; 3]));
//! let obstacle = Extent3f::from_min_and_shape(PointN([3.0; 3]), PointN([2.0; 3]));
//! let oracle = OcclusionFn(|center: Point3f, half_extent: f32| {
//!     Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent)).intersects(&obstacle)
//! });
//!
//! let octree = OctreeBuilder::new(bounds, GenerationSettings { voxel_size: 1.0, clearance: 0.0 })
//!     .build(&oracle)
//!     .unwrap();
//!
//! assert_eq!(octree.layer_count(), 4);
//! assert!(octree.address_from_position(PointN([4.0; 3])).is_none());
//! ```

use crate::{GenerationError, Layer, LayerIndex, LeafNode, NodeAddress, OctreeNode, VoxelOctree};
use crate::node::{sub_node_coordinates, LEAF_EDGE, LEAF_SUB_NODE_COUNT};

use svo_core::{Extent3f, MortonCode, NeighborDirection, Point3f};

use auto_impl::auto_impl;
use tracing::{debug, info, info_span, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layer-0 coordinates must fit in a `MortonCode`, so the finest layer has at most 2^16 cells per axis.
pub const MAX_LAYER_COUNT: usize = 17;

/// Answers whether some region of the world is blocked.
#[auto_impl(&, &mut, Box)]
pub trait OcclusionOracle {
    /// Returns `true` iff anything blocks the axis-aligned cube centered on `center` with half edge length
    /// `half_extent`.
    fn is_occluded(&self, center: Point3f, half_extent: f32) -> bool;
}

/// Adapts a closure `Fn(center, half_extent) -> bool` into an `OcclusionOracle`.
#[derive(Clone, Copy)]
pub struct OcclusionFn<F>(pub F);

impl<F> OcclusionOracle for OcclusionFn<F>
where
    F: Fn(Point3f, f32) -> bool,
{
    #[inline]
    fn is_occluded(&self, center: Point3f, half_extent: f32) -> bool {
        (self.0)(center, half_extent)
    }
}

/// An oracle for empty space.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOcclusion;

impl OcclusionOracle for NoOcclusion {
    #[inline]
    fn is_occluded(&self, _center: Point3f, _half_extent: f32) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct GenerationSettings {
    /// Edge length of a layer-0 node. Leaf sub-voxels are a quarter of this.
    pub voxel_size: f32,
    /// Added to the half extent of every occlusion probe, so that free space keeps this distance from geometry.
    pub clearance: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            voxel_size: 1.0,
            clearance: 0.0,
        }
    }
}

/// The shape of the octree that covers some volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeLayout {
    /// The cube covered by the top layer. It is centered on the requested volume and at least as large.
    pub navigation_bounds: Extent3f,
    pub layer_count: usize,
    /// Edge length of a layer-0 node.
    pub voxel_size: f32,
}

impl OctreeLayout {
    pub fn new(volume_bounds: Extent3f, voxel_size: f32) -> Result<Self, GenerationError> {
        if !(voxel_size > 0.0 && voxel_size.is_finite()) {
            return Err(GenerationError::InvalidVoxelSize(voxel_size));
        }
        if volume_bounds.is_empty()
            || !volume_bounds.minimum.is_finite()
            || !volume_bounds.shape.is_finite()
        {
            return Err(GenerationError::EmptyBounds);
        }

        // Smallest power of 2 number of voxels spanning the longest edge. The tolerance keeps exact multiples from
        // rounding up a whole layer.
        let max_edge = volume_bounds.shape.max_component() * (1.0 - 1e-6);
        let mut exponent = 0;
        while exponent < 64 && voxel_size * 2f32.powi(exponent) < max_edge {
            exponent += 1;
        }
        let layer_count = exponent as usize + 1;

        if layer_count < 2 {
            return Err(GenerationError::LayerCountTooSmall { layer_count });
        }
        if layer_count > MAX_LAYER_COUNT {
            return Err(GenerationError::TooManyLayers {
                layer_count,
                max: MAX_LAYER_COUNT,
            });
        }

        let edge = voxel_size * 2f32.powi(exponent);

        Ok(Self {
            navigation_bounds: Extent3f::cube(volume_bounds.center(), edge),
            layer_count,
            voxel_size,
        })
    }

    #[inline]
    pub fn top_layer_index(&self) -> LayerIndex {
        (self.layer_count - 1) as LayerIndex
    }

    #[inline]
    pub fn layer_voxel_size(&self, layer_index: LayerIndex) -> f32 {
        self.voxel_size * 2f32.powi(layer_index as i32)
    }

    /// Number of cells along each axis of `layer_index`.
    #[inline]
    pub fn layer_resolution(&self, layer_index: LayerIndex) -> i32 {
        1 << (self.top_layer_index() - layer_index)
    }

    /// The center of the cell with `code` in `layer_index`.
    #[inline]
    pub fn cell_center(&self, layer_index: LayerIndex, code: MortonCode) -> Point3f {
        let size = self.layer_voxel_size(layer_index);

        self.navigation_bounds.minimum
            + Point3f::from(code.coordinates()) * size
            + Point3f::fill(0.5 * size)
    }
}

/// Builds `VoxelOctree`s for one volume. See the module docs for the algorithm.
#[derive(Clone, Copy, Debug)]
pub struct OctreeBuilder {
    volume_bounds: Extent3f,
    settings: GenerationSettings,
}

impl OctreeBuilder {
    pub fn new(volume_bounds: Extent3f, settings: GenerationSettings) -> Self {
        Self {
            volume_bounds,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn layout(&self) -> Result<OctreeLayout, GenerationError> {
        OctreeLayout::new(self.volume_bounds, self.settings.voxel_size)
    }

    /// Rasterizes the volume with `oracle`. Runs to completion on the calling thread.
    pub fn build(&self, oracle: impl OcclusionOracle) -> Result<VoxelOctree, GenerationError> {
        let _span = info_span!("build_octree").entered();

        let layout = self.layout().map_err(|e| {
            warn!("Octree generation failed: {}", e);
            e
        })?;

        let mut rasterizer = Rasterizer::new(layout, self.settings.clearance, oracle);
        rasterizer.first_pass_rasterization();
        rasterizer.rasterize_layer_zero();
        for layer_index in 1..layout.layer_count {
            rasterizer.rasterize_layer(layer_index as LayerIndex);
        }
        rasterizer.build_neighbor_links();

        let probe_count = rasterizer.probe_count;
        let octree = VoxelOctree::from_parts(
            layout.navigation_bounds,
            rasterizer.layers,
            rasterizer.leaves,
        );
        info!(
            layer_count = octree.layer_count(),
            node_count = octree.node_count(),
            leaf_count = octree.leaves().len(),
            probe_count,
            generation = octree.generation(),
            "Built voxel octree"
        );

        Ok(octree)
    }

    /// Replaces `octree` with a fresh build. On failure, `octree` is left cleared and invalid rather than holding a
    /// mix of old and new data.
    pub fn build_into(
        &self,
        octree: &mut VoxelOctree,
        oracle: impl OcclusionOracle,
    ) -> Result<(), GenerationError> {
        match self.build(oracle) {
            Ok(built) => {
                *octree = built;
                Ok(())
            }
            Err(e) => {
                octree.clear();
                Err(e)
            }
        }
    }
}

struct Rasterizer<O> {
    layout: OctreeLayout,
    clearance: f32,
    oracle: O,
    layers: Vec<Layer>,
    leaves: Vec<LeafNode>,
    /// Sorted blocked codes, indexed by layer. Layer 0 is never blocked; its occlusion lives in the leaves.
    blocked: Vec<Vec<MortonCode>>,
    probe_count: usize,
}

impl<O> Rasterizer<O>
where
    O: OcclusionOracle,
{
    fn new(layout: OctreeLayout, clearance: f32, oracle: O) -> Self {
        let layers = (0..layout.layer_count)
            .map(|i| {
                let i = i as LayerIndex;
                Layer::new(layout.layer_voxel_size(i), layout.layer_resolution(i))
            })
            .collect();

        Self {
            layout,
            clearance,
            oracle,
            layers,
            leaves: Vec::new(),
            blocked: vec![Vec::new(); layout.layer_count],
            probe_count: 0,
        }
    }

    fn is_occluded(&mut self, center: Point3f, half_extent: f32) -> bool {
        self.probe_count += 1;

        self.oracle.is_occluded(center, half_extent + self.clearance)
    }

    fn first_pass_rasterization(&mut self) {
        let _span = info_span!("first_pass_rasterization").entered();

        let half_extent = 0.5 * self.layout.layer_voxel_size(1);
        let cell_count = self.layers[1].max_node_count();
        let mut blocked = Vec::new();
        // Iterating in code order keeps the blocked list sorted.
        for code in (0..cell_count).map(MortonCode) {
            let center = self.layout.cell_center(1, code);
            if self.is_occluded(center, half_extent) {
                blocked.push(code);
            }
        }
        self.blocked[1] = blocked;

        for layer_index in 2..self.layout.layer_count {
            let mut parents: Vec<MortonCode> = self.blocked[layer_index - 1]
                .iter()
                .map(|c| c.parent())
                .collect();
            parents.dedup();
            self.blocked[layer_index] = parents;
        }

        for (layer_index, blocked) in self.blocked.iter().enumerate().skip(1) {
            debug!(layer_index, blocked = blocked.len(), "Blocked cells");
        }
    }

    fn rasterize_layer_zero(&mut self) {
        let _span = info_span!("rasterize_layer", layer_index = 0).entered();

        let parents = std::mem::take(&mut self.blocked[1]);
        let mut nodes = Vec::with_capacity(parents.len() * 8);
        self.leaves.reserve(parents.len() * 8);
        for parent in parents.iter() {
            for child_index in 0..8 {
                let code = parent.child(child_index);
                let leaf = self.rasterize_leaf(code);
                // Leaf and node share the index.
                let index = nodes.len() as u32;
                let mut node = OctreeNode::new(code);
                if !leaf.is_completely_free() {
                    node.first_child = Some(NodeAddress::new(0, index));
                }
                self.leaves.push(leaf);
                nodes.push(node);
            }
        }
        self.blocked[1] = parents;
        *self.layers[0].nodes_mut() = nodes;

        debug!(
            nodes = self.layers[0].len(),
            occluded_leaves = self.leaves.iter().filter(|l| !l.is_completely_free()).count(),
            "Rasterized leaves"
        );
    }

    fn rasterize_leaf(&mut self, code: MortonCode) -> LeafNode {
        let voxel_size = self.layout.voxel_size;
        let center = self.layout.cell_center(0, code);
        if !self.is_occluded(center, 0.5 * voxel_size) {
            return LeafNode::FREE;
        }

        let sub_size = voxel_size / LEAF_EDGE as f32;
        let node_min = center - Point3f::fill(0.5 * voxel_size);
        let mut leaf = LeafNode::FREE;
        for sub_node_index in 0..LEAF_SUB_NODE_COUNT {
            let sub_center = node_min
                + Point3f::from(sub_node_coordinates(sub_node_index)) * sub_size
                + Point3f::fill(0.5 * sub_size);
            if self.is_occluded(sub_center, 0.5 * sub_size) {
                leaf.set_sub_node_occluded(sub_node_index);
            }
        }

        leaf
    }

    fn rasterize_layer(&mut self, layer_index: LayerIndex) {
        let _span = info_span!("rasterize_layer", layer_index).entered();

        let li = layer_index as usize;
        let candidates: Vec<MortonCode> = if layer_index == self.layout.top_layer_index() {
            (0..self.layers[li].max_node_count()).map(MortonCode).collect()
        } else {
            self.blocked[li + 1]
                .iter()
                .flat_map(|parent| (0..8).map(move |i| parent.child(i)))
                .collect()
        };

        let (lower, upper) = self.layers.split_at_mut(li);
        let children = &mut lower[li - 1];
        let layer = &mut upper[0];
        let mut nodes = Vec::with_capacity(candidates.len());
        for code in candidates {
            let mut node = OctreeNode::new(code);
            let node_index = nodes.len() as u32;
            if let Some(first_child) = children.find_node(code.first_child()) {
                node.first_child = Some(NodeAddress::new(layer_index - 1, first_child));
                // Precondition: all 8 children were materialized, contiguously.
                let parent = Some(NodeAddress::new(layer_index, node_index));
                let first_child = first_child as usize;
                for child in children.nodes_mut()[first_child..first_child + 8].iter_mut() {
                    child.parent = parent;
                }
            }
            nodes.push(node);
        }
        *layer.nodes_mut() = nodes;

        debug!(layer_index, nodes = layer.len(), "Rasterized layer");
    }

    fn build_neighbor_links(&mut self) {
        for layer_index in (0..self.layout.top_layer_index()).rev() {
            let _span = info_span!("build_neighbor_links", layer_index).entered();

            let li = layer_index as usize;
            for node_index in 0..self.layers[li].len() {
                let code = self.layers[li].nodes()[node_index].morton_code;
                let mut neighbors = [None; 6];
                for direction in NeighborDirection::ALL {
                    neighbors[direction.index()] = self.find_neighbor(layer_index, code, direction);
                }
                self.layers[li].nodes_mut()[node_index].neighbors = neighbors;
            }
        }
    }

    /// The node across the face of `code` in `direction`, searching coarser layers until one contains it.
    fn find_neighbor(
        &self,
        layer_index: LayerIndex,
        code: MortonCode,
        direction: NeighborDirection,
    ) -> Option<NodeAddress> {
        let mut coordinates = code.coordinates() + direction.get_vector();
        if !self.layers[layer_index as usize].contains_coordinates(coordinates) {
            return None;
        }

        let mut layer_index = layer_index;
        loop {
            let layer = self.layers.get(layer_index as usize)?;
            let neighbor_code = MortonCode::from_coordinates(coordinates)?;
            if let Some(node_index) = layer.find_node(neighbor_code) {
                // Nothing can move into a solid leaf.
                let is_solid_leaf = layer_index == 0
                    && self.leaves[node_index as usize].is_completely_occluded();
                if is_solid_leaf {
                    return None;
                }

                return Some(NodeAddress::new(layer_index, node_index));
            }

            // The neighbor's parent was never blocked, so it is a leaf of the octree somewhere above.
            layer_index += 1;
            coordinates = coordinates.right_shift(1);
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::*;

    use pretty_assertions::assert_eq;
    use svo_core::PointN;

    #[test]
    fn layout_of_power_of_two_volume() {
        let layout = OctreeLayout::new(cube_bounds(8.0), 1.0).unwrap();

        assert_eq!(layout.layer_count, 4);
        assert_eq!(layout.navigation_bounds, cube_bounds(8.0));
        assert_eq!(layout.layer_resolution(0), 8);
        assert_eq!(layout.layer_resolution(3), 1);
        assert_eq!(layout.layer_voxel_size(2), 4.0);
    }

    #[test]
    fn layout_rounds_up_and_centers() {
        let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([5.0, 3.0, 1.0]));
        let layout = OctreeLayout::new(bounds, 1.0).unwrap();

        assert_eq!(layout.layer_count, 4);
        assert_eq!(
            layout.navigation_bounds,
            Extent3f::cube(PointN([2.5, 1.5, 0.5]), 8.0)
        );
    }

    #[test]
    fn degenerate_layouts_are_rejected() {
        assert_eq!(
            OctreeLayout::new(cube_bounds(1.0), 1.0),
            Err(GenerationError::LayerCountTooSmall { layer_count: 1 })
        );
        assert_eq!(
            OctreeLayout::new(cube_bounds(1.0), 0.0),
            Err(GenerationError::InvalidVoxelSize(0.0))
        );
        assert_eq!(
            OctreeLayout::new(Extent3f::default(), 1.0),
            Err(GenerationError::EmptyBounds)
        );
        assert!(matches!(
            OctreeLayout::new(cube_bounds(1.0e9), 1.0),
            Err(GenerationError::TooManyLayers { .. })
        ));
    }

    #[test]
    fn failed_build_clears_previous_octree() {
        let mut octree = centered_obstacle_octree();
        assert!(octree.is_valid());

        let builder = OctreeBuilder::new(cube_bounds(0.5), GenerationSettings::default());
        assert!(builder.build_into(&mut octree, NoOcclusion).is_err());
        assert!(!octree.is_valid());
        assert_eq!(octree, VoxelOctree::invalid());
    }

    #[test]
    fn free_volume_is_a_single_top_node() {
        let octree = build_with(cube_bounds(8.0), 1.0, |_, _| false);

        let node_counts: Vec<_> = octree.layers().iter().map(|l| l.len()).collect();
        assert_eq!(node_counts, vec![0, 0, 0, 1]);
        assert!(octree.leaves().is_empty());
    }

    #[test]
    fn centered_obstacle_node_counts() {
        let octree = centered_obstacle_octree();

        let node_counts: Vec<_> = octree.layers().iter().map(|l| l.len()).collect();
        assert_eq!(node_counts, vec![64, 64, 8, 1]);
        assert_eq!(octree.leaves().len(), 64);

        let occluded: Vec<_> = octree
            .leaves()
            .iter()
            .filter(|l| !l.is_completely_free())
            .collect();
        assert_eq!(occluded.len(), 8);
        assert!(occluded.iter().all(|l| l.is_completely_occluded()));
    }

    #[test]
    fn layers_are_sorted() {
        let octree = sphere_octree();

        for layer in octree.layers() {
            assert!(layer.is_sorted());
        }
    }

    #[test]
    fn children_are_contiguous_and_point_back_to_parent() {
        let octree = sphere_octree();

        for (layer_index, layer) in octree.layers().iter().enumerate().skip(1) {
            for (node_index, node) in layer.nodes().iter().enumerate() {
                let first_child = match node.first_child {
                    Some(c) => c,
                    None => continue,
                };
                assert_eq!(first_child.layer_index as usize, layer_index - 1);
                let parent = NodeAddress::new(layer_index as u8, node_index as u32);
                for i in 0..8 {
                    let child_address = NodeAddress::new(
                        first_child.layer_index,
                        first_child.node_index + i,
                    );
                    let child = octree.node(child_address).unwrap();
                    assert_eq!(child.parent, Some(parent));
                    assert_eq!(child.morton_code, node.morton_code.child(i as u8));
                }
            }
        }
    }

    #[test]
    fn leaf_child_link_is_set_iff_leaf_has_occlusion() {
        let octree = sphere_octree();

        for (node_index, node) in octree.layers()[0].nodes().iter().enumerate() {
            let leaf = octree.leaves()[node_index];
            assert_eq!(node.has_children(), !leaf.is_completely_free());
            if let Some(child) = node.first_child {
                assert_eq!(child, NodeAddress::new(0, node_index as u32));
            }
        }
    }

    #[test]
    fn top_layer_has_no_neighbors() {
        let octree = centered_obstacle_octree();
        let top = octree.layers().last().unwrap();

        assert_eq!(top.nodes()[0].neighbors, [None; 6]);
        assert_eq!(top.nodes()[0].parent, None);
    }

    #[test]
    fn neighbor_links_point_across_faces() {
        let octree = sphere_octree();

        for (layer_index, layer) in octree.layers().iter().enumerate() {
            for node in layer.nodes() {
                for direction in NeighborDirection::ALL {
                    let neighbor_address = match node.neighbor(direction) {
                        Some(n) => n,
                        None => continue,
                    };
                    assert!(neighbor_address.layer_index as usize >= layer_index);
                    let neighbor = octree.node(neighbor_address).unwrap();
                    let shift = neighbor_address.layer_index as usize - layer_index;
                    let expected = (node.morton_code.coordinates() + direction.get_vector())
                        .right_shift(shift as i32);
                    assert_eq!(neighbor.morton_code.coordinates(), expected);
                }
            }
        }
    }

    #[test]
    fn neighbors_of_solid_leaves_are_unlinked() {
        let octree = centered_obstacle_octree();

        for node in octree.layers()[0].nodes() {
            for neighbor in node.neighbors.iter().flatten() {
                if neighbor.layer_index == 0 {
                    let leaf = octree.leaves()[neighbor.node_index as usize];
                    assert!(!leaf.is_completely_occluded());
                }
            }
        }
    }

    #[test]
    fn clearance_inflates_obstacles() {
        let without = centered_obstacle_octree();
        let with = build_with_settings(
            cube_bounds(8.0),
            GenerationSettings {
                voxel_size: 1.0,
                clearance: 0.3,
            },
            centered_obstacle(),
        );

        let count_occluded =
            |o: &VoxelOctree| o.leaves().iter().map(|l| l.occluded_count()).sum::<u32>();
        assert!(count_occluded(&with) > count_occluded(&without));
        // Within the clearance of the obstacle face.
        assert!(without.address_from_position(PointN([2.9, 4.0, 4.0])).is_some());
        assert_eq!(with.address_from_position(PointN([2.9, 4.0, 4.0])), None);
    }
}
