//! The layered sparse voxel octree.
//!
//! # Layout
//!
//! A `VoxelOctree` covers a cubic region of space, its navigation bounds. Layer `i` divides the bounds into cubes of
//! edge `voxel_size(0) * 2^i`; the top layer is a single cube covering everything. Nodes of a layer are only
//! materialized where the parent in the layer above is (partially) occluded, so the octree is sparse: large free
//! regions are represented by a single childless node at a coarse layer.
//!
//! Layer 0 nodes additionally own a `LeafNode`, a 4x4x4 occupancy grid of sub-voxels, which gives the finest
//! resolution of the octree.
//!
//! # Addressing
//!
//! Nodes are identified by `NodeAddress`, a `(layer, index, sub-voxel)` triple. Addresses are only meaningful for the
//! octree generation that produced them; see `VoxelOctree::generation`.
//!
//! ```
//! use svo_core::prelude::*;
//! use svo_storage::prelude::*;
//!
//! let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([8.0; 3]));
//! let settings = GenerationSettings { voxel_size: 1.0, clearance: 0.0 };
//! let octree = OctreeBuilder::new(bounds, settings).build(&NoOcclusion).unwrap();
//!
//! // The volume is free, so the whole thing is a single node.
//! let address = octree.address_from_position(PointN([1.0, 2.0, 3.0])).unwrap();
//! assert_eq!(address.layer_index as usize, octree.layer_count() - 1);
//! assert_eq!(octree.position_from_address(address), Some(PointN([4.0; 3])));
//! ```

use crate::{
    node::{sub_node_coordinates, sub_node_index_at, LEAF_EDGE},
    Layer, LayerIndex, LeafNode, NodeAddress, OctreeError, OctreeNode,
};

use svo_core::{cell_containing_point3f, Extent3f, MortonCode, Point, Point3f, Point3i};

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier for a successfully generated octree. Never 0.
pub(crate) fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// See the module docs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct VoxelOctree {
    pub(crate) navigation_bounds: Extent3f,
    pub(crate) layers: Vec<Layer>,
    pub(crate) leaves: Vec<LeafNode>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) generation: u64,
}

impl VoxelOctree {
    /// The cleared state. Every query on it fails.
    pub fn invalid() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        navigation_bounds: Extent3f,
        layers: Vec<Layer>,
        leaves: Vec<LeafNode>,
    ) -> Self {
        Self {
            navigation_bounds,
            layers,
            leaves,
            generation: next_generation(),
        }
    }

    /// Resets to the cleared, invalid state.
    pub fn clear(&mut self) {
        *self = Self::invalid();
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.layers.len() >= 2
    }

    /// Identifies the build that produced this octree. Addresses and paths computed against an older generation must
    /// be discarded. The invalid octree has generation 0.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn check_generation(&self, generation: u64) -> Result<(), OctreeError> {
        if !self.is_valid() {
            return Err(OctreeError::InvalidOctree);
        }
        if generation != self.generation {
            return Err(OctreeError::StaleGeneration {
                expected: self.generation,
                actual: generation,
            });
        }

        Ok(())
    }

    #[inline]
    pub fn navigation_bounds(&self) -> &Extent3f {
        &self.navigation_bounds
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn top_layer_index(&self) -> Option<LayerIndex> {
        self.layers.len().checked_sub(1).map(|i| i as LayerIndex)
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, layer_index: LayerIndex) -> Option<&Layer> {
        self.layers.get(layer_index as usize)
    }

    #[inline]
    pub fn leaves(&self) -> &[LeafNode] {
        &self.leaves
    }

    /// Edge length of a node in `layer_index`.
    #[inline]
    pub fn voxel_size(&self, layer_index: LayerIndex) -> Option<f32> {
        self.layer(layer_index).map(|l| l.voxel_size())
    }

    /// Edge length of a leaf sub-voxel.
    #[inline]
    pub fn sub_node_size(&self) -> Option<f32> {
        self.voxel_size(0).map(|s| s / LEAF_EDGE as f32)
    }

    /// Addresses of every node of the top layer.
    pub fn root_addresses(&self) -> impl Iterator<Item = NodeAddress> + '_ {
        let top = self.top_layer_index().unwrap_or(0);
        let count = self.layer(top).map(|l| l.len()).unwrap_or(0);

        (0..count).map(move |i| NodeAddress::new(top, i as u32))
    }

    /// The node at `address`, ignoring the sub-voxel selection.
    #[inline]
    pub fn node(&self, address: NodeAddress) -> Option<&OctreeNode> {
        self.layer(address.layer_index)?.node(address.node_index)
    }

    pub fn try_node(&self, address: NodeAddress) -> Result<&OctreeNode, OctreeError> {
        if !self.is_valid() {
            return Err(OctreeError::InvalidOctree);
        }

        self.node(address).ok_or(OctreeError::InvalidAddress(address))
    }

    /// The leaf owned by the layer-0 node at `address`.
    #[inline]
    pub fn leaf(&self, address: NodeAddress) -> Option<&LeafNode> {
        if address.layer_index != 0 {
            return None;
        }

        self.leaves.get(address.node_index as usize)
    }

    /// Returns `true` iff `address` refers to a node of this octree with a sub-voxel index in range.
    pub fn contains_address(&self, address: NodeAddress) -> bool {
        self.node(address).is_some()
            && (address.layer_index == 0 || address.sub_node_index == 0)
            && address.sub_node_index < 64
    }

    /// Returns `true` iff `address` refers to a sub-voxel of a leaf that has some occlusion, as opposed to a whole node.
    #[inline]
    pub fn addresses_sub_node(&self, address: NodeAddress) -> bool {
        address.layer_index == 0
            && self
                .node(address)
                .map(|n| n.has_children())
                .unwrap_or(false)
    }

    /// Returns `true` iff the cell at `address` contains no occlusion.
    pub fn is_address_free(&self, address: NodeAddress) -> bool {
        let node = match self.node(address) {
            Some(n) => n,
            None => return false,
        };
        if address.layer_index > 0 {
            return !node.has_children();
        }

        match self.leaf(address) {
            Some(leaf) if node.has_children() => !leaf.is_sub_node_occluded(address.sub_node_index),
            Some(_) => true,
            None => false,
        }
    }

    /// The box covered by the cell with `code` in `layer_index`.
    fn cell_extent(&self, layer_index: LayerIndex, code: MortonCode) -> Option<Extent3f> {
        let voxel_size = self.voxel_size(layer_index)?;
        let min = self.navigation_bounds.minimum + Point3f::from(code.coordinates()) * voxel_size;

        Some(Extent3f::from_min_and_shape(min, Point3f::fill(voxel_size)))
    }

    /// The box covered by the cell at `address`. A sub-voxel address of a leaf with occlusion gives the sub-voxel's box,
    /// otherwise the whole node's box.
    pub fn node_bounds(&self, address: NodeAddress) -> Option<Extent3f> {
        let node = self.node(address)?;
        let node_extent = self.cell_extent(address.layer_index, node.morton_code)?;
        if !self.addresses_sub_node(address) {
            return Some(node_extent);
        }

        let sub_size = node_extent.shape.x() / LEAF_EDGE as f32;
        let sub_min = node_extent.minimum
            + Point3f::from(sub_node_coordinates(address.sub_node_index)) * sub_size;

        Some(Extent3f::from_min_and_shape(sub_min, Point3f::fill(sub_size)))
    }

    /// The center of the cell at `address`.
    pub fn position_from_address(&self, address: NodeAddress) -> Option<Point3f> {
        self.node_bounds(address).map(|e| e.center())
    }

    /// Half the edge length of the cell at `address`.
    pub fn node_half_size(&self, address: NodeAddress) -> Option<f32> {
        self.node_bounds(address).map(|e| 0.5 * e.shape.x())
    }

    /// Returns `true` iff `position` lies in the box of the cell at `address`, boundary included.
    pub fn node_contains_position(&self, address: NodeAddress, position: Point3f) -> bool {
        self.node_bounds(address)
            .map(|b| b.contains(position))
            .unwrap_or(false)
    }

    /// Finds the free cell containing `position`, descending from the top layer through subdivided nodes. Returns
    /// `None` if the position is outside of the navigation bounds or inside of an occluded sub-voxel.
    pub fn address_from_position(&self, position: Point3f) -> Option<NodeAddress> {
        if !self.is_valid() || !self.navigation_bounds.contains(position) {
            return None;
        }

        let local = position - self.navigation_bounds.minimum;
        let mut layer_index = self.top_layer_index()?;
        loop {
            let layer = self.layer(layer_index)?;
            let max_coordinate = layer.resolution() - 1;
            if max_coordinate < 0 {
                return None;
            }
            // Positions on the upper boundary belong to the last cell.
            let coordinates = cell_containing_point3f(&local, layer.voxel_size())
                .map_components(|c| c.clamp(0, max_coordinate));
            let code = MortonCode::from_coordinates(coordinates)?;
            let node_index = layer.find_node(code)?;
            let node = layer.node(node_index)?;

            let first_child = match node.first_child {
                None => return Some(NodeAddress::new(layer_index, node_index)),
                Some(child) => child,
            };
            if layer_index > 0 {
                layer_index = first_child.layer_index;
                continue;
            }

            let leaf = self.leaves.get(first_child.node_index as usize)?;
            let node_min = Point3f::from(coordinates) * layer.voxel_size();
            let sub_size = layer.voxel_size() / LEAF_EDGE as f32;
            let sub_coordinates = cell_containing_point3f(&(local - node_min), sub_size)
                .map_components(|c| c.clamp(0, LEAF_EDGE - 1));
            let sub_node_index = sub_node_index_at(sub_coordinates)?;
            if leaf.is_sub_node_occluded(sub_node_index) {
                return None;
            }

            return Some(NodeAddress::sub_node(node_index, sub_node_index));
        }
    }

    /// Coordinates of the node at `address` within its layer.
    pub fn node_coordinates(&self, address: NodeAddress) -> Option<Point3i> {
        self.node(address).map(|n| n.morton_code.coordinates())
    }

    /// Total number of materialized nodes over all layers.
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
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
    fn invalid_octree_answers_nothing() {
        let octree = VoxelOctree::invalid();

        assert!(!octree.is_valid());
        assert_eq!(octree.generation(), 0);
        assert_eq!(octree.address_from_position(PointN([0.0; 3])), None);
        assert_eq!(octree.position_from_address(NodeAddress::new(0, 0)), None);
        assert_eq!(
            octree.check_generation(0),
            Err(OctreeError::InvalidOctree)
        );
    }

    #[test]
    fn address_round_trip_for_every_free_cell() {
        let octree = centered_obstacle_octree();

        let mut checked = 0;
        for (layer_index, layer) in octree.layers().iter().enumerate() {
            for (node_index, node) in layer.nodes().iter().enumerate() {
                let node_address = NodeAddress::new(layer_index as u8, node_index as u32);
                if layer_index > 0 && node.has_children() {
                    continue;
                }
                let addresses: Vec<_> = if octree.addresses_sub_node(node_address) {
                    let leaf = octree.leaf(node_address).unwrap();
                    leaf.free_sub_nodes()
                        .map(|s| NodeAddress::sub_node(node_index as u32, s))
                        .collect()
                } else {
                    vec![node_address]
                };
                for address in addresses {
                    let position = octree.position_from_address(address).unwrap();
                    assert_eq!(octree.address_from_position(position), Some(address));
                    checked += 1;
                }
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn occluded_positions_have_no_address() {
        let octree = centered_obstacle_octree();

        assert_eq!(octree.address_from_position(PointN([4.0; 3])), None);
        assert_eq!(octree.address_from_position(PointN([3.5, 4.5, 3.1])), None);
        assert!(octree
            .address_from_position(PointN([2.5, 4.0, 4.0]))
            .is_some());
    }

    #[test]
    fn positions_outside_of_bounds_have_no_address() {
        let octree = centered_obstacle_octree();

        assert_eq!(octree.address_from_position(PointN([-0.1, 1.0, 1.0])), None);
        assert_eq!(octree.address_from_position(PointN([1.0, 8.1, 1.0])), None);
        // The upper boundary itself is inside.
        assert!(octree.address_from_position(PointN([8.0; 3])).is_some());
    }

    #[test]
    fn partially_occluded_leaf_uses_sub_voxels() {
        // Occlude a quarter-voxel slab at the bottom of the volume.
        let octree = build_with(
            cube_bounds(4.0),
            1.0,
            |p: Point3f, h: f32| p.z() - h < 0.25,
        );

        let address = octree
            .address_from_position(PointN([0.5, 0.5, 0.6]))
            .unwrap();
        assert_eq!(address.layer_index, 0);
        assert!(octree.addresses_sub_node(address));
        let extent = octree.node_bounds(address).unwrap();
        assert_eq!(extent.shape, PointN([0.25; 3]));
        assert!(octree.node_contains_position(address, PointN([0.5, 0.5, 0.6])));
        assert!(!octree.node_contains_position(address, PointN([0.5, 0.5, 0.9])));

        assert_eq!(octree.address_from_position(PointN([0.5, 0.5, 0.1])), None);
    }

    #[test]
    fn stale_generation_is_detected() {
        let a = centered_obstacle_octree();
        let b = centered_obstacle_octree();

        assert_ne!(a.generation(), b.generation());
        assert_eq!(a.check_generation(a.generation()), Ok(()));
        assert_eq!(
            a.check_generation(b.generation()),
            Err(OctreeError::StaleGeneration {
                expected: a.generation(),
                actual: b.generation()
            })
        );
    }
}
