use crate::NodeAddress;

use svo_core::{morton_coordinates_4x4x4, morton_index_4x4x4, MortonCode, NeighborDirection, Point3i};

use bytemuck::{Pod, Zeroable};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node in any layer of a `VoxelOctree`.
///
/// All links are `None` when there is nothing to link to:
/// - `parent` is `None` only in the top layer
/// - `first_child` is `None` when the node is a homogeneous region. At layers 1 and above that means the region is
///   free. At layer 0 the child link points at the node's leaf, and it is `None` iff that leaf is completely free.
/// - `neighbors[d]` is `None` when the neighbor in direction `d` is outside of the navigation bounds, or (at layer 0)
///   when the neighbor is a completely occluded leaf
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct OctreeNode {
    pub morton_code: MortonCode,
    pub parent: Option<NodeAddress>,
    pub first_child: Option<NodeAddress>,
    pub neighbors: [Option<NodeAddress>; 6],
}

impl OctreeNode {
    pub fn new(morton_code: MortonCode) -> Self {
        Self {
            morton_code,
            ..Default::default()
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    #[inline]
    pub fn neighbor(&self, direction: NeighborDirection) -> Option<NodeAddress> {
        self.neighbors[direction.index()]
    }
}

/// Number of sub-voxels along one edge of a leaf.
pub const LEAF_EDGE: i32 = 4;
/// Number of sub-voxels in a leaf.
pub const LEAF_SUB_NODE_COUNT: u8 = 64;

/// The occupancy of a layer-0 node, as a 4x4x4 grid of sub-voxels. Bit `i` is set iff the sub-voxel with Morton index
/// `i` is occluded.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[repr(transparent)]
pub struct LeafNode(pub u64);

unsafe impl Zeroable for LeafNode {}
unsafe impl Pod for LeafNode {}

impl LeafNode {
    pub const FREE: Self = Self(0);
    pub const OCCLUDED: Self = Self(u64::MAX);

    #[inline]
    pub fn is_completely_free(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_completely_occluded(&self) -> bool {
        self.0 == u64::MAX
    }

    #[inline]
    pub fn is_sub_node_occluded(&self, sub_node_index: u8) -> bool {
        self.0 & (1 << (sub_node_index & 63)) != 0
    }

    #[inline]
    pub fn set_sub_node_occluded(&mut self, sub_node_index: u8) {
        self.0 |= 1 << (sub_node_index & 63);
    }

    /// Returns `None` if `coordinates` are outside of the 4x4x4 grid.
    #[inline]
    pub fn is_occluded_at(&self, coordinates: Point3i) -> Option<bool> {
        sub_node_index_at(coordinates).map(|i| self.is_sub_node_occluded(i))
    }

    pub fn occluded_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of the free sub-voxels, in Morton order.
    pub fn free_sub_nodes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..LEAF_SUB_NODE_COUNT).filter(move |&i| !self.is_sub_node_occluded(i))
    }
}

impl std::fmt::Debug for LeafNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LeafNode({:#018x})", self.0)
    }
}

/// The sub-voxel index for `coordinates` within a leaf, if they are inside of the 4x4x4 grid.
#[inline]
pub fn sub_node_index_at(coordinates: Point3i) -> Option<u8> {
    let in_grid = |c: i32| (0..LEAF_EDGE).contains(&c);
    if in_grid(coordinates.x()) && in_grid(coordinates.y()) && in_grid(coordinates.z()) {
        Some(morton_index_4x4x4(coordinates))
    } else {
        None
    }
}

#[inline]
pub fn sub_node_coordinates(sub_node_index: u8) -> Point3i {
    morton_coordinates_4x4x4(sub_node_index)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
