use crate::{NodeIndex, OctreeNode};

use svo_core::{MortonCode, Point3i};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One resolution level of a `VoxelOctree`. Only the nodes that were materialized during generation are stored, sorted
/// ascending by Morton code.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Layer {
    voxel_size: f32,
    resolution: i32,
    nodes: Vec<OctreeNode>,
}

impl Layer {
    /// An empty layer whose cells have edge length `voxel_size`, with `resolution` cells along each axis.
    pub fn new(voxel_size: f32, resolution: i32) -> Self {
        Self {
            voxel_size,
            resolution,
            nodes: Vec::new(),
        }
    }

    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Number of cells along each axis.
    #[inline]
    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    /// The number of nodes this layer would have if it were fully materialized.
    #[inline]
    pub fn max_node_count(&self) -> u64 {
        (self.resolution.max(0) as u64).saturating_pow(3)
    }

    #[inline]
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&OctreeNode> {
        self.nodes.get(index as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Binary search for the node with `code`.
    #[inline]
    pub fn find_node(&self, code: MortonCode) -> Option<NodeIndex> {
        self.nodes
            .binary_search_by_key(&code, |n| n.morton_code)
            .ok()
            .map(|i| i as NodeIndex)
    }

    #[inline]
    pub fn contains_coordinates(&self, p: Point3i) -> bool {
        let in_range = |c: i32| (0..self.resolution).contains(&c);

        in_range(p.x()) && in_range(p.y()) && in_range(p.z())
    }

    /// Returns `true` iff the node array is sorted ascending by Morton code, with no duplicates.
    pub fn is_sorted(&self) -> bool {
        self.nodes
            .windows(2)
            .all(|w| w[0].morton_code < w[1].morton_code)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<OctreeNode> {
        &mut self.nodes
    }
}
