use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type LayerIndex = u8;
pub type NodeIndex = u32;
pub type SubNodeIndex = u8;

/// Identifies one cell of a `VoxelOctree`.
///
/// For layers 1 and above, `node_index` indexes the Morton-sorted node array of the layer and `sub_node_index` is
/// always 0.
///
/// At layer 0, `node_index` indexes the leaf array. Each layer-0 node owns the leaf with the same index, so the node
/// array and leaf array share indices. `sub_node_index` selects one of the 64 sub-voxels of that leaf, but only when
/// the leaf has some occlusion. A completely free leaf is navigated as a single cell, addressed with
/// `sub_node_index == 0`.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct NodeAddress {
    pub layer_index: LayerIndex,
    pub node_index: NodeIndex,
    pub sub_node_index: SubNodeIndex,
}

impl NodeAddress {
    #[inline]
    pub const fn new(layer_index: LayerIndex, node_index: NodeIndex) -> Self {
        Self {
            layer_index,
            node_index,
            sub_node_index: 0,
        }
    }

    #[inline]
    pub const fn sub_node(node_index: NodeIndex, sub_node_index: SubNodeIndex) -> Self {
        Self {
            layer_index: 0,
            node_index,
            sub_node_index,
        }
    }

    #[inline]
    pub fn is_leaf_layer(&self) -> bool {
        self.layer_index == 0
    }

    /// The same address with the sub-voxel selection dropped.
    #[inline]
    pub fn node_address(&self) -> Self {
        Self::new(self.layer_index, self.node_index)
    }
}

impl fmt::Debug for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.layer_index == 0 {
            write!(f, "L0:{}.{}", self.node_index, self.sub_node_index)
        } else {
            write!(f, "L{}:{}", self.layer_index, self.node_index)
        }
    }
}
