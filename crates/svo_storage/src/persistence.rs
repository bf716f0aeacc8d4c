//! A versioned binary format for `VoxelOctree`s, so that navigation data can be generated offline and loaded later.
//!
//! The payload is the `bincode` encoding of the layers with the leaf masks packed as raw `u64`s. A little-endian `u32`
//! format version precedes it; files with any other version are rejected instead of being misread.

use crate::{Layer, LeafNode, NodeAddress, OctreeError, VoxelOctree, MAX_LAYER_COUNT};

use svo_core::{Extent3f, Point3f};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FORMAT_VERSION: u32 = 1;

const VERSION_BYTES: usize = std::mem::size_of::<u32>();

#[derive(Deserialize, Serialize)]
struct SerializableOctree {
    navigation_bounds: Extent3f,
    layers: Vec<Layer>,
    leaves: Vec<u64>,
}

impl VoxelOctree {
    /// Encodes the octree in the current `FORMAT_VERSION`. The generation is not stored.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OctreeError> {
        if !self.is_valid() {
            return Err(OctreeError::InvalidOctree);
        }

        let serializable = SerializableOctree {
            navigation_bounds: self.navigation_bounds,
            layers: self.layers.clone(),
            leaves: bytemuck::cast_slice::<LeafNode, u64>(&self.leaves).to_vec(),
        };
        let payload =
            bincode::serialize(&serializable).map_err(|e| OctreeError::Encoding(e.to_string()))?;

        let mut bytes = Vec::with_capacity(VERSION_BYTES + payload.len());
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        debug!(bytes = bytes.len(), "Encoded voxel octree");

        Ok(bytes)
    }

    /// Decodes an octree written by `to_bytes`. The result gets a fresh generation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OctreeError> {
        if bytes.len() < VERSION_BYTES {
            return Err(OctreeError::Encoding("missing format version".into()));
        }
        let (version_bytes, payload) = bytes.split_at(VERSION_BYTES);
        let mut version = [0; VERSION_BYTES];
        version.copy_from_slice(version_bytes);
        let found = u32::from_le_bytes(version);
        if found != FORMAT_VERSION {
            return Err(OctreeError::IncompatibleVersion {
                found,
                expected: FORMAT_VERSION,
            });
        }

        let SerializableOctree {
            navigation_bounds,
            layers,
            leaves,
        } = bincode::deserialize(payload).map_err(|e| OctreeError::Encoding(e.to_string()))?;
        let leaves = bytemuck::cast_slice::<u64, LeafNode>(&leaves).to_vec();

        if !is_well_formed(&navigation_bounds, &layers, &leaves) {
            debug!("Rejected malformed voxel octree");
            return Err(OctreeError::InvalidOctree);
        }

        Ok(Self::from_parts(navigation_bounds, layers, leaves))
    }
}

/// Checks everything queries rely on without checking again: the layer geometry, the Morton order of every layer, and
/// that every link lands on an existing node of the right layer.
fn is_well_formed(navigation_bounds: &Extent3f, layers: &[Layer], leaves: &[LeafNode]) -> bool {
    if !(2..=MAX_LAYER_COUNT).contains(&layers.len()) {
        return false;
    }
    let top = layers.len() - 1;

    let top_voxel_size = layers[top].voxel_size();
    let bounds_ok = navigation_bounds.minimum.is_finite()
        && navigation_bounds.shape.is_finite()
        && !navigation_bounds.is_empty()
        && navigation_bounds
            .shape
            .approx_eq(&Point3f::fill(top_voxel_size), 1e-4 * top_voxel_size);
    if !bounds_ok {
        return false;
    }

    for (i, layer) in layers.iter().enumerate() {
        let voxel_size = layer.voxel_size();
        if !(voxel_size > 0.0 && voxel_size.is_finite()) || layer.resolution() != 1 << (top - i) {
            return false;
        }
        if i > 0 {
            let expected = 2.0 * layers[i - 1].voxel_size();
            if (voxel_size - expected).abs() > 1e-5 * expected {
                return false;
            }
        }
        if !layer.is_sorted() || layer.len() as u64 > layer.max_node_count() {
            return false;
        }
    }
    if leaves.len() != layers[0].len() {
        return false;
    }

    let points_into = |address: NodeAddress, layer_index: usize| {
        address.layer_index as usize == layer_index
            && (address.node_index as usize) < layers[layer_index].len()
            && address.sub_node_index < 64
    };

    layers.iter().enumerate().all(|(i, layer)| {
        layer.nodes().iter().enumerate().all(|(j, node)| {
            let in_layer = layer.contains_coordinates(node.morton_code.coordinates());
            let parent_ok = match node.parent {
                None => true,
                Some(parent) => i < top && points_into(parent, i + 1),
            };
            let child_ok = match (i, node.first_child) {
                // A layer-0 node links to its own leaf iff that leaf has occlusion.
                (0, child) => match child {
                    Some(child) => child == NodeAddress::new(0, j as u32) && !leaves[j].is_completely_free(),
                    None => leaves[j].is_completely_free(),
                },
                (_, None) => true,
                // Children are 8 contiguous nodes of the layer below.
                (_, Some(child)) => {
                    points_into(child, i - 1) && child.node_index as usize + 8 <= layers[i - 1].len()
                }
            };
            let neighbors_ok = node.neighbors.iter().flatten().all(|n| {
                let n_layer = n.layer_index as usize;
                n_layer >= i && n_layer <= top && points_into(*n, n_layer)
            });

            in_layer && parent_ok && child_ok && neighbors_ok
        })
    })
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
    fn loaded_octree_answers_like_the_saved_one() {
        let octree = sphere_octree();

        let loaded = VoxelOctree::from_bytes(&octree.to_bytes().unwrap()).unwrap();

        assert_ne!(loaded.generation(), octree.generation());
        assert_eq!(loaded.layers(), octree.layers());
        assert_eq!(loaded.leaves(), octree.leaves());
        for p in [PointN([4.0; 3]), PointN([1.0, 1.0, 1.0]), PointN([2.0, 4.0, 4.0])] {
            assert_eq!(loaded.address_from_position(p), octree.address_from_position(p));
        }
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut bytes = centered_obstacle_octree().to_bytes().unwrap();
        bytes[..4].copy_from_slice(&7u32.to_le_bytes());

        assert_eq!(
            VoxelOctree::from_bytes(&bytes),
            Err(OctreeError::IncompatibleVersion {
                found: 7,
                expected: FORMAT_VERSION
            })
        );
    }

    #[test]
    fn truncated_and_invalid_input_is_rejected() {
        let bytes = centered_obstacle_octree().to_bytes().unwrap();

        assert!(matches!(
            VoxelOctree::from_bytes(&bytes[..2]),
            Err(OctreeError::Encoding(_))
        ));
        assert!(matches!(
            VoxelOctree::from_bytes(&bytes[..bytes.len() / 2]),
            Err(OctreeError::Encoding(_))
        ));
        assert_eq!(
            VoxelOctree::invalid().to_bytes(),
            Err(OctreeError::InvalidOctree)
        );

        let octree = centered_obstacle_octree();
        let mut layers = octree.layers.clone();
        let top = layers.len() - 1;
        layers[top] = with_geometry(&layers[top], layers[top].voxel_size(), 0);
        let bytes = encode(&octree, layers);
        assert_eq!(VoxelOctree::from_bytes(&bytes), Err(OctreeError::InvalidOctree));
    }

    fn encode(octree: &VoxelOctree, layers: Vec<Layer>) -> Vec<u8> {
        let serializable = SerializableOctree {
            navigation_bounds: octree.navigation_bounds,
            layers,
            leaves: bytemuck::cast_slice::<LeafNode, u64>(&octree.leaves).to_vec(),
        };
        let mut bytes = FORMAT_VERSION.to_le_bytes().to_vec();
        bytes.extend(bincode::serialize(&serializable).unwrap());

        bytes
    }

    fn with_geometry(layer: &Layer, voxel_size: f32, resolution: i32) -> Layer {
        let mut copy = Layer::new(voxel_size, resolution);
        *copy.nodes_mut() = layer.nodes().to_vec();

        copy
    }

    #[test]
    fn unchanged_layers_are_accepted() {
        let octree = centered_obstacle_octree();

        assert!(VoxelOctree::from_bytes(&encode(&octree, octree.layers.clone())).is_ok());
    }

    #[test]
    fn corrupted_structure_is_rejected() {
        let octree = centered_obstacle_octree();
        let top = octree.layers.len() - 1;
        let mut corruptions: Vec<Vec<Layer>> = Vec::new();

        // Negative resolution.
        let mut layers = octree.layers.clone();
        layers[0] = with_geometry(&layers[0], layers[0].voxel_size(), -3);
        corruptions.push(layers);

        // Voxel sizes that don't double.
        let mut layers = octree.layers.clone();
        layers[1] = with_geometry(&layers[1], 3.0 * layers[0].voxel_size(), layers[1].resolution());
        corruptions.push(layers);

        let mut layers = octree.layers.clone();
        layers[0] = with_geometry(&layers[0], f32::NAN, layers[0].resolution());
        corruptions.push(layers);

        // Out of Morton order.
        let mut layers = octree.layers.clone();
        layers[0].nodes_mut().swap(0, 1);
        corruptions.push(layers);

        // Children running past the end of the layer below.
        let mut layers = octree.layers.clone();
        let last_child = layers[top - 1].len() as u32 - 1;
        layers[top].nodes_mut()[0].first_child = Some(NodeAddress::new(top as u8 - 1, last_child));
        corruptions.push(layers);

        let mut layers = octree.layers.clone();
        layers[top].nodes_mut()[0].first_child = Some(NodeAddress::new(top as u8 - 1, u32::MAX - 2));
        corruptions.push(layers);

        // Links to missing nodes.
        let mut layers = octree.layers.clone();
        layers[0].nodes_mut()[0].parent = Some(NodeAddress::new(1, 9999));
        corruptions.push(layers);

        let mut layers = octree.layers.clone();
        layers[1].nodes_mut()[0].neighbors[0] = Some(NodeAddress::new(0, 0));
        corruptions.push(layers);

        for (i, layers) in corruptions.into_iter().enumerate() {
            assert_eq!(
                VoxelOctree::from_bytes(&encode(&octree, layers)),
                Err(OctreeError::InvalidOctree),
                "corruption {}",
                i
            );
        }
    }
}
