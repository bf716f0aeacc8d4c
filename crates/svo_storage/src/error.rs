use crate::NodeAddress;

use thiserror::Error;

/// Why an octree could not be generated. The octree is left in its cleared, invalid state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("volume bounds are empty or not finite")]
    EmptyBounds,
    #[error("voxel size must be positive and finite, got {0}")]
    InvalidVoxelSize(f32),
    #[error("the volume fits in {layer_count} layer(s), at least 2 are required")]
    LayerCountTooSmall { layer_count: usize },
    #[error("the volume needs {layer_count} layers, at most {max} are supported")]
    TooManyLayers { layer_count: usize, max: usize },
}

/// Failure of a query against a built octree.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OctreeError {
    #[error("the octree has not been generated successfully")]
    InvalidOctree,
    #[error("{0:?} does not address a node of this octree")]
    InvalidAddress(NodeAddress),
    #[error("position is outside of the navigation bounds")]
    PositionOutOfBounds,
    #[error("data belongs to octree generation {actual}, expected {expected}")]
    StaleGeneration { expected: u64, actual: u64 },
    #[cfg(feature = "persistence")]
    #[error("serialized octree has format version {found}, expected {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
    #[cfg(feature = "persistence")]
    #[error("failed to encode or decode octree: {0}")]
    Encoding(String),
}
