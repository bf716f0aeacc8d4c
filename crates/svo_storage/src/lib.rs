#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible
)]
#![warn(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]

//! Storage and generation of layered sparse voxel octrees for volumetric navigation.
//!
//! The core types are:
//!   - `VoxelOctree`: the layered octree, with its position/address conversions, neighbor queries and free space
//!     sampling
//!   - `OctreeBuilder`: rasterizes a volume into a `VoxelOctree` by asking an `OcclusionOracle` which regions are blocked
//!   - `NavigationVolume`: a volume of the world that owns its octree and rebuilds it on demand
//!
//! Nodes are addressed with `NodeAddress`. Leaves of the octree are `LeafNode`s, 4x4x4 bitmasks of occluded sub-voxels.
//!
//! With the `persistence` feature, octrees can be saved to and loaded from a versioned binary format.

pub mod address;
pub mod builder;
pub mod error;
pub mod layer;
pub mod neighbors;
pub mod node;
pub mod octree;
pub mod sampling;
pub mod volume;

#[cfg(feature = "persistence")]
pub mod persistence;

#[cfg(test)]
pub(crate) mod test_util;

pub use address::*;
pub use builder::*;
pub use error::*;
pub use layer::*;
pub use neighbors::*;
pub use node::*;
pub use octree::*;
pub use sampling::*;
pub use volume::*;

#[cfg(feature = "persistence")]
pub use persistence::FORMAT_VERSION;

pub mod prelude {
    pub use super::{
        GenerationError, GenerationSettings, Layer, LeafNode, NavigationVolume, NavigationVolumes,
        NoOcclusion, NodeAddress, OcclusionFn, OcclusionOracle, OctreeBuilder, OctreeError,
        OctreeLayout, OctreeNode, VoxelOctree,
    };
}
