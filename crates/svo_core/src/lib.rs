#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible
)]
#![warn(clippy::doc_markdown)]

//! The core data types for navigating sparse voxel octrees:
//! - `PointN`: a point, most importantly `Point3f` for world positions and `Point3i` for voxel coordinates
//! - `Extent3f`: an axis-aligned box in world space
//! - `MortonCode`: the Z-order key that sorts the nodes of an octree layer
//! - `NeighborDirection`: the 6 face directions linking neighboring nodes

pub mod direction;
pub mod extent3;
pub mod morton;
pub mod point;
pub mod point3;

pub use direction::{Axis3, NeighborDirection};
pub use extent3::Extent3f;
pub use morton::{morton_coordinates_4x4x4, morton_index_4x4x4, MortonCode, MAX_MORTON_COORDINATE};
pub use point::{Distance, Point, PointN, SmallZero};
pub use point3::{cell_containing_point3f, Point3, Point3f, Point3i};

pub use num;

pub mod prelude {
    pub use super::{
        Axis3, Distance, Extent3f, MortonCode, NeighborDirection, Point, Point3, Point3f, Point3i,
        PointN, SmallZero,
    };
}
