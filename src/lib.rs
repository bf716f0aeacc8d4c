//! Volumetric navigation for agents that fly or swim: free space is voxelized into a layered sparse voxel octree, then
//! searched for line of sight and for paths.
//!
//! This library is organized into several crates:
//! - **core**: points, axis-aligned boxes, Morton codes and neighbor directions
//! - **storage**: the `VoxelOctree`, its `OctreeBuilder` and the `NavigationVolume`s owning octrees
//! - **search**: line of sight raycasts and A*, Theta* and Lazy Theta* pathfinding
//!
//! ```
//! use svo_navigation::prelude::*;
//!
//! let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([8.0; 3]));
//! let obstacle = Extent3f::from_min_and_shape(PointN([3.0; 3]), PointN([2.0; 3]));
//! let oracle = OcclusionFn(|center: Point3f, half_extent: f32| {
//!     Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent)).intersects(&obstacle)
//! });
//!
//! let mut volume = NavigationVolume::new(bounds, GenerationSettings::default());
//! volume.rebuild(&oracle).unwrap();
//!
//! let from = PointN([0.5; 3]);
//! let to = PointN([7.5; 3]);
//! assert!(!LineOfSightRaycaster.has_line_of_sight(volume.octree(), from, to));
//!
//! let path = find_path(
//!     volume.octree(),
//!     AgentProperties::default(),
//!     from,
//!     to,
//!     PathfindingSettings {
//!         algorithm: PathfindingAlgorithm::LazyThetaStar,
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//! assert_eq!(path.end(), Some(to));
//! ```

pub use svo_core as core;
pub use svo_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::storage::prelude::*;

    #[cfg(feature = "search")]
    pub use super::search::prelude::*;
}

#[cfg(feature = "search")]
pub use svo_search as search;
