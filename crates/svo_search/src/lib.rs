#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible
)]
#![warn(clippy::doc_markdown)]

//! Searches over the free space of a sparse voxel octree:
//!   - `LineOfSightRaycaster`: segment visibility tests by parametric octree traversal
//!   - `find_path` and `PathfindingStepper`: A*, Theta* and Lazy Theta* pathfinding between nodes of the octree

pub mod error;
pub mod pathfinding;
pub mod raycast;

pub use error::PathfindingError;
pub use pathfinding::*;
pub use raycast::*;

pub mod prelude {
    pub use super::{
        debug_stepper, find_path, find_path_with_debug_infos, find_path_with_observer,
        AgentProperties, Heuristic, LineOfSightRaycaster, NavigationPath, PathfinderDebugInfos,
        PathfindingAlgorithm, PathfindingError, PathfindingObserver, PathfindingSettings,
        PathfindingStepper, RaycastDebugInfos, RaycastObserver, StepperState, StepperStatus,
        TraversalCost,
    };
}
