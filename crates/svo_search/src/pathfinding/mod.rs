//! Best-first searches over the free nodes of a `VoxelOctree`.
//!
//! `find_path` answers a query in one call. For visualization or for spreading a search over several frames, build a
//! `PathfindingStepper` (see `debug_stepper`) and drive it with `step` or `run_until_next_node`, passing a
//! `PathfindingObserver` such as `PathfinderDebugInfos` to watch what it does.
//!
//! Paths start at the query start and end at the query end. The points in between are the centers of the nodes the
//! search went through, or fewer of them for the any-angle algorithms.

mod observer;
mod parameters;
mod path;
mod pathfinder;
mod settings;
mod stepper;

pub use observer::*;
pub use parameters::*;
pub use path::*;
pub use pathfinder::*;
pub use settings::*;
pub use stepper::*;
