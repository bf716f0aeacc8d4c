use super::{
    AgentProperties, NavigationPath, PathfinderDebugInfos, PathfindingObserver,
    PathfindingParameters, PathfindingSettings, PathfindingStepper,
};
use crate::PathfindingError;

use svo_core::Point3f;
use svo_storage::VoxelOctree;

use tracing::debug_span;

/// Endpoints closer than this on every axis are considered the same point.
const SAME_ENDPOINT_TOLERANCE: f32 = 1e-4;

/// Finds a path from `start` to `end` through the free space of `octree`, running the search to completion.
///
/// ```
/// use svo_core::prelude::*;
/// use svo_search::prelude::*;
/// use svo_storage::prelude::*;
///
/// let bounds = Extent3f::from_min_and_shape(PointN([0.0; 3]), PointN([8.0; 3]));
/// let octree = OctreeBuilder::new(bounds, GenerationSettings::default())
///     .build(NoOcclusion)
///     .unwrap();
///
/// let path = find_path(
///     &octree,
///     AgentProperties::default(),
///     PointN([1.0; 3]),
///     PointN([7.0; 3]),
///     PathfindingSettings::default(),
/// )
/// .unwrap();
///
/// assert_eq!(path.start(), Some(PointN([1.0; 3])));
/// assert_eq!(path.end(), Some(PointN([7.0; 3])));
/// assert!(!path.is_partial);
/// ```
pub fn find_path(
    octree: &VoxelOctree,
    agent: AgentProperties,
    start: Point3f,
    end: Point3f,
    settings: PathfindingSettings,
) -> Result<NavigationPath, PathfindingError> {
    find_path_with_observer(octree, agent, start, end, settings, &mut ())
}

/// Like `find_path`, but also returns what the search did.
pub fn find_path_with_debug_infos(
    octree: &VoxelOctree,
    agent: AgentProperties,
    start: Point3f,
    end: Point3f,
    settings: PathfindingSettings,
) -> (Result<NavigationPath, PathfindingError>, PathfinderDebugInfos) {
    let mut infos = PathfinderDebugInfos::default();
    let result = find_path_with_observer(octree, agent, start, end, settings, &mut infos);

    (result, infos)
}

pub fn find_path_with_observer(
    octree: &VoxelOctree,
    agent: AgentProperties,
    start: Point3f,
    end: Point3f,
    settings: PathfindingSettings,
    observer: &mut impl PathfindingObserver,
) -> Result<NavigationPath, PathfindingError> {
    if !octree.is_valid() {
        return Err(PathfindingError::InvalidOctree);
    }
    let bounds = octree.navigation_bounds();
    if !bounds.contains(start) || !bounds.contains(end) {
        return Err(PathfindingError::EndpointOutsideVolume);
    }
    if start.approx_eq(&end, SAME_ENDPOINT_TOLERANCE) {
        return Ok(NavigationPath::new(vec![start], 0.0, false, octree.generation()));
    }

    let parameters = PathfindingParameters::new(octree, agent, start, end, settings)?;

    let _span = debug_span!("find_path", algorithm = ?settings.algorithm).entered();

    PathfindingStepper::new(octree, parameters).run(observer)
}

/// A stepper for the query that has not taken any step yet. Drive it with `step` or `run_until_next_node` and inspect
/// it in between.
pub fn debug_stepper(
    octree: &VoxelOctree,
    agent: AgentProperties,
    start: Point3f,
    end: Point3f,
    settings: PathfindingSettings,
) -> Result<PathfindingStepper<'_>, PathfindingError> {
    PathfindingStepper::from_query(octree, agent, start, end, settings)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
