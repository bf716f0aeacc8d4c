use svo_storage::OctreeError;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PathfindingError {
    #[error("the octree has not been generated successfully")]
    InvalidOctree,
    #[error("the start or end position is outside of the navigation bounds")]
    EndpointOutsideVolume,
    #[error("the goal can't be reached from the start")]
    SearchExhausted,
    #[error(transparent)]
    Octree(#[from] OctreeError),
}
