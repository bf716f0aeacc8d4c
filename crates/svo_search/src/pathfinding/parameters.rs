use super::{AgentProperties, PathfindingSettings};
use crate::PathfindingError;

use svo_core::Point3f;
use svo_storage::{NodeAddress, VoxelOctree};

/// A resolved path query: both endpoints and the free nodes containing them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathfindingParameters {
    pub agent: AgentProperties,
    pub start_position: Point3f,
    pub end_position: Point3f,
    pub start_address: NodeAddress,
    pub end_address: NodeAddress,
    pub settings: PathfindingSettings,
}

impl PathfindingParameters {
    /// Resolves the nodes of both endpoints.
    ///
    /// Endpoints outside of the navigation bounds fail with `EndpointOutsideVolume`. An endpoint inside of occluded space
    /// has no free node, so nothing can reach it, and fails with `SearchExhausted`.
    pub fn new(
        octree: &VoxelOctree,
        agent: AgentProperties,
        start_position: Point3f,
        end_position: Point3f,
        settings: PathfindingSettings,
    ) -> Result<Self, PathfindingError> {
        if !octree.is_valid() {
            return Err(PathfindingError::InvalidOctree);
        }
        let bounds = octree.navigation_bounds();
        if !bounds.contains(start_position) || !bounds.contains(end_position) {
            return Err(PathfindingError::EndpointOutsideVolume);
        }

        let start_address = octree
            .address_from_position(start_position)
            .ok_or(PathfindingError::SearchExhausted)?;
        let end_address = octree
            .address_from_position(end_position)
            .ok_or(PathfindingError::SearchExhausted)?;

        Ok(Self {
            agent,
            start_position,
            end_position,
            start_address,
            end_address,
            settings,
        })
    }

    /// Added to the height of the intermediate points of a path.
    pub fn vertical_offset(&self) -> f32 {
        if self.settings.offset_path_vertically_by_agent_radius {
            self.agent.radius
        } else {
            0.0
        }
    }
}
