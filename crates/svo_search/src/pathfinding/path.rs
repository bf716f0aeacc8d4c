use svo_core::{Distance, Point3f};
use svo_storage::{OctreeError, VoxelOctree};

use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The waypoints of a path, from start to end.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct NavigationPath {
    pub points: Vec<Point3f>,
    /// Sum of the segment lengths.
    pub length: f32,
    /// Traversal cost accumulated by the search.
    pub cost: f32,
    /// The goal was unreachable and the path ends at the closest point found instead.
    pub is_partial: bool,
    /// Generation of the octree the path was found in.
    pub octree_generation: u64,
}

impl NavigationPath {
    pub fn new(points: Vec<Point3f>, cost: f32, is_partial: bool, octree_generation: u64) -> Self {
        let length = polyline_length(&points);

        Self {
            points,
            length,
            cost,
            is_partial,
            octree_generation,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Point3f> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point3f> {
        self.points.last().copied()
    }

    /// Fails if `octree` was rebuilt since this path was found.
    pub fn check_generation(&self, octree: &VoxelOctree) -> Result<(), OctreeError> {
        octree.check_generation(self.octree_generation)
    }
}

pub(crate) fn polyline_length(points: &[Point3f]) -> f32 {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.l2_distance_squared(b).sqrt())
        .sum()
}
