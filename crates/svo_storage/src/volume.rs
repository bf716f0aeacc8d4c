use crate::{GenerationError, GenerationSettings, OcclusionOracle, OctreeBuilder, VoxelOctree};

use svo_core::{Extent3f, Point3f};

use tracing::{info, warn};

/// A region of the world and the octree that navigates it.
///
/// The octree is replaced wholesale on every rebuild, so readers holding on to addresses or paths should compare
/// generations (`VoxelOctree::check_generation`) before reusing them.
#[derive(Clone, Debug)]
pub struct NavigationVolume {
    bounds: Extent3f,
    settings: GenerationSettings,
    octree: VoxelOctree,
}

impl NavigationVolume {
    /// A volume with no octree yet. Call `rebuild` before querying it.
    pub fn new(bounds: Extent3f, settings: GenerationSettings) -> Self {
        Self {
            bounds,
            settings,
            octree: VoxelOctree::invalid(),
        }
    }

    pub fn bounds(&self) -> &Extent3f {
        &self.bounds
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn octree(&self) -> &VoxelOctree {
        &self.octree
    }

    pub fn is_ready(&self) -> bool {
        self.octree.is_valid()
    }

    /// Rasterizes the volume again. On failure the old octree is dropped and the volume holds the invalid octree.
    pub fn rebuild(&mut self, oracle: impl OcclusionOracle) -> Result<(), GenerationError> {
        let builder = OctreeBuilder::new(self.bounds, self.settings);
        let result = builder.build_into(&mut self.octree, oracle);
        match &result {
            Ok(()) => info!(generation = self.octree.generation(), "Navigation volume rebuilt"),
            Err(e) => warn!("Navigation volume cleared: {}", e),
        }

        result
    }

    /// Drops the octree.
    pub fn clear(&mut self) {
        self.octree.clear();
    }

    pub fn contains_point(&self, p: Point3f) -> bool {
        self.is_ready() && self.octree.navigation_bounds().contains(p)
    }
}

/// All of the navigation volumes of a world.
#[derive(Clone, Debug, Default)]
pub struct NavigationVolumes {
    volumes: Vec<NavigationVolume>,
}

impl NavigationVolumes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, volume: NavigationVolume) {
        self.volumes.push(volume);
    }

    pub fn iter(&self) -> impl Iterator<Item = &NavigationVolume> {
        self.volumes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NavigationVolume> {
        self.volumes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// The first ready volume containing every point of `points`, like both ends of a path query.
    pub fn volume_containing_points(&self, points: &[Point3f]) -> Option<&NavigationVolume> {
        self.volumes
            .iter()
            .find(|v| points.iter().all(|p| v.contains_point(*p)))
    }

    /// Rebuilds every volume, returning the errors of the volumes that failed along with their index.
    pub fn rebuild_all(
        &mut self,
        oracle: impl OcclusionOracle,
    ) -> Vec<(usize, GenerationError)> {
        let mut errors = Vec::new();
        for (i, volume) in self.volumes.iter_mut().enumerate() {
            if let Err(e) = volume.rebuild(&oracle) {
                errors.push((i, e));
            }
        }

        errors
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
