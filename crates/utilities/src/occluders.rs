use svo_core::prelude::*;
use svo_storage::OcclusionOracle;

/// A solid axis-aligned box. Probes that only touch its faces are free.
#[derive(Clone, Copy, Debug)]
pub struct BoxOccluder(pub Extent3f);

impl OcclusionOracle for BoxOccluder {
    fn is_occluded(&self, center: Point3f, half_extent: f32) -> bool {
        Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent)).intersects(&self.0)
    }
}

/// A solid ball.
#[derive(Clone, Copy, Debug)]
pub struct SphereOccluder {
    pub center: Point3f,
    pub radius: f32,
}

impl OcclusionOracle for SphereOccluder {
    fn is_occluded(&self, center: Point3f, half_extent: f32) -> bool {
        Extent3f::from_center_and_half_extent(center, Point3f::fill(half_extent))
            .distance_squared_to(self.center)
            < self.radius * self.radius
    }
}

/// The union of several occluders.
#[derive(Default)]
pub struct Occluders(pub Vec<Box<dyn OcclusionOracle>>);

impl Occluders {
    pub fn with(mut self, occluder: impl OcclusionOracle + 'static) -> Self {
        self.0.push(Box::new(occluder));

        self
    }
}

impl OcclusionOracle for Occluders {
    fn is_occluded(&self, center: Point3f, half_extent: f32) -> bool {
        self.0.iter().any(|o| o.is_occluded(center, half_extent))
    }
}
