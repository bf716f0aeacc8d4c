//! Line of sight tests against a `VoxelOctree`, by parametric octree traversal.
//!
//! The segment is parameterized as `from + t * (to - from)` with `t` in `[0, 1]`. Every node stores its entry and exit
//! parameters along each axis; the children pierced by the segment are then visited in the order the segment crosses
//! them, without ever computing an intersection point (Revelles et al., "An Efficient Parametric Algorithm for Octree
//! Traversal").
//!
//! Negative direction components are handled by mirroring the segment about the center of the navigation bounds, which
//! keeps every direction component non-negative. The mirrored axes are kept in a 3 bit mask with the same bit layout as
//! a child index (x = 1, y = 2, z = 4), so that `octant ^ mask` maps a mirrored octant back to the real child.
//! Swapping the x and z bits of the mask (x = 4, z = 1), as some octree raycasters do, sends rays along a negative x
//! or z direction through the wrong children.
//!
//! Occlusion is resolved at layer-0 granularity: a layer-0 node with any occluded sub-voxel blocks the whole segment
//! crossing it.

use svo_core::{Point3f, PointN};
use svo_storage::{NodeAddress, VoxelOctree};

/// For each octant, the next octant crossed after leaving through its x, y or z exit plane. `END` means the segment
/// leaves the parent node.
const NEXT_OCTANT: [[u8; 3]; 8] = [
    [1, 2, 4],
    [END, 3, 5],
    [3, END, 6],
    [END, END, 7],
    [5, 6, END],
    [END, 7, END],
    [7, END, END],
    [END, END, END],
];
const END: u8 = 8;

/// Replaces zero direction components, so that parameters along that axis are huge instead of infinite or NaN.
const MIN_DIRECTION: f32 = 1e-20;

/// Receives every node visited by a raycast.
pub trait RaycastObserver {
    fn on_traverse_node(&mut self, _address: NodeAddress, _is_occluded: bool) {}
}

impl RaycastObserver for () {}

impl<T> RaycastObserver for &mut T
where
    T: RaycastObserver + ?Sized,
{
    fn on_traverse_node(&mut self, address: NodeAddress, is_occluded: bool) {
        (**self).on_traverse_node(address, is_occluded)
    }
}

/// A record of one raycast, for visualization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RaycastDebugInfos {
    pub ray_start: Point3f,
    pub ray_end: Point3f,
    /// Every node visited, in order, with whether it blocked the segment.
    pub traversed_nodes: Vec<(NodeAddress, bool)>,
    pub is_occluded: bool,
}

impl RaycastObserver for RaycastDebugInfos {
    fn on_traverse_node(&mut self, address: NodeAddress, is_occluded: bool) {
        self.traversed_nodes.push((address, is_occluded));
    }
}

/// Stateless; cheap to copy and safe to share between threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineOfSightRaycaster;

impl LineOfSightRaycaster {
    /// Returns `true` iff the segment from `from` to `to` crosses no occluded node.
    pub fn has_line_of_sight(&self, octree: &VoxelOctree, from: Point3f, to: Point3f) -> bool {
        !self.trace(octree, from, to, &mut ())
    }

    pub fn trace_with_debug_infos(
        &self,
        octree: &VoxelOctree,
        from: Point3f,
        to: Point3f,
    ) -> RaycastDebugInfos {
        let mut infos = RaycastDebugInfos {
            ray_start: from,
            ray_end: to,
            ..Default::default()
        };
        infos.is_occluded = self.trace(octree, from, to, &mut infos);

        infos
    }

    /// Returns `true` iff the segment from `from` to `to` crosses an occluded node.
    ///
    /// Degenerate segments (zero length or non-finite endpoints) and invalid octrees never report occlusion. Parts of
    /// the segment outside of the navigation bounds are ignored.
    pub fn trace(
        &self,
        octree: &VoxelOctree,
        from: Point3f,
        to: Point3f,
        observer: &mut impl RaycastObserver,
    ) -> bool {
        if !octree.is_valid() || !from.is_finite() || !to.is_finite() {
            return false;
        }
        let direction = to - from;
        if direction.max_component() == 0.0 && direction.min_component() == 0.0 {
            return false;
        }

        let bounds = octree.navigation_bounds();
        let bounds_min = bounds.minimum;
        let bounds_max = bounds.max();

        let mut origin = from.0;
        let mut direction = direction.0;
        let mut mirror = 0;
        for axis in 0..3 {
            if direction[axis] < 0.0 {
                origin[axis] = bounds_min.0[axis] + bounds_max.0[axis] - origin[axis];
                direction[axis] = -direction[axis];
                mirror |= 1 << axis;
            } else if direction[axis] == 0.0 {
                direction[axis] = MIN_DIRECTION;
            }
        }

        let mut t0 = [0.0; 3];
        let mut t1 = [0.0; 3];
        for axis in 0..3 {
            t0[axis] = (bounds_min.0[axis] - origin[axis]) / direction[axis];
            t1[axis] = (bounds_max.0[axis] - origin[axis]) / direction[axis];
        }

        let mut traversal = Traversal {
            octree,
            mirror,
            observer,
        };

        octree
            .root_addresses()
            .any(|root| traversal.visit(root, PointN(t0), PointN(t1)))
    }
}

struct Traversal<'a, O> {
    octree: &'a VoxelOctree,
    mirror: u8,
    observer: &'a mut O,
}

impl<'a, O> Traversal<'a, O>
where
    O: RaycastObserver,
{
    fn visit(&mut self, address: NodeAddress, t0: Point3f, t1: Point3f) -> bool {
        let entry = t0.max_component();
        let exit = t1.min_component();
        // Not crossed by the line, or only by the line outside of the segment.
        if entry > exit || exit < 0.0 || entry > 1.0 {
            return false;
        }

        let node = match self.octree.node(address) {
            Some(n) => n,
            None => return false,
        };
        let first_child = match node.first_child {
            None => {
                self.observer.on_traverse_node(address, false);
                return false;
            }
            Some(c) => c,
        };
        if address.layer_index == 0 {
            self.observer.on_traverse_node(address, true);
            return true;
        }
        self.observer.on_traverse_node(address, false);

        let tm = (t0 + t1) * 0.5;
        let mut octant = first_octant(t0, tm);
        while octant != END {
            let mut child_t0 = t0;
            let mut child_t1 = tm;
            for axis in 0..3 {
                if octant & (1 << axis) != 0 {
                    child_t0.0[axis] = tm.0[axis];
                    child_t1.0[axis] = t1.0[axis];
                }
            }

            let child = NodeAddress::new(
                first_child.layer_index,
                first_child.node_index + (octant ^ self.mirror) as u32,
            );
            if self.visit(child, child_t0, child_t1) {
                return true;
            }

            octant = NEXT_OCTANT[octant as usize][exit_axis(child_t1)];
        }

        false
    }
}

/// The first child crossed by the line, from the plane it enters the parent through.
fn first_octant(t0: Point3f, tm: Point3f) -> u8 {
    let mut octant = 0;
    if t0.x() >= t0.y() && t0.x() >= t0.z() {
        // Enters through a YZ plane.
        if tm.y() < t0.x() {
            octant |= 2;
        }
        if tm.z() < t0.x() {
            octant |= 4;
        }
    } else if t0.y() >= t0.z() {
        // XZ
        if tm.x() < t0.y() {
            octant |= 1;
        }
        if tm.z() < t0.y() {
            octant |= 4;
        }
    } else {
        // XY
        if tm.x() < t0.z() {
            octant |= 1;
        }
        if tm.y() < t0.z() {
            octant |= 2;
        }
    }

    octant
}

fn exit_axis(t1: Point3f) -> usize {
    if t1.x() <= t1.y() && t1.x() <= t1.z() {
        0
    } else if t1.y() <= t1.z() {
        1
    } else {
        2
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
