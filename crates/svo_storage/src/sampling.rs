//! Enumeration of free space, random sampling and point projection.
//!
//! Random sampling first picks one of the enumerated free cells uniformly, then a uniform point inside of it. Cells
//! differ in size, so the resulting distribution is uniform over *cells*, not over volume: points in finely subdivided
//! regions are more likely than points in large free nodes.

use crate::{NodeAddress, OctreeError, VoxelOctree};

use svo_core::{Distance, Extent3f, Point3f, PointN};

use float_ord::FloatOrd;
use rand::Rng;

impl VoxelOctree {
    /// Every free cell at or below `address`: childless nodes of layers 1 and above, completely free leaves, and the
    /// free sub-voxels of leaves with some occlusion.
    pub fn free_nodes_under(&self, address: NodeAddress) -> Result<Vec<NodeAddress>, OctreeError> {
        self.try_node(address)?;

        let mut free_nodes = Vec::new();
        self.visit_free_nodes(address.node_address(), &mut |a| free_nodes.push(a));

        Ok(free_nodes)
    }

    /// Every free cell of the octree.
    pub fn free_nodes(&self) -> Vec<NodeAddress> {
        let mut free_nodes = Vec::new();
        for root in self.root_addresses() {
            self.visit_free_nodes(root, &mut |a| free_nodes.push(a));
        }

        free_nodes
    }

    /// Calls `visitor` on each free cell at or below `address`. Subtrees are only entered when `enter` accepts their
    /// extent.
    fn visit_free_nodes_filtered(
        &self,
        address: NodeAddress,
        enter: &impl Fn(&Extent3f) -> bool,
        visitor: &mut impl FnMut(NodeAddress),
    ) {
        let node = match self.node(address) {
            Some(n) => n,
            None => return,
        };
        match self.node_bounds(address) {
            Some(extent) if enter(&extent) => (),
            _ => return,
        }

        match node.first_child {
            None => visitor(address),
            Some(_) if address.layer_index == 0 => {
                if let Some(leaf) = self.leaf(address) {
                    for sub_node_index in leaf.free_sub_nodes() {
                        let sub_address = NodeAddress::sub_node(address.node_index, sub_node_index);
                        let enters = self.node_bounds(sub_address).map(|e| enter(&e));
                        if enters == Some(true) {
                            visitor(sub_address);
                        }
                    }
                }
            }
            Some(first_child) => {
                for i in 0..8 {
                    let child =
                        NodeAddress::new(first_child.layer_index, first_child.node_index + i);
                    self.visit_free_nodes_filtered(child, enter, visitor);
                }
            }
        }
    }

    fn visit_free_nodes(&self, address: NodeAddress, visitor: &mut impl FnMut(NodeAddress)) {
        self.visit_free_nodes_filtered(address, &|_: &Extent3f| true, visitor)
    }

    /// A random free position: a uniformly chosen free cell, then a uniform position inside of it. Returns `None` if
    /// the octree is invalid or has no free space.
    pub fn random_point(&self, rng: &mut impl Rng) -> Option<Point3f> {
        let free_nodes = self.free_nodes();
        let address = *free_nodes.get(rng.gen_range(0..free_nodes.len().max(1)))?;

        self.node_bounds(address).map(|e| random_point_in_extent(&e, rng))
    }

    /// A random free position within `radius` of `origin`, sampled like `random_point` among the free cells that
    /// overlap the ball.
    pub fn random_point_in_radius(
        &self,
        origin: Point3f,
        radius: f32,
        rng: &mut impl Rng,
    ) -> Option<Point3f> {
        if !(radius >= 0.0) {
            return None;
        }

        let radius_squared = radius * radius;
        let overlaps_ball = |e: &Extent3f| e.distance_squared_to(origin) < radius_squared;
        let mut candidates = Vec::new();
        for root in self.root_addresses() {
            self.visit_free_nodes_filtered(root, &overlaps_ball, &mut |a| candidates.push(a));
        }

        let address = *candidates.get(rng.gen_range(0..candidates.len().max(1)))?;
        let extent = self.node_bounds(address)?;
        let ball_bounds = Extent3f::cube(origin, 2.0 * radius);
        let region = extent.intersection(&ball_bounds);

        const MAX_ATTEMPTS: usize = 32;
        for _ in 0..MAX_ATTEMPTS {
            let p = random_point_in_extent(&region, rng);
            if p.l2_distance_squared(&origin) <= radius_squared {
                return Some(p);
            }
        }

        // The cell only grazes the ball.
        Some(clamp_into_cell(&extent, origin))
    }

    /// The free position closest to `position` inside of the box centered on `position` with `half_extent`, together
    /// with the free cell containing it.
    pub fn project_point(
        &self,
        position: Point3f,
        half_extent: Point3f,
    ) -> Option<(NodeAddress, Point3f)> {
        if let Some(address) = self.address_from_position(position) {
            return Some((address, position));
        }

        let query = Extent3f::from_center_and_half_extent(position, half_extent);
        let mut best: Option<(FloatOrd<f32>, NodeAddress, Point3f)> = None;
        for root in self.root_addresses() {
            let touches_query = |e: &Extent3f| e.touches(&query);
            self.visit_free_nodes_filtered(root, &touches_query, &mut |a| {
                if let Some(extent) = self.node_bounds(a) {
                    let p = clamp_into_cell(&extent, position);
                    let d = FloatOrd(p.l2_distance_squared(&position));
                    if best.map(|(best_d, _, _)| d < best_d).unwrap_or(true) {
                        best = Some((d, a, p));
                    }
                }
            });
        }

        best.map(|(_, a, p)| (a, p))
    }
}

/// The point of `cell` closest to `p`. Cells own their minimum faces but not their maximum faces, so the result is
/// kept a hair inside of the maximum faces.
fn clamp_into_cell(cell: &Extent3f, p: Point3f) -> Point3f {
    let inset = 1e-4 * cell.shape.x();
    let owned = Extent3f::from_min_and_max(cell.minimum, cell.max() - Point3f::fill(inset));

    owned.clamp(p)
}

/// A uniform random point in `extent`.
pub fn random_point_in_extent(extent: &Extent3f, rng: &mut impl Rng) -> Point3f {
    let min = extent.minimum;
    let max = extent.max();
    let mut sample = |lo: f32, hi: f32| if hi > lo { rng.gen_range(lo..hi) } else { lo };

    PointN([
        sample(min.x(), max.x()),
        sample(min.y(), max.y()),
        sample(min.z(), max.z()),
    ])
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
