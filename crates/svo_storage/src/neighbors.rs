use crate::{
    node::{sub_node_coordinates, sub_node_index_at, LEAF_EDGE},
    NodeAddress, OctreeError, OctreeNode, VoxelOctree,
};

use svo_core::{NeighborDirection, Point};

/// For a move in each `NeighborDirection`, the children of the entered node that touch the face being crossed.
pub const CHILDREN_ON_ENTRY_FACE: [[u8; 4]; 6] = [
    [0, 2, 4, 6],
    [1, 3, 5, 7],
    [0, 1, 4, 5],
    [2, 3, 6, 7],
    [0, 1, 2, 3],
    [4, 5, 6, 7],
];

/// For a move in each `NeighborDirection`, the sub-voxels of the entered leaf that touch the face being crossed.
pub const SUB_NODES_ON_ENTRY_FACE: [[u8; 16]; 6] = [
    [0, 2, 4, 6, 16, 18, 20, 22, 32, 34, 36, 38, 48, 50, 52, 54],
    [9, 11, 13, 15, 25, 27, 29, 31, 41, 43, 45, 47, 57, 59, 61, 63],
    [0, 1, 4, 5, 8, 9, 12, 13, 32, 33, 36, 37, 40, 41, 44, 45],
    [18, 19, 22, 23, 26, 27, 30, 31, 50, 51, 54, 55, 58, 59, 62, 63],
    [0, 1, 2, 3, 8, 9, 10, 11, 16, 17, 18, 19, 24, 25, 26, 27],
    [36, 37, 38, 39, 44, 45, 46, 47, 52, 53, 54, 55, 60, 61, 62, 63],
];

impl VoxelOctree {
    /// The free cells sharing a face with the cell at `address`.
    ///
    /// Across a face to a subdivided node, every free descendant touching that face is returned, down to leaf
    /// sub-voxels. A sub-voxel's neighbors are found inside its own leaf when possible, otherwise in the adjacent
    /// leaf (or coarser free node) through the owning node's neighbor link.
    pub fn neighbors_of(&self, address: NodeAddress) -> Result<Vec<NodeAddress>, OctreeError> {
        let node = self.try_node(address)?;
        if !self.contains_address(address) {
            return Err(OctreeError::InvalidAddress(address));
        }

        let mut neighbors = Vec::with_capacity(6);
        if self.addresses_sub_node(address) {
            self.sub_node_neighbors(address, node, &mut neighbors);
        } else {
            for direction in NeighborDirection::ALL {
                if let Some(neighbor) = node.neighbor(direction) {
                    self.collect_entry_face(neighbor, direction, &mut neighbors);
                }
            }
        }

        Ok(neighbors)
    }

    /// Collects the free cells of `address` that touch its face crossed by a move in `direction`.
    fn collect_entry_face(
        &self,
        address: NodeAddress,
        direction: NeighborDirection,
        out: &mut Vec<NodeAddress>,
    ) {
        let node = match self.node(address) {
            Some(n) => n,
            None => return,
        };

        match node.first_child {
            None => out.push(address),
            Some(_) if address.layer_index == 0 => {
                if let Some(leaf) = self.leaf(address) {
                    out.extend(
                        SUB_NODES_ON_ENTRY_FACE[direction.index()]
                            .iter()
                            .filter(|&&s| !leaf.is_sub_node_occluded(s))
                            .map(|&s| NodeAddress::sub_node(address.node_index, s)),
                    );
                }
            }
            Some(first_child) => {
                for &child in CHILDREN_ON_ENTRY_FACE[direction.index()].iter() {
                    let child_address = NodeAddress::new(
                        first_child.layer_index,
                        first_child.node_index + child as u32,
                    );
                    self.collect_entry_face(child_address, direction, out);
                }
            }
        }
    }

    fn sub_node_neighbors(
        &self,
        address: NodeAddress,
        node: &OctreeNode,
        out: &mut Vec<NodeAddress>,
    ) {
        let leaf = match self.leaf(address) {
            Some(l) => l,
            None => return,
        };
        let coordinates = sub_node_coordinates(address.sub_node_index);

        for direction in NeighborDirection::ALL {
            let target = coordinates + direction.get_vector();
            if let Some(sub_node_index) = sub_node_index_at(target) {
                if !leaf.is_sub_node_occluded(sub_node_index) {
                    out.push(NodeAddress::sub_node(address.node_index, sub_node_index));
                }
                continue;
            }

            let neighbor = match node.neighbor(direction) {
                Some(n) => n,
                None => continue,
            };
            if !self.addresses_sub_node(neighbor) {
                self.collect_entry_face(neighbor, direction, out);
                continue;
            }

            // Wrap into the adjacent leaf's grid.
            let wrapped = target.map_components(|c| c.rem_euclid(LEAF_EDGE));
            let neighbor_leaf = self.leaf(neighbor);
            if let (Some(leaf), Some(sub_node_index)) = (neighbor_leaf, sub_node_index_at(wrapped)) {
                if !leaf.is_sub_node_occluded(sub_node_index) {
                    out.push(NodeAddress::sub_node(neighbor.node_index, sub_node_index));
                }
            }
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::*;

    use pretty_assertions::assert_eq;
    use svo_core::{MortonCode, Point3f, PointN};

    #[test]
    fn entry_face_tables_match_coordinates() {
        for direction in NeighborDirection::ALL {
            let axis = direction.axis().index();
            let entry_side = if direction.sign() > 0 { 0 } else { 1 };
            let children: Vec<u8> = (0..8)
                .filter(|&i| MortonCode(i as u64).coordinates().at(axis) == entry_side)
                .collect();
            assert_eq!(children, CHILDREN_ON_ENTRY_FACE[direction.index()].to_vec());

            let entry_side = if direction.sign() > 0 { 0 } else { LEAF_EDGE - 1 };
            let sub_nodes: Vec<u8> = (0..64)
                .filter(|&i| sub_node_coordinates(i).at(axis) == entry_side)
                .collect();
            assert_eq!(sub_nodes, SUB_NODES_ON_ENTRY_FACE[direction.index()].to_vec());
        }
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        let octree = centered_obstacle_octree();

        let bogus = NodeAddress::new(1, 10_000);
        assert_eq!(
            octree.neighbors_of(bogus),
            Err(OctreeError::InvalidAddress(bogus))
        );
        assert_eq!(
            VoxelOctree::invalid().neighbors_of(NodeAddress::new(0, 0)),
            Err(OctreeError::InvalidOctree)
        );
    }

    #[test]
    fn neighbors_of_coarse_node_expand_into_subdivided_neighbor() {
        let octree = centered_obstacle_octree();

        // A free 2m node of layer 1, next to the subdivided 2m cell containing a corner of the obstacle.
        let address = octree.address_from_position(PointN([1.0, 3.0, 3.0])).unwrap();
        assert_eq!(address.layer_index, 1);

        let neighbors = octree.neighbors_of(address).unwrap();
        // The +X face touches 4 layer-0 children, all free since the obstacle starts at x = 3.
        let entered: Vec<_> = neighbors.iter().filter(|n| n.layer_index == 0).collect();
        assert_eq!(entered.len(), 4);
        for n in entered {
            let center = octree.position_from_address(*n).unwrap();
            assert_eq!(center.x(), 2.5);
        }
    }

    #[test]
    fn free_leaf_next_to_solid_leaf_has_no_neighbor_there() {
        let octree = centered_obstacle_octree();

        let address = octree.address_from_position(PointN([2.5, 3.5, 3.5])).unwrap();
        assert_eq!(address.layer_index, 0);
        let neighbors = octree.neighbors_of(address).unwrap();
        for n in neighbors.iter() {
            let center = octree.position_from_address(*n).unwrap();
            assert!(center.x() < 3.0, "{:?} at {:?} is inside of the obstacle", n, center);
        }
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn sub_voxel_neighbors_wrap_into_adjacent_leaf() {
        // A thin slab at the bottom of the volume makes every bottom leaf partially occluded.
        let octree = build_with(cube_bounds(4.0), 1.0, |p: Point3f, h: f32| {
            p.z() - h < 0.25
        });

        let address = octree.address_from_position(PointN([0.875, 0.5, 0.375])).unwrap();
        assert!(octree.addresses_sub_node(address));

        let neighbors = octree.neighbors_of(address).unwrap();
        let centers: Vec<_> = neighbors
            .iter()
            .map(|n| octree.position_from_address(*n).unwrap())
            .collect();

        // +X crosses into the next leaf; -Z is occluded.
        assert!(centers.contains(&PointN([1.125, 0.625, 0.375])));
        assert!(centers.contains(&PointN([0.625, 0.625, 0.375])));
        assert!(centers.contains(&PointN([0.875, 0.625, 0.625])));
        assert!(!centers.iter().any(|c| c.z() < 0.25));
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn neighbors_are_free_and_touch() {
        let octree = sphere_octree();

        for address in all_free_addresses(&octree) {
            let extent = octree.node_bounds(address).unwrap();
            for neighbor in octree.neighbors_of(address).unwrap() {
                assert!(octree.is_address_free(neighbor));
                let neighbor_extent = octree.node_bounds(neighbor).unwrap();
                assert!(extent.touches(&neighbor_extent));
                assert!(!extent.intersects(&neighbor_extent));
            }
        }
    }

    #[test]
    fn neighbors_are_symmetric_up_to_resolution() {
        let octree = sphere_octree();

        for a in all_free_addresses(&octree) {
            let a_extent = octree.node_bounds(a).unwrap();
            for b in octree.neighbors_of(a).unwrap() {
                let back = octree.neighbors_of(b).unwrap();
                assert!(
                    back.iter()
                        .any(|c| octree.node_bounds(*c).unwrap().intersects(&a_extent)),
                    "{:?} -> {:?} has no way back",
                    a,
                    b
                );
            }
        }
    }
}
