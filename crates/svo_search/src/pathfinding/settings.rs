use svo_core::{Distance, Point3f};
use svo_storage::NodeAddress;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum PathfindingAlgorithm {
    /// Paths follow the centers of neighboring nodes.
    AStar,
    /// Any-angle paths: a neighbor is attached to the parent of the expanded node whenever the two see each other.
    ThetaStar,
    /// Like `ThetaStar`, but line of sight is only checked once a node is expanded, which takes far fewer raycasts.
    LazyThetaStar,
}

impl Default for PathfindingAlgorithm {
    fn default() -> Self {
        Self::AStar
    }
}

/// The cost of moving between two positions.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum TraversalCost {
    /// Euclidean distance.
    Distance,
    /// The same cost for every move, whatever its length.
    Fixed(f32),
}

impl Default for TraversalCost {
    fn default() -> Self {
        Self::Distance
    }
}

impl TraversalCost {
    /// The cost of moving from the node at `from_address` to the node at `to_address`. Only the positions are used for
    /// now; the addresses let a cost depend on the nodes being crossed.
    #[inline]
    pub fn cost(
        &self,
        _from_address: NodeAddress,
        from: Point3f,
        _to_address: NodeAddress,
        to: Point3f,
    ) -> f32 {
        match *self {
            Self::Distance => from.l2_distance_squared(&to).sqrt(),
            Self::Fixed(cost) => cost,
        }
    }
}

/// The estimated cost of moving from a position to the goal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Heuristic {
    Euclidean,
    /// Overestimates distances, so searches are greedier but paths are no longer guaranteed optimal.
    Manhattan,
}

impl Default for Heuristic {
    fn default() -> Self {
        Self::Manhattan
    }
}

impl Heuristic {
    #[inline]
    pub fn cost(
        &self,
        _from_address: NodeAddress,
        from: Point3f,
        _to_address: NodeAddress,
        to: Point3f,
    ) -> f32 {
        match self {
            Self::Euclidean => from.l2_distance_squared(&to).sqrt(),
            Self::Manhattan => from.l1_distance(&to),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PathfindingSettings {
    pub algorithm: PathfindingAlgorithm,
    pub traversal_cost: TraversalCost,
    pub heuristic: Heuristic,
    /// Multiplies the heuristic in `f = g + scale * h`.
    pub heuristic_scale: f32,
    /// Scales the priority of a node by `1 - layer_index / layer_count`, so that moves into large nodes are preferred
    /// over crawling through many small ones.
    pub use_node_size_compensation: bool,
    /// Raises the intermediate points of a path by the agent radius.
    pub offset_path_vertically_by_agent_radius: bool,
    /// When the goal can't be reached, return the path to the node closest to it instead of failing.
    pub allow_partial_paths: bool,
}

impl Default for PathfindingSettings {
    fn default() -> Self {
        Self {
            algorithm: PathfindingAlgorithm::AStar,
            traversal_cost: TraversalCost::Distance,
            heuristic: Heuristic::Manhattan,
            heuristic_scale: 1.0,
            use_node_size_compensation: true,
            offset_path_vertically_by_agent_radius: false,
            allow_partial_paths: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct AgentProperties {
    pub radius: f32,
    pub height: f32,
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

    use svo_core::PointN;

    #[test]
    fn costs_and_heuristics() {
        let a = PointN([0.0, 0.0, 0.0]);
        let b = PointN([1.0, 2.0, 2.0]);
        let from = NodeAddress::new(0, 3);
        let to = NodeAddress::new(1, 0);

        assert_eq!(TraversalCost::Distance.cost(from, a, to, b), 3.0);
        assert_eq!(TraversalCost::Fixed(7.0).cost(from, a, to, b), 7.0);
        assert_eq!(Heuristic::Euclidean.cost(from, a, to, b), 3.0);
        assert_eq!(Heuristic::Manhattan.cost(from, a, to, b), 5.0);
    }

    #[test]
    fn costs_depend_on_positions_not_on_addresses() {
        let a = PointN([0.0, 0.0, 0.0]);
        let b = PointN([3.0, 0.0, 4.0]);

        for (from, to) in [
            (NodeAddress::new(0, 0), NodeAddress::new(0, 1)),
            (NodeAddress::sub_node(2, 17), NodeAddress::new(3, 0)),
            (NodeAddress::default(), NodeAddress::default()),
        ] {
            assert_eq!(TraversalCost::Distance.cost(from, a, to, b), 5.0);
            assert_eq!(Heuristic::Euclidean.cost(from, a, to, b), 5.0);
            assert_eq!(Heuristic::Manhattan.cost(from, a, to, b), 7.0);
        }
    }
}
