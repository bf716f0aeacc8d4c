use super::{path::polyline_length, SearchNode};

use svo_core::Point3f;
use svo_storage::NodeAddress;

use ahash::RandomState;
use indexmap::IndexMap;

/// Callbacks fired by `PathfindingStepper::step`. Every method defaults to doing nothing.
///
/// Implemented for `()` (no observer), `&mut T` and pairs, so several observers can be threaded through one search:
/// `stepper.step(&mut (&mut debug_infos, &mut my_observer))`.
pub trait PathfindingObserver {
    /// A node was taken from the open set for expansion. Its parent is final.
    fn on_process_node(&mut self, _node: &SearchNode) {}

    /// `neighbor` was reached through `parent` with a better cost than before.
    fn on_process_neighbor(&mut self, _parent: &SearchNode, _neighbor: &SearchNode, _cost: f32) {}

    /// `neighbor` of `current` was already expanded and was skipped.
    fn on_skip_neighbor(&mut self, _current: &SearchNode, _neighbor: &SearchNode) {}

    /// The goal was reached through `addresses`, start first.
    fn on_search_success(&mut self, _addresses: &[NodeAddress]) {}
}

impl PathfindingObserver for () {}

impl<T> PathfindingObserver for &mut T
where
    T: PathfindingObserver + ?Sized,
{
    fn on_process_node(&mut self, node: &SearchNode) {
        (**self).on_process_node(node)
    }

    fn on_process_neighbor(&mut self, parent: &SearchNode, neighbor: &SearchNode, cost: f32) {
        (**self).on_process_neighbor(parent, neighbor, cost)
    }

    fn on_skip_neighbor(&mut self, current: &SearchNode, neighbor: &SearchNode) {
        (**self).on_skip_neighbor(current, neighbor)
    }

    fn on_search_success(&mut self, addresses: &[NodeAddress]) {
        (**self).on_search_success(addresses)
    }
}

impl<A, B> PathfindingObserver for (A, B)
where
    A: PathfindingObserver,
    B: PathfindingObserver,
{
    fn on_process_node(&mut self, node: &SearchNode) {
        self.0.on_process_node(node);
        self.1.on_process_node(node);
    }

    fn on_process_neighbor(&mut self, parent: &SearchNode, neighbor: &SearchNode, cost: f32) {
        self.0.on_process_neighbor(parent, neighbor, cost);
        self.1.on_process_neighbor(parent, neighbor, cost);
    }

    fn on_skip_neighbor(&mut self, current: &SearchNode, neighbor: &SearchNode) {
        self.0.on_skip_neighbor(current, neighbor);
        self.1.on_skip_neighbor(current, neighbor);
    }

    fn on_search_success(&mut self, addresses: &[NodeAddress]) {
        self.0.on_search_success(addresses);
        self.1.on_search_success(addresses);
    }
}

/// An edge considered by the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugNodeCost {
    pub from: NodeAddress,
    pub from_position: Point3f,
    pub to: NodeAddress,
    pub to_position: Point3f,
    pub cost: f32,
    pub is_closed: bool,
}

/// Collects what a search is doing, for visualization and single-step debugging.
#[derive(Clone, Debug, Default)]
pub struct PathfinderDebugInfos {
    pub iterations: usize,
    /// Number of neighbor relaxations that improved a node.
    pub visited_nodes: usize,
    pub last_processed_node: Option<DebugNodeCost>,
    /// The neighbors considered since the last processed node.
    pub processed_neighbors: Vec<DebugNodeCost>,
    /// The path from the start to the last processed node, or to the goal once the search succeeded.
    pub current_best_path: Vec<Point3f>,
    pub path_segment_count: usize,
    pub path_length: f32,
    parents: IndexMap<NodeAddress, (Option<NodeAddress>, Point3f), RandomState>,
}

impl PathfinderDebugInfos {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn fill_current_best_path(&mut self, last: NodeAddress) {
        let mut points = Vec::new();
        let mut cursor = Some(last);
        while let Some(address) = cursor {
            let (parent, position) = match self.parents.get(&address) {
                Some(entry) => *entry,
                None => break,
            };
            points.push(position);
            cursor = parent;
            // Guards against cycles through stale parents.
            if points.len() > self.parents.len() {
                break;
            }
        }
        points.reverse();

        self.path_segment_count = points.len().saturating_sub(1);
        self.path_length = polyline_length(&points);
        self.current_best_path = points;
    }
}

impl PathfindingObserver for PathfinderDebugInfos {
    fn on_process_node(&mut self, node: &SearchNode) {
        self.iterations += 1;
        self.processed_neighbors.clear();
        self.parents
            .insert(node.address, (node.parent, node.position));

        let (from, from_position) = match node.parent.and_then(|p| self.parents.get(&p).map(|e| (p, e.1))) {
            Some(parent) => parent,
            None => (node.address, node.position),
        };
        self.last_processed_node = Some(DebugNodeCost {
            from,
            from_position,
            to: node.address,
            to_position: node.position,
            cost: node.g,
            is_closed: true,
        });
        self.fill_current_best_path(node.address);
    }

    fn on_process_neighbor(&mut self, parent: &SearchNode, neighbor: &SearchNode, cost: f32) {
        self.visited_nodes += 1;
        self.parents
            .insert(neighbor.address, (Some(parent.address), neighbor.position));
        self.processed_neighbors.push(DebugNodeCost {
            from: parent.address,
            from_position: parent.position,
            to: neighbor.address,
            to_position: neighbor.position,
            cost,
            is_closed: false,
        });
    }

    fn on_skip_neighbor(&mut self, current: &SearchNode, neighbor: &SearchNode) {
        self.processed_neighbors.push(DebugNodeCost {
            from: current.address,
            from_position: current.position,
            to: neighbor.address,
            to_position: neighbor.position,
            cost: neighbor.g,
            is_closed: true,
        });
    }

    fn on_search_success(&mut self, addresses: &[NodeAddress]) {
        if let Some(goal) = addresses.last() {
            self.fill_current_best_path(*goal);
        }
    }
}
