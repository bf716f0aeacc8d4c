use super::{
    AgentProperties, NavigationPath, PathfindingAlgorithm, PathfindingObserver,
    PathfindingParameters, PathfindingSettings,
};
use crate::{LineOfSightRaycaster, PathfindingError};

use svo_core::{Point3f, PointN};
use svo_storage::{NodeAddress, VoxelOctree};

use ahash::RandomState;
use float_ord::FloatOrd;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StepperState {
    Init,
    ProcessNode,
    ProcessNeighbor,
    Ended,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StepperStatus {
    MustContinue,
    IsStopped,
}

/// What the search knows about a node it has reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode {
    pub address: NodeAddress,
    /// The node center, or the query position for the start and end nodes.
    pub position: Point3f,
    /// Cost of the best known path from the start.
    pub g: f32,
    /// Heuristic estimate of the cost to the end.
    pub h: f32,
    pub parent: Option<NodeAddress>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
}

#[derive(Clone, Debug)]
struct SearchOutcome {
    addresses: Vec<NodeAddress>,
    is_partial: bool,
}

/// An interruptible best-first search over the free nodes of a `VoxelOctree`.
///
/// Each call to `step` performs one state transition: seeding the open set, expanding one node, or relaxing one neighbor
/// of the expanded node. The caller decides whether to run to completion (`run`), one node at a time
/// (`run_until_next_node`) or spread over several frames. All intermediate state can be inspected between steps.
///
/// The open set is scanned linearly for the smallest `f`, ties going to the smallest `h`, then to the oldest entry.
/// Branching is small (the neighbors of a node across its 6 faces), which keeps that cheap enough.
///
/// The algorithm only changes how a neighbor picks its parent:
///   - A*: the expanded node.
///   - Theta*: the parent of the expanded node if the two see each other, otherwise the expanded node.
///   - Lazy Theta*: the parent of the expanded node, unconditionally. Line of sight is verified when the neighbor is
///     expanded in turn, falling back to its best expanded neighbor.
pub struct PathfindingStepper<'a> {
    octree: &'a VoxelOctree,
    parameters: PathfindingParameters,
    raycaster: LineOfSightRaycaster,
    state: StepperState,
    nodes: IndexMap<NodeAddress, SearchNode, RandomState>,
    open: IndexMap<NodeAddress, OpenEntry, RandomState>,
    closed: IndexSet<NodeAddress, RandomState>,
    /// For Lazy Theta*, the expanded node through which each node was last improved.
    discovered_from: IndexMap<NodeAddress, NodeAddress, RandomState>,
    current: Option<NodeAddress>,
    neighbors: Vec<NodeAddress>,
    neighbor_index: usize,
    outcome: Option<Result<SearchOutcome, PathfindingError>>,
    notified_end: bool,
    iterations: usize,
    line_of_sight_checks: usize,
}

impl<'a> PathfindingStepper<'a> {
    pub fn new(octree: &'a VoxelOctree, parameters: PathfindingParameters) -> Self {
        Self {
            octree,
            parameters,
            raycaster: LineOfSightRaycaster,
            state: StepperState::Init,
            nodes: Default::default(),
            open: Default::default(),
            closed: Default::default(),
            discovered_from: Default::default(),
            current: None,
            neighbors: Vec::new(),
            neighbor_index: 0,
            outcome: None,
            notified_end: false,
            iterations: 0,
            line_of_sight_checks: 0,
        }
    }

    /// Resolves the query and returns a stepper that has not started yet, for single-step debugging.
    pub fn from_query(
        octree: &'a VoxelOctree,
        agent: AgentProperties,
        start: Point3f,
        end: Point3f,
        settings: PathfindingSettings,
    ) -> Result<Self, PathfindingError> {
        let parameters = PathfindingParameters::new(octree, agent, start, end, settings)?;

        Ok(Self::new(octree, parameters))
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    pub fn parameters(&self) -> &PathfindingParameters {
        &self.parameters
    }

    pub fn octree(&self) -> &'a VoxelOctree {
        self.octree
    }

    /// Number of nodes expanded so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn line_of_sight_checks(&self) -> usize {
        self.line_of_sight_checks
    }

    /// Every node reached so far.
    pub fn search_nodes(&self) -> impl Iterator<Item = &SearchNode> {
        self.nodes.values()
    }

    pub fn search_node(&self, address: NodeAddress) -> Option<&SearchNode> {
        self.nodes.get(&address)
    }

    pub fn open_set(&self) -> impl Iterator<Item = &SearchNode> {
        self.open.keys().filter_map(move |a| self.nodes.get(a))
    }

    pub fn closed_set(&self) -> impl Iterator<Item = &SearchNode> {
        self.closed.iter().filter_map(move |a| self.nodes.get(a))
    }

    /// Performs one state transition.
    pub fn step(&mut self, observer: &mut impl PathfindingObserver) -> StepperStatus {
        let state = self.state;
        let status = match state {
            StepperState::Init => self.init(),
            StepperState::ProcessNode => self.process_node(observer),
            StepperState::ProcessNeighbor => self.process_neighbor(observer),
            StepperState::Ended => self.end(observer),
        };
        trace!(from = ?state, to = ?self.state, "Pathfinding step");

        status
    }

    /// Steps until one more node has been expanded, or the search stopped.
    pub fn run_until_next_node(&mut self, observer: &mut impl PathfindingObserver) -> StepperStatus {
        let iterations = self.iterations;
        loop {
            let status = self.step(observer);
            if status == StepperStatus::IsStopped || self.iterations > iterations {
                return status;
            }
        }
    }

    /// Steps until the search stops, then builds the path.
    pub fn run(
        &mut self,
        observer: &mut impl PathfindingObserver,
    ) -> Result<NavigationPath, PathfindingError> {
        while self.step(observer) == StepperStatus::MustContinue {}

        self.result().unwrap_or(Err(PathfindingError::SearchExhausted))
    }

    /// The nodes of the path found, start first. `None` until the search has ended successfully.
    pub fn node_addresses(&self) -> Option<&[NodeAddress]> {
        match &self.outcome {
            Some(Ok(outcome)) => Some(&outcome.addresses),
            _ => None,
        }
    }

    /// `None` until the search has ended.
    pub fn result(&self) -> Option<Result<NavigationPath, PathfindingError>> {
        match self.outcome.as_ref()? {
            Ok(outcome) => Some(Ok(self.build_path(outcome))),
            Err(e) => Some(Err(e.clone())),
        }
    }

    fn init(&mut self) -> StepperStatus {
        let PathfindingParameters {
            start_address,
            start_position,
            ..
        } = self.parameters;

        let start = SearchNode {
            address: start_address,
            position: start_position,
            g: 0.0,
            h: self.heuristic(start_address, start_position),
            parent: None,
        };
        self.push_open(start);
        self.state = StepperState::ProcessNode;

        StepperStatus::MustContinue
    }

    fn process_node(&mut self, observer: &mut impl PathfindingObserver) -> StepperStatus {
        let address = match self.pop_open() {
            Some(a) => a,
            None => {
                self.end_exhausted();
                return StepperStatus::MustContinue;
            }
        };
        self.iterations += 1;

        if self.parameters.settings.algorithm == PathfindingAlgorithm::LazyThetaStar {
            self.set_vertex(address);
        }
        self.closed.insert(address);
        if let Some(node) = self.nodes.get(&address) {
            observer.on_process_node(node);
        }

        if address == self.parameters.end_address {
            self.outcome = Some(Ok(SearchOutcome {
                addresses: self.reconstruct_addresses(address),
                is_partial: false,
            }));
            self.state = StepperState::Ended;
            return StepperStatus::MustContinue;
        }

        match self.octree.neighbors_of(address) {
            Ok(neighbors) => {
                self.current = Some(address);
                self.neighbors = neighbors;
                self.neighbor_index = 0;
                if !self.neighbors.is_empty() {
                    self.state = StepperState::ProcessNeighbor;
                }
            }
            Err(e) => {
                self.outcome = Some(Err(e.into()));
                self.state = StepperState::Ended;
            }
        }

        StepperStatus::MustContinue
    }

    fn process_neighbor(&mut self, observer: &mut impl PathfindingObserver) -> StepperStatus {
        let neighbor_address = self.neighbors.get(self.neighbor_index).copied();
        self.neighbor_index += 1;
        if self.neighbor_index >= self.neighbors.len() {
            self.state = StepperState::ProcessNode;
        }

        let current = match self.current.and_then(|a| self.nodes.get(&a)) {
            Some(n) => *n,
            None => return StepperStatus::MustContinue,
        };
        let neighbor_address = match neighbor_address {
            Some(a) => a,
            None => return StepperStatus::MustContinue,
        };

        if self.closed.contains(&neighbor_address) {
            if let Some(neighbor) = self.nodes.get(&neighbor_address) {
                observer.on_skip_neighbor(&current, neighbor);
            }
            return StepperStatus::MustContinue;
        }

        let position = match self.node_position(neighbor_address) {
            Some(p) => p,
            None => return StepperStatus::MustContinue,
        };

        let grandparent = current.parent.and_then(|a| self.nodes.get(&a)).copied();
        let parent = match (self.parameters.settings.algorithm, grandparent) {
            (PathfindingAlgorithm::AStar, _) | (_, None) => current,
            (PathfindingAlgorithm::ThetaStar, Some(grandparent)) => {
                if self.has_line_of_sight(grandparent.position, position) {
                    grandparent
                } else {
                    current
                }
            }
            (PathfindingAlgorithm::LazyThetaStar, Some(grandparent)) => grandparent,
        };

        let g = parent.g + self.traversal_cost(&parent, neighbor_address, position);
        let improves = self
            .nodes
            .get(&neighbor_address)
            .map(|n| g < n.g)
            .unwrap_or(true);
        if !improves {
            return StepperStatus::MustContinue;
        }

        let neighbor = SearchNode {
            address: neighbor_address,
            position,
            g,
            h: self.heuristic(neighbor_address, position),
            parent: Some(parent.address),
        };
        self.push_open(neighbor);
        if self.parameters.settings.algorithm == PathfindingAlgorithm::LazyThetaStar {
            self.discovered_from.insert(neighbor_address, current.address);
        }
        observer.on_process_neighbor(&parent, &neighbor, g);

        StepperStatus::MustContinue
    }

    fn end(&mut self, observer: &mut impl PathfindingObserver) -> StepperStatus {
        if self.notified_end {
            return StepperStatus::IsStopped;
        }
        self.notified_end = true;

        match &self.outcome {
            Some(Ok(outcome)) => {
                debug!(
                    iterations = self.iterations,
                    reached_nodes = self.nodes.len(),
                    line_of_sight_checks = self.line_of_sight_checks,
                    node_count = outcome.addresses.len(),
                    is_partial = outcome.is_partial,
                    "Path found"
                );
                observer.on_search_success(&outcome.addresses);
            }
            Some(Err(e)) => {
                debug!(
                    iterations = self.iterations,
                    reached_nodes = self.nodes.len(),
                    line_of_sight_checks = self.line_of_sight_checks,
                    "Pathfinding failed: {}",
                    e
                );
            }
            None => (),
        }

        StepperStatus::IsStopped
    }

    fn end_exhausted(&mut self) {
        self.state = StepperState::Ended;

        if self.parameters.settings.allow_partial_paths {
            let closest = self
                .closed
                .iter()
                .filter_map(|a| self.nodes.get(a))
                .min_by_key(|n| FloatOrd(n.h))
                .map(|n| n.address);
            if let Some(closest) = closest {
                self.outcome = Some(Ok(SearchOutcome {
                    addresses: self.reconstruct_addresses(closest),
                    is_partial: true,
                }));
                return;
            }
        }

        self.outcome = Some(Err(PathfindingError::SearchExhausted));
    }

    /// Lazy Theta*: makes sure the node being expanded sees its parent, otherwise reattaches it to the expanded neighbor
    /// giving the cheapest path.
    fn set_vertex(&mut self, address: NodeAddress) {
        let node = match self.nodes.get(&address) {
            Some(n) => *n,
            None => return,
        };
        let parent = match node.parent.and_then(|a| self.nodes.get(&a)) {
            Some(p) => *p,
            None => return,
        };
        if self.has_line_of_sight(parent.position, node.position) {
            return;
        }

        let mut candidates = self.octree.neighbors_of(address).unwrap_or_default();
        candidates.extend(self.discovered_from.get(&address).copied());
        let best = candidates
            .iter()
            .filter(|a| self.closed.contains(*a))
            .filter_map(|a| self.nodes.get(a))
            .map(|n| (n.g + self.traversal_cost(n, address, node.position), n.address))
            .min_by_key(|(g, _)| FloatOrd(*g));

        if let (Some((g, parent)), Some(node)) = (best, self.nodes.get_mut(&address)) {
            node.g = g;
            node.parent = Some(parent);
        }
    }

    fn push_open(&mut self, node: SearchNode) {
        let f = self.priority(&node);
        self.open.insert(node.address, OpenEntry { f, h: node.h });
        self.nodes.insert(node.address, node);
    }

    fn pop_open(&mut self) -> Option<NodeAddress> {
        let (index, _) = self
            .open
            .values()
            .enumerate()
            .min_by_key(|(_, e)| (FloatOrd(e.f), FloatOrd(e.h)))?;
        let address = *self.open.get_index(index)?.0;
        self.open.shift_remove(&address);

        Some(address)
    }

    fn reconstruct_addresses(&self, last: NodeAddress) -> Vec<NodeAddress> {
        let mut addresses = vec![last];
        let mut cursor = self.nodes.get(&last).and_then(|n| n.parent);
        while let Some(address) = cursor {
            // Parent links form a tree; this only guards against corrupted state.
            if addresses.len() > self.nodes.len() {
                break;
            }
            addresses.push(address);
            cursor = self.nodes.get(&address).and_then(|n| n.parent);
        }
        addresses.reverse();

        addresses
    }

    fn build_path(&self, outcome: &SearchOutcome) -> NavigationPath {
        let PathfindingParameters {
            start_address,
            start_position,
            end_address,
            end_position,
            settings,
            ..
        } = self.parameters;
        let offset = PointN([0.0, 0.0, self.parameters.vertical_offset()]);

        // The start node is replaced by the start position, and so is the end node by the end position.
        let addresses = &outcome.addresses;
        let intermediate_end = if outcome.is_partial {
            addresses.len()
        } else {
            addresses.len().saturating_sub(1)
        };
        let intermediate = addresses.get(1..intermediate_end).unwrap_or(&[]);

        let mut points = Vec::with_capacity(addresses.len() + 1);
        points.push(start_position);
        for address in intermediate {
            if let Some(node) = self.nodes.get(address) {
                points.push(node.position + offset);
            }
        }

        let last = outcome.addresses.last().and_then(|a| self.nodes.get(a));
        let mut cost = last.map(|n| n.g).unwrap_or(0.0);
        if !outcome.is_partial {
            points.push(end_position);
            if outcome.addresses.len() == 1 {
                // Start and end share a node.
                cost += settings.traversal_cost.cost(start_address, start_position, end_address, end_position);
            }
        }

        NavigationPath::new(points, cost, outcome.is_partial, self.octree.generation())
    }

    fn node_position(&self, address: NodeAddress) -> Option<Point3f> {
        if address == self.parameters.end_address {
            Some(self.parameters.end_position)
        } else if address == self.parameters.start_address {
            Some(self.parameters.start_position)
        } else {
            self.octree.position_from_address(address)
        }
    }

    fn has_line_of_sight(&mut self, from: Point3f, to: Point3f) -> bool {
        self.line_of_sight_checks += 1;

        self.raycaster.has_line_of_sight(self.octree, from, to)
    }

    fn traversal_cost(&self, from: &SearchNode, to_address: NodeAddress, to: Point3f) -> f32 {
        self.parameters
            .settings
            .traversal_cost
            .cost(from.address, from.position, to_address, to)
    }

    fn heuristic(&self, address: NodeAddress, position: Point3f) -> f32 {
        let PathfindingParameters {
            end_address,
            end_position,
            settings,
            ..
        } = &self.parameters;

        settings.heuristic.cost(address, position, *end_address, *end_position)
    }

    fn priority(&self, node: &SearchNode) -> f32 {
        let settings = &self.parameters.settings;
        let f = node.g + settings.heuristic_scale * node.h;
        if !settings.use_node_size_compensation {
            return f;
        }

        let layer_count = self.octree.layer_count().max(1) as f32;

        f * (1.0 - node.address.layer_index as f32 / layer_count)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
