//! Shortest-path search over the street graph.
//!
//! # Pluggability
//!
//! Matrix and route builders call routing through the [`Router`] trait, so a
//! contraction hierarchy or A* implementation can replace the default
//! [`DijkstraRouter`] without touching them.
//!
//! # Trees, not pairs
//!
//! Filling an N×N street matrix with one point-to-point search per pair costs
//! N² searches.  [`Router::tree`] instead returns a single-source
//! [`ShortestPathTree`]; one tree answers every destination from the same
//! origin, both for distances and for route geometry.
//!
//! # Cost units
//!
//! Edge cost is `edge_length_m`, so every distance here is in metres.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use eb_core::{EdgeId, GeoPoint, NodeId};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the ordered edges from `from` to `to` and
/// their summed length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub from: NodeId,
    pub to: NodeId,
    /// Edges to traverse in order, from source to destination.
    pub edges: Vec<EdgeId>,
    /// Sum of `edge_length_m` along `edges`.
    pub total_length_m: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Visited nodes in traversal order, both endpoints included.
    pub fn node_path(&self, network: &RoadNetwork) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.edges.len() + 1);
        nodes.push(self.from);
        nodes.extend(self.edges.iter().map(|e| network.edge_to[e.index()]));
        nodes
    }

    /// Coordinates of [`node_path`](Self::node_path).
    pub fn coordinates(&self, network: &RoadNetwork) -> Vec<GeoPoint> {
        self.node_path(network)
            .into_iter()
            .map(|n| network.node_pos[n.index()])
            .collect()
    }
}

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Single-source shortest-path tree: best distance and incoming edge for
/// every node reached from `source`.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source:    NodeId,
    dist_m:    Vec<f64>,
    prev_edge: Vec<EdgeId>,
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Street distance from the source to `to`, or `None` if unreachable.
    #[inline]
    pub fn distance_m(&self, to: NodeId) -> Option<f64> {
        self.dist_m
            .get(to.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    #[inline]
    pub fn is_reachable(&self, to: NodeId) -> bool {
        self.distance_m(to).is_some()
    }

    /// Every node the search settled, in `NodeId` order.
    pub fn reached(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dist_m
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Reconstruct the route from the source to `to`.
    pub fn route_to(&self, network: &RoadNetwork, to: NodeId) -> SpatialResult<Route> {
        if !network.contains(to) {
            return Err(SpatialError::NodeNotFound(to));
        }
        let total_length_m = self
            .distance_m(to)
            .ok_or(SpatialError::NoRoute { from: self.source, to })?;

        let mut edges = Vec::new();
        let mut cur = to;
        while cur != self.source {
            let e = self.prev_edge[cur.index()];
            edges.push(e);
            cur = network.edge_from[e.index()];
        }
        edges.reverse();

        Ok(Route { from: self.source, to, edges, total_length_m })
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so one router can be shared across
/// rayon workers when the `parallel` matrix build is enabled.
pub trait Router: Send + Sync {
    /// Shortest route from `from` to `to`.
    ///
    /// `from == to` yields an empty route, never an error.  Returns
    /// [`SpatialError::NoRoute`] when `to` is unreachable and
    /// [`SpatialError::NodeNotFound`] for ids outside the network.
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route>;

    /// Full single-source tree rooted at `source`.
    fn tree(&self, network: &RoadNetwork, source: NodeId) -> SpatialResult<ShortestPathTree>;

    /// Tree rooted at `source` that stops expanding past `limit_m` metres.
    fn tree_within(
        &self,
        network: &RoadNetwork,
        source: NodeId,
        limit_m: f64,
    ) -> SpatialResult<ShortestPathTree>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR street graph with `edge_length_m` cost.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        check_node(network, from)?;
        check_node(network, to)?;
        if from == to {
            return Ok(Route { from, to, edges: vec![], total_length_m: 0.0 });
        }
        let tree = dijkstra(network, from, Some(to), f64::INFINITY);
        tree.route_to(network, to)
    }

    fn tree(&self, network: &RoadNetwork, source: NodeId) -> SpatialResult<ShortestPathTree> {
        check_node(network, source)?;
        Ok(dijkstra(network, source, None, f64::INFINITY))
    }

    fn tree_within(
        &self,
        network: &RoadNetwork,
        source: NodeId,
        limit_m: f64,
    ) -> SpatialResult<ShortestPathTree> {
        check_node(network, source)?;
        Ok(dijkstra(network, source, None, limit_m))
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[inline]
fn check_node(network: &RoadNetwork, node: NodeId) -> SpatialResult<()> {
    if network.contains(node) {
        Ok(())
    } else {
        Err(SpatialError::NodeNotFound(node))
    }
}

/// Heap key ordered by cost, then `NodeId` for deterministic tie-breaking.
#[derive(Copy, Clone, PartialEq)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run Dijkstra from `from`.  Stops early once `target` is settled, and never
/// relaxes an edge whose end would lie beyond `limit_m`.
///
/// Nodes left unsettled keep `f64::INFINITY` in the distance array.  With a
/// `target`, nodes other than the target may hold tentative distances; only
/// `route_to(target)` is meaningful on such a tree, which is why early exit is
/// private to [`DijkstraRouter::route`].
fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    target: Option<NodeId>,
    limit_m: f64,
) -> ShortestPathTree {
    let n = network.node_count();
    let mut dist_m    = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist_m[from.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
    heap.push(Reverse(QueueEntry { cost: 0.0, node: from }));

    while let Some(Reverse(QueueEntry { cost, node })) = heap.pop() {
        if Some(node) == target {
            break;
        }

        // Skip stale heap entries.
        if cost > dist_m[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + network.edge_length_m[edge.index()];

            if new_cost <= limit_m && new_cost < dist_m[neighbor.index()] {
                dist_m[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse(QueueEntry { cost: new_cost, node: neighbor }));
            }
        }
    }

    ShortestPathTree { source: from, dist_m, prev_edge }
}
