//! Station ⇄ road-node assignment.
//!
//! [`locate_stations`] snaps every station to its nearest road node once per
//! run; distance and route builders only ever see the resulting
//! [`StationNodes`].  [`assign_nodes_to_stations`] answers the inverse
//! question, used by the dashboard to colour the street graph by catchment.
//!
//! Neither function checks reachability.  A station snapped onto an isolated
//! fragment of the graph shows up later as `NaN` matrix cells and missing
//! routes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use eb_core::{GeoPoint, NodeId, SnapPolicy, StationId};
use eb_spatial::RoadNetwork;

use crate::station::StationTable;
use crate::{LocateError, LocateResult};

// ── StationNodes ──────────────────────────────────────────────────────────────

/// Nearest road node of every station, indexed by [`StationId::slot`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationNodes {
    nodes:           Vec<NodeId>,
    snap_distance_m: Vec<f64>,
}

impl StationNodes {
    /// Build from explicit node ids, e.g. when reloading a persisted table.
    /// Snap distances are unknown and reported as `NaN`.
    pub fn from_nodes(nodes: Vec<NodeId>) -> Self {
        let snap_distance_m = vec![f64::NAN; nodes.len()];
        Self { nodes, snap_distance_m }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node assigned to `station`, or `None` for ids outside the table.
    #[inline]
    pub fn node(&self, station: StationId) -> Option<NodeId> {
        if station.is_within(self.nodes.len()) {
            Some(self.nodes[station.slot()])
        } else {
            None
        }
    }

    /// Great-circle metres between the station and its node.
    pub fn snap_distance_m(&self, station: StationId) -> Option<f64> {
        if station.is_within(self.nodes.len()) {
            Some(self.snap_distance_m[station.slot()])
        } else {
            None
        }
    }

    /// `(station, node)` pairs in station order.
    pub fn iter(&self) -> impl Iterator<Item = (StationId, NodeId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(slot, &n)| (StationId::from_slot(slot), n))
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

// ── Station locator ───────────────────────────────────────────────────────────

/// Snap every station in `stations` to its nearest node of `network`.
///
/// # Errors
///
/// [`LocateError::EmptyNetwork`] if the network has no nodes;
/// [`LocateError::OutOfRegion`] under [`SnapPolicy::Reject`] for the first
/// station whose nearest node is too far away.
pub fn locate_stations(
    stations: &StationTable,
    network: &RoadNetwork,
    policy: SnapPolicy,
) -> LocateResult<StationNodes> {
    let mut nodes = Vec::with_capacity(stations.len());
    let mut snap_distance_m = Vec::with_capacity(stations.len());
    let mut far = 0usize;

    for station in stations.iter() {
        let node = network
            .snap_to_node(station.pos)
            .ok_or(LocateError::EmptyNetwork)?;
        let distance_m = station.pos.distance_m(network.node_pos[node.index()]);

        match policy {
            SnapPolicy::Reject { max_distance_m } if distance_m > max_distance_m => {
                return Err(LocateError::OutOfRegion {
                    station: station.id,
                    distance_m,
                    max_distance_m,
                });
            }
            SnapPolicy::Snap { warn_beyond_m } if distance_m > warn_beyond_m => {
                far += 1;
                warn!(
                    station = %station.id,
                    name = %station.name,
                    distance_m,
                    "station snapped to a distant road node"
                );
            }
            _ => {}
        }

        nodes.push(node);
        snap_distance_m.push(distance_m);
    }

    debug!(stations = nodes.len(), far, "located stations on road network");
    Ok(StationNodes { nodes, snap_distance_m })
}

// ── Node → station assignment ─────────────────────────────────────────────────

#[derive(Clone)]
struct StationEntry {
    point: [f64; 2], // [lat, lon]
    id: StationId,
}

impl RTreeObject for StationEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Nearest station of every network node, indexed by `NodeId`.
///
/// Equidistant stations resolve to the lowest `StationId`.
pub fn assign_nodes_to_stations(network: &RoadNetwork, stations: &StationTable) -> Vec<StationId> {
    let tree = RTree::bulk_load(
        stations
            .iter()
            .map(|s| StationEntry { point: [s.pos.lat, s.pos.lon], id: s.id })
            .collect(),
    );
    network
        .node_pos
        .iter()
        .map(|&pos| nearest_station(&tree, pos))
        .collect()
}

fn nearest_station(tree: &RTree<StationEntry>, pos: GeoPoint) -> StationId {
    let mut iter = tree.nearest_neighbor_iter_with_distance_2(&[pos.lat, pos.lon]);
    // A StationTable is never empty.
    let Some((first, best_d2)) = iter.next() else {
        return StationId(1);
    };
    iter.take_while(|(_, d2)| *d2 <= best_d2)
        .map(|(e, _)| e.id)
        .fold(first.id, |best, id| best.min(id))
}
