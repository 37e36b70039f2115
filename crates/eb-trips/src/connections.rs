//! Per-station connection summaries.
//!
//! For one station the trip log splits into *outbound* trips (the station is
//! the origin) and *inbound* trips (the station is the destination).  Each
//! side is grouped by the station at the other end.  A round trip that
//! starts and ends at the same station counts on both sides.

use std::collections::BTreeMap;

use tracing::debug;

use eb_core::{BoundingBox, NodeId, StationId};
use eb_spatial::{RoadNetwork, Router, SpatialError};
use eb_stations::{StationNodes, StationTable};

use crate::record::TripLog;
use crate::{TripError, TripResult};

/// Street radius used for the extent of a station with no trips.
pub const ISOLATED_EXTENT_M: f64 = 1_000.0;

/// Trips between a station and one counterpart, in one direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    pub counterpart:        StationId,
    pub trips:              u32,
    pub mean_duration_secs: f64,
    /// Great-circle distance between the two stations.
    pub distance_m:         f64,
}

/// Outbound and inbound connections of `station`, each sorted by
/// counterpart id.  Counterparts without trips are absent.
#[derive(Clone, Debug, PartialEq)]
pub struct Connections {
    pub station:  StationId,
    pub outbound: Vec<Connection>,
    pub inbound:  Vec<Connection>,
}

impl Connections {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.inbound.is_empty()
    }

    /// Every counterpart on either side, ascending and without repeats.
    pub fn counterparts(&self) -> Vec<StationId> {
        let mut ids: Vec<StationId> = self
            .outbound
            .iter()
            .chain(&self.inbound)
            .map(|c| c.counterpart)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Default)]
struct Tally {
    trips:    u32,
    secs_sum: i64,
}

/// Summarise the trips of `station`.
///
/// # Errors
///
/// [`TripError::UnknownStation`] if `station`, or any counterpart in the
/// log, is not in `stations`.
pub fn connections(station: StationId, log: &TripLog, stations: &StationTable) -> TripResult<Connections> {
    if !stations.contains(station) {
        return Err(TripError::UnknownStation(station));
    }

    let mut outbound: BTreeMap<StationId, Tally> = BTreeMap::new();
    let mut inbound: BTreeMap<StationId, Tally> = BTreeMap::new();

    for trip in log {
        if trip.origin == station {
            let t = outbound.entry(trip.destination).or_default();
            t.trips += 1;
            t.secs_sum += trip.elapsed_secs();
        }
        if trip.destination == station {
            let t = inbound.entry(trip.origin).or_default();
            t.trips += 1;
            t.secs_sum += trip.elapsed_secs();
        }
    }

    let summarise = |side: BTreeMap<StationId, Tally>| -> TripResult<Vec<Connection>> {
        side.into_iter()
            .map(|(counterpart, tally)| {
                if !stations.contains(counterpart) {
                    return Err(TripError::UnknownStation(counterpart));
                }
                Ok(Connection {
                    counterpart,
                    trips: tally.trips,
                    mean_duration_secs: tally.secs_sum as f64 / f64::from(tally.trips),
                    distance_m: stations.straight_distance_m(station, counterpart),
                })
            })
            .collect()
    };

    let c = Connections { station, outbound: summarise(outbound)?, inbound: summarise(inbound)? };
    debug!(
        station = %station,
        outbound = c.outbound.len(),
        inbound = c.inbound.len(),
        "summarised station connections"
    );
    Ok(c)
}

/// Map extent for drawing a station's connections.
///
/// The box encloses the located nodes of the station and of every
/// counterpart.  A station with no connections gets the box around the
/// nodes within [`ISOLATED_EXTENT_M`] of street distance from its node.
pub fn connection_extent<R: Router + ?Sized>(
    connections: &Connections,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> TripResult<BoundingBox> {
    let station = connections.station;
    let home = nodes.node(station).ok_or(TripError::UnknownStation(station))?;

    let extent_nodes: Vec<NodeId> = if connections.is_empty() {
        router.tree_within(network, home, ISOLATED_EXTENT_M)?.reached().collect()
    } else {
        let mut v = vec![home];
        for id in connections.counterparts() {
            v.push(nodes.node(id).ok_or(TripError::UnknownStation(id))?);
        }
        v
    };

    let points = extent_nodes
        .into_iter()
        .map(|n| network.position(n).ok_or(SpatialError::NodeNotFound(n)))
        .collect::<Result<Vec<_>, _>>()?;
    BoundingBox::enclosing(points).ok_or(TripError::UnknownStation(station))
}
