//! CSV tables consumed by the dashboard.
//!
//! | File                    | Columns                                                  |
//! |-------------------------|----------------------------------------------------------|
//! | `station_nodes.csv`     | `station_id,name,lat,lon,node_id,snap_distance_m`        |
//! | `node_stations.csv`     | `node_id,lat,lon,station_id`                             |
//! | `connections_<id>.csv`  | `direction,counterpart,trips,mean_duration_secs,distance_m` |
//! | `activity_<date>.csv`   | `station_id,rentals,returns`                             |
//!
//! `node_id` is the identifier from the network source (OSM id or the
//! `node_id` column of `nodes.csv`), not the internal index.

use std::path::Path;

use serde::Serialize;

use eb_core::StationId;
use eb_spatial::RoadNetwork;
use eb_stations::{StationNodes, StationTable};
use eb_trips::{Connection, Connections, DailyActivity};

use crate::atomic::atomic_write;
use crate::{OutputError, OutputResult};

#[derive(Serialize)]
struct StationNodeRow<'a> {
    station_id:      u32,
    name:            &'a str,
    lat:             f64,
    lon:             f64,
    node_id:         i64,
    snap_distance_m: f64,
}

#[derive(Serialize)]
struct NodeStationRow {
    node_id:    i64,
    lat:        f64,
    lon:        f64,
    station_id: u32,
}

#[derive(Serialize)]
struct ConnectionRow {
    direction:          &'static str,
    counterpart:        u32,
    trips:              u32,
    mean_duration_secs: f64,
    distance_m:         f64,
}

#[derive(Serialize)]
struct ActivityRow {
    station_id: u32,
    rentals:    u32,
    returns:    u32,
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> OutputResult<()> {
    let mut w = csv::Writer::from_writer(Vec::new());
    for row in rows {
        w.serialize(row)?;
    }
    let bytes = w.into_inner().map_err(|e| OutputError::Io(e.into_error()))?;
    atomic_write(path, &bytes)?;
    Ok(())
}

/// One row per station with its located node.
pub fn write_station_nodes(
    path: &Path,
    stations: &StationTable,
    nodes: &StationNodes,
    network: &RoadNetwork,
) -> OutputResult<()> {
    if nodes.len() != stations.len() {
        return Err(OutputError::Inconsistent(format!(
            "{} stations but {} located nodes",
            stations.len(),
            nodes.len()
        )));
    }
    if let Some((station, node)) = nodes.iter().find(|&(_, n)| !network.contains(n)) {
        return Err(OutputError::Inconsistent(format!("station {station} located on unknown node {node}")));
    }
    write_rows(
        path,
        stations.iter().zip(nodes.iter()).map(|(s, (_, node))| StationNodeRow {
            station_id:      s.id.0,
            name:            &s.name,
            lat:             s.pos.lat,
            lon:             s.pos.lon,
            node_id:         network.node_external_id[node.index()],
            snap_distance_m: nodes.snap_distance_m(s.id).unwrap_or(f64::NAN),
        }),
    )
}

/// One row per road node with its nearest station, as produced by
/// `eb_stations::assign_nodes_to_stations`.
pub fn write_node_assignment(path: &Path, network: &RoadNetwork, assignment: &[StationId]) -> OutputResult<()> {
    if assignment.len() != network.node_count() {
        return Err(OutputError::Inconsistent(format!(
            "{} nodes but {} assignments",
            network.node_count(),
            assignment.len()
        )));
    }
    write_rows(
        path,
        assignment.iter().enumerate().map(|(i, station)| NodeStationRow {
            node_id:    network.node_external_id[i],
            lat:        network.node_pos[i].lat,
            lon:        network.node_pos[i].lon,
            station_id: station.0,
        }),
    )
}

/// Outbound rows first, then inbound, each in counterpart order.
pub fn write_connections(path: &Path, connections: &Connections) -> OutputResult<()> {
    let row = |direction: &'static str, c: &Connection| ConnectionRow {
        direction,
        counterpart:        c.counterpart.0,
        trips:              c.trips,
        mean_duration_secs: c.mean_duration_secs,
        distance_m:         c.distance_m,
    };
    write_rows(
        path,
        connections
            .outbound
            .iter()
            .map(|c| row("outbound", c))
            .chain(connections.inbound.iter().map(|c| row("inbound", c))),
    )
}

pub fn write_daily_activity(path: &Path, activity: &DailyActivity) -> OutputResult<()> {
    write_rows(
        path,
        activity.iter().map(|(id, rentals, returns)| ActivityRow { station_id: id.0, rentals, returns }),
    )
}
