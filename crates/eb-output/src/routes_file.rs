//! Route catalog file: one JSON object mapping `"<origin> to <destination>"`
//! to a GeoJSON `Feature`.
//!
//! The object also carries a `"fingerprint"` member: a hash of the station
//! to node assignment and the network size the routes were built from.  It
//! can never collide with a pair key.
//!
//! Pairs without a street route are absent from the file.

use std::path::Path;

use geojson::Feature;
use serde_json::{Map, Value};
use xxhash_rust::xxh32::xxh32;

use eb_matrix::{RouteCatalog, RouteGeometry};
use eb_spatial::RoadNetwork;
use eb_stations::StationNodes;

use crate::atomic::atomic_write;
use crate::{OutputError, OutputResult};

pub const ROUTES_FILE_NAME: &str = "shortest_routes.json";

/// Member of the catalog object holding [`route_fingerprint`].
pub const FINGERPRINT_KEY: &str = "fingerprint";

const XXHASH_SEED: u32 = 0;

/// Hash of every station's node (external id and position) plus the node
/// and edge counts of `network`.
///
/// Moving a station onto another node, or loading a different network,
/// changes the fingerprint.
pub fn route_fingerprint(nodes: &StationNodes, network: &RoadNetwork) -> u32 {
    let mut bytes = Vec::with_capacity(nodes.len() * 28 + 16);
    for (station, node) in nodes.iter() {
        bytes.extend_from_slice(&station.0.to_le_bytes());
        let external = network.node_external_id.get(node.index()).copied().unwrap_or(-1);
        bytes.extend_from_slice(&external.to_le_bytes());
        if let Some(pos) = network.position(node) {
            bytes.extend_from_slice(&pos.lat.to_le_bytes());
            bytes.extend_from_slice(&pos.lon.to_le_bytes());
        }
    }
    bytes.extend_from_slice(&(network.node_count() as u64).to_le_bytes());
    bytes.extend_from_slice(&(network.edge_count() as u64).to_le_bytes());
    xxh32(&bytes, XXHASH_SEED)
}

/// Atomically write `catalog` to `path`, tagged with `fingerprint`.
pub fn write_route_catalog(path: &Path, catalog: &RouteCatalog, fingerprint: u32) -> OutputResult<()> {
    let mut doc = Map::new();
    doc.insert(FINGERPRINT_KEY.into(), fingerprint.into());
    for route in catalog.iter() {
        doc.insert(route.key(), serde_json::to_value(route.to_feature())?);
    }
    atomic_write(path, &serde_json::to_vec(&doc)?)?;
    Ok(())
}

/// Read a catalog written by [`write_route_catalog`], with its fingerprint.
///
/// # Errors
///
/// [`OutputError::Corrupt`] when the fingerprint is missing, a feature lacks
/// the route properties, or its key does not match them.
pub fn read_route_catalog(path: &Path) -> OutputResult<(u32, RouteCatalog)> {
    let mut doc: Map<String, Value> = serde_json::from_slice(&std::fs::read(path)?)?;

    let fingerprint = doc
        .remove(FINGERPRINT_KEY)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| OutputError::Corrupt("route catalog has no fingerprint".into()))?;

    let mut catalog = RouteCatalog::new();
    for (key, value) in doc {
        let feature: Feature = serde_json::from_value(value)?;
        let route = RouteGeometry::from_feature(&feature)
            .ok_or_else(|| OutputError::Corrupt(format!("route {key:?} is not a route feature")))?;
        if route.key() != key {
            return Err(OutputError::Corrupt(format!(
                "route stored under {key:?} runs {}",
                route.key()
            )));
        }
        catalog.insert(route);
    }
    Ok((fingerprint, catalog))
}
