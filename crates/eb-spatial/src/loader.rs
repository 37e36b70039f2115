//! CSV road network loader.
//!
//! # CSV format
//!
//! Two files.  `nodes.csv` lists intersections with an arbitrary integer id
//! (typically the OSM node id):
//!
//! ```csv
//! node_id,lat,lon
//! 2215034,19.43261,-99.13321
//! 2215039,19.43302,-99.13188
//! ```
//!
//! `edges.csv` lists street segments between those ids:
//!
//! ```csv
//! from,to,length_m,oneway
//! 2215034,2215039,148.2,false
//! 2215039,2215034,,true
//! ```
//!
//! | Column     | Meaning                                                     |
//! |------------|-------------------------------------------------------------|
//! | `length_m` | Metres.  Empty → great-circle length between the endpoints. |
//! | `oneway`   | `true`/`yes`/`1` adds only `from → to`; otherwise both.     |
//!
//! Extra columns are ignored, so an OSMnx edge export can be read directly
//! once its `u`/`v`/`length` headers are renamed.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use eb_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    node_id: i64,
    lat:     f64,
    lon:     f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:     i64,
    to:       i64,
    length_m: Option<f64>,
    #[serde(default)]
    oneway:   Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from a `nodes.csv` / `edges.csv` pair.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> SpatialResult<RoadNetwork> {
    let nodes_file = std::fs::File::open(nodes)?;
    let edges_file = std::fs::File::open(edges)?;
    let network = load_network_reader(nodes_file, edges_file)?;
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        path = %nodes.display(),
        "loaded road network from CSV"
    );
    Ok(network)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn load_network_reader<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut builder = RoadNetworkBuilder::new();
    let mut by_external: HashMap<i64, NodeId> = HashMap::new();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result?;
        let pos = GeoPoint::new(row.lat, row.lon);
        if !pos.is_valid() {
            return Err(SpatialError::Parse(format!(
                "node {} has invalid coordinate {pos}",
                row.node_id
            )));
        }
        if by_external.contains_key(&row.node_id) {
            return Err(SpatialError::Parse(format!("duplicate node id {}", row.node_id)));
        }
        let id = builder.add_external_node(row.node_id, pos);
        by_external.insert(row.node_id, id);
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result?;
        let from = resolve(&by_external, row.from)?;
        let to   = resolve(&by_external, row.to)?;

        let length_m = match row.length_m {
            Some(len) if len.is_finite() && len >= 0.0 => len,
            Some(len) => {
                return Err(SpatialError::Parse(format!(
                    "edge {} -> {} has invalid length {len}",
                    row.from, row.to
                )));
            }
            None => builder.node_pos(from).distance_m(builder.node_pos(to)),
        };

        if parse_oneway(row.oneway.as_deref())? {
            builder.add_directed_edge(from, to, length_m);
        } else {
            builder.add_road(from, to, length_m);
        }
    }

    Ok(builder.build())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn resolve(by_external: &HashMap<i64, NodeId>, external: i64) -> SpatialResult<NodeId> {
    by_external
        .get(&external)
        .copied()
        .ok_or_else(|| SpatialError::Parse(format!("edge references unknown node {external}")))
}

fn parse_oneway(s: Option<&str>) -> SpatialResult<bool> {
    match s.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("true" | "yes" | "1") => Ok(true),
        Some("false" | "no" | "0") => Ok(false),
        Some(other) => Err(SpatialError::Parse(format!(
            "invalid oneway value {other:?}: expected true/false, yes/no, or 1/0"
        ))),
    }
}
