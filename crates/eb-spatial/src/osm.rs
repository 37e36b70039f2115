//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use eb_spatial::osm::load_from_pbf;
//!
//! let network = load_from_pbf(Path::new("cdmx.osm.pbf"))?;
//! ```
//!
//! # What is loaded
//!
//! Ways a bicycle may use (see [`is_cycleable`]).  One-way streets add a
//! single directed edge unless the way carries a contraflow exemption for
//! bicycles (`oneway:bicycle=no`, `cycleway=opposite*`).  `oneway=-1` adds the
//! edge against the way's drawing direction.
//!
//! # Memory note
//!
//! All OSM nodes are buffered in a `HashMap<i64, GeoPoint>` during the first
//! pass because ways reference nodes by OSM id.  The map is dropped before
//! the R-tree is built.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use osmpbf::{Element, ElementReader};
use tracing::info;

use eb_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::SpatialError;

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a cycleable street network from an OSM PBF file.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on open or parse errors.
pub fn load_from_pbf(path: &Path) -> Result<RoadNetwork, SpatialError> {
    // ── Phase 1: collect all OSM nodes + cycleable ways in one pass ───────
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if is_cycleable(&tags) {
                    let direction = direction(&tags);
                    let refs: Vec<i64> = w.refs().collect();
                    ways.push(OsmWay { refs, direction });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // ── Phase 2: identify way-referenced node IDs ─────────────────────────
    let way_node_ids: HashSet<i64> = ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .collect();

    // ── Phase 3: build network ────────────────────────────────────────────
    let mut builder = RoadNetworkBuilder::with_capacity(way_node_ids.len(), way_node_ids.len() * 2);

    // Sorted so NodeIds are stable across runs on the same extract.
    let mut sorted_ids: Vec<i64> = way_node_ids.into_iter().collect();
    sorted_ids.sort_unstable();

    let mut osm_to_eb: HashMap<i64, NodeId> = HashMap::with_capacity(sorted_ids.len());
    for osm_id in sorted_ids {
        if let Some(&pos) = all_nodes.get(&osm_id) {
            osm_to_eb.insert(osm_id, builder.add_external_node(osm_id, pos));
        }
    }
    drop(all_nodes);

    for way in &ways {
        for window in way.refs.windows(2) {
            let (Some(&a), Some(&b)) = (osm_to_eb.get(&window[0]), osm_to_eb.get(&window[1])) else {
                continue;
            };
            let len_m = builder.node_pos(a).distance_m(builder.node_pos(b));
            match way.direction {
                Direction::Both     => builder.add_road(a, b, len_m),
                Direction::Forward  => builder.add_directed_edge(a, b, len_m),
                Direction::Backward => builder.add_directed_edge(b, a, len_m),
            }
        }
    }

    let network = builder.build();
    info!(
        ways = ways.len(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        path = %path.display(),
        "loaded road network from OSM PBF"
    );
    Ok(network)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:      Vec<i64>,
    direction: Direction,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    Both,
    Forward,
    Backward,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// `true` if a bicycle may ride along the way.
///
/// Motorways and stairs are excluded; foot-only ways are kept only when
/// bicycles are explicitly allowed.
pub(crate) fn is_cycleable(tags: &[(&str, &str)]) -> bool {
    let Some(highway) = tag(tags, "highway") else {
        return false;
    };
    if matches!(tag(tags, "bicycle"), Some("no" | "dismount")) {
        return false;
    }
    if matches!(tag(tags, "area"), Some("yes")) {
        return false;
    }
    match highway {
        "motorway" | "motorway_link" | "steps" | "construction" | "proposed"
        | "platform" | "bus_guideway" | "raceway" => false,
        "footway" | "pedestrian" | "path" | "bridleway" | "corridor" => {
            matches!(tag(tags, "bicycle"), Some("yes" | "designated" | "permissive"))
        }
        _ => true,
    }
}

/// Direction a bicycle may travel along the way.
pub(crate) fn direction(tags: &[(&str, &str)]) -> Direction {
    let contraflow = matches!(tag(tags, "oneway:bicycle"), Some("no"))
        || tag(tags, "cycleway").is_some_and(|v| v.starts_with("opposite"));
    if contraflow {
        return Direction::Both;
    }
    match tag(tags, "oneway") {
        Some("yes" | "1" | "true") => Direction::Forward,
        Some("-1" | "reverse") => Direction::Backward,
        _ if matches!(tag(tags, "junction"), Some("roundabout")) => Direction::Forward,
        _ => Direction::Both,
    }
}
