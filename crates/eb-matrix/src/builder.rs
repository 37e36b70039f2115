//! Distance matrix construction.
//!
//! # Street distances
//!
//! One single-source [`ShortestPathTree`](eb_spatial::ShortestPathTree) per
//! origin station fills a whole row, so a 480-station network costs 480
//! Dijkstra runs rather than 230 000 point-to-point searches.  A destination
//! the tree never reached becomes `NaN`; the rest of the row and the rest of
//! the batch are unaffected.
//!
//! With the `parallel` feature rows are computed on the rayon pool.  Each row
//! depends only on its own tree, so the result is identical to the
//! sequential build.

use std::time::Instant;

use tracing::{debug, info};

use eb_core::{DistanceKind, NodeId};
use eb_spatial::{RoadNetwork, Router, SpatialError};
use eb_stations::{StationNodes, StationTable};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::matrix::DistanceMatrix;
use crate::{MatrixError, MatrixResult};

/// Great-circle distances between all stations.
///
/// Only the upper triangle is computed; the lower one is mirrored from it.
pub fn build_straight(stations: &StationTable) -> DistanceMatrix {
    let n = stations.len();
    let mut m = DistanceMatrix::unfilled(DistanceKind::Straight, n);
    let pos: Vec<_> = stations.iter().map(|s| s.pos).collect();

    for i in 0..n {
        for j in i + 1..n {
            let d = pos[i].distance_m(pos[j]);
            m.set(i, j, d);
            m.set(j, i, d);
        }
    }
    m
}

/// Shortest street distances between the located nodes of all stations.
///
/// # Errors
///
/// [`MatrixError::NodeCountMismatch`] if `nodes` was not produced for this
/// station table; [`MatrixError::Spatial`] if a located node does not exist
/// in `network`.  Both are checked before any cell is written.
pub fn build_street<R: Router + ?Sized>(
    stations: &StationTable,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> MatrixResult<DistanceMatrix> {
    check_nodes(stations, nodes, network)?;

    let n = stations.len();
    let started = Instant::now();
    let row_nodes = nodes.as_slice();

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<f64>> = row_nodes
        .par_iter()
        .map(|&source| street_row(source, row_nodes, network, router))
        .collect::<MatrixResult<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<f64>> = row_nodes
        .iter()
        .map(|&source| street_row(source, row_nodes, network, router))
        .collect::<MatrixResult<_>>()?;

    let m = DistanceMatrix::from_values(DistanceKind::Street, n, rows.concat())?;

    let missing = m.missing_pairs().len();
    info!(
        stations = n,
        missing,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built street distance matrix"
    );
    Ok(m)
}

/// Build the matrix of the requested `kind`.
pub fn build_matrix<R: Router + ?Sized>(
    kind: DistanceKind,
    stations: &StationTable,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> MatrixResult<DistanceMatrix> {
    match kind {
        DistanceKind::Straight => Ok(build_straight(stations)),
        DistanceKind::Street => build_street(stations, nodes, network, router),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn check_nodes(
    stations: &StationTable,
    nodes: &StationNodes,
    network: &RoadNetwork,
) -> MatrixResult<()> {
    if nodes.len() != stations.len() {
        return Err(MatrixError::NodeCountMismatch { stations: stations.len(), nodes: nodes.len() });
    }
    if let Some(&bad) = nodes.as_slice().iter().find(|&&n| !network.contains(n)) {
        return Err(MatrixError::Spatial(SpatialError::NodeNotFound(bad)));
    }
    Ok(())
}

fn street_row<R: Router + ?Sized>(
    source: NodeId,
    targets: &[NodeId],
    network: &RoadNetwork,
    router: &R,
) -> MatrixResult<Vec<f64>> {
    let tree = router.tree(network, source)?;
    let row: Vec<f64> = targets
        .iter()
        .map(|&t| tree.distance_m(t).unwrap_or(f64::NAN))
        .collect();
    let unreachable = row.iter().filter(|d| d.is_nan()).count();
    if unreachable > 0 {
        debug!(source = %source, unreachable, "street row has unreachable stations");
    }
    Ok(row)
}
