//! precompute: writes every artifact the ecobici dashboard reads.
//!
//! One run, in order:
//!
//! 1. load the station table and the road network;
//! 2. locate stations on the network, write `station_nodes.csv` and
//!    `node_stations.csv`;
//! 3. load or build each requested distance matrix (cached);
//! 4. load or build `shortest_routes.json` (cached) unless routes are disabled;
//! 5. with a trip log, write per-station connections and per-day activity
//!    and rider statistics.

mod cli;
mod logger;


use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};

use eb_core::{DistanceKind, NetworkSource, PrecomputeConfig};
use eb_matrix::{build_matrix, build_route_catalog, build_straight, DistanceMatrix};
use eb_output::{
    load_or_build_routes, route_fingerprint, write_connections, write_daily_activity, write_day_stats,
    write_node_assignment, write_station_nodes, DayStats, MatrixCache, ROUTES_FILE_NAME,
};
use eb_spatial::{DijkstraRouter, RoadNetwork};
use eb_stations::{assign_nodes_to_stations, load_stations_csv, locate_stations, StationTable};
use eb_trips::{age_histogram, connections, load_trips_csv, sex_counts, DailyActivity, MotionHistograms, Sex};

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_logger(if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });

    let config = args.into_config()?;
    let started = Instant::now();
    run(&config)?;
    info!(elapsed_secs = started.elapsed().as_secs_f64(), "precompute finished");
    Ok(())
}

fn run(config: &PrecomputeConfig) -> Result<()> {
    let out = config.output_dir.as_path();
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    // ── Inputs ────────────────────────────────────────────────────────────
    let stations = load_stations_csv(&config.stations_csv)
        .with_context(|| format!("loading stations from {}", config.stations_csv.display()))?;
    let network = load_network(&config.network)?;
    info!(
        stations = stations.len(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "inputs loaded"
    );

    // ── Station location ──────────────────────────────────────────────────
    let nodes = locate_stations(&stations, &network, config.snap_policy)
        .context("locating stations on the road network")?;
    write_station_nodes(&out.join("station_nodes.csv"), &stations, &nodes, &network)?;
    let assignment = assign_nodes_to_stations(&network, &stations);
    write_node_assignment(&out.join("node_stations.csv"), &network, &assignment)?;

    // ── Distance matrices ─────────────────────────────────────────────────
    let router = DijkstraRouter;
    let cache = MatrixCache::new(out);
    let mut matrices: Vec<DistanceMatrix> = Vec::with_capacity(config.distance_kinds.len());
    for &kind in &config.distance_kinds {
        let (matrix, status) = cache
            .load_or_build(kind, &stations, config.invalidate_cache, || {
                build_matrix(kind, &stations, &nodes, &network, &router)
            })
            .with_context(|| format!("{kind} distance matrix"))?;
        info!(kind = %kind, ?status, missing = matrix.missing_pairs().len(), "distance matrix ready");
        matrices.push(matrix);
    }

    // ── Route catalog ─────────────────────────────────────────────────────
    if config.build_routes {
        let fingerprint = route_fingerprint(&nodes, &network);
        let (catalog, status) = load_or_build_routes(
            &out.join(ROUTES_FILE_NAME),
            fingerprint,
            config.invalidate_cache,
            || build_route_catalog(&stations, &nodes, &network, &router),
        )
        .context("route catalog")?;
        info!(?status, routes = catalog.len(), "route catalog ready");
    }

    // ── Trips ─────────────────────────────────────────────────────────────
    if let Some(trips_csv) = &config.trips_csv {
        // Trip distances prefer the street matrix.
        let fallback;
        let distances = match matrices
            .iter()
            .find(|m| m.kind() == DistanceKind::Street)
            .or_else(|| matrices.first())
        {
            Some(m) => m,
            None => {
                fallback = build_straight(&stations);
                &fallback
            }
        };
        write_trip_artifacts(out, trips_csv, &stations, distances)?;
    }
    Ok(())
}

fn load_network(source: &NetworkSource) -> Result<RoadNetwork> {
    match source {
        NetworkSource::Csv { nodes, edges } => eb_spatial::load_network_csv(nodes, edges)
            .with_context(|| format!("loading road network from {} and {}", nodes.display(), edges.display())),
        NetworkSource::Pbf { path } => load_pbf(path),
    }
}

#[cfg(feature = "osm")]
fn load_pbf(path: &Path) -> Result<RoadNetwork> {
    eb_spatial::osm::load_from_pbf(path).with_context(|| format!("loading road network from {}", path.display()))
}

#[cfg(not(feature = "osm"))]
fn load_pbf(path: &Path) -> Result<RoadNetwork> {
    anyhow::bail!("{} is an OSM extract; rebuild with `--features osm` to read it", path.display())
}

fn write_trip_artifacts(
    out: &Path,
    trips_csv: &Path,
    stations: &StationTable,
    distances: &DistanceMatrix,
) -> Result<()> {
    let (log, stats) = load_trips_csv(trips_csv, stations.len())
        .with_context(|| format!("loading trips from {}", trips_csv.display()))?;
    if log.is_empty() {
        info!(rows = stats.rows, "trip log has no usable trips");
        return Ok(());
    }

    let conn_dir = out.join("connections");
    for id in stations.ids() {
        let c = connections(id, &log, stations)?;
        write_connections(&conn_dir.join(format!("connections_{id}.csv")), &c)?;
    }

    let day_dir = out.join("days");
    let days = log.days();
    for &day in &days {
        let activity = DailyActivity::for_day(&log, day, stations.len());
        write_daily_activity(&day_dir.join(format!("activity_{day}.csv")), &activity)?;

        let female = age_histogram(&log, day, Sex::Female);
        let male = age_histogram(&log, day, Sex::Male);
        let motion = MotionHistograms::for_day(&log, day, distances);
        let stats = DayStats {
            sex_counts:  sex_counts(&log, day),
            female_ages: female.as_ref(),
            male_ages:   male.as_ref(),
            motion:      &motion,
        };
        write_day_stats(&day_dir.join(format!("day_stats_{day}.json")), &stats)?;
    }
    info!(stations = stations.len(), days = days.len(), "trip artifacts written");
    Ok(())
}
