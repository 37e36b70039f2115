//! Command-line flags and their merge into [`PrecomputeConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use eb_core::{DistanceKind, NetworkSource, PrecomputeConfig, SnapPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "precompute",
    version,
    about = "Precompute station distances, shortest routes and trip statistics for the ecobici dashboard",
    long_about = "Locates every station on the road network, then writes the straight and street \
                  distance matrices, the shortest-route catalog, node/station tables and, given a \
                  trip log, per-station connections and per-day statistics.\n\n\
                  Distance matrices and the route catalog are cached in the output directory and \
                  reused while the stations and their road nodes are unchanged; pass --invalidate \
                  to rebuild them."
)]
pub struct Args {
    /// JSON file with a full run configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Station CSV (id,name,lat,lon)
    #[arg(long)]
    pub stations: Option<PathBuf>,

    /// Raw monthly trip CSV
    #[arg(long)]
    pub trips: Option<PathBuf>,

    /// Road network nodes CSV (node_id,lat,lon)
    #[arg(long, requires = "edges", conflicts_with = "pbf")]
    pub nodes: Option<PathBuf>,

    /// Road network edges CSV (from,to,length_m,oneway)
    #[arg(long, requires = "nodes")]
    pub edges: Option<PathBuf>,

    /// OpenStreetMap PBF extract (needs the `osm` feature)
    #[arg(long)]
    pub pbf: Option<PathBuf>,

    /// Directory receiving every artifact
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Distance matrix to build; repeat for several (straight, street)
    #[arg(long = "kind")]
    pub kinds: Vec<DistanceKind>,

    /// Ignore cached artifacts and recompute them
    #[arg(long)]
    pub invalidate: bool,

    /// Skip the shortest-route catalog
    #[arg(long)]
    pub no_routes: bool,

    /// Fail when a station is further than this from every road node (metres)
    #[arg(long, conflicts_with = "snap_warn_m")]
    pub snap_reject_m: Option<f64>,

    /// Log stations further than this from their road node (metres)
    #[arg(long)]
    pub snap_warn_m: Option<f64>,

    /// Verbose output (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Starting configuration (file or defaults) with every given flag
    /// applied on top.
    pub fn into_config(self) -> Result<PrecomputeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => PrecomputeConfig::default(),
        };

        if let Some(p) = self.stations {
            config.stations_csv = p;
        }
        if self.trips.is_some() {
            config.trips_csv = self.trips;
        }
        if let (Some(nodes), Some(edges)) = (self.nodes, self.edges) {
            config.network = NetworkSource::Csv { nodes, edges };
        }
        if let Some(path) = self.pbf {
            config.network = NetworkSource::Pbf { path };
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if !self.kinds.is_empty() {
            config.distance_kinds = self.kinds;
        }
        config.invalidate_cache |= self.invalidate;
        if self.no_routes {
            config.build_routes = false;
        }
        if let Some(max_distance_m) = self.snap_reject_m {
            config.snap_policy = SnapPolicy::Reject { max_distance_m };
        }
        if let Some(warn_beyond_m) = self.snap_warn_m {
            config.snap_policy = SnapPolicy::Snap { warn_beyond_m };
        }

        config.validate()?;
        Ok(config)
    }
}
