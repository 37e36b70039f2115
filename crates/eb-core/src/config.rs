//! Run configuration for one precompute pass.
//!
//! A `PrecomputeConfig` replaces the module-level globals the dashboard used
//! to load at import time: every path and policy a run needs is listed here
//! and passed explicitly to the stages that need it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{EbError, EbResult};

// ── DistanceKind ──────────────────────────────────────────────────────────────

/// Metric used to fill a station distance matrix.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceKind {
    /// Great-circle distance between station coordinates.
    Straight,
    /// Shortest-path length over the road network.
    Street,
}

impl DistanceKind {
    pub const ALL: [DistanceKind; 2] = [DistanceKind::Straight, DistanceKind::Street];

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceKind::Straight => "straight",
            DistanceKind::Street   => "street",
        }
    }

    /// Stable one-byte tag used in persisted matrix headers.
    pub fn tag(self) -> u8 {
        match self {
            DistanceKind::Straight => 0,
            DistanceKind::Street   => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(DistanceKind::Straight),
            1 => Some(DistanceKind::Street),
            _ => None,
        }
    }
}

impl fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceKind {
    type Err = EbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "straight" => Ok(DistanceKind::Straight),
            "street"   => Ok(DistanceKind::Street),
            other => Err(EbError::Parse(format!(
                "invalid distance kind {other:?}: expected \"straight\" or \"street\""
            ))),
        }
    }
}

// ── SnapPolicy ────────────────────────────────────────────────────────────────

/// What the station locator does when a station lies far from every road
/// node.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SnapPolicy {
    /// Always snap to the nearest node, however far away it is.  Snaps
    /// beyond `warn_beyond_m` are logged.
    Snap { warn_beyond_m: f64 },
    /// Fail the run when the nearest node is further than `max_distance_m`.
    Reject { max_distance_m: f64 },
}

impl Default for SnapPolicy {
    fn default() -> Self {
        SnapPolicy::Snap { warn_beyond_m: 250.0 }
    }
}

// ── NetworkSource ─────────────────────────────────────────────────────────────

/// Where the road network is read from.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NetworkSource {
    /// `nodes.csv` + `edges.csv` pair.
    Csv { nodes: PathBuf, edges: PathBuf },
    /// OpenStreetMap PBF extract (needs the `osm` feature of `eb-spatial`).
    Pbf { path: PathBuf },
}

// ── PrecomputeConfig ──────────────────────────────────────────────────────────

/// Inputs, outputs, and policies for one precompute run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrecomputeConfig {
    pub stations_csv: PathBuf,
    /// Monthly trip log.  Connection summaries are skipped when absent.
    pub trips_csv: Option<PathBuf>,
    pub network: NetworkSource,
    pub output_dir: PathBuf,
    /// Matrices to build, in order.
    pub distance_kinds: Vec<DistanceKind>,
    /// Ignore on-disk artifacts and recompute everything.
    pub invalidate_cache: bool,
    pub snap_policy: SnapPolicy,
    /// Build the `"<o> to <d>"` route catalog for every ordered pair.
    pub build_routes: bool,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            stations_csv:     PathBuf::from("data/ecobici_stations.csv"),
            trips_csv:        None,
            network:          NetworkSource::Csv {
                nodes: PathBuf::from("data/nodes.csv"),
                edges: PathBuf::from("data/edges.csv"),
            },
            output_dir:       PathBuf::from("data"),
            distance_kinds:   DistanceKind::ALL.to_vec(),
            invalidate_cache: false,
            snap_policy:      SnapPolicy::default(),
            build_routes:     true,
        }
    }
}

impl PrecomputeConfig {
    /// Check the configuration for internally inconsistent values.
    pub fn validate(&self) -> EbResult<()> {
        match self.snap_policy {
            SnapPolicy::Snap { warn_beyond_m } if !(warn_beyond_m >= 0.0) => {
                return Err(EbError::Config(format!(
                    "snap warning threshold must be non-negative, got {warn_beyond_m}"
                )));
            }
            SnapPolicy::Reject { max_distance_m } if !(max_distance_m > 0.0) => {
                return Err(EbError::Config(format!(
                    "snap rejection distance must be positive, got {max_distance_m}"
                )));
            }
            _ => {}
        }
        if self.distance_kinds.is_empty() && !self.build_routes && self.trips_csv.is_none() {
            return Err(EbError::Config("nothing to compute".into()));
        }
        Ok(())
    }
}
