//! `eb-output`: precomputed artifacts on disk.
//!
//! | Module          | Files                                                   |
//! |-----------------|---------------------------------------------------------|
//! | [`matrix_file`] | `straight_distances.bin`, `street_distances.bin`        |
//! | [`cache`]       | `MatrixCache`, route catalog reuse                      |
//! | [`routes_file`] | `shortest_routes.json` (GeoJSON features by pair key)   |
//! | [`tables`]      | station/node/connection/activity CSV tables             |
//! | [`day_stats`]   | `day_stats_<date>.json`                                 |
//!
//! Every file is written through [`atomic_write`], so a crashed run never
//! leaves a half-written artifact behind.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eb_output::MatrixCache;
//!
//! let cache = MatrixCache::new("./data");
//! let (street, status) = cache.load_or_build(DistanceKind::Street, &stations, false, || {
//!     build_street(&stations, &nodes, &network, &DijkstraRouter)
//! })?;
//! ```

pub mod atomic;
pub mod cache;
pub mod day_stats;
pub mod error;
pub mod matrix_file;
pub mod routes_file;
pub mod tables;

#[cfg(test)]
mod tests;

pub use atomic::atomic_write;
pub use cache::{load_or_build_routes, CacheStatus, MatrixCache};
pub use day_stats::{day_stats_json, write_day_stats, DayStats};
pub use error::{OutputError, OutputResult};
pub use matrix_file::{
    decode_matrix, encode_matrix, load_matrix, matrix_file_name, save_matrix, station_fingerprint,
    MatrixFileHeader,
};
pub use routes_file::{read_route_catalog, route_fingerprint, write_route_catalog, ROUTES_FILE_NAME};
pub use tables::{write_connections, write_daily_activity, write_node_assignment, write_station_nodes};
