//! `eb-spatial`: street network, nearest-node index, and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`            |
//! | [`router`]  | `Router` trait, `Route`, `ShortestPathTree`, `DijkstraRouter` |
//! | [`loader`]  | `load_network_csv` (`nodes.csv` + `edges.csv`)                |
//! | [`osm`]     | `load_from_pbf` (feature = `"osm"` only)                      |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on `eb-core` types.        |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_reader};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Route, Router, ShortestPathTree};
