//! `eb-stations`: station table and station ⇄ road-node location.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`station`] | `Station`, `StationTable` (dense ids `1..=N`)             |
//! | [`loader`]  | `load_stations_csv`                                       |
//! | [`locator`] | `locate_stations`, `StationNodes`, `assign_nodes_to_stations` |
//! | [`error`]   | `StationError`, `LocateError`                             |

pub mod error;
pub mod loader;
pub mod locator;
pub mod station;


pub use error::{LocateError, LocateResult, StationError, StationResult};
pub use loader::{load_stations_csv, load_stations_reader};
pub use locator::{assign_nodes_to_stations, locate_stations, StationNodes};
pub use station::{Station, StationTable};
