//! `eb-trips`: trip logs and everything aggregated from them.
//!
//! # Crate layout
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`record`]       | `TripRecord`, `TripLog`, `Sex`                         |
//! | [`loader`]       | `load_trips_csv` (raw Ecobici monthly export)          |
//! | [`connections`]  | `connections`, `connection_extent`                     |
//! | [`activity`]     | `DailyActivity` (rentals / returns per station)        |
//! | [`demographics`] | `sex_counts`, `age_histogram`, `MotionHistograms`      |
//! | [`error`]        | `TripError`, `TripResult`                              |

pub mod activity;
pub mod connections;
pub mod demographics;
pub mod error;
pub mod loader;
pub mod record;


pub use activity::DailyActivity;
pub use connections::{connection_extent, connections, Connection, Connections};
pub use demographics::{age_histogram, sex_counts, BySex, Histogram, MotionHistograms, SexCounts};
pub use error::{TripError, TripResult};
pub use loader::{load_trips_csv, load_trips_reader, LoadStats};
pub use record::{Sex, TripLog, TripRecord};
