//! Station table and locator errors.

use thiserror::Error;

use eb_core::{GeoPoint, StationId};

/// Errors raised while loading or validating a station table.
#[derive(Debug, Error)]
pub enum StationError {
    #[error("station table is empty")]
    Empty,

    #[error("station id 0 is not allowed; ids start at 1")]
    ZeroId,

    #[error("duplicate station id {0}")]
    Duplicate(StationId),

    #[error("station ids must be contiguous: expected {expected}, found {found}")]
    Gap { expected: StationId, found: StationId },

    #[error("station {station} has invalid coordinate {pos}")]
    InvalidCoordinate { station: StationId, pos: GeoPoint },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StationResult<T> = Result<T, StationError>;

/// Errors raised by the station locator.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("road network has no nodes to snap stations to")]
    EmptyNetwork,

    #[error(
        "station {station} is {distance_m:.0} m from the nearest road node \
         (limit {max_distance_m:.0} m)"
    )]
    OutOfRegion {
        station: StationId,
        distance_m: f64,
        max_distance_m: f64,
    },
}

pub type LocateResult<T> = Result<T, LocateError>;
