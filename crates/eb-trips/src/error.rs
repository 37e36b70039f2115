//! Trip ingestion and aggregation errors.

use thiserror::Error;

use eb_core::StationId;
use eb_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum TripError {
    /// The station is not part of the station table.
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// A trip row could not be interpreted.
    #[error("trip log line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("routing error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TripResult<T> = Result<T, TripError>;
