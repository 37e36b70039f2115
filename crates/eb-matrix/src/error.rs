//! Matrix and route builder errors.

use thiserror::Error;

use eb_core::StationId;
use eb_spatial::SpatialError;

/// Errors that abort a matrix build.
///
/// Unreachable pairs are not errors: they become `NaN` cells.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("{stations} stations but {nodes} located nodes; run the station locator on this table first")]
    NodeCountMismatch { stations: usize, nodes: usize },

    #[error("a {n}×{n} matrix needs {expected} values, got {got}")]
    ShapeMismatch { n: usize, expected: usize, got: usize },

    #[error("routing error: {0}")]
    Spatial(#[from] SpatialError),
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// Outcome of a failed route lookup.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The destination node cannot be reached from the origin node.
    #[error("no street route from station {origin} to station {destination}")]
    NoRoute { origin: StationId, destination: StationId },

    /// Unknown station, or a station assigned to a node outside the network.
    #[error("invalid route request: {0}")]
    InvalidInput(String),

    /// The router failed for a reason unrelated to the request.
    #[error("router failure: {0}")]
    Internal(String),
}

pub type RouteResult<T> = Result<T, RouteError>;
