//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `EbError` where a
//! configuration or identifier problem crosses crate boundaries.

use thiserror::Error;

use crate::{NodeId, StationId};

/// The top-level error type for `eb-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EbError {
    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `eb-core`.
pub type EbResult<T> = Result<T, EbError>;
