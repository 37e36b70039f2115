//! Error types for eb-output.

use thiserror::Error;

use eb_matrix::{MatrixError, RouteError};

/// Errors that can occur when reading or writing artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("matrix payload error: {0}")]
    Bitcode(#[from] bitcode::Error),

    /// The file exists but is not a readable artifact of this format.
    #[error("corrupt artifact: {0}")]
    Corrupt(String),

    /// Tables passed together were not built from the same inputs.
    #[error("inconsistent inputs: {0}")]
    Inconsistent(String),

    #[error("matrix build failed: {0}")]
    Build(#[from] MatrixError),

    #[error("route catalog build failed: {0}")]
    Routes(#[from] RouteError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
