//! Error types for the cellgrid engine

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned from the engine's mutation and persistence API
///
/// Formula problems never show up here; they become in-cell sentinels.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad cell address, range or out-of-bounds write
    #[error(transparent)]
    Core(#[from] cellgrid_core::Error),

    /// Malformed sheet file
    #[error("Invalid sheet data: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
