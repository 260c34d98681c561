//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store holds no layer with this name.
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// The store cannot answer right now (connection lost and the like).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Reading the catalog failed.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON for the expected schema.
    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
