//! Query service error types.

use thiserror::Error;

/// Errors returned to clients of a query service.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The query service is no longer running.
    #[error("Query service channel closed")]
    ChannelClosed,
}
