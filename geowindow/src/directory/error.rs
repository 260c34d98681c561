//! Directory error types.

use thiserror::Error;

/// Errors raised by the directory service and its clients.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The entry map and the expiration index disagree. Unrecoverable.
    #[error("Directory invariant violated: {0}")]
    InvariantViolation(String),

    /// The directory service is no longer running.
    #[error("Directory service channel closed")]
    ChannelClosed,

    /// A self-advertisement was configured with unusable timing.
    #[error("Invalid self-advertisement: {0}")]
    InvalidAdvertisement(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
