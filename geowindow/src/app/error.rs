//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::orbital::CatalogError;
use crate::store::StoreError;

/// Errors that can occur while starting or running the application.
#[derive(Debug)]
pub enum AppError {
    /// Configuration is missing or invalid.
    Config(String),

    /// The feature store behind a lookup service could not be opened.
    Store(StoreError),

    /// The satellite catalog could not be loaded.
    Catalog(CatalogError),

    /// The self-advertisement could not be set up.
    Directory(DirectoryError),

    /// A one-shot query could not be run.
    Query(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Store(e) => write!(f, "Failed to open feature store: {}", e),
            AppError::Catalog(e) => write!(f, "Failed to load satellite catalog: {}", e),
            AppError::Directory(e) => write!(f, "Directory error: {}", e),
            AppError::Query(msg) => write!(f, "Query failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Catalog(e) => Some(e),
            AppError::Directory(e) => Some(e),
            AppError::Config(_) | AppError::Query(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        AppError::Directory(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("missing catalog".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing catalog"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let err: AppError = ConfigError::Missing {
            section: "directory",
            key: "advertise_interval_ms",
        }
        .into();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("advertise_interval_ms")));
    }

    #[test]
    fn test_app_error_source() {
        use std::error::Error;
        let err: AppError = StoreError::UnknownLayer("city".to_string()).into();
        assert!(err.source().is_some());
    }
}
