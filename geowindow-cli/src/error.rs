//! CLI error type.

use std::fmt;

use geowindow::app::AppError;
use geowindow::config::ConfigError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration is missing or invalid.
    Config(String),

    /// A service failed to start.
    Startup(AppError),

    /// The Tokio runtime or signal handler could not be set up.
    Runtime(String),

    /// Output could not be written.
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Startup(_) | CliError::Runtime(_) | CliError::Output(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Startup(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Startup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Config(msg) => CliError::Config(msg),
            other => CliError::Startup(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_two() {
        let err: CliError = ConfigError::UnknownKey("x.y".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("x.y"));
    }

    #[test]
    fn test_app_config_error_maps_to_config() {
        let err: CliError = AppError::Config("no catalog".to_string()).into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
