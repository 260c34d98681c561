//! Shared start-up for long-running commands.
//!
//! Loads the config file, installs logging, builds the Tokio runtime and
//! turns Ctrl-C into a cancellation.

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use geowindow::config::ConfigFile;
use geowindow::logging::{init_logging, LoggingConfig, LoggingGuard};

use crate::error::CliError;

/// Runtime context for a command.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    shutdown: CancellationToken,
    _logging: LoggingGuard,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        config.validate()?;

        let logging = init_logging(&LoggingConfig::from(&config.logging))
            .map_err(|e| CliError::Runtime(format!("failed to initialise logging: {}", e)))?;

        let runtime = Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received");
            token.cancel();
        })
        .map_err(|e| CliError::Runtime(format!("failed to install Ctrl-C handler: {}", e)))?;

        Ok(Self {
            config,
            runtime,
            shutdown,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Cancelled on Ctrl-C.
    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            config = %geowindow::config::config_file_path().display(),
            "geowindow starting"
        );
    }
}
