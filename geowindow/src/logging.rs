//! Logging setup.
//!
//! Installs a `tracing` subscriber writing to the console and to a daily
//! rolling file. `RUST_LOG` overrides the configured level.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LoggingSettings, DEFAULT_LOG_LEVEL};

/// Log file name prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "geowindow.log";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for rolling log files. `None` logs to the console only.
    pub directory: Option<PathBuf>,
    /// Default filter directive, e.g. `info` or `geowindow=debug`.
    pub level: String,
    /// Include ANSI colors on the console.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            level: DEFAULT_LOG_LEVEL.to_string(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self::default()
            .with_directory(settings.directory.clone())
            .with_level(settings.level.clone())
    }
}

/// Keeps the file writer alive. Dropping it flushes buffered lines.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard {
    /// Prefix of the rolling log files, if file logging is on.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already set or the log directory cannot
/// be created.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, std::io::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(config.ansi)
        .with_target(true);

    let (file_layer, guard, log_file) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard), Some(directory.join(LOG_FILE_PREFIX)))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _file: guard,
        log_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            directory: PathBuf::from("/tmp/gw-logs"),
            level: "debug".to_string(),
        };
        let config = LoggingConfig::from(&settings);
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/gw-logs")));
        assert_eq!(config.level, "debug");
    }
}
