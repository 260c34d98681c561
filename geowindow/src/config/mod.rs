//! Configuration file support.
//!
//! Settings live in `~/.geowindow/config.ini`:
//!
//! ```text
//! [directory]
//! advertise_interval_ms = 100
//!
//! [advertise]
//! interval_ms = 30000
//! ttl_ms = 90000
//! address = 127.0.0.1:4100
//! description = City names
//!
//! [query]
//! service = city
//! catalog = ~/.geowindow/cities.json
//! poll_interval_ms = 1000
//!
//! [trail]
//! max_points = 1000
//!
//! [logging]
//! directory = ~/.geowindow/logs
//! level = info
//! ```
//!
//! A missing file yields defaults. `directory.advertise_interval_ms` has no
//! default and must be set before a directory service can start.

mod error;
mod file;
mod keys;

use std::path::PathBuf;

pub use error::ConfigError;
pub use file::{
    AdvertiseSettings, ConfigFile, DirectorySettings, LoggingSettings, QuerySettings,
    ServiceKind, TrailSettings, DEFAULT_ADVERTISE_DESCRIPTION, DEFAULT_ADVERTISE_INTERVAL_MS,
    DEFAULT_ADVERTISE_TTL_MS, DEFAULT_LOG_LEVEL, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TRAIL_MAX_POINTS,
};
pub use keys::ConfigKey;

/// Name of the per-user configuration directory.
pub const CONFIG_DIR_NAME: &str = ".geowindow";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// `~/.geowindow`, or `./.geowindow` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.geowindow/config.ini`
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
