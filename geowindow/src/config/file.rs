//! Typed INI configuration file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::debug;

use super::error::ConfigError;
use super::{config_directory, config_file_path};

// =============================================================================
// Defaults
// =============================================================================

/// Default self-advertisement period.
pub const DEFAULT_ADVERTISE_INTERVAL_MS: i64 = 30_000;

/// Default self-advertisement TTL.
pub const DEFAULT_ADVERTISE_TTL_MS: i64 = 90_000;

/// Default self-advertisement description.
pub const DEFAULT_ADVERTISE_DESCRIPTION: &str = "geowindow query service";

/// Default session poll period.
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 1_000;

/// Default trail bound.
pub const DEFAULT_TRAIL_MAX_POINTS: usize = 1_000;

/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Section names.
pub(crate) const SECTION_DIRECTORY: &str = "directory";
pub(crate) const SECTION_ADVERTISE: &str = "advertise";
pub(crate) const SECTION_QUERY: &str = "query";
pub(crate) const SECTION_TRAIL: &str = "trail";
pub(crate) const SECTION_LOGGING: &str = "logging";

// =============================================================================
// Service kind
// =============================================================================

/// Which queryable a query service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceKind {
    #[default]
    City,
    Raster,
    Model,
    Trail,
    Satellite,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::City,
        ServiceKind::Raster,
        ServiceKind::Model,
        ServiceKind::Trail,
        ServiceKind::Satellite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::City => "city",
            ServiceKind::Raster => "raster",
            ServiceKind::Model => "model",
            ServiceKind::Trail => "trail",
            ServiceKind::Satellite => "satellite",
        }
    }

    /// True for services that need a catalog file.
    pub fn needs_catalog(&self) -> bool {
        !matches!(self, ServiceKind::Trail)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| ConfigError::Invalid {
                key: "query.service".to_string(),
                value: s.to_string(),
                reason: "expected one of city, raster, model, trail, satellite".to_string(),
            })
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[directory]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySettings {
    /// Apply period. No default.
    pub advertise_interval_ms: Option<i64>,
}

/// `[advertise]`
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertiseSettings {
    pub interval_ms: i64,
    pub ttl_ms: i64,
    /// Address advertised. Self-advertisement is off when unset.
    pub address: Option<String>,
    pub description: String,
}

impl Default for AdvertiseSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_ADVERTISE_INTERVAL_MS,
            ttl_ms: DEFAULT_ADVERTISE_TTL_MS,
            address: None,
            description: DEFAULT_ADVERTISE_DESCRIPTION.to_string(),
        }
    }
}

/// `[query]`
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    pub service: ServiceKind,
    pub catalog: Option<PathBuf>,
    pub poll_interval_ms: i64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            service: ServiceKind::default(),
            catalog: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// `[trail]`
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSettings {
    pub max_points: usize,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_TRAIL_MAX_POINTS,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join("logs"),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

// =============================================================================
// Config file
// =============================================================================

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub directory: DirectorySettings,
    pub advertise: AdvertiseSettings,
    pub query: QuerySettings,
    pub trail: TrailSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads `~/.geowindow/config.ini`, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the given file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: parse.to_string(),
            },
        })?;
        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parses INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(props) = ini.section(Some(SECTION_DIRECTORY)) {
            config.directory.advertise_interval_ms =
                parse_value(props, SECTION_DIRECTORY, "advertise_interval_ms")?;
        }

        if let Some(props) = ini.section(Some(SECTION_ADVERTISE)) {
            if let Some(v) = parse_value(props, SECTION_ADVERTISE, "interval_ms")? {
                config.advertise.interval_ms = v;
            }
            if let Some(v) = parse_value(props, SECTION_ADVERTISE, "ttl_ms")? {
                config.advertise.ttl_ms = v;
            }
            config.advertise.address = non_empty(props.get("address"));
            if let Some(v) = non_empty(props.get("description")) {
                config.advertise.description = v;
            }
        }

        if let Some(props) = ini.section(Some(SECTION_QUERY)) {
            if let Some(v) = non_empty(props.get("service")) {
                config.query.service = v.parse()?;
            }
            config.query.catalog = non_empty(props.get("catalog")).map(|p| expand_tilde(&p));
            if let Some(v) = parse_value(props, SECTION_QUERY, "poll_interval_ms")? {
                config.query.poll_interval_ms = v;
            }
        }

        if let Some(props) = ini.section(Some(SECTION_TRAIL)) {
            if let Some(v) = parse_value(props, SECTION_TRAIL, "max_points")? {
                config.trail.max_points = v;
            }
        }

        if let Some(props) = ini.section(Some(SECTION_LOGGING)) {
            if let Some(v) = non_empty(props.get("directory")) {
                config.logging.directory = expand_tilde(&v);
            }
            if let Some(v) = non_empty(props.get("level")) {
                config.logging.level = v;
            }
        }

        Ok(config)
    }

    /// Writes to `~/.geowindow/config.ini`, creating the directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let mut set = |section: &str, key: &str, value: String| {
            ini.set_to(Some(section), key.to_string(), value);
        };

        if let Some(v) = self.directory.advertise_interval_ms {
            set(SECTION_DIRECTORY, "advertise_interval_ms", v.to_string());
        }

        set(SECTION_ADVERTISE, "interval_ms", self.advertise.interval_ms.to_string());
        set(SECTION_ADVERTISE, "ttl_ms", self.advertise.ttl_ms.to_string());
        if let Some(address) = &self.advertise.address {
            set(SECTION_ADVERTISE, "address", address.clone());
        }
        set(SECTION_ADVERTISE, "description", self.advertise.description.clone());

        set(SECTION_QUERY, "service", self.query.service.to_string());
        if let Some(catalog) = &self.query.catalog {
            set(SECTION_QUERY, "catalog", catalog.to_string_lossy().into_owned());
        }
        set(SECTION_QUERY, "poll_interval_ms", self.query.poll_interval_ms.to_string());

        set(SECTION_TRAIL, "max_points", self.trail.max_points.to_string());

        set(
            SECTION_LOGGING,
            "directory",
            self.logging.directory.to_string_lossy().into_owned(),
        );
        set(SECTION_LOGGING, "level", self.logging.level.clone());

        ini
    }

    /// Checks every setting that has a default.
    ///
    /// `directory.advertise_interval_ms` is checked separately by
    /// [`ConfigFile::directory_apply_interval`] since only the directory
    /// service needs it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_ms("advertise.interval_ms", self.advertise.interval_ms)?;
        positive_ms("advertise.ttl_ms", self.advertise.ttl_ms)?;
        positive_ms("query.poll_interval_ms", self.query.poll_interval_ms)?;
        if self.trail.max_points == 0 {
            return Err(ConfigError::NonPositive {
                key: "trail.max_points".to_string(),
                value: 0,
            });
        }
        Ok(())
    }

    /// The directory apply period. Required and positive.
    pub fn directory_apply_interval(&self) -> Result<Duration, ConfigError> {
        let ms = self
            .directory
            .advertise_interval_ms
            .ok_or(ConfigError::Missing {
                section: SECTION_DIRECTORY,
                key: "advertise_interval_ms",
            })?;
        positive_ms("directory.advertise_interval_ms", ms)
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        positive_ms("query.poll_interval_ms", self.query.poll_interval_ms)
    }

    pub fn advertise_interval(&self) -> Result<Duration, ConfigError> {
        positive_ms("advertise.interval_ms", self.advertise.interval_ms)
    }

    pub fn advertise_ttl(&self) -> Result<Duration, ConfigError> {
        positive_ms("advertise.ttl_ms", self.advertise.ttl_ms)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_value<T>(props: &Properties, section: &str, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(props.get(key)) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            key: format!("{}.{}", section, key),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn positive_ms(key: &str, ms: i64) -> Result<Duration, ConfigError> {
    if ms <= 0 {
        return Err(ConfigError::NonPositive {
            key: key.to_string(),
            value: ms,
        });
    }
    Ok(Duration::from_millis(ms as u64))
}

/// Expands a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
