//! Addressable configuration keys for `config get` / `config set`.

use std::path::PathBuf;
use std::str::FromStr;

use super::error::ConfigError;
use super::file::{expand_tilde, positive_ms, ConfigFile};

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DirectoryAdvertiseIntervalMs,
    AdvertiseIntervalMs,
    AdvertiseTtlMs,
    AdvertiseAddress,
    AdvertiseDescription,
    QueryService,
    QueryCatalog,
    QueryPollIntervalMs,
    TrailMaxPoints,
    LoggingDirectory,
    LoggingLevel,
}

const ALL_KEYS: [ConfigKey; 11] = [
    ConfigKey::DirectoryAdvertiseIntervalMs,
    ConfigKey::AdvertiseIntervalMs,
    ConfigKey::AdvertiseTtlMs,
    ConfigKey::AdvertiseAddress,
    ConfigKey::AdvertiseDescription,
    ConfigKey::QueryService,
    ConfigKey::QueryCatalog,
    ConfigKey::QueryPollIntervalMs,
    ConfigKey::TrailMaxPoints,
    ConfigKey::LoggingDirectory,
    ConfigKey::LoggingLevel,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::DirectoryAdvertiseIntervalMs => "directory",
            ConfigKey::AdvertiseIntervalMs
            | ConfigKey::AdvertiseTtlMs
            | ConfigKey::AdvertiseAddress
            | ConfigKey::AdvertiseDescription => "advertise",
            ConfigKey::QueryService | ConfigKey::QueryCatalog | ConfigKey::QueryPollIntervalMs => {
                "query"
            }
            ConfigKey::TrailMaxPoints => "trail",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::DirectoryAdvertiseIntervalMs => "advertise_interval_ms",
            ConfigKey::AdvertiseIntervalMs => "interval_ms",
            ConfigKey::AdvertiseTtlMs => "ttl_ms",
            ConfigKey::AdvertiseAddress => "address",
            ConfigKey::AdvertiseDescription => "description",
            ConfigKey::QueryService => "service",
            ConfigKey::QueryCatalog => "catalog",
            ConfigKey::QueryPollIntervalMs => "poll_interval_ms",
            ConfigKey::TrailMaxPoints => "max_points",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// `section.key`
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::DirectoryAdvertiseIntervalMs => config
                .directory
                .advertise_interval_ms
                .map(|v| v.to_string())
                .unwrap_or_default(),
            ConfigKey::AdvertiseIntervalMs => config.advertise.interval_ms.to_string(),
            ConfigKey::AdvertiseTtlMs => config.advertise.ttl_ms.to_string(),
            ConfigKey::AdvertiseAddress => config.advertise.address.clone().unwrap_or_default(),
            ConfigKey::AdvertiseDescription => config.advertise.description.clone(),
            ConfigKey::QueryService => config.query.service.to_string(),
            ConfigKey::QueryCatalog => config
                .query
                .catalog
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::QueryPollIntervalMs => config.query.poll_interval_ms.to_string(),
            ConfigKey::TrailMaxPoints => config.trail.max_points.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Validates and stores `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::DirectoryAdvertiseIntervalMs => {
                config.directory.advertise_interval_ms = Some(self.positive(value)?);
            }
            ConfigKey::AdvertiseIntervalMs => config.advertise.interval_ms = self.positive(value)?,
            ConfigKey::AdvertiseTtlMs => config.advertise.ttl_ms = self.positive(value)?,
            ConfigKey::AdvertiseAddress => {
                config.advertise.address = (!value.is_empty()).then(|| value.to_string());
            }
            ConfigKey::AdvertiseDescription => config.advertise.description = value.to_string(),
            ConfigKey::QueryService => config.query.service = value.parse()?,
            ConfigKey::QueryCatalog => {
                config.query.catalog = (!value.is_empty()).then(|| expand_tilde(value));
            }
            ConfigKey::QueryPollIntervalMs => {
                config.query.poll_interval_ms = self.positive(value)?;
            }
            ConfigKey::TrailMaxPoints => {
                config.trail.max_points = self.positive(value)? as usize;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    PathBuf::from(".")
                } else {
                    expand_tilde(value)
                };
            }
            ConfigKey::LoggingLevel => config.logging.level = value.to_string(),
        }
        Ok(())
    }

    fn positive(&self, value: &str) -> Result<i64, ConfigError> {
        let parsed: i64 = value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            key: self.name(),
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        positive_ms(&self.name(), parsed)?;
        Ok(parsed)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceKind;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert!("query.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::QueryService.set(&mut config, "raster").unwrap();
        assert_eq!(config.query.service, ServiceKind::Raster);
        assert_eq!(ConfigKey::QueryService.get(&config), "raster");

        ConfigKey::DirectoryAdvertiseIntervalMs
            .set(&mut config, "100")
            .unwrap();
        assert_eq!(ConfigKey::DirectoryAdvertiseIntervalMs.get(&config), "100");
    }

    #[test]
    fn test_set_rejects_non_positive() {
        let mut config = ConfigFile::default();
        assert!(matches!(
            ConfigKey::AdvertiseTtlMs.set(&mut config, "0"),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            ConfigKey::TrailMaxPoints.set(&mut config, "lots"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unset_value_is_empty() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::AdvertiseAddress.get(&config), "");
        assert_eq!(ConfigKey::DirectoryAdvertiseIntervalMs.get(&config), "");
    }
}
