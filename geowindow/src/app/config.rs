//! Application configuration for [`GeowindowApp`](super::GeowindowApp).
//!
//! `AppConfig` says which services to run. Each part is optional, so the
//! same composition root serves a directory-only process, a query-only
//! process, or both with self-advertisement.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ConfigFile, ServiceKind};
use crate::directory::DirectoryServiceConfig;
use crate::trail::DEFAULT_MAX_POINTS;
use crate::view::DEFAULT_POLL_INTERVAL;

use super::error::AppError;

/// Settings for the query service.
#[derive(Clone, Debug)]
pub struct QueryAppConfig {
    pub service: ServiceKind,
    /// Feature or satellite catalog. Unused by the trail service.
    pub catalog: Option<PathBuf>,
    pub poll_interval: Duration,
    pub trail_max_points: usize,
}

impl QueryAppConfig {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            catalog: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            trail_max_points: DEFAULT_MAX_POINTS,
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<PathBuf>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_trail_max_points(mut self, max_points: usize) -> Self {
        self.trail_max_points = max_points;
        self
    }

    /// Reads `[query]` and `[trail]`.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            service: config.query.service,
            catalog: config.query.catalog.clone(),
            poll_interval: config.poll_interval()?,
            trail_max_points: config.trail.max_points,
        })
    }
}

/// Settings for periodic self-advertisement.
#[derive(Clone, Debug)]
pub struct AdvertiseAppConfig {
    pub address: String,
    pub description: String,
    pub interval: Duration,
    pub ttl: Duration,
}

impl AdvertiseAppConfig {
    /// Reads `[advertise]`. `None` when no address is configured.
    pub fn from_config_file(config: &ConfigFile) -> Result<Option<Self>, AppError> {
        let Some(address) = config.advertise.address.clone() else {
            return Ok(None);
        };
        Ok(Some(Self {
            address,
            description: config.advertise.description.clone(),
            interval: config.advertise_interval()?,
            ttl: config.advertise_ttl()?,
        }))
    }
}

/// Which services the application runs.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub directory: Option<DirectoryServiceConfig>,
    pub query: Option<QueryAppConfig>,
    pub advertise: Option<AdvertiseAppConfig>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: DirectoryServiceConfig) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_query(mut self, query: QueryAppConfig) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_advertise(mut self, advertise: AdvertiseAppConfig) -> Self {
        self.advertise = Some(advertise);
        self
    }

    /// Directory service settings from `[directory]`.
    ///
    /// Fails when `advertise_interval_ms` is missing or not positive.
    pub fn directory_from(config: &ConfigFile) -> Result<DirectoryServiceConfig, AppError> {
        Ok(DirectoryServiceConfig::new(config.directory_apply_interval()?))
    }

    /// Checks that the parts fit together.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.advertise.is_some() && self.directory.is_none() {
            return Err(AppError::Config(
                "self-advertisement needs a directory service; set directory.advertise_interval_ms"
                    .to_string(),
            ));
        }
        if self.advertise.is_some() && self.query.is_none() {
            return Err(AppError::Config(
                "self-advertisement needs a query service to advertise".to_string(),
            ));
        }
        if let Some(query) = &self.query {
            if query.service.needs_catalog() && query.catalog.is_none() {
                return Err(AppError::Config(format!(
                    "the {} service needs query.catalog",
                    query.service
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_from_requires_interval() {
        let config = ConfigFile::default();
        assert!(matches!(
            AppConfig::directory_from(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_advertise_absent_without_address() {
        let config = ConfigFile::default();
        assert!(AdvertiseAppConfig::from_config_file(&config)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_validate_catalog_required() {
        let config = AppConfig::new().with_query(QueryAppConfig::new(ServiceKind::City));
        assert!(config.validate().is_err());

        let config = AppConfig::new().with_query(QueryAppConfig::new(ServiceKind::Trail));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_advertise_needs_directory() {
        let advertise = AdvertiseAppConfig {
            address: "127.0.0.1:4100".to_string(),
            description: "Trail".to_string(),
            interval: Duration::from_secs(1),
            ttl: Duration::from_secs(3),
        };
        let config = AppConfig::new()
            .with_query(QueryAppConfig::new(ServiceKind::Trail))
            .with_advertise(advertise.clone());
        assert!(config.validate().is_err());

        let config = config.with_directory(DirectoryServiceConfig::new(Duration::from_millis(100)));
        assert!(config.validate().is_ok());
    }
}
