//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use geowindow::app::QueryAppConfig;
use geowindow::config::{ConfigFile, ServiceKind};
use geowindow::spatiotemporal::{field_names, Vector3d};
use geowindow::view::WindowUpdate;

use crate::error::CliError;

/// Query service selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ServiceArg {
    /// City names, thinned by population as the viewer climbs
    City,
    /// Raster map tiles
    Raster,
    /// Terrain model tiles
    Model,
    /// Breadcrumb trail of the viewer's positions
    Trail,
    /// Satellites propagated from orbital elements
    Satellite,
}

impl From<ServiceArg> for ServiceKind {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::City => ServiceKind::City,
            ServiceArg::Raster => ServiceKind::Raster,
            ServiceArg::Model => ServiceKind::Model,
            ServiceArg::Trail => ServiceKind::Trail,
            ServiceArg::Satellite => ServiceKind::Satellite,
        }
    }
}

/// Which service to query and where its data lives.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Query service to run (default: query.service from config)
    #[arg(long)]
    pub service: Option<ServiceArg>,

    /// Feature or satellite catalog (default: query.catalog from config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// The client's window.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Window center latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Window center longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Window center elevation in meters
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub elev: f64,

    /// Window height in degrees of latitude
    #[arg(long)]
    pub width_lat: f64,

    /// Window width in degrees of longitude
    #[arg(long)]
    pub width_lon: f64,

    /// Comma-separated field names to request
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,
}

impl WindowArgs {
    pub fn to_update(&self) -> WindowUpdate {
        WindowUpdate::default()
            .position(Vector3d::new(self.lat, self.lon, self.elev))
            .width(Vector3d::new(self.width_lat, self.width_lon, 0.0))
            .fields(field_names(self.fields.iter().map(|f| f.trim())))
    }
}

/// Resolve query settings from CLI args and config.
///
/// CLI takes precedence, then config.
pub fn resolve_query(
    source: &SourceArgs,
    poll_ms: Option<u64>,
    config: &ConfigFile,
) -> Result<QueryAppConfig, CliError> {
    let mut query = QueryAppConfig::from_config_file(config)?;
    if let Some(service) = source.service {
        query.service = service.into();
    }
    if let Some(catalog) = &source.catalog {
        query.catalog = Some(catalog.clone());
    }
    if let Some(ms) = poll_ms {
        if ms == 0 {
            return Err(CliError::Config("--poll-ms must be positive".to_string()));
        }
        query.poll_interval = Duration::from_millis(ms);
    }
    if query.service.needs_catalog() && query.catalog.is_none() {
        return Err(CliError::Config(format!(
            "the {} service needs a catalog. Use --catalog or set query.catalog in config.ini.",
            query.service
        )));
    }
    Ok(query)
}
