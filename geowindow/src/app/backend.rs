//! The queryable behind a query service, chosen at run time.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::clock::Clock;
use crate::config::ServiceKind;
use crate::lookup::{CityLookup, LookupSource, ModelLookup, RasterLookup, SetDiffQueryable};
use crate::orbital::{load_catalog, satellite_objects, CalcDb};
use crate::spatiotemporal::{Queryable, ResultDiff};
use crate::store::StorePool;
use crate::trail::{TrailConfig, TrailQueryable};
use crate::view::{QueryHandle, QueryService, QueryServiceConfig, QuerySession, WindowUpdate};

use super::config::QueryAppConfig;
use super::error::AppError;

/// One of the supported queryables.
#[derive(Clone)]
pub enum QueryBackend {
    City(Arc<SetDiffQueryable<CityLookup>>),
    Raster(Arc<SetDiffQueryable<RasterLookup>>),
    Model(Arc<SetDiffQueryable<ModelLookup>>),
    Trail(Arc<TrailQueryable>),
    Satellite(Arc<CalcDb>),
}

impl QueryBackend {
    /// Builds the queryable named by `config`, opening stores through `pool`.
    pub fn open(config: &QueryAppConfig, pool: &StorePool) -> Result<Self, AppError> {
        let backend = match config.service {
            ServiceKind::City => Self::City(lookup(config, pool, CityLookup::new())?),
            ServiceKind::Raster => Self::Raster(lookup(config, pool, RasterLookup::new())?),
            ServiceKind::Model => Self::Model(lookup(config, pool, ModelLookup::new())?),
            ServiceKind::Trail => Self::Trail(Arc::new(TrailQueryable::with_config(
                TrailConfig::default().with_max_points(config.trail_max_points),
            ))),
            ServiceKind::Satellite => {
                let path = require_catalog(config)?;
                let satellites = load_catalog(path)?;
                Self::Satellite(Arc::new(CalcDb::new(
                    ServiceKind::Satellite.as_str(),
                    satellite_objects(satellites),
                )))
            }
        };
        info!(service = %config.service, "Query backend ready");
        Ok(backend)
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            Self::City(_) => ServiceKind::City,
            Self::Raster(_) => ServiceKind::Raster,
            Self::Model(_) => ServiceKind::Model,
            Self::Trail(_) => ServiceKind::Trail,
            Self::Satellite(_) => ServiceKind::Satellite,
        }
    }

    /// Spawns a query service over this backend.
    pub fn spawn<C: Clock>(
        &self,
        config: QueryServiceConfig,
        clock: C,
        shutdown: CancellationToken,
    ) -> (QueryHandle, JoinHandle<()>) {
        match self {
            Self::City(q) => spawn_service(Arc::clone(q), config, clock, shutdown),
            Self::Raster(q) => spawn_service(Arc::clone(q), config, clock, shutdown),
            Self::Model(q) => spawn_service(Arc::clone(q), config, clock, shutdown),
            Self::Trail(q) => spawn_service(Arc::clone(q), config, clock, shutdown),
            Self::Satellite(q) => spawn_service(Arc::clone(q), config, clock, shutdown),
        }
    }

    /// Runs a single query from a fresh session.
    ///
    /// The result is what a new client would receive first: everything in
    /// the window reported as added.
    pub fn query_once(&self, update: &WindowUpdate, now: DateTime<Utc>) -> Result<ResultDiff, AppError> {
        match self {
            Self::City(q) => run_once(q.as_ref(), update, now),
            Self::Raster(q) => run_once(q.as_ref(), update, now),
            Self::Model(q) => run_once(q.as_ref(), update, now),
            Self::Trail(q) => run_once(q.as_ref(), update, now),
            Self::Satellite(q) => run_once(q.as_ref(), update, now),
        }
    }

    /// Replaces the satellite catalog. Returns the new object count.
    pub fn reload_catalog(&self, path: &Path) -> Result<usize, AppError> {
        match self {
            Self::Satellite(db) => {
                let satellites = load_catalog(path)?;
                db.reload(satellite_objects(satellites));
                Ok(db.len())
            }
            other => Err(AppError::Config(format!(
                "catalog reload is not supported by the {} service",
                other.kind()
            ))),
        }
    }
}

impl std::fmt::Debug for QueryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("QueryBackend").field(&self.kind()).finish()
    }
}

fn require_catalog(config: &QueryAppConfig) -> Result<&Path, AppError> {
    config.catalog.as_deref().ok_or_else(|| {
        AppError::Config(format!("the {} service needs query.catalog", config.service))
    })
}

fn lookup<S: LookupSource>(
    config: &QueryAppConfig,
    pool: &StorePool,
    source: S,
) -> Result<Arc<SetDiffQueryable<S>>, AppError> {
    let path = require_catalog(config)?;
    let store = pool.open(&path.to_string_lossy())?;
    Ok(Arc::new(SetDiffQueryable::new(
        config.service.as_str(),
        store,
        source,
    )))
}

fn spawn_service<Q: Queryable + 'static, C: Clock>(
    queryable: Arc<Q>,
    config: QueryServiceConfig,
    clock: C,
    shutdown: CancellationToken,
) -> (QueryHandle, JoinHandle<()>) {
    let (service, handle) = QueryService::new(queryable, config, clock);
    (handle, tokio::spawn(service.run(shutdown)))
}

fn run_once<Q: Queryable>(
    queryable: &Q,
    update: &WindowUpdate,
    now: DateTime<Utc>,
) -> Result<ResultDiff, AppError> {
    let mut session: QuerySession<Q> = QuerySession::new();
    if let Some(position) = update.position {
        session
            .set_position(position)
            .map_err(|e| AppError::Query(e.to_string()))?;
    }
    if let Some(width) = update.width {
        session
            .set_width(width)
            .map_err(|e| AppError::Query(e.to_string()))?;
    }
    if let Some(time) = update.time {
        session.set_time(Some(time));
    }
    if let Some(fields) = update.fields.clone() {
        session.set_fields(fields);
    }
    if !session.is_ready() {
        return Err(AppError::Query(
            "position and width are required".to_string(),
        ));
    }
    Ok(session.refresh(queryable, now).unwrap_or_default())
}
