//! Application bootstrap implementation.
//!
//! `GeowindowApp` starts the configured services in dependency order and
//! tears them down together.

use std::path::Path;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::directory::{
    AdvertiserHandle, Contact, DirectoryService, DirectorySnapshot, SelfAdvertisement,
    SelfAdvertiser,
};
use crate::pubsub::StateField;
use crate::store::StorePool;
use crate::view::{QueryHandle, QueryServiceConfig};

use super::backend::QueryBackend;
use super::config::AppConfig;
use super::error::AppError;

/// A running set of services sharing one shutdown token.
///
/// Services start in this order:
/// 1. Directory service, so advertisers have somewhere to send
/// 2. Query service over the configured backend
/// 3. Self-advertisement of the query service
///
/// # Example
///
/// ```ignore
/// use geowindow::app::{AppConfig, GeowindowApp, QueryAppConfig};
///
/// let config = AppConfig::new()
///     .with_directory(AppConfig::directory_from(&file)?)
///     .with_query(QueryAppConfig::from_config_file(&file)?);
/// let app = GeowindowApp::start(config).await?;
///
/// let mut updates = app.query().unwrap().subscribe();
///
/// app.shutdown().await;
/// ```
pub struct GeowindowApp {
    shutdown: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    directory: Option<StateField<DirectorySnapshot>>,
    advertiser: Option<AdvertiserHandle>,
    query: Option<QueryHandle>,
    backend: Option<QueryBackend>,
    config: AppConfig,
}

impl GeowindowApp {
    /// Starts the configured services on the current runtime.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        Self::start_with_clock(config, SystemClock).await
    }

    /// Starts the configured services with an explicit clock.
    pub async fn start_with_clock<C: Clock + Clone>(
        config: AppConfig,
        clock: C,
    ) -> Result<Self, AppError> {
        config.validate()?;
        info!("Starting geowindow services");

        let shutdown = CancellationToken::new();

        // Open the backend before spawning anything so a bad catalog
        // leaves nothing running.
        let pool = StorePool::new();
        let backend = config
            .query
            .as_ref()
            .map(|query| QueryBackend::open(query, &pool))
            .transpose()?;

        let advertisement = match (&config.advertise, &backend) {
            (Some(ad), Some(backend)) => Some(SelfAdvertisement::new(
                Contact::new(ad.address.clone(), backend.kind().as_str()),
                ad.description.clone(),
                ad.interval,
                ad.ttl,
            )?),
            _ => None,
        };

        let mut app = Self {
            shutdown,
            tasks: Vec::new(),
            directory: None,
            advertiser: None,
            query: None,
            backend: None,
            config: config.clone(),
        };

        // 1. Directory
        if let Some(directory_config) = config.directory.clone() {
            let (service, advertiser) = DirectoryService::new(directory_config, clock.clone());
            app.directory = Some(service.directory_field());
            app.advertiser = Some(advertiser);
            let token = app.shutdown.clone();
            app.tasks.push((
                "directory",
                tokio::spawn(async move {
                    if let Err(e) = service.run(token).await {
                        error!(error = %e, "Directory service terminated");
                    }
                }),
            ));
            info!("Directory service started");
        }

        // 2. Query service
        if let (Some(backend), Some(query_config)) = (backend, &config.query) {
            let service_config =
                QueryServiceConfig::default().with_poll_interval(query_config.poll_interval);
            let (handle, task) = backend.spawn(service_config, clock.clone(), app.shutdown.clone());
            app.query = Some(handle);
            app.tasks.push(("query", task));
            info!(service = %backend.kind(), "Query service started");
            app.backend = Some(backend);
        }

        // 3. Self-advertisement
        if let (Some(advertisement), Some(handle)) = (advertisement, app.advertiser.clone()) {
            let token = app.shutdown.clone();
            let contact = advertisement.contact.clone();
            app.tasks.push((
                "advertiser",
                tokio::spawn(async move {
                    if let Err(e) = SelfAdvertiser::new(advertisement, handle).run(token).await {
                        warn!(error = %e, "Self-advertisement stopped");
                    }
                }),
            ));
            info!(contact = %contact, "Self-advertisement started");
        }

        Ok(app)
    }

    /// The published directory, if a directory service is running.
    pub fn directory(&self) -> Option<&StateField<DirectorySnapshot>> {
        self.directory.as_ref()
    }

    /// Handle for advertising to the in-process directory.
    pub fn advertiser(&self) -> Option<&AdvertiserHandle> {
        self.advertiser.as_ref()
    }

    /// Client handle of the query service.
    pub fn query(&self) -> Option<&QueryHandle> {
        self.query.as_ref()
    }

    pub fn backend(&self) -> Option<&QueryBackend> {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token cancelled on shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Reloads the satellite catalog from `path`, or from the configured
    /// catalog when `path` is `None`.
    pub fn reload_catalog(&self, path: Option<&Path>) -> Result<usize, AppError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| AppError::Config("no query service is running".to_string()))?;
        let path = path
            .or_else(|| self.config.query.as_ref().and_then(|q| q.catalog.as_deref()))
            .ok_or_else(|| AppError::Config("no catalog path configured".to_string()))?;
        let count = backend.reload_catalog(path)?;
        info!(path = %path.display(), objects = count, "Catalog reloaded");
        Ok(count)
    }

    /// Cancels every service and waits for them to stop.
    pub async fn shutdown(self) {
        info!("Shutting down geowindow services");
        self.shutdown.cancel();
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!(task = name, error = %e, "Service task panicked");
            }
        }
        info!("All services stopped");
    }
}
