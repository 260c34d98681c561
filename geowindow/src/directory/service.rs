//! Tokio service driving an [`AdvertisementDirectory`].
//!
//! # Timers
//!
//! ```text
//!   apply timer (fixed period) ──► drain pending ──► publish Directory
//!                                        │
//!                                        └──► re-arm expiration alarm
//!
//!   expiration alarm (one shot) ──► queue Removes ──► re-arm for next expiry
//! ```
//!
//! Consumers see directory updates at most once per apply period, while the
//! expiration alarm fires exactly when the soonest advertisement lapses. An
//! expired advertisement disappears from the published directory within one
//! apply period after its TTL.
//!
//! # Example
//!
//! ```ignore
//! use geowindow::directory::{DirectoryService, DirectoryServiceConfig};
//!
//! let config = DirectoryServiceConfig::new(Duration::from_millis(100));
//! let (service, advertiser) = DirectoryService::new(config, SystemClock);
//! let directory = service.directory_field();
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(service.run(shutdown.clone()));
//!
//! advertiser.advertise(contact, "City names", Some(30_000)).await?;
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::clock::Clock;
use crate::pubsub::StateField;
use crate::spatiotemporal::fields;

use super::engine::{AdvertisementDirectory, DirectorySnapshot};
use super::error::{DirectoryError, DirectoryResult};
use super::Contact;

// =============================================================================
// Configuration
// =============================================================================

/// Default capacity of the advertisement request channel.
pub const DEFAULT_REQUEST_CHANNEL_CAPACITY: usize = 256;

/// Shortest delay before re-checking expirations after an early wakeup.
const EXPIRATION_RETRY: Duration = Duration::from_millis(1);

/// Configuration for the directory service.
#[derive(Clone, Debug)]
pub struct DirectoryServiceConfig {
    /// Period of the apply timer.
    pub apply_interval: Duration,

    /// Request channel capacity.
    pub channel_capacity: usize,
}

impl DirectoryServiceConfig {
    /// Creates a configuration with the given apply period.
    pub fn new(apply_interval: Duration) -> Self {
        Self {
            apply_interval,
            channel_capacity: DEFAULT_REQUEST_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Requests accepted by the directory service.
#[derive(Debug, Clone)]
pub enum DirectoryRequest {
    Advertise {
        contact: Contact,
        description: String,
        ttl_ms: Option<i64>,
    },
}

/// Cloneable handle through which providers advertise.
#[derive(Clone, Debug)]
pub struct AdvertiserHandle {
    tx: mpsc::Sender<DirectoryRequest>,
}

impl AdvertiserHandle {
    /// Submits an advertisement. There is no reply; an unusable TTL is
    /// silently dropped by the directory.
    pub async fn advertise(
        &self,
        contact: Contact,
        description: impl Into<String>,
        ttl_ms: Option<i64>,
    ) -> DirectoryResult<()> {
        self.tx
            .send(DirectoryRequest::Advertise {
                contact,
                description: description.into(),
                ttl_ms,
            })
            .await
            .map_err(|_| DirectoryError::ChannelClosed)
    }

    /// True once the service has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// =============================================================================
// Directory Service
// =============================================================================

/// State touched by timer and request handlers.
struct DirectoryCore<C: Clock> {
    directory: AdvertisementDirectory,
    clock: C,
    published: StateField<DirectorySnapshot>,
    expiration_alarm: Option<Instant>,
}

impl<C: Clock> DirectoryCore<C> {
    fn on_request(&mut self, request: DirectoryRequest) {
        match request {
            DirectoryRequest::Advertise {
                contact,
                description,
                ttl_ms,
            } => {
                let now = self.clock.now();
                self.directory.advertise(contact, description, ttl_ms, now);
            }
        }
    }

    fn on_apply(&mut self) -> DirectoryResult<()> {
        if self.directory.pending() == 0 {
            trace!("Apply tick with nothing pending");
            return Ok(());
        }

        self.expiration_alarm = None;
        if let Some(batch) = self.directory.apply()? {
            debug!(
                applied = batch.applied,
                stale_removes = batch.stale_removes,
                entries = batch.snapshot.len(),
                "Directory transactions applied"
            );
            self.published.publish(batch.snapshot);
            self.arm(batch.next_expiration, Duration::ZERO);
        }
        Ok(())
    }

    fn on_expiration(&mut self) {
        self.expiration_alarm = None;
        let expired = self.directory.expire(self.clock.now());
        let floor = if expired == 0 {
            EXPIRATION_RETRY
        } else {
            Duration::ZERO
        };
        self.arm(self.directory.next_expiration(), floor);
    }

    fn arm(&mut self, at: Option<DateTime<Utc>>, floor: Duration) {
        self.expiration_alarm = at.map(|at| {
            let delay = (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
            trace!(expires_at = %at, ?delay, "Expiration alarm armed");
            Instant::now() + delay.max(floor)
        });
    }
}

async fn alarm(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// The directory service.
///
/// Owns the authoritative directory. All mutation happens on the service
/// task, one event at a time.
pub struct DirectoryService<C: Clock> {
    config: DirectoryServiceConfig,
    core: DirectoryCore<C>,
    request_rx: mpsc::Receiver<DirectoryRequest>,
}

impl<C: Clock> DirectoryService<C> {
    /// Creates the service and the handle providers advertise through.
    pub fn new(config: DirectoryServiceConfig, clock: C) -> (Self, AdvertiserHandle) {
        let (tx, request_rx) = mpsc::channel(config.channel_capacity.max(1));
        let service = Self {
            config,
            core: DirectoryCore {
                directory: AdvertisementDirectory::new(),
                clock,
                published: StateField::new(fields::DIRECTORY, DirectorySnapshot::new()),
                expiration_alarm: None,
            },
            request_rx,
        };
        (service, AdvertiserHandle { tx })
    }

    /// The published directory.
    pub fn directory_field(&self) -> StateField<DirectorySnapshot> {
        self.core.published.clone()
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Returns an error only if the directory's internal invariant breaks,
    /// which stops the service.
    pub async fn run(self, shutdown: CancellationToken) -> DirectoryResult<()> {
        let Self {
            config,
            mut core,
            mut request_rx,
        } = self;

        let period = config.apply_interval.max(Duration::from_millis(1));
        let mut apply_timer = tokio::time::interval_at(Instant::now() + period, period);
        apply_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(apply_interval_ms = period.as_millis() as u64, "Directory service starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Directory service shutting down");
                    break;
                }

                _ = apply_timer.tick() => {
                    if let Err(e) = core.on_apply() {
                        error!(error = %e, "Directory service stopping");
                        return Err(e);
                    }
                }

                _ = alarm(core.expiration_alarm) => {
                    core.on_expiration();
                }

                Some(request) = request_rx.recv() => {
                    core.on_request(request);
                }
            }
        }

        Ok(())
    }
}
