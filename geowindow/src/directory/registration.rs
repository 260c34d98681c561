//! Periodic self-advertisement for query providers.
//!
//! A provider re-advertises itself at a fixed interval with a TTL. The TTL
//! should exceed the interval or the entry will lapse between renewals.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{DirectoryError, DirectoryResult};
use super::service::AdvertiserHandle;
use super::Contact;

/// Validated self-advertisement settings.
#[derive(Debug, Clone)]
pub struct SelfAdvertisement {
    pub contact: Contact,
    pub description: String,
    pub interval: Duration,
    pub ttl: Duration,
}

impl SelfAdvertisement {
    /// Validates the timing. Both interval and TTL must be positive.
    pub fn new(
        contact: Contact,
        description: impl Into<String>,
        interval: Duration,
        ttl: Duration,
    ) -> DirectoryResult<Self> {
        if interval.is_zero() {
            return Err(DirectoryError::InvalidAdvertisement(
                "advertise interval must be positive".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(DirectoryError::InvalidAdvertisement(
                "advertise TTL must be positive".to_string(),
            ));
        }
        if interval >= ttl {
            warn!(
                interval_ms = interval.as_millis() as u64,
                ttl_ms = ttl.as_millis() as u64,
                "Advertise interval is not shorter than TTL; entry will lapse between renewals"
            );
        }
        Ok(Self {
            contact,
            description: description.into(),
            interval,
            ttl,
        })
    }

    /// TTL in milliseconds, saturating at `i64::MAX`.
    pub fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Background task that keeps one advertisement alive.
pub struct SelfAdvertiser {
    advertisement: SelfAdvertisement,
    handle: AdvertiserHandle,
}

impl SelfAdvertiser {
    pub fn new(advertisement: SelfAdvertisement, handle: AdvertiserHandle) -> Self {
        Self {
            advertisement,
            handle,
        }
    }

    /// Advertises immediately, then once per interval until cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> DirectoryResult<()> {
        let ad = self.advertisement;
        let mut ticker = tokio::time::interval(ad.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(contact = %ad.contact, "Self-advertisement starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!(contact = %ad.contact, "Self-advertisement shutting down");
                    return Ok(());
                }

                _ = ticker.tick() => {
                    debug!(contact = %ad.contact, "Renewing advertisement");
                    if let Err(e) = self
                        .handle
                        .advertise(ad.contact.clone(), ad.description.clone(), Some(ad.ttl_ms()))
                        .await
                    {
                        warn!(contact = %ad.contact, error = %e, "Directory unavailable");
                        return Err(e);
                    }
                }
            }
        }
    }
}
