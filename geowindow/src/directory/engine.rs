//! The advertisement state machine.
//!
//! State is mutated only by [`AdvertisementDirectory::apply`]. Advertising and
//! expiry detection just queue transactions, which the next apply drains in
//! order.
//!
//! ```text
//!   advertise ──► Add ───────┐
//!                            ├──► pending ──► apply ──► entries + expirations
//!   expire(now) ──► Remove ──┘    (FIFO)     (timer)        │
//!                                                            ▼
//!                                                     published snapshot
//! ```
//!
//! Every entry has exactly one mapping in the expiration index, and every
//! index mapping has an entry, whenever an apply completes. A Remove only
//! takes effect while its timestamp matches the entry's current expiration,
//! so a stale expiry can never drop a fresher re-advertisement.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, trace};

use super::error::{DirectoryError, DirectoryResult};
use super::transactions::{Transaction, TransactionQueue};
use super::Contact;

/// Published view of the directory: contact to description.
pub type DirectorySnapshot = BTreeMap<Contact, String>;

/// An authoritative directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub description: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of one apply pass.
#[derive(Debug, Clone)]
pub struct AppliedBatch {
    /// Transactions drained from the queue.
    pub applied: usize,
    /// Removes skipped because the entry had been refreshed or was gone.
    pub stale_removes: usize,
    /// Directory contents after the batch.
    pub snapshot: DirectorySnapshot,
    /// Soonest remaining expiration.
    pub next_expiration: Option<DateTime<Utc>>,
}

/// Transactional, batched advertisement directory.
#[derive(Debug, Default)]
pub struct AdvertisementDirectory {
    entries: BTreeMap<Contact, Advertisement>,
    expirations: BTreeMap<DateTime<Utc>, Vec<Contact>>,
    pending: TransactionQueue,
}

impl AdvertisementDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an advertisement valid for `ttl_ms` milliseconds from `now`.
    ///
    /// An absent or negative TTL is ignored. Returns true if an Add was
    /// queued.
    pub fn advertise(
        &mut self,
        contact: Contact,
        description: impl Into<String>,
        ttl_ms: Option<i64>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(ttl_ms) = ttl_ms.filter(|ttl| *ttl >= 0) else {
            debug!(contact = %contact, ?ttl_ms, "Ignoring advertisement without a usable TTL");
            return false;
        };
        let Some(expires_at) = now.checked_add_signed(Duration::milliseconds(ttl_ms)) else {
            debug!(contact = %contact, ttl_ms, "Ignoring advertisement with out-of-range TTL");
            return false;
        };
        trace!(contact = %contact, %expires_at, "Advertisement queued");
        self.pending.push(Transaction::Add {
            contact,
            description: description.into(),
            expires_at,
        });
        true
    }

    /// Queues a Remove for every index mapping expiring at or before `now`
    /// and drops those mappings. Returns the number of Removes queued.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let mut queued = 0;
        while let Some(entry) = self.expirations.first_entry() {
            if *entry.key() > now {
                break;
            }
            let (expires_at, contacts) = entry.remove_entry();
            for contact in contacts {
                debug!(contact = %contact, %expires_at, "Advertisement expired");
                self.pending.push(Transaction::Remove {
                    contact,
                    expires_at,
                });
                queued += 1;
            }
        }
        queued
    }

    /// Drains the pending queue in order.
    ///
    /// Returns `Ok(None)` without touching state when nothing is pending.
    pub fn apply(&mut self) -> DirectoryResult<Option<AppliedBatch>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let transactions = self.pending.take_all();
        let applied = transactions.len();
        let mut stale_removes = 0;

        for transaction in transactions {
            match transaction {
                Transaction::Add {
                    contact,
                    description,
                    expires_at,
                } => {
                    if let Some(old) = self.entries.get(&contact) {
                        let old_expiry = old.expires_at;
                        self.unindex(&contact, old_expiry);
                    }
                    self.expirations
                        .entry(expires_at)
                        .or_default()
                        .push(contact.clone());
                    self.entries.insert(
                        contact,
                        Advertisement {
                            description,
                            expires_at,
                        },
                    );
                }
                Transaction::Remove {
                    contact,
                    expires_at,
                } => {
                    let current = self.entries.get(&contact).map(|a| a.expires_at);
                    if current == Some(expires_at) {
                        self.entries.remove(&contact);
                        self.unindex(&contact, expires_at);
                    } else {
                        trace!(contact = %contact, "Stale remove ignored");
                        stale_removes += 1;
                    }
                }
            }
        }

        self.check_invariant()?;

        Ok(Some(AppliedBatch {
            applied,
            stale_removes,
            snapshot: self.snapshot(),
            next_expiration: self.next_expiration(),
        }))
    }

    /// Removes `contact` from the bucket at `expires_at`, pruning the bucket
    /// if it empties. Tolerates a mapping that expiry already dropped.
    fn unindex(&mut self, contact: &Contact, expires_at: DateTime<Utc>) {
        if let Some(bucket) = self.expirations.get_mut(&expires_at) {
            bucket.retain(|c| c != contact);
            if bucket.is_empty() {
                self.expirations.remove(&expires_at);
            }
        }
    }

    /// Verifies the entry map and the expiration index pair up one to one.
    pub fn check_invariant(&self) -> DirectoryResult<()> {
        let indexed: usize = self.expirations.values().map(Vec::len).sum();
        if indexed != self.entries.len() {
            let message = format!(
                "{} entries but {} expiration mappings",
                self.entries.len(),
                indexed
            );
            error!(invariant = "entry-index pairing", %message, "Directory corrupted");
            return Err(DirectoryError::InvariantViolation(message));
        }
        for (contact, advertisement) in &self.entries {
            let mapped = self
                .expirations
                .get(&advertisement.expires_at)
                .is_some_and(|bucket| bucket.iter().filter(|c| *c == contact).count() == 1);
            if !mapped {
                let message = format!("{} has no expiration mapping", contact);
                error!(invariant = "entry-index pairing", %message, "Directory corrupted");
                return Err(DirectoryError::InvariantViolation(message));
            }
        }
        Ok(())
    }

    /// Soonest expiration still indexed.
    pub fn next_expiration(&self) -> Option<DateTime<Utc>> {
        self.expirations.keys().next().copied()
    }

    /// Current contact to description map.
    pub fn snapshot(&self) -> DirectorySnapshot {
        self.entries
            .iter()
            .map(|(contact, ad)| (contact.clone(), ad.description.clone()))
            .collect()
    }

    pub fn get(&self, contact: &Contact) -> Option<&Advertisement> {
        self.entries.get(contact)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
