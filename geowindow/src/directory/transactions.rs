//! Pending mutations of the authoritative directory.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::Contact;

/// A queued intent to change the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Insert or refresh an advertisement.
    Add {
        contact: Contact,
        description: String,
        expires_at: DateTime<Utc>,
    },
    /// Drop an advertisement, but only if it still expires at `expires_at`.
    Remove {
        contact: Contact,
        expires_at: DateTime<Utc>,
    },
}

impl Transaction {
    pub fn contact(&self) -> &Contact {
        match self {
            Transaction::Add { contact, .. } | Transaction::Remove { contact, .. } => contact,
        }
    }
}

/// FIFO queue of pending transactions.
#[derive(Debug, Default)]
pub struct TransactionQueue {
    pending: VecDeque<Transaction>,
}

impl TransactionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.pending.push_back(transaction);
    }

    /// Takes every pending transaction in enqueue order, leaving the queue
    /// empty.
    pub fn take_all(&mut self) -> VecDeque<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
