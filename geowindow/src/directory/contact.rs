//! Provider contacts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A network-reachable provider: an address plus the service offered there.
///
/// Contacts are opaque to the directory; they only key advertisements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Contact {
    pub address: String,
    pub service: String,
}

impl Contact {
    pub fn new(address: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            service: service.into(),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.service, self.address)
    }
}
