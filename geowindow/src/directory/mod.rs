//! Advertisement directory.
//!
//! Query providers advertise a [`Contact`] with a description and a TTL.
//! Advertisements accumulate as pending [`Transaction`]s and are applied in
//! batches on a fixed timer, so consumers observe the directory change at
//! most once per apply period.
//!
//! ```text
//!  provider ──advertise──► TransactionQueue ──apply tick──► entries ──► Directory field
//!                                 ▲                            │
//!                                 └──── Remove ◄── expiration alarm
//! ```
//!
//! Every entry has exactly one slot in the expiration index. The service
//! stops if that ever fails to hold.

mod consumer;
mod contact;
mod engine;
mod error;
mod registration;
mod service;
mod transactions;

pub use consumer::{ConsumerView, DirectoryChange};
pub use contact::Contact;
pub use engine::{Advertisement, AdvertisementDirectory, AppliedBatch, DirectorySnapshot};
pub use error::{DirectoryError, DirectoryResult};
pub use registration::{SelfAdvertisement, SelfAdvertiser};
pub use service::{
    AdvertiserHandle, DirectoryRequest, DirectoryService, DirectoryServiceConfig,
    DEFAULT_REQUEST_CHANNEL_CAPACITY,
};
pub use transactions::{Transaction, TransactionQueue};
