//! Client-facing query layer.
//!
//! A [`QuerySession`] interprets one client's view parameters and runs the
//! queryable against them. A [`QueryService`] owns every session of one
//! queryable on a single task.
//!
//! ```text
//!  client ──QueryHandle──► QueryService ──refresh──► QuerySession ──► Queryable
//!                               │
//!                               └──broadcast──► SessionUpdate { client_id, diff }
//! ```

mod error;
mod service;
mod session;

pub use error::ViewError;
pub use service::{
    ClientId, QueryHandle, QueryService, QueryServiceConfig, SessionCommand, SessionUpdate,
    WindowUpdate, DEFAULT_COMMAND_CHANNEL_CAPACITY, DEFAULT_POLL_INTERVAL,
    DEFAULT_UPDATE_CHANNEL_CAPACITY,
};
pub use session::QuerySession;
