//! Query service: one tokio task owning every session of a queryable.
//!
//! Sessions are re-queried on a fixed poll period and immediately after a
//! client changes its window. Non-empty diffs are broadcast as
//! [`SessionUpdate`]s tagged with the client they belong to.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::spatiotemporal::{FieldNames, Queryable, ResultDiff, TimeInterval, Vector3d};

use super::error::ViewError;
use super::session::QuerySession;

// =============================================================================
// Configuration
// =============================================================================

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default capacity of the command channel.
pub const DEFAULT_COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Default capacity of the update broadcast channel.
pub const DEFAULT_UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Configuration for a query service.
#[derive(Debug, Clone)]
pub struct QueryServiceConfig {
    pub poll_interval: Duration,
    pub command_capacity: usize,
    pub update_capacity: usize,
}

impl Default for QueryServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            command_capacity: DEFAULT_COMMAND_CHANNEL_CAPACITY,
            update_capacity: DEFAULT_UPDATE_CHANNEL_CAPACITY,
        }
    }
}

impl QueryServiceConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_update_capacity(mut self, capacity: usize) -> Self {
        self.update_capacity = capacity;
        self
    }
}

// =============================================================================
// Commands and updates
// =============================================================================

/// Identifies a client session.
pub type ClientId = u64;

/// Parameter changes for a session. `None` leaves a parameter as it is.
#[derive(Debug, Clone, Default)]
pub struct WindowUpdate {
    pub position: Option<Vector3d>,
    pub width: Option<Vector3d>,
    pub time: Option<TimeInterval>,
    pub fields: Option<FieldNames>,
}

impl WindowUpdate {
    pub fn position(mut self, position: Vector3d) -> Self {
        self.position = Some(position);
        self
    }

    pub fn width(mut self, width: Vector3d) -> Self {
        self.width = Some(width);
        self
    }

    pub fn time(mut self, time: TimeInterval) -> Self {
        self.time = Some(time);
        self
    }

    pub fn fields(mut self, fields: FieldNames) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Commands accepted by a query service.
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        client_id: ClientId,
    },
    UpdateWindow {
        client_id: ClientId,
        update: WindowUpdate,
    },
    Snapshot {
        client_id: ClientId,
        reply: oneshot::Sender<Option<ResultDiff>>,
    },
    Disconnect {
        client_id: ClientId,
    },
}

/// A non-empty diff for one client.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub client_id: ClientId,
    pub diff: ResultDiff,
}

/// Cloneable client-side handle to a query service.
#[derive(Clone, Debug)]
pub struct QueryHandle {
    commands: mpsc::Sender<SessionCommand>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl QueryHandle {
    async fn send(&self, command: SessionCommand) -> Result<(), ViewError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ViewError::ChannelClosed)
    }

    pub async fn connect(&self, client_id: ClientId) -> Result<(), ViewError> {
        self.send(SessionCommand::Connect { client_id }).await
    }

    pub async fn update(&self, client_id: ClientId, update: WindowUpdate) -> Result<(), ViewError> {
        self.send(SessionCommand::UpdateWindow { client_id, update })
            .await
    }

    /// Discards the client's session and its private query context.
    pub async fn disconnect(&self, client_id: ClientId) -> Result<(), ViewError> {
        self.send(SessionCommand::Disconnect { client_id }).await
    }

    /// The client's full current results as an all-added diff, or `None` if
    /// the client is not connected.
    pub async fn snapshot(&self, client_id: ClientId) -> Result<Option<ResultDiff>, ViewError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { client_id, reply })
            .await?;
        rx.await.map_err(|_| ViewError::ChannelClosed)
    }

    /// Subscribes to updates for all clients.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }
}

// =============================================================================
// Query Service
// =============================================================================

/// Owns all sessions of one queryable.
pub struct QueryService<Q: Queryable, C: Clock> {
    queryable: Arc<Q>,
    clock: C,
    config: QueryServiceConfig,
    sessions: HashMap<ClientId, QuerySession<Q>>,
    commands: mpsc::Receiver<SessionCommand>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl<Q: Queryable + 'static, C: Clock> QueryService<Q, C> {
    /// Creates the service and its client handle.
    pub fn new(queryable: Arc<Q>, config: QueryServiceConfig, clock: C) -> (Self, QueryHandle) {
        let (command_tx, commands) = mpsc::channel(config.command_capacity.max(1));
        let (updates, _) = broadcast::channel(config.update_capacity.max(1));
        let handle = QueryHandle {
            commands: command_tx,
            updates: updates.clone(),
        };
        let service = Self {
            queryable,
            clock,
            config,
            sessions: HashMap::new(),
            commands,
            updates,
        };
        (service, handle)
    }

    /// Runs until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut poll = tokio::time::interval_at(Instant::now() + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            queryable = self.queryable.name(),
            poll_interval_ms = period.as_millis() as u64,
            "Query service starting"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!(
                        queryable = self.queryable.name(),
                        sessions = self.sessions.len(),
                        "Query service shutting down"
                    );
                    break;
                }

                Some(command) = self.commands.recv() => {
                    self.handle_command(command);
                }

                _ = poll.tick() => {
                    self.poll_all();
                }
            }
        }
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect { client_id } => {
                if self.sessions.contains_key(&client_id) {
                    debug!(client_id, "Client already connected");
                } else {
                    self.sessions.insert(client_id, QuerySession::new());
                    info!(client_id, queryable = self.queryable.name(), "Client connected");
                }
            }
            SessionCommand::UpdateWindow { client_id, update } => {
                self.update_session(client_id, update);
            }
            SessionCommand::Snapshot { client_id, reply } => {
                let snapshot = self.sessions.get(&client_id).map(QuerySession::snapshot);
                let _ = reply.send(snapshot);
            }
            SessionCommand::Disconnect { client_id } => {
                if self.sessions.remove(&client_id).is_some() {
                    info!(client_id, "Client disconnected");
                }
            }
        }
    }

    fn update_session(&mut self, client_id: ClientId, update: WindowUpdate) {
        let Some(session) = self.sessions.get_mut(&client_id) else {
            warn!(client_id, "Window update for unknown client");
            return;
        };

        if let Some(position) = update.position {
            if let Err(e) = session.set_position(position) {
                warn!(client_id, error = %e, "Rejected position");
            }
        }
        if let Some(width) = update.width {
            if let Err(e) = session.set_width(width) {
                warn!(client_id, error = %e, "Rejected width");
            }
        }
        if let Some(time) = update.time {
            session.set_time(Some(time));
        }
        if let Some(fields) = update.fields {
            session.set_fields(fields);
        }

        if session.is_dirty() {
            let now = self.clock.now();
            if let Some(diff) = session.refresh(&self.queryable, now) {
                publish(&self.updates, client_id, diff);
            }
        }
    }

    fn poll_all(&mut self) {
        let now = self.clock.now();
        trace!(sessions = self.sessions.len(), "Polling sessions");
        for (&client_id, session) in self.sessions.iter_mut() {
            if let Some(diff) = session.refresh(&self.queryable, now) {
                publish(&self.updates, client_id, diff);
            }
        }
    }
}

fn publish(updates: &broadcast::Sender<SessionUpdate>, client_id: ClientId, diff: ResultDiff) {
    // No receivers is not an error; the session state is already updated.
    let _ = updates.send(SessionUpdate { client_id, diff });
}
