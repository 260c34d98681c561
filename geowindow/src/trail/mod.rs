//! Per-client trail of visited positions.
//!
//! Each time a client's window moves, the window midpoint is appended to the
//! client's trail. The trail is bounded; once full, every new point evicts
//! the oldest one.
//!
//! # Design
//!
//! - A point is recorded only when the midpoint differs exactly from the
//!   last recorded one
//! - Points are identified by a per-client sequence number, so two points at
//!   the same place stay distinct
//! - Points never change once recorded, so `changed` is always empty

use std::collections::VecDeque;

use tracing::debug;

use crate::spatiotemporal::{
    fields, FieldNames, HandleId, QueryOutcome, Queryable, ResultDiff, ResultHandle, ResultSet,
    SpatiotemporalWindow, Vector3d,
};

/// Default maximum number of points in a trail.
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Configuration for trail accumulation.
#[derive(Debug, Clone)]
pub struct TrailConfig {
    /// Maximum points retained per client.
    pub max_points: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl TrailConfig {
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.max(1);
        self
    }
}

/// Per-client trail state.
#[derive(Debug, Default)]
pub struct TrailContext {
    /// Recorded points (oldest first).
    points: VecDeque<ResultHandle>,
    /// Midpoint of the last recorded window.
    last_location: Option<Vector3d>,
    /// Sequence number of the last recorded point.
    sequence: u64,
}

impl TrailContext {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest recorded point.
    pub fn oldest(&self) -> Option<&ResultHandle> {
        self.points.front()
    }

    /// Newest recorded point.
    pub fn newest(&self) -> Option<&ResultHandle> {
        self.points.back()
    }
}

/// Queryable that accumulates each client's trail.
#[derive(Debug, Clone, Default)]
pub struct TrailQueryable {
    config: TrailConfig,
}

impl TrailQueryable {
    pub fn new() -> Self {
        Self::with_config(TrailConfig::default())
    }

    pub fn with_config(config: TrailConfig) -> Self {
        Self { config }
    }

    pub fn max_points(&self) -> usize {
        self.config.max_points
    }
}

impl Queryable for TrailQueryable {
    type Context = TrailContext;

    fn name(&self) -> &str {
        "trail"
    }

    fn query(
        &self,
        window: &SpatiotemporalWindow,
        previous: &ResultSet,
        requested: &FieldNames,
        context: &mut TrailContext,
    ) -> QueryOutcome {
        if requested.is_empty() {
            return QueryOutcome::unchanged(previous);
        }

        let location = window.center();
        let mut diff = ResultDiff::default();

        if context.last_location != Some(location) {
            context.sequence += 1;
            let mapname = context.sequence.to_string();
            let point = ResultHandle::new(HandleId::from_raw(context.sequence))
                .with_field(fields::POSITION, location)
                .with_field(fields::MAPNAME, mapname)
                .with_field(fields::TIME, window.time.lower)
                .restricted(requested);

            context.points.push_back(point.clone());
            context.last_location = Some(location);
            diff.added.insert(point);

            if context.points.len() > self.config.max_points {
                if let Some(evicted) = context.points.pop_front() {
                    diff.removed.insert(evicted);
                }
            }
            debug!(
                sequence = context.sequence,
                points = context.points.len(),
                location = %location,
                "Trail point recorded"
            );
        }

        QueryOutcome {
            current: context.points.iter().cloned().collect(),
            diff,
        }
    }
}
