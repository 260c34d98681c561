//! Per-client query session.
//!
//! Holds what one client asked for (center position, width, time bounds and
//! field names) together with its previous answer and the queryable's private
//! context for that client.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::coord::{validate_position, CoordError};
use crate::spatiotemporal::{
    FieldNames, Queryable, ResultDiff, ResultSet, SpatiotemporalWindow, TimeInterval, Vector3d,
};

/// Query parameters and state of one client.
pub struct QuerySession<Q: Queryable> {
    position: Option<Vector3d>,
    width: Option<Vector3d>,
    time: Option<TimeInterval>,
    fields: FieldNames,
    previous: ResultSet,
    context: Q::Context,
    dirty: bool,
}

impl<Q: Queryable> Default for QuerySession<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Queryable> QuerySession<Q> {
    pub fn new() -> Self {
        Self {
            position: None,
            width: None,
            time: None,
            fields: FieldNames::new(),
            previous: ResultSet::new(),
            context: Q::Context::default(),
            dirty: false,
        }
    }

    /// Sets the window center (latitude, longitude, elevation in meters).
    pub fn set_position(&mut self, position: Vector3d) -> Result<(), CoordError> {
        validate_position(&position)?;
        self.position = Some(position);
        self.dirty = true;
        Ok(())
    }

    /// Sets the window extent (degrees, degrees, meters).
    pub fn set_width(&mut self, width: Vector3d) -> Result<(), CoordError> {
        if !width.is_finite() {
            return Err(CoordError::NonFinite);
        }
        self.width = Some(width);
        self.dirty = true;
        Ok(())
    }

    /// Pins the session to fixed time bounds. `None` follows the clock.
    pub fn set_time(&mut self, time: Option<TimeInterval>) {
        self.time = time;
        self.dirty = true;
    }

    pub fn set_fields(&mut self, fields: FieldNames) {
        self.fields = fields;
        self.dirty = true;
    }

    /// True when parameters changed since the last query.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True once both position and width are known.
    pub fn is_ready(&self) -> bool {
        self.position.is_some() && self.width.is_some()
    }

    /// The most recent complete answer.
    pub fn results(&self) -> &ResultSet {
        &self.previous
    }

    pub fn context(&self) -> &Q::Context {
        &self.context
    }

    /// The window the next query would use, if the session is ready.
    pub fn window(&self, now: DateTime<Utc>) -> Option<SpatiotemporalWindow> {
        let center = self.position?;
        let width = self.width?;
        let time = self.time.unwrap_or_else(|| TimeInterval::instant(now));
        Some(SpatiotemporalWindow::from_center(center, width, time))
    }

    /// Runs the query and returns the diff when it has any entries.
    pub fn refresh(&mut self, queryable: &Q, now: DateTime<Utc>) -> Option<ResultDiff> {
        let Some(window) = self.window(now) else {
            if self.dirty {
                info!(
                    queryable = queryable.name(),
                    has_position = self.position.is_some(),
                    has_width = self.width.is_some(),
                    "Session not queried: position and width required"
                );
                self.dirty = false;
            }
            return None;
        };
        self.dirty = false;

        let outcome = queryable.query(&window, &self.previous, &self.fields, &mut self.context);
        self.previous = outcome.current;

        if outcome.diff.is_empty() {
            return None;
        }
        debug!(
            queryable = queryable.name(),
            added = outcome.diff.added.len(),
            removed = outcome.diff.removed.len(),
            changed = outcome.diff.changed.len(),
            "Session results updated"
        );
        Some(outcome.diff)
    }

    /// The full current answer, as a newly attached subscriber sees it.
    pub fn snapshot(&self) -> ResultDiff {
        ResultDiff::initial(&self.previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::lookup::{RasterLookup, SetDiffQueryable};
    use crate::spatiotemporal::{field_names, ResultHandle};
    use crate::store::{BoundingBox, Feature, MemoryStore};

    fn raster() -> SetDiffQueryable<RasterLookup> {
        let store = MemoryStore::new("test").with_layer(
            "raster",
            vec![
                Feature::bounds("west", BoundingBox::new(38.0, -78.0, 39.0, -77.0)),
                Feature::bounds("east", BoundingBox::new(38.0, -76.0, 39.0, -75.0)),
            ],
        );
        SetDiffQueryable::new("raster", Arc::new(store), RasterLookup::new())
    }

    fn ready_session(lon: f64) -> QuerySession<SetDiffQueryable<RasterLookup>> {
        let mut session = QuerySession::new();
        session.set_position(Vector3d::new(38.5, lon, 0.0)).unwrap();
        session.set_width(Vector3d::new(0.2, 0.2, 0.0)).unwrap();
        session.set_fields(field_names(["mapname"]));
        session
    }

    #[test]
    fn test_not_ready_without_width() {
        let q = raster();
        let mut session: QuerySession<SetDiffQueryable<RasterLookup>> = QuerySession::new();
        session.set_position(Vector3d::new(38.5, -77.5, 0.0)).unwrap();
        assert!(!session.is_ready());
        assert!(session.refresh(&q, Utc::now()).is_none());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_rejects_invalid_position() {
        let mut session: QuerySession<SetDiffQueryable<RasterLookup>> = QuerySession::new();
        assert!(session.set_position(Vector3d::new(91.0, 0.0, 0.0)).is_err());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_window_is_centered_on_position() {
        let session = ready_session(-77.5);
        let window = session.window(Utc::now()).unwrap();
        assert!((window.lower_left.x - 38.4).abs() < 1e-9);
        assert!((window.lower_left.y - -77.6).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_reports_moves() {
        let q = raster();
        let mut session = ready_session(-77.5);

        let diff = session.refresh(&q, Utc::now()).unwrap();
        assert!(diff.added.contains(&ResultHandle::keyed("west")));
        assert!(diff.removed.is_empty());

        assert!(session.refresh(&q, Utc::now()).is_none());

        session.set_position(Vector3d::new(38.5, -75.5, 0.0)).unwrap();
        let diff = session.refresh(&q, Utc::now()).unwrap();
        assert!(diff.added.contains(&ResultHandle::keyed("east")));
        assert!(diff.removed.contains(&ResultHandle::keyed("west")));
    }

    #[test]
    fn test_snapshot_is_all_added() {
        let q = raster();
        let mut session = ready_session(-77.5);
        session.refresh(&q, Utc::now());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.added, *session.results());
        assert!(snapshot.removed.is_empty());
        assert!(snapshot.changed.is_empty());
    }
}
