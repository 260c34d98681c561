//! The orbital propagation queryable.
//!
//! Each client carries an [`OrbitalContext`] holding its last query time,
//! viewer position, temporal direction and recalculation schedule. A query
//! either rebuilds the schedule for every object or advances it, recomputing
//! only the objects that fell due.
//!
//! ```text
//!   first query ─┐
//!   arrow flip ──┼──► rebuild: compute all, schedule at now ± interval
//!   viewer moved ┤
//!   reload ──────┘
//!
//!   otherwise ──────► advance: pop due buckets, recompute, reschedule
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::coord;
use crate::spatiotemporal::{
    FieldNames, HandleId, QueryOutcome, Queryable, ResultDiff, ResultSet, SpatiotemporalWindow,
    Vector3d,
};

use super::calc::CalcObject;
use super::interval::compute_recalculation_interval;
use super::schedule::{Direction, RecalculationSchedule};

/// Per-client state of the orbital queryable.
#[derive(Debug, Default)]
pub struct OrbitalContext {
    last_time: Option<DateTime<Utc>>,
    last_viewer: Option<Vector3d>,
    direction: Direction,
    schedule: RecalculationSchedule,
    generation: u64,
    queries: u64,
}

impl OrbitalContext {
    /// Temporal direction observed on the last query.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn schedule(&self) -> &RecalculationSchedule {
        &self.schedule
    }

    /// Number of queries answered with this context.
    pub fn queries(&self) -> u64 {
        self.queries
    }
}

struct Catalog {
    generation: u64,
    objects: BTreeMap<HandleId, Arc<dyn CalcObject>>,
}

impl Catalog {
    fn build(generation: u64, objects: Vec<Arc<dyn CalcObject>>) -> Self {
        Self {
            generation,
            objects: objects.into_iter().map(|o| (o.id(), o)).collect(),
        }
    }
}

/// A queryable over a catalog of computed objects.
pub struct CalcDb {
    name: String,
    catalog: RwLock<Catalog>,
}

impl CalcDb {
    pub fn new(name: impl Into<String>, objects: Vec<Arc<dyn CalcObject>>) -> Self {
        let db = Self {
            name: name.into(),
            catalog: RwLock::new(Catalog::build(0, objects)),
        };
        info!(calc_db = %db.name, objects = db.len(), "Calculation catalog ready");
        db
    }

    /// Replaces the catalog. Every client rebuilds its schedule on its next
    /// query, and objects that left the catalog are reported as removed.
    pub fn reload(&self, objects: Vec<Arc<dyn CalcObject>>) {
        let mut catalog = self.catalog.write();
        let generation = catalog.generation + 1;
        *catalog = Catalog::build(generation, objects);
        info!(
            calc_db = %self.name,
            objects = catalog.objects.len(),
            generation,
            "Calculation catalog reloaded"
        );
    }

    pub fn len(&self) -> usize {
        self.catalog.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.read().objects.is_empty()
    }
}

impl Queryable for CalcDb {
    type Context = OrbitalContext;

    fn name(&self) -> &str {
        &self.name
    }

    fn query(
        &self,
        window: &SpatiotemporalWindow,
        previous: &ResultSet,
        fields: &FieldNames,
        context: &mut OrbitalContext,
    ) -> QueryOutcome {
        if fields.is_empty() {
            debug!(calc_db = %self.name, "No fields requested, skipping query");
            return QueryOutcome::unchanged(previous);
        }

        let now = window.time.lower;
        let viewer = coord::geodetic_to_cartesian(&window.center());
        let catalog = self.catalog.read();

        info!(
            calc_db = %self.name,
            lower_left = %window.lower_left,
            extent = %window.extent,
            "query"
        );

        let first = context.queries == 0;
        let direction = context
            .last_time
            .map_or(Direction::Forward, |last| Direction::between(last, now));
        let arrow_flipped = direction != context.direction;
        let viewer_moved = context.last_viewer.is_some_and(|v| v != viewer);
        let reloaded = context.generation != catalog.generation;
        let time_changed = context.last_time != Some(now);
        context.direction = direction;

        let mut diff = ResultDiff::default();

        if first || arrow_flipped || viewer_moved || reloaded {
            debug!(
                calc_db = %self.name,
                first, arrow_flipped, viewer_moved, reloaded,
                "Rebuilding recalculation schedule"
            );
            context.schedule.clear();
            for (id, object) in &catalog.objects {
                let state = object.compute(now);
                let interval =
                    compute_recalculation_interval(&state.position, &state.velocity, &viewer);
                context
                    .schedule
                    .schedule(direction, direction.advance(now, interval), *id);

                let handle = state.handle.restricted(fields);
                if first || !previous.contains(id) {
                    diff.added.insert(handle);
                } else if time_changed {
                    diff.changed.insert(handle);
                }
            }
        } else {
            while let Some((_, due)) = context.schedule.pop_due(direction, now) {
                for id in due {
                    let Some(object) = catalog.objects.get(&id) else {
                        continue;
                    };
                    let state = object.compute(now);
                    let interval =
                        compute_recalculation_interval(&state.position, &state.velocity, &viewer);
                    context
                        .schedule
                        .schedule(direction, direction.advance(now, interval), id);

                    let handle = state.handle.restricted(fields);
                    if previous.contains(&id) {
                        diff.changed.replace(handle);
                    } else {
                        diff.added.replace(handle);
                    }
                }
            }
        }

        // Previously reported objects stay current until they leave the
        // catalog; recomputed ones carry their fresh handles.
        let mut current: ResultSet = previous
            .iter()
            .filter(|h| catalog.objects.contains_key(&h.id()))
            .cloned()
            .collect();
        for handle in diff.changed.iter().chain(diff.added.iter()) {
            current.replace(handle.clone());
        }
        diff.removed = previous
            .iter()
            .filter(|h| !current.contains(*h))
            .cloned()
            .collect();

        debug!(
            calc_db = %self.name,
            added = diff.added.len(),
            changed = diff.changed.len(),
            removed = diff.removed.len(),
            "Objects recomputed"
        );
        if let Some(next) = context.schedule.next_due(direction) {
            info!(
                calc_db = %self.name,
                now = %now,
                next = %next,
                "Next computation scheduled"
            );
        }

        context.last_time = Some(now);
        context.last_viewer = Some(viewer);
        context.generation = catalog.generation;
        context.queries += 1;

        QueryOutcome { current, diff }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::CalcState;
    use crate::spatiotemporal::{field_names, fields as names, ResultHandle, TimeInterval};
    use chrono::TimeZone;

    /// Moves along the x axis far above the viewer at a fixed speed.
    struct Drifter {
        key: &'static str,
        speed: f64,
    }

    impl CalcObject for Drifter {
        fn id(&self) -> HandleId {
            HandleId::from_key(self.key)
        }

        fn compute(&self, time: DateTime<Utc>) -> CalcState {
            let secs = time.timestamp() as f64;
            let position = Vector3d::new(self.speed * secs, 0.0, 7_000_000.0);
            CalcState {
                position,
                velocity: Vector3d::new(self.speed, 0.0, 0.0),
                handle: ResultHandle::new(self.id())
                    .with_field(names::MAPNAME, self.key)
                    .with_field(names::TIME, time),
            }
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn window_at(time: DateTime<Utc>) -> SpatiotemporalWindow {
        SpatiotemporalWindow::new(
            Vector3d::new(0.0, 0.0, 0.0),
            Vector3d::new(0.0, 0.0, 0.0),
            TimeInterval::instant(time),
        )
    }

    fn objects() -> Vec<Arc<dyn CalcObject>> {
        vec![
            // Sweeps about 86 degrees per second as seen from the viewer.
            Arc::new(Drifter { key: "fast", speed: 10_000_000.0 }),
            Arc::new(Drifter { key: "still", speed: 0.0 }),
        ]
    }

    fn fields() -> FieldNames {
        field_names([names::MAPNAME, names::TIME])
    }

    #[test]
    fn test_first_query_adds_all() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let outcome = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut ctx);

        assert_eq!(outcome.diff.added.len(), 2);
        assert_eq!(outcome.current.len(), 2);
        assert!(outcome.diff.changed.is_empty());
        assert!(outcome.diff.removed.is_empty());
        assert_eq!(ctx.schedule().len(Direction::Forward), 2);
        assert_eq!(ctx.queries(), 1);
    }

    #[test]
    fn test_incremental_recomputes_only_due_objects() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let first = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut ctx);

        // The fast object is due after one second, the still one after a minute.
        let second = db.query(&window_at(t(2)), &first.current, &fields(), &mut ctx);
        assert!(second.diff.added.is_empty());
        assert!(second.diff.removed.is_empty());
        assert_eq!(second.diff.changed.len(), 1);
        assert!(second.diff.changed.contains(&HandleId::from_key("fast")));
        assert_eq!(second.current.len(), 2);

        let refreshed = second.current.get(&HandleId::from_key("fast")).unwrap();
        assert_eq!(
            refreshed.field(names::TIME),
            Some(&crate::spatiotemporal::FieldValue::Timestamp(t(2)))
        );
    }

    #[test]
    fn test_value_change_is_changed_not_added_removed() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let first = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut ctx);
        let later = db.query(&window_at(t(120)), &first.current, &fields(), &mut ctx);

        assert_eq!(later.diff.changed.len(), 2);
        assert!(later.diff.added.is_empty());
        assert!(later.diff.removed.is_empty());
    }

    #[test]
    fn test_arrow_flip_rebuilds_backward_schedule() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let first = db.query(&window_at(t(100)), &ResultSet::new(), &fields(), &mut ctx);
        let back = db.query(&window_at(t(90)), &first.current, &fields(), &mut ctx);

        assert_eq!(ctx.direction(), Direction::Backward);
        assert_eq!(back.diff.changed.len(), 2);
        assert_eq!(ctx.schedule().len(Direction::Backward), 2);
        assert_eq!(ctx.schedule().len(Direction::Forward), 0);
        assert!(ctx.schedule().next_due(Direction::Backward).unwrap() < t(90));
    }

    #[test]
    fn test_viewer_move_without_time_change_reports_nothing() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let first = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut ctx);

        let mut moved = window_at(t(0));
        moved.lower_left = Vector3d::new(10.0, 10.0, 0.0);
        let outcome = db.query(&moved, &first.current, &fields(), &mut ctx);
        assert!(outcome.diff.is_empty());
        assert_eq!(outcome.current.len(), 2);
    }

    #[test]
    fn test_reload_removes_departed_objects() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let first = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut ctx);

        db.reload(vec![Arc::new(Drifter { key: "fast", speed: 10_000_000.0 })]);
        let outcome = db.query(&window_at(t(1)), &first.current, &fields(), &mut ctx);

        assert_eq!(outcome.diff.removed.len(), 1);
        assert!(outcome.diff.removed.contains(&HandleId::from_key("still")));
        assert_eq!(outcome.current.len(), 1);
        assert!(outcome.diff.added.is_disjoint(&outcome.diff.removed));
    }

    #[test]
    fn test_contexts_are_independent() {
        let db = CalcDb::new("sats", objects());
        let mut a = OrbitalContext::default();
        let mut b = OrbitalContext::default();
        let first_a = db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut a);
        db.query(&window_at(t(0)), &ResultSet::new(), &fields(), &mut b);
        db.query(&window_at(t(10)), &first_a.current, &fields(), &mut a);

        assert_eq!(a.queries(), 2);
        assert_eq!(b.queries(), 1);
    }

    #[test]
    fn test_empty_fields_short_circuits() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let outcome = db.query(&window_at(t(0)), &ResultSet::new(), &FieldNames::new(), &mut ctx);
        assert!(outcome.current.is_empty());
        assert_eq!(ctx.queries(), 0);
    }

    #[test]
    fn test_fields_are_restricted() {
        let db = CalcDb::new("sats", objects());
        let mut ctx = OrbitalContext::default();
        let outcome = db.query(
            &window_at(t(0)),
            &ResultSet::new(),
            &field_names([names::MAPNAME]),
            &mut ctx,
        );
        for handle in &outcome.current {
            assert_eq!(handle.fields().len(), 1);
        }
    }
}
