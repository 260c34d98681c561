//! The set-difference queryable shared by all lookups.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::spatiotemporal::{
    FieldNames, QueryOutcome, Queryable, ResultHandle, ResultSet, SpatiotemporalWindow,
};
use crate::store::{BoundingBox, Feature, SpatialQuery, SpatialStore};

/// Domain-specific half of a lookup: which query to run and how to turn a
/// row into a handle.
pub trait LookupSource: Send + Sync {
    /// Layer queried in the backing store.
    fn layer(&self) -> &str;

    /// Builds the range query for a window.
    fn spatial_query(&self, window: &SpatiotemporalWindow) -> SpatialQuery {
        SpatialQuery::new(self.layer(), BoundingBox::from_window(window))
    }

    /// Converts one row, emitting only the requested fields.
    fn materialize(&self, feature: &Feature, fields: &FieldNames) -> ResultHandle;
}

/// A queryable that diffs each tick's range query against the previous
/// answer.
pub struct SetDiffQueryable<S: LookupSource> {
    name: String,
    store: Arc<dyn SpatialStore>,
    source: S,
}

impl<S: LookupSource> SetDiffQueryable<S> {
    pub fn new(name: impl Into<String>, store: Arc<dyn SpatialStore>, source: S) -> Self {
        Self {
            name: name.into(),
            store,
            source,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: LookupSource> Queryable for SetDiffQueryable<S> {
    type Context = ();

    fn name(&self) -> &str {
        &self.name
    }

    fn query(
        &self,
        window: &SpatiotemporalWindow,
        previous: &ResultSet,
        fields: &FieldNames,
        _context: &mut (),
    ) -> QueryOutcome {
        if fields.is_empty() {
            debug!(queryable = %self.name, "No fields requested, skipping query");
            return QueryOutcome::unchanged(previous);
        }

        let query = self.source.spatial_query(window);
        let current: ResultSet = match self.store.fetch(&query) {
            Ok(rows) => rows
                .iter()
                .map(|row| self.source.materialize(row, fields))
                .collect(),
            Err(e) => {
                error!(
                    queryable = %self.name,
                    store = %self.store.describe(),
                    error = %e,
                    "Store query failed, answering with no results"
                );
                ResultSet::new()
            }
        };

        let outcome = QueryOutcome::from_sets(previous, current);
        info!(
            queryable = %self.name,
            lower_left = %window.lower_left,
            extent = %window.extent,
            results = outcome.current.len(),
            added = outcome.diff.added.len(),
            removed = outcome.diff.removed.len(),
            "Query complete"
        );
        outcome
    }
}
