//! The contract every data source implements.

use std::collections::BTreeSet;

use super::{QueryOutcome, ResultSet, SpatiotemporalWindow};

/// Names of the fields a client asked for.
///
/// An empty set means "no interest", not "all fields".
pub type FieldNames = BTreeSet<String>;

/// A data source that answers spatiotemporal queries with incremental diffs.
///
/// Implementations never fail: backing-store faults are logged and degrade to
/// an empty answer for that tick, so a polling loop is never stalled.
///
/// `Context` is the per-client scratchpad. The caller creates it with
/// `Default` on first use, passes the same value to every subsequent query of
/// that client and drops it when the client disconnects. It is never shared
/// between clients.
pub trait Queryable: Send + Sync {
    type Context: Default + Send;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Computes the complete answer for `window` and its diff against
    /// `previous`.
    fn query(
        &self,
        window: &SpatiotemporalWindow,
        previous: &ResultSet,
        fields: &FieldNames,
        context: &mut Self::Context,
    ) -> QueryOutcome;
}

/// Builds a [`FieldNames`] set from string slices.
pub fn field_names<I, S>(names: I) -> FieldNames
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}
