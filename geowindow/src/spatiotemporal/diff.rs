//! Result diffs.

use serde::Serialize;

use super::{ResultHandle, ResultSet};

/// The added/removed/changed partitions of one diff tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultDiff {
    pub added: ResultSet,
    pub removed: ResultSet,
    pub changed: ResultSet,
}

impl ResultDiff {
    /// Set difference by identity: `added = current − previous`,
    /// `removed = previous − current`, nothing changed.
    pub fn between(previous: &ResultSet, current: &ResultSet) -> Self {
        Self {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(current).cloned().collect(),
            changed: ResultSet::new(),
        }
    }

    /// A diff that reports every handle in `current` as added.
    pub fn initial(current: &ResultSet) -> Self {
        Self {
            added: current.clone(),
            ..Self::default()
        }
    }

    /// True when no partition has entries.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of entries across all partitions.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// What one query invocation returns: the complete answer and its diff.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub current: ResultSet,
    pub diff: ResultDiff,
}

impl QueryOutcome {
    /// Computes the diff of `current` against `previous`.
    pub fn from_sets(previous: &ResultSet, current: ResultSet) -> Self {
        let diff = ResultDiff::between(previous, &current);
        Self { current, diff }
    }

    /// Leaves the previous answer in place with an empty diff.
    pub fn unchanged(previous: &ResultSet) -> Self {
        Self {
            current: previous.clone(),
            diff: ResultDiff::default(),
        }
    }

    /// Iterates over current handles that are neither added nor changed.
    pub fn unchanged_current(&self) -> impl Iterator<Item = &ResultHandle> {
        self.current
            .iter()
            .filter(|h| !self.diff.added.contains(*h) && !self.diff.changed.contains(*h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[&str]) -> ResultSet {
        keys.iter().map(|k| ResultHandle::keyed(k)).collect()
    }

    #[test]
    fn test_between() {
        let diff = ResultDiff::between(&set(&["a", "b"]), &set(&["b", "c"]));
        assert_eq!(diff.added, set(&["c"]));
        assert_eq!(diff.removed, set(&["a"]));
        assert!(diff.changed.is_empty());
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn test_between_identical_is_empty() {
        assert!(ResultDiff::between(&set(&["a"]), &set(&["a"])).is_empty());
    }

    #[test]
    fn test_unchanged_keeps_previous() {
        let previous = set(&["a", "b"]);
        let outcome = QueryOutcome::unchanged(&previous);
        assert_eq!(outcome.current, previous);
        assert!(outcome.diff.is_empty());
    }

    #[test]
    fn test_initial_reports_everything_added() {
        let current = set(&["a", "b"]);
        let diff = ResultDiff::initial(&current);
        assert_eq!(diff.added, current);
        assert!(diff.removed.is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn keys() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(0u8..40, 0..30)
        }

        fn to_set(keys: &[u8]) -> ResultSet {
            keys.iter()
                .map(|k| ResultHandle::keyed(&k.to_string()))
                .collect()
        }

        proptest! {
            #[test]
            fn prop_diff_partitions_are_consistent(previous in keys(), current in keys()) {
                let previous = to_set(&previous);
                let outcome = QueryOutcome::from_sets(&previous, to_set(&current));

                prop_assert!(outcome.diff.added.is_disjoint(&outcome.diff.removed));
                for handle in &outcome.diff.removed {
                    prop_assert!(!outcome.current.contains(handle));
                }
                let rebuilt: ResultSet = outcome
                    .diff
                    .added
                    .iter()
                    .chain(outcome.unchanged_current())
                    .cloned()
                    .collect();
                prop_assert_eq!(rebuilt, outcome.current.clone());
            }
        }
    }
}
