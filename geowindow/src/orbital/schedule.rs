//! Dual forward/backward recalculation schedule.
//!
//! ```text
//!   forward:  t+1s ──► [a, b]     due when the key is before now
//!             t+9s ──► [c]
//!
//!   backward: t-9s ──► [c]        due when the key is after now
//!             t-1s ──► [a, b]
//! ```
//!
//! Only the schedule matching the client's temporal direction is in use at
//! any time. Buckets are never empty, and ids in a bucket keep insertion
//! order.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::spatiotemporal::HandleId;

/// Direction in which a client's time is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Direction of travel from `previous` to `current`.
    ///
    /// Standing still counts as forward.
    pub fn between(previous: DateTime<Utc>, current: DateTime<Utc>) -> Self {
        if previous > current {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Moves `time` by `secs` in this direction.
    pub fn advance(self, time: DateTime<Utc>, secs: u32) -> DateTime<Utc> {
        let step = Duration::seconds(i64::from(secs));
        match self {
            Direction::Forward => time + step,
            Direction::Backward => time - step,
        }
    }
}

type Buckets = BTreeMap<DateTime<Utc>, Vec<HandleId>>;

/// Time-ordered buckets of object ids awaiting recalculation.
#[derive(Debug, Clone, Default)]
pub struct RecalculationSchedule {
    forward: Buckets,
    backward: Buckets,
}

impl RecalculationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn buckets(&self, direction: Direction) -> &Buckets {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn buckets_mut(&mut self, direction: Direction) -> &mut Buckets {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    /// Empties both schedules.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    /// Appends `id` to the bucket at `at`.
    pub fn schedule(&mut self, direction: Direction, at: DateTime<Utc>, id: HandleId) {
        self.buckets_mut(direction).entry(at).or_default().push(id);
    }

    /// Removes and returns the next bucket due at `now`, if any.
    ///
    /// Forward buckets are due when their time is strictly before `now`,
    /// earliest first. Backward buckets are due when their time is strictly
    /// after `now`, latest first.
    pub fn pop_due(
        &mut self,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, Vec<HandleId>)> {
        let buckets = self.buckets_mut(direction);
        match direction {
            Direction::Forward => {
                let entry = buckets.first_entry()?;
                if *entry.key() < now {
                    Some(entry.remove_entry())
                } else {
                    None
                }
            }
            Direction::Backward => {
                let entry = buckets.last_entry()?;
                if *entry.key() > now {
                    Some(entry.remove_entry())
                } else {
                    None
                }
            }
        }
    }

    /// Time of the next bucket in `direction`.
    pub fn next_due(&self, direction: Direction) -> Option<DateTime<Utc>> {
        let buckets = self.buckets(direction);
        match direction {
            Direction::Forward => buckets.keys().next().copied(),
            Direction::Backward => buckets.keys().next_back().copied(),
        }
    }

    /// Number of scheduled ids in `direction`.
    pub fn len(&self, direction: Direction) -> usize {
        self.buckets(direction).values().map(Vec::len).sum()
    }

    /// Number of buckets in `direction`.
    pub fn bucket_count(&self, direction: Direction) -> usize {
        self.buckets(direction).len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
    }

    fn id(n: u64) -> HandleId {
        HandleId::from_raw(n)
    }

    #[test]
    fn test_direction_between() {
        assert_eq!(Direction::between(t(0), t(1)), Direction::Forward);
        assert_eq!(Direction::between(t(0), t(0)), Direction::Forward);
        assert_eq!(Direction::between(t(1), t(0)), Direction::Backward);
        assert_eq!(Direction::Backward.advance(t(10), 3), t(7));
    }

    #[test]
    fn test_forward_pops_strictly_before_now_in_order() {
        let mut schedule = RecalculationSchedule::new();
        schedule.schedule(Direction::Forward, t(5), id(3));
        schedule.schedule(Direction::Forward, t(1), id(1));
        schedule.schedule(Direction::Forward, t(1), id(2));
        schedule.schedule(Direction::Forward, t(9), id(4));

        assert_eq!(schedule.pop_due(Direction::Forward, t(5)), Some((t(1), vec![id(1), id(2)])));
        // t(5) is not strictly before t(5)
        assert_eq!(schedule.pop_due(Direction::Forward, t(5)), None);
        assert_eq!(schedule.pop_due(Direction::Forward, t(6)), Some((t(5), vec![id(3)])));
        assert_eq!(schedule.len(Direction::Forward), 1);
        assert_eq!(schedule.next_due(Direction::Forward), Some(t(9)));
    }

    #[test]
    fn test_backward_pops_latest_after_now() {
        let mut schedule = RecalculationSchedule::new();
        schedule.schedule(Direction::Backward, t(-10), id(1));
        schedule.schedule(Direction::Backward, t(-2), id(2));
        schedule.schedule(Direction::Backward, t(-5), id(3));

        assert_eq!(schedule.pop_due(Direction::Backward, t(-6)), Some((t(-2), vec![id(2)])));
        assert_eq!(schedule.pop_due(Direction::Backward, t(-6)), Some((t(-5), vec![id(3)])));
        assert_eq!(schedule.pop_due(Direction::Backward, t(-6)), None);
        assert_eq!(schedule.next_due(Direction::Backward), Some(t(-10)));
    }

    #[test]
    fn test_directions_are_independent() {
        let mut schedule = RecalculationSchedule::new();
        schedule.schedule(Direction::Forward, t(1), id(1));
        assert_eq!(schedule.pop_due(Direction::Backward, t(0)), None);
        assert_eq!(schedule.bucket_count(Direction::Backward), 0);
        schedule.clear();
        assert!(schedule.is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_no_empty_buckets_and_nothing_lost(
                entries in prop::collection::vec((0i64..50, 0u64..1000), 0..80),
                now in 0i64..60,
            ) {
                let mut schedule = RecalculationSchedule::new();
                for (at, n) in &entries {
                    schedule.schedule(Direction::Forward, t(*at), id(*n));
                }
                let mut popped = 0;
                while let Some((at, ids)) = schedule.pop_due(Direction::Forward, t(now)) {
                    prop_assert!(!ids.is_empty());
                    prop_assert!(at < t(now));
                    popped += ids.len();
                }
                prop_assert_eq!(popped + schedule.len(Direction::Forward), entries.len());
                if let Some(next) = schedule.next_due(Direction::Forward) {
                    prop_assert!(next >= t(now));
                }
            }
        }
    }
}
