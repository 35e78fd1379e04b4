//! Incremental group reducers
//!
//! A reducer folds records into a per-key accumulator. `remove` must undo
//! `add` exactly: the index relies on it to apply only the records whose
//! liveness flipped instead of rebuilding groups from scratch.

use crate::record::{ActivityType, Record};
use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;

/// Add/remove/initial triple maintaining one group value per key
pub trait Reducer: Send + Sync + 'static {
    type Value: Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static;

    fn initial(&self) -> Self::Value;

    fn add(&self, value: &mut Self::Value, record: &Record);

    /// Exact inverse of [`Reducer::add`] for a previously added record
    fn remove(&self, value: &mut Self::Value, record: &Record);
}

/// Number of live records per key
#[derive(Debug, Clone, Copy, Default)]
pub struct CountReducer;

impl Reducer for CountReducer {
    type Value = u64;

    fn initial(&self) -> u64 {
        0
    }

    fn add(&self, value: &mut u64, _record: &Record) {
        *value += 1;
    }

    fn remove(&self, value: &mut u64, _record: &Record) {
        *value -= 1;
    }
}

/// Running read/modified/created/total tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub read: u64,
    pub modified: u64,
    pub created: u64,
    pub total: u64,
}

impl ActivityCounts {
    pub fn record(&mut self, activity: ActivityType) {
        *self.slot(activity) += 1;
        self.total += 1;
    }

    pub fn unrecord(&mut self, activity: ActivityType) {
        *self.slot(activity) -= 1;
        self.total -= 1;
    }

    pub fn get(&self, activity: ActivityType) -> u64 {
        match activity {
            ActivityType::Read => self.read,
            ActivityType::Modified => self.modified,
            ActivityType::Created => self.created,
        }
    }

    fn slot(&mut self, activity: ActivityType) -> &mut u64 {
        match activity {
            ActivityType::Read => &mut self.read,
            ActivityType::Modified => &mut self.modified,
            ActivityType::Created => &mut self.created,
        }
    }
}

impl AddAssign for ActivityCounts {
    fn add_assign(&mut self, other: Self) {
        self.read += other.read;
        self.modified += other.modified;
        self.created += other.created;
        self.total += other.total;
    }
}

/// Groups records into [`ActivityCounts`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityCountsReducer;

impl Reducer for ActivityCountsReducer {
    type Value = ActivityCounts;

    fn initial(&self) -> ActivityCounts {
        ActivityCounts::default()
    }

    fn add(&self, value: &mut ActivityCounts, record: &Record) {
        value.record(record.activity);
    }

    fn remove(&self, value: &mut ActivityCounts, record: &Record) {
        value.unrecord(record.activity);
    }
}

/// Integer sum of a record projection
pub struct SumReducer<F> {
    value_fn: F,
}

impl<F> SumReducer<F>
where
    F: Fn(&Record) -> i64 + Send + Sync + 'static,
{
    pub fn new(value_fn: F) -> Self {
        SumReducer { value_fn }
    }
}

impl<F> Reducer for SumReducer<F>
where
    F: Fn(&Record) -> i64 + Send + Sync + 'static,
{
    type Value = i64;

    fn initial(&self) -> i64 {
        0
    }

    fn add(&self, value: &mut i64, record: &Record) {
        *value += (self.value_fn)(record);
    }

    fn remove(&self, value: &mut i64, record: &Record) {
        *value -= (self.value_fn)(record);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::{BucketConfig, RawEvent, RecordId};

    pub(crate) fn record(activity: ActivityType, body: &str) -> Record {
        Record::from_raw(
            RawEvent {
                id: RecordId::new("r"),
                activity,
                when: 0,
                from: "Alice".to_string(),
                from_id: "u1".to_string(),
                from_pseudo: "Otter".to_string(),
                to: None,
                to_pseudo: None,
                title: String::new(),
                view: None,
                body: body.to_string(),
            },
            &BucketConfig::default(),
        )
        .unwrap()
    }

    fn assert_inverse<R: Reducer>(reducer: &R, start: R::Value, records: &[Record]) {
        for r in records {
            let mut acc = start.clone();
            reducer.add(&mut acc, r);
            reducer.remove(&mut acc, r);
            assert_eq!(acc, start);
        }
    }

    #[test]
    fn test_reducers_are_inverse() {
        let records: Vec<Record> = ActivityType::ALL.iter().map(|&a| record(a, "<p>hi</p>")).collect();

        assert_inverse(&CountReducer, 0, &records);
        assert_inverse(&CountReducer, 5, &records);
        assert_inverse(
            &ActivityCountsReducer,
            ActivityCounts { read: 2, modified: 1, created: 0, total: 3 },
            &records,
        );
        assert_inverse(&SumReducer::new(|r: &Record| r.body.len() as i64), 40, &records);
    }

    #[test]
    fn test_activity_counts() {
        let reducer = ActivityCountsReducer;
        let mut acc = reducer.initial();
        assert_eq!(acc, ActivityCounts::default());

        reducer.add(&mut acc, &record(ActivityType::Read, ""));
        reducer.add(&mut acc, &record(ActivityType::Read, ""));
        reducer.add(&mut acc, &record(ActivityType::Created, ""));

        assert_eq!(acc, ActivityCounts { read: 2, modified: 0, created: 1, total: 3 });
        assert_eq!(acc.get(ActivityType::Read), 2);
    }
}
