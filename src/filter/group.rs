//! Group storage
//!
//! A group keeps one reducer value per group key. Keys are seeded from
//! every record when the group is created, so each record maps to a fixed
//! slot and row order is first-seen order for the life of the group.
//! Each slot also counts its live records; a row is empty when that count
//! is zero, whatever its value.

use super::key::DimensionKey;
use super::reducer::Reducer;
use crate::record::Record;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// Maps a dimension key onto the (possibly coarser) group key
pub type GroupKeyFn = Box<dyn Fn(&DimensionKey) -> DimensionKey + Send + Sync>;

/// Index of a dimension within its cross-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DimensionId(pub usize);

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DimensionId({})", self.0)
    }
}

/// Index of a group within its cross-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

/// One aggregate row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow<V> {
    pub key: DimensionKey,
    pub value: V,
}

/// Type-erased group, as stored by the index
pub(crate) trait GroupState: Send + Sync {
    fn dimension(&self) -> DimensionId;

    /// Fold record `idx` into its slot
    fn add(&mut self, idx: usize, record: &Record);

    /// Undo a previous `add` of record `idx`
    fn remove(&mut self, idx: usize, record: &Record);

    fn rows_json(&self, include_empty: bool) -> Vec<GroupRow<serde_json::Value>>;

    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct Group<R: Reducer> {
    dimension: DimensionId,
    reducer: R,
    values: IndexMap<DimensionKey, R::Value, FxBuildHasher>,
    /// Slot in `values` for every record of the store
    slots: Vec<usize>,
    /// Live records folded into each slot of `values`
    live: Vec<u64>,
}

impl<R: Reducer> Group<R> {
    /// Seed keys (all initial) from the dimension keys of every record
    pub(crate) fn new(
        dimension: DimensionId,
        reducer: R,
        key_fn: Option<&GroupKeyFn>,
        dimension_keys: &[DimensionKey],
    ) -> Self {
        let mut values: IndexMap<DimensionKey, R::Value, FxBuildHasher> = IndexMap::default();
        let mut slots = Vec::with_capacity(dimension_keys.len());

        for key in dimension_keys {
            let group_key = match key_fn {
                Some(f) => f(key),
                None => key.clone(),
            };
            let entry = values.entry(group_key);
            slots.push(entry.index());
            entry.or_insert_with(|| reducer.initial());
        }

        let live = vec![0; values.len()];
        Group {
            dimension,
            reducer,
            values,
            slots,
            live,
        }
    }

    /// Slots in first-seen order, skipping those without live records
    /// unless `include_empty` is set
    fn visible(&self, include_empty: bool) -> impl Iterator<Item = (&DimensionKey, &R::Value)> + '_ {
        self.values
            .iter()
            .zip(&self.live)
            .filter(move |(_, n)| include_empty || **n > 0)
            .map(|(kv, _)| kv)
    }

    pub(crate) fn rows(&self, include_empty: bool) -> Vec<GroupRow<R::Value>> {
        self.visible(include_empty)
            .map(|(k, v)| GroupRow {
                key: k.clone(),
                value: v.clone(),
            })
            .collect()
    }

    pub(crate) fn value(&self, key: &DimensionKey) -> Option<&R::Value> {
        self.values.get(key)
    }
}

impl<R: Reducer> GroupState for Group<R> {
    fn dimension(&self) -> DimensionId {
        self.dimension
    }

    fn add(&mut self, idx: usize, record: &Record) {
        let slot = self.slots[idx];
        if let Some((_, value)) = self.values.get_index_mut(slot) {
            self.reducer.add(value, record);
            self.live[slot] += 1;
        }
    }

    fn remove(&mut self, idx: usize, record: &Record) {
        let slot = self.slots[idx];
        if let Some((_, value)) = self.values.get_index_mut(slot) {
            self.reducer.remove(value, record);
            self.live[slot] -= 1;
        }
    }

    fn rows_json(&self, include_empty: bool) -> Vec<GroupRow<serde_json::Value>> {
        self.visible(include_empty)
            .map(|(k, v)| GroupRow {
                key: k.clone(),
                value: serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
