//! Cross-filter index
//!
//! Owns the dimensions and groups over one record store. Every record
//! carries an exclusion mask with one bit per dimension (set while the
//! record fails that dimension's filter). A record is live when its mask is
//! zero; it contributes to a group on dimension `d` when its mask ignoring
//! bit `d` is zero, so a group never sees its own dimension's filter.
//!
//! Filter changes only touch the records whose bit flipped, applying
//! `add`/`remove` to the affected groups.

use super::group::{DimensionId, Group, GroupId, GroupKeyFn, GroupRow, GroupState};
use super::key::DimensionKey;
use super::predicate::FilterPredicate;
use super::reducer::Reducer;
use crate::record::{Record, RecordSnapshot, RecordStore};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Dimensions per index (one exclusion bit each)
pub const MAX_DIMENSIONS: usize = 64;

static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(1);

/// Errors that can occur when using a cross-filter index
#[derive(Error, Debug, PartialEq)]
pub enum CrossFilterError {
    #[error("{0} is not registered with this index")]
    UnknownDimension(DimensionId),

    #[error("{0} is not registered with this index")]
    UnknownGroup(GroupId),

    #[error("Handle was issued by a different cross-filter index")]
    ForeignHandle,

    #[error("Cannot register more than {0} dimensions")]
    DimensionLimitExceeded(usize),

    #[error("{0} does not hold values of the requested reducer type")]
    GroupTypeMismatch(GroupId),
}

pub type CrossFilterResult<T> = Result<T, CrossFilterError>;

/// Handle to a registered dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionHandle {
    index: u64,
    id: DimensionId,
}

impl DimensionHandle {
    pub fn id(&self) -> DimensionId {
        self.id
    }
}

/// Typed handle to a registered group
pub struct GroupHandle<R> {
    index: u64,
    id: GroupId,
    dimension: DimensionId,
    _reducer: PhantomData<fn() -> R>,
}

impl<R> GroupHandle<R> {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }
}

impl<R> Clone for GroupHandle<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GroupHandle<R> {}

impl<R> std::fmt::Debug for GroupHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupHandle")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .finish()
    }
}

/// Outcome of one filter mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChange {
    pub dimension: DimensionId,
    pub name: String,
    pub predicate: FilterPredicate,
    /// Records that started passing this dimension's filter
    pub entered: usize,
    /// Records that stopped passing this dimension's filter
    pub exited: usize,
    /// Records passing every filter after the change
    pub live: usize,
}

struct Dimension {
    name: String,
    bit: u64,
    /// Key of every record, in store order
    keys: Vec<DimensionKey>,
    predicate: FilterPredicate,
}

/// Multi-dimensional cross-filter over one record store
pub struct CrossFilter {
    id: u64,
    store: Arc<RecordStore>,
    dimensions: Vec<Dimension>,
    groups: Vec<Box<dyn GroupState>>,
    exclusions: Vec<u64>,
    live_count: usize,
}

impl CrossFilter {
    pub fn new(store: Arc<RecordStore>) -> Self {
        let len = store.len();
        CrossFilter {
            id: NEXT_INDEX_ID.fetch_add(1, AtomicOrdering::Relaxed),
            store,
            dimensions: Vec::new(),
            groups: Vec::new(),
            exclusions: vec![0; len],
            live_count: len,
        }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Register a key projection. The projection is evaluated once per
    /// record; records are immutable so the keys never go stale.
    pub fn add_dimension<F>(&mut self, name: impl Into<String>, key_fn: F) -> CrossFilterResult<DimensionHandle>
    where
        F: Fn(&Record) -> DimensionKey,
    {
        let position = self.dimensions.len();
        if position >= MAX_DIMENSIONS {
            return Err(CrossFilterError::DimensionLimitExceeded(MAX_DIMENSIONS));
        }

        let name = name.into();
        let keys: Vec<DimensionKey> = self.store.iter().map(key_fn).collect();
        debug!("Registered dimension '{}' over {} records", name, keys.len());

        self.dimensions.push(Dimension {
            name,
            bit: 1u64 << position,
            keys,
            predicate: FilterPredicate::All,
        });

        Ok(DimensionHandle {
            index: self.id,
            id: DimensionId(position),
        })
    }

    /// Group a dimension by its own keys
    pub fn group<R: Reducer>(&mut self, dimension: DimensionHandle, reducer: R) -> CrossFilterResult<GroupHandle<R>> {
        self.register_group(dimension, reducer, None)
    }

    /// Group a dimension by a key derived from the dimension key
    pub fn group_with_key<R, F>(
        &mut self,
        dimension: DimensionHandle,
        group_key_fn: F,
        reducer: R,
    ) -> CrossFilterResult<GroupHandle<R>>
    where
        R: Reducer,
        F: Fn(&DimensionKey) -> DimensionKey + Send + Sync + 'static,
    {
        let key_fn: GroupKeyFn = Box::new(group_key_fn);
        self.register_group(dimension, reducer, Some(key_fn))
    }

    fn register_group<R: Reducer>(
        &mut self,
        dimension: DimensionHandle,
        reducer: R,
        key_fn: Option<GroupKeyFn>,
    ) -> CrossFilterResult<GroupHandle<R>> {
        let dim_id = self.check_dimension(dimension)?;
        let dim = &self.dimensions[dim_id.0];
        let own_bit = dim.bit;

        let mut group = Group::new(dim_id, reducer, key_fn.as_ref(), &dim.keys);
        for (idx, record) in self.store.iter().enumerate() {
            if self.exclusions[idx] & !own_bit == 0 {
                group.add(idx, record);
            }
        }

        let id = GroupId(self.groups.len());
        debug!("Registered {} on dimension '{}'", id, dim.name);
        self.groups.push(Box::new(group));

        Ok(GroupHandle {
            index: self.id,
            id,
            dimension: dim_id,
            _reducer: PhantomData,
        })
    }

    /// Restrict a dimension to one key
    pub fn filter_exact(
        &mut self,
        dimension: DimensionHandle,
        key: impl Into<DimensionKey>,
    ) -> CrossFilterResult<FilterChange> {
        self.set_filter(dimension, FilterPredicate::Exact(key.into()))
    }

    /// Restrict a dimension to a set of keys
    pub fn filter_in<I, K>(&mut self, dimension: DimensionHandle, keys: I) -> CrossFilterResult<FilterChange>
    where
        I: IntoIterator<Item = K>,
        K: Into<DimensionKey>,
    {
        let keys: BTreeSet<DimensionKey> = keys.into_iter().map(Into::into).collect();
        self.set_filter(dimension, FilterPredicate::In(keys))
    }

    /// Restrict a dimension to the inclusive range `lo..=hi`
    pub fn filter_range(
        &mut self,
        dimension: DimensionHandle,
        lo: impl Into<DimensionKey>,
        hi: impl Into<DimensionKey>,
    ) -> CrossFilterResult<FilterChange> {
        self.set_filter(
            dimension,
            FilterPredicate::Range {
                lo: lo.into(),
                hi: hi.into(),
            },
        )
    }

    /// Clear a dimension's filter
    pub fn filter_all(&mut self, dimension: DimensionHandle) -> CrossFilterResult<FilterChange> {
        self.set_filter(dimension, FilterPredicate::All)
    }

    /// Clear every dimension's filter, returning one change per dimension
    /// that was filtered
    pub fn clear_all(&mut self) -> Vec<FilterChange> {
        let filtered: Vec<DimensionId> = self
            .dimensions
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.predicate.is_all())
            .map(|(i, _)| DimensionId(i))
            .collect();

        filtered
            .into_iter()
            .map(|id| self.apply_predicate(id, FilterPredicate::All))
            .collect()
    }

    /// Replace a dimension's predicate and bring every other dimension's
    /// groups up to date
    pub fn set_filter(
        &mut self,
        dimension: DimensionHandle,
        predicate: FilterPredicate,
    ) -> CrossFilterResult<FilterChange> {
        let id = self.check_dimension(dimension)?;
        Ok(self.apply_predicate(id, predicate))
    }

    fn apply_predicate(&mut self, id: DimensionId, predicate: FilterPredicate) -> FilterChange {
        let bit = self.dimensions[id.0].bit;
        let group_bits: Vec<Option<u64>> = self
            .groups
            .iter()
            .map(|g| {
                let gd = g.dimension();
                if gd == id {
                    None
                } else {
                    Some(self.dimensions[gd.0].bit)
                }
            })
            .collect();

        let mut entered = 0;
        let mut exited = 0;
        let dim = &self.dimensions[id.0];

        for (idx, key) in dim.keys.iter().enumerate() {
            let old_mask = self.exclusions[idx];
            let was_excluded = old_mask & bit != 0;
            let now_excluded = !predicate.accepts(key);
            if was_excluded == now_excluded {
                continue;
            }

            let new_mask = old_mask ^ bit;
            if now_excluded {
                exited += 1;
            } else {
                entered += 1;
            }

            let record = &self.store.records()[idx];
            for (group, own_bit) in self.groups.iter_mut().zip(&group_bits) {
                let Some(own_bit) = own_bit else {
                    continue;
                };
                let was_live = old_mask & !own_bit == 0;
                let is_live = new_mask & !own_bit == 0;
                match (was_live, is_live) {
                    (false, true) => group.add(idx, record),
                    (true, false) => group.remove(idx, record),
                    _ => {}
                }
            }

            if old_mask == 0 {
                self.live_count -= 1;
            } else if new_mask == 0 {
                self.live_count += 1;
            }
            self.exclusions[idx] = new_mask;
        }

        let name = dim.name.clone();
        debug!(
            "Filter on '{}' set to {}: {} entered, {} exited, {} live",
            name, predicate, entered, exited, self.live_count
        );
        self.dimensions[id.0].predicate = predicate.clone();

        FilterChange {
            dimension: id,
            name,
            predicate,
            entered,
            exited,
            live: self.live_count,
        }
    }

    /// Current predicate of a dimension
    pub fn filter(&self, dimension: DimensionHandle) -> CrossFilterResult<&FilterPredicate> {
        let id = self.check_dimension(dimension)?;
        Ok(&self.dimensions[id.0].predicate)
    }

    pub fn dimension_name(&self, dimension: DimensionHandle) -> CrossFilterResult<&str> {
        let id = self.check_dimension(dimension)?;
        Ok(&self.dimensions[id.0].name)
    }

    /// Distinct keys of a dimension, in key order
    pub fn dimension_keys(&self, dimension: DimensionHandle) -> CrossFilterResult<Vec<DimensionKey>> {
        let id = self.check_dimension(dimension)?;
        let keys: BTreeSet<&DimensionKey> = self.dimensions[id.0].keys.iter().collect();
        Ok(keys.into_iter().cloned().collect())
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Rows with at least one contributing record, in first-seen key order
    pub fn group_rows<R: Reducer>(&self, handle: &GroupHandle<R>) -> CrossFilterResult<Vec<GroupRow<R::Value>>> {
        Ok(self.typed_group(handle)?.rows(false))
    }

    /// Every row, including keys with no contributing record
    pub fn group_rows_all<R: Reducer>(&self, handle: &GroupHandle<R>) -> CrossFilterResult<Vec<GroupRow<R::Value>>> {
        Ok(self.typed_group(handle)?.rows(true))
    }

    /// Value of one group key
    pub fn group_value<R: Reducer>(
        &self,
        handle: &GroupHandle<R>,
        key: &DimensionKey,
    ) -> CrossFilterResult<Option<R::Value>> {
        Ok(self.typed_group(handle)?.value(key).cloned())
    }

    /// The `k` largest rows of [`CrossFilter::group_rows`] under `compare`, largest first
    pub fn group_top<R, F>(&self, handle: &GroupHandle<R>, k: usize, compare: F) -> CrossFilterResult<Vec<GroupRow<R::Value>>>
    where
        R: Reducer,
        F: Fn(&R::Value, &R::Value) -> Ordering,
    {
        let mut rows = self.group_rows(handle)?;
        // Stable sort keeps first-seen order among ties
        rows.sort_by(|a, b| compare(&b.value, &a.value));
        rows.truncate(k);
        Ok(rows)
    }

    /// Type-erased rows for the binding layer
    pub fn group_rows_json(&self, id: GroupId, include_empty: bool) -> CrossFilterResult<Vec<GroupRow<serde_json::Value>>> {
        self.groups
            .get(id.0)
            .map(|g| g.rows_json(include_empty))
            .ok_or(CrossFilterError::UnknownGroup(id))
    }

    /// Dimension a group was registered on
    pub fn group_dimension(&self, id: GroupId) -> CrossFilterResult<DimensionId> {
        self.groups
            .get(id.0)
            .map(|g| g.dimension())
            .ok_or(CrossFilterError::UnknownGroup(id))
    }

    fn typed_group<R: Reducer>(&self, handle: &GroupHandle<R>) -> CrossFilterResult<&Group<R>> {
        if handle.index != self.id {
            return Err(CrossFilterError::ForeignHandle);
        }
        let group = self.groups.get(handle.id.0).ok_or(CrossFilterError::UnknownGroup(handle.id))?;
        group
            .as_any()
            .downcast_ref::<Group<R>>()
            .ok_or(CrossFilterError::GroupTypeMismatch(handle.id))
    }

    fn check_dimension(&self, handle: DimensionHandle) -> CrossFilterResult<DimensionId> {
        if handle.index != self.id {
            return Err(CrossFilterError::ForeignHandle);
        }
        if handle.id.0 >= self.dimensions.len() {
            return Err(CrossFilterError::UnknownDimension(handle.id));
        }
        Ok(handle.id)
    }

    pub fn is_live(&self, idx: usize) -> bool {
        self.exclusions.get(idx).is_some_and(|&mask| mask == 0)
    }

    /// Records passing every filter, in store order
    pub fn filtered_records(&self) -> Vec<&Record> {
        self.store
            .iter()
            .zip(&self.exclusions)
            .filter(|(_, mask)| **mask == 0)
            .map(|(record, _)| record)
            .collect()
    }

    pub fn filtered_indices(&self) -> Vec<usize> {
        self.exclusions
            .iter()
            .enumerate()
            .filter(|(_, mask)| **mask == 0)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.live_count
    }

    pub fn total_count(&self) -> usize {
        self.store.len()
    }

    /// Capture the live records; later filter changes do not affect it
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot::new(Arc::clone(&self.store), self.filtered_indices())
    }
}
