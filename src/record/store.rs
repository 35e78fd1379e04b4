//! Immutable record store for one analysis session

use super::types::{BucketConfig, RawEvent, Record, RecordId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading records
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record {id} has an out-of-range timestamp: {when}")]
    InvalidTimestamp { id: RecordId, when: i64 },

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("Failed to parse activity events: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Ordered, immutable batch of activity records
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    buckets: BucketConfig,
}

impl RecordStore {
    /// Build a store from raw events, deriving time buckets.
    ///
    /// Either every event loads or none does.
    pub fn from_raw(events: Vec<RawEvent>, config: &BucketConfig) -> RecordResult<Self> {
        let records = events
            .into_iter()
            .map(|raw| Record::from_raw(raw, config))
            .collect::<RecordResult<Vec<_>>>()?;

        info!("Loaded {} activity records", records.len());
        Ok(RecordStore {
            records,
            buckets: config.clone(),
        })
    }

    /// Parse a JSON array of raw events and build a store from it
    pub fn from_json_str(json: &str, config: &BucketConfig) -> RecordResult<Self> {
        let events: Vec<RawEvent> = serde_json::from_str(json)?;
        debug!("Parsed {} raw events", events.len());
        Self::from_raw(events, config)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bucketing the records' time buckets were derived with
    pub fn bucket_config(&self) -> &BucketConfig {
        &self.buckets
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Share the store between the index and its snapshots
    pub fn into_shared(self) -> Arc<RecordStore> {
        Arc::new(self)
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The records that were live at one point in time.
///
/// Owns a handle to the store, so it stays valid (and unchanged) while the
/// index keeps being filtered.
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    store: Arc<RecordStore>,
    indices: Arc<[usize]>,
}

impl RecordSnapshot {
    pub(crate) fn new(store: Arc<RecordStore>, indices: Vec<usize>) -> Self {
        RecordSnapshot {
            store,
            indices: indices.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.indices.iter().filter_map(move |&idx| self.store.get(idx))
    }

    pub fn to_vec(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }
}
