//! Record store
//!
//! Holds the immutable batch of activity records for one analysis session
//! and derives the calendar buckets used by the time dimensions.

pub mod store;
pub mod types;

pub use store::{RecordError, RecordResult, RecordSnapshot, RecordStore};
pub use types::{ActivityType, BucketConfig, RawEvent, Record, RecordId, TimeBuckets, WeekStart, DELETED_VIEW};
