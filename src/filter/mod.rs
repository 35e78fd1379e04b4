//! Cross-filter engine
//!
//! Dimensions project records onto keys, filters restrict those keys, and
//! groups keep incrementally maintained aggregates per key. Each group
//! reflects every active filter except the one on its own dimension.

pub mod group;
pub mod index;
pub mod key;
pub mod predicate;
pub mod reducer;

pub use group::{DimensionId, GroupId, GroupRow};
pub use index::{
    CrossFilter, CrossFilterError, CrossFilterResult, DimensionHandle, FilterChange, GroupHandle, MAX_DIMENSIONS,
};
pub use key::DimensionKey;
pub use predicate::FilterPredicate;
pub use reducer::{ActivityCounts, ActivityCountsReducer, CountReducer, Reducer, SumReducer};
