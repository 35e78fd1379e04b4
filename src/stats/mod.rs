//! Derived statistics
//!
//! Per-identity tallies and class/view averages over the filtered records,
//! with name and manager policies applied as a projection on top of the
//! cross-filter rather than as dimensions of it.

pub mod identity;
pub mod statistics;

pub use identity::{resolve_actor, resolve_target, DisplayPolicy, ManagerRoster, Role, ViewerContext};
pub use statistics::{
    compute_statistics, sort_tallies, tally_records, ActivityTally, Averages, Statistics, StatisticsRequest, TallySort,
};
