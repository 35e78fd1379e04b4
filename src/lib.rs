//! Crossdash
//!
//! Cross-filter and incremental aggregation engine for activity dashboards.
//! A batch of activity records is indexed once; every panel of a dashboard
//! is a dimension plus a group, and a selection on any panel refilters all
//! the others without rescanning the records.
//!
//! # Architecture
//!
//! - `record`: immutable record store with derived calendar buckets
//! - `filter`: dimensions, filter predicates, exclusion bitmasks and
//!   incrementally maintained groups
//! - `binding`: panels, selection semantics and synchronous publication
//! - `stats`: identity resolution, manager policy, tallies and averages
//! - `network`: actor interaction network (backed by `crossdash-network`)
//! - `config`: YAML/JSON session configuration
//!
//! # Guarantees
//!
//! - A group on dimension `d` reflects every filter except the one on `d`
//! - Group updates touch only the records whose filter state changed
//! - Listeners observe a consistent view of every panel after each mutation
//! - Naming policy is applied after aggregation, never inside the index
//!
//! ## Example Usage
//!
//! ```rust
//! use crossdash::{ActivityDashboard, ActivityType, BucketConfig, DashboardConfig, RecordStore};
//!
//! let json = r#"[
//!   {"id": 1, "type": "read", "when": 0, "from": "Alice", "fromId": "u1",
//!    "fromPseudo": "Otter", "to": "Bob", "toPseudo": "Heron", "view": "Math"},
//!   {"id": 2, "type": "created", "when": 0, "from": "Bob", "fromId": "u2",
//!    "fromPseudo": "Heron", "view": "Math"}
//! ]"#;
//!
//! let store = RecordStore::from_json_str(json, &BucketConfig::default()).unwrap();
//! let mut dashboard = ActivityDashboard::build(store.into_shared(), &DashboardConfig::default()).unwrap();
//!
//! dashboard.select_type(ActivityType::Read).unwrap();
//! assert_eq!(dashboard.dashboard().filtered_count(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod config;
pub mod filter;
pub mod network;
pub mod record;
pub mod stats;

// Re-export main types for convenience
pub use binding::{
    ActivityDashboard, Dashboard, DashboardError, DashboardEvent, DashboardListener, DashboardResult, DashboardView,
    Granularity, Panel, PanelId, PanelKind, PanelView,
};

pub use config::{ConfigError, ConfigResult, DashboardConfig};

pub use filter::{
    ActivityCounts, ActivityCountsReducer, CountReducer, CrossFilter, CrossFilterError, CrossFilterResult,
    DimensionHandle, DimensionKey, FilterChange, FilterPredicate, GroupHandle, GroupRow, Reducer, SumReducer,
};

pub use network::{network_from_records, ActorNetwork, NetworkConfig, NetworkEdge, NetworkNode};

pub use record::{
    ActivityType, BucketConfig, RawEvent, Record, RecordError, RecordId, RecordResult, RecordSnapshot, RecordStore,
    WeekStart,
};

pub use stats::{
    compute_statistics, ActivityTally, Averages, DisplayPolicy, ManagerRoster, Role, Statistics, StatisticsRequest,
    TallySort, ViewerContext,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
