//! Per-identity tallies and averages
//!
//! Computed from scratch on every call from the filtered records handed in;
//! nothing is kept between calls.

use super::identity::{resolve_actor, DisplayPolicy, ManagerRoster, ViewerContext};
use crate::filter::ActivityCounts;
use crate::record::Record;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use std::cmp::Ordering;

/// Inputs of one statistics computation
#[derive(Debug, Clone, Copy)]
pub struct StatisticsRequest<'a> {
    pub viewer: &'a ViewerContext,
    pub policy: &'a DisplayPolicy,
    pub roster: &'a ManagerRoster,
    /// View whose average to report (`"Deleted"` for records without one)
    pub selected_view: Option<&'a str>,
}

/// Activity tally of one identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTally {
    pub identity_id: String,
    /// Resolved display name
    pub display: String,
    #[serde(flatten)]
    pub counts: ActivityCounts,
}

/// Mean per-identity tallies, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Averages {
    pub read: f64,
    pub modified: f64,
    pub created: f64,
    pub total: f64,
}

impl Averages {
    /// `sum / max(1, identities)` per field
    pub fn from_tallies<'t, I>(tallies: I) -> Self
    where
        I: IntoIterator<Item = &'t ActivityTally>,
    {
        let mut sum = ActivityCounts::default();
        let mut identities = 0usize;
        for tally in tallies {
            sum += tally.counts;
            identities += 1;
        }
        let denominator = identities.max(1) as f64;

        Averages {
            read: round2(sum.read as f64 / denominator),
            modified: round2(sum.modified as f64 / denominator),
            created: round2(sum.created as f64 / denominator),
            total: round2(sum.total as f64 / denominator),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Result of [`compute_statistics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// One row per identity in the filtered records, first-seen order
    pub rows: Vec<ActivityTally>,
    pub selected_total: ActivityCounts,
    pub class_average: Averages,
    /// Absent when no view is selected or no filtered record is in it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_average: Option<Averages>,
    pub distinct_identities: usize,
}

/// Row ordering for ranking panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallySort {
    #[default]
    Total,
    Read,
    Modified,
    Created,
    Name,
}

impl TallySort {
    /// Counts descending (ties by name), or names ascending
    pub fn compare(&self, a: &ActivityTally, b: &ActivityTally) -> Ordering {
        let by_count = |f: fn(&ActivityCounts) -> u64| f(&b.counts).cmp(&f(&a.counts));
        let primary = match self {
            TallySort::Total => by_count(|c| c.total),
            TallySort::Read => by_count(|c| c.read),
            TallySort::Modified => by_count(|c| c.modified),
            TallySort::Created => by_count(|c| c.created),
            TallySort::Name => Ordering::Equal,
        };
        primary.then_with(|| a.display.cmp(&b.display))
    }
}

pub fn sort_tallies(rows: &mut [ActivityTally], sort: TallySort) {
    rows.sort_by(|a, b| sort.compare(a, b));
}

/// Tally records per actor, applying manager exclusion
pub fn tally_records<'r, I>(records: I, request: &StatisticsRequest<'_>) -> Vec<ActivityTally>
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut tallies: IndexMap<&str, ActivityTally, FxBuildHasher> = IndexMap::default();

    for record in records {
        if request.policy.hide_managers && request.roster.is_manager(record) {
            continue;
        }
        tallies
            .entry(record.from_id.as_str())
            .or_insert_with(|| ActivityTally {
                identity_id: record.from_id.clone(),
                display: resolve_actor(record, request.viewer, request.policy).to_string(),
                counts: ActivityCounts::default(),
            })
            .counts
            .record(record.activity);
    }

    tallies.into_values().collect()
}

/// Compute rows, selected total and averages.
///
/// `filtered` are the records passing the current cross-filter; `all` is
/// the full store. The class average ignores the cross-filter but honours
/// manager exclusion and the selected view.
pub fn compute_statistics<'r, A>(filtered: &[&'r Record], all: A, request: &StatisticsRequest<'_>) -> Statistics
where
    A: IntoIterator<Item = &'r Record>,
{
    let rows = tally_records(filtered.iter().copied(), request);

    let mut selected_total = ActivityCounts::default();
    for row in &rows {
        selected_total += row.counts;
    }

    let in_view = |record: &&Record| match request.selected_view {
        Some(view) => record.view_or_deleted() == view,
        None => true,
    };

    let class_rows = tally_records(all.into_iter().filter(in_view), request);
    let class_average = Averages::from_tallies(&class_rows);

    let view_average = request.selected_view.and_then(|_| {
        let view_rows = tally_records(filtered.iter().copied().filter(in_view), request);
        if view_rows.is_empty() {
            None
        } else {
            Some(Averages::from_tallies(&view_rows))
        }
    });

    Statistics {
        distinct_identities: rows.len(),
        rows,
        selected_total,
        class_average,
        view_average,
    }
}
