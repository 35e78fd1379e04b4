//! Standard activity dashboard wiring
//!
//! Builds the type, author, timeline and view panels over one record store
//! and exposes the derived views (statistics, ranking, network) computed
//! from the currently filtered records.

use super::dashboard::{Dashboard, DashboardResult};
use super::panel::{DashboardEvent, DashboardListener, PanelId, PanelKind};
use crate::config::DashboardConfig;
use crate::filter::{ActivityCounts, ActivityCountsReducer, CrossFilter, DimensionKey, FilterPredicate, GroupHandle, GroupRow};
use crate::network::{network_from_records, ActorNetwork};
use crate::record::{ActivityType, RecordStore, TimeBuckets, WeekStart};
use crate::stats::{
    compute_statistics, sort_tallies, tally_records, ActivityTally, DisplayPolicy, ManagerRoster, Statistics,
    StatisticsRequest, TallySort, ViewerContext,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Bucket size of the timeline panel's rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

/// Dashboard over activity records with the standard panels
pub struct ActivityDashboard {
    dashboard: Dashboard,
    config: DashboardConfig,
    pub type_panel: PanelId,
    pub author_panel: PanelId,
    pub timeline_panel: PanelId,
    pub view_panel: PanelId,
    author_group: GroupHandle<ActivityCountsReducer>,
    day_group: GroupHandle<ActivityCountsReducer>,
    week_group: GroupHandle<ActivityCountsReducer>,
    month_group: GroupHandle<ActivityCountsReducer>,
}

/// Week bucket of a day key, computed exactly as `TimeBuckets::week`
fn week_key(key: &DimensionKey, week_start: WeekStart) -> DimensionKey {
    key.as_date()
        .and_then(|day| week_start.week_of(day))
        .map(DimensionKey::Date)
        .unwrap_or_else(|| key.clone())
}

fn month_key(key: &DimensionKey) -> DimensionKey {
    key.as_date()
        .and_then(TimeBuckets::month_of)
        .map(DimensionKey::Date)
        .unwrap_or_else(|| key.clone())
}

impl ActivityDashboard {
    /// Wire the standard panels. Week buckets follow the store's
    /// bucketing; `config.buckets` only matters when loading a store.
    pub fn build(store: Arc<RecordStore>, config: &DashboardConfig) -> DashboardResult<Self> {
        let week_start = store.bucket_config().week_start;
        if store.bucket_config() != &config.buckets {
            warn!("Store was bucketed with {:?}, not the dashboard's {:?}", store.bucket_config(), config.buckets);
        }
        let mut cf = CrossFilter::new(store);

        let types = cf.add_dimension("type", |r| r.activity.as_str().into())?;
        let authors = cf.add_dimension("author", |r| r.from_id.clone().into())?;
        let days = cf.add_dimension("day", |r| r.buckets.day.into())?;
        let views = cf.add_dimension("view", |r| r.view_or_deleted().into())?;

        let type_group = cf.group(types, ActivityCountsReducer)?;
        let author_group = cf.group(authors, ActivityCountsReducer)?;
        let day_group = cf.group(days, ActivityCountsReducer)?;
        let week_group = cf.group_with_key(days, move |k| week_key(k, week_start), ActivityCountsReducer)?;
        let month_group = cf.group_with_key(days, month_key, ActivityCountsReducer)?;
        let view_group = cf.group(views, ActivityCountsReducer)?;

        let mut dashboard = Dashboard::new(cf);
        let type_panel = dashboard.add_panel("type", PanelKind::Categorical, types, type_group.id())?;
        let author_panel = dashboard.add_panel("author", PanelKind::Categorical, authors, author_group.id())?;
        let timeline_panel = dashboard.add_panel("timeline", PanelKind::Range, days, day_group.id())?;
        let view_panel = dashboard.add_panel("view", PanelKind::Categorical, views, view_group.id())?;

        info!(
            "Built activity dashboard over {} records with {} panels",
            dashboard.index().total_count(),
            dashboard.panels().len()
        );

        Ok(ActivityDashboard {
            dashboard,
            config: config.clone(),
            type_panel,
            author_panel,
            timeline_panel,
            view_panel,
            author_group,
            day_group,
            week_group,
            month_group,
        })
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Mutable access for selections on arbitrary panels
    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: DashboardListener + 'static,
    {
        self.dashboard.subscribe(listener);
    }

    pub fn select_type(&mut self, activity: ActivityType) -> DashboardResult<DashboardEvent> {
        self.dashboard.select(self.type_panel, activity.as_str())
    }

    /// Select an author by actor id
    pub fn select_author(&mut self, from_id: &str) -> DashboardResult<DashboardEvent> {
        self.dashboard.select(self.author_panel, from_id)
    }

    pub fn select_view(&mut self, view: &str) -> DashboardResult<DashboardEvent> {
        self.dashboard.select(self.view_panel, view)
    }

    /// Brush the timeline to the inclusive day range `from..=to`
    pub fn select_days(&mut self, from: NaiveDate, to: NaiveDate) -> DashboardResult<DashboardEvent> {
        self.dashboard.select_range(self.timeline_panel, from, to)
    }

    pub fn clear_timeline(&mut self) -> DashboardResult<DashboardEvent> {
        self.dashboard.clear(self.timeline_panel)
    }

    pub fn reset(&mut self) -> DashboardEvent {
        self.dashboard.clear_all()
    }

    /// The view selected on the view panel, when exactly one is selected
    pub fn selected_view(&self) -> Option<String> {
        match self.dashboard.selection(self.view_panel).ok()? {
            FilterPredicate::Exact(key) => key.as_text().map(str::to_string),
            FilterPredicate::In(keys) if keys.len() == 1 => keys.iter().next()?.as_text().map(str::to_string),
            _ => None,
        }
    }

    /// Timeline rows in date order
    pub fn timeline(&self, granularity: Granularity) -> DashboardResult<Vec<GroupRow<ActivityCounts>>> {
        let group = match granularity {
            Granularity::Day => &self.day_group,
            Granularity::Week => &self.week_group,
            Granularity::Month => &self.month_group,
        };
        let mut rows = self.dashboard.index().group_rows(group)?;
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    /// Author group rows keyed by actor id, largest total first
    pub fn top_authors(&self, k: usize) -> DashboardResult<Vec<GroupRow<ActivityCounts>>> {
        Ok(self.dashboard.index().group_top(&self.author_group, k, |a, b| a.total.cmp(&b.total))?)
    }

    /// Statistics over the filtered records, using the view panel's
    /// selection as the selected view
    pub fn statistics(&self, viewer: &ViewerContext, policy: &DisplayPolicy, roster: &ManagerRoster) -> Statistics {
        let selected_view = self.selected_view();
        let request = StatisticsRequest {
            viewer,
            policy,
            roster,
            selected_view: selected_view.as_deref(),
        };
        let filtered = self.dashboard.filtered_records();
        compute_statistics(&filtered, self.dashboard.index().store().iter(), &request)
    }

    /// Author ranking with resolved names, limited and ordered as configured
    pub fn author_ranking(&self, viewer: &ViewerContext, policy: &DisplayPolicy, roster: &ManagerRoster) -> Vec<ActivityTally> {
        self.ranking(viewer, policy, roster, self.config.ranking_sort, self.config.ranking_limit)
    }

    pub fn ranking(
        &self,
        viewer: &ViewerContext,
        policy: &DisplayPolicy,
        roster: &ManagerRoster,
        sort: TallySort,
        limit: usize,
    ) -> Vec<ActivityTally> {
        let request = StatisticsRequest {
            viewer,
            policy,
            roster,
            selected_view: None,
        };
        let mut rows = tally_records(self.dashboard.filtered_records(), &request);
        sort_tallies(&mut rows, sort);
        rows.truncate(limit);
        rows
    }

    /// Actor network over the filtered `read` records
    pub fn network(&self, viewer: &ViewerContext, policy: &DisplayPolicy) -> ActorNetwork {
        network_from_records(self.dashboard.filtered_records(), viewer, policy, &self.config.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BucketConfig, RawEvent, RecordId};
    use crate::stats::Role;

    const DAY_MS: i64 = 86_400_000;
    // 2024-03-10, a Sunday
    const SUNDAY_MS: i64 = 1_710_028_800_000;

    fn event(id: &str, activity: ActivityType, from: &str, day: i64, view: Option<&str>) -> RawEvent {
        RawEvent {
            id: RecordId::new(id),
            activity,
            when: SUNDAY_MS + day * DAY_MS,
            from: from.to_string(),
            from_id: from.to_lowercase(),
            from_pseudo: format!("P-{}", from),
            to: Some("Carol".to_string()),
            to_pseudo: Some("P-Carol".to_string()),
            title: String::new(),
            view: view.map(str::to_string),
            body: String::new(),
        }
    }

    fn build() -> ActivityDashboard {
        let store = RecordStore::from_raw(
            vec![
                event("1", ActivityType::Read, "Alice", 0, Some("Math")),
                event("2", ActivityType::Read, "Alice", 1, Some("Math")),
                event("3", ActivityType::Modified, "Bob", 7, None),
                event("4", ActivityType::Created, "Alice", 30, Some("Art")),
            ],
            &BucketConfig::default(),
        )
        .unwrap();
        ActivityDashboard::build(store.into_shared(), &DashboardConfig::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_timeline_granularities() {
        let dash = build();

        let days = dash.timeline(Granularity::Day).unwrap();
        assert_eq!(days.len(), 4);

        let weeks = dash.timeline(Granularity::Week).unwrap();
        assert_eq!(weeks[0].key, DimensionKey::Date(date(2024, 3, 10)));
        assert_eq!(weeks[0].value.total, 2);
        assert_eq!(weeks.len(), 3);

        let months = dash.timeline(Granularity::Month).unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[1].key, DimensionKey::Date(date(2024, 4, 1)));
    }

    #[test]
    fn test_week_rows_follow_store_bucketing() {
        let monday_weeks = BucketConfig { week_start: WeekStart::Monday, ..Default::default() };
        let store = RecordStore::from_raw(
            vec![
                event("1", ActivityType::Read, "Alice", 0, Some("Math")),
                event("2", ActivityType::Read, "Alice", 1, Some("Math")),
            ],
            &monday_weeks,
        )
        .unwrap()
        .into_shared();
        let expected: Vec<DimensionKey> = store.iter().map(|r| r.buckets.week.into()).collect();

        // Dashboard config still says Sunday
        let dash = ActivityDashboard::build(store, &DashboardConfig::default()).unwrap();
        let weeks = dash.timeline(Granularity::Week).unwrap();

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].key, expected[0]);
        assert_eq!(weeks[1].key, expected[1]);
        assert_eq!(weeks[0].key, DimensionKey::Date(date(2024, 3, 4)));
        assert_eq!(weeks[1].key, DimensionKey::Date(date(2024, 3, 11)));
    }

    #[test]
    fn test_day_range_selection() {
        let mut dash = build();
        dash.select_days(date(2024, 3, 10), date(2024, 3, 17)).unwrap();
        assert_eq!(dash.dashboard().filtered_count(), 3);

        dash.select_type(ActivityType::Read).unwrap();
        assert_eq!(dash.dashboard().filtered_count(), 2);

        // Clearing the timeline keeps the type selection
        dash.clear_timeline().unwrap();
        assert_eq!(dash.dashboard().filtered_count(), 2);
    }

    #[test]
    fn test_selected_view_feeds_statistics() {
        let mut dash = build();
        let viewer = ViewerContext::new("admin", Role::Administrator, "Admin");
        let policy = DisplayPolicy::default();
        let roster = ManagerRoster::default();

        assert!(dash.statistics(&viewer, &policy, &roster).view_average.is_none());

        dash.select_view("Deleted").unwrap();
        assert_eq!(dash.selected_view().as_deref(), Some("Deleted"));
        let stats = dash.statistics(&viewer, &policy, &roster);
        assert_eq!(stats.rows.len(), 1);
        assert_eq!(stats.view_average.unwrap().modified, 1.0);
    }

    #[test]
    fn test_rankings_and_network() {
        let dash = build();
        let viewer = ViewerContext::new("alice", Role::Member, "Alice");
        let policy = DisplayPolicy::default();

        let top = dash.top_authors(1).unwrap();
        assert_eq!(top[0].key, DimensionKey::from("alice"));
        assert_eq!(top[0].value.total, 3);

        let ranking = dash.author_ranking(&viewer, &policy, &ManagerRoster::default());
        assert_eq!(ranking[0].display, "Alice");
        assert_eq!(ranking[1].display, "P-Bob");

        let network = dash.network(&viewer, &policy);
        assert_eq!(network.node_count(), 2);
        assert_eq!(network.node("Alice").unwrap().weight, 2);
        assert_eq!(network.edge("Alice", "P-Carol").unwrap().count, 2);
    }
}
