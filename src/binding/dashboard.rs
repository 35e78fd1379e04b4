//! Selection binding
//!
//! Translates panel selections into cross-filter mutations and publishes
//! the refreshed state of every panel before the mutating call returns.

use super::panel::{DashboardEvent, DashboardListener, DashboardView, Panel, PanelId, PanelKind, PanelRow, PanelView};
use crate::filter::{CrossFilter, CrossFilterError, DimensionHandle, DimensionKey, FilterPredicate, GroupId};
use crate::record::{Record, RecordSnapshot};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when driving a dashboard
#[derive(Error, Debug, PartialEq)]
pub enum DashboardError {
    #[error("{0} is not registered with this dashboard")]
    UnknownPanel(PanelId),

    #[error("Panel '{panel}' pairs a dimension with a group of another dimension")]
    PanelGroupMismatch { panel: String },

    #[error(transparent)]
    CrossFilter(#[from] CrossFilterError),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// A cross-filter plus the panels bound to it
pub struct Dashboard {
    filter: CrossFilter,
    panels: Vec<Panel>,
    listeners: Vec<Box<dyn DashboardListener>>,
}

impl Dashboard {
    /// Wrap an index whose dimensions and groups are already registered
    pub fn new(filter: CrossFilter) -> Self {
        Dashboard {
            filter,
            panels: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Read access to the underlying index
    pub fn index(&self) -> &CrossFilter {
        &self.filter
    }

    /// Bind a panel to a dimension and one of that dimension's groups
    pub fn add_panel(
        &mut self,
        name: impl Into<String>,
        kind: PanelKind,
        dimension: DimensionHandle,
        group: GroupId,
    ) -> DashboardResult<PanelId> {
        let name = name.into();
        // Validates the dimension handle as well
        self.filter.filter(dimension)?;
        if self.filter.group_dimension(group)? != dimension.id() {
            return Err(DashboardError::PanelGroupMismatch { panel: name });
        }

        let id = PanelId(self.panels.len());
        debug!("Bound panel '{}' as {}", name, id);
        self.panels.push(Panel {
            id,
            name,
            kind,
            dimension,
            group,
        });
        Ok(id)
    }

    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: DashboardListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, id: PanelId) -> DashboardResult<&Panel> {
        self.panels.get(id.0).ok_or(DashboardError::UnknownPanel(id))
    }

    /// Select one key; selecting the key that is already the sole
    /// selection clears the panel instead
    pub fn select(&mut self, panel: PanelId, key: impl Into<DimensionKey>) -> DashboardResult<DashboardEvent> {
        let dimension = self.panel(panel)?.dimension;
        let key = key.into();

        let event = if self.filter.filter(dimension)?.is_exactly(&key) {
            let change = self.filter.filter_all(dimension)?;
            DashboardEvent::Cleared { panel, change }
        } else {
            let change = self.filter.filter_exact(dimension, key)?;
            DashboardEvent::Selected { panel, change }
        };
        Ok(self.publish(event))
    }

    /// Select a set of keys; an empty set clears the panel
    pub fn select_many<I, K>(&mut self, panel: PanelId, keys: I) -> DashboardResult<DashboardEvent>
    where
        I: IntoIterator<Item = K>,
        K: Into<DimensionKey>,
    {
        let dimension = self.panel(panel)?.dimension;
        let keys: Vec<DimensionKey> = keys.into_iter().map(Into::into).collect();

        let event = if keys.is_empty() {
            let change = self.filter.filter_all(dimension)?;
            DashboardEvent::Cleared { panel, change }
        } else {
            let change = self.filter.filter_in(dimension, keys)?;
            DashboardEvent::Selected { panel, change }
        };
        Ok(self.publish(event))
    }

    /// Select the inclusive key range `lo..=hi`
    pub fn select_range(
        &mut self,
        panel: PanelId,
        lo: impl Into<DimensionKey>,
        hi: impl Into<DimensionKey>,
    ) -> DashboardResult<DashboardEvent> {
        let dimension = self.panel(panel)?.dimension;
        let change = self.filter.filter_range(dimension, lo, hi)?;
        Ok(self.publish(DashboardEvent::Selected { panel, change }))
    }

    /// Clear one panel's selection, leaving every other panel's intact
    pub fn clear(&mut self, panel: PanelId) -> DashboardResult<DashboardEvent> {
        let dimension = self.panel(panel)?.dimension;
        let change = self.filter.filter_all(dimension)?;
        Ok(self.publish(DashboardEvent::Cleared { panel, change }))
    }

    /// Clear every selection
    pub fn clear_all(&mut self) -> DashboardEvent {
        let changes = self.filter.clear_all();
        self.publish(DashboardEvent::Reset { changes })
    }

    pub fn selection(&self, panel: PanelId) -> DashboardResult<&FilterPredicate> {
        let dimension = self.panel(panel)?.dimension;
        Ok(self.filter.filter(dimension)?)
    }

    /// Non-empty rows of a panel's group
    pub fn group_rows(&self, panel: PanelId) -> DashboardResult<Vec<PanelRow>> {
        let group = self.panel(panel)?.group;
        Ok(self.filter.group_rows_json(group, false)?)
    }

    pub fn filtered_records(&self) -> Vec<&Record> {
        self.filter.filtered_records()
    }

    pub fn filtered_count(&self) -> usize {
        self.filter.filtered_count()
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        self.filter.snapshot()
    }

    /// Current state of every panel
    pub fn view(&self) -> DashboardView {
        let panels = self
            .panels
            .iter()
            .map(|p| PanelView {
                id: p.id,
                name: p.name.clone(),
                kind: p.kind,
                selection: self.filter.filter(p.dimension).cloned().unwrap_or_default(),
                rows: self.filter.group_rows_json(p.group, false).unwrap_or_default(),
            })
            .collect();

        DashboardView {
            panels,
            filtered: self.filter.filtered_count(),
            total: self.filter.total_count(),
        }
    }

    fn publish(&mut self, event: DashboardEvent) -> DashboardEvent {
        let view = self.view();
        debug!(
            "Publishing {} change(s) to {} listener(s), {} of {} records live",
            event.changes().len(),
            self.listeners.len(),
            view.filtered,
            view.total
        );
        for listener in self.listeners.iter_mut() {
            listener.on_event(&event, &view);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ActivityCountsReducer, CountReducer};
    use crate::record::{ActivityType, BucketConfig, RawEvent, RecordId, RecordStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(activity: ActivityType, from: &str) -> RawEvent {
        RawEvent {
            id: RecordId::new(format!("{}-{}", from, activity)),
            activity,
            when: 0,
            from: from.to_string(),
            from_id: from.to_lowercase(),
            from_pseudo: from.to_uppercase(),
            to: None,
            to_pseudo: None,
            title: String::new(),
            view: None,
            body: String::new(),
        }
    }

    fn dashboard() -> (Dashboard, PanelId, PanelId) {
        let store = RecordStore::from_raw(
            vec![
                event(ActivityType::Read, "Alice"),
                event(ActivityType::Created, "Alice"),
                event(ActivityType::Read, "Bob"),
            ],
            &BucketConfig::default(),
        )
        .unwrap();
        let mut cf = CrossFilter::new(store.into_shared());
        let types = cf.add_dimension("type", |r| r.activity.as_str().into()).unwrap();
        let authors = cf.add_dimension("author", |r| r.from_id.clone().into()).unwrap();
        let type_group = cf.group(types, CountReducer).unwrap();
        let author_group = cf.group(authors, ActivityCountsReducer).unwrap();

        let mut dashboard = Dashboard::new(cf);
        let type_panel = dashboard.add_panel("type", PanelKind::Categorical, types, type_group.id()).unwrap();
        let author_panel = dashboard
            .add_panel("author", PanelKind::Categorical, authors, author_group.id())
            .unwrap();
        (dashboard, type_panel, author_panel)
    }

    #[test]
    fn test_select_toggles() {
        let (mut dashboard, type_panel, _) = dashboard();

        let event = dashboard.select(type_panel, "read").unwrap();
        assert!(matches!(event, DashboardEvent::Selected { .. }));
        assert_eq!(dashboard.filtered_count(), 2);

        let event = dashboard.select(type_panel, "read").unwrap();
        assert!(matches!(event, DashboardEvent::Cleared { .. }));
        assert_eq!(dashboard.filtered_count(), 3);
    }

    #[test]
    fn test_select_many_and_empty_set_clears() {
        let (mut dashboard, type_panel, author_panel) = dashboard();

        let event = dashboard.select_many(author_panel, ["bob", "carol"]).unwrap();
        match &event {
            DashboardEvent::Selected { panel, change } => {
                assert_eq!(*panel, author_panel);
                assert_eq!(change.exited, 2);
                assert_eq!(change.live, 1);
            }
            other => panic!("expected a selection, got {:?}", other),
        }
        assert_eq!(
            dashboard.selection(author_panel).unwrap(),
            &FilterPredicate::In(["bob".into(), "carol".into()].into_iter().collect())
        );

        dashboard.select_many(type_panel, ["read", "modified"]).unwrap();
        assert_eq!(dashboard.filtered_count(), 1);

        let event = dashboard.select_many(author_panel, Vec::<&str>::new()).unwrap();
        match &event {
            DashboardEvent::Cleared { panel, change } => {
                assert_eq!(*panel, author_panel);
                assert_eq!(change.entered, 2);
                assert_eq!(change.live, 2);
            }
            other => panic!("expected a clear, got {:?}", other),
        }
        assert_eq!(dashboard.selection(author_panel).unwrap(), &FilterPredicate::All);
        assert_eq!(dashboard.filtered_count(), 2);
    }

    #[test]
    fn test_listeners_see_consistent_view() {
        let (mut dashboard, type_panel, author_panel) = dashboard();
        let seen: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        dashboard.subscribe(move |_: &DashboardEvent, view: &DashboardView| {
            let author_rows = view.panel(author_panel).map(|p| p.rows.len()).unwrap_or(0);
            sink.borrow_mut().push((view.filtered, author_rows));
        });

        dashboard.select(type_panel, "created").unwrap();
        dashboard.clear_all();

        assert_eq!(*seen.borrow(), vec![(1, 1), (3, 2)]);
    }

    #[test]
    fn test_clear_only_touches_one_panel() {
        let (mut dashboard, type_panel, author_panel) = dashboard();
        dashboard.select(type_panel, "read").unwrap();
        dashboard.select(author_panel, "bob").unwrap();
        assert_eq!(dashboard.filtered_count(), 1);

        dashboard.clear(author_panel).unwrap();
        assert_eq!(dashboard.filtered_count(), 2);
        assert_eq!(dashboard.selection(type_panel).unwrap(), &FilterPredicate::Exact("read".into()));
    }

    #[test]
    fn test_unknown_panel() {
        let (mut dashboard, _, _) = dashboard();
        assert_eq!(dashboard.select(PanelId(9), "read"), Err(DashboardError::UnknownPanel(PanelId(9))));
        assert_eq!(dashboard.filtered_count(), 3);
    }

    #[test]
    fn test_panel_group_mismatch() {
        let (mut dashboard, _, _) = dashboard();
        let type_dim = dashboard.panels()[0].dimension;
        let author_group = dashboard.panels()[1].group;
        let err = dashboard.add_panel("broken", PanelKind::Categorical, type_dim, author_group).unwrap_err();
        assert_eq!(err, DashboardError::PanelGroupMismatch { panel: "broken".to_string() });
    }
}
