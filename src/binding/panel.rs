//! Panels, views and dashboard events

use crate::filter::{DimensionHandle, FilterChange, FilterPredicate, GroupId, GroupRow};
use serde::Serialize;
use std::fmt;

/// Handle to a panel registered with a [`super::Dashboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PanelId(pub usize);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanelId({})", self.0)
    }
}

/// How a panel selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    /// Click a key (bars, pie slices, table rows)
    Categorical,
    /// Brush a key range (time lines)
    Range,
}

/// A visual panel bound to one dimension/group pair
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: PanelId,
    pub name: String,
    pub kind: PanelKind,
    pub dimension: DimensionHandle,
    pub group: GroupId,
}

/// Type-erased group row as handed to renderers
pub type PanelRow = GroupRow<serde_json::Value>;

/// What one panel should currently display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub id: PanelId,
    pub name: String,
    pub kind: PanelKind,
    pub selection: FilterPredicate,
    pub rows: Vec<PanelRow>,
}

/// Consistent state of every panel after a mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub panels: Vec<PanelView>,
    /// Records passing every filter
    pub filtered: usize,
    pub total: usize,
}

impl DashboardView {
    pub fn panel(&self, id: PanelId) -> Option<&PanelView> {
        self.panels.iter().find(|p| p.id == id)
    }
}

/// Published after every filter mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum DashboardEvent {
    /// A panel's dimension was narrowed (or its selection replaced)
    Selected { panel: PanelId, change: FilterChange },
    /// A panel's selection was removed
    Cleared { panel: PanelId, change: FilterChange },
    /// Every selection was removed
    Reset { changes: Vec<FilterChange> },
}

impl DashboardEvent {
    pub fn changes(&self) -> Vec<&FilterChange> {
        match self {
            DashboardEvent::Selected { change, .. } | DashboardEvent::Cleared { change, .. } => vec![change],
            DashboardEvent::Reset { changes } => changes.iter().collect(),
        }
    }
}

/// Receives every event together with the refreshed view, synchronously
/// and in registration order
pub trait DashboardListener {
    fn on_event(&mut self, event: &DashboardEvent, view: &DashboardView);
}

impl<F> DashboardListener for F
where
    F: FnMut(&DashboardEvent, &DashboardView),
{
    fn on_event(&mut self, event: &DashboardEvent, view: &DashboardView) {
        self(event, view)
    }
}
