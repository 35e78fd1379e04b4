//! Dashboard binding
//!
//! Panels pair a dimension with one of its groups. A selection on a panel
//! becomes a filter on its dimension, and every listener receives the
//! refreshed state of all panels before the selecting call returns.

pub mod activity;
pub mod dashboard;
pub mod panel;

pub use activity::{ActivityDashboard, Granularity};
pub use dashboard::{Dashboard, DashboardError, DashboardResult};
pub use panel::{DashboardEvent, DashboardListener, DashboardView, Panel, PanelId, PanelKind, PanelRow, PanelView};
