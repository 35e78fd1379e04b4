//! Identity resolution and manager policy
//!
//! Decides, per record, whether a viewer sees an actor's real name or
//! pseudonym. Nothing here is cached: flipping `hide_names` takes effect on
//! the next computation without touching the cross-filter index.

use crate::record::Record;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Viewer role, as supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Manager,
    Administrator,
}

impl Role {
    /// Elevated roles see real names and may change display policy
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Manager | Role::Administrator)
    }
}

/// Who is looking at the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    pub current_identity_id: String,
    pub role: Role,
    pub display_name: String,
}

impl ViewerContext {
    pub fn new(current_identity_id: impl Into<String>, role: Role, display_name: impl Into<String>) -> Self {
        ViewerContext {
            current_identity_id: current_identity_id.into(),
            role,
            display_name: display_name.into(),
        }
    }

    pub fn is_actor_of(&self, record: &Record) -> bool {
        self.current_identity_id == record.from_id
    }
}

/// Display policy flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPolicy {
    /// Show pseudonyms even to elevated viewers
    pub hide_names: bool,
    /// Drop managers from rows and aggregates
    pub hide_managers: bool,
}

impl DisplayPolicy {
    /// Returns false (and leaves the flag unchanged) when the viewer may
    /// not change display policy
    pub fn set_hide_names(&mut self, viewer: &ViewerContext, hide: bool) -> bool {
        if !viewer.role.is_elevated() {
            warn!("Ignoring hide-names toggle from non-elevated viewer {}", viewer.current_identity_id);
            return false;
        }
        debug!("hide_names set to {}", hide);
        self.hide_names = hide;
        true
    }

    pub fn set_hide_managers(&mut self, viewer: &ViewerContext, hide: bool) -> bool {
        if !viewer.role.is_elevated() {
            warn!("Ignoring hide-managers toggle from non-elevated viewer {}", viewer.current_identity_id);
            return false;
        }
        debug!("hide_managers set to {}", hide);
        self.hide_managers = hide;
        true
    }
}

/// Real name when the viewer is the actor, or is elevated and names are
/// not hidden; pseudonym otherwise
pub fn resolve_actor<'r>(record: &'r Record, viewer: &ViewerContext, policy: &DisplayPolicy) -> &'r str {
    if viewer.is_actor_of(record) || (viewer.role.is_elevated() && !policy.hide_names) {
        &record.from
    } else {
        &record.from_pseudo
    }
}

/// Resolved target name of a read relation, if the record has a target.
///
/// The viewer sees their own real name as a target too.
pub fn resolve_target<'r>(record: &'r Record, viewer: &ViewerContext, policy: &DisplayPolicy) -> Option<&'r str> {
    let real = record.to.as_deref();
    let pseudo = record.to_pseudo.as_deref();
    let own = real.is_some() && real == Some(viewer.display_name.as_str());
    if own || (viewer.role.is_elevated() && !policy.hide_names) {
        real.or(pseudo)
    } else {
        pseudo.or(real)
    }
}

/// Known managers, matched by real name or pseudonym
#[derive(Debug, Clone, Default)]
pub struct ManagerRoster {
    names: FxHashSet<String>,
}

impl ManagerRoster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ManagerRoster {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// True when the record's actor is a manager
    pub fn is_manager(&self, record: &Record) -> bool {
        self.contains(&record.from) || self.contains(&record.from_pseudo)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::reducer::tests::record;
    use crate::record::ActivityType;

    #[test]
    fn test_member_sees_pseudonyms_of_others() {
        let r = record(ActivityType::Read, "");
        let viewer = ViewerContext::new("someone-else", Role::Member, "Zed");
        assert_eq!(resolve_actor(&r, &viewer, &DisplayPolicy::default()), "Otter");
    }

    #[test]
    fn test_actor_sees_own_name() {
        let r = record(ActivityType::Read, "");
        let viewer = ViewerContext::new("u1", Role::Member, "Alice");
        let policy = DisplayPolicy { hide_names: true, hide_managers: false };
        assert_eq!(resolve_actor(&r, &viewer, &policy), "Alice");
    }

    #[test]
    fn test_elevated_viewer_respects_hide_names() {
        let r = record(ActivityType::Read, "");
        let viewer = ViewerContext::new("boss", Role::Manager, "Boss");
        let mut policy = DisplayPolicy::default();
        assert_eq!(resolve_actor(&r, &viewer, &policy), "Alice");

        assert!(policy.set_hide_names(&viewer, true));
        assert_eq!(resolve_actor(&r, &viewer, &policy), "Otter");
    }

    #[test]
    fn test_member_cannot_toggle_policy() {
        let viewer = ViewerContext::new("u1", Role::Member, "Alice");
        let mut policy = DisplayPolicy::default();
        assert!(!policy.set_hide_names(&viewer, true));
        assert!(!policy.set_hide_managers(&viewer, true));
        assert_eq!(policy, DisplayPolicy::default());
    }

    #[test]
    fn test_roster_matches_real_or_pseudo() {
        let r = record(ActivityType::Created, "");
        assert!(ManagerRoster::new(["Alice"]).is_manager(&r));
        assert!(ManagerRoster::new(["Otter"]).is_manager(&r));
        assert!(!ManagerRoster::new(["Bob"]).is_manager(&r));
    }
}
