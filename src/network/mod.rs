//! Actor network adapter
//!
//! Aggregation lives in the `crossdash-network` crate. This module turns
//! filtered records into its interaction input, resolving identities with
//! the same naming policy as the statistics.

use crate::record::Record;
use crate::stats::{resolve_actor, resolve_target, DisplayPolicy, ViewerContext};
use crossdash_network::{Identity, Interaction};

pub use crossdash_network::{
    build_network, node_size, weakly_connected_components, ActorNetwork, GraphView, NetworkConfig, NetworkEdge,
    NetworkNode, WccResult,
};

/// Interactions of the `read` records among `records`
pub fn interactions_from_records<'r, I>(records: I, viewer: &ViewerContext, policy: &DisplayPolicy) -> Vec<Interaction>
where
    I: IntoIterator<Item = &'r Record>,
{
    records
        .into_iter()
        .filter(|r| r.is_read())
        .map(|r| {
            // Targets carry no id of their own, so both ends use the
            // resolved label; a node id never depends on which end it was
            // first seen at, and a pseudonymised node never exposes a name
            let actor = resolve_actor(r, viewer, policy);
            let source = Identity::new(actor, actor);
            let target = resolve_target(r, viewer, policy).map(|label| Identity::new(label, label));
            Interaction::new(source, target)
        })
        .collect()
}

/// Build the actor network of the given (already filtered) records
pub fn network_from_records<'r, I>(
    records: I,
    viewer: &ViewerContext,
    policy: &DisplayPolicy,
    config: &NetworkConfig,
) -> ActorNetwork
where
    I: IntoIterator<Item = &'r Record>,
{
    let interactions = interactions_from_records(records, viewer, policy);
    build_network(&interactions, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ActivityType, BucketConfig, RawEvent, RecordId, RecordStore};
    use crate::stats::Role;

    fn read(from: &str, to: &str) -> RawEvent {
        RawEvent {
            id: RecordId::new(format!("{}>{}", from, to)),
            activity: ActivityType::Read,
            when: 0,
            from: from.to_string(),
            from_id: from.to_lowercase(),
            from_pseudo: format!("P-{}", from),
            to: Some(to.to_string()),
            to_pseudo: Some(format!("P-{}", to)),
            title: String::new(),
            view: None,
            body: String::new(),
        }
    }

    #[test]
    fn test_only_reads_become_interactions() {
        let mut created = read("Alice", "Bob");
        created.activity = ActivityType::Created;
        let store = RecordStore::from_raw(vec![read("Alice", "Bob"), created], &BucketConfig::default()).unwrap();
        let viewer = ViewerContext::new("admin", Role::Administrator, "Admin");

        let interactions = interactions_from_records(&store, &viewer, &DisplayPolicy::default());
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].source.label, "Alice");
        assert_eq!(interactions[0].target.as_ref().unwrap().label, "Bob");
    }

    #[test]
    fn test_network_uses_pseudonyms_for_members() {
        let store = RecordStore::from_raw(vec![read("Alice", "Bob"), read("Bob", "Alice")], &BucketConfig::default())
            .unwrap();
        let viewer = ViewerContext::new("alice", Role::Member, "Alice");

        let network = network_from_records(&store, &viewer, &DisplayPolicy::default(), &NetworkConfig::default());

        // The viewer's own node keeps the real name, Bob is pseudonymised
        assert!(network.node("Alice").is_some());
        assert!(network.node("P-Bob").is_some());
        assert_eq!(network.edge_count(), 1);
        assert_eq!(network.edges[0].count, 2);
        assert_eq!(network.edges[0].weight, 1);
    }

    #[test]
    fn test_node_ids_are_resolved_labels() {
        let store = RecordStore::from_raw(vec![read("Alice", "Bob"), read("Bob", "Alice")], &BucketConfig::default())
            .unwrap();
        let admin = ViewerContext::new("admin", Role::Administrator, "Admin");
        let member = ViewerContext::new("carol", Role::Member, "Carol");

        let network = network_from_records(&store, &admin, &DisplayPolicy::default(), &NetworkConfig::default());
        // Alice is first seen as an actor, Bob as a target
        assert_eq!(network.node("Alice").unwrap().id, "Alice");
        assert_eq!(network.node("Bob").unwrap().id, "Bob");

        let network = network_from_records(&store, &member, &DisplayPolicy::default(), &NetworkConfig::default());
        assert_eq!(network.node("P-Alice").unwrap().id, "P-Alice");
        assert_eq!(network.node("P-Bob").unwrap().id, "P-Bob");
    }
}
