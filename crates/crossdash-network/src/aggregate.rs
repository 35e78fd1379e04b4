//! Network aggregation
//!
//! Collapses interactions into weighted nodes and deduplicated edges.

use super::common::{GraphView, Interaction};
use super::community::weakly_connected_components;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Network aggregation configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Key edges by ordered `(source, target)` instead of the sorted pair
    pub directional: bool,
    /// Rendered size of the lightest node
    pub min_node_size: f64,
    /// Rendered size of the heaviest node
    pub max_node_size: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            directional: false,
            min_node_size: 5.0,
            max_node_size: 30.0,
        }
    }
}

/// A node of the aggregated network
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkNode {
    /// Id of the first identity seen with this label
    pub id: String,
    pub label: String,
    /// Number of interactions attributed to this identity as source
    pub weight: u64,
    pub size: f64,
    /// Weakly connected component this node belongs to
    pub cluster: usize,
}

/// A deduplicated edge between two displayed identities
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    /// Raw co-occurrence count
    pub count: u64,
    /// Displayed weight: `count` when directional, `max(0, count - 1)` otherwise
    pub weight: u64,
}

/// Aggregated actor network
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActorNetwork {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub directional: bool,
}

impl ActorNetwork {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, label: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&NetworkEdge> {
        self.edges.iter().find(|e| {
            (e.source == source && e.target == target)
                || (!self.directional && e.source == target && e.target == source)
        })
    }

    /// Dense CSR view of the network, weighted by displayed edge weight
    pub fn view(&self) -> GraphView {
        let index: IndexMap<&str, usize, FxBuildHasher> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.label.as_str(), i))
            .collect();

        let edges: Vec<(usize, usize, f64)> = self
            .edges
            .iter()
            .filter_map(|e| {
                let u = *index.get(e.source.as_str())?;
                let v = *index.get(e.target.as_str())?;
                Some((u, v, e.weight as f64))
            })
            .collect();

        GraphView::from_edges(self.nodes.len(), &edges)
    }
}

struct NodeAccumulator {
    id: String,
    weight: u64,
}

/// Aggregate interactions into an actor network.
///
/// Nodes and edges keep first-seen order. Self-loops count towards the
/// node weight but never produce an edge.
pub fn build_network<'a, I>(interactions: I, config: &NetworkConfig) -> ActorNetwork
where
    I: IntoIterator<Item = &'a Interaction>,
{
    let mut nodes: IndexMap<String, NodeAccumulator, FxBuildHasher> = IndexMap::default();
    let mut edges: IndexMap<(String, String), u64, FxBuildHasher> = IndexMap::default();

    for interaction in interactions {
        let source = &interaction.source;
        nodes
            .entry(source.label.clone())
            .or_insert_with(|| NodeAccumulator { id: source.id.clone(), weight: 0 })
            .weight += 1;

        let Some(target) = &interaction.target else {
            continue;
        };
        nodes
            .entry(target.label.clone())
            .or_insert_with(|| NodeAccumulator { id: target.id.clone(), weight: 0 });

        if target.label == source.label {
            continue;
        }

        let key = if config.directional || source.label <= target.label {
            (source.label.clone(), target.label.clone())
        } else {
            (target.label.clone(), source.label.clone())
        };
        *edges.entry(key).or_insert(0) += 1;
    }

    let max_weight = nodes.values().map(|n| n.weight).max().unwrap_or(0);
    let node_count = nodes.len();

    let mut network = ActorNetwork {
        nodes: nodes
            .into_iter()
            .map(|(label, acc)| NetworkNode {
                id: acc.id,
                size: node_size(acc.weight, max_weight, node_count, config),
                label,
                weight: acc.weight,
                cluster: 0,
            })
            .collect(),
        edges: edges
            .into_iter()
            .map(|((source, target), count)| NetworkEdge {
                source,
                target,
                count,
                weight: if config.directional { count } else { count.saturating_sub(1) },
            })
            .collect(),
        directional: config.directional,
    };

    let clusters = weakly_connected_components(&network.view());
    for (idx, node) in network.nodes.iter_mut().enumerate() {
        node.cluster = clusters.node_component[idx];
    }

    network
}

/// Linear interpolation between the configured min and max node size.
///
/// Falls back to the minimum when there is nothing to interpolate against
/// (no weight observed, or a single node).
pub fn node_size(weight: u64, max_weight: u64, node_count: usize, config: &NetworkConfig) -> f64 {
    if max_weight == 0 || node_count <= 1 {
        return config.min_node_size;
    }
    let ratio = weight as f64 / max_weight as f64;
    config.min_node_size + (config.max_node_size - config.min_node_size) * ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Identity;

    fn read(from: &str, to: &str) -> Interaction {
        Interaction::new(Identity::new(from, from), Some(Identity::new(to, to)))
    }

    #[test]
    fn test_undirected_pair_collapses() {
        let interactions = vec![read("alice", "bob"), read("bob", "alice")];
        let network = build_network(&interactions, &NetworkConfig::default());

        assert_eq!(network.edge_count(), 1);
        let edge = network.edge("alice", "bob").unwrap();
        assert_eq!(edge.count, 2);
        assert_eq!(edge.weight, 1);
    }

    #[test]
    fn test_directional_keeps_both_directions() {
        let config = NetworkConfig { directional: true, ..Default::default() };
        let interactions = vec![read("alice", "bob"), read("bob", "alice"), read("alice", "bob")];
        let network = build_network(&interactions, &config);

        assert_eq!(network.edge_count(), 2);
        assert_eq!(network.edge("alice", "bob").unwrap().weight, 2);
        assert_eq!(network.edge("bob", "alice").unwrap().weight, 1);
    }

    #[test]
    fn test_self_loop_dropped() {
        let interactions = vec![read("alice", "alice")];
        let network = build_network(&interactions, &NetworkConfig::default());

        assert_eq!(network.edge_count(), 0);
        assert_eq!(network.node_count(), 1);
        assert_eq!(network.node("alice").unwrap().weight, 1);
    }

    #[test]
    fn test_target_only_node_has_zero_weight() {
        let interactions = vec![read("alice", "carol")];
        let network = build_network(&interactions, &NetworkConfig::default());

        let carol = network.node("carol").unwrap();
        assert_eq!(carol.weight, 0);
        assert_eq!(carol.size, 5.0);
        assert_eq!(network.node("alice").unwrap().size, 30.0);
    }

    #[test]
    fn test_node_size_fallbacks() {
        let config = NetworkConfig::default();
        assert_eq!(node_size(4, 4, 1, &config), 5.0);
        assert_eq!(node_size(0, 0, 3, &config), 5.0);
        assert_eq!(node_size(2, 4, 3, &config), 17.5);
    }

    #[test]
    fn test_empty_input() {
        let interactions: Vec<Interaction> = Vec::new();
        let network = build_network(&interactions, &NetworkConfig::default());
        assert_eq!(network, ActorNetwork::default());
    }
}
