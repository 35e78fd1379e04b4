//! Shared types for network aggregation
//!
//! Provides the interaction input type and a read-only, dense view of the
//! aggregated network topology.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A displayed identity: a stable id plus the label to render.
///
/// The label is whatever the caller's naming policy resolved to (real name
/// or pseudonym); aggregation keys on `label`, so two records that resolve
/// to the same displayed name collapse into one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Identity {
    pub id: String,
    pub label: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// One actor -> target co-occurrence (e.g. a read of someone's content)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interaction {
    pub source: Identity,
    /// Absent when the event has no target (node weight only)
    pub target: Option<Identity>,
}

impl Interaction {
    pub fn new(source: Identity, target: Option<Identity>) -> Self {
        Interaction { source, target }
    }
}

/// A dense, integer-indexed view of the network using Compressed Sparse Row (CSR) format.
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Edge weights: aligned with `out_targets`
    pub weights: Vec<f64>,
}

impl GraphView {
    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[idx]..self.in_offsets[idx + 1]]
    }

    /// Get weights for outgoing edges of a node
    pub fn weights(&self, idx: usize) -> &[f64] {
        &self.weights[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Build the CSR arrays from an edge list of `(source, target, weight)`.
    ///
    /// Indices must be `< node_count`.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for &(u, v, w) in edges {
            outgoing[u].push((v, w));
            incoming[v].push(u);
        }

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::with_capacity(edges.len());
        let mut weights = Vec::with_capacity(edges.len());
        out_offsets.push(0);
        for neighbors in outgoing {
            for (v, w) in neighbors {
                out_targets.push(v);
                weights.push(w);
            }
            out_offsets.push(out_targets.len());
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::with_capacity(edges.len());
        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            weights,
        }
    }
}
