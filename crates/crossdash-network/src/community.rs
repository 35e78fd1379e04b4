//! Clustering of the aggregated network
//!
//! Weakly connected components, used to colour nodes by cluster.

use super::common::GraphView;

/// Result of WCC algorithm
pub struct WccResult {
    /// Component id per node index; ids are dense and numbered in order of
    /// the lowest node index they contain
    pub node_component: Vec<usize>,
    /// Node indices per component id
    pub components: Vec<Vec<usize>>,
}

impl WccResult {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Ignores edge direction and edge weight: a zero-weight edge still links
/// its endpoints.
pub fn weakly_connected_components(view: &GraphView) -> WccResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.successors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let mut root_to_component: Vec<Option<usize>> = vec![None; n];
    let mut node_component = Vec::with_capacity(n);
    let mut components: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        let root = uf.find(i);
        let component = *root_to_component[root].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[component].push(i);
        node_component.push(component);
    }

    WccResult {
        node_component,
        components,
    }
}
