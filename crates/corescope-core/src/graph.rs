//! Graph store using petgraph::UnGraphMap keyed by NodeId

use crate::error::{GraphError, Result};
use crate::model::*;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashMap;

/// The live graph: an undirected simple graph plus the orientation each
/// present edge was inserted with.
///
/// Adjacency is symmetric by construction. Removing an edge never removes
/// its endpoints; isolated nodes stay until [`GraphStore::prune_isolated`].
#[derive(Clone, Default)]
pub struct GraphStore {
    inner: UnGraphMap<NodeId, ()>,
    orientations: HashMap<EdgeKey, Edge>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        GraphStore {
            inner: UnGraphMap::new(),
            orientations: HashMap::new(),
        }
    }

    /// Build a store from an edge list. Duplicates collapse onto the first
    /// orientation seen.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut store = GraphStore::new();
        for edge in edges {
            store.add_edge(edge)?;
        }
        Ok(store)
    }

    /// Insert an edge, creating missing endpoints. Returns `false` when the
    /// edge was already present.
    pub fn add_edge(&mut self, edge: Edge) -> Result<bool> {
        if edge.is_self_loop() {
            return Err(GraphError::self_loop(edge));
        }
        let existed = self.inner.add_edge(edge.source, edge.target, ()).is_some();
        if existed {
            tracing::trace!("Edge {} already present", edge);
        } else {
            self.orientations.insert(edge.key(), edge);
        }
        Ok(!existed)
    }

    /// Remove an edge. Its endpoints are kept even if they become isolated.
    pub fn remove_edge(&mut self, edge: Edge) -> Result<()> {
        match self.inner.remove_edge(edge.source, edge.target) {
            Some(()) => {
                self.orientations.remove(&edge.key());
                Ok(())
            }
            None => Err(GraphError::EdgeNotFound(edge)),
        }
    }

    /// Check whether `{u, v}` is present, in either orientation.
    pub fn contains_edge(&self, edge: Edge) -> bool {
        self.inner.contains_edge(edge.source, edge.target)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.inner.contains_node(node)
    }

    /// Number of neighbors; zero for unknown nodes.
    pub fn degree(&self, node: NodeId) -> usize {
        self.inner.neighbors(node).count()
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.neighbors(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Current edges as unordered pairs.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.inner.all_edges().map(|(a, b, _)| EdgeKey::new(a, b))
    }

    /// Current edges, each in its original orientation.
    pub fn current_edges(&self) -> Vec<Edge> {
        self.inner
            .all_edges()
            .map(|(a, b, _)| self.orient(a, b))
            .collect()
    }

    /// The orientation `{a, b}` was inserted with, or `(a, b)` if it is not
    /// present.
    pub fn orient(&self, a: NodeId, b: NodeId) -> Edge {
        self.orientations
            .get(&EdgeKey::new(a, b))
            .copied()
            .unwrap_or(Edge { source: a, target: b })
    }

    /// Edge density `2E / (V(V-1))`, zero for fewer than two nodes.
    pub fn density(&self) -> f64 {
        let n = self.inner.node_count();
        if n < 2 {
            return 0.0;
        }
        let m = self.inner.edge_count() as f64;
        2.0 * m / (n as f64 * (n as f64 - 1.0))
    }

    /// Drop every node without neighbors. Returns the removed nodes.
    pub fn prune_isolated(&mut self) -> Vec<NodeId> {
        let isolated: Vec<NodeId> = self
            .inner
            .nodes()
            .filter(|&n| self.inner.neighbors(n).next().is_none())
            .collect();
        for &node in &isolated {
            self.inner.remove_node(node);
        }
        if !isolated.is_empty() {
            tracing::debug!("Pruned {} isolated nodes", isolated.len());
        }
        isolated
    }

    /// Same edge set, ignoring orientation and isolated nodes.
    pub fn same_edges(&self, other: &GraphStore) -> bool {
        self.edge_count() == other.edge_count()
            && self.inner.all_edges().all(|(a, b, _)| other.inner.contains_edge(a, b))
    }
}
