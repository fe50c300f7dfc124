//! Core data structures for the edited graph

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque node identifier. Nodes carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// An edge in the orientation it was submitted with.
///
/// Core computations ignore the orientation; it is only kept so that
/// reported edge lists look the way the client drew them. Serialized as a
/// `[source, target]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[NodeId; 2]", into = "[NodeId; 2]")]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The same edge, pointing the other way.
    pub fn reversed(self) -> Self {
        Edge {
            source: self.target,
            target: self.source,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Orientation-free identity of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source, self.target)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

impl From<[NodeId; 2]> for Edge {
    fn from([source, target]: [NodeId; 2]) -> Self {
        Edge { source, target }
    }
}

impl From<Edge> for [NodeId; 2] {
    fn from(edge: Edge) -> Self {
        [edge.source, edge.target]
    }
}

impl From<(u64, u64)> for Edge {
    fn from((source, target): (u64, u64)) -> Self {
        Edge::new(source, target)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.source, self.target)
    }
}

/// Unordered pair `{u, v}`, stored with the smaller endpoint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

/// Build an edge list from plain integer pairs.
pub fn edges_from_pairs<I>(pairs: I) -> Vec<Edge>
where
    I: IntoIterator<Item = (u64, u64)>,
{
    pairs.into_iter().map(Edge::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_ignores_orientation() {
        let a = Edge::new(3, 1);
        assert_eq!(a.key(), a.reversed().key());
        assert_eq!(a.key().endpoints(), (NodeId(1), NodeId(3)));
    }

    #[test]
    fn edge_serializes_as_pair() {
        let edge = Edge::new(4, 2);
        assert_eq!(serde_json::to_string(&edge).unwrap(), "[4,2]");
        let back: Edge = serde_json::from_str("[4,2]").unwrap();
        assert_eq!(back, edge);
    }
}
