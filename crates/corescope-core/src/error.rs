//! Error types for graph editing and decomposition

use thiserror::Error;

use crate::model::Edge;

/// Failures raised by the graph store and the decomposition engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Decomposition was requested on zero edges.
    #[error("edge list cannot be empty")]
    EmptyGraph,

    #[error("edge {0} not found")]
    EdgeNotFound(Edge),

    #[error("invalid edge {edge}: {reason}")]
    InvalidEdge { edge: Edge, reason: &'static str },
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::EdgeNotFound(_))
    }

    pub(crate) fn self_loop(edge: Edge) -> Self {
        GraphError::InvalidEdge {
            edge,
            reason: "self-loops are not allowed",
        }
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
