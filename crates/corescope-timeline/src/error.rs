//! Timeline error types

use corescope_core::GraphError;
use thiserror::Error;

use crate::revision::RevisionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An edit was submitted while a navigation was still being applied.
    #[error("cannot add changes while navigating the timeline")]
    NavigationInProgress,

    #[error("no navigation in progress")]
    NotNavigating,

    #[error("timeline node {0} not found")]
    NodeNotFound(RevisionId),

    /// Only reachable with a malformed tree; every revision descends from
    /// the root.
    #[error("no common ancestor between {from} and {to}")]
    NoCommonAncestor { from: RevisionId, to: RevisionId },
}

impl TimelineError {
    pub fn is_not_found(&self) -> bool {
        match self {
            TimelineError::Graph(err) => err.is_not_found(),
            TimelineError::NodeNotFound(_) => true,
            _ => false,
        }
    }
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
