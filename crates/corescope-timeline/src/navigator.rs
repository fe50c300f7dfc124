//! Navigation planning between revisions
//!
//! A plan is the ordered list of edge edits that turns the graph at one
//! revision into the graph at another. Planning only reads the tree; the
//! graph is touched when the plan is applied.

use std::collections::HashSet;

use corescope_core::{GraphError, GraphStore};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::revision::{Change, Revision, RevisionId, RevisionTree};

/// How the target revision relates to the starting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    Same,
    /// Target is above the start: undo only.
    Ancestor,
    /// Target is below the start: redo only.
    Descendant,
    /// Undo up to `lca`, then redo down to the target.
    CrossBranch { lca: RevisionId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPlan {
    pub from: RevisionId,
    pub to: RevisionId,
    pub relation: Relation,
    pub steps: Vec<Change>,
}

impl NavigationPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order. Stops at the first failing step.
    pub fn apply(&self, store: &mut GraphStore) -> Result<(), GraphError> {
        self.steps.iter().try_for_each(|step| step.apply(store))
    }
}

/// Compute the edits leading from `from` to `to` without mutating anything.
pub fn plan(tree: &RevisionTree, from: RevisionId, to: RevisionId) -> Result<NavigationPlan> {
    tree.require(from)?;
    tree.require(to)?;

    let (relation, steps) = if from == to {
        (Relation::Same, Vec::new())
    } else if tree.is_ancestor(to, from) {
        // Newest edit undone first.
        let steps = path_up(tree, from, to).map(Change::inverse).collect();
        (Relation::Ancestor, steps)
    } else if tree.is_ancestor(from, to) {
        let mut steps: Vec<Change> = path_up(tree, to, from).collect();
        steps.reverse();
        (Relation::Descendant, steps)
    } else {
        let lca = lowest_common_ancestor(tree, from, to)?;
        let mut steps: Vec<Change> = path_up(tree, from, lca).map(Change::inverse).collect();
        let mut redo: Vec<Change> = path_up(tree, to, lca).collect();
        redo.reverse();
        steps.extend(redo);
        (Relation::CrossBranch { lca }, steps)
    };

    tracing::debug!(
        "Planned {} step(s) from {} to {} ({:?})",
        steps.len(),
        from,
        to,
        relation
    );
    Ok(NavigationPlan {
        from,
        to,
        relation,
        steps,
    })
}

/// Changes of the revisions from `start` up to, but excluding, `stop`.
fn path_up(
    tree: &RevisionTree,
    start: RevisionId,
    stop: RevisionId,
) -> impl Iterator<Item = Change> + '_ {
    tree.ancestors(start)
        .take_while(move |r| r.id() != stop)
        .filter_map(Revision::change)
}

/// Record every ancestor of `from`, then climb from `to` until one of them
/// is hit.
pub fn lowest_common_ancestor(
    tree: &RevisionTree,
    from: RevisionId,
    to: RevisionId,
) -> Result<RevisionId> {
    let seen: HashSet<RevisionId> = tree.ancestors(from).map(Revision::id).collect();
    tree.ancestors(to)
        .map(Revision::id)
        .find(|id| seen.contains(id))
        .ok_or(TimelineError::NoCommonAncestor { from, to })
}
