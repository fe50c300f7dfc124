//! Live timeline: a revision tree, the graph at the current revision, and
//! navigation between revisions.

use std::collections::HashMap;

use corescope_core::{
    decompose_with, CoreDecomposition, DecomposeOptions, Edge, EdgeKey, GraphError, GraphStore,
    NodeId,
};

use crate::error::{Result, TimelineError};
use crate::navigator::{self, NavigationPlan};
use crate::revision::{Action, Change, Revision, RevisionId, RevisionSnapshot, RevisionTree};

/// Navigation that has been started but not yet finished.
#[derive(Debug)]
struct PendingNavigation {
    plan: NavigationPlan,
    next: usize,
    /// Graph as it was before the first step.
    rollback: GraphStore,
}

/// Branching edit history of a single graph.
///
/// Edits always branch from the current revision. While a navigation is in
/// progress, edits are refused with [`TimelineError::NavigationInProgress`].
#[derive(Debug)]
pub struct Timeline {
    tree: RevisionTree,
    store: GraphStore,
    current: RevisionId,
    pending: Option<PendingNavigation>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            tree: RevisionTree::new(),
            store: GraphStore::new(),
            current: RevisionId::ROOT,
            pending: None,
        }
    }

    /// Start a timeline by recording every edge as an add, in order.
    /// Edges already present are skipped.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut timeline = Timeline::new();
        for edge in edges {
            if timeline.store.contains_edge(edge) {
                continue;
            }
            timeline.add_change(Action::Add, edge.source, edge.target)?;
        }
        Ok(timeline)
    }

    pub fn tree(&self) -> &RevisionTree {
        &self.tree
    }

    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    /// Drop nodes left without edges. Edges themselves only change through
    /// recorded revisions. Returns the removed nodes.
    pub fn prune_isolated(&mut self) -> Vec<NodeId> {
        self.store.prune_isolated()
    }

    pub fn current(&self) -> RevisionId {
        self.current
    }

    pub fn current_revision(&self) -> Option<&Revision> {
        self.tree.get(self.current)
    }

    pub fn find(&self, id: RevisionId) -> Option<&Revision> {
        self.tree.get(id)
    }

    pub fn is_navigating(&self) -> bool {
        self.pending.is_some()
    }

    /// Current edges, each oriented as the newest add on the path from the
    /// root to the current revision submitted it.
    ///
    /// Mid-navigation the graph sits between revisions, so the store's own
    /// insertion orientation is used instead.
    pub fn current_edges(&self) -> Vec<Edge> {
        if self.is_navigating() {
            return self.store.current_edges();
        }
        let mut added: HashMap<EdgeKey, Edge> = HashMap::new();
        for change in self.tree.ancestors(self.current).filter_map(Revision::change) {
            if change.action == Action::Add {
                added.entry(change.edge().key()).or_insert(change.edge());
            }
        }
        self.store
            .edges()
            .map(|key| match added.get(&key) {
                Some(&edge) => edge,
                None => {
                    let (a, b) = key.endpoints();
                    self.store.orient(a, b)
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> RevisionSnapshot {
        self.tree.snapshot()
    }

    /// Record an edit under the current revision and move onto it.
    ///
    /// The graph is edited first; if that fails, neither the graph nor the
    /// tree changes. Adding an edge that is already present is refused
    /// because undoing it would remove an edge that predates the edit.
    pub fn add_change(
        &mut self,
        action: Action,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Result<RevisionId> {
        if self.is_navigating() {
            return Err(TimelineError::NavigationInProgress);
        }
        let change = Change::new(action, Edge::new(source, target));
        if action == Action::Add && self.store.contains_edge(change.edge()) {
            return Err(GraphError::InvalidEdge {
                edge: change.edge(),
                reason: "edge already present",
            }
            .into());
        }

        change.apply(&mut self.store)?;
        let id = match self.tree.push(self.current, change) {
            Ok(id) => id,
            Err(err) => {
                change.inverse().apply(&mut self.store)?;
                return Err(err);
            }
        };
        tracing::debug!("Recorded {} as revision {} under {}", change, id, self.current);
        self.current = id;
        Ok(id)
    }

    /// Plan the move from the current revision to `target` without applying it.
    pub fn plan_to(&self, target: RevisionId) -> Result<NavigationPlan> {
        navigator::plan(&self.tree, self.current, target)
    }

    /// Move to `target`, applying the whole plan. On failure the graph and
    /// position are left as they were.
    pub fn navigate(&mut self, target: RevisionId) -> Result<NavigationPlan> {
        let plan = self.begin_navigation(target)?.clone();
        self.finish_navigation()?;
        Ok(plan)
    }

    /// Start a stepwise navigation and return its plan. Edits are refused
    /// until [`Timeline::finish_navigation`] or
    /// [`Timeline::abort_navigation`].
    pub fn begin_navigation(&mut self, target: RevisionId) -> Result<&NavigationPlan> {
        if self.is_navigating() {
            return Err(TimelineError::NavigationInProgress);
        }
        let plan = self.plan_to(target)?;
        let pending = self.pending.insert(PendingNavigation {
            plan,
            next: 0,
            rollback: self.store.clone(),
        });
        Ok(&pending.plan)
    }

    /// Apply the next step of the pending navigation. Returns `None` once
    /// every step has been applied. A failing step aborts the navigation.
    pub fn step(&mut self) -> Result<Option<Change>> {
        let step = {
            let pending = self.pending.as_mut().ok_or(TimelineError::NotNavigating)?;
            match pending.plan.steps.get(pending.next) {
                Some(&step) => {
                    pending.next += 1;
                    step
                }
                None => return Ok(None),
            }
        };
        if let Err(err) = step.apply(&mut self.store) {
            tracing::warn!("Navigation step {} failed: {}", step, err);
            self.rollback();
            return Err(err.into());
        }
        tracing::debug!("Applied navigation step {}", step);
        Ok(Some(step))
    }

    /// Apply any remaining steps and move onto the target revision.
    pub fn finish_navigation(&mut self) -> Result<RevisionId> {
        while self.step()?.is_some() {}
        let pending = self.pending.take().ok_or(TimelineError::NotNavigating)?;
        let target = pending.plan.to;
        tracing::info!(
            "Navigated from {} to {} in {} step(s)",
            self.current,
            target,
            pending.plan.len()
        );
        self.current = target;
        Ok(target)
    }

    /// Drop the pending navigation and restore the graph it started from.
    pub fn abort_navigation(&mut self) -> Result<()> {
        if !self.is_navigating() {
            return Err(TimelineError::NotNavigating);
        }
        self.rollback();
        Ok(())
    }

    fn rollback(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.store = pending.rollback;
            tracing::debug!("Rolled back navigation to {}", pending.plan.to);
        }
    }

    /// k-core decomposition of the graph at the current revision.
    pub fn decompose(&self, options: &DecomposeOptions) -> Result<CoreDecomposition, GraphError> {
        decompose_with(&self.current_edges(), options)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
