//! Revision tree: an arena of edits linked by parent/child ids

use std::collections::HashMap;
use std::fmt;

use corescope_core::{Edge, GraphError, GraphStore, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Identifier of a revision. Ids are dense, start at 1 for the root and
/// increase in creation order within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(pub u64);

impl RevisionId {
    pub const ROOT: RevisionId = RevisionId(1);
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    Remove,
}

impl Action {
    pub fn inverse(self) -> Self {
        match self {
            Action::Add => Action::Remove,
            Action::Remove => Action::Add,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => f.write_str("add"),
            Action::Remove => f.write_str("remove"),
        }
    }
}

/// A single edge edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    pub action: Action,
    pub source: NodeId,
    pub target: NodeId,
}

impl Change {
    pub fn new(action: Action, edge: Edge) -> Self {
        Change {
            action,
            source: edge.source,
            target: edge.target,
        }
    }

    pub fn edge(&self) -> Edge {
        Edge {
            source: self.source,
            target: self.target,
        }
    }

    /// The change that undoes this one.
    pub fn inverse(self) -> Self {
        Change {
            action: self.action.inverse(),
            ..self
        }
    }

    pub fn apply(&self, store: &mut GraphStore) -> Result<(), GraphError> {
        match self.action {
            Action::Add => store.add_edge(self.edge()).map(|_| ()),
            Action::Remove => store.remove_edge(self.edge()),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.edge())
    }
}

/// One node of the revision tree. The root carries no change.
#[derive(Debug, Clone)]
pub struct Revision {
    id: RevisionId,
    change: Option<Change>,
    parent: Option<RevisionId>,
    children: Vec<RevisionId>,
    depth: usize,
}

impl Revision {
    pub fn id(&self) -> RevisionId {
        self.id
    }

    pub fn change(&self) -> Option<Change> {
        self.change
    }

    pub fn parent(&self) -> Option<RevisionId> {
        self.parent
    }

    /// Children in creation order.
    pub fn children(&self) -> &[RevisionId] {
        &self.children
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Read-only nested view of a subtree, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionSnapshot {
    pub id: RevisionId,
    pub action: Option<Action>,
    pub source: Option<NodeId>,
    pub target: Option<NodeId>,
    pub children: Vec<RevisionSnapshot>,
}

/// Arena of revisions indexed by id. Revisions are never removed.
#[derive(Debug, Clone)]
pub struct RevisionTree {
    revisions: Vec<Revision>,
    next_id: u64,
}

impl RevisionTree {
    /// A tree holding only the root sentinel (id 1).
    pub fn new() -> Self {
        RevisionTree {
            revisions: vec![Revision {
                id: RevisionId::ROOT,
                change: None,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            next_id: RevisionId::ROOT.0 + 1,
        }
    }

    pub fn root(&self) -> RevisionId {
        RevisionId::ROOT
    }

    pub fn get(&self, id: RevisionId) -> Option<&Revision> {
        let index = id.0.checked_sub(1)?;
        self.revisions.get(usize::try_from(index).ok()?)
    }

    pub(crate) fn require(&self, id: RevisionId) -> Result<&Revision> {
        self.get(id).ok_or(TimelineError::NodeNotFound(id))
    }

    pub fn contains(&self, id: RevisionId) -> bool {
        self.get(id).is_some()
    }

    /// Number of revisions, root included.
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.len() <= 1
    }

    /// Append a child under `parent` and return its id.
    pub fn push(&mut self, parent: RevisionId, change: Change) -> Result<RevisionId> {
        let depth = self.require(parent)?.depth + 1;
        let id = RevisionId(self.next_id);
        self.next_id += 1;
        self.revisions.push(Revision {
            id,
            change: Some(change),
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        if let Some(parent) = self.revision_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    fn revision_mut(&mut self, id: RevisionId) -> Option<&mut Revision> {
        let index = usize::try_from(id.0.checked_sub(1)?).ok()?;
        self.revisions.get_mut(index)
    }

    /// Walk from `id` up to the root, `id` first.
    pub fn ancestors(&self, id: RevisionId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map(Revision::id),
        }
    }

    /// True when `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: RevisionId, node: RevisionId) -> bool {
        self.ancestors(node).skip(1).any(|r| r.id == ancestor)
    }

    /// Nested view of the whole tree.
    pub fn snapshot(&self) -> RevisionSnapshot {
        self.build_snapshot(RevisionId::ROOT)
            .unwrap_or_else(|| Self::leaf_snapshot(&self.revisions[0]))
    }

    /// Nested view of the subtree rooted at `id`.
    pub fn subtree(&self, id: RevisionId) -> Option<RevisionSnapshot> {
        self.build_snapshot(id)
    }

    // Explicit stack: long linear histories would overflow a recursive walk.
    fn build_snapshot(&self, id: RevisionId) -> Option<RevisionSnapshot> {
        let mut order = Vec::new();
        let mut stack = vec![self.get(id)?];
        while let Some(revision) = stack.pop() {
            order.push(revision);
            stack.extend(revision.children.iter().filter_map(|&c| self.get(c)));
        }

        // Children are always visited after their parent, so building in
        // reverse visit order finishes every child before its parent.
        let mut built: HashMap<RevisionId, RevisionSnapshot> = HashMap::new();
        for revision in order.into_iter().rev() {
            let mut snapshot = Self::leaf_snapshot(revision);
            snapshot.children = revision
                .children
                .iter()
                .filter_map(|c| built.remove(c))
                .collect();
            built.insert(revision.id, snapshot);
        }
        built.remove(&id)
    }

    fn leaf_snapshot(revision: &Revision) -> RevisionSnapshot {
        RevisionSnapshot {
            id: revision.id,
            action: revision.change.map(|c| c.action),
            source: revision.change.map(|c| c.source),
            target: revision.change.map(|c| c.target),
            children: Vec::new(),
        }
    }
}

impl Default for RevisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a revision and its ancestors.
pub struct Ancestors<'a> {
    tree: &'a RevisionTree,
    next: Option<RevisionId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Revision;

    fn next(&mut self) -> Option<Self::Item> {
        let revision = self.tree.get(self.next?)?;
        self.next = revision.parent;
        Some(revision)
    }
}
