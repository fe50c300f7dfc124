//! k-core decomposition by bucket-queue peeling
//!
//! Core numbers are computed once in O(V + E). Every per-level view (the
//! cumulative k-core, the nodes whose coreness is exactly k, and the edges
//! pruned when stepping down from the (k+1)-core) is derived from them
//! without peeling again.

use crate::error::{GraphError, Result};
use crate::model::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// What to do with `(v, v)` edges in a decomposition request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    /// Fail with [`GraphError::InvalidEdge`].
    #[default]
    Reject,
    /// Drop the edge and carry on.
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeOptions {
    pub self_loops: SelfLoopPolicy,
}

/// One level of the decomposition.
///
/// For the highest level this is the whole max-core. Below it, only the
/// nodes and edges that the level adds on top of the level above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreLevel {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<Edge>,
    /// Edges dropped when going from the (k+1)-core view down to this one.
    pub pruned_edges: BTreeSet<Edge>,
}

/// Levels keyed by k. Levels with no node of coreness exactly k are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreDecomposition {
    levels: BTreeMap<usize, CoreLevel>,
}

impl CoreDecomposition {
    pub fn get(&self, k: usize) -> Option<&CoreLevel> {
        self.levels.get(&k)
    }

    pub fn max_core(&self) -> usize {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    /// Levels from the highest k down.
    pub fn levels(&self) -> impl Iterator<Item = (usize, &CoreLevel)> {
        self.levels.iter().rev().map(|(k, level)| (*k, level))
    }

    /// Level a node was placed in, i.e. its core number.
    pub fn level_of(&self, node: NodeId) -> Option<usize> {
        self.levels
            .iter()
            .find(|(_, level)| level.nodes.contains(&node))
            .map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<usize, CoreLevel> {
        self.levels
    }
}

/// The cumulative k-core: the induced subgraph on nodes with core number ≥ k.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KCore {
    pub k: usize,
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<Edge>,
}

/// Core numbers of a transient graph built from an edge list.
#[derive(Debug, Clone)]
pub struct CoreIndex {
    nodes: Vec<NodeId>,
    index_of: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<usize>>,
    /// Deduplicated edges as dense index pairs, in submitted orientation.
    edges: Vec<(usize, usize)>,
    orientations: HashMap<EdgeKey, Edge>,
    core: Vec<usize>,
}

impl CoreIndex {
    /// Build the transient graph and peel it.
    ///
    /// Repeated pairs (in either orientation) are ignored after the first;
    /// the first orientation is the one reported.
    pub fn build(edges: &[Edge], options: &DecomposeOptions) -> Result<Self> {
        if edges.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let mut index_of: HashMap<NodeId, usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut adjacency: Vec<Vec<usize>> = Vec::new();
        let mut oriented = Vec::new();
        let mut orientations = HashMap::new();
        let mut seen = HashSet::new();

        for &edge in edges {
            if edge.is_self_loop() {
                match options.self_loops {
                    SelfLoopPolicy::Reject => {
                        tracing::warn!("Rejecting self-loop {}", edge);
                        return Err(GraphError::self_loop(edge));
                    }
                    SelfLoopPolicy::Ignore => {
                        tracing::debug!("Ignoring self-loop {}", edge);
                        continue;
                    }
                }
            }
            if !seen.insert(edge.key()) {
                continue;
            }
            let s = intern(&mut index_of, &mut nodes, &mut adjacency, edge.source);
            let t = intern(&mut index_of, &mut nodes, &mut adjacency, edge.target);
            adjacency[s].push(t);
            adjacency[t].push(s);
            oriented.push((s, t));
            orientations.insert(edge.key(), edge);
        }

        if oriented.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let core = peel(&adjacency);
        Ok(CoreIndex {
            nodes,
            index_of,
            adjacency,
            edges: oriented,
            orientations,
            core,
        })
    }

    pub fn max_core(&self) -> usize {
        self.core.iter().copied().max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn core_number(&self, node: NodeId) -> Option<usize> {
        self.index_of.get(&node).map(|&i| self.core[i])
    }

    pub fn core_numbers(&self) -> BTreeMap<NodeId, usize> {
        self.nodes
            .iter()
            .copied()
            .zip(self.core.iter().copied())
            .collect()
    }

    /// The cumulative k-core. Empty when `k` exceeds the max core.
    pub fn k_core(&self, k: usize) -> KCore {
        let nodes = (0..self.nodes.len())
            .filter(|&i| self.core[i] >= k)
            .map(|i| self.nodes[i])
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|&&(s, t)| self.core[s] >= k && self.core[t] >= k)
            .map(|&(s, t)| self.edge(s, t))
            .collect();
        KCore { k, nodes, edges }
    }

    /// Partition the graph into levels by exact coreness.
    pub fn levels(&self) -> CoreDecomposition {
        let max = self.max_core();
        let mut by_core: Vec<Vec<usize>> = vec![Vec::new(); max + 1];
        for (i, &c) in self.core.iter().enumerate() {
            by_core[c].push(i);
        }
        // An edge first appears in the k-core for k = the smaller endpoint core.
        let mut edges_by_core: Vec<Vec<Edge>> = vec![Vec::new(); max + 1];
        for &(s, t) in &self.edges {
            edges_by_core[self.core[s].min(self.core[t])].push(self.edge(s, t));
        }

        let mut levels = BTreeMap::new();
        for k in (1..=max).rev() {
            let pruned_nodes = &by_core[k];
            if pruned_nodes.is_empty() {
                continue;
            }
            let nodes = pruned_nodes.iter().map(|&i| self.nodes[i]).collect();
            let edges = edges_by_core[k].iter().copied().collect();
            let pruned_edges = if k == max {
                BTreeSet::new()
            } else {
                self.pruned_edges(pruned_nodes, k)
            };
            levels.insert(
                k,
                CoreLevel {
                    nodes,
                    edges,
                    pruned_edges,
                },
            );
        }

        tracing::debug!(
            "Decomposed {} nodes, {} edges into {} levels (max core {})",
            self.nodes.len(),
            self.edges.len(),
            levels.len(),
            max
        );
        CoreDecomposition { levels }
    }

    /// Edges from nodes leaving at level k to neighbors still in the k-core.
    /// Both endpoints of an edge between two leaving nodes are visited, so
    /// those edges are covered too.
    fn pruned_edges(&self, pruned_nodes: &[usize], k: usize) -> BTreeSet<Edge> {
        let mut pruned = BTreeSet::new();
        for &v in pruned_nodes {
            for &u in &self.adjacency[v] {
                if self.core[u] >= k {
                    pruned.insert(self.edge(v, u));
                }
            }
        }
        pruned
    }

    fn edge(&self, a: usize, b: usize) -> Edge {
        let (a, b) = (self.nodes[a], self.nodes[b]);
        self.orientations
            .get(&EdgeKey::new(a, b))
            .copied()
            .unwrap_or(Edge { source: a, target: b })
    }
}

fn intern(
    index_of: &mut HashMap<NodeId, usize>,
    nodes: &mut Vec<NodeId>,
    adjacency: &mut Vec<Vec<usize>>,
    node: NodeId,
) -> usize {
    *index_of.entry(node).or_insert_with(|| {
        nodes.push(node);
        adjacency.push(Vec::new());
        nodes.len() - 1
    })
}

/// Batagelj–Zaversnik peeling. `vert` holds nodes sorted by current degree,
/// `bin[d]` is the first slot of degree `d`, `pos` is the inverse of `vert`.
fn peel(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();
    let max_degree = degree.iter().copied().max().unwrap_or(0);

    let mut bin = vec![0usize; max_degree + 1];
    for &d in &degree {
        bin[d] += 1;
    }
    let mut start = 0;
    for slot in bin.iter_mut() {
        let count = *slot;
        *slot = start;
        start += count;
    }

    let mut pos = vec![0usize; n];
    let mut vert = vec![0usize; n];
    for v in 0..n {
        pos[v] = bin[degree[v]];
        vert[pos[v]] = v;
        bin[degree[v]] += 1;
    }
    for d in (1..=max_degree).rev() {
        bin[d] = bin[d - 1];
    }
    bin[0] = 0;

    for i in 0..n {
        let v = vert[i];
        for &u in &adjacency[v] {
            if degree[u] > degree[v] {
                let du = degree[u];
                let pu = pos[u];
                let pw = bin[du];
                let w = vert[pw];
                if u != w {
                    pos[u] = pw;
                    vert[pu] = w;
                    pos[w] = pu;
                    vert[pw] = u;
                }
                bin[du] += 1;
                degree[u] -= 1;
            }
        }
    }
    degree
}

/// Full decomposition with default options (self-loops rejected).
pub fn decompose(edges: &[Edge]) -> Result<CoreDecomposition> {
    decompose_with(edges, &DecomposeOptions::default())
}

pub fn decompose_with(edges: &[Edge], options: &DecomposeOptions) -> Result<CoreDecomposition> {
    Ok(CoreIndex::build(edges, options)?.levels())
}

/// Core number of every node in the edge list.
pub fn core_numbers(edges: &[Edge]) -> Result<BTreeMap<NodeId, usize>> {
    Ok(CoreIndex::build(edges, &DecomposeOptions::default())?.core_numbers())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<T: Ord + Copy>(items: &[T]) -> BTreeSet<T> {
        items.iter().copied().collect()
    }

    fn ids(items: &[u64]) -> BTreeSet<NodeId> {
        items.iter().map(|&i| NodeId(i)).collect()
    }

    #[test]
    fn triangle_with_tail() {
        let edges = edges_from_pairs([(1, 2), (2, 3), (3, 1), (3, 4)]);
        let result = decompose(&edges).unwrap();

        assert_eq!(result.len(), 2);
        let top = result.get(2).unwrap();
        assert_eq!(top.nodes, ids(&[1, 2, 3]));
        assert_eq!(
            top.edges,
            set(&[Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 1)])
        );
        assert!(top.pruned_edges.is_empty());

        let tail = result.get(1).unwrap();
        assert_eq!(tail.nodes, ids(&[4]));
        assert_eq!(tail.edges, set(&[Edge::new(3, 4)]));
        assert_eq!(tail.pruned_edges, set(&[Edge::new(3, 4)]));
    }

    #[test]
    fn levels_without_exact_coreness_are_skipped() {
        // K4 has core 3, the pendant node core 1, nothing has core 2.
        let edges = edges_from_pairs([(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4), (4, 5)]);
        let result = decompose(&edges).unwrap();

        assert_eq!(result.levels().map(|(k, _)| k).collect::<Vec<_>>(), vec![3, 1]);
        assert!(result.get(2).is_none());
        assert_eq!(result.get(3).unwrap().edges.len(), 6);
        assert_eq!(result.get(1).unwrap().pruned_edges, set(&[Edge::new(4, 5)]));
        assert_eq!(result.level_of(NodeId(5)), Some(1));
        assert_eq!(result.max_core(), 3);
    }

    #[test]
    fn orientation_is_preserved() {
        let edges = edges_from_pairs([(2, 1), (3, 2), (1, 3), (4, 3)]);
        let result = decompose(&edges).unwrap();
        assert_eq!(
            result.get(2).unwrap().edges,
            set(&[Edge::new(2, 1), Edge::new(3, 2), Edge::new(1, 3)])
        );
        assert_eq!(result.get(1).unwrap().pruned_edges, set(&[Edge::new(4, 3)]));
    }

    #[test]
    fn duplicates_keep_first_orientation() {
        let edges = edges_from_pairs([(1, 2), (2, 1), (1, 2)]);
        let index = CoreIndex::build(&edges, &DecomposeOptions::default()).unwrap();
        assert_eq!(index.edge_count(), 1);
        assert_eq!(index.core_number(NodeId(1)), Some(1));
        assert_eq!(index.k_core(1).edges, set(&[Edge::new(1, 2)]));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(decompose(&[]).unwrap_err(), GraphError::EmptyGraph);
    }

    #[test]
    fn self_loop_policy() {
        let edges = edges_from_pairs([(1, 2), (2, 2)]);
        assert!(matches!(
            decompose(&edges).unwrap_err(),
            GraphError::InvalidEdge { .. }
        ));

        let options = DecomposeOptions {
            self_loops: SelfLoopPolicy::Ignore,
        };
        let result = decompose_with(&edges, &options).unwrap();
        assert_eq!(result.get(1).unwrap().nodes, ids(&[1, 2]));

        let only_loops = edges_from_pairs([(7, 7)]);
        assert_eq!(
            decompose_with(&only_loops, &options).unwrap_err(),
            GraphError::EmptyGraph
        );
    }

    #[test]
    fn core_numbers_of_path_and_cycle() {
        let numbers = core_numbers(&edges_from_pairs([(1, 2), (2, 3), (3, 4)])).unwrap();
        assert!(numbers.values().all(|&c| c == 1));

        let numbers = core_numbers(&edges_from_pairs([(1, 2), (2, 3), (3, 4), (4, 1)])).unwrap();
        assert!(numbers.values().all(|&c| c == 2));
    }

    #[test]
    fn k_core_above_max_is_empty() {
        let index = CoreIndex::build(
            &edges_from_pairs([(1, 2), (2, 3), (3, 1)]),
            &DecomposeOptions::default(),
        )
        .unwrap();
        let core = index.k_core(3);
        assert!(core.nodes.is_empty());
        assert!(core.edges.is_empty());
    }

    #[test]
    fn decomposition_serializes_by_level() {
        let result = decompose(&edges_from_pairs([(1, 2)])).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "1": { "nodes": [1, 2], "edges": [[1, 2]], "pruned_edges": [] }
            })
        );
    }
}
