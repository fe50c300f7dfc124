//! Test fixtures for Corescope

use crate::model::{edges_from_pairs, Edge, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Two loosely linked clusters, 20 nodes.
pub fn sample_graph() -> Vec<Edge> {
    edges_from_pairs([
        (1, 2), (1, 4), (1, 7), (1, 14), (1, 20), (2, 3), (2, 5), (2, 7), (2, 13),
        (3, 8), (3, 9), (4, 5), (4, 7), (5, 6), (5, 7), (6, 8), (6, 11),
        (6, 12), (7, 8), (8, 10), (15, 17), (16, 17), (17, 18), (17, 19), (18, 20),
        (19, 20),
    ])
}

/// Random simple graph with `m` distinct edges over nodes `0..n`.
pub fn random_graph(seed: u64, n: u64, m: usize) -> Vec<Edge> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(m);
    while edges.len() < m {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v {
            continue;
        }
        let edge = Edge::new(u, v);
        if seen.insert(edge.key()) {
            edges.push(edge);
        }
    }
    edges
}

/// Reference k-core: repeatedly delete nodes with fewer than `k` live
/// neighbors until none are left.
pub fn naive_k_core(edges: &[Edge], k: usize) -> BTreeSet<NodeId> {
    let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for edge in edges {
        adjacency.entry(edge.source).or_default().insert(edge.target);
        adjacency.entry(edge.target).or_default().insert(edge.source);
    }
    loop {
        let weak: Vec<NodeId> = adjacency
            .iter()
            .filter(|(_, nbrs)| nbrs.len() < k)
            .map(|(&n, _)| n)
            .collect();
        if weak.is_empty() {
            break;
        }
        for node in weak {
            if let Some(nbrs) = adjacency.remove(&node) {
                for nbr in nbrs {
                    if let Some(set) = adjacency.get_mut(&nbr) {
                        set.remove(&node);
                    }
                }
            }
        }
    }
    adjacency.into_keys().collect()
}
