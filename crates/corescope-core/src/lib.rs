//! Corescope Core — graph store, k-core decomposition, and edge list I/O

pub mod decompose;
pub mod edge_list;
pub mod error;
pub mod graph;
pub mod model;


#[cfg(test)]
pub mod test_utils;

pub use decompose::{
    core_numbers, decompose, decompose_with, CoreDecomposition, CoreIndex, CoreLevel,
    DecomposeOptions, KCore, SelfLoopPolicy,
};
pub use edge_list::{
    parse_edge_list, read_edge_list, write_edge_list, EdgeListError, EdgeListReader,
};
pub use error::GraphError;
pub use graph::GraphStore;
pub use model::{edges_from_pairs, Edge, EdgeKey, NodeId};
