//! Graph canonicalization and isomorphism engine
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>
//!
//! Computes canonical node orders, so that isomorphic graphs relabel to
//! identical graphs, and decides pairwise isomorphism with a verified
//! bijection. Graphs are read through the [`GraphView`] trait; [`Graph`] is
//! a ready-made adjacency-list implementation.
//!
//! ```
//! use motifcanon_core::{CanonicalLabeler, Graph, IsomorphismMatcher};
//!
//! let first: Graph = Graph::from_edges(3, true, &[(0, 1), (1, 2)]).unwrap();
//! let second: Graph = Graph::from_edges(3, true, &[(1, 2), (2, 0)]).unwrap();
//!
//! let matcher = IsomorphismMatcher::new(&first, &second, false).unwrap();
//! assert_eq!(matcher.mapping().unwrap().forward(), &[1, 2, 0]);
//!
//! let mut labeler = CanonicalLabeler::new();
//! let order = labeler.order_structure(&first).unwrap();
//! let other = labeler.order_structure(&second).unwrap();
//! assert_eq!(first.relabeled(&order).unwrap(), second.relabeled(&other).unwrap());
//! ```

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use crate::algorithm::{
    canonical_forms_par, is_isomorphic, isomorphism_classes, Algorithm, AlgorithmError,
    CanonicalForm, CanonicalLabeler, IsomorphismMatcher, Mapping, NodeId, PartitionRefiner,
    SearchConfig, SearchStatistics,
};
pub use crate::data_structures::{Graph, GraphView, Partition, Permutation};
