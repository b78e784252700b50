//! Graph, partition and permutation primitives consumed by the search engines
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod partition;
pub mod permutation;

pub use self::graph::{Graph, GraphView};
pub use self::partition::Partition;
pub use self::permutation::Permutation;
