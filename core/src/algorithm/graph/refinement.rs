//! Equitable Partition Refinement
//!
//! This module computes the coarsest equitable refinement of an ordered
//! partition: the result has no cell whose members disagree on how many
//! links they send into some other cell.
//!
//! # Mathematical Foundation
//!
//! A cell A is *shattered* by a cell B when the members of A have differing
//! link counts into B. Refinement repeatedly scans ordered pairs (A, B); on
//! the first shattering pair, A is replaced in place by sub-cells grouped by
//! their count into B, ordered by ascending count, and the scan restarts.
//! Every split strictly increases the number of cells, which is bounded by
//! the node count, so the procedure terminates.
//!
//! When the graph carries edge tags, each pair is first tested per tag in the
//! graph's own tag enumeration order; the first tag that shatters A decides
//! the split. Only if no tag shatters A is the all-edge count used, so
//! untagged edges still refine.
//!
//! Because new cell orders come only from counts, the refinement of
//! corresponding partitions of isomorphic graphs yields corresponding
//! partitions.
//!
//! # Performance Characteristics
//!
//! - Time Complexity: O(n^2 * k^2 * t) worst case for n nodes, k cells, t tags
//! - Space Complexity: O(n)

use std::collections::BTreeMap;

use log::trace;

use crate::algorithm::config::SearchConfig;
use crate::algorithm::traits::{
    parse_bool_parameter, Algorithm, AlgorithmError, AlgorithmParameter, ParameterType,
};
use crate::data_structures::{GraphView, Partition};
use crate::validation::correctness::is_equitable;

/// Link-count criterion used when testing one cell against another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkKind {
    /// Edges carrying the tag at this enumeration index
    Tag(usize),
    /// All edges
    Any,
}

/// Counts links from `node` into cell `target` of `partition`
pub(crate) fn links_into<G: GraphView + ?Sized>(
    graph: &G,
    partition: &Partition,
    node: usize,
    target: usize,
    kind: LinkKind,
) -> usize {
    match kind {
        LinkKind::Any => graph
            .successors(node)
            .iter()
            .filter(|&&successor| partition.cell_of(successor) == target)
            .count(),
        LinkKind::Tag(tag) => partition.cells()[target]
            .iter()
            .map(|&member| graph.tagged_edge_count(node, member, tag))
            .sum(),
    }
}

/// The link criteria tested for each cell pair, in order
pub(crate) fn link_kinds<G: GraphView + ?Sized>(graph: &G, tag_aware: bool) -> Vec<LinkKind> {
    let mut kinds: Vec<LinkKind> = if tag_aware && graph.has_tags() {
        (0..graph.tags().len()).map(LinkKind::Tag).collect()
    } else {
        Vec::new()
    };
    kinds.push(LinkKind::Any);
    kinds
}

/// Equitable partition refiner
#[derive(Debug, Clone)]
pub struct PartitionRefiner {
    /// Refine per edge tag when the graph carries tags
    tag_aware: bool,
}

impl PartitionRefiner {
    pub fn new() -> Self {
        Self { tag_aware: true }
    }

    pub fn with_config(config: &SearchConfig) -> Self {
        Self { tag_aware: config.tag_aware }
    }

    #[inline]
    pub fn is_tag_aware(&self) -> bool {
        self.tag_aware
    }

    /// Returns the coarsest equitable refinement of `partition`
    ///
    /// The partition must range over exactly the graph's nodes.
    pub fn refine<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        partition: Partition,
    ) -> Result<Partition, AlgorithmError> {
        if partition.node_count() != graph.node_count() {
            return Err(AlgorithmError::invalid_parameter(
                "partition",
                format!(
                    "partition covers {} nodes but the graph has {}",
                    partition.node_count(),
                    graph.node_count()
                ),
            ));
        }

        let kinds = link_kinds(graph, self.tag_aware);
        let mut partition = partition;
        let initial_cells = partition.cell_count();

        'scan: loop {
            for source in 0..partition.cell_count() {
                if partition.cells()[source].len() < 2 {
                    continue;
                }
                for target in 0..partition.cell_count() {
                    if let Some(parts) = shatter(graph, &partition, source, target, &kinds) {
                        partition.split_cell(source, parts);
                        continue 'scan;
                    }
                }
            }
            break;
        }

        trace!(
            "refined {} cells into {} over {} nodes",
            initial_cells,
            partition.cell_count(),
            partition.node_count()
        );
        debug_assert!(is_equitable(graph, &partition, self.tag_aware));
        Ok(partition)
    }
}

/// Splits cell `source` by its link counts into cell `target`, using the
/// first criterion under which the counts are not uniform
fn shatter<G: GraphView + ?Sized>(
    graph: &G,
    partition: &Partition,
    source: usize,
    target: usize,
    kinds: &[LinkKind],
) -> Option<Vec<Vec<usize>>> {
    let members = &partition.cells()[source];
    for &kind in kinds {
        let counts: Vec<usize> = members
            .iter()
            .map(|&node| links_into(graph, partition, node, target, kind))
            .collect();
        if counts.iter().any(|&count| count != counts[0]) {
            let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (&node, &count) in members.iter().zip(&counts) {
                groups.entry(count).or_default().push(node);
            }
            return Some(groups.into_values().collect());
        }
    }
    None
}

impl Default for PartitionRefiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for PartitionRefiner {
    fn name(&self) -> &'static str {
        "Equitable Partition Refinement"
    }

    fn category(&self) -> &'static str {
        "graph_analysis"
    }

    fn description(&self) -> String {
        "Coarsest equitable refinement of an ordered node partition, splitting cells by \
         link counts into other cells (per edge tag when available). Polynomial time."
            .to_string()
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![AlgorithmParameter {
            name: "tag_aware".to_string(),
            value: self.tag_aware.to_string(),
            value_type: ParameterType::Boolean,
            description: "Split cells per edge tag before using plain link counts".to_string(),
        }]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "tag_aware" => {
                self.tag_aware = parse_bool_parameter(name, value)?;
                Ok(())
            }
            _ => Err(AlgorithmError::invalid_parameter(
                name,
                format!("Unknown parameter: {}", name),
            )),
        }
    }
}
