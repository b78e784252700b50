//! Correctness checks for search results
//!
//! These checks are independent of the searches that produce the results:
//! they re-derive equitability and adjacency preservation directly from the
//! graph, so a bookkeeping bug in a search cannot hide behind its own state.

use crate::algorithm::graph::isomorphism::{Mapping, TagCorrespondence};
use crate::algorithm::graph::refinement::{link_kinds, links_into};
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::{GraphView, Partition};

/// True when no cell of `partition` is shattered by any cell
pub fn is_equitable<G: GraphView + ?Sized>(graph: &G, partition: &Partition, tag_aware: bool) -> bool {
    let kinds = link_kinds(graph, tag_aware);
    partition.cells().iter().all(|cell| {
        (0..partition.cell_count()).all(|target| {
            kinds.iter().all(|&kind| {
                let expected = links_into(graph, partition, cell[0], target, kind);
                cell.iter()
                    .all(|&node| links_into(graph, partition, node, target, kind) == expected)
            })
        })
    })
}

/// Checks that `mapping` is an isomorphism from `graph1` onto `graph2`
///
/// Node labels and edge tags are compared only when `check_labels` is set.
pub fn verify_isomorphism<G>(
    graph1: &G,
    graph2: &G,
    mapping: &Mapping,
    check_labels: bool,
) -> Result<(), AlgorithmError>
where
    G: GraphView,
    G::Label: PartialEq,
{
    let n = graph1.node_count();
    if graph2.node_count() != n || mapping.len() != n {
        return Err(AlgorithmError::ExecutionError(format!(
            "mapping of size {} between graphs of {} and {} nodes",
            mapping.len(),
            n,
            graph2.node_count()
        )));
    }
    for node in 0..n {
        if mapping.backward()[mapping.forward()[node]] != node {
            return Err(AlgorithmError::ExecutionError(format!(
                "mapping is not a bijection at node {}",
                node
            )));
        }
    }

    let total1: usize = (0..n).map(|node| graph1.degree(node)).sum();
    let total2: usize = (0..n).map(|node| graph2.degree(node)).sum();
    if total1 != total2 {
        return Err(AlgorithmError::ExecutionError(format!(
            "graphs have {} and {} adjacency entries",
            total1, total2
        )));
    }

    let tags = TagCorrespondence::new(graph1, graph2);
    for from in 0..n {
        let image = mapping.forward()[from];
        if check_labels && graph1.label(from) != graph2.label(image) {
            return Err(AlgorithmError::ExecutionError(format!(
                "node {} and its image {} carry different labels",
                from, image
            )));
        }
        for &to in graph1.successors(from) {
            let to_image = mapping.forward()[to];
            let preserved = graph1.edge_count(from, to) == graph2.edge_count(image, to_image)
                && (!check_labels || tags.agree(graph1, graph2, (from, to), (image, to_image)));
            if !preserved {
                return Err(AlgorithmError::ExecutionError(format!(
                    "edge {} -> {} is not preserved by the mapping",
                    from, to
                )));
            }
        }
    }
    Ok(())
}
