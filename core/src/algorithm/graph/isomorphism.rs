//! Graph Isomorphism Detection with VF2-style State Space Search
//!
//! This module decides whether two graphs admit a structure-preserving (and
//! optionally label-preserving) bijection, and produces one when they do.
//!
//! # Mathematical Foundation
//!
//! The search extends a partial mapping one node pair at a time. Alongside
//! the mapping it keeps, for each graph, a *frontier*: the unmapped nodes
//! adjacent to the mapped ones, each tagged with the depth at which it first
//! became adjacent. An isomorphism extending the current mapping must send
//! frontier nodes to frontier nodes, so:
//!
//! - if both frontiers are non-empty, the lowest frontier node of the second
//!   graph is paired with every frontier node of the first graph in turn;
//! - if both are empty (a component boundary), the lowest unmapped node of
//!   the second graph is paired with every unmapped node of the first;
//! - if exactly one is empty, no extension exists and the branch fails.
//!
//! Before a pair is committed it must pass the feasibility rules: equal
//! labels (when checked), equal degrees, agreement on every already-mapped
//! neighbour, and equal counts of neighbours in the frontier and outside
//! both mapping and frontier.
//!
//! # Bookkeeping
//!
//! The search runs on an explicit stack. Each committed pair leaves an undo
//! record holding the pair, the prior frontier depths of both nodes and the
//! nodes it added to each frontier; backtracking replays it in reverse. An
//! exhausted or aborted search therefore leaves the state exactly as empty
//! as it started.
//!
//! # Performance Characteristics
//!
//! - Time Complexity: O(n! * n) worst case, near-linear on rigid graphs
//! - Space Complexity: O(n^2) for the stack of candidate lists

use std::time::Instant;

use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};

use crate::algorithm::config::SearchConfig;
use crate::algorithm::traits::{AlgorithmError, SearchStatistics};
use crate::data_structures::GraphView;
use crate::validation::correctness::verify_isomorphism;

/// A bijection between the nodes of two graphs, readable in both directions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mapping {
    forward: Vec<usize>,
    backward: Vec<usize>,
}

impl Mapping {
    /// Builds a mapping from its first-to-second direction
    pub fn from_forward(forward: Vec<usize>) -> Result<Self, AlgorithmError> {
        let mut backward = vec![usize::MAX; forward.len()];
        for (node, &image) in forward.iter().enumerate() {
            if image >= forward.len() || backward[image] != usize::MAX {
                return Err(AlgorithmError::invalid_parameter(
                    "mapping",
                    format!("{:?} is not a bijection", forward),
                ));
            }
            backward[image] = node;
        }
        Ok(Self { forward, backward })
    }

    /// Image in the second graph of each node of the first
    #[inline]
    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    /// Preimage in the first graph of each node of the second
    #[inline]
    pub fn backward(&self) -> &[usize] {
        &self.backward
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Pairs each tag of the first graph with the equal tag of the second
#[derive(Debug, Clone)]
pub(crate) struct TagCorrespondence {
    /// Second-graph index of each first-graph tag, if present
    forward: Vec<Option<usize>>,
    /// Second-graph tags with no counterpart in the first graph
    unmatched: Vec<usize>,
}

impl TagCorrespondence {
    pub(crate) fn new<G: GraphView>(graph1: &G, graph2: &G) -> Self {
        let forward: Vec<Option<usize>> = graph1
            .tags()
            .iter()
            .map(|tag| graph2.tags().iter().position(|other| other == tag))
            .collect();
        let unmatched = (0..graph2.tags().len())
            .filter(|index| !forward.contains(&Some(*index)))
            .collect();
        Self { forward, unmatched }
    }

    /// True when edges `edge1` and `edge2` carry the same multiset of tags
    ///
    /// Total edge counts are assumed equal; untagged edges then agree too.
    pub(crate) fn agree<G: GraphView>(
        &self,
        graph1: &G,
        graph2: &G,
        (from1, to1): (usize, usize),
        (from2, to2): (usize, usize),
    ) -> bool {
        let mapped_agree = self.forward.iter().enumerate().all(|(tag1, tag2)| {
            let count2 = tag2.map_or(0, |tag2| graph2.tagged_edge_count(from2, to2, tag2));
            graph1.tagged_edge_count(from1, to1, tag1) == count2
        });
        mapped_agree
            && self
                .unmatched
                .iter()
                .all(|&tag2| graph2.tagged_edge_count(from2, to2, tag2) == 0)
    }
}

/// Mapping and frontier bookkeeping for one of the two graphs
#[derive(Debug, Clone)]
struct Side {
    /// Image of each node in the other graph
    core: Vec<Option<usize>>,
    /// Depth at which each unmapped node joined the frontier
    frontier: Vec<Option<usize>>,
    frontier_len: usize,
}

impl Side {
    fn new(node_count: usize) -> Self {
        Self {
            core: vec![None; node_count],
            frontier: vec![None; node_count],
            frontier_len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.frontier_len == 0 && self.core.iter().all(Option::is_none)
    }

    fn frontier_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.frontier
            .iter()
            .enumerate()
            .filter(|(_, depth)| depth.is_some())
            .map(|(node, _)| node)
    }

    fn unmapped_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.core
            .iter()
            .enumerate()
            .filter(|(_, image)| image.is_none())
            .map(|(node, _)| node)
    }

    /// Counts `node`'s neighbours in the frontier and outside both the
    /// mapping and the frontier
    fn classify_neighbors<G: GraphView>(&self, graph: &G, node: usize) -> (usize, usize) {
        let mut in_frontier = 0;
        let mut outside = 0;
        for &neighbor in graph.successors(node).iter().chain(graph.predecessors(node)) {
            if self.frontier[neighbor].is_some() {
                in_frontier += 1;
            } else if self.core[neighbor].is_none() {
                outside += 1;
            }
        }
        (in_frontier, outside)
    }

    /// Maps `node` to `image` at `depth`, returning its prior frontier depth
    /// and the nodes newly added to the frontier
    fn enter<G: GraphView>(
        &mut self,
        graph: &G,
        node: usize,
        image: usize,
        depth: usize,
    ) -> (Option<usize>, Vec<usize>) {
        let previous = self.frontier[node].take();
        if previous.is_some() {
            self.frontier_len -= 1;
        }
        self.core[node] = Some(image);

        let mut added = Vec::new();
        for &neighbor in graph.successors(node).iter().chain(graph.predecessors(node)) {
            if self.core[neighbor].is_none() && self.frontier[neighbor].is_none() {
                self.frontier[neighbor] = Some(depth);
                added.push(neighbor);
            }
        }
        self.frontier_len += added.len();
        (previous, added)
    }

    fn leave(&mut self, node: usize, previous: Option<usize>, added: &[usize]) {
        for &neighbor in added {
            self.frontier[neighbor] = None;
        }
        self.frontier_len -= added.len();
        self.core[node] = None;
        if previous.is_some() {
            self.frontier_len += 1;
        }
        self.frontier[node] = previous;
    }
}

/// Everything needed to reverse one committed pair
#[derive(Debug)]
struct Undo {
    node1: usize,
    node2: usize,
    previous1: Option<usize>,
    previous2: Option<usize>,
    added1: Vec<usize>,
    added2: Vec<usize>,
}

/// Partial mapping between two graphs with its frontiers
#[derive(Debug, Clone)]
struct MatchState {
    side1: Side,
    side2: Side,
    depth: usize,
}

impl MatchState {
    fn new(node_count: usize) -> Self {
        Self {
            side1: Side::new(node_count),
            side2: Side::new(node_count),
            depth: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.side2.core.iter().all(Option::is_some)
    }

    fn is_empty(&self) -> bool {
        self.depth == 0 && self.side1.is_empty() && self.side2.is_empty()
    }

    fn commit<G: GraphView>(&mut self, graph1: &G, graph2: &G, node1: usize, node2: usize) -> Undo {
        let depth = self.depth;
        let (previous1, added1) = self.side1.enter(graph1, node1, node2, depth);
        let (previous2, added2) = self.side2.enter(graph2, node2, node1, depth);
        self.depth += 1;
        Undo { node1, node2, previous1, previous2, added1, added2 }
    }

    fn rollback(&mut self, undo: Undo) {
        self.depth -= 1;
        self.side2.leave(undo.node2, undo.previous2, &undo.added2);
        self.side1.leave(undo.node1, undo.previous1, &undo.added1);
    }

    /// Chooses the next node of the second graph and its candidate partners,
    /// or `None` when exactly one frontier is empty
    fn next_frame(&self) -> Option<Frame> {
        let frontier1 = self.side1.frontier_len > 0;
        let frontier2 = self.side2.frontier_len > 0;
        let (node2, candidates): (usize, Vec<usize>) = match (frontier1, frontier2) {
            (true, true) => (
                self.side2.frontier_nodes().next()?,
                self.side1.frontier_nodes().collect(),
            ),
            (false, false) => (
                self.side2.unmapped_nodes().next()?,
                self.side1.unmapped_nodes().collect(),
            ),
            _ => return None,
        };
        Some(Frame { node2, candidates, cursor: 0, undo: None })
    }

    fn is_feasible<G>(
        &self,
        graph1: &G,
        graph2: &G,
        tags: &TagCorrespondence,
        check_labels: bool,
        node1: usize,
        node2: usize,
    ) -> bool
    where
        G: GraphView,
        G::Label: PartialEq,
    {
        if check_labels && graph1.label(node1) != graph2.label(node2) {
            return false;
        }

        if graph1.degree(node1) != graph2.degree(node2)
            || (graph1.is_directed() && graph1.in_degree(node1) != graph2.in_degree(node2))
        {
            return false;
        }

        let edges_agree = |pair1: (usize, usize), pair2: (usize, usize)| {
            graph1.edge_count(pair1.0, pair1.1) == graph2.edge_count(pair2.0, pair2.1)
                && (!check_labels || tags.agree(graph1, graph2, pair1, pair2))
        };
        let links_agree = |other1: usize, other2: usize| {
            edges_agree((node1, other1), (node2, other2)) && edges_agree((other1, node1), (other2, node2))
        };

        if !links_agree(node1, node2) {
            return false;
        }
        for &neighbor1 in graph1.successors(node1).iter().chain(graph1.predecessors(node1)) {
            if let Some(neighbor2) = self.side1.core[neighbor1] {
                if !links_agree(neighbor1, neighbor2) {
                    return false;
                }
            }
        }
        for &neighbor2 in graph2.successors(node2).iter().chain(graph2.predecessors(node2)) {
            if let Some(neighbor1) = self.side2.core[neighbor2] {
                if !links_agree(neighbor1, neighbor2) {
                    return false;
                }
            }
        }

        self.side1.classify_neighbors(graph1, node1) == self.side2.classify_neighbors(graph2, node2)
    }
}

/// One level of the explicit search stack
#[derive(Debug)]
struct Frame {
    node2: usize,
    candidates: Vec<usize>,
    cursor: usize,
    /// Set while a candidate from this frame is committed
    undo: Option<Undo>,
}

/// Pairwise isomorphism search between two graphs
///
/// The search runs once, at construction. Each instance owns its search
/// state, so concurrent callers each build their own matcher.
#[derive(Debug, Clone)]
pub struct IsomorphismMatcher {
    check_labels: bool,
    mapping: Option<Mapping>,
    statistics: SearchStatistics,
}

impl IsomorphismMatcher {
    /// Searches for an isomorphism with the default configuration
    pub fn new<G>(graph1: &G, graph2: &G, check_labels: bool) -> Result<Self, AlgorithmError>
    where
        G: GraphView,
        G::Label: PartialEq,
    {
        Self::with_config(graph1, graph2, check_labels, &SearchConfig::default())
    }

    /// Searches for an isomorphism under `config`
    ///
    /// Fails before searching when either graph is malformed or the graphs
    /// differ in directedness. A `ResourceExhausted` error means the outcome
    /// is unknown.
    pub fn with_config<G>(
        graph1: &G,
        graph2: &G,
        check_labels: bool,
        config: &SearchConfig,
    ) -> Result<Self, AlgorithmError>
    where
        G: GraphView,
        G::Label: PartialEq,
    {
        graph1.validate()?;
        graph2.validate()?;
        if graph1.is_directed() != graph2.is_directed() {
            return Err(AlgorithmError::IncompatibleGraphs(format!(
                "cannot match a {} graph against a {} graph",
                direction_name(graph1.is_directed()),
                direction_name(graph2.is_directed())
            )));
        }

        let mut matcher = Self {
            check_labels,
            mapping: None,
            statistics: SearchStatistics::default(),
        };
        let start_time = Instant::now();

        if are_potentially_isomorphic(graph1, graph2) {
            debug!(
                "matching graphs of {} nodes (check_labels = {})",
                graph1.node_count(),
                check_labels
            );
            let mapping = matcher.search(graph1, graph2, config)?;
            if let Some(mapping) = &mapping {
                if config.verify_results {
                    verify_isomorphism(graph1, graph2, mapping, check_labels)?;
                }
            }
            matcher.mapping = mapping;
        } else {
            matcher.statistics.states_pruned += 1;
        }

        matcher.statistics.record_elapsed(start_time.elapsed());
        debug!(
            "isomorphism search finished: matched = {}, {} states explored, {} pruned",
            matcher.matches(),
            matcher.statistics.states_explored,
            matcher.statistics.states_pruned
        );
        Ok(matcher)
    }

    /// Whether the graphs are isomorphic
    #[inline]
    pub fn matches(&self) -> bool {
        self.mapping.is_some()
    }

    /// The verified bijection, when one exists
    #[inline]
    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }

    #[inline]
    pub fn checks_labels(&self) -> bool {
        self.check_labels
    }

    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn search<G>(
        &mut self,
        graph1: &G,
        graph2: &G,
        config: &SearchConfig,
    ) -> Result<Option<Mapping>, AlgorithmError>
    where
        G: GraphView,
        G::Label: PartialEq,
    {
        let node_count = graph1.node_count();
        let mut state = MatchState::new(node_count);
        if node_count == 0 {
            self.statistics.leaves_visited += 1;
            return Ok(Some(Mapping { forward: Vec::new(), backward: Vec::new() }));
        }

        let tags = TagCorrespondence::new(graph1, graph2);
        let mut stack: Vec<Frame> = state.next_frame().into_iter().collect();

        while let Some(frame) = stack.last_mut() {
            if let Some(undo) = frame.undo.take() {
                trace!("backtracking {} -> {} at depth {}", undo.node1, undo.node2, state.depth - 1);
                state.rollback(undo);
            }

            let mut committed = false;
            while frame.cursor < frame.candidates.len() {
                let node1 = frame.candidates[frame.cursor];
                frame.cursor += 1;
                self.statistics.states_explored += 1;
                if let Err(err) = config.check_budget(self.statistics.states_explored) {
                    warn!("isomorphism search abandoned: {}", err);
                    unwind(&mut state, &mut stack);
                    return Err(err);
                }

                if state.is_feasible(graph1, graph2, &tags, self.check_labels, node1, frame.node2) {
                    frame.undo = Some(state.commit(graph1, graph2, node1, frame.node2));
                    committed = true;
                    break;
                }
                self.statistics.states_pruned += 1;
            }

            if !committed {
                stack.pop();
                continue;
            }

            self.statistics.record_depth(state.depth);
            if state.is_complete() {
                self.statistics.leaves_visited += 1;
                let forward = state.side1.core.iter().flatten().copied().collect();
                let backward = state.side2.core.iter().flatten().copied().collect();
                return Ok(Some(Mapping { forward, backward }));
            }
            match state.next_frame() {
                Some(next) => stack.push(next),
                // One frontier emptied before the other: retry this frame
                None => self.statistics.states_pruned += 1,
            }
        }

        debug_assert!(state.is_empty());
        Ok(None)
    }
}

/// Rolls back every committed pair on the stack, deepest first
fn unwind(state: &mut MatchState, stack: &mut Vec<Frame>) {
    while let Some(frame) = stack.pop() {
        if let Some(undo) = frame.undo {
            state.rollback(undo);
        }
    }
    debug_assert!(state.is_empty());
}

/// Cheap necessary conditions: equal node counts and degree sequences
fn are_potentially_isomorphic<G: GraphView>(graph1: &G, graph2: &G) -> bool {
    if graph1.node_count() != graph2.node_count() {
        return false;
    }
    let degree_sequence = |graph: &G| {
        let mut degrees: Vec<(usize, usize)> = (0..graph.node_count())
            .map(|node| (graph.degree(node), graph.in_degree(node)))
            .collect();
        degrees.sort_unstable();
        degrees
    };
    degree_sequence(graph1) == degree_sequence(graph2)
}

fn direction_name(directed: bool) -> &'static str {
    if directed {
        "directed"
    } else {
        "undirected"
    }
}

/// Whether `graph1` and `graph2` are isomorphic
pub fn is_isomorphic<G>(graph1: &G, graph2: &G, check_labels: bool) -> Result<bool, AlgorithmError>
where
    G: GraphView,
    G::Label: PartialEq,
{
    Ok(IsomorphismMatcher::new(graph1, graph2, check_labels)?.matches())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::traits::NodeId;
    use crate::data_structures::Graph;
    use quickcheck_macros::quickcheck;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn labeled_path(edges: &[(usize, usize)], labels: Vec<char>) -> Graph<char> {
        Graph::from_edges(labels.len(), true, edges)
            .unwrap()
            .with_labels(labels)
            .unwrap()
    }

    /// Eight nodes, every left node pointing at three right nodes
    fn three_regular_bipartite(shift: usize) -> Graph {
        let mut edges = Vec::new();
        for left in 0..4 {
            for offset in 0..3 {
                edges.push((left, 4 + (left + offset * shift) % 4));
            }
        }
        Graph::from_edges(8, true, &edges).unwrap()
    }

    #[test]
    fn test_directed_paths_match_ignoring_labels() {
        init_logging();
        // a -> b -> c against b -> c -> a, with nodes a, b, c at 0, 1, 2
        let first = labeled_path(&[(0, 1), (1, 2)], vec!['a', 'b', 'c']);
        let second = labeled_path(&[(1, 2), (2, 0)], vec!['a', 'b', 'c']);

        let matcher = IsomorphismMatcher::new(&first, &second, false).unwrap();
        assert!(matcher.matches());
        assert_eq!(matcher.mapping().unwrap().forward(), &[1, 2, 0]);
        assert_eq!(matcher.mapping().unwrap().backward(), &[2, 0, 1]);

        // Labels enforced: the source is 'a' in one graph and 'b' in the other
        assert!(!IsomorphismMatcher::new(&first, &second, true).unwrap().matches());
    }

    #[test]
    fn test_reversed_edge_with_labels_does_not_match() {
        let first = labeled_path(&[(0, 1), (1, 2)], vec!['a', 'b', 'c']);
        let reversed = labeled_path(&[(0, 1), (2, 1)], vec!['a', 'b', 'c']);

        assert!(!is_isomorphic(&first, &reversed, true).unwrap());
        assert!(!is_isomorphic(&first, &reversed, false).unwrap());
    }

    #[test]
    fn test_identical_graphs() {
        let mut graph: Graph = Graph::new(false);
        let n1 = graph.add_node();
        let n2 = graph.add_node();
        let n3 = graph.add_node();
        graph.add_edge(n1, n2).unwrap();
        graph.add_edge(n2, n3).unwrap();
        graph.add_edge(n3, n1).unwrap();

        let matcher = IsomorphismMatcher::new(&graph, &graph, true).unwrap();
        assert!(matcher.matches());
        assert!(matcher.statistics().leaves_visited == 1);
    }

    #[test]
    fn test_removing_an_edge_breaks_the_match() {
        init_logging();
        let first = three_regular_bipartite(1);
        let second = three_regular_bipartite(3);
        let matcher = IsomorphismMatcher::new(&first, &second, false).unwrap();
        assert!(matcher.matches());
        assert!(verify_isomorphism(&first, &second, matcher.mapping().unwrap(), false).is_ok());

        let mut edges = Vec::new();
        for left in 0..4 {
            for offset in 0..3 {
                if (left, offset) != (2, 1) {
                    edges.push((left, 4 + (left + offset * 3) % 4));
                }
            }
        }
        let pruned: Graph = Graph::from_edges(8, true, &edges).unwrap();
        assert!(!IsomorphismMatcher::new(&first, &pruned, false).unwrap().matches());
    }

    #[test]
    fn test_disconnected_components() {
        // Triangle plus isolated edge, listed in different orders
        let first: Graph = Graph::from_edges(5, false, &[(0, 1), (1, 2), (2, 0), (3, 4)]).unwrap();
        let second: Graph = Graph::from_edges(5, false, &[(0, 1), (2, 3), (3, 4), (4, 2)]).unwrap();
        assert!(is_isomorphic(&first, &second, false).unwrap());

        // Two disjoint paths of length two against a path of length four
        let paths: Graph = Graph::from_edges(6, false, &[(0, 1), (1, 2), (3, 4), (4, 5)]).unwrap();
        let long: Graph = Graph::from_edges(6, false, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        assert!(!is_isomorphic(&paths, &long, false).unwrap());
    }

    #[test]
    fn test_frontier_mismatch_between_cycles() {
        // A 6-cycle and two triangles share the degree sequence
        let hexagon: Graph = Graph::from_edges(
            6,
            false,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)],
        )
        .unwrap();
        let triangles: Graph = Graph::from_edges(
            6,
            false,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)],
        )
        .unwrap();
        let matcher = IsomorphismMatcher::new(&hexagon, &triangles, false).unwrap();
        assert!(!matcher.matches());
        assert!(matcher.mapping().is_none());
        assert!(matcher.statistics().states_explored > 0);
    }

    #[test]
    fn test_multi_edges_and_loops() {
        let doubled: Graph = Graph::from_edges(3, true, &[(0, 1), (0, 1), (1, 2), (2, 2)]).unwrap();
        let moved: Graph = Graph::from_edges(3, true, &[(2, 0), (2, 0), (0, 1), (1, 1)]).unwrap();
        let single: Graph = Graph::from_edges(3, true, &[(0, 1), (1, 2), (1, 2), (2, 2)]).unwrap();

        assert!(is_isomorphic(&doubled, &moved, false).unwrap());
        assert!(!is_isomorphic(&doubled, &single, false).unwrap());
    }

    #[test]
    fn test_tags_compared_only_with_labels() {
        let mut first: Graph<(), &str> = Graph::new(true);
        let mut second: Graph<(), &str> = Graph::new(true);
        for _ in 0..3 {
            first.add_node();
            second.add_node();
        }
        first.add_tagged_edge(NodeId(0), NodeId(1), "red").unwrap();
        first.add_tagged_edge(NodeId(1), NodeId(2), "blue").unwrap();
        second.add_tagged_edge(NodeId(0), NodeId(1), "blue").unwrap();
        second.add_tagged_edge(NodeId(1), NodeId(2), "red").unwrap();

        assert!(is_isomorphic(&first, &second, false).unwrap());
        assert!(!is_isomorphic(&first, &second, true).unwrap());

        let mut third: Graph<(), &str> = Graph::new(true);
        for _ in 0..3 {
            third.add_node();
        }
        third.add_tagged_edge(NodeId(2), NodeId(0), "red").unwrap();
        third.add_tagged_edge(NodeId(0), NodeId(1), "blue").unwrap();
        assert!(is_isomorphic(&first, &third, true).unwrap());
    }

    #[test]
    fn test_size_and_direction_checks() {
        let small: Graph = Graph::from_edges(2, false, &[(0, 1)]).unwrap();
        let large: Graph = Graph::from_edges(3, false, &[(0, 1)]).unwrap();
        let directed: Graph = Graph::from_edges(2, true, &[(0, 1)]).unwrap();

        let matcher = IsomorphismMatcher::new(&small, &large, false).unwrap();
        assert!(!matcher.matches());
        assert_eq!(matcher.statistics().states_explored, 0);

        match IsomorphismMatcher::new(&small, &directed, false) {
            Err(AlgorithmError::IncompatibleGraphs(_)) => {}
            other => panic!("expected IncompatibleGraphs, got {:?}", other),
        }

        let empty: Graph = Graph::new(true);
        assert!(is_isomorphic(&empty, &empty, true).unwrap());
    }

    #[test]
    fn test_budget_exhaustion_is_an_error() {
        let hexagon: Graph = Graph::from_edges(
            6,
            false,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)],
        )
        .unwrap();
        let triangles: Graph = Graph::from_edges(
            6,
            false,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)],
        )
        .unwrap();
        let config = SearchConfig::default().with_max_states(2);

        match IsomorphismMatcher::with_config(&hexagon, &triangles, false, &config) {
            Err(AlgorithmError::ResourceExhausted(_)) => {}
            other => panic!("expected ResourceExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_state_rolls_back_completely() {
        let graph: Graph = Graph::from_edges(4, false, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let mut state = MatchState::new(4);

        let first = state.commit(&graph, &graph, 1, 2);
        assert_eq!(state.side1.frontier_len, 2);
        let second = state.commit(&graph, &graph, 0, 3);
        assert_eq!(state.side1.frontier[2], Some(0));
        assert_eq!(state.side2.frontier[1], Some(0));
        assert_eq!(state.side2.frontier_len, 1);

        state.rollback(second);
        assert_eq!(state.side1.frontier[0], Some(0));
        assert_eq!(state.side2.frontier[3], Some(0));
        state.rollback(first);
        assert!(state.is_empty());
    }

    fn matches_own_permutation<T: Clone + PartialEq>(graph: Graph<u8, T>, keys: Vec<u32>) -> bool {
        let n = graph.node_count();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&node| (keys.get(node).copied().unwrap_or(0), node));
        let permuted = graph.permuted(&order).unwrap();

        let matcher = IsomorphismMatcher::new(&graph, &permuted, true).unwrap();
        matcher.matches()
            && verify_isomorphism(&graph, &permuted, matcher.mapping().unwrap(), true).is_ok()
    }

    #[quickcheck]
    fn every_graph_matches_its_permutations(graph: Graph<u8>, keys: Vec<u32>) -> bool {
        matches_own_permutation(graph, keys)
    }

    #[quickcheck]
    fn every_tagged_graph_matches_its_permutations(graph: Graph<u8, u8>, keys: Vec<u32>) -> bool {
        matches_own_permutation(graph, keys)
    }
}
