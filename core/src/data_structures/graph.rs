//! Graph collaborator interface and a compact adjacency-list implementation
//!
//! The search engines never own graph storage. They read it through
//! [`GraphView`], which exposes exactly what refinement, labeling and
//! matching consume: node count, direction-aware neighbour lists, per-pair
//! edge counts, node labels and edge tags. [`Graph`] is the in-crate
//! implementation used by callers that do not bring their own storage.
//!
//! # Representation
//! Nodes are dense indices `0..n`. Neighbour lists keep multiplicity, so a
//! pair joined by two parallel edges lists the target twice. Undirected
//! graphs store each non-loop edge in both endpoint lists and answer
//! `predecessors` with the same list as `successors`.

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{AlgorithmError, NodeId};

/// Read-only view of a graph, as consumed by the search engines
///
/// Implementations must be internally consistent: every neighbour index is
/// below `node_count`, directed predecessor lists mirror successor lists,
/// and undirected adjacency is symmetric. [`GraphView::validate`] checks this.
pub trait GraphView {
    /// Node label type
    type Label;
    /// Edge tag type; tags are compared by value across graphs
    type Tag: PartialEq;

    fn node_count(&self) -> usize;

    fn is_directed(&self) -> bool;

    /// Targets of edges leaving `node`, with multiplicity
    fn successors(&self, node: usize) -> &[usize];

    /// Sources of edges entering `node`, with multiplicity
    fn predecessors(&self, node: usize) -> &[usize];

    fn label(&self, node: usize) -> Option<&Self::Label>;

    /// Distinct tag values, in the graph's own enumeration order
    fn tags(&self) -> &[Self::Tag];

    /// Number of edges `from -> to` carrying the tag at `tag` in [`GraphView::tags`]
    fn tagged_edge_count(&self, from: usize, to: usize, tag: usize) -> usize;

    /// Number of edges `from -> to`, regardless of tag
    fn edge_count(&self, from: usize, to: usize) -> usize {
        self.successors(from).iter().filter(|&&target| target == to).count()
    }

    #[inline]
    fn degree(&self, node: usize) -> usize {
        self.successors(node).len()
    }

    #[inline]
    fn in_degree(&self, node: usize) -> usize {
        self.predecessors(node).len()
    }

    #[inline]
    fn has_tags(&self) -> bool {
        !self.tags().is_empty()
    }

    /// Checks the structural consistency the search engines rely on
    fn validate(&self) -> Result<(), AlgorithmError> {
        let n = self.node_count();
        for node in 0..n {
            for &target in self.successors(node).iter().chain(self.predecessors(node)) {
                if target >= n {
                    return Err(AlgorithmError::InvalidGraph(format!(
                        "node {} links to {} but the graph has {} nodes",
                        node, target, n
                    )));
                }
            }
        }

        for node in 0..n {
            for &target in self.successors(node) {
                let forward = self.edge_count(node, target);
                let mirrored = if self.is_directed() {
                    self.predecessors(target).iter().filter(|&&source| source == node).count()
                } else {
                    self.edge_count(target, node)
                };
                if forward != mirrored {
                    return Err(AlgorithmError::InvalidGraph(format!(
                        "adjacency between {} and {} is not mirrored ({} vs {})",
                        node, target, forward, mirrored
                    )));
                }

                let tagged: usize = (0..self.tags().len())
                    .map(|tag| self.tagged_edge_count(node, target, tag))
                    .sum();
                if tagged > forward {
                    return Err(AlgorithmError::InvalidGraph(format!(
                        "{} tagged edges between {} and {} but only {} edges",
                        tagged, node, target, forward
                    )));
                }
            }

            if self.is_directed() {
                for &source in self.predecessors(node) {
                    let listed = self.predecessors(node).iter().filter(|&&other| other == source).count();
                    let backing = self.edge_count(source, node);
                    if listed != backing {
                        return Err(AlgorithmError::InvalidGraph(format!(
                            "{} lists {} as a predecessor {} times but {} edges lead there",
                            node, source, listed, backing
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Adjacency-list graph with optional node labels and edge tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<L = (), T = ()> {
    directed: bool,
    labels: Vec<Option<L>>,
    successors: Vec<Vec<usize>>,
    /// Tag index of each entry in `successors`, parallel to it
    successor_tags: Vec<Vec<Option<usize>>>,
    /// Unused for undirected graphs
    predecessors: Vec<Vec<usize>>,
    tags: Vec<T>,
    /// Edges in insertion order, as `(from, to, tag index)`
    edges: Vec<(usize, usize, Option<usize>)>,
}

impl<L, T> Graph<L, T> {
    /// Creates an empty graph
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            labels: Vec::new(),
            successors: Vec::new(),
            successor_tags: Vec::new(),
            predecessors: Vec::new(),
            tags: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Creates a graph with `node_count` unlabeled nodes and the given edges
    pub fn from_edges(
        node_count: usize,
        directed: bool,
        edges: &[(usize, usize)],
    ) -> Result<Self, AlgorithmError> {
        let mut graph = Self::new(directed);
        for _ in 0..node_count {
            graph.add_node();
        }
        for &(from, to) in edges {
            graph.add_edge(NodeId(from), NodeId(to))?;
        }
        Ok(graph)
    }

    /// Attaches one label per node, in node order
    pub fn with_labels(mut self, labels: Vec<L>) -> Result<Self, AlgorithmError> {
        if labels.len() != self.node_count() {
            return Err(AlgorithmError::InvalidGraph(format!(
                "label count {} does not match node count {}",
                labels.len(),
                self.node_count()
            )));
        }
        self.labels = labels.into_iter().map(Some).collect();
        Ok(self)
    }

    pub fn add_node(&mut self) -> NodeId {
        self.push_node(None)
    }

    pub fn add_labeled_node(&mut self, label: L) -> NodeId {
        self.push_node(Some(label))
    }

    pub fn set_label(&mut self, node: NodeId, label: L) -> Result<(), AlgorithmError> {
        self.check_node(node)?;
        self.labels[node.as_usize()] = Some(label);
        Ok(())
    }

    /// Adds an untagged edge; parallel edges and self-loops are allowed
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), AlgorithmError> {
        self.check_node(from)?;
        self.check_node(to)?;
        self.insert_edge(from.as_usize(), to.as_usize(), None);
        Ok(())
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of edges added, each undirected edge counted once
    #[inline]
    pub fn edge_total(&self) -> usize {
        self.edges.len()
    }

    pub fn labels(&self) -> &[Option<L>] {
        &self.labels
    }

    fn push_node(&mut self, label: Option<L>) -> NodeId {
        let id = NodeId(self.labels.len());
        self.labels.push(label);
        self.successors.push(Vec::new());
        self.successor_tags.push(Vec::new());
        self.predecessors.push(Vec::new());
        id
    }

    fn check_node(&self, node: NodeId) -> Result<(), AlgorithmError> {
        if node.as_usize() < self.node_count() {
            Ok(())
        } else {
            Err(AlgorithmError::InvalidNode(node))
        }
    }

    fn insert_edge(&mut self, from: usize, to: usize, tag: Option<usize>) {
        self.edges.push((from, to, tag));
        self.successors[from].push(to);
        self.successor_tags[from].push(tag);
        if self.directed {
            self.predecessors[to].push(from);
        } else if from != to {
            self.successors[to].push(from);
            self.successor_tags[to].push(tag);
        }
    }
}

impl<L, T: PartialEq> Graph<L, T> {
    /// Adds an edge carrying `tag`; new tag values are appended to the
    /// graph's tag enumeration in first-seen order
    pub fn add_tagged_edge(&mut self, from: NodeId, to: NodeId, tag: T) -> Result<(), AlgorithmError> {
        self.check_node(from)?;
        self.check_node(to)?;
        let index = match self.tags.iter().position(|known| *known == tag) {
            Some(index) => index,
            None => {
                self.tags.push(tag);
                self.tags.len() - 1
            }
        };
        self.insert_edge(from.as_usize(), to.as_usize(), Some(index));
        Ok(())
    }
}

impl<L: Clone, T: Clone> Graph<L, T> {
    /// Returns a copy in which node `i` becomes node `permutation[i]`
    ///
    /// The tag enumeration order is preserved.
    pub fn permuted(&self, permutation: &[usize]) -> Result<Self, AlgorithmError> {
        let n = self.node_count();
        if permutation.len() != n {
            return Err(AlgorithmError::invalid_parameter(
                "permutation",
                format!("expected {} entries, got {}", n, permutation.len()),
            ));
        }
        let mut seen = vec![false; n];
        for &image in permutation {
            if image >= n || std::mem::replace(&mut seen[image], true) {
                return Err(AlgorithmError::invalid_parameter(
                    "permutation",
                    format!("{:?} is not a permutation of 0..{}", permutation, n),
                ));
            }
        }

        let mut graph = Self::new(self.directed);
        graph.tags = self.tags.clone();
        for _ in 0..n {
            graph.add_node();
        }
        for (node, label) in self.labels.iter().enumerate() {
            graph.labels[permutation[node]] = label.clone();
        }
        for &(from, to, tag) in &self.edges {
            graph.insert_edge(permutation[from], permutation[to], tag);
        }
        Ok(graph)
    }

    /// Relabels the graph so that each node takes its canonical index
    pub fn relabeled(&self, order: &crate::data_structures::Permutation) -> Result<Self, AlgorithmError> {
        self.permuted(order.forward())
    }
}

impl<L, T: PartialEq> GraphView for Graph<L, T> {
    type Label = L;
    type Tag = T;

    #[inline]
    fn node_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    #[inline]
    fn predecessors(&self, node: usize) -> &[usize] {
        if self.directed {
            &self.predecessors[node]
        } else {
            &self.successors[node]
        }
    }

    #[inline]
    fn label(&self, node: usize) -> Option<&L> {
        self.labels[node].as_ref()
    }

    fn tags(&self) -> &[T] {
        &self.tags
    }

    fn tagged_edge_count(&self, from: usize, to: usize, tag: usize) -> usize {
        self.successors[from]
            .iter()
            .zip(&self.successor_tags[from])
            .filter(|&(&target, &entry)| target == to && entry == Some(tag))
            .count()
    }
}

impl<L: PartialEq, T: PartialEq> PartialEq for Graph<L, T> {
    /// Structural equality: same direction, labels, and per-pair edge
    /// multisets, with tags compared by value
    fn eq(&self, other: &Self) -> bool {
        if self.directed != other.directed
            || self.labels != other.labels
            || self.edges.len() != other.edges.len()
        {
            return false;
        }

        (0..self.node_count()).all(|node| {
            let mut theirs: Vec<(usize, Option<&T>)> = other.successors[node]
                .iter()
                .zip(&other.successor_tags[node])
                .map(|(&target, tag)| (target, tag.map(|index| &other.tags[index])))
                .collect();
            for (&target, tag) in self.successors[node].iter().zip(&self.successor_tags[node]) {
                let tag = tag.map(|index| &self.tags[index]);
                match theirs.iter().position(|entry| *entry == (target, tag)) {
                    Some(position) => {
                        theirs.swap_remove(position);
                    }
                    None => return false,
                }
            }
            theirs.is_empty()
        })
    }
}

//////////////////
// TESTING CODE //
//////////////////

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

#[cfg(test)]
impl<T: PartialEq> Graph<u8, T> {
    /// Small random graph with up to seven nodes and three label values.
    /// Kept small because canonical search is exponential in the worst case.
    /// `tag` picks each edge's tag, or `None` for an untagged edge.
    fn arbitrary_with(gen: &mut Gen, mut tag: impl FnMut(&mut Gen) -> Option<T>) -> Self {
        let node_count = usize::arbitrary(gen) % 7 + 1;
        let directed = bool::arbitrary(gen);
        let edge_count = usize::arbitrary(gen) % (node_count * 2 + 1);

        let mut graph = Graph::new(directed);
        for _ in 0..node_count {
            graph.add_labeled_node(u8::arbitrary(gen) % 3);
        }
        for _ in 0..edge_count {
            let from = NodeId(usize::arbitrary(gen) % node_count);
            let to = NodeId(usize::arbitrary(gen) % node_count);
            match tag(gen) {
                Some(value) => graph.add_tagged_edge(from, to, value).unwrap(),
                None => graph.add_edge(from, to).unwrap(),
            }
        }
        graph
    }
}

#[cfg(test)]
impl Arbitrary for Graph<u8, ()> {
    fn arbitrary(gen: &mut Gen) -> Self {
        Self::arbitrary_with(gen, |_| None)
    }
}

#[cfg(test)]
impl Arbitrary for Graph<u8, u8> {
    /// Mixes untagged edges with edges carrying one of three tag values
    fn arbitrary(gen: &mut Gen) -> Self {
        Self::arbitrary_with(gen, |gen| match u8::arbitrary(gen) % 4 {
            3 => None,
            value => Some(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::isomorphism::is_isomorphic;

    #[test]
    fn test_graph_creation_and_basic_operations() {
        let mut graph: Graph<&str> = Graph::new(true);
        let a = graph.add_labeled_node("a");
        let b = graph.add_labeled_node("b");
        let c = graph.add_node();

        graph.add_edge(a, b).unwrap();
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_total(), 3);
        assert_eq!(graph.successors(0), &[1, 1]);
        assert_eq!(graph.predecessors(1), &[0, 0]);
        assert_eq!(graph.edge_count(0, 1), 2);
        assert_eq!(graph.edge_count(1, 0), 0);
        assert_eq!(graph.label(0), Some(&"a"));
        assert_eq!(graph.label(2), None);
        assert!(!graph.has_tags());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_invalid_nodes_are_rejected() {
        let mut graph: Graph = Graph::new(false);
        graph.add_node();

        match graph.add_edge(NodeId(0), NodeId(3)) {
            Err(AlgorithmError::InvalidNode(node)) => assert_eq!(node, NodeId(3)),
            other => panic!("expected InvalidNode, got {:?}", other),
        }
        assert!(Graph::<(), ()>::from_edges(2, true, &[(0, 2)]).is_err());
    }

    #[test]
    fn test_label_count_mismatch() {
        let graph: Graph<u8> = Graph::from_edges(3, false, &[(0, 1)]).unwrap();
        assert!(matches!(
            graph.with_labels(vec![1, 2]),
            Err(AlgorithmError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_undirected_adjacency_is_symmetric() {
        let graph: Graph = Graph::from_edges(3, false, &[(0, 1), (1, 2), (2, 2)]).unwrap();

        assert_eq!(graph.successors(1), &[0, 2]);
        assert_eq!(graph.predecessors(1), graph.successors(1));
        assert_eq!(graph.edge_count(2, 1), 1);
        // A loop appears once in its node's list
        assert_eq!(graph.successors(2), &[1, 2]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_tags_keep_first_seen_order() {
        let mut graph: Graph<(), char> = Graph::new(true);
        for _ in 0..3 {
            graph.add_node();
        }
        graph.add_tagged_edge(NodeId(0), NodeId(1), 'y').unwrap();
        graph.add_tagged_edge(NodeId(1), NodeId(2), 'x').unwrap();
        graph.add_tagged_edge(NodeId(0), NodeId(1), 'y').unwrap();
        graph.add_edge(NodeId(0), NodeId(1)).unwrap();

        assert!(graph.has_tags());
        assert_eq!(graph.tags(), &['y', 'x']);
        assert_eq!(graph.tagged_edge_count(0, 1, 0), 2);
        assert_eq!(graph.tagged_edge_count(0, 1, 1), 0);
        assert_eq!(graph.tagged_edge_count(1, 2, 1), 1);
        assert_eq!(graph.edge_count(0, 1), 3);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_permuted_graph() {
        let graph: Graph<char> = Graph::from_edges(3, true, &[(0, 1), (1, 2)])
            .unwrap()
            .with_labels(vec!['a', 'b', 'c'])
            .unwrap();

        let permuted = graph.permuted(&[2, 0, 1]).unwrap();
        assert_eq!(permuted.label(2), Some(&'a'));
        assert_eq!(permuted.edge_count(2, 0), 1);
        assert_eq!(permuted.edge_count(0, 1), 1);
        assert_ne!(permuted, graph);
        assert_eq!(permuted.permuted(&[1, 2, 0]).unwrap(), graph);

        assert!(graph.permuted(&[0, 0, 1]).is_err());
        assert!(graph.permuted(&[0, 1]).is_err());
    }

    #[test]
    fn test_structural_equality_ignores_insertion_order() {
        let mut first: Graph<(), &str> = Graph::new(false);
        let mut second: Graph<(), &str> = Graph::new(false);
        for _ in 0..3 {
            first.add_node();
            second.add_node();
        }
        first.add_tagged_edge(NodeId(0), NodeId(1), "p").unwrap();
        first.add_tagged_edge(NodeId(1), NodeId(2), "q").unwrap();
        second.add_tagged_edge(NodeId(2), NodeId(1), "q").unwrap();
        second.add_tagged_edge(NodeId(1), NodeId(0), "p").unwrap();

        assert_eq!(first, second);

        let mut third = second.clone();
        third.add_tagged_edge(NodeId(0), NodeId(2), "p").unwrap();
        assert_ne!(first, third);
    }

    /// A view over raw adjacency lists, consistent or not
    struct BrokenView {
        directed: bool,
        successors: Vec<Vec<usize>>,
        predecessors: Vec<Vec<usize>>,
    }

    impl BrokenView {
        fn undirected(successors: Vec<Vec<usize>>) -> Self {
            Self { directed: false, predecessors: successors.clone(), successors }
        }
    }

    impl GraphView for BrokenView {
        type Label = ();
        type Tag = ();

        fn node_count(&self) -> usize {
            self.successors.len()
        }
        fn is_directed(&self) -> bool {
            self.directed
        }
        fn successors(&self, node: usize) -> &[usize] {
            &self.successors[node]
        }
        fn predecessors(&self, node: usize) -> &[usize] {
            &self.predecessors[node]
        }
        fn label(&self, _node: usize) -> Option<&()> {
            None
        }
        fn tags(&self) -> &[()] {
            &[]
        }
        fn tagged_edge_count(&self, _from: usize, _to: usize, _tag: usize) -> usize {
            0
        }
    }

    #[test]
    fn test_validate_rejects_inconsistent_views() {
        let out_of_range = BrokenView::undirected(vec![vec![1], vec![5]]);
        assert!(matches!(out_of_range.validate(), Err(AlgorithmError::InvalidGraph(_))));

        let asymmetric = BrokenView::undirected(vec![vec![1], vec![]]);
        assert!(matches!(asymmetric.validate(), Err(AlgorithmError::InvalidGraph(_))));
    }

    #[test]
    fn test_validate_rejects_unbacked_predecessors() {
        // 0 -> 1 is the only edge, but 1 also claims 2 as a predecessor
        let extra_source = BrokenView {
            directed: true,
            successors: vec![vec![1], vec![], vec![]],
            predecessors: vec![vec![], vec![0, 2], vec![]],
        };
        assert!(matches!(extra_source.validate(), Err(AlgorithmError::InvalidGraph(_))));

        let consistent = BrokenView {
            directed: true,
            successors: vec![vec![1], vec![], vec![1]],
            predecessors: vec![vec![], vec![0, 2], vec![]],
        };
        assert!(consistent.validate().is_ok());

        // Searches refuse the view instead of trusting its in-degrees
        assert!(is_isomorphic(&extra_source, &extra_source, false).is_err());
    }
}
