//! Ordered partitions of a node set
//!
//! A [`Partition`] is an ordered sequence of disjoint, non-empty cells whose
//! union is `0..n`. Cell order carries meaning: refinement and
//! individualization only ever derive new orders from label and degree
//! comparisons, so two isomorphic graphs that start from corresponding
//! partitions keep corresponding partitions throughout a search.

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::AlgorithmError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PartitionCells")]
pub struct Partition {
    cells: Vec<Vec<usize>>,
    /// Index of the cell containing each node
    cell_of: Vec<usize>,
}

/// Serialized shape of a [`Partition`], validated before use
#[derive(Deserialize)]
struct PartitionCells {
    cells: Vec<Vec<usize>>,
    cell_of: Vec<usize>,
}

impl TryFrom<PartitionCells> for Partition {
    type Error = AlgorithmError;

    fn try_from(raw: PartitionCells) -> Result<Self, Self::Error> {
        let partition = Partition::from_cells(raw.cells, raw.cell_of.len())?;
        if partition.cell_of != raw.cell_of {
            return Err(AlgorithmError::invalid_parameter(
                "partition",
                "cell index table disagrees with the cells",
            ));
        }
        Ok(partition)
    }
}

impl Partition {
    /// The single-cell partition of `0..node_count` (empty for zero nodes)
    pub fn unit(node_count: usize) -> Self {
        if node_count == 0 {
            return Self { cells: Vec::new(), cell_of: Vec::new() };
        }
        Self {
            cells: vec![(0..node_count).collect()],
            cell_of: vec![0; node_count],
        }
    }

    /// Builds a partition from explicit cells, checking that they are
    /// non-empty, disjoint and cover `0..node_count`
    pub fn from_cells(cells: Vec<Vec<usize>>, node_count: usize) -> Result<Self, AlgorithmError> {
        let mut cell_of = vec![usize::MAX; node_count];
        for (index, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                return Err(AlgorithmError::invalid_parameter(
                    "partition",
                    format!("cell {} is empty", index),
                ));
            }
            for &node in cell {
                if node >= node_count {
                    return Err(AlgorithmError::invalid_parameter(
                        "partition",
                        format!("node {} is outside 0..{}", node, node_count),
                    ));
                }
                if cell_of[node] != usize::MAX {
                    return Err(AlgorithmError::invalid_parameter(
                        "partition",
                        format!("node {} appears in more than one cell", node),
                    ));
                }
                cell_of[node] = index;
            }
        }
        if let Some(missing) = cell_of.iter().position(|&cell| cell == usize::MAX) {
            return Err(AlgorithmError::invalid_parameter(
                "partition",
                format!("node {} is not covered", missing),
            ));
        }
        Ok(Self { cells, cell_of })
    }

    #[inline]
    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.cell_of.len()
    }

    /// Index of the cell holding `node`
    #[inline]
    pub fn cell_of(&self, node: usize) -> usize {
        self.cell_of[node]
    }

    /// True when every cell is a singleton
    #[inline]
    pub fn is_discrete(&self) -> bool {
        self.cells.len() == self.cell_of.len()
    }

    /// Nodes in cell order, then intra-cell order
    pub fn order(&self) -> Vec<usize> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Replaces cell `index` with `parts`, in the given order
    ///
    /// `parts` must be a partition of the replaced cell into non-empty pieces.
    pub(crate) fn split_cell(&mut self, index: usize, parts: Vec<Vec<usize>>) {
        debug_assert!(parts.iter().all(|part| !part.is_empty()));
        debug_assert_eq!(
            parts.iter().map(Vec::len).sum::<usize>(),
            self.cells[index].len()
        );
        self.cells.splice(index..=index, parts);
        self.reindex_from(index);
    }

    /// Promotes `member` of cell `index` to a singleton placed immediately
    /// before the remainder of its cell
    pub fn individualize(&self, index: usize, member: usize) -> Result<Self, AlgorithmError> {
        let cell = self.cells.get(index).ok_or_else(|| {
            AlgorithmError::invalid_parameter("cell", format!("no cell at index {}", index))
        })?;
        if !cell.contains(&member) {
            return Err(AlgorithmError::invalid_parameter(
                "member",
                format!("node {} is not in cell {}", member, index),
            ));
        }
        let mut child = self.clone();
        if cell.len() > 1 {
            let rest: Vec<usize> = cell.iter().copied().filter(|&node| node != member).collect();
            child.split_cell(index, vec![vec![member], rest]);
        }
        Ok(child)
    }

    fn reindex_from(&mut self, start: usize) {
        for (index, cell) in self.cells.iter().enumerate().skip(start) {
            for &node in cell {
                self.cell_of[node] = index;
            }
        }
    }
}
