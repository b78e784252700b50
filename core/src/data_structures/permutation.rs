//! Bijections between original and canonical node indices

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::AlgorithmError;

/// A node permutation kept in both directions
///
/// `forward()[original] == canonical` and `inverse()[canonical] == original`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    pub fn identity(size: usize) -> Self {
        Self {
            forward: (0..size).collect(),
            inverse: (0..size).collect(),
        }
    }

    /// Builds the permutation that sends `order[rank]` to `rank`
    pub fn from_order(order: Vec<usize>) -> Result<Self, AlgorithmError> {
        let mut forward = vec![usize::MAX; order.len()];
        for (rank, &node) in order.iter().enumerate() {
            if node >= order.len() || forward[node] != usize::MAX {
                return Err(AlgorithmError::invalid_parameter(
                    "order",
                    format!("{:?} is not an ordering of 0..{}", order, order.len()),
                ));
            }
            forward[node] = rank;
        }
        Ok(Self { forward, inverse: order })
    }

    /// Original index to canonical index
    #[inline]
    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    /// Canonical index to original index
    #[inline]
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(index, &image)| index == image)
    }

    /// The permutation applying `self` and then `other`
    pub fn then(&self, other: &Permutation) -> Result<Permutation, AlgorithmError> {
        if self.len() != other.len() {
            return Err(AlgorithmError::invalid_parameter(
                "permutation",
                format!("cannot compose sizes {} and {}", self.len(), other.len()),
            ));
        }
        let mut order = vec![0; self.len()];
        for (node, &middle) in self.forward.iter().enumerate() {
            order[other.forward[middle]] = node;
        }
        Permutation::from_order(order)
    }
}
