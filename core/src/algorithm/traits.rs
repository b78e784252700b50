//! Core algorithm trait definitions for the search engine
//!
//! This module establishes the shared vocabulary of the crate: node
//! identifiers, the error type every fallible operation returns, search
//! statistics, and the string-parameter interface through which callers
//! tune an algorithm without depending on its concrete type.
//!
//! # Key Design Principles
//! - Every operation that can reject its input returns `AlgorithmError`
//! - Parameters are validated at the point they are set, never during search
//! - Statistics are plain data, serializable for external reporting

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub description: String,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Boolean,
    /// An integer that may also be given as `"none"` for "unbounded"
    OptionalInteger,
}

/// Comprehensive error types for algorithm operations
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid node: {0}")]
    InvalidNode(NodeId),

    #[error("Invalid graph state: {0}")]
    InvalidGraph(String),

    #[error("Incompatible graphs: {0}")]
    IncompatibleGraphs(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The search was cut short; its outcome is unknown, not negative.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl AlgorithmError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Counters collected while a search runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Search-tree states visited (candidate pairs tried, or partitions expanded)
    pub states_explored: usize,
    /// States rejected before being expanded
    pub states_pruned: usize,
    /// Complete solutions (discrete partitions or full mappings) reached
    pub leaves_visited: usize,
    /// Deepest level reached in the search tree
    pub max_depth: usize,
    /// Execution time in microseconds
    pub execution_time_us: u64,
}

impl SearchStatistics {
    /// Percentage of considered states that were pruned
    pub fn pruning_efficiency(&self) -> f64 {
        let considered = self.states_explored + self.states_pruned;
        if considered == 0 {
            100.0
        } else {
            self.states_pruned as f64 / considered as f64 * 100.0
        }
    }

    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn record_elapsed(&mut self, elapsed: Duration) {
        self.execution_time_us = elapsed.as_micros() as u64;
    }
}

/// Tunable algorithm with string-typed parameters
///
/// # Invariants
/// - `set_parameter` rejects unknown names and unparsable values without
///   changing any state
/// - `get_parameter` returns exactly the values listed by `parameters`
pub trait Algorithm {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category
    fn category(&self) -> &'static str;

    /// Returns a short description with complexity notes
    fn description(&self) -> String;

    /// Returns supported parameters with their current values
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String> {
        self.parameters()
            .into_iter()
            .find(|param| param.name == name)
            .map(|param| param.value)
    }

    /// Returns all parameters keyed by name
    fn get_parameters(&self) -> HashMap<String, String> {
        self.parameters()
            .into_iter()
            .map(|param| (param.name, param.value))
            .collect()
    }
}

/// Parses a `"true"`/`"false"` parameter value
pub(crate) fn parse_bool_parameter(name: &str, value: &str) -> Result<bool, AlgorithmError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AlgorithmError::invalid_parameter(
            name,
            format!("{} must be 'true' or 'false'", name),
        )),
    }
}

/// Parses a positive integer or `"none"`
pub(crate) fn parse_optional_limit(name: &str, value: &str) -> Result<Option<usize>, AlgorithmError> {
    if value == "none" {
        return Ok(None);
    }
    match value.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => Err(AlgorithmError::invalid_parameter(
            name,
            format!("{} must be a positive integer or 'none'", name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_type_safety() {
        let node1 = NodeId(42);
        let node2 = NodeId::from(42);
        let node3 = NodeId(43);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
        assert_eq!(node1.as_usize(), 42);
        assert_eq!(node3.to_string(), "#43");
    }

    #[test]
    fn test_pruning_efficiency() {
        let mut stats = SearchStatistics::default();
        assert_eq!(stats.pruning_efficiency(), 100.0);

        stats.states_explored = 3;
        stats.states_pruned = 1;
        assert!((stats.pruning_efficiency() - 25.0).abs() < 1e-9);

        stats.record_depth(4);
        stats.record_depth(2);
        assert_eq!(stats.max_depth, 4);
    }

    #[test]
    fn test_parameter_parsing() {
        assert!(parse_bool_parameter("verify_results", "true").unwrap());
        assert!(!parse_bool_parameter("verify_results", "false").unwrap());
        assert!(parse_bool_parameter("verify_results", "maybe").is_err());

        assert_eq!(parse_optional_limit("max_states", "none").unwrap(), None);
        assert_eq!(parse_optional_limit("max_states", "10").unwrap(), Some(10));
        assert!(parse_optional_limit("max_states", "0").is_err());
        assert!(parse_optional_limit("max_states", "lots").is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = AlgorithmError::invalid_parameter("max_states", "must be positive");
        assert_eq!(err.to_string(), "Invalid parameter: max_states - must be positive");
        assert_eq!(AlgorithmError::InvalidNode(NodeId(7)).to_string(), "Invalid node: #7");
    }
}
