//! Search configuration shared by the refinement, labeling and matching engines

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::AlgorithmError;

/// Limits and switches applied to a single search run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on explored states; `None` means unbounded.
    ///
    /// Hitting the bound yields `AlgorithmError::ResourceExhausted`, an
    /// indeterminate outcome.
    pub max_states: Option<usize>,
    /// Refine per edge tag when the graph carries tags
    pub tag_aware: bool,
    /// Re-check every produced mapping edge by edge before returning it
    pub verify_results: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_states: None,
            tag_aware: true,
            verify_results: true,
        }
    }
}

impl SearchConfig {
    /// Parses a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to JSON
    pub fn to_json(&self) -> Result<String, AlgorithmError> {
        serde_json::to_string(self)
            .map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_tag_aware(mut self, tag_aware: bool) -> Self {
        self.tag_aware = tag_aware;
        self
    }

    pub fn with_verification(mut self, verify_results: bool) -> Self {
        self.verify_results = verify_results;
        self
    }

    fn validate(&self) -> Result<(), AlgorithmError> {
        if self.max_states == Some(0) {
            return Err(AlgorithmError::invalid_parameter(
                "max_states",
                "max_states must be positive when set",
            ));
        }
        Ok(())
    }

    /// Returns `ResourceExhausted` once `explored` passes the budget
    pub(crate) fn check_budget(&self, explored: usize) -> Result<(), AlgorithmError> {
        match self.max_states {
            Some(limit) if explored > limit => Err(AlgorithmError::ResourceExhausted(format!(
                "explored more than {} search states",
                limit
            ))),
            _ => Ok(()),
        }
    }
}
