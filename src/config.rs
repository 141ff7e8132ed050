//! Search configuration.

use serde::{Deserialize, Serialize};

/// Default number of nodes the tree reserves room for up front.
pub const DEFAULT_NODE_CAPACITY: usize = 4096;

/// Tuning knobs of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Exploration constant `c` shared by the UCB and PUCT formulas.
    pub exploration: f64,

    /// Exponent applied to root visit counts before sampling the reported move in guided mode.
    /// Higher values sharpen the distribution towards the most visited child.
    pub visit_exponent: f64,

    /// Initial node capacity of the tree arena.
    pub node_capacity: usize,

    /// When set, a failing evaluator call is replaced by a rollout for that expansion
    /// instead of aborting the search.
    pub rollout_fallback: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: 1.4,
            visit_exponent: 5.0,
            node_capacity: DEFAULT_NODE_CAPACITY,
            rollout_fallback: false,
        }
    }
}

impl SearchConfig {
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_visit_exponent(mut self, exponent: f64) -> Self {
        self.visit_exponent = exponent;
        self
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    pub fn with_rollout_fallback(mut self, enabled: bool) -> Self {
        self.rollout_fallback = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration - 1.4).abs() < 1e-12);
        assert!((config.visit_exponent - 5.0).abs() < 1e-12);
        assert_eq!(config.node_capacity, DEFAULT_NODE_CAPACITY);
        assert!(!config.rollout_fallback);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_exploration(2.0)
            .with_rollout_fallback(true);

        assert!((config.exploration - 2.0).abs() < 1e-12);
        assert!(config.rollout_fallback);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"exploration": 0.8}"#).unwrap();
        assert!((config.exploration - 0.8).abs() < 1e-12);
        assert_eq!(config.node_capacity, DEFAULT_NODE_CAPACITY);
        assert!((config.visit_exponent - 5.0).abs() < 1e-12);
    }
}
