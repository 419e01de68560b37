//! Configuration parameters for the guided local search.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings for the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Wall-clock budget for the improvement phase
    pub time_limit: Duration,
    /// Proportion of an arc's cost added to its penalty each time it is penalised
    pub penalty_factor: f64,
    /// Optional cap on improvement iterations (applied moves plus penalty rounds)
    pub max_iterations: Option<u64>,
    /// Evaluate inter-route neighborhoods on the rayon thread pool
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            time_limit: Duration::from_secs(30),
            penalty_factor: 0.1,
            max_iterations: None,
            parallel: false,
        }
    }
}

impl SearchConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        SearchConfig::default()
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = duration;
        self
    }

    /// Set the penalty factor.
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Set the maximum number of improvement iterations.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Enable or disable parallel move evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
