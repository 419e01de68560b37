//! # GLS-VRP
//!
//! Assigns delivery stops to a fleet of vehicles, each of which must serve an
//! exact number of stops, minimising the total travel cost over an asymmetric
//! integer cost matrix.
//!
//! The search builds a feasible starting point with cheapest insertion and then
//! improves it with Guided Local Search until a wall-clock budget expires.
//! Cost matrices and road-snapped polylines come from pluggable providers
//! (OSRM over HTTP or an offline great-circle approximation).

pub mod config;
pub mod construction;
pub mod error;
pub mod extract;
pub mod instance;
pub mod local_search;
pub mod osrm;
pub mod presenter;
pub mod problem;
pub mod provider;
pub mod solution;
pub mod utils;

use crate::config::SearchConfig;
use crate::construction::CheapestInsertion;
use crate::error::Result;
use crate::extract::{RoutePlan, SolutionExtractor};
use crate::local_search::GuidedLocalSearch;
use crate::problem::RouteModel;
use crate::solution::Assignment;
use crate::utils::SearchStatistics;

use std::time::{Duration, Instant};

/// Runs construction, improvement and extraction for one routing model.
///
/// Each engine owns its search state, so independent instances can be solved
/// side by side.
pub struct RoutingEngine {
    pub model: RouteModel,
    pub config: SearchConfig,
    /// Result of the construction phase
    pub construction: Option<Assignment>,
    /// Best solution of the completed search
    pub best_solution: Option<Assignment>,
    pub statistics: Option<SearchStatistics>,
    pub run_time: Duration,
}

impl RoutingEngine {
    /// Create a new engine for the given model and configuration.
    pub fn new(model: RouteModel, config: SearchConfig) -> Self {
        RoutingEngine {
            model,
            config,
            construction: None,
            best_solution: None,
            statistics: None,
            run_time: Duration::from_secs(0),
        }
    }

    /// Build the initial assignment with cheapest insertion.
    pub fn construct(&mut self) -> Result<&Assignment> {
        let assignment = CheapestInsertion::construct(&self.model)?;
        Ok(self.construction.insert(assignment))
    }

    /// Run construction (unless already done) and the time-bounded improvement phase.
    pub fn run(&mut self) -> Result<&Assignment> {
        let start_time = Instant::now();

        let initial = match self.construction.clone() {
            Some(assignment) => assignment,
            None => self.construct()?.clone(),
        };

        let search = GuidedLocalSearch::new(self.config.clone());
        let outcome = search.improve(&self.model, initial);

        self.statistics = Some(outcome.statistics);
        self.run_time = start_time.elapsed();
        Ok(self.best_solution.insert(outcome.best))
    }

    /// Explicit routes of the completed search.
    pub fn extract(&self) -> Result<RoutePlan> {
        SolutionExtractor::extract(&self.model, self.best_solution.as_ref())
    }
}

/// Solve `model` in one call and return the extracted plan.
pub fn solve(model: RouteModel, config: SearchConfig) -> Result<RoutePlan> {
    let mut engine = RoutingEngine::new(model, config);
    engine.run()?;
    engine.extract()
}
