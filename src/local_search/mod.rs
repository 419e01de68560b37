//! Guided local search over count-preserving neighborhoods.
//!
//! Every iteration scans all neighborhoods (2-opt, relocate, exchange and
//! relocation-pair) under the penalised cost and applies the best improving
//! move. When none exists the arcs of the current solution with the highest
//! utility `cost / (1 + times_penalised)` are penalised and the scan resumes.
//! The best solution by true cost is tracked independently of the penalised
//! landscape driving the search.

pub mod exchange;
pub mod penalty;
pub mod relocate;
pub mod relocate_pair;
pub mod two_opt;
pub mod utils;

use crate::config::SearchConfig;
use crate::problem::RouteModel;
use crate::solution::Assignment;
use crate::utils::SearchStatistics;
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

use self::penalty::PenaltyMatrix;
use self::utils::{ArcCosts, Scan};

/// A count-preserving neighborhood move.
///
/// The derived ordering is the enumeration order used to break ties between
/// moves with the same penalised delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    /// Reverse path positions `from..=to` of one route
    TwoOpt {
        vehicle: usize,
        from: usize,
        to: usize,
    },
    /// Move the stop at index `from` to slot `to` of the same route
    Relocate {
        vehicle: usize,
        from: usize,
        to: usize,
    },
    /// Swap one stop of `first` with one stop of `second`
    Exchange {
        first: usize,
        first_index: usize,
        second: usize,
        second_index: usize,
    },
    /// Cross-relocate one stop each way, each into its own best slot
    RelocatePair {
        first: usize,
        first_index: usize,
        first_slot: usize,
        second: usize,
        second_index: usize,
        second_slot: usize,
    },
}

impl Move {
    /// Apply the move and refresh the costs of the routes it touched.
    pub fn apply(&self, model: &RouteModel, assignment: &mut Assignment) {
        match *self {
            Move::TwoOpt { vehicle, from, to } => {
                two_opt::apply_two_opt(&mut assignment.routes[vehicle], from, to);
                assignment.refresh_route(model, vehicle);
            }
            Move::Relocate { vehicle, from, to } => {
                relocate::apply_relocate(&mut assignment.routes[vehicle], from, to);
                assignment.refresh_route(model, vehicle);
            }
            Move::Exchange {
                first,
                first_index,
                second,
                second_index,
            } => {
                exchange::apply_exchange(assignment, first, first_index, second, second_index);
                assignment.refresh_route(model, first);
                assignment.refresh_route(model, second);
            }
            Move::RelocatePair {
                first,
                first_index,
                first_slot,
                second,
                second_index,
                second_slot,
            } => {
                relocate_pair::apply_relocate_pair(
                    assignment,
                    first,
                    first_index,
                    first_slot,
                    second,
                    second_index,
                    second_slot,
                );
                assignment.refresh_route(model, first);
                assignment.refresh_route(model, second);
            }
        }
    }
}

/// Mutable state of one search run.
pub struct SearchState {
    /// Solution the search is currently moving
    pub current: Assignment,
    /// Best solution by true cost seen so far
    pub best: Assignment,
    pub penalties: PenaltyMatrix,
    pub statistics: SearchStatistics,
}

impl SearchState {
    /// Start a run from a feasible assignment.
    pub fn new(model: &RouteModel, initial: Assignment) -> Self {
        let statistics = SearchStatistics::new(initial.cost);
        SearchState {
            best: initial.clone(),
            current: initial,
            penalties: PenaltyMatrix::new(model.node_count()),
            statistics,
        }
    }

    /// Keep the current solution if it beats the best one by true cost.
    fn record_if_best(&mut self) {
        if self.current.cost < self.best.cost {
            self.best = self.current.clone();
            self.statistics
                .record_best(self.statistics.iterations, self.best.cost);
            debug!(
                "New best cost {} at iteration {}",
                self.best.cost, self.statistics.iterations
            );
        }
    }

    /// Penalise the arcs of maximal utility in the current solution.
    ///
    /// Returns `false` when every arc of the current solution costs nothing,
    /// in which case no penalty can steer the search anywhere better.
    fn penalize(&mut self, model: &RouteModel, penalty_factor: f64) -> bool {
        let mut selected: Vec<(usize, usize)> = Vec::new();
        let mut best: Option<(i64, u32)> = None;

        for (from, to) in self.current.arcs() {
            let cost = model.cost(from, to);
            if cost == 0 {
                continue;
            }
            let hits = self.penalties.hits(from, to);

            // compare cost / (1 + hits) exactly by cross-multiplying
            let ordering = match best {
                None => std::cmp::Ordering::Greater,
                Some((best_cost, best_hits)) => {
                    (cost as i128 * (1 + best_hits as i128))
                        .cmp(&(best_cost as i128 * (1 + hits as i128)))
                }
            };

            match ordering {
                std::cmp::Ordering::Greater => {
                    best = Some((cost, hits));
                    selected.clear();
                    selected.push((from, to));
                }
                std::cmp::Ordering::Equal => selected.push((from, to)),
                std::cmp::Ordering::Less => {}
            }
        }

        if selected.is_empty() {
            return false;
        }

        selected.sort_unstable();
        selected.dedup();
        for &(from, to) in &selected {
            let cost = model.cost(from, to);
            let amount = ((penalty_factor * cost as f64).ceil() as i64).max(1);
            self.penalties.penalize(from, to, amount);
            debug!(
                "Penalised arc {} -> {} by {} (hits {})",
                from,
                to,
                amount,
                self.penalties.hits(from, to)
            );
        }
        self.statistics.penalty_rounds += 1;

        true
    }
}

/// Result of an improvement run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Assignment,
    pub statistics: SearchStatistics,
}

/// Guided local search driver. Holds only configuration, so one instance can
/// serve several independent problems, each with its own [`SearchState`].
pub struct GuidedLocalSearch {
    pub config: SearchConfig,
}

impl GuidedLocalSearch {
    /// Create a new search with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        GuidedLocalSearch { config }
    }

    /// Improve a feasible assignment until the time limit expires.
    ///
    /// The returned best solution is never worse than `initial`; with a zero time
    /// limit it is `initial` unchanged.
    pub fn improve(&self, model: &RouteModel, initial: Assignment) -> SearchOutcome {
        let start = Instant::now();
        let deadline = start.checked_add(self.config.time_limit);
        let mut state = SearchState::new(model, initial);

        info!(
            "Starting guided local search from cost {} (time limit {:?})",
            state.current.cost, self.config.time_limit
        );

        loop {
            if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
                break;
            }
            if let Some(max) = self.config.max_iterations {
                if state.statistics.iterations >= max {
                    break;
                }
            }

            let scan = self.scan_neighborhoods(model, &state.current, &state.penalties);
            state.statistics.iterations += 1;

            match scan.best {
                Some((delta, mv)) if delta < 0 => {
                    mv.apply(model, &mut state.current);
                    state.statistics.moves_applied += 1;
                    state.record_if_best();
                }
                _ if scan.admissible == 0 => {
                    debug!("Neighborhood is empty, nothing left to search");
                    break;
                }
                _ => {
                    if !state.penalize(model, self.config.penalty_factor) {
                        debug!("Current solution has zero cost, stopping");
                        break;
                    }
                }
            }
        }

        state.statistics.run_time = start.elapsed();
        state.statistics.best_cost = state.best.cost;
        info!(
            "Search finished after {} iterations ({} moves, {} penalty rounds): cost {} -> {}",
            state.statistics.iterations,
            state.statistics.moves_applied,
            state.statistics.penalty_rounds,
            state.statistics.initial_cost,
            state.best.cost
        );

        SearchOutcome {
            best: state.best,
            statistics: state.statistics,
        }
    }

    /// Scan every neighborhood of `assignment` under the penalised cost.
    ///
    /// Sequential and parallel scans return the same move: candidates are
    /// totally ordered by `(delta, move)`.
    pub fn scan_neighborhoods(
        &self,
        model: &RouteModel,
        assignment: &Assignment,
        penalties: &PenaltyMatrix,
    ) -> Scan {
        let costs = ArcCosts::new(model, penalties);
        let routes = &assignment.routes;

        let intra = |vehicle: usize| {
            let mut scan = Scan::default();
            two_opt::scan_two_opt(&routes[vehicle], &costs, &mut scan);
            relocate::scan_relocate(&routes[vehicle], &costs, &mut scan);
            scan
        };
        let inter = |&(a, b): &(usize, usize)| {
            let mut scan = Scan::default();
            exchange::scan_exchange(&routes[a], &routes[b], &costs, &mut scan);
            relocate_pair::scan_relocate_pair(&routes[a], &routes[b], &costs, &mut scan);
            scan
        };

        let pairs: Vec<(usize, usize)> = (0..routes.len())
            .flat_map(|a| (a + 1..routes.len()).map(move |b| (a, b)))
            .filter(|&(a, b)| !routes[a].is_empty() && !routes[b].is_empty())
            .collect();

        if self.config.parallel {
            let intra_scan = (0..routes.len())
                .into_par_iter()
                .map(intra)
                .reduce(Scan::default, Scan::merge);
            let inter_scan = pairs
                .par_iter()
                .map(inter)
                .reduce(Scan::default, Scan::merge);
            intra_scan.merge(inter_scan)
        } else {
            (0..routes.len())
                .map(intra)
                .chain(pairs.iter().map(inter))
                .fold(Scan::default(), Scan::merge)
        }
    }
}
