//! Cheapest-insertion construction of the initial assignment.

use crate::error::{Error, Result};
use crate::problem::RouteModel;
use crate::solution::Assignment;
use log::info;

/// A candidate insertion of `stop` into `vehicle`'s route before path position `position + 1`.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    delta: i64,
    vehicle: usize,
    stop: usize,
    position: usize,
}

/// Greedy construction heuristic.
///
/// Repeatedly inserts the (vehicle, stop) pair with the smallest marginal cost
/// at its cheapest position, never exceeding a vehicle's required stop count and
/// never creating an unreachable arc. Ties go to the lowest vehicle, then the
/// lowest stop id, then the earliest position.
pub struct CheapestInsertion;

impl CheapestInsertion {
    /// Build a feasible assignment for `model`.
    pub fn construct(model: &RouteModel) -> Result<Assignment> {
        let mut assignment = Assignment::new(model);
        let mut unassigned = vec![false; model.node_count()];
        for stop in model.stops() {
            unassigned[stop] = true;
        }

        for _ in 0..model.stop_count() {
            let insertion = Self::cheapest_insertion(model, &assignment, &unassigned)
                .ok_or_else(|| {
                    Error::InfeasibleInstance(format!(
                        "no vehicle can take another stop ({} of {} assigned)",
                        assignment.assigned_count(),
                        model.stop_count()
                    ))
                })?;

            assignment.routes[insertion.vehicle]
                .stops
                .insert(insertion.position, insertion.stop);
            assignment.refresh_route(model, insertion.vehicle);
            unassigned[insertion.stop] = false;
        }

        assignment.check_feasible(model)?;
        info!(
            "Construction assigned {} stops to {} vehicles, cost {}",
            model.stop_count(),
            model.vehicle_count(),
            assignment.cost
        );

        Ok(assignment)
    }

    fn cheapest_insertion(
        model: &RouteModel,
        assignment: &Assignment,
        unassigned: &[bool],
    ) -> Option<Insertion> {
        let mut best: Option<Insertion> = None;

        for route in &assignment.routes {
            if route.len() >= model.required_stops(route.vehicle) {
                continue;
            }

            for stop in model.stops().filter(|&stop| unassigned[stop]) {
                for position in 0..=route.len() {
                    let prev = route.node_at(position);
                    let next = route.node_at(position + 1);

                    if !model.is_reachable(prev, stop) || !model.is_reachable(stop, next) {
                        continue;
                    }

                    let delta =
                        model.cost(prev, stop) + model.cost(stop, next) - model.cost(prev, next);

                    if best.map_or(true, |b| delta < b.delta) {
                        best = Some(Insertion {
                            delta,
                            vehicle: route.vehicle,
                            stop,
                            position,
                        });
                    }
                }
            }
        }

        best
    }
}
