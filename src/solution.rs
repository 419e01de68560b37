//! Solution representation: one ordered route per vehicle.

use crate::error::{Error, Result};
use crate::problem::{RouteModel, DEPOT};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;

/// The stops served by one vehicle, in visiting order.
///
/// The depot is implicit at both ends and never stored in `stops`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Index of the vehicle driving this route
    pub vehicle: usize,
    /// Visited stop ids (excluding the depot)
    pub stops: Vec<usize>,
    /// True travel cost of `depot -> stops... -> depot`
    pub cost: i64,
}

impl Route {
    /// Create an empty route for a vehicle.
    pub fn new(vehicle: usize) -> Self {
        Route {
            vehicle,
            stops: Vec::new(),
            cost: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Node at `position` of the closed path: 0 and `len() + 1` are the depot.
    #[inline]
    pub fn node_at(&self, position: usize) -> usize {
        if position == 0 || position > self.stops.len() {
            DEPOT
        } else {
            self.stops[position - 1]
        }
    }

    /// The closed node sequence `depot, stops..., depot`.
    pub fn path(&self) -> impl Iterator<Item = usize> + '_ {
        iter::once(DEPOT)
            .chain(self.stops.iter().copied())
            .chain(iter::once(DEPOT))
    }

    /// Directed arcs travelled by this route.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.path().tuple_windows()
    }

    /// Recalculate the true route cost from the model.
    pub fn calculate_cost(&mut self, model: &RouteModel) {
        self.cost = model.route_cost(&self.stops);
    }
}

/// A complete assignment of stops to vehicles with a visiting order per vehicle.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// One route per vehicle, indexed by vehicle
    pub routes: Vec<Route>,
    /// Sum of the route costs
    pub cost: i64,
    /// Vehicle serving each node (`None` for the depot and unassigned stops)
    visited_by: Vec<Option<usize>>,
}

impl Assignment {
    /// Create an assignment with an empty route for every vehicle.
    pub fn new(model: &RouteModel) -> Self {
        let routes = (0..model.vehicle_count()).map(Route::new).collect();
        let mut assignment = Assignment {
            routes,
            cost: 0,
            visited_by: vec![None; model.node_count()],
        };
        assignment.evaluate(model);
        assignment
    }

    /// Create an assignment from explicit per-vehicle stop sequences.
    ///
    /// Fails when the sequences do not form a feasible solution of `model`.
    pub fn from_routes(model: &RouteModel, routes: Vec<Vec<usize>>) -> Result<Self> {
        if routes.len() != model.vehicle_count() {
            return Err(Error::Configuration(format!(
                "{} routes given for {} vehicles",
                routes.len(),
                model.vehicle_count()
            )));
        }

        let mut assignment = Assignment::new(model);
        for (vehicle, stops) in routes.into_iter().enumerate() {
            if let Some(&node) = stops.iter().find(|&&node| node >= model.node_count()) {
                return Err(Error::Configuration(format!(
                    "route {} refers to unknown node {}",
                    vehicle, node
                )));
            }
            assignment.routes[vehicle].stops = stops;
        }
        assignment.evaluate(model);
        assignment.check_feasible(model)?;

        Ok(assignment)
    }

    /// Vehicle serving `node`, if any.
    pub fn vehicle_of(&self, node: usize) -> Option<usize> {
        self.visited_by.get(node).copied().flatten()
    }

    /// Number of stops currently assigned to some vehicle.
    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Recalculate every route cost, the total and the owner of each stop.
    pub fn evaluate(&mut self, model: &RouteModel) {
        self.visited_by.iter_mut().for_each(|owner| *owner = None);

        for route in &mut self.routes {
            route.calculate_cost(model);
            for &stop in &route.stops {
                self.visited_by[stop] = Some(route.vehicle);
            }
        }

        self.cost = self.routes.iter().map(|route| route.cost).sum();
    }

    /// Refresh a single route after it has been modified in place.
    pub(crate) fn refresh_route(&mut self, model: &RouteModel, vehicle: usize) {
        let route = &mut self.routes[vehicle];
        let previous = route.cost;
        route.calculate_cost(model);
        self.cost += route.cost - previous;

        for &stop in &route.stops {
            self.visited_by[stop] = Some(vehicle);
        }
    }

    /// Directed arcs travelled by all vehicles.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.routes.iter().flat_map(Route::arcs)
    }

    /// Check every coverage, capacity and reachability invariant.
    pub fn check_feasible(&self, model: &RouteModel) -> Result<()> {
        if self.routes.len() != model.vehicle_count() {
            return Err(Error::InfeasibleInstance(format!(
                "{} routes for {} vehicles",
                self.routes.len(),
                model.vehicle_count()
            )));
        }

        let mut seen = vec![false; model.node_count()];
        for (vehicle, route) in self.routes.iter().enumerate() {
            if route.vehicle != vehicle {
                return Err(Error::InfeasibleInstance(format!(
                    "route at index {} belongs to vehicle {}",
                    vehicle, route.vehicle
                )));
            }
            if route.len() != model.required_stops(vehicle) {
                return Err(Error::InfeasibleInstance(format!(
                    "vehicle {} serves {} stops, {} required",
                    vehicle,
                    route.len(),
                    model.required_stops(vehicle)
                )));
            }
            for &stop in &route.stops {
                if stop == DEPOT {
                    return Err(Error::InfeasibleInstance(format!(
                        "vehicle {} visits the depot mid-route",
                        vehicle
                    )));
                }
                if seen[stop] {
                    return Err(Error::InfeasibleInstance(format!(
                        "stop {} is visited more than once",
                        stop
                    )));
                }
                seen[stop] = true;
            }
            if let Some((from, to)) = route
                .arcs()
                .find(|&(from, to)| !model.is_reachable(from, to))
            {
                return Err(Error::InfeasibleInstance(format!(
                    "vehicle {} uses unreachable arc {} -> {}",
                    vehicle, from, to
                )));
            }
        }

        if let Some(stop) = model.stops().find(|&stop| !seen[stop]) {
            return Err(Error::InfeasibleInstance(format!(
                "stop {} is not visited",
                stop
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Assignment:")?;
        writeln!(f, "  Cost: {}", self.cost)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for route in &self.routes {
            writeln!(
                f,
                "  Vehicle {}: {:?} (Cost: {})",
                route.vehicle, route.stops, route.cost
            )?;
        }

        Ok(())
    }
}
