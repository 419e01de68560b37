//! Conversion of a finished assignment into explicit, reportable routes.

use crate::error::{Error, Result};
use crate::problem::RouteModel;
use crate::solution::Assignment;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The route driven by one vehicle, depot included at both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub label: String,
    /// Node ids in visiting order, starting and ending at the depot
    pub nodes: Vec<usize>,
    /// Labels of `nodes`
    pub node_labels: Vec<String>,
    /// Sum of consecutive arc costs along `nodes`
    pub cost: i64,
}

impl VehicleRoute {
    /// Visited stops without the depot at either end.
    pub fn stops(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }
}

/// Explicit per-vehicle routes and the total cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub routes: Vec<VehicleRoute>,
    pub total_cost: i64,
}

/// One row of the route summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub truck: String,
    /// Route cost divided by 1000 (metres to kilometres for distance matrices)
    pub distance_km: String,
    /// Node labels joined by ` -> `
    pub sequence: String,
}

impl RoutePlan {
    /// One table row per vehicle.
    pub fn report_rows(&self) -> Vec<ReportRow> {
        self.routes
            .iter()
            .map(|route| ReportRow {
                truck: route.label.clone(),
                distance_km: format!("{:.3}", route.cost as f64 / 1000.0),
                sequence: route.node_labels.iter().join(" -> "),
            })
            .collect()
    }
}

/// Walks the final assignment into ordered node sequences and costs.
pub struct SolutionExtractor;

impl SolutionExtractor {
    /// Extract the plan of a completed search.
    ///
    /// `None` means no search has completed yet and yields [`Error::EmptySolution`].
    pub fn extract(model: &RouteModel, assignment: Option<&Assignment>) -> Result<RoutePlan> {
        let assignment = assignment.ok_or(Error::EmptySolution)?;

        let routes: Vec<VehicleRoute> = assignment
            .routes
            .iter()
            .map(|route| {
                let nodes: Vec<usize> = route.path().collect();
                let cost = nodes
                    .iter()
                    .tuple_windows()
                    .map(|(&from, &to)| model.cost(from, to))
                    .sum::<i64>();
                let node_labels = nodes
                    .iter()
                    .map(|&node| model.node(node).label.clone())
                    .collect();

                VehicleRoute {
                    vehicle: route.vehicle,
                    label: model.vehicle_label(route.vehicle).to_string(),
                    nodes,
                    node_labels,
                    cost,
                }
            })
            .collect();

        let total_cost = routes.iter().map(|route| route.cost).sum::<i64>();

        Ok(RoutePlan { routes, total_cost })
    }
}
