//! Problem definition: nodes, the travel-cost matrix and the validated routing model.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cost standing in for an unreachable arc. Any entry at or above this value is
/// treated as forbidden by the search.
pub const UNREACHABLE: i64 = 1_000_000_000;

/// Identifier of the depot node. Every route starts and ends here.
pub const DEPOT: usize = 0;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }
}

/// Whether a node is the depot or a delivery stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Depot,
    Stop,
}

/// Represents a location (depot or stop) of the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub role: NodeRole,
    pub label: String,
    pub location: Coordinate,
}

impl Node {
    /// Create a new node.
    pub fn new(id: usize, label: impl Into<String>, lat: f64, lon: f64, role: NodeRole) -> Self {
        Node {
            id,
            role,
            label: label.into(),
            location: Coordinate::new(lat, lon),
        }
    }

    pub fn is_depot(&self) -> bool {
        self.role == NodeRole::Depot
    }
}

/// Square matrix of non-negative integer arc costs, stored row-major.
///
/// The matrix need not be symmetric. Unreachable pairs carry [`UNREACHABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct CostMatrix {
    size: usize,
    costs: Vec<i64>,
}

impl CostMatrix {
    /// Build a matrix from its rows, rejecting ragged or negative input.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let size = rows.len();
        let mut costs = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::Configuration(format!(
                    "cost matrix row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            if let Some(j) = row.iter().position(|&c| c < 0) {
                return Err(Error::Configuration(format!(
                    "cost matrix entry ({}, {}) is negative",
                    i, j
                )));
            }
            costs.extend(row);
        }

        Ok(CostMatrix { size, costs })
    }

    /// Build a matrix by evaluating `cost(i, j)` for every pair. Negative values are clamped to zero.
    pub fn from_fn<F>(size: usize, mut cost: F) -> Self
    where
        F: FnMut(usize, usize) -> i64,
    {
        let mut costs = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                costs.push(cost(i, j).max(0));
            }
        }
        CostMatrix { size, costs }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of travelling from `from` to `to`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.costs[from * self.size + to]
    }

    /// Whether the arc may appear in a route.
    #[inline]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.get(from, to) < UNREACHABLE
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i64]> {
        // chunks(0) panics, an empty matrix simply has no rows
        self.costs.chunks(self.size.max(1))
    }
}

impl TryFrom<Vec<Vec<i64>>> for CostMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self> {
        CostMatrix::from_rows(rows)
    }
}

impl From<CostMatrix> for Vec<Vec<i64>> {
    fn from(matrix: CostMatrix) -> Self {
        matrix.rows().map(|row| row.to_vec()).collect()
    }
}

/// A validated, immutable routing instance.
///
/// Node 0 is the depot, every other node is a stop. Each vehicle must serve
/// exactly its required number of stops, and the required counts sum to the
/// number of stops.
#[derive(Debug, Clone)]
pub struct RouteModel {
    name: String,
    nodes: Vec<Node>,
    matrix: CostMatrix,
    required_stops: Vec<usize>,
    vehicle_labels: Vec<String>,
}

impl RouteModel {
    /// Validate and assemble an instance.
    pub fn build(
        nodes: Vec<Node>,
        matrix: CostMatrix,
        vehicle_count: usize,
        required_stops: Vec<usize>,
    ) -> Result<Self> {
        if vehicle_count == 0 {
            return Err(Error::Configuration(
                "at least one vehicle is required".to_string(),
            ));
        }
        if required_stops.len() != vehicle_count {
            return Err(Error::Configuration(format!(
                "{} required stop counts given for {} vehicles",
                required_stops.len(),
                vehicle_count
            )));
        }
        match nodes.first() {
            Some(node) if node.is_depot() => {}
            _ => {
                return Err(Error::Configuration(
                    "node 0 must be the depot".to_string(),
                ))
            }
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.id != index {
                return Err(Error::Configuration(format!(
                    "node at position {} has id {}",
                    index, node.id
                )));
            }
            if index != DEPOT && node.is_depot() {
                return Err(Error::Configuration(format!(
                    "node {} is a second depot",
                    index
                )));
            }
        }
        if matrix.size() != nodes.len() {
            return Err(Error::Configuration(format!(
                "cost matrix is {0}x{0} but there are {1} nodes",
                matrix.size(),
                nodes.len()
            )));
        }

        let stop_count = nodes.len() - 1;
        let capacity: usize = required_stops.iter().sum();
        if capacity != stop_count {
            return Err(Error::Configuration(format!(
                "vehicles must serve {} stops in total but there are {} stops",
                capacity, stop_count
            )));
        }

        let vehicle_labels = (1..=vehicle_count).map(|v| format!("Truck{}", v)).collect();

        Ok(RouteModel {
            name: "instance".to_string(),
            nodes,
            matrix,
            required_stops,
            vehicle_labels,
        })
    }

    /// Set the instance name used in reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the default `TruckN` vehicle labels.
    pub fn with_vehicle_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.vehicle_count() {
            return Err(Error::Configuration(format!(
                "{} vehicle labels given for {} vehicles",
                labels.len(),
                self.vehicle_count()
            )));
        }
        self.vehicle_labels = labels;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depot(&self) -> usize {
        DEPOT
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stops (every node but the depot).
    pub fn stop_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Stop ids in ascending order.
    pub fn stops(&self) -> impl Iterator<Item = usize> {
        1..self.nodes.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.required_stops.len()
    }

    /// Number of stops vehicle `vehicle` has to serve.
    pub fn required_stops(&self, vehicle: usize) -> usize {
        self.required_stops[vehicle]
    }

    pub fn vehicle_label(&self, vehicle: usize) -> &str {
        &self.vehicle_labels[vehicle]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// Travel cost of the arc `from -> to`.
    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> i64 {
        self.matrix.get(from, to)
    }

    #[inline]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.matrix.is_reachable(from, to)
    }

    /// Cost of the closed route `depot -> stops... -> depot`.
    pub fn route_cost(&self, stops: &[usize]) -> i64 {
        let mut previous = DEPOT;
        let mut total = 0;
        for &stop in stops {
            total += self.cost(previous, stop);
            previous = stop;
        }
        total + self.cost(previous, DEPOT)
    }
}
