//! Utility functions and structures for reporting search results.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::extract::RoutePlan;
use crate::problem::RouteModel;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save the route summary table as CSV (`truck,distance_km,sequence`).
pub fn save_report<P: AsRef<Path>>(plan: &RoutePlan, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for row in plan.report_rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Counters and cost trace of a guided local search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatistics {
    /// Improvement iterations (applied moves plus penalty rounds)
    pub iterations: u64,
    pub moves_applied: u64,
    pub penalty_rounds: u64,
    /// True cost of the starting solution
    pub initial_cost: i64,
    /// True cost of the best solution found
    pub best_cost: i64,
    pub run_time: Duration,
    /// `(iteration, cost)` each time a new best solution was found, starting at iteration 0
    pub history: Vec<(u64, i64)>,
}

impl SearchStatistics {
    /// Statistics of a run starting from a solution of cost `initial_cost`.
    pub fn new(initial_cost: i64) -> Self {
        SearchStatistics {
            iterations: 0,
            moves_applied: 0,
            penalty_rounds: 0,
            initial_cost,
            best_cost: initial_cost,
            run_time: Duration::ZERO,
            history: vec![(0, initial_cost)],
        }
    }

    /// Record a new best cost.
    pub fn record_best(&mut self, iteration: u64, cost: i64) {
        self.best_cost = cost;
        self.history.push((iteration, cost));
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Iterations: {}
- Moves Applied: {}
- Penalty Rounds: {}
- Runtime: {}
- Construction Cost: {}
- Best Cost: {}
- Improvements: {}",
            self.iterations,
            self.moves_applied,
            self.penalty_rounds,
            format_duration(self.run_time),
            self.initial_cost,
            self.best_cost,
            self.history.len() - 1
        )
    }
}

/// Print the per-vehicle routes to the console.
pub fn print_plan_summary(plan: &RoutePlan) {
    println!("[VRP] total distance = {:.3} km", plan.total_cost as f64 / 1000.0);
    for row in plan.report_rows() {
        println!("  - {}: {} km", row.truck, row.distance_km);
        println!("    {}", row.sequence);
    }
}

/// Print an ASCII scatter plot of the routes to the console.
pub fn print_route_map(plan: &RoutePlan, model: &RouteModel) {
    println!("Route map for {}", model.name());
    println!();

    // Find bounding box of all locations
    let mut min_lat = f64::MAX;
    let mut min_lon = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut max_lon = f64::MIN;

    for node in model.nodes() {
        min_lat = min_lat.min(node.location.lat);
        min_lon = min_lon.min(node.location.lon);
        max_lat = max_lat.max(node.location.lat);
        max_lon = max_lon.max(node.location.lon);
    }

    // Define visualization grid size
    let width = 80;
    let height = 25;

    // Latitude grows northwards, so rows are flipped
    let cell = |lat: f64, lon: f64| -> (usize, usize) {
        let span_lon = (max_lon - min_lon).max(f64::EPSILON);
        let span_lat = (max_lat - min_lat).max(f64::EPSILON);
        let x = ((lon - min_lon) / span_lon * (width as f64 - 1.0)) as usize;
        let y = ((max_lat - lat) / span_lat * (height as f64 - 1.0)) as usize;
        (x.min(width - 1), y.min(height - 1))
    };

    let mut grid = vec![vec![' '; width]; height];

    let route_symbols = ['*', '+', 'x', '#', '@', '&', '%', '=', '^', '$'];

    for route in &plan.routes {
        let symbol = route_symbols[route.vehicle % route_symbols.len()];

        for &stop in route.stops() {
            let location = model.node(stop).location;
            let (x, y) = cell(location.lat, location.lon);
            grid[y][x] = symbol;
        }
    }

    // Depot drawn last so it is never hidden
    let depot = model.node(model.depot()).location;
    let (x, y) = cell(depot.lat, depot.lon);
    grid[y][x] = 'D';

    for row in &grid {
        println!("{}", row.iter().collect::<String>());
    }
    println!();

    println!("Legend:");
    println!("D - Depot");
    for route in plan.routes.iter().take(route_symbols.len()) {
        println!(
            "{} - {}",
            route_symbols[route.vehicle % route_symbols.len()],
            route.label
        );
    }
    println!();
}
