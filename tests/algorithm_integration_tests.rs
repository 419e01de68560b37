//! Integration tests for the full construction + search + extraction pipeline.

use gls_vrp::config::SearchConfig;
use gls_vrp::error::Error;
use gls_vrp::extract::SolutionExtractor;
use gls_vrp::instance::Instance;
use gls_vrp::problem::{CostMatrix, Node, NodeRole, RouteModel};
use gls_vrp::provider::{CostMatrixProvider, HaversineProvider, Metric};
use gls_vrp::{solve, RoutingEngine};
use std::collections::HashSet;
use std::time::Duration;

/// Depot 0, stops A=1 and B=2 near the depot, C=3 and D=4 far away but close to each other.
fn create_clustered_model() -> RouteModel {
    let nodes = vec![
        Node::new(0, "Depot", 35.0, 139.0, NodeRole::Depot),
        Node::new(1, "A", 35.001, 139.0, NodeRole::Stop),
        Node::new(2, "B", 35.0, 139.001, NodeRole::Stop),
        Node::new(3, "C", 35.1, 139.0, NodeRole::Stop),
        Node::new(4, "D", 35.1, 139.001, NodeRole::Stop),
    ];
    let matrix = CostMatrix::from_rows(vec![
        vec![0, 10, 10, 100, 100],
        vec![10, 0, 10, 95, 95],
        vec![10, 10, 0, 95, 95],
        vec![100, 95, 95, 0, 10],
        vec![100, 95, 95, 10, 0],
    ])
    .unwrap();
    RouteModel::build(nodes, matrix, 2, vec![2, 2]).unwrap()
}

/// The 20-stop, 5-vehicle instance with great-circle distances.
fn create_moderate_model(seed: u64) -> RouteModel {
    let instance = Instance::random(20, 5, seed).unwrap();
    let matrix = HaversineProvider::default()
        .get_matrix(&instance.coordinates(), Metric::Distance)
        .unwrap();
    instance.build_model(matrix).unwrap()
}

fn short_config() -> SearchConfig {
    SearchConfig::new()
        .with_time_limit(Duration::from_secs(2))
        .with_max_iterations(300)
}

#[test]
fn test_engine_run_is_feasible() {
    let model = create_moderate_model(1);
    let mut engine = RoutingEngine::new(model, short_config());

    let best = engine.run().unwrap().clone();
    assert!(best.check_feasible(&engine.model).is_ok());

    let plan = engine.extract().unwrap();
    assert_eq!(plan.routes.len(), 5);

    let mut visited = HashSet::new();
    for route in &plan.routes {
        assert_eq!(route.nodes.first(), Some(&0));
        assert_eq!(route.nodes.last(), Some(&0));
        assert_eq!(route.stops().len(), 4);
        for &stop in route.stops() {
            assert_ne!(stop, 0);
            assert!(visited.insert(stop), "stop {} visited twice", stop);
        }
    }
    assert_eq!(visited.len(), 20);
}

#[test]
fn test_search_never_worse_than_construction() {
    let model = create_moderate_model(2);
    let mut engine = RoutingEngine::new(model, short_config());

    let construction_cost = engine.construct().unwrap().cost;
    let best_cost = engine.run().unwrap().cost;

    assert!(best_cost <= construction_cost);
    let statistics = engine.statistics.as_ref().unwrap();
    assert_eq!(statistics.initial_cost, construction_cost);
    assert_eq!(statistics.best_cost, best_cost);
}

#[test]
fn test_zero_budget_keeps_construction() {
    let model = create_moderate_model(3);
    let mut engine = RoutingEngine::new(
        model,
        SearchConfig::new().with_time_limit(Duration::ZERO),
    );

    let construction = engine.construct().unwrap().clone();
    let best = engine.run().unwrap().clone();

    assert_eq!(best, construction);
}

#[test]
fn test_clustered_scenario() {
    let plan = solve(create_clustered_model(), short_config()).unwrap();

    assert_eq!(plan.total_cost, 240);
    let groups: Vec<HashSet<usize>> = plan
        .routes
        .iter()
        .map(|route| route.stops().iter().copied().collect())
        .collect();
    assert!(groups.contains(&HashSet::from([1, 2])));
    assert!(groups.contains(&HashSet::from([3, 4])));
}

#[test]
fn test_extract_before_search_fails() {
    let model = create_clustered_model();
    let mut engine = RoutingEngine::new(model, short_config());
    assert!(matches!(engine.extract(), Err(Error::EmptySolution)));

    // Construction alone does not complete a search
    engine.construct().unwrap();
    assert!(matches!(engine.extract(), Err(Error::EmptySolution)));

    let model = create_clustered_model();
    assert!(matches!(
        SolutionExtractor::extract(&model, None),
        Err(Error::EmptySolution)
    ));
}

#[test]
fn test_extraction_is_idempotent() {
    let mut engine = RoutingEngine::new(create_moderate_model(4), short_config());
    engine.run().unwrap();

    let first = engine.extract().unwrap();
    let second = engine.extract().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_extracted_costs() {
    let mut engine = RoutingEngine::new(create_clustered_model(), short_config());
    engine.run().unwrap();
    let plan = engine.extract().unwrap();

    let mut total = 0;
    for route in &plan.routes {
        let expected: i64 = route
            .nodes
            .windows(2)
            .map(|arc| engine.model.cost(arc[0], arc[1]))
            .sum();
        assert_eq!(route.cost, expected);
        assert_eq!(route.cost, engine.model.route_cost(route.stops()));
        total += route.cost;
    }
    assert_eq!(plan.total_cost, total);
    assert_eq!(
        plan.total_cost,
        engine.best_solution.as_ref().unwrap().cost
    );

    assert_eq!(plan.routes[0].label, "Truck1");
    assert_eq!(plan.routes[0].node_labels.first().map(String::as_str), Some("Depot"));
}

#[test]
fn test_independent_engines() {
    // Two engines on different instances do not share state
    let mut first = RoutingEngine::new(create_clustered_model(), short_config());
    let mut second = RoutingEngine::new(create_moderate_model(5), short_config());

    let first_cost = first.run().unwrap().cost;
    second.run().unwrap();

    assert_eq!(first_cost, 240);
    assert_eq!(first.extract().unwrap().total_cost, 240);
    assert_eq!(second.extract().unwrap().routes.len(), 5);
}
