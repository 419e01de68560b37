//! Unit tests for the guided local search components.

use gls_vrp::config::SearchConfig;
use gls_vrp::local_search::exchange::scan_exchange;
use gls_vrp::local_search::penalty::PenaltyMatrix;
use gls_vrp::local_search::relocate::scan_relocate;
use gls_vrp::local_search::relocate_pair::scan_relocate_pair;
use gls_vrp::local_search::two_opt::scan_two_opt;
use gls_vrp::local_search::utils::{reduced_node, ArcCosts, Scan};
use gls_vrp::local_search::{GuidedLocalSearch, Move};
use gls_vrp::problem::{CostMatrix, Node, NodeRole, RouteModel, UNREACHABLE};
use gls_vrp::solution::{Assignment, Route};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::time::Duration;

/// Creates a model from an explicit matrix.
fn create_model(rows: Vec<Vec<i64>>, required_stops: Vec<usize>) -> RouteModel {
    let size = rows.len();
    let mut nodes = vec![Node::new(0, "Depot", 0.0, 0.0, NodeRole::Depot)];
    for i in 1..size {
        nodes.push(Node::new(i, format!("Stop {}", i), 0.0, i as f64, NodeRole::Stop));
    }
    let vehicles = required_stops.len();
    RouteModel::build(
        nodes,
        CostMatrix::from_rows(rows).unwrap(),
        vehicles,
        required_stops,
    )
    .unwrap()
}

/// Depot 0, stops A=1 and B=2 near the depot, C=3 and D=4 far away but close to each other.
fn create_clustered_model() -> RouteModel {
    create_model(
        vec![
            vec![0, 10, 10, 100, 100],
            vec![10, 0, 10, 95, 95],
            vec![10, 10, 0, 95, 95],
            vec![100, 95, 95, 0, 10],
            vec![100, 95, 95, 10, 0],
        ],
        vec![2, 2],
    )
}

/// Asymmetric random instance: `vehicles` vehicles with `per_vehicle` stops each.
fn create_random_model(vehicles: usize, per_vehicle: usize, seed: u64) -> RouteModel {
    let size = vehicles * per_vehicle + 1;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let rows: Vec<Vec<i64>> = (0..size)
        .map(|i| {
            (0..size)
                .map(|j| if i == j { 0 } else { rng.gen_range(1..100) })
                .collect()
        })
        .collect();
    create_model(rows, vec![per_vehicle; vehicles])
}

/// Stops dealt to vehicles in id order.
fn create_sequential_assignment(model: &RouteModel) -> Assignment {
    let mut stops = model.stops();
    let routes: Vec<Vec<usize>> = (0..model.vehicle_count())
        .map(|v| (&mut stops).take(model.required_stops(v)).collect())
        .collect();
    Assignment::from_routes(model, routes).unwrap()
}

/// Applies `mv` to a copy and checks that the true cost changed by `delta`.
fn assert_delta_matches(model: &RouteModel, assignment: &Assignment, delta: i64, mv: Move) {
    let mut moved = assignment.clone();
    mv.apply(model, &mut moved);
    assert_eq!(moved.cost - assignment.cost, delta, "wrong delta for {:?}", mv);

    let mut evaluated = moved.clone();
    evaluated.evaluate(model);
    assert_eq!(evaluated.cost, moved.cost);
    assert!(moved.check_feasible(model).is_ok());
}

#[test]
fn test_penalty_matrix() {
    let mut penalties = PenaltyMatrix::new(3);
    assert_eq!(penalties.get(1, 2), 0);
    assert_eq!(penalties.hits(1, 2), 0);

    penalties.penalize(1, 2, 7);
    penalties.penalize(1, 2, 3);
    assert_eq!(penalties.get(1, 2), 10);
    assert_eq!(penalties.hits(1, 2), 2);
    assert_eq!(penalties.get(2, 1), 0);
    assert_eq!(penalties.total(), 10);

    penalties.penalize(0, 1, i64::MAX);
    assert_eq!(penalties.get(0, 1), i64::MAX);
}

#[test]
fn test_arc_costs_include_penalties() {
    let model = create_clustered_model();
    let mut penalties = PenaltyMatrix::new(model.node_count());
    penalties.penalize(1, 2, 5);
    let costs = ArcCosts::new(&model, &penalties);

    assert_eq!(costs.penalized(1, 2), 15);
    assert_eq!(costs.penalized(2, 1), 10);
    assert_eq!(costs.added(1, 2), Some(15));
}

#[test]
fn test_reduced_node() {
    let mut route = Route::new(0);
    route.stops = vec![5, 6, 7];

    // Removing 6 leaves depot, 5, 7, depot
    assert_eq!(reduced_node(&route, 1, 0), 0);
    assert_eq!(reduced_node(&route, 1, 1), 5);
    assert_eq!(reduced_node(&route, 1, 2), 7);
    assert_eq!(reduced_node(&route, 1, 3), 0);
}

#[test]
fn test_two_opt_delta_on_asymmetric_costs() {
    for seed in 0..5 {
        let model = create_random_model(1, 6, seed);
        let assignment = create_sequential_assignment(&model);
        let penalties = PenaltyMatrix::new(model.node_count());
        let costs = ArcCosts::new(&model, &penalties);

        let mut scan = Scan::default();
        scan_two_opt(&assignment.routes[0], &costs, &mut scan);

        // 6 stops: segments of length >= 2 starting at positions 1..5
        assert_eq!(scan.admissible, 15);
        let (delta, mv) = scan.best.unwrap();
        assert!(matches!(mv, Move::TwoOpt { .. }));
        assert_delta_matches(&model, &assignment, delta, mv);
    }
}

#[test]
fn test_relocate_delta() {
    for seed in 0..5 {
        let model = create_random_model(1, 6, seed);
        let assignment = create_sequential_assignment(&model);
        let penalties = PenaltyMatrix::new(model.node_count());
        let costs = ArcCosts::new(&model, &penalties);

        let mut scan = Scan::default();
        scan_relocate(&assignment.routes[0], &costs, &mut scan);

        assert_eq!(scan.admissible, 6);
        let (delta, mv) = scan.best.unwrap();
        assert!(matches!(mv, Move::Relocate { .. }));
        assert_delta_matches(&model, &assignment, delta, mv);
    }
}

#[test]
fn test_exchange_delta() {
    for seed in 0..5 {
        let model = create_random_model(2, 4, seed);
        let assignment = create_sequential_assignment(&model);
        let penalties = PenaltyMatrix::new(model.node_count());
        let costs = ArcCosts::new(&model, &penalties);

        let mut scan = Scan::default();
        scan_exchange(
            &assignment.routes[0],
            &assignment.routes[1],
            &costs,
            &mut scan,
        );

        assert_eq!(scan.admissible, 16);
        let (delta, mv) = scan.best.unwrap();
        assert!(matches!(mv, Move::Exchange { .. }));
        assert_delta_matches(&model, &assignment, delta, mv);
    }
}

#[test]
fn test_relocate_pair_delta() {
    for seed in 0..5 {
        let model = create_random_model(2, 4, seed);
        let assignment = create_sequential_assignment(&model);
        let penalties = PenaltyMatrix::new(model.node_count());
        let costs = ArcCosts::new(&model, &penalties);

        let mut scan = Scan::default();
        scan_relocate_pair(
            &assignment.routes[0],
            &assignment.routes[1],
            &costs,
            &mut scan,
        );

        let (delta, mv) = scan.best.unwrap();
        assert!(matches!(mv, Move::RelocatePair { .. }));
        assert_delta_matches(&model, &assignment, delta, mv);
    }
}

#[test]
fn test_moves_preserve_stop_counts() {
    let model = create_random_model(3, 4, 11);
    let assignment = create_sequential_assignment(&model);
    let search = GuidedLocalSearch::new(SearchConfig::new());
    let penalties = PenaltyMatrix::new(model.node_count());

    let scan = search.scan_neighborhoods(&model, &assignment, &penalties);
    let (delta, mv) = scan.best.unwrap();
    assert_delta_matches(&model, &assignment, delta, mv);
}

#[test]
fn test_parallel_scan_matches_sequential() {
    let model = create_random_model(4, 5, 3);
    let assignment = create_sequential_assignment(&model);
    let mut penalties = PenaltyMatrix::new(model.node_count());
    penalties.penalize(0, 1, 40);
    penalties.penalize(3, 4, 25);

    let sequential = GuidedLocalSearch::new(SearchConfig::new())
        .scan_neighborhoods(&model, &assignment, &penalties);
    let parallel = GuidedLocalSearch::new(SearchConfig::new().with_parallel(true))
        .scan_neighborhoods(&model, &assignment, &penalties);

    assert_eq!(sequential.best, parallel.best);
    assert_eq!(sequential.admissible, parallel.admissible);
}

#[test]
fn test_exchange_fixes_cluster_split() {
    let model = create_clustered_model();
    // A with C, B with D: the worse split
    let initial = Assignment::from_routes(&model, vec![vec![1, 3], vec![2, 4]]).unwrap();
    assert_eq!(initial.cost, 410);

    let search = GuidedLocalSearch::new(
        SearchConfig::new()
            .with_time_limit(Duration::from_secs(5))
            .with_max_iterations(200),
    );
    let outcome = search.improve(&model, initial);

    assert_eq!(outcome.best.cost, 240);
    let groups: Vec<HashSet<usize>> = outcome
        .best
        .routes
        .iter()
        .map(|route| route.stops.iter().copied().collect())
        .collect();
    assert!(groups.contains(&HashSet::from([1, 2])));
    assert!(groups.contains(&HashSet::from([3, 4])));
}

#[test]
fn test_zero_time_budget_returns_initial() {
    let model = create_clustered_model();
    let initial = Assignment::from_routes(&model, vec![vec![1, 3], vec![2, 4]]).unwrap();

    let search = GuidedLocalSearch::new(SearchConfig::new().with_time_limit(Duration::ZERO));
    let outcome = search.improve(&model, initial.clone());

    assert_eq!(outcome.best, initial);
    assert_eq!(outcome.statistics.iterations, 0);
    assert_eq!(outcome.statistics.best_cost, 410);
}

#[test]
fn test_best_cost_history_is_monotonic() {
    let model = create_random_model(3, 5, 21);
    let initial = create_sequential_assignment(&model);
    let initial_cost = initial.cost;

    let search = GuidedLocalSearch::new(
        SearchConfig::new()
            .with_time_limit(Duration::from_secs(10))
            .with_max_iterations(500),
    );
    let outcome = search.improve(&model, initial);

    let history = &outcome.statistics.history;
    assert_eq!(history[0], (0, initial_cost));
    for pair in history.windows(2) {
        assert!(pair[1].1 < pair[0].1);
        assert!(pair[1].0 >= pair[0].0);
    }
    assert_eq!(history.last().unwrap().1, outcome.best.cost);
    assert!(outcome.best.cost <= initial_cost);
    assert!(outcome.best.check_feasible(&model).is_ok());
    assert!(outcome.statistics.penalty_rounds > 0);
}

#[test]
fn test_search_never_uses_unreachable_arcs() {
    let mut rows: Vec<Vec<i64>> = vec![
        vec![0, 20, 20, 20, 20],
        vec![20, 0, 1, 30, 30],
        vec![20, 1, 0, 30, 30],
        vec![20, 30, 30, 0, 1],
        vec![20, 30, 30, 1, 0],
    ];
    // The cheapest arcs are forbidden in one direction
    rows[1][2] = UNREACHABLE;
    rows[3][4] = UNREACHABLE;
    let model = create_model(rows, vec![2, 2]);
    let initial = Assignment::from_routes(&model, vec![vec![2, 1], vec![4, 3]]).unwrap();

    let search = GuidedLocalSearch::new(
        SearchConfig::new()
            .with_time_limit(Duration::from_secs(5))
            .with_max_iterations(300),
    );
    let outcome = search.improve(&model, initial);

    for (from, to) in outcome.best.arcs() {
        assert!(model.is_reachable(from, to), "arc {} -> {} used", from, to);
    }
}

#[test]
fn test_search_stops_on_empty_neighborhood() {
    // One vehicle with one stop: nothing can move
    let model = create_model(vec![vec![0, 5], vec![5, 0]], vec![1]);
    let initial = Assignment::from_routes(&model, vec![vec![1]]).unwrap();

    let search = GuidedLocalSearch::new(SearchConfig::new().with_time_limit(Duration::from_secs(60)));
    let outcome = search.improve(&model, initial);

    assert_eq!(outcome.statistics.iterations, 1);
    assert_eq!(outcome.best.cost, 10);
}

#[test]
fn test_parallel_search_matches_sequential() {
    let model = create_random_model(3, 4, 5);
    let initial = create_sequential_assignment(&model);
    let config = SearchConfig::new()
        .with_time_limit(Duration::from_secs(60))
        .with_max_iterations(150);

    let sequential = GuidedLocalSearch::new(config.clone()).improve(&model, initial.clone());
    let parallel = GuidedLocalSearch::new(config.with_parallel(true)).improve(&model, initial);

    assert_eq!(sequential.best, parallel.best);
    assert_eq!(sequential.statistics.history, parallel.statistics.history);
}
