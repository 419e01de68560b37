//! Exchange neighborhood for local search (inter-route, one stop for one stop).

use crate::solution::{Assignment, Route};

use super::utils::{ArcCosts, Scan};
use super::Move;

/// Penalised cost change of replacing the stop at `index` of `route` with `incoming`.
fn replacement_delta(
    route: &Route,
    index: usize,
    incoming: usize,
    costs: &ArcCosts<'_>,
) -> Option<i64> {
    let prev = route.node_at(index);
    let outgoing = route.node_at(index + 1);
    let next = route.node_at(index + 2);

    let added = costs.added(prev, incoming)? + costs.added(incoming, next)?;
    let removed = costs.penalized(prev, outgoing) + costs.penalized(outgoing, next);

    Some(added - removed)
}

/// Offer every swap of one stop of `first` with one stop of `second`.
pub fn scan_exchange(first: &Route, second: &Route, costs: &ArcCosts<'_>, scan: &mut Scan) {
    for (first_index, &x) in first.stops.iter().enumerate() {
        for (second_index, &y) in second.stops.iter().enumerate() {
            let Some(first_delta) = replacement_delta(first, first_index, y, costs) else {
                continue;
            };
            let Some(second_delta) = replacement_delta(second, second_index, x, costs) else {
                continue;
            };

            scan.offer(
                first_delta + second_delta,
                Move::Exchange {
                    first: first.vehicle,
                    first_index,
                    second: second.vehicle,
                    second_index,
                },
            );
        }
    }
}

/// Swap the two stops between their routes.
pub fn apply_exchange(
    assignment: &mut Assignment,
    first: usize,
    first_index: usize,
    second: usize,
    second_index: usize,
) {
    let x = assignment.routes[first].stops[first_index];
    let y = assignment.routes[second].stops[second_index];
    assignment.routes[first].stops[first_index] = y;
    assignment.routes[second].stops[second_index] = x;
}
