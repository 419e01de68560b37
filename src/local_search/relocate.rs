//! Relocate neighborhood for local search (intra-route).

use crate::solution::Route;

use super::utils::{ArcCosts, Scan};
use super::Move;

/// Offer, for every stop of `route`, its best new position within the same route.
pub fn scan_relocate(route: &Route, costs: &ArcCosts<'_>, scan: &mut Scan) {
    if route.len() < 2 {
        return;
    }

    for index in 0..route.len() {
        let stop = route.stops[index];
        // putting the stop back into its own slot is not a move
        if let Some((delta, slot)) = costs.reinsertion(route, index, stop, Some(index)) {
            scan.offer(
                delta,
                Move::Relocate {
                    vehicle: route.vehicle,
                    from: index,
                    to: slot,
                },
            );
        }
    }
}

/// Move the stop at index `from` to slot `to` of the shortened route.
pub fn apply_relocate(route: &mut Route, from: usize, to: usize) {
    let stop = route.stops.remove(from);
    route.stops.insert(to, stop);
}
