//! Relocation-pair neighborhood for local search (inter-route).
//!
//! A stop of route A moves to any slot of route B while a stop of route B moves
//! to any slot of route A, so both routes keep their stop counts.

use crate::solution::{Assignment, Route};

use super::utils::{ArcCosts, Scan};
use super::Move;

/// Offer, for every pair of stops, the best pair of insertion slots.
pub fn scan_relocate_pair(first: &Route, second: &Route, costs: &ArcCosts<'_>, scan: &mut Scan) {
    for (first_index, &x) in first.stops.iter().enumerate() {
        for (second_index, &y) in second.stops.iter().enumerate() {
            let Some((first_delta, first_slot)) = costs.reinsertion(first, first_index, y, None)
            else {
                continue;
            };
            let Some((second_delta, second_slot)) =
                costs.reinsertion(second, second_index, x, None)
            else {
                continue;
            };

            // Both stops landing where the other left is the exchange move
            if first_slot == first_index && second_slot == second_index {
                continue;
            }

            scan.offer(
                first_delta + second_delta,
                Move::RelocatePair {
                    first: first.vehicle,
                    first_index,
                    first_slot,
                    second: second.vehicle,
                    second_index,
                    second_slot,
                },
            );
        }
    }
}

/// Move the stop at `first_index` of `first` to `second_slot` of `second` and the stop
/// at `second_index` of `second` to `first_slot` of `first`.
pub fn apply_relocate_pair(
    assignment: &mut Assignment,
    first: usize,
    first_index: usize,
    first_slot: usize,
    second: usize,
    second_index: usize,
    second_slot: usize,
) {
    let x = assignment.routes[first].stops.remove(first_index);
    let y = assignment.routes[second].stops.remove(second_index);
    assignment.routes[first].stops.insert(first_slot, y);
    assignment.routes[second].stops.insert(second_slot, x);
}
