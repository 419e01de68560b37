//! 2-Opt neighborhood for local search (intra-route).

use crate::solution::Route;

use super::utils::{ArcCosts, Scan};
use super::Move;

/// Offer every admissible segment reversal of `route`.
///
/// Reversing path positions `from..=to` replaces the arcs entering and leaving the
/// segment and flips the direction of every arc inside it. Costs may be
/// asymmetric, so the inner flip is accumulated while the segment grows.
pub fn scan_two_opt(route: &Route, costs: &ArcCosts<'_>, scan: &mut Scan) {
    let n = route.len();
    if n < 2 {
        return;
    }

    for i in 0..n - 1 {
        let before = route.node_at(i);
        let first = route.node_at(i + 1);
        let removed_entry = costs.penalized(before, first);

        // Cost change of reversing the arcs strictly inside the segment
        let mut inner = 0;

        for j in i + 2..=n {
            let prev = route.node_at(j - 1);
            let last = route.node_at(j);
            let after = route.node_at(j + 1);

            match costs.added(last, prev) {
                Some(reversed) => inner += reversed - costs.penalized(prev, last),
                // every longer segment contains this arc too
                None => break,
            }

            let (Some(entry), Some(exit)) = (costs.added(before, last), costs.added(first, after))
            else {
                continue;
            };

            let delta = entry + exit + inner - removed_entry - costs.penalized(last, after);
            scan.offer(
                delta,
                Move::TwoOpt {
                    vehicle: route.vehicle,
                    from: i + 1,
                    to: j,
                },
            );
        }
    }
}

/// Reverse the stops at path positions `from..=to`.
pub fn apply_two_opt(route: &mut Route, from: usize, to: usize) {
    route.stops[from - 1..to].reverse();
}
