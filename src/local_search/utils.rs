//! Utility functions for local search operations.

use crate::problem::{RouteModel, DEPOT};
use crate::solution::Route;

use super::penalty::PenaltyMatrix;
use super::Move;

/// Penalised arc costs seen by the search.
///
/// Arcs leaving the current solution are priced with [`ArcCosts::penalized`];
/// arcs a move would introduce go through [`ArcCosts::added`], which refuses
/// unreachable arcs.
#[derive(Clone, Copy)]
pub struct ArcCosts<'a> {
    model: &'a RouteModel,
    penalties: &'a PenaltyMatrix,
}

impl<'a> ArcCosts<'a> {
    pub fn new(model: &'a RouteModel, penalties: &'a PenaltyMatrix) -> Self {
        ArcCosts { model, penalties }
    }

    /// True arc cost plus its accumulated penalty.
    #[inline]
    pub fn penalized(&self, from: usize, to: usize) -> i64 {
        self.model
            .cost(from, to)
            .saturating_add(self.penalties.get(from, to))
    }

    /// Penalised cost of an arc a move would create, `None` if the arc is unreachable.
    #[inline]
    pub fn added(&self, from: usize, to: usize) -> Option<i64> {
        if self.model.is_reachable(from, to) {
            Some(self.penalized(from, to))
        } else {
            None
        }
    }

    /// Best slot for inserting `stop` into `route` once the stop at `removed` is taken out.
    ///
    /// Returns the penalised cost change of the whole removal + insertion and the
    /// slot in the shortened route. `exclude` skips one slot.
    pub fn reinsertion(
        &self,
        route: &Route,
        removed: usize,
        stop: usize,
        exclude: Option<usize>,
    ) -> Option<(i64, usize)> {
        let prev = route.node_at(removed);
        let current = route.node_at(removed + 1);
        let next = route.node_at(removed + 2);
        let removal = -(self.penalized(prev, current) + self.penalized(current, next));
        let bridge = self.added(prev, next);

        let insertion = |slot: usize| -> Option<i64> {
            if slot == removed {
                // the bridge prev -> next never materialises
                return Some(self.added(prev, stop)? + self.added(stop, next)?);
            }
            let u = reduced_node(route, removed, slot);
            let v = reduced_node(route, removed, slot + 1);
            Some(bridge? + self.added(u, stop)? + self.added(stop, v)? - self.penalized(u, v))
        };

        (0..route.len())
            .filter(|&slot| Some(slot) != exclude)
            .filter_map(|slot| insertion(slot).map(|delta| (removal + delta, slot)))
            .min()
    }
}

/// Node at `position` of the closed path of `route` with the stop at `removed` taken out.
#[inline]
pub fn reduced_node(route: &Route, removed: usize, position: usize) -> usize {
    let remaining = route.len() - 1;
    if position == 0 || position > remaining {
        DEPOT
    } else {
        let index = position - 1;
        if index < removed {
            route.stops[index]
        } else {
            route.stops[index + 1]
        }
    }
}

/// Best admissible move found while scanning a neighborhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scan {
    /// Lowest `(penalised delta, move)` offered so far
    pub best: Option<(i64, Move)>,
    /// Number of admissible moves offered
    pub admissible: usize,
}

impl Scan {
    /// Record an admissible move.
    #[inline]
    pub fn offer(&mut self, delta: i64, mv: Move) {
        self.admissible += 1;
        if self.best.map_or(true, |best| (delta, mv) < best) {
            self.best = Some((delta, mv));
        }
    }

    /// Combine two partial scans. The result does not depend on the merge order.
    pub fn merge(self, other: Scan) -> Scan {
        let best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Scan {
            best,
            admissible: self.admissible + other.admissible,
        }
    }
}
