//! Per-arc penalty weights for guided local search.

/// Dense, row-major store of arc penalties and the number of times each arc was penalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyMatrix {
    size: usize,
    penalties: Vec<i64>,
    hits: Vec<u32>,
}

impl PenaltyMatrix {
    /// Create a zeroed matrix for `size` nodes.
    pub fn new(size: usize) -> Self {
        PenaltyMatrix {
            size,
            penalties: vec![0; size * size],
            hits: vec![0; size * size],
        }
    }

    /// Accumulated penalty of the arc `from -> to`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.penalties[from * self.size + to]
    }

    /// Number of times the arc has been penalised.
    #[inline]
    pub fn hits(&self, from: usize, to: usize) -> u32 {
        self.hits[from * self.size + to]
    }

    /// Raise the arc's penalty by `amount`, saturating.
    pub fn penalize(&mut self, from: usize, to: usize, amount: i64) {
        let index = from * self.size + to;
        self.penalties[index] = self.penalties[index].saturating_add(amount);
        self.hits[index] = self.hits[index].saturating_add(1);
    }

    /// Sum of all penalties, mostly useful for diagnostics.
    pub fn total(&self) -> i64 {
        self.penalties
            .iter()
            .fold(0i64, |acc, &penalty| acc.saturating_add(penalty))
    }
}
