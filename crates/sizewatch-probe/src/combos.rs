//! Candidate combinations of the other attribute groups, in escalating
//! order: defaults, single overrides, then pairs.
//!
//! A combination holds one option index per other group; index `0` is the
//! group's default (first) option.

pub type Combo = Vec<usize>;

/// Every group at its first option.
#[must_use]
pub fn defaults(option_counts: &[usize]) -> Combo {
    vec![0; option_counts.len()]
}

/// One group moved off its default at a time, the rest at defaults.
pub fn single_overrides(option_counts: &[usize]) -> impl Iterator<Item = Combo> + '_ {
    option_counts
        .iter()
        .enumerate()
        .flat_map(move |(group, &count)| {
            (1..count).map(move |option| {
                let mut combo = defaults(option_counts);
                combo[group] = option;
                combo
            })
        })
}

/// Every unordered pair of groups, both moved off their defaults. Pairs
/// with one group at its default are already covered by
/// [`single_overrides`].
pub fn pairwise(option_counts: &[usize]) -> impl Iterator<Item = Combo> + '_ {
    let groups = option_counts.len();
    (0..groups)
        .flat_map(move |a| (a + 1..groups).map(move |b| (a, b)))
        .flat_map(move |(a, b)| {
            (1..option_counts[a]).flat_map(move |i| {
                (1..option_counts[b]).map(move |j| {
                    let mut combo = defaults(option_counts);
                    combo[a] = i;
                    combo[b] = j;
                    combo
                })
            })
        })
}

/// Pairwise attempts left for the whole size-group probe.
#[derive(Debug, Clone, Copy)]
pub struct PairBudget {
    remaining: usize,
}

impl PairBudget {
    #[must_use]
    pub fn new(attempts: usize) -> Self {
        Self {
            remaining: attempts,
        }
    }

    /// Spend one attempt. Returns `false` once the budget is exhausted.
    pub fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
#[path = "combos_test.rs"]
mod tests;
