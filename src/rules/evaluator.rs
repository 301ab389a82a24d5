//! Hand evaluator: every total a set of cards can represent.
//!
//! Standard cards count their rank. Each Joker independently counts as -1, 0
//! or +1, so a hand with `k` Jokers and fixed sum `S` evaluates to
//! `{S + c : c ∈ {-1,0,1}^k}`, which collapses to the contiguous range
//! `S-k..=S+k`.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::cards::Card;

/// Values a wildcard may take in a total.
pub const WILDCARD_VALUES: [i32; 3] = [-1, 0, 1];

/// Sorted, deduplicated, never-empty set of totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandTotals(SmallVec<[i32; 9]>);

impl HandTotals {
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Smallest achievable total.
    #[must_use]
    pub fn min(&self) -> i32 {
        self.0[0]
    }

    /// Largest achievable total.
    #[must_use]
    pub fn max(&self) -> i32 {
        self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Totals for `wildcards` Jokers on top of a fixed sum.
#[must_use]
pub fn totals_for(fixed_sum: i32, wildcards: usize) -> HandTotals {
    let mut totals: SmallVec<[i32; 9]> = smallvec![fixed_sum];
    for _ in 0..wildcards {
        let mut next: SmallVec<[i32; 9]> = SmallVec::with_capacity(totals.len() + 2);
        for &t in &totals {
            for c in WILDCARD_VALUES {
                next.push(t + c);
            }
        }
        next.sort_unstable();
        next.dedup();
        totals = next;
    }
    debug_assert!(!totals.is_empty(), "evaluator produced an empty total set");
    HandTotals(totals)
}

/// Evaluate a set of cards. An empty set evaluates to `{0}`.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandTotals {
    let (fixed_sum, wildcards) = cards.iter().fold((0_i32, 0_usize), |(sum, wild), card| {
        match card.rank() {
            Some(rank) => (sum + i32::from(rank), wild),
            None => (sum, wild + 1),
        }
    });
    totals_for(fixed_sum, wildcards)
}
