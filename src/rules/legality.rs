//! Card legality checker.
//!
//! Decides whether a candidate set of cards may be played on the field-top.
//! Rules are tried in order and the first match is reported:
//!
//! 1. `SingleMatch`: one card sharing rank or suit with the top, or a
//!    wildcard on either side.
//! 2. `SameRank`: several cards, every one of the top's rank.
//! 3. `SuitLedSet`: several cards whose non-wildcards share one rank, led by
//!    a card of the top's suit (a wildcard can lead, and a wildcard top
//!    accepts any lead).
//! 4. `SumMatch`: several cards whose total, with wildcards as -1/0/+1,
//!    can equal the field value.
//!
//! Acceptance depends only on the multiset of cards, never on their order.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use super::evaluator::evaluate;
use crate::cards::Card;

/// [`legal_plays`] only enumerates this many cards of a hand.
pub const MAX_ENUMERATED_HAND: usize = 16;

/// A candidate play.
pub type Play = SmallVec<[Card; 4]>;

/// Which rule accepted a play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayRule {
    SingleMatch,
    SameRank,
    SuitLedSet,
    SumMatch,
}

/// Why a play was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalPlay {
    #[error("no cards selected")]
    Empty,
    #[error("no applicable rule")]
    NoApplicableRule,
}

/// Check a candidate play against the field-top.
pub fn check_play(cards: &[Card], top: Card) -> Result<PlayRule, IllegalPlay> {
    match cards {
        [] => Err(IllegalPlay::Empty),
        [card] => {
            if card.is_wild() || top.is_wild() || card.shares_rank(top) || card.shares_suit(top) {
                Ok(PlayRule::SingleMatch)
            } else {
                Err(IllegalPlay::NoApplicableRule)
            }
        }
        _ => check_multi(cards, top),
    }
}

fn check_multi(cards: &[Card], top: Card) -> Result<PlayRule, IllegalPlay> {
    if cards.iter().all(|c| c.shares_rank(top)) {
        return Ok(PlayRule::SameRank);
    }

    let mut ranks = cards.iter().filter_map(|c| c.rank());
    let single_rank = match ranks.next() {
        Some(first) => ranks.all(|r| r == first),
        None => true,
    };
    let has_lead = top.is_wild() || cards.iter().any(|c| c.is_wild() || c.shares_suit(top));
    if single_rank && has_lead {
        return Ok(PlayRule::SuitLedSet);
    }

    if evaluate(cards).contains(top.field_value()) {
        return Ok(PlayRule::SumMatch);
    }

    Err(IllegalPlay::NoApplicableRule)
}

/// Every legal sub-multiset of `hand` for the given top.
///
/// Only the first [`MAX_ENUMERATED_HAND`] cards are searched.
#[must_use]
pub fn legal_plays(hand: &[Card], top: Card) -> Vec<Play> {
    let mut plays = Vec::new();
    for_each_subset(hand, |subset| {
        if check_play(subset, top).is_ok() {
            plays.push(Play::from_slice(subset));
        }
        true
    });
    plays
}

/// Whether any legal play exists, searching the whole hand.
///
/// Without a legal single card the hand holds no wildcard and nothing of the
/// top's rank or suit, so rules 2 and 3 cannot apply either and only a sum of
/// two or more plain cards is left to find.
#[must_use]
pub fn has_legal_play(hand: &[Card], top: Card) -> bool {
    if hand.iter().any(|c| check_play(std::slice::from_ref(c), top).is_ok()) {
        return true;
    }
    let Ok(target) = usize::try_from(top.field_value()) else {
        return false;
    };
    // reachable[k][s]: some subset of k cards (k = 2 meaning two or more)
    // sums to s.
    let mut reachable = [vec![false; target + 1], vec![false; target + 1], vec![false; target + 1]];
    reachable[0][0] = true;
    for value in hand.iter().filter_map(|c| c.rank()).map(usize::from) {
        for sum in (value..=target).rev() {
            for k in (0..3).rev() {
                if reachable[k][sum - value] {
                    reachable[(k + 1).min(2)][sum] = true;
                }
            }
        }
    }
    reachable[2][target]
}

/// Visit non-empty subsets in mask order until `visit` returns `false`.
fn for_each_subset(hand: &[Card], mut visit: impl FnMut(&[Card]) -> bool) {
    let n = hand.len().min(MAX_ENUMERATED_HAND);
    let mut subset: SmallVec<[Card; MAX_ENUMERATED_HAND]> = SmallVec::new();
    for mask in 1_u32..(1 << n) {
        subset.clear();
        subset.extend((0..n).filter(|i| mask & (1 << i) != 0).map(|i| hand[i]));
        if !visit(&subset) {
            return;
        }
    }
}
