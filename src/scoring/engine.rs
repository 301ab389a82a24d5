//! Round score computation and distribution.
//!
//! ## Distribution
//!
//! Every loser pays the round score to every winner, so a seat's delta is
//! `score × |opponents|`:
//!
//! | outcome | winners | losers |
//! |---|---|---|
//! | NormalStop | declared winner | superseded declarer or field setter |
//! | FirstStopWin | declarer | everyone else |
//! | Bust | everyone else | buster |
//!
//! An inversion reveal swaps the two sets after the value is fixed. Deltas
//! always sum to zero.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{info, warn};

use super::reveal::{resolve_reveals, RevealOutcome};
use crate::cards::Card;
use crate::core::{PlayerId, PlayerMap, RuleConfig};

/// How a round was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    NormalStop { winner: PlayerId, loser: PlayerId },
    FirstStopWin { winner: PlayerId },
    Bust { buster: PlayerId },
}

impl Outcome {
    fn sides(self, player_count: usize) -> (Seats, Seats) {
        match self {
            Outcome::NormalStop { winner, loser } => {
                (SmallVec::from_slice(&[winner]), SmallVec::from_slice(&[loser]))
            }
            Outcome::FirstStopWin { winner } => (
                SmallVec::from_slice(&[winner]),
                winner.others_in_order(player_count).collect(),
            ),
            Outcome::Bust { buster } => (
                buster.others_in_order(player_count).collect(),
                SmallVec::from_slice(&[buster]),
            ),
        }
    }
}

type Seats = SmallVec<[PlayerId; 8]>;

/// Finalized score of one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// `None` when the round was aborted.
    pub outcome: Option<Outcome>,
    pub winners: Seats,
    pub losers: Seats,
    pub base_rate: i64,
    pub multiplier: u32,
    pub final_value: i64,
    /// Score per winner/loser pairing.
    pub total: i64,
    pub deltas: PlayerMap<i64>,
    pub reveals: SmallVec<[Card; 4]>,
    pub inverted: bool,
    pub aborted: bool,
    /// Round placings, best first.
    pub placings: Seats,
}

impl ScoreResult {
    /// Degenerate result of an aborted round: nobody wins or loses.
    #[must_use]
    pub fn aborted(player_count: usize, base_rate: i64, multiplier: u32) -> Self {
        Self {
            outcome: None,
            winners: SmallVec::new(),
            losers: SmallVec::new(),
            base_rate,
            multiplier,
            final_value: 0,
            total: 0,
            deltas: PlayerMap::with_value(player_count, 0),
            reveals: SmallVec::new(),
            inverted: false,
            aborted: true,
            placings: PlayerId::all(player_count).collect(),
        }
    }

    /// Sum of all deltas (zero for every settled round).
    #[must_use]
    pub fn delta_sum(&self) -> i64 {
        self.deltas.values().sum()
    }
}

/// Computes [`ScoreResult`]s under one rule configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScoreEngine<'a> {
    config: &'a RuleConfig,
}

impl<'a> ScoreEngine<'a> {
    #[must_use]
    pub fn new(config: &'a RuleConfig) -> Self {
        Self { config }
    }

    /// `base × multiplier × value`, capped.
    #[must_use]
    pub fn round_score(&self, multiplier: u32, final_value: i64) -> i64 {
        let raw = self
            .config
            .base_rate
            .saturating_mul(i64::from(multiplier))
            .saturating_mul(final_value);
        if raw > self.config.score_cap {
            warn!(raw, cap = self.config.score_cap, "round score capped");
            self.config.score_cap
        } else {
            raw
        }
    }

    /// Resolve reveals from `source` and distribute the round score.
    ///
    /// `demoted` are superseded declarers; they are placed last.
    pub fn settle(
        &self,
        outcome: Outcome,
        player_count: usize,
        multiplier: u32,
        source: impl IntoIterator<Item = Card>,
        demoted: &[PlayerId],
    ) -> ScoreResult {
        let multiplier = if multiplier > self.config.max_multiplier {
            warn!(multiplier, max = self.config.max_multiplier, "multiplier clamped");
            self.config.max_multiplier
        } else {
            multiplier
        };
        let RevealOutcome {
            reveals,
            multiplier,
            final_value,
            inverted,
            ..
        } = resolve_reveals(source, &self.config.reveal, multiplier, self.config.max_multiplier);

        let total = self.round_score(multiplier, final_value);
        let (mut winners, mut losers) = outcome.sides(player_count);
        if inverted {
            std::mem::swap(&mut winners, &mut losers);
        }
        let deltas = distribute(player_count, &winners, &losers, total);
        debug_assert_eq!(deltas.values().sum::<i64>(), 0);

        let placings = placings(&deltas, demoted);
        info!(?outcome, multiplier, final_value, total, inverted, "round settled");

        ScoreResult {
            outcome: Some(outcome),
            winners,
            losers,
            base_rate: self.config.base_rate,
            multiplier,
            final_value,
            total,
            deltas,
            reveals,
            inverted,
            aborted: false,
            placings,
        }
    }
}

/// Each loser pays `score` to each winner.
#[must_use]
pub fn distribute(
    player_count: usize,
    winners: &[PlayerId],
    losers: &[PlayerId],
    score: i64,
) -> PlayerMap<i64> {
    let mut deltas = PlayerMap::with_value(player_count, 0_i64);
    let gain = score.saturating_mul(losers.len() as i64);
    let loss = score.saturating_mul(winners.len() as i64);
    for &w in winners {
        deltas[w] += gain;
    }
    for &l in losers {
        deltas[l] -= loss;
    }
    deltas
}

/// Best delta first, ties by seat; demoted seats go last.
fn placings(deltas: &PlayerMap<i64>, demoted: &[PlayerId]) -> Seats {
    let mut order: Seats = deltas.player_ids().collect();
    order.sort_by_key(|p| (demoted.contains(p), std::cmp::Reverse(deltas[*p]), *p));
    order
}
