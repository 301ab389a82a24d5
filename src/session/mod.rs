//! Multi-round matches.
//!
//! A [`MatchSession`] owns the roster between rounds. Each round is played
//! on a fresh [`RoundController`] whose participants are copies of the
//! roster; the round's [`ScoreResult`] is folded back with
//! [`MatchSession::complete_round`].
//!
//! ```
//! use dotenko_engine::core::RuleConfig;
//! use dotenko_engine::round::ParticipantKind;
//! use dotenko_engine::session::MatchSession;
//!
//! let kinds = [ParticipantKind::Human, ParticipantKind::Automated];
//! let mut session = MatchSession::new(RuleConfig::default().with_round_count(2), &kinds, 42).unwrap();
//! let round = session.start_round().unwrap();
//! assert_eq!(round.state().player_count(), 2);
//! assert!(!session.is_over());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{ConfigError, EngineError, GameRng, PlayerId, PlayerMap, Rejection, RuleConfig};
use crate::round::{Participant, ParticipantKind, RoundController, RoundState};
use crate::scoring::ScoreResult;

/// A seat's position in the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub score: i64,
    /// 1 = best; tied scores share a rank.
    pub rank: u32,
}

/// Roster, scores and history across `round_count` rounds.
#[derive(Debug)]
pub struct MatchSession {
    config: Arc<RuleConfig>,
    roster: PlayerMap<Participant>,
    rng: GameRng,
    rounds_played: u32,
    lead: PlayerId,
    history: Vec<ScoreResult>,
}

impl MatchSession {
    pub fn new(config: RuleConfig, kinds: &[ParticipantKind], seed: u64) -> Result<Self, ConfigError> {
        config.validate(kinds.len())?;
        let roster = PlayerMap::from_vec(
            kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| Participant::new(PlayerId::new(i as u8), *kind))
                .collect(),
        );
        Ok(Self {
            config: Arc::new(config),
            roster,
            rng: GameRng::new(seed),
            rounds_played: 0,
            lead: PlayerId::new(0),
            history: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    #[must_use]
    pub fn participants(&self) -> &PlayerMap<Participant> {
        &self.roster
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Seat that leads the next round.
    #[must_use]
    pub fn lead(&self) -> PlayerId {
        self.lead
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.rounds_played >= self.config.round_count
    }

    /// Build the next round. Call `start` on the controller to deal.
    pub fn start_round(&mut self) -> Result<RoundController, EngineError> {
        if self.is_over() {
            return Err(Rejection::RoundOver.into());
        }
        let state = RoundState::new(
            Arc::clone(&self.config),
            self.roster.clone(),
            self.lead,
            self.rng.fork(),
        )?;
        info!(round = self.rounds_played + 1, lead = %self.lead, "round created");
        Ok(RoundController::new(state))
    }

    /// Fold a finished round's deltas into the roster and move on.
    pub fn complete_round(&mut self, result: &ScoreResult) {
        for (player, delta) in result.deltas.iter() {
            if let Some(p) = self.roster.get_mut(player) {
                p.score += *delta;
            }
        }
        self.rerank();
        self.history.push(result.clone());
        self.rounds_played += 1;
        self.lead = self.lead.next(self.roster.player_count());
        info!(
            rounds_played = self.rounds_played,
            aborted = result.aborted,
            "round completed"
        );
    }

    fn rerank(&mut self) {
        let scores: Vec<i64> = self.roster.values().map(|p| p.score).collect();
        for (_, p) in self.roster.iter_mut() {
            let better = scores.iter().filter(|s| **s > p.score).count();
            p.rank = better as u32 + 1;
        }
    }

    /// Seats ordered by rank, then seat.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .roster
            .values()
            .map(|p| Standing {
                player: p.id,
                score: p.score,
                rank: p.rank,
            })
            .collect();
        standings.sort_by_key(|s| (s.rank, s.player));
        standings
    }

    /// Results of completed rounds, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ScoreResult] {
        &self.history
    }
}
