//! Seated participants.

use serde::{Deserialize, Serialize};

use crate::cards::Hand;
use crate::core::PlayerId;

/// Who drives a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantKind {
    Human,
    /// Intents come from a `DecisionMaker` through the scheduler.
    Automated,
}

/// A participant. Score and rank persist across rounds; hand and the stop
/// flag are reset at every round start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub kind: ParticipantKind,
    pub hand: Hand,
    /// Cumulative match score.
    pub score: i64,
    /// Declared a stop this round.
    pub declared_stop: bool,
    /// Match rank, 1 = best.
    pub rank: u32,
}

impl Participant {
    #[must_use]
    pub fn new(id: PlayerId, kind: ParticipantKind) -> Self {
        Self {
            id,
            kind,
            hand: Hand::new(),
            score: 0,
            declared_stop: false,
            rank: 1,
        }
    }

    pub fn reset_for_round(&mut self) {
        self.hand.clear();
        self.declared_stop = false;
    }

    #[must_use]
    pub fn is_automated(&self) -> bool {
        self.kind == ParticipantKind::Automated
    }
}
