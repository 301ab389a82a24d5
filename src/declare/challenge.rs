//! Challenge sub-phase bookkeeping.
//!
//! Two pieces, used one after the other by the round reducer:
//!
//! 1. [`ResponseWindow`]: after a stop is declared every other eligible seat
//!    is offered Participate / Decline / CounterStop until all have answered
//!    or the deadline passes.
//! 2. [`ContestPool`]: the seats that chose to participate, visited in
//!    seating order after the declarer. Each visit draws one card and
//!    re-checks the hand with [`recheck`].
//!
//! Like a priority round, the window keeps offering in seat order and any
//! counter-stop restarts it from the new winner.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::eligibility::can_contest;
use crate::core::{Deadline, PlayerId, Rejection, Tick};
use crate::rules::HandTotals;

/// A seat's answer to the challenge offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeResponse {
    Participate,
    Decline,
    CounterStop,
}

/// Answer synthesized for a seat that let the window run out.
#[must_use]
pub fn default_response(can_counter: bool, can_contest: bool) -> ChallengeResponse {
    if can_counter {
        ChallengeResponse::CounterStop
    } else if can_contest {
        ChallengeResponse::Participate
    } else {
        ChallengeResponse::Decline
    }
}

/// Offers collected after a stop declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWindow {
    declarer: PlayerId,
    offered: SmallVec<[PlayerId; 8]>,
    responses: FxHashMap<PlayerId, ChallengeResponse>,
    deadline: Deadline,
}

impl ResponseWindow {
    /// Offer every seat but the declarer (and `excluded`, the field-top
    /// setter who cannot counter their own play), in seating order after the
    /// declarer.
    #[must_use]
    pub fn open(
        declarer: PlayerId,
        player_count: usize,
        excluded: Option<PlayerId>,
        now: Tick,
        window: u64,
    ) -> Self {
        Self {
            declarer,
            offered: declarer
                .others_in_order(player_count)
                .filter(|p| Some(*p) != excluded)
                .collect(),
            responses: FxHashMap::default(),
            deadline: Deadline::starting(now, window),
        }
    }

    #[must_use]
    pub fn declarer(&self) -> PlayerId {
        self.declarer
    }

    #[must_use]
    pub fn offered(&self) -> &[PlayerId] {
        &self.offered
    }

    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    #[must_use]
    pub fn response(&self, player: PlayerId) -> Option<ChallengeResponse> {
        self.responses.get(&player).copied()
    }

    #[must_use]
    pub fn is_offered(&self, player: PlayerId) -> bool {
        self.offered.contains(&player)
    }

    /// Record an answer. CounterStop answers are handled by the resolver and
    /// never recorded here.
    pub fn record(&mut self, player: PlayerId, response: ChallengeResponse) -> Result<(), Rejection> {
        if !self.is_offered(player) {
            return Err(Rejection::NotOffered);
        }
        if self.responses.contains_key(&player) {
            return Err(Rejection::AlreadyResponded);
        }
        self.responses.insert(player, response);
        Ok(())
    }

    /// Every offered seat has answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.offered.iter().all(|p| self.responses.contains_key(p))
    }

    /// Seats still to answer, in seating order.
    pub fn unanswered(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.offered
            .iter()
            .copied()
            .filter(|p| !self.responses.contains_key(p))
    }

    /// Seats that chose to participate, in seating order.
    #[must_use]
    pub fn participants(&self) -> SmallVec<[PlayerId; 8]> {
        self.offered
            .iter()
            .copied()
            .filter(|p| self.response(*p) == Some(ChallengeResponse::Participate))
            .collect()
    }
}

/// A contestant whose hand now matches and who must declare or withdraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub player: PlayerId,
    pub deadline: Deadline,
}

/// Contestants of the draw-and-recheck loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestPool {
    order: SmallVec<[PlayerId; 8]>,
    cursor: usize,
    draws: u32,
    cap: u32,
    pending: Option<PendingDecision>,
}

impl ContestPool {
    #[must_use]
    pub fn new(contestants: &[PlayerId], cap: u32) -> Self {
        Self {
            order: SmallVec::from_slice(contestants),
            cursor: 0,
            draws: 0,
            cap,
            pending: None,
        }
    }

    #[must_use]
    pub fn contestants(&self) -> &[PlayerId] {
        &self.order
    }

    /// Next seat to draw.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        self.order.get(self.cursor).copied()
    }

    /// Move on to the next contestant, wrapping around.
    pub fn advance(&mut self) {
        if !self.order.is_empty() {
            self.cursor = (self.cursor + 1) % self.order.len();
        }
    }

    /// Drop a contestant. The cursor keeps pointing at whoever was next.
    pub fn remove(&mut self, player: PlayerId) {
        if let Some(idx) = self.order.iter().position(|p| *p == player) {
            self.order.remove(idx);
            if idx < self.cursor {
                self.cursor -= 1;
            }
            if self.cursor >= self.order.len() {
                self.cursor = 0;
            }
        }
        if self.pending.map(|d| d.player) == Some(player) {
            self.pending = None;
        }
    }

    pub fn record_draw(&mut self) {
        self.draws += 1;
    }

    #[must_use]
    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Pool empty or hard cap reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.order.is_empty() || self.draws >= self.cap
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingDecision> {
        self.pending
    }

    pub fn set_pending(&mut self, player: PlayerId, deadline: Deadline) {
        self.pending = Some(PendingDecision { player, deadline });
    }
}

/// Outcome of re-checking a contestant after a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recheck {
    /// The hand now matches the field: may counter-stop.
    MayDeclare,
    /// Still below the field value: stays in the pool.
    Contending,
    /// Can no longer get below-or-at the field value: removed.
    Eliminated,
}

#[must_use]
pub fn recheck(totals: &HandTotals, field_value: i32) -> Recheck {
    if totals.contains(field_value) {
        Recheck::MayDeclare
    } else if can_contest(totals, field_value) {
        Recheck::Contending
    } else {
        Recheck::Eliminated
    }
}
