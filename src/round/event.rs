//! Domain events emitted by the reducer.
//!
//! Events are discrete facts in the order they happened. They carry no
//! presentation timing; hosts sequence animations themselves.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::phase::PhaseKind;
use crate::cards::Card;
use crate::core::{Deadline, PlayerId};
use crate::declare::{ChallengeResponse, Declaration};
use crate::rules::{Play, PlayRule};
use crate::scoring::ScoreResult;

/// Why the challenge loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeEnd {
    PoolEmpty,
    CapReached,
    StockExhausted,
    /// A contestant counter-stopped; resolution reopens from them.
    Countered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    PhaseChanged { from: PhaseKind, to: PhaseKind },
    Dealt { player: PlayerId, cards: usize },
    /// A stock card turned onto the field while dealing.
    CardRevealed { card: Card },
    MultiplierChanged { multiplier: u32 },
    TurnChanged { player: PlayerId },
    /// The opening countdown ended, by expiry or by the first play.
    OpeningClosed { expired: bool },
    Played { player: PlayerId, cards: Play, rule: PlayRule },
    Drew { player: PlayerId },
    Passed { player: PlayerId, forced: bool },
    StockReshuffled { returned: usize, reshuffles: u32 },
    /// Seats that may now declare a stop on the field-top.
    StopEligibility { eligible: SmallVec<[PlayerId; 8]> },
    StopDeclared { declaration: Declaration },
    Countered { declaration: Declaration, demoted: PlayerId },
    ResponseWindowOpened { declarer: PlayerId, offered: SmallVec<[PlayerId; 8]>, deadline: Deadline },
    ResponseRecorded { player: PlayerId, response: ChallengeResponse, defaulted: bool },
    ChallengeStarted { contestants: SmallVec<[PlayerId; 8]> },
    DecisionPending { player: PlayerId, deadline: Deadline },
    ContestantWithdrew { player: PlayerId },
    ContestantEliminated { player: PlayerId },
    ChallengeEnded { reason: ChallengeEnd },
    Busted { player: PlayerId },
    /// A card turned over at settlement.
    SettlementReveal { card: Card },
    RoundSettled { result: Box<ScoreResult> },
    RoundAborted { reshuffles: u32 },
}
