//! Engine error types.
//!
//! - [`Rejection`]: a request that is illegal against the current state. The
//!   state is untouched and the reason is shown to the requester.
//! - [`EngineError`]: what a dispatch call surfaces. Rejections pass through;
//!   stock exhaustion is fatal to the round (the round is already aborted and
//!   carries a degenerate result when this is returned).
//! - [`ConfigError`]: invalid rule configuration or roster.

use thiserror::Error;

use super::player::PlayerId;
use crate::declare::DeclarationKind;
use crate::round::PhaseKind;
use crate::rules::IllegalPlay;

/// Why a request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{0} is not seated at this table")]
    UnknownParticipant(PlayerId),

    #[error("not allowed during {actual:?}")]
    WrongPhase { actual: PhaseKind },

    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("round has not started")]
    NotStarted,

    #[error("round is already running")]
    AlreadyStarted,

    #[error("round is over")]
    RoundOver,

    #[error("selected cards are not all in hand")]
    CardsNotInHand,

    #[error("illegal play: {0}")]
    IllegalPlay(#[from] IllegalPlay),

    #[error("already drew this turn")]
    AlreadyDrew,

    #[error("must draw before passing")]
    MustDrawBeforePass,

    #[error("hand does not match the field for {0:?}")]
    NotEligible(DeclarationKind),

    #[error("cannot declare a stop against your own play")]
    OwnPlay,

    #[error("a play has already been made this round")]
    FirstStopClosed,

    #[error("no play has been made yet")]
    NothingToStopOn,

    #[error("a stop has already been declared")]
    StopAlreadyDeclared,

    #[error("there is no declaration to counter")]
    NoActiveDeclaration,

    #[error("already the declared winner")]
    AlreadyDeclared,

    #[error("declaration was superseded by a later one")]
    Superseded,

    #[error("counter-stop limit reached for this round")]
    CounterLimitReached,

    #[error("minimum hand total is not below the field value")]
    CannotContest,

    #[error("not offered a response in this window")]
    NotOffered,

    #[error("already responded in this window")]
    AlreadyResponded,

    #[error("no decision is pending for {0}")]
    NoPendingDecision(PlayerId),
}

/// Error surfaced by a dispatch call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The stock is empty and could not be replenished from the field.
    #[error("stock exhausted: field holds {field_cards} card(s), {reshuffles} reshuffle(s) used")]
    StockExhausted { field_cards: usize, reshuffles: u32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid configuration or roster.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count {0} outside 2..=8")]
    PlayerCount(usize),

    #[error("wildcard count {0} outside 0..=4")]
    WildcardCount(u8),

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("deck of {deck} cards cannot deal {needed} cards and reveal a field card")]
    DeckTooSmall { deck: usize, needed: usize },

    #[error("rate-up rank {0} outside 1..=13")]
    RateUpRank(u8),

    #[error("scheduler delay range {min}..={max} is empty")]
    DelayRange { min: u64, max: u64 },
}
