//! # dotenko-engine
//!
//! Round-resolution rule engine for the matching-card game Dotenko.
//!
//! ## Design Principles
//!
//! 1. **One owner, one reducer**: a round's state is owned by a single
//!    `RoundController` and changes only through the pure
//!    `reduce(&state, &input)` step, which returns the next state and the
//!    domain events that produced it.
//!
//! 2. **Host-driven time**: the engine never sleeps or spawns timers. Every
//!    input carries a `Tick`; countdowns are stored as deadlines and expire
//!    when the host feeds a later tick.
//!
//! 3. **Configuration over convention**: rates, caps, windows and reveal
//!    rules come from an immutable `RuleConfig` validated up front.
//!
//! ## Modules
//!
//! - `core`: seat ids, RNG, clock, configuration, errors
//! - `cards`: cards, hands, stock and field
//! - `rules`: play legality and wildcard-aware hand totals
//! - `declare`: stop declarations, eligibility, challenge bookkeeping
//! - `scoring`: settlement reveals and score distribution
//! - `round`: phases, reducer, dispatcher
//! - `agents`: decision makers and intent pacing for automated seats
//! - `session`: multi-round matches
//!
//! ## Example
//!
//! ```
//! use dotenko_engine::{RoundController, RoundState, RuleConfig, Tick};
//!
//! let state = RoundState::for_table(RuleConfig::default(), 4, 2024).unwrap();
//! let mut round = RoundController::new(state);
//! round.start(Tick(0)).unwrap();
//! assert!(round.state().field_top().is_some());
//! ```

pub mod agents;
pub mod cards;
pub mod core;
pub mod declare;
pub mod round;
pub mod rules;
pub mod scoring;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, Deadline, EngineError, GameRng, GameRngState, PlayerId, PlayerMap, Rejection,
    RevealRules, RuleConfig, SchedulerConfig, Tick,
};

pub use crate::cards::{full_deck, Card, Field, Hand, Stock, Suit};

pub use crate::rules::{check_play, evaluate, legal_plays, HandTotals, IllegalPlay, Play, PlayRule};

pub use crate::declare::{ChallengeResponse, Declaration, DeclarationKind, DeclarationResolver};

pub use crate::scoring::{Outcome, ScoreEngine, ScoreResult};

pub use crate::round::{
    reduce, EligibleActions, Envelope, Input, Intent, ParticipantKind, ParticipantView, Phase,
    PhaseKind, RoundController, RoundEvent, RoundState, SharedRound, Transition,
};

pub use crate::agents::{BasicDecider, DecisionMaker, IntentScheduler};

pub use crate::session::{MatchSession, Standing};
