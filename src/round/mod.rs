//! One round of play.
//!
//! - `phase`: tagged-union phase and its countdowns
//! - `state`: the owned round state and per-seat queries
//! - `intent` / `event`: reducer inputs and outputs
//! - `reducer`: the pure `(state, input) → (state, events)` step
//! - `controller`: the serializing dispatcher

pub mod controller;
pub mod event;
pub mod intent;
pub mod participant;
pub mod phase;
pub mod reducer;
pub mod state;

pub use controller::{Observer, RoundController, SharedRound};
pub use event::{ChallengeEnd, RoundEvent};
pub use intent::{Envelope, Input, Intent};
pub use participant::{Participant, ParticipantKind};
pub use phase::{FinishReason, OpenTurn, Phase, PhaseKind};
pub use reducer::{reduce, Transition};
pub use state::{EligibleActions, ParticipantView, RoundState};
