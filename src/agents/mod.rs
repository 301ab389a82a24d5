//! Automated participants.
//!
//! Decision heuristics live outside the engine. A seat is automated by
//! registering a [`DecisionMaker`] with an [`IntentScheduler`], which paces
//! its intents and hands them back as ordinary envelopes.

pub mod decider;
pub mod scheduler;

pub use decider::{BasicDecider, DecisionMaker};
pub use scheduler::IntentScheduler;
