//! Settlement: reveal chain and score distribution.

pub mod engine;
pub mod reveal;

pub use engine::{distribute, Outcome, ScoreEngine, ScoreResult};
pub use reveal::{classify, doubled, resolve_reveals, reveal_source, RevealClass, RevealOutcome};
