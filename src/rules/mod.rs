//! Stateless rules: play legality and hand evaluation.
//!
//! Neither function looks at round state; callers pass the cards and the
//! field-top explicitly.

pub mod evaluator;
pub mod legality;

pub use evaluator::{evaluate, totals_for, HandTotals, WILDCARD_VALUES};
pub use legality::{
    check_play, has_legal_play, legal_plays, IllegalPlay, Play, PlayRule, MAX_ENUMERATED_HAND,
};
