//! Stop declarations and the challenge that follows them.
//!
//! - `resolver`: orders racing declarations (last write wins)
//! - `eligibility`: who may declare which kind
//! - `challenge`: response window and the draw-and-recheck pool

pub mod challenge;
pub mod eligibility;
pub mod resolver;

pub use challenge::{
    default_response, recheck, ChallengeResponse, ContestPool, PendingDecision, Recheck,
    ResponseWindow,
};
pub use eligibility::{can_contest, check_declaration, StopContext};
pub use resolver::{Declaration, DeclarationKind, DeclarationResolver};
