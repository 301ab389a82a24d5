//! Core engine types: seats, RNG, host clock, configuration, errors.
//!
//! These are shared by every other module and carry no game rules of their
//! own.

pub mod clock;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;

pub use clock::{Deadline, Tick};
pub use config::{RevealRules, RuleConfig, SchedulerConfig, MAX_WILDCARDS};
pub use error::{ConfigError, EngineError, Rejection};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS, MIN_PLAYERS};
pub use rng::{GameRng, GameRngState};
