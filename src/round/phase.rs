//! Round phases.
//!
//! `Waiting → Dealing → Open → StopResolution → Challenge → Settlement →
//! Finished`. `Dealing` and `Settlement` are passed through inside a single
//! reducer step; the others wait for input.

use serde::{Deserialize, Serialize};

use crate::core::{Deadline, PlayerId, Tick};
use crate::declare::{ContestPool, ResponseWindow};

/// Turn state while cards are being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTurn {
    /// Seat holding the turn.
    pub turn: PlayerId,
    /// The turn holder has drawn this turn.
    pub drawn: bool,
    /// Opening free-play countdown; `None` once closed.
    pub opening: Option<Deadline>,
}

/// Why a round stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Settled,
    /// Stock could not be replenished.
    Aborted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Dealing,
    Open(OpenTurn),
    StopResolution(ResponseWindow),
    Challenge(ContestPool),
    Settlement,
    Finished(FinishReason),
}

/// Phase discriminant, for errors and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Waiting,
    Dealing,
    Open,
    StopResolution,
    Challenge,
    Settlement,
    Finished,
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Waiting => PhaseKind::Waiting,
            Phase::Dealing => PhaseKind::Dealing,
            Phase::Open(_) => PhaseKind::Open,
            Phase::StopResolution(_) => PhaseKind::StopResolution,
            Phase::Challenge(_) => PhaseKind::Challenge,
            Phase::Settlement => PhaseKind::Settlement,
            Phase::Finished(_) => PhaseKind::Finished,
        }
    }

    /// The countdown currently running, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Deadline> {
        match self {
            Phase::Open(turn) => turn.opening,
            Phase::StopResolution(window) => Some(window.deadline()),
            Phase::Challenge(pool) => pool.pending().map(|d| d.deadline),
            _ => None,
        }
    }

    /// Time left on the running countdown.
    #[must_use]
    pub fn time_remaining(&self, now: Tick) -> Option<u64> {
        self.deadline().map(|d| d.remaining(now))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished(_))
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhaseKind::Waiting => "waiting",
            PhaseKind::Dealing => "dealing",
            PhaseKind::Open => "open",
            PhaseKind::StopResolution => "stop resolution",
            PhaseKind::Challenge => "challenge",
            PhaseKind::Settlement => "settlement",
            PhaseKind::Finished => "finished",
        };
        f.write_str(name)
    }
}
