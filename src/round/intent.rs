//! Reducer inputs.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, Tick};
use crate::declare::{ChallengeResponse, DeclarationKind};
use crate::rules::Play;

/// Something a participant wants to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Play cards; the last card becomes the field-top.
    Play(Play),
    Draw,
    /// End the turn after drawing, or withdraw from a pending challenge
    /// decision.
    Pass,
    Declare(DeclarationKind),
    Respond(ChallengeResponse),
}

/// An intent stamped with its sender and submission time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub player: PlayerId,
    pub intent: Intent,
    pub submitted_at: Tick,
}

impl Envelope {
    #[must_use]
    pub fn new(player: PlayerId, intent: Intent, submitted_at: Tick) -> Self {
        Self {
            player,
            intent,
            submitted_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// Deal and reveal.
    Start(Tick),
    Submit(Envelope),
    /// Host clock; expires reached deadlines.
    Tick(Tick),
}

impl Input {
    /// Host time carried by this input.
    #[must_use]
    pub fn at(&self) -> Tick {
        match self {
            Input::Start(now) | Input::Tick(now) => *now,
            Input::Submit(envelope) => envelope.submitted_at,
        }
    }
}
