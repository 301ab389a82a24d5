//! Declaration resolver.
//!
//! Holds the active stop declaration of a round and arbitrates overrides.
//! Resolution is last-write-wins by submission time: a stop or counter-stop
//! stamped after the active declaration replaces it and the replaced declarer
//! becomes the provisional loser. Anything stamped at or before the active
//! one lost the race and is refused as superseded.
//!
//! Eligibility (hand matching, self-exclusion) is checked by the caller
//! through [`super::eligibility`]; the resolver only orders declarations.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, Rejection, Tick};

/// Kind of stop declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// Hand total equals the field value after a play by someone else.
    PrimaryStop,
    /// Hand total equals the first revealed field card, before any play.
    FirstStop,
    /// Overrides the active declared winner.
    CounterStop,
}

/// A declaration as accepted by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub declarer: PlayerId,
    pub kind: DeclarationKind,
    pub at: Tick,
}

/// Active declaration plus the trail of overridden ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationResolver {
    active: Option<Declaration>,
    superseded: Vec<Declaration>,
    max_counters: u32,
}

impl DeclarationResolver {
    #[must_use]
    pub fn new(max_counters: u32) -> Self {
        Self {
            active: None,
            superseded: Vec::new(),
            max_counters,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&Declaration> {
        self.active.as_ref()
    }

    /// Current declared winner.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.active.map(|d| d.declarer)
    }

    /// Overridden declarations, oldest first.
    #[must_use]
    pub fn superseded(&self) -> &[Declaration] {
        &self.superseded
    }

    /// The most recently overridden declarer.
    #[must_use]
    pub fn provisional_loser(&self) -> Option<PlayerId> {
        self.superseded.last().map(|d| d.declarer)
    }

    /// Counter-stops accepted so far.
    #[must_use]
    pub fn counters(&self) -> u32 {
        self.superseded.len() as u32
    }

    #[must_use]
    pub fn counter_limit_reached(&self) -> bool {
        self.counters() >= self.max_counters
    }

    /// The declaration that opened resolution this round.
    #[must_use]
    pub fn origin(&self) -> Option<&Declaration> {
        self.superseded.first().or(self.active.as_ref())
    }

    /// Accept `decl` if it wins the race.
    ///
    /// With a declaration already active, any later stop from another seat
    /// overrides it, whatever its kind. Returns the declarer it demoted, if
    /// any.
    pub fn accept(&mut self, decl: Declaration) -> Result<Option<PlayerId>, Rejection> {
        let Some(current) = self.active else {
            if decl.kind == DeclarationKind::CounterStop {
                return Err(Rejection::NoActiveDeclaration);
            }
            self.active = Some(decl);
            return Ok(None);
        };
        if current.declarer == decl.declarer {
            return Err(Rejection::AlreadyDeclared);
        }
        if decl.at <= current.at {
            return Err(Rejection::Superseded);
        }
        if self.counter_limit_reached() {
            return Err(Rejection::CounterLimitReached);
        }
        self.superseded.push(current);
        self.active = Some(decl);
        Ok(Some(current.declarer))
    }
}
