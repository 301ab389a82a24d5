//! Host-driven time.
//!
//! The engine never owns a timer. The host passes the current time into every
//! input and the engine stores deadlines; countdowns are observed through
//! [`Deadline::remaining`] and expire when a `Tick` at or past the deadline is
//! applied.

use serde::{Deserialize, Serialize};

/// A point in host time. The unit is chosen by the host (typically ms).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    #[must_use]
    pub const fn new(t: u64) -> Self {
        Self(t)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// This tick shifted forward by `delta` units.
    #[must_use]
    pub const fn after(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// A countdown end point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub started: Tick,
    pub at: Tick,
}

impl Deadline {
    /// Countdown of `window` units starting at `now`.
    #[must_use]
    pub const fn starting(now: Tick, window: u64) -> Self {
        Self {
            started: now,
            at: now.after(window),
        }
    }

    /// Time left before expiry; zero once reached.
    #[must_use]
    pub fn remaining(&self, now: Tick) -> u64 {
        self.at.0.saturating_sub(now.0)
    }

    #[must_use]
    pub fn is_reached(&self, now: Tick) -> bool {
        now >= self.at
    }
}
