//! The round dispatcher.
//!
//! ## RoundController
//!
//! Owns the only [`RoundState`] of a round and serializes every change
//! through [`reduce`]. Inputs either go through immediately (`dispatch`,
//! `submit`, `tick`) or are queued and applied in order by `pump`; queued
//! intents are re-validated when applied, so a stale automated intent is
//! simply refused.
//!
//! Observers are called with every event after the new state is committed.
//!
//! ## SharedRound
//!
//! A controller behind one `parking_lot::Mutex` for hosts that submit from
//! several threads. Observers run under the lock and must not call back
//! into the same `SharedRound`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::event::RoundEvent;
use super::intent::{Envelope, Input};
use super::reducer::reduce;
use super::state::{EligibleActions, ParticipantView, RoundState};
use crate::core::{EngineError, PlayerId, Rejection, Tick};
use crate::scoring::ScoreResult;

/// Event callback.
pub type Observer = Box<dyn FnMut(&RoundEvent) + Send>;

/// Serializing dispatcher for one round.
pub struct RoundController {
    state: RoundState,
    queue: VecDeque<Input>,
    observers: Vec<Observer>,
}

impl RoundController {
    #[must_use]
    pub fn new(state: RoundState) -> Self {
        Self {
            state,
            queue: VecDeque::new(),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&RoundEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply one input now.
    ///
    /// On a fatal fault the aborted state is committed and its events are
    /// delivered before the error is returned.
    pub fn dispatch(&mut self, input: Input) -> Result<Vec<RoundEvent>, EngineError> {
        let transition = reduce(&self.state, &input)?;
        self.state = transition.state;
        for event in &transition.events {
            for observer in &mut self.observers {
                observer(event);
            }
        }
        match transition.fault {
            Some(fault) => Err(fault),
            None => Ok(transition.events),
        }
    }

    pub fn start(&mut self, now: Tick) -> Result<Vec<RoundEvent>, EngineError> {
        self.dispatch(Input::Start(now))
    }

    /// Apply a participant's intent. Deadlines reached by its submission time
    /// expire first.
    pub fn submit(&mut self, envelope: Envelope) -> Result<Vec<RoundEvent>, EngineError> {
        let mut events = self.expire_before(envelope.submitted_at)?;
        events.extend(self.dispatch(Input::Submit(envelope))?);
        Ok(events)
    }

    pub fn tick(&mut self, now: Tick) -> Result<Vec<RoundEvent>, EngineError> {
        self.dispatch(Input::Tick(now))
    }

    fn expire_before(&mut self, at: Tick) -> Result<Vec<RoundEvent>, EngineError> {
        match self.state.phase.deadline() {
            Some(deadline) if deadline.is_reached(at) => self.tick(at),
            _ => Ok(Vec::new()),
        }
    }

    /// Queue an input for the next `pump`.
    pub fn enqueue(&mut self, input: Input) {
        self.queue.push_back(input);
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Apply queued inputs in order. Refused inputs are dropped; a fatal
    /// fault stops the pump and is returned.
    ///
    /// Returns how many inputs were accepted.
    pub fn pump(&mut self) -> Result<usize, EngineError> {
        let mut accepted = 0;
        while let Some(input) = self.queue.pop_front() {
            let result = match input {
                Input::Submit(envelope) => self.submit(envelope),
                other => self.dispatch(other),
            };
            match result {
                Ok(_) => accepted += 1,
                Err(EngineError::Rejected(rejection)) => {
                    debug!(%rejection, "queued input refused");
                }
                Err(fault) => {
                    self.queue.clear();
                    return Err(fault);
                }
            }
        }
        Ok(accepted)
    }

    /// Time left on the running countdown.
    #[must_use]
    pub fn time_remaining(&self, now: Tick) -> Option<u64> {
        self.state.time_remaining(now)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[must_use]
    pub fn result(&self) -> Option<&ScoreResult> {
        self.state.result()
    }

    pub fn snapshot_for(&self, player: PlayerId) -> Result<ParticipantView, Rejection> {
        self.state.snapshot_for(player)
    }

    #[must_use]
    pub fn eligible_actions(&self, player: PlayerId) -> EligibleActions {
        self.state.eligible_actions(player)
    }

    /// Give up the state, e.g. to hand the result to a match session.
    #[must_use]
    pub fn into_state(self) -> RoundState {
        self.state
    }
}

impl std::fmt::Debug for RoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("phase", &self.state.phase.kind())
            .field("queued", &self.queue.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// A [`RoundController`] shareable across threads.
#[derive(Clone, Debug)]
pub struct SharedRound {
    inner: Arc<Mutex<RoundController>>,
}

impl SharedRound {
    #[must_use]
    pub fn new(controller: RoundController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn submit(&self, envelope: Envelope) -> Result<Vec<RoundEvent>, EngineError> {
        self.inner.lock().submit(envelope)
    }

    pub fn tick(&self, now: Tick) -> Result<Vec<RoundEvent>, EngineError> {
        self.inner.lock().tick(now)
    }

    pub fn enqueue(&self, input: Input) {
        self.inner.lock().enqueue(input);
    }

    pub fn pump(&self) -> Result<usize, EngineError> {
        self.inner.lock().pump()
    }

    pub fn snapshot_for(&self, player: PlayerId) -> Result<ParticipantView, Rejection> {
        self.inner.lock().snapshot_for(player)
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut RoundController) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
