//! Paced delivery of automated intents.
//!
//! After every state update the host calls [`IntentScheduler::on_update`].
//! Each registered seat without a pending intent is asked for a decision,
//! which is held back for a random delay of `min_delay..=max_delay` units
//! before [`IntentScheduler::due`] releases it. The controller never waits
//! on the scheduler; released intents are re-validated when applied.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::decider::DecisionMaker;
use crate::core::{ConfigError, GameRng, PlayerId, SchedulerConfig, Tick};
use crate::round::{Envelope, Intent, RoundState};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Scheduled {
    intent: Intent,
    fire_at: Tick,
}

/// Holds automated intents until their delay has passed.
pub struct IntentScheduler {
    config: SchedulerConfig,
    rng: GameRng,
    deciders: FxHashMap<PlayerId, Box<dyn DecisionMaker + Send>>,
    pending: FxHashMap<PlayerId, Scheduled>,
}

impl IntentScheduler {
    /// `rng` should be a stream of its own (see [`GameRng::fork`]) so pacing
    /// never changes the cards.
    pub fn new(config: SchedulerConfig, rng: GameRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            deciders: FxHashMap::default(),
            pending: FxHashMap::default(),
        })
    }

    /// Drive `player` with `decider`, replacing any previous one.
    pub fn register(&mut self, player: PlayerId, decider: impl DecisionMaker + Send + 'static) {
        self.deciders.insert(player, Box::new(decider));
        self.pending.remove(&player);
    }

    #[must_use]
    pub fn is_registered(&self, player: PlayerId) -> bool {
        self.deciders.contains_key(&player)
    }

    fn delay(&mut self) -> u64 {
        self.rng
            .gen_inclusive(self.config.min_delay, self.config.max_delay)
            .saturating_mul(self.config.unit)
    }

    /// Ask idle automated seats for a decision. Returns how many intents
    /// were scheduled.
    pub fn on_update(&mut self, state: &RoundState, now: Tick) -> usize {
        if state.is_finished() {
            self.cancel_all();
            return 0;
        }
        let mut seats: Vec<PlayerId> = self
            .deciders
            .keys()
            .copied()
            .filter(|p| !self.pending.contains_key(p))
            .collect();
        seats.sort_unstable();

        let mut scheduled = 0;
        for player in seats {
            let Ok(view) = state.snapshot_for(player) else {
                continue;
            };
            if !view.actions.any() {
                continue;
            }
            let Some(intent) = self.deciders.get_mut(&player).and_then(|d| d.decide(&view)) else {
                continue;
            };
            let fire_at = now.after(self.delay());
            debug!(%player, ?intent, %fire_at, "intent scheduled");
            self.pending.insert(player, Scheduled { intent, fire_at });
            scheduled += 1;
        }
        scheduled
    }

    /// Release intents whose delay has passed, earliest first, stamped with
    /// their fire time.
    pub fn due(&mut self, now: Tick) -> Vec<Envelope> {
        let mut ready: Vec<(PlayerId, Scheduled)> = Vec::new();
        self.pending.retain(|player, scheduled| {
            if scheduled.fire_at <= now {
                ready.push((*player, scheduled.clone()));
                false
            } else {
                true
            }
        });
        ready.sort_by_key(|(player, s)| (s.fire_at, *player));
        ready
            .into_iter()
            .map(|(player, s)| Envelope::new(player, s.intent, s.fire_at))
            .collect()
    }

    /// When the next intent becomes due.
    #[must_use]
    pub fn next_due(&self) -> Option<Tick> {
        self.pending.values().map(|s| s.fire_at).min()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cancel(&mut self, player: PlayerId) {
        self.pending.remove(&player);
    }

    /// Drop every pending intent, e.g. at round end.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

impl std::fmt::Debug for IntentScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentScheduler")
            .field("config", &self.config)
            .field("seats", &self.deciders.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
