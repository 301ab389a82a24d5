//! Rule configuration.
//!
//! A `RuleConfig` is supplied once when a match is created and shared,
//! immutably, by every round of that match. Hosts either start from
//! `RuleConfig::default()` and chain `with_*` calls, or deserialize one.
//! `validate()` runs before any round is built.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::error::ConfigError;
use crate::cards::{Card, Suit, STANDARD_DECK_SIZE};

/// Highest number of Jokers a deck may carry.
pub const MAX_WILDCARDS: u8 = 4;

/// How settlement reveals are classified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRules {
    /// Ranks whose reveal doubles the multiplier and reveals again.
    pub rate_up_ranks: SmallVec<[u8; 4]>,

    /// Maximum doublings from one chain of reveals.
    pub rate_up_chain_limit: u32,

    /// Final value forced when a Joker is revealed.
    pub joker_final_value: i64,

    /// Card that swaps winners and losers when revealed (`None` disables).
    pub inversion_card: Option<Card>,
}

impl Default for RevealRules {
    fn default() -> Self {
        Self {
            rate_up_ranks: smallvec![1, 2],
            rate_up_chain_limit: 8,
            joker_final_value: 20,
            inversion_card: Some(Card::of(Suit::Diamonds, 3)),
        }
    }
}

/// Immutable per-match rule configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rounds in a match.
    pub round_count: u32,

    /// Jokers added to the 52-card deck (0-4).
    pub wildcard_count: u8,

    /// Cards dealt to each seat.
    pub hand_size: usize,

    /// A hand larger than this with no legal play busts.
    pub bust_hand_size: usize,

    /// Points per unit of final value at multiplier 1.
    pub base_rate: i64,

    /// Multiplier ceiling; doubling past it clamps.
    pub max_multiplier: u32,

    /// Ceiling on a single round's score.
    pub score_cap: i64,

    /// Times per round the field may be shuffled back into the stock.
    pub stock_reshuffle_limit: u32,

    /// Hard cap on challenge draws per round.
    pub challenge_iteration_cap: u32,

    /// Hard cap on counter-stops per round.
    pub max_counter_stops: u32,

    /// Opening free-play countdown, in host time units (0 disables).
    pub opening_window: u64,

    /// Stop-resolution response countdown.
    pub stop_window: u64,

    /// Countdown for a contestant's declare-or-withdraw decision.
    pub challenge_window: u64,

    /// Settlement reveal rules.
    pub reveal: RevealRules,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            round_count: 10,
            wildcard_count: 2,
            hand_size: 5,
            bust_hand_size: 7,
            base_rate: 100,
            max_multiplier: 1 << 10,
            score_cap: 1_000_000,
            stock_reshuffle_limit: 3,
            challenge_iteration_cap: 32,
            max_counter_stops: 8,
            opening_window: 3_000,
            stop_window: 5_000,
            challenge_window: 3_000,
            reveal: RevealRules::default(),
        }
    }
}

impl RuleConfig {
    #[must_use]
    pub fn with_round_count(mut self, rounds: u32) -> Self {
        self.round_count = rounds;
        self
    }

    #[must_use]
    pub fn with_wildcards(mut self, count: u8) -> Self {
        self.wildcard_count = count;
        self
    }

    #[must_use]
    pub fn with_hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    #[must_use]
    pub fn with_bust_hand_size(mut self, size: usize) -> Self {
        self.bust_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_base_rate(mut self, rate: i64) -> Self {
        self.base_rate = rate;
        self
    }

    #[must_use]
    pub fn with_max_multiplier(mut self, max: u32) -> Self {
        self.max_multiplier = max;
        self
    }

    #[must_use]
    pub fn with_score_cap(mut self, cap: i64) -> Self {
        self.score_cap = cap;
        self
    }

    #[must_use]
    pub fn with_reshuffle_limit(mut self, limit: u32) -> Self {
        self.stock_reshuffle_limit = limit;
        self
    }

    #[must_use]
    pub fn with_challenge_cap(mut self, cap: u32) -> Self {
        self.challenge_iteration_cap = cap;
        self
    }

    #[must_use]
    pub fn with_max_counter_stops(mut self, cap: u32) -> Self {
        self.max_counter_stops = cap;
        self
    }

    /// Set the opening, stop-resolution and challenge countdowns.
    #[must_use]
    pub fn with_windows(mut self, opening: u64, stop: u64, challenge: u64) -> Self {
        self.opening_window = opening;
        self.stop_window = stop;
        self.challenge_window = challenge;
        self
    }

    #[must_use]
    pub fn with_reveal(mut self, reveal: RevealRules) -> Self {
        self.reveal = reveal;
        self
    }

    /// Total cards in the deck this config builds.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        STANDARD_DECK_SIZE + self.wildcard_count as usize
    }

    /// Check the configuration against a table of `player_count` seats.
    pub fn validate(&self, player_count: usize) -> Result<(), ConfigError> {
        use super::player::{MAX_PLAYERS, MIN_PLAYERS};

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ConfigError::PlayerCount(player_count));
        }
        if self.wildcard_count > MAX_WILDCARDS {
            return Err(ConfigError::WildcardCount(self.wildcard_count));
        }
        let positives: [(&'static str, bool); 6] = [
            ("round_count", self.round_count > 0),
            ("hand_size", self.hand_size > 0),
            ("base_rate", self.base_rate > 0),
            ("max_multiplier", self.max_multiplier > 0),
            ("score_cap", self.score_cap > 0),
            ("challenge_iteration_cap", self.challenge_iteration_cap > 0),
        ];
        if let Some(&(field, _)) = positives.iter().find(|(_, ok)| !*ok) {
            return Err(ConfigError::NotPositive { field });
        }
        let needed = player_count * self.hand_size + 1;
        if needed > self.deck_size() {
            return Err(ConfigError::DeckTooSmall {
                deck: self.deck_size(),
                needed,
            });
        }
        if let Some(&rank) = self
            .reveal
            .rate_up_ranks
            .iter()
            .find(|r| !(1..=13).contains(*r))
        {
            return Err(ConfigError::RateUpRank(rank));
        }
        Ok(())
    }
}

/// Pacing for automated participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Shortest delay, in units.
    pub min_delay: u64,
    /// Longest delay, in units.
    pub max_delay: u64,
    /// Host time per unit.
    pub unit: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_delay: 1,
            max_delay: 3,
            unit: 1_000,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay > self.max_delay {
            return Err(ConfigError::DelayRange {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RuleConfig::default();
        assert!(config.validate(4).is_ok());
        assert_eq!(config.deck_size(), 54);
    }

    #[test]
    fn test_builder_pattern() {
        let config = RuleConfig::default()
            .with_wildcards(4)
            .with_base_rate(250)
            .with_windows(0, 10, 20);

        assert_eq!(config.wildcard_count, 4);
        assert_eq!(config.base_rate, 250);
        assert_eq!(config.opening_window, 0);
        assert_eq!(config.stop_window, 10);
        assert_eq!(config.challenge_window, 20);
    }

    #[test]
    fn test_rejects_bad_player_count() {
        let config = RuleConfig::default();
        assert_eq!(config.validate(1), Err(ConfigError::PlayerCount(1)));
        assert_eq!(config.validate(9), Err(ConfigError::PlayerCount(9)));
    }

    #[test]
    fn test_rejects_too_many_wildcards() {
        let config = RuleConfig::default().with_wildcards(5);
        assert_eq!(config.validate(2), Err(ConfigError::WildcardCount(5)));
    }

    #[test]
    fn test_rejects_zero_base_rate() {
        let config = RuleConfig::default().with_base_rate(0);
        assert_eq!(
            config.validate(2),
            Err(ConfigError::NotPositive { field: "base_rate" })
        );
    }

    #[test]
    fn test_rejects_deck_too_small() {
        let config = RuleConfig::default().with_hand_size(7).with_wildcards(0);
        assert_eq!(
            config.validate(8),
            Err(ConfigError::DeckTooSmall { deck: 52, needed: 57 })
        );
    }

    #[test]
    fn test_rejects_out_of_range_rate_up_rank() {
        let reveal = RevealRules {
            rate_up_ranks: smallvec![0],
            ..RevealRules::default()
        };
        let config = RuleConfig::default().with_reveal(reveal);
        assert_eq!(config.validate(3), Err(ConfigError::RateUpRank(0)));
    }

    #[test]
    fn test_scheduler_delay_range() {
        assert!(SchedulerConfig::default().validate().is_ok());
        let bad = SchedulerConfig {
            min_delay: 4,
            max_delay: 2,
            unit: 1,
        };
        assert_eq!(bad.validate(), Err(ConfigError::DelayRange { min: 4, max: 2 }));
    }

    #[test]
    fn test_serialization() {
        let config = RuleConfig::default().with_round_count(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: RuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
