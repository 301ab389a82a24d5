//! Shared helpers for integration tests: logging, cards, arranged tables.

#![allow(dead_code)]

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use dotenko_engine::agents::IntentScheduler;
use dotenko_engine::cards::{Card, Suit};
use dotenko_engine::core::{EngineError, PlayerId, RuleConfig, Tick};
use dotenko_engine::round::{Envelope, Intent, RoundController, RoundState};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once. Level from `TEST_LOG`, then `RUST_LOG`,
/// then `warn`.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn spade(rank: u8) -> Card {
    Card::of(Suit::Spades, rank)
}

pub fn heart(rank: u8) -> Card {
    Card::of(Suit::Hearts, rank)
}

pub fn diamond(rank: u8) -> Card {
    Card::of(Suit::Diamonds, rank)
}

pub fn club(rank: u8) -> Card {
    Card::of(Suit::Clubs, rank)
}

pub fn seat(n: u8) -> PlayerId {
    PlayerId::new(n)
}

/// Config used by arranged-table tests: no opening race, short windows.
pub fn quick_config(hand_size: usize) -> RuleConfig {
    RuleConfig::default()
        .with_hand_size(hand_size)
        .with_windows(0, 100, 100)
}

/// A started round dealing `deck` (top card first: hands seat by seat, then
/// the field card, then the stock from top to bottom).
pub fn arranged(players: usize, config: RuleConfig, deck: Vec<Card>) -> RoundController {
    init_logging();
    let state = RoundState::for_table(config, players, 1)
        .expect("valid table")
        .with_deck(deck);
    let mut round = RoundController::new(state);
    round.start(Tick(0)).expect("round starts");
    round
}

pub fn submit(
    round: &mut RoundController,
    player: u8,
    intent: Intent,
    at: u64,
) -> Result<Vec<dotenko_engine::round::RoundEvent>, EngineError> {
    round.submit(Envelope::new(seat(player), intent, Tick(at)))
}

/// Drive a round with the scheduler until it finishes. Returns whether a
/// fatal fault ended it.
pub fn drive(round: &mut RoundController, scheduler: &mut IntentScheduler, step: u64, max_steps: usize) -> bool {
    let mut now = round.state().now;
    for _ in 0..max_steps {
        if round.is_finished() {
            return false;
        }
        scheduler.on_update(round.state(), now);
        for envelope in scheduler.due(now) {
            match round.submit(envelope) {
                Ok(_) | Err(EngineError::Rejected(_)) => {}
                Err(_) => return true,
            }
        }
        if let Err(EngineError::StockExhausted { .. }) = round.tick(now) {
            return true;
        }
        now = now.after(step);
    }
    panic!("round did not finish within {max_steps} steps");
}
