//! Settlement reveals.
//!
//! After a round is decided the bottom of the stock is turned over (or the
//! oldest field card when the stock is empty). Rate-up cards double the
//! multiplier and chain to the next card upward; the chain stops at the
//! first other card, when the source runs out, or after the configured number
//! of doublings. The last card revealed fixes the round's face value.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::cards::{Card, Field, Stock};
use crate::core::RevealRules;

/// What a revealed card does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealClass {
    /// Doubles the multiplier and reveals again.
    RateUp,
    /// Forces the face value.
    ValueOverride(i64),
    /// Swaps winners and losers.
    Inversion,
    Plain,
}

#[must_use]
pub fn classify(card: Card, rules: &RevealRules) -> RevealClass {
    if card.is_wild() {
        return RevealClass::ValueOverride(rules.joker_final_value);
    }
    if rules.inversion_card == Some(card) {
        return RevealClass::Inversion;
    }
    match card.rank() {
        Some(rank) if rules.rate_up_ranks.contains(&rank) => RevealClass::RateUp,
        _ => RevealClass::Plain,
    }
}

/// `multiplier` doubled, clamped to `max`.
#[must_use]
pub fn doubled(multiplier: u32, max: u32) -> u32 {
    let next = multiplier.saturating_mul(2);
    if next > max {
        warn!(multiplier, max, "multiplier clamped");
        max
    } else {
        next
    }
}

/// Cards a settlement reveal reads, in reveal order.
#[must_use]
pub fn reveal_source(stock: &Stock, field: &Field) -> Vec<Card> {
    if stock.is_empty() {
        field.oldest_first().collect()
    } else {
        stock.bottom_up().collect()
    }
}

/// Result of a reveal chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    /// Cards turned over, in order.
    pub reveals: SmallVec<[Card; 4]>,
    pub doublings: u32,
    /// Multiplier after the chain.
    pub multiplier: u32,
    pub final_value: i64,
    pub inverted: bool,
}

/// Run the reveal chain over `source` starting from `multiplier`.
///
/// Visits at most `source.len()` cards.
pub fn resolve_reveals(
    source: impl IntoIterator<Item = Card>,
    rules: &RevealRules,
    multiplier: u32,
    max_multiplier: u32,
) -> RevealOutcome {
    let mut outcome = RevealOutcome {
        reveals: SmallVec::new(),
        doublings: 0,
        multiplier,
        final_value: 0,
        inverted: false,
    };

    for card in source {
        outcome.reveals.push(card);
        outcome.final_value = card.rank().map_or(0, i64::from);
        match classify(card, rules) {
            RevealClass::RateUp if outcome.doublings < rules.rate_up_chain_limit => {
                outcome.doublings += 1;
                outcome.multiplier = doubled(outcome.multiplier, max_multiplier);
                debug!(%card, multiplier = outcome.multiplier, "rate-up reveal");
                continue;
            }
            RevealClass::ValueOverride(value) => outcome.final_value = value,
            RevealClass::Inversion => outcome.inverted = true,
            RevealClass::RateUp | RevealClass::Plain => {}
        }
        break;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    fn club(rank: u8) -> Card {
        Card::of(Suit::Clubs, rank)
    }

    #[test]
    fn test_classify_defaults() {
        let rules = RevealRules::default();
        assert_eq!(classify(club(1), &rules), RevealClass::RateUp);
        assert_eq!(classify(club(2), &rules), RevealClass::RateUp);
        assert_eq!(classify(Card::joker(0), &rules), RevealClass::ValueOverride(20));
        assert_eq!(classify(Card::of(Suit::Diamonds, 3), &rules), RevealClass::Inversion);
        assert_eq!(classify(club(3), &rules), RevealClass::Plain);
    }

    #[test]
    fn test_two_rate_ups_then_plain() {
        let outcome = resolve_reveals([club(1), club(2), club(10), club(5)], &RevealRules::default(), 1, 1024);
        assert_eq!(outcome.doublings, 2);
        assert_eq!(outcome.multiplier, 4);
        assert_eq!(outcome.final_value, 10);
        assert_eq!(outcome.reveals.len(), 3);
        assert!(!outcome.inverted);
    }

    #[test]
    fn test_chain_stops_when_source_runs_out() {
        let outcome = resolve_reveals([club(1), club(1), club(2)], &RevealRules::default(), 1, 1024);
        assert_eq!(outcome.reveals.len(), 3);
        assert_eq!(outcome.multiplier, 8);
        assert_eq!(outcome.final_value, 2);
    }

    #[test]
    fn test_chain_limit() {
        let rules = RevealRules {
            rate_up_chain_limit: 1,
            ..RevealRules::default()
        };
        let outcome = resolve_reveals([club(1), club(2), club(9)], &rules, 1, 1024);
        assert_eq!(outcome.doublings, 1);
        assert_eq!(outcome.multiplier, 2);
        assert_eq!(outcome.final_value, 2);
    }

    #[test]
    fn test_joker_overrides_value() {
        let outcome = resolve_reveals([club(2), Card::joker(1)], &RevealRules::default(), 1, 1024);
        assert_eq!(outcome.multiplier, 2);
        assert_eq!(outcome.final_value, 20);
    }

    #[test]
    fn test_inversion_keeps_face_value() {
        let outcome = resolve_reveals([Card::of(Suit::Diamonds, 3)], &RevealRules::default(), 2, 1024);
        assert!(outcome.inverted);
        assert_eq!(outcome.final_value, 3);
        assert_eq!(outcome.multiplier, 2);
    }

    #[test]
    fn test_doubling_clamps() {
        assert_eq!(doubled(4, 8), 8);
        assert_eq!(doubled(8, 8), 8);
        assert_eq!(doubled(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_reveal_source_falls_back_to_field() {
        let mut field = Field::new();
        field.place(club(4));
        field.place(club(5));
        let stock = Stock::from_bottom_up(Vec::new());
        assert_eq!(reveal_source(&stock, &field), vec![club(4), club(5)]);

        let stock = Stock::from_bottom_up([club(9), club(8)]);
        assert_eq!(reveal_source(&stock, &field), vec![club(9), club(8)]);
    }
}
