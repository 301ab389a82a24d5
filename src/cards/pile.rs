//! Shared piles: the stock (draw pile) and the field (played cards).
//!
//! Both are `im::Vector`s so a round state can be cloned cheaply by the
//! reducer. Index 0 is the bottom of the stock and the oldest field card.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::core::GameRng;

/// The draw pile. Cards are drawn from the top (end); settlement inspects the
/// bottom (index 0).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    cards: Vector<Card>,
}

impl Stock {
    /// Build a stock from cards listed bottom first.
    #[must_use]
    pub fn from_bottom_up(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_back()
    }

    /// Cards from the bottom upward.
    pub fn bottom_up(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    /// Shuffle `cards` and place them under the current stock.
    pub fn refill(&mut self, mut cards: Vec<Card>, rng: &mut GameRng) {
        rng.shuffle(&mut cards);
        let mut refilled: Vector<Card> = cards.into_iter().collect();
        refilled.append(std::mem::take(&mut self.cards));
        self.cards = refilled;
    }
}

/// Played cards. The last card is the field-top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    cards: Vector<Card>,
}

impl Field {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Put a card on top.
    pub fn place(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    /// Cards from the oldest to the top.
    pub fn oldest_first(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    /// Remove everything under the top card, oldest first. The top stays.
    pub fn take_all_but_top(&mut self) -> Vec<Card> {
        let Some(top) = self.cards.pop_back() else {
            return Vec::new();
        };
        let rest: Vec<Card> = std::mem::take(&mut self.cards).into_iter().collect();
        self.cards.push_back(top);
        rest
    }
}
