//! A participant's hand: an unordered multiset of cards.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::Card;
use crate::rules::{evaluate, HandTotals};

/// Cards held by one participant.
///
/// Backed by a `SmallVec` sized for a typical hand so most rounds never
/// touch the heap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: SmallVec<[Card; 8]>,
}

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_cards(cards: &[Card]) -> Self {
        Self {
            cards: SmallVec::from_slice(cards),
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

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Whether every card of `selection` is held, counting duplicates.
    #[must_use]
    pub fn contains_all(&self, selection: &[Card]) -> bool {
        let mut remaining: SmallVec<[Card; 8]> = self.cards.clone();
        selection.iter().all(|card| {
            match remaining.iter().position(|c| c == card) {
                Some(idx) => {
                    remaining.swap_remove(idx);
                    true
                }
                None => false,
            }
        })
    }

    /// Remove every card of `selection`. All-or-nothing: returns `false` and
    /// leaves the hand untouched if any card is missing.
    pub fn remove_all(&mut self, selection: &[Card]) -> bool {
        if !self.contains_all(selection) {
            return false;
        }
        for card in selection {
            if let Some(idx) = self.cards.iter().position(|c| c == card) {
                self.cards.remove(idx);
            }
        }
        true
    }

    /// Every total this hand can represent.
    #[must_use]
    pub fn totals(&self) -> HandTotals {
        evaluate(&self.cards)
    }
}
