//! Playing cards.
//!
//! A card is either a standard suit/rank card (Ace = 1 through King = 13) or
//! a Joker. Jokers carry an index so two Jokers in the same deck remain
//! distinct cards.

use serde::{Deserialize, Serialize};

/// Number of standard (non-Joker) cards in a deck.
pub const STANDARD_DECK_SIZE: usize = 52;

/// Card suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

/// A single card. Immutable and `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Card {
    Standard { suit: Suit, rank: u8 },
    Joker(u8),
}

impl Card {
    /// A standard card. `rank` is 1 (Ace) through 13 (King).
    #[must_use]
    pub fn of(suit: Suit, rank: u8) -> Self {
        assert!((1..=13).contains(&rank), "Rank must be 1-13");
        Card::Standard { suit, rank }
    }

    /// The `index`-th Joker of the deck.
    #[must_use]
    pub const fn joker(index: u8) -> Self {
        Card::Joker(index)
    }

    /// Wildcard marker.
    #[must_use]
    pub const fn is_wild(self) -> bool {
        matches!(self, Card::Joker(_))
    }

    #[must_use]
    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Standard { suit, .. } => Some(suit),
            Card::Joker(_) => None,
        }
    }

    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Card::Standard { rank, .. } => Some(rank),
            Card::Joker(_) => None,
        }
    }

    /// Value this card presents when it is the field-top. A Joker on the
    /// field counts as 0.
    #[must_use]
    pub fn field_value(self) -> i32 {
        self.rank().map_or(0, i32::from)
    }

    /// Both cards are standard and share a rank.
    #[must_use]
    pub fn shares_rank(self, other: Card) -> bool {
        matches!((self.rank(), other.rank()), (Some(a), Some(b)) if a == b)
    }

    /// Both cards are standard and share a suit.
    #[must_use]
    pub fn shares_suit(self, other: Card) -> bool {
        matches!((self.suit(), other.suit()), (Some(a), Some(b)) if a == b)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Card::Joker(i) => write!(f, "JK{}", i),
            Card::Standard { suit, rank } => {
                let face = match rank {
                    1 => "A".to_string(),
                    11 => "J".to_string(),
                    12 => "Q".to_string(),
                    13 => "K".to_string(),
                    n => n.to_string(),
                };
                write!(f, "{}{}", face, suit.symbol())
            }
        }
    }
}

/// An unshuffled deck: 52 standard cards in suit/rank order, then Jokers.
#[must_use]
pub fn full_deck(wildcards: u8) -> Vec<Card> {
    let mut deck = Vec::with_capacity(STANDARD_DECK_SIZE + wildcards as usize);
    for suit in Suit::ALL {
        for rank in 1..=13 {
            deck.push(Card::Standard { suit, rank });
        }
    }
    deck.extend((0..wildcards).map(Card::Joker));
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_deck_is_unique() {
        let deck = full_deck(4);
        assert_eq!(deck.len(), 56);
        let mut sorted = deck.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 56);
        assert_eq!(deck.iter().filter(|c| c.is_wild()).count(), 4);
    }

    #[test]
    fn test_shares() {
        let seven_s = Card::of(Suit::Spades, 7);
        let seven_h = Card::of(Suit::Hearts, 7);
        let two_s = Card::of(Suit::Spades, 2);
        let jk = Card::joker(0);

        assert!(seven_s.shares_rank(seven_h));
        assert!(!seven_s.shares_suit(seven_h));
        assert!(seven_s.shares_suit(two_s));
        assert!(!jk.shares_rank(seven_s));
        assert!(!jk.shares_suit(seven_s));
    }

    #[test]
    fn test_field_value() {
        assert_eq!(Card::of(Suit::Clubs, 13).field_value(), 13);
        assert_eq!(Card::joker(1).field_value(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::of(Suit::Spades, 1).to_string(), "A♠");
        assert_eq!(Card::of(Suit::Hearts, 10).to_string(), "10♥");
        assert_eq!(Card::of(Suit::Diamonds, 12).to_string(), "Q♦");
        assert_eq!(Card::joker(1).to_string(), "JK1");
    }

    #[test]
    #[should_panic(expected = "Rank must be 1-13")]
    fn test_rank_out_of_range() {
        let _ = Card::of(Suit::Clubs, 14);
    }
}
