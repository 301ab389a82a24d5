//! Card model: cards, hands, and the shared piles.
//!
//! ## Key Types
//!
//! - `Card`: suit + rank, or a Joker (wildcard)
//! - `Hand`: a participant's unordered cards
//! - `Stock`: the draw pile, bottom inspected at settlement
//! - `Field`: played cards, top is the comparison target

pub mod card;
pub mod hand;
pub mod pile;

pub use card::{full_deck, Card, Suit, STANDARD_DECK_SIZE};
pub use hand::Hand;
pub use pile::{Field, Stock};
