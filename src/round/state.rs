//! Round state.
//!
//! ## RoundState
//!
//! Everything one round needs, owned by a single `RoundController` and only
//! changed through the reducer. Piles are `im::Vector`s and the config sits
//! behind an `Arc`, so the reducer's working clone is cheap.
//!
//! ## Queries
//!
//! - [`RoundState::eligible_actions`]: what a seat may do right now
//! - [`RoundState::snapshot_for`]: a seat's view (own hand, public info)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::participant::{Participant, ParticipantKind};
use super::phase::{Phase, PhaseKind};
use crate::cards::{Card, Field, Hand, Stock};
use crate::core::{ConfigError, GameRng, PlayerId, PlayerMap, Rejection, RuleConfig, Tick};
use crate::declare::{can_contest, check_declaration, DeclarationKind, DeclarationResolver, StopContext};
use crate::rules::{has_legal_play, legal_plays, HandTotals, Play};
use crate::scoring::ScoreResult;

/// Complete state of one round.
#[derive(Clone, Debug)]
pub struct RoundState {
    // === Configuration ===
    pub config: Arc<RuleConfig>,

    // === Progression ===
    pub phase: Phase,

    /// Latest host time seen.
    pub now: Tick,

    /// Seat that holds the first turn.
    pub lead: PlayerId,

    pub participants: PlayerMap<Participant>,

    // === Piles ===
    pub stock: Stock,
    pub field: Field,

    /// Field-top once dealing finished; FirstStop compares against it.
    pub first_card: Option<Card>,

    /// Deck to deal instead of shuffling, top card first.
    pub arranged: Option<Vec<Card>>,

    // === Stop tracking ===
    pub resolver: DeclarationResolver,

    /// Seat that played the current field-top.
    pub setter: Option<PlayerId>,

    pub plays_made: u32,

    // === Scoring ===
    pub multiplier: u32,
    pub reshuffles: u32,
    pub result: Option<ScoreResult>,

    pub rng: GameRng,
}

impl RoundState {
    /// Create a round waiting for `Input::Start`.
    pub fn new(
        config: Arc<RuleConfig>,
        mut participants: PlayerMap<Participant>,
        lead: PlayerId,
        rng: GameRng,
    ) -> Result<Self, ConfigError> {
        config.validate(participants.player_count())?;
        for (_, p) in participants.iter_mut() {
            p.reset_for_round();
        }
        Ok(Self {
            resolver: DeclarationResolver::new(config.max_counter_stops),
            config,
            phase: Phase::Waiting,
            now: Tick::default(),
            lead,
            participants,
            stock: Stock::default(),
            field: Field::new(),
            first_card: None,
            arranged: None,
            setter: None,
            plays_made: 0,
            multiplier: 1,
            reshuffles: 0,
            result: None,
            rng,
        })
    }

    /// A table of human seats, lead seat 0.
    pub fn for_table(config: RuleConfig, player_count: usize, seed: u64) -> Result<Self, ConfigError> {
        if player_count == 0 {
            return Err(ConfigError::PlayerCount(0));
        }
        let participants = PlayerMap::new(player_count, |id| Participant::new(id, ParticipantKind::Human));
        Self::new(Arc::new(config), participants, PlayerId::new(0), GameRng::new(seed))
    }

    /// Deal `cards` instead of a shuffled deck.
    ///
    /// Cards are listed top first: seat 0 receives the first `hand_size`,
    /// seat 1 the next, and so on; the following card is revealed onto the
    /// field and the last card is the stock bottom.
    #[must_use]
    pub fn with_deck(mut self, cards: Vec<Card>) -> Self {
        let needed = self.player_count() * self.config.hand_size + 1;
        assert!(cards.len() >= needed, "Arranged deck too small to deal");
        self.arranged = Some(cards);
        self
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.participants.player_count()
    }

    pub fn participant(&self, player: PlayerId) -> Result<&Participant, Rejection> {
        self.participants
            .get(player)
            .ok_or(Rejection::UnknownParticipant(player))
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Option<&Hand> {
        self.participants.get(player).map(|p| &p.hand)
    }

    #[must_use]
    pub fn totals(&self, player: PlayerId) -> Option<HandTotals> {
        self.hand(player).map(Hand::totals)
    }

    #[must_use]
    pub fn field_top(&self) -> Option<Card> {
        self.field.top()
    }

    /// Value of the field-top (0 before dealing).
    #[must_use]
    pub fn field_value(&self) -> i32 {
        self.field.top().map_or(0, Card::field_value)
    }

    #[must_use]
    pub fn stop_context(&self) -> StopContext {
        StopContext {
            field_value: self.field_value(),
            first_field_value: self.first_card.map_or(0, Card::field_value),
            setter: self.setter,
            plays_made: self.plays_made,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    #[must_use]
    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn time_remaining(&self, now: Tick) -> Option<u64> {
        self.phase.time_remaining(now)
    }

    /// Seat holding the turn while cards are played.
    #[must_use]
    pub fn turn(&self) -> Option<PlayerId> {
        match &self.phase {
            Phase::Open(turn) => Some(turn.turn),
            _ => None,
        }
    }

    fn may_declare(&self, kind: DeclarationKind, player: PlayerId) -> bool {
        self.totals(player)
            .is_some_and(|totals| check_declaration(&self.stop_context(), kind, player, &totals).is_ok())
    }

    /// Whether `player` could override the active declaration now.
    #[must_use]
    pub fn can_counter(&self, player: PlayerId) -> bool {
        self.resolver.winner().is_some_and(|w| w != player)
            && !self.resolver.counter_limit_reached()
            && self.may_declare(DeclarationKind::CounterStop, player)
    }

    /// Seats that may declare a stop on the current field.
    #[must_use]
    pub fn stop_eligible(&self) -> SmallVec<[PlayerId; 8]> {
        let kind = if self.plays_made == 0 {
            DeclarationKind::FirstStop
        } else {
            DeclarationKind::PrimaryStop
        };
        self.participants
            .player_ids()
            .filter(|p| self.may_declare(kind, *p))
            .collect()
    }

    /// What `player` may do right now.
    #[must_use]
    pub fn eligible_actions(&self, player: PlayerId) -> EligibleActions {
        let mut actions = EligibleActions::default();
        let Some(hand) = self.hand(player) else {
            return actions;
        };

        match &self.phase {
            Phase::Open(turn) => {
                let my_turn = turn.turn == player;
                let racing = self.plays_made == 0 && turn.opening.is_some();
                actions.can_play = (my_turn || racing)
                    && self.field.top().is_some_and(|top| has_legal_play(hand.cards(), top));
                actions.can_draw = my_turn && !turn.drawn;
                actions.can_pass = my_turn && turn.drawn;
                actions.can_declare_stop = self.may_declare(DeclarationKind::PrimaryStop, player);
                actions.can_declare_first_stop = self.may_declare(DeclarationKind::FirstStop, player);
            }
            Phase::StopResolution(window) => {
                if window.is_offered(player) && window.response(player).is_none() {
                    actions.can_counter = self.can_counter(player);
                    actions.can_participate = can_contest(&hand.totals(), self.field_value());
                    actions.can_decline = true;
                }
            }
            Phase::Challenge(pool) => {
                if pool.pending().is_some_and(|d| d.player == player) {
                    actions.can_counter = self.can_counter(player);
                    actions.can_pass = true;
                }
            }
            Phase::Waiting | Phase::Dealing | Phase::Settlement | Phase::Finished(_) => {}
        }
        actions
    }

    /// What `player` may see: own hand plus public information.
    pub fn snapshot_for(&self, player: PlayerId) -> Result<ParticipantView, Rejection> {
        let me = self.participant(player)?;
        let actions = self.eligible_actions(player);
        let legal = match self.field.top() {
            Some(top) if actions.can_play => legal_plays(me.hand.cards(), top),
            _ => Vec::new(),
        };
        Ok(ParticipantView {
            player,
            phase: self.phase.kind(),
            now: self.now,
            turn: self.turn(),
            hand: me.hand.clone(),
            totals: me.hand.totals(),
            hand_sizes: self.participants.map(|_, p| p.hand.len()),
            scores: self.participants.map(|_, p| p.score),
            field_top: self.field.top(),
            field_value: self.field_value(),
            stock_len: self.stock.len(),
            multiplier: self.multiplier,
            plays_made: self.plays_made,
            setter: self.setter,
            declared_winner: self.resolver.winner(),
            time_remaining: self.time_remaining(self.now),
            actions,
            legal_plays: legal,
        })
    }
}

/// Per-seat action flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleActions {
    pub can_play: bool,
    pub can_draw: bool,
    /// End the turn, or withdraw from a pending challenge decision.
    pub can_pass: bool,
    pub can_declare_stop: bool,
    pub can_declare_first_stop: bool,
    pub can_counter: bool,
    pub can_participate: bool,
    pub can_decline: bool,
}

impl EligibleActions {
    #[must_use]
    pub fn any(&self) -> bool {
        self.can_play
            || self.can_draw
            || self.can_pass
            || self.can_declare_stop
            || self.can_declare_first_stop
            || self.can_counter
            || self.can_participate
            || self.can_decline
    }
}

/// One seat's view of the round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub player: PlayerId,
    pub phase: PhaseKind,
    pub now: Tick,
    pub turn: Option<PlayerId>,
    pub hand: Hand,
    pub totals: HandTotals,
    pub hand_sizes: PlayerMap<usize>,
    pub scores: PlayerMap<i64>,
    pub field_top: Option<Card>,
    pub field_value: i32,
    pub stock_len: usize,
    pub multiplier: u32,
    pub plays_made: u32,
    pub setter: Option<PlayerId>,
    pub declared_winner: Option<PlayerId>,
    pub time_remaining: Option<u64>,
    pub actions: EligibleActions,
    /// Filled only when `actions.can_play`.
    pub legal_plays: Vec<Play>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_round_is_waiting() {
        let state = RoundState::for_table(RuleConfig::default(), 3, 1).unwrap();
        assert_eq!(state.phase.kind(), PhaseKind::Waiting);
        assert_eq!(state.multiplier, 1);
        assert_eq!(state.field_value(), 0);
        assert!(!state.eligible_actions(PlayerId::new(0)).any());
    }

    #[test]
    fn test_rejects_bad_table() {
        assert_eq!(
            RoundState::for_table(RuleConfig::default(), 1, 1).err(),
            Some(ConfigError::PlayerCount(1))
        );
    }

    #[test]
    fn test_snapshot_unknown_seat() {
        let state = RoundState::for_table(RuleConfig::default(), 2, 1).unwrap();
        assert_eq!(
            state.snapshot_for(PlayerId::new(5)).err(),
            Some(Rejection::UnknownParticipant(PlayerId::new(5)))
        );
    }

    #[test]
    #[should_panic(expected = "Arranged deck too small")]
    fn test_arranged_deck_must_cover_deal() {
        let state = RoundState::for_table(RuleConfig::default(), 2, 1).unwrap();
        let _ = state.with_deck(vec![Card::joker(0)]);
    }
}
