//! The round reducer.
//!
//! `reduce(&state, &input)` returns the next state and the events that led
//! to it, or a [`Rejection`] with the original state untouched. Work happens
//! on a clone, so a rejection anywhere in a step discards every partial
//! change.
//!
//! ## Timeouts
//!
//! `Input::Tick(now)` expires every deadline reached by `now`, synthesizing
//! the default intent for each:
//!
//! - opening countdown: play becomes strictly turn-based
//! - response window: first seat able to counter does so, the rest
//!   participate when they can contest and decline otherwise
//! - pending challenge decision: counter-stop, which reopens resolution
//!   from the new winner
//!
//! ## Faults
//!
//! A draw that cannot be served (empty stock, nothing to reshuffle) aborts
//! the round during play. The transition still succeeds and carries the
//! fault so the dispatcher can surface it after committing the aborted state.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::event::{ChallengeEnd, RoundEvent};
use super::intent::{Envelope, Input, Intent};
use super::phase::{FinishReason, OpenTurn, Phase, PhaseKind};
use super::state::RoundState;
use crate::cards::{full_deck, Card, Field, Stock};
use crate::core::{Deadline, EngineError, PlayerId, Rejection, Tick};
use crate::declare::{
    can_contest, check_declaration, default_response, recheck, ChallengeResponse, ContestPool,
    Declaration, DeclarationKind, Recheck, ResponseWindow,
};
use crate::rules::{check_play, has_legal_play};
use crate::scoring::{classify, doubled, reveal_source, Outcome, RevealClass, ScoreEngine, ScoreResult};

/// Result of one reducer step.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: RoundState,
    pub events: Vec<RoundEvent>,
    /// Fatal fault raised while applying the input. `state` is already
    /// finished when this is set.
    pub fault: Option<EngineError>,
}

/// Apply `input` to `state`.
pub fn reduce(state: &RoundState, input: &Input) -> Result<Transition, Rejection> {
    let mut step = Step {
        state: state.clone(),
        events: Vec::new(),
        fault: None,
    };
    step.state.now = step.state.now.max(input.at());

    match input {
        Input::Start(_) => step.start()?,
        Input::Submit(envelope) => step.submit(envelope)?,
        Input::Tick(_) => step.expire_due(),
    }

    Ok(Transition {
        state: step.state,
        events: step.events,
        fault: step.fault,
    })
}

struct Step {
    state: RoundState,
    events: Vec<RoundEvent>,
    fault: Option<EngineError>,
}

impl Step {
    fn emit(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    fn set_phase(&mut self, phase: Phase) {
        let from = self.state.phase.kind();
        let to = phase.kind();
        self.state.phase = phase;
        if from != to {
            info!(?from, ?to, "phase changed");
            self.emit(RoundEvent::PhaseChanged { from, to });
        }
    }

    fn wrong_phase(&self) -> Rejection {
        Rejection::WrongPhase {
            actual: self.state.phase.kind(),
        }
    }

    // === Dealing ===

    fn start(&mut self) -> Result<(), Rejection> {
        match self.state.phase {
            Phase::Waiting => {}
            Phase::Finished(_) => return Err(Rejection::RoundOver),
            _ => return Err(Rejection::AlreadyStarted),
        }
        self.set_phase(Phase::Dealing);

        let config = Arc::clone(&self.state.config);
        let deck: Vec<Card> = match self.state.arranged.take() {
            Some(top_first) => top_first.into_iter().rev().collect(),
            None => {
                let mut deck = full_deck(config.wildcard_count);
                self.state.rng.shuffle(&mut deck);
                deck
            }
        };
        self.state.stock = Stock::from_bottom_up(deck);
        self.state.field = Field::new();

        for seat in PlayerId::all(self.state.player_count()) {
            let participant = &mut self.state.participants[seat];
            participant.reset_for_round();
            for _ in 0..config.hand_size {
                if let Some(card) = self.state.stock.draw() {
                    participant.hand.push(card);
                }
            }
            let cards = participant.hand.len();
            self.emit(RoundEvent::Dealt { player: seat, cards });
        }

        self.reveal_opening_card();

        let lead = self.state.lead;
        let opening = (config.opening_window > 0).then(|| Deadline::starting(self.state.now, config.opening_window));
        self.set_phase(Phase::Open(OpenTurn {
            turn: lead,
            drawn: false,
            opening,
        }));
        self.emit(RoundEvent::TurnChanged { player: lead });
        let eligible = self.state.stop_eligible();
        self.emit(RoundEvent::StopEligibility { eligible });
        Ok(())
    }

    /// Turn stock cards onto the field until one is not a rate-up card.
    fn reveal_opening_card(&mut self) {
        let config = Arc::clone(&self.state.config);
        while let Some(card) = self.state.stock.draw() {
            self.state.field.place(card);
            self.emit(RoundEvent::CardRevealed { card });
            if classify(card, &config.reveal) != RevealClass::RateUp {
                break;
            }
            self.double_multiplier();
        }
        self.state.first_card = self.state.field.top();
    }

    fn double_multiplier(&mut self) {
        let multiplier = doubled(self.state.multiplier, self.state.config.max_multiplier);
        if multiplier != self.state.multiplier {
            self.state.multiplier = multiplier;
            self.emit(RoundEvent::MultiplierChanged { multiplier });
        }
    }

    // === Intents ===

    fn submit(&mut self, envelope: &Envelope) -> Result<(), Rejection> {
        let Envelope {
            player,
            intent,
            submitted_at,
        } = envelope;
        let (player, at) = (*player, *submitted_at);
        if !self.state.participants.contains(player) {
            return Err(Rejection::UnknownParticipant(player));
        }
        debug!(%player, ?intent, %at, "applying intent");

        match self.state.phase.kind() {
            PhaseKind::Waiting => Err(Rejection::NotStarted),
            PhaseKind::Finished => Err(Rejection::RoundOver),
            PhaseKind::Open => self.open_intent(player, intent, at),
            PhaseKind::StopResolution => self.resolution_intent(player, intent, at),
            PhaseKind::Challenge => self.challenge_intent(player, intent, at),
            PhaseKind::Dealing | PhaseKind::Settlement => Err(self.wrong_phase()),
        }
    }

    fn open_turn(&self) -> Result<OpenTurn, Rejection> {
        match &self.state.phase {
            Phase::Open(turn) => Ok(*turn),
            _ => Err(self.wrong_phase()),
        }
    }

    fn open_intent(&mut self, player: PlayerId, intent: &Intent, at: Tick) -> Result<(), Rejection> {
        let turn = self.open_turn()?;
        match intent {
            Intent::Play(cards) => self.play(player, cards, turn),
            Intent::Draw => {
                if turn.turn != player {
                    return Err(Rejection::NotYourTurn(player));
                }
                if turn.drawn {
                    return Err(Rejection::AlreadyDrew);
                }
                self.draw_on_turn(player, turn);
                Ok(())
            }
            Intent::Pass => {
                if turn.turn != player {
                    return Err(Rejection::NotYourTurn(player));
                }
                if !turn.drawn {
                    return Err(Rejection::MustDrawBeforePass);
                }
                if self.busts(player) {
                    self.emit(RoundEvent::Passed { player, forced: true });
                    self.bust(player);
                } else {
                    self.emit(RoundEvent::Passed { player, forced: false });
                    self.pass_turn(player.next(self.state.player_count()), turn.opening);
                }
                Ok(())
            }
            Intent::Declare(DeclarationKind::CounterStop) => Err(Rejection::NoActiveDeclaration),
            Intent::Declare(kind) => self.declare(player, *kind, at),
            Intent::Respond(_) => Err(self.wrong_phase()),
        }
    }

    fn pass_turn(&mut self, next: PlayerId, opening: Option<Deadline>) {
        self.state.phase = Phase::Open(OpenTurn {
            turn: next,
            drawn: false,
            opening,
        });
        self.emit(RoundEvent::TurnChanged { player: next });
    }

    fn play(&mut self, player: PlayerId, cards: &[Card], turn: OpenTurn) -> Result<(), Rejection> {
        let racing = self.state.plays_made == 0 && turn.opening.is_some();
        if !racing && turn.turn != player {
            return Err(Rejection::NotYourTurn(player));
        }
        let top = self.state.field.top().ok_or_else(|| self.wrong_phase())?;
        let hand = &mut self.state.participants[player].hand;
        if !hand.contains_all(cards) {
            return Err(Rejection::CardsNotInHand);
        }
        let rule = check_play(cards, top)?;
        hand.remove_all(cards);

        for &card in cards {
            self.state.field.place(card);
        }
        self.state.setter = Some(player);
        self.state.plays_made += 1;
        debug!(%player, ?rule, cards = cards.len(), "played");
        self.emit(RoundEvent::Played {
            player,
            cards: SmallVec::from_slice(cards),
            rule,
        });
        if racing {
            self.emit(RoundEvent::OpeningClosed { expired: false });
        }

        self.pass_turn(player.next(self.state.player_count()), None);
        let eligible = self.state.stop_eligible();
        self.emit(RoundEvent::StopEligibility { eligible });
        Ok(())
    }

    fn draw_on_turn(&mut self, player: PlayerId, turn: OpenTurn) {
        if let Err(fault) = self.draw_for(player) {
            self.abort(fault);
            return;
        }
        self.state.phase = Phase::Open(OpenTurn { drawn: true, ..turn });
        if self.busts(player) {
            self.emit(RoundEvent::Passed { player, forced: true });
            self.bust(player);
        }
    }

    /// Draw one card for `player`, reshuffling the field in if needed.
    fn draw_for(&mut self, player: PlayerId) -> Result<(), EngineError> {
        if self.state.stock.is_empty() {
            self.reshuffle()?;
        }
        let card = self.state.stock.draw().ok_or_else(|| self.exhausted())?;
        self.state.participants[player].hand.push(card);
        self.emit(RoundEvent::Drew { player });
        Ok(())
    }

    fn reshuffle(&mut self) -> Result<(), EngineError> {
        if self.state.field.len() <= 1 || self.state.reshuffles >= self.state.config.stock_reshuffle_limit {
            return Err(self.exhausted());
        }
        let state = &mut self.state;
        let returned = state.field.take_all_but_top();
        let count = returned.len();
        state.stock.refill(returned, &mut state.rng);
        state.reshuffles += 1;
        let reshuffles = state.reshuffles;
        debug!(returned = count, reshuffles, "field reshuffled into stock");
        self.emit(RoundEvent::StockReshuffled {
            returned: count,
            reshuffles,
        });
        Ok(())
    }

    fn exhausted(&self) -> EngineError {
        EngineError::StockExhausted {
            field_cards: self.state.field.len(),
            reshuffles: self.state.reshuffles,
        }
    }

    fn busts(&self, player: PlayerId) -> bool {
        let hand = &self.state.participants[player].hand;
        hand.len() > self.state.config.bust_hand_size
            && self
                .state
                .field
                .top()
                .is_some_and(|top| !has_legal_play(hand.cards(), top))
    }

    fn bust(&mut self, player: PlayerId) {
        info!(%player, "bust");
        self.emit(RoundEvent::Busted { player });
        self.settle(Outcome::Bust { buster: player }, &[]);
    }

    // === Declarations ===

    fn declare(&mut self, player: PlayerId, kind: DeclarationKind, at: Tick) -> Result<(), Rejection> {
        let totals = self.state.participants[player].hand.totals();
        check_declaration(&self.state.stop_context(), kind, player, &totals)?;
        let declaration = Declaration {
            declarer: player,
            kind,
            at,
        };
        self.state.resolver.accept(declaration)?;
        self.state.participants[player].declared_stop = true;
        info!(%player, ?kind, %at, "stop declared");
        self.emit(RoundEvent::StopDeclared { declaration });
        self.open_window(player);
        Ok(())
    }

    /// Override the active declaration on behalf of `player`.
    fn counter(&mut self, player: PlayerId, kind: DeclarationKind, at: Tick) -> Result<(), Rejection> {
        let totals = self.state.participants[player].hand.totals();
        check_declaration(&self.state.stop_context(), kind, player, &totals)?;
        let declaration = Declaration {
            declarer: player,
            kind,
            at,
        };
        let demoted = self.state.resolver.accept(declaration)?;
        self.state.participants[player].declared_stop = true;
        if let Some(demoted) = demoted {
            info!(%player, %demoted, %at, "counter-stop");
            self.emit(RoundEvent::Countered { declaration, demoted });
        }
        Ok(())
    }

    /// Timestamp for a counter synthesized by a timeout; always later than
    /// the active declaration.
    fn timeout_stamp(&self) -> Tick {
        let active = self.state.resolver.active().map_or(self.state.now, |d| d.at);
        self.state.now.max(active.after(1))
    }

    fn open_window(&mut self, declarer: PlayerId) {
        let window = ResponseWindow::open(
            declarer,
            self.state.player_count(),
            self.state.setter,
            self.state.now,
            self.state.config.stop_window,
        );
        let nobody_offered = window.offered().is_empty();
        self.emit(RoundEvent::ResponseWindowOpened {
            declarer,
            offered: SmallVec::from_slice(window.offered()),
            deadline: window.deadline(),
        });
        self.set_phase(Phase::StopResolution(window));
        if nobody_offered {
            self.close_window();
        }
    }

    fn window(&self) -> Result<&ResponseWindow, Rejection> {
        match &self.state.phase {
            Phase::StopResolution(window) => Ok(window),
            _ => Err(self.wrong_phase()),
        }
    }

    fn resolution_intent(&mut self, player: PlayerId, intent: &Intent, at: Tick) -> Result<(), Rejection> {
        match intent {
            Intent::Declare(_) | Intent::Respond(ChallengeResponse::CounterStop) => {
                let window = self.window()?;
                if !window.is_offered(player) {
                    return Err(Rejection::NotOffered);
                }
                if window.response(player).is_some() {
                    return Err(Rejection::AlreadyResponded);
                }
                // A second stop pressed in the same window overrides like a counter.
                let kind = match intent {
                    Intent::Declare(kind) => *kind,
                    _ => DeclarationKind::CounterStop,
                };
                self.counter(player, kind, at)?;
                self.open_window(player);
                Ok(())
            }
            Intent::Respond(response) => self.respond(player, *response),
            Intent::Play(_) | Intent::Draw | Intent::Pass => Err(self.wrong_phase()),
        }
    }

    fn respond(&mut self, player: PlayerId, response: ChallengeResponse) -> Result<(), Rejection> {
        let window = self.window()?;
        if !window.is_offered(player) {
            return Err(Rejection::NotOffered);
        }
        if window.response(player).is_some() {
            return Err(Rejection::AlreadyResponded);
        }
        if response == ChallengeResponse::Participate {
            let totals = self.state.participants[player].hand.totals();
            if !can_contest(&totals, self.state.field_value()) {
                return Err(Rejection::CannotContest);
            }
        }
        self.record(player, response, false)?;
        if self.window()?.is_complete() {
            self.close_window();
        }
        Ok(())
    }

    fn record(&mut self, player: PlayerId, response: ChallengeResponse, defaulted: bool) -> Result<(), Rejection> {
        let actual = self.state.phase.kind();
        let Phase::StopResolution(window) = &mut self.state.phase else {
            return Err(Rejection::WrongPhase { actual });
        };
        window.record(player, response)?;
        debug!(%player, ?response, defaulted, "response recorded");
        self.emit(RoundEvent::ResponseRecorded {
            player,
            response,
            defaulted,
        });
        Ok(())
    }

    fn close_window(&mut self) {
        let Phase::StopResolution(window) = &self.state.phase else {
            return;
        };
        let contestants = window.participants();
        if contestants.is_empty() {
            self.settle_declared();
            return;
        }
        let pool = ContestPool::new(&contestants, self.state.config.challenge_iteration_cap);
        self.emit(RoundEvent::ChallengeStarted { contestants });
        self.set_phase(Phase::Challenge(pool));
        self.run_challenge();
    }

    // === Challenge ===

    fn challenge_intent(&mut self, player: PlayerId, intent: &Intent, at: Tick) -> Result<(), Rejection> {
        match intent {
            Intent::Play(_) | Intent::Draw | Intent::Respond(ChallengeResponse::Participate) => {
                return Err(self.wrong_phase());
            }
            Intent::Declare(DeclarationKind::PrimaryStop | DeclarationKind::FirstStop) => {
                return Err(Rejection::StopAlreadyDeclared);
            }
            _ => {}
        }
        let pending = match &self.state.phase {
            Phase::Challenge(pool) => pool.pending(),
            _ => None,
        };
        if pending.map(|d| d.player) != Some(player) {
            return Err(Rejection::NoPendingDecision(player));
        }

        match intent {
            Intent::Declare(DeclarationKind::CounterStop) | Intent::Respond(ChallengeResponse::CounterStop) => {
                self.counter(player, DeclarationKind::CounterStop, at)?;
                self.restart_resolution(player);
            }
            _ => {
                self.emit(RoundEvent::ContestantWithdrew { player });
                self.remove_contestant(player);
                self.run_challenge();
            }
        }
        Ok(())
    }

    /// A counter during the challenge abandons the pool and reopens
    /// resolution from the new winner.
    fn restart_resolution(&mut self, winner: PlayerId) {
        self.emit(RoundEvent::ChallengeEnded {
            reason: ChallengeEnd::Countered,
        });
        self.open_window(winner);
    }

    fn remove_contestant(&mut self, player: PlayerId) {
        if let Phase::Challenge(pool) = &mut self.state.phase {
            pool.remove(player);
        }
    }

    /// Draw for contestants in turn until a decision is pending or the pool
    /// is done.
    fn run_challenge(&mut self) {
        loop {
            let Phase::Challenge(pool) = &self.state.phase else {
                return;
            };
            if pool.pending().is_some() {
                return;
            }
            let player = match (pool.current(), pool.is_exhausted()) {
                (None, _) => {
                    self.end_challenge(ChallengeEnd::PoolEmpty);
                    return;
                }
                (Some(_), true) => {
                    self.end_challenge(ChallengeEnd::CapReached);
                    return;
                }
                (Some(player), false) => player,
            };

            if let Err(fault) = self.draw_for(player) {
                debug!(%fault, "stock exhausted during challenge");
                self.end_challenge(ChallengeEnd::StockExhausted);
                return;
            }

            let totals = self.state.participants[player].hand.totals();
            let check = recheck(&totals, self.state.field_value());
            let may_counter = check == Recheck::MayDeclare && self.state.can_counter(player);
            let deadline = Deadline::starting(self.state.now, self.state.config.challenge_window);

            let Phase::Challenge(pool) = &mut self.state.phase else {
                return;
            };
            pool.record_draw();
            match check {
                Recheck::MayDeclare if may_counter => {
                    pool.set_pending(player, deadline);
                    self.emit(RoundEvent::DecisionPending { player, deadline });
                    return;
                }
                Recheck::Contending => pool.advance(),
                Recheck::MayDeclare | Recheck::Eliminated => {
                    pool.remove(player);
                    self.emit(RoundEvent::ContestantEliminated { player });
                }
            }
        }
    }

    fn end_challenge(&mut self, reason: ChallengeEnd) {
        info!(?reason, "challenge ended");
        self.emit(RoundEvent::ChallengeEnded { reason });
        self.settle_declared();
    }

    // === Timeouts ===

    fn expire_due(&mut self) {
        // Each pass consumes a deadline, a counter or a challenge draw.
        while let Some(deadline) = self.state.phase.deadline() {
            if !deadline.is_reached(self.state.now) {
                break;
            }
            match self.state.phase.kind() {
                PhaseKind::Open => self.close_opening(),
                PhaseKind::StopResolution => self.expire_window(),
                PhaseKind::Challenge => self.expire_decision(),
                _ => break,
            }
        }
    }

    fn close_opening(&mut self) {
        if let Phase::Open(turn) = &mut self.state.phase {
            turn.opening = None;
        }
        debug!("opening countdown expired");
        self.emit(RoundEvent::OpeningClosed { expired: true });
    }

    fn expire_window(&mut self) {
        let Ok(window) = self.window() else {
            return;
        };
        let unanswered: SmallVec<[PlayerId; 8]> = window.unanswered().collect();
        let field_value = self.state.field_value();

        let mut defaults: SmallVec<[(PlayerId, ChallengeResponse); 8]> = SmallVec::new();
        for player in unanswered {
            let contest = can_contest(&self.state.participants[player].hand.totals(), field_value);
            let response = default_response(self.state.can_counter(player), contest);
            if response == ChallengeResponse::CounterStop {
                let at = self.timeout_stamp();
                match self.counter(player, DeclarationKind::CounterStop, at) {
                    Ok(()) => {
                        self.open_window(player);
                        return;
                    }
                    Err(rejection) => debug!(%player, %rejection, "default counter refused"),
                }
            }
            defaults.push((player, default_response(false, contest)));
        }

        for (player, response) in defaults {
            if let Err(rejection) = self.record(player, response, true) {
                warn!(%player, %rejection, "default response not recorded");
            }
        }
        self.close_window();
    }

    fn expire_decision(&mut self) {
        let pending = match &self.state.phase {
            Phase::Challenge(pool) => pool.pending(),
            _ => None,
        };
        let Some(pending) = pending else {
            return;
        };
        let player = pending.player;
        let at = self.timeout_stamp();
        match self.counter(player, DeclarationKind::CounterStop, at) {
            Ok(()) => self.restart_resolution(player),
            Err(rejection) => {
                debug!(%player, %rejection, "default counter refused");
                self.emit(RoundEvent::ContestantWithdrew { player });
                self.remove_contestant(player);
                self.run_challenge();
            }
        }
    }

    // === Settlement ===

    fn settle_declared(&mut self) {
        let resolver = &self.state.resolver;
        let Some(active) = resolver.active().copied() else {
            debug_assert!(false, "settling a stop without a declaration");
            warn!("settlement requested without an active declaration");
            return;
        };
        let winner = active.declarer;
        let uncontested_first = resolver.counters() == 0 && active.kind == DeclarationKind::FirstStop;
        let outcome = match resolver.provisional_loser().or(self.state.setter) {
            Some(loser) if !uncontested_first => Outcome::NormalStop { winner, loser },
            _ => Outcome::FirstStopWin { winner },
        };
        let demoted: SmallVec<[PlayerId; 8]> = resolver
            .superseded()
            .iter()
            .map(|d| d.declarer)
            .filter(|p| *p != winner)
            .collect();
        self.settle(outcome, &demoted);
    }

    fn settle(&mut self, outcome: Outcome, demoted: &[PlayerId]) {
        self.set_phase(Phase::Settlement);
        let source = reveal_source(&self.state.stock, &self.state.field);
        let result = ScoreEngine::new(&self.state.config).settle(
            outcome,
            self.state.player_count(),
            self.state.multiplier,
            source,
            demoted,
        );

        for &card in &result.reveals {
            self.emit(RoundEvent::SettlementReveal { card });
        }
        if result.multiplier != self.state.multiplier {
            self.state.multiplier = result.multiplier;
            self.emit(RoundEvent::MultiplierChanged {
                multiplier: result.multiplier,
            });
        }
        self.emit(RoundEvent::RoundSettled {
            result: Box::new(result.clone()),
        });
        self.state.result = Some(result);
        self.set_phase(Phase::Finished(FinishReason::Settled));
    }

    fn abort(&mut self, fault: EngineError) {
        warn!(%fault, "round aborted");
        let state = &mut self.state;
        state.result = Some(ScoreResult::aborted(
            state.player_count(),
            state.config.base_rate,
            state.multiplier,
        ));
        let reshuffles = state.reshuffles;
        self.emit(RoundEvent::RoundAborted { reshuffles });
        self.set_phase(Phase::Finished(FinishReason::Aborted));
        self.fault = Some(fault);
    }
}
