//! The challenge sub-phase: participants draw in turn until their hand
//! matches the field (declare or withdraw), they are eliminated, or the
//! pool, the draw cap or the stock runs out.
//!
//! Seat 0 plays ♠4 on ♠6, seat 1 (♣3 JK) declares, and seat 2 (♥A ♦A,
//! total 2) participates.

mod common;

use common::*;
use dotenko_engine::core::{EngineError, Rejection, RuleConfig, Tick};
use dotenko_engine::declare::{ChallengeResponse, DeclarationKind};
use dotenko_engine::round::{ChallengeEnd, Intent, PhaseKind, RoundController, RoundEvent};
use dotenko_engine::scoring::Outcome;
use dotenko_engine::Card;
use smallvec::smallvec;

/// Deal the table with `stock` (top first) and run up to seat 2's
/// participation at t=20.
fn challenge(config: RuleConfig, stock: &[Card]) -> (RoundController, Vec<RoundEvent>) {
    let mut deck = vec![
        spade(4),
        heart(13),
        club(3),
        Card::joker(0),
        heart(1),
        diamond(1),
        spade(6),
    ];
    deck.extend_from_slice(stock);
    let mut round = arranged(3, config, deck);
    submit(&mut round, 0, Intent::Play(smallvec![spade(4)]), 1).unwrap();
    submit(&mut round, 1, Intent::Declare(DeclarationKind::PrimaryStop), 10).unwrap();
    let events = submit(&mut round, 2, Intent::Respond(ChallengeResponse::Participate), 20).unwrap();
    (round, events)
}

fn stop_by(winner: u8, loser: u8) -> Option<Outcome> {
    Some(Outcome::NormalStop {
        winner: seat(winner),
        loser: seat(loser),
    })
}

/// Drawing ♣2 brings seat 2 to 4: it must decide, and countering takes the
/// win from the declarer and reopens resolution from seat 2.
#[test]
fn test_matching_draw_then_counter() {
    let (mut round, events) = challenge(quick_config(2), &[club(2), diamond(5), spade(9)]);

    assert!(events.contains(&RoundEvent::ChallengeStarted {
        contestants: smallvec![seat(2)]
    }));
    assert!(events.contains(&RoundEvent::Drew { player: seat(2) }));
    assert!(events.iter().any(|e| matches!(
        e,
        RoundEvent::DecisionPending { player, .. } if *player == seat(2)
    )));
    assert_eq!(round.state().phase.kind(), PhaseKind::Challenge);
    assert_eq!(round.time_remaining(Tick(50)), Some(70));

    let actions = round.eligible_actions(seat(2));
    assert!(actions.can_counter && actions.can_pass);
    assert!(!round.eligible_actions(seat(1)).any());

    let events = submit(&mut round, 2, Intent::Declare(DeclarationKind::CounterStop), 30).unwrap();
    assert!(events.contains(&RoundEvent::ChallengeEnded {
        reason: ChallengeEnd::Countered
    }));
    assert_eq!(round.state().phase.kind(), PhaseKind::StopResolution);
    assert_eq!(round.state().resolver.winner(), Some(seat(2)));
    assert!(round.eligible_actions(seat(1)).can_decline);

    submit(&mut round, 1, Intent::Respond(ChallengeResponse::Decline), 40).unwrap();
    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(2, 1));
    // Stock bottom ♠9.
    assert_eq!(result.total, 900);
    assert_eq!(result.deltas[seat(2)], 900);
    assert_eq!(result.deltas[seat(1)], -900);
}

/// Withdrawing leaves the original declaration standing against the setter.
#[test]
fn test_matching_draw_then_withdraw() {
    let (mut round, _) = challenge(quick_config(2), &[club(2), diamond(5), spade(9)]);

    let events = submit(&mut round, 2, Intent::Pass, 30).unwrap();
    assert!(events.contains(&RoundEvent::ContestantWithdrew { player: seat(2) }));
    assert!(events.contains(&RoundEvent::ChallengeEnded {
        reason: ChallengeEnd::PoolEmpty
    }));

    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(1, 0));
    assert_eq!(result.deltas[seat(1)], 900);
    assert_eq!(result.deltas[seat(0)], -900);
}

/// An unanswered decision defaults to a counter-stop.
#[test]
fn test_decision_timeout_counters() {
    let (mut round, _) = challenge(quick_config(2), &[club(2), diamond(5), spade(9)]);

    round.tick(Tick(120)).unwrap();
    assert_eq!(round.state().phase.kind(), PhaseKind::StopResolution);
    assert_eq!(round.state().resolver.active().map(|d| d.at), Some(Tick(120)));

    submit(&mut round, 1, Intent::Respond(ChallengeResponse::Decline), 130).unwrap();
    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(2, 1));
}

/// Only the seat with a pending decision may act during the challenge.
#[test]
fn test_challenge_rejections() {
    let (mut round, _) = challenge(quick_config(2), &[club(2), diamond(5), spade(9)]);

    let rejected = |r: Result<Vec<RoundEvent>, EngineError>| match r {
        Err(EngineError::Rejected(rejection)) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    };
    assert_eq!(
        rejected(submit(&mut round, 1, Intent::Pass, 25)),
        Rejection::NoPendingDecision(seat(1))
    );
    assert_eq!(
        rejected(submit(&mut round, 2, Intent::Draw, 25)),
        Rejection::WrongPhase {
            actual: PhaseKind::Challenge
        }
    );
    assert_eq!(
        rejected(submit(&mut round, 0, Intent::Declare(DeclarationKind::PrimaryStop), 25)),
        Rejection::StopAlreadyDeclared
    );
    assert_eq!(round.state().phase.kind(), PhaseKind::Challenge);
}

/// A contestant still below the field keeps drawing; overshooting
/// eliminates it.
#[test]
fn test_draws_until_eliminated() {
    let (round, events) = challenge(quick_config(2), &[club(1), diamond(5), spade(9)]);

    let draws = events
        .iter()
        .filter(|e| matches!(e, RoundEvent::Drew { player } if *player == seat(2)))
        .count();
    assert_eq!(draws, 2);
    assert!(events.contains(&RoundEvent::ContestantEliminated { player: seat(2) }));

    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(1, 0));
    assert_eq!(result.reveals.as_slice(), &[spade(9)]);
}

/// The draw cap ends the challenge even with contestants left.
#[test]
fn test_draw_cap() {
    let (round, events) = challenge(quick_config(2).with_challenge_cap(1), &[club(1), diamond(5), spade(9)]);

    assert!(events.contains(&RoundEvent::ChallengeEnded {
        reason: ChallengeEnd::CapReached
    }));
    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(1, 0));
    // ♦5 is still in the stock above ♠9.
    assert_eq!(round.state().stock.len(), 2);
}

/// Running out of stock mid-challenge ends it and settles normally, with
/// the reveal taken from the field.
#[test]
fn test_stock_exhausted_during_challenge() {
    let (round, events) = challenge(quick_config(2).with_reshuffle_limit(0), &[club(1)]);

    assert!(events.contains(&RoundEvent::ChallengeEnded {
        reason: ChallengeEnd::StockExhausted
    }));
    let result = round.result().expect("settled");
    assert!(!result.aborted);
    assert_eq!(result.outcome, stop_by(1, 0));
    // Oldest field card ♠6.
    assert_eq!(result.final_value, 6);
    assert_eq!(result.total, 600);
}

/// A counter in the challenge drops the rest of the pool: nobody else
/// draws, and every seat but the setter is offered a response again,
/// the demoted declarer included.
#[test]
fn test_counter_restarts_resolution() {
    let deck = vec![
        spade(4),
        heart(13),
        club(3),
        Card::joker(0),
        heart(1),
        diamond(1),
        club(1),
        spade(1),
        spade(6),
        club(2),
        diamond(5),
        spade(9),
    ];
    let mut round = arranged(4, quick_config(2), deck);
    submit(&mut round, 0, Intent::Play(smallvec![spade(4)]), 1).unwrap();
    submit(&mut round, 1, Intent::Declare(DeclarationKind::PrimaryStop), 10).unwrap();
    submit(&mut round, 2, Intent::Respond(ChallengeResponse::Participate), 20).unwrap();
    let events = submit(&mut round, 3, Intent::Respond(ChallengeResponse::Participate), 21).unwrap();
    assert!(events.contains(&RoundEvent::ChallengeStarted {
        contestants: smallvec![seat(2), seat(3)]
    }));
    assert_eq!(round.state().phase.kind(), PhaseKind::Challenge);

    let events = submit(&mut round, 2, Intent::Declare(DeclarationKind::CounterStop), 30).unwrap();
    assert!(!events.contains(&RoundEvent::Drew { player: seat(3) }));
    let offered = events.iter().find_map(|e| match e {
        RoundEvent::ResponseWindowOpened { declarer, offered, .. } if *declarer == seat(2) => {
            Some(offered.to_vec())
        }
        _ => None,
    });
    assert_eq!(offered, Some(vec![seat(3), seat(1)]));
    assert_eq!(round.state().phase.kind(), PhaseKind::StopResolution);

    let demoted = round.eligible_actions(seat(1));
    assert!(demoted.can_counter && demoted.can_participate && demoted.can_decline);
    assert_eq!(round.state().participants[seat(3)].hand.len(), 2);

    submit(&mut round, 3, Intent::Respond(ChallengeResponse::Decline), 40).unwrap();
    submit(&mut round, 1, Intent::Respond(ChallengeResponse::Decline), 41).unwrap();
    let result = round.result().expect("settled");
    assert_eq!(result.outcome, stop_by(2, 1));
    assert_eq!(result.total, 900);
    assert_eq!(result.delta_sum(), 0);
}
