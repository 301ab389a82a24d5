//! Dispatcher behaviour: observers, queued inputs, shared access and
//! automated seats driving a round to completion.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use common::*;
use dotenko_engine::agents::{BasicDecider, IntentScheduler};
use dotenko_engine::core::{GameRng, RuleConfig, SchedulerConfig, Tick};
use dotenko_engine::rules::Play;
use dotenko_engine::round::{Envelope, Input, Intent, PhaseKind, RoundController, RoundEvent, RoundState, SharedRound};
use smallvec::smallvec;

fn three_seats() -> RoundController {
    let deck = vec![
        spade(13),
        heart(12),
        club(11),
        diamond(12),
        heart(7),
        club(3),
        heart(9),
        diamond(5),
        spade(8),
        club(6),
    ];
    arranged(3, quick_config(2), deck)
}

/// Observers see every event after the state is committed.
#[test]
fn test_observers_receive_events() {
    let seen: Arc<Mutex<Vec<RoundEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let mut round = three_seats();
    let sink = Arc::clone(&seen);
    round.subscribe(move |event| sink.lock().push(event.clone()));

    let events = submit(&mut round, 0, Intent::Draw, 1).unwrap();
    assert_eq!(*seen.lock(), events);

    // Refused intents produce no events.
    let _ = submit(&mut round, 2, Intent::Draw, 2);
    assert_eq!(seen.lock().len(), events.len());
}

/// Queued inputs apply in order; refused ones are dropped.
#[test]
fn test_pump_applies_queue_in_order() {
    let mut round = three_seats();
    round.enqueue(Input::Submit(Envelope::new(seat(0), Intent::Draw, Tick(1))));
    round.enqueue(Input::Submit(Envelope::new(seat(0), Intent::Draw, Tick(2))));
    round.enqueue(Input::Submit(Envelope::new(seat(0), Intent::Pass, Tick(3))));
    round.enqueue(Input::Tick(Tick(4)));
    assert_eq!(round.queued(), 4);

    // The second draw is refused.
    assert_eq!(round.pump(), Ok(3));
    assert_eq!(round.queued(), 0);
    assert_eq!(round.state().turn(), Some(seat(1)));
    assert_eq!(round.state().now, Tick(4));
}

/// A fatal fault stops the pump and discards the rest of the queue.
#[test]
fn test_pump_stops_on_fault() {
    let mut round = arranged(2, quick_config(1), vec![spade(13), club(12), heart(9)]);
    round.enqueue(Input::Submit(Envelope::new(seat(0), Intent::Draw, Tick(1))));
    round.enqueue(Input::Tick(Tick(2)));

    assert!(round.pump().is_err());
    assert_eq!(round.queued(), 0);
    assert!(round.is_finished());
}

/// Host time never runs backwards in the state.
#[test]
fn test_time_is_monotonic() {
    let mut round = three_seats();
    round.tick(Tick(500)).unwrap();
    submit(&mut round, 0, Intent::Draw, 100).unwrap();
    assert_eq!(round.state().now, Tick(500));
}

/// Several threads submit through one shared handle; exactly one of the
/// racing plays is accepted.
#[test]
fn test_shared_round_serializes_submissions() {
    let shared = SharedRound::new(three_seats());

    let accepted = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let shared = shared.clone();
                scope.spawn(move || {
                    shared
                        .submit(Envelope::new(seat(0), Intent::Play(smallvec![heart(12)]), Tick(1 + i)))
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("submitter thread"))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(accepted, 1);
    let view = shared.snapshot_for(seat(0)).unwrap();
    assert_eq!(view.hand.len(), 1);
    assert_eq!(shared.with(|round| round.state().plays_made), 1);
}

/// A seat's snapshot hides other hands but lists legal plays.
#[test]
fn test_snapshot_for_seat() {
    let round = three_seats();
    let view = round.snapshot_for(seat(0)).unwrap();
    assert_eq!(view.phase, PhaseKind::Open);
    assert_eq!(view.turn, Some(seat(0)));
    assert_eq!(view.hand.len(), 2);
    assert_eq!(view.hand_sizes[seat(2)], 2);
    assert_eq!(view.field_top, Some(heart(9)));
    assert_eq!(view.stock_len, 3);
    assert!(view.actions.can_play);
    assert_eq!(view.legal_plays, vec![Play::from_slice(&[heart(12)])]);
}

/// A fully automated table always reaches a settled or aborted end.
#[test]
fn test_automated_round_finishes() {
    init_logging();
    for seed in 0..8 {
        let config = RuleConfig::default().with_windows(0, 100, 100);
        let state = RoundState::for_table(config, 4, seed).unwrap();
        let mut round = RoundController::new(state);
        round.start(Tick(0)).unwrap();

        let pacing = SchedulerConfig {
            min_delay: 1,
            max_delay: 2,
            unit: 10,
        };
        let mut scheduler = IntentScheduler::new(pacing, GameRng::new(seed).fork()).unwrap();
        for p in 0..4 {
            scheduler.register(seat(p), BasicDecider);
        }

        let faulted = drive(&mut round, &mut scheduler, 10, 20_000);
        assert!(round.is_finished());
        let result = round.result().expect("finished rounds carry a result");
        assert_eq!(result.aborted, faulted);
        assert_eq!(result.delta_sum(), 0);
    }
}
