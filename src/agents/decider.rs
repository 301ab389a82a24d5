//! Decision makers for automated seats.

use crate::declare::{ChallengeResponse, DeclarationKind};
use crate::round::{Intent, ParticipantView, PhaseKind};

/// Produces an intent for an automated seat from its view of the round.
///
/// Implementations only see what the seat may see. Returning `None` means
/// "nothing to do right now".
pub trait DecisionMaker {
    fn decide(&mut self, view: &ParticipantView) -> Option<Intent>;
}

impl<F> DecisionMaker for F
where
    F: FnMut(&ParticipantView) -> Option<Intent>,
{
    fn decide(&mut self, view: &ParticipantView) -> Option<Intent> {
        self(view)
    }
}

/// Baseline policy: declare whenever possible, otherwise shed as many cards
/// as one legal play allows, otherwise draw, otherwise pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicDecider;

impl DecisionMaker for BasicDecider {
    fn decide(&mut self, view: &ParticipantView) -> Option<Intent> {
        let actions = &view.actions;
        if actions.can_declare_first_stop {
            return Some(Intent::Declare(DeclarationKind::FirstStop));
        }
        if actions.can_declare_stop {
            return Some(Intent::Declare(DeclarationKind::PrimaryStop));
        }
        if actions.can_counter {
            return Some(Intent::Declare(DeclarationKind::CounterStop));
        }

        match view.phase {
            PhaseKind::StopResolution if actions.can_participate => {
                Some(Intent::Respond(ChallengeResponse::Participate))
            }
            PhaseKind::StopResolution if actions.can_decline => Some(Intent::Respond(ChallengeResponse::Decline)),
            PhaseKind::Challenge if actions.can_pass => Some(Intent::Pass),
            PhaseKind::Open => {
                if actions.can_play {
                    if let Some(play) = view.legal_plays.iter().max_by_key(|p| p.len()) {
                        return Some(Intent::Play(play.clone()));
                    }
                }
                if actions.can_draw {
                    Some(Intent::Draw)
                } else if actions.can_pass {
                    Some(Intent::Pass)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Suit};
    use crate::core::{PlayerId, RuleConfig, Tick};
    use crate::round::{reduce, Input, RoundState};

    fn started(deck: Vec<Card>) -> RoundState {
        let config = RuleConfig::default().with_hand_size(2).with_windows(0, 10, 10);
        let state = RoundState::for_table(config, 2, 3).unwrap().with_deck(deck);
        reduce(&state, &Input::Start(Tick(0))).unwrap().state
    }

    #[test]
    fn test_basic_decider_prefers_first_stop() {
        let s = |r| Card::of(Suit::Spades, r);
        let h = |r| Card::of(Suit::Hearts, r);
        // Seat 0 holds 4+5 = 9 against a revealed 9.
        let state = started(vec![s(4), s(5), h(12), h(13), Card::of(Suit::Clubs, 9), s(7), s(8)]);
        let view = state.snapshot_for(PlayerId::new(0)).unwrap();
        assert_eq!(
            BasicDecider.decide(&view),
            Some(Intent::Declare(DeclarationKind::FirstStop))
        );
    }

    #[test]
    fn test_basic_decider_draws_without_a_play() {
        let s = |r| Card::of(Suit::Spades, r);
        let state = started(vec![s(4), s(6), s(12), s(13), Card::of(Suit::Hearts, 9), s(7), s(8)]);
        let view = state.snapshot_for(PlayerId::new(0)).unwrap();
        assert_eq!(BasicDecider.decide(&view), Some(Intent::Draw));
    }

    #[test]
    fn test_closure_decider() {
        let s = |r| Card::of(Suit::Spades, r);
        let state = started(vec![s(4), s(6), s(12), s(13), Card::of(Suit::Hearts, 9), s(7), s(8)]);
        let view = state.snapshot_for(PlayerId::new(1)).unwrap();
        let mut decider = |_: &ParticipantView| Some(Intent::Draw);
        assert_eq!(decider.decide(&view), Some(Intent::Draw));
    }
}
