//! Who may declare what.
//!
//! Pure checks over a [`StopContext`] snapshot and the declarer's hand totals.

use serde::{Deserialize, Serialize};

use super::resolver::DeclarationKind;
use crate::core::{PlayerId, Rejection};
use crate::rules::HandTotals;

/// The parts of round state a declaration is judged against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopContext {
    /// Value of the current field-top.
    pub field_value: i32,
    /// Value of the first card revealed this round.
    pub first_field_value: i32,
    /// Who played the current field-top (`None` for the dealt card).
    pub setter: Option<PlayerId>,
    /// Plays made so far this round.
    pub plays_made: u32,
}

/// Check `player` may make a `kind` declaration holding `totals`.
pub fn check_declaration(
    ctx: &StopContext,
    kind: DeclarationKind,
    player: PlayerId,
    totals: &HandTotals,
) -> Result<(), Rejection> {
    match kind {
        DeclarationKind::PrimaryStop => {
            if ctx.plays_made == 0 {
                return Err(Rejection::NothingToStopOn);
            }
            if ctx.setter == Some(player) {
                return Err(Rejection::OwnPlay);
            }
            if !totals.contains(ctx.field_value) {
                return Err(Rejection::NotEligible(kind));
            }
        }
        DeclarationKind::FirstStop => {
            if ctx.plays_made > 0 {
                return Err(Rejection::FirstStopClosed);
            }
            if !totals.contains(ctx.first_field_value) {
                return Err(Rejection::NotEligible(kind));
            }
        }
        DeclarationKind::CounterStop => {
            if ctx.setter == Some(player) {
                return Err(Rejection::OwnPlay);
            }
            if !totals.contains(ctx.field_value) {
                return Err(Rejection::NotEligible(kind));
            }
        }
    }
    Ok(())
}

/// Whether drawing could still bring the hand to the field value: the
/// minimum achievable total is strictly below it.
#[must_use]
pub fn can_contest(totals: &HandTotals, field_value: i32) -> bool {
    totals.min() < field_value
}
