//! Roll modifiers and the action economy.

use crate::cards::Trigger;
use crate::core::{ModifierUsage, StandingModifier};
use crate::effects::handler::{EffectHandler, HandlerCall};

/// Grant the target (default: the actor) a standing roll modifier.
///
/// A `passive` step grants an `Always` modifier that is added to every
/// roll its holder makes. Otherwise the modifier is `OnDemand` and waits
/// to be spent in a negotiation. `duration` sets the expiry:
///
/// | duration | last active turn |
/// |---|---|
/// | `turn`, `this_turn` | the current turn |
/// | `next_turn` | the turn after |
/// | anything else | never expires |
pub struct ModifyRoll;

impl ModifyRoll {
    fn expiry(duration: Option<&str>, turn: u32) -> Option<u32> {
        match duration.map(|d| d.trim().to_lowercase()).as_deref() {
            Some("turn" | "this_turn" | "end_of_turn") => Some(turn),
            Some("next_turn") => Some(turn.saturating_add(1)),
            _ => None,
        }
    }
}

impl EffectHandler for ModifyRoll {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let Some(delta) = call.step.amount else {
            call.warn(format!("modify_roll: missing amount ({})", call.step.name));
            return;
        };
        let usage = if call.step.has_trigger(&Trigger::Passive) {
            ModifierUsage::Always
        } else {
            ModifierUsage::OnDemand
        };
        let holder = call.target_or_actor();
        let mut modifier = StandingModifier::new(call.step.owner, delta, usage);
        if let Some(last) = Self::expiry(call.step.duration.as_deref(), call.state.turn) {
            modifier = modifier.until_turn(last);
        }
        let expiry = modifier
            .expires_turn
            .map_or_else(|| "no expiry".to_string(), |t| format!("until turn {t}"));
        call.state.player_mut(holder).roll_modifiers.push_back(modifier);
        call.note(format_args!(
            "roll modifier {delta:+} for {holder} ({usage:?}, {expiry})"
        ));
    }
}

fn adjust(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Add (or remove) action points for the current turn.
pub struct ModifyActionPoints;

impl EffectHandler for ModifyActionPoints {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let Some(delta) = call.step.amount else {
            call.warn(format!("modify_action_points: missing amount ({})", call.step.name));
            return;
        };
        let board = call.state.player_mut(call.actor);
        board.action_points = adjust(board.action_points, delta);
        let now = board.action_points;
        call.note(format_args!("action points {delta:+} -> {now}"));
    }
}

/// Change how many action points the actor gets each turn.
pub struct ModifyActionsPerTurn;

impl EffectHandler for ModifyActionsPerTurn {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let Some(delta) = call.step.amount else {
            call.warn(format!("modify_actions_per_turn: missing amount ({})", call.step.name));
            return;
        };
        let board = call.state.player_mut(call.actor);
        board.actions_per_turn = adjust(board.actions_per_turn, delta);
        let now = board.actions_per_turn;
        call.note(format_args!("actions per turn {delta:+} -> {now}"));
    }
}
