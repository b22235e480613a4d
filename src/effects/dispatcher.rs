//! Step dispatch: condition, implicit target, gating roll, handler.
//!
//! The dispatcher is re-entrant. A handler that plays another card calls
//! back into the rules actions, which dispatch that card's steps with the
//! same state, RNG and log.

use super::handler::HandlerCall;
use crate::cards::{EffectStep, Trigger};
use crate::conditions::{keys, ConditionEvaluator, EvalContext};
use crate::core::{GameRng, GameState, PlayerId};
use crate::rolls::{Goal, RollRequest, RollResolver};
use crate::rules::RulesEngine;
use crate::zones::PlayerShorthand;

/// Applies effect steps.
pub struct EffectDispatcher;

impl EffectDispatcher {
    /// Apply one step for `actor`.
    ///
    /// 1. A false `condition` skips the step.
    /// 2. A `self` / `opponent` destination sets `target_pid` if unset.
    /// 3. A gating roll must meet `roll_condition`.
    /// 4. The handler for `effect_kind` runs, or one
    ///    `UNIMPLEMENTED_EFFECT_KIND` warning is recorded.
    pub fn dispatch(
        engine: &RulesEngine,
        step: &EffectStep,
        state: &mut GameState,
        actor: PlayerId,
        ctx: &mut EvalContext,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) {
        if !ConditionEvaluator::evaluate(step.condition.as_deref(), ctx) {
            tracing::trace!(owner = step.owner.raw(), kind = %step.effect_kind, "condition false, step skipped");
            return;
        }

        if !ctx.contains_key(keys::TARGET_PLAYER) {
            let target = match step.dest_zone.as_deref().and_then(PlayerShorthand::parse) {
                Some(PlayerShorthand::Actor) => Some(actor),
                Some(PlayerShorthand::Opponent) => state.first_opponent_with_party(actor),
                None => None,
            };
            if let Some(target) = target {
                ctx.set_target_player(target);
            }
        }

        if step.requires_roll && !Self::gate_roll(engine, step, state, actor, ctx, rng, log) {
            return;
        }

        let Some(handler) = engine.handlers().get(&step.effect_kind) else {
            ctx.warn(format!(
                "UNIMPLEMENTED_EFFECT_KIND: {} ({})",
                step.effect_kind, step.name
            ));
            return;
        };

        tracing::debug!(
            owner = step.owner.raw(),
            step = step.ordinal,
            kind = %step.effect_kind,
            actor = %actor,
            "dispatching step"
        );
        let mut call = HandlerCall {
            engine,
            step,
            state,
            actor,
            ctx,
            rng,
            log,
        };
        handler.apply(&mut call);
    }

    /// Dispatch, in order, the steps that fire in any of `phases`.
    /// Returns how many steps were dispatched.
    #[allow(clippy::too_many_arguments)]
    pub fn run_steps(
        engine: &RulesEngine,
        steps: &[EffectStep],
        phases: &[Trigger],
        state: &mut GameState,
        actor: PlayerId,
        ctx: &mut EvalContext,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> usize {
        let mut dispatched = 0;
        for step in steps.iter().filter(|step| step.fires_on(phases)) {
            Self::dispatch(engine, step, state, actor, ctx, rng, log);
            dispatched += 1;
        }
        dispatched
    }

    /// Move a context's warnings into the log as `[P<n>] WARN ...` lines.
    pub fn flush_warnings(ctx: &mut EvalContext, player: PlayerId, log: &mut Vec<String>) {
        for warning in ctx.take_warnings() {
            log.push(format!("[{player}] WARN {warning}"));
        }
    }

    /// Run the step's gating roll. Returns whether the step may proceed.
    fn gate_roll(
        engine: &RulesEngine,
        step: &EffectStep,
        state: &mut GameState,
        actor: PlayerId,
        ctx: &mut EvalContext,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> bool {
        let text = step.roll_condition.as_deref().unwrap_or("");
        let goal = match Goal::parse(text) {
            Ok(goal) => goal,
            Err(_) => {
                ctx.warn(format!("UNPARSEABLE_ROLL_CONDITION: {} ({})", text.trim(), step.name));
                return false;
            }
        };

        let mut request = RollRequest::threshold(actor, format!("hero:{}", step.name), goal);
        if state.player(actor).party.contains(&step.owner) {
            request = request.with_hero(step.owner);
        }
        if ctx.flag(keys::ROLL_IN_PROGRESS) {
            request = request.without_roll_triggers();
        }

        let outcome = RollResolver::resolve(engine, state, &request, rng, log);
        let passed = outcome.meets(&goal);
        ctx.set(keys::ROLL_TOTAL, outcome.total);
        ctx.set_flag(keys::ROLL_SUCCESS, passed);
        log.push(format!(
            "[{actor}] roll 2d6={} vs {goal} -> {} ({})",
            outcome.total,
            if passed { "PASS" } else { "FAIL" },
            step.name
        ));
        passed
    }
}
