//! Step dispatch tests.
//!
//! Covers the guard order of the dispatcher: condition, implicit target,
//! gating roll and handler lookup, and the promise that a skipped step
//! leaves the game untouched.

use hts_rules::cards::{CardId, CardMeta, CardType, Catalogue, EffectStep, Trigger};
use hts_rules::conditions::{keys, EvalContext};
use hts_rules::core::{GameRng, GameState, PlayerId};
use hts_rules::effects::{EffectDispatcher, HandlerCall};
use hts_rules::rules::RulesEngine;

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);
const P2: PlayerId = PlayerId::new(2);

const SPELL: CardId = CardId::new(10);
const FILLER: CardId = CardId::new(11);
const HERO: CardId = CardId::new(12);

fn engine() -> RulesEngine {
    let catalogue = Catalogue::builder()
        .with_card(CardMeta::new(SPELL, "Forced Draw", CardType::Magic))
        .with_card(CardMeta::new(FILLER, "Filler", CardType::Magic))
        .with_card(CardMeta::new(HERO, "Quiet Monk", CardType::Hero).with_subtype("Wizard"))
        .build()
        .unwrap();
    RulesEngine::new(catalogue)
}

fn game(engine: &RulesEngine, players: usize) -> GameState {
    let mut state = engine.new_game(players);
    for _ in 0..3 {
        state.draw_pile.push_back(FILLER);
    }
    state
}

fn draw_step() -> EffectStep {
    EffectStep::new(SPELL, 1, "draw_card")
        .named("Forced Draw")
        .with_trigger(Trigger::OnPlay)
}

/// Test that a false condition skips the step without side effects.
#[test]
fn test_false_condition_changes_nothing() {
    let engine = engine();
    let mut state = game(&engine, 2);
    let before = state.snapshot().unwrap();

    let step = draw_step().with_condition("roll.success");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert_eq!(state.snapshot().unwrap(), before);
    assert!(ctx.warnings().is_empty());
    assert!(log.is_empty());
}

/// Test that a malformed condition skips the step with one warning.
#[test]
fn test_malformed_condition_warns() {
    let engine = engine();
    let mut state = game(&engine, 2);
    let before = state.snapshot().unwrap();

    let step = draw_step().with_condition("hand.size > 2");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert_eq!(state.snapshot().unwrap(), before);
    assert_eq!(ctx.warnings(), &["UNPARSEABLE_CONDITION: hand.size > 2"]);
}

/// Test that an unreachable roll goal blocks the handler.
#[test]
fn test_failed_gate_roll_changes_nothing() {
    let engine = engine();
    let mut state = game(&engine, 2);
    let before = state.snapshot().unwrap();

    let step = draw_step().with_roll(">=13");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(9);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert_eq!(state.snapshot().unwrap(), before);
    assert!(!ctx.flag(keys::ROLL_SUCCESS));
    assert!(ctx.int(keys::ROLL_TOTAL).is_some());
    assert!(log.iter().any(|line| line.contains("-> FAIL (Forced Draw)")));
}

/// Test that a passed gate roll runs the handler.
#[test]
fn test_passed_gate_roll_runs_handler() {
    let engine = engine();
    let mut state = game(&engine, 2);

    let step = draw_step().with_roll("2d6 >= 2");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(9);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert!(ctx.flag(keys::ROLL_SUCCESS));
    assert_eq!(state.player(P0).hand.len(), 1);
    assert_eq!(state.draw_pile.len(), 2);
    assert_eq!(ctx.card_id(keys::DRAWN_CARD), Some(FILLER));
}

/// Test that an unparseable roll goal warns and skips.
#[test]
fn test_unparseable_roll_goal() {
    let engine = engine();
    let mut state = game(&engine, 2);
    let before = state.snapshot().unwrap();

    let step = draw_step().with_roll("roll high");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert_eq!(state.snapshot().unwrap(), before);
    assert_eq!(
        ctx.warnings(),
        &["UNPARSEABLE_ROLL_CONDITION: roll high (Forced Draw)"]
    );
}

/// Test that an unknown kind yields exactly one warning.
#[test]
fn test_unregistered_kind_warns_once() {
    let engine = engine();
    let mut state = game(&engine, 2);
    let before = state.snapshot().unwrap();

    let step = EffectStep::new(SPELL, 1, "Summon_Dragon").named("Dragon Call");
    let mut ctx = EvalContext::for_actor(P0);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();
    EffectDispatcher::dispatch(&engine, &step, &mut state, P0, &mut ctx, &mut rng, &mut log);

    assert_eq!(state.snapshot().unwrap(), before);
    assert_eq!(
        ctx.warnings(),
        &["UNIMPLEMENTED_EFFECT_KIND: summon_dragon (Dragon Call)"]
    );

    EffectDispatcher::flush_warnings(&mut ctx, P0, &mut log);
    assert_eq!(
        log,
        vec!["[P0] WARN UNIMPLEMENTED_EFFECT_KIND: summon_dragon (Dragon Call)"]
    );
    assert!(ctx.warnings().is_empty());
}

/// Test the `opponent` and `self` destination shorthands.
#[test]
fn test_destination_shorthand_sets_target() {
    let engine = engine();
    let mut state = game(&engine, 3);
    state.player_mut(P2).party.push_back(HERO);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();

    let to_opponent = EffectStep::new(SPELL, 1, "do_nothing").with_zones(None, Some("opponent"));
    let mut ctx = EvalContext::for_actor(P0);
    EffectDispatcher::dispatch(&engine, &to_opponent, &mut state, P0, &mut ctx, &mut rng, &mut log);
    // P1 has no party, so the first opponent with heroes is P2
    assert_eq!(ctx.target_player(), Some(P2));

    let to_self = EffectStep::new(SPELL, 1, "do_nothing").with_zones(None, Some("self"));
    let mut ctx = EvalContext::for_actor(P1);
    EffectDispatcher::dispatch(&engine, &to_self, &mut state, P1, &mut ctx, &mut rng, &mut log);
    assert_eq!(ctx.target_player(), Some(P1));

    // an existing target is kept
    let mut ctx = EvalContext::for_actor(P0);
    ctx.set_target_player(P1);
    EffectDispatcher::dispatch(&engine, &to_opponent, &mut state, P0, &mut ctx, &mut rng, &mut log);
    assert_eq!(ctx.target_player(), Some(P1));
}

/// Test that `run_steps` keeps only the requested phases, in order.
#[test]
fn test_run_steps_filters_phases() {
    let mut engine = engine();
    engine
        .handlers_mut()
        .register("record", |call: &mut HandlerCall<'_>| {
            let ordinal = call.step.ordinal;
            call.note(format_args!("step {ordinal}"));
        });
    let steps = vec![
        EffectStep::new(SPELL, 1, "record").with_trigger(Trigger::OnPlay),
        EffectStep::new(SPELL, 2, "record").with_trigger(Trigger::Passive),
        EffectStep::new(SPELL, 3, "record")
            .with_trigger(Trigger::Auto)
            .with_trigger(Trigger::OnPlay),
        EffectStep::new(SPELL, 4, "record").with_trigger(Trigger::OnDraw),
    ];

    let mut state = game(&engine, 2);
    let mut ctx = EvalContext::for_actor(P1);
    let mut rng = GameRng::new(1);
    let mut log = Vec::new();
    let ran = EffectDispatcher::run_steps(
        &engine,
        &steps,
        &[Trigger::OnPlay, Trigger::OnDraw],
        &mut state,
        P1,
        &mut ctx,
        &mut rng,
        &mut log,
    );

    assert_eq!(ran, 3);
    assert_eq!(log, vec!["[P1] step 1", "[P1] step 3", "[P1] step 4"]);
}
