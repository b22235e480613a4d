//! Benchmarks for roll negotiation.
//!
//! Run with: cargo bench --bench negotiation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hts_rules::cards::{CardId, CardMeta, CardType, Catalogue, EffectStep};
use hts_rules::core::{GameRng, GameState, PlayerId};
use hts_rules::rolls::{cheapest_by_delta, collect_sources, Goal, GoalOp, RollRequest, RollResolver};
use hts_rules::rules::RulesEngine;

const MENUS: [&str; 4] = ["-2/+0/+3", "-3/-1/+2", "+1", "-4/+4"];

fn modifier_id(idx: usize) -> CardId {
    CardId::new(100 + idx as u32)
}

fn engine() -> RulesEngine {
    let catalogue = MENUS
        .iter()
        .enumerate()
        .fold(Catalogue::builder(), |builder, (idx, menu)| {
            builder
                .with_card(CardMeta::new(modifier_id(idx), format!("Modifier {idx}"), CardType::Modifier))
                .with_step(EffectStep::new(modifier_id(idx), 1, "modify_roll").with_amount_expr(*menu))
        })
        .build()
        .expect("benchmark catalogue is valid");
    RulesEngine::new(catalogue)
}

/// Every player holds `per_player` modifier cards.
fn create_test_state(engine: &RulesEngine, players: usize, per_player: usize) -> GameState {
    let mut state = engine.new_game(players);
    for player in PlayerId::all(players) {
        for idx in 0..per_player {
            state
                .player_mut(player)
                .hand
                .push_back(modifier_id(idx % MENUS.len()));
        }
    }
    state
}

fn bench_resolve(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("resolve");

    for per_player in [0, 2, 4, 8] {
        let state = create_test_state(&engine, 4, per_player);
        let request = RollRequest::threshold(PlayerId::new(0), "bench", Goal::new(GoalOp::Ge, 8));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{per_player}_cards")),
            &per_player,
            |b, _| {
                let mut rng = GameRng::new(7);
                b.iter(|| {
                    let mut state = state.clone();
                    let mut log = Vec::new();
                    let outcome =
                        RollResolver::resolve(&engine, &mut state, black_box(&request), &mut rng, &mut log);
                    black_box(outcome)
                });
            },
        );
    }

    group.finish();
}

fn bench_cheapest_by_delta(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("cheapest_by_delta");

    for sources in [2, 4, 8] {
        let state = create_test_state(&engine, 1, sources);
        let sources = collect_sources(&state, engine.catalogue(), PlayerId::new(0), sources);
        let costs = vec![1; sources.len()];

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_sources", sources.len())),
            &sources,
            |b, sources| {
                b.iter(|| black_box(cheapest_by_delta(black_box(sources), &costs)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_cheapest_by_delta);
criterion_main!(benches);
