//! Roll resolution with turn-ordered modifier negotiation.
//!
//! ## Algorithm
//!
//! 1. Roll two dice; their sum is the base.
//! 2. Add the named hero's passive item bonus and the roller's `Always`
//!    standing modifiers.
//! 3. Fire `on_roll` steps of every captured monster.
//! 4. Each non-roller in seat order, then the roller, may spend modifier
//!    sources. A participant commits to the best strictly positive score
//!    found by [`cheapest_by_delta`](super::search::cheapest_by_delta).
//!
//! ## Threshold scoring
//!
//! The roller wants the goal met, everyone else wants it missed. Flipping
//! the outcome dominates everything else (`flip_bonus`); otherwise a
//! participant losing the roll values movement toward its side, and a
//! participant already winning the roll only spends if it is the roller.

use smallvec::SmallVec;
use std::iter;

use super::goal::Goal;
use super::modifiers::{collect_sources, standing_bonus, ModifierSource, SourceKey};
use super::search::{cheapest_by_delta, Selection};
use crate::cards::{CardId, Catalogue, Trigger};
use crate::conditions::{keys, EvalContext};
use crate::core::{GameRng, GameState, PlayerId};
use crate::effects::EffectDispatcher;
use crate::rules::RulesEngine;

/// How participants judge a change of the running total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NegotiationMode {
    /// The roller wants the goal met; everyone else wants it missed.
    Threshold,
    /// The roller wants the total high; everyone else wants it low.
    Maximize,
}

/// Everything needed to run one roll event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollRequest {
    pub roller: PlayerId,
    /// Attribution in trace lines only.
    pub reason: String,
    pub goal: Option<Goal>,
    pub mode: NegotiationMode,
    /// Hero whose passive item bonuses apply.
    pub hero: Option<CardId>,
    /// Whether captured monsters' `on_roll` steps fire.
    pub fire_roll_triggers: bool,
}

impl RollRequest {
    /// A roll against a goal.
    #[must_use]
    pub fn threshold(roller: PlayerId, reason: impl Into<String>, goal: Goal) -> Self {
        Self {
            roller,
            reason: reason.into(),
            goal: Some(goal),
            mode: NegotiationMode::Threshold,
            hero: None,
            fire_roll_triggers: true,
        }
    }

    /// A contested roll where higher is better for the roller.
    #[must_use]
    pub fn maximize(roller: PlayerId, reason: impl Into<String>) -> Self {
        Self {
            roller,
            reason: reason.into(),
            goal: None,
            mode: NegotiationMode::Maximize,
            hero: None,
            fire_roll_triggers: true,
        }
    }

    #[must_use]
    pub fn with_hero(mut self, hero: CardId) -> Self {
        self.hero = Some(hero);
        self
    }

    #[must_use]
    pub fn without_roll_triggers(mut self) -> Self {
        self.fire_roll_triggers = false;
        self
    }
}

/// One spent modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierUse {
    pub player: PlayerId,
    pub source: SourceKey,
    pub card: CardId,
    pub delta: i64,
}

/// Result of a roll event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollOutcome {
    pub dice: (i64, i64),
    pub base: i64,
    /// Hero item bonus plus the roller's `Always` modifiers.
    pub passive_bonus: i64,
    pub total: i64,
    /// Spent modifiers in the order they were committed.
    pub trace: Vec<ModifierUse>,
}

impl RollOutcome {
    #[must_use]
    pub fn meets(&self, goal: &Goal) -> bool {
        goal.is_met(self.total)
    }

    /// Modifiers spent by one participant.
    pub fn spent_by(&self, player: PlayerId) -> impl Iterator<Item = &ModifierUse> {
        self.trace.iter().filter(move |u| u.player == player)
    }
}

/// Runs roll events.
pub struct RollResolver;

impl RollResolver {
    /// Roll, apply passives, fire roll triggers and negotiate.
    ///
    /// Never fails: a participant without a profitable combination passes.
    pub fn resolve(
        engine: &RulesEngine,
        state: &mut GameState,
        request: &RollRequest,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> RollOutcome {
        let tag = format!("[ROLL:{}]", request.reason);
        let dice = rng.roll_2d6();
        let base = dice.0 + dice.1;
        log.push(format!(
            "{tag} {} base 2d6 = {base} ({}+{})",
            request.roller, dice.0, dice.1
        ));

        let mut total = base;
        let mut passive_bonus = 0;

        if let Some(hero) = request.hero {
            let bonus = hero_item_bonus(engine.catalogue(), state, hero);
            if bonus != 0 {
                total += bonus;
                passive_bonus += bonus;
                log.push(format!(
                    "{tag} hero {} ({}) item bonus {bonus:+} -> total={total}",
                    hero.raw(),
                    engine.catalogue().card_name(hero)
                ));
            }
        }

        let standing = standing_bonus(state, request.roller);
        if standing != 0 {
            total += standing;
            passive_bonus += standing;
            log.push(format!(
                "{tag} {} standing modifiers {standing:+} -> total={total}",
                request.roller
            ));
        }

        if request.fire_roll_triggers {
            fire_roll_triggers(engine, state, request, base, rng, log);
        }

        let roller = request.roller;
        let participants: Vec<PlayerId> = PlayerId::all(state.player_count())
            .filter(|&p| p != roller)
            .chain(iter::once(roller))
            .collect();

        let mut trace = Vec::new();
        for participant in participants {
            let spent = negotiate_turn(engine, state, request, participant, total, log);
            for used in spent {
                total += used.delta;
                trace.push(used);
            }
        }

        log.push(format!("{tag} FINAL total = {total}"));
        tracing::debug!(
            reason = %request.reason,
            roller = %roller,
            base,
            total,
            spent = trace.len(),
            "roll resolved"
        );

        RollOutcome {
            dice,
            base,
            passive_bonus,
            total,
            trace,
        }
    }

    /// Score moving the running total from `before` to `after`, from the
    /// point of view of one participant.
    #[must_use]
    pub fn score(
        mode: NegotiationMode,
        goal: Option<&Goal>,
        is_roller: bool,
        before: i64,
        after: i64,
        flip_bonus: i64,
    ) -> i64 {
        match mode {
            NegotiationMode::Maximize => {
                if is_roller {
                    after - before
                } else {
                    before - after
                }
            }
            NegotiationMode::Threshold => {
                let Some(goal) = goal else {
                    return 0;
                };
                let was_favourable = goal.is_met(before) == is_roller;
                let now_favourable = goal.is_met(after) == is_roller;
                let magnitude = (after - before).abs();
                let toward_pass = goal.op.shift_toward_pass(before, after, goal.target);
                let toward_me = if is_roller { toward_pass } else { -toward_pass };

                match (was_favourable, now_favourable) {
                    (false, true) => flip_bonus + magnitude,
                    (true, false) => -(flip_bonus + magnitude),
                    (false, false) => toward_me,
                    (true, true) if is_roller => toward_me,
                    (true, true) => 0,
                }
            }
        }
    }
}

/// Passive `modify_hero_roll` amounts on the items attached to `hero`.
///
/// Players are scanned in seat order; the first one whose items on that
/// hero carry any such amount decides the bonus.
fn hero_item_bonus(catalogue: &Catalogue, state: &GameState, hero: CardId) -> i64 {
    state
        .players
        .iter()
        .find_map(|(_, board)| {
            let amounts: SmallVec<[i64; 4]> = board
                .items_on(hero)
                .iter()
                .flat_map(|&item| catalogue.steps(item))
                .filter(|step| {
                    step.has_trigger(&Trigger::Passive) && step.effect_kind == "modify_hero_roll"
                })
                .filter_map(|step| step.amount)
                .collect();
            (!amounts.is_empty()).then(|| amounts.iter().sum())
        })
        .unwrap_or(0)
}

fn fire_roll_triggers(
    engine: &RulesEngine,
    state: &mut GameState,
    request: &RollRequest,
    base: i64,
    rng: &mut GameRng,
    log: &mut Vec<String>,
) {
    for owner in PlayerId::all(state.player_count()) {
        let monsters: Vec<CardId> = state.player(owner).captured_monsters.iter().copied().collect();
        for monster in monsters {
            let steps = engine.catalogue().monster_steps(monster);
            if !steps.iter().any(|s| s.has_trigger(&Trigger::OnRoll)) {
                continue;
            }
            let mut ctx = EvalContext::for_actor(owner)
                .with(keys::ROLL_ROLLER, request.roller.index() as i64)
                .with(keys::ROLL_REASON, request.reason.as_str())
                .with(keys::ROLL_BASE, base)
                .with(keys::ROLL_IN_PROGRESS, true);
            EffectDispatcher::run_steps(
                engine,
                steps,
                &[Trigger::OnRoll],
                state,
                owner,
                &mut ctx,
                rng,
                log,
            );
            EffectDispatcher::flush_warnings(&mut ctx, owner, log);
        }
    }
}

/// One participant's negotiation turn. Returns what was spent.
fn negotiate_turn(
    engine: &RulesEngine,
    state: &mut GameState,
    request: &RollRequest,
    participant: PlayerId,
    total: i64,
    log: &mut Vec<String>,
) -> Vec<ModifierUse> {
    let catalogue = engine.catalogue();
    let config = engine.config();
    let sources = collect_sources(state, catalogue, participant, config.max_modifier_sources);
    if sources.is_empty() {
        return Vec::new();
    }

    let costs: Vec<u64> = sources
        .iter()
        .map(|source| engine.policy().modifier_cost(source, catalogue))
        .collect();
    let table = cheapest_by_delta(&sources, &costs);
    let is_roller = participant == request.roller;

    let best = table
        .values()
        .filter(|selection| !selection.is_empty())
        .map(|selection| {
            let score = RollResolver::score(
                request.mode,
                request.goal.as_ref(),
                is_roller,
                total,
                total + selection.delta,
                config.flip_bonus,
            );
            (score, selection)
        })
        .filter(|(score, _)| *score > 0)
        .min_by(|(score_a, a), (score_b, b)| score_b.cmp(score_a).then_with(|| a.tie_order(b)));

    match best {
        Some((score, selection)) => {
            tracing::debug!(
                player = %participant,
                delta = selection.delta,
                score,
                "modifiers committed"
            );
            commit(engine, state, request, participant, &sources, selection, total, log)
        }
        None => Vec::new(),
    }
}

/// Spend a selection: discard the cards, drop the standing modifiers.
#[allow(clippy::too_many_arguments)]
fn commit(
    engine: &RulesEngine,
    state: &mut GameState,
    request: &RollRequest,
    participant: PlayerId,
    sources: &[ModifierSource],
    selection: &Selection,
    mut total: i64,
    log: &mut Vec<String>,
) -> Vec<ModifierUse> {
    let catalogue = engine.catalogue();
    let mut used = Vec::with_capacity(selection.picks.len());
    let mut hand_slots: SmallVec<[usize; 4]> = SmallVec::new();
    let mut standing_slots: SmallVec<[usize; 4]> = SmallVec::new();
    let mut discarded: SmallVec<[CardId; 4]> = SmallVec::new();

    for &(idx, delta) in &selection.picks {
        let Some(source) = sources.get(idx) else {
            continue;
        };
        let board = state.player(participant);
        let verb = match source.key {
            SourceKey::Card { card, slot } => {
                if board.hand.get(slot) != Some(&card) {
                    continue;
                }
                hand_slots.push(slot);
                discarded.push(card);
                "plays modifier"
            }
            SourceKey::Standing { index } => {
                if index >= board.roll_modifiers.len() {
                    continue;
                }
                standing_slots.push(index);
                "spends standing modifier from"
            }
        };
        total += delta;
        log.push(format!(
            "[ROLL:{}] {participant} {verb} {} ({}) choose {delta:+} -> total={total}",
            request.reason,
            source.card.raw(),
            catalogue.card_name(source.card)
        ));
        used.push(ModifierUse {
            player: participant,
            source: source.key,
            card: source.card,
            delta,
        });
    }

    let board = state.player_mut(participant);
    hand_slots.sort_unstable_by(|a, b| b.cmp(a));
    for slot in hand_slots {
        board.hand.remove(slot);
    }
    standing_slots.sort_unstable_by(|a, b| b.cmp(a));
    for index in standing_slots {
        board.roll_modifiers.remove(index);
    }
    state.discard_pile.extend(discarded);

    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolls::GoalOp;

    const FLIP: i64 = 1000;

    fn threshold(goal: Goal, is_roller: bool, before: i64, after: i64) -> i64 {
        RollResolver::score(
            NegotiationMode::Threshold,
            Some(&goal),
            is_roller,
            before,
            after,
            FLIP,
        )
    }

    #[test]
    fn test_flip_scores() {
        let goal = Goal::new(GoalOp::Ge, 9);
        assert_eq!(threshold(goal, true, 8, 10), FLIP + 2);
        assert_eq!(threshold(goal, false, 9, 7), FLIP + 2);
        assert_eq!(threshold(goal, false, 8, 11), -(FLIP + 3));
        assert_eq!(threshold(goal, true, 9, 8), -(FLIP + 1));
    }

    #[test]
    fn test_unfavourable_directional() {
        let goal = Goal::new(GoalOp::Le, 4);
        // roller still missing: moving down is progress
        assert_eq!(threshold(goal, true, 8, 6), 2);
        assert_eq!(threshold(goal, true, 8, 9), -1);
        // opponent already losing (goal met), staying met
        assert_eq!(threshold(goal, false, 2, 3), 1);
    }

    #[test]
    fn test_favourable_non_roller_holds() {
        let goal = Goal::new(GoalOp::Ge, 9);
        assert_eq!(threshold(goal, false, 8, 6), 0);
        assert_eq!(threshold(goal, true, 10, 12), 2);
    }

    #[test]
    fn test_no_goal_scores_zero() {
        assert_eq!(
            RollResolver::score(NegotiationMode::Threshold, None, true, 5, 9, FLIP),
            0
        );
    }

    #[test]
    fn test_maximize_scores() {
        assert_eq!(
            RollResolver::score(NegotiationMode::Maximize, None, true, 5, 7, FLIP),
            2
        );
        assert_eq!(
            RollResolver::score(NegotiationMode::Maximize, None, false, 5, 7, FLIP),
            -2
        );
    }

    #[test]
    fn test_request_builders() {
        let request = RollRequest::threshold(PlayerId::new(1), "test", Goal::new(GoalOp::Ge, 7))
            .with_hero(CardId::new(4))
            .without_roll_triggers();
        assert_eq!(request.mode, NegotiationMode::Threshold);
        assert_eq!(request.hero, Some(CardId::new(4)));
        assert!(!request.fire_roll_triggers);

        let contest = RollRequest::maximize(PlayerId::new(0), "challenge");
        assert_eq!(contest.goal, None);
        assert!(contest.fire_roll_triggers);
    }
}
