//! Player actions: play, draw, activate, attack.
//!
//! These are the callers that make the dispatcher re-entrant. A step such
//! as `play_drawn_immediately` calls back into [`RulesEngine::play_card`]
//! with the same state, RNG and log.

use crate::cards::{CardId, CardType, EffectStep, Trigger};
use crate::conditions::{keys, EvalContext};
use crate::core::state::remove_first;
use crate::core::{GameRng, GameState, PlayerId};
use crate::effects::{EffectDispatcher, HeroCandidate, HeroChoice};
use crate::rolls::{Goal, RollRequest, RollResolver};

use super::engine::RulesEngine;

/// Phases a played card's own steps fire in.
const PLAY_PHASES: [Trigger; 3] = [Trigger::OnPlay, Trigger::Auto, Trigger::OnActivation];

/// Phases that never fire as part of an attack.
const REACTION_PHASES: [Trigger; 5] = [
    Trigger::Passive,
    Trigger::OnDraw,
    Trigger::OnChallenge,
    Trigger::OnRoll,
    Trigger::OnHeroDestroyed,
];

/// How a card is played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayOptions {
    /// Replaces the card's own action cost.
    pub cost_override: Option<u32>,
    /// Whether opponents may challenge the play.
    pub allow_challenge: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            cost_override: None,
            allow_challenge: true,
        }
    }
}

impl PlayOptions {
    /// A play that costs nothing.
    #[must_use]
    pub fn free() -> Self {
        Self::default().with_cost(0)
    }

    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost_override = Some(cost);
        self
    }

    #[must_use]
    pub fn with_challenge(mut self, allow: bool) -> Self {
        self.allow_challenge = allow;
        self
    }
}

/// What happened to a played card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Not in hand, or not enough action points. Nothing changed.
    Rejected,
    /// A challenge succeeded; the card went to the discard pile.
    Cancelled,
    /// The card resolved. `attached_to` is the hero an item went onto.
    Played { attached_to: Option<CardId> },
}

/// How an attack roll went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    Success,
    Fail,
    NoEffect,
}

impl AttackOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
            Self::NoEffect => "NO_EFFECT",
        }
    }
}

impl RulesEngine {
    /// Play a card from `player`'s hand.
    ///
    /// The cost is paid and the card leaves the hand before anything else
    /// happens. A cancelled play keeps the cost paid.
    pub fn play_card(
        &self,
        state: &mut GameState,
        player: PlayerId,
        card: CardId,
        options: PlayOptions,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> PlayOutcome {
        let catalogue = self.catalogue();
        let cost = options.cost_override.unwrap_or_else(|| {
            catalogue
                .card(card)
                .map_or(self.config().play_cost, |meta| meta.action_cost)
        });
        let board = state.player(player);
        if !board.hand.contains(&card) || board.action_points < cost {
            return PlayOutcome::Rejected;
        }

        let card_type = catalogue.card_type(card);
        let board = state.player_mut(player);
        board.remove_from_hand(card);
        board.action_points -= cost;
        log.push(format!(
            "[{player}] PLAY {} ({} / {card_type}) cost={cost}",
            card.raw(),
            catalogue.card_name(card)
        ));
        tracing::debug!(player = %player, card = card.raw(), cost, "card played");

        if options.allow_challenge && self.maybe_challenge(state, player, card, rng, log) {
            state.discard_pile.push_back(card);
            log.push(format!("[{player}] play of {} cancelled -> discard", card.raw()));
            return PlayOutcome::Cancelled;
        }

        let attached_to = match card_type {
            CardType::Hero => {
                state.player_mut(player).party.push_back(card);
                log.push(format!(
                    "[{player}] -> entered party: {}:{}",
                    card.raw(),
                    catalogue.card_name(card)
                ));
                None
            }
            CardType::Item => self.attach_played_item(state, player, card, rng, log),
            _ => {
                state.discard_pile.push_back(card);
                None
            }
        };

        let mut ctx = EvalContext::for_actor(player).with(keys::PLAYED_CARD, catalogue.card_value(card));
        if let Some(hero) = attached_to {
            ctx.set(keys::ATTACHED_TO_HERO, catalogue.card_value(hero));
        }

        // A class step that already ran on attach is not run again below.
        let reclasses = |step: &EffectStep| {
            attached_to.is_some()
                && step.has_trigger(&Trigger::Passive)
                && step.effect_kind == "modify_hero_class"
        };
        let steps = catalogue.steps(card);
        for step in steps.iter().filter(|s| reclasses(*s)) {
            EffectDispatcher::dispatch(self, step, state, player, &mut ctx, rng, log);
        }
        for step in steps
            .iter()
            .filter(|s| s.fires_on(&PLAY_PHASES) && !reclasses(*s))
        {
            EffectDispatcher::dispatch(self, step, state, player, &mut ctx, rng, log);
        }
        EffectDispatcher::flush_warnings(&mut ctx, player, log);

        PlayOutcome::Played { attached_to }
    }

    /// Put a played item onto a hero, or discard it when there is none.
    ///
    /// Ordinary items go on one of the player's own heroes without items.
    /// Cursed items go on an opponent's hero without items.
    fn attach_played_item(
        &self,
        state: &mut GameState,
        player: PlayerId,
        item: CardId,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> Option<CardId> {
        let catalogue = self.catalogue();
        let cursed = catalogue.card(item).is_some_and(|meta| meta.is_cursed());
        let owners: Vec<PlayerId> = if cursed {
            player.others(state.player_count()).collect()
        } else {
            vec![player]
        };
        let candidates: Vec<HeroCandidate> = owners
            .into_iter()
            .flat_map(|owner| {
                let board = state.player(owner);
                board
                    .party
                    .iter()
                    .filter(|&&hero| board.item_count(hero) == 0)
                    .map(move |&hero| HeroCandidate {
                        owner,
                        hero,
                        items: 0,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let Some(target) =
            self.policy()
                .choose_hero(HeroChoice::AttachItem, &candidates, catalogue, rng)
        else {
            state.discard_pile.push_back(item);
            let what = if cursed { "cursed item" } else { "item" };
            log.push(format!(
                "[{player}] WARN played {what} with no valid hero; discarded {}",
                item.raw()
            ));
            return None;
        };

        state.player_mut(target.owner).attach_item(target.hero, item);
        log.push(format!(
            "[{player}] -> attached item {}:{} to {} hero {}:{}",
            item.raw(),
            catalogue.card_name(item),
            target.owner,
            target.hero.raw(),
            catalogue.card_name(target.hero)
        ));
        Some(target.hero)
    }

    /// Draw a card as an action. Returns `false` when the player cannot pay
    /// or the draw pile is empty.
    ///
    /// The drawn card is recorded as `drawn_card`, then the player's
    /// captured monsters fire their `on_draw` steps.
    pub fn draw_action(
        &self,
        state: &mut GameState,
        player: PlayerId,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> bool {
        let cost = self.config().draw_cost;
        if state.player(player).action_points < cost || state.draw_pile.is_empty() {
            return false;
        }
        let Some(card) = state.draw_to_hand(player) else {
            return false;
        };
        state.player_mut(player).action_points -= cost;

        let catalogue = self.catalogue();
        let mut ctx = EvalContext::for_actor(player).with(keys::DRAWN_CARD, catalogue.card_value(card));
        log.push(format!(
            "[{player}] ACTION draw (cost {cost}) -> {} ({} / {})",
            card.raw(),
            catalogue.card_name(card),
            catalogue.card_type(card)
        ));

        let monsters: Vec<CardId> = state.player(player).captured_monsters.iter().copied().collect();
        for monster in monsters {
            EffectDispatcher::run_steps(
                self,
                catalogue.monster_steps(monster),
                &[Trigger::OnDraw],
                state,
                player,
                &mut ctx,
                rng,
                log,
            );
        }
        EffectDispatcher::flush_warnings(&mut ctx, player, log);
        true
    }

    /// Activate the first party hero with `on_activation` steps that has
    /// not been activated this turn. Returns whether a hero was activated.
    pub fn activate_hero(
        &self,
        state: &mut GameState,
        player: PlayerId,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> bool {
        let cost = self.config().activate_cost;
        let catalogue = self.catalogue();
        let board = state.player(player);
        if board.action_points < cost {
            return false;
        }
        let hero = board.party.iter().copied().find(|hero| {
            !board.activated_heroes.contains(hero)
                && catalogue
                    .steps(*hero)
                    .iter()
                    .any(|s| s.has_trigger(&Trigger::OnActivation))
        });
        let Some(hero) = hero else {
            return false;
        };

        let board = state.player_mut(player);
        board.action_points -= cost;
        board.activated_heroes.insert(hero);
        log.push(format!(
            "[{player}] ACTION activate hero (cost {cost}) -> {} ({})",
            hero.raw(),
            catalogue.card_name(hero)
        ));

        let mut ctx = EvalContext::for_actor(player).with(keys::ACTIVATED_HERO, catalogue.card_value(hero));
        EffectDispatcher::run_steps(
            self,
            catalogue.steps(hero),
            &[Trigger::OnActivation, Trigger::Auto],
            state,
            player,
            &mut ctx,
            rng,
            log,
        );
        EffectDispatcher::flush_warnings(&mut ctx, player, log);
        true
    }

    /// Whether `player`'s party meets a monster's attack requirements.
    ///
    /// Requirement keys are classes; `hero`, `heroes` and `any` count every
    /// hero. The party leader counts toward its own class.
    #[must_use]
    pub fn can_attack_monster(&self, state: &GameState, player: PlayerId, monster: CardId) -> bool {
        let Some(rule) = self.catalogue().monster_rule(monster) else {
            return true;
        };
        let catalogue = self.catalogue();
        let board = state.player(player);
        let leader_class = board
            .party_leader
            .and_then(|leader| catalogue.card(leader))
            .map(|meta| meta.subtype.trim().to_lowercase());

        rule.requirements.iter().all(|(class, &needed)| {
            let have = match class.as_str() {
                "hero" | "heroes" | "any" => board.party.len(),
                _ => {
                    let heroes = board
                        .party
                        .iter()
                        .filter(|&&hero| {
                            board.hero_class(hero, catalogue).as_deref() == Some(class.as_str())
                        })
                        .count();
                    heroes + usize::from(leader_class.as_deref() == Some(class.as_str()))
                }
            };
            have >= needed as usize
        })
    }

    /// Attack a monster in the row.
    ///
    /// Returns `None` when the attack could not be made, in which case
    /// nothing is paid. On success the monster is captured and the row is
    /// refilled from the monster deck.
    pub fn attack_monster(
        &self,
        state: &mut GameState,
        player: PlayerId,
        monster: CardId,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> Option<AttackOutcome> {
        let catalogue = self.catalogue();
        let cost = self.config().attack_cost;
        if state.player(player).action_points < cost || !state.monster_row.contains(&monster) {
            return None;
        }
        if !self.can_attack_monster(state, player, monster) {
            log.push(format!(
                "[{player}] WARN cannot attack monster {} (requirements unmet)",
                monster.raw()
            ));
            return None;
        }
        let rule = catalogue.monster_rule(monster);
        let Some(success_text) = rule.and_then(|r| r.success_condition.as_deref()) else {
            log.push(format!(
                "[{player}] WARN monster {} has no on_attacked rule/success_condition",
                monster.raw()
            ));
            return None;
        };
        let Ok(success_goal) = Goal::parse(success_text) else {
            log.push(format!(
                "[{player}] WARN monster {} has unparseable success_condition {success_text}",
                monster.raw()
            ));
            return None;
        };
        let fail_text = rule.and_then(|r| r.fail_condition.as_deref());
        let fail_goal = fail_text.and_then(|text| Goal::parse(text).ok());

        state.player_mut(player).action_points -= cost;
        let name = catalogue.card_name(monster);
        log.push(format!(
            "[{player}] ACTION attack monster (cost {cost}) -> {} ({name})",
            monster.raw()
        ));

        let request = RollRequest::threshold(player, format!("monster:{name}"), success_goal);
        let roll = RollResolver::resolve(self, state, &request, rng, log);
        let success = roll.meets(&success_goal);
        let fail = fail_goal.map_or(!success, |goal| roll.meets(&goal));
        let outcome = if success {
            AttackOutcome::Success
        } else if fail {
            AttackOutcome::Fail
        } else {
            AttackOutcome::NoEffect
        };
        log.push(format!(
            "[{player}] monster attack roll 2d6={} -> {} (success:{success_text} fail:{})",
            roll.total,
            outcome.label(),
            fail_text.unwrap_or("-")
        ));
        tracing::debug!(player = %player, monster = monster.raw(), total = roll.total, outcome = outcome.label(), "monster attacked");

        let mut ctx = EvalContext::for_actor(player)
            .with(keys::ATTACK_ROLL, roll.total)
            .with(keys::ATTACK_SUCCESS, success)
            .with(keys::ATTACK_FAIL, fail)
            .with(keys::ATTACK_NO_EFFECT, outcome == AttackOutcome::NoEffect)
            .with(keys::TARGET_MONSTER, i64::from(monster.raw()));
        for step in catalogue
            .monster_steps(monster)
            .iter()
            .filter(|step| !step.fires_on(&REACTION_PHASES))
        {
            EffectDispatcher::dispatch(self, step, state, player, &mut ctx, rng, log);
        }

        if success {
            let row_size = state.monster_row.len();
            if remove_first(&mut state.monster_row, monster) {
                state.player_mut(player).captured_monsters.push_back(monster);
                log.push(format!("[{player}] captured monster -> {}", monster.raw()));
            }
            let deck_size = state.monster_deck.len();
            state.refill_monster_row(row_size);
            if state.monster_deck.len() < deck_size {
                if let Some(&fresh) = state.monster_row.last() {
                    log.push(format!(
                        "[{player}] refill monster_row -> {} ({})",
                        fresh.raw(),
                        catalogue.card_name(fresh)
                    ));
                }
            }
        }

        EffectDispatcher::flush_warnings(&mut ctx, player, log);
        Some(outcome)
    }
}
