//! Handlers that move, destroy or re-class heroes.

use super::{is_seated, opponent_heroes, party_heroes};
use crate::cards::{CardId, Trigger};
use crate::conditions::{keys, EvalContext};
use crate::core::{ClassOverride, GameRng, GameState, PlayerId};
use crate::effects::dispatcher::EffectDispatcher;
use crate::effects::handler::{EffectHandler, HandlerCall};
use crate::effects::policy::{CardChoice, HeroChoice};
use crate::rules::RulesEngine;

/// Destroy a hero in `victim`'s party.
///
/// Attached items go to the discard pile, class overrides are dropped and
/// the hero is discarded. Afterwards the `on_hero_destroyed` steps of the
/// victim's remaining heroes, their items and the victim's captured
/// monsters fire for the victim. Returns `false` (and changes nothing)
/// when the hero is not in that party.
pub fn destroy_hero_card(
    engine: &RulesEngine,
    state: &mut GameState,
    victim: PlayerId,
    hero: CardId,
    rng: &mut GameRng,
    log: &mut Vec<String>,
) -> bool {
    let catalogue = engine.catalogue();
    let Some(bundle) = state.player_mut(victim).detach_hero(hero) else {
        return false;
    };
    if !bundle.items.is_empty() {
        let names: Vec<String> = bundle
            .items
            .iter()
            .map(|&item| format!("{}:{}", item.raw(), catalogue.card_name(item)))
            .collect();
        log.push(format!(
            "[{victim}] hero {} dies -> discarded items: {}",
            hero.raw(),
            names.join(", ")
        ));
    }
    state.discard_pile.extend(bundle.items);
    state.discard_pile.push_back(hero);
    log.push(format!(
        "[{victim}] hero destroyed/sacrificed -> {}:{}",
        hero.raw(),
        catalogue.card_name(hero)
    ));
    tracing::debug!(victim = %victim, hero = hero.raw(), "hero destroyed");

    let board = state.player(victim);
    let mut owners: Vec<CardId> = Vec::new();
    for &survivor in &board.party {
        owners.push(survivor);
        owners.extend(board.items_on(survivor));
    }
    let monsters: Vec<CardId> = board.captured_monsters.iter().copied().collect();

    let mut ctx = EvalContext::for_actor(victim).with(keys::DESTROYED_HERO, catalogue.card_value(hero));
    let phases = [Trigger::OnHeroDestroyed];
    for owner in owners {
        let steps = catalogue.steps(owner);
        EffectDispatcher::run_steps(engine, steps, &phases, state, victim, &mut ctx, rng, log);
    }
    for monster in monsters {
        let steps = catalogue.monster_steps(monster);
        EffectDispatcher::run_steps(engine, steps, &phases, state, victim, &mut ctx, rng, log);
    }
    EffectDispatcher::flush_warnings(&mut ctx, victim, log);
    true
}

/// Take a hero, with its items and class overrides, from an opponent.
pub struct StealHero;

impl EffectHandler for StealHero {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        if call.ctx.flag(keys::PROTECT_STEAL) {
            call.note(format_args!("steal_hero blocked by protection ({})", call.step.name));
            return;
        }
        let engine = call.engine;
        let candidates = opponent_heroes(call.state, call.actor, call.ctx.target_player());
        let Some(pick) =
            engine
                .policy()
                .choose_hero(HeroChoice::Steal, &candidates, engine.catalogue(), call.rng)
        else {
            call.warn("steal_hero: no opponent heroes");
            return;
        };
        if pick.owner == call.actor || !is_seated(call.state, &pick) {
            call.warn(format!("steal_hero: stale choice ({})", call.step.name));
            return;
        }
        let Some(bundle) = call.state.player_mut(pick.owner).detach_hero(pick.hero) else {
            return;
        };
        call.state.player_mut(call.actor).attach_hero(bundle);
        call.ctx.set(keys::STOLEN_CARD, engine.catalogue().card_value(pick.hero));
        call.note(format_args!(
            "stole hero {}:{} from {}",
            pick.hero.raw(),
            engine.catalogue().card_name(pick.hero),
            pick.owner
        ));
    }
}

/// Exchange one of the actor's heroes with one of an opponent's.
pub struct SwapHeroes;

impl EffectHandler for SwapHeroes {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let engine = call.engine;
        let catalogue = engine.catalogue();
        let mine = party_heroes(call.state, call.actor);
        let theirs = opponent_heroes(call.state, call.actor, call.ctx.target_player());
        let policy = engine.policy();
        let (Some(give), Some(take)) = (
            policy.choose_hero(HeroChoice::SwapGive, &mine, catalogue, call.rng),
            policy.choose_hero(HeroChoice::SwapTake, &theirs, catalogue, call.rng),
        ) else {
            call.warn("swap_heroes: both sides need a hero");
            return;
        };

        let actor = call.actor;
        if give.owner != actor
            || take.owner == actor
            || !is_seated(call.state, &give)
            || !is_seated(call.state, &take)
        {
            call.warn(format!("swap_heroes: stale choice ({})", call.step.name));
            return;
        }
        let Some(given) = call.state.player_mut(actor).detach_hero(give.hero) else {
            return;
        };
        let Some(taken) = call.state.player_mut(take.owner).detach_hero(take.hero) else {
            call.state.player_mut(actor).attach_hero(given);
            return;
        };
        call.state.player_mut(take.owner).attach_hero(given);
        call.state.player_mut(actor).attach_hero(taken);
        call.note(format_args!(
            "swapped hero {} for {}'s hero {}",
            give.hero.raw(),
            take.owner,
            take.hero.raw()
        ));
    }
}

/// Destroy a hero of the targeted opponent.
pub struct DestroyHero;

impl EffectHandler for DestroyHero {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        if call.ctx.flag(keys::PROTECT_DESTROY) {
            call.note(format_args!("destroy_hero blocked by protection ({})", call.step.name));
            return;
        }
        let victim = call
            .ctx
            .target_player()
            .filter(|&p| call.state.players.contains(p))
            .or_else(|| call.state.first_opponent_with_party(call.actor));
        let Some(victim) = victim else {
            call.warn("destroy_hero: no valid opponent with heroes");
            return;
        };
        let engine = call.engine;
        let candidates = party_heroes(call.state, victim);
        let Some(pick) =
            engine
                .policy()
                .choose_hero(HeroChoice::Destroy, &candidates, engine.catalogue(), call.rng)
        else {
            call.warn("destroy_hero: victim has no heroes");
            return;
        };
        if pick.owner != victim || !is_seated(call.state, &pick) {
            call.warn(format!("destroy_hero: stale choice ({})", call.step.name));
            return;
        }
        call.note(format_args!("destroy_hero targets {victim} hero {}", pick.hero.raw()));
        call.ctx
            .set(keys::DESTROYED_HERO, engine.catalogue().card_value(pick.hero));
        destroy_hero_card(engine, call.state, victim, pick.hero, call.rng, call.log);
    }
}

/// The target (default: the actor) gives up one of its heroes.
pub struct SacrificeHero;

impl EffectHandler for SacrificeHero {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let victim = call.target_or_actor();
        let engine = call.engine;
        let candidates = party_heroes(call.state, victim);
        let Some(pick) = engine.policy().choose_hero(
            HeroChoice::Sacrifice,
            &candidates,
            engine.catalogue(),
            call.rng,
        ) else {
            call.warn("sacrifice_hero: no heroes to sacrifice");
            return;
        };
        if pick.owner != victim || !is_seated(call.state, &pick) {
            call.warn(format!("sacrifice_hero: stale choice ({})", call.step.name));
            return;
        }
        call.note(format_args!(
            "sacrifice_hero by {victim} chooses hero {}",
            pick.hero.raw()
        ));
        call.ctx
            .set(keys::DESTROYED_HERO, engine.catalogue().card_value(pick.hero));
        destroy_hero_card(engine, call.state, victim, pick.hero, call.rng, call.log);
    }
}

/// Discard an item attached to an opponent's hero.
pub struct DestroyItem;

impl EffectHandler for DestroyItem {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        if call.ctx.flag(keys::PROTECT_DESTROY) {
            call.note(format_args!("destroy_item blocked by protection ({})", call.step.name));
            return;
        }
        let engine = call.engine;
        let heroes = opponent_heroes(call.state, call.actor, call.ctx.target_player());
        let mut items: Vec<CardId> = Vec::new();
        let mut carriers: Vec<(PlayerId, CardId)> = Vec::new();
        for candidate in &heroes {
            for item in call.state.player(candidate.owner).items_on(candidate.hero) {
                items.push(item);
                carriers.push((candidate.owner, candidate.hero));
            }
        }
        let Some(item) =
            engine
                .policy()
                .choose_card(CardChoice::DestroyItem, &items, engine.catalogue(), call.rng)
        else {
            call.warn("destroy_item: no opponent items");
            return;
        };
        let Some(&(owner, hero)) = items
            .iter()
            .position(|&i| i == item)
            .and_then(|idx| carriers.get(idx))
        else {
            call.warn(format!("destroy_item: stale choice ({})", call.step.name));
            return;
        };

        let board = call.state.player_mut(owner);
        let mut remaining = board.items_on(hero);
        if let Some(idx) = remaining.index_of(&item) {
            remaining.remove(idx);
        }
        if remaining.is_empty() {
            board.hero_items.remove(&hero);
        } else {
            board.hero_items.insert(hero, remaining);
        }
        if let Some(mut overrides) = board.hero_class_overrides.get(&hero).cloned() {
            overrides.retain(|o| o.source != item);
            if overrides.is_empty() {
                board.hero_class_overrides.remove(&hero);
            } else {
                board.hero_class_overrides.insert(hero, overrides);
            }
        }
        call.state.discard_pile.push_back(item);
        call.note(format_args!(
            "destroyed item {} on {owner} hero {}",
            item.raw(),
            hero.raw()
        ));
    }
}

/// Give the hero carrying this item an extra class.
///
/// The class name is the first word of `amount_expr` or `notes` that names
/// a known hero class; failing that, the trimmed `amount_expr` itself.
pub struct ModifyHeroClass;

impl ModifyHeroClass {
    fn class_name(call: &HandlerCall<'_>) -> Option<String> {
        let known = call.engine.catalogue().hero_classes();
        let texts = [call.step.amount_expr.as_deref(), call.step.notes.as_deref()];
        let mentioned = texts.iter().flatten().find_map(|text| {
            text.split(|c: char| !c.is_alphanumeric() && c != '_')
                .map(str::to_lowercase)
                .find(|word| known.contains(word))
        });
        mentioned.or_else(|| {
            call.step
                .amount_expr
                .as_deref()
                .map(|text| text.trim().to_lowercase())
                .filter(|text| !text.is_empty())
        })
    }
}

impl EffectHandler for ModifyHeroClass {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let item = call.step.owner;
        let hero = call.ctx.card_id(keys::ATTACHED_TO_HERO).or_else(|| {
            call.state
                .players
                .iter()
                .find_map(|(_, board)| board.hero_carrying(item))
        });
        let Some(hero) = hero else {
            call.warn(format!("modify_hero_class: item not attached ({})", call.step.name));
            return;
        };
        let Some(owner) = call
            .state
            .players
            .iter()
            .find(|(_, board)| board.party.contains(&hero))
            .map(|(id, _)| id)
        else {
            call.warn(format!("modify_hero_class: hero {} not in play", hero.raw()));
            return;
        };
        let Some(class) = Self::class_name(call) else {
            call.warn(format!("modify_hero_class: no class named ({})", call.step.name));
            return;
        };

        let board = call.state.player_mut(owner);
        let mut overrides = board.hero_class_overrides.get(&hero).cloned().unwrap_or_default();
        overrides.push_back(ClassOverride {
            source: item,
            class: class.clone(),
        });
        board.hero_class_overrides.insert(hero, overrides);
        call.note(format_args!("hero {} gains class {class}", hero.raw()));
    }
}
