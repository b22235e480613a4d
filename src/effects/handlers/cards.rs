//! Handlers that move cards between hands, piles and zones.

use super::{opponent_candidates, CardFilter};
use crate::cards::CardId;
use crate::conditions::{keys, Value};
use crate::core::PlayerId;
use crate::effects::handler::{EffectHandler, HandlerCall};
use crate::effects::policy::{CardChoice, PlayerChoice};
use crate::rules::PlayOptions;
use crate::zones::{Seat, ZoneRef};

fn count(call: &HandlerCall<'_>) -> usize {
    usize::try_from(call.amount_or(1)).unwrap_or(0)
}

/// Draw `amount` cards (default 1) into the actor's hand.
pub struct DrawCards;

impl EffectHandler for DrawCards {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let catalogue = call.engine.catalogue();
        for _ in 0..count(call) {
            let Some(card) = call.state.draw_to_hand(call.actor) else {
                call.warn(format!("DRAW_PILE_EMPTY ({})", call.step.name));
                break;
            };
            call.ctx.set(keys::DRAWN_CARD, catalogue.card_value(card));
            call.note(format_args!(
                "drew card_id={} ({})",
                card.raw(),
                catalogue.card_name(card)
            ));
        }
    }
}

/// The actor discards `amount` cards (default 1) of its choosing.
pub struct DiscardCards;

impl EffectHandler for DiscardCards {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let engine = call.engine;
        let hand_size = call.state.player(call.actor).hand.len();
        for _ in 0..count(call).min(hand_size) {
            let hand: Vec<CardId> = call.state.player(call.actor).hand.iter().copied().collect();
            let Some(card) =
                engine
                    .policy()
                    .choose_card(CardChoice::Discard, &hand, engine.catalogue(), call.rng)
            else {
                return;
            };
            if !call.state.player_mut(call.actor).remove_from_hand(card) {
                return;
            }
            call.state.discard_pile.push_back(card);
            call.note(format_args!("discarded card_id={}", card.raw()));
        }
    }
}

/// The parsed zones of a step plus the player `opponent.` zones refer to.
struct StepZones {
    from: ZoneRef,
    to: ZoneRef,
    target: Option<PlayerId>,
}

/// Parse and resolve a step's zones, warning `missing` when either is absent.
fn step_zones(call: &mut HandlerCall<'_>, missing: &str) -> Option<StepZones> {
    let step = call.step;
    let (Some(source), Some(dest)) = (step.source_zone.as_deref(), step.dest_zone.as_deref())
    else {
        call.warn(format!("{missing}: {}", step.name));
        return None;
    };

    let mut parsed = [source, dest].map(|text| (text, ZoneRef::parse(text)));
    if let Some((text, _)) = parsed.iter().find(|(_, zone)| zone.is_none()) {
        call.warn(format!("UNKNOWN_ZONE: {} ({})", text.trim(), step.name));
        return None;
    }
    let (Some(from), Some(to)) = (parsed[0].1.take(), parsed[1].1.take()) else {
        return None;
    };

    let target = if from.seat == Seat::Target || to.seat == Seat::Target {
        call.opponent()
    } else {
        call.ctx.target_player()
    };
    let resolvable = call.state.zone(from, call.actor, target).is_some()
        && call.state.zone(to, call.actor, target).is_some();
    if !resolvable {
        call.warn(format!("NO_TARGET_PLAYER: {}", step.name));
        return None;
    }
    Some(StepZones { from, to, target })
}

fn parse_filter(call: &mut HandlerCall<'_>) -> Option<CardFilter> {
    let step = call.step;
    match CardFilter::parse(step.filter_expr.as_deref()) {
        Ok(filter) => Some(filter),
        Err(err) => {
            call.warn(format!(
                "UNPARSEABLE_FILTER: {} ({}: {err})",
                step.filter_expr.as_deref().unwrap_or("").trim(),
                step.name
            ));
            None
        }
    }
}

/// Move `amount` cards (default 1) matching the filter between two zones.
pub struct MoveCard;

impl EffectHandler for MoveCard {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let Some(zones) = step_zones(call, "MOVE_CARD_MISSING_ZONES") else {
            return;
        };
        let Some(filter) = parse_filter(call) else {
            return;
        };
        let engine = call.engine;
        let catalogue = engine.catalogue();

        for _ in 0..count(call) {
            let eligible: Vec<CardId> = call
                .state
                .zone(zones.from, call.actor, zones.target)
                .map(|cards| {
                    cards
                        .iter()
                        .copied()
                        .filter(|&card| filter.matches(card, catalogue))
                        .collect()
                })
                .unwrap_or_default();
            let Some(card) = engine.policy().choose_card(
                CardChoice::Move(zones.to.kind),
                &eligible,
                catalogue,
                call.rng,
            ) else {
                return;
            };
            if !call
                .state
                .transfer(zones.from, zones.to, card, call.actor, zones.target)
            {
                return;
            }
            let step = call.step;
            call.note(format_args!(
                "move_card {} {} -> {}",
                card.raw(),
                step.source_zone.as_deref().unwrap_or("").trim(),
                step.dest_zone.as_deref().unwrap_or("").trim()
            ));
        }
    }
}

/// Take the first card matching the filter from one zone to another.
pub struct SearchAndDraw;

impl EffectHandler for SearchAndDraw {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let Some(zones) = step_zones(call, "SEARCH_MISSING_ZONES") else {
            return;
        };
        let Some(filter) = parse_filter(call) else {
            return;
        };
        let catalogue = call.engine.catalogue();
        let found = call
            .state
            .zone(zones.from, call.actor, zones.target)
            .and_then(|cards| cards.iter().copied().find(|&card| filter.matches(card, catalogue)));
        let Some(card) = found else {
            return;
        };
        if call
            .state
            .transfer(zones.from, zones.to, card, call.actor, zones.target)
        {
            let step = call.step;
            call.note(format_args!(
                "searched {} and took card_id={} to {}",
                step.source_zone.as_deref().unwrap_or("").trim(),
                card.raw(),
                step.dest_zone.as_deref().unwrap_or("").trim()
            ));
        }
    }
}

/// Take a card from an opponent's hand.
pub struct StealCard;

impl EffectHandler for StealCard {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        if call.ctx.flag(keys::PROTECT_STEAL) {
            call.note(format_args!("steal_card blocked by protection ({})", call.step.name));
            return;
        }
        let Some(victim) = call.opponent() else {
            call.warn("steal_card: no opponent");
            return;
        };
        let engine = call.engine;
        let hand: Vec<CardId> = call.state.player(victim).hand.iter().copied().collect();
        let Some(card) =
            engine
                .policy()
                .choose_card(CardChoice::Steal, &hand, engine.catalogue(), call.rng)
        else {
            return;
        };
        if !call.state.player_mut(victim).remove_from_hand(card) {
            return;
        }
        call.state.player_mut(call.actor).hand.push_back(card);
        call.ctx
            .set(keys::STOLEN_CARD, engine.catalogue().card_value(card));
        call.note(format_args!("stole card_id={} from {victim}", card.raw()));
    }
}

/// Play the card in `ctx_key` from the actor's hand.
fn play_from_context(call: &mut HandlerCall<'_>, ctx_key: &str, options: PlayOptions) {
    let step = call.step;
    let Some(card) = call.ctx.card_id(ctx_key) else {
        call.warn(format!("{} missing ctx.{ctx_key}", step.effect_kind));
        return;
    };
    if !call.state.player(call.actor).hand.contains(&card) {
        call.warn(format!(
            "{}: card {} not in hand",
            step.effect_kind,
            card.raw()
        ));
        return;
    }
    call.engine.play_card(
        call.state,
        call.actor,
        card,
        options,
        call.rng,
        call.log,
    );
}

/// Play the card just stolen, at no cost and without a challenge.
pub struct PlayImmediately;

impl EffectHandler for PlayImmediately {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        play_from_context(
            call,
            keys::STOLEN_CARD,
            PlayOptions::free().with_challenge(false),
        );
    }
}

/// Play the card just drawn, at no cost. It can still be challenged.
pub struct PlayDrawnImmediately;

impl EffectHandler for PlayDrawnImmediately {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        play_from_context(call, keys::DRAWN_CARD, PlayOptions::free());
    }
}

/// Reveal an opponent's hand into the context.
///
/// Sets `revealed_hand` to the list of card records and `revealed_card`
/// to the one card the policy singles out.
pub struct RevealHand;

impl EffectHandler for RevealHand {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let engine = call.engine;
        let candidates = match call.ctx.target_player() {
            Some(target) if target != call.actor => opponent_candidates(call.state, call.actor)
                .into_iter()
                .filter(|c| c.player == target)
                .collect(),
            _ => opponent_candidates(call.state, call.actor),
        };
        let Some(victim) =
            engine
                .policy()
                .choose_player(PlayerChoice::RevealTarget, &candidates, call.rng)
        else {
            call.warn("reveal_hand: no opponent");
            return;
        };

        let hand: Vec<CardId> = call.state.player(victim).hand.iter().copied().collect();
        let catalogue = engine.catalogue();
        let records: Vec<Value> = hand.iter().map(|&card| catalogue.card_value(card)).collect();
        call.ctx.set(keys::REVEALED_HAND, records);
        if let Some(card) = engine
            .policy()
            .choose_card(CardChoice::Reveal, &hand, catalogue, call.rng)
        {
            call.ctx.set(keys::REVEALED_CARD, catalogue.card_value(card));
        }
        call.ctx.set_target_player(victim);
        call.note(format_args!("revealed hand of {victim} ({} cards)", hand.len()));
    }
}

/// Swap hands with an opponent.
pub struct TradeHands;

impl EffectHandler for TradeHands {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let candidates = opponent_candidates(call.state, call.actor);
        let Some(partner) =
            call.engine
                .policy()
                .choose_player(PlayerChoice::TradePartner, &candidates, call.rng)
        else {
            call.warn("trade_hands: no opponent");
            return;
        };
        let mine = call.state.player(call.actor).hand.clone();
        let theirs = std::mem::replace(&mut call.state.player_mut(partner).hand, mine);
        call.state.player_mut(call.actor).hand = theirs;
        call.note(format_args!("traded hands with {partner}"));
    }
}
