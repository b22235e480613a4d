//! Built-in effect handlers.
//!
//! ## Organization
//!
//! - `cards`: moving cards between hands, piles and zones
//! - `heroes`: stealing, swapping, destroying and re-classing heroes
//! - `flags`: denial and protection flags on the evaluation context
//! - `economy`: roll modifiers and the action economy
//!
//! Every handler validates before its first mutation. When it cannot
//! proceed it records a warning and leaves the state alone.

mod cards;
mod economy;
mod flags;
mod heroes;

pub use cards::{
    DiscardCards, DrawCards, MoveCard, PlayDrawnImmediately, PlayImmediately, RevealHand,
    SearchAndDraw, StealCard, TradeHands,
};
pub use economy::{ModifyActionPoints, ModifyActionsPerTurn, ModifyRoll};
pub use flags::{Deny, DenyChallenge, DoNothing, Protect, RemoveProtection};
pub use heroes::{
    destroy_hero_card, DestroyHero, DestroyItem, ModifyHeroClass, SacrificeHero, StealHero,
    SwapHeroes,
};

use super::handler::HandlerRegistry;
use super::policy::{HeroCandidate, PlayerCandidate};
use crate::cards::{CardId, Catalogue};
use crate::conditions::{keys, Condition, ConditionError, EvalContext, Value};
use crate::core::{GameState, PlayerId};

/// Register every built-in handler.
pub fn register_defaults(registry: &mut HandlerRegistry) {
    registry
        .register_aliases(&["draw_card", "draw_cards"], DrawCards)
        .register_aliases(&["discard_card", "discard_cards"], DiscardCards)
        .register("move_card", MoveCard)
        .register("search_and_draw", SearchAndDraw)
        .register("steal_card", StealCard)
        .register("play_immediately", PlayImmediately)
        .register("play_drawn_immediately", PlayDrawnImmediately)
        .register("reveal_hand", RevealHand)
        .register("trade_hands", TradeHands)
        .register("steal_hero", StealHero)
        .register("swap_heroes", SwapHeroes)
        .register("destroy_hero", DestroyHero)
        .register("sacrifice_hero", SacrificeHero)
        .register("destroy_item", DestroyItem)
        .register("modify_hero_class", ModifyHeroClass)
        .register("deny", Deny)
        .register("deny_challenge", DenyChallenge)
        .register("protection_from_steal", Protect(keys::PROTECT_STEAL))
        .register("protection_from_destroy", Protect(keys::PROTECT_DESTROY))
        .register("protection_from_challenge", Protect(keys::PROTECT_CHALLENGE))
        .register("remove_protection", RemoveProtection)
        .register_aliases(&["do_nothing", "modify_hero_roll"], DoNothing)
        .register("modify_roll", ModifyRoll)
        .register("modify_action_points", ModifyActionPoints)
        .register("modify_actions_per_turn", ModifyActionsPerTurn);
}

// =============================================================================
// Card filters
// =============================================================================

/// A `filter_expr` such as `type==hero`, evaluated per card.
///
/// The filter is a condition over the card's fields (`id`, `name`, `type`,
/// `subtype`, `action_cost`). Filter text and card text are compared in
/// lowercase.
#[derive(Clone, Debug)]
pub struct CardFilter {
    condition: Condition,
}

impl CardFilter {
    /// Parse an optional filter. A missing filter matches every card.
    pub fn parse(text: Option<&str>) -> Result<Self, ConditionError> {
        let condition = Condition::parse(&text.unwrap_or("").to_lowercase())?;
        Ok(Self { condition })
    }

    #[must_use]
    pub fn matches(&self, card: CardId, catalogue: &Catalogue) -> bool {
        if self.condition.is_trivial() {
            return true;
        }
        let mut ctx = EvalContext::new();
        if let Value::Map(fields) = catalogue.card_value(card) {
            for (key, value) in fields {
                let value = match value {
                    Value::Text(text) => Value::Text(text.to_lowercase()),
                    other => other,
                };
                ctx.set(&key, value);
            }
        }
        self.condition.evaluate(&ctx)
    }
}

// =============================================================================
// Candidate helpers
// =============================================================================

/// The heroes in one player's party, in party order.
pub(crate) fn party_heroes(state: &GameState, owner: PlayerId) -> Vec<HeroCandidate> {
    let board = state.player(owner);
    board
        .party
        .iter()
        .map(|&hero| HeroCandidate {
            owner,
            hero,
            items: board.item_count(hero),
        })
        .collect()
}

/// Whether a chosen hero is still in its owner's party.
///
/// Policies are pluggable, so a pick is checked before anything is detached.
pub(crate) fn is_seated(state: &GameState, pick: &HeroCandidate) -> bool {
    state.players.contains(pick.owner) && state.player(pick.owner).party.contains(&pick.hero)
}

/// The heroes of `target` when it is an opponent, else of every opponent.
pub(crate) fn opponent_heroes(
    state: &GameState,
    actor: PlayerId,
    target: Option<PlayerId>,
) -> Vec<HeroCandidate> {
    match target {
        Some(target) if target != actor && state.players.contains(target) => {
            party_heroes(state, target)
        }
        _ => actor
            .others(state.player_count())
            .flat_map(|other| party_heroes(state, other))
            .collect(),
    }
}

/// Opponents of `actor` as player candidates, in seat order.
pub(crate) fn opponent_candidates(state: &GameState, actor: PlayerId) -> Vec<PlayerCandidate> {
    actor
        .others(state.player_count())
        .map(|player| PlayerCandidate {
            player,
            hand_size: state.player(player).hand.len(),
        })
        .collect()
}
