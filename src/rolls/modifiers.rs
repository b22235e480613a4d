//! Modifier sources available to a roll participant.

use smallvec::SmallVec;

use crate::cards::{CardId, CardType, Catalogue};
use crate::core::{GameState, ModifierUsage, PlayerId};

/// Stable identity of a modifier source within one participant's turn.
///
/// The derived order puts hand cards (by card id, then hand slot) before
/// standing modifiers (by list index). Negotiation breaks cost ties by
/// comparing key sequences in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKey {
    /// A modifier card at `slot` in the hand.
    Card { card: CardId, slot: usize },
    /// Entry `index` of the player's standing modifiers.
    Standing { index: usize },
}

/// One thing a participant may spend to shift a roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifierSource {
    pub key: SourceKey,
    /// The modifier card, or the card that granted a standing modifier.
    pub card: CardId,
    /// Deltas on offer; exactly one is chosen when the source is spent.
    pub options: SmallVec<[i64; 4]>,
}

/// Sources `player` may spend, in key order, at most `limit` of them.
///
/// Hand cards count when they are modifier cards with a non-empty menu;
/// standing modifiers count when they are `OnDemand` and unexpired.
#[must_use]
pub fn collect_sources(
    state: &GameState,
    catalogue: &Catalogue,
    player: PlayerId,
    limit: usize,
) -> Vec<ModifierSource> {
    let board = state.player(player);

    let cards = board.hand.iter().enumerate().filter_map(|(slot, &card)| {
        let options = catalogue.modifier_options(card);
        (catalogue.card_type(card) == CardType::Modifier && !options.is_empty()).then(|| {
            ModifierSource {
                key: SourceKey::Card { card, slot },
                card,
                options: options.iter().copied().collect(),
            }
        })
    });

    let standing = board
        .roll_modifiers
        .iter()
        .enumerate()
        .filter(|(_, m)| m.usage == ModifierUsage::OnDemand && m.is_active(state.turn))
        .map(|(index, m)| ModifierSource {
            key: SourceKey::Standing { index },
            card: m.source,
            options: SmallVec::from_elem(m.delta, 1),
        });

    let mut sources: Vec<ModifierSource> = cards.chain(standing).collect();
    sources.sort_by_key(|source| source.key);
    sources.truncate(limit);
    sources
}

/// Sum of `player`'s unexpired `Always` modifiers.
#[must_use]
pub fn standing_bonus(state: &GameState, player: PlayerId) -> i64 {
    state
        .player(player)
        .roll_modifiers
        .iter()
        .filter(|m| m.usage == ModifierUsage::Always && m.is_active(state.turn))
        .map(|m| m.delta)
        .sum()
}
