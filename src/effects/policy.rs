//! Choice policies for the decisions effects leave open.
//!
//! Handlers never pick targets themselves. Whenever several cards, heroes
//! or players are eligible, the handler asks the engine's [`ChoicePolicy`].
//! Two policies ship with the crate:
//! - `HeuristicPolicy`: deterministic card-value heuristic
//! - `RandomPolicy`: uniform choices from the shared RNG

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::cards::{CardId, CardType, Catalogue};
use crate::core::{GameRng, PlayerId};
use crate::rolls::ModifierSource;
use crate::zones::ZoneKind;

// =============================================================================
// Choice points
// =============================================================================

/// Why a card is being chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardChoice {
    /// The chooser discards one of its own cards.
    Discard,
    /// The chooser takes a card from an opponent's hand.
    Steal,
    /// A card is moved to the given zone.
    Move(ZoneKind),
    /// A card of a revealed hand is singled out.
    Reveal,
    /// An opponent's item is destroyed.
    DestroyItem,
}

/// Why a hero is being chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeroChoice {
    Destroy,
    Sacrifice,
    Steal,
    AttachItem,
    /// The actor's hero given away in a swap.
    SwapGive,
    /// The opponent's hero taken in a swap.
    SwapTake,
}

/// Why a player is being chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerChoice {
    RevealTarget,
    TradePartner,
    Challenger,
}

/// A hero eligible for a hero choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeroCandidate {
    pub owner: PlayerId,
    pub hero: CardId,
    /// Items currently attached.
    pub items: usize,
}

/// A player eligible for a player choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerCandidate {
    pub player: PlayerId,
    pub hand_size: usize,
}

// =============================================================================
// Policy trait
// =============================================================================

/// Decides among eligible candidates on behalf of the acting player.
///
/// Candidates are always passed in a deterministic order (seat order, then
/// zone order). Every method returns `None` only for an empty candidate
/// list.
pub trait ChoicePolicy: Send + Sync {
    fn choose_card(
        &self,
        choice: CardChoice,
        candidates: &[CardId],
        catalogue: &Catalogue,
        rng: &mut GameRng,
    ) -> Option<CardId>;

    fn choose_hero(
        &self,
        choice: HeroChoice,
        candidates: &[HeroCandidate],
        catalogue: &Catalogue,
        rng: &mut GameRng,
    ) -> Option<HeroCandidate>;

    fn choose_player(
        &self,
        choice: PlayerChoice,
        candidates: &[PlayerCandidate],
        rng: &mut GameRng,
    ) -> Option<PlayerId>;

    /// Whether the chosen challenger actually challenges.
    fn should_challenge(&self, challenger: PlayerId, rng: &mut GameRng) -> bool;

    /// Price of spending one modifier source in a roll negotiation.
    ///
    /// Among selections reaching the same delta, the cheapest wins.
    fn modifier_cost(&self, _source: &ModifierSource, _catalogue: &Catalogue) -> u64 {
        1
    }
}

// =============================================================================
// Heuristic policy
// =============================================================================

/// Base value of a card type for the heuristic.
#[must_use]
pub fn type_value(card_type: &CardType) -> i64 {
    match card_type {
        CardType::PartyLeader => 80,
        CardType::Hero => 60,
        CardType::Item => 45,
        CardType::Magic => 35,
        CardType::Challenge => 25,
        CardType::Modifier => 15,
        CardType::Monster => 5,
        CardType::Other(_) => 20,
    }
}

/// Deterministic card-value heuristic.
///
/// A card is worth its type value plus its action cost. Ties go to the
/// lowest id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeuristicPolicy {
    pub challenge_probability: f64,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            challenge_probability: 0.35,
        }
    }
}

impl HeuristicPolicy {
    #[must_use]
    pub fn with_challenge_probability(mut self, probability: f64) -> Self {
        self.challenge_probability = probability;
        self
    }

    /// Heuristic value of a card.
    #[must_use]
    pub fn card_value(card: CardId, catalogue: &Catalogue) -> i64 {
        match catalogue.card(card) {
            Some(meta) => type_value(&meta.card_type) + i64::from(meta.action_cost),
            None => type_value(&CardType::Other(String::new())),
        }
    }

    fn hero_worth(candidate: &HeroCandidate, catalogue: &Catalogue) -> i64 {
        Self::card_value(candidate.hero, catalogue) + 5 * candidate.items as i64
    }
}

impl ChoicePolicy for HeuristicPolicy {
    fn choose_card(
        &self,
        choice: CardChoice,
        candidates: &[CardId],
        catalogue: &Catalogue,
        _rng: &mut GameRng,
    ) -> Option<CardId> {
        let lowest = matches!(
            choice,
            CardChoice::Discard | CardChoice::Move(ZoneKind::DiscardPile)
        );
        let value = |card: &CardId| Self::card_value(*card, catalogue);
        if lowest {
            candidates.iter().copied().min_by_key(|c| (value(c), *c))
        } else {
            candidates.iter().copied().min_by_key(|c| (Reverse(value(c)), *c))
        }
    }

    fn choose_hero(
        &self,
        choice: HeroChoice,
        candidates: &[HeroCandidate],
        catalogue: &Catalogue,
        _rng: &mut GameRng,
    ) -> Option<HeroCandidate> {
        let iter = candidates.iter().copied();
        match choice {
            // min_by_key keeps the first of equal keys
            HeroChoice::Destroy => iter.min_by_key(|c| Reverse(c.items)),
            HeroChoice::Sacrifice => iter.min_by_key(|c| c.items),
            HeroChoice::Steal | HeroChoice::SwapTake => {
                iter.min_by_key(|c| (Reverse(Self::hero_worth(c, catalogue)), c.owner, c.hero))
            }
            HeroChoice::SwapGive => iter.min_by_key(|c| (Self::hero_worth(c, catalogue), c.hero)),
            HeroChoice::AttachItem => iter.min_by_key(|c| {
                (Reverse(Self::card_value(c.hero, catalogue)), c.owner, c.hero)
            }),
        }
    }

    fn choose_player(
        &self,
        _choice: PlayerChoice,
        candidates: &[PlayerCandidate],
        _rng: &mut GameRng,
    ) -> Option<PlayerId> {
        candidates
            .iter()
            .min_by_key(|c| (Reverse(c.hand_size), c.player))
            .map(|c| c.player)
    }

    fn should_challenge(&self, _challenger: PlayerId, rng: &mut GameRng) -> bool {
        rng.gen_bool(self.challenge_probability)
    }
}

// =============================================================================
// Random policy
// =============================================================================

/// Uniformly random choices, drawn from the shared RNG.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomPolicy {
    pub challenge_probability: f64,
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self {
            challenge_probability: 0.5,
        }
    }
}

impl ChoicePolicy for RandomPolicy {
    fn choose_card(
        &self,
        _choice: CardChoice,
        candidates: &[CardId],
        _catalogue: &Catalogue,
        rng: &mut GameRng,
    ) -> Option<CardId> {
        rng.choose_index(candidates.len()).map(|i| candidates[i])
    }

    fn choose_hero(
        &self,
        _choice: HeroChoice,
        candidates: &[HeroCandidate],
        _catalogue: &Catalogue,
        rng: &mut GameRng,
    ) -> Option<HeroCandidate> {
        rng.choose_index(candidates.len()).map(|i| candidates[i])
    }

    fn choose_player(
        &self,
        _choice: PlayerChoice,
        candidates: &[PlayerCandidate],
        rng: &mut GameRng,
    ) -> Option<PlayerId> {
        rng.choose_index(candidates.len()).map(|i| candidates[i].player)
    }

    fn should_challenge(&self, _challenger: PlayerId, rng: &mut GameRng) -> bool {
        rng.gen_bool(self.challenge_probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardMeta;

    fn catalogue() -> Catalogue {
        Catalogue::builder()
            .with_card(CardMeta::new(CardId::new(1), "Hero A", CardType::Hero))
            .with_card(CardMeta::new(CardId::new(2), "Hero B", CardType::Hero).with_action_cost(2))
            .with_card(CardMeta::new(CardId::new(3), "Item", CardType::Item))
            .with_card(CardMeta::new(CardId::new(4), "Mod", CardType::Modifier))
            .with_card(CardMeta::new(CardId::new(5), "Mod 2", CardType::Modifier))
            .build()
            .unwrap()
    }

    fn hero(owner: u8, hero: u32, items: usize) -> HeroCandidate {
        HeroCandidate {
            owner: PlayerId::new(owner),
            hero: CardId::new(hero),
            items,
        }
    }

    #[test]
    fn test_card_value() {
        let catalogue = catalogue();
        assert_eq!(HeuristicPolicy::card_value(CardId::new(1), &catalogue), 61);
        assert_eq!(HeuristicPolicy::card_value(CardId::new(2), &catalogue), 62);
        assert_eq!(HeuristicPolicy::card_value(CardId::new(99), &catalogue), 20);
    }

    #[test]
    fn test_discard_lowest_steal_highest() {
        let catalogue = catalogue();
        let policy = HeuristicPolicy::default();
        let mut rng = GameRng::new(0);
        let hand = [CardId::new(5), CardId::new(1), CardId::new(4), CardId::new(3)];

        assert_eq!(
            policy.choose_card(CardChoice::Discard, &hand, &catalogue, &mut rng),
            Some(CardId::new(4))
        );
        assert_eq!(
            policy.choose_card(CardChoice::Steal, &hand, &catalogue, &mut rng),
            Some(CardId::new(1))
        );
        assert_eq!(
            policy.choose_card(CardChoice::Move(ZoneKind::DiscardPile), &hand, &catalogue, &mut rng),
            Some(CardId::new(4))
        );
        assert_eq!(
            policy.choose_card(CardChoice::Move(ZoneKind::Hand), &hand, &catalogue, &mut rng),
            Some(CardId::new(1))
        );
        assert_eq!(policy.choose_card(CardChoice::Steal, &[], &catalogue, &mut rng), None);
    }

    #[test]
    fn test_hero_choices() {
        let catalogue = catalogue();
        let policy = HeuristicPolicy::default();
        let mut rng = GameRng::new(0);
        let heroes = [hero(1, 1, 2), hero(1, 2, 0), hero(2, 1, 2)];

        let pick = |choice| policy.choose_hero(choice, &heroes, &catalogue, &mut GameRng::new(0));
        assert_eq!(pick(HeroChoice::Destroy), Some(heroes[0]));
        assert_eq!(pick(HeroChoice::Sacrifice), Some(heroes[1]));
        // 61 + 10 beats 62 + 0
        assert_eq!(pick(HeroChoice::Steal), Some(heroes[0]));
        assert_eq!(pick(HeroChoice::SwapGive), Some(heroes[1]));
        assert_eq!(pick(HeroChoice::AttachItem), Some(heroes[1]));
        assert_eq!(policy.choose_hero(HeroChoice::Destroy, &[], &catalogue, &mut rng), None);
    }

    #[test]
    fn test_player_choice_largest_hand() {
        let policy = HeuristicPolicy::default();
        let mut rng = GameRng::new(0);
        let players = [
            PlayerCandidate { player: PlayerId::new(2), hand_size: 4 },
            PlayerCandidate { player: PlayerId::new(1), hand_size: 4 },
            PlayerCandidate { player: PlayerId::new(3), hand_size: 1 },
        ];
        assert_eq!(
            policy.choose_player(PlayerChoice::RevealTarget, &players, &mut rng),
            Some(PlayerId::new(1))
        );
    }

    #[test]
    fn test_challenge_probability_extremes() {
        let mut rng = GameRng::new(3);
        let never = HeuristicPolicy::default().with_challenge_probability(0.0);
        let always = HeuristicPolicy::default().with_challenge_probability(1.0);
        assert!(!never.should_challenge(PlayerId::new(0), &mut rng));
        assert!(always.should_challenge(PlayerId::new(0), &mut rng));
    }

    #[test]
    fn test_random_policy_stays_in_bounds() {
        let catalogue = catalogue();
        let policy = RandomPolicy::default();
        let mut rng = GameRng::new(11);
        let hand = [CardId::new(1), CardId::new(3)];
        for _ in 0..20 {
            let card = policy
                .choose_card(CardChoice::Discard, &hand, &catalogue, &mut rng)
                .unwrap();
            assert!(hand.contains(&card));
        }
    }
}
