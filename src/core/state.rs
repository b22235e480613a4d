//! Game state: player boards and shared piles.
//!
//! ## PlayerState
//!
//! One seat's board:
//! - Hand, party, captured monsters, party leader
//! - Items attached to each hero and class overrides granted by items
//! - Action economy and standing roll modifiers
//!
//! ## GameState
//!
//! All player boards plus the shared draw pile, discard pile, monster row
//! and turn bookkeeping. Uses `im` persistent collections so that cloning a
//! state for a what-if check is cheap.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::player::{PlayerId, PlayerMap};
use crate::cards::{Catalogue, CardId};

/// How a standing modifier participates in rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierUsage {
    /// Added automatically to every roll its owner makes until it expires.
    Always,
    /// Offered in negotiation and consumed when spent.
    OnDemand,
}

/// A fixed roll delta held by a player, with an optional expiry turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingModifier {
    /// Card whose effect granted the modifier.
    pub source: CardId,
    pub delta: i64,
    /// Last turn on which the modifier is active. `None` never expires.
    pub expires_turn: Option<u32>,
    pub usage: ModifierUsage,
}

impl StandingModifier {
    /// Create a modifier that never expires.
    #[must_use]
    pub fn new(source: CardId, delta: i64, usage: ModifierUsage) -> Self {
        Self {
            source,
            delta,
            expires_turn: None,
            usage,
        }
    }

    /// Set the last turn on which this modifier applies.
    #[must_use]
    pub fn until_turn(mut self, turn: u32) -> Self {
        self.expires_turn = Some(turn);
        self
    }

    /// Whether the modifier still applies on `turn`.
    #[must_use]
    pub fn is_active(&self, turn: u32) -> bool {
        self.expires_turn.map_or(true, |last| last >= turn)
    }
}

/// A class granted to a hero by an attached item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOverride {
    /// The item that granted the class.
    pub source: CardId,
    pub class: String,
}

/// A hero detached from its party together with everything riding on it.
///
/// Moving heroes between parties always goes through a bundle so that
/// items and class overrides travel with the hero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeroBundle {
    pub hero: CardId,
    pub items: Vector<CardId>,
    pub overrides: Vector<ClassOverride>,
}

/// One seat's board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,

    // === Zones ===
    pub hand: Vector<CardId>,
    pub party: Vector<CardId>,
    pub captured_monsters: Vector<CardId>,
    pub party_leader: Option<CardId>,

    // === Attachments ===
    /// Items attached to each hero in the party.
    pub hero_items: OrdMap<CardId, Vector<CardId>>,
    /// Class overrides per hero, most recent last.
    pub hero_class_overrides: OrdMap<CardId, Vector<ClassOverride>>,

    // === Economy ===
    pub actions_per_turn: u32,
    pub action_points: u32,
    pub roll_modifiers: Vector<StandingModifier>,
    /// Heroes already activated this turn.
    pub activated_heroes: OrdSet<CardId>,
}

impl PlayerState {
    /// Create an empty board with `actions_per_turn` action points.
    #[must_use]
    pub fn new(id: PlayerId, actions_per_turn: u32) -> Self {
        Self {
            id,
            hand: Vector::new(),
            party: Vector::new(),
            captured_monsters: Vector::new(),
            party_leader: None,
            hero_items: OrdMap::new(),
            hero_class_overrides: OrdMap::new(),
            actions_per_turn,
            action_points: actions_per_turn,
            roll_modifiers: Vector::new(),
            activated_heroes: OrdSet::new(),
        }
    }

    /// Items attached to `hero` (empty when none).
    #[must_use]
    pub fn items_on(&self, hero: CardId) -> Vector<CardId> {
        self.hero_items.get(&hero).cloned().unwrap_or_default()
    }

    /// Number of items attached to `hero`.
    #[must_use]
    pub fn item_count(&self, hero: CardId) -> usize {
        self.hero_items.get(&hero).map_or(0, Vector::len)
    }

    /// The hero carrying `item`, if any.
    #[must_use]
    pub fn hero_carrying(&self, item: CardId) -> Option<CardId> {
        self.hero_items
            .iter()
            .find(|(_, items)| items.contains(&item))
            .map(|(hero, _)| *hero)
    }

    /// Attach an item to a hero.
    pub fn attach_item(&mut self, hero: CardId, item: CardId) {
        let mut items = self.items_on(hero);
        items.push_back(item);
        self.hero_items.insert(hero, items);
    }

    /// Remove the first copy of `card` from the hand. Returns whether it was there.
    pub fn remove_from_hand(&mut self, card: CardId) -> bool {
        remove_first(&mut self.hand, card)
    }

    /// Remove the first copy of `card` from the party. Returns whether it was there.
    pub fn remove_from_party(&mut self, card: CardId) -> bool {
        remove_first(&mut self.party, card)
    }

    /// Take a hero out of the party along with its items and class overrides.
    pub fn detach_hero(&mut self, hero: CardId) -> Option<HeroBundle> {
        if !self.remove_from_party(hero) {
            return None;
        }
        self.activated_heroes.remove(&hero);
        Some(HeroBundle {
            hero,
            items: self.hero_items.remove(&hero).unwrap_or_default(),
            overrides: self.hero_class_overrides.remove(&hero).unwrap_or_default(),
        })
    }

    /// Put a detached hero into this party.
    pub fn attach_hero(&mut self, bundle: HeroBundle) {
        self.party.push_back(bundle.hero);
        if !bundle.items.is_empty() {
            self.hero_items.insert(bundle.hero, bundle.items);
        }
        if !bundle.overrides.is_empty() {
            self.hero_class_overrides.insert(bundle.hero, bundle.overrides);
        }
    }

    /// The effective class of a hero: the latest override, else its subtype.
    #[must_use]
    pub fn hero_class(&self, hero: CardId, catalogue: &Catalogue) -> Option<String> {
        if let Some(last) = self
            .hero_class_overrides
            .get(&hero)
            .and_then(|overrides| overrides.last())
        {
            return Some(last.class.trim().to_lowercase());
        }
        catalogue
            .card(hero)
            .map(|meta| meta.subtype.trim().to_lowercase())
            .filter(|class| !class.is_empty())
    }

    /// Classes present in the party, counting the party leader.
    #[must_use]
    pub fn party_classes(&self, catalogue: &Catalogue) -> BTreeSet<String> {
        let mut classes: BTreeSet<String> = self
            .party
            .iter()
            .filter_map(|&hero| self.hero_class(hero, catalogue))
            .collect();
        if let Some(leader) = self.party_leader.and_then(|id| catalogue.card(id)) {
            let class = leader.subtype.trim().to_lowercase();
            if !class.is_empty() {
                classes.insert(class);
            }
        }
        classes
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: PlayerMap<PlayerState>,

    // === Shared piles ===
    /// Top of the pile is the back of the vector.
    pub draw_pile: Vector<CardId>,
    pub discard_pile: Vector<CardId>,
    /// Top of the deck is the back of the vector.
    pub monster_deck: Vector<CardId>,
    pub monster_row: Vector<CardId>,

    // === Turn bookkeeping ===
    pub turn: u32,
    pub active_player: PlayerId,
}

impl GameState {
    /// Create a state with `player_count` empty boards.
    #[must_use]
    pub fn new(player_count: usize, actions_per_turn: u32) -> Self {
        Self {
            players: PlayerMap::new(player_count, |id| PlayerState::new(id, actions_per_turn)),
            draw_pile: Vector::new(),
            discard_pile: Vector::new(),
            monster_deck: Vector::new(),
            monster_row: Vector::new(),
            turn: 1,
            active_player: PlayerId::new(0),
        }
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// Get a player's board.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    /// Get a player's board mutably.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    /// The next seat clockwise from `player`.
    #[must_use]
    pub fn next_player(&self, player: PlayerId) -> PlayerId {
        player.offset(1, self.player_count())
    }

    /// The first opponent clockwise from `player` whose party is non-empty.
    #[must_use]
    pub fn first_opponent_with_party(&self, player: PlayerId) -> Option<PlayerId> {
        player
            .others(self.player_count())
            .find(|&other| !self.players[other].party.is_empty())
    }

    /// Draw the top card of the draw pile into a player's hand.
    pub fn draw_to_hand(&mut self, player: PlayerId) -> Option<CardId> {
        let card = self.draw_pile.pop_back()?;
        self.players[player].hand.push_back(card);
        Some(card)
    }

    /// Refill the monster row from the monster deck up to `size` cards.
    pub fn refill_monster_row(&mut self, size: usize) {
        while self.monster_row.len() < size {
            match self.monster_deck.pop_back() {
                Some(monster) => self.monster_row.push_back(monster),
                None => break,
            }
        }
    }

    /// Drop standing modifiers that expired before `turn`, for every player.
    pub fn expire_roll_modifiers(&mut self, turn: u32) {
        for (_, player) in self.players.iter_mut() {
            player.roll_modifiers.retain(|m| m.is_active(turn));
        }
    }

    /// Serialize the whole state with `bincode`.
    ///
    /// Two states are equal exactly when their snapshots are equal, which
    /// makes snapshots a convenient way to assert that an operation did not
    /// touch the game.
    pub fn snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

/// Remove the first occurrence of `card` from a persistent vector.
pub(crate) fn remove_first(cards: &mut Vector<CardId>, card: CardId) -> bool {
    match cards.index_of(&card) {
        Some(idx) => {
            cards.remove(idx);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(id: u32) -> CardId {
        CardId::new(id)
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(3, 3);
        assert_eq!(state.player_count(), 3);
        assert_eq!(state.turn, 1);
        assert_eq!(state.player(PlayerId::new(2)).action_points, 3);
    }

    #[test]
    fn test_modifier_expiry() {
        let m = StandingModifier::new(c(1), 2, ModifierUsage::Always).until_turn(4);
        assert!(m.is_active(3));
        assert!(m.is_active(4));
        assert!(!m.is_active(5));

        let forever = StandingModifier::new(c(1), 2, ModifierUsage::OnDemand);
        assert!(forever.is_active(1000));
    }

    #[test]
    fn test_expire_roll_modifiers() {
        let mut state = GameState::new(2, 3);
        let p0 = PlayerId::new(0);
        state.player_mut(p0).roll_modifiers.push_back(
            StandingModifier::new(c(1), 1, ModifierUsage::Always).until_turn(2),
        );
        state
            .player_mut(p0)
            .roll_modifiers
            .push_back(StandingModifier::new(c(2), -1, ModifierUsage::OnDemand));

        state.expire_roll_modifiers(2);
        assert_eq!(state.player(p0).roll_modifiers.len(), 2);

        state.expire_roll_modifiers(3);
        assert_eq!(state.player(p0).roll_modifiers.len(), 1);
        assert_eq!(state.player(p0).roll_modifiers[0].source, c(2));
    }

    #[test]
    fn test_detach_and_attach_hero_carries_items() {
        let mut a = PlayerState::new(PlayerId::new(0), 3);
        let mut b = PlayerState::new(PlayerId::new(1), 3);
        a.party.push_back(c(10));
        a.attach_item(c(10), c(20));
        a.hero_class_overrides.insert(
            c(10),
            Vector::unit(ClassOverride {
                source: c(20),
                class: "wizard".into(),
            }),
        );

        let bundle = a.detach_hero(c(10)).unwrap();
        assert!(a.party.is_empty());
        assert!(a.hero_items.is_empty());
        assert!(a.hero_class_overrides.is_empty());

        b.attach_hero(bundle);
        assert_eq!(b.party, Vector::unit(c(10)));
        assert_eq!(b.item_count(c(10)), 1);
        assert_eq!(b.hero_carrying(c(20)), Some(c(10)));
        assert!(a.detach_hero(c(10)).is_none());
    }

    #[test]
    fn test_first_opponent_with_party() {
        let mut state = GameState::new(4, 3);
        assert_eq!(state.first_opponent_with_party(PlayerId::new(1)), None);

        state.player_mut(PlayerId::new(0)).party.push_back(c(5));
        state.player_mut(PlayerId::new(3)).party.push_back(c(6));
        assert_eq!(
            state.first_opponent_with_party(PlayerId::new(1)),
            Some(PlayerId::new(3))
        );
    }

    #[test]
    fn test_draw_and_refill() {
        let mut state = GameState::new(2, 3);
        state.draw_pile = Vector::from(vec![c(1), c(2)]);
        assert_eq!(state.draw_to_hand(PlayerId::new(0)), Some(c(2)));
        assert_eq!(state.draw_to_hand(PlayerId::new(0)), Some(c(1)));
        assert_eq!(state.draw_to_hand(PlayerId::new(0)), None);

        state.monster_deck = Vector::from(vec![c(50), c(51), c(52), c(53)]);
        state.refill_monster_row(3);
        assert_eq!(state.monster_row, Vector::from(vec![c(53), c(52), c(51)]));
    }

    #[test]
    fn test_snapshot_tracks_changes() {
        let mut state = GameState::new(2, 3);
        let before = state.snapshot().unwrap();
        assert_eq!(before, state.clone().snapshot().unwrap());

        state.discard_pile.push_back(c(9));
        assert_ne!(before, state.snapshot().unwrap());
    }
}
