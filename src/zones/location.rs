//! Logical card locations named in effect data.
//!
//! Step data refers to zones by name: `player.hand`, `opponent.party`,
//! `discard_pile`, `monster_row` and so on. A [`ZoneRef`] is the parsed
//! form. It is resolved against the acting player and the current target
//! when a handler runs.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{GameState, PlayerId};

/// Which pile a zone name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    // === Per-player ===
    Hand,
    Party,
    CapturedMonsters,

    // === Shared ===
    DiscardPile,
    DrawPile,
    MonsterRow,
}

impl ZoneKind {
    /// Whether the zone is shared by all players.
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::DiscardPile | Self::DrawPile | Self::MonsterRow)
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "hand" => Some(Self::Hand),
            "party" => Some(Self::Party),
            "captured_monsters" | "monsters" => Some(Self::CapturedMonsters),
            "discard_pile" | "discard" => Some(Self::DiscardPile),
            "draw_pile" | "deck" => Some(Self::DrawPile),
            "monster_row" => Some(Self::MonsterRow),
            _ => None,
        }
    }
}

/// Whose copy of a per-player zone is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// The acting player (`player.` / `self.` or no prefix).
    Actor,
    /// The targeted opponent (`opponent.`).
    Target,
}

/// A parsed zone name.
///
/// ```
/// use hts_rules::zones::{Seat, ZoneKind, ZoneRef};
///
/// let zone = ZoneRef::parse("opponent.hand").unwrap();
/// assert_eq!(zone, ZoneRef { kind: ZoneKind::Hand, seat: Seat::Target });
/// assert_eq!(ZoneRef::parse("Discard_Pile").unwrap().kind, ZoneKind::DiscardPile);
/// assert!(ZoneRef::parse("graveyard").is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneRef {
    pub kind: ZoneKind,
    pub seat: Seat,
}

impl ZoneRef {
    #[must_use]
    pub const fn new(kind: ZoneKind, seat: Seat) -> Self {
        Self { kind, seat }
    }

    /// Parse a zone name, with an optional `player.`, `self.` or
    /// `opponent.` prefix. Case and surrounding whitespace are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let norm = text.trim().to_lowercase();
        let (seat, name) = if let Some(rest) = norm.strip_prefix("opponent.") {
            (Seat::Target, rest)
        } else if let Some(rest) = norm
            .strip_prefix("player.")
            .or_else(|| norm.strip_prefix("self."))
        {
            (Seat::Actor, rest)
        } else {
            (Seat::Actor, norm.as_str())
        };
        let kind = ZoneKind::parse(name.trim())?;
        Some(Self { kind, seat })
    }
}

/// The bare `self` / `opponent` shorthand used in `dest_zone` to pick a
/// target player instead of a pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerShorthand {
    Actor,
    Opponent,
}

impl PlayerShorthand {
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "self" | "player" => Some(Self::Actor),
            "opponent" => Some(Self::Opponent),
            _ => None,
        }
    }
}

impl GameState {
    fn zone_owner(&self, seat: Seat, actor: PlayerId, target: Option<PlayerId>) -> Option<PlayerId> {
        let owner = match seat {
            Seat::Actor => actor,
            Seat::Target => target?,
        };
        self.players.contains(owner).then_some(owner)
    }

    /// Resolve a zone for reading. `None` when the seat cannot be resolved.
    #[must_use]
    pub fn zone(
        &self,
        zone: ZoneRef,
        actor: PlayerId,
        target: Option<PlayerId>,
    ) -> Option<&Vector<CardId>> {
        Some(match zone.kind {
            ZoneKind::DiscardPile => &self.discard_pile,
            ZoneKind::DrawPile => &self.draw_pile,
            ZoneKind::MonsterRow => &self.monster_row,
            kind => {
                let board = self.player(self.zone_owner(zone.seat, actor, target)?);
                match kind {
                    ZoneKind::Hand => &board.hand,
                    ZoneKind::Party => &board.party,
                    _ => &board.captured_monsters,
                }
            }
        })
    }

    /// Resolve a zone for writing. `None` when the seat cannot be resolved.
    pub fn zone_mut(
        &mut self,
        zone: ZoneRef,
        actor: PlayerId,
        target: Option<PlayerId>,
    ) -> Option<&mut Vector<CardId>> {
        Some(match zone.kind {
            ZoneKind::DiscardPile => &mut self.discard_pile,
            ZoneKind::DrawPile => &mut self.draw_pile,
            ZoneKind::MonsterRow => &mut self.monster_row,
            kind => {
                let owner = self.zone_owner(zone.seat, actor, target)?;
                let board = self.player_mut(owner);
                match kind {
                    ZoneKind::Hand => &mut board.hand,
                    ZoneKind::Party => &mut board.party,
                    _ => &mut board.captured_monsters,
                }
            }
        })
    }

    /// Move one copy of `card` between zones.
    ///
    /// Both zones are checked before anything changes; on `false` the state
    /// is untouched.
    pub fn transfer(
        &mut self,
        from: ZoneRef,
        to: ZoneRef,
        card: CardId,
        actor: PlayerId,
        target: Option<PlayerId>,
    ) -> bool {
        let present = self
            .zone(from, actor, target)
            .map_or(false, |cards| cards.contains(&card));
        if !present || self.zone(to, actor, target).is_none() {
            return false;
        }
        if let Some(source) = self.zone_mut(from, actor, target) {
            if let Some(idx) = source.index_of(&card) {
                source.remove(idx);
            }
        }
        if let Some(dest) = self.zone_mut(to, actor, target) {
            dest.push_back(card);
        }
        true
    }
}
