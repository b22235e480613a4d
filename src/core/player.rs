//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Seat identifier supporting 1-255 players. Seat order is the order in
//! which roll negotiation and challenges visit players.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier supporting 1-255 players.
///
/// Seats are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats for a game with `player_count` players.
    ///
    /// ```
    /// use hts_rules::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count.min(255) as u8).map(PlayerId)
    }

    /// The seat `offset` places clockwise from this one.
    #[must_use]
    pub fn offset(self, offset: usize, player_count: usize) -> PlayerId {
        if player_count == 0 {
            return self;
        }
        PlayerId(((self.index() + offset) % player_count) as u8)
    }

    /// Every other seat, clockwise starting with the next one.
    ///
    /// ```
    /// use hts_rules::core::PlayerId;
    ///
    /// let others: Vec<_> = PlayerId::new(2).others(4).collect();
    /// assert_eq!(others, vec![PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    pub fn others(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (1..player_count).map(move |off| self.offset(off, player_count))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// Backed by a `Vec<T>` with one entry per player.
///
/// ## Example
///
/// ```
/// use hts_rules::core::{PlayerId, PlayerMap};
///
/// let mut hand_sizes: PlayerMap<usize> = PlayerMap::new(4, |_| 3);
/// hand_sizes[PlayerId::new(1)] = 5;
/// assert_eq!(hand_sizes[PlayerId::new(1)], 5);
/// assert_eq!(hand_sizes[PlayerId::new(0)], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8).map(|i| factory(PlayerId(i))).collect();

        Self { data }
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Whether `player` is a seat in this map.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.data.len()
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_display() {
        assert_eq!(format!("{}", PlayerId::new(0)), "P0");
        assert_eq!(format!("{}", PlayerId::new(3)), "P3");
    }

    #[test]
    fn test_offset_wraps() {
        let p = PlayerId::new(3);
        assert_eq!(p.offset(1, 4), PlayerId::new(0));
        assert_eq!(p.offset(2, 4), PlayerId::new(1));
        assert_eq!(p.offset(0, 4), p);
    }

    #[test]
    fn test_others_excludes_self() {
        let others: Vec<_> = PlayerId::new(0).others(3).collect();
        assert_eq!(others, vec![PlayerId::new(1), PlayerId::new(2)]);

        let solo: Vec<_> = PlayerId::new(0).others(1).collect();
        assert!(solo.is_empty());
    }

    #[test]
    fn test_player_map_contains() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32);
        assert_eq!(map[PlayerId::new(1)], 1);
        assert!(map.contains(PlayerId::new(1)));
        assert!(!map.contains(PlayerId::new(2)));
    }

    #[test]
    fn test_player_map_iter_order() {
        let map: PlayerMap<i32> = PlayerMap::new(3, |p| p.index() as i32 * 10);
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs[0], (PlayerId::new(0), &0));
        assert_eq!(pairs[2], (PlayerId::new(2), &20));
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i32> = PlayerMap::new(0, |_| 0);
    }
}
