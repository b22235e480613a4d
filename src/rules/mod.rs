//! Rules engine and player actions.
//!
//! `RulesEngine` holds everything that stays fixed during a game: the card
//! catalogue, the handler registry, the choice policy and the
//! configuration. Actions take the mutable game state explicitly:
//! - `play_card`, `draw_action`, `activate_hero`, `attack_monster`
//! - `maybe_challenge` (called by `play_card`)
//! - `begin_turn`, `check_winner`

pub mod actions;
pub mod challenge;
pub mod engine;
pub mod turn;

pub use actions::{AttackOutcome, PlayOptions, PlayOutcome};
pub use engine::{GameResult, RulesEngine, WinReason};
