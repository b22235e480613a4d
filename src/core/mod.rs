//! Core engine types: players, state, RNG, configuration.
//!
//! Everything in here is independent of the card catalogue's contents.
//! The game loop owns a [`GameState`] and threads a single [`GameRng`]
//! through every action so that a seed reproduces a whole game.

pub mod config;
pub mod player;
pub mod rng;
pub mod state;

pub use config::RulesConfig;
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{ClassOverride, GameState, HeroBundle, ModifierUsage, PlayerState, StandingModifier};
