//! # hts-rules
//!
//! A data-driven rules interpreter for a hero/monster card game.
//!
//! ## Design Principles
//!
//! 1. **Behaviour Is Data**: Cards carry ordered effect steps. Steps name an
//!    effect kind, a trigger phase, an optional condition and an optional
//!    gating roll. No card has bespoke code.
//!
//! 2. **N-Player First**: Seat order drives targeting, roll negotiation and
//!    challenges. Nothing assumes two players.
//!
//! 3. **Deterministic**: One seeded `GameRng` is threaded through every
//!    action. The same seed and the same choices replay a game exactly.
//!
//! ## Architecture
//!
//! - **Conditions**: A small expression language (`==`, `!=`, `and`, `or`,
//!   `not`, `.contains(x)`) evaluated against a per-action context.
//!
//! - **Rolls**: Two dice, then turn-ordered negotiation in which every
//!   participant may spend modifiers. Each participant's best deal comes
//!   from a cheapest-combination search over its modifier sources.
//!
//! - **Persistent Data Structures**: Game state uses `im-rs`, so cloning
//!   and snapshotting are cheap.
//!
//! ## Modules
//!
//! - `core`: Players, game state, RNG, configuration
//! - `cards`: Card metadata, effect steps, monster rules, the catalogue
//! - `conditions`: Condition parsing and evaluation
//! - `zones`: Logical card locations named in step data
//! - `rolls`: Roll goals, modifier sources and negotiation
//! - `effects`: Step dispatch, effect handlers and choice policies
//! - `rules`: The engine and the player actions that drive dispatch

pub mod cards;
pub mod conditions;
pub mod core;
pub mod effects;
pub mod rolls;
pub mod rules;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    GameRng, GameRngState,
    GameState, PlayerState, PlayerId, PlayerMap,
    ModifierUsage, StandingModifier,
    RulesConfig,
};

pub use crate::cards::{
    CardId, CardMeta, CardType,
    Catalogue, CatalogueBuilder, CatalogueError,
    EffectStep, Trigger,
};

pub use crate::conditions::{Condition, ConditionError, ConditionEvaluator, EvalContext, Value};

pub use crate::rolls::{Goal, GoalOp, NegotiationMode, RollOutcome, RollRequest, RollResolver};

pub use crate::effects::{
    ChoicePolicy, EffectDispatcher, EffectHandler, HandlerCall, HandlerRegistry,
    HeuristicPolicy, RandomPolicy,
};

pub use crate::rules::{AttackOutcome, GameResult, PlayOptions, PlayOutcome, RulesEngine};
