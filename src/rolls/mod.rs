//! Two-die rolls against goals, with modifier negotiation.
//!
//! ## Key Types
//!
//! - `Goal`: `>=N`-style success condition
//! - `RollRequest` / `RollOutcome`: input and result of a roll event
//! - `RollResolver`: rolls, applies passives and runs the negotiation
//! - `ModifierSource`: a card or standing modifier a participant may spend

pub mod goal;
pub mod modifiers;
pub mod resolver;
pub mod search;

pub use goal::{Goal, GoalOp, GoalParseError};
pub use modifiers::{collect_sources, standing_bonus, ModifierSource, SourceKey};
pub use resolver::{ModifierUse, NegotiationMode, RollOutcome, RollRequest, RollResolver};
pub use search::{cheapest_by_delta, Selection};
