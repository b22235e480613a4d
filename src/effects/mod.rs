//! Effect steps: dispatch, handlers and choice policies.
//!
//! ## Key Types
//!
//! - `EffectDispatcher`: Applies one step (condition, target, roll, handler)
//! - `EffectHandler`: A named operation on the game state
//! - `HandlerRegistry`: Maps effect kinds to handlers
//! - `ChoicePolicy`: Picks among eligible cards, heroes and players
//!
//! ## Design
//!
//! Card behaviour is data. A card owns an ordered list of steps and each
//! step names an effect kind. Adding a behaviour means registering a
//! handler under a new kind; nothing branches on card identity.

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod policy;

pub use dispatcher::EffectDispatcher;
pub use handler::{EffectHandler, HandlerCall, HandlerRegistry};
pub use handlers::{destroy_hero_card, CardFilter};
pub use policy::{
    CardChoice, ChoicePolicy, HeroCandidate, HeroChoice, HeuristicPolicy, PlayerCandidate,
    PlayerChoice, RandomPolicy,
};
