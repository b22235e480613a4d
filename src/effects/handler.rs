//! The effect handler trait and the registry that maps kinds to handlers.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::cards::step::normalize_kind;
use crate::cards::EffectStep;
use crate::conditions::EvalContext;
use crate::core::{GameRng, GameState, PlayerId};
use crate::rules::RulesEngine;

/// Everything a handler may read or mutate while applying one step.
pub struct HandlerCall<'a> {
    pub engine: &'a RulesEngine,
    pub step: &'a EffectStep,
    pub state: &'a mut GameState,
    pub actor: PlayerId,
    pub ctx: &'a mut EvalContext,
    pub rng: &'a mut GameRng,
    pub log: &'a mut Vec<String>,
}

impl HandlerCall<'_> {
    /// The step's amount, or `default` when it has none.
    #[must_use]
    pub fn amount_or(&self, default: i64) -> i64 {
        self.step.amount.unwrap_or(default)
    }

    /// Record a warning in the context.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.ctx.warn(message);
    }

    /// Append an actor-attributed line to the log.
    pub fn note(&mut self, line: impl std::fmt::Display) {
        self.log.push(format!("[{}] {line}", self.actor));
    }

    /// The context's target if it is an opponent, else the next seat.
    #[must_use]
    pub fn opponent(&self) -> Option<PlayerId> {
        match self.ctx.target_player() {
            Some(target) if target != self.actor && self.state.players.contains(target) => {
                Some(target)
            }
            _ if self.state.player_count() > 1 => Some(self.state.next_player(self.actor)),
            _ => None,
        }
    }

    /// The context's target, else the actor.
    #[must_use]
    pub fn target_or_actor(&self) -> PlayerId {
        self.ctx
            .target_player()
            .filter(|&p| self.state.players.contains(p))
            .unwrap_or(self.actor)
    }
}

/// A named operation applied by the dispatcher.
///
/// Handlers validate everything before their first mutation and report
/// problems as context warnings instead of failing.
pub trait EffectHandler: Send + Sync {
    fn apply(&self, call: &mut HandlerCall<'_>);
}

impl<F> EffectHandler for F
where
    F: Fn(&mut HandlerCall<'_>) + Send + Sync,
{
    fn apply(&self, call: &mut HandlerCall<'_>) {
        self(call)
    }
}

/// Maps normalized effect kinds to handlers.
///
/// ## Example
///
/// ```
/// use hts_rules::effects::{HandlerCall, HandlerRegistry};
///
/// let mut registry = HandlerRegistry::with_defaults();
/// assert!(registry.contains("draw_card"));
///
/// registry.register("shout", |call: &mut HandlerCall<'_>| call.note("shouts"));
/// assert!(registry.contains(" SHOUT "));
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, Arc<dyn EffectHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in handler.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::handlers::register_defaults(&mut registry);
        registry
    }

    /// Register (or replace) the handler for `kind`.
    pub fn register(&mut self, kind: &str, handler: impl EffectHandler + 'static) -> &mut Self {
        self.handlers.insert(normalize_kind(kind), Arc::new(handler));
        self
    }

    /// Register one handler under several kinds.
    pub fn register_aliases(
        &mut self,
        kinds: &[&str],
        handler: impl EffectHandler + 'static,
    ) -> &mut Self {
        let shared: Arc<dyn EffectHandler> = Arc::new(handler);
        for kind in kinds {
            self.handlers.insert(normalize_kind(kind), Arc::clone(&shared));
        }
        self
    }

    /// Look up a handler by kind (normalized).
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&dyn EffectHandler> {
        self.handlers.get(&normalize_kind(kind)).map(|h| h.as_ref())
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(&normalize_kind(kind))
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
