//! The rules engine: catalogue, handlers, policy and configuration.
//!
//! A `RulesEngine` is immutable while a game runs. Every entry point takes
//! the game state, the shared RNG and the text log explicitly, so one
//! engine can drive any number of games one after another.

use std::fmt;

use crate::cards::Catalogue;
use crate::core::{GameState, PlayerId, RulesConfig};
use crate::effects::{ChoicePolicy, HandlerRegistry, HeuristicPolicy};

/// Why a game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WinReason {
    /// Enough monsters captured.
    Monsters(usize),
    /// The party covers every hero class.
    PartyClasses(Vec<String>),
}

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub winner: PlayerId,
    pub reason: WinReason,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winner == player
    }
}

/// Interprets card data against a game state.
///
/// ## Example
///
/// ```
/// use hts_rules::cards::{CardId, CardMeta, CardType, Catalogue};
/// use hts_rules::core::RulesConfig;
/// use hts_rules::effects::RandomPolicy;
/// use hts_rules::rules::RulesEngine;
///
/// let catalogue = Catalogue::builder()
///     .with_card(CardMeta::new(CardId::new(1), "Lute Player", CardType::Hero))
///     .build()
///     .unwrap();
///
/// let engine = RulesEngine::new(catalogue)
///     .with_policy(RandomPolicy::default())
///     .with_config(RulesConfig::default().with_actions_per_turn(4));
///
/// let state = engine.new_game(3);
/// assert_eq!(state.player_count(), 3);
/// assert!(engine.handlers().contains("draw_card"));
/// ```
pub struct RulesEngine {
    catalogue: Catalogue,
    handlers: HandlerRegistry,
    policy: Box<dyn ChoicePolicy>,
    config: RulesConfig,
}

impl RulesEngine {
    /// Create an engine with the built-in handlers, the heuristic policy
    /// and the default configuration.
    #[must_use]
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            handlers: HandlerRegistry::with_defaults(),
            policy: Box::new(HeuristicPolicy::default()),
            config: RulesConfig::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl ChoicePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: RulesConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Mutable access to the registry, for registering extra kinds.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    #[must_use]
    pub fn policy(&self) -> &dyn ChoicePolicy {
        self.policy.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// An empty game for `player_count` players, using the configured
    /// actions per turn.
    #[must_use]
    pub fn new_game(&self, player_count: usize) -> GameState {
        GameState::new(player_count, self.config.actions_per_turn)
    }
}

impl fmt::Debug for RulesEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulesEngine")
            .field("cards", &self.catalogue.len())
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
