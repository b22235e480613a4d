//! Rules configuration.
//!
//! Every numeric constant the rules interpreter relies on lives here, so a
//! variant ruleset is a different `RulesConfig` rather than a code change.

use serde::{Deserialize, Serialize};

/// Tunable constants for the rules interpreter.
///
/// ```
/// use hts_rules::core::RulesConfig;
///
/// let config = RulesConfig::default().with_actions_per_turn(4);
/// assert_eq!(config.actions_per_turn, 4);
/// assert_eq!(config.flip_bonus, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Score awarded for flipping a threshold roll's outcome.
    /// Must dominate any plausible shift of the total.
    pub flip_bonus: i64,

    /// Upper bound on modifier sources one participant considers per roll.
    /// Keeps the combination search bounded.
    pub max_modifier_sources: usize,

    /// Action points a player receives at the start of each turn.
    pub actions_per_turn: u32,

    /// Action cost of playing a card when its metadata carries none.
    pub play_cost: u32,

    /// Action cost of the draw action.
    pub draw_cost: u32,

    /// Action cost of activating a hero.
    pub activate_cost: u32,

    /// Action cost of attacking a monster.
    pub attack_cost: u32,

    /// Captured monsters needed to win.
    pub monsters_to_win: usize,

    /// Card types that may be challenged when played (lowercase).
    pub challengeable_types: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            flip_bonus: 1000,
            max_modifier_sources: 8,
            actions_per_turn: 3,
            play_cost: 1,
            draw_cost: 1,
            activate_cost: 1,
            attack_cost: 2,
            monsters_to_win: 3,
            challengeable_types: vec!["hero".into(), "item".into(), "magic".into()],
        }
    }
}

impl RulesConfig {
    /// Create a new config with a custom flip bonus.
    pub fn with_flip_bonus(mut self, bonus: i64) -> Self {
        self.flip_bonus = bonus;
        self
    }

    /// Create a new config with a custom modifier source cap.
    pub fn with_max_modifier_sources(mut self, max: usize) -> Self {
        self.max_modifier_sources = max;
        self
    }

    /// Create a new config with custom actions per turn.
    pub fn with_actions_per_turn(mut self, actions: u32) -> Self {
        self.actions_per_turn = actions;
        self
    }

    /// Create a new config with a custom attack cost.
    pub fn with_attack_cost(mut self, cost: u32) -> Self {
        self.attack_cost = cost;
        self
    }

    /// Create a new config with a custom monster win count.
    pub fn with_monsters_to_win(mut self, count: usize) -> Self {
        self.monsters_to_win = count;
        self
    }

    /// Whether a card of the given (lowercase) type can be challenged.
    #[must_use]
    pub fn is_challengeable(&self, card_type: &str) -> bool {
        self.challengeable_types.iter().any(|t| t == card_type)
    }
}
