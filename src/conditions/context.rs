//! The per-action evaluation context.
//!
//! A context is created by whoever starts an action (playing a card, an
//! attack, a turn-start passive) and threaded by `&mut` through every step
//! that action dispatches. Handlers write results into it and conditions
//! read them back. Keys are flat strings; dotted keys such as
//! `protect.steal` are stored literally.

use std::collections::BTreeMap;

use super::value::Value;
use crate::cards::CardId;
use crate::core::PlayerId;

/// Well-known context keys.
pub mod keys {
    // === Participants ===
    pub const ACTOR: &str = "actor_pid";
    pub const TARGET_PLAYER: &str = "target_pid";

    // === Cards touched by handlers ===
    pub const DRAWN_CARD: &str = "drawn_card";
    pub const STOLEN_CARD: &str = "stolen_card";
    pub const DESTROYED_HERO: &str = "destroyed_hero";
    pub const REVEALED_HAND: &str = "revealed_hand";
    pub const REVEALED_CARD: &str = "revealed_card";
    pub const PLAYED_CARD: &str = "played_card";
    pub const ATTACHED_TO_HERO: &str = "attached_to_hero";
    pub const ACTIVATED_HERO: &str = "activated_hero";

    // === Flags ===
    pub const PROTECT_STEAL: &str = "protect.steal";
    pub const PROTECT_DESTROY: &str = "protect.destroy";
    pub const PROTECT_CHALLENGE: &str = "protect.challenge";
    pub const CHALLENGE_DENIED: &str = "challenge.denied";
    pub const CHALLENGE_TARGET: &str = "challenge_target";
    pub const DENIED: &str = "denied";

    // === Rolls ===
    pub const ROLL_TOTAL: &str = "roll.total";
    pub const ROLL_SUCCESS: &str = "roll.success";
    pub const ROLL_ROLLER: &str = "roll.roller";
    pub const ROLL_REASON: &str = "roll.reason";
    pub const ROLL_BASE: &str = "roll.base";
    pub const ROLL_IN_PROGRESS: &str = "roll.in_progress";

    // === Monster attacks ===
    pub const ATTACK_ROLL: &str = "attack_roll";
    pub const ATTACK_SUCCESS: &str = "attack.success";
    pub const ATTACK_FAIL: &str = "attack.fail";
    pub const ATTACK_NO_EFFECT: &str = "attack.no_effect";
    pub const TARGET_MONSTER: &str = "target_monster_id";
}

/// Mutable mapping plus the warnings accumulated during one action.
///
/// ```
/// use hts_rules::conditions::{keys, EvalContext};
///
/// let mut ctx = EvalContext::new();
/// ctx.set_flag(keys::PROTECT_STEAL, true);
/// assert!(ctx.flag(keys::PROTECT_STEAL));
/// assert!(!ctx.flag(keys::PROTECT_DESTROY));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvalContext {
    values: BTreeMap<String, Value>,
    warnings: Vec<String>,
}

impl EvalContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that records the acting player.
    #[must_use]
    pub fn for_actor(actor: PlayerId) -> Self {
        Self::new().with(keys::ACTOR, Value::Int(actor.index() as i64))
    }

    /// Set a key (builder pattern).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Truthiness of a key; absent keys are false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.values.get(key).map_or(false, Value::truthy)
    }

    pub fn set_flag(&mut self, key: &str, on: bool) {
        self.set(key, Value::Bool(on));
    }

    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_int)
    }

    /// The targeted player, if one has been chosen.
    #[must_use]
    pub fn target_player(&self) -> Option<PlayerId> {
        self.int(keys::TARGET_PLAYER)
            .filter(|&pid| (0..=255).contains(&pid))
            .map(|pid| PlayerId::new(pid as u8))
    }

    pub fn set_target_player(&mut self, player: PlayerId) {
        self.set(keys::TARGET_PLAYER, Value::Int(player.index() as i64));
    }

    /// Id of a card record stored under `key`.
    #[must_use]
    pub fn card_id(&self, key: &str) -> Option<CardId> {
        let id = match self.values.get(key)? {
            Value::Map(fields) => fields.get("id")?.as_int()?,
            Value::Int(id) => *id,
            _ => return None,
        };
        u32::try_from(id).ok().map(CardId::new)
    }

    /// Record a non-fatal warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(warning = %message, "rules warning");
        self.warnings.push(message);
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Remove and return all warnings recorded so far.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Resolve a dotted path.
    ///
    /// The longest prefix that is a literal key wins and the remaining
    /// segments walk into nested maps. An unknown bare name evaluates to its
    /// own text; an unknown dotted path evaluates to null.
    #[must_use]
    pub fn resolve(&self, path: &[String]) -> Value {
        for split in (1..=path.len()).rev() {
            let key = path[..split].join(".");
            if let Some(value) = self.values.get(&key) {
                let mut current = value;
                for segment in &path[split..] {
                    match current.get(segment) {
                        Some(next) => current = next,
                        None => return Value::Null,
                    }
                }
                return current.clone();
            }
        }
        match path {
            [name] => Value::Text(name.clone()),
            _ => Value::Null,
        }
    }
}
