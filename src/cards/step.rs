//! Effect steps: the data-described unit of card behaviour.
//!
//! A card's behaviour is an ordered list of steps. Each step names a
//! handler (`effect_kind`), the phases it fires in, an optional gating
//! condition and an optional gating roll. Steps never change after the
//! catalogue is built.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::CardId;

/// Phase tag selecting when a step fires.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    // === Card lifecycle ===
    OnPlay,
    OnActivation,
    Auto,
    Passive,

    // === Reactions ===
    OnDraw,
    OnChallenge,
    OnRoll,
    OnHeroDestroyed,

    /// Unrecognized tag, normalized but otherwise kept verbatim.
    Other(String),
}

impl Trigger {
    /// Parse a single tag. Case and space/hyphen spelling are ignored.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let norm = tag.trim().to_lowercase().replace([' ', '-'], "_");
        match norm.as_str() {
            "on_play" => Self::OnPlay,
            "on_activation" | "on_activate" => Self::OnActivation,
            "auto" => Self::Auto,
            "passive" => Self::Passive,
            "on_draw" => Self::OnDraw,
            "on_challenge" => Self::OnChallenge,
            "on_roll" => Self::OnRoll,
            "on_hero_destroyed" => Self::OnHeroDestroyed,
            _ => Self::Other(norm),
        }
    }

    /// Parse a tag list separated by commas, semicolons or pipes.
    #[must_use]
    pub fn parse_list(text: &str) -> SmallVec<[Trigger; 2]> {
        text.split([',', ';', '|'])
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(Trigger::parse)
            .collect()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OnPlay => "on_play",
            Self::OnActivation => "on_activation",
            Self::Auto => "auto",
            Self::Passive => "passive",
            Self::OnDraw => "on_draw",
            Self::OnChallenge => "on_challenge",
            Self::OnRoll => "on_roll",
            Self::OnHeroDestroyed => "on_hero_destroyed",
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a card's (or monster's) behaviour.
///
/// ## Example
///
/// ```
/// use hts_rules::cards::{CardId, EffectStep, Trigger};
///
/// let step = EffectStep::new(CardId::new(12), 1, "Draw_Card")
///     .with_trigger(Trigger::OnPlay)
///     .with_amount(2);
///
/// assert_eq!(step.effect_kind, "draw_card");
/// assert!(step.fires_on(&[Trigger::OnPlay, Trigger::Auto]));
/// assert!(!step.fires_on(&[Trigger::Passive]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectStep {
    /// Card or monster the step belongs to.
    pub owner: CardId,
    /// Execution order within the owner.
    pub ordinal: i64,
    /// Display name used in warnings (usually the owner's name).
    pub name: String,
    pub triggers: SmallVec<[Trigger; 2]>,
    /// Handler name, trimmed and lowercased.
    pub effect_kind: String,

    // === Parameters ===
    pub source_zone: Option<String>,
    pub dest_zone: Option<String>,
    pub filter_expr: Option<String>,
    pub amount: Option<i64>,
    /// Free-text magnitude when the amount is not a bare integer.
    pub amount_expr: Option<String>,
    pub duration: Option<String>,
    pub notes: Option<String>,

    // === Gates ===
    pub requires_roll: bool,
    pub roll_condition: Option<String>,
    pub condition: Option<String>,
}

impl EffectStep {
    /// Create a step with no triggers and no parameters.
    #[must_use]
    pub fn new(owner: CardId, ordinal: i64, effect_kind: &str) -> Self {
        Self {
            owner,
            ordinal,
            name: String::new(),
            triggers: SmallVec::new(),
            effect_kind: normalize_kind(effect_kind),
            source_zone: None,
            dest_zone: None,
            filter_expr: None,
            amount: None,
            amount_expr: None,
            duration: None,
            notes: None,
            requires_roll: false,
            roll_condition: None,
            condition: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn with_amount_expr(mut self, expr: impl Into<String>) -> Self {
        self.amount_expr = Some(expr.into());
        self
    }

    #[must_use]
    pub fn with_zones(mut self, source: Option<&str>, dest: Option<&str>) -> Self {
        self.source_zone = source.map(str::to_string);
        self.dest_zone = dest.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_expr = Some(filter.into());
        self
    }

    /// Gate the step on a roll meeting `goal` (e.g. `">=8"`).
    #[must_use]
    pub fn with_roll(mut self, goal: impl Into<String>) -> Self {
        self.requires_roll = true;
        self.roll_condition = Some(goal.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the step carries `trigger`.
    #[must_use]
    pub fn has_trigger(&self, trigger: &Trigger) -> bool {
        self.triggers.contains(trigger)
    }

    /// Whether the step fires in any of `phases`.
    #[must_use]
    pub fn fires_on(&self, phases: &[Trigger]) -> bool {
        self.triggers.iter().any(|t| phases.contains(t))
    }

    /// Every free-text parameter, in the order amount_expr, amount, notes, filter.
    pub fn parameter_texts(&self) -> impl Iterator<Item = String> + '_ {
        self.amount_expr
            .iter()
            .cloned()
            .chain(self.amount.map(|a| a.to_string()))
            .chain(self.notes.iter().cloned())
            .chain(self.filter_expr.iter().cloned())
    }
}

/// Normalize a handler name for registry lookup.
#[must_use]
pub fn normalize_kind(kind: &str) -> String {
    kind.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_parse() {
        assert_eq!(Trigger::parse("On_Play"), Trigger::OnPlay);
        assert_eq!(Trigger::parse("on hero destroyed"), Trigger::OnHeroDestroyed);
        assert_eq!(Trigger::parse(" passive "), Trigger::Passive);
        assert_eq!(Trigger::parse("end_of_turn"), Trigger::Other("end_of_turn".into()));
    }

    #[test]
    fn test_trigger_parse_list() {
        let tags = Trigger::parse_list("on_play; auto,,passive");
        assert_eq!(
            tags.as_slice(),
            &[Trigger::OnPlay, Trigger::Auto, Trigger::Passive]
        );
        assert!(Trigger::parse_list("  ").is_empty());
    }

    #[test]
    fn test_step_builder() {
        let step = EffectStep::new(CardId::new(4), 2, "  Steal_Card ")
            .named("Thief")
            .with_trigger(Trigger::OnPlay)
            .with_roll(">=6")
            .with_condition("target_pid != actor_pid");

        assert_eq!(step.effect_kind, "steal_card");
        assert!(step.requires_roll);
        assert_eq!(step.roll_condition.as_deref(), Some(">=6"));
        assert!(step.has_trigger(&Trigger::OnPlay));
        assert!(!step.has_trigger(&Trigger::Passive));
    }

    #[test]
    fn test_parameter_texts() {
        let step = EffectStep::new(CardId::new(1), 1, "modify_roll")
            .with_amount_expr("+2 or -2")
            .with_amount(4)
            .with_notes("modifier");
        let texts: Vec<_> = step.parameter_texts().collect();
        assert_eq!(texts, vec!["+2 or -2", "4", "modifier"]);
    }
}
