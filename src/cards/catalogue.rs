//! The card catalogue: metadata, effect steps and monster rules.
//!
//! A `Catalogue` is built once by [`CatalogueBuilder`] and then shared
//! immutably by everything that interprets cards. Step lists are sorted by
//! ordinal at build time and only ever handed out as slices, so execution
//! order cannot change after loading.

use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use super::definition::{CardId, CardMeta, CardType};
use super::records::{CardRecord, MonsterRule, MonsterRuleRecord, StepRecord};
use super::step::EffectStep;
use crate::conditions::Value;

/// Errors raised while building a catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("duplicate card id {0}")]
    DuplicateCard(CardId),

    #[error("duplicate attack rule for monster {0}")]
    DuplicateMonsterRule(CardId),

    #[error("invalid {field} `{value}` on {owner}")]
    InvalidField {
        owner: CardId,
        field: &'static str,
        value: String,
    },
}

/// Immutable lookup tables for everything the rules read from data.
///
/// ## Example
///
/// ```
/// use hts_rules::cards::{Catalogue, CardId, CardMeta, CardType, EffectStep};
///
/// let catalogue = Catalogue::builder()
///     .with_card(CardMeta::new(CardId::new(1), "Lucky Charm", CardType::Modifier))
///     .with_step(EffectStep::new(CardId::new(1), 1, "modify_roll").with_amount_expr("+2/-2"))
///     .build()
///     .unwrap();
///
/// assert_eq!(catalogue.modifier_options(CardId::new(1)), &[2, -2]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    cards: FxHashMap<CardId, CardMeta>,
    steps: FxHashMap<CardId, Vec<EffectStep>>,
    monster_rules: FxHashMap<CardId, MonsterRule>,
    monster_steps: FxHashMap<CardId, Vec<EffectStep>>,
    modifier_options: FxHashMap<CardId, Vec<i64>>,
}

impl Catalogue {
    /// Start building a catalogue.
    #[must_use]
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::default()
    }

    /// Build a catalogue straight from deserialized records.
    pub fn from_records(
        cards: impl IntoIterator<Item = CardRecord>,
        steps: impl IntoIterator<Item = StepRecord>,
        monster_rules: impl IntoIterator<Item = MonsterRuleRecord>,
        monster_steps: impl IntoIterator<Item = StepRecord>,
    ) -> Result<Self, CatalogueError> {
        let mut builder = Self::builder();
        for record in cards {
            builder = builder.with_card(record.into_meta());
        }
        for record in steps {
            builder = builder.with_step(record.into_step()?);
        }
        for record in monster_rules {
            builder = builder.with_monster_rule(record.into());
        }
        for record in monster_steps {
            builder = builder.with_monster_step(record.into_step()?);
        }
        builder.build()
    }

    /// Get card metadata.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardMeta> {
        self.cards.get(&id)
    }

    /// Card name, or `"?"` when unknown.
    #[must_use]
    pub fn card_name(&self, id: CardId) -> &str {
        self.cards.get(&id).map_or("?", |meta| meta.name.as_str())
    }

    /// Card type, or `unknown` when the id is not catalogued.
    #[must_use]
    pub fn card_type(&self, id: CardId) -> CardType {
        self.cards
            .get(&id)
            .map_or_else(|| CardType::Other("unknown".into()), |meta| meta.card_type.clone())
    }

    /// The card as a condition value.
    #[must_use]
    pub fn card_value(&self, id: CardId) -> Value {
        self.cards
            .get(&id)
            .map_or_else(|| CardMeta::unknown_value(id), CardMeta::to_value)
    }

    /// Steps owned by a card, in execution order.
    #[must_use]
    pub fn steps(&self, id: CardId) -> &[EffectStep] {
        self.steps.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Steps owned by a monster, in execution order.
    #[must_use]
    pub fn monster_steps(&self, id: CardId) -> &[EffectStep] {
        self.monster_steps.get(&id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn monster_rule(&self, id: CardId) -> Option<&MonsterRule> {
        self.monster_rules.get(&id)
    }

    /// Delta menu of a modifier card, largest first. Empty for other cards.
    #[must_use]
    pub fn modifier_options(&self, id: CardId) -> &[i64] {
        self.modifier_options.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Iterate over all card metadata (unordered).
    pub fn cards(&self) -> impl Iterator<Item = &CardMeta> {
        self.cards.values()
    }

    /// Get the number of catalogued cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every hero or party-leader class in the catalogue, lowercase.
    #[must_use]
    pub fn hero_classes(&self) -> BTreeSet<String> {
        self.cards
            .values()
            .filter(|meta| matches!(meta.card_type, CardType::Hero | CardType::PartyLeader))
            .map(|meta| meta.subtype.trim().to_lowercase())
            .filter(|class| !class.is_empty())
            .collect()
    }
}

/// Builder for [`Catalogue`].
///
/// Validation (duplicate ids) and step ordering happen in [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct CatalogueBuilder {
    cards: Vec<CardMeta>,
    steps: Vec<EffectStep>,
    monster_rules: Vec<MonsterRule>,
    monster_steps: Vec<EffectStep>,
}

impl CatalogueBuilder {
    #[must_use]
    pub fn with_card(mut self, meta: CardMeta) -> Self {
        self.cards.push(meta);
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: EffectStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn with_monster_rule(mut self, rule: MonsterRule) -> Self {
        self.monster_rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_monster_step(mut self, step: EffectStep) -> Self {
        self.monster_steps.push(step);
        self
    }

    /// Validate and freeze the catalogue.
    pub fn build(self) -> Result<Catalogue, CatalogueError> {
        let mut cards = FxHashMap::default();
        for meta in self.cards {
            let id = meta.id;
            if cards.insert(id, meta).is_some() {
                return Err(CatalogueError::DuplicateCard(id));
            }
        }

        let mut monster_rules = FxHashMap::default();
        for rule in self.monster_rules {
            let id = rule.monster_id;
            if monster_rules.insert(id, rule).is_some() {
                return Err(CatalogueError::DuplicateMonsterRule(id));
            }
        }

        let steps = group_by_owner(self.steps);
        let monster_steps = group_by_owner(self.monster_steps);

        let modifier_options = cards
            .values()
            .filter(|meta| meta.card_type == CardType::Modifier)
            .map(|meta| {
                let owned = steps.get(&meta.id).map_or(&[][..], Vec::as_slice);
                (meta.id, modifier_menu(owned))
            })
            .collect();

        tracing::debug!(
            cards = cards.len(),
            step_owners = steps.len(),
            monster_rules = monster_rules.len(),
            "catalogue built"
        );

        Ok(Catalogue {
            cards,
            steps,
            monster_rules,
            monster_steps,
            modifier_options,
        })
    }
}

/// Group steps by owner, each group stably sorted by ordinal.
fn group_by_owner(steps: Vec<EffectStep>) -> FxHashMap<CardId, Vec<EffectStep>> {
    let mut grouped: FxHashMap<CardId, Vec<EffectStep>> = FxHashMap::default();
    for step in steps {
        grouped.entry(step.owner).or_default().push(step);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|step| step.ordinal);
    }
    grouped
}

/// Distinct signed integers found in a modifier card's step parameters,
/// largest first.
fn modifier_menu(steps: &[EffectStep]) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut menu: Vec<i64> = steps
        .iter()
        .flat_map(EffectStep::parameter_texts)
        .flat_map(|text| signed_integers(&text))
        .filter(|value| seen.insert(*value))
        .collect();
    menu.sort_unstable_by(|a, b| b.cmp(a));
    menu
}

/// Every `[-+]?\d+` match in `text`, left to right.
pub(crate) fn signed_integers(text: &str) -> Vec<i64> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let negative = bytes[i] == b'-';
        let signed = negative || bytes[i] == b'+';
        let digits_from = if signed { i + 1 } else { i };
        let mut end = digits_from;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_from {
            if let Ok(magnitude) = text[digits_from..end].parse::<i64>() {
                out.push(if negative { -magnitude } else { magnitude });
            }
            i = end;
        } else {
            i = start + 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Trigger;

    fn modifier(id: u32) -> CardMeta {
        CardMeta::new(CardId::new(id), format!("mod_{id}"), CardType::Modifier)
    }

    #[test]
    fn test_signed_integers() {
        assert_eq!(signed_integers("+2 or -2"), vec![2, -2]);
        assert_eq!(signed_integers("choose -3/-1/+2"), vec![-3, -1, 2]);
        assert_eq!(signed_integers("2d6"), vec![2, 6]);
        assert_eq!(signed_integers("+-4"), vec![-4]);
        assert!(signed_integers("no digits").is_empty());
    }

    #[test]
    fn test_steps_sorted_stably() {
        let owner = CardId::new(1);
        let catalogue = Catalogue::builder()
            .with_step(EffectStep::new(owner, 2, "b"))
            .with_step(EffectStep::new(owner, 1, "a"))
            .with_step(EffectStep::new(owner, 2, "c"))
            .build()
            .unwrap();

        let kinds: Vec<_> = catalogue
            .steps(owner)
            .iter()
            .map(|s| s.effect_kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["a", "b", "c"]);
        assert!(catalogue.steps(CardId::new(2)).is_empty());
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let result = Catalogue::builder()
            .with_card(modifier(1))
            .with_card(modifier(1))
            .build();
        assert_eq!(result.unwrap_err(), CatalogueError::DuplicateCard(CardId::new(1)));
    }

    #[test]
    fn test_modifier_menu_dedup_descending() {
        let id = CardId::new(5);
        let catalogue = Catalogue::builder()
            .with_card(modifier(5))
            .with_step(
                EffectStep::new(id, 1, "modify_roll")
                    .with_trigger(Trigger::OnRoll)
                    .with_amount_expr("-3 / -1 / +2"),
            )
            .with_step(EffectStep::new(id, 2, "modify_roll").with_notes("or +2"))
            .build()
            .unwrap();
        assert_eq!(catalogue.modifier_options(id), &[2, -1, -3]);
    }

    #[test]
    fn test_non_modifier_has_no_menu() {
        let id = CardId::new(6);
        let catalogue = Catalogue::builder()
            .with_card(CardMeta::new(id, "Sword", CardType::Item))
            .with_step(EffectStep::new(id, 1, "modify_hero_roll").with_amount(1))
            .build()
            .unwrap();
        assert!(catalogue.modifier_options(id).is_empty());
    }

    #[test]
    fn test_lookup_fallbacks() {
        let catalogue = Catalogue::default();
        assert_eq!(catalogue.card_name(CardId::new(1)), "?");
        assert_eq!(catalogue.card_type(CardId::new(1)).as_str(), "unknown");
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_hero_classes() {
        let catalogue = Catalogue::builder()
            .with_card(CardMeta::new(CardId::new(1), "a", CardType::Hero).with_subtype("Bard"))
            .with_card(CardMeta::new(CardId::new(2), "b", CardType::PartyLeader).with_subtype("Guardian"))
            .with_card(CardMeta::new(CardId::new(3), "c", CardType::Item).with_subtype("Cursed"))
            .build()
            .unwrap();
        let classes: Vec<_> = catalogue.hero_classes().into_iter().collect();
        assert_eq!(classes, vec!["bard", "guardian"]);
    }
}
