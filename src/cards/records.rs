//! Serde records for catalogue data.
//!
//! Catalogue data is produced by spreadsheets and hand-edited JSON, so the
//! records accept loose field types: numbers may arrive as text, booleans
//! as `"yes"`/`1`, and a blank or `"nan"` cell means the field is absent.
//! Conversion into the strict [`EffectStep`] / [`CardMeta`] types happens
//! in [`CatalogueBuilder`](super::CatalogueBuilder).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::definition::{CardId, CardMeta, CardType};
use super::step::{EffectStep, Trigger};
use super::catalogue::CatalogueError;

/// A scalar cell of uncertain type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawField {
    /// The cell as trimmed text, `None` when blank or `nan`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_nan() => return None,
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.trim().to_string(),
        };
        if is_blank(&text) {
            None
        } else {
            Some(text)
        }
    }

    /// The cell as an integer. Floats truncate; text must parse as a number.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(_) => None,
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
            }
        }
    }

    /// The cell as a flag: `true`, `1` and `yes` (any case) are true.
    #[must_use]
    pub fn as_flag(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i == 1,
            Self::Float(f) => *f == 1.0,
            Self::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        }
    }
}

/// Whether a text cell counts as absent.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.eq_ignore_ascii_case("nan")
}

fn clean(text: Option<String>) -> Option<String> {
    text.filter(|t| !is_blank(t))
}

/// One row of card metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "type")]
    pub card_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub action_cost: Option<RawField>,
    #[serde(default, alias = "copies")]
    pub copies_in_deck: Option<RawField>,
}

impl CardRecord {
    /// Convert into card metadata, defaulting missing fields.
    #[must_use]
    pub fn into_meta(self) -> CardMeta {
        let id = CardId::new(self.id);
        let name = clean(self.name).unwrap_or_else(|| format!("card_{}", self.id));
        let card_type = CardType::parse(clean(self.card_type).as_deref().unwrap_or(""));
        let cost = self
            .action_cost
            .and_then(|c| c.as_int())
            .map_or(1, |c| c.clamp(0, i64::from(u32::MAX)) as u32);
        let copies = self
            .copies_in_deck
            .and_then(|c| c.as_int())
            .map_or(1, |c| c.clamp(0, i64::from(u32::MAX)) as u32);

        CardMeta::new(id, name, card_type)
            .with_subtype(clean(self.subtype).unwrap_or_default())
            .with_action_cost(cost)
            .with_copies(copies)
    }
}

/// One row of effect data, for a card or a monster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub card_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub step: Option<RawField>,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub effect_kind: Option<String>,
    #[serde(default)]
    pub source_zone: Option<String>,
    #[serde(default)]
    pub dest_zone: Option<String>,
    #[serde(default, alias = "filter_expr")]
    pub filter: Option<String>,
    #[serde(default)]
    pub amount: Option<RawField>,
    #[serde(default)]
    pub requires_roll: Option<RawField>,
    #[serde(default)]
    pub roll_condition: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StepRecord {
    /// Convert into an effect step.
    ///
    /// A numeric amount becomes `amount`; any other non-blank amount is
    /// kept as `amount_expr`. A present but non-numeric ordinal is an error.
    pub fn into_step(self) -> Result<EffectStep, CatalogueError> {
        let owner = CardId::new(self.card_id);
        let ordinal = match &self.step {
            None => 1,
            Some(raw) => match raw.as_text() {
                None => 1,
                Some(text) => raw.as_int().ok_or(CatalogueError::InvalidField {
                    owner,
                    field: "step",
                    value: text,
                })?,
            },
        };

        let mut step = EffectStep::new(
            owner,
            ordinal,
            &clean(self.effect_kind).unwrap_or_default(),
        )
        .named(clean(self.name).unwrap_or_default());
        step.triggers = Trigger::parse_list(self.trigger.as_deref().unwrap_or(""));
        step.source_zone = clean(self.source_zone);
        step.dest_zone = clean(self.dest_zone);
        step.filter_expr = clean(self.filter);
        step.roll_condition = clean(self.roll_condition);
        step.condition = clean(self.condition);
        step.duration = clean(self.duration);
        step.notes = clean(self.notes);
        step.requires_roll = self.requires_roll.map_or(false, |r| r.as_flag());

        if let Some(raw) = self.amount {
            if let Some(text) = raw.as_text() {
                match raw.as_int() {
                    Some(n) => step.amount = Some(n),
                    None => step.amount_expr = Some(text),
                }
            }
        }
        Ok(step)
    }
}

/// Attack rule for one monster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterRuleRecord {
    pub monster_id: u32,
    #[serde(default)]
    pub success_condition: Option<String>,
    #[serde(default)]
    pub fail_condition: Option<String>,
    #[serde(default)]
    pub success_action: Option<String>,
    #[serde(default)]
    pub fail_action: Option<String>,
    /// Party composition needed to attack: class name to hero count.
    #[serde(default)]
    pub attack_requirements: Option<BTreeMap<String, u32>>,
}

/// Parsed monster attack rule.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MonsterRule {
    pub monster_id: CardId,
    pub success_condition: Option<String>,
    pub fail_condition: Option<String>,
    pub success_action: Option<String>,
    pub fail_action: Option<String>,
    /// Lowercase class name to required hero count.
    pub requirements: BTreeMap<String, u32>,
}

impl From<MonsterRuleRecord> for MonsterRule {
    fn from(record: MonsterRuleRecord) -> Self {
        let trimmed = |s: Option<String>| clean(s).map(|t| t.trim().to_string());
        Self {
            monster_id: CardId::new(record.monster_id),
            success_condition: trimmed(record.success_condition),
            fail_condition: trimmed(record.fail_condition),
            success_action: trimmed(record.success_action),
            fail_action: trimmed(record.fail_action),
            requirements: record
                .attack_requirements
                .unwrap_or_default()
                .into_iter()
                .map(|(class, count)| (class.trim().to_lowercase(), count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_field_text() {
        assert_eq!(RawField::Text("  nan ".into()).as_text(), None);
        assert_eq!(RawField::Text("   ".into()).as_text(), None);
        assert_eq!(RawField::Float(f64::NAN).as_text(), None);
        assert_eq!(RawField::Int(3).as_text(), Some("3".into()));
    }

    #[test]
    fn test_raw_field_int() {
        assert_eq!(RawField::Text(" 2 ".into()).as_int(), Some(2));
        assert_eq!(RawField::Text("2.0".into()).as_int(), Some(2));
        assert_eq!(RawField::Float(-1.7).as_int(), Some(-1));
        assert_eq!(RawField::Text("+2 or -2".into()).as_int(), None);
    }

    #[test]
    fn test_raw_field_flag() {
        assert!(RawField::Text("Yes".into()).as_flag());
        assert!(RawField::Int(1).as_flag());
        assert!(RawField::Bool(true).as_flag());
        assert!(!RawField::Text("no".into()).as_flag());
    }

    #[test]
    fn test_card_record_defaults() {
        let meta = CardRecord {
            id: 9,
            name: None,
            card_type: Some("Hero".into()),
            subtype: Some("nan".into()),
            action_cost: None,
            copies_in_deck: Some(RawField::Text("2".into())),
        }
        .into_meta();

        assert_eq!(meta.name, "card_9");
        assert_eq!(meta.card_type, CardType::Hero);
        assert_eq!(meta.subtype, "");
        assert_eq!(meta.action_cost, 1);
        assert_eq!(meta.copies, 2);
    }

    #[test]
    fn test_step_record_amount_split() {
        let mut record = StepRecord {
            card_id: 3,
            name: Some("Bolt".into()),
            step: Some(RawField::Text("2".into())),
            trigger: Some("on_play".into()),
            effect_kind: Some("Modify_Roll".into()),
            source_zone: Some("".into()),
            dest_zone: None,
            filter: None,
            amount: Some(RawField::Text("+1/-1".into())),
            requires_roll: Some(RawField::Text("TRUE".into())),
            roll_condition: Some(">=7".into()),
            condition: Some("nan".into()),
            duration: None,
            notes: None,
        };
        let step = record.clone().into_step().unwrap();
        assert_eq!(step.ordinal, 2);
        assert_eq!(step.effect_kind, "modify_roll");
        assert_eq!(step.amount, None);
        assert_eq!(step.amount_expr.as_deref(), Some("+1/-1"));
        assert!(step.requires_roll);
        assert_eq!(step.source_zone, None);
        assert_eq!(step.condition, None);

        record.amount = Some(RawField::Float(3.0));
        let step = record.clone().into_step().unwrap();
        assert_eq!(step.amount, Some(3));

        record.step = Some(RawField::Text("first".into()));
        assert!(matches!(
            record.into_step(),
            Err(CatalogueError::InvalidField { field: "step", .. })
        ));
    }

    #[test]
    fn test_monster_rule_from_record() {
        let mut reqs = BTreeMap::new();
        reqs.insert(" Fighter ".to_string(), 2);
        let rule = MonsterRule::from(MonsterRuleRecord {
            monster_id: 50,
            success_condition: Some(" >=8 ".into()),
            fail_condition: Some("nan".into()),
            success_action: None,
            fail_action: None,
            attack_requirements: Some(reqs),
        });
        assert_eq!(rule.success_condition.as_deref(), Some(">=8"));
        assert_eq!(rule.fail_condition, None);
        assert_eq!(rule.requirements.get("fighter"), Some(&2));
    }
}
