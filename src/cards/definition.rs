//! Card definitions: static card metadata.
//!
//! `CardMeta` holds the immutable properties of a catalogue entry: its
//! name, type, subtype (the hero class for heroes) and action cost. Where a
//! card currently sits is game state, not part of the definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conditions::Value;

/// Unique identifier for a catalogue entry.
///
/// Every physical card in play refers back to its entry by id. Monsters
/// share the id space with player cards.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The kind of card, which decides where a played card goes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CardType {
    Hero,
    Item,
    Magic,
    Challenge,
    Modifier,
    Monster,
    PartyLeader,
    /// Any other label, kept lowercase.
    Other(String),
}

impl CardType {
    /// Parse a type label. Case, surrounding whitespace and the
    /// space/underscore/hyphen spelling of "party leader" are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let norm = text.trim().to_lowercase().replace([' ', '-'], "_");
        match norm.as_str() {
            "hero" => Self::Hero,
            "item" => Self::Item,
            "magic" => Self::Magic,
            "challenge" => Self::Challenge,
            "modifier" => Self::Modifier,
            "monster" | "monsters" => Self::Monster,
            "party_leader" | "leader" => Self::PartyLeader,
            "" => Self::Other("unknown".into()),
            _ => Self::Other(norm),
        }
    }

    /// The canonical lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hero => "hero",
            Self::Item => "item",
            Self::Magic => "magic",
            Self::Challenge => "challenge",
            Self::Modifier => "modifier",
            Self::Monster => "monster",
            Self::PartyLeader => "party_leader",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static card metadata.
///
/// ## Example
///
/// ```
/// use hts_rules::cards::{CardId, CardMeta, CardType};
///
/// let bard = CardMeta::new(CardId::new(7), "Lute Player", CardType::Hero)
///     .with_subtype("Bard")
///     .with_action_cost(1);
///
/// assert_eq!(bard.subtype, "Bard");
/// assert_eq!(bard.card_type, CardType::Hero);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardMeta {
    pub id: CardId,
    pub name: String,
    pub card_type: CardType,
    /// Hero class, item flavour ("cursed") or empty.
    pub subtype: String,
    pub action_cost: u32,
    pub copies: u32,
}

impl CardMeta {
    /// Create metadata with an empty subtype, a cost of 1 and one copy.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            subtype: String::new(),
            action_cost: 1,
            copies: 1,
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    #[must_use]
    pub fn with_action_cost(mut self, cost: u32) -> Self {
        self.action_cost = cost;
        self
    }

    #[must_use]
    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    /// Whether the subtype marks this card as cursed (attached to opponents).
    #[must_use]
    pub fn is_cursed(&self) -> bool {
        self.subtype.trim().eq_ignore_ascii_case("cursed")
    }

    /// The card as a condition value, e.g. for `challenge_target.type == item`.
    ///
    /// Text fields are lowercased so that bare identifiers compare equal.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), Value::Int(i64::from(self.id.raw())));
        fields.insert("name".to_string(), Value::Text(self.name.clone()));
        fields.insert(
            "type".to_string(),
            Value::Text(self.card_type.as_str().to_string()),
        );
        fields.insert(
            "subtype".to_string(),
            Value::Text(self.subtype.trim().to_lowercase()),
        );
        fields.insert(
            "action_cost".to_string(),
            Value::Int(i64::from(self.action_cost)),
        );
        Value::Map(fields)
    }

    /// Value for an id missing from the catalogue.
    #[must_use]
    pub fn unknown_value(id: CardId) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), Value::Int(i64::from(id.raw())));
        fields.insert("type".to_string(), Value::Text("unknown".into()));
        Value::Map(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
        assert!(CardId::new(3) < CardId::new(10));
    }

    #[test]
    fn test_card_type_parse() {
        assert_eq!(CardType::parse(" Hero "), CardType::Hero);
        assert_eq!(CardType::parse("Party Leader"), CardType::PartyLeader);
        assert_eq!(CardType::parse("party-leader"), CardType::PartyLeader);
        assert_eq!(CardType::parse("MONSTERS"), CardType::Monster);
        assert_eq!(CardType::parse(""), CardType::Other("unknown".into()));
        assert_eq!(CardType::parse("Relic").as_str(), "relic");
    }

    #[test]
    fn test_meta_to_value() {
        let meta = CardMeta::new(CardId::new(3), "Sneaky Pig", CardType::Item)
            .with_subtype("Cursed");
        assert!(meta.is_cursed());

        let value = meta.to_value();
        assert_eq!(value.get("type"), Some(&Value::Text("item".into())));
        assert_eq!(value.get("subtype"), Some(&Value::Text("cursed".into())));
        assert_eq!(value.get("id"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_unknown_value() {
        let value = CardMeta::unknown_value(CardId::new(99));
        assert_eq!(value.get("type"), Some(&Value::Text("unknown".into())));
    }
}
