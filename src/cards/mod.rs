//! Card catalogue: metadata, effect steps and monster rules.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier of a catalogue entry
//! - `CardMeta`: Static card data (name, type, subtype, cost)
//! - `EffectStep`: One data-described step of card behaviour
//! - `Catalogue`: Immutable lookup tables built once at load time

pub mod catalogue;
pub mod definition;
pub mod records;
pub mod step;

pub use catalogue::{Catalogue, CatalogueBuilder, CatalogueError};
pub use definition::{CardId, CardMeta, CardType};
pub use records::{CardRecord, MonsterRule, MonsterRuleRecord, RawField, StepRecord};
pub use step::{EffectStep, Trigger};
