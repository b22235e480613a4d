//! Zone names and card movement between zones.
//!
//! ## Key Types
//!
//! - `ZoneKind`: Which pile (hand, party, discard pile, ...)
//! - `Seat`: Actor's or target's copy of a per-player pile
//! - `ZoneRef`: Parsed zone name from effect data
//! - `PlayerShorthand`: Bare `self` / `opponent` target shorthand

pub mod location;

pub use location::{PlayerShorthand, Seat, ZoneKind, ZoneRef};
