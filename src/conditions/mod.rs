//! The condition language.
//!
//! ## Overview
//!
//! Steps carry optional boolean expressions over the current
//! [`EvalContext`]. Supported constructs:
//!
//! - literals: integers, quoted strings, `true`/`false`, `none`/`null`
//! - dotted attribute paths (`challenge_target.type`)
//! - `==` / `!=`, chainable
//! - `and`, `or`, `not`, parentheses
//! - `path.contains(x)`
//!
//! ## Example
//!
//! ```
//! use hts_rules::conditions::{ConditionEvaluator, EvalContext};
//!
//! let mut ctx = EvalContext::new().with("drawn_card.type", "monster");
//! assert!(ConditionEvaluator::evaluate(Some("drawn_card.type == monster"), &mut ctx));
//! assert!(!ConditionEvaluator::evaluate(Some("drawn_card.type != monster"), &mut ctx));
//! ```

pub mod condition;
pub mod context;
pub mod expr;
pub mod parser;
pub mod value;

pub use condition::{Condition, ConditionEvaluator};
pub use context::{keys, EvalContext};
pub use expr::{CompareOp, Expr};
pub use parser::ConditionError;
pub use value::Value;
